/// Which pattern one voice plays at a position, and how it is shifted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TrackRef {
    pub pattern: u16,
    /// Added to every note of the track
    pub note_transpose: i8,
    /// Added to every instrument (envelope) number of the track
    pub sound_transpose: i8,
}

/// One position of the song order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceEntry {
    pub tracks: Vec<TrackRef>,
    /// Speed to switch to when entering the position, 0 = keep
    pub speed: u8,
}

impl SequenceEntry {
    /// Every voice plays the same untransposed pattern
    pub fn shared(pattern: u16, voices: usize) -> Self {
        Self {
            tracks: vec![
                TrackRef {
                    pattern,
                    ..Default::default()
                };
                voices
            ],
            speed: 0,
        }
    }

    /// Pattern of the first voice; the whole row for shared-pattern formats
    pub fn pattern(&self) -> u16 {
        self.tracks.first().map(|t| t.pattern).unwrap_or(0)
    }

    pub fn track(&self, voice: usize) -> TrackRef {
        self.tracks.get(voice).copied().unwrap_or_default()
    }
}

/// Ordered song positions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceTable {
    entries: Vec<SequenceEntry>,
}

impl SequenceTable {
    pub fn new(entries: Vec<SequenceEntry>) -> Self {
        Self { entries }
    }

    /// Shared-pattern song order from a list of pattern numbers
    pub fn from_patterns(patterns: &[u16], voices: usize) -> Self {
        Self {
            entries: patterns
                .iter()
                .map(|&p| SequenceEntry::shared(p, voices))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&SequenceEntry> {
        self.entries.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SequenceEntry> {
        self.entries.iter()
    }

    /// Position following `position`, wrapping to the song start
    pub fn next_position(&self, position: usize) -> usize {
        if position + 1 >= self.entries.len() {
            0
        } else {
            position + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_position_wraps() {
        let seq = SequenceTable::from_patterns(&[0, 1, 1], 4);
        assert_eq!(seq.next_position(0), 1);
        assert_eq!(seq.next_position(2), 0);
        assert_eq!(seq.get(2).map(|e| e.pattern()), Some(1));
        assert_eq!(seq.get(1).map(|e| e.tracks.len()), Some(4));
    }

    #[test]
    fn missing_track_reads_default() {
        let e = SequenceEntry::shared(3, 1);
        assert_eq!(e.track(0).pattern, 3);
        assert_eq!(e.track(5), TrackRef::default());
    }
}
