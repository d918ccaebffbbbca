use crate::error::ModuleError;

/// One decoded cell of a pattern: what a voice is told on a row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Event {
    /// Sample or instrument id, 0 = none
    pub sample: u8,
    /// Note or period, 0 = none
    pub note: u16,
    pub effect: u8,
    pub argument: u8,
}

const EMPTY_EVENT: Event = Event {
    sample: 0,
    note: 0,
    effect: 0,
    argument: 0,
};

impl Event {
    /// Decode a 4-byte packed cell.
    ///
    /// `byte0[7:3]` sample, `byte0[2:0] ++ byte1` 11-bit period,
    /// `byte2` effect, `byte3` argument.
    #[inline]
    pub fn from_packed(bytes: [u8; 4]) -> Self {
        Self {
            sample: bytes[0] >> 3,
            note: ((bytes[0] as u16 & 0x07) << 8) | bytes[1] as u16,
            effect: bytes[2],
            argument: bytes[3],
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == EMPTY_EVENT
    }
}

/// Immutable grid of rows x voices
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    rows: usize,
    voices: usize,
    events: Vec<Event>,
}

impl Pattern {
    /// Empty pattern, every cell silent
    pub fn new(rows: usize, voices: usize) -> Self {
        Self {
            rows,
            voices,
            events: vec![Event::default(); rows * voices],
        }
    }

    /// Decode `rows * voices` packed 4-byte cells, row-major
    pub fn from_packed(data: &[u8], rows: usize, voices: usize) -> Result<Self, ModuleError> {
        let expected = rows * voices * 4;
        if data.len() != expected {
            return Err(ModuleError::TruncatedData {
                what: "pattern",
                expected,
                got: data.len(),
            });
        }
        let events = data
            .chunks_exact(4)
            .map(|c| Event::from_packed([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self {
            rows,
            voices,
            events,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn voices(&self) -> usize {
        self.voices
    }

    /// Cell at (row, voice); outside the grid reads as an empty event
    pub fn event(&self, row: usize, voice: usize) -> &Event {
        if row < self.rows && voice < self.voices {
            &self.events[row * self.voices + voice]
        } else {
            &EMPTY_EVENT
        }
    }

    /// Builder-side write; patterns are read-only once stored
    pub fn set(&mut self, row: usize, voice: usize, event: Event) -> &mut Self {
        if row < self.rows && voice < self.voices {
            self.events[row * self.voices + voice] = event;
        }
        self
    }

    /// (voice index, event) pairs of one row
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, &Event)> {
        (0..self.voices).map(move |voice| (voice, self.event(row, voice)))
    }
}

/// Every decoded pattern of a module
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatternStore {
    patterns: Vec<Pattern>,
}

impl PatternStore {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    pub fn get(&self, index: usize) -> Option<&Pattern> {
        self.patterns.get(index)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }
}
