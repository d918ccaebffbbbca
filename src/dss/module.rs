use crate::error::ModuleError;
use crate::pattern::{Pattern, PatternStore};
use crate::sequence::SequenceTable;
use crate::voice_sink::SampleData;

pub const DSS_VOICES: usize = 4;
pub const DSS_ROWS: usize = 64;
pub const DSS_MAX_POSITIONS: usize = 128;
pub const DSS_MAX_SAMPLES: usize = 31;
/// Bytes of one packed pattern
pub const DSS_PATTERN_SIZE: usize = DSS_ROWS * DSS_VOICES * 4;

/// Sample descriptor. Lengths are in 16-bit words, offsets in bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DssSample {
    pub name: String,
    pub start_offset: u32,
    pub length: u16,
    /// Relative to `start_offset`
    pub loop_start: u32,
    /// Loop is active when above 1
    pub loop_length: u16,
    pub fine_tune: u8,
    pub volume: u8,
    pub frequency: u16,
    pub data: Option<SampleData>,
}

/// A decoded 4-voice packed-event module
#[derive(Clone, Debug, PartialEq)]
pub struct DssModule {
    /// Start tempo, 0 selects 125 BPM
    pub tempo: u8,
    /// Start ticks per row
    pub speed: u8,
    samples: Vec<DssSample>,
    sequence: SequenceTable,
    patterns: PatternStore,
}

impl DssModule {
    pub fn new(
        tempo: u8,
        speed: u8,
        mut samples: Vec<DssSample>,
        positions: &[u16],
        patterns: Vec<Pattern>,
    ) -> Result<Self, ModuleError> {
        if positions.is_empty() {
            return Err(ModuleError::EmptySequence);
        }
        if positions.len() > DSS_MAX_POSITIONS {
            return Err(ModuleError::SequenceTooLong {
                length: positions.len(),
                max: DSS_MAX_POSITIONS,
            });
        }
        if samples.len() > DSS_MAX_SAMPLES {
            return Err(ModuleError::TooManySamples {
                got: samples.len(),
                max: DSS_MAX_SAMPLES,
            });
        }
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.voices() != DSS_VOICES || pattern.rows() == 0 {
                return Err(ModuleError::PatternShape {
                    pattern: index,
                    rows: pattern.rows(),
                    voices: pattern.voices(),
                    voices_expected: DSS_VOICES,
                });
            }
        }
        for (position, &pattern) in positions.iter().enumerate() {
            if pattern as usize >= patterns.len() {
                return Err(ModuleError::MissingPattern {
                    position,
                    pattern: pattern as usize,
                });
            }
        }
        for sample in samples.iter_mut() {
            sample.start_offset &= !1;
        }
        Ok(Self {
            tempo,
            speed,
            samples,
            sequence: SequenceTable::from_patterns(positions, DSS_VOICES),
            patterns: PatternStore::new(patterns),
        })
    }

    /// Build from concatenated packed 64-row patterns
    pub fn from_packed(
        tempo: u8,
        speed: u8,
        samples: Vec<DssSample>,
        positions: &[u16],
        pattern_data: &[u8],
    ) -> Result<Self, ModuleError> {
        if pattern_data.len() % DSS_PATTERN_SIZE != 0 {
            return Err(ModuleError::TruncatedData {
                what: "pattern block",
                expected: (pattern_data.len() / DSS_PATTERN_SIZE + 1) * DSS_PATTERN_SIZE,
                got: pattern_data.len(),
            });
        }
        let patterns = pattern_data
            .chunks_exact(DSS_PATTERN_SIZE)
            .map(|chunk| Pattern::from_packed(chunk, DSS_ROWS, DSS_VOICES))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tempo, speed, samples, positions, patterns)
    }

    /// Sample slot for a 1-based pattern sample id
    pub fn sample(&self, id: u8) -> Option<&DssSample> {
        (id as usize)
            .checked_sub(1)
            .and_then(|index| self.samples.get(index))
    }

    pub fn samples(&self) -> &[DssSample] {
        &self.samples
    }

    pub fn sequence(&self) -> &SequenceTable {
        &self.sequence
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// Pattern played at `position`
    pub fn pattern_at_position(&self, position: usize) -> Option<&Pattern> {
        self.sequence
            .get(position)
            .and_then(|entry| self.patterns.get(entry.pattern() as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_missing_pattern() {
        let err = DssModule::new(125, 6, vec![], &[0, 2], vec![Pattern::new(64, 4)]).unwrap_err();
        assert_eq!(
            err,
            ModuleError::MissingPattern {
                position: 1,
                pattern: 2
            }
        );
    }

    #[test]
    fn rejects_wrong_voice_count() {
        let err = DssModule::new(125, 6, vec![], &[0], vec![Pattern::new(64, 3)]).unwrap_err();
        assert!(matches!(err, ModuleError::PatternShape { voices: 3, .. }));
    }

    #[test]
    fn packed_patterns_and_sample_lookup() {
        let data = vec![0u8; DSS_PATTERN_SIZE * 2];
        let sample = DssSample {
            start_offset: 7,
            ..Default::default()
        };
        let m = DssModule::from_packed(0, 6, vec![sample], &[1, 0], &data).unwrap();
        assert_eq!(m.patterns().len(), 2);
        assert_eq!(m.sample(1).map(|s| s.start_offset), Some(6));
        assert!(m.sample(0).is_none());
        assert!(m.sample(2).is_none());
        assert!(DssModule::from_packed(0, 6, vec![], &[0], &data[1..]).is_err());
    }
}
