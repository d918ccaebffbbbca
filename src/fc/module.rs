use crate::error::ModuleError;
use crate::pattern::{Event, Pattern, PatternStore};
use crate::sequence::{SequenceEntry, SequenceTable};
use crate::voice_sink::SampleData;

pub const FC_VOICES: usize = 4;
pub const FC_ROWS: usize = 32;
/// Note value that ends a pattern early
pub const FC_END_MARK: u8 = 0x49;
pub const FC_SAMPLE_SLOTS: usize = 10;
pub const FC_WAVETABLES: usize = 80;
pub const FC_MULTI_SAMPLES: usize = 20;
/// Sample slots plus wavetables, the range addressable from a frequency sequence
pub const FC_INSTRUMENTS: usize = FC_SAMPLE_SLOTS + FC_WAVETABLES;
pub const FC_MAX_POSITIONS: usize = 256;
/// Bytes per frequency sequence
pub const FREQUENCY_BLOCK: usize = 64;
/// Bytecode bytes following the 5-byte volume sequence header
pub const VOLUME_VALUES: usize = 59;

/// Built-in sequence every voice starts on: transpose 1, then end
pub const SILENT_SEQUENCE: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xe1];

/// One instrument slot. Lengths and loop points in bytes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FcSample {
    /// Sample number reported to the voice sink
    pub id: u16,
    pub length: u32,
    pub loop_start: u32,
    /// Loop is active when above 2
    pub loop_length: u32,
    pub data: Option<SampleData>,
    /// Multi-sample pack (up to 20 entries) stored in a slot instead of PCM
    pub multi: Option<Vec<FcSample>>,
}

impl FcSample {
    pub fn new(data: SampleData, loop_start: u32, loop_length: u32) -> Self {
        Self {
            id: 0,
            length: data.len() as u32,
            loop_start,
            loop_length,
            data: Some(data),
            multi: None,
        }
    }

    /// Looping wavetable, the whole table repeats
    pub fn wavetable(data: SampleData) -> Self {
        let length = data.len() as u32;
        Self::new(data, 0, length)
    }

    pub fn multi(pack: Vec<FcSample>) -> Self {
        Self {
            multi: Some(pack),
            ..Default::default()
        }
    }

    /// Loop to program after a trigger, clipped to the sample end
    pub fn loop_range(&self) -> Option<(u32, u32)> {
        if self.loop_length <= 2 {
            return None;
        }
        if self.loop_start + self.loop_length > self.length {
            Some((self.loop_start, self.length.saturating_sub(self.loop_start)))
        } else {
            Some((self.loop_start, self.loop_length))
        }
    }
}

/// Envelope of an instrument: header plus volume bytecode
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VolumeSequence {
    /// Ticks per volume step
    pub speed: u8,
    /// Frequency sequence started with the note
    pub frequency_sequence: u8,
    pub vibrato_speed: i8,
    pub vibrato_depth: i8,
    pub vibrato_delay: u8,
    pub values: Vec<u8>,
}

impl VolumeSequence {
    /// Envelope of the built-in silent instrument
    pub fn silent() -> Self {
        let mut values = vec![0; VOLUME_VALUES];
        values[..4].copy_from_slice(&SILENT_SEQUENCE[4..]);
        Self {
            speed: SILENT_SEQUENCE[0],
            frequency_sequence: SILENT_SEQUENCE[1],
            vibrato_speed: SILENT_SEQUENCE[2] as i8,
            vibrato_depth: SILENT_SEQUENCE[3] as i8,
            vibrato_delay: 0,
            values,
        }
    }

    /// Decode a 64-byte block
    pub fn from_block(block: &[u8]) -> Result<Self, ModuleError> {
        if block.len() != 5 + VOLUME_VALUES {
            return Err(ModuleError::TruncatedData {
                what: "volume sequence",
                expected: 5 + VOLUME_VALUES,
                got: block.len(),
            });
        }
        Ok(Self {
            speed: block[0],
            frequency_sequence: block[1],
            vibrato_speed: block[2] as i8,
            vibrato_depth: block[3] as i8,
            vibrato_delay: block[4],
            values: block[5..].to_vec(),
        })
    }

    /// Bytecode byte; reading past the end gives 0
    #[inline]
    pub fn value(&self, index: usize) -> u8 {
        self.values.get(index).copied().unwrap_or(0)
    }
}

/// A decoded track module: per-voice patterns with transposes, frequency
/// and volume bytecode sequences, sample slots and wavetables.
#[derive(Clone, Debug, PartialEq)]
pub struct FcModule {
    instruments: Vec<FcSample>,
    sample_count: usize,
    wavetable_count: usize,
    sequence: SequenceTable,
    patterns: PatternStore,
    frequency: Vec<u8>,
    volume_sequences: Vec<VolumeSequence>,
}

impl FcModule {
    /// Assemble a module.
    ///
    /// `frequency_data` holds the 64-byte frequency sequences back to back,
    /// `volume_sequences` the instrument envelopes in file order.
    pub fn new(
        samples: Vec<FcSample>,
        wavetables: Vec<FcSample>,
        sequence: Vec<SequenceEntry>,
        patterns: Vec<Pattern>,
        frequency_data: &[u8],
        volume_sequences: Vec<VolumeSequence>,
    ) -> Result<Self, ModuleError> {
        if sequence.is_empty() {
            return Err(ModuleError::EmptySequence);
        }
        if sequence.len() > FC_MAX_POSITIONS {
            return Err(ModuleError::SequenceTooLong {
                length: sequence.len(),
                max: FC_MAX_POSITIONS,
            });
        }
        if samples.len() > FC_SAMPLE_SLOTS {
            return Err(ModuleError::TooManySamples {
                got: samples.len(),
                max: FC_SAMPLE_SLOTS,
            });
        }
        if wavetables.len() > FC_WAVETABLES {
            return Err(ModuleError::TooManySamples {
                got: wavetables.len(),
                max: FC_WAVETABLES,
            });
        }
        for (index, pattern) in patterns.iter().enumerate() {
            if pattern.voices() != 1 || pattern.rows() != FC_ROWS {
                return Err(ModuleError::PatternShape {
                    pattern: index,
                    rows: pattern.rows(),
                    voices: pattern.voices(),
                    voices_expected: 1,
                });
            }
        }
        for (position, entry) in sequence.iter().enumerate() {
            if entry.tracks.len() != FC_VOICES {
                return Err(ModuleError::TrackCount {
                    position,
                    expected: FC_VOICES,
                    got: entry.tracks.len(),
                });
            }
            if let Some(track) = entry
                .tracks
                .iter()
                .find(|t| t.pattern as usize >= patterns.len())
            {
                return Err(ModuleError::MissingPattern {
                    position,
                    pattern: track.pattern as usize,
                });
            }
        }
        for pack in samples.iter().filter_map(|s| s.multi.as_ref()) {
            if pack.len() > FC_MULTI_SAMPLES {
                return Err(ModuleError::TooManySamples {
                    got: pack.len(),
                    max: FC_MULTI_SAMPLES,
                });
            }
        }

        let wavetable_count = wavetables
            .iter()
            .rposition(|w| w.length != 0)
            .map_or(0, |last| last + 1);

        let mut instruments = samples;
        instruments.resize_with(FC_SAMPLE_SLOTS, FcSample::default);
        instruments.extend(wavetables);
        instruments.resize_with(FC_INSTRUMENTS, FcSample::default);
        let sample_count = number_samples(&mut instruments);

        let mut frequency = SILENT_SEQUENCE.to_vec();
        frequency.extend_from_slice(frequency_data);
        frequency.push(0xe1);

        let mut envelopes = Vec::with_capacity(volume_sequences.len() + 1);
        envelopes.push(VolumeSequence::silent());
        envelopes.extend(volume_sequences);

        Ok(Self {
            instruments,
            sample_count,
            wavetable_count,
            sequence: SequenceTable::new(sequence),
            patterns: PatternStore::new(patterns),
            frequency,
            volume_sequences: envelopes,
        })
    }

    /// Decode one 32-row track of (note, info) byte pairs
    pub fn pattern_from_bytes(data: &[u8]) -> Result<Pattern, ModuleError> {
        if data.len() != FC_ROWS * 2 {
            return Err(ModuleError::TruncatedData {
                what: "track pattern",
                expected: FC_ROWS * 2,
                got: data.len(),
            });
        }
        let mut pattern = Pattern::new(FC_ROWS, 1);
        for (row, cell) in data.chunks_exact(2).enumerate() {
            pattern.set(row, 0, track_event(cell[0], cell[1]));
        }
        Ok(pattern)
    }

    /// Slot addressed by a frequency sequence, samples first then wavetables
    pub fn instrument(&self, index: u8) -> Option<&FcSample> {
        self.instruments.get(index as usize)
    }

    pub fn sequence(&self) -> &SequenceTable {
        &self.sequence
    }

    pub fn patterns(&self) -> &PatternStore {
        &self.patterns
    }

    /// Samples the host can play, multi-sample entries counted one by one
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn wavetable_count(&self) -> usize {
        self.wavetable_count
    }

    /// Frequency bytecode at `offset`; reading past the end gives the end command
    #[inline]
    pub fn frequency_byte(&self, offset: usize) -> u8 {
        self.frequency.get(offset).copied().unwrap_or(0xe1)
    }

    pub fn frequency_len(&self) -> usize {
        self.frequency.len()
    }

    /// Instrument envelopes, the silent one at index 0
    pub fn volume_sequence(&self, index: usize) -> &VolumeSequence {
        self.volume_sequences
            .get(index)
            .unwrap_or(&self.volume_sequences[0])
    }

    /// Envelopes loaded from the module, the silent one excluded
    pub fn instrument_count(&self) -> usize {
        self.volume_sequences.len() - 1
    }
}

/// Track cell: `info` bit 7 portamento on, bit 6 portamento off,
/// bits 5..0 instrument
#[inline]
pub fn track_event(note: u8, info: u8) -> Event {
    Event {
        sample: info & 0x3f,
        note: note as u16,
        effect: info & 0xc0,
        argument: info,
    }
}

// Host sample numbers: slots in order, each multi-sample entry taking its
// own number, then the wavetables in use
fn number_samples(instruments: &mut [FcSample]) -> usize {
    let mut next = 0u16;
    let mut count = 0;
    for (index, slot) in instruments.iter_mut().enumerate() {
        if index >= FC_SAMPLE_SLOTS && slot.length == 0 {
            continue;
        }
        match slot.multi.as_mut() {
            Some(pack) => {
                for entry in pack.iter_mut().filter(|e| e.length != 0) {
                    entry.id = next;
                    next += 1;
                    count += 1;
                }
            }
            None => {
                slot.id = next;
                next += 1;
                if index < FC_SAMPLE_SLOTS {
                    count += 1;
                }
            }
        }
    }
    count
}
