use thiserror::Error;

/// Errors raised while assembling a module from decoded data.
///
/// A module that fails validation never reaches an [`Engine`](crate::engine::Engine).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// The sequence table holds no position
    #[error("sequence table is empty")]
    EmptySequence,

    /// More positions than the format can address
    #[error("sequence holds {length} positions, format maximum is {max}")]
    SequenceTooLong { length: usize, max: usize },

    /// A sequence entry names a pattern that was not decoded
    #[error("position {position} references missing pattern {pattern}")]
    MissingPattern { position: usize, pattern: usize },

    /// A sequence entry does not carry one track per voice
    #[error("position {position} has {got} tracks, expected {expected}")]
    TrackCount {
        position: usize,
        expected: usize,
        got: usize,
    },

    /// Packed pattern buffer has the wrong size
    #[error("pattern data for {what} is {got} bytes, expected {expected}")]
    TruncatedData {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Pattern shape does not match the format
    #[error("pattern {pattern} is {rows}x{voices}, format needs {voices_expected} voices")]
    PatternShape {
        pattern: usize,
        rows: usize,
        voices: usize,
        voices_expected: usize,
    },

    /// Too many sample slots for the format
    #[error("{got} sample slots, format maximum is {max}")]
    TooManySamples { got: usize, max: usize },
}

/// Host contract violations reported by the engine and the player.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `tick` or `capture` called before `init`
    #[error("engine used before initialization")]
    NotInitialized,

    /// Snapshot captured from another module or format
    #[error("snapshot does not belong to this engine: {reason}")]
    ForeignSnapshot { reason: &'static str },

    /// Fewer voice sinks than the format drives
    #[error("format drives {expected} voices, host supplied {got}")]
    VoiceCountMismatch { expected: usize, got: usize },

    /// Start or seek position outside the sequence
    #[error("position {position} out of range (sequence length {length})")]
    InvalidPosition { position: usize, length: usize },

    /// Sub-song index outside the scanned set
    #[error("sub-song {index} out of range ({available} available)")]
    InvalidSubSong { index: usize, available: usize },

    /// Duration scan did not find an end inside its tick budget
    #[error("duration scan gave up after {ticks} ticks")]
    ScanTimeout { ticks: u64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
