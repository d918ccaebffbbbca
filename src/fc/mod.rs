//! Four-voice track format. Every voice walks its own track through the
//! sequence; pitch and volume come from per-instrument bytecode sequences.

pub mod effect;
pub mod frequency_sequence;
pub mod module;
mod source;
pub mod voice;
pub mod volume_sequence;

pub use module::{
    track_event, FcModule, FcSample, VolumeSequence, FC_END_MARK, FC_ROWS, FC_VOICES,
    SILENT_SEQUENCE,
};
pub use voice::FcVoice;
