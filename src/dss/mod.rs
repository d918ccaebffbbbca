//! Four-voice packed-event format: one shared 64-row pattern per position
//! and a table of 31 row and tick effects.

pub mod effect;
pub mod effect_arpeggio;
pub mod effect_note;
pub mod effect_portamento;
pub mod effect_song;
pub mod effect_volume_slide;
pub mod module;
mod source;
pub mod voice;

pub use effect::DssEffect;
pub use module::{DssModule, DssSample, DSS_MAX_POSITIONS, DSS_MAX_SAMPLES, DSS_ROWS, DSS_VOICES};
pub use voice::DssVoice;
