/// The purpose of this module is to alleviate imports of RetroPlayer parts
///
/// ```
/// #![allow(unused_imports)]
/// use retroplayer::prelude::*;
/// ```
///
pub use crate::config::PlayerConfig;
pub use crate::dss::{DssEffect, DssModule, DssSample};
pub use crate::duration::{DurationScanner, SubSongDuration};
pub use crate::engine::{Engine, TickOutcome};
pub use crate::error::{EngineError, ModuleError};
pub use crate::event_source::EventSource;
pub use crate::fc::{FcModule, FcSample, VolumeSequence};
pub use crate::notification::{InfoLine, Notification};
pub use crate::pattern::{Event, Pattern};
pub use crate::player::RetroPlayer;
pub use crate::sequence::{SequenceEntry, TrackRef};
pub use crate::snapshot::{Snapshot, SnapshotManager};
pub use crate::voice_sink::{NullSink, RecordingSink, SampleData, VirtualVoiceSink};
