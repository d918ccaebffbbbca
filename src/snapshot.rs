use crate::error::Result;
use crate::notification::Notification;
use crate::playing_info::GlobalPlayingInfo;

/// Live state of an engine: song counters plus every voice
#[derive(Clone, Debug, PartialEq)]
pub struct EngineState<V> {
    pub info: GlobalPlayingInfo,
    pub voices: Vec<V>,
}

/// Deep copy of an [`EngineState`], tagged with the module it came from
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot<V> {
    pub(crate) format: &'static str,
    pub(crate) source_id: usize,
    pub(crate) state: EngineState<V>,
}

impl<V> Snapshot<V> {
    pub fn format(&self) -> &'static str {
        self.format
    }

    pub fn info(&self) -> &GlobalPlayingInfo {
        &self.state.info
    }

    pub fn voices(&self) -> &[V] {
        &self.state.voices
    }

    pub fn state(&self) -> &EngineState<V> {
        &self.state
    }
}

/// Fork and replace live playing state
pub trait SnapshotManager {
    type Snapshot;

    /// Copy of the live state, unaffected by later ticks
    fn capture(&self) -> Result<Self::Snapshot>;

    /// Replace the live state wholesale and return the status lines to refresh
    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<Vec<Notification>>;
}
