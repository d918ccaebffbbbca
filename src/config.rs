use std::time::Duration;

/// Player settings
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerConfig {
    /// Spacing of the snapshots recorded by the duration scan; seeks resume
    /// from the nearest one
    pub snapshot_interval: Duration,
    /// Ticks a duration scan may run before giving up on a sub-song
    pub max_scan_ticks: u64,
    /// Song loops before the player reports itself finished, 0 = forever
    pub max_loop_count: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: Duration::from_secs(2),
            max_scan_ticks: 1_000_000,
            max_loop_count: 0,
        }
    }
}

impl PlayerConfig {
    pub fn with_snapshot_interval(mut self, interval: Duration) -> Self {
        self.snapshot_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_max_scan_ticks(mut self, ticks: u64) -> Self {
        self.max_scan_ticks = ticks;
        self
    }

    pub fn with_max_loop_count(mut self, loops: u8) -> Self {
        self.max_loop_count = loops;
        self
    }
}
