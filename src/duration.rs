use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::event_source::EventSource;
use crate::snapshot::{Snapshot, SnapshotManager};
use crate::visited::PositionVisitedTracker;
use crate::voice_sink::NullSink;

/// Engine state recorded at `time` into a sub-song
#[derive(Clone, Debug)]
pub struct PositionSnapshot<V> {
    pub time: Duration,
    pub snapshot: Snapshot<V>,
    /// Positions this sub-song had entered when the snapshot was taken
    pub visited: PositionVisitedTracker,
}

/// Result of scanning one sub-song
#[derive(Clone, Debug)]
pub struct SubSongDuration<V> {
    pub start_position: usize,
    /// Time until the song first repeats a position
    pub total: Duration,
    /// Position the song goes back to when it ends
    pub restart_position: usize,
    /// First entry time of every position, `None` if this sub-song never plays it
    pub position_times: Vec<Option<Duration>>,
    /// Ordered by time, the first one sits at the start
    pub snapshots: Vec<PositionSnapshot<V>>,
}

impl<V> SubSongDuration<V> {
    pub fn plays(&self, position: usize) -> bool {
        matches!(self.position_times.get(position), Some(Some(_)))
    }

    pub fn position_time(&self, position: usize) -> Option<Duration> {
        self.position_times.get(position).copied().flatten()
    }

    /// Latest snapshot at or before `time`
    pub fn snapshot_before(&self, time: Duration) -> Option<&PositionSnapshot<V>> {
        self.snapshots
            .iter()
            .rev()
            .find(|s| s.time <= time)
            .or_else(|| self.snapshots.first())
    }

    fn visited(&self) -> PositionVisitedTracker {
        let mut visited = PositionVisitedTracker::new(self.position_times.len());
        for (position, time) in self.position_times.iter().enumerate() {
            if time.is_some() {
                visited.mark_visited(position);
            }
        }
        visited
    }
}

/// Plays a module silently to find its sub-songs and their lengths
pub struct DurationScanner {
    config: PlayerConfig,
}

impl DurationScanner {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    /// Scan every sub-song. Each one starts at the first position no earlier
    /// sub-song reached; there is always at least one.
    pub fn scan<S: EventSource>(&self, source: &Arc<S>) -> Result<Vec<SubSongDuration<S::Voice>>> {
        let mut owned = PositionVisitedTracker::new(source.sequence_len());
        let mut songs = Vec::new();
        while let Some(start) = owned.first_unvisited() {
            let song = self.scan_sub_song(source, start, &owned)?;
            owned.merge(&song.visited());
            owned.mark_visited(start);
            songs.push(song);
        }
        info!(
            format = S::FORMAT,
            sub_songs = songs.len(),
            total_ms = songs.first().map_or(0, |s| s.total.as_millis() as u64),
            "duration scan finished"
        );
        Ok(songs)
    }

    /// Scan the sub-song starting at `start`. Positions in `owned` belong to
    /// earlier sub-songs and end this one when entered.
    pub fn scan_sub_song<S: EventSource>(
        &self,
        source: &Arc<S>,
        start: usize,
        owned: &PositionVisitedTracker,
    ) -> Result<SubSongDuration<S::Voice>> {
        let len = source.sequence_len();
        let mut engine = Engine::new(Arc::clone(source));
        engine.init_with_visited(start, owned.clone())?;
        let mut sinks = vec![NullSink; S::VOICES];

        let mut song = SubSongDuration {
            start_position: start,
            total: Duration::ZERO,
            restart_position: start,
            position_times: vec![None; len],
            snapshots: Vec::new(),
        };
        song.position_times[start] = Some(Duration::ZERO);
        song.snapshots.push(PositionSnapshot {
            time: Duration::ZERO,
            snapshot: engine.capture()?,
            visited: song.visited(),
        });

        let interval = self.config.snapshot_interval.max(Duration::from_millis(1));
        let mut next_snapshot = interval;
        let mut time = Duration::ZERO;
        let mut ticks = 0u64;
        loop {
            if ticks >= self.config.max_scan_ticks {
                warn!(start, ticks, "duration scan found no end");
                return Err(EngineError::ScanTimeout { ticks });
            }
            let at = time;
            time += engine.tick_duration();
            let outcome = engine.tick(&mut sinks)?;
            ticks += 1;

            if outcome.end_reached {
                song.total = at;
                song.restart_position = outcome.entered_position.unwrap_or(start);
                break;
            }
            if let Some(position) = outcome.entered_position {
                if let Some(slot) = song.position_times.get_mut(position) {
                    slot.get_or_insert(at);
                }
            }
            if time >= next_snapshot {
                song.snapshots.push(PositionSnapshot {
                    time,
                    snapshot: engine.capture()?,
                    visited: song.visited(),
                });
                next_snapshot += interval;
            }
        }

        debug!(
            start,
            ticks,
            total_ms = song.total.as_millis() as u64,
            restart = song.restart_position,
            snapshots = song.snapshots.len(),
            "sub-song scanned"
        );
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dss::{DssEffect, DssModule, DSS_ROWS, DSS_VOICES};
    use crate::pattern::{Event, Pattern};

    const TICK: Duration = Duration::from_millis(20);

    fn song(speed: u8, sequence: &[u16], patterns: Vec<Pattern>) -> Arc<DssModule> {
        Arc::new(DssModule::new(125, speed, vec![], sequence, patterns).unwrap())
    }

    #[test]
    fn straight_song_lasts_every_row() {
        let m = song(1, &[0, 0], vec![Pattern::new(4, DSS_VOICES)]);
        let songs = DurationScanner::new(PlayerConfig::default()).scan(&m).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].total, TICK * 8);
        assert_eq!(songs[0].restart_position, 0);
        assert_eq!(songs[0].position_time(1), Some(TICK * 4));
    }

    #[test]
    fn unreached_positions_form_sub_songs() {
        // position 0 jumps onto itself, 1 and 2 are left for a second song
        let mut looping = Pattern::new(1, DSS_VOICES);
        looping.set(
            0,
            0,
            Event {
                effect: DssEffect::PositionJump as u8,
                argument: 1,
                ..Default::default()
            },
        );
        let plain = Pattern::new(1, DSS_VOICES);
        let m = song(1, &[0, 1, 1], vec![looping, plain]);
        let songs = DurationScanner::new(PlayerConfig::default()).scan(&m).unwrap();
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].start_position, 0);
        assert_eq!(songs[0].total, TICK);
        assert!(!songs[0].plays(1));
        assert_eq!(songs[1].start_position, 1);
        assert!(songs[1].plays(2));
        // the second song wraps into a position of the first and stops there
        assert_eq!(songs[1].restart_position, 0);
        assert_eq!(songs[1].total, TICK * 2);
    }

    #[test]
    fn snapshots_follow_the_interval() {
        let m = song(6, &[0, 0, 0, 0], vec![Pattern::new(DSS_ROWS, DSS_VOICES)]);
        let config = PlayerConfig::default().with_snapshot_interval(Duration::from_secs(1));
        let songs = DurationScanner::new(config).scan(&m).unwrap();
        let song = &songs[0];
        assert_eq!(song.total, TICK * (4 * 64 * 6));
        assert_eq!(song.snapshots.len(), 31);
        assert_eq!(song.snapshots[0].time, Duration::ZERO);
        assert!(song.snapshots.windows(2).all(|w| w[0].time < w[1].time));
        let near = song.snapshot_before(Duration::from_millis(2500)).unwrap();
        assert_eq!(near.time, Duration::from_secs(2));
        assert_eq!(near.snapshot.info().position, 0);
    }

    #[test]
    fn endless_scan_times_out() {
        let m = song(1, &[0, 0], vec![Pattern::new(DSS_ROWS, DSS_VOICES)]);
        let config = PlayerConfig::default().with_max_scan_ticks(10);
        let err = DurationScanner::new(config).scan(&m).unwrap_err();
        assert_eq!(err, EngineError::ScanTimeout { ticks: 10 });
    }
}
