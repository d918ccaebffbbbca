use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::config::PlayerConfig;
use crate::duration::{DurationScanner, SubSongDuration};
use crate::engine::{Engine, TickOutcome};
use crate::error::{EngineError, Result};
use crate::event_source::EventSource;
use crate::notification::Notification;
use crate::voice_sink::{NullSink, VirtualVoiceSink};

/// Host facade: one engine plus the sub-songs found by the duration scan
pub struct RetroPlayer<S: EventSource> {
    engine: Engine<S>,
    config: PlayerConfig,
    sub_songs: Vec<SubSongDuration<S::Voice>>,
    // sub-song playing each position, if any
    owners: Vec<Option<usize>>,
    current: usize,
    elapsed: Duration,
    loop_count: u8,
    misuse_reported: bool,
}

impl<S: EventSource> RetroPlayer<S> {
    /// Scan `source` for sub-songs and get ready to play the first one
    pub fn new(source: Arc<S>, config: PlayerConfig) -> Result<Self> {
        let sub_songs = DurationScanner::new(config.clone()).scan(&source)?;
        let mut owners = vec![None; source.sequence_len()];
        for (index, song) in sub_songs.iter().enumerate() {
            for (position, owner) in owners.iter_mut().enumerate() {
                if owner.is_none() && song.plays(position) {
                    *owner = Some(index);
                }
            }
        }

        let mut engine = Engine::new(source);
        let start = sub_songs.first().map_or(0, |s| s.start_position);
        engine.init(start)?;
        Ok(Self {
            engine,
            config,
            sub_songs,
            owners,
            current: 0,
            elapsed: Duration::ZERO,
            loop_count: 0,
            misuse_reported: false,
        })
    }

    fn report(&mut self, err: EngineError) -> EngineError {
        if !self.misuse_reported {
            self.misuse_reported = true;
            error!(format = S::FORMAT, "{}", err);
        }
        err
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn sub_songs(&self) -> &[SubSongDuration<S::Voice>] {
        &self.sub_songs
    }

    pub fn sub_song(&self) -> usize {
        self.current
    }

    /// Length of the sub-song playing
    pub fn duration(&self) -> Duration {
        self.sub_songs
            .get(self.current)
            .map_or(Duration::ZERO, |s| s.total)
    }

    /// Playing time inside the current sub-song
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn set_max_loop_count(&mut self, max_loop_count: u8) {
        self.config.max_loop_count = max_loop_count;
    }

    pub fn loop_count(&self) -> u8 {
        self.loop_count
    }

    /// The song looped as often as allowed
    pub fn is_finished(&self) -> bool {
        self.config.max_loop_count > 0 && self.loop_count >= self.config.max_loop_count
    }

    pub fn describe(&self) -> Vec<(&'static str, String)> {
        self.engine.describe()
    }

    /// Restart playback at the start of sub-song `index`
    pub fn select_sub_song(&mut self, index: usize) -> Result<Vec<Notification>> {
        let Some(song) = self.sub_songs.get(index) else {
            let available = self.sub_songs.len();
            return Err(self.report(EngineError::InvalidSubSong { index, available }));
        };
        self.engine.init(song.start_position)?;
        debug!(sub_song = index, start = song.start_position, "sub-song selected");
        self.current = index;
        self.elapsed = Duration::ZERO;
        self.loop_count = 0;
        Ok(self.engine.status())
    }

    pub fn tick<V: VirtualVoiceSink>(&mut self, voices: &mut [V]) -> Result<TickOutcome> {
        let length = self.engine.tick_duration();
        let outcome = self.engine.tick(voices)?;
        self.elapsed += length;

        if let Some(position) = outcome.entered_position {
            let owner = self.owners.get(position).copied().flatten();
            if outcome.end_reached {
                self.loop_count = self.loop_count.saturating_add(1);
                info!(loop_count = self.loop_count, position, "song looped");
            }
            let switched = match owner {
                Some(owner) if owner != self.current => {
                    debug!(from = self.current, to = owner, position, "sub-song switch");
                    self.current = owner;
                    true
                }
                _ => false,
            };
            if outcome.end_reached || switched {
                if let Some(at) = self.sub_songs[self.current].position_time(position) {
                    self.elapsed = at + length;
                }
            }
        }
        Ok(outcome)
    }

    /// Jump to `time` into the current sub-song without sounding the skipped
    /// ticks. The host voices are muted; the returned lines describe the new
    /// state.
    pub fn seek_to_time<V: VirtualVoiceSink>(
        &mut self,
        time: Duration,
        voices: &mut [V],
    ) -> Result<Vec<Notification>> {
        if voices.len() < S::VOICES {
            return Err(self.report(EngineError::VoiceCountMismatch {
                expected: S::VOICES,
                got: voices.len(),
            }));
        }
        let song = &self.sub_songs[self.current];
        let time = time.min(song.total);
        let Some(start) = song.snapshot_before(time) else {
            return Err(self.report(EngineError::NotInitialized));
        };
        self.engine
            .restore_with_visited(&start.snapshot, start.visited.clone())?;

        let mut elapsed = start.time;
        let mut silent = vec![NullSink; S::VOICES];
        loop {
            let length = self.engine.tick_duration();
            if elapsed + length > time {
                break;
            }
            let outcome = self.engine.tick(&mut silent)?;
            elapsed += length;
            if outcome.end_reached {
                break;
            }
        }
        self.elapsed = elapsed;
        voices.iter_mut().for_each(|v| v.mute());
        debug!(
            target_ms = time.as_millis() as u64,
            position = self.engine.position(),
            row = self.engine.row(),
            "seek"
        );
        Ok(self.engine.status())
    }

    /// Jump to the first time `position` plays, switching sub-song if
    /// another one owns it
    pub fn seek_to_position<V: VirtualVoiceSink>(
        &mut self,
        position: usize,
        voices: &mut [V],
    ) -> Result<Vec<Notification>> {
        let Some(owner) = self.owners.get(position).copied().flatten() else {
            let length = self.owners.len();
            return Err(self.report(EngineError::InvalidPosition { position, length }));
        };
        if owner != self.current {
            debug!(from = self.current, to = owner, "sub-song switch");
            self.current = owner;
            self.loop_count = 0;
        }
        let time = self.sub_songs[owner]
            .position_time(position)
            .unwrap_or(Duration::ZERO);
        self.seek_to_time(time, voices)
    }
}
