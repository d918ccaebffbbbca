use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, trace};

use crate::error::{EngineError, Result};
use crate::event_source::{EventSource, RowContext, TickEvents};
use crate::notification::{InfoChanged, InfoLine, Notification};
use crate::playing_info::GlobalPlayingInfo;
use crate::snapshot::{EngineState, Snapshot, SnapshotManager};
use crate::visited::PositionVisitedTracker;
use crate::voice_sink::{VirtualVoiceSink, Voices};

/// What happened during one [`Engine::tick`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// The tick was a row boundary
    pub row_evaluated: bool,
    /// A position was entered a second time
    pub end_reached: bool,
    pub entered_position: Option<usize>,
    pub notifications: Vec<Notification>,
}

/// Tick/row state machine shared by every format
pub struct Engine<S: EventSource> {
    source: Arc<S>,
    state: Option<EngineState<S::Voice>>,
    visited: PositionVisitedTracker,
    // visited set to fall back to after an end, the start position excluded
    visited_baseline: PositionVisitedTracker,
    misuse_reported: bool,
}

impl<S: EventSource> Engine<S> {
    /// Engine bound to `source`; call [`Engine::init`] before ticking
    pub fn new(source: Arc<S>) -> Self {
        let len = source.sequence_len();
        Self {
            source,
            state: None,
            visited: PositionVisitedTracker::new(len),
            visited_baseline: PositionVisitedTracker::new(len),
            misuse_reported: false,
        }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Start the song at `start_position` with an empty visited set
    pub fn init(&mut self, start_position: usize) -> Result<()> {
        let baseline = PositionVisitedTracker::new(self.source.sequence_len());
        self.init_with_visited(start_position, baseline)
    }

    /// Start the song at `start_position`, counting `baseline` positions as
    /// already played (positions owned by earlier sub-songs)
    pub fn init_with_visited(
        &mut self,
        start_position: usize,
        baseline: PositionVisitedTracker,
    ) -> Result<()> {
        let length = self.source.sequence_len();
        if start_position >= length {
            return Err(self.report(EngineError::InvalidPosition {
                position: start_position,
                length,
            }));
        }
        let (info, voices) = self.source.initial_state(start_position);
        debug!(
            format = S::FORMAT,
            start_position,
            speed = info.speed,
            tempo = info.tempo,
            "engine init"
        );
        self.state = Some(EngineState { info, voices });
        self.reset_visited(start_position, baseline);
        Ok(())
    }

    fn reset_visited(&mut self, position: usize, baseline: PositionVisitedTracker) {
        self.visited = baseline.clone();
        self.visited.mark_visited(position);
        self.visited_baseline = baseline;
    }

    fn report(&mut self, err: EngineError) -> EngineError {
        if !self.misuse_reported {
            self.misuse_reported = true;
            error!(format = S::FORMAT, "{}", err);
        }
        err
    }

    /// Advance one tick, writing to the host voices.
    ///
    /// Tick 0 of each row reads the next row, the others run continuous effects.
    pub fn tick<V: VirtualVoiceSink>(&mut self, voices: &mut [V]) -> Result<TickOutcome> {
        if self.state.is_none() {
            return Err(self.report(EngineError::NotInitialized));
        }
        if voices.len() < S::VOICES {
            return Err(self.report(EngineError::VoiceCountMismatch {
                expected: S::VOICES,
                got: voices.len(),
            }));
        }
        let state = self.state.as_mut().ok_or(EngineError::NotInitialized)?;

        let mut events = TickEvents::default();
        let mut bank = Voices(voices);
        let row_evaluated = state.info.tick == 0;
        {
            let mut ctx = RowContext {
                info: &mut state.info,
                voices: &mut state.voices,
                sinks: &mut bank,
                events: &mut events,
            };
            if row_evaluated {
                trace!(position = ctx.info.position, row = ctx.info.row, "row");
                self.source.next_row_events(&mut ctx);
            } else {
                self.source.continuous_step(&mut ctx);
            }
        }

        state.info.tick += 1;
        if state.info.tick >= state.info.speed {
            state.info.tick = 0;
        }

        let mut end_reached = false;
        if let Some(position) = events.entered_position {
            let position = position as usize;
            if self.visited.has_been_visited(position) {
                end_reached = true;
                info!(format = S::FORMAT, position, "end of song");
                self.visited = self.visited_baseline.clone();
            } else {
                debug!(position, "position entered");
            }
            self.visited.mark_visited(position);
        }

        let notifications = notifications_for(self.source.as_ref(), &state.info, events.changed);

        Ok(TickOutcome {
            row_evaluated,
            end_reached,
            entered_position: events.entered_position.map(|p| p as usize),
            notifications,
        })
    }

    pub fn info(&self) -> Option<&GlobalPlayingInfo> {
        self.state.as_ref().map(|s| &s.info)
    }

    pub fn voices(&self) -> &[S::Voice] {
        self.state.as_ref().map(|s| s.voices.as_slice()).unwrap_or(&[])
    }

    pub fn position(&self) -> usize {
        self.info().map(|i| i.position as usize).unwrap_or(0)
    }

    pub fn row(&self) -> usize {
        self.info().map(|i| i.row as usize).unwrap_or(0)
    }

    pub fn speed(&self) -> u16 {
        self.info().map(|i| i.speed).unwrap_or(0)
    }

    pub fn tempo(&self) -> u16 {
        self.info().map(|i| i.tempo).unwrap_or(0)
    }

    pub fn filter(&self) -> bool {
        self.info().map(|i| i.filter).unwrap_or(false)
    }

    /// Wall-clock length of the next tick
    pub fn tick_duration(&self) -> Duration {
        self.info()
            .map(|i| i.tick_duration())
            .unwrap_or(Duration::ZERO)
    }

    pub fn visited(&self) -> &PositionVisitedTracker {
        &self.visited
    }

    pub fn describe(&self) -> Vec<(&'static str, String)> {
        match self.info() {
            Some(info) => self.source.describe(info),
            None => Vec::new(),
        }
    }

    fn source_id(&self) -> usize {
        Arc::as_ptr(&self.source) as *const () as usize
    }

    /// Every status line with its current value
    pub fn status(&self) -> Vec<Notification> {
        match self.info() {
            Some(info) => notifications_for(self.source.as_ref(), info, InfoChanged::all()),
            None => Vec::new(),
        }
    }

    /// Restore `snapshot` and replace the visited set with `visited`, the
    /// positions played between the song start and the snapshot
    pub fn restore_with_visited(
        &mut self,
        snapshot: &Snapshot<S::Voice>,
        visited: PositionVisitedTracker,
    ) -> Result<Vec<Notification>> {
        let notifications = self.restore(snapshot)?;
        let position = self.position();
        self.visited = visited;
        self.visited.mark_visited(position);
        Ok(notifications)
    }
}

impl<S: EventSource> SnapshotManager for Engine<S> {
    type Snapshot = Snapshot<S::Voice>;

    fn capture(&self) -> Result<Self::Snapshot> {
        let state = self.state.as_ref().ok_or(EngineError::NotInitialized)?;
        Ok(Snapshot {
            format: S::FORMAT,
            source_id: self.source_id(),
            state: state.clone(),
        })
    }

    fn restore(&mut self, snapshot: &Self::Snapshot) -> Result<Vec<Notification>> {
        if snapshot.format != S::FORMAT {
            return Err(self.report(EngineError::ForeignSnapshot {
                reason: "format differs",
            }));
        }
        if snapshot.source_id != self.source_id() {
            return Err(self.report(EngineError::ForeignSnapshot {
                reason: "captured from another module",
            }));
        }
        let state = snapshot.state.clone();
        let position = state.info.position as usize;
        debug!(position, row = state.info.row, "snapshot restored");
        let notifications = notifications_for(self.source.as_ref(), &state.info, InfoChanged::all());
        self.state = Some(state);
        let baseline = PositionVisitedTracker::new(self.source.sequence_len());
        self.reset_visited(position, baseline);
        Ok(notifications)
    }
}

fn notifications_for<S: EventSource>(
    source: &S,
    info: &GlobalPlayingInfo,
    changed: InfoChanged,
) -> Vec<Notification> {
    InfoLine::ALL
        .iter()
        .filter(|line| changed.contains(line.flag()))
        .filter_map(|&line| {
            let line_id = source.info_line_id(line)?;
            let value = match line {
                InfoLine::Position => info.position.to_string(),
                InfoLine::Pattern => source.pattern_at(info)?.to_string(),
                InfoLine::Speed => info.speed.to_string(),
                InfoLine::Tempo => info.tempo.to_string(),
            };
            Some(Notification {
                line,
                line_id,
                value,
            })
        })
        .collect()
}
