use std::fmt::Debug;

use crate::notification::{InfoChanged, InfoLine};
use crate::playing_info::GlobalPlayingInfo;
use crate::voice_sink::VoiceBank;

/// Side effects of one tick that the engine acts on after the format ran
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickEvents {
    pub changed: InfoChanged,
    /// Position entered on this tick, checked against the visited set
    pub entered_position: Option<u16>,
}

impl TickEvents {
    pub fn enter_position(&mut self, position: u16) {
        self.entered_position = Some(position);
        self.changed |= InfoChanged::POSITION | InfoChanged::PATTERN;
    }

    pub fn mark(&mut self, changed: InfoChanged) {
        self.changed |= changed;
    }
}

/// Everything a format handler may touch during one tick.
/// Voices are reached by index, never through back-references.
pub struct RowContext<'a, V> {
    pub info: &'a mut GlobalPlayingInfo,
    pub voices: &'a mut [V],
    pub sinks: &'a mut dyn VoiceBank,
    pub events: &'a mut TickEvents,
}

/// A module format: decodes rows and runs its continuous effects.
///
/// The [`Engine`](crate::engine::Engine) owns the tick counter, end detection,
/// snapshots and notifications and calls into the format for the rest.
pub trait EventSource: Send + Sync {
    /// Per-voice playing state of the format
    type Voice: Clone + Debug + PartialEq + Send;

    /// Voices driven each tick
    const VOICES: usize;
    /// Short format tag, recorded in snapshots
    const FORMAT: &'static str;

    fn sequence_len(&self) -> usize;

    /// State at the first row boundary of a song starting at `start_position`
    fn initial_state(&self, start_position: usize) -> (GlobalPlayingInfo, Vec<Self::Voice>);

    /// Row boundary: read the next row and apply its notes and effects
    fn next_row_events(&self, ctx: &mut RowContext<'_, Self::Voice>);

    /// Tick between row boundaries
    fn continuous_step(&self, ctx: &mut RowContext<'_, Self::Voice>);

    /// Pattern number shown for the current position, if the format has one
    fn pattern_at(&self, info: &GlobalPlayingInfo) -> Option<usize>;

    /// Status line id of `line`, `None` if the format does not show it
    fn info_line_id(&self, line: InfoLine) -> Option<usize>;

    /// Static and live description lines
    fn describe(&self, info: &GlobalPlayingInfo) -> Vec<(&'static str, String)>;
}
