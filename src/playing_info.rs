/// Song-wide counters and pending requests shared by every voice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalPlayingInfo {
    /// Sequence position currently playing
    pub position: u16,
    /// Row that the next row evaluation reads
    pub row: u16,
    /// Tick inside the current row, 0 = row boundary
    pub tick: u16,
    /// Ticks per row
    pub speed: u16,
    /// Beats per minute basis of the tick rate
    pub tempo: u16,

    /// A jump was requested on the row being evaluated
    pub position_jump: bool,
    /// Position entered when the jump fires
    pub jump_target: u16,
    /// Position to enter at the next row boundary
    pub next_position: Option<u16>,

    /// A jump-to-loop was requested on the row being evaluated
    pub loop_row_pending: bool,
    pub loop_row: u16,

    /// Master attenuation, 0 = full volume, 64 = silent
    pub inverse_master_volume: u8,
    /// Arpeggio macro-counter, offset index is `arpeggio_counter - tick`
    pub arpeggio_counter: u16,
    /// Output filter switch, forwarded to the host untouched
    pub filter: bool,

    /// Voice pattern advances since the last speed reload (track formats)
    pub advance_counter: u8,
}

impl GlobalPlayingInfo {
    pub fn new(position: u16, speed: u16, tempo: u16) -> Self {
        Self {
            position,
            speed,
            tempo,
            arpeggio_counter: 3,
            ..Default::default()
        }
    }

    /// Restart row-local counters at a row boundary or speed change
    pub fn reset_row_counters(&mut self) {
        self.tick = 0;
        self.arpeggio_counter = 3;
    }

    /// Ticks per second: 125 BPM gives 50 Hz
    pub fn ticks_per_second(&self) -> f64 {
        self.tempo.max(1) as f64 * 2.0 / 5.0
    }

    /// Duration of one tick at the current tempo
    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_nanos(2_500_000_000 / self.tempo.max(1) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn tempo_to_tick_rate() {
        let info = GlobalPlayingInfo::new(0, 6, 125);
        assert_eq!(info.tick_duration(), Duration::from_millis(20));
        assert!((info.ticks_per_second() - 50.0).abs() < f64::EPSILON);
        assert_eq!(info.arpeggio_counter, 3);
    }
}
