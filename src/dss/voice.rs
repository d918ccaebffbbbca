/// Playing state of one DSS voice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DssVoice {
    // Latched from the current row
    pub sample: u8,
    pub period: u16,
    pub effect: u8,
    pub effect_arg: u8,

    /// 0-based slot of the sample last selected
    pub playing_sample: Option<u8>,
    pub sample_start_offset: u32,
    /// Words
    pub sample_length: u16,
    /// Bytes, absolute
    pub loop_start: u32,
    /// Words, 0 = no loop
    pub loop_length: u16,
    pub fine_tune: u8,
    pub volume: u8,

    /// Period sent to the voice before glissando rounding
    pub pitch_period: u16,

    /// Latched portamento target, cleared on arrival
    pub portamento_target: Option<u16>,
    /// Portamento lowers the period (raises the pitch)
    pub portamento_down: bool,
    pub portamento_speed: u8,
    /// Round slide results to table notes
    pub slide_glissando: bool,
    /// Round portamento results to table notes
    pub portamento_glissando: bool,

    /// Sample offset in words, from the last offset effect
    pub sample_offset: u16,
    /// Row marked by loop start
    pub loop_row: Option<u16>,
    pub loop_counter: u8,
    /// Tick of the next retrigger, 0 = not armed
    pub retrig_tick: u16,
}

impl DssVoice {
    pub fn new() -> Self {
        Self {
            loop_row: Some(0),
            ..Default::default()
        }
    }

    /// Start offset and byte length to trigger, `None` when nothing is playable
    pub fn trigger_range(&self) -> Option<(u32, u32)> {
        if self.playing_sample.is_some() && self.sample_length > 0 {
            Some((
                self.sample_start_offset,
                (self.sample_length as u32 + self.loop_length as u32) * 2,
            ))
        } else {
            None
        }
    }
}
