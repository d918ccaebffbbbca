use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::effect_arpeggio::tick_arpeggio;
use super::effect_note::{tick_note_cut, tick_note_delay, tick_retrig_note};
use super::effect_portamento::{
    row_pitch_control, row_pitch_down, row_pitch_up, row_portamento_control, tick_portamento,
    tick_portamento_volume_down, tick_portamento_volume_up, tick_slide_down, tick_slide_up,
};
use super::effect_song::{
    row_jump_to_loop, row_position_jump, row_set_filter, row_set_loop_start, row_set_speed,
    row_set_tempo,
};
use super::effect_volume_slide::{
    row_master_volume_down, row_master_volume_up, row_set_master_volume, row_set_volume,
    row_volume_down, row_volume_up, tick_master_volume_slide_down, tick_master_volume_slide_up,
    tick_volume_slide_down, tick_volume_slide_up,
};
use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::period_helper::adjust_for_tone_portamento;
use crate::voice_sink::{SampleData, VirtualVoiceSink};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum DssEffect {
    Arpeggio = 0x00,
    SlideUp = 0x01,
    SlideDown = 0x02,
    SetVolume = 0x03,
    SetMasterVolume = 0x04,
    SetSongSpeed = 0x05,
    PositionJump = 0x06,
    SetFilter = 0x07,
    PitchUp = 0x08,
    PitchDown = 0x09,
    PitchControl = 0x0a,
    SetSongTempo = 0x0b,
    VolumeUp = 0x0c,
    VolumeDown = 0x0d,
    VolumeSlideUp = 0x0e,
    VolumeSlideDown = 0x0f,
    MasterVolumeUp = 0x10,
    MasterVolumeDown = 0x11,
    MasterVolumeSlideUp = 0x12,
    MasterVolumeSlideDown = 0x13,
    SetLoopStart = 0x14,
    JumpToLoop = 0x15,
    RetrigNote = 0x16,
    NoteDelay = 0x17,
    NoteCut = 0x18,
    SetSampleOffset = 0x19,
    SetFineTune = 0x1a,
    Portamento = 0x1b,
    PortamentoVolumeSlideUp = 0x1c,
    PortamentoVolumeSlideDown = 0x1d,
    PortamentoControl = 0x1e,
}

impl DssEffect {
    #[inline]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::from_u8(code)
    }

    /// Effects that latch a portamento target instead of triggering the note
    pub fn is_portamento(self) -> bool {
        matches!(
            self,
            DssEffect::Portamento
                | DssEffect::PortamentoVolumeSlideUp
                | DssEffect::PortamentoVolumeSlideDown
        )
    }
}

pub type EffectHandler = fn(&DssModule, &mut RowContext<'_, DssVoice>, usize);

/// Where a row handler runs relative to the row volume update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowStage {
    BeforeVolume,
    /// The handler sets the volume itself, no row volume update follows
    ReplacesVolume,
    AfterVolume,
}

pub struct EffectEntry {
    pub effect: DssEffect,
    pub row_stage: RowStage,
    pub on_row: Option<EffectHandler>,
    pub on_tick: Option<EffectHandler>,
    /// Continuous handler only runs with a non-zero argument
    pub tick_needs_arg: bool,
}

const fn entry(
    effect: DssEffect,
    row_stage: RowStage,
    on_row: Option<EffectHandler>,
    on_tick: Option<EffectHandler>,
) -> EffectEntry {
    EffectEntry {
        effect,
        row_stage,
        on_row,
        on_tick,
        tick_needs_arg: true,
    }
}

use RowStage::*;

/// Effect code to handlers, indexed by code
pub static EFFECT_TABLE: [EffectEntry; 31] = [
    entry(DssEffect::Arpeggio, AfterVolume, None, Some(tick_arpeggio)),
    entry(DssEffect::SlideUp, AfterVolume, None, Some(tick_slide_up)),
    entry(DssEffect::SlideDown, AfterVolume, None, Some(tick_slide_down)),
    entry(DssEffect::SetVolume, ReplacesVolume, Some(row_set_volume), None),
    entry(DssEffect::SetMasterVolume, BeforeVolume, Some(row_set_master_volume), None),
    entry(DssEffect::SetSongSpeed, AfterVolume, Some(row_set_speed), None),
    entry(DssEffect::PositionJump, AfterVolume, Some(row_position_jump), None),
    entry(DssEffect::SetFilter, AfterVolume, Some(row_set_filter), None),
    entry(DssEffect::PitchUp, AfterVolume, Some(row_pitch_up), None),
    entry(DssEffect::PitchDown, AfterVolume, Some(row_pitch_down), None),
    entry(DssEffect::PitchControl, AfterVolume, Some(row_pitch_control), None),
    entry(DssEffect::SetSongTempo, AfterVolume, Some(row_set_tempo), None),
    entry(DssEffect::VolumeUp, BeforeVolume, Some(row_volume_up), None),
    entry(DssEffect::VolumeDown, BeforeVolume, Some(row_volume_down), None),
    entry(DssEffect::VolumeSlideUp, AfterVolume, None, Some(tick_volume_slide_up)),
    entry(DssEffect::VolumeSlideDown, AfterVolume, None, Some(tick_volume_slide_down)),
    entry(DssEffect::MasterVolumeUp, BeforeVolume, Some(row_master_volume_up), None),
    entry(DssEffect::MasterVolumeDown, BeforeVolume, Some(row_master_volume_down), None),
    entry(DssEffect::MasterVolumeSlideUp, AfterVolume, None, Some(tick_master_volume_slide_up)),
    entry(DssEffect::MasterVolumeSlideDown, AfterVolume, None, Some(tick_master_volume_slide_down)),
    entry(DssEffect::SetLoopStart, AfterVolume, Some(row_set_loop_start), None),
    entry(DssEffect::JumpToLoop, AfterVolume, Some(row_jump_to_loop), None),
    entry(DssEffect::RetrigNote, AfterVolume, None, Some(tick_retrig_note)),
    entry(DssEffect::NoteDelay, AfterVolume, None, Some(tick_note_delay)),
    entry(DssEffect::NoteCut, AfterVolume, None, Some(tick_note_cut)),
    // offset and fine-tune are applied while the note is set up
    entry(DssEffect::SetSampleOffset, AfterVolume, None, None),
    entry(DssEffect::SetFineTune, AfterVolume, None, None),
    EffectEntry {
        effect: DssEffect::Portamento,
        row_stage: AfterVolume,
        on_row: None,
        on_tick: Some(tick_portamento),
        tick_needs_arg: false,
    },
    entry(DssEffect::PortamentoVolumeSlideUp, AfterVolume, None, Some(tick_portamento_volume_up)),
    entry(DssEffect::PortamentoVolumeSlideDown, AfterVolume, None, Some(tick_portamento_volume_down)),
    entry(DssEffect::PortamentoControl, AfterVolume, Some(row_portamento_control), None),
];

/// Table entry for an effect code; unknown codes have none
#[inline]
pub fn effect_entry(code: u8) -> Option<&'static EffectEntry> {
    EFFECT_TABLE.get(code as usize)
}

/// PCM of the sample a voice last selected
#[inline]
pub fn sample_data<'m>(module: &'m DssModule, voice: &DssVoice) -> Option<&'m SampleData> {
    voice
        .playing_sample
        .and_then(|slot| module.samples().get(slot as usize))
        .and_then(|s| s.data.as_ref())
}

/// Send the voice volume, attenuated by the master volume
#[inline]
pub fn apply_volume(inverse_master_volume: u8, voice: &DssVoice, sink: &mut dyn VirtualVoiceSink) {
    sink.set_volume(voice.volume.saturating_sub(inverse_master_volume) as u16);
}

pub fn apply_volume_all(ctx: &mut RowContext<'_, DssVoice>) {
    let inverse = ctx.info.inverse_master_volume;
    for (index, voice) in ctx.voices.iter().enumerate() {
        apply_volume(inverse, voice, ctx.sinks.voice(index));
    }
}

/// Send the pitch period, rounded to a note when `glissando` is set
#[inline]
pub fn apply_pitch_period(voice: &DssVoice, glissando: bool, sink: &mut dyn VirtualVoiceSink) {
    let period = if glissando {
        adjust_for_tone_portamento(voice.pitch_period, voice.fine_tune)
    } else {
        voice.pitch_period
    };
    sink.set_pitch_period(period);
}

/// Restart the latched sample including its loop
pub fn play_sample(module: &DssModule, voice: &DssVoice, sink: &mut dyn VirtualVoiceSink) {
    let (Some(data), Some((start, length))) = (sample_data(module, voice), voice.trigger_range())
    else {
        return;
    };
    let id = voice.playing_sample.unwrap_or(0) as u16;
    sink.trigger_sample(id, data, start, length);
    if voice.loop_length != 0 {
        sink.set_loop(voice.loop_start, voice.loop_length as u32 * 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_code() {
        for (code, e) in EFFECT_TABLE.iter().enumerate() {
            assert_eq!(e.effect as usize, code);
            assert_eq!(DssEffect::from_code(code as u8), Some(e.effect));
        }
        assert!(effect_entry(0x1f).is_none());
        assert!(DssEffect::from_code(0x1f).is_none());
    }

    #[test]
    fn only_portamento_ticks_without_argument() {
        let free: Vec<DssEffect> = EFFECT_TABLE
            .iter()
            .filter(|e| e.on_tick.is_some() && !e.tick_needs_arg)
            .map(|e| e.effect)
            .collect();
        assert_eq!(free, vec![DssEffect::Portamento]);
    }
}
