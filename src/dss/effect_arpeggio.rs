use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::period_helper::arpeggio_period;

/// Semitone offset for the current tick, `None` on the base-note step
#[inline]
pub fn arpeggio_offset(arpeggio_counter: u16, tick: u16, argument: u8) -> Option<u8> {
    match arpeggio_counter as i32 - tick as i32 {
        0 => None,
        1 => Some(argument & 0x0f),
        _ => Some(argument >> 4),
    }
}

/* 00xy: Arpeggio */
pub fn tick_arpeggio(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &ctx.voices[v];
    let period = match arpeggio_offset(ctx.info.arpeggio_counter, ctx.info.tick, voice.effect_arg) {
        None => voice.pitch_period,
        Some(offset) => arpeggio_period(voice.pitch_period, voice.fine_tune, offset),
    };
    ctx.sinks.voice(v).set_pitch_period(period);
}

/// Move the macro-counter on once its base-note step has been played.
/// Runs once per tick after every voice.
#[inline]
pub fn advance_arpeggio_counter(arpeggio_counter: &mut u16, tick: u16) {
    if *arpeggio_counter == tick {
        *arpeggio_counter += 3;
    }
}
