use super::effect::apply_pitch_period;
use super::effect_volume_slide::{tick_volume_slide_down, tick_volume_slide_up};
use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::period_helper::{adjust_fine_tune, max_period, min_period};
use crate::voice_sink::VirtualVoiceSink;

/// Latch the target of a portamento towards `period`
pub fn setup_portamento(voice: &mut DssVoice, period: u16) {
    let target = adjust_fine_tune(period, voice.fine_tune);
    voice.portamento_down = target < voice.pitch_period;
    voice.portamento_target = if target == voice.pitch_period {
        None
    } else {
        Some(target)
    };
}

/// One portamento step; snaps onto the target and clears it on arrival
pub fn do_portamento(voice: &mut DssVoice, sink: &mut dyn VirtualVoiceSink) {
    let Some(target) = voice.portamento_target else {
        return;
    };
    let speed = voice.portamento_speed as u16;
    let arrived = if voice.portamento_down {
        voice.pitch_period = voice.pitch_period.saturating_sub(speed);
        voice.pitch_period <= target
    } else {
        voice.pitch_period = voice.pitch_period.saturating_add(speed);
        voice.pitch_period >= target
    };
    if arrived {
        voice.pitch_period = target;
        voice.portamento_target = None;
    }
    apply_pitch_period(voice, voice.portamento_glissando, sink);
}

fn slide_up(voice: &mut DssVoice, amount: u8, glissando: bool, sink: &mut dyn VirtualVoiceSink) {
    voice.pitch_period = voice
        .pitch_period
        .saturating_sub(amount as u16)
        .max(min_period(voice.fine_tune));
    apply_pitch_period(voice, glissando, sink);
}

fn slide_down(voice: &mut DssVoice, amount: u8, glissando: bool, sink: &mut dyn VirtualVoiceSink) {
    voice.pitch_period = voice
        .pitch_period
        .saturating_add(amount as u16)
        .min(max_period(voice.fine_tune));
    apply_pitch_period(voice, glissando, sink);
}

/* 01xx: Slide up */
pub fn tick_slide_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    let (amount, glissando) = (voice.effect_arg, voice.slide_glissando);
    slide_up(voice, amount, glissando, ctx.sinks.voice(v));
}

/* 02xx: Slide down */
pub fn tick_slide_down(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    let (amount, glissando) = (voice.effect_arg, voice.slide_glissando);
    slide_down(voice, amount, glissando, ctx.sinks.voice(v));
}

/* 08xx: Pitch up, once on the row, never rounded */
pub fn row_pitch_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    let amount = voice.effect_arg;
    if amount != 0 {
        slide_up(voice, amount, false, ctx.sinks.voice(v));
    }
}

/* 09xx: Pitch down, once on the row, never rounded */
pub fn row_pitch_down(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    let amount = voice.effect_arg;
    if amount != 0 {
        slide_down(voice, amount, false, ctx.sinks.voice(v));
    }
}

/* 0Axx: Glissando for slides */
pub fn row_pitch_control(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    voice.slide_glissando = voice.effect_arg != 0;
}

/* 1Bxx: Portamento */
pub fn tick_portamento(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    if voice.effect_arg != 0 {
        voice.portamento_speed = voice.effect_arg;
    }
    do_portamento(voice, ctx.sinks.voice(v));
}

/* 1Cxx: Portamento + volume slide up */
pub fn tick_portamento_volume_up(module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    do_portamento(&mut ctx.voices[v], ctx.sinks.voice(v));
    tick_volume_slide_up(module, ctx, v);
}

/* 1Dxx: Portamento + volume slide down */
pub fn tick_portamento_volume_down(module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    do_portamento(&mut ctx.voices[v], ctx.sinks.voice(v));
    tick_volume_slide_down(module, ctx, v);
}

/* 1Exx: Glissando for portamento */
pub fn row_portamento_control(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    voice.portamento_glissando = voice.effect_arg != 0;
}
