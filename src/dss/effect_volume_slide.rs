use super::effect::{apply_volume, apply_volume_all};
use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::helper::{add_volume, clamp_up, sub_volume, MAX_VOLUME};

fn add_voice_volume(ctx: &mut RowContext<'_, DssVoice>, v: usize, amount: u8) {
    let voice = &mut ctx.voices[v];
    add_volume(&mut voice.volume, amount);
    apply_volume(ctx.info.inverse_master_volume, voice, ctx.sinks.voice(v));
}

fn sub_voice_volume(ctx: &mut RowContext<'_, DssVoice>, v: usize, amount: u8) {
    let voice = &mut ctx.voices[v];
    sub_volume(&mut voice.volume, amount);
    apply_volume(ctx.info.inverse_master_volume, voice, ctx.sinks.voice(v));
}

// Master volume is kept as an attenuation: louder lowers it
fn add_master_volume(ctx: &mut RowContext<'_, DssVoice>, amount: u8) {
    sub_volume(&mut ctx.info.inverse_master_volume, amount);
    apply_volume_all(ctx);
}

fn sub_master_volume(ctx: &mut RowContext<'_, DssVoice>, amount: u8) {
    add_volume(&mut ctx.info.inverse_master_volume, amount);
    apply_volume_all(ctx);
}

/* 03xx: Set volume */
pub fn row_set_volume(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    voice.volume = voice.effect_arg;
    clamp_up(&mut voice.volume, MAX_VOLUME);
    apply_volume(ctx.info.inverse_master_volume, voice, ctx.sinks.voice(v));
}

/* 04xx: Set master volume, heard from the next volume update on */
pub fn row_set_master_volume(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    if let Some(inverse) = MAX_VOLUME.checked_sub(ctx.voices[v].effect_arg) {
        ctx.info.inverse_master_volume = inverse;
    }
}

/* 0Cxx: Volume up */
pub fn row_volume_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    if amount != 0 {
        add_voice_volume(ctx, v, amount);
    }
}

/* 0Dxx: Volume down */
pub fn row_volume_down(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    if amount != 0 {
        sub_voice_volume(ctx, v, amount);
    }
}

/* 0Exx: Volume slide up */
pub fn tick_volume_slide_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    add_voice_volume(ctx, v, amount);
}

/* 0Fxx: Volume slide down */
pub fn tick_volume_slide_down(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    sub_voice_volume(ctx, v, amount);
}

/* 10xx: Master volume up */
pub fn row_master_volume_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    if amount != 0 {
        add_master_volume(ctx, amount);
    }
}

/* 11xx: Master volume down */
pub fn row_master_volume_down(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    if amount != 0 {
        sub_master_volume(ctx, amount);
    }
}

/* 12xx: Master volume slide up */
pub fn tick_master_volume_slide_up(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let amount = ctx.voices[v].effect_arg;
    add_master_volume(ctx, amount);
}

/* 13xx: Master volume slide down */
pub fn tick_master_volume_slide_down(
    _module: &DssModule,
    ctx: &mut RowContext<'_, DssVoice>,
    v: usize,
) {
    let amount = ctx.voices[v].effect_arg;
    sub_master_volume(ctx, amount);
}
