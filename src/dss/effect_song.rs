use tracing::debug;

use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::notification::InfoChanged;

/// Lowest tempo the set-tempo effect accepts
pub const MIN_TEMPO: u8 = 28;

/* 05xx: Set speed */
pub fn row_set_speed(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let speed = ctx.voices[v].effect_arg;
    if speed != 0 {
        ctx.info.speed = speed as u16;
        ctx.info.reset_row_counters();
        ctx.voices.iter_mut().for_each(|voice| voice.retrig_tick = 0);
        ctx.events.mark(InfoChanged::SPEED);
        debug!(speed, "speed changed");
    }
}

/* 0Bxx: Set tempo */
pub fn row_set_tempo(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let tempo = ctx.voices[v].effect_arg;
    if tempo >= MIN_TEMPO {
        ctx.info.tempo = tempo as u16;
        ctx.info.reset_row_counters();
        ctx.voices.iter_mut().for_each(|voice| voice.retrig_tick = 0);
        ctx.events.mark(InfoChanged::TEMPO);
        debug!(tempo, "tempo changed");
    }
}

/* 06xx: Position jump. 0 or FF breaks to the next position, 1..=length
 * jumps to position xx-1, anything else is ignored */
pub fn row_position_jump(module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let arg = ctx.voices[v].effect_arg;
    let length = module.sequence().len();
    let target = match arg {
        0 | 0xff => module.sequence().next_position(ctx.info.position as usize),
        a if a as usize <= length => a as usize - 1,
        _ => return,
    };
    ctx.info.jump_target = target as u16;
    ctx.info.position_jump = true;
}

/* 07xx: Filter */
pub fn row_set_filter(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    ctx.info.filter = ctx.voices[v].effect_arg != 0;
}

/* 14xx: Loop start */
pub fn row_set_loop_start(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let row = ctx.info.row;
    let voice = &mut ctx.voices[v];
    if voice.effect_arg != 0 {
        voice.loop_row = Some(row);
    }
}

/* 15xx: Jump to loop, xx times */
pub fn row_jump_to_loop(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let voice = &mut ctx.voices[v];
    if voice.effect_arg == 0 {
        voice.loop_row = None;
        return;
    }
    let Some(loop_row) = voice.loop_row else {
        return;
    };
    if voice.loop_counter == 0 {
        voice.loop_counter = voice.effect_arg;
    } else {
        voice.loop_counter -= 1;
        if voice.loop_counter == 0 {
            voice.loop_row = None;
            return;
        }
    }
    voice.loop_row = None;
    ctx.info.loop_row = loop_row;
    ctx.info.loop_row_pending = true;
}
