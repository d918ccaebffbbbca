use super::effect::play_sample;
use super::module::DssModule;
use super::voice::DssVoice;
use crate::event_source::RowContext;
use crate::period_helper::adjust_fine_tune;

/* 16xx: Retrigger every xx ticks */
pub fn tick_retrig_note(module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let tick = ctx.info.tick;
    let speed = ctx.info.speed;
    let voice = &mut ctx.voices[v];
    let every = voice.effect_arg as u16;
    if every >= speed {
        return;
    }
    if voice.retrig_tick == 0 {
        voice.retrig_tick = every;
    }
    if tick == voice.retrig_tick {
        voice.retrig_tick += every;
        play_sample(module, voice, ctx.sinks.voice(v));
    }
}

/* 17xx: Note delay, start the note on tick xx */
pub fn tick_note_delay(module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let tick = ctx.info.tick;
    let speed = ctx.info.speed;
    let voice = &mut ctx.voices[v];
    let delay = voice.effect_arg as u16;
    if delay >= speed || delay != tick || voice.sample == 0 {
        return;
    }
    let sink = ctx.sinks.voice(v);
    if voice.period != 0 {
        voice.pitch_period = adjust_fine_tune(voice.period, voice.fine_tune);
        sink.set_pitch_period(voice.pitch_period);
    }
    play_sample(module, voice, sink);
}

/* 18xx: Note cut on tick xx */
pub fn tick_note_cut(_module: &DssModule, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
    let tick = ctx.info.tick;
    let speed = ctx.info.speed;
    let voice = &mut ctx.voices[v];
    let at = voice.effect_arg as u16;
    if at < speed && at == tick {
        voice.volume = 0;
        ctx.sinks.voice(v).mute();
    }
}

/* 19xx: Sample offset, xx * 128 words, applied before the trigger */
pub fn apply_sample_offset(voice: &mut DssVoice) {
    if voice.effect_arg != 0 {
        voice.sample_offset = (voice.effect_arg as u16) << 7;
    }
    if voice.sample_offset != 0 {
        if voice.sample_offset >= voice.sample_length {
            voice.sample_length = 0;
        } else {
            voice.sample_length -= voice.sample_offset;
            voice.sample_start_offset += voice.sample_offset as u32 * 2;
        }
    }
}

/* 1Axx: Fine-tune */
pub fn apply_fine_tune(voice: &mut DssVoice) {
    voice.fine_tune = voice.effect_arg & 0x0f;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_offset_truncates() {
        let mut voice = DssVoice {
            effect_arg: 2,
            sample_length: 1000,
            sample_start_offset: 10,
            ..DssVoice::new()
        };
        apply_sample_offset(&mut voice);
        assert_eq!(voice.sample_length, 744);
        assert_eq!(voice.sample_start_offset, 522);

        // remembered offset beyond the sample silences it
        voice.effect_arg = 0;
        voice.sample_length = 200;
        apply_sample_offset(&mut voice);
        assert_eq!(voice.sample_length, 0);
    }

    #[test]
    fn fine_tune_keeps_low_nibble() {
        let mut voice = DssVoice {
            effect_arg: 0x3c,
            ..DssVoice::new()
        };
        apply_fine_tune(&mut voice);
        assert_eq!(voice.fine_tune, 0x0c);
    }
}
