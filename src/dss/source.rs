use tracing::{trace, warn};

use super::effect::{apply_volume, effect_entry, sample_data, DssEffect, RowStage};
use super::effect_arpeggio::advance_arpeggio_counter;
use super::effect_note::{apply_fine_tune, apply_sample_offset};
use super::effect_portamento::setup_portamento;
use super::module::{DssModule, DSS_ROWS, DSS_VOICES};
use super::voice::DssVoice;
use crate::event_source::{EventSource, RowContext};
use crate::helper::MAX_VOLUME;
use crate::notification::InfoLine;
use crate::pattern::Event;
use crate::period_helper::{adjust_fine_tune, MUTE_PERIOD};
use crate::playing_info::GlobalPlayingInfo;

const DEFAULT_TEMPO: u8 = 125;
const DEFAULT_SPEED: u8 = 6;

impl DssModule {
    /// Latch the sample selected on the row into the voice
    fn latch_sample(&self, voice: &mut DssVoice) {
        if voice.sample == 0 {
            return;
        }
        voice.loop_start = 0;
        voice.loop_length = 0;
        let Some(sample) = self.sample(voice.sample).filter(|s| s.data.is_some()) else {
            voice.playing_sample = None;
            return;
        };
        voice.playing_sample = Some(voice.sample - 1);
        voice.sample_start_offset = sample.start_offset;
        voice.sample_length = sample.length;
        if sample.loop_length > 1 {
            voice.loop_start = sample.start_offset + sample.loop_start;
            voice.loop_length = sample.loop_length;
        }
        voice.fine_tune = sample.fine_tune & 0x0f;
        voice.volume = sample.volume.min(MAX_VOLUME);
    }

    /// Start the note of the row. Returns `false` when nothing else on the
    /// row concerns this voice.
    fn start_note(&self, ctx: &mut RowContext<'_, DssVoice>, v: usize) -> bool {
        let inverse = ctx.info.inverse_master_volume;
        let voice = &mut ctx.voices[v];
        let sink = ctx.sinks.voice(v);
        let period = voice.period;
        if voice.sample == 0 || period == 0 {
            return true;
        }

        let effect = DssEffect::from_code(voice.effect);
        if effect.is_some_and(DssEffect::is_portamento) {
            setup_portamento(voice, period);
            apply_volume(inverse, voice, sink);
            return false;
        }
        if period == MUTE_PERIOD {
            sink.mute();
            return false;
        }
        match effect {
            Some(DssEffect::SetFineTune) => apply_fine_tune(voice),
            Some(DssEffect::NoteDelay) => {
                apply_volume(inverse, voice, sink);
                return false;
            }
            Some(DssEffect::SetSampleOffset) => apply_sample_offset(voice),
            _ => {}
        }

        match (sample_data(self, voice), voice.trigger_range()) {
            (Some(data), Some((start, length))) => {
                let id = voice.playing_sample.unwrap_or(0) as u16;
                sink.trigger_sample(id, data, start, length);
                voice.pitch_period = adjust_fine_tune(period, voice.fine_tune);
                sink.set_pitch_period(voice.pitch_period);
            }
            _ => sink.mute(),
        }
        true
    }

    /// Row effect of the voice, around the row volume update
    fn row_effect(&self, ctx: &mut RowContext<'_, DssVoice>, v: usize) {
        let entry = effect_entry(ctx.voices[v].effect);
        let stage = entry.map_or(RowStage::AfterVolume, |e| e.row_stage);
        let handler = entry.and_then(|e| e.on_row);

        if stage == RowStage::BeforeVolume {
            if let Some(handler) = handler {
                handler(self, ctx, v);
            }
        }
        if stage == RowStage::ReplacesVolume {
            if let Some(handler) = handler {
                handler(self, ctx, v);
            }
            return;
        }
        let voice = &ctx.voices[v];
        if voice.period != 0 {
            apply_volume(ctx.info.inverse_master_volume, voice, ctx.sinks.voice(v));
        }
        if stage == RowStage::AfterVolume {
            if let Some(handler) = handler {
                handler(self, ctx, v);
            }
        }
    }

    fn setup_voice(&self, ctx: &mut RowContext<'_, DssVoice>, v: usize, event: Event) {
        let voice = &mut ctx.voices[v];
        voice.sample = event.sample;
        voice.period = event.note;
        voice.effect = event.effect;
        voice.effect_arg = event.argument;
        if effect_entry(event.effect).is_none() && event.effect != 0 {
            trace!(voice = v, effect = event.effect, "unknown effect ignored");
        }
        self.latch_sample(voice);

        if self.start_note(ctx, v) {
            self.row_effect(ctx, v);
        }
    }

    /// Queue loops that take over once the triggered samples end
    fn switch_loops(&self, ctx: &mut RowContext<'_, DssVoice>) {
        for (v, voice) in ctx.voices.iter().enumerate() {
            if voice.effect == DssEffect::NoteDelay as u8 || voice.loop_length == 0 {
                continue;
            }
            if let Some(data) = sample_data(self, voice) {
                ctx.sinks
                    .voice(v)
                    .switch_loop(data, voice.loop_start, voice.loop_length as u32 * 2);
            }
        }
    }
}

impl EventSource for DssModule {
    type Voice = DssVoice;

    const VOICES: usize = DSS_VOICES;
    const FORMAT: &'static str = "dss";

    fn sequence_len(&self) -> usize {
        self.sequence().len()
    }

    fn initial_state(&self, start_position: usize) -> (GlobalPlayingInfo, Vec<DssVoice>) {
        let tempo = if self.tempo == 0 {
            DEFAULT_TEMPO
        } else {
            self.tempo
        };
        let speed = if self.speed == 0 {
            warn!("start speed 0, using {}", DEFAULT_SPEED);
            DEFAULT_SPEED
        } else {
            self.speed
        };
        let info = GlobalPlayingInfo::new(start_position as u16, speed as u16, tempo as u16);
        (info, vec![DssVoice::new(); DSS_VOICES])
    }

    fn next_row_events(&self, ctx: &mut RowContext<'_, DssVoice>) {
        if let Some(position) = ctx.info.next_position.take() {
            ctx.info.position = position;
            ctx.events.enter_position(position);
        }
        ctx.info.reset_row_counters();
        ctx.voices.iter_mut().for_each(|voice| voice.retrig_tick = 0);

        let position = ctx.info.position as usize;
        let row = ctx.info.row as usize;
        let pattern = self.pattern_at_position(position);
        let rows = pattern.map_or(DSS_ROWS, |p| p.rows());
        for v in 0..DSS_VOICES.min(ctx.voices.len()) {
            let event = pattern.map(|p| *p.event(row, v)).unwrap_or_default();
            self.setup_voice(ctx, v, event);
        }
        self.switch_loops(ctx);

        let info = &mut *ctx.info;
        if info.loop_row_pending {
            info.loop_row_pending = false;
            info.row = info.loop_row;
        } else {
            info.row += 1;
        }
        if info.row as usize >= rows || info.position_jump {
            let next = if info.position_jump {
                info.jump_target as usize
            } else {
                self.sequence().next_position(position)
            };
            info.position_jump = false;
            info.row = 0;
            info.next_position = Some(next as u16);
            ctx.voices.iter_mut().for_each(|voice| voice.loop_row = None);
            trace!(position, next, "pattern end");
        }
    }

    fn continuous_step(&self, ctx: &mut RowContext<'_, DssVoice>) {
        for v in 0..DSS_VOICES.min(ctx.voices.len()) {
            let voice = &ctx.voices[v];
            if voice.period == 0 {
                continue;
            }
            let Some(entry) = effect_entry(voice.effect) else {
                continue;
            };
            let Some(handler) = entry.on_tick else {
                continue;
            };
            if entry.tick_needs_arg && voice.effect_arg == 0 {
                continue;
            }
            handler(self, ctx, v);
        }
        advance_arpeggio_counter(&mut ctx.info.arpeggio_counter, ctx.info.tick);
    }

    fn pattern_at(&self, info: &GlobalPlayingInfo) -> Option<usize> {
        self.sequence()
            .get(info.position as usize)
            .map(|entry| entry.pattern() as usize)
    }

    fn info_line_id(&self, line: InfoLine) -> Option<usize> {
        Some(match line {
            InfoLine::Position => 3,
            InfoLine::Pattern => 4,
            InfoLine::Speed => 5,
            InfoLine::Tempo => 6,
        })
    }

    fn describe(&self, info: &GlobalPlayingInfo) -> Vec<(&'static str, String)> {
        let pattern = self
            .pattern_at(info)
            .map(|p| p.to_string())
            .unwrap_or_default();
        vec![
            ("Number of positions", self.sequence().len().to_string()),
            ("Used patterns", self.patterns().len().to_string()),
            ("Used samples", self.samples().len().to_string()),
            ("Playing position", info.position.to_string()),
            ("Playing pattern", pattern),
            ("Current speed", info.speed.to_string()),
            ("Current tempo (BPM)", info.tempo.to_string()),
        ]
    }
}
