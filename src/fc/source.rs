use tracing::{debug, trace};

use super::effect::tick_voice;
use super::frequency_sequence::sequence_offset;
use super::module::{FcModule, FC_END_MARK, FC_ROWS, FC_VOICES};
use super::voice::FcVoice;
use crate::event_source::{EventSource, RowContext};
use crate::notification::{InfoChanged, InfoLine};
use crate::pattern::Event;
use crate::playing_info::GlobalPlayingInfo;

/// The replay interrupt runs at a fixed 50 Hz
const FC_TEMPO: u16 = 125;
const DEFAULT_SPEED: u8 = 3;
/// Voice advances that make up one position change
const ADVANCES_PER_POSITION: u8 = FC_VOICES as u8;

impl FcModule {
    fn track_cell(&self, voice: &FcVoice, row: usize) -> Event {
        self.patterns()
            .get(voice.pattern as usize)
            .map(|p| *p.event(row, 0))
            .unwrap_or_default()
    }

    /// Move a voice whose track ended to the next position
    fn advance_track(&self, ctx: &mut RowContext<'_, FcVoice>, v: usize) {
        let voice = &mut ctx.voices[v];
        let next = self.sequence().next_position(voice.song_pos as usize);
        let entry = self.sequence().get(next);
        voice.enter_track(next as u16, entry.map(|e| e.track(v)).unwrap_or_default());

        let info = &mut *ctx.info;
        info.advance_counter += 1;
        if info.advance_counter > ADVANCES_PER_POSITION {
            info.advance_counter = 1;
            let speed = entry.map_or(0, |e| e.speed);
            if speed != 0 {
                info.speed = speed as u16;
                ctx.events.mark(InfoChanged::SPEED);
                debug!(speed, position = next, "speed reloaded");
            }
        }
        if v == 0 {
            info.position = next as u16;
            ctx.events.enter_position(next as u16);
        }
    }

    /// Read the next row of one voice's track
    fn new_note(&self, ctx: &mut RowContext<'_, FcVoice>, v: usize) {
        let voice = &ctx.voices[v];
        let pos = voice.pattern_pos as usize;
        if pos >= FC_ROWS || self.track_cell(voice, pos).note == FC_END_MARK as u16 {
            self.advance_track(ctx, v);
        }

        let voice = &mut ctx.voices[v];
        let row = voice.pattern_pos as usize;
        let cell = self.track_cell(voice, row);
        let note = cell.note as u8;
        let info = cell.argument;

        // bit 7 starts a portamento whose value sits in the next row's info
        if note != 0 || info & 0xc0 != 0 {
            if note != 0 {
                voice.pitch = 0;
            }
            voice.portamento = if info & 0x80 != 0 && row + 1 < FC_ROWS {
                self.track_cell(voice, row + 1).argument
            } else {
                0
            };
        }

        let note = note & 0x7f;
        if note != 0 {
            voice.cur_note = note as i8;
            voice.active = false;
            ctx.sinks.voice(v).mute();

            let instrument = (info & 0x3f).wrapping_add(voice.sound_transpose as u8) as usize;
            let envelope = if instrument >= self.instrument_count() {
                0
            } else {
                instrument + 1
            };
            let sequence = self.volume_sequence(envelope);
            voice.volume_sequence = envelope as u16;
            voice.volume_pos = 0;
            voice.volume_counter = sequence.speed;
            voice.volume_speed = sequence.speed;
            voice.volume_sustain = 0;
            voice.vibrato_speed = sequence.vibrato_speed;
            voice.vibrato_flag = 0x40;
            voice.vibrato_depth = sequence.vibrato_depth;
            voice.vibrato_value = sequence.vibrato_depth;
            voice.vibrato_delay = sequence.vibrato_delay as i8;
            voice.frequency_start = sequence_offset(sequence.frequency_sequence) as u16;
            voice.frequency_pos = 0;
            voice.sustain_counter = 0;
            trace!(voice = v, note, envelope, "note");
        }
        voice.pattern_pos += 1;
    }

    fn tick_voices(&self, ctx: &mut RowContext<'_, FcVoice>) {
        for v in 0..FC_VOICES.min(ctx.voices.len()) {
            tick_voice(self, &mut ctx.voices[v], ctx.sinks.voice(v));
        }
    }
}

impl EventSource for FcModule {
    type Voice = FcVoice;

    const VOICES: usize = FC_VOICES;
    const FORMAT: &'static str = "fc";

    fn sequence_len(&self) -> usize {
        self.sequence().len()
    }

    fn initial_state(&self, start_position: usize) -> (GlobalPlayingInfo, Vec<FcVoice>) {
        let entry = self.sequence().get(start_position);
        let speed = match entry.map_or(0, |e| e.speed) {
            0 => DEFAULT_SPEED,
            speed => speed,
        };
        let mut info = GlobalPlayingInfo::new(start_position as u16, speed as u16, FC_TEMPO);
        info.advance_counter = 1;
        let voices = (0..FC_VOICES)
            .map(|v| {
                let track = entry.map(|e| e.track(v)).unwrap_or_default();
                FcVoice::new(start_position as u16, track)
            })
            .collect();
        (info, voices)
    }

    fn next_row_events(&self, ctx: &mut RowContext<'_, FcVoice>) {
        for v in 0..FC_VOICES.min(ctx.voices.len()) {
            self.new_note(ctx, v);
        }
        if let Some(first) = ctx.voices.first() {
            ctx.info.row = first.pattern_pos as u16;
        }
        self.tick_voices(ctx);
    }

    fn continuous_step(&self, ctx: &mut RowContext<'_, FcVoice>) {
        self.tick_voices(ctx);
    }

    fn pattern_at(&self, _info: &GlobalPlayingInfo) -> Option<usize> {
        None
    }

    fn info_line_id(&self, line: InfoLine) -> Option<usize> {
        match line {
            InfoLine::Speed => Some(4),
            InfoLine::Position => Some(5),
            InfoLine::Pattern | InfoLine::Tempo => None,
        }
    }

    fn describe(&self, info: &GlobalPlayingInfo) -> Vec<(&'static str, String)> {
        vec![
            ("Song length", self.sequence().len().to_string()),
            ("Used patterns", self.patterns().len().to_string()),
            ("Supported / used samples", self.sample_count().to_string()),
            ("Used wave tables", self.wavetable_count().to_string()),
            ("Current speed", info.speed.to_string()),
            ("Playing position", info.position.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::Engine;
    use crate::fc::frequency_sequence::{CMD_END, CMD_WAVEFORM};
    use crate::fc::module::{track_event, FcSample, VolumeSequence, VOLUME_VALUES};
    use crate::pattern::Pattern;
    use crate::sequence::{SequenceEntry, TrackRef};
    use crate::voice_sink::{RecordingSink, VoiceCommand};

    fn envelope(values: &[u8]) -> VolumeSequence {
        let mut values = values.to_vec();
        values.resize(VOLUME_VALUES, 0);
        VolumeSequence {
            speed: 1,
            frequency_sequence: 0,
            vibrato_speed: 0,
            vibrato_depth: 0,
            vibrato_delay: 0,
            values,
        }
    }

    fn position(pattern: u16, speed: u8) -> SequenceEntry {
        SequenceEntry {
            tracks: vec![
                TrackRef {
                    pattern,
                    ..Default::default()
                };
                FC_VOICES
            ],
            speed,
        }
    }

    fn module(cells: &[(usize, u8, u8)], sequence: Vec<SequenceEntry>) -> Arc<FcModule> {
        let mut pattern = Pattern::new(FC_ROWS, 1);
        for &(row, note, info) in cells {
            pattern.set(row, 0, track_event(note, info));
        }
        let mut frequency = vec![CMD_WAVEFORM, 10, 0x00, CMD_END];
        frequency.resize(64, CMD_END);
        let wave = FcSample::wavetable(Arc::from(vec![0i8; 32]));
        let m = FcModule::new(
            vec![],
            vec![wave],
            sequence,
            vec![pattern],
            &frequency,
            vec![envelope(&[64, CMD_END])],
        );
        Arc::new(m.unwrap())
    }

    fn start(module: Arc<FcModule>) -> (Engine<FcModule>, Vec<RecordingSink>) {
        let mut engine = Engine::new(module);
        engine.init(0).unwrap();
        (engine, vec![RecordingSink::default(); FC_VOICES])
    }

    #[test]
    fn note_starts_envelope_and_waveform() {
        let m = module(&[(0, 24, 0)], vec![position(0, 3)]);
        let (mut engine, mut sinks) = start(m);
        let outcome = engine.tick(&mut sinks).unwrap();
        assert!(outcome.row_evaluated);
        let commands = sinks[0].take();
        assert_eq!(commands[0], VoiceCommand::Mute);
        assert!(commands.contains(&VoiceCommand::Trigger {
            sample_id: 10,
            start_offset: 0,
            length: 32
        }));
        assert_eq!(sinks[0].period, 428);
        assert_eq!(sinks[0].volume, 64);
        assert_eq!(engine.speed(), 3);
    }

    #[test]
    fn portamento_value_comes_from_next_row() {
        let m = module(&[(0, 24, 0x80), (1, 0, 0x03)], vec![position(0, 3)]);
        let (mut engine, mut sinks) = start(m);
        let mut periods = Vec::new();
        for _ in 0..4 {
            engine.tick(&mut sinks).unwrap();
            periods.push(sinks[0].period);
        }
        assert_eq!(periods, vec![425, 425, 422, 422]);
    }

    #[test]
    fn end_mark_advances_and_reloads_speed() {
        let m = module(&[(1, FC_END_MARK, 0)], vec![position(0, 0), position(0, 2)]);
        let (mut engine, mut sinks) = start(m);

        let first = engine.tick(&mut sinks).unwrap();
        assert_eq!(first.entered_position, None);
        assert_eq!(engine.speed(), 3);

        let mut ticks = 1;
        let entered = loop {
            let outcome = engine.tick(&mut sinks).unwrap();
            ticks += 1;
            if outcome.entered_position.is_some() {
                break outcome;
            }
        };
        assert_eq!(ticks, 4);
        assert_eq!(entered.entered_position, Some(1));
        assert_eq!(engine.speed(), 2);
        assert!(entered
            .notifications
            .iter()
            .any(|n| n.line == InfoLine::Speed && n.line_id == 4 && n.value == "2"));
        assert!(entered
            .notifications
            .iter()
            .any(|n| n.line == InfoLine::Position && n.line_id == 5 && n.value == "1"));
        assert!(!entered.end_reached);

        // one continuous tick, then the end mark wraps to 0 and ends the song
        let a = engine.tick(&mut sinks).unwrap();
        assert!(!a.row_evaluated);
        let b = engine.tick(&mut sinks).unwrap();
        assert!(b.row_evaluated);
        assert!(b.end_reached);
        assert_eq!(b.entered_position, Some(0));
    }

    #[test]
    fn sound_transpose_beyond_envelopes_uses_silent_one() {
        let mut sequence = vec![position(0, 3)];
        sequence[0].tracks[0].sound_transpose = 5;
        let m = module(&[(0, 24, 0)], sequence);
        let (mut engine, mut sinks) = start(m);
        engine.tick(&mut sinks).unwrap();
        assert_eq!(engine.voices()[0].volume_sequence, 0);
        assert_eq!(engine.voices()[1].volume_sequence, 1);
        assert_eq!(sinks[0].volume, 0);
    }
}
