//! Frequency sequence bytecode.
//!
//! Bytes at or above 0xE0 are commands, anything else is a note offset:
//!
//! | byte | arguments     | meaning                                   |
//! |------|---------------|-------------------------------------------|
//! | E0   | pos           | loop to `pos & 0x3f` of this sequence     |
//! | E1   |               | end, keep the current offset              |
//! | E2   | slot          | start waveform `slot`, restart envelope   |
//! | E3   | speed depth   | new vibrato                               |
//! | E4   | slot          | change loop to `slot`, only while playing |
//! | E7   | seq           | continue in sequence `seq`                |
//! | E8   | ticks         | sustain                                   |
//! | E9   | slot entry    | start entry of a multi-sample pack        |
//! | EA   | speed ticks   | pitch bend                                |

use super::module::{FcModule, FcSample, FREQUENCY_BLOCK, SILENT_SEQUENCE};
use super::voice::FcVoice;
use crate::voice_sink::VirtualVoiceSink;

pub const CMD_LOOP: u8 = 0xe0;
pub const CMD_END: u8 = 0xe1;
pub const CMD_WAVEFORM: u8 = 0xe2;
pub const CMD_VIBRATO: u8 = 0xe3;
pub const CMD_CHANGE_LOOP: u8 = 0xe4;
pub const CMD_JUMP: u8 = 0xe7;
pub const CMD_SUSTAIN: u8 = 0xe8;
pub const CMD_MULTI_SAMPLE: u8 = 0xe9;
pub const CMD_PITCH_BEND: u8 = 0xea;

// Jumps followed in one tick before the voice gives up on its sequence
const MAX_JUMPS: usize = 16;

/// Offset of frequency sequence `number` in the module's bytecode
#[inline]
pub fn sequence_offset(number: u8) -> usize {
    SILENT_SEQUENCE.len() + number as usize * FREQUENCY_BLOCK
}

fn trigger(sample: &FcSample, sink: &mut dyn VirtualVoiceSink) {
    let Some(data) = sample.data.as_ref() else {
        return;
    };
    sink.trigger_sample(sample.id, data, 0, sample.length);
    if let Some((start, length)) = sample.loop_range() {
        sink.set_loop(start, length);
    }
}

/// Run the frequency sequence of one voice for one tick
pub fn step(module: &FcModule, voice: &mut FcVoice, sink: &mut dyn VirtualVoiceSink) {
    loop {
        if voice.sustain_counter != 0 {
            voice.sustain_counter -= 1;
            return;
        }
        let mut at = voice.frequency_start as usize + voice.frequency_pos as usize;
        if at >= module.frequency_len() {
            return;
        }

        let mut again = false;
        let mut jumps = 0;
        loop {
            let mut jumped = false;
            let mut cmd = module.frequency_byte(at);
            at += 1;
            if cmd == CMD_END {
                break;
            }
            if cmd == CMD_LOOP {
                let pos = module.frequency_byte(at) & 0x3f;
                voice.frequency_pos = pos as u16;
                at = voice.frequency_start as usize + pos as usize;
                cmd = module.frequency_byte(at);
                at += 1;
            }

            match cmd {
                CMD_WAVEFORM => {
                    if let Some(sample) = module.instrument(module.frequency_byte(at)) {
                        trigger(sample, sink);
                    }
                    voice.volume_pos = 0;
                    voice.volume_counter = 1;
                    voice.frequency_pos += 2;
                    voice.active = true;
                }
                CMD_CHANGE_LOOP => {
                    if voice.active {
                        if let Some(sample) = module.instrument(module.frequency_byte(at)) {
                            if let Some(data) = sample.data.as_ref() {
                                sink.switch_loop(data, sample.loop_start, sample.loop_length);
                            }
                        }
                        voice.frequency_pos += 2;
                    }
                }
                CMD_MULTI_SAMPLE => {
                    voice.active = true;
                    let pack = module
                        .instrument(module.frequency_byte(at))
                        .and_then(|slot| slot.multi.as_ref());
                    if let Some(pack) = pack {
                        if let Some(sample) = pack.get(module.frequency_byte(at + 1) as usize) {
                            trigger(sample, sink);
                        }
                        voice.volume_pos = 0;
                        voice.volume_counter = 1;
                    }
                    voice.frequency_pos += 3;
                }
                CMD_JUMP => {
                    jumped = true;
                    at = sequence_offset(module.frequency_byte(at));
                    if at >= module.frequency_len() {
                        at = 0;
                    }
                    voice.frequency_start = at as u16;
                    voice.frequency_pos = 0;
                }
                CMD_PITCH_BEND => {
                    voice.pitch_bend_speed = module.frequency_byte(at) as i8;
                    voice.pitch_bend_time = module.frequency_byte(at + 1);
                    voice.frequency_pos += 3;
                }
                CMD_SUSTAIN => {
                    voice.sustain_counter = module.frequency_byte(at);
                    voice.frequency_pos += 2;
                    again = true;
                }
                CMD_VIBRATO => {
                    voice.vibrato_speed = module.frequency_byte(at) as i8;
                    voice.vibrato_depth = module.frequency_byte(at + 1) as i8;
                    voice.frequency_pos += 3;
                }
                _ => {}
            }

            if jumped {
                jumps += 1;
                if jumps > MAX_JUMPS {
                    return;
                }
                continue;
            }
            if !again {
                let offset = voice.frequency_start as usize + voice.frequency_pos as usize;
                voice.sequence_transpose = module.frequency_byte(offset) as i8;
                voice.frequency_pos += 1;
            }
            break;
        }
        if !again {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fc::module::{FC_ROWS, FC_VOICES};
    use crate::pattern::Pattern;
    use crate::sequence::SequenceEntry;
    use crate::voice_sink::{RecordingSink, VoiceCommand};

    fn module(frequency: &[u8]) -> FcModule {
        let mut data = frequency.to_vec();
        data.resize(FREQUENCY_BLOCK * 2, CMD_END);
        let wave = FcSample::wavetable(Arc::from(vec![0i8; 32]));
        FcModule::new(
            vec![],
            vec![wave],
            vec![SequenceEntry::shared(0, FC_VOICES)],
            vec![Pattern::new(FC_ROWS, 1)],
            &data,
            vec![],
        )
        .unwrap()
    }

    fn voice_on(sequence: u8) -> FcVoice {
        FcVoice {
            frequency_start: sequence_offset(sequence) as u16,
            ..Default::default()
        }
    }

    #[test]
    fn waveform_then_offsets() {
        let m = module(&[CMD_WAVEFORM, 10, 0x0c, 0x00, CMD_END]);
        let mut voice = voice_on(0);
        let mut sink = RecordingSink::default();
        step(&m, &mut voice, &mut sink);
        assert_eq!(
            sink.take(),
            vec![
                VoiceCommand::Trigger {
                    sample_id: 10,
                    start_offset: 0,
                    length: 32
                },
                VoiceCommand::Loop {
                    start: 0,
                    length: 32
                },
            ]
        );
        assert!(voice.active);
        assert_eq!(voice.sequence_transpose, 12);
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sequence_transpose, 0);
        // the end command holds the last offset
        step(&m, &mut voice, &mut sink);
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sequence_transpose, 0);
        assert!(sink.commands.is_empty());
    }

    #[test]
    fn sustain_holds_for_its_ticks() {
        let m = module(&[0x05, CMD_SUSTAIN, 2, 0x07, CMD_END]);
        let mut voice = voice_on(0);
        let mut sink = RecordingSink::default();
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sequence_transpose, 5);
        // the sustain starts counting down on the tick it is read
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sustain_counter, 1);
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sustain_counter, 0);
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.sequence_transpose, 7);
    }

    #[test]
    fn loop_and_jump_commands() {
        let mut data = vec![0x01, 0x02, CMD_LOOP, 0x01];
        data.resize(FREQUENCY_BLOCK, CMD_END);
        data.extend_from_slice(&[CMD_JUMP, 0]);
        let m = module(&data);

        let mut voice = voice_on(0);
        let mut sink = RecordingSink::default();
        let mut seen = Vec::new();
        for _ in 0..5 {
            step(&m, &mut voice, &mut sink);
            seen.push(voice.sequence_transpose);
        }
        assert_eq!(seen, vec![1, 2, 2, 2, 2]);

        let mut voice = voice_on(1);
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.frequency_start as usize, sequence_offset(0));
        assert_eq!(voice.sequence_transpose, 1);
    }

    #[test]
    fn jump_onto_itself_gives_up() {
        let m = module(&[CMD_JUMP, 0]);
        let mut voice = voice_on(0);
        let mut sink = RecordingSink::default();
        step(&m, &mut voice, &mut sink);
        assert_eq!(voice.frequency_pos, 0);
        assert_eq!(voice.sequence_transpose, 0);
    }

    #[test]
    fn change_loop_needs_an_active_voice() {
        let m = module(&[CMD_CHANGE_LOOP, 10, CMD_END]);
        let mut voice = voice_on(0);
        let mut sink = RecordingSink::default();
        step(&m, &mut voice, &mut sink);
        assert!(sink.commands.is_empty());

        let mut voice = FcVoice {
            active: true,
            ..voice_on(0)
        };
        step(&m, &mut voice, &mut sink);
        assert_eq!(sink.take(), vec![VoiceCommand::SwitchLoop { start: 0, length: 32 }]);
    }
}
