//! Volume sequence bytecode: E0 loop, E1 end, E8 sustain, EA volume bend,
//! any other byte sets the volume (low 7 bits).

use super::module::FcModule;
use super::voice::FcVoice;
use crate::helper::MAX_VOLUME;

pub const CMD_LOOP: u8 = 0xe0;
pub const CMD_END: u8 = 0xe1;
pub const CMD_SUSTAIN: u8 = 0xe8;
pub const CMD_VOLUME_BEND: u8 = 0xea;

/// Loop targets count from the start of the 64-byte block, header included
const HEADER_SIZE: u16 = 5;

/// One volume bend step, every other call. Stops at either volume limit.
pub fn volume_bend(voice: &mut FcVoice) {
    voice.volume_bend_flag = !voice.volume_bend_flag;
    if !voice.volume_bend_flag {
        return;
    }
    voice.volume_bend_time = voice.volume_bend_time.saturating_sub(1);
    voice.volume += voice.volume_bend_speed as i16;
    if voice.volume > MAX_VOLUME as i16 {
        voice.volume = MAX_VOLUME as i16;
        voice.volume_bend_time = 0;
    } else if voice.volume < 0 {
        voice.volume = 0;
        voice.volume_bend_time = 0;
    }
}

/// Run the volume sequence of one voice for one tick
pub fn step(module: &FcModule, voice: &mut FcVoice) {
    if voice.volume_sustain != 0 {
        voice.volume_sustain -= 1;
        return;
    }
    if voice.volume_bend_time != 0 {
        volume_bend(voice);
        return;
    }
    voice.volume_counter = voice.volume_counter.wrapping_sub(1);
    if voice.volume_counter != 0 {
        return;
    }
    voice.volume_counter = voice.volume_speed;

    let sequence = module.volume_sequence(voice.volume_sequence as usize);
    // a loop onto itself must not hang the tick
    for _ in 0..=sequence.values.len() {
        let pos = voice.volume_pos as usize;
        if pos >= sequence.values.len() {
            return;
        }
        match sequence.value(pos) {
            CMD_END => return,
            CMD_VOLUME_BEND => {
                voice.volume_bend_speed = sequence.value(pos + 1) as i8;
                voice.volume_bend_time = sequence.value(pos + 2);
                voice.volume_pos += 3;
                volume_bend(voice);
            }
            CMD_SUSTAIN => {
                voice.volume_sustain = sequence.value(pos + 1);
                voice.volume_pos += 2;
            }
            CMD_LOOP => {
                voice.volume_pos = ((sequence.value(pos + 1) & 0x3f) as u16).wrapping_sub(HEADER_SIZE);
                continue;
            }
            volume => {
                voice.volume = (volume & 0x7f) as i16;
                voice.volume_pos += 1;
            }
        }
        return;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fc::module::{VolumeSequence, FC_ROWS, FC_VOICES, VOLUME_VALUES};
    use crate::pattern::Pattern;
    use crate::sequence::SequenceEntry;

    fn module(speed: u8, bytecode: &[u8]) -> FcModule {
        let mut values = bytecode.to_vec();
        values.resize(VOLUME_VALUES, 0);
        let envelope = VolumeSequence {
            speed,
            frequency_sequence: 0,
            vibrato_speed: 0,
            vibrato_depth: 0,
            vibrato_delay: 0,
            values,
        };
        FcModule::new(
            vec![],
            vec![],
            vec![SequenceEntry::shared(0, FC_VOICES)],
            vec![Pattern::new(FC_ROWS, 1)],
            &[],
            vec![envelope],
        )
        .unwrap()
    }

    fn voice(speed: u8) -> FcVoice {
        FcVoice {
            volume_sequence: 1,
            volume_counter: speed,
            volume_speed: speed,
            ..Default::default()
        }
    }

    #[test]
    fn steps_at_envelope_speed() {
        let m = module(2, &[10, 20, 30, CMD_END]);
        let mut v = voice(2);
        let mut seen = Vec::new();
        for _ in 0..8 {
            step(&m, &mut v);
            seen.push(v.volume);
        }
        assert_eq!(seen, vec![0, 10, 10, 20, 20, 30, 30, 30]);
    }

    #[test]
    fn loop_target_skips_header() {
        // E0 05 jumps back to the first value byte
        let m = module(1, &[40, 50, CMD_LOOP, 5]);
        let mut v = voice(1);
        let mut seen = Vec::new();
        for _ in 0..5 {
            step(&m, &mut v);
            seen.push(v.volume);
        }
        assert_eq!(seen, vec![40, 50, 40, 50, 40]);
    }

    #[test]
    fn loop_onto_itself_does_not_hang() {
        let m = module(1, &[CMD_LOOP, 5]);
        let mut v = voice(1);
        step(&m, &mut v);
        assert_eq!(v.volume, 0);
    }

    #[test]
    fn bend_moves_every_other_tick_and_stops_at_limit() {
        let m = module(1, &[60, CMD_VOLUME_BEND, 3, 10, CMD_END]);
        let mut v = voice(1);
        step(&m, &mut v);
        assert_eq!(v.volume, 60);
        step(&m, &mut v);
        assert_eq!(v.volume, 63);
        step(&m, &mut v);
        assert_eq!(v.volume, 63);
        step(&m, &mut v);
        assert_eq!(v.volume, 64);
        assert_eq!(v.volume_bend_time, 0);
    }

    #[test]
    fn sustain_and_high_bit_volume() {
        let m = module(1, &[CMD_SUSTAIN, 2, 0xff, CMD_END]);
        let mut v = voice(1);
        step(&m, &mut v);
        assert_eq!(v.volume_sustain, 2);
        step(&m, &mut v);
        step(&m, &mut v);
        assert_eq!(v.volume, 0);
        step(&m, &mut v);
        assert_eq!(v.volume, 0x7f);
    }
}
