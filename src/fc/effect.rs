use super::frequency_sequence;
use super::module::FcModule;
use super::voice::FcVoice;
use super::volume_sequence;
use crate::helper::clamp_volume;
use crate::period_helper::{FC_PERIODS, FC_PERIOD_MAX, FC_PERIOD_MIN};
use crate::voice_sink::VirtualVoiceSink;

/// Vibrato direction bit, set while the value climbs
const VIBRATO_UP: u8 = 0x20;

/// Note index into the period table: sequence offset plus note and track
/// transpose, or the offset alone when it is negative (fixed pitch)
#[inline]
pub fn note_index(voice: &FcVoice) -> usize {
    let mut note = voice.sequence_transpose;
    if note >= 0 {
        note = note.wrapping_add(voice.cur_note.wrapping_add(voice.transpose));
    }
    (note as u8 & 0x7f) as usize
}

/// Period offset of the vibrato for this tick
pub fn vibrato(voice: &mut FcVoice, note: usize) -> i32 {
    let mut flag = voice.vibrato_flag;
    let mut offset = 0;
    if voice.vibrato_delay != 0 {
        voice.vibrato_delay = voice.vibrato_delay.wrapping_sub(1);
    } else {
        let depth = voice.vibrato_depth.wrapping_mul(2);
        let mut value = voice.vibrato_value;
        if flag & 0x80 == 0 || flag & 0x01 == 0 {
            if flag & VIBRATO_UP != 0 {
                value = value.wrapping_add(voice.vibrato_speed);
                if value >= depth {
                    flag &= !VIBRATO_UP;
                    value = depth;
                }
            } else {
                value = value.wrapping_sub(voice.vibrato_speed);
                if value < 0 {
                    flag |= VIBRATO_UP;
                    value = 0;
                }
            }
            voice.vibrato_value = value;
        }

        // lower notes swing wider
        value = value.wrapping_sub(depth / 2);
        let mut base = note as u16 * 2 + 160;
        while base < 256 {
            value = value.wrapping_mul(2);
            base += 24;
        }
        offset = value as i32;
    }
    voice.vibrato_flag = flag ^ 0x01;
    offset
}

/// Portamento and pitch bend, each acting on every other tick
pub fn slide_pitch(voice: &mut FcVoice) {
    voice.portamento_flag = !voice.portamento_flag;
    if voice.portamento_flag && voice.portamento != 0 {
        if voice.portamento <= 31 {
            voice.pitch = voice.pitch.wrapping_sub(voice.portamento as i16);
        } else {
            voice.pitch = voice.pitch.wrapping_add((voice.portamento & 0x1f) as i16);
        }
    }

    voice.pitch_bend_flag = !voice.pitch_bend_flag;
    if voice.pitch_bend_flag && voice.pitch_bend_time != 0 {
        voice.pitch_bend_time -= 1;
        voice.pitch = voice.pitch.wrapping_sub(voice.pitch_bend_speed as i16);
    }
}

/// Everything one voice does on every tick: run both sequences, then send
/// the resulting period and volume
pub fn tick_voice(module: &FcModule, voice: &mut FcVoice, sink: &mut dyn VirtualVoiceSink) {
    frequency_sequence::step(module, voice, sink);
    volume_sequence::step(module, voice);

    let note = note_index(voice);
    let mut period = FC_PERIODS.get(note).copied().unwrap_or(0) as i32;
    period += vibrato(voice, note);
    slide_pitch(voice);
    period += voice.pitch as i32;

    let period = period.clamp(FC_PERIOD_MIN as i32, FC_PERIOD_MAX as i32) as u16;
    let volume = clamp_volume(voice.volume as i32);
    voice.volume = volume as i16;
    sink.set_pitch_period(period);
    sink.set_volume(volume as u16);
}
