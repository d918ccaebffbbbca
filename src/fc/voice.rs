use crate::sequence::TrackRef;

/// Playing state of one track voice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FcVoice {
    // Track position, each voice walks the sequence on its own
    pub song_pos: u16,
    pub pattern: u16,
    pub pattern_pos: u8,
    pub transpose: i8,
    pub sound_transpose: i8,

    pub cur_note: i8,
    /// Relative period, moved by portamento and pitch bend
    pub pitch: i16,
    /// Portamento value: 1..=31 lowers the period, 32.. raises it by the low 5 bits
    pub portamento: u8,
    pub portamento_flag: bool,
    pub pitch_bend_speed: i8,
    pub pitch_bend_time: u8,
    pub pitch_bend_flag: bool,

    // Frequency sequence
    pub frequency_start: u16,
    pub frequency_pos: u16,
    pub sustain_counter: u8,
    /// Note offset from the frequency sequence
    pub sequence_transpose: i8,

    // Volume sequence
    pub volume_sequence: u16,
    pub volume_pos: u16,
    pub volume_counter: u8,
    pub volume_speed: u8,
    pub volume_sustain: u8,
    pub volume_bend_speed: i8,
    pub volume_bend_time: u8,
    pub volume_bend_flag: bool,
    pub volume: i16,

    pub vibrato_speed: i8,
    pub vibrato_depth: i8,
    pub vibrato_value: i8,
    pub vibrato_delay: i8,
    pub vibrato_flag: u8,

    /// A waveform has been started since the last note
    pub active: bool,
}

impl FcVoice {
    /// Voice parked on the silent sequence, reading `track` at `song_pos`
    pub fn new(song_pos: u16, track: TrackRef) -> Self {
        Self {
            song_pos,
            pattern: track.pattern,
            transpose: track.note_transpose,
            sound_transpose: track.sound_transpose,
            volume_counter: 1,
            volume_speed: 1,
            ..Default::default()
        }
    }

    /// Switch to the track `track` of a new position
    pub fn enter_track(&mut self, song_pos: u16, track: TrackRef) {
        self.song_pos = song_pos;
        self.pattern_pos = 0;
        self.pattern = track.pattern;
        self.transpose = track.note_transpose;
        self.sound_transpose = track.sound_transpose;
    }
}
