use std::sync::Arc;

/// Signed 8-bit PCM shared read-only between module and mixer
pub type SampleData = Arc<[i8]>;

/// The audio voice the engine drives.
///
/// Write-only: the engine never reads back. Offsets and lengths are in bytes,
/// periods are Amiga periods, volumes are on the 0..=64 scale.
pub trait VirtualVoiceSink {
    fn trigger_sample(&mut self, sample_id: u16, data: &SampleData, start_offset: u32, length: u32);

    /// Loop inside the sample currently playing
    fn set_loop(&mut self, start: u32, length: u32);

    /// Loop that switches to `data` once the current sample has played through
    fn switch_loop(&mut self, data: &SampleData, start: u32, length: u32) {
        let _ = data;
        self.set_loop(start, length);
    }

    fn set_pitch_period(&mut self, period: u16);

    fn set_volume(&mut self, level: u16);

    fn mute(&mut self);
}

/// Index access to every voice the engine drives on one tick
pub trait VoiceBank {
    fn voice_count(&self) -> usize;
    fn voice(&mut self, index: usize) -> &mut dyn VirtualVoiceSink;
}

/// Borrowed host voices seen as a [`VoiceBank`]
pub struct Voices<'a, S>(pub &'a mut [S]);

impl<S: VirtualVoiceSink> VoiceBank for Voices<'_, S> {
    fn voice_count(&self) -> usize {
        self.0.len()
    }

    fn voice(&mut self, index: usize) -> &mut dyn VirtualVoiceSink {
        &mut self.0[index]
    }
}

/// Discards everything; used for silent scans and seeks
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl VirtualVoiceSink for NullSink {
    fn trigger_sample(&mut self, _: u16, _: &SampleData, _: u32, _: u32) {}
    fn set_loop(&mut self, _: u32, _: u32) {}
    fn set_pitch_period(&mut self, _: u16) {}
    fn set_volume(&mut self, _: u16) {}
    fn mute(&mut self) {}
}

/// One command received by a [`RecordingSink`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceCommand {
    Trigger {
        sample_id: u16,
        start_offset: u32,
        length: u32,
    },
    Loop {
        start: u32,
        length: u32,
    },
    SwitchLoop {
        start: u32,
        length: u32,
    },
    Period(u16),
    Volume(u16),
    Mute,
}

/// Keeps every command plus the last period and volume.
/// Test harness and debug dump for the demo player.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<VoiceCommand>,
    pub period: u16,
    pub volume: u16,
    pub muted: bool,
}

impl RecordingSink {
    pub fn take(&mut self) -> Vec<VoiceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn triggers(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, VoiceCommand::Trigger { .. }))
            .count()
    }
}

impl VirtualVoiceSink for RecordingSink {
    fn trigger_sample(&mut self, sample_id: u16, _data: &SampleData, start_offset: u32, length: u32) {
        self.muted = false;
        self.commands.push(VoiceCommand::Trigger {
            sample_id,
            start_offset,
            length,
        });
    }

    fn set_loop(&mut self, start: u32, length: u32) {
        self.commands.push(VoiceCommand::Loop { start, length });
    }

    fn switch_loop(&mut self, _data: &SampleData, start: u32, length: u32) {
        self.commands.push(VoiceCommand::SwitchLoop { start, length });
    }

    fn set_pitch_period(&mut self, period: u16) {
        self.period = period;
        self.commands.push(VoiceCommand::Period(period));
    }

    fn set_volume(&mut self, level: u16) {
        self.volume = level;
        self.commands.push(VoiceCommand::Volume(level));
    }

    fn mute(&mut self) {
        self.muted = true;
        self.commands.push(VoiceCommand::Mute);
    }
}
