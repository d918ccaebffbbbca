#![allow(dead_code)]

use std::sync::Arc;

use retroplayer::dss::{DSS_ROWS, DSS_VOICES};
use retroplayer::fc::{track_event, FC_END_MARK, FC_ROWS, FC_VOICES};
use retroplayer::prelude::*;

pub fn wave(len: usize) -> SampleData {
    (0..len)
        .map(|i| if i % 8 < 4 { 100 } else { -100 })
        .collect::<Vec<i8>>()
        .into()
}

pub fn dss_note(period: u16, effect: DssEffect, argument: u8) -> Event {
    Event {
        sample: 1,
        note: period,
        effect: effect as u8,
        argument,
    }
}

pub fn dss_effect(effect: DssEffect, argument: u8) -> Event {
    Event {
        effect: effect as u8,
        argument,
        ..Default::default()
    }
}

/// Empty patterns of `rows` rows played in order
pub fn dss_plain(speed: u8, positions: usize, rows: usize) -> Arc<DssModule> {
    let sequence: Vec<u16> = (0..positions as u16).collect();
    let patterns = (0..positions).map(|_| Pattern::new(rows, DSS_VOICES)).collect();
    Arc::new(DssModule::new(125, speed, vec![], &sequence, patterns).unwrap())
}

/// Four full positions with notes and slides on every voice
pub fn dss_tune() -> Arc<DssModule> {
    let sample = DssSample {
        name: "lead".into(),
        length: 32,
        loop_start: 16,
        loop_length: 24,
        volume: 50,
        fine_tune: 3,
        data: Some(wave(128)),
        ..Default::default()
    };
    let periods = [856u16, 762, 678, 640, 570, 508, 453, 428, 381, 339];
    let effects = [
        (DssEffect::SlideUp, 2),
        (DssEffect::Arpeggio, 0x47),
        (DssEffect::VolumeSlideDown, 3),
        (DssEffect::SlideDown, 1),
        (DssEffect::RetrigNote, 2),
        (DssEffect::VolumeSlideUp, 5),
        (DssEffect::Portamento, 6),
        (DssEffect::NoteCut, 4),
    ];
    let mut patterns = Vec::new();
    for p in 0..2 {
        let mut pattern = Pattern::new(DSS_ROWS, DSS_VOICES);
        for row in (0..DSS_ROWS).step_by(3) {
            let v = (row / 3) % DSS_VOICES;
            let period = periods[(row + p * 5) % periods.len()];
            let (effect, arg) = effects[(row / 3 + p) % effects.len()];
            pattern.set(row, v, dss_note(period, effect, arg));
        }
        pattern.set(20, 3, dss_effect(DssEffect::MasterVolumeSlideDown, 1));
        pattern.set(40, 3, dss_effect(DssEffect::MasterVolumeUp, 64));
        patterns.push(pattern);
    }
    Arc::new(DssModule::new(125, 6, vec![sample], &[0, 1, 0, 1], patterns).unwrap())
}

pub fn fc_position(patterns: [u16; FC_VOICES], transpose: i8, speed: u8) -> SequenceEntry {
    SequenceEntry {
        tracks: patterns
            .iter()
            .map(|&pattern| TrackRef {
                pattern,
                note_transpose: transpose,
                sound_transpose: 0,
            })
            .collect(),
        speed,
    }
}

/// Positions of `rows` rows each, every voice on pattern 0, no instruments
pub fn fc_plain(speed: u8, positions: usize, rows: usize) -> Arc<FcModule> {
    let mut pattern = Pattern::new(FC_ROWS, 1);
    if rows < FC_ROWS {
        pattern.set(rows, 0, track_event(FC_END_MARK, 0));
    }
    let sequence = (0..positions).map(|_| fc_position([0; 4], 0, speed)).collect();
    Arc::new(FcModule::new(vec![], vec![], sequence, vec![pattern], &[], vec![]).unwrap())
}

/// Melody with an arpeggio waveform, vibrato, sustain and a portamento
pub fn fc_tune() -> Arc<FcModule> {
    let mut frequency = vec![0xe2, 10, 0x00, 0x03, 0x07, 0xe0, 0x02];
    frequency.resize(64, 0xe1);
    frequency.extend_from_slice(&[0xe2, 11, 0xea, 0xfe, 6, 0x0c, 0xe8, 3, 0x00, 0xe1]);
    frequency.resize(128, 0xe1);

    let mut lead = vec![1, 0, 3, 4, 6, 64, 58, 52, 0xea, 0xfe, 10, 40, 0xe8, 8, 30, 0xe0, 14];
    lead.resize(64, 0xe1);
    let mut bass = vec![2, 1, 0, 0, 0, 60, 0xe8, 12, 20, 0xe1];
    bass.resize(64, 0xe1);

    let mut melody = Pattern::new(FC_ROWS, 1);
    for (row, note) in [(0, 24), (6, 27), (12, 31), (18, 36), (24, 34)] {
        melody.set(row, 0, track_event(note, 0));
    }
    let mut low = Pattern::new(FC_ROWS, 1);
    low.set(0, 0, track_event(12, 0x81))
        .set(1, 0, track_event(0, 0x02))
        .set(16, 0, track_event(19, 0x41))
        .set(28, 0, track_event(FC_END_MARK, 0));

    let sequence = vec![
        fc_position([0, 0, 1, 1], 0, 3),
        fc_position([0, 1, 0, 1], 5, 0),
        fc_position([1, 0, 1, 0], -3, 4),
    ];
    Arc::new(
        FcModule::new(
            vec![],
            vec![FcSample::wavetable(wave(32)), FcSample::wavetable(wave(64))],
            sequence,
            vec![melody, low],
            &frequency,
            vec![
                VolumeSequence::from_block(&lead).unwrap(),
                VolumeSequence::from_block(&bass).unwrap(),
            ],
        )
        .unwrap(),
    )
}
