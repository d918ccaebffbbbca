mod common;

use std::sync::Arc;
use std::time::Duration;

use retroplayer::prelude::*;

use common::*;

const TICK: Duration = Duration::from_millis(20);

fn run<S: EventSource>(engine: &mut Engine<S>, ticks: usize) {
    let mut sinks = vec![NullSink; S::VOICES];
    for _ in 0..ticks {
        engine.tick(&mut sinks).unwrap();
    }
}

/// K ticks, capture into a fresh engine, M more ticks must match K + M ticks
fn fork_matches<S: EventSource>(source: Arc<S>, k: usize, m: usize) {
    let mut straight = Engine::new(Arc::clone(&source));
    straight.init(0).unwrap();
    run(&mut straight, k + m);

    let mut head = Engine::new(Arc::clone(&source));
    head.init(0).unwrap();
    run(&mut head, k);
    let snapshot = head.capture().unwrap();

    let mut tail = Engine::new(source);
    tail.restore(&snapshot).unwrap();
    run(&mut tail, m);

    assert_eq!(tail.info(), straight.info());
    assert_eq!(tail.voices(), straight.voices());
}

#[test]
fn dss_fork_is_deterministic() {
    for (k, m) in [(0, 50), (7, 100), (383, 1), (700, 333)] {
        fork_matches(dss_tune(), k, m);
    }
}

#[test]
fn fc_fork_is_deterministic() {
    for (k, m) in [(0, 50), (5, 97), (200, 300), (641, 12)] {
        fork_matches(fc_tune(), k, m);
    }
}

fn seek_matches<S: EventSource>(source: Arc<S>, ticks: u32) {
    let config = PlayerConfig::default().with_snapshot_interval(Duration::from_secs(1));
    let mut player = RetroPlayer::new(Arc::clone(&source), config).unwrap();
    let mut voices = vec![RecordingSink::default(); S::VOICES];
    player.seek_to_time(TICK * ticks, &mut voices).unwrap();
    assert_eq!(player.elapsed(), TICK * ticks);
    assert!(voices.iter().all(|v| v.muted));

    let mut straight = Engine::new(source);
    straight.init(0).unwrap();
    run(&mut straight, ticks as usize);
    assert_eq!(player.engine().info(), straight.info());
    assert_eq!(player.engine().voices(), straight.voices());

    // both go on producing the same commands
    let mut live = vec![RecordingSink::default(); S::VOICES];
    let mut reference = vec![RecordingSink::default(); S::VOICES];
    for _ in 0..120 {
        player.tick(&mut live).unwrap();
        straight.tick(&mut reference).unwrap();
    }
    for (a, b) in live.iter().zip(reference.iter()) {
        assert_eq!(a.commands, b.commands);
    }
}

#[test]
fn dss_seek_equals_uninterrupted_playback() {
    seek_matches(dss_tune(), 1234);
    seek_matches(dss_tune(), 49);
}

#[test]
fn fc_seek_equals_uninterrupted_playback() {
    seek_matches(fc_tune(), 200);
    seek_matches(fc_tune(), 50);
}

#[test]
fn seeking_backwards_restarts_from_an_earlier_snapshot() {
    let source = dss_tune();
    let config = PlayerConfig::default().with_snapshot_interval(Duration::from_secs(1));
    let mut player = RetroPlayer::new(Arc::clone(&source), config).unwrap();
    let mut voices = vec![RecordingSink::default(); 4];
    player.seek_to_time(Duration::from_secs(20), &mut voices).unwrap();
    player.seek_to_time(TICK * 300, &mut voices).unwrap();

    let mut straight = Engine::new(source);
    straight.init(0).unwrap();
    run(&mut straight, 300);
    assert_eq!(player.engine().voices(), straight.voices());
}

#[test]
fn seek_past_the_end_stops_at_the_end() {
    let mut player = RetroPlayer::new(dss_plain(1, 2, 4), PlayerConfig::default()).unwrap();
    let mut voices = vec![RecordingSink::default(); 4];
    player.seek_to_time(Duration::from_secs(60), &mut voices).unwrap();
    assert_eq!(player.elapsed(), player.duration());
    let outcome = player.tick(&mut voices).unwrap();
    assert!(outcome.end_reached);
    assert_eq!(player.loop_count(), 1);
}
