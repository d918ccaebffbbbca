mod common;

use std::sync::Arc;
use std::time::Duration;

use retroplayer::dss::DSS_VOICES;
use retroplayer::fc::{track_event, FC_END_MARK, FC_ROWS};
use retroplayer::prelude::*;

use common::*;

const TICK: Duration = Duration::from_millis(20);

fn scan<S: EventSource>(source: &Arc<S>) -> Vec<SubSongDuration<S::Voice>> {
    DurationScanner::new(PlayerConfig::default()).scan(source).unwrap()
}

#[test]
fn dss_length_is_positions_rows_and_speed() {
    let songs = scan(&dss_plain(5, 3, 16));
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].total, TICK * (3 * 16 * 5));
    assert_eq!(songs[0].position_time(2), Some(TICK * (2 * 16 * 5)));
}

#[test]
fn tempo_change_shortens_the_ticks() {
    let mut pattern = Pattern::new(4, DSS_VOICES);
    pattern.set(0, 0, dss_effect(DssEffect::SetSongTempo, 250));
    let m = Arc::new(DssModule::new(125, 1, vec![], &[0], vec![pattern]).unwrap());
    let songs = scan(&m);
    // row 0 still runs at 125 BPM, the other three at 250
    assert_eq!(songs[0].total, TICK + Duration::from_millis(10) * 3);
}

#[test]
fn fc_length_follows_the_end_marks() {
    let songs = scan(&fc_plain(3, 2, 2));
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].total, TICK * (2 * 2 * 3));
    assert_eq!(songs[0].position_time(1), Some(TICK * 6));
    assert_eq!(songs[0].restart_position, 0);
}

#[test]
fn fc_position_speed_changes_the_length() {
    let mut sequence = (0..2)
        .map(|_| fc_position([0; 4], 0, 2))
        .collect::<Vec<_>>();
    sequence[1].speed = 5;
    let mut pattern = Pattern::new(FC_ROWS, 1);
    pattern.set(4, 0, track_event(FC_END_MARK, 0));
    let m = Arc::new(FcModule::new(vec![], vec![], sequence, vec![pattern], &[], vec![]).unwrap());
    let songs = scan(&m);
    // the speed reloads on the row that enters position 1
    assert_eq!(songs[0].total, TICK * (4 * 2 + 4 * 5));
    assert_eq!(songs[0].position_time(1), Some(TICK * 8));
}

#[test]
fn every_position_belongs_to_one_sub_song() {
    // position 1 breaks back to 0, so 2 and 3 form a second song
    let mut first = Pattern::new(2, DSS_VOICES);
    first.set(1, 2, dss_effect(DssEffect::PositionJump, 1));
    let second = Pattern::new(2, DSS_VOICES);
    let m = Arc::new(
        DssModule::new(125, 2, vec![], &[1, 0, 1, 1], vec![first, second]).unwrap(),
    );
    let songs = scan(&m);
    assert_eq!(songs.len(), 2);
    for position in 0..4 {
        let owners = songs.iter().filter(|s| s.plays(position)).count();
        assert_eq!(owners, 1, "position {}", position);
    }
    assert_eq!(songs[0].total, TICK * 8);
    assert_eq!(songs[1].start_position, 2);
    assert_eq!(songs[1].total, TICK * 8);
}

#[test]
fn player_reports_each_sub_song_duration() {
    let player = RetroPlayer::new(dss_tune(), PlayerConfig::default()).unwrap();
    assert_eq!(player.sub_songs().len(), 1);
    assert_eq!(player.duration(), TICK * (4 * 64 * 6));
    // snapshots every 2 s, the first at the start
    assert_eq!(player.sub_songs()[0].snapshots.len(), 16);
}
