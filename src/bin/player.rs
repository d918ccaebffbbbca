use clap::{Parser, ValueEnum};
use console::{Key, Term};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use retroplayer::dss::{DSS_ROWS, DSS_VOICES};
use retroplayer::fc::{track_event, FC_END_MARK, FC_ROWS, FC_VOICES};
use retroplayer::period_helper::period_to_frequency;
use retroplayer::prelude::*;

type BoxError = Box<dyn std::error::Error>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Song {
    /// Four voices sharing one pattern per position
    Dss,
    /// Four voices with their own tracks and instrument sequences
    Fc,
}

#[derive(Parser)]
struct Cli {
    /// Choose built-in song
    #[arg(short = 's', long, value_enum, default_value_t = Song::Dss)]
    song: Song,

    /// Choose sub-song
    #[arg(short = 'u', long, default_value = "0")]
    sub_song: usize,

    /// Start at a specific sequence position
    #[arg(short = 'p', long)]
    position: Option<usize>,

    /// Start at a specific time, in seconds
    #[arg(short = 't', long)]
    time: Option<f32>,

    /// How many loop (0: infinity)
    #[arg(short = 'l', long, default_value = "1")]
    loops: u8,

    /// Play the whole song without waiting for keys
    #[arg(short = 'b', long, default_value = "false")]
    batch: bool,
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    Term::stdout().clear_screen()?;
    println!("--===~ RetroPlayer Example ~===--");
    println!("Because demo scene can't die :)\n");

    match cli.song {
        Song::Dss => play(Arc::new(dss_song()?), &cli),
        Song::Fc => play(Arc::new(fc_song()?), &cli),
    }
}

fn play<S: EventSource>(source: Arc<S>, cli: &Cli) -> Result<(), BoxError> {
    let config = PlayerConfig::default().with_max_loop_count(cli.loops);
    let mut player = RetroPlayer::new(source, config)?;
    for (index, song) in player.sub_songs().iter().enumerate() {
        println!(
            "sub-song {}: position {}, {}",
            index,
            song.start_position,
            format_time(song.total)
        );
    }
    for (name, value) in player.describe() {
        println!("{:<26}{}", name, value);
    }

    let mut voices = vec![RecordingSink::default(); S::VOICES];
    show(&player.select_sub_song(cli.sub_song)?);
    if let Some(position) = cli.position {
        show(&player.seek_to_position(position, &mut voices)?);
    }
    if let Some(time) = cli.time {
        let time = Duration::from_secs_f32(time.max(0.0));
        show(&player.seek_to_time(time, &mut voices)?);
    }

    if cli.batch {
        while !player.is_finished() {
            play_row(&mut player, &mut voices)?;
        }
        println!("Have a nice day!");
        return Ok(());
    }

    let stdout = Term::stdout();
    println!("Enter key for next row, i for info, escape key to exit...");
    loop {
        match stdout.read_key()? {
            Key::Enter => play_row(&mut player, &mut voices)?,
            Key::Char('i') => {
                for (name, value) in player.describe() {
                    println!("{:<26}{}", name, value);
                }
            }
            Key::Escape => break,
            _ => {}
        }
        if player.is_finished() {
            break;
        }
    }
    println!("Have a nice day!");
    Ok(())
}

/// Tick through one row and print what the voices were told
fn play_row<S: EventSource>(
    player: &mut RetroPlayer<S>,
    voices: &mut [RecordingSink],
) -> Result<(), BoxError> {
    loop {
        let outcome = player.tick(voices)?;
        show(&outcome.notifications);
        if outcome.end_reached {
            println!("-- loop {} --", player.loop_count());
        }
        if player.engine().info().map_or(true, |i| i.tick == 0) {
            break;
        }
    }

    let mut line = format!(
        "{} {:>3}/{:02} |",
        format_time(player.elapsed()),
        player.engine().position(),
        player.engine().row()
    );
    for voice in voices.iter_mut() {
        let triggered = voice.triggers() > 0;
        voice.take();
        if voice.muted {
            line.push_str("    ---   -- |");
        } else {
            line.push_str(&format!(
                "{}{:>5}Hz {:>2} |",
                if triggered { '*' } else { ' ' },
                period_to_frequency(voice.period),
                voice.volume
            ));
        }
    }
    println!("{}", line);
    Ok(())
}

fn show(notifications: &[Notification]) {
    for n in notifications {
        println!("  [{}] {:?} = {}", n.line_id, n.line, n.value);
    }
}

fn format_time(time: Duration) -> String {
    let millis = time.as_millis();
    format!("{}:{:02}.{:03}", millis / 60_000, millis / 1000 % 60, millis % 1000)
}

fn square_wave(len: usize, amplitude: i8) -> SampleData {
    (0..len)
        .map(|i| if i < len / 2 { amplitude } else { -amplitude })
        .collect::<Vec<_>>()
        .into()
}

fn dss_song() -> Result<DssModule, ModuleError> {
    const SCALE: [u16; 8] = [428, 381, 339, 320, 285, 254, 226, 214];
    let lead = DssSample {
        name: "square".into(),
        length: 16,
        loop_length: 16,
        volume: 48,
        data: Some(square_wave(32, 96)),
        ..Default::default()
    };

    let note = |period: u16, effect: DssEffect, argument: u8| Event {
        sample: 1,
        note: period,
        effect: effect as u8,
        argument,
    };
    let effect = |effect: DssEffect, argument: u8| Event {
        effect: effect as u8,
        argument,
        ..Default::default()
    };

    let mut intro = Pattern::new(DSS_ROWS, DSS_VOICES);
    intro.set(0, 3, effect(DssEffect::SetSongSpeed, 5));
    for (step, &period) in SCALE.iter().enumerate() {
        intro.set(step * 4, 0, note(period, DssEffect::VolumeSlideDown, 2));
        intro.set(32 + step * 4, 0, note(SCALE[7 - step], DssEffect::Arpeggio, 0x37));
    }
    intro.set(0, 1, note(856, DssEffect::SlideDown, 1));
    intro.set(16, 2, effect(DssEffect::SetLoopStart, 0));
    intro.set(31, 2, effect(DssEffect::JumpToLoop, 1));

    let mut outro = Pattern::new(DSS_ROWS, DSS_VOICES);
    outro.set(0, 0, note(428, DssEffect::SetVolume, 64));
    outro.set(8, 0, note(214, DssEffect::Portamento, 4));
    outro.set(24, 1, note(570, DssEffect::RetrigNote, 3));
    outro.set(40, 2, note(339, DssEffect::NoteCut, 2));
    outro.set(48, 3, effect(DssEffect::MasterVolumeSlideDown, 1));
    outro.set(63, 3, effect(DssEffect::PositionJump, 1));

    DssModule::new(125, 6, vec![lead], &[0, 1], vec![intro, outro])
}

fn fc_song() -> Result<FcModule, ModuleError> {
    // start waveform 10 (the first wavetable), then cycle a major chord
    let mut frequency = vec![0xe2, 10, 0x00, 0x04, 0x07, 0xe0, 0x02];
    frequency.resize(64, 0xe1);

    let mut envelope = vec![1, 0, 2, 3, 8, 64, 60, 56, 52, 48, 0xe8, 20, 40, 0xe1];
    envelope.resize(64, 0xe1);

    let mut melody = Pattern::new(FC_ROWS, 1);
    for (row, note) in [(0, 24), (8, 27), (16, 31), (24, 36)] {
        melody.set(row, 0, track_event(note, 0));
    }
    let mut glide = Pattern::new(FC_ROWS, 1);
    glide
        .set(0, 0, track_event(12, 0x80))
        .set(1, 0, track_event(0, 0x05))
        .set(16, 0, track_event(FC_END_MARK, 0));
    let rest = Pattern::new(FC_ROWS, 1);

    let track = |pattern: u16, note_transpose: i8| TrackRef {
        pattern,
        note_transpose,
        sound_transpose: 0,
    };
    let sequence = vec![
        SequenceEntry {
            tracks: vec![track(0, 0), track(0, 12), track(1, 0), track(2, 0)],
            speed: 4,
        },
        SequenceEntry {
            tracks: vec![track(0, 5), track(0, 17), track(1, 5), track(2, 0)],
            speed: 0,
        },
    ];
    debug_assert_eq!(sequence[0].tracks.len(), FC_VOICES);

    FcModule::new(
        vec![],
        vec![FcSample::wavetable(square_wave(32, 64))],
        sequence,
        vec![melody, glide, rest],
        &frequency,
        vec![VolumeSequence::from_block(&envelope)?],
    )
}
