// GeometryNo1 headless player: CLI entry point.
//
// Performs the artwork the way the browser host does, minus pixels: resolve
// a seed, build the artwork, load the score in the background, click play,
// then step frames at a fixed rate against a `VirtualTransport` until the
// score ends. Transitions are logged as they happen and summarised as JSON
// on stdout; logs go to stderr.
//
// Usage:
//   cargo run -p geometry_player -- [--midi PATH] [--track N]
//     [--hash H --token-id ID | --token T] [--config PATH] [--fps N]
//     [--width W --height H] [--dump-catalog] [--log-level LEVEL]
//
// Without --midi the score is a built-in pulse: one quarter note per beat
// at the configured tempo. Without --hash/--token a fresh token is minted;
// it is logged so the performance can be replayed with --token.

use geometry_art::artwork::{Artwork, Frame};
use geometry_art::catalog::BlendMode;
use geometry_art::config::{ArtConfig, TempoConfig};
use geometry_art::cue::NoteEvent;
use geometry_art::layout::Viewport;
use geometry_art::scene::{Act, ActCatalog};
use geometry_art::seed::{PlatformIdentity, Seed, SeedMode};
use geometry_art::transport::{Transport, TransportEvent, VirtualTransport};
use geometry_score::{Score, ScoreLoader};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Beats in the built-in pulse score.
const PULSE_BEATS: u64 = 64;

/// Hard stop for the frame loop, in simulated seconds.
const MAX_PERFORMANCE_SECS: f64 = 60.0 * 60.0;

struct Options {
    midi: Option<PathBuf>,
    track: Option<usize>,
    seed_mode: SeedMode,
    config: Option<PathBuf>,
    fps: f64,
    viewport: Viewport,
    dump_catalog: bool,
}

#[derive(Serialize)]
struct TransitionRecord {
    cue: u32,
    at_secs: f64,
    act: Act,
    scene_index: usize,
    duration_ms: f64,
    rotated: bool,
    blend_mode: BlendMode,
}

#[derive(Serialize)]
struct Summary<'a> {
    token: &'a str,
    seed: u32,
    base_hue: f64,
    cues: usize,
    frames: u64,
    cells_drawn: u64,
    duration_secs: f64,
    transitions: Vec<TransitionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<&'a ActCatalog>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let level: LevelFilter = parse_flag(&args, "--log-level").unwrap_or(LevelFilter::INFO);
    init_logging(level);

    if let Err(e) = parse_options(&args).and_then(|options| perform(&options)) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs to stderr; RUST_LOG overrides the --log-level default.
fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_options(args: &[String]) -> Result<Options, Box<dyn Error>> {
    let hash: Option<String> = parse_flag(args, "--hash");
    let token_id: Option<String> = parse_flag(args, "--token-id");
    let token: Option<String> = parse_flag(args, "--token");
    let seed_mode = match (hash, token_id, token) {
        (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => {
            return Err("--token cannot be combined with --hash/--token-id".into());
        }
        (Some(hash), Some(id), None) => SeedMode::Derived(PlatformIdentity::new(hash, id)),
        (Some(_), None, None) | (None, Some(_), None) => {
            return Err("--hash and --token-id must be given together".into());
        }
        (None, None, Some(token)) => SeedMode::Replay(token),
        (None, None, None) => SeedMode::SelfGenerated,
    };

    let fps: f64 = parse_flag(args, "--fps").unwrap_or(60.0);
    if !(fps.is_finite() && fps > 0.0) {
        return Err(format!("--fps must be positive (got {fps})").into());
    }

    Ok(Options {
        midi: parse_flag(args, "--midi"),
        track: parse_flag(args, "--track"),
        seed_mode,
        config: parse_flag(args, "--config"),
        fps,
        viewport: Viewport::new(
            parse_flag(args, "--width").unwrap_or(1920.0),
            parse_flag(args, "--height").unwrap_or(1080.0),
        ),
        dump_catalog: args.iter().any(|a| a == "--dump-catalog"),
    })
}

fn perform(options: &Options) -> Result<(), Box<dyn Error>> {
    let config = match &options.config {
        Some(path) => ArtConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ArtConfig::embedded_default()?,
    };
    let tempo_config = config.tempo;

    let seed = Seed::resolve(&options.seed_mode);
    tracing::info!(token = seed.token(), value = seed.value(), "seed resolved");
    let mut art = Artwork::new(config, seed)?;

    let mut loader = match &options.midi {
        Some(path) => ScoreLoader::from_file(path.clone(), options.track),
        None => ScoreLoader::spawn(move || Ok(pulse_score(&tempo_config, PULSE_BEATS))),
    };

    // Loading: the canvas stays static and clicks do nothing.
    let mut transport = VirtualTransport::new(0.0);
    let score = loop {
        match loader.poll() {
            Some(Ok(score)) => break score,
            Some(Err(e)) => {
                art.score_failed(e.to_string());
                return Err(e.into());
            }
            None => {
                art.frame(&transport);
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    };
    if u32::from(score.ppq) != tempo_config.ppq {
        tracing::warn!(
            score_ppq = score.ppq,
            config_ppq = tempo_config.ppq,
            "score resolution differs from configured tempo; transition lengths follow the config"
        );
    }

    // Let the last note ring for a beat past the final tick.
    let tail = 60.0 / tempo_config.bpm;
    transport = VirtualTransport::new(score.duration_secs + tail);
    art.score_ready(&mut transport, &score.notes);
    art.toggle_playback(&mut transport);

    let dt = 1.0 / options.fps;
    let max_frames = (MAX_PERFORMANCE_SECS * options.fps) as u64;
    let mut frames = 0u64;
    let mut cells_drawn = 0u64;
    let mut transitions = Vec::new();
    let mut ended = false;

    while !ended && frames < max_frames {
        for event in transport.advance(dt) {
            match event {
                TransportEvent::Cue { cue, at } => {
                    if let Some(t) = art.on_cue(&cue, at) {
                        transitions.push(TransitionRecord {
                            cue: t.cue_number,
                            at_secs: at,
                            act: t.act,
                            scene_index: t.scene_index,
                            duration_ms: t.duration_ms,
                            rotated: t.rotated,
                            blend_mode: art.blend_mode(),
                        });
                    }
                }
                TransportEvent::Ended => {
                    art.transport_ended();
                    ended = true;
                }
            }
        }
        let frame = art.frame(&transport);
        if let Some(plan) = art.plan(&frame, options.viewport) {
            cells_drawn += plan.cells.len() as u64;
        }
        if let Frame::Live(state) = frame {
            tracing::trace!(snapshot = ?state.snapshot, "frame");
        }
        frames += 1;
    }
    if !ended {
        tracing::warn!(frames, "stopped before the score ended");
    }

    let summary = Summary {
        token: art.seed().token(),
        seed: art.seed().value(),
        base_hue: art.harmony().base,
        cues: art.cues().len(),
        frames,
        cells_drawn,
        duration_secs: transport.buffer_duration(),
        transitions,
        catalog: options.dump_catalog.then(|| art.catalog()),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// One quarter note per beat for `beats` beats at the configured tempo.
fn pulse_score(tempo: &TempoConfig, beats: u64) -> Score {
    let ticks = u64::from(tempo.ppq);
    let beat_secs = 60.0 / tempo.bpm;
    let notes = (0..beats)
        .map(|i| NoteEvent {
            tick: i * ticks,
            time: i as f64 * beat_secs,
            duration_ticks: ticks,
        })
        .collect();
    Score {
        ppq: u16::try_from(tempo.ppq).unwrap_or(u16::MAX),
        track_count: 1,
        initial_bpm: tempo.bpm,
        duration_secs: beats as f64 * beat_secs,
        notes,
    }
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("player")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn parse_flag_reads_typed_values() {
        let a = args(&["--fps", "30", "--track", "2"]);
        assert_eq!(parse_flag::<f64>(&a, "--fps"), Some(30.0));
        assert_eq!(parse_flag::<usize>(&a, "--track"), Some(2));
        assert_eq!(parse_flag::<usize>(&a, "--width"), None);
        assert_eq!(parse_flag::<usize>(&args(&["--track", "x"]), "--track"), None);
    }

    #[test]
    fn seed_mode_selection() {
        let derived = parse_options(&args(&["--hash", "0xab", "--token-id", "7"])).unwrap();
        assert_eq!(
            derived.seed_mode,
            SeedMode::Derived(PlatformIdentity::new("0xab", "7"))
        );

        let replay = parse_options(&args(&["--token", "ooXYZ"])).unwrap();
        assert_eq!(replay.seed_mode, SeedMode::Replay("ooXYZ".to_string()));

        let minted = parse_options(&args(&[])).unwrap();
        assert_eq!(minted.seed_mode, SeedMode::SelfGenerated);

        assert!(parse_options(&args(&["--hash", "0xab"])).is_err());
        assert!(parse_options(&args(&["--token", "t", "--hash", "h", "--token-id", "1"])).is_err());
    }

    #[test]
    fn options_defaults() {
        let options = parse_options(&args(&["--dump-catalog"])).unwrap();
        assert_eq!(options.fps, 60.0);
        assert_eq!(options.viewport, Viewport::new(1920.0, 1080.0));
        assert!(options.dump_catalog);
        assert!(options.midi.is_none());
        assert!(parse_options(&args(&["--fps", "0"])).is_err());
    }

    #[test]
    fn pulse_follows_tempo() {
        let score = pulse_score(&TempoConfig::default(), 4);
        assert_eq!(score.notes.len(), 4);
        assert_eq!(score.notes[1].tick, 15360);
        assert_eq!(score.notes[1].time, 0.3);
        assert_eq!(score.notes[3].duration_ticks, 15360);
        assert_eq!(score.ppq, 15360);
    }
}
