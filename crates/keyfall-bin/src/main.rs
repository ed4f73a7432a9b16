// keyfall: headless rhythm session runner.
//
// Plays a chart (from file, or a seeded demo) with scripted input against the
// audio clock and prints the session report as JSON.

mod demo;
mod renderer;
mod runner;
mod sound;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use keyfall_config::GameConfig;
use keyfall_input::{KeyMap, ScriptedInputConfig};
use keyfall_model::{Chart, ChartFile};
use keyfall_play::SessionReport;
use keyfall_timing::{AudioClock, SystemOutput};
use log::{info, warn};

use sound::SilentSounds;

/// Beats tapped in a calibration run.
const CALIBRATION_BEATS: usize = 16;

#[derive(Parser, Debug)]
#[command(name = "keyfall", about = "Headless rhythm session runner")]
struct Args {
    /// Chart JSON file. A seeded demo chart is generated when omitted.
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Game config JSON file.
    #[arg(long, env = "KEYFALL_CONFIG", default_value = "keyfall.json")]
    config: PathBuf,

    /// Autoplay press offset in milliseconds. Negative presses early.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    autoplay_offset_ms: f64,

    /// Skip every n-th note in autoplay.
    #[arg(long)]
    miss_every: Option<usize>,

    /// Seed for the demo chart.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of notes in the demo chart.
    #[arg(long, default_value_t = 32)]
    demo_notes: usize,

    /// Frame interval in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Also write the report JSON to this file.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Tap along to a click track instead of playing, and save the measured
    /// calibration offset to the config file.
    #[arg(long)]
    calibrate: bool,
}

impl Args {
    fn autoplay(&self) -> ScriptedInputConfig {
        ScriptedInputConfig {
            offset_us: (self.autoplay_offset_ms * 1_000.0).round() as i64,
            miss_every: self.miss_every,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("keyfall starting");

    let config = load_config(&args.config);
    if args.calibrate {
        return run_calibration(&args, config);
    }

    let chart = load_chart(&args, &config)?;
    info!(
        "Chart: {} notes, {} lanes, {:.2}s",
        chart.len(),
        chart.lane_count(),
        chart.duration_us() as f64 / 1_000_000.0
    );
    if chart.lane_count() != config.lane_count {
        warn!(
            "Chart has {} lanes but config binds {}",
            chart.lane_count(),
            config.lane_count
        );
    }

    let report = run(&args, &config, chart)?;

    let json = serde_json::to_string_pretty(&report)?;
    println!("{json}");
    if let Some(path) = &args.report {
        std::fs::write(path, &json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}

/// Load config from file, falling back to defaults if missing or invalid.
fn load_config(path: &Path) -> GameConfig {
    match GameConfig::read(path) {
        Ok(config) => {
            info!("Loaded config {}", path.display());
            config
        }
        Err(e) if path.exists() => {
            warn!("{e:#}; using defaults");
            GameConfig::default()
        }
        Err(_) => {
            info!("Config {} not found, using defaults", path.display());
            GameConfig::default()
        }
    }
}

fn load_chart(args: &Args, config: &GameConfig) -> Result<Chart> {
    let Some(path) = &args.chart else {
        info!("No chart given, generating demo chart (seed {})", args.seed);
        return Ok(demo::demo_chart(args.seed, config.lane_count, args.demo_notes)?);
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chart {}", path.display()))?;
    let file: ChartFile = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse chart {}", path.display()))?;
    if !file.title.is_empty() {
        info!("Loaded chart \"{}\" by {}", file.title, file.artist);
    }
    file.to_chart()
        .with_context(|| format!("Invalid chart {}", path.display()))
}

#[cfg(not(feature = "kira"))]
fn run(args: &Args, config: &GameConfig, chart: Chart) -> Result<SessionReport> {
    if let Some(song) = &config.audio.song_path {
        warn!(
            "Built without audio output; ignoring song {} and using the system clock",
            song.display()
        );
    }
    run_system(args, config, chart)
}

#[cfg(feature = "kira")]
fn run(args: &Args, config: &GameConfig, chart: Chart) -> Result<SessionReport> {
    use keyfall_play::SessionError;
    use keyfall_timing::KiraOutput;

    let sounds = match sound::KiraSounds::load(&config.audio) {
        Ok(sounds) => sounds,
        Err(e) => {
            warn!("{e}; falling back to the system clock");
            return run_system(args, config, chart);
        }
    };
    let output = KiraOutput::new(config.audio.song_path.clone());
    let keys = KeyMap::from_bindings(&config.key_bindings);
    let mut session = runner::build_session(output, chart.clone(), sounds, config);
    match runner::play(&mut session, &keys, args.autoplay(), frame_waiter(args.frame_ms)) {
        Err(e) if matches!(
            e.downcast_ref::<SessionError>(),
            Some(SessionError::PlaybackUnavailable(_))
        ) =>
        {
            warn!("{e:#}; falling back to the system clock");
            run_system(args, config, chart)
        }
        result => result,
    }
}

fn run_system(args: &Args, config: &GameConfig, chart: Chart) -> Result<SessionReport> {
    let keys = KeyMap::from_bindings(&config.key_bindings);
    let mut session = runner::build_session(SystemOutput::new(), chart, SilentSounds, config);
    runner::play(&mut session, &keys, args.autoplay(), frame_waiter(args.frame_ms))
}

fn run_calibration(args: &Args, mut config: GameConfig) -> Result<()> {
    let beats = demo::metronome_chart(CALIBRATION_BEATS)?;
    let mut clock = AudioClock::new(SystemOutput::new());
    clock.set_offset_us(config.calibration_offset_us());
    info!("Calibrating against {} beats", beats.len());

    let Some(result) =
        runner::calibrate(&mut clock, &beats, args.autoplay(), frame_waiter(args.frame_ms))?
    else {
        bail!("Not enough taps to suggest a calibration offset");
    };
    apply_calibration(&mut config, result.suggested_offset_us);
    config
        .write(&args.config)
        .with_context(|| format!("Failed to write config {}", args.config.display()))?;
    info!(
        "Calibration offset {:.1}ms saved to {}",
        config.calibration_offset_ms,
        args.config.display()
    );
    println!("{}", config.calibration_offset_ms);
    Ok(())
}

/// Store a measured offset, clamped to the config's accepted range.
fn apply_calibration(config: &mut GameConfig, offset_us: i64) {
    config.calibration_offset_ms = offset_us as f64 / 1_000.0;
    config.validate();
}

fn frame_waiter(frame_ms: u64) -> impl FnMut() {
    let frame = Duration::from_millis(frame_ms.max(1));
    move || std::thread::sleep(frame)
}
