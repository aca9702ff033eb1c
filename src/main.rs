// Copyright (c) 2026 framewatch contributors
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT
// See the LICENSE file at the repository root.
// src/main.rs

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use framewatch::config::{ResolutionPreset, RATE_PRESETS};
use framewatch::core::capture_loop::{LoopObserver, LoopState};
use framewatch::report::ExportOutcome;
use framewatch::source::{FrameSource, ImageSequenceSource};
use framewatch::{Analyzer, Incident, Region, Settings};

/// Watches a screen region for green pixels, dropped frames and tearing.
#[derive(Parser, Debug)]
#[command(name = "framewatch", version)]
struct Cli {
    /// TOML settings file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capture region as LEFT,TOP,RIGHT,BOTTOM.
    #[arg(long, value_parser = parse_region, conflicts_with = "preset")]
    region: Option<Region>,

    /// Center a preset resolution (640x480, 1280x720, 1920x1080) on the screen.
    #[arg(long, value_name = "WxH")]
    preset: Option<String>,

    /// Screen size used with --preset. Defaults to the source's own size.
    #[arg(long, value_name = "WxH", value_parser = parse_size, requires = "preset")]
    screen: Option<(u32, u32)>,

    /// Samples per second.
    #[arg(long)]
    fps: Option<f64>,

    /// `screen` for live capture, or a directory of PNG frames to replay.
    #[arg(long, default_value = "screen")]
    source: String,

    /// Stop after this many seconds instead of waiting for Enter.
    #[arg(long, value_name = "SECS", value_parser = parse_duration)]
    duration: Option<Duration>,

    /// Parent directory for the exported report.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    no_saturation: bool,

    #[arg(long)]
    no_timing_gap: bool,

    #[arg(long)]
    no_discontinuity: bool,
}

fn parse_region(s: &str) -> Result<Region, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    let [left, top, right, bottom] = parts[..] else {
        return Err(format!("expected LEFT,TOP,RIGHT,BOTTOM, got {:?}", s));
    };
    Region::new(left, top, right, bottom).map_err(|e| e.to_string())
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.trim().parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{:?} is not a usable duration: {}", s, e))
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {:?}", s))?;
    let w = w.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    let h = h.trim().parse().map_err(|e: std::num::ParseIntError| e.to_string())?;
    Ok((w, h))
}

/// Prints each incident as it is logged.
struct ConsoleObserver;

impl LoopObserver for ConsoleObserver {
    fn on_incident(&mut self, incident: &Incident) {
        println!(
            "[{}] {}: {}",
            incident.timestamp().format("%H:%M:%S%.3f"),
            incident.kind(),
            incident.detail()
        );
    }
}

fn build_settings(cli: &Cli) -> framewatch::Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(fps) = cli.fps {
        if !RATE_PRESETS.iter().any(|&p| f64::from(p) == fps) {
            info!(fps, presets = ?RATE_PRESETS, "using a rate outside the presets");
        }
        settings.target_rate = fps;
    }
    if let Some(region) = cli.region {
        settings.region = Some(region);
    }
    if let Some(output) = &cli.output {
        settings.output_dir = output.clone();
    }
    if cli.no_saturation {
        settings.detect_saturation = false;
    }
    if cli.no_timing_gap {
        settings.detect_timing_gap = false;
    }
    if cli.no_discontinuity {
        settings.detect_discontinuity = false;
    }
    Ok(settings)
}

/// Resolves --preset against --screen or the source's own size.
fn apply_preset(
    cli: &Cli,
    analyzer: &mut Analyzer,
    source_size: impl FnOnce() -> framewatch::Result<(u32, u32)>,
) -> framewatch::Result<()> {
    let Some(preset) = &cli.preset else {
        return Ok(());
    };
    let preset: ResolutionPreset = preset.parse()?;
    let (screen_width, screen_height) = match cli.screen {
        Some(size) => size,
        None => source_size()?,
    };
    analyzer.set_region(preset.centered_on(screen_width, screen_height)?);
    Ok(())
}

/// Runs one capture session and exports its report.
fn session<S: FrameSource + 'static>(
    cli: &Cli,
    mut analyzer: Analyzer,
    source: S,
) -> framewatch::Result<bool> {
    let region = analyzer.settings().region()?;
    analyzer.start_with_observer(source, Box::new(ConsoleObserver))?;
    println!(
        "Capturing {} at {} fps. Press Enter to stop.",
        region,
        analyzer.settings().target_rate
    );

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_ok() {
            let _ = tx.send(());
        }
    });

    // A deadline past what `Instant` can hold means waiting for Enter.
    let deadline = cli.duration.and_then(|d| Instant::now().checked_add(d));
    loop {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(()) => break,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        // The worker drops to Idle by itself when a capture fails.
        if analyzer.state() == LoopState::Idle {
            break;
        }
    }

    let mut clean = true;
    match analyzer.stop() {
        Ok(Some(summary)) => println!(
            "Stopped after {} samples, {} incidents ({} over budget).",
            summary.iterations, summary.incidents, summary.overruns
        ),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Capture stopped: {}", e);
            clean = false;
        }
    }
    if let Some(e) = analyzer.take_failure() {
        eprintln!("Capture stopped: {}", e);
        clean = false;
    }

    match analyzer.export_report(None)? {
        ExportOutcome::NothingToReport => println!("No incidents to report."),
        ExportOutcome::Written(path) => println!("Report saved to {}", path.display()),
    }
    Ok(clean)
}

fn run(cli: &Cli) -> framewatch::Result<bool> {
    let mut analyzer = Analyzer::new(build_settings(cli)?)?;

    if cli.source == "screen" {
        #[cfg(feature = "screen")]
        {
            let source = framewatch::source::ScreenSource::primary()?;
            apply_preset(cli, &mut analyzer, || source.size())?;
            return session(cli, analyzer, source);
        }
        #[cfg(not(feature = "screen"))]
        {
            return Err(framewatch::Error::Config(
                "built without screen capture; rebuild with --features screen or pass --source DIR"
                    .into(),
            ));
        }
    }

    let source = ImageSequenceSource::open(&PathBuf::from(&cli.source))?;
    apply_preset(cli, &mut analyzer, || source.frame_size())?;
    session(cli, analyzer, source)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framewatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
