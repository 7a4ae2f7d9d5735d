use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use backtrack::{
    Config, LandmarkSet, Notifier, Permission, PlatformNotification, PostureMonitor, PostureStatus,
};
use clap::Parser;
use log::{info, warn};

/// Replay recorded pose landmarks through the posture monitor
#[derive(Parser, Debug)]
#[command(name = "backtrack", version)]
struct Args {
    /// JSON-lines file, one landmark array (or null) per frame
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate of the recording
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Calibrate the slouch baseline from the first frames
    #[arg(long)]
    calibrate: bool,

    /// Keep alerts in-app only
    #[arg(long)]
    no_platform: bool,

    /// Write the default config to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

/// Prints platform notifications to stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&mut self) -> Permission {
        Permission::Granted
    }

    fn show(&mut self, notification: PlatformNotification) {
        eprintln!("[{}] {}", notification.title, notification.body);
    }
}

fn read_frames(path: &Path) -> Result<Vec<Option<LandmarkSet>>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut frames = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Option<LandmarkSet>>(&line) {
            Ok(frame) => frames.push(frame),
            Err(e) => warn!("line {}: skipping unreadable frame: {e}", number + 1),
        }
    }
    Ok(frames)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Some(path) = &args.write_default_config {
        Config::default().save(path)?;
        println!("Default config written to {}", path.display());
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }
    let Some(input) = &args.input else {
        bail!("--input is required unless --write-default-config is given");
    };

    let frames = read_frames(input)?;
    info!("replaying {} frames from {}", frames.len(), input.display());

    let notifier: Option<Box<dyn Notifier>> = if args.no_platform {
        None
    } else {
        Some(Box::new(ConsoleNotifier))
    };
    let mut monitor = PostureMonitor::new(&config, notifier);
    monitor.notifications_mut().request_permission();
    if args.calibrate {
        monitor.begin_calibration(config.calibration.hold_frames);
    }
    monitor.start();

    let frame_time = Duration::from_secs_f64(1.0 / args.fps);
    let mut previous = PostureStatus::NotDetected;
    for (index, frame) in frames.iter().enumerate() {
        let analysis = monitor.tick(frame.as_ref(), frame_time);
        if analysis.status != previous {
            info!(
                "frame {index}: {previous} -> {} (confidence {}%)",
                analysis.status, analysis.confidence
            );
            previous = analysis.status;
        }
    }
    monitor.stop();

    let store = monitor.store();
    let stats = store.session_stats();
    println!("Session time:   {:.1}s", stats.total_time);
    println!("Good posture:   {:.1}s ({}%)", stats.good_posture_time, store.posture_score());
    println!("Alerts:         {}", stats.alerts);
    match store.slouch_baseline() {
        Some(baseline) => println!("Slouch baseline: {baseline:.4}"),
        None => println!("Slouch baseline: not calibrated"),
    }

    Ok(())
}
