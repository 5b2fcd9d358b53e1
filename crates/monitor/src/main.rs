//! Drowsiness Monitor - Main Entry Point

use std::path::PathBuf;
use std::time::Duration;

use alerting::LogAlarm;
use clap::Parser;
use landmark_source::synthetic::{scripted_fixture, Segment};
use landmark_source::{ReplayFixture, ReplaySource};
use monitor::{init_logging, MonitorConfig, MonitorHandle};
use tracing::info;

#[derive(Parser)]
#[command(name = "drowsiness-monitor")]
#[command(about = "Driver drowsiness monitor: eye openness to safety state, speed, and ETA")]
struct Cli {
    /// Configuration file (TOML, YAML, or JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Landmark replay fixture; a scripted demo drive is used when omitted
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Seconds to run before shutting down
    #[arg(long, default_value = "25")]
    duration_secs: u64,

    /// Emit JSON logs
    #[arg(long)]
    json: bool,
}

/// Alert, drowsy, eyes closed, face lost, recovered
fn demo_drive(frame_interval_ms: u64) -> ReplayFixture {
    let fps = (1000 / frame_interval_ms.max(1)) as usize;
    scripted_fixture(
        &[
            Segment::Eyes { ratio: 0.2, frames: 3 * fps },
            Segment::Eyes { ratio: 0.08, frames: 4 * fps },
            Segment::Eyes { ratio: 0.02, frames: 6 * fps },
            Segment::NoFace { frames: fps },
            Segment::Eyes { ratio: 0.18, frames: 8 * fps },
        ],
        frame_interval_ms,
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::load(cli.config.as_deref())?;
    let fixture = match &cli.fixture {
        Some(path) => ReplayFixture::load(path)?,
        None => demo_drive(config.capture.frame_interval().as_millis() as u64),
    };
    let source = ReplaySource::new(fixture, config.capture.clone());

    let handle = MonitorHandle::spawn(config, Box::new(source), Box::new(LogAlarm))?;
    let mut events = handle.subscribe();
    let snapshots = handle.snapshots();

    let deadline = tokio::time::sleep(Duration::from_secs(cli.duration_secs));
    tokio::pin!(deadline);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut report = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
            Ok(event) = events.recv() => {
                info!(?event, "Safety event");
            }
            _ = report.tick() => {
                let s = snapshots.borrow().clone();
                info!(
                    state = %s.safety_state,
                    mode = %s.mode,
                    openness = %format!("{:.0}%", s.openness_percent),
                    face = s.face_detected,
                    speed = %format!("{:.0}", s.displayed_speed),
                    eta = %s.eta,
                    "Dashboard"
                );
            }
        }
    }

    handle.shutdown().await?;
    info!("Shutdown complete");
    Ok(())
}
