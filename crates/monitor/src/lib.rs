//! Drowsiness Monitor
//!
//! Wires the landmark feed, DMS, speed governor, and alerting into one
//! cooperative runtime and publishes dashboard snapshots and safety events
//! for renderers.

mod monitor;
mod runtime;
mod settings;

pub use monitor::{DashboardSnapshot, DrowsinessMonitor, SourceStatus};
pub use runtime::MonitorHandle;
pub use settings::MonitorConfig;

use thiserror::Error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Dms(#[from] dms::DmsError),

    #[error(transparent)]
    Governor(#[from] speed_governor::GovernorError),

    #[error(transparent)]
    Capture(#[from] landmark_source::CaptureError),

    #[error("Monitor task failed: {0}")]
    Task(String),
}

/// Initialize logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logging(json: bool) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}
