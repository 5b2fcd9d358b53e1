//! Speed Governor
//!
//! Drives the simulated vehicle speed from the driver's safety state:
//! - Exponential approach toward a state-dependent target speed
//! - Cosmetic display smoothing for speed readouts
//! - Arrival time projection with safety penalties

mod config;
mod display;
mod eta;
mod governor;

pub use config::{EtaConfig, GovernorConfig};
pub use display::SpeedDisplay;
pub use eta::{EtaEstimate, EtaProjector};
pub use governor::{approach, target_speed, GovernorState, SpeedGovernor};

use thiserror::Error;

/// Governor error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GovernorError {
    /// Max speed must be finite and positive
    #[error("Invalid max speed {0}: must be finite and > 0")]
    InvalidMaxSpeed(f64),

    #[error("Configuration error: {0}")]
    Config(String),
}
