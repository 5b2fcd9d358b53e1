//! Governor and ETA configuration

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::GovernorError;

/// Configuration for the speed governor
///
/// `max_speed` must be positive; every target formula scales from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Speed targeted while the driver is alert (km/h)
    pub max_speed: f64,
    /// Speed at start-up (km/h)
    pub initial_speed: f64,
    /// Fraction of max speed targeted while drowsy
    pub drowsy_ratio: f64,
    /// Lowest drowsy target, so a partial slowdown never stalls the vehicle
    pub drowsy_floor: f64,
    /// Fraction of the remaining gap closed per tick
    pub smoothing_factor: f64,
    /// Gap below which speed snaps to target
    pub snap_tolerance: f64,
    /// Governor tick period in milliseconds
    pub tick_period_ms: u64,
    /// Fraction of the gap closed per display tick
    pub display_smoothing_factor: f64,
    /// Display tick period in milliseconds
    pub display_tick_period_ms: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_speed: 100.0,
            initial_speed: 80.0,
            drowsy_ratio: 0.3,
            drowsy_floor: 30.0,
            smoothing_factor: 0.05,
            snap_tolerance: 1.0,
            tick_period_ms: 100,
            display_smoothing_factor: 0.1,
            display_tick_period_ms: 50,
        }
    }
}

impl GovernorConfig {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn display_tick_period(&self) -> Duration {
        Duration::from_millis(self.display_tick_period_ms)
    }

    pub fn validate(&self) -> Result<(), GovernorError> {
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            return Err(GovernorError::InvalidMaxSpeed(self.max_speed));
        }
        if !self.initial_speed.is_finite() || self.initial_speed < 0.0 {
            return Err(GovernorError::Config(format!(
                "initial speed must be non-negative, got {}",
                self.initial_speed
            )));
        }
        if !(self.drowsy_ratio.is_finite() && (0.0..=1.0).contains(&self.drowsy_ratio)) {
            return Err(GovernorError::Config(format!(
                "drowsy ratio must lie in [0, 1], got {}",
                self.drowsy_ratio
            )));
        }
        if !self.drowsy_floor.is_finite() || self.drowsy_floor < 0.0 {
            return Err(GovernorError::Config(format!(
                "drowsy floor must be non-negative, got {}",
                self.drowsy_floor
            )));
        }
        for (name, factor) in [
            ("smoothing factor", self.smoothing_factor),
            ("display smoothing factor", self.display_smoothing_factor),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(GovernorError::Config(format!(
                    "{} must lie in (0, 1], got {}",
                    name, factor
                )));
            }
        }
        if !(self.snap_tolerance.is_finite() && self.snap_tolerance > 0.0) {
            return Err(GovernorError::Config(format!(
                "snap tolerance must be positive, got {}",
                self.snap_tolerance
            )));
        }
        if self.tick_period_ms == 0 || self.display_tick_period_ms == 0 {
            return Err(GovernorError::Config("tick periods must be non-zero".into()));
        }
        Ok(())
    }
}

/// Configuration for arrival time projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtaConfig {
    /// Trip duration at normal pace
    pub base_offset_minutes: u32,
    pub drowsy_penalty_minutes: u32,
    pub critical_penalty_minutes: u32,
    /// chrono strftime pattern for the time-of-day string
    pub time_format: String,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            base_offset_minutes: 150,
            drowsy_penalty_minutes: 15,
            critical_penalty_minutes: 45,
            time_format: "%I:%M %p".to_string(),
        }
    }
}

impl EtaConfig {
    pub fn validate(&self) -> Result<(), GovernorError> {
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(GovernorError::Config(format!(
                "invalid ETA time format '{}'",
                self.time_format
            )));
        }
        Ok(())
    }
}
