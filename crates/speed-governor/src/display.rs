//! Display smoothing for speed readouts
//!
//! Purely cosmetic: trails the authoritative governor speed so a dial or
//! digital readout animates instead of jumping. Never feeds back into the
//! governor or the ETA.

use crate::governor::approach;
use crate::GovernorConfig;

pub struct SpeedDisplay {
    displayed: f64,
    factor: f64,
    tolerance: f64,
}

impl SpeedDisplay {
    pub fn new(config: &GovernorConfig) -> Self {
        Self {
            displayed: config.initial_speed,
            factor: config.display_smoothing_factor,
            tolerance: config.snap_tolerance,
        }
    }

    /// Step toward the authoritative speed and return the displayed value
    pub fn tick(&mut self, authoritative_speed: f64) -> f64 {
        self.displayed = approach(self.displayed, authoritative_speed, self.factor, self.tolerance);
        self.displayed
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }
}
