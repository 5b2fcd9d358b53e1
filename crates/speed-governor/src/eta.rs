//! Arrival time projection

use chrono::{DateTime, Duration, FixedOffset, Local, Offset, TimeZone};
use dms::SafetyState;
use serde::{Deserialize, Serialize};

use crate::EtaConfig;

/// Projected arrival
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtaEstimate {
    pub arrival: DateTime<FixedOffset>,
    /// Total minutes from the projection instant
    pub offset_minutes: i64,
    /// Local time-of-day string for display
    pub formatted: String,
}

/// Stateless ETA projector.
///
/// Each projection is measured from the supplied instant; penalties from
/// earlier states never accumulate.
#[derive(Debug, Clone)]
pub struct EtaProjector {
    config: EtaConfig,
}

impl EtaProjector {
    pub fn new(config: EtaConfig) -> Self {
        Self { config }
    }

    pub fn penalty_minutes(&self, state: SafetyState) -> i64 {
        match state {
            SafetyState::Normal => 0,
            SafetyState::Drowsy => self.config.drowsy_penalty_minutes as i64,
            SafetyState::Critical => self.config.critical_penalty_minutes as i64,
        }
    }

    /// Project from the local wall clock
    pub fn project(&self, state: SafetyState) -> EtaEstimate {
        self.project_at(state, &Local::now())
    }

    /// Project from an explicit instant
    pub fn project_at<Tz: TimeZone>(&self, state: SafetyState, now: &DateTime<Tz>) -> EtaEstimate {
        let now = now.with_timezone(&now.offset().fix());
        let offset_minutes = self.config.base_offset_minutes as i64 + self.penalty_minutes(state);
        let arrival = now + Duration::minutes(offset_minutes);

        EtaEstimate {
            formatted: arrival.format(&self.config.time_format).to_string(),
            arrival,
            offset_minutes,
        }
    }
}

impl Default for EtaProjector {
    fn default() -> Self {
        Self::new(EtaConfig::default())
    }
}
