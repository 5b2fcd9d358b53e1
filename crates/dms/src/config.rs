//! DMS configuration

use serde::{Deserialize, Serialize};

use crate::DmsError;
use crate::state::SafetyThresholds;

/// DMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// Openness at or below which the driver is critical (percent)
    pub critical_threshold: f64,

    /// Openness at or below which the driver is drowsy (percent)
    pub drowsy_threshold: f64,

    /// Empirical factor mapping lid-height / corner-distance to percent
    pub openness_scale: f64,

    /// Extra openness a sample must move past a threshold before the
    /// state changes. 0 disables hysteresis.
    pub hysteresis_margin: f64,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 25.0,
            drowsy_threshold: 50.0,
            openness_scale: 500.0,
            hysteresis_margin: 0.0,
        }
    }
}

impl DmsConfig {
    /// Create strict config (escalates earlier)
    pub fn strict() -> Self {
        Self {
            critical_threshold: 30.0,
            drowsy_threshold: 60.0,
            ..Default::default()
        }
    }

    /// Create lenient config (escalates later)
    pub fn lenient() -> Self {
        Self {
            critical_threshold: 20.0,
            drowsy_threshold: 40.0,
            ..Default::default()
        }
    }

    pub fn thresholds(&self) -> SafetyThresholds {
        SafetyThresholds {
            critical: self.critical_threshold,
            drowsy: self.drowsy_threshold,
        }
    }

    /// Reject configurations the classifier and estimator cannot honor
    pub fn validate(&self) -> Result<(), DmsError> {
        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        if !in_range(self.critical_threshold) || !in_range(self.drowsy_threshold) {
            return Err(DmsError::Config(format!(
                "thresholds must lie in [0, 100], got critical={} drowsy={}",
                self.critical_threshold, self.drowsy_threshold
            )));
        }
        if self.critical_threshold >= self.drowsy_threshold {
            return Err(DmsError::Config(format!(
                "critical threshold {} must be below drowsy threshold {}",
                self.critical_threshold, self.drowsy_threshold
            )));
        }
        if !self.openness_scale.is_finite() || self.openness_scale <= 0.0 {
            return Err(DmsError::Config(format!(
                "openness scale must be positive, got {}",
                self.openness_scale
            )));
        }
        if !self.hysteresis_margin.is_finite() || self.hysteresis_margin < 0.0 {
            return Err(DmsError::Config(format!(
                "hysteresis margin must be non-negative, got {}",
                self.hysteresis_margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(DmsConfig::default().validate().is_ok());
        assert!(DmsConfig::strict().validate().is_ok());
        assert!(DmsConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = DmsConfig {
            critical_threshold: 60.0,
            drowsy_threshold: 50.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DmsError::Config(_))));
    }

    #[test]
    fn test_rejects_bad_scale_and_margin() {
        let config = DmsConfig {
            openness_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DmsConfig {
            hysteresis_margin: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
