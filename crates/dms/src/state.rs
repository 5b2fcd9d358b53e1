//! Driver safety state classification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete safety state, ordered by severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SafetyState {
    #[default]
    Normal,
    Drowsy,
    Critical,
}

impl SafetyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyState::Normal => "normal",
            SafetyState::Drowsy => "drowsy",
            SafetyState::Critical => "critical",
        }
    }

    /// Operating mode the vehicle is in while in this state
    pub fn mode_label(&self) -> &'static str {
        match self {
            SafetyState::Normal => "Normal Operation",
            SafetyState::Drowsy => "Safety Mode",
            SafetyState::Critical => "Emergency Mode",
        }
    }
}

impl fmt::Display for SafetyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Openness thresholds; each value belongs to the stricter band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafetyThresholds {
    pub critical: f64,
    pub drowsy: f64,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            critical: 25.0,
            drowsy: 50.0,
        }
    }
}

/// Map an openness percentage to a safety state.
///
/// Pure and memoryless: `<= critical` is Critical, `<= drowsy` is Drowsy,
/// anything above is Normal.
pub fn classify(openness_percent: f64, thresholds: &SafetyThresholds) -> SafetyState {
    if openness_percent <= thresholds.critical {
        SafetyState::Critical
    } else if openness_percent <= thresholds.drowsy {
        SafetyState::Drowsy
    } else {
        SafetyState::Normal
    }
}

/// Classifier that holds its state until a sample clears the threshold by
/// `margin`. With a zero margin it is identical to [`classify`].
#[derive(Debug, Clone)]
pub struct HysteresisClassifier {
    thresholds: SafetyThresholds,
    margin: f64,
    last: Option<SafetyState>,
}

impl HysteresisClassifier {
    pub fn new(thresholds: SafetyThresholds, margin: f64) -> Self {
        Self {
            thresholds,
            margin: margin.max(0.0),
            last: None,
        }
    }

    pub fn classify(&mut self, openness_percent: f64) -> SafetyState {
        let raw = classify(openness_percent, &self.thresholds);
        let next = match self.last {
            Some(last) if raw < last => {
                classify(openness_percent - self.margin, &self.thresholds).min(last)
            }
            Some(last) if raw > last => {
                classify(openness_percent + self.margin, &self.thresholds).max(last)
            }
            _ => raw,
        };
        self.last = Some(next);
        next
    }

    pub fn current(&self) -> Option<SafetyState> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defaults() -> SafetyThresholds {
        SafetyThresholds::default()
    }

    #[test]
    fn test_boundaries_belong_to_stricter_state() {
        let t = defaults();
        assert_eq!(classify(25.0, &t), SafetyState::Critical);
        assert_eq!(classify(25.0001, &t), SafetyState::Drowsy);
        assert_eq!(classify(50.0, &t), SafetyState::Drowsy);
        assert_eq!(classify(50.0001, &t), SafetyState::Normal);
        assert_eq!(classify(0.0, &t), SafetyState::Critical);
        assert_eq!(classify(100.0, &t), SafetyState::Normal);
    }

    #[test]
    fn test_single_low_sample_flips_immediately() {
        let t = defaults();
        assert_eq!(classify(90.0, &t), SafetyState::Normal);
        assert_eq!(classify(10.0, &t), SafetyState::Critical);
        assert_eq!(classify(90.0, &t), SafetyState::Normal);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(SafetyState::Normal < SafetyState::Drowsy);
        assert!(SafetyState::Drowsy < SafetyState::Critical);
        assert_eq!(SafetyState::Critical.mode_label(), "Emergency Mode");
        assert_eq!(SafetyState::Drowsy.to_string(), "drowsy");
    }

    #[test]
    fn test_hysteresis_holds_near_threshold() {
        let mut c = HysteresisClassifier::new(defaults(), 5.0);
        assert_eq!(c.classify(20.0), SafetyState::Critical);
        // Just above 25 is not enough to leave Critical
        assert_eq!(c.classify(27.0), SafetyState::Critical);
        assert_eq!(c.classify(31.0), SafetyState::Drowsy);
        // Dipping slightly below 25 does not re-enter Critical
        assert_eq!(c.classify(22.0), SafetyState::Drowsy);
        assert_eq!(c.classify(19.0), SafetyState::Critical);
    }

    #[test]
    fn test_hysteresis_never_overshoots_past_last_state() {
        let mut c = HysteresisClassifier::new(defaults(), 40.0);
        assert_eq!(c.classify(40.0), SafetyState::Drowsy);
        // Improving to 60 minus a huge margin must not make things worse
        assert_eq!(c.classify(60.0), SafetyState::Drowsy);
        c.reset();
        assert_eq!(c.current(), None);
    }

    proptest! {
        #[test]
        fn prop_bands(openness in 0.0f64..=100.0) {
            let state = classify(openness, &defaults());
            let expected = if openness <= 25.0 {
                SafetyState::Critical
            } else if openness <= 50.0 {
                SafetyState::Drowsy
            } else {
                SafetyState::Normal
            };
            prop_assert_eq!(state, expected);
            // No hidden memory
            prop_assert_eq!(classify(openness, &defaults()), state);
        }

        #[test]
        fn prop_zero_margin_matches_pure(samples in prop::collection::vec(0.0f64..=100.0, 1..50)) {
            let mut c = HysteresisClassifier::new(defaults(), 0.0);
            for s in samples {
                prop_assert_eq!(c.classify(s), classify(s, &defaults()));
            }
        }
    }
}
