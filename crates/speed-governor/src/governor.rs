//! Speed Governor Implementation

use dms::SafetyState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{GovernorConfig, GovernorError};

/// Target speed for a safety state.
///
/// Normal runs at max speed, Drowsy at `max(floor, ratio * max)` (never
/// above max), Critical brings the vehicle to a stop.
pub fn target_speed(state: SafetyState, config: &GovernorConfig) -> f64 {
    match state {
        SafetyState::Normal => config.max_speed,
        SafetyState::Drowsy => (config.max_speed * config.drowsy_ratio)
            .max(config.drowsy_floor)
            .min(config.max_speed),
        SafetyState::Critical => 0.0,
    }
}

/// One first-order smoothing step from `current` toward `target`.
///
/// Snaps once the gap is under `tolerance`; otherwise closes `factor` of
/// the gap, so the approach is monotonic and never overshoots.
pub fn approach(current: f64, target: f64, factor: f64, tolerance: f64) -> f64 {
    let diff = target - current;
    if diff.abs() < tolerance {
        target
    } else {
        current + diff * factor
    }
}

/// Governor state at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GovernorState {
    pub current_speed: f64,
    pub max_speed: f64,
    pub target_speed: f64,
}

impl GovernorState {
    /// Initial state: configured start speed, steering toward max
    pub fn new(config: &GovernorConfig) -> Self {
        Self {
            current_speed: config.initial_speed,
            max_speed: config.max_speed,
            target_speed: target_speed(SafetyState::Normal, config),
        }
    }

    /// Same speed, new target
    pub fn with_safety_state(self, state: SafetyState, config: &GovernorConfig) -> Self {
        Self {
            target_speed: target_speed(state, config),
            ..self
        }
    }

    /// Advance one tick
    pub fn tick(&self, config: &GovernorConfig) -> Self {
        Self {
            current_speed: approach(
                self.current_speed,
                self.target_speed,
                config.smoothing_factor,
                config.snap_tolerance,
            ),
            ..*self
        }
    }

    pub fn at_target(&self) -> bool {
        self.current_speed == self.target_speed
    }
}

/// Owns the evolving governor state for one vehicle
pub struct SpeedGovernor {
    config: GovernorConfig,
    state: GovernorState,
    safety_state: SafetyState,
}

impl SpeedGovernor {
    /// Create a new governor; fails on a non-positive max speed
    pub fn new(config: GovernorConfig) -> Result<Self, GovernorError> {
        config.validate()?;
        let state = GovernorState::new(&config);
        info!(
            "Speed governor created: max {} km/h, start {} km/h",
            config.max_speed, config.initial_speed
        );
        Ok(Self {
            config,
            state,
            safety_state: SafetyState::Normal,
        })
    }

    /// Apply a new safety state. The target is recomputed immediately so
    /// the next tick already steers toward it. Returns whether it changed.
    pub fn set_safety_state(&mut self, safety_state: SafetyState) -> bool {
        if safety_state == self.safety_state {
            return false;
        }
        self.state = self.state.with_safety_state(safety_state, &self.config);
        debug!(
            "Governor target {} -> {:.1} km/h",
            safety_state, self.state.target_speed
        );
        self.safety_state = safety_state;
        true
    }

    /// Advance one tick and return the new current speed
    pub fn tick(&mut self) -> f64 {
        self.state = self.state.tick(&self.config);
        metrics::gauge!("governor_current_speed_kmh").set(self.state.current_speed);
        self.state.current_speed
    }

    pub fn state(&self) -> GovernorState {
        self.state
    }

    pub fn current_speed(&self) -> f64 {
        self.state.current_speed
    }

    pub fn target_speed(&self) -> f64 {
        self.state.target_speed
    }

    pub fn safety_state(&self) -> SafetyState {
        self.safety_state
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config_with_max(max_speed: f64) -> GovernorConfig {
        GovernorConfig {
            max_speed,
            ..Default::default()
        }
    }

    #[test]
    fn test_targets_per_state() {
        let config = GovernorConfig::default();
        assert_eq!(target_speed(SafetyState::Normal, &config), 100.0);
        assert_eq!(target_speed(SafetyState::Drowsy, &config), 30.0);
        assert_eq!(target_speed(SafetyState::Critical, &config), 0.0);
    }

    #[test]
    fn test_drowsy_floor() {
        // 0.3 * 50 = 15 < 30, floor applies
        assert_eq!(target_speed(SafetyState::Drowsy, &config_with_max(50.0)), 30.0);
        // 0.3 * 200 = 60 > 30
        assert_eq!(target_speed(SafetyState::Drowsy, &config_with_max(200.0)), 60.0);
        // Floor never lifts the target above max
        assert_eq!(target_speed(SafetyState::Drowsy, &config_with_max(20.0)), 20.0);
    }

    #[test]
    fn test_critical_deceleration_reaches_zero() {
        let config = GovernorConfig::default();
        let mut state = GovernorState::new(&config).with_safety_state(SafetyState::Critical, &config);
        assert_eq!(state.current_speed, 80.0);

        let mut ticks = 0;
        while !state.at_target() {
            let next = state.tick(&config);
            assert!(next.current_speed < state.current_speed);
            assert!(next.current_speed >= 0.0);
            state = next;
            ticks += 1;
            assert!(ticks < 200, "did not converge");
        }
        assert_eq!(state.current_speed, 0.0);
        // 80 * 0.95^n < 1 after 86 steps, plus the snap
        assert_eq!(ticks, 87);
    }

    #[test]
    fn test_first_tick_after_state_change_uses_new_target() {
        let mut governor = SpeedGovernor::new(GovernorConfig::default()).unwrap();
        assert!(governor.set_safety_state(SafetyState::Critical));
        assert!(!governor.set_safety_state(SafetyState::Critical));

        // 80 + (0 - 80) * 0.05
        assert_eq!(governor.tick(), 76.0);
        assert_eq!(governor.target_speed(), 0.0);
    }

    #[test]
    fn test_snap_within_tolerance() {
        assert_eq!(approach(99.5, 100.0, 0.05, 1.0), 100.0);
        assert_eq!(approach(100.0, 100.0, 0.05, 1.0), 100.0);
        assert_eq!(approach(90.0, 100.0, 0.05, 1.0), 90.5);
    }

    #[test]
    fn test_rejects_zero_max_speed() {
        assert!(matches!(
            SpeedGovernor::new(config_with_max(0.0)),
            Err(GovernorError::InvalidMaxSpeed(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_drowsy_target(max_speed in 0.1f64..1000.0) {
            let config = config_with_max(max_speed);
            let expected = (0.3 * max_speed).max(30.0).min(max_speed);
            prop_assert_eq!(target_speed(SafetyState::Drowsy, &config), expected);
            prop_assert!(target_speed(SafetyState::Drowsy, &config) <= max_speed);
        }

        #[test]
        fn prop_monotonic_without_overshoot(start in 0.0f64..300.0, target in 0.0f64..300.0) {
            let config = GovernorConfig::default();
            let mut state = GovernorState {
                current_speed: start,
                max_speed: 300.0,
                target_speed: target,
            };
            for _ in 0..500 {
                let next = state.tick(&config);
                let before = (target - state.current_speed).abs();
                let after = (target - next.current_speed).abs();
                prop_assert!(after <= before);
                // Never crosses to the other side of the target
                prop_assert!((target - next.current_speed) * (target - start) >= 0.0);
                state = next;
            }
            prop_assert!(state.at_target());
        }
    }
}
