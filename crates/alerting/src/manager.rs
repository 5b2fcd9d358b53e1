//! Alert Manager Implementation

use dms::SafetyState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Sound the alarm on entering Critical
    pub alarm_enabled: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alarm_enabled: true,
        }
    }
}

/// Notification emitted on a safety-state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SafetyEvent {
    StateChanged { from: SafetyState, to: SafetyState },
    EnteredCritical,
    LeftCritical,
}

/// Audible alarm collaborator
///
/// The manager calls `start` once per Critical entry and `stop` when the
/// alarm is released; the sink owns its playback resource.
pub trait AlarmSink: Send {
    fn start(&mut self);
    fn stop(&mut self);
}

/// Alarm sink that only logs
#[derive(Debug, Default)]
pub struct LogAlarm;

impl AlarmSink for LogAlarm {
    fn start(&mut self) {
        warn!("ALARM: driver critically drowsy");
    }

    fn stop(&mut self) {
        info!("Alarm stopped");
    }
}

/// Tracks safety-state transitions and the alarm latch
pub struct AlertManager {
    config: AlertConfig,
    last_state: SafetyState,
    alarm_active: bool,
    acknowledged: bool,
    critical_entries: usize,
    sink: Box<dyn AlarmSink>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig, sink: Box<dyn AlarmSink>) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            last_state: SafetyState::Normal,
            alarm_active: false,
            acknowledged: false,
            critical_entries: 0,
            sink,
        }
    }

    /// Feed the latest safety state; returns the events it caused
    pub fn observe(&mut self, state: SafetyState) -> Vec<SafetyEvent> {
        let from = self.last_state;
        if state == from {
            return Vec::new();
        }
        self.last_state = state;

        let mut events = vec![SafetyEvent::StateChanged { from, to: state }];
        metrics::counter!("dms_state_transitions_total", "to" => state.as_str()).increment(1);
        info!("Safety state {} -> {}", from, state);

        if state == SafetyState::Critical {
            self.critical_entries += 1;
            events.push(SafetyEvent::EnteredCritical);
            self.raise_alarm();
        } else if from == SafetyState::Critical {
            events.push(SafetyEvent::LeftCritical);
            self.release_alarm();
        }

        events
    }

    fn raise_alarm(&mut self) {
        self.acknowledged = false;
        if !self.config.alarm_enabled {
            debug!("Alarm disabled, not sounding");
            return;
        }
        if !self.alarm_active {
            self.alarm_active = true;
            metrics::counter!("dms_alarms_total").increment(1);
            self.sink.start();
        }
    }

    fn release_alarm(&mut self) {
        if self.alarm_active {
            self.alarm_active = false;
            self.sink.stop();
        }
    }

    /// Driver acknowledged the alarm; silences it until the next Critical entry
    pub fn acknowledge(&mut self) -> bool {
        if !self.alarm_active {
            return false;
        }
        self.acknowledged = true;
        self.release_alarm();
        info!("Alarm acknowledged");
        true
    }

    pub fn is_alarm_active(&self) -> bool {
        self.alarm_active
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    pub fn last_state(&self) -> SafetyState {
        self.last_state
    }

    /// Number of times Critical has been entered
    pub fn critical_entries(&self) -> usize {
        self.critical_entries
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default(), Box::new(LogAlarm))
    }
}

impl Drop for AlertManager {
    fn drop(&mut self) {
        self.release_alarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingAlarm {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl AlarmSink for CountingAlarm {
        fn start(&mut self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn manager() -> (AlertManager, CountingAlarm) {
        let alarm = CountingAlarm::default();
        (
            AlertManager::new(AlertConfig::default(), Box::new(alarm.clone())),
            alarm,
        )
    }

    #[test]
    fn test_no_events_without_change() {
        let (mut manager, _) = manager();
        assert!(manager.observe(SafetyState::Normal).is_empty());
    }

    #[test]
    fn test_entering_critical() {
        let (mut manager, alarm) = manager();
        let events = manager.observe(SafetyState::Critical);

        assert_eq!(
            events,
            vec![
                SafetyEvent::StateChanged {
                    from: SafetyState::Normal,
                    to: SafetyState::Critical
                },
                SafetyEvent::EnteredCritical,
            ]
        );
        assert!(manager.is_alarm_active());
        assert_eq!(alarm.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_alarm_latches_once_per_entry() {
        let (mut manager, alarm) = manager();
        manager.observe(SafetyState::Critical);
        manager.observe(SafetyState::Critical);
        manager.observe(SafetyState::Critical);
        assert_eq!(alarm.starts.load(Ordering::SeqCst), 1);

        let events = manager.observe(SafetyState::Drowsy);
        assert!(events.contains(&SafetyEvent::LeftCritical));
        assert!(!manager.is_alarm_active());
        assert_eq!(alarm.stops.load(Ordering::SeqCst), 1);

        manager.observe(SafetyState::Critical);
        assert_eq!(alarm.starts.load(Ordering::SeqCst), 2);
        assert_eq!(manager.critical_entries(), 2);
    }

    #[test]
    fn test_acknowledge_silences_until_next_entry() {
        let (mut manager, alarm) = manager();
        assert!(!manager.acknowledge());

        manager.observe(SafetyState::Critical);
        assert!(manager.acknowledge());
        assert!(manager.is_acknowledged());
        assert!(!manager.is_alarm_active());
        assert_eq!(alarm.stops.load(Ordering::SeqCst), 1);

        manager.observe(SafetyState::Normal);
        manager.observe(SafetyState::Critical);
        assert!(manager.is_alarm_active());
        assert!(!manager.is_acknowledged());
    }

    #[test]
    fn test_disabled_alarm_still_emits_events() {
        let alarm = CountingAlarm::default();
        let mut manager = AlertManager::new(
            AlertConfig {
                alarm_enabled: false,
            },
            Box::new(alarm.clone()),
        );

        let events = manager.observe(SafetyState::Critical);
        assert!(events.contains(&SafetyEvent::EnteredCritical));
        assert_eq!(alarm.starts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_drop_releases_active_alarm() {
        let (mut manager, alarm) = manager();
        manager.observe(SafetyState::Critical);
        drop(manager);
        assert_eq!(alarm.stops.load(Ordering::SeqCst), 1);
    }
}
