//! Alerting System
//!
//! Turns safety-state transitions into events and owns the critical alarm
//! latch. Playback itself belongs to an external [`AlarmSink`].

mod manager;

pub use manager::{AlarmSink, AlertConfig, AlertManager, LogAlarm, SafetyEvent};
