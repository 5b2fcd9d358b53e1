//! Synchronous monitor pipeline
//!
//! Frame → openness → safety state → governor target and ETA. The async
//! runtime drives this from timers; tests drive it directly.

use alerting::{AlarmSink, AlertManager, SafetyEvent};
use dms::{DmsModule, SafetyState};
use landmark_source::FrameMessage;
use serde::{Deserialize, Serialize};
use speed_governor::{EtaEstimate, EtaProjector, SpeedDisplay, SpeedGovernor};
use tracing::{debug, warn};

use crate::{MonitorConfig, MonitorError};

/// Health of the inbound landmark capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SourceStatus {
    /// Opened, no frame yet
    Starting,
    Live,
    /// Failed to open or stopped delivering
    Unavailable(String),
}

/// Every outbound signal at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub openness_percent: f64,
    pub face_detected: bool,
    pub safety_state: SafetyState,
    pub mode: String,
    /// Authoritative governed speed
    pub current_speed: f64,
    /// Smoothed readout; cosmetic only
    pub displayed_speed: f64,
    pub target_speed: f64,
    pub max_speed: f64,
    pub eta: String,
    pub eta_offset_minutes: i64,
    pub alarm_active: bool,
    pub source: SourceStatus,
}

pub struct DrowsinessMonitor {
    dms: DmsModule,
    governor: SpeedGovernor,
    display: SpeedDisplay,
    eta: EtaProjector,
    alerts: AlertManager,
    openness_percent: f64,
    face_detected: bool,
    safety_state: SafetyState,
    eta_estimate: EtaEstimate,
    source: SourceStatus,
}

impl DrowsinessMonitor {
    /// Build the pipeline. Until the first frame arrives the monitor reports
    /// fully open eyes, no face, and Normal.
    pub fn new(config: &MonitorConfig, alarm: Box<dyn AlarmSink>) -> Result<Self, MonitorError> {
        config.validate()?;
        let eta = EtaProjector::new(config.eta.clone());
        let safety_state = SafetyState::Normal;
        let dms = DmsModule::new(config.dms.clone())?;
        let initial = dms.last_sample();

        Ok(Self {
            dms,
            governor: SpeedGovernor::new(config.governor.clone())?,
            display: SpeedDisplay::new(&config.governor),
            alerts: AlertManager::new(config.alerts.clone(), alarm),
            eta_estimate: eta.project(safety_state),
            eta,
            openness_percent: initial.openness_percent,
            face_detected: initial.face_detected,
            safety_state,
            source: SourceStatus::Starting,
        })
    }

    /// Process one frame; state, target, and ETA are updated before returning
    pub fn handle_frame(&mut self, frame: &FrameMessage) -> Vec<SafetyEvent> {
        let analysis = self.dms.analyze(frame);
        metrics::counter!("dms_frames_total").increment(1);
        if self.source == SourceStatus::Starting {
            self.source = SourceStatus::Live;
        }

        self.openness_percent = analysis.openness_percent();
        self.face_detected = analysis.face_detected();
        debug!(
            "Frame: openness {:.1}% face {} -> {}",
            self.openness_percent, self.face_detected, analysis.safety_state
        );

        self.apply_safety_state(analysis.safety_state)
    }

    /// The landmark capability is gone: surface it and treat the driver as
    /// not visible. Tick loops keep running.
    pub fn source_failed(&mut self, reason: impl Into<String>) -> Vec<SafetyEvent> {
        let reason = reason.into();
        warn!("Landmark source unavailable: {}", reason);
        metrics::counter!("landmark_source_failures_total").increment(1);

        let events = self.handle_frame(&FrameMessage::NoFace);
        self.source = SourceStatus::Unavailable(reason);
        events
    }

    fn apply_safety_state(&mut self, state: SafetyState) -> Vec<SafetyEvent> {
        if state != self.safety_state {
            self.safety_state = state;
            self.governor.set_safety_state(state);
            self.eta_estimate = self.eta.project(state);
            debug!("ETA now {} (+{} min)", self.eta_estimate.formatted, self.eta_estimate.offset_minutes);
        }
        self.alerts.observe(state)
    }

    /// One governor tick
    pub fn tick_governor(&mut self) -> f64 {
        self.governor.tick()
    }

    /// One display-smoothing tick
    pub fn tick_display(&mut self) -> f64 {
        self.display.tick(self.governor.current_speed())
    }

    /// Driver acknowledged the alarm
    pub fn acknowledge_alarm(&mut self) -> bool {
        self.alerts.acknowledge()
    }

    pub fn safety_state(&self) -> SafetyState {
        self.safety_state
    }

    pub fn eta_estimate(&self) -> &EtaEstimate {
        &self.eta_estimate
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let governor = self.governor.state();
        DashboardSnapshot {
            openness_percent: self.openness_percent,
            face_detected: self.face_detected,
            safety_state: self.safety_state,
            mode: self.safety_state.mode_label().to_string(),
            current_speed: governor.current_speed,
            displayed_speed: self.display.displayed(),
            target_speed: governor.target_speed,
            max_speed: governor.max_speed,
            eta: self.eta_estimate.formatted.clone(),
            eta_offset_minutes: self.eta_estimate.offset_minutes,
            alarm_active: self.alerts.is_alarm_active(),
            source: self.source.clone(),
        }
    }
}
