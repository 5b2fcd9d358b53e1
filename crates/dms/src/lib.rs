//! Driver Monitoring System (DMS)
//!
//! Per-frame driver state analysis from facial landmarks:
//! - Eye openness estimation (lid height over inner-corner distance)
//! - Drowsiness classification into Normal / Drowsy / Critical
//! - Optional hysteresis to damp flicker near thresholds

pub mod analysis;
pub mod config;
pub mod estimator;
pub mod state;

pub use analysis::{DmsAnalysis, OpennessSample};
pub use config::DmsConfig;
pub use estimator::{eye_contours, EyeContours, EyeGeometry, EyeOpennessEstimator};
pub use state::{classify, HysteresisClassifier, SafetyState, SafetyThresholds};

use landmark_source::FrameMessage;
use thiserror::Error;
use tracing::{debug, info};

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Keypoint {0} missing for openness calculation")]
    KeypointsMissing(usize),
}

/// Driver monitoring module: estimator plus classifier
pub struct DmsModule {
    estimator: EyeOpennessEstimator,
    classifier: HysteresisClassifier,
    last_sample: OpennessSample,
}

impl DmsModule {
    /// Create a new DMS module with configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            "DMS thresholds: critical <= {}, drowsy <= {}, hysteresis {}",
            config.critical_threshold, config.drowsy_threshold, config.hysteresis_margin
        );
        Ok(Self {
            estimator: EyeOpennessEstimator::new(&config),
            classifier: HysteresisClassifier::new(config.thresholds(), config.hysteresis_margin),
            last_sample: OpennessSample::initial(),
        })
    }

    /// Analyze a single frame for driver state
    pub fn analyze(&mut self, frame: &FrameMessage) -> DmsAnalysis {
        let (sample, carried_forward) = match self.estimator.estimate(frame) {
            Ok(sample) => (sample, false),
            Err(e) => {
                // Face present but mesh incomplete: keep the last openness
                debug!("Skipping openness update: {}", e);
                (
                    OpennessSample::face(self.last_sample.openness_percent),
                    true,
                )
            }
        };
        self.last_sample = sample;

        DmsAnalysis {
            sample,
            safety_state: self.classifier.classify(sample.openness_percent),
            carried_forward,
        }
    }

    pub fn last_sample(&self) -> OpennessSample {
        self.last_sample
    }

    /// Reset driver state (on driver change)
    pub fn reset_state(&mut self) {
        self.classifier.reset();
        self.last_sample = OpennessSample::initial();
    }
}
