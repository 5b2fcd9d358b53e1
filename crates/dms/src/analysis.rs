//! DMS per-frame results

use serde::{Deserialize, Serialize};

use crate::state::SafetyState;

/// Openness measurement for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpennessSample {
    /// Eye openness in [0, 100]; 0 once a frame reports no face
    pub openness_percent: f64,
    pub face_detected: bool,
}

impl OpennessSample {
    pub fn no_face() -> Self {
        Self {
            openness_percent: 0.0,
            face_detected: false,
        }
    }

    /// Reading before any frame: eyes assumed open, no face yet
    pub fn initial() -> Self {
        Self {
            openness_percent: 100.0,
            face_detected: false,
        }
    }

    pub fn face(openness_percent: f64) -> Self {
        Self {
            openness_percent: openness_percent.clamp(0.0, 100.0),
            face_detected: true,
        }
    }
}

/// Complete DMS analysis result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DmsAnalysis {
    pub sample: OpennessSample,

    /// Safety state derived from the sample
    pub safety_state: SafetyState,

    /// The frame had a face but not enough landmarks; the previous
    /// openness was carried forward
    pub carried_forward: bool,
}

impl DmsAnalysis {
    pub fn face_detected(&self) -> bool {
        self.sample.face_detected
    }

    pub fn openness_percent(&self) -> f64 {
        self.sample.openness_percent
    }
}
