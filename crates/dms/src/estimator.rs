//! Eye-openness estimation from face-mesh landmarks

use landmark_source::{FrameMessage, Landmark, LandmarkSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::OpennessSample;
use crate::{DmsConfig, DmsError};

/// Face-mesh landmark indices consulted by the estimator
pub use landmark_source::face_mesh as eye_indices;

/// Intermediate geometry behind one openness value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeGeometry {
    pub left_height: f64,
    pub right_height: f64,
    /// Horizontal distance between the inner eye corners
    pub ref_distance: f64,
}

impl EyeGeometry {
    pub fn avg_height(&self) -> f64 {
        (self.left_height + self.right_height) / 2.0
    }

    /// Lid height relative to face size, `None` when the reference is degenerate
    pub fn normalized_openness(&self) -> Option<f64> {
        let ratio = self.avg_height() / self.ref_distance;
        if self.ref_distance > 0.0 && ratio.is_finite() {
            Some(ratio)
        } else {
            None
        }
    }
}

/// Eye contour points for drawing an overlay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EyeContours {
    pub left: Vec<Landmark>,
    pub right: Vec<Landmark>,
}

/// Stateless per-frame openness estimator
#[derive(Debug, Clone)]
pub struct EyeOpennessEstimator {
    scale: f64,
}

impl EyeOpennessEstimator {
    pub fn new(config: &DmsConfig) -> Self {
        Self {
            scale: config.openness_scale,
        }
    }

    /// Estimate openness for one frame.
    ///
    /// No face yields a zero sample. A face whose mesh lacks one of the
    /// required points yields [`DmsError::KeypointsMissing`].
    pub fn estimate(&self, frame: &FrameMessage) -> Result<OpennessSample, DmsError> {
        match frame {
            FrameMessage::NoFace => Ok(OpennessSample::no_face()),
            FrameMessage::Face { landmarks } => {
                let geometry = Self::geometry(landmarks)?;
                Ok(OpennessSample::face(self.openness_percent(&geometry)))
            }
        }
    }

    /// Measure lid heights and the corner reference distance
    pub fn geometry(landmarks: &LandmarkSet) -> Result<EyeGeometry, DmsError> {
        use self::eye_indices::*;

        let point = |index: usize| landmarks.get(index).ok_or(DmsError::KeypointsMissing(index));

        let left_upper = point(LEFT_UPPER_LID)?;
        let left_lower = point(LEFT_LOWER_LID)?;
        let right_upper = point(RIGHT_UPPER_LID)?;
        let right_lower = point(RIGHT_LOWER_LID)?;
        let left_corner = point(LEFT_INNER_CORNER)?;
        let right_corner = point(RIGHT_INNER_CORNER)?;

        Ok(EyeGeometry {
            left_height: (left_upper.y - left_lower.y).abs(),
            right_height: (right_upper.y - right_lower.y).abs(),
            ref_distance: (right_corner.x - left_corner.x).abs(),
        })
    }

    /// Scaled, clamped openness; degenerate geometry reads as closed
    pub fn openness_percent(&self, geometry: &EyeGeometry) -> f64 {
        match geometry.normalized_openness() {
            Some(ratio) => (ratio * self.scale).clamp(0.0, 100.0),
            None => {
                debug!(
                    "Degenerate eye geometry (ref distance {}), treating as closed",
                    geometry.ref_distance
                );
                0.0
            }
        }
    }
}

/// Collect the overlay outline points for both eyes, skipping absent indices
pub fn eye_contours(landmarks: &LandmarkSet) -> EyeContours {
    let collect = |indices: &[usize]| -> Vec<Landmark> {
        indices
            .iter()
            .filter_map(|&i| landmarks.get(i).copied())
            .collect()
    };

    EyeContours {
        left: collect(&eye_indices::LEFT_CONTOUR),
        right: collect(&eye_indices::RIGHT_CONTOUR),
    }
}
