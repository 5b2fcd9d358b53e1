//! Landmark frame types

use serde::{Deserialize, Serialize};

/// Face-mesh indices of the eye points
pub mod face_mesh {
    pub const LEFT_UPPER_LID: usize = 159;
    pub const LEFT_LOWER_LID: usize = 145;
    pub const RIGHT_UPPER_LID: usize = 386;
    pub const RIGHT_LOWER_LID: usize = 374;

    /// Inner eye corners, used as the face-size normalizer
    pub const LEFT_INNER_CORNER: usize = 133;
    pub const RIGHT_INNER_CORNER: usize = 362;

    /// Overlay outlines
    pub const LEFT_CONTOUR: [usize; 12] = [33, 133, 160, 159, 158, 157, 173, 144, 145, 153, 154, 155];
    pub const RIGHT_CONTOUR: [usize; 12] =
        [263, 362, 387, 386, 385, 384, 398, 373, 374, 380, 381, 382];
}

/// A single normalized facial keypoint
///
/// `x` and `y` are image fractions in [0, 1]. `z` is relative depth and
/// is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Both planar coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Landmarks for one face in one frame, indexed by face-mesh numbering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    /// Number of points in a full face mesh
    pub const FACE_MESH_POINTS: usize = 468;

    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Full-size mesh with every point at the origin
    pub fn zeroed() -> Self {
        Self::new(vec![Landmark::default(); Self::FACE_MESH_POINTS])
    }

    /// Get landmark by anatomical index
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Overwrite a landmark, growing the set if needed
    pub fn set(&mut self, index: usize, landmark: Landmark) {
        if index >= self.points.len() {
            self.points.resize(index + 1, Landmark::default());
        }
        self.points[index] = landmark;
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/// One camera frame worth of face-geometry output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameMessage {
    /// A face was found
    Face { landmarks: LandmarkSet },
    /// The detector ran and found no face
    NoFace,
}

impl FrameMessage {
    pub fn face(landmarks: impl Into<LandmarkSet>) -> Self {
        FrameMessage::Face {
            landmarks: landmarks.into(),
        }
    }

    pub fn landmarks(&self) -> Option<&LandmarkSet> {
        match self {
            FrameMessage::Face { landmarks } => Some(landmarks),
            FrameMessage::NoFace => None,
        }
    }

    pub fn has_face(&self) -> bool {
        matches!(self, FrameMessage::Face { .. })
    }
}
