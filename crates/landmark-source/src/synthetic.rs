//! Synthetic face meshes for demos and tests

use crate::frame::face_mesh::{
    LEFT_INNER_CORNER, LEFT_LOWER_LID, LEFT_UPPER_LID, RIGHT_INNER_CORNER, RIGHT_LOWER_LID,
    RIGHT_UPPER_LID,
};
use crate::frame::{FrameMessage, Landmark, LandmarkSet};
use crate::source::ReplayFixture;

/// Symmetric face: both eyes `eye_height` tall, inner corners
/// `ref_distance` apart, centred in the image
pub fn face_mesh(eye_height: f64, ref_distance: f64) -> LandmarkSet {
    let mut set = LandmarkSet::zeroed();
    let eye_y = 0.4;
    let left_x = 0.5 - ref_distance / 2.0;
    let right_x = 0.5 + ref_distance / 2.0;

    set.set(LEFT_INNER_CORNER, Landmark::new(left_x, eye_y));
    set.set(RIGHT_INNER_CORNER, Landmark::new(right_x, eye_y));
    set.set(LEFT_UPPER_LID, Landmark::new(left_x - 0.05, eye_y - eye_height / 2.0));
    set.set(LEFT_LOWER_LID, Landmark::new(left_x - 0.05, eye_y + eye_height / 2.0));
    set.set(RIGHT_UPPER_LID, Landmark::new(right_x + 0.05, eye_y - eye_height / 2.0));
    set.set(RIGHT_LOWER_LID, Landmark::new(right_x + 0.05, eye_y + eye_height / 2.0));
    set
}

/// Face whose lid height over corner distance equals `ratio`
pub fn face_with_ratio(ratio: f64) -> LandmarkSet {
    const REF_DISTANCE: f64 = 0.25;
    face_mesh(ratio * REF_DISTANCE, REF_DISTANCE)
}

/// A drive segment: one frame kind repeated
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    /// Face present with the given openness ratio
    Eyes { ratio: f64, frames: usize },
    NoFace { frames: usize },
}

/// Build a replay fixture from consecutive segments
pub fn scripted_fixture(segments: &[Segment], frame_interval_ms: u64) -> ReplayFixture {
    let mut frames = Vec::new();
    for segment in segments {
        match *segment {
            Segment::Eyes { ratio, frames: count } => {
                let frame = FrameMessage::face(face_with_ratio(ratio));
                frames.extend(std::iter::repeat(frame).take(count));
            }
            Segment::NoFace { frames: count } => {
                frames.extend(std::iter::repeat(FrameMessage::NoFace).take(count));
            }
        }
    }
    ReplayFixture {
        frame_interval_ms: Some(frame_interval_ms),
        frames,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_with_ratio_geometry() {
        let face = face_with_ratio(0.2);
        let height = (face.get(LEFT_UPPER_LID).unwrap().y - face.get(LEFT_LOWER_LID).unwrap().y).abs();
        let reference =
            (face.get(RIGHT_INNER_CORNER).unwrap().x - face.get(LEFT_INNER_CORNER).unwrap().x).abs();
        assert!((height / reference - 0.2).abs() < 1e-9);
        assert_eq!(face.len(), LandmarkSet::FACE_MESH_POINTS);
    }

    #[test]
    fn test_scripted_fixture_order() {
        let fixture = scripted_fixture(
            &[
                Segment::Eyes { ratio: 0.2, frames: 2 },
                Segment::NoFace { frames: 1 },
            ],
            33,
        );
        assert_eq!(fixture.frames.len(), 3);
        assert!(fixture.frames[0].has_face());
        assert_eq!(fixture.frames[2], FrameMessage::NoFace);
        assert_eq!(fixture.frame_interval_ms, Some(33));
    }
}
