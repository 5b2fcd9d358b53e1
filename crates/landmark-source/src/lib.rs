//! Landmark Source for Driver Monitoring
//!
//! Provides the per-frame facial landmark feed consumed by the DMS:
//! - Normalized face-mesh landmarks (468+ points, MediaPipe numbering)
//! - Channel-based frame delivery (`Face` or `NoFace` per frame)
//! - Fixture replay for recorded sessions and tests
//! - Synthetic meshes for scripted drives

pub mod frame;
pub mod source;
pub mod synthetic;

pub use frame::{face_mesh, FrameMessage, Landmark, LandmarkSet};
pub use source::{ChannelSource, FrameSender, LandmarkSource, ReplayFixture, ReplaySource};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capture error types
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to open landmark source: {0}")]
    Open(String),

    #[error("Landmark source already open")]
    AlreadyOpen,

    #[error("Invalid fixture: {0}")]
    Fixture(String),

    #[error("Fixture I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Landmark source closed")]
    Closed,
}

/// Capture configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Nominal camera frame rate
    pub fps: u32,
    /// Frame channel capacity (frames buffered before the producer drops)
    pub channel_capacity: usize,
    /// Loop the replay fixture instead of stopping at its end
    pub replay_loop: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            channel_capacity: 64,
            replay_loop: false,
        }
    }
}

impl CaptureConfig {
    /// Interval between frames at the nominal frame rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.fps.max(1) as u64)
    }
}
