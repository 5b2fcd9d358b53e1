//! Landmark source capability and bundled implementations

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::frame::FrameMessage;
use crate::{CaptureConfig, CaptureError};

/// A per-frame face-geometry capability
///
/// `open` acquires the underlying device and hands back the frame stream.
/// `close` releases it; implementations also release on drop.
pub trait LandmarkSource: Send {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Start delivering frames
    fn open(&mut self) -> Result<mpsc::Receiver<FrameMessage>, CaptureError>;

    /// Stop delivering frames and release the device. Idempotent.
    fn close(&mut self);
}

/// Host-fed source: frames are pushed through a [`FrameSender`]
pub struct ChannelSource {
    receiver: Option<mpsc::Receiver<FrameMessage>>,
}

/// Producer half of a [`ChannelSource`]
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::Sender<FrameMessage>,
}

impl ChannelSource {
    pub fn new(capacity: usize) -> (Self, FrameSender) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                receiver: Some(rx),
            },
            FrameSender { tx },
        )
    }
}

impl LandmarkSource for ChannelSource {
    fn name(&self) -> &str {
        "channel"
    }

    fn open(&mut self) -> Result<mpsc::Receiver<FrameMessage>, CaptureError> {
        self.receiver.take().ok_or(CaptureError::AlreadyOpen)
    }

    fn close(&mut self) {
        self.receiver = None;
    }
}

impl FrameSender {
    /// Send a frame, waiting for channel capacity
    pub async fn send(&self, frame: FrameMessage) -> Result<(), CaptureError> {
        self.tx.send(frame).await.map_err(|_| CaptureError::Closed)
    }

    /// Send a frame without waiting; a full channel drops the frame
    pub fn try_send(&self, frame: FrameMessage) -> Result<(), CaptureError> {
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Frame channel full, dropping frame");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(CaptureError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Recorded session: a list of frames and the pace they arrived at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayFixture {
    /// Interval between frames; falls back to the configured frame rate
    #[serde(default)]
    pub frame_interval_ms: Option<u64>,
    pub frames: Vec<FrameMessage>,
}

impl ReplayFixture {
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let fixture: ReplayFixture =
            serde_json::from_str(json).map_err(|e| CaptureError::Fixture(e.to_string()))?;
        if fixture.frames.is_empty() {
            return Err(CaptureError::Fixture("fixture contains no frames".into()));
        }
        Ok(fixture)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        info!("Loading replay fixture from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Replays a [`ReplayFixture`] on a background task
pub struct ReplaySource {
    fixture: Arc<ReplayFixture>,
    config: CaptureConfig,
    shutdown: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    pub fn new(fixture: ReplayFixture, config: CaptureConfig) -> Self {
        Self {
            fixture: Arc::new(fixture),
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    fn interval(&self) -> Duration {
        match self.fixture.frame_interval_ms {
            Some(ms) if ms > 0 => Duration::from_millis(ms),
            _ => self.config.frame_interval(),
        }
    }
}

impl LandmarkSource for ReplaySource {
    fn name(&self) -> &str {
        "replay"
    }

    fn open(&mut self) -> Result<mpsc::Receiver<FrameMessage>, CaptureError> {
        if self.task.is_some() {
            return Err(CaptureError::AlreadyOpen);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CaptureError::Open(e.to_string()))?;

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let fixture = self.fixture.clone();
        let interval = self.interval();
        let looping = self.config.replay_loop;
        self.shutdown.store(false, Ordering::SeqCst);
        let shutdown = self.shutdown.clone();

        info!(
            "Replaying {} frames every {:?} (loop: {})",
            fixture.frames.len(),
            interval,
            looping
        );

        self.task = Some(runtime.spawn(async move {
            loop {
                for frame in fixture.frames.iter() {
                    if shutdown.load(Ordering::SeqCst) {
                        return;
                    }
                    if tx.send(frame.clone()).await.is_err() {
                        debug!("Replay receiver dropped");
                        return;
                    }
                    tokio::time::sleep(interval).await;
                }
                if !looping {
                    debug!("Replay fixture exhausted");
                    return;
                }
            }
        }));

        Ok(rx)
    }

    fn close(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Replay source released");
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        if self.task.is_some() {
            warn!("Replay source dropped while open, releasing");
        }
        self.close();
    }
}
