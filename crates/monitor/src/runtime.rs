//! Async monitor runtime
//!
//! One tokio task owns the whole pipeline and multiplexes frame arrival,
//! the governor tick, the display tick, and shutdown with `select!`. No
//! state is shared across tasks, so nothing needs a lock.

use alerting::{AlarmSink, SafetyEvent};
use landmark_source::{FrameMessage, LandmarkSource};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::monitor::{DashboardSnapshot, DrowsinessMonitor};
use crate::{MonitorConfig, MonitorError};

const EVENT_CAPACITY: usize = 64;

/// Owner-side handle of a running monitor.
///
/// Dropping the handle aborts the task; the source and any active alarm
/// are released with it.
pub struct MonitorHandle {
    snapshots: watch::Receiver<DashboardSnapshot>,
    events: broadcast::Sender<SafetyEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Open the source and start the monitor loop on the current runtime.
    ///
    /// Invalid configuration or a missing tokio runtime fails here. A
    /// source that cannot be opened does not: the monitor starts degraded
    /// with the failure in its snapshot.
    pub fn spawn(
        config: MonitorConfig,
        mut source: Box<dyn LandmarkSource>,
        alarm: Box<dyn AlarmSink>,
    ) -> Result<Self, MonitorError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MonitorError::Task(e.to_string()))?;
        let mut monitor = DrowsinessMonitor::new(&config, alarm)?;

        let frames = match source.open() {
            Ok(rx) => {
                info!("Landmark source '{}' opened", source.name());
                Some(rx)
            }
            Err(e) => {
                monitor.source_failed(e.to_string());
                None
            }
        };

        let (snapshot_tx, snapshot_rx) = watch::channel(monitor.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let loop_state = MonitorLoop {
            monitor,
            source,
            frames,
            snapshots: snapshot_tx,
            events: event_tx.clone(),
        };
        let task = runtime.spawn(loop_state.run(config, shutdown_rx));

        Ok(Self {
            snapshots: snapshot_rx,
            events: event_tx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Receiver of dashboard snapshots, updated after every frame and tick
    pub fn snapshots(&self) -> watch::Receiver<DashboardSnapshot> {
        self.snapshots.clone()
    }

    /// Latest published snapshot
    pub fn latest(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to safety events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SafetyEvent> {
        self.events.subscribe()
    }

    /// Stop all loops, release the source, and wait for the task to exit
    pub async fn shutdown(mut self) -> Result<(), MonitorError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| MonitorError::Task(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct MonitorLoop {
    monitor: DrowsinessMonitor,
    source: Box<dyn LandmarkSource>,
    frames: Option<mpsc::Receiver<FrameMessage>>,
    snapshots: watch::Sender<DashboardSnapshot>,
    events: broadcast::Sender<SafetyEvent>,
}

impl MonitorLoop {
    async fn run(mut self, config: MonitorConfig, mut shutdown: oneshot::Receiver<()>) {
        let mut governor_tick = interval(config.governor.tick_period());
        governor_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut display_tick = interval(config.governor.display_tick_period());
        display_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Monitor running: governor every {:?}, display every {:?}",
            config.governor.tick_period(),
            config.governor.display_tick_period()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                frame = next_frame(&mut self.frames) => {
                    let events = match frame {
                        Some(frame) => self.monitor.handle_frame(&frame),
                        None => {
                            self.frames = None;
                            self.monitor.source_failed(format!(
                                "landmark source '{}' stopped delivering",
                                self.source.name()
                            ))
                        }
                    };
                    self.publish(events);
                }
                _ = governor_tick.tick() => {
                    self.monitor.tick_governor();
                    self.publish(Vec::new());
                }
                _ = display_tick.tick() => {
                    self.monitor.tick_display();
                    self.publish(Vec::new());
                }
            }
        }

        self.frames = None;
        self.source.close();
        info!("Monitor stopped");
    }

    fn publish(&self, events: Vec<SafetyEvent>) {
        for event in events {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
        self.snapshots.send_replace(self.monitor.snapshot());
    }
}

/// Next frame, or pending forever once the source is gone
async fn next_frame(frames: &mut Option<mpsc::Receiver<FrameMessage>>) -> Option<FrameMessage> {
    match frames {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl Drop for MonitorLoop {
    fn drop(&mut self) {
        if self.frames.is_some() {
            warn!("Monitor loop dropped while source open, releasing");
        }
        self.source.close();
    }
}
