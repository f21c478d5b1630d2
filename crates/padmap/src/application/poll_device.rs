//! The poll task: device samples in, press/release events out.
//!
//! A Tokio task ticks on a fixed interval, samples the controller through a
//! [`DeviceStateSource`], runs the edge detector, and pushes every resulting
//! [`ButtonEvent`] onto a bounded queue without ever waiting on it.  The
//! consumer owns the receiving end; when the task exits it drops the sender,
//! which closes the queue once the consumer has drained it.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use padmap_core::{ButtonEvent, EdgeDetector, RawState};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

/// Error type for device sampling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// No controller in the requested slot.  Routine while a pad is unplugged.
    #[error("no controller connected in slot {0}")]
    NotConnected(u32),
    #[error("controller slot {0} is out of range")]
    InvalidIndex(u32),
    #[error("platform error: {0}")]
    Platform(String),
}

/// Source of raw controller state.
///
/// The production implementation reads XInput; tests use
/// `infrastructure::device::mock::MockGamepad`.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceStateSource: Send + Sync {
    /// Prepares the source for polling `index`.  Called once per start.
    fn init(&self, index: u32) -> Result<(), DeviceError>;

    /// Reads the current state of the controller in slot `index`.
    fn sample(&self, index: u32) -> Result<RawState, DeviceError>;
}

/// Poll loop parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub device_index: u32,
    pub interval: Duration,
    pub queue_capacity: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            interval: Duration::from_millis(10),
            queue_capacity: 64,
        }
    }
}

/// Handle to a running poll task.
pub struct PollerHandle {
    cancel: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Asks the task to stop at its next tick and waits for it to exit.
    pub async fn stop(self) {
        self.cancel.store(true, Ordering::Release);
        if let Err(e) = self.task.await {
            warn!("poll task ended abnormally: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns the poll task on the current Tokio runtime.
///
/// The edge detector starts from an all-released state, so anything already
/// held at start is reported as a fresh press on the first tick.
pub fn spawn_poller(
    device: Arc<dyn DeviceStateSource>,
    settings: &PollSettings,
) -> (PollerHandle, mpsc::Receiver<ButtonEvent>) {
    let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
    let cancel = Arc::new(AtomicBool::new(false));
    let index = settings.device_index;
    let interval = settings.interval;

    let task = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            let mut detector = EdgeDetector::new(index);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut dropped: u64 = 0;

            debug!(device = index, ?interval, "poll task started");
            loop {
                ticker.tick().await;
                if cancel.load(Ordering::Acquire) {
                    break;
                }

                let state = match device.sample(index) {
                    Ok(state) => state,
                    Err(e) => {
                        trace!("skipping tick: {e}");
                        continue;
                    }
                };

                for event in detector.detect(&state) {
                    match tx.try_send(event) {
                        Ok(()) => {}
                        Err(TrySendError::Full(event)) => {
                            dropped += 1;
                            warn!(symbol = ?event.symbol, pressed = event.pressed, "event queue full, dropping event");
                        }
                        Err(TrySendError::Closed(_)) => {
                            debug!("event queue closed, poll task exiting");
                            return;
                        }
                    }
                }
            }
            debug!(dropped, "poll task stopped");
        })
    };

    (PollerHandle { cancel, task }, rx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
