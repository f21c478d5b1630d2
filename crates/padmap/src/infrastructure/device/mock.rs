//! Scripted gamepad for tests and dry runs.
//!
//! Queued states are returned one per sample, in order; once the queue runs
//! dry the last state (initially idle) is repeated, the way a real pad keeps
//! reporting whatever is currently held.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use padmap_core::RawState;

use super::MAX_DEVICE_INDEX;
use crate::application::poll_device::{DeviceError, DeviceStateSource};

#[derive(Default)]
struct Script {
    queued: VecDeque<RawState>,
    current: RawState,
    disconnected: bool,
}

#[derive(Default)]
pub struct MockGamepad {
    script: Mutex<Script>,
    samples: AtomicUsize,
    /// When `true`, `init` fails with `DeviceError::NotConnected`.
    pub fail_init: AtomicBool,
}

impl MockGamepad {
    /// An idle, connected pad.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends states to be returned by the next samples.
    pub fn push_states(&self, states: impl IntoIterator<Item = RawState>) {
        self.script().queued.extend(states);
    }

    /// Sets the state reported from now on, discarding anything queued.
    pub fn set_state(&self, state: RawState) {
        let mut script = self.script();
        script.queued.clear();
        script.current = state;
    }

    /// Simulates unplugging (`false`) or replugging (`true`) the pad.
    pub fn set_connected(&self, connected: bool) {
        self.script().disconnected = !connected;
    }

    pub fn set_fail_init(&self, fail: bool) {
        self.fail_init.store(fail, Ordering::SeqCst);
    }

    /// Number of successful samples so far.
    pub fn sample_count(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceStateSource for MockGamepad {
    fn init(&self, index: u32) -> Result<(), DeviceError> {
        if index > MAX_DEVICE_INDEX {
            return Err(DeviceError::InvalidIndex(index));
        }
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(DeviceError::NotConnected(index));
        }
        Ok(())
    }

    fn sample(&self, index: u32) -> Result<RawState, DeviceError> {
        let mut script = self.script();
        if script.disconnected {
            return Err(DeviceError::NotConnected(index));
        }
        if let Some(next) = script.queued.pop_front() {
            script.current = next;
        }
        self.samples.fetch_add(1, Ordering::SeqCst);
        Ok(script.current)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
