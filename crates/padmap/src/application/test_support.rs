//! Keyboard transport double shared by the application tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use padmap_core::KeySignal;

use super::key_state::{EmulationError, KeyboardEmulator};

/// Records every delivered key signal.
///
/// `fail` rejects whole batches; `deliver_at_most` makes each batch stop
/// after that many signals and report `EmulationError::Partial`, the way
/// `SendInput` does when it injects fewer inputs than it was given.
pub(crate) struct RecordingEmulator {
    signals: Mutex<Vec<KeySignal>>,
    should_fail: AtomicBool,
    limit: AtomicUsize,
}

impl Default for RecordingEmulator {
    fn default() -> Self {
        Self {
            signals: Mutex::new(Vec::new()),
            should_fail: AtomicBool::new(false),
            limit: AtomicUsize::new(usize::MAX),
        }
    }
}

impl RecordingEmulator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn deliver_at_most(&self, per_batch: usize) {
        self.limit.store(per_batch, Ordering::SeqCst);
    }

    pub(crate) fn signals(&self) -> Vec<KeySignal> {
        self.signals.lock().unwrap().clone()
    }

    pub(crate) fn take(&self) -> Vec<KeySignal> {
        std::mem::take(&mut *self.signals.lock().unwrap())
    }
}

impl KeyboardEmulator for RecordingEmulator {
    fn send(&self, signals: &[KeySignal]) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EmulationError::Platform("injected failure".to_string()));
        }
        let sent = signals.len().min(self.limit.load(Ordering::SeqCst));
        self.signals.lock().unwrap().extend_from_slice(&signals[..sent]);
        if sent < signals.len() {
            return Err(EmulationError::Partial {
                sent,
                total: signals.len(),
            });
        }
        Ok(())
    }
}
