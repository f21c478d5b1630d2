//! Recording keyboard for tests.
//!
//! Every batch passed to [`KeyboardEmulator::send`] is appended to an
//! in-memory list so assertions can check exactly which key signals were
//! injected, and in what order.
//!
//! Set `should_fail` to make every send return `EmulationError::Platform`
//! without recording anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use padmap_core::KeySignal;

use crate::application::key_state::{EmulationError, KeyboardEmulator};

#[derive(Default)]
pub struct RecordingKeyboard {
    signals: Mutex<Vec<KeySignal>>,
    batches: Mutex<usize>,
    pub should_fail: AtomicBool,
}

impl RecordingKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Copy of every signal recorded so far.
    pub fn signals(&self) -> Vec<KeySignal> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drains the recorded signals.
    pub fn take(&self) -> Vec<KeySignal> {
        std::mem::take(&mut *self.signals.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clear(&self) {
        self.take();
    }

    /// Number of successful `send` calls.
    pub fn batch_count(&self) -> usize {
        *self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyboardEmulator for RecordingKeyboard {
    fn send(&self, signals: &[KeySignal]) -> Result<(), EmulationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(EmulationError::Platform("mock failure".into()));
        }
        self.signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(signals);
        *self.batches.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use padmap_core::KeyCode;

    #[test]
    fn test_records_signals_in_order() {
        // Arrange
        let keyboard = RecordingKeyboard::new();

        // Act
        keyboard.send(&[KeySignal::down(KeyCode::A)]).unwrap();
        keyboard.send(&[KeySignal::up(KeyCode::A)]).unwrap();

        // Assert
        assert_eq!(
            keyboard.signals(),
            vec![KeySignal::down(KeyCode::A), KeySignal::up(KeyCode::A)]
        );
        assert_eq!(keyboard.batch_count(), 2);
    }

    #[test]
    fn test_should_fail_records_nothing() {
        let keyboard = RecordingKeyboard::new();
        keyboard.set_should_fail(true);

        let result = keyboard.send(&[KeySignal::down(KeyCode::A)]);

        assert!(matches!(result, Err(EmulationError::Platform(_))));
        assert!(keyboard.signals().is_empty());
    }

    #[test]
    fn test_take_drains() {
        let keyboard = RecordingKeyboard::new();
        keyboard.send(&[KeySignal::down(KeyCode::B)]).unwrap();

        assert_eq!(keyboard.take().len(), 1);
        assert!(keyboard.signals().is_empty());
    }
}
