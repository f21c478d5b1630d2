//! The output sink: held-key bookkeeping in front of a keyboard transport.
//!
//! Rules ask for keys to be pressed or released; this module decides which
//! key signals that actually requires.  A key already held is not pressed
//! again, a key not held is not released, and [`KeyboardOutput::release_all`]
//! lifts everything padmap put down.  All of that lives behind one mutex so
//! concurrent callers see a single consistent held set.

use std::sync::{Arc, Mutex, PoisonError};

use padmap_core::{KeyCode, KeySignal, Modifier, Modifiers};
use thiserror::Error;
use tracing::{debug, trace};

/// Error type for keyboard injection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmulationError {
    #[error("platform error: {0}")]
    Platform(String),
    /// The OS accepted only part of a batch.
    #[error("only {sent} of {total} key signals were injected")]
    Partial { sent: usize, total: usize },
    #[error("emulator not initialized")]
    NotInitialized,
}

/// Platform-agnostic keyboard transport.
///
/// Each supported OS provides an implementation in the infrastructure layer.
pub trait KeyboardEmulator: Send + Sync {
    /// Injects `signals` in order, as one batch where the platform allows it.
    fn send(&self, signals: &[KeySignal]) -> Result<(), EmulationError>;
}

/// Keys and modifiers with an outstanding down-signal, in the order they
/// went down.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeldKeys {
    pub keys: Vec<KeyCode>,
    pub modifiers: Vec<Modifier>,
}

impl HeldKeys {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.modifiers.is_empty()
    }
}

/// Stateful keyboard output shared by the dispatcher and the controller.
pub struct KeyboardOutput {
    emulator: Arc<dyn KeyboardEmulator>,
    held: Mutex<HeldKeys>,
}

impl KeyboardOutput {
    pub fn new(emulator: Arc<dyn KeyboardEmulator>) -> Self {
        Self {
            emulator,
            held: Mutex::new(HeldKeys::default()),
        }
    }

    /// Presses `modifiers` (Ctrl, Alt, Shift, Win order) and then `keys`,
    /// skipping anything already held.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if injection fails.  Whatever part of the
    /// batch did reach the OS (see [`EmulationError::Partial`]) is recorded
    /// as held, so a later release lifts it.
    pub fn press_keys(&self, keys: &[KeyCode], modifiers: Modifiers) -> Result<(), EmulationError> {
        let mut held = self.lock();

        let new_mods: Vec<Modifier> = modifiers
            .iter()
            .filter(|m| !held.modifiers.contains(m))
            .collect();
        let mut new_keys: Vec<KeyCode> = Vec::with_capacity(keys.len());
        for &key in keys {
            if !held.keys.contains(&key) && !new_keys.contains(&key) {
                new_keys.push(key);
            }
        }

        let batch: Vec<KeySignal> = new_mods
            .iter()
            .map(|&m| KeySignal::down(m))
            .chain(new_keys.iter().map(|&k| KeySignal::down(k)))
            .collect();
        if batch.is_empty() {
            trace!("press suppressed: everything already held");
            return Ok(());
        }

        let result = self.emulator.send(&batch);
        let sent = delivered(&result, batch.len());
        let mods_sent = sent.min(new_mods.len());
        held.modifiers.extend_from_slice(&new_mods[..mods_sent]);
        held.keys.extend_from_slice(&new_keys[..sent - mods_sent]);
        trace!(sent, total = batch.len(), "keys pressed");
        result
    }

    /// Releases whichever of `keys` are held, then whichever of `modifiers`
    /// are held in reverse order of acquisition.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if injection fails.  Only the signals that
    /// were delivered are forgotten; the rest stay recorded as held so a
    /// later release (or [`release_all`](Self::release_all)) retries them.
    pub fn release_keys(&self, keys: &[KeyCode], modifiers: Modifiers) -> Result<(), EmulationError> {
        let mut held = self.lock();

        let mut gone_keys: Vec<KeyCode> = Vec::with_capacity(keys.len());
        for &key in keys {
            if held.keys.contains(&key) && !gone_keys.contains(&key) {
                gone_keys.push(key);
            }
        }
        let gone_mods: Vec<Modifier> = held
            .modifiers
            .iter()
            .rev()
            .copied()
            .filter(|m| modifiers.contains(*m))
            .collect();

        let batch: Vec<KeySignal> = gone_keys
            .iter()
            .map(|&k| KeySignal::up(k))
            .chain(gone_mods.iter().map(|&m| KeySignal::up(m)))
            .collect();
        if batch.is_empty() {
            trace!("release suppressed: nothing held");
            return Ok(());
        }

        let result = self.emulator.send(&batch);
        let sent = delivered(&result, batch.len());
        let keys_sent = sent.min(gone_keys.len());
        let lifted_keys = &gone_keys[..keys_sent];
        let lifted_mods = &gone_mods[..sent - keys_sent];
        held.keys.retain(|k| !lifted_keys.contains(k));
        held.modifiers.retain(|m| !lifted_mods.contains(m));
        trace!(sent, total = batch.len(), "keys released");
        result
    }

    /// Releases every held key (most recent first), then every held modifier
    /// (most recent first), and forgets them all.
    ///
    /// The held set is cleared even when injection fails, so a second call
    /// never emits anything.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if injection fails.
    pub fn release_all(&self) -> Result<(), EmulationError> {
        let held = std::mem::take(&mut *self.lock());
        if held.is_empty() {
            return Ok(());
        }

        let batch: Vec<KeySignal> = held
            .keys
            .iter()
            .rev()
            .map(|&k| KeySignal::up(k))
            .chain(held.modifiers.iter().rev().map(|&m| KeySignal::up(m)))
            .collect();
        debug!(signals = batch.len(), "releasing all held keys");
        self.emulator.send(&batch)
    }

    /// Taps a chord: modifiers down, keys down, keys up in reverse, modifiers
    /// up in reverse.  The held set is neither consulted nor changed.
    ///
    /// # Errors
    ///
    /// Returns [`EmulationError`] if injection fails.
    pub fn simulate_one_shot(&self, keys: &[KeyCode], modifiers: Modifiers) -> Result<(), EmulationError> {
        let mods: Vec<Modifier> = modifiers.iter().collect();
        let batch: Vec<KeySignal> = mods
            .iter()
            .map(|&m| KeySignal::down(m))
            .chain(keys.iter().map(|&k| KeySignal::down(k)))
            .chain(keys.iter().rev().map(|&k| KeySignal::up(k)))
            .chain(mods.iter().rev().map(|&m| KeySignal::up(m)))
            .collect();
        if batch.is_empty() {
            return Ok(());
        }
        self.emulator.send(&batch)
    }

    /// Copy of the current held set.
    pub fn held(&self) -> HeldKeys {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HeldKeys> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How many signals of a `total`-long batch reached the OS.
fn delivered(result: &Result<(), EmulationError>, total: usize) -> usize {
    match result {
        Ok(()) => total,
        Err(EmulationError::Partial { sent, .. }) => (*sent).min(total),
        Err(_) => 0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::RecordingEmulator;

    fn make_output() -> (KeyboardOutput, Arc<RecordingEmulator>) {
        let emulator = Arc::new(RecordingEmulator::new());
        let output = KeyboardOutput::new(emulator.clone());
        (output, emulator)
    }

    fn ctrl() -> Modifiers {
        Modifiers::NONE.with(Modifier::Ctrl)
    }

    // ── press / release ───────────────────────────────────────────────────────

    #[test]
    fn test_press_emits_modifiers_before_keys() {
        // Arrange
        let (output, em) = make_output();
        let mods = Modifiers::NONE.with(Modifier::Shift).with(Modifier::Ctrl);

        // Act
        output.press_keys(&[KeyCode::S], mods).unwrap();

        // Assert
        assert_eq!(
            em.take(),
            vec![
                KeySignal::down(Modifier::Ctrl),
                KeySignal::down(Modifier::Shift),
                KeySignal::down(KeyCode::S),
            ]
        );
    }

    #[test]
    fn test_press_twice_emits_down_once() {
        // Arrange
        let (output, em) = make_output();

        // Act
        output.press_keys(&[KeyCode::W], ctrl()).unwrap();
        output.press_keys(&[KeyCode::W], ctrl()).unwrap();

        // Assert
        assert_eq!(em.take().len(), 2, "one Ctrl down and one W down");
    }

    #[test]
    fn test_release_emits_keys_then_modifiers_in_reverse_acquisition() {
        // Arrange
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::A], Modifiers::NONE.with(Modifier::Alt)).unwrap();
        output.press_keys(&[KeyCode::B], ctrl()).unwrap();
        em.take();

        // Act
        output
            .release_keys(&[KeyCode::A, KeyCode::B], ctrl().with(Modifier::Alt))
            .unwrap();

        // Assert – Ctrl went down after Alt, so it comes up first
        assert_eq!(
            em.take(),
            vec![
                KeySignal::up(KeyCode::A),
                KeySignal::up(KeyCode::B),
                KeySignal::up(Modifier::Ctrl),
                KeySignal::up(Modifier::Alt),
            ]
        );
        assert!(output.held().is_empty());
    }

    #[test]
    fn test_release_of_unheld_key_is_a_no_op() {
        let (output, em) = make_output();

        output.release_keys(&[KeyCode::Q], ctrl()).unwrap();

        assert!(em.take().is_empty());
    }

    #[test]
    fn test_duplicate_keys_in_one_request_press_once() {
        let (output, em) = make_output();

        output.press_keys(&[KeyCode::E, KeyCode::E], Modifiers::NONE).unwrap();

        assert_eq!(em.take(), vec![KeySignal::down(KeyCode::E)]);
        assert_eq!(output.held().keys, vec![KeyCode::E]);
    }

    #[test]
    fn test_failed_press_is_not_recorded_as_held() {
        // Arrange
        let (output, em) = make_output();
        em.fail(true);

        // Act
        let result = output.press_keys(&[KeyCode::W], ctrl());

        // Assert
        assert!(result.is_err());
        assert!(output.held().is_empty());
    }

    #[test]
    fn test_failed_release_keeps_keys_held() {
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::W], Modifiers::NONE).unwrap();
        em.fail(true);

        assert!(output.release_keys(&[KeyCode::W], Modifiers::NONE).is_err());

        assert_eq!(output.held().keys, vec![KeyCode::W]);
    }

    #[test]
    fn test_partially_delivered_press_records_delivered_keys_as_held() {
        // Arrange – the transport injects only the first signal of each batch
        let (output, em) = make_output();
        em.deliver_at_most(1);

        // Act
        let result = output.press_keys(&[KeyCode::W, KeyCode::S], Modifiers::NONE);
        output.release_all().unwrap();

        // Assert
        assert_eq!(result, Err(EmulationError::Partial { sent: 1, total: 2 }));
        assert_eq!(
            em.take(),
            vec![KeySignal::down(KeyCode::W), KeySignal::up(KeyCode::W)]
        );
    }

    #[test]
    fn test_partial_press_with_modifiers_holds_only_delivered_modifier() {
        let (output, em) = make_output();
        em.deliver_at_most(1);

        assert!(output.press_keys(&[KeyCode::W], ctrl()).is_err());

        assert_eq!(
            output.held(),
            HeldKeys {
                keys: vec![],
                modifiers: vec![Modifier::Ctrl],
            }
        );
    }

    #[test]
    fn test_partially_delivered_release_forgets_only_delivered_keys() {
        // Arrange
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::W, KeyCode::S], Modifiers::NONE).unwrap();
        em.deliver_at_most(1);

        // Act
        let result = output.release_keys(&[KeyCode::W, KeyCode::S], Modifiers::NONE);

        // Assert – S never went up, so it is still held and release_all lifts it
        assert!(matches!(result, Err(EmulationError::Partial { sent: 1, .. })));
        assert_eq!(output.held().keys, vec![KeyCode::S]);
        output.release_all().unwrap();
        let log = em.take();
        let downs = log.iter().filter(|s| s.is_down()).count();
        let ups = log.len() - downs;
        assert_eq!(downs, ups);
    }

    // ── release_all ───────────────────────────────────────────────────────────

    #[test]
    fn test_release_all_releases_keys_then_modifiers_and_is_idempotent() {
        // Arrange
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::W], ctrl()).unwrap();
        em.take();

        // Act
        output.release_all().unwrap();
        let first = em.take();
        output.release_all().unwrap();
        let second = em.take();

        // Assert
        assert_eq!(first, vec![KeySignal::up(KeyCode::W), KeySignal::up(Modifier::Ctrl)]);
        assert!(second.is_empty());
    }

    #[test]
    fn test_release_all_clears_state_even_when_injection_fails() {
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::W], ctrl()).unwrap();
        em.fail(true);

        assert!(output.release_all().is_err());

        assert!(output.held().is_empty());
    }

    // ── one-shot ──────────────────────────────────────────────────────────────

    #[test]
    fn test_one_shot_taps_chord_without_touching_held_state() {
        // Arrange
        let (output, em) = make_output();
        output.press_keys(&[KeyCode::W], Modifiers::NONE).unwrap();
        em.take();

        // Act
        output
            .simulate_one_shot(&[KeyCode::C, KeyCode::V], ctrl())
            .unwrap();

        // Assert
        assert_eq!(
            em.take(),
            vec![
                KeySignal::down(Modifier::Ctrl),
                KeySignal::down(KeyCode::C),
                KeySignal::down(KeyCode::V),
                KeySignal::up(KeyCode::V),
                KeySignal::up(KeyCode::C),
                KeySignal::up(Modifier::Ctrl),
            ]
        );
        assert_eq!(output.held().keys, vec![KeyCode::W]);
    }

    #[test]
    fn test_concurrent_presses_emit_each_key_once() {
        // Arrange
        let (output, em) = make_output();
        let output = Arc::new(output);

        // Act
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let output = Arc::clone(&output);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        output.press_keys(&[KeyCode::W, KeyCode::A], ctrl()).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Assert
        let downs = em.take().into_iter().filter(|s| s.is_down()).count();
        assert_eq!(downs, 3);
    }
}
