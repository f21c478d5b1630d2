//! Keyboard transport for `--dry-run`: logs each key signal instead of
//! injecting it.

use padmap_core::KeySignal;
use tracing::info;

use crate::application::key_state::{EmulationError, KeyboardEmulator};

#[derive(Debug, Default)]
pub struct LoggingKeyboard;

impl LoggingKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl KeyboardEmulator for LoggingKeyboard {
    fn send(&self, signals: &[KeySignal]) -> Result<(), EmulationError> {
        for signal in signals {
            info!(vk = format_args!("0x{:02X}", signal.key.vk()), "{signal}");
        }
        Ok(())
    }
}
