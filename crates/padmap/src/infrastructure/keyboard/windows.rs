//! Windows keyboard injection via the SendInput API.
//!
//! Each batch becomes one `SendInput` call so a chord reaches the input
//! queue without other input interleaved.

#![cfg(target_os = "windows")]

use padmap_core::{KeyAction, KeySignal};
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};

use crate::application::key_state::{EmulationError, KeyboardEmulator};

/// [`KeyboardEmulator`] that injects virtual-key events with SendInput.
#[derive(Debug, Default)]
pub struct SendInputKeyboard;

impl SendInputKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl KeyboardEmulator for SendInputKeyboard {
    fn send(&self, signals: &[KeySignal]) -> Result<(), EmulationError> {
        if signals.is_empty() {
            return Ok(());
        }
        let inputs: Vec<INPUT> = signals.iter().map(to_input).collect();

        // SAFETY: `inputs` is a contiguous slice of valid INPUT structures
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) } as usize;
        if sent < inputs.len() {
            return Err(EmulationError::Partial {
                sent,
                total: inputs.len(),
            });
        }
        Ok(())
    }
}

fn to_input(signal: &KeySignal) -> INPUT {
    let mut flags = KEYBD_EVENT_FLAGS(0);
    if signal.action == KeyAction::Up {
        flags |= KEYEVENTF_KEYUP;
    }
    if signal.key.is_extended() {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }

    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(u16::from(signal.key.vk())),
                wScan: 0,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: 0,
            },
        },
    }
}
