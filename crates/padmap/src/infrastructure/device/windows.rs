//! Windows controller polling via XInput.
//!
//! `XInputGetState` is cheap and non-blocking, so it is called directly from
//! the poll task on every tick.

#![cfg(target_os = "windows")]

use padmap_core::RawState;
use tracing::{info, warn};
use windows::Win32::Foundation::{ERROR_DEVICE_NOT_CONNECTED, ERROR_SUCCESS};
use windows::Win32::UI::Input::XboxController::{XInputGetState, XINPUT_STATE};

use super::MAX_DEVICE_INDEX;
use crate::application::poll_device::{DeviceError, DeviceStateSource};

/// [`DeviceStateSource`] backed by `XInputGetState`.
#[derive(Debug, Default)]
pub struct XInputGamepad;

impl XInputGamepad {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceStateSource for XInputGamepad {
    /// Validates the slot.  An unplugged pad is not an error here: polling
    /// simply skips ticks until one is connected.
    fn init(&self, index: u32) -> Result<(), DeviceError> {
        if index > MAX_DEVICE_INDEX {
            return Err(DeviceError::InvalidIndex(index));
        }
        match self.sample(index) {
            Ok(_) => info!(slot = index, "controller connected"),
            Err(DeviceError::NotConnected(_)) => {
                warn!(slot = index, "no controller connected yet, waiting")
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn sample(&self, index: u32) -> Result<RawState, DeviceError> {
        if index > MAX_DEVICE_INDEX {
            return Err(DeviceError::InvalidIndex(index));
        }

        let mut state = XINPUT_STATE::default();
        // SAFETY: `state` is a valid, writable XINPUT_STATE on the stack
        let rc = unsafe { XInputGetState(index, &mut state) };
        if rc == ERROR_DEVICE_NOT_CONNECTED.0 {
            return Err(DeviceError::NotConnected(index));
        }
        if rc != ERROR_SUCCESS.0 {
            return Err(DeviceError::Platform(format!("XInputGetState returned {rc}")));
        }

        let pad = state.Gamepad;
        Ok(RawState {
            buttons: pad.wButtons.0,
            left_trigger: pad.bLeftTrigger,
            right_trigger: pad.bRightTrigger,
            thumb_lx: pad.sThumbLX,
            thumb_ly: pad.sThumbLY,
            thumb_rx: pad.sThumbRX,
            thumb_ry: pad.sThumbRY,
        })
    }
}
