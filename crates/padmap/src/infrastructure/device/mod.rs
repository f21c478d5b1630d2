//! Device state sources.
//!
//! On Windows the XInput adapter reads a physical controller.  The scripted
//! mock drives tests and `--dry-run`, where it simply reports an idle pad.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Highest XInput user slot.
pub const MAX_DEVICE_INDEX: u32 = 3;
