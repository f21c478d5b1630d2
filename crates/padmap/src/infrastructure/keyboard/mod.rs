//! Keyboard transports.
//!
//! The correct OS implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`.  `logging` backs `--dry-run`; `mock` backs tests.

pub mod logging;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
