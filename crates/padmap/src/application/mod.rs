//! Application layer use cases for padmap.
//!
//! Everything here depends on traits for the device and the keyboard, never
//! on an OS API, so the whole mapping pipeline runs under test with the mocks
//! in `infrastructure`.
//!
//! # Sub-modules
//!
//! - **`poll_device`** – The poll task: samples a `DeviceStateSource` on a
//!   timer, runs the edge detector, and feeds a bounded event queue.
//!
//! - **`key_state`** – The output sink.  Tracks which keys and modifiers
//!   padmap currently holds and turns press/release requests into the
//!   minimal batch of key signals for a `KeyboardEmulator`.
//!
//! - **`dispatch`** – Resolves one event against the rule table, following
//!   forwarding rules with cycle protection.
//!
//! - **`controller`** – Start/stop lifecycle, validated rule editing, and
//!   the state/rules/error hooks a front end subscribes to.

pub mod controller;
pub mod dispatch;
pub mod key_state;
pub mod poll_device;

#[cfg(test)]
pub(crate) mod test_support;
