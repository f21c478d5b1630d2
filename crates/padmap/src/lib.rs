//! padmap library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does padmap do?
//!
//! padmap lets a game controller drive a keyboard.  While running it:
//!
//! 1. Polls one XInput controller slot at a fixed rate (100 Hz by default).
//! 2. Turns each sampled state into press/release edges with the
//!    `padmap_core` edge detector, so a held button is one press, not a
//!    stream of them.
//! 3. Looks each edge up in the user's rule table.  A keyboard rule holds
//!    its key chord for as long as the button is held; a forwarding rule
//!    re-runs the rules of other controller inputs instead.
//! 4. Injects the resulting key-down/key-up signals with `SendInput`,
//!    tracking which keys it holds so nothing is pressed twice and nothing
//!    is left stuck when mapping stops.

/// Application layer: polling, dispatch, output bookkeeping, and the controller.
pub mod application;

/// Infrastructure layer: OS adapters and configuration storage.
pub mod infrastructure;
