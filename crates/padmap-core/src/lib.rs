//! # padmap-core
//!
//! Shared domain library for padmap: the gamepad input symbol space, the
//! edge detector that turns sampled controller state into press/release
//! events, mapping rules and the concurrent rule table, and the keyboard
//! key tables used when emitting output.
//!
//! This crate has no dependencies on OS APIs, async runtimes, or UI code.
//! Everything that touches a real device or injects real keystrokes lives in
//! the `padmap` crate behind traits.
//!
//! # Architecture overview
//!
//! padmap samples an XInput-style controller at a fixed rate and remaps what
//! the player does to keyboard shortcuts or to other controller inputs:
//!
//! - **`domain`** – Pure logic.  [`InputSymbol`] names every logical input
//!   (buttons, triggers as buttons, stick directions as buttons),
//!   [`EdgeDetector`] diffs consecutive [`RawState`] samples into
//!   [`ButtonEvent`]s, and [`RuleTable`] holds the user's [`MappingRule`]s.
//!
//! - **`keymap`** – The output side: [`KeyCode`] and [`Modifier`] with their
//!   Windows virtual-key codes, plus the [`KeySignal`] records handed to a
//!   keyboard transport.

pub mod domain;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `padmap_core::MappingRule` instead of `padmap_core::domain::rule::MappingRule`.
pub use domain::edge::EdgeDetector;
pub use domain::event::ButtonEvent;
pub use domain::raw_state::{RawState, STICK_THRESHOLD, TRIGGER_THRESHOLD};
pub use domain::rule::{MappingRule, RuleError, TargetKind};
pub use domain::rule_table::{RuleEditError, RuleSnapshot, RuleTable};
pub use domain::symbol::{InputSymbol, SymbolKind};
pub use keymap::{KeyAction, KeyCode, KeySignal, Modifier, Modifiers, OutputKey};
