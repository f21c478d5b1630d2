//! Domain entities for padmap.
//!
//! This module contains the remapping rules and the state machines that feed
//! them, with no OS, runtime, or UI dependencies.
//!
//! # How the pieces fit together
//!
//! A controller is sampled repeatedly.  Each sample is a [`raw_state::RawState`]:
//! a button bitmask plus analog trigger and stick values.  Users do not think in
//! bitmasks, so every input they can bind is named by an
//! [`symbol::InputSymbol`], including derived ones such as "left trigger past
//! half travel" or "right stick pushed left".
//!
//! The [`edge::EdgeDetector`] compares each sample with the previous one and
//! emits a [`event::ButtonEvent`] only when a symbol changes between pressed
//! and released.  Those events are then looked up in the
//! [`rule_table::RuleTable`], which maps a symbol to a
//! [`rule::MappingRule`] describing what to do.

pub mod edge;
pub mod event;
pub mod raw_state;
pub mod rule;
pub mod rule_table;
pub mod symbol;
