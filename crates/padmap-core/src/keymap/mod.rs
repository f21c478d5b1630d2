//! Output-side key model.
//!
//! Rules emit [`KeyCode`]s plus a [`Modifiers`] set.  The output sink turns
//! those into an ordered batch of [`KeySignal`]s, which a platform keyboard
//! transport injects.  Every key carries its Windows Virtual Key code; other
//! platforms would translate at the transport boundary.

pub mod key_code;
pub mod modifiers;
pub mod windows_vk;

use std::fmt;

pub use key_code::KeyCode;
pub use modifiers::{Modifier, Modifiers};

/// Anything that can be held down on the output keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKey {
    Key(KeyCode),
    Modifier(Modifier),
}

impl OutputKey {
    pub fn vk(self) -> u8 {
        match self {
            OutputKey::Key(k) => k.vk(),
            OutputKey::Modifier(m) => m.vk(),
        }
    }

    pub fn is_extended(self) -> bool {
        match self {
            OutputKey::Key(k) => k.is_extended(),
            OutputKey::Modifier(m) => m.is_extended(),
        }
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKey::Key(k) => k.fmt(f),
            OutputKey::Modifier(m) => m.fmt(f),
        }
    }
}

impl From<KeyCode> for OutputKey {
    fn from(k: KeyCode) -> Self {
        OutputKey::Key(k)
    }
}

impl From<Modifier> for OutputKey {
    fn from(m: Modifier) -> Self {
        OutputKey::Modifier(m)
    }
}

/// Direction of a key signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Down,
    Up,
}

/// One atomic key-down or key-up for the keyboard transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySignal {
    pub key: OutputKey,
    pub action: KeyAction,
}

impl KeySignal {
    pub fn down(key: impl Into<OutputKey>) -> Self {
        Self { key: key.into(), action: KeyAction::Down }
    }

    pub fn up(key: impl Into<OutputKey>) -> Self {
        Self { key: key.into(), action: KeyAction::Up }
    }

    pub fn is_down(&self) -> bool {
        self.action == KeyAction::Down
    }
}

impl fmt::Display for KeySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            KeyAction::Down => write!(f, "down({})", self.key),
            KeyAction::Up => write!(f, "up({})", self.key),
        }
    }
}
