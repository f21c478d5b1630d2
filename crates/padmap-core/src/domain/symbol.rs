//! The closed set of logical controller inputs a rule can bind to.
//!
//! Most symbols correspond to one bit of the XInput `wButtons` mask.  The
//! rest are *derived*: a trigger counts as pressed once it travels past
//! [`TRIGGER_THRESHOLD`](super::raw_state::TRIGGER_THRESHOLD), and each stick
//! contributes four direction symbols that turn on past
//! [`STICK_THRESHOLD`](super::raw_state::STICK_THRESHOLD).  Elite-style rear
//! paddles are part of the space so rules can name them, but XInput never
//! reports them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One logical input on the controller.
///
/// Serialized as a stable snake_case name (`"a"`, `"lb"`, `"dpad_up"`,
/// `"left_stick_left"`) so config files survive reordering of this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSymbol {
    A,
    B,
    X,
    Y,
    Lb,
    Rb,
    Lt,
    Rt,
    /// Menu button on current pads.
    Start,
    /// View button on current pads.
    Back,
    Guide,
    Share,
    LeftThumb,
    RightThumb,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Paddle1,
    Paddle2,
    Paddle3,
    Paddle4,
    LeftStickUp,
    LeftStickDown,
    LeftStickLeft,
    LeftStickRight,
    RightStickUp,
    RightStickDown,
    RightStickLeft,
    RightStickRight,
}

/// Broad grouping of [`InputSymbol`]s by how they are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// A physical digital button with its own bit in the button mask.
    Button,
    /// An analog trigger read as a button through a threshold.
    Trigger,
    /// A rear paddle.  Bindable, but never sampled from XInput.
    Paddle,
    /// One direction of an analog stick read as a button through a threshold.
    StickDirection,
}

impl InputSymbol {
    /// Every symbol, in listing order (face, shoulders, system, thumbs,
    /// D-pad, paddles, sticks).
    pub const ALL: [InputSymbol; 30] = [
        InputSymbol::A,
        InputSymbol::B,
        InputSymbol::X,
        InputSymbol::Y,
        InputSymbol::Lb,
        InputSymbol::Rb,
        InputSymbol::Lt,
        InputSymbol::Rt,
        InputSymbol::Start,
        InputSymbol::Back,
        InputSymbol::Guide,
        InputSymbol::Share,
        InputSymbol::LeftThumb,
        InputSymbol::RightThumb,
        InputSymbol::DpadUp,
        InputSymbol::DpadDown,
        InputSymbol::DpadLeft,
        InputSymbol::DpadRight,
        InputSymbol::Paddle1,
        InputSymbol::Paddle2,
        InputSymbol::Paddle3,
        InputSymbol::Paddle4,
        InputSymbol::LeftStickUp,
        InputSymbol::LeftStickDown,
        InputSymbol::LeftStickLeft,
        InputSymbol::LeftStickRight,
        InputSymbol::RightStickUp,
        InputSymbol::RightStickDown,
        InputSymbol::RightStickLeft,
        InputSymbol::RightStickRight,
    ];

    /// Returns the XInput `wButtons` bit for this symbol, or `None` for
    /// derived symbols (triggers, paddles, stick directions).
    pub const fn button_mask(self) -> Option<u16> {
        match self {
            InputSymbol::DpadUp => Some(0x0001),
            InputSymbol::DpadDown => Some(0x0002),
            InputSymbol::DpadLeft => Some(0x0004),
            InputSymbol::DpadRight => Some(0x0008),
            InputSymbol::Start => Some(0x0010),
            InputSymbol::Back => Some(0x0020),
            InputSymbol::LeftThumb => Some(0x0040),
            InputSymbol::RightThumb => Some(0x0080),
            InputSymbol::Lb => Some(0x0100),
            InputSymbol::Rb => Some(0x0200),
            InputSymbol::Guide => Some(0x0400),
            InputSymbol::Share => Some(0x0800),
            InputSymbol::A => Some(0x1000),
            InputSymbol::B => Some(0x2000),
            InputSymbol::X => Some(0x4000),
            InputSymbol::Y => Some(0x8000),
            _ => None,
        }
    }

    /// Returns how this symbol is produced.
    pub const fn kind(self) -> SymbolKind {
        match self {
            InputSymbol::Lt | InputSymbol::Rt => SymbolKind::Trigger,
            InputSymbol::Paddle1
            | InputSymbol::Paddle2
            | InputSymbol::Paddle3
            | InputSymbol::Paddle4 => SymbolKind::Paddle,
            InputSymbol::LeftStickUp
            | InputSymbol::LeftStickDown
            | InputSymbol::LeftStickLeft
            | InputSymbol::LeftStickRight
            | InputSymbol::RightStickUp
            | InputSymbol::RightStickDown
            | InputSymbol::RightStickLeft
            | InputSymbol::RightStickRight => SymbolKind::StickDirection,
            _ => SymbolKind::Button,
        }
    }

    pub fn is_trigger(self) -> bool {
        self.kind() == SymbolKind::Trigger
    }

    pub fn is_stick_direction(self) -> bool {
        self.kind() == SymbolKind::StickDirection
    }

    pub fn is_paddle(self) -> bool {
        self.kind() == SymbolKind::Paddle
    }

    /// Human-readable label, as printed on an Xbox controller where possible.
    pub const fn label(self) -> &'static str {
        match self {
            InputSymbol::A => "A",
            InputSymbol::B => "B",
            InputSymbol::X => "X",
            InputSymbol::Y => "Y",
            InputSymbol::Lb => "LB",
            InputSymbol::Rb => "RB",
            InputSymbol::Lt => "LT",
            InputSymbol::Rt => "RT",
            InputSymbol::Start => "Menu",
            InputSymbol::Back => "View",
            InputSymbol::Guide => "Xbox",
            InputSymbol::Share => "Share",
            InputSymbol::LeftThumb => "LS (click)",
            InputSymbol::RightThumb => "RS (click)",
            InputSymbol::DpadUp => "D-Pad Up",
            InputSymbol::DpadDown => "D-Pad Down",
            InputSymbol::DpadLeft => "D-Pad Left",
            InputSymbol::DpadRight => "D-Pad Right",
            InputSymbol::Paddle1 => "P1",
            InputSymbol::Paddle2 => "P2",
            InputSymbol::Paddle3 => "P3",
            InputSymbol::Paddle4 => "P4",
            InputSymbol::LeftStickUp => "Left Stick Up",
            InputSymbol::LeftStickDown => "Left Stick Down",
            InputSymbol::LeftStickLeft => "Left Stick Left",
            InputSymbol::LeftStickRight => "Left Stick Right",
            InputSymbol::RightStickUp => "Right Stick Up",
            InputSymbol::RightStickDown => "Right Stick Down",
            InputSymbol::RightStickLeft => "Right Stick Left",
            InputSymbol::RightStickRight => "Right Stick Right",
        }
    }
}

impl fmt::Display for InputSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
