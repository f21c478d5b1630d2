//! One sampled snapshot of controller state.

use super::symbol::InputSymbol;

/// Trigger value (0–255) above which a trigger reads as pressed.
pub const TRIGGER_THRESHOLD: u8 = 128;

/// Stick deflection (absolute, on one axis) beyond which a stick direction
/// reads as pressed.  Half of full travel.
pub const STICK_THRESHOLD: i16 = 16384;

/// Raw controller state as reported by the device for one poll tick.
///
/// Field layout follows `XINPUT_GAMEPAD`.  Stick Y axes are positive *up*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawState {
    /// Digital button bitmask.  See [`InputSymbol::button_mask`].
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl RawState {
    /// Returns a state with only the given buttons held and everything
    /// analog at rest.
    pub fn with_buttons(buttons: u16) -> Self {
        Self {
            buttons,
            ..Self::default()
        }
    }

    /// Returns `true` if `symbol` reads as pressed in this snapshot.
    ///
    /// Paddles are never reported by this state shape and always read `false`.
    pub fn is_pressed(&self, symbol: InputSymbol) -> bool {
        if let Some(mask) = symbol.button_mask() {
            return self.buttons & mask != 0;
        }
        match symbol {
            InputSymbol::Lt => trigger_pressed(self.left_trigger),
            InputSymbol::Rt => trigger_pressed(self.right_trigger),
            InputSymbol::LeftStickUp => axis_positive(self.thumb_ly),
            InputSymbol::LeftStickDown => axis_negative(self.thumb_ly),
            InputSymbol::LeftStickLeft => axis_negative(self.thumb_lx),
            InputSymbol::LeftStickRight => axis_positive(self.thumb_lx),
            InputSymbol::RightStickUp => axis_positive(self.thumb_ry),
            InputSymbol::RightStickDown => axis_negative(self.thumb_ry),
            InputSymbol::RightStickLeft => axis_negative(self.thumb_rx),
            InputSymbol::RightStickRight => axis_positive(self.thumb_rx),
            _ => false,
        }
    }

    /// Lists every symbol currently pressed, in [`InputSymbol::ALL`] order.
    pub fn pressed_symbols(&self) -> Vec<InputSymbol> {
        InputSymbol::ALL
            .iter()
            .copied()
            .filter(|&s| self.is_pressed(s))
            .collect()
    }
}

/// `raw > TRIGGER_THRESHOLD`; exactly 128 is still released.
pub fn trigger_pressed(raw: u8) -> bool {
    raw > TRIGGER_THRESHOLD
}

pub fn axis_positive(raw: i16) -> bool {
    raw > STICK_THRESHOLD
}

pub fn axis_negative(raw: i16) -> bool {
    raw < -STICK_THRESHOLD
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_has_nothing_pressed() {
        assert!(RawState::default().pressed_symbols().is_empty());
    }

    #[test]
    fn test_trigger_threshold_is_strictly_greater() {
        // Arrange
        let at = RawState { left_trigger: 128, ..RawState::default() };
        let above = RawState { left_trigger: 129, ..RawState::default() };

        // Assert
        assert!(!at.is_pressed(InputSymbol::Lt));
        assert!(above.is_pressed(InputSymbol::Lt));
    }

    #[test]
    fn test_stick_threshold_is_strict_in_both_directions() {
        let edge_pos = RawState { thumb_lx: 16384, ..RawState::default() };
        let edge_neg = RawState { thumb_lx: -16384, ..RawState::default() };
        let past_neg = RawState { thumb_lx: -16385, ..RawState::default() };

        assert!(!edge_pos.is_pressed(InputSymbol::LeftStickRight));
        assert!(!edge_neg.is_pressed(InputSymbol::LeftStickLeft));
        assert!(past_neg.is_pressed(InputSymbol::LeftStickLeft));
    }

    #[test]
    fn test_stick_y_positive_is_up() {
        let state = RawState { thumb_ry: i16::MAX, ..RawState::default() };
        assert_eq!(state.pressed_symbols(), vec![InputSymbol::RightStickUp]);
    }

    #[test]
    fn test_extreme_negative_axis_reads_as_pressed() {
        let state = RawState { thumb_ly: i16::MIN, ..RawState::default() };
        assert!(state.is_pressed(InputSymbol::LeftStickDown));
        assert!(!state.is_pressed(InputSymbol::LeftStickUp));
    }

    #[test]
    fn test_pressed_symbols_lists_in_canonical_order() {
        // Arrange – Y, LB and RT held
        let state = RawState {
            buttons: 0x8000 | 0x0100,
            right_trigger: 255,
            ..RawState::default()
        };

        // Act
        let pressed = state.pressed_symbols();

        // Assert
        assert_eq!(pressed, vec![InputSymbol::Y, InputSymbol::Lb, InputSymbol::Rt]);
    }

    #[test]
    fn test_paddles_never_read_as_pressed() {
        let state = RawState {
            buttons: 0xFFFF,
            left_trigger: 255,
            right_trigger: 255,
            ..RawState::default()
        };
        assert!(!state.is_pressed(InputSymbol::Paddle1));
        assert!(!state.is_pressed(InputSymbol::Paddle4));
    }
}
