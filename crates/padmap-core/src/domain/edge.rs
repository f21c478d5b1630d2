//! Level-to-edge conversion for sampled controller state.
//!
//! The device is polled, so every sample reports what is held *now*.  Rules
//! act on transitions, so the detector remembers the previous sample and
//! reports only what changed.  Holding a button for a second produces one
//! press event, not a hundred.

use super::event::ButtonEvent;
use super::raw_state::{trigger_pressed, RawState};
use super::symbol::InputSymbol;

/// Order in which changed digital buttons are reported within one tick.
const BUTTON_ORDER: [InputSymbol; 16] = [
    InputSymbol::A,
    InputSymbol::B,
    InputSymbol::X,
    InputSymbol::Y,
    InputSymbol::Lb,
    InputSymbol::Rb,
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
];

const TRIGGER_ORDER: [InputSymbol; 2] = [InputSymbol::Lt, InputSymbol::Rt];

const STICK_ORDER: [InputSymbol; 8] = [
    InputSymbol::LeftStickUp,
    InputSymbol::LeftStickDown,
    InputSymbol::LeftStickLeft,
    InputSymbol::LeftStickRight,
    InputSymbol::RightStickUp,
    InputSymbol::RightStickDown,
    InputSymbol::RightStickLeft,
    InputSymbol::RightStickRight,
];

/// Converts a stream of [`RawState`] samples into [`ButtonEvent`]s.
///
/// Within one tick, events come out as buttons, then triggers, then stick
/// directions, each group in a fixed order.  Consumers should not depend on
/// that ordering for correctness.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    device_id: u32,
    prev_buttons: u16,
    prev_triggers: [bool; 2],
    prev_sticks: [bool; 8],
}

impl EdgeDetector {
    /// Creates a detector for the controller in slot `device_id`, starting
    /// from an all-released previous state.
    pub fn new(device_id: u32) -> Self {
        Self {
            device_id,
            ..Self::default()
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Forgets the previous sample.  After a reset, anything held in the next
    /// sample is reported as a fresh press.
    pub fn reset(&mut self) {
        self.prev_buttons = 0;
        self.prev_triggers = [false; 2];
        self.prev_sticks = [false; 8];
    }

    /// Diffs `state` against the previous sample, records `state` as the new
    /// previous sample, and returns one event per symbol that changed.
    pub fn detect(&mut self, state: &RawState) -> Vec<ButtonEvent> {
        let mut events = Vec::new();

        let changed = state.buttons ^ self.prev_buttons;
        if changed != 0 {
            for symbol in BUTTON_ORDER {
                let Some(mask) = symbol.button_mask() else {
                    continue;
                };
                if changed & mask != 0 {
                    events.push(self.event(symbol, state.buttons & mask != 0));
                }
            }
        }
        self.prev_buttons = state.buttons;

        let triggers = [
            trigger_pressed(state.left_trigger),
            trigger_pressed(state.right_trigger),
        ];
        for (i, symbol) in TRIGGER_ORDER.into_iter().enumerate() {
            if triggers[i] != self.prev_triggers[i] {
                events.push(self.event(symbol, triggers[i]));
            }
        }
        self.prev_triggers = triggers;

        let mut sticks = [false; 8];
        for (i, symbol) in STICK_ORDER.into_iter().enumerate() {
            sticks[i] = state.is_pressed(symbol);
            if sticks[i] != self.prev_sticks[i] {
                events.push(self.event(symbol, sticks[i]));
            }
        }
        self.prev_sticks = sticks;

        events
    }

    fn event(&self, symbol: InputSymbol, pressed: bool) -> ButtonEvent {
        ButtonEvent {
            symbol,
            pressed,
            device_id: self.device_id,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn press(symbol: InputSymbol) -> ButtonEvent {
        ButtonEvent::press(symbol, 0)
    }

    fn release(symbol: InputSymbol) -> ButtonEvent {
        ButtonEvent::release(symbol, 0)
    }

    #[test]
    fn test_idle_state_produces_no_events() {
        let mut detector = EdgeDetector::new(0);
        assert!(detector.detect(&RawState::default()).is_empty());
    }

    #[test]
    fn test_button_press_then_hold_then_release() {
        // Arrange
        let mut detector = EdgeDetector::new(0);
        let held = RawState::with_buttons(0x1000);

        // Act
        let first = detector.detect(&held);
        let second = detector.detect(&held);
        let third = detector.detect(&RawState::default());

        // Assert
        assert_eq!(first, vec![press(InputSymbol::A)]);
        assert!(second.is_empty(), "holding must not repeat the press");
        assert_eq!(third, vec![release(InputSymbol::A)]);
    }

    #[test]
    fn test_simultaneous_buttons_follow_fixed_order() {
        // Arrange – D-pad up, Menu and B in the same tick
        let mut detector = EdgeDetector::new(0);
        let state = RawState::with_buttons(0x0001 | 0x0010 | 0x2000);

        // Act
        let events = detector.detect(&state);

        // Assert
        assert_eq!(
            events,
            vec![
                press(InputSymbol::B),
                press(InputSymbol::Start),
                press(InputSymbol::DpadUp),
            ]
        );
    }

    #[test]
    fn test_categories_ordered_buttons_triggers_sticks() {
        let mut detector = EdgeDetector::new(0);
        let state = RawState {
            buttons: 0x1000,
            right_trigger: 200,
            thumb_lx: 30000,
            ..RawState::default()
        };

        let events = detector.detect(&state);

        assert_eq!(
            events,
            vec![
                press(InputSymbol::A),
                press(InputSymbol::Rt),
                press(InputSymbol::LeftStickRight),
            ]
        );
    }

    #[test]
    fn test_trigger_crossing_threshold_emits_once() {
        // Arrange
        let mut detector = EdgeDetector::new(0);
        let ramp = [100u8, 129, 200, 255, 129, 128, 50];

        // Act
        let events: Vec<_> = ramp
            .iter()
            .flat_map(|&lt| {
                detector.detect(&RawState { left_trigger: lt, ..RawState::default() })
            })
            .collect();

        // Assert
        assert_eq!(events, vec![press(InputSymbol::Lt), release(InputSymbol::Lt)]);
    }

    #[test]
    fn test_stick_sweep_left_to_right_crosses_both_directions() {
        let mut detector = EdgeDetector::new(0);
        let sweep = [-32768i16, 0, 32767];

        let events: Vec<_> = sweep
            .iter()
            .flat_map(|&x| detector.detect(&RawState { thumb_rx: x, ..RawState::default() }))
            .collect();

        assert_eq!(
            events,
            vec![
                press(InputSymbol::RightStickLeft),
                release(InputSymbol::RightStickLeft),
                press(InputSymbol::RightStickRight),
            ]
        );
    }

    #[test]
    fn test_stick_jump_across_centre_releases_and_presses_same_tick() {
        let mut detector = EdgeDetector::new(0);
        detector.detect(&RawState { thumb_ly: 30000, ..RawState::default() });

        let events = detector.detect(&RawState { thumb_ly: -30000, ..RawState::default() });

        assert_eq!(
            events,
            vec![release(InputSymbol::LeftStickUp), press(InputSymbol::LeftStickDown)]
        );
    }

    #[test]
    fn test_reset_reports_held_inputs_as_fresh_presses() {
        // Arrange
        let mut detector = EdgeDetector::new(0);
        let held = RawState { buttons: 0x4000, left_trigger: 255, ..RawState::default() };
        detector.detect(&held);

        // Act
        detector.reset();
        let events = detector.detect(&held);

        // Assert
        assert_eq!(events, vec![press(InputSymbol::X), press(InputSymbol::Lt)]);
    }

    #[test]
    fn test_events_carry_device_id() {
        let mut detector = EdgeDetector::new(3);
        let events = detector.detect(&RawState::with_buttons(0x0200));
        assert_eq!(events, vec![ButtonEvent::press(InputSymbol::Rb, 3)]);
    }

    #[test]
    fn test_press_release_balance_never_exceeds_one() {
        // Arrange – pseudo-random walk over the whole button mask
        let mut detector = EdgeDetector::new(0);
        let mut balance = std::collections::HashMap::new();
        let mut seed: u32 = 0x2545_F491;

        // Act
        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let state = RawState {
                buttons: seed as u16,
                left_trigger: (seed >> 16) as u8,
                thumb_lx: (seed >> 8) as i16,
                ..RawState::default()
            };
            for event in detector.detect(&state) {
                let entry = balance.entry(event.symbol).or_insert(0i32);
                *entry += if event.pressed { 1 } else { -1 };

                // Assert
                assert!((0..=1).contains(entry), "{:?} balance {}", event.symbol, entry);
            }
        }
    }
}
