//! Discrete press/release events produced by the edge detector.

use super::symbol::InputSymbol;

/// One observed transition of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    pub symbol: InputSymbol,
    /// `true` on the press edge, `false` on the release edge.
    pub pressed: bool,
    /// Controller slot the event came from.
    pub device_id: u32,
}

impl ButtonEvent {
    pub fn press(symbol: InputSymbol, device_id: u32) -> Self {
        Self { symbol, pressed: true, device_id }
    }

    pub fn release(symbol: InputSymbol, device_id: u32) -> Self {
        Self { symbol, pressed: false, device_id }
    }

    /// Returns the same event on another symbol.  Used when a forwarding rule
    /// re-enters dispatch for its targets.
    pub fn retarget(&self, symbol: InputSymbol) -> Self {
        Self { symbol, ..*self }
    }
}
