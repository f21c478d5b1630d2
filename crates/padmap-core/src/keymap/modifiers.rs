//! Modifier keys and modifier sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single modifier key.
///
/// Declaration order is the canonical press order: Ctrl, Alt, Shift, Win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Win,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Modifier::Ctrl, Modifier::Alt, Modifier::Shift, Modifier::Win];

    /// Windows Virtual Key code.  Ctrl, Alt and Shift use the side-neutral
    /// codes; Win uses `VK_LWIN`.
    pub const fn vk(self) -> u8 {
        match self {
            Modifier::Ctrl => 0x11,
            Modifier::Alt => 0x12,
            Modifier::Shift => 0x10,
            Modifier::Win => 0x5B,
        }
    }

    pub const fn is_extended(self) -> bool {
        matches!(self, Modifier::Win)
    }

    const fn bit(self) -> u8 {
        match self {
            Modifier::Ctrl => Modifiers::CTRL,
            Modifier::Alt => Modifiers::ALT,
            Modifier::Shift => Modifiers::SHIFT,
            Modifier::Win => Modifiers::WIN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
            Modifier::Win => "Win",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of modifiers packed into a byte.
///
/// Serialized as a list of names (`["ctrl", "shift"]`) so config files stay
/// readable.
///
/// Bit layout:
/// - Bit 0: Ctrl
/// - Bit 1: Alt
/// - Bit 2: Shift
/// - Bit 3: Win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Modifier>", into = "Vec<Modifier>")]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const CTRL: u8 = 1 << 0;
    pub const ALT: u8 = 1 << 1;
    pub const SHIFT: u8 = 1 << 2;
    pub const WIN: u8 = 1 << 3;

    pub const NONE: Modifiers = Modifiers(0);

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    /// Returns a copy with `modifier` added.
    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0 & 0x0F == 0
    }

    /// Iterates the set in canonical press order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<Vec<Modifier>> for Modifiers {
    fn from(list: Vec<Modifier>) -> Self {
        list.into_iter().collect()
    }
}

impl From<Modifiers> for Vec<Modifier> {
    fn from(set: Modifiers) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Modifiers::NONE;
        for m in iter {
            set.insert(m);
        }
        set
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iter_follows_canonical_order_regardless_of_insert_order() {
        // Arrange
        let set: Modifiers = [Modifier::Win, Modifier::Shift, Modifier::Ctrl].into_iter().collect();

        // Act
        let order: Vec<_> = set.iter().collect();

        // Assert
        assert_eq!(order, vec![Modifier::Ctrl, Modifier::Shift, Modifier::Win]);
    }

    #[test]
    fn test_none_is_empty() {
        assert!(Modifiers::NONE.is_empty());
        assert!(!Modifiers::NONE.with(Modifier::Alt).is_empty());
    }

    #[test]
    fn test_modifier_vk_codes() {
        assert_eq!(Modifier::Ctrl.vk(), 0x11);
        assert_eq!(Modifier::Alt.vk(), 0x12);
        assert_eq!(Modifier::Shift.vk(), 0x10);
        assert_eq!(Modifier::Win.vk(), 0x5B);
    }

    #[test]
    fn test_serializes_as_name_list() {
        // Arrange
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Wrapper {
            modifiers: Modifiers,
        }
        let value = Wrapper { modifiers: Modifiers::NONE.with(Modifier::Shift).with(Modifier::Ctrl) };

        // Act
        let text = toml::to_string(&value).unwrap();
        let back: Wrapper = toml::from_str(&text).unwrap();

        // Assert
        assert_eq!(text.trim(), r#"modifiers = ["ctrl", "shift"]"#);
        assert_eq!(back, value);
    }
}
