//! Windows Virtual Key code to [`KeyCode`] reverse table.
//!
//! `VK_TO_KEY_TABLE` is a compile-time array of 256 entries indexed by VK
//! code.  It is built from [`KeyCode::ALL`], so adding a key to the enum is
//! enough to make it reachable from its VK.

use super::key_code::KeyCode;

/// Translates a Windows Virtual Key code to a [`KeyCode`].
///
/// Returns `None` for VKs padmap cannot emit (mouse buttons, media keys,
/// modifiers, punctuation).
pub fn vk_to_key(vk: u8) -> Option<KeyCode> {
    VK_TO_KEY_TABLE[vk as usize]
}

const VK_TO_KEY_TABLE: [Option<KeyCode>; 256] = {
    let mut t = [None; 256];
    let mut i = 0;
    while i < KeyCode::ALL.len() {
        let key = KeyCode::ALL[i];
        t[key as usize] = Some(key);
        i += 1;
    }
    t
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_round_trips_through_its_vk() {
        for key in KeyCode::ALL {
            assert_eq!(
                vk_to_key(key.vk()),
                Some(key),
                "vk_to_key(0x{:02X}) should return {key:?}",
                key.vk()
            );
        }
    }

    #[test]
    fn test_modifier_and_mouse_vks_are_unmapped() {
        // VK_LBUTTON, VK_RBUTTON, VK_SHIFT, VK_CONTROL, VK_MENU, VK_LWIN
        for vk in [0x01u8, 0x02, 0x10, 0x11, 0x12, 0x5B] {
            assert_eq!(vk_to_key(vk), None, "0x{vk:02X} should be unmapped");
        }
    }

    #[test]
    fn test_vk_to_key_never_panics_for_any_u8() {
        for vk in 0u8..=255 {
            let _ = vk_to_key(vk);
        }
    }

    #[test]
    fn test_all_26_letters_are_mapped() {
        for vk in 0x41u8..=0x5A {
            assert!(vk_to_key(vk).is_some(), "VK 0x{vk:02X} must map to a letter");
        }
    }
}
