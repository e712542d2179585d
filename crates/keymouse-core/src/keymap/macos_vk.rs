//! macOS virtual key codes used by KeyMouse, and the symbolic key names
//! accepted in the configuration file.
//!
//! Key code values are defined in Carbon Events.h (HIToolbox framework):
//! /System/Library/Frameworks/Carbon.framework/Versions/A/Frameworks/HIToolbox.framework/Headers/Events.h

// ── Role keys ─────────────────────────────────────────────────────────────────

pub const F13: u16 = 0x69; // kVK_F13
pub const BACKSLASH: u16 = 0x2A; // kVK_ANSI_Backslash
pub const GRAVE: u16 = 0x32; // kVK_ANSI_Grave
pub const SLASH: u16 = 0x2C; // kVK_ANSI_Slash
pub const UP_ARROW: u16 = 0x7E; // kVK_UpArrow
pub const DOWN_ARROW: u16 = 0x7D; // kVK_DownArrow
pub const LEFT_ARROW: u16 = 0x7B; // kVK_LeftArrow
pub const RIGHT_ARROW: u16 = 0x7C; // kVK_RightArrow
pub const PAGE_UP: u16 = 0x74; // kVK_PageUp
pub const PAGE_DOWN: u16 = 0x79; // kVK_PageDown
pub const HOME: u16 = 0x73; // kVK_Home
pub const END: u16 = 0x77; // kVK_End

// ── Number row ────────────────────────────────────────────────────────────────

pub const ANSI_0: u16 = 0x1D; // kVK_ANSI_0
pub const ANSI_1: u16 = 0x12; // kVK_ANSI_1
pub const ANSI_2: u16 = 0x13; // kVK_ANSI_2
pub const ANSI_3: u16 = 0x14; // kVK_ANSI_3
pub const ANSI_4: u16 = 0x15; // kVK_ANSI_4
pub const ANSI_5: u16 = 0x17; // kVK_ANSI_5
pub const ANSI_6: u16 = 0x16; // kVK_ANSI_6
pub const ANSI_7: u16 = 0x1A; // kVK_ANSI_7
pub const ANSI_8: u16 = 0x1C; // kVK_ANSI_8
pub const ANSI_9: u16 = 0x19; // kVK_ANSI_9

/// Number-row key codes in digit order (`0` first).
pub const NUMBER_ROW: [u16; 10] = [
    ANSI_0, ANSI_1, ANSI_2, ANSI_3, ANSI_4, ANSI_5, ANSI_6, ANSI_7, ANSI_8, ANSI_9,
];

// ── Keypad ────────────────────────────────────────────────────────────────────

pub const KEYPAD_0: u16 = 0x52; // kVK_ANSI_Keypad0
pub const KEYPAD_1: u16 = 0x53; // kVK_ANSI_Keypad1
pub const KEYPAD_2: u16 = 0x54; // kVK_ANSI_Keypad2
pub const KEYPAD_3: u16 = 0x55; // kVK_ANSI_Keypad3
pub const KEYPAD_4: u16 = 0x56; // kVK_ANSI_Keypad4
pub const KEYPAD_5: u16 = 0x57; // kVK_ANSI_Keypad5
pub const KEYPAD_6: u16 = 0x58; // kVK_ANSI_Keypad6
pub const KEYPAD_7: u16 = 0x59; // kVK_ANSI_Keypad7
pub const KEYPAD_8: u16 = 0x5B; // kVK_ANSI_Keypad8
pub const KEYPAD_9: u16 = 0x5C; // kVK_ANSI_Keypad9
pub const KEYPAD_PLUS: u16 = 0x45; // kVK_ANSI_KeypadPlus
pub const KEYPAD_MINUS: u16 = 0x4E; // kVK_ANSI_KeypadMinus
pub const KEYPAD_MULTIPLY: u16 = 0x43; // kVK_ANSI_KeypadMultiply
pub const KEYPAD_DIVIDE: u16 = 0x4B; // kVK_ANSI_KeypadDivide
pub const KEYPAD_EQUALS: u16 = 0x51; // kVK_ANSI_KeypadEquals
pub const KEYPAD_DECIMAL: u16 = 0x41; // kVK_ANSI_KeypadDecimal
pub const KEYPAD_ENTER: u16 = 0x4C; // kVK_ANSI_KeypadEnter

// ── Spare function keys ───────────────────────────────────────────────────────

pub const F14: u16 = 0x6B; // kVK_F14
pub const F15: u16 = 0x71; // kVK_F15
pub const F16: u16 = 0x6A; // kVK_F16
pub const F17: u16 = 0x40; // kVK_F17
pub const F18: u16 = 0x4F; // kVK_F18
pub const F19: u16 = 0x50; // kVK_F19

// ── Symbolic names ────────────────────────────────────────────────────────────

/// Configuration name ↔ key code table.
const NAMED_KEYS: &[(&str, u16)] = &[
    ("num0", ANSI_0),
    ("num1", ANSI_1),
    ("num2", ANSI_2),
    ("num3", ANSI_3),
    ("num4", ANSI_4),
    ("num5", ANSI_5),
    ("num6", ANSI_6),
    ("num7", ANSI_7),
    ("num8", ANSI_8),
    ("num9", ANSI_9),
    ("numpad0", KEYPAD_0),
    ("numpad1", KEYPAD_1),
    ("numpad2", KEYPAD_2),
    ("numpad3", KEYPAD_3),
    ("numpad4", KEYPAD_4),
    ("numpad5", KEYPAD_5),
    ("numpad6", KEYPAD_6),
    ("numpad7", KEYPAD_7),
    ("numpad8", KEYPAD_8),
    ("numpad9", KEYPAD_9),
    ("numpadPlus", KEYPAD_PLUS),
    ("numpadMinus", KEYPAD_MINUS),
    ("numpadStar", KEYPAD_MULTIPLY),
    ("numpadSlash", KEYPAD_DIVIDE),
    ("numpadEqual", KEYPAD_EQUALS),
    ("numpadDot", KEYPAD_DECIMAL),
    ("numpadEnter", KEYPAD_ENTER),
    ("f14", F14),
    ("f15", F15),
    ("f16", F16),
    ("f17", F17),
    ("f18", F18),
    ("f19", F19),
];

/// Resolves a configuration key name (case-sensitive) to its key code.
///
/// Returns `None` if the name is not one of the bindable keys.
pub fn key_code_for_name(name: &str) -> Option<u16> {
    NAMED_KEYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|&(_, code)| code)
}

/// Returns the configuration name of a bindable key code.
pub fn name_for_key_code(code: u16) -> Option<&'static str> {
    NAMED_KEYS
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(n, _)| n)
}

/// All bindable key names, in table order.
pub fn bindable_names() -> impl Iterator<Item = &'static str> {
    NAMED_KEYS.iter().map(|&(n, _)| n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_row_codes_follow_ansi_layout() {
        assert_eq!(NUMBER_ROW, [29, 18, 19, 20, 21, 23, 22, 26, 28, 25]);
    }

    #[test]
    fn test_keypad_digits_skip_0x5a() {
        assert_eq!(KEYPAD_7, 0x59);
        assert_eq!(KEYPAD_8, 0x5B);
    }

    #[test]
    fn test_every_name_round_trips() {
        for name in bindable_names() {
            let code = key_code_for_name(name).expect("name is in table");
            assert_eq!(name_for_key_code(code), Some(name));
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(key_code_for_name("numpadPlus"), Some(KEYPAD_PLUS));
        assert_eq!(key_code_for_name("NumpadPlus"), None);
    }

    #[test]
    fn test_role_keys_are_not_bindable() {
        for code in [F13, BACKSLASH, GRAVE, SLASH, UP_ARROW, PAGE_UP, HOME, END] {
            assert_eq!(name_for_key_code(code), None);
        }
    }
}
