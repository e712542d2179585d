//! Key classification.
//!
//! Every raw key code maps to exactly one [`KeyRole`].  A fixed table assigns
//! the pointer, click, and scroll roles; the user's [`KeyMap`] supplies the
//! mapped actions; everything else passes through.

pub mod macos_vk;

use std::collections::HashMap;

use crate::domain::action::Action;
use crate::domain::clicks::MouseButton;
use crate::domain::motion::Direction;

/// Key code → action bindings loaded from configuration.
///
/// Immutable once the engine is built.
pub type KeyMap = HashMap<u16, Action>;

/// The semantic role of a key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRole {
    /// The activation modifier (F13).
    Modifier,
    LeftClick,
    RightClick,
    MiddleClick,
    Move(Direction),
    Scroll(Direction),
    /// A key bound to an [`Action`] in the key map.
    MappedAction(u16),
    Passthrough,
}

impl KeyRole {
    /// The button a click role presses.
    pub fn click_button(self) -> Option<MouseButton> {
        match self {
            KeyRole::LeftClick => Some(MouseButton::Left),
            KeyRole::RightClick => Some(MouseButton::Right),
            KeyRole::MiddleClick => Some(MouseButton::Middle),
            _ => None,
        }
    }

    /// `true` for roles that count as "pointer use" (move, scroll, click).
    pub fn is_pointer_role(self) -> bool {
        matches!(
            self,
            KeyRole::LeftClick
                | KeyRole::RightClick
                | KeyRole::MiddleClick
                | KeyRole::Move(_)
                | KeyRole::Scroll(_)
        )
    }
}

/// Stateless key classifier.
pub struct KeyClassifier;

impl KeyClassifier {
    /// Classifies `key_code` against the fixed role table and `key_map`.
    ///
    /// Never fails: unknown, unmapped codes are [`KeyRole::Passthrough`].
    pub fn classify(key_code: u16, key_map: &KeyMap) -> KeyRole {
        match fixed_role(key_code) {
            Some(role) => role,
            None if key_map.contains_key(&key_code) => KeyRole::MappedAction(key_code),
            None => KeyRole::Passthrough,
        }
    }
}

fn fixed_role(key_code: u16) -> Option<KeyRole> {
    use macos_vk as vk;

    let role = match key_code {
        vk::F13 => KeyRole::Modifier,
        vk::BACKSLASH => KeyRole::LeftClick,
        vk::GRAVE => KeyRole::RightClick,
        vk::SLASH => KeyRole::MiddleClick,
        vk::UP_ARROW => KeyRole::Move(Direction::Up),
        vk::DOWN_ARROW => KeyRole::Move(Direction::Down),
        vk::LEFT_ARROW => KeyRole::Move(Direction::Left),
        vk::RIGHT_ARROW => KeyRole::Move(Direction::Right),
        vk::PAGE_UP => KeyRole::Scroll(Direction::Up),
        vk::PAGE_DOWN => KeyRole::Scroll(Direction::Down),
        vk::HOME => KeyRole::Scroll(Direction::Left),
        vk::END => KeyRole::Scroll(Direction::Right),
        _ => return None,
    };
    Some(role)
}

/// `true` if `key_code` is one of the digit keys above the letters.
pub fn is_number_row(key_code: u16) -> bool {
    macos_vk::NUMBER_ROW.contains(&key_code)
}
