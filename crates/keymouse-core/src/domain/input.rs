//! Raw keyboard events as the engine sees them.
//!
//! The platform event tap converts each OS event into a [`KeyEvent`] before
//! handing it to the engine, and turns the engine's [`Verdict`] back into
//! "swallow" or "forward".

use std::time::Instant;

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Up,
}

/// Snapshot of the modifier keys that were active when an event was produced.
///
/// Only the modifiers the engine actually reads are carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierFlags {
    /// Either Shift key is down.  Selects the boosted motion profile.
    pub shift: bool,
}

impl ModifierFlags {
    /// Flags with no modifiers active.
    pub const NONE: Self = Self { shift: false };

    /// Flags with only Shift active.
    pub const SHIFT: Self = Self { shift: true };
}

/// A single key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Platform virtual key code (macOS `CGKeyCode`).
    pub key_code: u16,
    pub phase: KeyPhase,
    pub flags: ModifierFlags,
    /// `true` when the OS generated this press by key auto-repeat.
    pub is_repeat: bool,
    /// Monotonic time at which the event was observed.
    pub at: Instant,
}

impl KeyEvent {
    /// A fresh (non-repeat) key press with no modifiers.
    pub fn down(key_code: u16, at: Instant) -> Self {
        Self {
            key_code,
            phase: KeyPhase::Down,
            flags: ModifierFlags::NONE,
            is_repeat: false,
            at,
        }
    }

    /// A key release with no modifiers.
    pub fn up(key_code: u16, at: Instant) -> Self {
        Self {
            key_code,
            phase: KeyPhase::Up,
            flags: ModifierFlags::NONE,
            is_repeat: false,
            at,
        }
    }

    /// An auto-repeat press with no modifiers.
    pub fn repeat(key_code: u16, at: Instant) -> Self {
        Self {
            is_repeat: true,
            ..Self::down(key_code, at)
        }
    }

    /// Returns a copy of this event carrying `flags`.
    pub fn with_flags(self, flags: ModifierFlags) -> Self {
        Self { flags, ..self }
    }

    pub fn is_down(&self) -> bool {
        self.phase == KeyPhase::Down
    }
}

/// The engine's decision for a single raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Swallow the event; the foreground application never sees it.
    Consume,
    /// Forward the event unchanged.
    PassThrough,
}

impl Verdict {
    pub fn is_consumed(self) -> bool {
        self == Verdict::Consume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_constructor_marks_press_as_repeat() {
        let at = Instant::now();
        let ev = KeyEvent::repeat(42, at);
        assert!(ev.is_repeat);
        assert!(ev.is_down());
        assert_eq!(ev.key_code, 42);
    }

    #[test]
    fn test_with_flags_keeps_everything_else() {
        let at = Instant::now();
        let ev = KeyEvent::up(126, at).with_flags(ModifierFlags::SHIFT);
        assert_eq!(ev.phase, KeyPhase::Up);
        assert!(ev.flags.shift);
        assert_eq!(ev.at, at);
    }
}
