//! Mouse buttons, held-button bookkeeping, and multi-click counting.

use std::time::{Duration, Instant};

/// Default maximum gap between button-downs that still counts as one click run.
pub const DEFAULT_MULTI_CLICK_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    /// Buttons in drag precedence order.
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];
}

/// Which synthetic buttons are currently down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeldButtons {
    left: bool,
    right: bool,
    middle: bool,
}

impl HeldButtons {
    pub fn is_held(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }

    pub fn set(&mut self, button: MouseButton, held: bool) {
        match button {
            MouseButton::Left => self.left = held,
            MouseButton::Right => self.right = held,
            MouseButton::Middle => self.middle = held,
        }
    }

    pub fn any(&self) -> bool {
        self.left || self.right || self.middle
    }

    /// The button whose drag semantics pointer motion should use.
    ///
    /// Left wins over right, right wins over middle.
    pub fn drag_button(&self) -> Option<MouseButton> {
        MouseButton::ALL.into_iter().find(|b| self.is_held(*b))
    }

    /// Buttons currently held, in precedence order.
    pub fn held(&self) -> impl Iterator<Item = MouseButton> + '_ {
        MouseButton::ALL.into_iter().filter(|b| self.is_held(*b))
    }
}

/// Counts consecutive rapid button-downs (single, double, triple click...).
///
/// The run is shared across buttons: any button-down within the window of the
/// previous button-down extends it.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    window: Duration,
    last_down: Option<Instant>,
    run: u32,
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MULTI_CLICK_WINDOW)
    }
}

impl ClickTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_down: None,
            run: 1,
        }
    }

    /// Records a button-down at `at` and returns the click count to tag it with.
    pub fn register_down(&mut self, at: Instant) -> u32 {
        self.run = match self.last_down {
            Some(prev) if at.saturating_duration_since(prev) < self.window => self.run + 1,
            _ => 1,
        };
        self.last_down = Some(at);
        self.run
    }

    /// The count a button-up should carry (the run is not advanced).
    pub fn current(&self) -> u32 {
        self.run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn test_click_run_sequence_resets_after_long_gap() {
        // Arrange
        let t0 = Instant::now();
        let mut tracker = ClickTracker::default();

        // Act / Assert: down@0 (1), up@0.1, down@0.3 (2), up@0.4, down@1.2 (1)
        assert_eq!(tracker.register_down(t0), 1);
        assert_eq!(tracker.current(), 1);
        assert_eq!(tracker.register_down(ms(t0, 300)), 2);
        assert_eq!(tracker.current(), 2);
        assert_eq!(tracker.register_down(ms(t0, 1200)), 1);
    }

    #[test]
    fn test_gap_equal_to_window_starts_new_run() {
        let t0 = Instant::now();
        let mut tracker = ClickTracker::default();
        tracker.register_down(t0);
        assert_eq!(tracker.register_down(ms(t0, 500)), 1);
    }

    #[test]
    fn test_triple_click() {
        let t0 = Instant::now();
        let mut tracker = ClickTracker::default();
        tracker.register_down(t0);
        tracker.register_down(ms(t0, 200));
        assert_eq!(tracker.register_down(ms(t0, 400)), 3);
    }

    #[test]
    fn test_drag_button_prefers_left_then_right_then_middle() {
        let mut held = HeldButtons::default();
        assert_eq!(held.drag_button(), None);

        held.set(MouseButton::Middle, true);
        assert_eq!(held.drag_button(), Some(MouseButton::Middle));

        held.set(MouseButton::Right, true);
        assert_eq!(held.drag_button(), Some(MouseButton::Right));

        held.set(MouseButton::Left, true);
        assert_eq!(held.drag_button(), Some(MouseButton::Left));
        assert_eq!(held.held().count(), 3);
    }
}
