//! Mock input synthesizer for unit testing.
//!
//! # Why a mock synthesizer?
//!
//! The real synthesizer (`MacosInputSynthesizer`) makes CoreGraphics calls that:
//!
//! - Require a logged-in macOS session and the Accessibility permission.
//! - Actually move the cursor, click, and change the volume on the test machine.
//! - Cannot be observed directly from Rust test code.
//!
//! The `MockInputSynthesizer` replaces all OS calls with in-memory recording.
//! Each emitted event is pushed into a `Mutex<Vec<...>>` so that test
//! assertions can inspect exactly what was emitted and in what order.  The
//! simulated cursor follows posted moves, so consecutive ticks accumulate the
//! way they would on a real desktop.
//!
//! # Usage in tests
//!
//! ```ignore
//! let synth = Arc::new(MockInputSynthesizer::at(Point::new(100.0, 100.0)));
//! let emitter = PointerEmitter::new(synth.clone(), Duration::from_millis(500));
//!
//! emitter.move_by(3.3, 0.0, &[]);
//!
//! assert_eq!(synth.cursor(), Point::new(103.3, 100.0));
//! ```
//!
//! # Failing mode
//!
//! [`MockInputSynthesizer::failing`] builds a synthesizer whose every method
//! returns a [`SynthesisError`].  Use it to test the "log and drop" paths.

use std::sync::Mutex;

use keymouse_core::{MediaKey, MouseButton, Point};

use crate::application::emulate_input::{InputSynthesizer, SynthesisError};

/// One synthetic event recorded by [`MockInputSynthesizer`].
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesizedEvent {
    Move {
        to: Point,
        drag: Option<MouseButton>,
    },
    Button {
        button: MouseButton,
        pressed: bool,
        at: Point,
        click_count: u32,
    },
    Scroll {
        dx: f64,
        dy: f64,
    },
    Media(MediaKey),
}

/// A mock synthesizer that records all calls without performing OS API calls.
#[derive(Default)]
pub struct MockInputSynthesizer {
    cursor: Mutex<Point>,
    events: Mutex<Vec<SynthesizedEvent>>,
    /// When `true`, every method immediately returns a `SynthesisError`.
    pub should_fail: bool,
}

impl MockInputSynthesizer {
    /// Creates a synthesizer with the cursor at the origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a synthesizer with the cursor at `cursor`.
    pub fn at(cursor: Point) -> Self {
        Self {
            cursor: Mutex::new(cursor),
            ..Self::default()
        }
    }

    /// Creates a synthesizer whose every call fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<SynthesizedEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Forgets all recorded events.
    pub fn clear(&self) {
        self.events.lock().expect("lock poisoned").clear();
    }

    /// Current simulated cursor position.
    pub fn cursor(&self) -> Point {
        *self.cursor.lock().expect("lock poisoned")
    }

    fn record(&self, event: SynthesizedEvent) -> Result<(), SynthesisError> {
        if self.should_fail {
            return Err(SynthesisError::Platform("injected failure".to_string()));
        }
        self.events.lock().expect("lock poisoned").push(event);
        Ok(())
    }
}

impl InputSynthesizer for MockInputSynthesizer {
    fn cursor_location(&self) -> Result<Point, SynthesisError> {
        if self.should_fail {
            return Err(SynthesisError::CursorUnavailable);
        }
        Ok(self.cursor())
    }

    fn post_mouse_move(&self, to: Point, drag: Option<MouseButton>) -> Result<(), SynthesisError> {
        self.record(SynthesizedEvent::Move { to, drag })?;
        *self.cursor.lock().expect("lock poisoned") = to;
        Ok(())
    }

    fn post_mouse_button(
        &self,
        button: MouseButton,
        pressed: bool,
        at: Point,
        click_count: u32,
    ) -> Result<(), SynthesisError> {
        self.record(SynthesizedEvent::Button {
            button,
            pressed,
            at,
            click_count,
        })
    }

    fn post_scroll(&self, dx: f64, dy: f64) -> Result<(), SynthesisError> {
        self.record(SynthesizedEvent::Scroll { dx, dy })
    }

    fn post_media_key(&self, key: MediaKey) -> Result<(), SynthesisError> {
        self.record(SynthesizedEvent::Media(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_update_simulated_cursor() {
        // Arrange
        let synth = MockInputSynthesizer::at(Point::new(5.0, 5.0));

        // Act
        synth
            .post_mouse_move(Point::new(50.0, 60.0), None)
            .expect("mock move must succeed");

        // Assert
        assert_eq!(synth.cursor(), Point::new(50.0, 60.0));
        assert_eq!(synth.events().len(), 1);
    }

    #[test]
    fn test_failing_synthesizer_records_nothing() {
        let synth = MockInputSynthesizer::failing();
        assert!(synth.cursor_location().is_err());
        assert!(synth.post_media_key(MediaKey::Mute).is_err());
        assert!(synth.events().is_empty());
    }
}
