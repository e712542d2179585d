//! PointerEmitter: turns engine decisions into synthetic pointer events.
//!
//! This use case owns the click/drag bookkeeping (which synthetic buttons are
//! down, the current click run) and delegates the actual OS event posting to
//! an [`InputSynthesizer`] trait object.  The platform-specific
//! implementations are in the infrastructure layer.
//!
//! Synthesis failures are transient by nature (an event could not be created
//! or the cursor position could not be read).  They are logged at `debug` and
//! the single affected event is dropped; the engine state moves on regardless.

use std::sync::Arc;
use std::time::{Duration, Instant};

use keymouse_core::{
    clamp_to_displays, ClickTracker, HeldButtons, MediaKey, MouseButton, Point, Rect,
};
use thiserror::Error;
use tracing::{debug, trace};

/// Error type for event synthesis operations.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("platform error: {0}")]
    Platform(String),
    #[error("could not create {0} event")]
    EventCreation(&'static str),
    #[error("cursor position unavailable")]
    CursorUnavailable,
}

/// Platform-agnostic event synthesis trait.
///
/// Each supported OS provides an implementation in the infrastructure layer.
/// All coordinates are global display coordinates (top-left origin, Y down).
pub trait InputSynthesizer: Send + Sync {
    /// Returns the current pointer position.
    fn cursor_location(&self) -> Result<Point, SynthesisError>;

    /// Moves the pointer to `to`.  When `drag` is set, the event is a drag
    /// of that button instead of a plain move.
    fn post_mouse_move(&self, to: Point, drag: Option<MouseButton>) -> Result<(), SynthesisError>;

    /// Presses or releases `button` at `at`, tagged with `click_count`.
    fn post_mouse_button(
        &self,
        button: MouseButton,
        pressed: bool,
        at: Point,
        click_count: u32,
    ) -> Result<(), SynthesisError>;

    /// Scrolls by `(dx, dy)` pixels.  Positive `dy` scrolls the content
    /// view down, positive `dx` to the right.
    fn post_scroll(&self, dx: f64, dy: f64) -> Result<(), SynthesisError>;

    /// Posts a media key press immediately followed by its release.
    fn post_media_key(&self, key: MediaKey) -> Result<(), SynthesisError>;
}

/// The pointer emission use case.
pub struct PointerEmitter {
    synth: Arc<dyn InputSynthesizer>,
    held: HeldButtons,
    clicks: ClickTracker,
}

impl PointerEmitter {
    /// Creates a new emitter with the given synthesizer and multi-click window.
    pub fn new(synth: Arc<dyn InputSynthesizer>, multi_click_window: Duration) -> Self {
        Self {
            synth,
            held: HeldButtons::default(),
            clicks: ClickTracker::new(multi_click_window),
        }
    }

    pub fn is_held(&self, button: MouseButton) -> bool {
        self.held.is_held(button)
    }

    pub fn any_held(&self) -> bool {
        self.held.any()
    }

    /// Presses or releases `button`.
    ///
    /// A press advances the click run when it follows the previous press
    /// within the multi-click window; a release carries the current run.
    pub fn set_button(&mut self, button: MouseButton, down: bool, at: Instant) {
        self.held.set(button, down);
        let click_count = if down {
            self.clicks.register_down(at)
        } else {
            self.clicks.current()
        };
        debug!(?button, down, click_count, "synthetic button");

        let result = self
            .synth
            .cursor_location()
            .and_then(|pos| self.synth.post_mouse_button(button, down, pos, click_count));
        if let Err(e) = result {
            debug!(?button, down, "dropping button event: {e}");
        }
    }

    /// Releases every held button.
    pub fn release_all(&mut self, at: Instant) {
        let held: Vec<MouseButton> = self.held.held().collect();
        for button in held {
            self.set_button(button, false, at);
        }
    }

    /// Moves the pointer by `(dx, dy)`, confined to `displays`.
    ///
    /// Uses drag semantics while a button is held.
    pub fn move_by(&self, dx: f64, dy: f64, displays: &[Rect]) {
        let result = self.synth.cursor_location().and_then(|pos| {
            let target = clamp_to_displays(pos.offset(dx, dy), displays);
            trace!(x = target.x, y = target.y, "pointer move");
            self.synth.post_mouse_move(target, self.held.drag_button())
        });
        if let Err(e) = result {
            debug!("dropping pointer move: {e}");
        }
    }

    /// Scrolls by `(dx, dy)` pixels.
    pub fn scroll_by(&self, dx: f64, dy: f64) {
        trace!(dx, dy, "scroll");
        if let Err(e) = self.synth.post_scroll(dx, dy) {
            debug!("dropping scroll: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
