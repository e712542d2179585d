//! # keymouse-core
//!
//! Pure remapping logic for KeyMouse: key classification, the modifier
//! activation state machine, the accelerating motion model, multi-display
//! clamping, and click-run counting.
//!
//! This crate has zero dependencies on OS APIs.  The agent crate feeds it
//! key codes and timestamps and turns its decisions into synthetic events.
//!
//! # Architecture overview (for beginners)
//!
//! KeyMouse turns a keyboard into a pointing device.  Tapping F13 arms the
//! engine; while armed, the arrow keys move the pointer, Page Up/Down and
//! Home/End scroll, and three punctuation keys click.  Other keys can be bound
//! to media controls or application launches.
//!
//! - **`keymap`** – Which role each key code plays, and the symbolic key
//!   names accepted in the configuration file.
//!
//! - **`domain`** – The state machines and maths: activation, velocity,
//!   clamping, and click counting.  Everything takes time as a parameter so it
//!   can be tested deterministically.

pub mod domain;
pub mod keymap;

// Re-export the most-used types at the crate root so callers can write
// `keymouse_core::KeyEvent` instead of `keymouse_core::domain::input::KeyEvent`.
pub use domain::action::{launch_display_name, Action, MediaKey, UnknownMediaKey};
pub use domain::activation::{
    ActivationOutcome, ActivationState, ActivationTiming, ModifierActivation,
};
pub use domain::clicks::{ClickTracker, HeldButtons, MouseButton};
pub use domain::display::{clamp_to_displays, Point, Rect};
pub use domain::input::{KeyEvent, KeyPhase, ModifierFlags, Verdict};
pub use domain::motion::{Direction, DirectionSet, MotionProfile, VelocityIntegrator};
pub use keymap::{is_number_row, KeyClassifier, KeyMap, KeyRole};
