//! Input capture infrastructure for the agent.
//!
//! On macOS, this installs a session-level `CGEventTap` on a dedicated thread
//! with its own CFRunLoop.  Unlike a passive listener, the tap is *active*:
//! for every key event the callback asks the [`KeyEventHandler`] for a
//! [`Verdict`] and either forwards the event or swallows it.
//!
//! # Latency
//!
//! The OS disables a tap whose callback is too slow.  The handler therefore
//! runs the whole engine transition inline and must never block on I/O;
//! process launches are handed off to the tokio runtime.
//!
//! # Testability
//!
//! The `InputSource` trait allows unit tests to inject synthetic events without
//! an event tap, via [`mock::MockInputSource`].

use std::sync::{Arc, PoisonError};

use keymouse_core::{KeyEvent, ModifierFlags, Verdict};

use crate::application::remap_engine::SharedEngine;

pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

/// Re-export the macOS tap as `NativeInputSource` on macOS.
#[cfg(target_os = "macos")]
pub use macos::MacosEventTap as NativeInputSource;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The OS refused to create the tap.  On macOS this almost always means
    /// the process has not been granted the Accessibility permission.
    #[error("failed to create event tap: {0}")]
    TapCreationFailed(String),
    #[error("input source has already been started")]
    AlreadyStarted,
    #[error("failed to spawn capture thread: {0}")]
    Thread(String),
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Receives captured events on the capture thread and decides their fate.
pub trait KeyEventHandler: Send + Sync {
    fn on_key_event(&self, event: KeyEvent) -> Verdict;
    fn on_flags_changed(&self, flags: ModifierFlags) -> Verdict;
}

/// Trait abstracting the OS event source.
///
/// The production implementation is the macOS event tap; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send {
    /// Starts delivering events to `handler`.
    ///
    /// Returns only after the OS has accepted the interception, so a missing
    /// permission surfaces here rather than on the capture thread.
    fn start(&self, handler: Arc<dyn KeyEventHandler>) -> Result<(), CaptureError>;

    /// Stops the source and releases all OS resources.
    fn stop(&self);
}

/// Forwards captured events to the shared engine.
pub struct EngineEventHandler {
    engine: SharedEngine,
}

impl EngineEventHandler {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }
}

impl KeyEventHandler for EngineEventHandler {
    fn on_key_event(&self, event: KeyEvent) -> Verdict {
        // A panic inside a previous callback must not leave the keyboard dead.
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.handle_key_event(event)
    }

    fn on_flags_changed(&self, flags: ModifierFlags) -> Verdict {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        engine.handle_flags_changed(flags)
    }
}
