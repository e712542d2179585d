//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`KeyEvent`]s without an event tap or
//! the Accessibility permission.  Injection runs the handler synchronously
//! and returns its verdict, exactly as the tap callback would.

use std::sync::{Arc, Mutex};

use keymouse_core::{KeyEvent, ModifierFlags, Verdict};

use super::{CaptureError, InputSource, KeyEventHandler};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
#[derive(Default)]
pub struct MockInputSource {
    handler: Mutex<Option<Arc<dyn KeyEventHandler>>>,
    /// When `true`, `start` fails as if the permission were missing.
    pub should_fail: bool,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source whose `start` always fails.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Injects a synthetic key event, as if captured from hardware.
    ///
    /// Panics if `start()` has not been called or if `stop()` has been called.
    pub fn inject(&self, event: KeyEvent) -> Verdict {
        self.current_handler().on_key_event(event)
    }

    /// Injects a flags-changed event.
    pub fn inject_flags(&self, flags: ModifierFlags) -> Verdict {
        self.current_handler().on_flags_changed(flags)
    }

    /// `true` between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.handler.lock().expect("lock poisoned").is_some()
    }

    fn current_handler(&self) -> Arc<dyn KeyEventHandler> {
        let guard = self.handler.lock().expect("lock poisoned");
        match guard.as_ref() {
            Some(handler) => Arc::clone(handler),
            None => panic!("MockInputSource::inject called before start()"),
        }
    }
}

impl InputSource for MockInputSource {
    fn start(&self, handler: Arc<dyn KeyEventHandler>) -> Result<(), CaptureError> {
        if self.should_fail {
            return Err(CaptureError::TapCreationFailed(
                "injected failure".to_string(),
            ));
        }
        let mut guard = self.handler.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        *guard = Some(handler);
        Ok(())
    }

    fn stop(&self) {
        *self.handler.lock().expect("lock poisoned") = None;
    }
}
