//! macOS display enumeration via Core Graphics (`CGDisplay`).
//!
//! Uses `CGGetActiveDisplayList` to enumerate all active displays and
//! `CGDisplayBounds` to obtain each display's position and size in the
//! global coordinate space.
//!
//! # Implementation notes
//!
//! `CGDisplayBounds` already reports global display coordinates with the
//! origin at the top-left of the main display and Y increasing downward, which
//! is the space synthetic pointer events are posted in.  The rectangles are
//! used as-is.  Displays left of or above the main display have negative
//! origins.
//!
//! Display reconfiguration (plugging in a monitor, changing the arrangement)
//! is reported by `CGDisplayRegisterReconfigurationCallback`.  The callback
//! runs on whichever run loop is servicing the window server connection, so it
//! only forwards a unit notification; enumeration happens on the receiver's
//! side.

#![cfg(target_os = "macos")]

use std::ffi::c_void;
use std::sync::OnceLock;
use std::thread;

use core_foundation::runloop::CFRunLoop;
use core_graphics::display::CGDisplay;
use keymouse_core::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use super::{DisplayEnumerator, ScreenInfoError};

/// `kCGDisplayBeginConfigurationFlag`: the change has not happened yet.
const BEGIN_CONFIGURATION_FLAG: u32 = 1;

type ReconfigurationCallback = unsafe extern "C" fn(display: u32, flags: u32, user_info: *mut c_void);

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: Option<ReconfigurationCallback>,
        user_info: *mut c_void,
    ) -> i32;
}

static RECONFIGURED: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// macOS implementation of [`DisplayEnumerator`] via Core Graphics.
#[derive(Debug, Default)]
pub struct MacosDisplayEnumerator;

impl MacosDisplayEnumerator {
    /// Creates a new `MacosDisplayEnumerator`.
    pub fn new() -> Self {
        Self
    }
}

impl DisplayEnumerator for MacosDisplayEnumerator {
    fn enumerate_displays(&self) -> Result<Vec<Rect>, ScreenInfoError> {
        enumerate_via_core_graphics()
    }
}

/// Enumerates displays using Core Graphics APIs.
///
/// # Errors
///
/// Returns [`ScreenInfoError::PlatformError`] if the Core Graphics call fails
/// or returns zero active displays.
fn enumerate_via_core_graphics() -> Result<Vec<Rect>, ScreenInfoError> {
    let active_displays =
        CGDisplay::active_displays().map_err(|e| ScreenInfoError::PlatformError(e.to_string()))?;

    if active_displays.is_empty() {
        return Err(ScreenInfoError::PlatformError(
            "CGGetActiveDisplayList returned zero displays".to_string(),
        ));
    }

    let main_id = CGDisplay::main().id;
    let mut ids = active_displays;
    // Main display first.
    ids.sort_by_key(|id| *id != main_id);

    Ok(ids
        .into_iter()
        .map(|id| {
            // Ids that went away since the list was taken report empty bounds.
            let b = CGDisplay::new(id).bounds();
            Rect::new(b.origin.x, b.origin.y, b.size.width, b.size.height)
        })
        .filter(|r| r.width > 0.0 && r.height > 0.0)
        .collect())
}

unsafe extern "C" fn on_reconfiguration(display: u32, flags: u32, _user_info: *mut c_void) {
    if flags & BEGIN_CONFIGURATION_FLAG != 0 {
        return;
    }
    debug!(display, flags, "display reconfigured");
    if let Some(tx) = RECONFIGURED.get() {
        let _ = tx.send(());
    }
}

/// Starts watching for display reconfigurations.
///
/// Registers the callback from a dedicated thread that runs its own CFRunLoop.
/// Each completed reconfiguration produces one `()` on the returned channel;
/// bursts are common, so receivers should re-enumerate rather than count.
///
/// # Errors
///
/// Returns [`ScreenInfoError::PlatformError`] if a watcher is already running
/// or the registration fails.
pub fn watch_display_changes() -> Result<UnboundedReceiver<()>, ScreenInfoError> {
    let (tx, rx) = mpsc::unbounded_channel();
    RECONFIGURED
        .set(tx)
        .map_err(|_| ScreenInfoError::PlatformError("display watcher already running".to_string()))?;

    let (ready_tx, ready_rx) = std::sync::mpsc::channel::<i32>();
    thread::Builder::new()
        .name("keymouse-displays".to_string())
        .spawn(move || {
            // SAFETY: `on_reconfiguration` is a plain function that lives for
            // the whole process and ignores `user_info`.
            let err = unsafe {
                CGDisplayRegisterReconfigurationCallback(Some(on_reconfiguration), std::ptr::null_mut())
            };
            let _ = ready_tx.send(err);
            if err == 0 {
                CFRunLoop::run_current();
            }
        })
        .map_err(|e| ScreenInfoError::PlatformError(e.to_string()))?;

    match ready_rx.recv() {
        Ok(0) => Ok(rx),
        Ok(code) => {
            warn!(code, "CGDisplayRegisterReconfigurationCallback failed");
            Err(ScreenInfoError::PlatformError(format!(
                "CGDisplayRegisterReconfigurationCallback returned {code}"
            )))
        }
        Err(_) => Err(ScreenInfoError::PlatformError(
            "display watcher thread exited early".to_string(),
        )),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Smoke-test: on a macOS machine with at least one display this must succeed.
    #[test]
    fn test_macos_display_enumerator_returns_at_least_one_display() {
        let enumerator = MacosDisplayEnumerator::new();
        let result = enumerator.enumerate_displays();
        assert!(
            result.is_ok(),
            "enumerate_displays must succeed on macOS: {:?}",
            result.err()
        );
        assert!(!result.unwrap().is_empty(), "must return at least one display");
    }

    #[test]
    fn test_main_display_is_first_and_at_origin() {
        let displays = MacosDisplayEnumerator::new()
            .enumerate_displays()
            .expect("enumerate");
        assert_eq!(displays[0].x, 0.0);
        assert_eq!(displays[0].y, 0.0);
    }
}
