//! macOS keyboard capture via a Quartz event tap.
//!
//! # What is an event tap? (for beginners)
//!
//! `CGEventTapCreate` registers a callback that sees every event of the
//! requested types *before* the foreground application does.  An active
//! ("default") tap may modify or drop events: returning the event forwards
//! it, turning it into a null event swallows it.
//!
//! The tap is a CFMachPort.  To receive callbacks, its run loop source is
//! added to a CFRunLoop and that run loop is run.  We do this on a dedicated
//! thread so the tokio runtime is never blocked by it.
//!
//! # Tap disabling
//!
//! If a callback takes too long, or the user is typing into a secure input
//! field, the window server disables the tap and delivers a
//! `TapDisabledByTimeout` / `TapDisabledByUserInput` pseudo-event.  The
//! callback re-enables the tap immediately and logs a warning.
//!
//! # Accessibility permission
//!
//! Without the Accessibility permission, `CGEventTapCreate` returns null.
//! That failure is reported synchronously from [`MacosEventTap::start`].

#![cfg(target_os = "macos")]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPortRef;
use core_foundation::runloop::{kCFRunLoopCommonModes, CFRunLoop};
use core_graphics::event::{
    CGEvent, CGEventFlags, CGEventTap, CGEventTapLocation, CGEventTapOptions,
    CGEventTapPlacement, CGEventType, EventField,
};
use keymouse_core::{KeyEvent, KeyPhase, ModifierFlags};
use tracing::{debug, info, warn};

use super::{CaptureError, InputSource, KeyEventHandler};

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// The capture thread's run loop, kept so `stop` can end it.
struct RunLoopHandle(CFRunLoop);

// SAFETY: the only operation performed through this handle from another
// thread is `CFRunLoopStop`, which Apple documents as thread-safe.
unsafe impl Send for RunLoopHandle {}

/// macOS implementation of [`InputSource`] using a session-level event tap.
#[derive(Default)]
pub struct MacosEventTap {
    run_loop: Mutex<Option<RunLoopHandle>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl MacosEventTap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for MacosEventTap {
    fn start(&self, handler: Arc<dyn KeyEventHandler>) -> Result<(), CaptureError> {
        let mut thread_slot = self
            .thread
            .lock()
            .map_err(|e| CaptureError::Thread(e.to_string()))?;
        if thread_slot.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        let (ready_tx, ready_rx) = mpsc::channel::<Result<RunLoopHandle, CaptureError>>();
        let join = thread::Builder::new()
            .name("keymouse-tap".to_string())
            .spawn(move || run_tap(handler, ready_tx))
            .map_err(|e| CaptureError::Thread(e.to_string()))?;

        // Block until the tap thread reports whether the tap was created.
        let run_loop = ready_rx
            .recv()
            .map_err(|_| CaptureError::Thread("capture thread exited early".to_string()))??;

        *self
            .run_loop
            .lock()
            .map_err(|e| CaptureError::Thread(e.to_string()))? = Some(run_loop);
        *thread_slot = Some(join);
        info!("event tap installed");
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut slot) = self.run_loop.lock() {
            if let Some(handle) = slot.take() {
                handle.0.stop();
            }
        }
        if let Ok(mut slot) = self.thread.lock() {
            if let Some(join) = slot.take() {
                if join.join().is_err() {
                    warn!("capture thread panicked");
                }
            }
        }
        info!("event tap removed");
    }
}

/// Body of the capture thread.  Returns when the run loop is stopped.
fn run_tap(
    handler: Arc<dyn KeyEventHandler>,
    ready: mpsc::Sender<Result<RunLoopHandle, CaptureError>>,
) {
    // Filled in once the tap exists; the callback needs it to re-enable the tap.
    let port: Rc<Cell<Option<CFMachPortRef>>> = Rc::new(Cell::new(None));
    let callback_port = Rc::clone(&port);

    let tap = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::Default,
        vec![
            CGEventType::KeyDown,
            CGEventType::KeyUp,
            CGEventType::FlagsChanged,
        ],
        move |_proxy, event_type, event: &CGEvent| -> Option<CGEvent> {
            match event_type {
                CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                    warn!(?event_type, "event tap disabled by the system; re-enabling");
                    if let Some(port) = callback_port.get() {
                        // SAFETY: `port` is the tap's own mach port, which outlives
                        // every callback invocation on this thread.
                        unsafe { CGEventTapEnable(port, true) };
                    }
                }
                CGEventType::KeyDown | CGEventType::KeyUp => {
                    let verdict = handler.on_key_event(to_key_event(event_type, event));
                    if verdict.is_consumed() {
                        event.set_type(CGEventType::Null);
                    }
                }
                CGEventType::FlagsChanged => {
                    handler.on_flags_changed(flags_of(event));
                }
                _ => {}
            }
            None
        },
    );

    let tap = match tap {
        Ok(tap) => tap,
        Err(()) => {
            let _ = ready.send(Err(CaptureError::TapCreationFailed(
                "CGEventTapCreate returned null; grant KeyMouse the Accessibility permission"
                    .to_string(),
            )));
            return;
        }
    };
    port.set(Some(tap.mach_port.as_concrete_TypeRef()));

    let source = match tap.mach_port.create_runloop_source(0) {
        Ok(source) => source,
        Err(()) => {
            let _ = ready.send(Err(CaptureError::TapCreationFailed(
                "could not create a run loop source for the event tap".to_string(),
            )));
            return;
        }
    };

    let run_loop = CFRunLoop::get_current();
    // SAFETY: `kCFRunLoopCommonModes` is an immutable CoreFoundation constant.
    run_loop.add_source(&source, unsafe { kCFRunLoopCommonModes });
    tap.enable();

    if ready.send(Ok(RunLoopHandle(run_loop))).is_err() {
        return;
    }
    debug!("capture run loop started");
    CFRunLoop::run_current();
    debug!("capture run loop exited");
}

fn to_key_event(event_type: CGEventType, event: &CGEvent) -> KeyEvent {
    let key_code = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE) as u16;
    let is_repeat = event.get_integer_value_field(EventField::KEYBOARD_EVENT_AUTOREPEAT) != 0;
    let phase = if matches!(event_type, CGEventType::KeyDown) {
        KeyPhase::Down
    } else {
        KeyPhase::Up
    };
    KeyEvent {
        key_code,
        phase,
        flags: flags_of(event),
        is_repeat: is_repeat && phase == KeyPhase::Down,
        at: Instant::now(),
    }
}

fn flags_of(event: &CGEvent) -> ModifierFlags {
    ModifierFlags {
        shift: event.get_flags().contains(CGEventFlags::CGEventFlagShift),
    }
}

