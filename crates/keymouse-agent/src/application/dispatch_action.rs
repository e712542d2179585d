//! ActionDispatcher: runs the action bound to a mapped key.
//!
//! Media keys are posted synchronously through the [`InputSynthesizer`].
//! Launch actions are handed to a [`ProcessLauncher`], which must return
//! immediately (the process is spawned off the event tap thread).
//!
//! The status collaborator is told about every launch so the user gets a
//! short "opened Safari" style notification.

use std::sync::Arc;

use keymouse_core::Action;
use tracing::{debug, info};

use super::emulate_input::InputSynthesizer;

/// User-visible status changes emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Armed,
    Disarmed,
    /// A launch action fired; `name` is the short application name.
    ActionTaken { name: String },
}

/// Receives status events.  Must not block.
#[cfg_attr(test, mockall::automock)]
pub trait StatusSink: Send + Sync {
    fn publish(&self, event: StatusEvent);
}

/// Spawns external processes for launch actions.
///
/// Implementations must not block the caller; spawn failures are the
/// implementation's to log.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, args: Vec<String>);
}

/// The action dispatch use case.
pub struct ActionDispatcher {
    synth: Arc<dyn InputSynthesizer>,
    launcher: Arc<dyn ProcessLauncher>,
    status: Arc<dyn StatusSink>,
    notify_on_launch: bool,
}

impl ActionDispatcher {
    pub fn new(
        synth: Arc<dyn InputSynthesizer>,
        launcher: Arc<dyn ProcessLauncher>,
        status: Arc<dyn StatusSink>,
        notify_on_launch: bool,
    ) -> Self {
        Self {
            synth,
            launcher,
            status,
            notify_on_launch,
        }
    }

    /// Runs `action`.  Call once per fresh key press.
    pub fn dispatch(&self, action: &Action) {
        match action {
            Action::MediaSignal(key) => {
                debug!(%key, "media key");
                if let Err(e) = self.synth.post_media_key(*key) {
                    debug!(%key, "dropping media key: {e}");
                }
            }
            Action::Launch(args) => {
                let name = action.display_name();
                info!(app = %name, ?args, "launching");
                if self.notify_on_launch {
                    self.status.publish(StatusEvent::ActionTaken { name });
                }
                self.launcher.launch(args.clone());
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
