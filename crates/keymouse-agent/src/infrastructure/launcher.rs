//! Process launcher for `Launch` actions.
//!
//! Runs `/usr/bin/open <args>` on a tokio task so the event tap callback
//! returns immediately.  The outcome is only logged; a failed launch is not
//! retried.

use std::process::ExitStatus;
use std::sync::Mutex;

use thiserror::Error;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::application::dispatch_action::ProcessLauncher;

/// Program used to open applications, documents, and URLs.
pub const OPEN_PROGRAM: &str = "/usr/bin/open";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: ExitStatus },
}

/// Runs `program` with `args` to completion.
///
/// # Errors
///
/// [`LaunchError::Spawn`] if the process could not be started,
/// [`LaunchError::Exit`] if it exited unsuccessfully.
pub async fn run_launch(program: &str, args: &[String]) -> Result<ExitStatus, LaunchError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .await
        .map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if status.success() {
        Ok(status)
    } else {
        Err(LaunchError::Exit {
            program: program.to_string(),
            status,
        })
    }
}

/// [`ProcessLauncher`] that spawns onto a tokio runtime.
pub struct OpenLauncher {
    handle: Handle,
    program: String,
}

impl OpenLauncher {
    /// Creates a launcher that runs [`OPEN_PROGRAM`].
    pub fn new(handle: Handle) -> Self {
        Self::with_program(handle, OPEN_PROGRAM)
    }

    /// Creates a launcher that runs `program` instead of `open`.
    pub fn with_program(handle: Handle, program: impl Into<String>) -> Self {
        Self {
            handle,
            program: program.into(),
        }
    }
}

impl ProcessLauncher for OpenLauncher {
    fn launch(&self, args: Vec<String>) {
        let program = self.program.clone();
        self.handle.spawn(async move {
            match run_launch(&program, &args).await {
                Ok(_) => debug!(?args, "launch finished"),
                Err(e) => warn!(?args, "launch failed: {e}"),
            }
        });
    }
}

/// A [`ProcessLauncher`] that records argument lists without spawning.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: Mutex<Vec<Vec<String>>>,
}

impl RecordingLauncher {
    /// Snapshot of all launch requests, oldest first.
    pub fn launches(&self) -> Vec<Vec<String>> {
        self.launches.lock().expect("lock poisoned").clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, args: Vec<String>) {
        self.launches.lock().expect("lock poisoned").push(args);
    }
}
