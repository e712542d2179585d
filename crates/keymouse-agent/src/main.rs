//! KeyMouse agent entry point.
//!
//! Loads the configuration, builds the remap engine with its native
//! collaborators, installs the event tap, and runs until Ctrl-C.
//!
//! # Usage
//!
//! ```text
//! keymouse [OPTIONS]
//!
//! Options:
//!   --config <PATH>           Configuration file [env: KEYMOUSE_CONFIG]
//!   --print-default-config    Print the default configuration and exit
//!   --check-config            Load the configuration, report problems, and exit
//! ```
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_or_create_config()   -- TOML → AppConfig → KeyMap
//!  └─ RemapEngine::new()        -- shared behind Arc<Mutex<_>>
//!  └─ TokioTickScheduler::bind  -- tick and deactivation tasks
//!  └─ display task              -- refresh on reconfiguration callbacks
//!  └─ status task               -- StatusEvent → log
//!  └─ NativeInputSource::start  -- event tap thread (CFRunLoop)
//!  └─ ctrl_c()                  -- remove the tap and exit
//! ```
//!
//! # Accessibility permission (for beginners)
//!
//! macOS only lets processes that the user has approved under
//! *System Settings → Privacy & Security → Accessibility* install an active
//! event tap.  Without that approval tap creation fails; the agent logs how to
//! grant it and exits with a non-zero status rather than running uselessly.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::runtime::Handle;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use keymouse_agent::application::remap_engine::{EngineDeps, RemapEngine, SharedEngine};
use keymouse_agent::infrastructure::input_capture::{
    CaptureError, EngineEventHandler, InputSource,
};
use keymouse_agent::infrastructure::launcher::OpenLauncher;
use keymouse_agent::infrastructure::scheduler::TokioTickScheduler;
use keymouse_agent::infrastructure::screen_info::{
    refresh_displays, watch_displays, DISPLAY_POLL_INTERVAL,
};
use keymouse_agent::infrastructure::status::{log_status_events, status_channel};
use keymouse_agent::infrastructure::storage::config;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard-driven pointer, scroll, media, and launcher control for macOS.
#[derive(Debug, Parser)]
#[command(
    name = "keymouse",
    about = "Turns a modifier key into keyboard-driven pointer, scroll, media, and launcher control",
    version
)]
struct Cli {
    /// Path to the configuration file.
    ///
    /// Defaults to `~/Library/Application Support/KeyMouse/config.toml`.  The
    /// file is created with default contents if it does not exist.
    #[arg(long, env = "KEYMOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    print_default_config: bool,

    /// Load the configuration, report dropped entries, and exit.
    #[arg(long)]
    check_config: bool,
}

impl Cli {
    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::config_file_path().context("locating the configuration file"),
        }
    }
}

// ── Platform backends ─────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
mod platform {
    use std::sync::Arc;

    use tokio::sync::mpsc::UnboundedReceiver;
    use tracing::warn;

    use keymouse_agent::application::emulate_input::InputSynthesizer;
    use keymouse_agent::infrastructure::input_capture::{
        CaptureError, InputSource, NativeInputSource,
    };
    use keymouse_agent::infrastructure::input_emulation::NativeInputSynthesizer;
    use keymouse_agent::infrastructure::screen_info::{
        macos::watch_display_changes, DisplayEnumerator, NativeDisplayEnumerator,
    };

    pub fn synthesizer() -> Result<Arc<dyn InputSynthesizer>, CaptureError> {
        Ok(Arc::new(NativeInputSynthesizer::new()))
    }

    pub fn display_enumerator() -> Arc<dyn DisplayEnumerator> {
        Arc::new(NativeDisplayEnumerator::new())
    }

    pub fn input_source() -> Box<dyn InputSource> {
        Box::new(NativeInputSource::new())
    }

    pub fn display_changes() -> Option<UnboundedReceiver<()>> {
        match watch_display_changes() {
            Ok(rx) => Some(rx),
            Err(e) => {
                warn!("display reconfiguration watcher unavailable, polling only: {e}");
                None
            }
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use std::sync::Arc;

    use tokio::sync::mpsc::UnboundedReceiver;

    use keymouse_agent::application::emulate_input::InputSynthesizer;
    use keymouse_agent::infrastructure::input_capture::{
        mock::MockInputSource, CaptureError, InputSource,
    };
    use keymouse_agent::infrastructure::screen_info::{DisplayEnumerator, MockDisplayEnumerator};

    pub fn synthesizer() -> Result<Arc<dyn InputSynthesizer>, CaptureError> {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }

    pub fn display_enumerator() -> Arc<dyn DisplayEnumerator> {
        Arc::new(MockDisplayEnumerator::single_1080p())
    }

    pub fn input_source() -> Box<dyn InputSource> {
        Box::new(MockInputSource::failing())
    }

    pub fn display_changes() -> Option<UnboundedReceiver<()>> {
        None
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", config::default_config_toml()?);
        return Ok(());
    }

    let path = cli.config_path()?;

    if cli.check_config {
        return check_config(&path);
    }

    let loaded = config::load_or_create_config(&path);
    let app_config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(&app_config.agent.log_level);
    info!(config = %path.display(), "KeyMouse starting");
    if let Err(e) = loaded {
        warn!("using default configuration: {e}");
    }

    let (key_map, problems) = app_config.build_key_map();
    for problem in &problems {
        warn!("dropping configuration entry: {problem}");
    }
    info!(bindings = key_map.len(), "key map loaded");

    // ── Engine and collaborators ──────────────────────────────────────────────
    let synth = platform::synthesizer().map_err(report_capture_error)?;
    let scheduler = Arc::new(TokioTickScheduler::new(
        Handle::current(),
        app_config.tick_rates(),
    ));
    let (status_sink, status_rx) = status_channel();
    let engine = RemapEngine::new(
        key_map,
        &app_config.engine_settings(),
        EngineDeps {
            synth,
            scheduler: scheduler.clone(),
            status: Arc::new(status_sink),
            launcher: Arc::new(OpenLauncher::new(Handle::current())),
        },
    )
    .into_shared();
    scheduler.bind(&engine);

    let status_task = tokio::spawn(log_status_events(status_rx));

    // ── Displays ──────────────────────────────────────────────────────────────
    let displays = platform::display_enumerator();
    refresh_displays(displays.as_ref(), &engine);
    let display_task = tokio::spawn(watch_displays(
        displays,
        engine.clone(),
        platform::display_changes(),
        DISPLAY_POLL_INTERVAL,
    ));

    // ── Event tap ─────────────────────────────────────────────────────────────
    let source = platform::input_source();
    source
        .start(Arc::new(EngineEventHandler::new(engine.clone())))
        .map_err(report_capture_error)?;
    info!("KeyMouse running; tap F13 to arm");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;

    info!("shutting down");
    source.stop();
    display_task.abort();
    drop(engine);
    status_task.abort();
    Ok(())
}

/// Initialises `tracing`.  `RUST_LOG` takes precedence over the configured
/// level.
fn init_logging(configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// `--check-config`: reports every problem and exits non-zero if any.
fn check_config(path: &std::path::Path) -> anyhow::Result<()> {
    let cfg = config::load_config(path)
        .with_context(|| format!("loading {}", path.display()))?;
    let (key_map, problems) = cfg.build_key_map();
    println!("{}: {} binding(s)", path.display(), key_map.len());
    for problem in &problems {
        println!("  dropped: {problem}");
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} configuration entries dropped", problems.len()))
    }
}

fn report_capture_error(e: CaptureError) -> anyhow::Error {
    match &e {
        CaptureError::TapCreationFailed(_) => error!(
            "{e}. Grant KeyMouse access under System Settings → Privacy & Security → \
             Accessibility, then start it again."
        ),
        CaptureError::UnsupportedPlatform(os) => {
            error!("KeyMouse only runs on macOS (this is {os})")
        }
        _ => error!("{e}"),
    }
    anyhow::Error::new(e)
}
