//! Platform-specific display enumeration.
//!
//! Detects the connected displays and their positions so the engine can keep
//! the synthetic pointer on visible screen area.
//!
//! # Why does the engine need display geometry?
//!
//! Displays in a multi-monitor arrangement rarely form a perfect rectangle.
//! When two displays of different heights sit side by side, a pointer moving
//! straight along the taller one's edge would leave every display.  The engine
//! clamps each new position to the nearest point of the nearest display, which
//! needs the full list of display rectangles.
//!
//! # Platform implementations
//!
//! Each platform implements [`DisplayEnumerator`]; the correct one is
//! selected at compile time via `#[cfg(target_os = ...)]` and re-exported as
//! `NativeDisplayEnumerator`:
//!
//! | Module  | OS    | API used                                     |
//! |---------|-------|----------------------------------------------|
//! | `macos` | macOS | `CGGetActiveDisplayList` + `CGDisplayBounds` |
//!
//! A [`MockDisplayEnumerator`] is always compiled (not guarded by `#[cfg]`) so
//! tests on any platform can use it without a physical display.
//!
//! # Refreshing
//!
//! On macOS, `macos::watch_display_changes` reports display
//! reconfigurations and [`watch_displays`] turns each one into a
//! [`refresh_displays`] call.  The layout is only polled when no notification
//! channel is available, or after it has closed.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use keymouse_core::Rect;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::application::remap_engine::SharedEngine;

/// Error type for display enumeration operations.
#[derive(Debug, Error)]
pub enum ScreenInfoError {
    /// The platform API call to enumerate displays failed.
    #[error("platform API error while enumerating displays: {0}")]
    PlatformError(String),
}

/// Trait for enumerating displays on the current platform.
pub trait DisplayEnumerator: Send + Sync {
    /// Returns the active display rectangles in global coordinates
    /// (top-left origin, Y down).  The main display comes first.
    ///
    /// # Errors
    ///
    /// Returns [`ScreenInfoError::PlatformError`] if the OS API call fails.
    fn enumerate_displays(&self) -> Result<Vec<Rect>, ScreenInfoError>;
}

/// Re-reads the display layout and hands it to the engine if it changed.
///
/// Returns `true` when the engine's layout was replaced.  On failure the
/// engine keeps its previous layout.
pub fn refresh_displays(enumerator: &dyn DisplayEnumerator, engine: &SharedEngine) -> bool {
    let displays = match enumerator.enumerate_displays() {
        Ok(displays) => displays,
        Err(e) => {
            warn!("keeping previous display layout: {e}");
            return false;
        }
    };

    let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
    if engine.display_regions() == displays.as_slice() {
        return false;
    }
    for (i, d) in displays.iter().enumerate() {
        info!(
            display = i,
            x = d.x,
            y = d.y,
            width = d.width,
            height = d.height,
            "display"
        );
    }
    engine.set_display_regions(displays);
    true
}

/// How often the layout is re-read when there are no reconfiguration
/// notifications to wait for.
pub const DISPLAY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Keeps the engine's display layout current.  Runs until the task is
/// aborted.
///
/// With a notification channel, the layout is re-read once per notification
/// and never otherwise.  Without one (or once it closes), the layout is polled
/// every `poll_every`.
pub async fn watch_displays(
    enumerator: Arc<dyn DisplayEnumerator>,
    engine: SharedEngine,
    changes: Option<UnboundedReceiver<()>>,
    poll_every: Duration,
) {
    if let Some(mut rx) = changes {
        while rx.recv().await.is_some() {
            refresh_displays(enumerator.as_ref(), &engine);
        }
        warn!("display reconfiguration notifications stopped; polling instead");
    }

    let mut poll = interval(poll_every);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        poll.tick().await;
        if refresh_displays(enumerator.as_ref(), &engine) {
            info!("display layout changed (detected by polling)");
        }
    }
}

// ── macOS implementation ──────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
pub mod macos;

/// Re-export the macOS enumerator as `NativeDisplayEnumerator` on macOS.
#[cfg(target_os = "macos")]
pub use macos::MacosDisplayEnumerator as NativeDisplayEnumerator;

// ── Mock implementation (always compiled for tests) ───────────────────────────

/// A mock display enumerator that returns a configurable list of displays.
///
/// Does not make any OS calls; the display list is provided at construction
/// time.
///
/// # Example
///
/// ```ignore
/// let enumerator = MockDisplayEnumerator::single_1080p();
/// refresh_displays(&enumerator, &engine);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockDisplayEnumerator {
    /// The fixed list of displays this enumerator will always return.
    pub displays: Vec<Rect>,
    /// When `true`, enumeration fails.
    pub should_fail: bool,
}

impl MockDisplayEnumerator {
    /// A single 1920×1080 display at the origin.
    pub fn single_1080p() -> Self {
        Self {
            displays: vec![Rect::new(0.0, 0.0, 1920.0, 1080.0)],
            should_fail: false,
        }
    }

    /// A 2560×1440 main display with a shorter 1920×1080 display to its
    /// right, top edges aligned.  The area below the second display is a gap.
    pub fn uneven_pair() -> Self {
        Self {
            displays: vec![
                Rect::new(0.0, 0.0, 2560.0, 1440.0),
                Rect::new(2560.0, 0.0, 1920.0, 1080.0),
            ],
            should_fail: false,
        }
    }

    /// An enumerator whose every call fails.
    pub fn failing() -> Self {
        Self {
            displays: Vec::new(),
            should_fail: true,
        }
    }
}

impl DisplayEnumerator for MockDisplayEnumerator {
    fn enumerate_displays(&self) -> Result<Vec<Rect>, ScreenInfoError> {
        if self.should_fail {
            return Err(ScreenInfoError::PlatformError(
                "injected failure".to_string(),
            ));
        }
        Ok(self.displays.clone())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::remap_engine::{EngineDeps, EngineSettings, RemapEngine};
    use crate::infrastructure::input_emulation::mock::MockInputSynthesizer;
    use crate::infrastructure::launcher::RecordingLauncher;
    use crate::infrastructure::scheduler::mock::RecordingTickScheduler;
    use crate::infrastructure::status::RecordingStatusSink;
    use keymouse_core::KeyMap;
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    const POLL: Duration = Duration::from_millis(10);

    /// Enumerator whose layout the test can change while a watcher runs.
    #[derive(Default)]
    struct SwappableEnumerator {
        displays: Mutex<Vec<Rect>>,
    }

    impl SwappableEnumerator {
        fn showing(displays: Vec<Rect>) -> Arc<Self> {
            Arc::new(Self {
                displays: Mutex::new(displays),
            })
        }

        fn swap(&self, displays: Vec<Rect>) {
            *self.displays.lock().expect("lock poisoned") = displays;
        }
    }

    impl DisplayEnumerator for SwappableEnumerator {
        fn enumerate_displays(&self) -> Result<Vec<Rect>, ScreenInfoError> {
            Ok(self.displays.lock().expect("lock poisoned").clone())
        }
    }

    fn single() -> Vec<Rect> {
        MockDisplayEnumerator::single_1080p().displays
    }

    fn pair() -> Vec<Rect> {
        MockDisplayEnumerator::uneven_pair().displays
    }

    fn regions(engine: &SharedEngine) -> Vec<Rect> {
        engine.lock().unwrap().display_regions().to_vec()
    }

    fn engine() -> SharedEngine {
        RemapEngine::new(
            KeyMap::new(),
            &EngineSettings::default(),
            EngineDeps {
                synth: Arc::new(MockInputSynthesizer::new()),
                scheduler: Arc::new(RecordingTickScheduler::default()),
                status: Arc::new(RecordingStatusSink::default()),
                launcher: Arc::new(RecordingLauncher::default()),
            },
        )
        .into_shared()
    }

    #[test]
    fn test_refresh_displays_pushes_layout_into_engine() {
        // Arrange
        let engine = engine();
        let enumerator = MockDisplayEnumerator::uneven_pair();

        // Act
        let changed = refresh_displays(&enumerator, &engine);

        // Assert
        assert!(changed);
        let guard = engine.lock().unwrap();
        assert_eq!(guard.display_regions(), enumerator.displays.as_slice());
    }

    #[test]
    fn test_refresh_with_identical_layout_reports_no_change() {
        let engine = engine();
        let enumerator = MockDisplayEnumerator::single_1080p();
        assert!(refresh_displays(&enumerator, &engine));

        assert!(!refresh_displays(&enumerator, &engine));
    }

    #[test]
    fn test_refresh_failure_keeps_previous_layout() {
        // Arrange
        let engine = engine();
        refresh_displays(&MockDisplayEnumerator::single_1080p(), &engine);

        // Act
        let changed = refresh_displays(&MockDisplayEnumerator::failing(), &engine);

        // Assert
        assert!(!changed);
        let guard = engine.lock().unwrap();
        assert_eq!(
            guard.display_regions(),
            &[Rect::new(0.0, 0.0, 1920.0, 1080.0)]
        );
    }

    #[test]
    fn test_mock_enumerator_returns_configured_displays() {
        let displays = MockDisplayEnumerator::uneven_pair()
            .enumerate_displays()
            .expect("enumerate");
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[1].x, 2560.0);
    }

    // ── Watching ──────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_notifications_drive_refresh_without_polling() {
        // Arrange
        let engine = engine();
        let displays = SwappableEnumerator::showing(single());
        refresh_displays(displays.as_ref(), &engine);
        let (tx, rx) = mpsc::unbounded_channel();
        let enumerator: Arc<dyn DisplayEnumerator> = displays.clone();
        let task = tokio::spawn(watch_displays(enumerator, engine.clone(), Some(rx), POLL));

        // Act: the layout changes but nothing reports it
        displays.swap(pair());
        sleep(POLL * 10).await;

        // Assert: no polling while notifications are available
        assert_eq!(regions(&engine), single());

        // Act: the reconfiguration is reported
        tx.send(()).unwrap();
        sleep(Duration::from_millis(1)).await;

        // Assert
        assert_eq!(regions(&engine), pair());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_when_no_notifications_available() {
        let engine = engine();
        let displays = SwappableEnumerator::showing(single());
        let enumerator: Arc<dyn DisplayEnumerator> = displays.clone();
        let task = tokio::spawn(watch_displays(enumerator, engine.clone(), None, POLL));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(regions(&engine), single());

        displays.swap(pair());
        sleep(POLL * 2).await;

        assert_eq!(regions(&engine), pair());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_back_to_polling_when_notifications_close() {
        // Arrange
        let engine = engine();
        let displays = SwappableEnumerator::showing(single());
        let (tx, rx) = mpsc::unbounded_channel();
        let enumerator: Arc<dyn DisplayEnumerator> = displays.clone();
        let task = tokio::spawn(watch_displays(enumerator, engine.clone(), Some(rx), POLL));

        // Act
        drop(tx);
        displays.swap(pair());
        sleep(POLL * 2).await;

        // Assert
        assert_eq!(regions(&engine), pair());
        task.abort();
    }
}
