//! Tick sources and the deferred-deactivation timer, as tokio tasks.
//!
//! # How ticks stay in order with key events
//!
//! The engine calls `start_ticks` / `stop_ticks` while holding its own lock.
//! Every tick task also takes that lock before touching the engine and, under
//! it, compares its generation with the slot's current generation.  A stop
//! bumps the generation, so a tick that was already in flight when the stop
//! happened sees a newer generation and exits without calling the engine.
//!
//! The deactivation timer needs no generation of its own: the engine's
//! activation state machine already ignores a timer whose generation is no
//! longer pending.
//!
//! # Binding
//!
//! The scheduler is constructed before the engine (the engine owns an
//! `Arc<dyn TickScheduler>`), so it is connected to the engine afterwards with
//! [`TokioTickScheduler::bind`].  It only keeps a weak reference, so the pair
//! does not form a reference cycle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, trace};

use crate::application::remap_engine::{RemapEngine, SharedEngine, TickKind, TickScheduler};

pub mod mock;

/// Periods of the two tick sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRates {
    pub movement: Duration,
    pub scroll: Duration,
}

impl TickRates {
    /// Builds rates from frequencies in hertz.  Zero is treated as 1 Hz.
    pub fn from_hz(movement_hz: u32, scroll_hz: u32) -> Self {
        Self {
            movement: period(movement_hz),
            scroll: period(scroll_hz),
        }
    }

    fn for_kind(&self, kind: TickKind) -> Duration {
        match kind {
            TickKind::Movement => self.movement,
            TickKind::Scroll => self.scroll,
        }
    }
}

impl Default for TickRates {
    fn default() -> Self {
        Self::from_hz(120, 60)
    }
}

fn period(hz: u32) -> Duration {
    Duration::from_secs(1) / hz.max(1)
}

#[derive(Default)]
struct TickSlot {
    generation: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TickSlot {
    /// Invalidates any running task and returns the new generation.
    fn invalidate(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
        generation
    }
}

/// [`TickScheduler`] backed by tokio timers.
pub struct TokioTickScheduler {
    handle: Handle,
    rates: TickRates,
    engine: OnceLock<Weak<Mutex<RemapEngine>>>,
    movement: TickSlot,
    scroll: TickSlot,
    deactivation: Mutex<Option<JoinHandle<()>>>,
}

impl TokioTickScheduler {
    /// Creates a scheduler that spawns onto `handle`.
    ///
    /// The handle is captured so the engine can call in from the event tap
    /// thread, which is not a runtime thread.
    pub fn new(handle: Handle, rates: TickRates) -> Self {
        Self {
            handle,
            rates,
            engine: OnceLock::new(),
            movement: TickSlot::default(),
            scroll: TickSlot::default(),
            deactivation: Mutex::new(None),
        }
    }

    /// Connects the scheduler to the engine it drives.  Later calls are ignored.
    pub fn bind(&self, engine: &SharedEngine) {
        if self.engine.set(Arc::downgrade(engine)).is_err() {
            debug!("tick scheduler already bound");
        }
    }

    fn slot(&self, kind: TickKind) -> &TickSlot {
        match kind {
            TickKind::Movement => &self.movement,
            TickKind::Scroll => &self.scroll,
        }
    }

    fn engine(&self) -> Option<Weak<Mutex<RemapEngine>>> {
        self.engine.get().cloned()
    }
}

impl TickScheduler for TokioTickScheduler {
    fn start_ticks(&self, kind: TickKind) {
        let Some(engine) = self.engine() else {
            debug!(?kind, "tick scheduler not bound; ignoring start");
            return;
        };
        let slot = self.slot(kind);
        let generation = slot.invalidate();
        let current = Arc::clone(&slot.generation);
        let every = self.rates.for_kind(kind);

        let task = self.handle.spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; motion starts one period
            // after the key press.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(engine) = engine.upgrade() else {
                    break;
                };
                let mut engine = engine.lock().unwrap_or_else(PoisonError::into_inner);
                if current.load(Ordering::SeqCst) != generation {
                    trace!(?kind, generation, "stale tick task exiting");
                    break;
                }
                engine.on_tick(kind);
            }
        });
        *slot.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
    }

    fn stop_ticks(&self, kind: TickKind) {
        self.slot(kind).invalidate();
    }

    fn schedule_deactivation(&self, delay: Duration, generation: u64) {
        let Some(engine) = self.engine() else {
            debug!("tick scheduler not bound; ignoring deactivation");
            return;
        };
        let task = self.handle.spawn(async move {
            sleep(delay).await;
            if let Some(engine) = engine.upgrade() {
                engine
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .on_deactivation_timer(generation);
            }
        });
        let previous = self
            .deactivation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn cancel_deactivation(&self) {
        if let Some(task) = self
            .deactivation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
