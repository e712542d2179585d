//! Recording tick scheduler for unit testing.
//!
//! Records every request the engine makes so tests can assert on the exact
//! sequence, and lets the test fire ticks and timers by hand.

use std::sync::Mutex;
use std::time::Duration;

use crate::application::remap_engine::{TickKind, TickScheduler};

/// One call recorded by [`RecordingTickScheduler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCall {
    Start(TickKind),
    Stop(TickKind),
    ScheduleDeactivation { delay: Duration, generation: u64 },
    CancelDeactivation,
}

/// A [`TickScheduler`] that records calls without starting any timer.
#[derive(Debug, Default)]
pub struct RecordingTickScheduler {
    calls: Mutex<Vec<SchedulerCall>>,
}

impl RecordingTickScheduler {
    /// Snapshot of all recorded calls, oldest first.
    pub fn calls(&self) -> Vec<SchedulerCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Generation passed to the most recent `schedule_deactivation`, if any.
    pub fn last_scheduled_generation(&self) -> Option<u64> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find_map(|c| match c {
                SchedulerCall::ScheduleDeactivation { generation, .. } => Some(*generation),
                _ => None,
            })
    }

    fn record(&self, call: SchedulerCall) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl TickScheduler for RecordingTickScheduler {
    fn start_ticks(&self, kind: TickKind) {
        self.record(SchedulerCall::Start(kind));
    }

    fn stop_ticks(&self, kind: TickKind) {
        self.record(SchedulerCall::Stop(kind));
    }

    fn schedule_deactivation(&self, delay: Duration, generation: u64) {
        self.record(SchedulerCall::ScheduleDeactivation { delay, generation });
    }

    fn cancel_deactivation(&self) {
        self.record(SchedulerCall::CancelDeactivation);
    }
}
