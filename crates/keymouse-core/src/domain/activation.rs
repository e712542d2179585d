//! Modifier activation state machine.
//!
//! A single modifier key arms and disarms the engine:
//!
//! - A quick tap of the modifier latches the engine on (toggle).  Another
//!   quick tap, while armed, latches it off after a short grace delay.
//! - Holding the arming press past the hold threshold makes it a
//!   hold-to-use session: releasing it disarms immediately.
//! - While armed, holding the modifier again and firing a mapped action
//!   (a "shortcut") keeps the engine armed on release.
//!
//! The deferred deactivation is identified by a generation number so a timer
//! that fires after being cancelled can be recognised and ignored.
//!
//! The machine is pure: callers pass timestamps in and act on the returned
//! [`ActivationOutcome`].

use std::time::{Duration, Instant};

/// Default press duration at or above which the arming press counts as a hold.
pub const DEFAULT_HOLD_THRESHOLD: Duration = Duration::from_millis(400);

/// Default delay before a toggle-off takes effect.
pub const DEFAULT_DEACTIVATION_GRACE: Duration = Duration::from_millis(300);

/// Timing parameters for [`ModifierActivation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationTiming {
    pub hold_threshold: Duration,
    pub deactivation_grace: Duration,
}

impl Default for ActivationTiming {
    fn default() -> Self {
        Self {
            hold_threshold: DEFAULT_HOLD_THRESHOLD,
            deactivation_grace: DEFAULT_DEACTIVATION_GRACE,
        }
    }
}

/// Observable activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Disarmed,
    /// Armed and the modifier is up.
    ArmedToggle,
    /// Armed and the modifier is physically down.
    ArmedHeld,
}

/// What the caller must do after feeding an event to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The engine just armed.
    Armed,
    /// The engine remains armed; nothing to do.
    StayArmed,
    /// The engine must deactivate now.
    Deactivate,
    /// Start a timer for `delay`; when it fires, call
    /// [`ModifierActivation::on_deactivation_timer`] with `generation`.
    ScheduleDeactivation { delay: Duration, generation: u64 },
    /// The event had no effect on activation.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct ModifierActivation {
    timing: ActivationTiming,
    armed: bool,
    modifier_held: bool,
    pressed_at: Option<Instant>,
    arming_press: bool,
    action_during_hold: bool,
    pending: Option<u64>,
    next_generation: u64,
}

impl Default for ModifierActivation {
    fn default() -> Self {
        Self::new(ActivationTiming::default())
    }
}

impl ModifierActivation {
    pub fn new(timing: ActivationTiming) -> Self {
        Self {
            timing,
            armed: false,
            modifier_held: false,
            pressed_at: None,
            arming_press: false,
            action_during_hold: false,
            pending: None,
            next_generation: 0,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// `true` while the modifier key is physically down.
    pub fn is_modifier_held(&self) -> bool {
        self.modifier_held
    }

    pub fn state(&self) -> ActivationState {
        match (self.armed, self.modifier_held) {
            (false, _) => ActivationState::Disarmed,
            (true, true) => ActivationState::ArmedHeld,
            (true, false) => ActivationState::ArmedToggle,
        }
    }

    /// Generation of the deferred deactivation waiting to fire, if any.
    pub fn pending_deactivation(&self) -> Option<u64> {
        self.pending
    }

    /// Handles a modifier key press.
    pub fn on_modifier_down(&mut self, at: Instant, is_repeat: bool) -> ActivationOutcome {
        if is_repeat {
            return ActivationOutcome::Ignored;
        }

        self.modifier_held = true;
        self.pressed_at = Some(at);
        self.action_during_hold = false;

        if self.armed {
            self.arming_press = false;
            self.pending = None;
            ActivationOutcome::StayArmed
        } else {
            self.armed = true;
            self.arming_press = true;
            ActivationOutcome::Armed
        }
    }

    /// Handles a modifier key release.
    pub fn on_modifier_up(&mut self, at: Instant) -> ActivationOutcome {
        let was_held = std::mem::replace(&mut self.modifier_held, false);
        if !self.armed || !was_held {
            return ActivationOutcome::Ignored;
        }

        if std::mem::replace(&mut self.arming_press, false) {
            let held_for = self
                .pressed_at
                .map(|p| at.saturating_duration_since(p))
                .unwrap_or_default();
            return if held_for < self.timing.hold_threshold {
                ActivationOutcome::StayArmed
            } else {
                ActivationOutcome::Deactivate
            };
        }

        if self.action_during_hold {
            return ActivationOutcome::StayArmed;
        }

        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.pending = Some(generation);
        ActivationOutcome::ScheduleDeactivation {
            delay: self.timing.deactivation_grace,
            generation,
        }
    }

    /// Records that a mapped action fired.
    ///
    /// Marks the current hold as used for a shortcut and cancels any pending
    /// deferred deactivation.  Returns `true` if a pending deactivation was
    /// cancelled.
    pub fn note_action(&mut self) -> bool {
        self.action_during_hold = true;
        self.pending.take().is_some()
    }

    /// Handles a deferred-deactivation timer firing.
    ///
    /// Returns `true` if `generation` is still the pending one, in which case
    /// the caller must deactivate.
    pub fn on_deactivation_timer(&mut self, generation: u64) -> bool {
        if self.armed && self.pending == Some(generation) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns the machine to the disarmed state.
    ///
    /// The physical modifier state is preserved.
    pub fn deactivate(&mut self) {
        self.armed = false;
        self.arming_press = false;
        self.action_during_hold = false;
        self.pending = None;
    }
}
