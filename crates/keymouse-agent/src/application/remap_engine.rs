//! RemapEngine: the single entry point for every raw key event.
//!
//! The event tap hands each key event to [`RemapEngine::handle_key_event`],
//! which classifies it, updates the modifier state machine and, while armed,
//! routes it to exactly one of: click/drag emission, the movement or scroll
//! integrator, or the action dispatcher.  The returned [`Verdict`] tells the
//! tap whether to swallow the event.
//!
//! Periodic motion is driven from outside: the engine asks its
//! [`TickScheduler`] to start or stop a tick source whenever a direction set
//! becomes non-empty or empty, and the scheduler calls back into
//! [`RemapEngine::on_tick`].  The deferred deactivation works the same way
//! through [`RemapEngine::on_deactivation_timer`].
//!
//! All state lives in this struct.  Callers share it as a [`SharedEngine`]
//! and hold the lock for the duration of one entry-point call, which is what
//! makes "stop ticks" atomic with respect to tick delivery.
//!
//! # Key release rule
//!
//! The release of a key whose press was consumed is always consumed, even if
//! the engine disarmed in between.  Otherwise the foreground application would
//! see a lone key-up for a key it never saw go down.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use keymouse_core::{
    is_number_row, ActivationOutcome, ActivationState, ActivationTiming, Direction, KeyClassifier,
    KeyEvent, KeyMap, KeyPhase, KeyRole, ModifierActivation, ModifierFlags, MotionProfile,
    MouseButton, Rect, Verdict, VelocityIntegrator,
};
use tracing::{debug, info};

use super::dispatch_action::{ActionDispatcher, ProcessLauncher, StatusEvent, StatusSink};
use super::emulate_input::{InputSynthesizer, PointerEmitter};

/// The engine as shared between the event tap, tick tasks, and timers.
pub type SharedEngine = Arc<Mutex<RemapEngine>>;

/// Which periodic update a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickKind {
    Movement,
    Scroll,
}

/// Starts and stops the periodic tick sources and the deactivation timer.
///
/// Every method is called while the engine lock is held, so implementations
/// must not try to lock the engine synchronously.  A stop must guarantee that
/// no tick of that kind reaches the engine afterwards.
pub trait TickScheduler: Send + Sync {
    fn start_ticks(&self, kind: TickKind);
    fn stop_ticks(&self, kind: TickKind);
    /// Arms a one-shot timer that calls
    /// [`RemapEngine::on_deactivation_timer`] with `generation` after `delay`.
    fn schedule_deactivation(&self, delay: Duration, generation: u64);
    fn cancel_deactivation(&self);
}

/// Tunables for the engine.  Built from the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub activation: ActivationTiming,
    pub multi_click_window: Duration,
    pub movement: MotionProfile,
    pub movement_boost: MotionProfile,
    pub scroll: MotionProfile,
    pub scroll_boost: MotionProfile,
    /// Publish an `ActionTaken` status event for every launch.
    pub notify_on_launch: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            activation: ActivationTiming::default(),
            multi_click_window: keymouse_core::domain::clicks::DEFAULT_MULTI_CLICK_WINDOW,
            movement: MotionProfile::MOVEMENT,
            movement_boost: MotionProfile::MOVEMENT_BOOST,
            scroll: MotionProfile::SCROLL,
            scroll_boost: MotionProfile::SCROLL_BOOST,
            notify_on_launch: true,
        }
    }
}

/// Collaborators injected into the engine.
pub struct EngineDeps {
    pub synth: Arc<dyn InputSynthesizer>,
    pub scheduler: Arc<dyn TickScheduler>,
    pub status: Arc<dyn StatusSink>,
    pub launcher: Arc<dyn ProcessLauncher>,
}

pub struct RemapEngine {
    key_map: KeyMap,
    activation: ModifierActivation,
    movement: VelocityIntegrator,
    scroll: VelocityIntegrator,
    pointer: PointerEmitter,
    dispatcher: ActionDispatcher,
    scheduler: Arc<dyn TickScheduler>,
    status: Arc<dyn StatusSink>,
    displays: Vec<Rect>,
    boosted: bool,
    pointer_used: bool,
    swallowed: HashSet<u16>,
}

impl RemapEngine {
    pub fn new(key_map: KeyMap, settings: &EngineSettings, deps: EngineDeps) -> Self {
        Self {
            key_map,
            activation: ModifierActivation::new(settings.activation),
            movement: VelocityIntegrator::new(settings.movement, settings.movement_boost),
            scroll: VelocityIntegrator::new(settings.scroll, settings.scroll_boost),
            pointer: PointerEmitter::new(Arc::clone(&deps.synth), settings.multi_click_window),
            dispatcher: ActionDispatcher::new(
                deps.synth,
                deps.launcher,
                Arc::clone(&deps.status),
                settings.notify_on_launch,
            ),
            scheduler: deps.scheduler,
            status: deps.status,
            displays: Vec::new(),
            boosted: false,
            pointer_used: false,
            swallowed: HashSet::new(),
        }
    }

    /// Wraps the engine for sharing.
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(Mutex::new(self))
    }

    // ── Entry points ──────────────────────────────────────────────────────────

    /// Processes one raw key event and decides whether to swallow it.
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Verdict {
        self.apply_boost(event.flags);
        let role = KeyClassifier::classify(event.key_code, &self.key_map);

        match event.phase {
            KeyPhase::Down => {
                let verdict = self.handle_press(role, &event);
                if verdict.is_consumed() {
                    self.swallowed.insert(event.key_code);
                }
                verdict
            }
            KeyPhase::Up => {
                let was_swallowed = self.swallowed.remove(&event.key_code);
                self.handle_release(role, &event);
                if was_swallowed || role == KeyRole::Modifier {
                    Verdict::Consume
                } else {
                    Verdict::PassThrough
                }
            }
        }
    }

    /// Tracks the boost modifier from a flags-changed event.  Such events
    /// always pass through.
    pub fn handle_flags_changed(&mut self, flags: ModifierFlags) -> Verdict {
        self.apply_boost(flags);
        Verdict::PassThrough
    }

    /// Advances one tick of the given kind.
    pub fn on_tick(&mut self, kind: TickKind) {
        if !self.activation.is_armed() {
            return;
        }
        match kind {
            TickKind::Movement => {
                if let Some((dx, dy)) = self.movement.tick() {
                    self.pointer.move_by(dx, dy, &self.displays);
                }
            }
            TickKind::Scroll => {
                if let Some((dx, dy)) = self.scroll.tick() {
                    self.pointer.scroll_by(dx, dy);
                }
            }
        }
    }

    /// Handles the deferred-deactivation timer.  Stale generations are ignored.
    pub fn on_deactivation_timer(&mut self, generation: u64) {
        if self.activation.on_deactivation_timer(generation) {
            debug!(generation, "deferred deactivation fired");
            self.deactivate(Instant::now());
        } else {
            debug!(generation, "ignoring stale deactivation timer");
        }
    }

    /// Replaces the display rectangles used for pointer clamping.
    pub fn set_display_regions(&mut self, displays: Vec<Rect>) {
        info!(count = displays.len(), "display configuration updated");
        self.displays = displays;
    }

    // ── State accessors ───────────────────────────────────────────────────────

    pub fn is_armed(&self) -> bool {
        self.activation.is_armed()
    }

    pub fn activation_state(&self) -> ActivationState {
        self.activation.state()
    }

    pub fn movement(&self) -> &VelocityIntegrator {
        &self.movement
    }

    pub fn scroll(&self) -> &VelocityIntegrator {
        &self.scroll
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.pointer.is_held(button)
    }

    pub fn is_boosted(&self) -> bool {
        self.boosted
    }

    pub fn is_pointer_used(&self) -> bool {
        self.pointer_used
    }

    pub fn display_regions(&self) -> &[Rect] {
        &self.displays
    }

    // ── Press / release routing ───────────────────────────────────────────────

    fn handle_press(&mut self, role: KeyRole, event: &KeyEvent) -> Verdict {
        if role == KeyRole::Modifier {
            self.modifier_down(event);
            return Verdict::Consume;
        }
        if !self.activation.is_armed() {
            return Verdict::PassThrough;
        }
        if role.is_pointer_role() {
            self.pointer_used = true;
        }

        match role {
            KeyRole::LeftClick | KeyRole::RightClick | KeyRole::MiddleClick => {
                if let Some(button) = role.click_button() {
                    if !self.pointer.is_held(button) {
                        self.pointer.set_button(button, true, event.at);
                    }
                }
                Verdict::Consume
            }
            KeyRole::Move(direction) => {
                self.press_direction(TickKind::Movement, direction);
                Verdict::Consume
            }
            KeyRole::Scroll(direction) => {
                self.press_direction(TickKind::Scroll, direction);
                Verdict::Consume
            }
            KeyRole::MappedAction(code) => self.mapped_press(code, event),
            KeyRole::Modifier | KeyRole::Passthrough => Verdict::PassThrough,
        }
    }

    fn handle_release(&mut self, role: KeyRole, event: &KeyEvent) {
        match role {
            KeyRole::Modifier => self.modifier_up(event),
            KeyRole::LeftClick | KeyRole::RightClick | KeyRole::MiddleClick => {
                if let Some(button) = role.click_button() {
                    if self.pointer.is_held(button) {
                        self.pointer.set_button(button, false, event.at);
                    }
                }
            }
            KeyRole::Move(direction) => self.release_direction(TickKind::Movement, direction),
            KeyRole::Scroll(direction) => self.release_direction(TickKind::Scroll, direction),
            KeyRole::MappedAction(_) | KeyRole::Passthrough => {}
        }
    }

    fn modifier_down(&mut self, event: &KeyEvent) {
        let had_pending = self.activation.pending_deactivation().is_some();
        match self.activation.on_modifier_down(event.at, event.is_repeat) {
            ActivationOutcome::Armed => {
                info!("armed");
                self.status.publish(StatusEvent::Armed);
            }
            ActivationOutcome::StayArmed => {
                debug!("modifier held during active session");
                if had_pending {
                    self.scheduler.cancel_deactivation();
                }
            }
            _ => {}
        }
    }

    fn modifier_up(&mut self, event: &KeyEvent) {
        match self.activation.on_modifier_up(event.at) {
            ActivationOutcome::Deactivate => self.deactivate(event.at),
            ActivationOutcome::ScheduleDeactivation { delay, generation } => {
                debug!(?delay, generation, "deactivation scheduled");
                self.scheduler.schedule_deactivation(delay, generation);
            }
            ActivationOutcome::StayArmed => debug!("staying armed"),
            _ => {}
        }
    }

    fn mapped_press(&mut self, code: u16, event: &KeyEvent) -> Verdict {
        if event.is_repeat {
            return if self.swallowed.contains(&code) {
                Verdict::Consume
            } else {
                Verdict::PassThrough
            };
        }
        if is_number_row(code) && (!self.activation.is_modifier_held() || self.pointer_used) {
            return Verdict::PassThrough;
        }
        let Some(action) = self.key_map.get(&code) else {
            return Verdict::PassThrough;
        };

        self.dispatcher.dispatch(action);
        if self.activation.note_action() {
            debug!("mapped action cancelled pending deactivation");
            self.scheduler.cancel_deactivation();
        }
        Verdict::Consume
    }

    fn integrator(&mut self, kind: TickKind) -> &mut VelocityIntegrator {
        match kind {
            TickKind::Movement => &mut self.movement,
            TickKind::Scroll => &mut self.scroll,
        }
    }

    fn press_direction(&mut self, kind: TickKind, direction: Direction) {
        if self.integrator(kind).press(direction) {
            debug!(?kind, "ticks started");
            self.scheduler.start_ticks(kind);
        }
    }

    fn release_direction(&mut self, kind: TickKind, direction: Direction) {
        if self.integrator(kind).release(direction) {
            debug!(?kind, "ticks stopped");
            self.scheduler.stop_ticks(kind);
        }
    }

    fn apply_boost(&mut self, flags: ModifierFlags) {
        if self.boosted == flags.shift {
            return;
        }
        self.boosted = flags.shift;
        self.movement.set_boosted(flags.shift);
        self.scroll.set_boosted(flags.shift);
        debug!(boosted = flags.shift, "motion profile switched");
    }

    /// Returns every piece of session state to rest and notifies status.
    fn deactivate(&mut self, at: Instant) {
        if self.movement.is_active() {
            self.scheduler.stop_ticks(TickKind::Movement);
        }
        if self.scroll.is_active() {
            self.scheduler.stop_ticks(TickKind::Scroll);
        }
        self.movement.reset();
        self.scroll.reset();
        if self.pointer.any_held() {
            self.pointer.release_all(at);
        }
        self.pointer_used = false;
        self.activation.deactivate();
        self.scheduler.cancel_deactivation();
        info!("disarmed");
        self.status.publish(StatusEvent::Disarmed);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_emulation::mock::{MockInputSynthesizer, SynthesizedEvent};
    use crate::infrastructure::launcher::RecordingLauncher;
    use crate::infrastructure::scheduler::mock::{RecordingTickScheduler, SchedulerCall};
    use crate::infrastructure::status::RecordingStatusSink;
    use keymouse_core::keymap::macos_vk as vk;
    use keymouse_core::{Action, MediaKey, Point};

    // ── Harness ───────────────────────────────────────────────────────────────

    struct Harness {
        engine: RemapEngine,
        synth: Arc<MockInputSynthesizer>,
        scheduler: Arc<RecordingTickScheduler>,
        status: Arc<RecordingStatusSink>,
        launcher: Arc<RecordingLauncher>,
        t0: Instant,
    }

    impl Harness {
        fn new() -> Self {
            let mut key_map = KeyMap::new();
            key_map.insert(vk::KEYPAD_PLUS, Action::MediaSignal(MediaKey::VolumeUp));
            key_map.insert(
                vk::KEYPAD_1,
                Action::Launch(vec!["-a".into(), "/Applications/Safari.app".into()]),
            );
            key_map.insert(
                vk::ANSI_1,
                Action::Launch(vec!["-a".into(), "/Applications/Notes.app".into()]),
            );

            let synth = Arc::new(MockInputSynthesizer::at(Point::new(500.0, 500.0)));
            let scheduler = Arc::new(RecordingTickScheduler::default());
            let status = Arc::new(RecordingStatusSink::default());
            let launcher = Arc::new(RecordingLauncher::default());
            let engine = RemapEngine::new(
                key_map,
                &EngineSettings::default(),
                EngineDeps {
                    synth: synth.clone(),
                    scheduler: scheduler.clone(),
                    status: status.clone(),
                    launcher: launcher.clone(),
                },
            );
            Self {
                engine,
                synth,
                scheduler,
                status,
                launcher,
                t0: Instant::now(),
            }
        }

        fn at(&self, millis: u64) -> Instant {
            self.t0 + Duration::from_millis(millis)
        }

        fn down(&mut self, code: u16, millis: u64) -> Verdict {
            let ev = KeyEvent::down(code, self.at(millis));
            self.engine.handle_key_event(ev)
        }

        fn up(&mut self, code: u16, millis: u64) -> Verdict {
            let ev = KeyEvent::up(code, self.at(millis));
            self.engine.handle_key_event(ev)
        }

        fn repeat(&mut self, code: u16, millis: u64) -> Verdict {
            let ev = KeyEvent::repeat(code, self.at(millis));
            self.engine.handle_key_event(ev)
        }

        /// Arms via a quick tap of the modifier.
        fn arm_toggle(&mut self) {
            self.down(vk::F13, 0);
            self.up(vk::F13, 50);
            assert!(self.engine.is_armed());
        }

        fn button_events(&self) -> Vec<(MouseButton, bool, u32)> {
            self.synth
                .events()
                .into_iter()
                .filter_map(|e| match e {
                    SynthesizedEvent::Button {
                        button,
                        pressed,
                        click_count,
                        ..
                    } => Some((button, pressed, click_count)),
                    _ => None,
                })
                .collect()
        }
    }

    // ── Passthrough ───────────────────────────────────────────────────────────

    #[test]
    fn test_unmapped_key_passes_through_armed_or_disarmed() {
        let mut h = Harness::new();
        assert_eq!(h.down(0x00, 0), Verdict::PassThrough);
        assert_eq!(h.up(0x00, 10), Verdict::PassThrough);

        h.arm_toggle();
        assert_eq!(h.down(0x00, 100), Verdict::PassThrough);
        assert_eq!(h.up(0x00, 110), Verdict::PassThrough);
    }

    #[test]
    fn test_role_keys_pass_through_while_disarmed() {
        let mut h = Harness::new();
        assert_eq!(h.down(vk::UP_ARROW, 0), Verdict::PassThrough);
        assert_eq!(h.up(vk::UP_ARROW, 10), Verdict::PassThrough);
        assert_eq!(h.down(vk::KEYPAD_PLUS, 20), Verdict::PassThrough);
        assert!(h.synth.events().is_empty());
        assert!(h.scheduler.calls().is_empty());
    }

    // ── Activation ────────────────────────────────────────────────────────────

    #[test]
    fn test_modifier_events_are_always_consumed() {
        let mut h = Harness::new();
        assert_eq!(h.down(vk::F13, 0), Verdict::Consume);
        assert_eq!(h.repeat(vk::F13, 100), Verdict::Consume);
        assert_eq!(h.up(vk::F13, 150), Verdict::Consume);
        assert_eq!(h.status.events(), vec![StatusEvent::Armed]);
    }

    #[test]
    fn test_hold_session_disarms_on_release() {
        // Arrange
        let mut h = Harness::new();

        // Act
        h.down(vk::F13, 0);
        h.down(vk::RIGHT_ARROW, 10);
        h.engine.on_tick(TickKind::Movement);
        h.up(vk::F13, 600);

        // Assert
        assert!(!h.engine.is_armed());
        assert!(!h.engine.movement().is_active());
        assert_eq!(h.engine.movement().velocity(), 0.0);
        assert_eq!(
            h.status.events(),
            vec![StatusEvent::Armed, StatusEvent::Disarmed]
        );
        assert!(h
            .scheduler
            .calls()
            .contains(&SchedulerCall::Stop(TickKind::Movement)));
    }

    #[test]
    fn test_second_tap_disarms_after_grace_timer() {
        // Arrange
        let mut h = Harness::new();
        h.arm_toggle();

        // Act
        h.down(vk::F13, 1000);
        h.up(vk::F13, 1050);

        // Assert: scheduled, not yet disarmed
        assert!(h.engine.is_armed());
        let generation = h
            .scheduler
            .last_scheduled_generation()
            .expect("deactivation must be scheduled");
        h.engine.on_deactivation_timer(generation);
        assert!(!h.engine.is_armed());
    }

    #[test]
    fn test_stale_deactivation_timer_is_ignored() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::F13, 1000);
        h.up(vk::F13, 1050);
        let generation = h.scheduler.last_scheduled_generation().unwrap();

        // A new press inside the grace window cancels it.
        h.down(vk::F13, 1100);
        assert!(h
            .scheduler
            .calls()
            .ends_with(&[SchedulerCall::CancelDeactivation]));

        h.engine.on_deactivation_timer(generation);
        assert!(h.engine.is_armed());
    }

    #[test]
    fn test_shortcut_during_hold_keeps_engine_armed() {
        // Arrange: armed via tap
        let mut h = Harness::new();
        h.arm_toggle();

        // Act: press@0, shortcut@0.05, release@0.1
        h.down(vk::F13, 2000);
        h.down(vk::KEYPAD_PLUS, 2050);
        h.up(vk::KEYPAD_PLUS, 2060);
        h.up(vk::F13, 2100);

        // Assert
        assert!(h.engine.is_armed());
        assert_eq!(h.scheduler.last_scheduled_generation(), None);
        assert_eq!(
            h.synth.events(),
            vec![SynthesizedEvent::Media(MediaKey::VolumeUp)]
        );
    }

    #[test]
    fn test_action_during_grace_cancels_deactivation() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::F13, 1000);
        h.up(vk::F13, 1050);
        let generation = h.scheduler.last_scheduled_generation().unwrap();

        h.down(vk::KEYPAD_PLUS, 1100);
        h.engine.on_deactivation_timer(generation);

        assert!(h.engine.is_armed());
        assert!(h
            .scheduler
            .calls()
            .contains(&SchedulerCall::CancelDeactivation));
    }

    // ── Disarm side effects ───────────────────────────────────────────────────

    #[test]
    fn test_disarm_releases_held_buttons_and_stops_everything() {
        // Arrange: hold-to-use session with a drag and a scroll in progress
        let mut h = Harness::new();
        h.down(vk::F13, 0);
        h.down(vk::BACKSLASH, 10);
        h.down(vk::GRAVE, 20);
        h.down(vk::LEFT_ARROW, 30);
        h.down(vk::PAGE_DOWN, 40);
        h.engine.on_tick(TickKind::Movement);
        h.engine.on_tick(TickKind::Scroll);

        // Act
        h.up(vk::F13, 900);

        // Assert
        assert!(!h.engine.is_armed());
        assert!(!h.engine.movement().is_active());
        assert!(!h.engine.scroll().is_active());
        assert_eq!(h.engine.movement().velocity(), 0.0);
        assert_eq!(h.engine.scroll().velocity(), 0.0);
        assert!(!h.engine.is_button_held(MouseButton::Left));
        assert!(!h.engine.is_button_held(MouseButton::Right));
        assert!(!h.engine.is_pointer_used());
        let ups: Vec<MouseButton> = h
            .button_events()
            .into_iter()
            .filter(|(_, pressed, _)| !pressed)
            .map(|(b, _, _)| b)
            .collect();
        assert_eq!(ups, vec![MouseButton::Left, MouseButton::Right]);
        let calls = h.scheduler.calls();
        assert!(calls.contains(&SchedulerCall::Stop(TickKind::Movement)));
        assert!(calls.contains(&SchedulerCall::Stop(TickKind::Scroll)));
    }

    #[test]
    fn test_release_of_consumed_key_is_consumed_after_disarm() {
        let mut h = Harness::new();
        h.down(vk::F13, 0);
        assert_eq!(h.down(vk::UP_ARROW, 10), Verdict::Consume);
        h.up(vk::F13, 700);
        assert!(!h.engine.is_armed());

        assert_eq!(h.up(vk::UP_ARROW, 710), Verdict::Consume);
        // Next press is a normal, disarmed press.
        assert_eq!(h.down(vk::UP_ARROW, 800), Verdict::PassThrough);
        assert_eq!(h.up(vk::UP_ARROW, 810), Verdict::PassThrough);
    }

    #[test]
    fn test_ticks_after_disarm_emit_nothing() {
        let mut h = Harness::new();
        h.down(vk::F13, 0);
        h.down(vk::DOWN_ARROW, 10);
        h.up(vk::F13, 700);
        h.synth.clear();

        h.engine.on_tick(TickKind::Movement);
        h.engine.on_tick(TickKind::Scroll);

        assert!(h.synth.events().is_empty());
    }

    // ── Clicks ────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_run_across_key_presses() {
        // Arrange
        let mut h = Harness::new();
        h.arm_toggle();

        // Act: down@0 (1), up@0.1, down@0.3 (2), up@0.4, down@1.2 (1)
        h.down(vk::BACKSLASH, 1000);
        h.up(vk::BACKSLASH, 1100);
        h.down(vk::BACKSLASH, 1300);
        h.up(vk::BACKSLASH, 1400);
        h.down(vk::BACKSLASH, 2200);

        // Assert
        assert_eq!(
            h.button_events(),
            vec![
                (MouseButton::Left, true, 1),
                (MouseButton::Left, false, 1),
                (MouseButton::Left, true, 2),
                (MouseButton::Left, false, 2),
                (MouseButton::Left, true, 1),
            ]
        );
    }

    #[test]
    fn test_autorepeat_of_held_click_key_is_consumed_and_ignored() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::SLASH, 100);

        assert_eq!(h.repeat(vk::SLASH, 400), Verdict::Consume);
        assert_eq!(h.repeat(vk::SLASH, 450), Verdict::Consume);

        assert_eq!(h.button_events(), vec![(MouseButton::Middle, true, 1)]);
    }

    #[test]
    fn test_movement_while_left_and_right_held_drags_left() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::GRAVE, 100);
        h.down(vk::BACKSLASH, 110);
        h.down(vk::RIGHT_ARROW, 120);
        h.synth.clear();

        h.engine.on_tick(TickKind::Movement);

        match h.synth.events().as_slice() {
            [SynthesizedEvent::Move { drag, .. }] => assert_eq!(*drag, Some(MouseButton::Left)),
            other => panic!("expected a single move, got {other:?}"),
        }
    }

    // ── Motion ────────────────────────────────────────────────────────────────

    #[test]
    fn test_tick_source_runs_only_while_directions_held() {
        // Arrange
        let mut h = Harness::new();
        h.arm_toggle();

        // Act
        h.down(vk::UP_ARROW, 100);
        h.down(vk::LEFT_ARROW, 110);
        h.repeat(vk::UP_ARROW, 400);
        h.up(vk::UP_ARROW, 500);
        h.up(vk::LEFT_ARROW, 510);

        // Assert
        assert_eq!(
            h.scheduler.calls(),
            vec![
                SchedulerCall::Start(TickKind::Movement),
                SchedulerCall::Stop(TickKind::Movement),
            ]
        );
    }

    #[test]
    fn test_movement_tick_moves_cursor_with_acceleration() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::RIGHT_ARROW, 100);

        h.engine.on_tick(TickKind::Movement);
        h.engine.on_tick(TickKind::Movement);

        // 500 + (3.0 + 0.3) + (3.0 + 0.6)
        let cursor = h.synth.cursor();
        assert!((cursor.x - 506.9).abs() < 1e-9, "cursor.x = {}", cursor.x);
        assert_eq!(cursor.y, 500.0);
    }

    #[test]
    fn test_movement_is_clamped_to_display_regions() {
        let mut h = Harness::new();
        h.engine
            .set_display_regions(vec![Rect::new(0.0, 0.0, 502.0, 1000.0)]);
        h.arm_toggle();
        h.down(vk::RIGHT_ARROW, 100);

        h.engine.on_tick(TickKind::Movement);

        assert_eq!(h.synth.cursor(), Point::new(501.0, 500.0));
    }

    #[test]
    fn test_scroll_up_emits_negative_dy() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::PAGE_UP, 100);

        h.engine.on_tick(TickKind::Scroll);

        match h.synth.events().as_slice() {
            [SynthesizedEvent::Scroll { dx, dy }] => {
                assert_eq!(*dx, 0.0);
                assert!((*dy + 2.2).abs() < 1e-9);
            }
            other => panic!("expected a single scroll, got {other:?}"),
        }
    }

    #[test]
    fn test_shift_selects_boost_profile_and_resets_velocity() {
        // Arrange
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::RIGHT_ARROW, 100);
        for _ in 0..5 {
            h.engine.on_tick(TickKind::Movement);
        }
        assert!(h.engine.movement().velocity() > 0.0);

        // Act
        h.engine.handle_flags_changed(ModifierFlags::SHIFT);

        // Assert
        assert!(h.engine.is_boosted());
        assert_eq!(h.engine.movement().velocity(), 0.0);
        assert_eq!(h.engine.movement().profile(), MotionProfile::MOVEMENT_BOOST);
        assert_eq!(h.engine.scroll().profile(), MotionProfile::SCROLL_BOOST);
    }

    #[test]
    fn test_flags_changed_always_passes_through() {
        let mut h = Harness::new();
        h.arm_toggle();
        assert_eq!(
            h.engine.handle_flags_changed(ModifierFlags::SHIFT),
            Verdict::PassThrough
        );
    }

    // ── Mapped actions ────────────────────────────────────────────────────────

    #[test]
    fn test_launch_fires_on_press_only_and_release_is_consumed() {
        // Arrange
        let mut h = Harness::new();
        h.arm_toggle();

        // Act
        let press = h.down(vk::KEYPAD_1, 100);
        let repeat = h.repeat(vk::KEYPAD_1, 400);
        let release = h.up(vk::KEYPAD_1, 500);

        // Assert
        assert_eq!(press, Verdict::Consume);
        assert_eq!(repeat, Verdict::Consume);
        assert_eq!(release, Verdict::Consume);
        assert_eq!(
            h.launcher.launches(),
            vec![vec!["-a".to_string(), "/Applications/Safari.app".to_string()]]
        );
        assert!(h.status.events().contains(&StatusEvent::ActionTaken {
            name: "Safari".to_string()
        }));
    }

    #[test]
    fn test_number_row_passes_through_when_modifier_not_held() {
        let mut h = Harness::new();
        h.arm_toggle();

        assert_eq!(h.down(vk::ANSI_1, 100), Verdict::PassThrough);
        assert_eq!(h.up(vk::ANSI_1, 150), Verdict::PassThrough);
        assert!(h.launcher.launches().is_empty());
    }

    #[test]
    fn test_number_row_fires_while_modifier_held() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::F13, 1000);

        assert_eq!(h.down(vk::ANSI_1, 1050), Verdict::Consume);
        assert_eq!(h.up(vk::ANSI_1, 1080), Verdict::Consume);
        h.up(vk::F13, 1100);

        assert_eq!(h.launcher.launches().len(), 1);
        assert!(h.engine.is_armed());
    }

    #[test]
    fn test_number_row_passes_through_after_pointer_use() {
        // Arrange: hold session in which an arrow was used
        let mut h = Harness::new();
        h.down(vk::F13, 0);
        h.down(vk::UP_ARROW, 10);
        h.up(vk::UP_ARROW, 20);

        // Act
        let verdict = h.down(vk::ANSI_1, 30);

        // Assert
        assert_eq!(verdict, Verdict::PassThrough);
        assert!(h.launcher.launches().is_empty());
    }

    #[test]
    fn test_only_pointer_keys_mark_the_hold_as_pointer_use() {
        // Arrange: hold session with a media and a launch action
        let mut h = Harness::new();
        h.down(vk::F13, 0);
        h.down(vk::KEYPAD_PLUS, 10);
        h.up(vk::KEYPAD_PLUS, 20);
        h.down(vk::KEYPAD_1, 30);
        h.up(vk::KEYPAD_1, 40);
        assert!(!h.engine.is_pointer_used());

        // Act / Assert: each pointer role marks the hold
        for code in [vk::BACKSLASH, vk::LEFT_ARROW, vk::PAGE_UP] {
            let mut h = Harness::new();
            h.down(vk::F13, 0);
            h.down(code, 10);
            assert!(h.engine.is_pointer_used(), "key {code:#x}");
        }
    }

    #[test]
    fn test_numpad_action_fires_without_modifier_held() {
        let mut h = Harness::new();
        h.arm_toggle();
        h.down(vk::UP_ARROW, 100);
        h.up(vk::UP_ARROW, 110);

        assert_eq!(h.down(vk::KEYPAD_PLUS, 200), Verdict::Consume);
        assert_eq!(
            h.synth
                .events()
                .iter()
                .filter(|e| matches!(e, SynthesizedEvent::Media(_)))
                .count(),
            1
        );
    }
}
