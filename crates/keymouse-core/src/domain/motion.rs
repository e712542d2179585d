//! Accelerating velocity model shared by pointer movement and scrolling.
//!
//! Each integrator tracks which directions are held and a scalar velocity.
//! On every tick the velocity grows by the profile's acceleration (capped at
//! the profile maximum) and the emitted per-axis delta is `base + velocity`,
//! signed by the held directions.  Opposing directions cancel on their axis.
//!
//! Deltas use screen convention: positive `dx` is right, positive `dy` is down.

use serde::{Deserialize, Serialize};

/// One of the four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The set of directions currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionSet {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl DirectionSet {
    fn slot(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    pub fn insert(&mut self, direction: Direction) {
        *self.slot(direction) = true;
    }

    pub fn remove(&mut self, direction: Direction) {
        *self.slot(direction) = false;
    }

    pub fn contains(&self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Net unit vector `(x, y)` in screen convention; each component is -1, 0 or 1.
    pub fn unit_vector(&self) -> (f64, f64) {
        let axis = |neg: bool, pos: bool| f64::from(u8::from(pos)) - f64::from(u8::from(neg));
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Speed parameters for one integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionProfile {
    /// Constant per-tick offset added to the velocity.
    pub base_speed: f64,
    /// Velocity gained per tick.
    pub acceleration: f64,
    /// Velocity ceiling.
    pub max_speed: f64,
}

impl MotionProfile {
    pub const MOVEMENT: Self = Self {
        base_speed: 3.0,
        acceleration: 0.3,
        max_speed: 22.0,
    };

    pub const MOVEMENT_BOOST: Self = Self {
        base_speed: 8.0,
        acceleration: 0.9,
        max_speed: 60.0,
    };

    pub const SCROLL: Self = Self {
        base_speed: 2.0,
        acceleration: 0.2,
        max_speed: 12.0,
    };

    pub const SCROLL_BOOST: Self = Self {
        base_speed: 6.0,
        acceleration: 0.6,
        max_speed: 36.0,
    };
}

/// Direction set plus accelerating velocity for one kind of motion.
#[derive(Debug, Clone)]
pub struct VelocityIntegrator {
    directions: DirectionSet,
    velocity: f64,
    normal: MotionProfile,
    boost: MotionProfile,
    boosted: bool,
}

impl VelocityIntegrator {
    pub fn new(normal: MotionProfile, boost: MotionProfile) -> Self {
        Self {
            directions: DirectionSet::default(),
            velocity: 0.0,
            normal,
            boost,
            boosted: false,
        }
    }

    /// Integrator with the built-in pointer movement profiles.
    pub fn movement() -> Self {
        Self::new(MotionProfile::MOVEMENT, MotionProfile::MOVEMENT_BOOST)
    }

    /// Integrator with the built-in scroll profiles.
    pub fn scroll() -> Self {
        Self::new(MotionProfile::SCROLL, MotionProfile::SCROLL_BOOST)
    }

    /// The profile currently in effect.
    pub fn profile(&self) -> MotionProfile {
        if self.boosted {
            self.boost
        } else {
            self.normal
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn directions(&self) -> DirectionSet {
        self.directions
    }

    pub fn is_active(&self) -> bool {
        !self.directions.is_empty()
    }

    pub fn is_boosted(&self) -> bool {
        self.boosted
    }

    /// Marks `direction` held.  Returns `true` if the set was empty before.
    pub fn press(&mut self, direction: Direction) -> bool {
        let started = self.directions.is_empty();
        self.directions.insert(direction);
        started
    }

    /// Marks `direction` released.  Returns `true` if the set became empty,
    /// in which case the velocity is zeroed.
    pub fn release(&mut self, direction: Direction) -> bool {
        if !self.directions.contains(direction) {
            return false;
        }
        self.directions.remove(direction);
        if self.directions.is_empty() {
            self.velocity = 0.0;
            true
        } else {
            false
        }
    }

    /// Selects the boosted or normal profile.  A change zeroes the velocity.
    ///
    /// Returns `true` if the selection changed.
    pub fn set_boosted(&mut self, boosted: bool) -> bool {
        if self.boosted == boosted {
            return false;
        }
        self.boosted = boosted;
        self.velocity = 0.0;
        true
    }

    /// Clears all held directions and zeroes the velocity.
    pub fn reset(&mut self) {
        self.directions.clear();
        self.velocity = 0.0;
    }

    /// Advances one tick and returns the `(dx, dy)` to emit.
    ///
    /// Returns `None` when no direction is held.  The delta may be `(0, 0)`
    /// when only opposing directions are held.
    pub fn tick(&mut self) -> Option<(f64, f64)> {
        if self.directions.is_empty() {
            return None;
        }
        let profile = self.profile();
        self.velocity = (self.velocity + profile.acceleration).min(profile.max_speed);
        let speed = profile.base_speed + self.velocity;
        let (ux, uy) = self.directions.unit_vector();
        Some((ux * speed, uy * speed))
    }
}
