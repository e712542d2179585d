//! Display geometry and pointer clamping.
//!
//! All displays live in one global coordinate space (the CoreGraphics global
//! display space: origin at the top-left of the main display, Y grows
//! downward).  Displays may be arranged with gaps or steps between them, so a
//! synthesized pointer target can fall outside every display.  [`clamp_to_displays`]
//! pulls such a target back onto the nearest display.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// A point in global display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A display rectangle in global display coordinates.
///
/// `x` and `y` are the top-left corner.  The rectangle is half-open: it covers
/// `[x, x + width) × [y, y + height)`, matching `CGRectContainsPoint`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Returns `true` if `point` lies inside this rectangle.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.max_x() && point.y >= self.y && point.y < self.max_y()
    }

    /// Returns the point inside this rectangle closest to `point`.
    ///
    /// Each coordinate is clamped independently to `[min, max - 1]` so the
    /// result is strictly inside the half-open rectangle.
    pub fn nearest_point(&self, point: Point) -> Point {
        Point {
            x: point.x.min(self.max_x() - 1.0).max(self.x),
            y: point.y.min(self.max_y() - 1.0).max(self.y),
        }
    }
}

/// Confines `point` to the union of `displays`.
///
/// Returns `point` unchanged when it lies inside any display (or when no
/// displays are known).  Otherwise returns the nearest point on the closest
/// display's boundary; ties keep the display that appears first in the list.
pub fn clamp_to_displays(point: Point, displays: &[Rect]) -> Point {
    if displays.is_empty() || displays.iter().any(|d| d.contains(point)) {
        return point;
    }

    let mut best = point;
    let mut best_distance = f64::INFINITY;
    for display in displays {
        let candidate = display.nearest_point(point);
        let distance = candidate.distance_to(point);
        if distance < best_distance {
            best_distance = distance;
            best = candidate;
        }
    }
    trace!(?point, clamped = ?best, "pointer target outside all displays");
    best
}

// ── Tests ─────────────────────────────────────────────────────────────────────
