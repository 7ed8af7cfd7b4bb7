//! Plain 2D geometry shared by canvas and graph layout.
//!
//! # Responsibility
//! - Provide value types for points, offsets, sizes and rectangles.
//! - Keep clamping helpers total: they never panic on inverted bounds.
//!
//! # Invariants
//! - All coordinates are logical units in `f64`.
//! - `Point` is an absolute location, `Vector` is a relative offset.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Absolute 2D location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f64 {
        (self - other).length()
    }

    /// Returns whether this point is the persisted "never positioned" marker.
    pub fn is_origin(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Relative 2D offset (gesture translation, force displacement, camera pan).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    pub fn length(self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.dx, self.y + rhs.dy)
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.dx * rhs, self.dy * rhs)
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn half_width(self) -> f64 {
        self.width / 2.0
    }

    pub fn half_height(self) -> f64 {
        self.height / 2.0
    }

    /// Clamps each axis into `[min, max]`.
    ///
    /// When `max` is smaller than `min` on an axis, `min` wins.
    pub fn clamped(self, min: Size, max: Size) -> Size {
        Size::new(
            clamp_lower_wins(self.width, min.width, max.width),
            clamp_lower_wins(self.height, min.height, max.height),
        )
    }
}

/// Axis-aligned rectangle described by its center and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Point,
    pub size: Size,
}

impl Rect {
    pub fn centered(center: Point, size: Size) -> Self {
        Self { center, size }
    }

    pub fn min_x(&self) -> f64 {
        self.center.x - self.size.half_width()
    }

    pub fn max_x(&self) -> f64 {
        self.center.x + self.size.half_width()
    }

    pub fn min_y(&self) -> f64 {
        self.center.y - self.size.half_height()
    }

    pub fn max_y(&self) -> f64 {
        self.center.y + self.size.half_height()
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}

/// Clamps `value` into `[min, max]`, letting `min` win on inverted bounds.
///
/// `f64::clamp` panics when `min > max`; layout inputs such as a zero screen
/// width produce exactly that, so callers use this instead.
pub fn clamp_lower_wins(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}
