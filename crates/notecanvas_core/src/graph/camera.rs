//! Pan/zoom transform for the graph view.
//!
//! `screen = world * scale + offset`. Scale is always inside the configured
//! zoom range.

use crate::model::geometry::{clamp_lower_wins, Point, Size, Vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    offset: Vector,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
}

impl Camera {
    pub fn new(min_scale: f64, max_scale: f64) -> Self {
        Self {
            offset: Vector::ZERO,
            scale: clamp_lower_wins(1.0, min_scale, max_scale),
            min_scale,
            max_scale,
        }
    }

    pub fn offset(&self) -> Vector {
        self.offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(
            world.x * self.scale + self.offset.dx,
            world.y * self.scale + self.offset.dy,
        )
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset.dx) / self.scale,
            (screen.y - self.offset.dy) / self.scale,
        )
    }

    pub fn pan(&mut self, delta: Vector) {
        self.offset += delta;
    }

    /// Sets the scale, clamped to the zoom range. Returns the applied value.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if scale.is_finite() {
            self.scale = clamp_lower_wins(scale, self.min_scale, self.max_scale);
        }
        self.scale
    }

    /// Multiplies the scale by `factor` keeping the world point under `anchor` fixed.
    pub fn zoom_about(&mut self, anchor: Point, factor: f64) -> f64 {
        let before = self.screen_to_world(anchor);
        self.set_scale(self.scale * factor);
        let after = self.world_to_screen(before);
        self.offset += anchor - after;
        self.scale
    }

    pub fn reset(&mut self) {
        self.offset = Vector::ZERO;
        self.set_scale(1.0);
    }

    /// Frames `points` inside `viewport` with `padding` on every side.
    ///
    /// A zero-extent axis does not constrain the scale. Returns `false` when
    /// there is nothing to frame.
    pub fn fit(&mut self, points: impl IntoIterator<Item = Point>, viewport: Size, padding: f64) -> bool {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return false;
        };
        let (mut min, mut max) = (first, first);
        for point in points {
            min = Point::new(min.x.min(point.x), min.y.min(point.y));
            max = Point::new(max.x.max(point.x), max.y.max(point.y));
        }

        let extent = max - min;
        let fit_axis = |available: f64, span: f64| {
            if span > 0.0 {
                (available - 2.0 * padding) / span
            } else {
                f64::INFINITY
            }
        };
        let scale = fit_axis(viewport.width, extent.dx).min(fit_axis(viewport.height, extent.dy));
        self.scale = clamp_lower_wins(
            if scale.is_finite() { scale } else { self.max_scale },
            self.min_scale,
            self.max_scale,
        );

        let center = min + extent * 0.5;
        self.offset = Vector::new(
            viewport.width / 2.0 - center.x * self.scale,
            viewport.height / 2.0 - center.y * self.scale,
        );
        true
    }
}
