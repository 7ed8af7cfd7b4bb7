//! Gesture input delivered by the UI layer.

use crate::model::geometry::{Point, Vector};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of one continuous pan gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    /// System interruption; the gesture must leave no trace.
    Cancelled,
}

/// One pan gesture sample.
///
/// `translation` is cumulative from `start`, not a per-event delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub start: Point,
    pub translation: Vector,
    pub phase: GesturePhase,
}

impl GestureEvent {
    pub fn began(start: Point) -> Self {
        Self {
            start,
            translation: Vector::ZERO,
            phase: GesturePhase::Began,
        }
    }

    pub fn changed(start: Point, translation: Vector) -> Self {
        Self {
            start,
            translation,
            phase: GesturePhase::Changed,
        }
    }

    pub fn ended(start: Point, translation: Vector) -> Self {
        Self {
            start,
            translation,
            phase: GesturePhase::Ended,
        }
    }

    pub fn cancelled(start: Point) -> Self {
        Self {
            start,
            translation: Vector::ZERO,
            phase: GesturePhase::Cancelled,
        }
    }
}
