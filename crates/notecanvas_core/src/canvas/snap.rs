//! Drop-point resolution for canvas drags.
//!
//! # Responsibility
//! - Map a free-form drop point plus neighbor positions to a clean target.
//! - Decide between stacking, edge attachment and lattice snapping.
//!
//! # Invariants
//! - Resolution is a pure function of its inputs and never fails.
//! - Only the single nearest neighbor is considered.
//! - Every result satisfies `min_x <= x <= max_x` (lower bound wins when the
//!   screen is narrower than the card) and `y >= min_y`.

use crate::model::geometry::{clamp_lower_wins, Point, Size};
use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};

/// Tunable thresholds and lattice for drop resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Nearest-neighbor distance below which the card stacks exactly.
    pub stack_threshold: f64,
    /// Nearest-neighbor distance below which the card attaches to an edge.
    pub snap_threshold: f64,
    pub grid_width: f64,
    pub grid_height: f64,
    /// Lattice rows are measured from this offset.
    pub top_padding: f64,
    /// Header reserve; a resolved `y` never goes above it.
    pub min_y: f64,
    pub side_margin: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            stack_threshold: 80.0,
            snap_threshold: 120.0,
            grid_width: 80.0,
            grid_height: 60.0,
            top_padding: 120.0,
            min_y: 100.0,
            side_margin: 20.0,
        }
    }
}

/// Neighbor edge a card attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapEdge {
    Left,
    Right,
    Above,
    Below,
}

impl SnapEdge {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Above => "above",
            Self::Below => "below",
        }
    }
}

/// Which branch produced a resolved point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapOutcome {
    Stack(ItemId),
    Edge(ItemId, SnapEdge),
    Grid,
}

impl SnapOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stack(_) => "stack",
            Self::Edge(_, _) => "edge",
            Self::Grid => "grid",
        }
    }
}

/// Resolved drop target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResolution {
    pub point: Point,
    pub outcome: SnapOutcome,
}

/// Pure drop-point resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridSnapEngine {
    config: SnapConfig,
}

impl GridSnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// Resolves `candidate` against `neighbors`, ignoring `excluding`.
    ///
    /// `item_size` is the dragged card's size; `screen_width` bounds `x`.
    pub fn resolve(
        &self,
        candidate: Point,
        neighbors: &[(ItemId, Point)],
        excluding: ItemId,
        item_size: Size,
        screen_width: f64,
    ) -> SnapResolution {
        let nearest = neighbors
            .iter()
            .filter(|(id, _)| *id != excluding)
            .map(|(id, position)| (*id, *position, candidate.distance_to(*position)))
            .fold(None, |best: Option<(ItemId, Point, f64)>, current| match best {
                Some(best) if best.2 <= current.2 => Some(best),
                _ => Some(current),
            });

        let (point, outcome) = match nearest {
            Some((id, position, distance)) if distance < self.config.stack_threshold => {
                (position, SnapOutcome::Stack(id))
            }
            Some((id, position, distance)) if distance < self.config.snap_threshold => {
                let (point, edge) = attach_to_edge(candidate, position, item_size);
                (point, SnapOutcome::Edge(id, edge))
            }
            _ => (self.grid_point(candidate), SnapOutcome::Grid),
        };

        SnapResolution {
            point: self.clamp(point, item_size, screen_width),
            outcome,
        }
    }

    /// Same as [`GridSnapEngine::resolve`], returning only the point.
    pub fn resolve_position(
        &self,
        candidate: Point,
        neighbors: &[(ItemId, Point)],
        excluding: ItemId,
        item_size: Size,
        screen_width: f64,
    ) -> Point {
        self.resolve(candidate, neighbors, excluding, item_size, screen_width)
            .point
    }

    /// Counts neighbors within `radius` of `point` (stack indicator badge).
    pub fn items_near(&self, point: Point, neighbors: &[(ItemId, Point)], radius: f64) -> usize {
        neighbors
            .iter()
            .filter(|(_, position)| point.distance_to(*position) <= radius)
            .count()
    }

    fn grid_point(&self, candidate: Point) -> Point {
        let top = self.config.top_padding;
        Point::new(
            snap_to_step(candidate.x, self.config.grid_width),
            snap_to_step(candidate.y - top, self.config.grid_height) + top,
        )
    }

    fn clamp(&self, point: Point, item_size: Size, screen_width: f64) -> Point {
        let min_x = item_size.half_width() + self.config.side_margin;
        let max_x = screen_width - item_size.half_width() - self.config.side_margin;
        Point::new(
            clamp_lower_wins(point.x, min_x, max_x),
            point.y.max(self.config.min_y),
        )
    }
}

fn attach_to_edge(candidate: Point, neighbor: Point, item_size: Size) -> (Point, SnapEdge) {
    let delta = candidate - neighbor;
    if delta.dx.abs() > delta.dy.abs() {
        if delta.dx >= 0.0 {
            (
                Point::new(neighbor.x + item_size.half_width(), neighbor.y),
                SnapEdge::Right,
            )
        } else {
            (
                Point::new(neighbor.x - item_size.half_width(), neighbor.y),
                SnapEdge::Left,
            )
        }
    } else if delta.dy >= 0.0 {
        (
            Point::new(neighbor.x, neighbor.y + item_size.half_height()),
            SnapEdge::Below,
        )
    } else {
        (
            Point::new(neighbor.x, neighbor.y - item_size.half_height()),
            SnapEdge::Above,
        )
    }
}

fn snap_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}
