//! Fixed-iteration force-directed layout for the note link graph.
//!
//! # Responsibility
//! - Compute 2D coordinates for graph nodes from repulsion and edge attraction.
//! - Keep pinned nodes exactly where the caller put them.
//!
//! # Invariants
//! - Output contains every input node; pinned coordinates are returned as-is.
//! - Identical input produces identical output (radial seeding, no randomness).
//! - Edges naming unknown nodes or a single node contribute no force.
//!
//! Repulsion is all-pairs per iteration. That is fine for tens of nodes; a
//! Barnes-Hut quad-tree would replace it if graphs grow large.

use crate::model::geometry::{Point, Vector};
use crate::model::item::ItemId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::TAU;

/// Tunable simulation constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
    pub iterations: usize,
    pub area_width: f64,
    pub area_height: f64,
    /// Constant step scale applied to every move.
    pub cooling: f64,
    pub seed_radius: f64,
    pub seed_radius_step: f64,
    /// Number of distinct seed radii before the ring pattern repeats.
    pub seed_ring_count: usize,
    /// Distances below this are treated as coincident.
    pub min_distance: f64,
}

impl Default for ForceConfig {
    fn default() -> Self {
        Self {
            iterations: 250,
            area_width: 800.0,
            area_height: 800.0,
            cooling: 0.95,
            seed_radius: 160.0,
            seed_radius_step: 18.0,
            seed_ring_count: 5,
            min_distance: 0.01,
        }
    }
}

/// Simulation input node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphNode {
    pub id: ItemId,
    /// Starting coordinates; `None` means radially seeded.
    pub position: Option<Point>,
    pub pinned: bool,
}

/// Simulation input edge. Treated as a spring; direction does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GraphEdge {
    pub source: ItemId,
    pub target: ItemId,
}

/// Fruchterman-Reingold style layout with a constant cooling factor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ForceLayoutEngine {
    config: ForceConfig,
}

impl ForceLayoutEngine {
    pub fn new(config: ForceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForceConfig {
        &self.config
    }

    /// `k = sqrt(area / node_count)`, floored at `min_distance`.
    pub fn ideal_edge_length(&self, node_count: usize) -> f64 {
        let area = self.config.area_width * self.config.area_height;
        let k = (area / node_count.max(1) as f64).sqrt();
        if k.is_finite() {
            k.max(self.config.min_distance)
        } else {
            self.config.min_distance
        }
    }

    /// Radial seed for the node at `index` out of `count`.
    pub fn seed_position(&self, index: usize, count: usize) -> Point {
        let angle = TAU * index as f64 / count.max(1) as f64;
        let ring = index % self.config.seed_ring_count.max(1);
        let radius = self.config.seed_radius + ring as f64 * self.config.seed_radius_step;
        Point::new(angle.cos() * radius, angle.sin() * radius)
    }

    /// Runs the full simulation and returns coordinates keyed by node id.
    pub fn layout(&self, nodes: &[GraphNode], edges: &[GraphEdge]) -> BTreeMap<ItemId, Point> {
        let count = nodes.len();
        let mut positions: Vec<Point> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                node.position
                    .unwrap_or_else(|| self.seed_position(index, count))
            })
            .collect();
        let pinned: Vec<bool> = nodes.iter().map(|node| node.pinned).collect();

        let mut slots = BTreeMap::new();
        for (index, node) in nodes.iter().enumerate() {
            slots.entry(node.id).or_insert(index);
        }
        let springs: Vec<(usize, usize)> = edges
            .iter()
            .filter_map(|edge| Some((*slots.get(&edge.source)?, *slots.get(&edge.target)?)))
            .filter(|&(a, b)| a != b && !(pinned[a] && pinned[b]))
            .collect();

        if pinned.iter().any(|is_pinned| !is_pinned) {
            let k = self.ideal_edge_length(count);
            for _ in 0..self.config.iterations {
                self.step(&mut positions, &pinned, &springs, k);
            }
        }

        nodes
            .iter()
            .zip(positions)
            .map(|(node, position)| (node.id, position))
            .collect()
    }

    fn step(&self, positions: &mut [Point], pinned: &[bool], springs: &[(usize, usize)], k: f64) {
        let count = positions.len();
        let k_sq = k * k;
        let mut displacement = vec![Vector::ZERO; count];

        for a in 0..count {
            if pinned[a] {
                continue;
            }
            for b in 0..count {
                if a == b {
                    continue;
                }
                let delta = self.separation(positions, a, b);
                let distance = delta.length();
                displacement[a] += delta * (k_sq / (distance * distance));
            }
        }

        for &(a, b) in springs {
            let delta = self.separation(positions, a, b);
            let distance = delta.length();
            let pull = delta * (distance / k);
            if !pinned[a] {
                displacement[a] = displacement[a] - pull;
            }
            if !pinned[b] {
                displacement[b] += pull;
            }
        }

        for (index, position) in positions.iter_mut().enumerate() {
            if pinned[index] {
                continue;
            }
            let length = displacement[index].length();
            if length <= 0.0 || !length.is_finite() {
                continue;
            }
            let step = length.min(k) * self.config.cooling;
            *position = *position + displacement[index] * (step / length);
        }
    }

    /// `positions[a] - positions[b]`, with coincident nodes split along x by index order.
    fn separation(&self, positions: &[Point], a: usize, b: usize) -> Vector {
        let delta = positions[a] - positions[b];
        if delta.length() >= self.config.min_distance {
            return delta;
        }
        let push = self.config.min_distance;
        if a < b {
            Vector::new(-push, 0.0)
        } else {
            Vector::new(push, 0.0)
        }
    }
}
