//! Graph view controller: layout runs, camera and node pinning.
//!
//! # Responsibility
//! - Build simulation input from the link snapshot and persist the result.
//! - Let users drag nodes to pin them, and clear every pin on demand.
//! - Own the pan/zoom camera and fit-to-view framing.
//! - Answer degree queries used for node sizing.
//!
//! # Invariants
//! - A pinned node's graph position is only changed by a user drag.
//! - Links to unknown items are ignored for forces and degree.
//! - Store failures are logged and swallowed.

use crate::graph::camera::Camera;
use crate::graph::force::{ForceConfig, ForceLayoutEngine, GraphEdge, GraphNode};
use crate::model::geometry::{Point, Size, Vector};
use crate::model::item::{ItemId, PositionedItem};
use crate::store::{EntityStore, LayoutPatch, StoreResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Tunable graph view behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub force: ForceConfig,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Screen-space margin kept around the framed graph.
    pub fit_padding: f64,
    pub base_node_radius: f64,
    pub node_radius_per_link: f64,
    /// Degree beyond which nodes stop growing.
    pub max_radius_links: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            force: ForceConfig::default(),
            min_scale: 0.4,
            max_scale: 2.5,
            fit_padding: 40.0,
            base_node_radius: 18.0,
            node_radius_per_link: 3.0,
            max_radius_links: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeDrag {
    id: ItemId,
    base: Point,
    offset: Vector,
}

/// Interactive graph controller over an injected entity store.
pub struct GraphViewController<S: EntityStore> {
    store: S,
    config: GraphConfig,
    engine: ForceLayoutEngine,
    camera: Camera,
    nodes: BTreeMap<ItemId, PositionedItem>,
    order: Vec<ItemId>,
    positions: BTreeMap<ItemId, Point>,
    drag: Option<NodeDrag>,
}

impl<S: EntityStore> GraphViewController<S> {
    pub fn new(store: S, config: GraphConfig) -> Self {
        Self {
            store,
            engine: ForceLayoutEngine::new(config.force),
            camera: Camera::new(config.min_scale, config.max_scale),
            config,
            nodes: BTreeMap::new(),
            order: Vec::new(),
            positions: BTreeMap::new(),
            drag: None,
        }
    }

    /// Creates a controller over every item the store lists.
    ///
    /// Persisted graph coordinates become the initial positions.
    pub fn load(store: S, config: GraphConfig) -> StoreResult<Self> {
        let items = store.list_items()?;
        let mut controller = Self::new(store, config);
        for item in items {
            controller.insert_item(item);
        }
        Ok(controller)
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn node(&self, id: ItemId) -> Option<&PositionedItem> {
        self.nodes.get(&id)
    }

    /// Adds or replaces a node. Insertion order drives radial seeding.
    pub fn insert_item(&mut self, item: PositionedItem) {
        let id = item.id;
        if let Some(position) = item.graph_position {
            self.positions.insert(id, position);
        }
        if self.nodes.insert(id, item).is_none() {
            self.order.push(id);
        }
    }

    /// Current coordinates of every node that has been laid out or loaded.
    pub fn positions(&self) -> &BTreeMap<ItemId, Point> {
        &self.positions
    }

    /// Coordinates to render, including a live node drag.
    pub fn position(&self, id: ItemId) -> Option<Point> {
        match self.drag {
            Some(drag) if drag.id == id => Some(drag.base + drag.offset),
            _ => self.positions.get(&id).copied(),
        }
    }

    /// Recomputes the layout and persists every unpinned node's coordinates.
    ///
    /// Unpinned nodes are reseeded each run so repeated runs agree.
    pub fn run_layout(&mut self) {
        let started_at = Instant::now();
        let nodes: Vec<GraphNode> = self
            .order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|item| GraphNode {
                id: item.id,
                position: if item.has_custom_graph_position {
                    item.graph_position
                } else {
                    None
                },
                pinned: item.has_custom_graph_position,
            })
            .collect();
        let edges = self.edges();
        let computed = self.engine.layout(&nodes, &edges);

        let mut patches = Vec::new();
        for (id, position) in computed {
            if let Some(item) = self.nodes.get_mut(&id) {
                if !item.has_custom_graph_position {
                    item.graph_position = Some(position);
                    patches.push((id, LayoutPatch::graph(position, false)));
                } else if item.graph_position.is_none() {
                    // Pinned without coordinates: hold the seed in memory only.
                    item.graph_position = Some(position);
                }
            }
            self.positions.insert(id, position);
        }

        info!(
            "event=graph_layout module=graph status=ok nodes={} edges={} moved={} iterations={} duration_ms={}",
            nodes.len(),
            edges.len(),
            patches.len(),
            self.engine.config().iterations,
            started_at.elapsed().as_millis()
        );
        self.commit(&patches, "graph_layout");
    }

    /// Undirected, deduplicated edges between known nodes.
    pub fn edges(&self) -> Vec<GraphEdge> {
        let mut pairs = BTreeSet::new();
        for item in self.nodes.values() {
            for target in &item.linked_item_ids {
                if *target == item.id || !self.nodes.contains_key(target) {
                    continue;
                }
                let (source, target) = if item.id < *target {
                    (item.id, *target)
                } else {
                    (*target, item.id)
                };
                pairs.insert(GraphEdge { source, target });
            }
        }
        pairs.into_iter().collect()
    }

    /// Distinct known nodes linked to `id` in either direction.
    pub fn degree(&self, id: ItemId) -> usize {
        let Some(item) = self.nodes.get(&id) else {
            return 0;
        };
        let mut neighbors: BTreeSet<ItemId> = item
            .linked_item_ids
            .iter()
            .copied()
            .filter(|target| *target != id && self.nodes.contains_key(target))
            .collect();
        neighbors.extend(
            self.nodes
                .values()
                .filter(|other| other.id != id && other.linked_item_ids.contains(&id))
                .map(|other| other.id),
        );
        neighbors.len()
    }

    /// Render radius grown by degree up to `max_radius_links`.
    pub fn node_radius(&self, id: ItemId) -> f64 {
        let links = self.degree(id).min(self.config.max_radius_links);
        self.config.base_node_radius + links as f64 * self.config.node_radius_per_link
    }

    pub fn pan(&mut self, delta: Vector) {
        self.camera.pan(delta);
    }

    pub fn set_scale(&mut self, scale: f64) -> f64 {
        self.camera.set_scale(scale)
    }

    pub fn zoom_by(&mut self, factor: f64, anchor: Point) -> f64 {
        self.camera.zoom_about(anchor, factor)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.camera.world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    /// Returns the camera to the origin at scale 1 (clamped to the zoom range).
    pub fn reset_view(&mut self) {
        self.camera.reset();
        debug!(
            "event=view_reset module=graph status=ok scale={:.3}",
            self.camera.scale()
        );
    }

    /// Frames every positioned node inside `viewport`.
    pub fn fit_to_view(&mut self, viewport: Size) -> bool {
        let points: Vec<Point> = self
            .order
            .iter()
            .filter_map(|id| self.position(*id))
            .collect();
        let framed = self
            .camera
            .fit(points, viewport, self.config.fit_padding);
        if framed {
            debug!(
                "event=fit_to_view module=graph status=ok scale={:.3}",
                self.camera.scale()
            );
        }
        framed
    }

    /// Starts dragging a node that already has coordinates.
    pub fn begin_node_drag(&mut self, id: ItemId) -> bool {
        let Some(base) = self.positions.get(&id).copied() else {
            return false;
        };
        self.drag = Some(NodeDrag {
            id,
            base,
            offset: Vector::ZERO,
        });
        true
    }

    /// Applies a cumulative screen-space translation to the dragged node.
    pub fn update_node_drag(&mut self, screen_translation: Vector) -> Option<Point> {
        let drag = self.drag.as_mut()?;
        drag.offset = screen_translation * (1.0 / self.camera.scale());
        Some(drag.base + drag.offset)
    }

    /// Pins the dragged node at its new coordinates and persists them.
    pub fn end_node_drag(&mut self) -> Option<Point> {
        let drag = self.drag.take()?;
        let position = drag.base + drag.offset;
        let item = self.nodes.get_mut(&drag.id)?;
        item.graph_position = Some(position);
        item.has_custom_graph_position = true;
        self.positions.insert(drag.id, position);
        info!(
            "event=node_pin module=graph status=ok item={} x={:.1} y={:.1}",
            drag.id, position.x, position.y
        );
        self.commit(&[(drag.id, LayoutPatch::graph(position, true))], "node_pin");
        Some(position)
    }

    pub fn cancel_node_drag(&mut self) {
        self.drag = None;
    }

    /// Clears every pin and lays the whole graph out again.
    pub fn reset_to_automatic(&mut self) {
        let mut cleared = Vec::new();
        for item in self.nodes.values_mut() {
            if item.has_custom_graph_position {
                item.has_custom_graph_position = false;
                cleared.push(item.id);
            }
        }
        for id in &cleared {
            let patch = LayoutPatch {
                has_custom_graph_position: Some(false),
                ..LayoutPatch::default()
            };
            if let Err(err) = self.store.write(*id, &patch) {
                warn!("event=persist module=graph status=error op=pin_reset item={id} error={err}");
            }
        }
        info!(
            "event=pin_reset module=graph status=ok cleared={}",
            cleared.len()
        );
        self.run_layout();
    }

    fn commit(&mut self, patches: &[(ItemId, LayoutPatch)], event: &str) {
        for (id, patch) in patches {
            if let Err(err) = self.store.write(*id, patch) {
                warn!("event=persist module=graph status=error op={event} item={id} error={err}");
            }
        }
        if let Err(err) = self.store.persist() {
            warn!("event=persist module=graph status=error op={event} error={err}");
        }
    }
}
