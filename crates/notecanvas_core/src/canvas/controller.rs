//! Stateful canvas controller: drag, resize, z-order and initial placement.
//!
//! # Responsibility
//! - Run the per-gesture drag state machine and reconcile drops through
//!   [`GridSnapEngine`].
//! - Seed never-positioned cards onto a row/column grid.
//! - Promote cards to the front and resize them within size bounds.
//!
//! # Invariants
//! - At most one drag and one resize are live at a time.
//! - Live drag offsets never reach the store; only a clean `Ended` settles.
//! - Drag-start promotion stays in memory and is written with the settled
//!   position.
//! - A cancelled gesture leaves positions, sizes and z order untouched.
//! - Store failures are logged and swallowed; memory stays authoritative.

use crate::canvas::gesture::{GestureEvent, GesturePhase};
use crate::canvas::snap::{GridSnapEngine, SnapConfig, SnapResolution};
use crate::model::geometry::{Point, Rect, Size, Vector};
use crate::model::item::{ItemId, PositionedItem, MAX_ITEM_SIZE, MIN_ITEM_SIZE};
use crate::store::{EntityStore, LayoutPatch, StoreResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tunable canvas behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub snap: SnapConfig,
    pub screen_width: f64,
    /// Translation length a gesture must exceed before it becomes a drag.
    pub drag_threshold: f64,
    pub column_spacing: f64,
    pub row_spacing: f64,
    /// Center of the first seeded card.
    pub placement_origin: Point,
    pub min_size: Size,
    pub max_size: Size,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            snap: SnapConfig::default(),
            screen_width: 390.0,
            drag_threshold: 8.0,
            column_spacing: 180.0,
            row_spacing: 140.0,
            placement_origin: Point::new(100.0, 180.0),
            min_size: MIN_ITEM_SIZE,
            max_size: MAX_ITEM_SIZE,
        }
    }
}

/// Result of feeding one gesture event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// Event did not affect any card.
    Ignored,
    /// Card is being dragged; render it at `display_position`.
    Moved {
        id: ItemId,
        display_position: Point,
    },
    /// Drag finished and the resolved position was written.
    Settled {
        id: ItemId,
        resolution: SnapResolution,
    },
    /// Live drag was dropped without any position write.
    Cancelled { id: ItemId },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Tracking { start: Point },
    /// Gesture started on empty canvas; ignored until it finishes.
    Rejected,
    Dragging {
        id: ItemId,
        base: Point,
        offset: Vector,
        /// `z_index` before the drag-start promotion; restored on cancel.
        prior_z: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeState {
    id: ItemId,
    base_size: Size,
}

/// Canvas controller over an injected entity store.
pub struct SpatialCanvasController<S: EntityStore> {
    store: S,
    config: CanvasConfig,
    engine: GridSnapEngine,
    items: Vec<PositionedItem>,
    index: BTreeMap<ItemId, usize>,
    drag: DragState,
    resize: Option<ResizeState>,
    overlay_open: bool,
}

impl<S: EntityStore> SpatialCanvasController<S> {
    /// Creates an empty controller.
    pub fn new(store: S, config: CanvasConfig) -> Self {
        Self {
            store,
            engine: GridSnapEngine::new(config.snap),
            config,
            items: Vec::new(),
            index: BTreeMap::new(),
            drag: DragState::Idle,
            resize: None,
            overlay_open: false,
        }
    }

    /// Creates a controller seeded with every item the store lists.
    pub fn load(store: S, config: CanvasConfig) -> StoreResult<Self> {
        let items = store.list_items()?;
        let mut controller = Self::new(store, config);
        for item in items {
            controller.insert_item(item);
        }
        info!(
            "event=canvas_load module=canvas status=ok items={}",
            controller.items.len()
        );
        Ok(controller)
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[PositionedItem] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&PositionedItem> {
        self.index.get(&id).map(|&idx| &self.items[idx])
    }

    /// Adds or replaces an item as-is (loaded state, no store write).
    pub fn insert_item(&mut self, item: PositionedItem) {
        match self.index.get(&item.id) {
            Some(&idx) => self.items[idx] = item,
            None => {
                self.index.insert(item.id, self.items.len());
                self.items.push(item);
            }
        }
    }

    /// Adds a freshly created entity in front of every existing card.
    pub fn insert_new_item(&mut self, mut item: PositionedItem) -> ItemId {
        let id = item.id;
        item.z_index = self.front_z_index();
        let z_index = item.z_index;
        self.insert_item(item);
        self.commit(&[(id, LayoutPatch::z_index(z_index))], "item_insert");
        id
    }

    /// Drops an item from the canvas and any live state that points at it.
    pub fn remove_item(&mut self, id: ItemId) -> Option<PositionedItem> {
        let idx = self.index.remove(&id)?;
        let removed = self.items.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        if matches!(self.drag, DragState::Dragging { id: dragged, .. } if dragged == id) {
            self.drag = DragState::Rejected;
        }
        if self.resize.is_some_and(|state| state.id == id) {
            self.resize = None;
        }
        Some(removed)
    }

    pub fn set_screen_width(&mut self, screen_width: f64) {
        self.config.screen_width = screen_width;
    }

    /// Context menus and similar overlays block new drags while open.
    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    /// Position to render: live drag offset applied for the dragged card.
    pub fn display_position(&self, id: ItemId) -> Option<Point> {
        let item = self.item(id)?;
        match self.drag {
            DragState::Dragging {
                id: dragged,
                base,
                offset,
                ..
            } if dragged == id => Some(base + offset),
            _ => Some(item.position),
        }
    }

    /// Topmost placed card whose bounds contain `point`.
    ///
    /// Highest `z_index` wins; equal values go to the later-inserted card.
    pub fn hit_test(&self, point: Point) -> Option<ItemId> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.placed && Rect::centered(item.position, item.size).contains(point))
            .max_by_key(|(idx, item)| (item.z_index, *idx))
            .map(|(_, item)| item.id)
    }

    /// Number of placed cards within `radius` of `point`.
    pub fn items_near(&self, point: Point, radius: f64) -> usize {
        self.engine.items_near(point, &self.placed_positions(), radius)
    }

    /// Value the next promotion assigns.
    pub fn front_z_index(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.z_index)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Moves a card above every other card.
    ///
    /// Returns `false` without touching the store when the card already
    /// holds the unique maximum `z_index` or is unknown.
    pub fn bring_to_front(&mut self, id: ItemId) -> bool {
        match self.promote_in_memory(id) {
            Some(front) => {
                self.commit(&[(id, LayoutPatch::z_index(front))], "promote");
                true
            }
            None => false,
        }
    }

    fn promote_in_memory(&mut self, id: ItemId) -> Option<i64> {
        let &idx = self.index.get(&id)?;
        let current = self.items[idx].z_index;
        let others_max = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .map(|item| item.z_index)
            .max();
        if others_max.map_or(true, |max| current > max) {
            debug!("event=promote module=canvas status=skip item={id} z_index={current}");
            return None;
        }

        let front = self.front_z_index();
        self.items[idx].z_index = front;
        info!("event=promote module=canvas status=ok item={id} z_index={front}");
        Some(front)
    }

    /// Seeds every unplaced card onto a left-to-right, top-to-bottom grid.
    ///
    /// Returns the number of cards placed. One persist covers the batch.
    pub fn place_unplaced_items(&mut self) -> usize {
        let columns = ((self.config.screen_width / self.config.column_spacing).floor() as usize).max(1);
        let origin = self.config.placement_origin;
        let mut patches = Vec::new();

        for item in self.items.iter_mut().filter(|item| !item.placed) {
            let ordinal = patches.len();
            let column = (ordinal % columns) as f64;
            let row = (ordinal / columns) as f64;
            let position = origin
                + Vector::new(
                    column * self.config.column_spacing,
                    row * self.config.row_spacing,
                );
            item.set_position(position);
            patches.push((item.id, LayoutPatch::position(position)));
        }

        if patches.is_empty() {
            return 0;
        }
        info!(
            "event=initial_placement module=canvas status=ok placed={} columns={columns}",
            patches.len()
        );
        self.commit(&patches, "initial_placement");
        patches.len()
    }

    /// Feeds one pan gesture event through the drag state machine.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> DragUpdate {
        match event.phase {
            GesturePhase::Began => {
                self.drag = DragState::Tracking { start: event.start };
                DragUpdate::Ignored
            }
            GesturePhase::Changed => self.on_changed(event),
            GesturePhase::Ended => {
                if !self.is_dragging() {
                    self.on_changed(event);
                }
                let update = match self.drag {
                    DragState::Dragging {
                        id, base, prior_z, ..
                    } => self.settle(id, base + event.translation, prior_z),
                    _ => DragUpdate::Ignored,
                };
                self.drag = DragState::Idle;
                update
            }
            GesturePhase::Cancelled => {
                let update = match self.drag {
                    DragState::Dragging { id, prior_z, .. } => {
                        if let Some(&idx) = self.index.get(&id) {
                            self.items[idx].z_index = prior_z;
                        }
                        info!("event=drag_cancel module=canvas status=ok item={id} z_index={prior_z}");
                        DragUpdate::Cancelled { id }
                    }
                    _ => DragUpdate::Ignored,
                };
                self.drag = DragState::Idle;
                update
            }
        }
    }

    /// Moves one card to `candidate` without a gesture, as a completed drag would.
    ///
    /// The card is promoted first; promotion and position share one persist.
    /// Returns `None` for unknown ids.
    pub fn drop_item(&mut self, id: ItemId, candidate: Point) -> Option<SnapResolution> {
        let mut prior_z = self.item(id)?.z_index;
        if let DragState::Dragging {
            id: dragged,
            prior_z: dragged_prior,
            ..
        } = self.drag
        {
            if dragged == id {
                prior_z = dragged_prior;
                self.drag = DragState::Rejected;
            }
        }
        self.promote_in_memory(id);
        match self.settle(id, candidate, prior_z) {
            DragUpdate::Settled { resolution, .. } => Some(resolution),
            _ => None,
        }
    }

    fn on_changed(&mut self, event: GestureEvent) -> DragUpdate {
        let start = match self.drag {
            DragState::Idle => event.start,
            DragState::Tracking { start } => start,
            DragState::Rejected => return DragUpdate::Ignored,
            DragState::Dragging {
                id, base, prior_z, ..
            } => {
                self.drag = DragState::Dragging {
                    id,
                    base,
                    offset: event.translation,
                    prior_z,
                };
                return DragUpdate::Moved {
                    id,
                    display_position: base + event.translation,
                };
            }
        };

        if event.translation.length() <= self.config.drag_threshold || self.overlay_open {
            self.drag = DragState::Tracking { start };
            return DragUpdate::Ignored;
        }

        let Some(id) = self.hit_test(start) else {
            debug!("event=drag_start module=canvas status=skip reason=no_hit");
            self.drag = DragState::Rejected;
            return DragUpdate::Ignored;
        };

        let Some((base, prior_z)) = self.item(id).map(|item| (item.position, item.z_index)) else {
            self.drag = DragState::Rejected;
            return DragUpdate::Ignored;
        };
        self.promote_in_memory(id);
        self.drag = DragState::Dragging {
            id,
            base,
            offset: event.translation,
            prior_z,
        };
        debug!("event=drag_start module=canvas status=ok item={id}");
        DragUpdate::Moved {
            id,
            display_position: base + event.translation,
        }
    }

    /// Resolves and writes the drop, along with any z order change since `prior_z`.
    fn settle(&mut self, id: ItemId, candidate: Point, prior_z: i64) -> DragUpdate {
        let Some(&idx) = self.index.get(&id) else {
            return DragUpdate::Ignored;
        };
        let neighbors = self.placed_positions();
        let resolution = self.engine.resolve(
            candidate,
            &neighbors,
            id,
            self.items[idx].size,
            self.config.screen_width,
        );
        self.items[idx].set_position(resolution.point);
        info!(
            "event=drag_settle module=canvas status=ok item={id} snap={} x={:.1} y={:.1}",
            resolution.outcome.label(),
            resolution.point.x,
            resolution.point.y
        );
        let mut patch = LayoutPatch::position(resolution.point);
        let z_index = self.items[idx].z_index;
        if z_index != prior_z {
            patch.z_index = Some(z_index);
        }
        self.commit(&[(id, patch)], "drag_settle");
        DragUpdate::Settled { id, resolution }
    }

    /// Starts a resize of one card. Replaces any resize already live.
    pub fn begin_resize(&mut self, id: ItemId) -> bool {
        match self.item(id) {
            Some(item) => {
                self.resize = Some(ResizeState {
                    id,
                    base_size: item.size,
                });
                true
            }
            None => false,
        }
    }

    /// Applies the cumulative handle translation, clamped to size bounds.
    pub fn update_resize(&mut self, translation: Vector) -> Option<Size> {
        let state = self.resize?;
        let idx = *self.index.get(&state.id)?;
        let size = Size::new(
            state.base_size.width + translation.dx,
            state.base_size.height + translation.dy,
        )
        .clamped(self.config.min_size, self.config.max_size);
        self.items[idx].size = size;
        Some(size)
    }

    /// Persists the live size and ends the resize.
    pub fn end_resize(&mut self) -> Option<Size> {
        let state = self.resize.take()?;
        let size = self.item(state.id)?.size;
        info!(
            "event=resize_end module=canvas status=ok item={} width={:.1} height={:.1}",
            state.id, size.width, size.height
        );
        self.commit(&[(state.id, LayoutPatch::size(size))], "resize_end");
        Some(size)
    }

    /// Restores the pre-resize size without any store write.
    pub fn cancel_resize(&mut self) {
        if let Some(state) = self.resize.take() {
            if let Some(&idx) = self.index.get(&state.id) {
                self.items[idx].size = state.base_size;
            }
        }
    }

    fn placed_positions(&self) -> Vec<(ItemId, Point)> {
        self.items
            .iter()
            .filter(|item| item.placed)
            .map(|item| (item.id, item.position))
            .collect()
    }

    fn commit(&mut self, patches: &[(ItemId, LayoutPatch)], event: &str) {
        for (id, patch) in patches {
            if let Err(err) = self.store.write(*id, patch) {
                warn!("event=persist module=canvas status=error op={event} item={id} error={err}");
            }
        }
        if let Err(err) = self.store.persist() {
            warn!("event=persist module=canvas status=error op={event} error={err}");
        }
    }
}
