//! Positioned card model shared by canvas and graph layout.
//!
//! # Responsibility
//! - Define the layout-relevant projection of a note or folder entity.
//! - Own the explicit "placed" flag behind the persisted `(0,0)` marker.
//!
//! # Invariants
//! - `id` is stable and never reused for another item.
//! - `placed == false` exactly when the item has never been positioned.
//! - `has_custom_graph_position == true` makes `graph_position` authoritative.

use crate::model::geometry::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for canvas cards and graph nodes.
pub type ItemId = Uuid;

/// Default card size for freshly created items.
pub const DEFAULT_ITEM_SIZE: Size = Size::new(160.0, 120.0);
/// Smallest card size a resize may produce.
pub const MIN_ITEM_SIZE: Size = Size::new(120.0, 80.0);
/// Largest card size a resize may produce.
pub const MAX_ITEM_SIZE: Size = Size::new(640.0, 640.0);

/// Entity kind behind a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Note,
    Folder,
}

impl ItemKind {
    /// Stable storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Folder => "folder",
        }
    }

    /// Parses a storage label produced by [`ItemKind::as_str`].
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "note" => Some(Self::Note),
            "folder" => Some(Self::Folder),
            _ => None,
        }
    }
}

/// Layout projection of one note/folder entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedItem {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Card center on the canvas. Meaningful only when `placed`.
    pub position: Point,
    /// Whether initial placement (or any later position write) happened.
    pub placed: bool,
    pub size: Size,
    /// Higher renders on top.
    pub z_index: i64,
    /// Last persisted graph coordinates, separate from canvas `position`.
    pub graph_position: Option<Point>,
    /// Graph pin flag; the force layout never moves a pinned node.
    pub has_custom_graph_position: bool,
    /// Outbound links to other items. May reference unknown ids.
    pub linked_item_ids: BTreeSet<ItemId>,
}

impl PositionedItem {
    /// Creates an unplaced item with a generated id.
    pub fn new(kind: ItemKind) -> Self {
        Self::with_id(Uuid::new_v4(), kind)
    }

    /// Creates an unplaced item with a caller-provided id.
    pub fn with_id(id: ItemId, kind: ItemKind) -> Self {
        Self {
            id,
            kind,
            position: Point::ORIGIN,
            placed: false,
            size: DEFAULT_ITEM_SIZE,
            z_index: 0,
            graph_position: None,
            has_custom_graph_position: false,
            linked_item_ids: BTreeSet::new(),
        }
    }

    /// Rebuilds the placed flag from a persisted position.
    ///
    /// Stored `(0,0)` is the legacy "never positioned" marker.
    pub fn with_stored_position(mut self, position: Point) -> Self {
        self.position = position;
        self.placed = !position.is_origin();
        self
    }

    /// Moves the card and marks it placed.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.placed = true;
    }

    /// Adds an outbound link. Self links are ignored.
    pub fn link_to(&mut self, target: ItemId) -> bool {
        if target == self.id {
            return false;
        }
        self.linked_item_ids.insert(target)
    }
}
