//! Entity store contract consumed by the layout controllers.
//!
//! # Responsibility
//! - Describe the minimal read/write/persist surface the layout core needs.
//! - Keep storage technology out of canvas and graph controllers.
//!
//! # Invariants
//! - `write` stages a patch; nothing is durable until `persist` succeeds.
//! - Staged patches for the same item merge with last-write-wins per field.
//! - Controllers treat `persist` as best-effort and never roll back memory.

use crate::db::DbError;
use crate::model::geometry::{Point, Size};
use crate::model::item::{ItemId, PositionedItem};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by entity store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target item does not exist in the store.
    NotFound(ItemId),
    /// Persisted data cannot be converted into a valid item.
    InvalidData(String),
    /// Store is temporarily unable to accept writes.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "layout item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid layout data: {message}"),
            Self::Unavailable(message) => write!(f, "entity store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Partial update of the layout fields of one item.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LayoutPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub z_index: Option<i64>,
    /// `Some(None)` clears stored graph coordinates.
    pub graph_position: Option<Option<Point>>,
    pub has_custom_graph_position: Option<bool>,
}

impl LayoutPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Graph coordinates together with the pin flag.
    pub fn graph(position: Point, pinned: bool) -> Self {
        Self {
            graph_position: Some(Some(position)),
            has_custom_graph_position: Some(pinned),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Folds `later` into `self`; fields set in `later` win.
    pub fn merge(&mut self, later: &LayoutPatch) {
        if later.position.is_some() {
            self.position = later.position;
        }
        if later.size.is_some() {
            self.size = later.size;
        }
        if later.z_index.is_some() {
            self.z_index = later.z_index;
        }
        if later.graph_position.is_some() {
            self.graph_position = later.graph_position;
        }
        if later.has_custom_graph_position.is_some() {
            self.has_custom_graph_position = later.has_custom_graph_position;
        }
    }

    /// Applies the set fields onto an in-memory item.
    pub fn apply_to(&self, item: &mut PositionedItem) {
        if let Some(position) = self.position {
            item.set_position(position);
        }
        if let Some(size) = self.size {
            item.size = size;
        }
        if let Some(z_index) = self.z_index {
            item.z_index = z_index;
        }
        if let Some(graph_position) = self.graph_position {
            item.graph_position = graph_position;
        }
        if let Some(pinned) = self.has_custom_graph_position {
            item.has_custom_graph_position = pinned;
        }
    }
}

/// Accessor/mutator contract between the layout core and its data layer.
pub trait EntityStore {
    /// Lists every active item with its layout fields and outbound links.
    fn list_items(&self) -> StoreResult<Vec<PositionedItem>>;
    /// Reads one item, including staged but unpersisted writes.
    fn read(&self, id: ItemId) -> StoreResult<Option<PositionedItem>>;
    /// Stages a layout patch for one item.
    fn write(&mut self, id: ItemId, patch: &LayoutPatch) -> StoreResult<()>;
    /// Makes staged writes durable.
    fn persist(&mut self) -> StoreResult<()>;
}

impl<S: EntityStore + ?Sized> EntityStore for &mut S {
    fn list_items(&self) -> StoreResult<Vec<PositionedItem>> {
        (**self).list_items()
    }

    fn read(&self, id: ItemId) -> StoreResult<Option<PositionedItem>> {
        (**self).read(id)
    }

    fn write(&mut self, id: ItemId, patch: &LayoutPatch) -> StoreResult<()> {
        (**self).write(id, patch)
    }

    fn persist(&mut self) -> StoreResult<()> {
        (**self).persist()
    }
}
