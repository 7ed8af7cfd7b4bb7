//! Layout core for NoteCanvas.
//! Owns canvas placement, drag snapping, z-order and link graph layout.

pub mod canvas;
pub mod db;
pub mod graph;
pub mod logging;
pub mod model;
pub mod repo;
pub mod store;

pub use canvas::controller::{CanvasConfig, DragUpdate, SpatialCanvasController};
pub use canvas::gesture::{GestureEvent, GesturePhase};
pub use canvas::snap::{GridSnapEngine, SnapConfig, SnapEdge, SnapOutcome, SnapResolution};
pub use graph::camera::Camera;
pub use graph::force::{ForceConfig, ForceLayoutEngine, GraphEdge, GraphNode};
pub use graph::view::{GraphConfig, GraphViewController};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::geometry::{Point, Rect, Size, Vector};
pub use model::item::{ItemId, ItemKind, PositionedItem};
pub use repo::layout_repo::SqliteLayoutStore;
pub use store::{EntityStore, LayoutPatch, StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
