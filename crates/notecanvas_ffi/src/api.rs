//! FFI use-case API for the canvas and graph screens.
//!
//! # Responsibility
//! - Expose layout use-cases to Dart via FRB as plain structs and strings.
//! - Open the layout database per call and close it before returning.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never as panics.
//! - Item ids cross the boundary as hyphenated UUID strings.

use log::warn;
use notecanvas_core::db::open_db;
use notecanvas_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CanvasConfig, EntityStore, GraphConfig, GraphViewController, GridSnapEngine, ItemId, ItemKind,
    Point, PositionedItem, Size, SnapOutcome, SnapResolution, SpatialCanvasController,
    SqliteLayoutStore, Vector,
};
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const LAYOUT_DB_FILE_NAME: &str = "notecanvas_layout.sqlite3";
static LAYOUT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Card projection returned to the canvas screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasCard {
    pub item_id: String,
    /// `note|folder`.
    pub kind: String,
    pub x: f64,
    pub y: f64,
    /// `false` until initial placement ran for this card.
    pub placed: bool,
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
}

/// Canvas snapshot envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSnapshot {
    pub ok: bool,
    /// Cards in insertion order.
    pub cards: Vec<CanvasCard>,
    pub message: String,
}

/// Neighbor card center used by pure drop resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborCard {
    pub item_id: String,
    pub x: f64,
    pub y: f64,
}

/// Resolved drop target.
#[derive(Debug, Clone, PartialEq)]
pub struct DropResolution {
    pub ok: bool,
    pub x: f64,
    pub y: f64,
    /// `stack|left|right|above|below|grid`, empty on failure.
    pub outcome: String,
    /// Neighbor the card stacked on or attached to.
    pub target_id: Option<String>,
    pub message: String,
}

impl DropResolution {
    fn resolved(resolution: SnapResolution) -> Self {
        let (outcome, target_id) = match resolution.outcome {
            SnapOutcome::Stack(id) => ("stack", Some(id.to_string())),
            SnapOutcome::Edge(id, edge) => (edge.as_str(), Some(id.to_string())),
            SnapOutcome::Grid => ("grid", None),
        };
        Self {
            ok: true,
            x: resolution.point.x,
            y: resolution.point.y,
            outcome: outcome.to_string(),
            target_id,
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            x: 0.0,
            y: 0.0,
            outcome: String::new(),
            target_id: None,
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutActionResponse {
    pub ok: bool,
    /// Item the action created or touched.
    pub item_id: Option<String>,
    pub message: String,
}

impl LayoutActionResponse {
    fn success(message: impl Into<String>, item_id: Option<String>) -> Self {
        Self {
            ok: true,
            item_id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            message: message.into(),
        }
    }
}

/// Graph node projection returned to the graph screen.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNodeView {
    pub item_id: String,
    pub x: f64,
    pub y: f64,
    /// Render radius grown by link degree.
    pub radius: f64,
    pub pinned: bool,
}

/// Undirected graph edge between two known nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdgeView {
    pub source_id: String,
    pub target_id: String,
}

/// Graph snapshot envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    pub ok: bool,
    pub nodes: Vec<GraphNodeView>,
    pub edges: Vec<GraphEdgeView>,
    pub message: String,
}

impl GraphSnapshot {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            message: message.into(),
        }
    }
}

/// Resolves a drop point against neighbor cards without touching storage.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Neighbors with unparsable ids are skipped.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_resolve_drop(
    dragged_id: String,
    x: f64,
    y: f64,
    neighbors: Vec<NeighborCard>,
    item_width: f64,
    item_height: f64,
    screen_width: f64,
) -> DropResolution {
    let excluding = parse_item_id(&dragged_id).unwrap_or_else(|_| Uuid::nil());
    let neighbors: Vec<(ItemId, Point)> = neighbors
        .iter()
        .filter_map(|neighbor| {
            parse_item_id(&neighbor.item_id)
                .ok()
                .map(|id| (id, Point::new(neighbor.x, neighbor.y)))
        })
        .collect();
    let resolution = GridSnapEngine::default().resolve(
        Point::new(x, y),
        &neighbors,
        excluding,
        Size::new(item_width, item_height),
        screen_width,
    );
    DropResolution::resolved(resolution)
}

/// Lists every card on the canvas.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_list_items() -> CanvasSnapshot {
    match with_layout_store(|store| store.list_items().map_err(|err| err.to_string())) {
        Ok(items) => canvas_snapshot(&items, format!("{} card(s).", items.len())),
        Err(err) => canvas_failure(format!("canvas_list_items failed: {err}")),
    }
}

/// Creates a note or folder card in front of every existing card.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - `kind` is `note|folder`; anything else is rejected.
/// - The new card stays unplaced until `canvas_place_unplaced` runs.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_create_item(kind: String) -> LayoutActionResponse {
    let Some(kind) = ItemKind::parse(kind.trim()) else {
        return LayoutActionResponse::failure(format!(
            "canvas_create_item failed: unsupported kind `{}`",
            kind.trim()
        ));
    };
    let item = PositionedItem::new(kind);
    let result = with_layout_store(|store| {
        store
            .create_item(&item)
            .map_err(|err| err.to_string())?;
        let mut canvas = SpatialCanvasController::load(store, CanvasConfig::default())
            .map_err(|err| err.to_string())?;
        Ok(canvas.insert_new_item(item))
    });
    match result {
        Ok(id) => LayoutActionResponse::success("Item created.", Some(id.to_string())),
        Err(err) => LayoutActionResponse::failure(format!("canvas_create_item failed: {err}")),
    }
}

/// Seeds every unplaced card onto the placement grid and returns the canvas.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_place_unplaced(screen_width: f64) -> CanvasSnapshot {
    let result = with_canvas(screen_width, |canvas| {
        let placed = canvas.place_unplaced_items();
        Ok((canvas.items().to_vec(), placed))
    });
    match result {
        Ok((items, placed)) => canvas_snapshot(&items, format!("Placed {placed} card(s).")),
        Err(err) => canvas_failure(format!("canvas_place_unplaced failed: {err}")),
    }
}

/// Drops a card at `(x, y)`, snapping and promoting it like a finished drag.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Returns the persisted resolution, or a failure envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_drop_item(item_id: String, x: f64, y: f64, screen_width: f64) -> DropResolution {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_canvas(screen_width, |canvas| {
            canvas
                .drop_item(id, Point::new(x, y))
                .ok_or_else(|| format!("unknown item `{id}`"))
        })
    });
    match result {
        Ok(resolution) => DropResolution::resolved(resolution),
        Err(err) => DropResolution::failure(format!("canvas_drop_item failed: {err}")),
    }
}

/// Brings a card to the front. Already-frontmost cards are left untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_bring_to_front(item_id: String) -> LayoutActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_canvas(CanvasConfig::default().screen_width, |canvas| {
            if canvas.item(id).is_none() {
                return Err(format!("unknown item `{id}`"));
            }
            Ok((id, canvas.bring_to_front(id)))
        })
    });
    match result {
        Ok((id, true)) => LayoutActionResponse::success("Item promoted.", Some(id.to_string())),
        Ok((id, false)) => {
            LayoutActionResponse::success("Item already in front.", Some(id.to_string()))
        }
        Err(err) => LayoutActionResponse::failure(format!("canvas_bring_to_front failed: {err}")),
    }
}

/// Resizes a card; the size is clamped to the card size bounds.
#[flutter_rust_bridge::frb(sync)]
pub fn canvas_resize_item(item_id: String, width: f64, height: f64) -> LayoutActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_canvas(CanvasConfig::default().screen_width, |canvas| {
            let base = canvas
                .item(id)
                .map(|item| item.size)
                .ok_or_else(|| format!("unknown item `{id}`"))?;
            canvas.begin_resize(id);
            canvas.update_resize(Vector::new(width - base.width, height - base.height));
            canvas
                .end_resize()
                .map(|size| (id, size))
                .ok_or_else(|| format!("resize of `{id}` was interrupted"))
        })
    });
    match result {
        Ok((id, size)) => LayoutActionResponse::success(
            format!("Resized to {:.0}x{:.0}.", size.width, size.height),
            Some(id.to_string()),
        ),
        Err(err) => LayoutActionResponse::failure(format!("canvas_resize_item failed: {err}")),
    }
}

/// Replaces the outbound links of one item.
///
/// Targets need not exist; unknown targets are kept and ignored by the graph.
#[flutter_rust_bridge::frb(sync)]
pub fn item_set_links(item_id: String, target_ids: Vec<String>) -> LayoutActionResponse {
    let result = parse_item_id(&item_id).and_then(|id| {
        let targets = target_ids
            .iter()
            .map(|target| parse_item_id(target))
            .collect::<Result<Vec<_>, _>>()?;
        with_layout_store(|store| {
            store
                .set_links(id, &targets)
                .map(|()| id)
                .map_err(|err| err.to_string())
        })
    });
    match result {
        Ok(id) => LayoutActionResponse::success("Links updated.", Some(id.to_string())),
        Err(err) => LayoutActionResponse::failure(format!("item_set_links failed: {err}")),
    }
}

/// Runs the force layout and returns the laid-out graph.
///
/// # FFI contract
/// - Sync call, DB-backed; cost grows with the square of the node count.
/// - Pinned nodes keep their coordinates.
#[flutter_rust_bridge::frb(sync)]
pub fn graph_run_layout() -> GraphSnapshot {
    match with_graph(|graph| {
        graph.run_layout();
        Ok(graph_snapshot(graph))
    }) {
        Ok(snapshot) => snapshot,
        Err(err) => GraphSnapshot::failure(format!("graph_run_layout failed: {err}")),
    }
}

/// Pins a node at world coordinates `(x, y)`.
#[flutter_rust_bridge::frb(sync)]
pub fn graph_pin_node(item_id: String, x: f64, y: f64) -> GraphSnapshot {
    let result = parse_item_id(&item_id).and_then(|id| {
        with_graph(|graph| {
            if graph.position(id).is_none() {
                graph.run_layout();
            }
            let base = graph
                .position(id)
                .ok_or_else(|| format!("unknown item `{id}`"))?;
            let scale = graph.camera().scale();
            graph.begin_node_drag(id);
            graph.update_node_drag((Point::new(x, y) - base) * scale);
            graph.end_node_drag();
            Ok(graph_snapshot(graph))
        })
    });
    match result {
        Ok(snapshot) => snapshot,
        Err(err) => GraphSnapshot::failure(format!("graph_pin_node failed: {err}")),
    }
}

/// Clears every pin and re-runs the layout.
#[flutter_rust_bridge::frb(sync)]
pub fn graph_reset_to_automatic() -> GraphSnapshot {
    match with_graph(|graph| {
        graph.reset_to_automatic();
        Ok(graph_snapshot(graph))
    }) {
        Ok(snapshot) => snapshot,
        Err(err) => GraphSnapshot::failure(format!("graph_reset_to_automatic failed: {err}")),
    }
}

fn resolve_layout_db_path() -> PathBuf {
    LAYOUT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("NOTECANVAS_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LAYOUT_DB_FILE_NAME)
        })
        .clone()
}

fn with_layout_store<T>(
    f: impl FnOnce(&mut SqliteLayoutStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_layout_db_path();
    let mut conn = open_db(&db_path).map_err(|err| format!("layout DB open failed: {err}"))?;
    let mut store = SqliteLayoutStore::try_new(&mut conn)
        .map_err(|err| format!("layout store init failed: {err}"))?;
    let outcome = f(&mut store);
    if store.pending_writes() > 0 {
        warn!(
            "event=ffi_call module=ffi status=error error_code=unpersisted_writes pending={}",
            store.pending_writes()
        );
    }
    outcome
}

fn with_canvas<T>(
    screen_width: f64,
    f: impl FnOnce(&mut SpatialCanvasController<&mut SqliteLayoutStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_layout_store(|store| {
        let mut canvas = SpatialCanvasController::load(store, CanvasConfig::default())
            .map_err(|err| err.to_string())?;
        canvas.set_screen_width(screen_width);
        f(&mut canvas)
    })
}

fn with_graph<T>(
    f: impl FnOnce(&mut GraphViewController<&mut SqliteLayoutStore<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    with_layout_store(|store| {
        let mut graph =
            GraphViewController::load(store, GraphConfig::default()).map_err(|err| err.to_string())?;
        f(&mut graph)
    })
}

fn parse_item_id(raw: &str) -> Result<ItemId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid item id `{}`", raw.trim()))
}

fn canvas_snapshot(items: &[PositionedItem], message: String) -> CanvasSnapshot {
    CanvasSnapshot {
        ok: true,
        cards: items.iter().map(to_canvas_card).collect(),
        message,
    }
}

fn canvas_failure(message: String) -> CanvasSnapshot {
    CanvasSnapshot {
        ok: false,
        cards: Vec::new(),
        message,
    }
}

fn to_canvas_card(item: &PositionedItem) -> CanvasCard {
    CanvasCard {
        item_id: item.id.to_string(),
        kind: item.kind.as_str().to_string(),
        x: item.position.x,
        y: item.position.y,
        placed: item.placed,
        width: item.size.width,
        height: item.size.height,
        z_index: item.z_index,
    }
}

fn graph_snapshot<S: EntityStore>(graph: &GraphViewController<S>) -> GraphSnapshot {
    let nodes = graph
        .positions()
        .iter()
        .map(|(id, point)| GraphNodeView {
            item_id: id.to_string(),
            x: point.x,
            y: point.y,
            radius: graph.node_radius(*id),
            pinned: graph
                .node(*id)
                .is_some_and(|item| item.has_custom_graph_position),
        })
        .collect::<Vec<_>>();
    let edges = graph
        .edges()
        .into_iter()
        .map(|edge| GraphEdgeView {
            source_id: edge.source.to_string(),
            target_id: edge.target.to_string(),
        })
        .collect::<Vec<_>>();
    GraphSnapshot {
        ok: true,
        message: format!("{} node(s), {} edge(s).", nodes.len(), edges.len()),
        nodes,
        edges,
    }
}
