//! SQLite-backed entity store for card layout state.
//!
//! # Responsibility
//! - Implement [`EntityStore`] over the `layout_items` and `item_links` tables.
//! - Stage layout patches in memory and flush them on `persist`.
//!
//! # Invariants
//! - `persist` applies every staged patch in one immediate transaction; on
//!   failure nothing is applied and the staged patches are kept.
//! - Stored position `(0,0)` is read back as an unplaced item.
//! - Items are listed in insertion order (`rowid ASC`).

use crate::model::geometry::{Point, Size};
use crate::model::item::{ItemId, ItemKind, PositionedItem};
use crate::store::{EntityStore, LayoutPatch, StoreError, StoreResult};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::collections::BTreeMap;
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    item_uuid,
    kind,
    position_x,
    position_y,
    width,
    height,
    z_index,
    graph_pos_x,
    graph_pos_y,
    has_custom_graph_position
FROM layout_items";

/// SQLite layout store over a migrated connection.
pub struct SqliteLayoutStore<'conn> {
    conn: &'conn mut Connection,
    pending: BTreeMap<ItemId, LayoutPatch>,
}

impl<'conn> SqliteLayoutStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `InvalidData` when the layout tables are missing.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        for table in ["layout_items", "item_links"] {
            if !table_exists(conn, table)? {
                return Err(StoreError::InvalidData(format!(
                    "layout store requires table `{table}`"
                )));
            }
        }
        Ok(Self {
            conn,
            pending: BTreeMap::new(),
        })
    }

    /// Number of items with staged, unpersisted writes.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Inserts one item row together with its outbound links.
    pub fn create_item(&mut self, item: &PositionedItem) -> StoreResult<ItemId> {
        let position = if item.placed {
            item.position
        } else {
            Point::ORIGIN
        };
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO layout_items (
                item_uuid,
                kind,
                position_x,
                position_y,
                width,
                height,
                z_index,
                graph_pos_x,
                graph_pos_y,
                has_custom_graph_position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                item.id.to_string(),
                item.kind.as_str(),
                position.x,
                position.y,
                item.size.width,
                item.size.height,
                item.z_index,
                item.graph_position.map(|point| point.x),
                item.graph_position.map(|point| point.y),
                i64::from(item.has_custom_graph_position),
            ],
        )?;
        for target in &item.linked_item_ids {
            tx.execute(
                "INSERT OR IGNORE INTO item_links (source_uuid, target_uuid) VALUES (?1, ?2);",
                params![item.id.to_string(), target.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(item.id)
    }

    /// Replaces the full outbound link set of one item.
    pub fn set_links(&mut self, id: ItemId, targets: &[ItemId]) -> StoreResult<()> {
        let id_text = id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !item_exists(&tx, &id_text)? {
            return Err(StoreError::NotFound(id));
        }
        tx.execute(
            "DELETE FROM item_links WHERE source_uuid = ?1;",
            [id_text.as_str()],
        )?;
        for target in targets.iter().filter(|target| **target != id) {
            tx.execute(
                "INSERT OR IGNORE INTO item_links (source_uuid, target_uuid) VALUES (?1, ?2);",
                params![id_text.as_str(), target.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Hard-deletes one item row; its outbound links cascade.
    pub fn delete_item(&mut self, id: ItemId) -> StoreResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM layout_items WHERE item_uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.pending.remove(&id);
        Ok(())
    }

    fn load_links(&self) -> StoreResult<BTreeMap<ItemId, Vec<ItemId>>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_uuid, target_uuid
             FROM item_links
             ORDER BY source_uuid ASC, target_uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut links: BTreeMap<ItemId, Vec<ItemId>> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let source = parse_uuid(&row.get::<_, String>(0)?)?;
            let target = parse_uuid(&row.get::<_, String>(1)?)?;
            links.entry(source).or_default().push(target);
        }
        Ok(links)
    }

    fn with_pending(&self, mut item: PositionedItem) -> PositionedItem {
        if let Some(patch) = self.pending.get(&item.id) {
            patch.apply_to(&mut item);
        }
        item
    }
}

impl EntityStore for SqliteLayoutStore<'_> {
    fn list_items(&self) -> StoreResult<Vec<PositionedItem>> {
        let mut links = self.load_links()?;
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let mut item = parse_item_row(row)?;
            if let Some(targets) = links.remove(&item.id) {
                item.linked_item_ids.extend(targets);
            }
            items.push(self.with_pending(item));
        }
        Ok(items)
    }

    fn read(&self, id: ItemId) -> StoreResult<Option<PositionedItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE item_uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let mut item = parse_item_row(row)?;

        let mut link_stmt = self.conn.prepare(
            "SELECT target_uuid FROM item_links WHERE source_uuid = ?1 ORDER BY target_uuid ASC;",
        )?;
        let mut link_rows = link_stmt.query([id.to_string()])?;
        while let Some(link_row) = link_rows.next()? {
            item.linked_item_ids
                .insert(parse_uuid(&link_row.get::<_, String>(0)?)?);
        }
        Ok(Some(self.with_pending(item)))
    }

    fn write(&mut self, id: ItemId, patch: &LayoutPatch) -> StoreResult<()> {
        if !item_exists(self.conn, &id.to_string())? {
            return Err(StoreError::NotFound(id));
        }
        self.pending.entry(id).or_default().merge(patch);
        Ok(())
    }

    fn persist(&mut self) -> StoreResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for (id, patch) in &self.pending {
            let (sql, values) = build_update(*id, patch);
            let changed = tx.execute(&sql, params_from_iter(values))?;
            if changed == 0 {
                error!("event=persist module=store status=error item={id} error_code=not_found");
                return Err(StoreError::NotFound(*id));
            }
        }
        tx.commit()?;

        debug!(
            "event=persist module=store status=ok items={}",
            self.pending.len()
        );
        self.pending.clear();
        Ok(())
    }
}

fn build_update(id: ItemId, patch: &LayoutPatch) -> (String, Vec<Value>) {
    let mut columns: Vec<(&'static str, Value)> = Vec::new();
    if let Some(position) = patch.position {
        columns.push(("position_x", Value::Real(position.x)));
        columns.push(("position_y", Value::Real(position.y)));
    }
    if let Some(size) = patch.size {
        columns.push(("width", Value::Real(size.width)));
        columns.push(("height", Value::Real(size.height)));
    }
    if let Some(z_index) = patch.z_index {
        columns.push(("z_index", Value::Integer(z_index)));
    }
    if let Some(graph_position) = patch.graph_position {
        let (x, y) = match graph_position {
            Some(point) => (Value::Real(point.x), Value::Real(point.y)),
            None => (Value::Null, Value::Null),
        };
        columns.push(("graph_pos_x", x));
        columns.push(("graph_pos_y", y));
    }
    if let Some(pinned) = patch.has_custom_graph_position {
        columns.push(("has_custom_graph_position", Value::Integer(i64::from(pinned))));
    }

    let mut sql = String::from("UPDATE layout_items SET ");
    for (index, (column, _)) in columns.iter().enumerate() {
        sql.push_str(&format!("{column} = ?{}, ", index + 1));
    }
    sql.push_str(&format!(
        "updated_at = (strftime('%s', 'now') * 1000) WHERE item_uuid = ?{};",
        columns.len() + 1
    ));

    let mut values: Vec<Value> = columns.into_iter().map(|(_, value)| value).collect();
    values.push(Value::Text(id.to_string()));
    (sql, values)
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<PositionedItem> {
    let id = parse_uuid(&row.get::<_, String>("item_uuid")?)?;
    let kind_text: String = row.get("kind")?;
    let kind = ItemKind::parse(&kind_text)
        .ok_or_else(|| StoreError::InvalidData(format!("unknown item kind `{kind_text}`")))?;
    let position = Point::new(row.get("position_x")?, row.get("position_y")?);
    let graph_x: Option<f64> = row.get("graph_pos_x")?;
    let graph_y: Option<f64> = row.get("graph_pos_y")?;
    let pinned: i64 = row.get("has_custom_graph_position")?;

    let mut item = PositionedItem::with_id(id, kind).with_stored_position(position);
    item.size = Size::new(row.get("width")?, row.get("height")?);
    item.z_index = row.get("z_index")?;
    item.graph_position = graph_x.zip(graph_y).map(|(x, y)| Point::new(x, y));
    item.has_custom_graph_position = pinned != 0;
    Ok(item)
}

fn parse_uuid(value: &str) -> StoreResult<ItemId> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}`")))
}

fn item_exists(conn: &Connection, item_uuid: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM layout_items WHERE item_uuid = ?1);",
        [item_uuid],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
