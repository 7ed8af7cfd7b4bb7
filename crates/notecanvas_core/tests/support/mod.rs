#![allow(dead_code)]

use notecanvas_core::{
    EntityStore, ItemId, ItemKind, LayoutPatch, Point, PositionedItem, Size, StoreError,
    StoreResult,
};

/// In-memory store that records every write and persist call.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub items: Vec<PositionedItem>,
    pub writes: Vec<(ItemId, LayoutPatch)>,
    pub persist_calls: usize,
    pub fail_persist: bool,
}

impl RecordingStore {
    pub fn with_items(items: Vec<PositionedItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_persist: true,
            ..Self::default()
        }
    }

    pub fn position_writes(&self, id: ItemId) -> Vec<Point> {
        self.writes
            .iter()
            .filter(|(target, _)| *target == id)
            .filter_map(|(_, patch)| patch.position)
            .collect()
    }
}

impl EntityStore for RecordingStore {
    fn list_items(&self) -> StoreResult<Vec<PositionedItem>> {
        Ok(self.items.clone())
    }

    fn read(&self, id: ItemId) -> StoreResult<Option<PositionedItem>> {
        Ok(self.items.iter().find(|item| item.id == id).cloned())
    }

    fn write(&mut self, id: ItemId, patch: &LayoutPatch) -> StoreResult<()> {
        self.writes.push((id, *patch));
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            patch.apply_to(item);
        }
        Ok(())
    }

    fn persist(&mut self) -> StoreResult<()> {
        self.persist_calls += 1;
        if self.fail_persist {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

/// Placed note card centered at `(x, y)`.
pub fn card_at(x: f64, y: f64, z_index: i64) -> PositionedItem {
    let mut item = PositionedItem::new(ItemKind::Note);
    item.set_position(Point::new(x, y));
    item.size = Size::new(160.0, 120.0);
    item.z_index = z_index;
    item
}

pub fn assert_close(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-6 && (actual.y - expected.y).abs() < 1e-6,
        "expected {expected:?}, got {actual:?}"
    );
}
