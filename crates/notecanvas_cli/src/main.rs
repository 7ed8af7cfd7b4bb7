//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notecanvas_core` linkage.
//! - Run one deterministic canvas + graph pass over an in-memory database.

use notecanvas_core::db::open_db_in_memory;
use notecanvas_core::{
    CanvasConfig, GraphConfig, GraphViewController, ItemKind, Point, PositionedItem,
    SpatialCanvasController, SqliteLayoutStore,
};
use std::error::Error;

fn main() {
    println!("notecanvas_core ping={}", notecanvas_core::ping());
    println!("notecanvas_core version={}", notecanvas_core::core_version());

    if let Err(err) = run_demo() {
        eprintln!("demo failed: {err}");
        std::process::exit(1);
    }
}

fn run_demo() -> Result<(), Box<dyn Error>> {
    let mut conn = open_db_in_memory()?;
    let mut store = SqliteLayoutStore::try_new(&mut conn)?;

    let mut items: Vec<PositionedItem> = (0..4).map(|_| PositionedItem::new(ItemKind::Note)).collect();
    items.push(PositionedItem::new(ItemKind::Folder));
    for index in 0..items.len() - 1 {
        let target = items[index + 1].id;
        items[index].link_to(target);
    }
    for item in &items {
        store.create_item(item)?;
    }

    {
        let mut canvas = SpatialCanvasController::load(&mut store, CanvasConfig::default())?;
        canvas.place_unplaced_items();
        if let Some(resolution) = canvas.drop_item(items[0].id, Point::new(237.0, 500.0)) {
            println!(
                "drop item={} snap={} x={:.1} y={:.1}",
                items[0].id,
                resolution.outcome.label(),
                resolution.point.x,
                resolution.point.y
            );
        }
        for item in canvas.items() {
            println!(
                "card item={} kind={} x={:.1} y={:.1} z={}",
                item.id,
                item.kind.as_str(),
                item.position.x,
                item.position.y,
                item.z_index
            );
        }
    }

    let mut graph = GraphViewController::load(&mut store, GraphConfig::default())?;
    graph.run_layout();
    for (id, point) in graph.positions() {
        println!(
            "node item={id} x={:.1} y={:.1} radius={:.1}",
            point.x,
            point.y,
            graph.node_radius(*id)
        );
    }
    Ok(())
}
