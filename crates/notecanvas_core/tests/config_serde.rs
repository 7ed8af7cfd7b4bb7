use notecanvas_core::{CanvasConfig, ForceConfig, GraphConfig, Point, PositionedItem, SnapConfig};

#[test]
fn partial_canvas_config_keeps_defaults() {
    let config: CanvasConfig = serde_json::from_str(
        r#"{ "screen_width": 820.0, "snap": { "grid_width": 40.0 } }"#,
    )
    .expect("partial config should decode");

    assert_eq!(config.screen_width, 820.0);
    assert_eq!(config.snap.grid_width, 40.0);
    assert_eq!(config.snap.grid_height, SnapConfig::default().grid_height);
    assert_eq!(config.drag_threshold, CanvasConfig::default().drag_threshold);
    assert_eq!(config.placement_origin, Point::new(100.0, 180.0));
}

#[test]
fn partial_graph_config_keeps_defaults() {
    let config: GraphConfig =
        serde_json::from_str(r#"{ "max_scale": 3.0, "force": { "iterations": 40 } }"#)
            .expect("config should decode");

    assert_eq!(config.max_scale, 3.0);
    assert_eq!(config.min_scale, 0.4);
    assert_eq!(config.force.iterations, 40);
    assert_eq!(config.force.cooling, ForceConfig::default().cooling);
}

#[test]
fn empty_object_is_the_default_config() {
    let canvas: CanvasConfig = serde_json::from_str("{}").expect("config should decode");
    let graph: GraphConfig = serde_json::from_str("{}").expect("config should decode");
    assert_eq!(canvas, CanvasConfig::default());
    assert_eq!(graph, GraphConfig::default());
}

#[test]
fn positioned_item_serializes_kind_as_label() {
    let item = PositionedItem::new(notecanvas_core::ItemKind::Folder);
    let value = serde_json::to_value(&item).expect("item should encode");
    assert_eq!(value["kind"], "folder");
    assert_eq!(value["placed"], false);
    assert!(value["graph_position"].is_null());
}
