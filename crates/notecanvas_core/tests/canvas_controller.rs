mod support;

use notecanvas_core::{
    CanvasConfig, DragUpdate, GestureEvent, ItemKind, Point, PositionedItem, Size,
    SnapOutcome, SpatialCanvasController, Vector,
};
use support::{assert_close, card_at, RecordingStore};

fn wide_config() -> CanvasConfig {
    CanvasConfig {
        screen_width: 800.0,
        ..CanvasConfig::default()
    }
}

fn controller_with(items: Vec<PositionedItem>) -> SpatialCanvasController<RecordingStore> {
    SpatialCanvasController::load(RecordingStore::with_items(items), wide_config())
        .expect("recording store should load")
}

#[test]
fn promoting_frontmost_item_is_a_no_op() {
    let back = card_at(200.0, 300.0, 0);
    let front = card_at(500.0, 300.0, 1);
    let (back_id, front_id) = (back.id, front.id);
    let mut controller = controller_with(vec![back, front]);

    assert!(!controller.bring_to_front(front_id));
    assert_eq!(controller.store().persist_calls, 0);

    assert!(controller.bring_to_front(back_id));
    assert_eq!(controller.item(back_id).expect("item should exist").z_index, 2);
    assert_eq!(controller.store().persist_calls, 1);

    assert!(!controller.bring_to_front(back_id));
    assert!(!controller.bring_to_front(back_id));
    assert_eq!(controller.item(back_id).expect("item should exist").z_index, 2);
    assert_eq!(controller.store().persist_calls, 1);
    assert_eq!(controller.store().writes.len(), 1);
}

#[test]
fn promoting_item_tied_at_maximum_makes_it_unique() {
    let first = card_at(200.0, 300.0, 3);
    let second = card_at(500.0, 300.0, 3);
    let first_id = first.id;
    let mut controller = controller_with(vec![first, second]);

    assert!(controller.bring_to_front(first_id));
    assert_eq!(controller.item(first_id).expect("item should exist").z_index, 4);
    assert_eq!(controller.front_z_index(), 5);
}

#[test]
fn drag_settles_through_grid_snap_and_persists_once() {
    let card = card_at(200.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);
    let start = Point::new(210.0, 310.0);

    assert_eq!(
        controller.handle_gesture(GestureEvent::began(start)),
        DragUpdate::Ignored
    );
    assert_eq!(
        controller.handle_gesture(GestureEvent::changed(start, Vector::new(4.0, 3.0))),
        DragUpdate::Ignored
    );

    let moved = controller.handle_gesture(GestureEvent::changed(start, Vector::new(37.0, 200.0)));
    assert_eq!(
        moved,
        DragUpdate::Moved {
            id,
            display_position: Point::new(237.0, 500.0),
        }
    );
    assert_close(controller.display_position(id)
        .expect("item should exist"), Point::new(237.0, 500.0));
    assert_close(controller.item(id)
        .expect("item should exist").position, Point::new(200.0, 300.0));
    assert!(controller.store().writes.is_empty());

    let settled = controller.handle_gesture(GestureEvent::ended(start, Vector::new(37.0, 200.0)));
    match settled {
        DragUpdate::Settled { id: settled_id, resolution } => {
            assert_eq!(settled_id, id);
            assert_eq!(resolution.outcome, SnapOutcome::Grid);
            assert_close(resolution.point, Point::new(240.0, 480.0));
        }
        other => panic!("unexpected update: {other:?}"),
    }
    assert_close(controller.item(id)
        .expect("item should exist").position, Point::new(240.0, 480.0));
    assert_eq!(controller.store().position_writes(id), vec![Point::new(240.0, 480.0)]);
    assert_eq!(controller.store().persist_calls, 1);
    assert!(!controller.is_dragging());
}

#[test]
fn cancelled_drag_leaves_model_untouched() {
    let card = card_at(200.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);
    let start = Point::new(200.0, 300.0);

    controller.handle_gesture(GestureEvent::began(start));
    controller.handle_gesture(GestureEvent::changed(start, Vector::new(50.0, 50.0)));
    assert_eq!(
        controller.handle_gesture(GestureEvent::cancelled(start)),
        DragUpdate::Cancelled { id }
    );

    assert_close(controller.item(id)
        .expect("item should exist").position, Point::new(200.0, 300.0));
    assert_close(controller.display_position(id)
        .expect("item should exist"), Point::new(200.0, 300.0));
    assert!(controller.store().writes.is_empty());
    assert_eq!(controller.store().persist_calls, 0);
}

#[test]
fn drag_starting_on_empty_canvas_never_drags() {
    let card = card_at(200.0, 300.0, 0);
    let mut controller = controller_with(vec![card]);
    let start = Point::new(700.0, 900.0);

    controller.handle_gesture(GestureEvent::began(start));
    assert_eq!(
        controller.handle_gesture(GestureEvent::changed(start, Vector::new(-500.0, -600.0))),
        DragUpdate::Ignored
    );
    assert!(!controller.is_dragging());
    assert_eq!(
        controller.handle_gesture(GestureEvent::ended(start, Vector::new(-500.0, -600.0))),
        DragUpdate::Ignored
    );
    assert!(controller.store().writes.is_empty());
}

#[test]
fn open_overlay_blocks_drag_start() {
    let card = card_at(200.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);
    let start = Point::new(200.0, 300.0);

    controller.set_overlay_open(true);
    controller.handle_gesture(GestureEvent::began(start));
    assert_eq!(
        controller.handle_gesture(GestureEvent::changed(start, Vector::new(40.0, 0.0))),
        DragUpdate::Ignored
    );

    controller.set_overlay_open(false);
    assert_eq!(
        controller.handle_gesture(GestureEvent::changed(start, Vector::new(60.0, 0.0))),
        DragUpdate::Moved {
            id,
            display_position: Point::new(260.0, 300.0),
        }
    );
}

#[test]
fn hit_test_prefers_highest_z_then_latest_insertion() {
    let lower = card_at(200.0, 300.0, 5);
    let upper = card_at(220.0, 310.0, 7);
    let (lower_id, upper_id) = (lower.id, upper.id);
    let controller = controller_with(vec![lower, upper]);
    assert_eq!(controller.hit_test(Point::new(210.0, 305.0)), Some(upper_id));
    assert_eq!(controller.hit_test(Point::new(125.0, 300.0)), Some(lower_id));
    assert_eq!(controller.hit_test(Point::new(20.0, 20.0)), None);

    let first = card_at(200.0, 300.0, 1);
    let second = card_at(200.0, 300.0, 1);
    let second_id = second.id;
    let controller = controller_with(vec![first, second]);
    assert_eq!(controller.hit_test(Point::new(200.0, 300.0)), Some(second_id));
}

#[test]
fn drag_start_promotes_touched_item_and_stacks_on_neighbor() {
    let anchor = card_at(200.0, 300.0, 1);
    let moving = card_at(500.0, 300.0, 0);
    let (anchor_id, moving_id) = (anchor.id, moving.id);
    let mut controller = controller_with(vec![anchor, moving]);
    let start = Point::new(500.0, 300.0);

    controller.handle_gesture(GestureEvent::began(start));
    controller.handle_gesture(GestureEvent::changed(start, Vector::new(-100.0, 0.0)));
    assert_eq!(controller.item(moving_id).expect("item should exist").z_index, 2);
    assert_eq!(controller.store().persist_calls, 0);
    assert!(controller.store().writes.is_empty());

    let settled = controller.handle_gesture(GestureEvent::ended(start, Vector::new(-290.0, 5.0)));
    match settled {
        DragUpdate::Settled { resolution, .. } => {
            assert_eq!(resolution.outcome, SnapOutcome::Stack(anchor_id));
            assert_close(resolution.point, Point::new(200.0, 300.0));
        }
        other => panic!("unexpected update: {other:?}"),
    }
    assert_eq!(controller.items_near(Point::new(200.0, 300.0), 4.0), 2);
    assert_eq!(controller.hit_test(Point::new(200.0, 300.0)), Some(moving_id));

    let writes = &controller.store().writes;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, moving_id);
    assert_eq!(writes[0].1.position, Some(Point::new(200.0, 300.0)));
    assert_eq!(writes[0].1.z_index, Some(2));
    assert_eq!(controller.store().persist_calls, 1);
}

#[test]
fn cancelled_drag_restores_z_order_without_writes() {
    let front = card_at(200.0, 300.0, 5);
    let back = card_at(500.0, 300.0, 0);
    let (front_id, back_id) = (front.id, back.id);
    let mut controller = controller_with(vec![front, back]);
    let start = Point::new(500.0, 300.0);

    controller.handle_gesture(GestureEvent::began(start));
    controller.handle_gesture(GestureEvent::changed(start, Vector::new(50.0, 0.0)));
    assert_eq!(controller.item(back_id).expect("item should exist").z_index, 6);

    assert_eq!(
        controller.handle_gesture(GestureEvent::cancelled(start)),
        DragUpdate::Cancelled { id: back_id }
    );
    assert_eq!(controller.item(back_id).expect("item should exist").z_index, 0);
    assert_eq!(controller.item(front_id).expect("item should exist").z_index, 5);
    assert_close(
        controller.item(back_id).expect("item should exist").position,
        Point::new(500.0, 300.0),
    );
    assert_eq!(controller.front_z_index(), 6);
    assert!(controller.store().writes.is_empty());
    assert_eq!(controller.store().persist_calls, 0);
}

#[test]
fn promotion_at_maximum_z_index_saturates() {
    let top = card_at(200.0, 300.0, i64::MAX);
    let bottom = card_at(500.0, 300.0, 0);
    let bottom_id = bottom.id;
    let mut controller = controller_with(vec![top, bottom]);

    assert_eq!(controller.front_z_index(), i64::MAX);
    assert!(controller.bring_to_front(bottom_id));
    assert_eq!(controller.item(bottom_id).expect("item should exist").z_index, i64::MAX);

    let fresh = controller.insert_new_item(PositionedItem::new(ItemKind::Note));
    assert_eq!(controller.item(fresh).expect("item should exist").z_index, i64::MAX);
}

#[test]
fn screen_width_change_moves_the_clamp() {
    let card = card_at(200.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);

    controller.set_screen_width(390.0);
    assert_eq!(controller.config().screen_width, 390.0);
    let resolution = controller
        .drop_item(id, Point::new(5000.0, 300.0))
        .expect("known item should drop");
    assert_close(resolution.point, Point::new(290.0, 300.0));
}

#[test]
fn initial_placement_fills_rows_left_to_right() {
    let placed = card_at(600.0, 600.0, 0);
    let placed_id = placed.id;
    let mut items = vec![placed];
    items.extend((0..5).map(|_| PositionedItem::new(ItemKind::Note)));
    let unplaced: Vec<_> = items[1..].iter().map(|item| item.id).collect();

    let mut controller = SpatialCanvasController::load(
        RecordingStore::with_items(items),
        CanvasConfig::default(),
    )
    .expect("recording store should load");

    assert_eq!(controller.place_unplaced_items(), 5);
    let expected = [
        Point::new(100.0, 180.0),
        Point::new(280.0, 180.0),
        Point::new(100.0, 320.0),
        Point::new(280.0, 320.0),
        Point::new(100.0, 460.0),
    ];
    for (id, expected) in unplaced.iter().zip(expected) {
        let item = controller.item(*id).expect("item should exist");
        assert!(item.placed);
        assert_close(item.position, expected);
    }
    assert_close(controller.item(placed_id)
        .expect("item should exist").position, Point::new(600.0, 600.0));
    assert_eq!(controller.store().persist_calls, 1);
    assert_eq!(controller.store().writes.len(), 5);

    assert_eq!(controller.place_unplaced_items(), 0);
    assert_eq!(controller.store().persist_calls, 1);
}

#[test]
fn initial_placement_uses_single_column_on_narrow_screen() {
    let items: Vec<_> = (0..2).map(|_| PositionedItem::new(ItemKind::Folder)).collect();
    let ids: Vec<_> = items.iter().map(|item| item.id).collect();
    let mut controller = SpatialCanvasController::load(
        RecordingStore::with_items(items),
        CanvasConfig {
            screen_width: 100.0,
            ..CanvasConfig::default()
        },
    )
    .expect("recording store should load");

    controller.place_unplaced_items();
    assert_close(controller.item(ids[0])
        .expect("item should exist").position, Point::new(100.0, 180.0));
    assert_close(controller.item(ids[1])
        .expect("item should exist").position, Point::new(100.0, 320.0));
}

#[test]
fn resize_clamps_every_update_and_persists_on_release() {
    let card = card_at(300.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);

    assert!(controller.begin_resize(id));
    assert_eq!(
        controller.update_resize(Vector::new(-100.0, -100.0)),
        Some(Size::new(120.0, 80.0))
    );
    assert_eq!(controller.item(id).expect("item should exist").size, Size::new(120.0, 80.0));
    assert_eq!(
        controller.update_resize(Vector::new(1000.0, 10.0)),
        Some(Size::new(640.0, 130.0))
    );
    assert!(controller.store().writes.is_empty());

    assert_eq!(controller.end_resize(), Some(Size::new(640.0, 130.0)));
    assert_eq!(controller.store().persist_calls, 1);
    assert_eq!(
        controller.store().writes.last().and_then(|(_, patch)| patch.size),
        Some(Size::new(640.0, 130.0))
    );
    assert_eq!(controller.update_resize(Vector::new(5.0, 5.0)), None);
}

#[test]
fn cancelled_resize_restores_original_size() {
    let card = card_at(300.0, 300.0, 0);
    let id = card.id;
    let mut controller = controller_with(vec![card]);

    controller.begin_resize(id);
    controller.update_resize(Vector::new(80.0, 40.0));
    controller.cancel_resize();

    assert_eq!(controller.item(id).expect("item should exist").size, Size::new(160.0, 120.0));
    assert_eq!(controller.store().persist_calls, 0);
}

#[test]
fn persist_failure_keeps_in_memory_layout() {
    let card = card_at(200.0, 300.0, 0);
    let id = card.id;
    let mut store = RecordingStore::failing();
    store.items.push(card);
    let mut controller = SpatialCanvasController::load(store, wide_config())
        .expect("failing store still lists");
    let start = Point::new(200.0, 300.0);

    controller.handle_gesture(GestureEvent::began(start));
    controller.handle_gesture(GestureEvent::changed(start, Vector::new(37.0, 200.0)));
    let settled = controller.handle_gesture(GestureEvent::ended(start, Vector::new(37.0, 200.0)));

    assert!(matches!(settled, DragUpdate::Settled { .. }));
    assert_close(controller.item(id)
        .expect("item should exist").position, Point::new(240.0, 480.0));
    assert_eq!(controller.store().persist_calls, 1);
}

#[test]
fn new_items_enter_in_front_and_removed_items_stop_dragging() {
    let card = card_at(200.0, 300.0, 4);
    let card_id = card.id;
    let mut controller = controller_with(vec![card]);

    let fresh = controller.insert_new_item(PositionedItem::new(ItemKind::Note));
    assert_eq!(controller.item(fresh).expect("item should exist").z_index, 5);
    assert_eq!(controller.store().persist_calls, 1);

    let start = Point::new(200.0, 300.0);
    controller.handle_gesture(GestureEvent::began(start));
    controller.handle_gesture(GestureEvent::changed(start, Vector::new(30.0, 0.0)));
    assert!(controller.is_dragging());

    assert!(controller.remove_item(card_id).is_some());
    assert!(!controller.is_dragging());
    assert_eq!(
        controller.handle_gesture(GestureEvent::ended(start, Vector::new(30.0, 0.0))),
        DragUpdate::Ignored
    );
    assert_eq!(controller.items().len(), 1);
    assert!(controller.item(fresh).is_some());
}

#[test]
fn programmatic_drop_promotes_and_snaps() {
    let anchor = card_at(200.0, 300.0, 3);
    let moving = card_at(600.0, 600.0, 0);
    let (anchor_id, moving_id) = (anchor.id, moving.id);
    let mut controller = controller_with(vec![anchor, moving]);

    let resolution = controller
        .drop_item(moving_id, Point::new(290.0, 305.0))
        .expect("known item should drop");

    assert_eq!(
        resolution.outcome,
        SnapOutcome::Edge(anchor_id, notecanvas_core::SnapEdge::Right)
    );
    assert_close(resolution.point, Point::new(280.0, 300.0));
    assert_eq!(controller.item(moving_id).expect("item should exist").z_index, 4);
    assert_eq!(controller.store().persist_calls, 1);
    let writes = &controller.store().writes;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].1.position, Some(Point::new(280.0, 300.0)));
    assert_eq!(writes[0].1.z_index, Some(4));
    assert!(controller.drop_item(uuid::Uuid::new_v4(), Point::ORIGIN).is_none());
}
