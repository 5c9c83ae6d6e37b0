use std::collections::HashSet;

use super::*;
use crate::geometry::Rect;

fn rect(x: f64, y: f64, w: f64, h: f64) -> Geometry {
    Geometry::Rect(Rect::new(x, y, w, h))
}

fn store_rect(reg: &mut ShapeRegistry, x: f64, y: f64, w: f64, h: f64) -> Shape {
    reg.store(ShapeKind::Rectangle, rect(x, y, w, h), rect(x, y, w, h), ShapeStyle::default(), false)
}

// =============================================================
// store
// =============================================================

#[test]
fn new_registry_is_empty() {
    let reg = ShapeRegistry::new();
    assert!(reg.is_empty());
    assert_eq!(reg.len(), 0);
    assert!(reg.list().is_empty());
}

#[test]
fn store_returns_inserted_record() {
    let mut reg = ShapeRegistry::new();
    let shape = store_rect(&mut reg, 1.0, 2.0, 3.0, 4.0);
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.find_by_id(&shape.id), Some(&shape));
    assert_eq!(shape.kind, ShapeKind::Rectangle);
    assert!(shape.timestamp > 0);
}

#[test]
fn store_ids_are_pairwise_distinct() {
    let mut reg = ShapeRegistry::new();
    let ids: HashSet<ShapeId> = (0..500).map(|_| store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0).id).collect();
    assert_eq!(ids.len(), 500);
}

#[test]
fn store_does_not_alias_caller_geometry() {
    let mut reg = ShapeRegistry::new();
    let mut path = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(5.0, 5.0)];
    let shape = reg.store(
        ShapeKind::Polygon,
        Geometry::Path(path.clone()),
        Geometry::Path(path.clone()),
        ShapeStyle::default(),
        false,
    );
    path.push(Point::new(99.0, 99.0));
    let stored = reg.find_by_id(&shape.id).unwrap();
    assert_eq!(stored.canvas.vertices().len(), 3);
}

#[test]
fn list_preserves_insertion_order() {
    let mut reg = ShapeRegistry::new();
    let a = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let b = store_rect(&mut reg, 5.0, 5.0, 1.0, 1.0);
    let c = store_rect(&mut reg, 9.0, 9.0, 1.0, 1.0);
    let order: Vec<&ShapeId> = reg.list().iter().map(|s| &s.id).collect();
    assert_eq!(order, vec![&a.id, &b.id, &c.id]);
}

// =============================================================
// find
// =============================================================

#[test]
fn find_by_unknown_id_is_none() {
    let reg = ShapeRegistry::new();
    assert!(reg.find_by_id(&ShapeId::from("missing")).is_none());
}

#[test]
fn find_at_position_hit_and_miss() {
    let mut reg = ShapeRegistry::new();
    let shape = store_rect(&mut reg, 10.0, 10.0, 50.0, 30.0);
    assert_eq!(reg.find_at_position(Point::new(30.0, 25.0)).map(|s| &s.id), Some(&shape.id));
    assert!(reg.find_at_position(Point::new(5.0, 5.0)).is_none());
}

#[test]
fn find_at_position_prefers_newest() {
    let mut reg = ShapeRegistry::new();
    store_rect(&mut reg, 0.0, 0.0, 100.0, 100.0);
    let top = store_rect(&mut reg, 20.0, 20.0, 10.0, 10.0);
    assert_eq!(reg.find_at_position(Point::new(25.0, 25.0)).map(|s| &s.id), Some(&top.id));
}

// =============================================================
// remove / clear
// =============================================================

#[test]
fn remove_by_id_returns_record_and_forgets_it() {
    let mut reg = ShapeRegistry::new();
    let shape = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let removed = reg.remove(&shape.id).unwrap();
    assert_eq!(removed, shape);
    assert!(reg.find_by_id(&shape.id).is_none());
    assert!(reg.list().iter().all(|s| s.id != shape.id));
}

#[test]
fn remove_by_index_uses_current_order() {
    let mut reg = ShapeRegistry::new();
    let a = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let b = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let c = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    assert_eq!(reg.remove(0usize).map(|s| s.id), Some(a.id));
    // b is now at index 0, c at index 1.
    assert_eq!(reg.remove(1usize).map(|s| s.id), Some(c.id));
    assert_eq!(reg.list().len(), 1);
    assert_eq!(reg.list()[0].id, b.id);
}

#[test]
fn remove_misses_return_none() {
    let mut reg = ShapeRegistry::new();
    store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    assert!(reg.remove("nope").is_none());
    assert!(reg.remove(5usize).is_none());
    assert_eq!(reg.len(), 1);
}

#[test]
fn removed_ids_are_never_reissued() {
    let mut reg = ShapeRegistry::new();
    let first = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    reg.remove(&first.id);
    reg.clear();
    for _ in 0..100 {
        assert_ne!(store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0).id, first.id);
    }
}

#[test]
fn clear_empties_registry() {
    let mut reg = ShapeRegistry::new();
    store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    reg.clear();
    assert!(reg.is_empty());
}

// =============================================================
// update / reproject
// =============================================================

fn placement_x2() -> ImagePlacement {
    ImagePlacement {
        canvas_x: 0.0,
        canvas_y: 0.0,
        canvas_width: 200.0,
        canvas_height: 160.0,
        original_width: 400.0,
        original_height: 320.0,
    }
}

#[test]
fn update_merges_style() {
    let mut reg = ShapeRegistry::new();
    let shape = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let edit = ShapeEdit {
        style: ShapeStyle { stroke_style: Some("red".into()), ..ShapeStyle::default() },
        image: None,
    };
    let updated = reg.update(&shape.id, &edit, None).unwrap();
    assert_eq!(updated.style.stroke_style.as_deref(), Some("red"));
    assert_eq!(reg.find_by_id(&shape.id).unwrap().style.stroke_style.as_deref(), Some("red"));
}

#[test]
fn update_image_geometry_recomputes_canvas_for_bound_shapes() {
    let mut reg = ShapeRegistry::new();
    let pl = placement_x2();
    let shape = reg.store(ShapeKind::Rectangle, rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 0.0, 20.0, 20.0), ShapeStyle::default(), true);
    let edit = ShapeEdit { style: ShapeStyle::default(), image: Some(rect(40.0, 40.0, 100.0, 60.0)) };
    let updated = reg.update(&shape.id, &edit, Some(&pl)).unwrap();
    assert_eq!(updated.image, rect(40.0, 40.0, 100.0, 60.0));
    assert_eq!(updated.canvas, rect(20.0, 20.0, 50.0, 30.0));
}

#[test]
fn update_rejects_mismatched_geometry() {
    let mut reg = ShapeRegistry::new();
    let shape = store_rect(&mut reg, 0.0, 0.0, 1.0, 1.0);
    let edit = ShapeEdit { style: ShapeStyle::default(), image: Some(Geometry::Path(vec![Point::new(0.0, 0.0)])) };
    assert!(reg.update(&shape.id, &edit, None).is_none());
    assert!(reg.update(&ShapeId::from("missing"), &ShapeEdit::default(), None).is_none());
}

#[test]
fn reproject_moves_only_image_bound_shapes() {
    let mut reg = ShapeRegistry::new();
    let bound = reg.store(ShapeKind::Rectangle, rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 0.0, 20.0, 20.0), ShapeStyle::default(), true);
    let free = store_rect(&mut reg, 5.0, 5.0, 5.0, 5.0);

    let moved = ImagePlacement { canvas_x: 100.0, canvas_y: 50.0, ..placement_x2() };
    reg.reproject(&moved);

    assert_eq!(reg.find_by_id(&bound.id).unwrap().canvas, rect(100.0, 50.0, 10.0, 10.0));
    assert_eq!(reg.find_by_id(&free.id).unwrap().canvas, rect(5.0, 5.0, 5.0, 5.0));
}
