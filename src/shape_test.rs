#![allow(clippy::float_cmp)]

use super::*;

fn placement_x2() -> ImagePlacement {
    ImagePlacement {
        canvas_x: 10.0,
        canvas_y: 20.0,
        canvas_width: 200.0,
        canvas_height: 160.0,
        original_width: 400.0,
        original_height: 320.0,
    }
}

// =============================================================
// ShapeKind serde
// =============================================================

#[test]
fn kind_serializes_lowercase() {
    let cases = [
        (ShapeKind::Rectangle, "\"rectangle\""),
        (ShapeKind::Polygon, "\"polygon\""),
        (ShapeKind::Freestyle, "\"freestyle\""),
    ];
    for (kind, expected) in cases {
        assert_eq!(serde_json::to_string(&kind).unwrap(), expected);
    }
}

#[test]
fn kind_rejects_unknown_name() {
    assert!(serde_json::from_str::<ShapeKind>("\"ellipse\"").is_err());
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn geometry_rect_round_trips_through_placement() {
    let pl = placement_x2();
    let canvas = Geometry::Rect(Rect::new(10.0, 20.0, 100.0, 80.0));
    let image = canvas.to_image(Some(&pl));
    assert_eq!(image, Geometry::Rect(Rect::new(0.0, 0.0, 200.0, 160.0)));
    assert_eq!(image.to_canvas(Some(&pl)), canvas);
}

#[test]
fn geometry_without_placement_is_identity() {
    let path = Geometry::Path(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
    assert_eq!(path.to_image(None), path);
    assert_eq!(path.to_canvas(None), path);
}

#[test]
fn geometry_area_and_perimeter() {
    let rect = Geometry::Rect(Rect::new(0.0, 0.0, 10.0, 5.0));
    assert_eq!(rect.area(), 50.0);
    assert_eq!(rect.perimeter(true), 30.0);

    let square = Geometry::Path(vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(0.0, 4.0),
    ]);
    assert_eq!(square.area(), 16.0);
    assert_eq!(square.perimeter(true), 16.0);
    assert_eq!(square.perimeter(false), 12.0);
}

#[test]
fn geometry_bounds_of_path() {
    let path = Geometry::Path(vec![Point::new(5.0, 1.0), Point::new(2.0, 8.0), Point::new(9.0, 3.0)]);
    assert_eq!(path.bounds(), Some(Rect::new(2.0, 1.0, 7.0, 7.0)));
    assert_eq!(Geometry::Path(Vec::new()).bounds(), None);
}

#[test]
fn geometry_serde_is_untagged() {
    let rect: Geometry = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
    assert_eq!(rect, Geometry::Rect(Rect::new(1.0, 2.0, 3.0, 4.0)));
    let path: Geometry = serde_json::from_str(r#"[{"x":1,"y":2},{"x":3,"y":4}]"#).unwrap();
    assert_eq!(path, Geometry::Path(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]));
}

// =============================================================
// Styles
// =============================================================

#[test]
fn resolved_defaults_per_kind() {
    let rect = ResolvedStyle::resolve(ShapeKind::Rectangle, &ShapeStyle::default());
    assert_eq!(rect.stroke, "#000000");
    assert_eq!(rect.line_width, 1.0);
    assert!(rect.fill.is_none());
    assert!(rect.close_path);

    let free = ResolvedStyle::resolve(ShapeKind::Freestyle, &ShapeStyle::default());
    assert_eq!(free.stroke, "#0000FF");
    assert_eq!(free.line_width, 2.0);
    assert!(!free.close_path);
}

#[test]
fn resolved_honours_explicit_fields() {
    let style = ShapeStyle {
        fill_style: Some("rgba(255,0,0,0.3)".into()),
        stroke_style: Some("red".into()),
        line_width: Some(4.0),
        line_dash: Some(vec![5.0, 5.0]),
        close_path: Some(false),
    };
    let r = ResolvedStyle::resolve(ShapeKind::Polygon, &style);
    assert_eq!(r.fill.as_deref(), Some("rgba(255,0,0,0.3)"));
    assert_eq!(r.stroke, "red");
    assert_eq!(r.line_width, 4.0);
    assert_eq!(r.line_dash, vec![5.0, 5.0]);
    assert!(!r.close_path);
}

#[test]
fn resolved_treats_empty_fill_and_bad_width_as_unset() {
    let style = ShapeStyle { fill_style: Some(String::new()), line_width: Some(f64::NAN), ..ShapeStyle::default() };
    let r = ResolvedStyle::resolve(ShapeKind::Rectangle, &style);
    assert!(r.fill.is_none());
    assert_eq!(r.line_width, 1.0);
}

#[test]
fn merge_overlays_only_present_fields() {
    let mut style = ShapeStyle { stroke_style: Some("black".into()), line_width: Some(3.0), ..ShapeStyle::default() };
    style.merge(&ShapeStyle { stroke_style: Some("green".into()), ..ShapeStyle::default() });
    assert_eq!(style.stroke_style.as_deref(), Some("green"));
    assert_eq!(style.line_width, Some(3.0));
}

#[test]
fn style_serializes_camel_case_and_skips_unset() {
    let style = ShapeStyle { line_width: Some(2.0), close_path: Some(true), ..ShapeStyle::default() };
    let json = serde_json::to_value(&style).unwrap();
    assert_eq!(json, serde_json::json!({ "lineWidth": 2.0, "closePath": true }));
}

// =============================================================
// Shape serde
// =============================================================

#[test]
fn shape_serializes_kind_as_type() {
    let shape = Shape {
        id: ShapeId::from("abc"),
        kind: ShapeKind::Rectangle,
        canvas: Geometry::Rect(Rect::new(0.0, 0.0, 1.0, 1.0)),
        image: Geometry::Rect(Rect::new(0.0, 0.0, 2.0, 2.0)),
        style: ShapeStyle::default(),
        timestamp: 42,
        image_bound: true,
    };
    let json = serde_json::to_value(&shape).unwrap();
    assert_eq!(json["type"], "rectangle");
    assert_eq!(json["id"], "abc");
    assert_eq!(json["imageBound"], true);
    let back: Shape = serde_json::from_value(json).unwrap();
    assert_eq!(back, shape);
}
