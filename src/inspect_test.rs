#![allow(clippy::float_cmp)]

use image::Rgba;

use super::*;
use crate::shape::{Geometry, ShapeStyle};

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREY: Rgba<u8> = Rgba([50, 50, 50, 255]);

fn identity_placement(w: f64, h: f64) -> ImagePlacement {
    ImagePlacement {
        canvas_x: 0.0,
        canvas_y: 0.0,
        canvas_width: w,
        canvas_height: h,
        original_width: w,
        original_height: h,
    }
}

fn rect_shape(image: Rect, image_bound: bool) -> Shape {
    Shape {
        id: ShapeId::from("s1"),
        kind: ShapeKind::Rectangle,
        canvas: Geometry::Rect(image),
        image: Geometry::Rect(image),
        style: ShapeStyle::default(),
        timestamp: 0,
        image_bound,
    }
}

// =============================================================
// Magnifier
// =============================================================

#[test]
fn magnifier_off_image_is_none() {
    let img = RgbaImage::from_pixel(40, 40, GREY);
    let mag = Magnifier { size: 8, zoom: 4.0 };
    assert!(mag.view(&img, &identity_placement(40.0, 40.0), Point::new(41.0, 10.0)).is_none());
}

#[test]
fn magnifier_reports_center_pixel_and_source_region() {
    let mut img = RgbaImage::from_pixel(40, 40, GREY);
    img.put_pixel(20, 20, RED);
    let mag = Magnifier { size: 8, zoom: 4.0 };
    let view = mag.view(&img, &identity_placement(40.0, 40.0), Point::new(20.5, 20.5)).unwrap();

    assert_eq!(view.center, RED.0);
    assert_eq!(view.source, Rect::new(19.0, 19.0, 2.0, 2.0));
    assert_eq!(view.image.dimensions(), (8, 8));
    assert_eq!(view.image.get_pixel(7, 7), &RED);
    assert_eq!(view.image.get_pixel(0, 0), &GREY);
}

#[test]
fn magnifier_maps_through_placement_scale() {
    let img = RgbaImage::from_pixel(40, 40, GREY);
    let placement = ImagePlacement { canvas_width: 20.0, canvas_height: 20.0, ..identity_placement(40.0, 40.0) };
    let view = Magnifier { size: 10, zoom: 2.0 }.view(&img, &placement, Point::new(10.0, 10.0)).unwrap();
    assert_eq!(view.image_point, Point::new(20.0, 20.0));
}

#[test]
fn magnifier_clamps_region_at_image_edge() {
    let img = RgbaImage::from_pixel(40, 40, GREY);
    let view = Magnifier { size: 16, zoom: 2.0 }.view(&img, &identity_placement(40.0, 40.0), Point::new(0.5, 39.5)).unwrap();
    assert_eq!(view.source, Rect::new(0.0, 32.0, 8.0, 8.0));
}

#[test]
fn magnifier_region_never_exceeds_image() {
    let img = RgbaImage::from_pixel(4, 3, GREY);
    let view = Magnifier { size: 150, zoom: 1.0 }.view(&img, &identity_placement(4.0, 3.0), Point::new(2.0, 1.0)).unwrap();
    assert_eq!(view.source, Rect::new(0.0, 0.0, 4.0, 3.0));
    assert_eq!(view.image.dimensions(), (150, 150));
}

// =============================================================
// Statistics
// =============================================================

#[test]
fn pixel_stats_of_extremes() {
    let stats = PixelStats::from_luma(&[0, 255]).unwrap();
    assert_eq!(stats.mean, 127.5);
    assert_eq!(stats.std_dev, 127.5);
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 255.0);
    assert_eq!(stats.pixel_count, 2);
}

#[test]
fn pixel_stats_empty_is_none() {
    assert!(PixelStats::from_luma(&[]).is_none());
}

#[test]
fn shape_stats_for_image_bound_rectangle() {
    let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
    for y in 0..4 {
        for x in 0..4 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    let stats = ShapeStats::compute(&rect_shape(Rect::new(0.0, 0.0, 4.0, 4.0), true), Some(&img));
    assert_eq!(stats.kind, ShapeKind::Rectangle);
    assert_eq!(stats.area, 16.0);
    assert_eq!(stats.perimeter, 16.0);
    assert_eq!(stats.vertex_count, 4);
    let px = stats.pixels.unwrap();
    assert_eq!(px.pixel_count, 16);
    assert_eq!(px.mean, 255.0);
    assert_eq!(px.std_dev, 0.0);
}

#[test]
fn shape_stats_clip_to_image() {
    let img = RgbaImage::from_pixel(4, 4, GREY);
    let stats = ShapeStats::compute(&rect_shape(Rect::new(2.0, 2.0, 10.0, 10.0), true), Some(&img));
    assert_eq!(stats.pixels.unwrap().pixel_count, 4);
}

#[test]
fn canvas_anchored_shape_has_no_pixel_stats() {
    let img = RgbaImage::from_pixel(8, 8, GREY);
    let stats = ShapeStats::compute(&rect_shape(Rect::new(0.0, 0.0, 4.0, 4.0), false), Some(&img));
    assert!(stats.pixels.is_none());
    assert_eq!(stats.area, 16.0);
}

#[test]
fn freestyle_perimeter_is_open() {
    let path = vec![Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(3.0, 4.0)];
    let shape = Shape {
        kind: ShapeKind::Freestyle,
        canvas: Geometry::Path(path.clone()),
        image: Geometry::Path(path),
        ..rect_shape(Rect::default(), false)
    };
    assert_eq!(ShapeStats::compute(&shape, None).perimeter, 7.0);
}

// =============================================================
// Inspector state
// =============================================================

#[test]
fn target_prefers_locked_over_hovered() {
    let mut insp = Inspector::new();
    insp.hover(Point::new(1.0, 1.0), Some(ShapeId::from("a")));
    assert_eq!(insp.target(), Some(&ShapeId::from("a")));
    insp.lock(ShapeId::from("b"));
    assert_eq!(insp.target(), Some(&ShapeId::from("b")));
    assert!(insp.unlock());
    assert!(!insp.unlock());
    assert_eq!(insp.target(), Some(&ShapeId::from("a")));
}

#[test]
fn forget_clears_references_to_removed_shape() {
    let mut insp = Inspector::new();
    insp.hover(Point::new(1.0, 1.0), Some(ShapeId::from("a")));
    insp.lock(ShapeId::from("a"));
    assert!(insp.forget(&ShapeId::from("a")));
    assert!(insp.target().is_none());
    assert!(!insp.forget(&ShapeId::from("a")));
}

#[test]
fn leave_hides_pointer() {
    let mut insp = Inspector::new();
    insp.hover(Point::new(5.0, 5.0), None);
    assert_eq!(insp.pointer(), Some(Point::new(5.0, 5.0)));
    insp.leave();
    assert!(insp.pointer().is_none());
}
