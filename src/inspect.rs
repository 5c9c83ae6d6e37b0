//! Inspection overlay: magnifier, per-shape statistics, and lock/hover state.
//!
//! The overlay is read-only on the registry. It follows the hovered shape
//! until the user locks one, after which the target stays frozen until an
//! unlock, a delete, or a reset.

#[cfg(test)]
#[path = "inspect_test.rs"]
mod inspect_test;

use image::imageops::{self, FilterType};
use image::{Pixel, RgbaImage};
use serde::Serialize;

use crate::config::CanvasConfig;
use crate::geometry::{ImagePlacement, Point, Rect};
use crate::shape::{Shape, ShapeId, ShapeKind};

// =============================================================
// Magnifier
// =============================================================

/// Zoomed pixel view under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Magnifier {
    /// Output side length in pixels.
    pub size: u32,
    /// Magnification factor.
    pub zoom: f64,
}

/// One rendered magnifier frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnifierView {
    /// `size x size` nearest-neighbour upscale of the source region.
    pub image: RgbaImage,
    /// Image-space point under the cursor.
    pub image_point: Point,
    /// Image pixel region that was magnified.
    pub source: Rect,
    /// RGBA of the image pixel under the cursor.
    pub center: [u8; 4],
}

impl Magnifier {
    #[must_use]
    pub fn from_config(cfg: &CanvasConfig) -> Self {
        Self { size: cfg.magnifier_size, zoom: cfg.magnifier_zoom }
    }

    /// Magnify the image around canvas point `canvas_pt`. `None` when the
    /// point is off the placed image.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn view(&self, image: &RgbaImage, placement: &ImagePlacement, canvas_pt: Point) -> Option<MagnifierView> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 || self.size == 0 || !placement.contains_canvas_point(canvas_pt) {
            return None;
        }
        let image_point = placement.canvas_to_image(canvas_pt);
        let px = (image_point.x.floor().max(0.0) as u32).min(w - 1);
        let py = (image_point.y.floor().max(0.0) as u32).min(h - 1);

        let zoom = if self.zoom.is_finite() && self.zoom >= 1.0 { self.zoom } else { 1.0 };
        let side = (f64::from(self.size) / zoom).round().max(1.0) as u32;
        let (sw, sh) = (side.min(w), side.min(h));
        let x0 = px.saturating_sub(sw / 2).min(w - sw);
        let y0 = py.saturating_sub(sh / 2).min(h - sh);

        let crop = imageops::crop_imm(image, x0, y0, sw, sh).to_image();
        let zoomed = imageops::resize(&crop, self.size, self.size, FilterType::Nearest);
        Some(MagnifierView {
            image: zoomed,
            image_point,
            source: Rect::new(f64::from(x0), f64::from(y0), f64::from(sw), f64::from(sh)),
            center: image.get_pixel(px, py).0,
        })
    }
}

// =============================================================
// Statistics
// =============================================================

/// Luminance statistics over a set of image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixelStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub pixel_count: usize,
}

impl PixelStats {
    /// Statistics of 8-bit luminance samples. `None` for an empty slice.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_luma(samples: &[u8]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mut sum = 0.0;
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        for &s in samples {
            sum += f64::from(s);
            min = min.min(s);
            max = max.max(s);
        }
        let mean = sum / n;
        let variance = samples.iter().map(|&s| (f64::from(s) - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: f64::from(min),
            max: f64::from(max),
            pixel_count: samples.len(),
        })
    }
}

/// Measurements shown by the inspector popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStats {
    pub kind: ShapeKind,
    pub canvas_bounds: Option<Rect>,
    pub image_bounds: Option<Rect>,
    /// Enclosed area in image pixels.
    pub area: f64,
    /// Outline length in image pixels.
    pub perimeter: f64,
    pub vertex_count: usize,
    /// Luminance of image pixels inside the shape. Only for image-bound shapes.
    pub pixels: Option<PixelStats>,
}

impl ShapeStats {
    #[must_use]
    pub fn compute(shape: &Shape, image: Option<&RgbaImage>) -> Self {
        let closed = shape.resolved_style().close_path;
        let pixels = match image {
            Some(img) if shape.image_bound => PixelStats::from_luma(&sample_luma(shape, img)),
            _ => None,
        };
        Self {
            kind: shape.kind,
            canvas_bounds: shape.canvas.bounds(),
            image_bounds: shape.image.bounds(),
            area: shape.image.area(),
            perimeter: shape.image.perimeter(closed),
            vertex_count: shape.image.vertices().len(),
            pixels,
        }
    }
}

/// Luminance of every image pixel whose center lies inside the shape's image geometry.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_luma(shape: &Shape, image: &RgbaImage) -> Vec<u8> {
    let Some(bounds) = shape.image.bounds() else {
        return Vec::new();
    };
    let (w, h) = image.dimensions();
    let x0 = bounds.x.floor().max(0.0) as u32;
    let y0 = bounds.y.floor().max(0.0) as u32;
    let x1 = (bounds.x + bounds.width).ceil().clamp(0.0, f64::from(w)) as u32;
    let y1 = (bounds.y + bounds.height).ceil().clamp(0.0, f64::from(h)) as u32;

    let mut out = Vec::new();
    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if shape.image.contains(center) {
                out.push(image.get_pixel(x, y).to_luma().0[0]);
            }
        }
    }
    out
}

// =============================================================
// Inspector state
// =============================================================

/// Which shape the overlay is showing and where the pointer is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inspector {
    hovered: Option<ShapeId>,
    locked: Option<ShapeId>,
    pointer: Option<Point>,
}

impl Inspector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the pointer and the shape under it.
    pub fn hover(&mut self, pointer: Point, shape: Option<ShapeId>) {
        self.pointer = Some(pointer);
        self.hovered = shape;
    }

    /// Pointer left the canvas: hide the magnifier and drop the hover target.
    pub fn leave(&mut self) {
        self.pointer = None;
        self.hovered = None;
    }

    pub fn lock(&mut self, id: ShapeId) {
        self.locked = Some(id);
    }

    /// Release the lock. Returns whether one was held.
    pub fn unlock(&mut self) -> bool {
        self.locked.take().is_some()
    }

    /// Drop every reference to a removed shape. Returns whether it was locked.
    pub fn forget(&mut self, id: &ShapeId) -> bool {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        if self.locked.as_ref() == Some(id) {
            self.locked = None;
            return true;
        }
        false
    }

    /// Drop hover and lock targets, keeping the pointer.
    pub fn clear_targets(&mut self) {
        self.hovered = None;
        self.locked = None;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn locked(&self) -> Option<&ShapeId> {
        self.locked.as_ref()
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&ShapeId> {
        self.hovered.as_ref()
    }

    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The shape the overlay describes: the locked one, else the hovered one.
    #[must_use]
    pub fn target(&self) -> Option<&ShapeId> {
        self.locked.as_ref().or(self.hovered.as_ref())
    }
}

/// Everything the host needs to draw the overlay for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorView {
    pub shape: Option<Shape>,
    pub stats: Option<ShapeStats>,
    pub magnifier: Option<MagnifierView>,
    pub locked: bool,
}
