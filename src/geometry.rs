//! Coordinate spaces and the canvas <-> image transform.
//!
//! Every point handled by the engine lives in one of two spaces. Canvas space
//! is the on-screen drawing surface in CSS pixels. Image space is the pixel grid
//! of the originally loaded image, before it was scaled to fit the canvas. The
//! two are related by an [`ImagePlacement`], recorded when the image is placed.
//!
//! When no image is placed the transform is the identity: canvas coordinates
//! stand in for both spaces.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in either canvas or image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from two opposite corners given in any order.
    /// The result always has non-negative width and height.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Copy of this rectangle with negative extents flipped so width/height are non-negative.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::from_corners(self.top_left(), self.bottom_right())
    }

    #[must_use]
    pub fn top_left(self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn bottom_right(self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside the rectangle, edges inclusive.
    #[must_use]
    pub fn contains(self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.x && p.x <= r.x + r.width && p.y >= r.y && p.y <= r.y + r.height
    }

    /// The four corners, clockwise from top-left.
    #[must_use]
    pub fn corners(self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    /// Smallest rectangle containing every point. `None` for an empty slice.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

/// Where and how large the loaded image is drawn on the canvas.
///
/// `canvas_*` fields are in canvas pixels; `original_*` are the source image's
/// pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePlacement {
    pub canvas_x: f64,
    pub canvas_y: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub original_width: f64,
    pub original_height: f64,
}

/// Host-supplied placement constraints for a newly loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementRequest {
    /// Left edge on the canvas. Defaults to 0.
    pub x: Option<f64>,
    /// Top edge on the canvas. Defaults to 0.
    pub y: Option<f64>,
    /// Maximum drawn width. Defaults to the canvas width.
    pub max_width: Option<f64>,
    /// Maximum drawn height. Defaults to the canvas height.
    pub max_height: Option<f64>,
    /// Keep the original width/height ratio when scaling down.
    pub preserve_aspect: bool,
}

impl Default for PlacementRequest {
    fn default() -> Self {
        Self { x: None, y: None, max_width: None, max_height: None, preserve_aspect: true }
    }
}

impl PlacementRequest {
    /// Request placing the image with its top-left corner at `(x, y)`.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }
}

fn usable_bound(requested: Option<f64>, fallback: f64) -> Option<f64> {
    let bound = requested.unwrap_or(fallback);
    (bound.is_finite() && bound > 0.0).then_some(bound)
}

fn safe_ratio(num: f64, den: f64) -> f64 {
    if den.is_finite() && den > 0.0 && num.is_finite() && num > 0.0 {
        num / den
    } else {
        1.0
    }
}

impl ImagePlacement {
    /// Fit an `original_width x original_height` image onto a canvas of the
    /// given size. Images are scaled down to fit the bounds, never up.
    #[must_use]
    pub fn fit(
        original_width: f64,
        original_height: f64,
        canvas_width: f64,
        canvas_height: f64,
        request: PlacementRequest,
    ) -> Self {
        let max_w = usable_bound(request.max_width, canvas_width).unwrap_or(original_width);
        let max_h = usable_bound(request.max_height, canvas_height).unwrap_or(original_height);

        let (width, height) = if request.preserve_aspect {
            let scale = (max_w / original_width).min(max_h / original_height).min(1.0);
            if scale.is_finite() && scale > 0.0 {
                (original_width * scale, original_height * scale)
            } else {
                (original_width, original_height)
            }
        } else {
            (original_width.min(max_w), original_height.min(max_h))
        };

        Self {
            canvas_x: request.x.unwrap_or(0.0),
            canvas_y: request.y.unwrap_or(0.0),
            canvas_width: width,
            canvas_height: height,
            original_width,
            original_height,
        }
    }

    /// Horizontal image pixels per canvas pixel. 1 when the placement is degenerate.
    #[must_use]
    pub fn scale_x(&self) -> f64 {
        safe_ratio(self.original_width, self.canvas_width)
    }

    /// Vertical image pixels per canvas pixel. 1 when the placement is degenerate.
    #[must_use]
    pub fn scale_y(&self) -> f64 {
        safe_ratio(self.original_height, self.canvas_height)
    }

    /// The rectangle the image occupies on the canvas.
    #[must_use]
    pub fn canvas_rect(&self) -> Rect {
        Rect::new(self.canvas_x, self.canvas_y, self.canvas_width, self.canvas_height)
    }

    #[must_use]
    pub fn contains_canvas_point(&self, p: Point) -> bool {
        self.canvas_rect().contains(p)
    }

    #[must_use]
    pub fn canvas_to_image(&self, p: Point) -> Point {
        Point {
            x: (p.x - self.canvas_x) * self.scale_x(),
            y: (p.y - self.canvas_y) * self.scale_y(),
        }
    }

    #[must_use]
    pub fn image_to_canvas(&self, p: Point) -> Point {
        Point {
            x: p.x / self.scale_x() + self.canvas_x,
            y: p.y / self.scale_y() + self.canvas_y,
        }
    }

    #[must_use]
    pub fn rect_to_image(&self, r: Rect) -> Rect {
        let tl = self.canvas_to_image(r.top_left());
        Rect::new(tl.x, tl.y, r.width * self.scale_x(), r.height * self.scale_y())
    }

    #[must_use]
    pub fn rect_to_canvas(&self, r: Rect) -> Rect {
        let tl = self.image_to_canvas(r.top_left());
        Rect::new(tl.x, tl.y, r.width / self.scale_x(), r.height / self.scale_y())
    }

    #[must_use]
    pub fn points_to_image(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.canvas_to_image(*p)).collect()
    }

    #[must_use]
    pub fn points_to_canvas(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.image_to_canvas(*p)).collect()
    }
}

/// Map a canvas point into image space. `None` when no image is placed.
#[must_use]
pub fn to_image_space(canvas_pt: Point, placement: Option<&ImagePlacement>) -> Option<Point> {
    placement.map(|p| p.canvas_to_image(canvas_pt))
}

/// Map an image point into canvas space. `None` when no image is placed.
#[must_use]
pub fn to_canvas_space(image_pt: Point, placement: Option<&ImagePlacement>) -> Option<Point> {
    placement.map(|p| p.image_to_canvas(image_pt))
}
