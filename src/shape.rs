//! Shape model: kinds, geometry, styles, and the committed shape record.
//!
//! A [`Shape`] carries its geometry twice: once in canvas space (what is drawn
//! and hit-tested) and once in image space (what the host reads back as the
//! annotation). [`ShapeStyle`] is the sparse, host-facing style; the renderer
//! reads it through [`ResolvedStyle`], which fills in per-kind defaults.

#[cfg(test)]
#[path = "shape_test.rs"]
mod shape_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_LINE_WIDTH, DEFAULT_STROKE, FREESTYLE_LINE_WIDTH, FREESTYLE_STROKE};
use crate::geometry::{ImagePlacement, Point, Rect};
use crate::hit;

/// Unique identifier of a committed shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub String);

impl ShapeId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// The kind of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle.
    Rectangle,
    /// Closed polygon built from clicked vertices.
    Polygon,
    /// Simplified freehand path.
    Freestyle,
}

impl ShapeKind {
    /// Display name used by the inspector.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Rectangle => "Rectangle",
            Self::Polygon => "Polygon",
            Self::Freestyle => "Freestyle",
        }
    }
}

/// Geometry of a shape in one coordinate space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Geometry {
    Rect(Rect),
    Path(Vec<Point>),
}

impl Geometry {
    /// Map canvas-space geometry into image space. Identity without a placement.
    #[must_use]
    pub fn to_image(&self, placement: Option<&ImagePlacement>) -> Self {
        match (self, placement) {
            (_, None) => self.clone(),
            (Self::Rect(r), Some(p)) => Self::Rect(p.rect_to_image(*r)),
            (Self::Path(pts), Some(p)) => Self::Path(p.points_to_image(pts)),
        }
    }

    /// Map image-space geometry into canvas space. Identity without a placement.
    #[must_use]
    pub fn to_canvas(&self, placement: Option<&ImagePlacement>) -> Self {
        match (self, placement) {
            (_, None) => self.clone(),
            (Self::Rect(r), Some(p)) => Self::Rect(p.rect_to_canvas(*r)),
            (Self::Path(pts), Some(p)) => Self::Path(p.points_to_canvas(pts)),
        }
    }

    /// Outline vertices: rectangle corners clockwise, or the path itself.
    #[must_use]
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Self::Rect(r) => r.corners().to_vec(),
            Self::Path(pts) => pts.clone(),
        }
    }

    /// Axis-aligned bounds. `None` for an empty path.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.normalized()),
            Self::Path(pts) => Rect::bounding(pts),
        }
    }

    /// Whether `p` is inside the geometry.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Rect(r) => r.contains(p),
            Self::Path(pts) => hit::point_in_polygon(p, pts),
        }
    }

    /// Enclosed area (shoelace for paths).
    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Rect(r) => (r.width * r.height).abs(),
            Self::Path(pts) => polygon_area(pts),
        }
    }

    /// Outline length. Open paths skip the closing segment.
    #[must_use]
    pub fn perimeter(&self, closed: bool) -> f64 {
        match self {
            Self::Rect(r) => 2.0 * (r.width.abs() + r.height.abs()),
            Self::Path(pts) => {
                let open: f64 = pts.windows(2).map(|w| w[0].distance_to(w[1])).sum();
                match (closed, pts.first(), pts.last()) {
                    (true, Some(first), Some(last)) if pts.len() > 2 => open + last.distance_to(*first),
                    _ => open,
                }
            }
        }
    }
}

fn polygon_area(pts: &[Point]) -> f64 {
    if pts.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, a) in pts.iter().enumerate() {
        let b = pts[(i + 1) % pts.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum / 2.0).abs()
}

/// Sparse style supplied by the host. Unset fields fall back to per-kind defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color as a CSS color string. Empty string means no fill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_style: Option<String>,
    /// Stroke color as a CSS color string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_style: Option<String>,
    /// Stroke width in canvas pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    /// Dash pattern (segment lengths). Empty means solid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<Vec<f64>>,
    /// Whether the outline joins its last point back to the first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_path: Option<bool>,
}

impl ShapeStyle {
    /// Overlay every field set in `patch` onto this style.
    pub fn merge(&mut self, patch: &ShapeStyle) {
        if let Some(fill) = &patch.fill_style {
            self.fill_style = Some(fill.clone());
        }
        if let Some(stroke) = &patch.stroke_style {
            self.stroke_style = Some(stroke.clone());
        }
        if let Some(width) = patch.line_width {
            self.line_width = Some(width);
        }
        if let Some(dash) = &patch.line_dash {
            self.line_dash = Some(dash.clone());
        }
        if let Some(close) = patch.close_path {
            self.close_path = Some(close);
        }
    }

    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A style with every field decided, ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub fill: Option<String>,
    pub stroke: String,
    pub line_width: f64,
    pub line_dash: Vec<f64>,
    pub close_path: bool,
}

impl ResolvedStyle {
    /// Resolve `style` against the defaults for `kind`.
    #[must_use]
    pub fn resolve(kind: ShapeKind, style: &ShapeStyle) -> Self {
        let (stroke, width, close) = match kind {
            ShapeKind::Rectangle | ShapeKind::Polygon => (DEFAULT_STROKE, DEFAULT_LINE_WIDTH, true),
            ShapeKind::Freestyle => (FREESTYLE_STROKE, FREESTYLE_LINE_WIDTH, false),
        };
        Self {
            fill: style.fill_style.clone().filter(|f| !f.is_empty()),
            stroke: style.stroke_style.clone().unwrap_or_else(|| stroke.to_owned()),
            line_width: style.line_width.filter(|w| w.is_finite() && *w >= 0.0).unwrap_or(width),
            line_dash: style.line_dash.clone().unwrap_or_default(),
            close_path: style.close_path.unwrap_or(close),
        }
    }
}

/// A committed annotation shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Registry-issued identifier.
    pub id: ShapeId,
    /// Shape kind.
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Geometry in canvas space.
    pub canvas: Geometry,
    /// Geometry in original image space.
    pub image: Geometry,
    /// Host-supplied style.
    #[serde(default)]
    pub style: ShapeStyle,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Whether an image was placed when the shape was created. Only these
    /// shapes follow the image when it is re-placed.
    #[serde(default)]
    pub image_bound: bool,
}

impl Shape {
    /// Style with per-kind defaults applied.
    #[must_use]
    pub fn resolved_style(&self) -> ResolvedStyle {
        ResolvedStyle::resolve(self.kind, &self.style)
    }
}

/// Inspector edit applied to a committed shape. Only present fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeEdit {
    /// Style fields to merge.
    pub style: ShapeStyle,
    /// Replacement image-space geometry. Must match the shape's geometry variant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Geometry>,
}
