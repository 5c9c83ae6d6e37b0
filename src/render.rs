//! Rendering: draws the full canvas scene onto a [`Surface`].
//!
//! The pipeline is read-only on the model. It receives borrowed views of the
//! placed image, the committed shapes and the gesture preview, and issues
//! primitive drawing calls. The browser implementation of [`Surface`] lives
//! in [`crate::web`]; tests record the calls instead.
//!
//! Fallible surface calls propagate through `Result<(), S::Error>`. The
//! top-level caller decides what to do with a failed frame.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use image::RgbaImage;

use crate::consts::{PREVIEW_DASH_PX, PREVIEW_STROKE, PREVIEW_VERTEX_RADIUS_PX};
use crate::geometry::{ImagePlacement, Point, Rect};
use crate::gesture::Preview;
use crate::shape::{Geometry, Shape};

/// Primitive 2D drawing calls, modelled on the HTML canvas context.
pub trait Surface {
    type Error;

    /// Erase the whole `width x height` surface.
    fn clear(&mut self, width: f64, height: f64);

    /// Draw `image` scaled into `dest`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the pixel data.
    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<(), Self::Error>;

    fn save(&mut self);
    fn restore(&mut self);

    fn set_stroke_style(&mut self, color: &str);
    fn set_fill_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);

    /// # Errors
    ///
    /// Returns `Err` if the backend rejects the dash pattern.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), Self::Error>;

    fn begin_path(&mut self);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn close_path(&mut self);
    fn rect(&mut self, r: Rect);

    /// Add a full circle to the current path.
    ///
    /// # Errors
    ///
    /// Returns `Err` for a negative radius.
    fn circle(&mut self, center: Point, radius: f64) -> Result<(), Self::Error>;

    fn fill(&mut self);
    fn stroke(&mut self);
}

/// Borrowed view of everything one frame draws.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub width: f64,
    pub height: f64,
    pub image: Option<(&'a RgbaImage, &'a ImagePlacement)>,
    pub shapes: &'a [Shape],
    pub preview: Option<&'a Preview>,
}

/// Draw the full scene: image, committed shapes, then the gesture preview.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw<S: Surface>(surface: &mut S, scene: &Scene<'_>) -> Result<(), S::Error> {
    // Layer 1: clear.
    surface.clear(scene.width, scene.height);

    // Layer 2: the placed image.
    if let Some((image, placement)) = scene.image {
        surface.draw_image(image, placement.canvas_rect())?;
    }

    // Layer 3: shapes in insertion order (oldest at the bottom).
    for shape in scene.shapes {
        draw_shape(surface, shape)?;
    }

    // Layer 4: in-progress gesture.
    if let Some(preview) = scene.preview {
        draw_preview(surface, preview)?;
    }
    Ok(())
}

fn draw_shape<S: Surface>(surface: &mut S, shape: &Shape) -> Result<(), S::Error> {
    let style = shape.resolved_style();
    surface.save();
    surface.set_stroke_style(&style.stroke);
    surface.set_line_width(style.line_width);
    surface.set_line_dash(&style.line_dash)?;

    surface.begin_path();
    match &shape.canvas {
        Geometry::Rect(r) => surface.rect(*r),
        Geometry::Path(points) => trace(surface, points, style.close_path),
    }
    if let Some(fill) = &style.fill {
        surface.set_fill_style(fill);
        surface.fill();
    }
    surface.stroke();
    surface.restore();
    Ok(())
}

fn draw_preview<S: Surface>(surface: &mut S, preview: &Preview) -> Result<(), S::Error> {
    surface.save();
    surface.set_stroke_style(PREVIEW_STROKE);
    surface.set_line_width(1.0);
    surface.set_line_dash(&[PREVIEW_DASH_PX, PREVIEW_DASH_PX])?;

    surface.begin_path();
    match preview {
        Preview::Rect(r) => surface.rect(*r),
        Preview::Path { points, closed } => trace(surface, points, *closed),
    }
    surface.stroke();

    if let Preview::Path { points, .. } = preview {
        if let (Some(first), true) = (points.first(), points.len() > 1) {
            surface.set_line_dash(&[])?;
            surface.set_fill_style(PREVIEW_STROKE);
            surface.begin_path();
            surface.circle(*first, PREVIEW_VERTEX_RADIUS_PX)?;
            surface.fill();
        }
    }
    surface.restore();
    Ok(())
}

fn trace<S: Surface>(surface: &mut S, points: &[Point], closed: bool) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    surface.move_to(*first);
    for p in rest {
        surface.line_to(*p);
    }
    if closed {
        surface.close_path();
    }
}
