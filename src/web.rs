//! Browser binding: the [`Surface`] over a 2D canvas context and the
//! [`Engine`] wrapper that owns the `<canvas>` element.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//!
//! The placed image is scaled to its on-canvas size once and kept as
//! [`ImageData`] until the image, or the size it is drawn at, changes.

#[cfg(test)]
#[path = "web_test.rs"]
mod web_test;

use std::f64::consts::TAU;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::config::CanvasConfig;
use crate::engine::{Action, EngineCore};
use crate::geometry::{Point, Rect};
use crate::input::{Button, Key, Modifiers};
use crate::render::Surface;

/// Single-entry cache keyed by image revision and target pixel size.
#[derive(Debug)]
pub struct ScaleCache<T> {
    entry: Option<((u64, u32, u32), T)>,
}

impl<T> Default for ScaleCache<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> ScaleCache<T> {
    /// Return the cached value for `key`, building it with `build` on a miss.
    /// A failed build leaves the cache empty.
    ///
    /// # Errors
    ///
    /// Propagates the error from `build`.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: (u64, u32, u32),
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == key => (cached, value),
            stale => {
                drop(stale);
                (key, build()?)
            }
        };
        Ok(&self.entry.insert(entry).1)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

/// Whole-pixel size an image is drawn at for `dest`. Never zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn target_size(dest: Rect) -> (u32, u32) {
    let w = dest.width.round().max(1.0) as u32;
    let h = dest.height.round().max(1.0) as u32;
    (w, h)
}

/// [`Surface`] backed by a browser 2D context.
pub struct ContextSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
    cache: &'a mut ScaleCache<ImageData>,
    revision: u64,
}

impl<'a> ContextSurface<'a> {
    /// `revision` identifies the image that `draw_image` will receive; see
    /// [`EngineCore::image_revision`].
    #[must_use]
    pub fn new(ctx: &'a CanvasRenderingContext2d, cache: &'a mut ScaleCache<ImageData>, revision: u64) -> Self {
        Self { ctx, cache, revision }
    }
}

fn scaled_image_data(image: &RgbaImage, w: u32, h: u32) -> Result<ImageData, JsValue> {
    if image.dimensions() == (w, h) {
        return ImageData::new_with_u8_clamped_array_and_sh(Clamped(image.as_raw().as_slice()), w, h);
    }
    let scaled = imageops::resize(image, w, h, FilterType::Triangle);
    ImageData::new_with_u8_clamped_array_and_sh(Clamped(scaled.as_raw().as_slice()), w, h)
}

impl Surface for ContextSurface<'_> {
    type Error = JsValue;

    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: Rect) -> Result<(), JsValue> {
        let (w, h) = target_size(dest);
        let data = self.cache.get_or_try_insert_with((self.revision, w, h), || scaled_image_data(image, w, h))?;
        self.ctx.put_image_data(data, dest.x, dest.y)
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<(), JsValue> {
        let dash_array = js_sys::Array::new();
        for s in segments {
            dash_array.push(&(*s).into());
        }
        self.ctx.set_line_dash(&dash_array)
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: Point) {
        self.ctx.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        self.ctx.line_to(p.x, p.y);
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn rect(&mut self, r: Rect) {
        self.ctx.rect(r.x, r.y, r.width, r.height);
    }

    fn circle(&mut self, center: Point, radius: f64) -> Result<(), JsValue> {
        self.ctx.move_to(center.x + radius, center.y);
        self.ctx.arc(center.x, center.y, radius, 0.0, TAU)
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }
}

/// The full canvas engine. Wraps [`EngineCore`] and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    scaled: ScaleCache<ImageData>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element has no 2D context.
    pub fn new(canvas: HtmlCanvasElement, config: CanvasConfig) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let core = EngineCore::new(f64::from(canvas.width()), f64::from(canvas.height()), config);
        Ok(Self { canvas, ctx, scaled: ScaleCache::default(), core })
    }

    // --- Viewport ---

    /// Resize the backing canvas element and the engine's canvas space.
    pub fn resize(&mut self, width: u32, height: u32) -> Vec<Action> {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.scaled.invalidate();
        self.core.resize(f64::from(width), f64::from(height))
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(pt, button, modifiers)
    }

    pub fn on_double_click(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_double_click(pt, modifiers)
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.core.on_pointer_leave()
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&mut self) -> Result<(), JsValue> {
        if self.core.image().is_none() {
            self.scaled.invalidate();
        }
        let mut surface = ContextSurface::new(&self.ctx, &mut self.scaled, self.core.image_revision());
        self.core.render(&mut surface)
    }
}
