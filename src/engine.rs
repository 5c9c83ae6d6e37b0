//! Engine facade: owns all per-instance canvas state and exposes the host API.
//!
//! [`EngineCore`] holds the registry, image placement, gesture machine,
//! inspector and configuration. It is free of browser types so it can be
//! driven from tests, the CLI, or the wasm wrapper in [`crate::web`].
//!
//! Input handlers return [`Action`]s for the host to process. Registry
//! mutations are announced to subscribed listeners as [`CanvasEvent`]s, always
//! after the mutation is applied.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardSource, PasteResult};
use crate::config::{CanvasConfig, ConfigPatch};
use crate::geometry::{ImagePlacement, PlacementRequest, Point, Rect};
use crate::gesture::{GestureMachine, GestureOutcome, Preview};
use crate::input::{Button, DrawingMode, EventKind, InputEvent, Key, Modifiers};
use crate::inspect::{Inspector, InspectorView, Magnifier, ShapeStats};
use crate::load::{self, ImageSize, ImageSource, LoadError};
use crate::registry::{ShapeKey, ShapeRegistry};
use crate::render::{self, Scene, Surface};
use crate::shape::{Geometry, Shape, ShapeEdit, ShapeId, ShapeKind, ShapeStyle};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RenderNeeded,
    SetCursor(String),
}

/// Notifications delivered to subscribed listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    ShapeCreated(Shape),
    ShapeRemoved(Shape),
    ShapeUpdated(Shape),
    CanvasReset,
}

/// Handle returned by [`EngineCore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&CanvasEvent)>;

/// Core engine state: all logic that doesn't depend on the canvas element.
pub struct EngineCore {
    config: CanvasConfig,
    registry: ShapeRegistry,
    gesture: GestureMachine,
    inspector: Inspector,
    placement: Option<ImagePlacement>,
    image: Option<RgbaImage>,
    canvas_width: f64,
    canvas_height: f64,
    last_pointer: Option<Point>,
    cursor: &'static str,
    image_revision: u64,
    pending: Vec<Action>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(0.0, 0.0, CanvasConfig::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(canvas_width: f64, canvas_height: f64, config: CanvasConfig) -> Self {
        let config = config.validated();
        Self {
            cursor: cursor_for(config.drawing_mode, false),
            config,
            registry: ShapeRegistry::new(),
            gesture: GestureMachine::new(),
            inspector: Inspector::new(),
            placement: None,
            image: None,
            canvas_width,
            canvas_height,
            last_pointer: None,
            image_revision: 0,
            pending: Vec::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    // --- Notifications ---

    /// Register a listener for [`CanvasEvent`]s.
    pub fn subscribe(&mut self, listener: impl FnMut(&CanvasEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: &CanvasEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    // --- Configuration ---

    #[must_use]
    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Apply a partial config update. Changing the drawing mode aborts the
    /// active gesture.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> Vec<Action> {
        let old_mode = self.config.drawing_mode;
        self.config.apply(patch);
        let mut actions = Vec::new();
        if self.config.drawing_mode != old_mode {
            if self.gesture.reset() {
                debug!(from = ?old_mode, to = ?self.config.drawing_mode, "mode change aborted gesture");
            }
            actions.push(Action::RenderNeeded);
        }
        self.refresh_cursor(&mut actions);
        actions
    }

    pub fn set_drawing_mode(&mut self, mode: DrawingMode) -> Vec<Action> {
        self.update_config(&ConfigPatch { drawing_mode: Some(mode), ..ConfigPatch::default() })
    }

    /// Update the canvas size. The image keeps its current placement.
    pub fn resize(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.canvas_width = width;
        self.canvas_height = height;
        vec![Action::RenderNeeded]
    }

    #[must_use]
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    // --- Image ---

    /// Load and place an image. On failure the current placement is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the source can't be read or decoded.
    pub async fn add_image(&mut self, source: ImageSource, request: PlacementRequest) -> Result<ImageSize, LoadError> {
        let image = load::load_image(source).await?;
        self.place_image(image, request)
    }

    /// Place an already-decoded image, replacing any previous one. Image-bound
    /// shapes are re-projected onto the new placement.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Empty`] for an image with a zero dimension; the
    /// current placement is left as it was.
    pub fn place_image(&mut self, image: RgbaImage, request: PlacementRequest) -> Result<ImageSize, LoadError> {
        let size = ImageSize::of(&image);
        if size.width == 0 || size.height == 0 {
            warn!(width = size.width, height = size.height, "refusing to place empty image");
            return Err(LoadError::Empty);
        }
        let placement = ImagePlacement::fit(
            f64::from(size.width),
            f64::from(size.height),
            self.canvas_width,
            self.canvas_height,
            request,
        );
        self.registry.reproject(&placement);
        info!(
            width = size.width,
            height = size.height,
            canvas_x = placement.canvas_x,
            canvas_y = placement.canvas_y,
            canvas_width = placement.canvas_width,
            canvas_height = placement.canvas_height,
            "image placed"
        );
        self.placement = Some(placement);
        self.image = Some(image);
        self.image_revision += 1;
        Ok(size)
    }

    /// Paste the clipboard image at the last pointer position (or the origin),
    /// scaled down to fit the canvas area right and below that point.
    /// `None` when paste is disabled, the clipboard holds no image, or it
    /// can't be read.
    pub async fn paste_image(&mut self, clipboard: &dyn ClipboardSource) -> Option<PasteResult> {
        if !self.config.paste_enabled {
            debug!("paste disabled; ignoring");
            return None;
        }
        let source = match clipboard.read_image().await {
            Ok(Some(source)) => source,
            Ok(None) => {
                debug!("clipboard holds no image");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "clipboard read failed");
                return None;
            }
        };
        let image = match load::load_image(source).await {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "clipboard image failed to decode");
                return None;
            }
        };
        let at = self.last_pointer.unwrap_or_default();
        let request = PlacementRequest {
            max_width: Some((self.canvas_width - at.x).max(1.0)),
            max_height: Some((self.canvas_height - at.y).max(1.0)),
            ..PlacementRequest::at(at.x, at.y)
        };
        let size = match self.place_image(image, request) {
            Ok(size) => size,
            Err(e) => {
                warn!(error = %e, "clipboard image rejected");
                return None;
            }
        };
        Some(PasteResult { width: size.width, height: size.height, x: at.x, y: at.y })
    }

    #[must_use]
    pub fn placement(&self) -> Option<&ImagePlacement> {
        self.placement.as_ref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Counter bumped whenever the image is replaced or cleared.
    #[must_use]
    pub fn image_revision(&self) -> u64 {
        self.image_revision
    }

    /// Clear shapes, image, gesture and inspector.
    pub fn reset_canvas(&mut self) {
        self.registry.clear();
        self.placement = None;
        self.image = None;
        self.image_revision += 1;
        self.gesture.reset();
        self.inspector.reset();
        self.queue_refresh();
        info!("canvas reset");
        self.emit(&CanvasEvent::CanvasReset);
    }

    /// Abort the active gesture without committing. Returns whether one was active.
    pub fn reset_gesture(&mut self) -> bool {
        self.gesture.reset()
    }

    // --- Programmatic drawing ---

    /// Store a rectangle given in canvas space.
    pub fn draw_rectangle(&mut self, x: f64, y: f64, width: f64, height: f64, style: Option<ShapeStyle>) -> Shape {
        let rect = Rect::new(x, y, width, height).normalized();
        self.commit(ShapeKind::Rectangle, Geometry::Rect(rect), style.unwrap_or_default())
    }

    /// Store a polygon given in canvas space.
    pub fn draw_polygon(&mut self, points: Vec<Point>, style: Option<ShapeStyle>) -> Shape {
        self.commit(ShapeKind::Polygon, Geometry::Path(points), style.unwrap_or_default())
    }

    fn commit(&mut self, kind: ShapeKind, canvas: Geometry, style: ShapeStyle) -> Shape {
        let image = canvas.to_image(self.placement.as_ref());
        let shape = self.registry.store(kind, canvas, image, style, self.placement.is_some());
        info!(id = %shape.id, kind = kind.label(), "shape created");
        self.emit(&CanvasEvent::ShapeCreated(shape.clone()));
        shape
    }

    // --- Registry queries and removal ---

    #[must_use]
    pub fn drawn_shapes(&self) -> &[Shape] {
        self.registry.list()
    }

    #[must_use]
    pub fn find_shape_at_position(&self, p: Point) -> Option<&Shape> {
        self.registry.find_at_position(p)
    }

    #[must_use]
    pub fn find_shape_by_id(&self, id: &ShapeId) -> Option<&Shape> {
        self.registry.find_by_id(id)
    }

    /// Remove a shape by id or insertion index.
    pub fn remove_shape(&mut self, key: impl Into<ShapeKey>) -> Option<Shape> {
        let removed = self.registry.remove(key)?;
        self.inspector.forget(&removed.id);
        self.rehover();
        info!(id = %removed.id, "shape removed");
        self.emit(&CanvasEvent::ShapeRemoved(removed.clone()));
        Some(removed)
    }

    pub fn remove_shape_by_id(&mut self, id: &ShapeId) -> Option<Shape> {
        self.remove_shape(id)
    }

    /// Remove every shape, announcing each removal.
    pub fn clear_drawn_shapes(&mut self) {
        let removed = self.registry.list().to_vec();
        self.registry.clear();
        self.inspector.clear_targets();
        self.queue_refresh();
        for shape in removed {
            self.emit(&CanvasEvent::ShapeRemoved(shape));
        }
    }

    /// Apply an edit to any shape by id.
    pub fn update_shape(&mut self, id: &ShapeId, edit: &ShapeEdit) -> Option<Shape> {
        let updated = self.registry.update(id, edit, self.placement.as_ref())?;
        debug!(id = %updated.id, "shape updated");
        self.emit(&CanvasEvent::ShapeUpdated(updated.clone()));
        Some(updated)
    }

    // --- Inspector ---

    /// Lock the inspector onto a shape. Returns false for an unknown id.
    pub fn lock(&mut self, id: &ShapeId) -> bool {
        if self.registry.find_by_id(id).is_none() {
            return false;
        }
        self.inspector.lock(id.clone());
        true
    }

    pub fn unlock(&mut self) -> bool {
        self.inspector.unlock()
    }

    /// Apply an edit to the locked shape.
    pub fn apply_edit(&mut self, edit: &ShapeEdit) -> Option<Shape> {
        let id = self.inspector.locked()?.clone();
        self.update_shape(&id, edit)
    }

    /// Delete the locked shape and unlock.
    pub fn inspector_delete(&mut self) -> Option<Shape> {
        let id = self.inspector.locked()?.clone();
        self.remove_shape(&id)
    }

    /// Snapshot of the overlay: target shape, its statistics, and the magnifier.
    #[must_use]
    pub fn inspect(&self) -> InspectorView {
        let shape = self.inspector.target().and_then(|id| self.registry.find_by_id(id)).cloned();
        let stats = shape.as_ref().map(|s| ShapeStats::compute(s, self.image.as_ref()));
        let magnifier = match (self.inspector.pointer(), self.image.as_ref(), self.placement.as_ref()) {
            (Some(p), Some(image), Some(placement)) => Magnifier::from_config(&self.config).view(image, placement, p),
            _ => None,
        };
        InspectorView { shape, stats, magnifier, locked: self.inspector.locked().is_some() }
    }

    // --- Input ---

    /// Feed one input event. Returns the actions the host should perform,
    /// preceded by any queued since the last call.
    pub fn handle_input(&mut self, event: &InputEvent) -> Vec<Action> {
        let mut actions = self.take_actions();
        for action in self.dispatch(event).into_iter().chain(self.take_actions()) {
            match action {
                Action::RenderNeeded => push_render(&mut actions),
                other => actions.push(other),
            }
        }
        actions
    }

    /// Drain actions queued by calls outside the input handlers, such as a
    /// removal that takes the shape out from under the pointer.
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.pending)
    }

    fn dispatch(&mut self, event: &InputEvent) -> Vec<Action> {
        let mut actions = Vec::new();
        let p = event.position;
        match &event.kind {
            EventKind::PointerLeave => {
                self.inspector.leave();
                actions.push(Action::RenderNeeded);
                self.refresh_cursor(&mut actions);
                return actions;
            }
            EventKind::PointerMove => {
                self.last_pointer = Some(p);
                let hovered = self.registry.find_at_position(p).map(|s| s.id.clone());
                let changed = self.inspector.hovered() != hovered.as_ref();
                self.inspector.hover(p, hovered);
                if changed || self.image.is_some() {
                    actions.push(Action::RenderNeeded);
                }
            }
            EventKind::PointerDown(_) | EventKind::PointerUp(_) | EventKind::DoubleClick => {
                self.last_pointer = Some(p);
            }
            EventKind::KeyDown(key) if !self.gesture.is_active() => {
                if self.handle_inspector_key(key) {
                    actions.push(Action::RenderNeeded);
                    return actions;
                }
            }
            EventKind::KeyDown(_) => {}
        }

        if self.config.drawing_mode == DrawingMode::None {
            if event.kind == EventKind::PointerDown(Button::Primary) {
                match self.registry.find_at_position(p).map(|s| s.id.clone()) {
                    Some(id) => self.inspector.lock(id),
                    None => {
                        self.inspector.unlock();
                    }
                }
                actions.push(Action::RenderNeeded);
            }
        } else {
            match self.gesture.handle(event, &self.config) {
                GestureOutcome::Ignored => {}
                GestureOutcome::Progress | GestureOutcome::Aborted(_) => push_render(&mut actions),
                GestureOutcome::Commit(candidate) => {
                    self.commit(candidate.kind, candidate.geometry, ShapeStyle::default());
                    push_render(&mut actions);
                }
            }
        }

        self.refresh_cursor(&mut actions);
        actions
    }

    /// Escape unlocks; Delete/Backspace removes the locked shape.
    fn handle_inspector_key(&mut self, key: &Key) -> bool {
        if key.is("Escape") {
            return self.inspector.unlock();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.inspector_delete().is_some();
        }
        false
    }

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.handle_input(&InputEvent { kind: EventKind::PointerDown(button), position: pt, modifiers })
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.handle_input(&InputEvent { kind: EventKind::PointerMove, position: pt, modifiers })
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.handle_input(&InputEvent { kind: EventKind::PointerUp(button), position: pt, modifiers })
    }

    pub fn on_double_click(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.handle_input(&InputEvent { kind: EventKind::DoubleClick, position: pt, modifiers })
    }

    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        self.handle_input(&InputEvent::new(EventKind::PointerLeave, self.last_pointer.unwrap_or_default()))
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        let position = self.last_pointer.unwrap_or_default();
        self.handle_input(&InputEvent { kind: EventKind::KeyDown(key), position, modifiers })
    }

    /// Re-resolve the hovered shape at the current pointer and queue the
    /// resulting redraw and cursor change.
    fn rehover(&mut self) {
        if let Some(p) = self.inspector.pointer() {
            let hovered = self.registry.find_at_position(p).map(|s| s.id.clone());
            self.inspector.hover(p, hovered);
        }
        self.queue_refresh();
    }

    fn queue_refresh(&mut self) {
        let mut actions = std::mem::take(&mut self.pending);
        push_render(&mut actions);
        self.refresh_cursor(&mut actions);
        self.pending = actions;
    }

    fn refresh_cursor(&mut self, actions: &mut Vec<Action>) {
        let over_shape = self.inspector.hovered().is_some();
        let cursor = cursor_for(self.config.drawing_mode, over_shape);
        if cursor != self.cursor {
            self.cursor = cursor;
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }

    // --- Render ---

    /// Geometry of the in-progress gesture, if any.
    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        self.gesture.preview()
    }

    /// Draw the current frame onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any surface call fails.
    pub fn render<S: Surface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let preview = self.gesture.preview();
        let scene = Scene {
            width: self.canvas_width,
            height: self.canvas_height,
            image: self.image.as_ref().zip(self.placement.as_ref()),
            shapes: self.registry.list(),
            preview: preview.as_ref(),
        };
        render::draw(surface, &scene)
    }
}

fn push_render(actions: &mut Vec<Action>) {
    if !actions.contains(&Action::RenderNeeded) {
        actions.push(Action::RenderNeeded);
    }
}

fn cursor_for(mode: DrawingMode, over_shape: bool) -> &'static str {
    match (mode, over_shape) {
        (DrawingMode::None, true) => "pointer",
        (DrawingMode::None, false) => "default",
        _ => "crosshair",
    }
}
