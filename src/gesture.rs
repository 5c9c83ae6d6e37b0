//! The drawing gesture state machine.
//!
//! One gesture at a time moves through `Idle -> active -> Idle`. An active
//! gesture accumulates canvas-space geometry until it either commits a
//! [`Candidate`] for the registry or aborts. Aborts are ordinary user
//! behaviour (a click without a drag, a two-vertex polygon) and produce no
//! shape and no notification.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use tracing::debug;

use crate::config::CanvasConfig;
use crate::consts::DUPLICATE_VERTEX_EPSILON_PX;
use crate::geometry::{Point, Rect};
use crate::hit;
use crate::input::{Button, DrawingMode, EventKind, InputEvent};
use crate::shape::{Geometry, ShapeKind};
use crate::simplify;

/// The active gesture, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Dragging out a rectangle.
    Rectangle {
        /// Corner where the drag started.
        anchor: Point,
        /// Opposite corner, following the pointer.
        current: Point,
    },
    /// Clicking out polygon vertices.
    Polygon {
        /// Committed vertices in click order.
        vertices: Vec<Point>,
        /// Pointer position, previewed as a virtual last vertex.
        hover: Point,
    },
    /// Sampling a freehand path.
    Freestyle {
        /// Recorded samples, spaced by the sensitivity-scaled minimum distance.
        points: Vec<Point>,
    },
}

/// Canvas-space geometry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: ShapeKind,
    pub geometry: Geometry,
}

/// Why a gesture ended without a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// Rectangle width or height at or below the minimum.
    TooSmall,
    /// Polygon closed with fewer than three vertices.
    TooFewVertices,
    /// Freehand path with fewer than two distinct points.
    TooFewPoints,
    /// Escape key, mode change, or explicit reset.
    Cancelled,
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The event did not affect any gesture.
    Ignored,
    /// The active gesture changed; its preview needs a redraw.
    Progress,
    /// The gesture finished with a shape to store.
    Commit(Candidate),
    /// The gesture finished without a shape.
    Aborted(AbortReason),
}

/// In-progress geometry for the render preview.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Rect(Rect),
    Path {
        points: Vec<Point>,
        /// Whether the preview outline should be drawn closed.
        closed: bool,
    },
}

/// Tracks the single active drawing gesture.
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
}

impl GestureMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Drop any active gesture without committing. Returns whether one was active.
    pub fn reset(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = GestureState::Idle;
        was_active
    }

    /// Feed one input event through the machine.
    pub fn handle(&mut self, event: &InputEvent, cfg: &CanvasConfig) -> GestureOutcome {
        let p = event.position;
        match &event.kind {
            EventKind::KeyDown(key) if key.is("Escape") => {
                if self.reset() {
                    debug!("gesture cancelled");
                    GestureOutcome::Aborted(AbortReason::Cancelled)
                } else {
                    GestureOutcome::Ignored
                }
            }
            EventKind::KeyDown(key) if key.is("Enter") => self.close_polygon(),
            EventKind::PointerDown(Button::Primary) => self.pointer_down(p, cfg),
            EventKind::PointerMove => self.pointer_move(p, cfg),
            EventKind::PointerUp(Button::Primary) => self.pointer_up(p, cfg),
            EventKind::DoubleClick => self.close_polygon(),
            EventKind::PointerDown(_) | EventKind::PointerUp(_) | EventKind::PointerLeave | EventKind::KeyDown(_) => {
                GestureOutcome::Ignored
            }
        }
    }

    fn pointer_down(&mut self, p: Point, cfg: &CanvasConfig) -> GestureOutcome {
        match &mut self.state {
            GestureState::Idle => {
                self.state = match cfg.drawing_mode {
                    DrawingMode::None => return GestureOutcome::Ignored,
                    DrawingMode::Rectangle => GestureState::Rectangle { anchor: p, current: p },
                    DrawingMode::Polygon => GestureState::Polygon { vertices: vec![p], hover: p },
                    DrawingMode::Freestyle => GestureState::Freestyle { points: vec![p] },
                };
                debug!(mode = ?cfg.drawing_mode, x = p.x, y = p.y, "gesture started");
                GestureOutcome::Progress
            }
            GestureState::Polygon { vertices, hover } => {
                let near_first = vertices
                    .first()
                    .is_some_and(|first| hit::within_radius(p, *first, cfg.polygon_close_radius));
                if near_first {
                    return self.close_polygon();
                }
                vertices.push(p);
                *hover = p;
                GestureOutcome::Progress
            }
            // One gesture at a time: a second press during a drag is dropped.
            GestureState::Rectangle { .. } | GestureState::Freestyle { .. } => GestureOutcome::Ignored,
        }
    }

    fn pointer_move(&mut self, p: Point, cfg: &CanvasConfig) -> GestureOutcome {
        match &mut self.state {
            GestureState::Idle => GestureOutcome::Ignored,
            GestureState::Rectangle { current, .. } => {
                *current = p;
                GestureOutcome::Progress
            }
            GestureState::Polygon { hover, .. } => {
                *hover = p;
                GestureOutcome::Progress
            }
            GestureState::Freestyle { points } => {
                let far_enough = points
                    .last()
                    .is_none_or(|last| last.distance_to(p) > cfg.freestyle_min_distance());
                if far_enough {
                    points.push(p);
                    GestureOutcome::Progress
                } else {
                    GestureOutcome::Ignored
                }
            }
        }
    }

    fn pointer_up(&mut self, p: Point, cfg: &CanvasConfig) -> GestureOutcome {
        match std::mem::take(&mut self.state) {
            GestureState::Rectangle { anchor, .. } => {
                let rect = Rect::from_corners(anchor, p);
                if rect.width > cfg.min_rect_size && rect.height > cfg.min_rect_size {
                    GestureOutcome::Commit(Candidate { kind: ShapeKind::Rectangle, geometry: Geometry::Rect(rect) })
                } else {
                    debug!(width = rect.width, height = rect.height, "rectangle below minimum size; discarded");
                    GestureOutcome::Aborted(AbortReason::TooSmall)
                }
            }
            GestureState::Freestyle { mut points } => {
                if points.last() != Some(&p) {
                    points.push(p);
                }
                finish_freestyle(&points, cfg.simplification_tolerance)
            }
            // Polygons advance on presses, not releases.
            other @ (GestureState::Polygon { .. } | GestureState::Idle) => {
                self.state = other;
                GestureOutcome::Ignored
            }
        }
    }

    fn close_polygon(&mut self) -> GestureOutcome {
        if !matches!(self.state, GestureState::Polygon { .. }) {
            return GestureOutcome::Ignored;
        }
        let GestureState::Polygon { vertices, .. } = std::mem::take(&mut self.state) else {
            return GestureOutcome::Ignored;
        };
        let mut vertices = simplify::dedup_consecutive(&vertices, DUPLICATE_VERTEX_EPSILON_PX);
        if vertices.len() > 1
            && vertices
                .first()
                .zip(vertices.last())
                .is_some_and(|(first, last)| first.distance_to(*last) < DUPLICATE_VERTEX_EPSILON_PX)
        {
            vertices.pop();
        }
        if vertices.len() >= 3 {
            GestureOutcome::Commit(Candidate { kind: ShapeKind::Polygon, geometry: Geometry::Path(vertices) })
        } else {
            debug!(vertices = vertices.len(), "polygon closed with too few vertices; discarded");
            GestureOutcome::Aborted(AbortReason::TooFewVertices)
        }
    }

    /// Geometry of the active gesture for the render preview.
    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Rectangle { anchor, current } => Some(Preview::Rect(Rect::from_corners(*anchor, *current))),
            GestureState::Polygon { vertices, hover } => {
                let mut points = vertices.clone();
                points.push(*hover);
                Some(Preview::Path { points, closed: false })
            }
            GestureState::Freestyle { points } => Some(Preview::Path { points: points.clone(), closed: false }),
        }
    }
}

fn finish_freestyle(points: &[Point], tolerance: f64) -> GestureOutcome {
    if !simplify::has_distinct_pair(points) {
        debug!("freestyle path has a single point; discarded");
        return GestureOutcome::Aborted(AbortReason::TooFewPoints);
    }
    let simplified = simplify::simplify_path(points, tolerance);
    if !simplify::has_distinct_pair(&simplified) {
        return GestureOutcome::Aborted(AbortReason::TooFewPoints);
    }
    debug!(raw = points.len(), kept = simplified.len(), "freestyle path simplified");
    GestureOutcome::Commit(Candidate { kind: ShapeKind::Freestyle, geometry: Geometry::Path(simplified) })
}
