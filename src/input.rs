//! Input model: drawing modes, modifier keys, buttons, and the input event.
//!
//! Hosts translate whatever their windowing layer delivers into [`InputEvent`]s
//! in canvas coordinates. Nothing here depends on a particular UI toolkit, so
//! the gesture machine can be driven from tests or from a recorded script.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::shape::ShapeKind;

/// Which gesture handler is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingMode {
    /// No drawing; clicks lock the inspector onto shapes.
    #[default]
    None,
    /// Drag to draw a rectangle.
    Rectangle,
    /// Click vertices, close on the first vertex or double-click.
    Polygon,
    /// Drag to draw a freehand path.
    Freestyle,
}

impl DrawingMode {
    /// The shape kind this mode produces, if it draws at all.
    #[must_use]
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            Self::None => None,
            Self::Rectangle => Some(ShapeKind::Rectangle),
            Self::Polygon => Some(ShapeKind::Polygon),
            Self::Freestyle => Some(ShapeKind::Freestyle),
        }
    }

    /// Whether this mode draws shapes.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        self != Self::None
    }
}

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button, pen contact, or single-finger tap.
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A keyboard key by name (e.g. `"Escape"`, `"Enter"`, `"Delete"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0 == name
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    PointerDown(Button),
    PointerMove,
    PointerUp(Button),
    DoubleClick,
    /// Pointer left the canvas surface.
    PointerLeave,
    KeyDown(Key),
}

/// A single input event in canvas coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: EventKind,
    /// Pointer position in canvas space. Key events carry the last known position.
    pub position: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl InputEvent {
    #[must_use]
    pub fn new(kind: EventKind, position: Point) -> Self {
        Self { kind, position, modifiers: Modifiers::default() }
    }

    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerDown(Button::Primary), Point::new(x, y))
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerMove, Point::new(x, y))
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(EventKind::PointerUp(Button::Primary), Point::new(x, y))
    }

    #[must_use]
    pub fn double_click(x: f64, y: f64) -> Self {
        Self::new(EventKind::DoubleClick, Point::new(x, y))
    }

    #[must_use]
    pub fn key(name: &str, position: Point) -> Self {
        Self::new(EventKind::KeyDown(Key(name.to_owned())), position)
    }
}
