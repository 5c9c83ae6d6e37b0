//! Shared numeric constants for the annotation canvas.

// ── Gestures ────────────────────────────────────────────────────

/// Default minimum width and height (canvas px) a dragged rectangle must exceed.
pub const MIN_RECT_SIZE_PX: f64 = 2.0;

/// Default radius (canvas px) around the first polygon vertex that closes the polygon.
pub const POLYGON_CLOSE_RADIUS_PX: f64 = 10.0;

/// Two polygon clicks closer than this are treated as one vertex (double-click pairs).
pub const DUPLICATE_VERTEX_EPSILON_PX: f64 = 1.0;

/// Freestyle point spacing at sensitivity 1.0. Divided by the configured sensitivity.
pub const FREESTYLE_BASE_DISTANCE_PX: f64 = 3.0;

// ── Config ranges ───────────────────────────────────────────────

pub const FREESTYLE_SENSITIVITY_MIN: f64 = 0.1;
pub const FREESTYLE_SENSITIVITY_MAX: f64 = 10.0;
pub const DEFAULT_FREESTYLE_SENSITIVITY: f64 = 1.0;

pub const SIMPLIFICATION_TOLERANCE_MIN: f64 = 0.1;
pub const SIMPLIFICATION_TOLERANCE_MAX: f64 = 20.0;
pub const DEFAULT_SIMPLIFICATION_TOLERANCE: f64 = 2.0;

// ── Magnifier ───────────────────────────────────────────────────

/// Side length in pixels of the square magnifier view.
pub const DEFAULT_MAGNIFIER_SIZE_PX: u32 = 150;

/// Magnification factor of the magnifier relative to source image pixels.
pub const DEFAULT_MAGNIFIER_ZOOM: f64 = 4.0;

pub const MAGNIFIER_ZOOM_MIN: f64 = 1.0;
pub const MAGNIFIER_ZOOM_MAX: f64 = 32.0;

// ── Styles ──────────────────────────────────────────────────────

pub const DEFAULT_STROKE: &str = "#000000";
pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
pub const FREESTYLE_STROKE: &str = "#0000FF";
pub const FREESTYLE_LINE_WIDTH: f64 = 2.0;

/// Stroke used for the in-progress gesture preview.
pub const PREVIEW_STROKE: &str = "#1E90FF";

/// Dash segment length for the gesture preview, in canvas pixels.
pub const PREVIEW_DASH_PX: f64 = 4.0;

/// Radius of the marker drawn on the first point of a path preview.
pub const PREVIEW_VERTEX_RADIUS_PX: f64 = 3.0;
