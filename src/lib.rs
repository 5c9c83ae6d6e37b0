//! Embeddable image-annotation canvas core.
//!
//! Users load an image, draw rectangles, polygons and freehand paths over it,
//! inspect shapes through a magnifier and statistics overlay, and read every
//! shape back in both canvas and original-image pixel coordinates. The crate
//! compiles to WebAssembly for the browser and natively for tests and the CLI.
//! The host layer wires its input events to the engine and reacts to the
//! returned [`engine::Action`]s and emitted [`engine::CanvasEvent`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] facade: state, host API, notifications |
//! | [`web`] | Browser [`web::Engine`] wrapper and 2D-context surface |
//! | [`geometry`] | Points, rectangles, and the canvas <-> image placement transform |
//! | [`simplify`] | Douglas-Peucker path simplification |
//! | [`shape`] | Shape kinds, geometry, styles, and the committed shape record |
//! | [`registry`] | Ordered shape store with unique ids |
//! | [`hit`] | Point-in-shape tests and topmost lookup |
//! | [`input`] | Drawing modes and the toolkit-independent input event |
//! | [`gesture`] | Drawing gesture state machine |
//! | [`render`] | Scene rendering onto an abstract [`render::Surface`] |
//! | [`inspect`] | Magnifier, shape statistics, and inspector lock state |
//! | [`load`] | Async image loading and decoding |
//! | [`clipboard`] | Clipboard seam for image paste |
//! | [`config`] | Per-instance configuration with clamping validation |
//! | [`consts`] | Shared thresholds, ranges, and default styles |

pub mod clipboard;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod inspect;
pub mod load;
pub mod registry;
pub mod render;
pub mod shape;
pub mod simplify;
pub mod web;
