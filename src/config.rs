//! Per-instance canvas configuration.
//!
//! Hosts pass a [`CanvasConfig`] at construction (usually deserialized from
//! JSON in camelCase) and later adjust it with a sparse [`ConfigPatch`].
//! Out-of-range numbers are clamped into their documented ranges rather than
//! rejected; non-finite values fall back to the default.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    DEFAULT_FREESTYLE_SENSITIVITY, DEFAULT_MAGNIFIER_SIZE_PX, DEFAULT_MAGNIFIER_ZOOM, DEFAULT_SIMPLIFICATION_TOLERANCE,
    FREESTYLE_BASE_DISTANCE_PX, FREESTYLE_SENSITIVITY_MAX, FREESTYLE_SENSITIVITY_MIN, MAGNIFIER_ZOOM_MAX,
    MAGNIFIER_ZOOM_MIN, MIN_RECT_SIZE_PX, POLYGON_CLOSE_RADIUS_PX, SIMPLIFICATION_TOLERANCE_MAX,
    SIMPLIFICATION_TOLERANCE_MIN,
};
use crate::input::DrawingMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid canvas config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Canvas behaviour switches and tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanvasConfig {
    /// Whether `paste_image` may read from the clipboard.
    pub paste_enabled: bool,
    /// Which gesture handler is armed.
    pub drawing_mode: DrawingMode,
    /// Freehand point density, 0.1-10. Higher records more points.
    pub freestyle_sensitivity: f64,
    /// Freehand simplification tolerance in pixels, 0.1-20.
    pub simplification_tolerance: f64,
    /// Minimum width and height (canvas px) a dragged rectangle must exceed.
    pub min_rect_size: f64,
    /// Click radius (canvas px) around the first polygon vertex that closes it.
    pub polygon_close_radius: f64,
    /// Side length of the magnifier view in pixels.
    pub magnifier_size: u32,
    /// Magnifier zoom factor relative to source image pixels.
    pub magnifier_zoom: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            paste_enabled: true,
            drawing_mode: DrawingMode::None,
            freestyle_sensitivity: DEFAULT_FREESTYLE_SENSITIVITY,
            simplification_tolerance: DEFAULT_SIMPLIFICATION_TOLERANCE,
            min_rect_size: MIN_RECT_SIZE_PX,
            polygon_close_radius: POLYGON_CLOSE_RADIUS_PX,
            magnifier_size: DEFAULT_MAGNIFIER_SIZE_PX,
            magnifier_zoom: DEFAULT_MAGNIFIER_ZOOM,
        }
    }
}

/// Sparse config update. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paste_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing_mode: Option<DrawingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freestyle_sensitivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simplification_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rect_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polygon_close_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnifier_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnifier_zoom: Option<f64>,
}

impl CanvasConfig {
    /// Parse a config from JSON and clamp it into range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the input is not a valid config object.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        Ok(cfg.validated())
    }

    /// Clamp every numeric field into its documented range.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        self.freestyle_sensitivity = clamp_field(
            "freestyleSensitivity",
            self.freestyle_sensitivity,
            FREESTYLE_SENSITIVITY_MIN,
            FREESTYLE_SENSITIVITY_MAX,
            defaults.freestyle_sensitivity,
        );
        self.simplification_tolerance = clamp_field(
            "simplificationTolerance",
            self.simplification_tolerance,
            SIMPLIFICATION_TOLERANCE_MIN,
            SIMPLIFICATION_TOLERANCE_MAX,
            defaults.simplification_tolerance,
        );
        self.min_rect_size = clamp_field("minRectSize", self.min_rect_size, 0.0, f64::MAX, defaults.min_rect_size);
        self.polygon_close_radius =
            clamp_field("polygonCloseRadius", self.polygon_close_radius, 0.0, f64::MAX, defaults.polygon_close_radius);
        self.magnifier_zoom =
            clamp_field("magnifierZoom", self.magnifier_zoom, MAGNIFIER_ZOOM_MIN, MAGNIFIER_ZOOM_MAX, defaults.magnifier_zoom);
        if self.magnifier_size == 0 {
            warn!(field = "magnifierSize", "zero magnifier size; using default");
            self.magnifier_size = defaults.magnifier_size;
        }
        self
    }

    /// Apply a patch, then re-validate.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(v) = patch.paste_enabled {
            self.paste_enabled = v;
        }
        if let Some(v) = patch.drawing_mode {
            self.drawing_mode = v;
        }
        if let Some(v) = patch.freestyle_sensitivity {
            self.freestyle_sensitivity = v;
        }
        if let Some(v) = patch.simplification_tolerance {
            self.simplification_tolerance = v;
        }
        if let Some(v) = patch.min_rect_size {
            self.min_rect_size = v;
        }
        if let Some(v) = patch.polygon_close_radius {
            self.polygon_close_radius = v;
        }
        if let Some(v) = patch.magnifier_size {
            self.magnifier_size = v;
        }
        if let Some(v) = patch.magnifier_zoom {
            self.magnifier_zoom = v;
        }
        *self = self.clone().validated();
    }

    /// Minimum spacing (canvas px) between recorded freehand points.
    #[must_use]
    pub fn freestyle_min_distance(&self) -> f64 {
        FREESTYLE_BASE_DISTANCE_PX / self.freestyle_sensitivity
    }
}

fn clamp_field(field: &'static str, value: f64, min: f64, max: f64, default: f64) -> f64 {
    if !value.is_finite() {
        warn!(field, "non-finite config value; using default");
        return default;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        warn!(field, value, clamped, "config value out of range; clamped");
    }
    clamped
}
