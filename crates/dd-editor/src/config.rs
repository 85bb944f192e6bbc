//! Editor configuration.
//!
//! Every field has a default, so a host only needs to send the keys it
//! wants to change:
//!
//! ```json
//! { "max_zoom": 8.0, "tap_dwell_ms": 150 }
//! ```

use dd_core::{Point, Style};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Wheel zoom-in multiplier.
    pub zoom_in_factor: f64,
    /// Wheel zoom-out multiplier.
    pub zoom_out_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// How long a pen press must stay still to count as a tap.
    pub tap_dwell_ms: u64,
    /// Radius of the dot a pen tap places.
    pub tap_dot_radius: f64,
    /// Scene-space slack for polyline hit testing.
    pub hit_tolerance: f64,
    /// Outset of the selection outline.
    pub selection_margin: f64,
    /// Scene position of imported images.
    pub image_origin: Point,
    /// Imported images are sized to this fraction of their natural size.
    pub image_scale: f64,
    pub history_depth: usize,
    pub pen_style: Style,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            zoom_in_factor: dd_core::view::ZOOM_IN_FACTOR,
            zoom_out_factor: dd_core::view::ZOOM_OUT_FACTOR,
            min_zoom: 0.1,
            max_zoom: 10.0,
            tap_dwell_ms: 200,
            tap_dot_radius: 3.0,
            hit_tolerance: dd_core::geometry::POLYLINE_TOLERANCE,
            selection_margin: 2.0,
            image_origin: Point::new(100.0, 100.0),
            image_scale: 0.5,
            history_depth: 100,
            pen_style: Style::default(),
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.zoom_in_factor > 1.0) {
            return Err(invalid("zoom_in_factor", "must be greater than 1"));
        }
        if !(self.zoom_out_factor > 0.0 && self.zoom_out_factor < 1.0) {
            return Err(invalid("zoom_out_factor", "must be between 0 and 1"));
        }
        if !(self.min_zoom > 0.0) {
            return Err(invalid("min_zoom", "must be positive"));
        }
        if !(self.max_zoom >= self.min_zoom) {
            return Err(invalid(
                "max_zoom",
                format!("{} is below min_zoom {}", self.max_zoom, self.min_zoom),
            ));
        }
        if !(self.tap_dot_radius > 0.0) {
            return Err(invalid("tap_dot_radius", "must be positive"));
        }
        if !(self.hit_tolerance >= 0.0) {
            return Err(invalid("hit_tolerance", "must not be negative"));
        }
        if !(self.image_scale > 0.0) {
            return Err(invalid("image_scale", "must be positive"));
        }
        if self.history_depth == 0 {
            return Err(invalid("history_depth", "must be at least 1"));
        }
        Ok(())
    }

    pub fn zoom_factors(&self) -> (f64, f64) {
        (self.zoom_in_factor, self.zoom_out_factor)
    }
}
