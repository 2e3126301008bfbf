//! Client configuration.
//!
//! Every field has a default matching the stock front-end, so hosts only
//! pass the fields they want to override, e.g. `{"sample_interval_ms": 40}`.

use crate::protocol::CodecError;
use serde::Deserialize;

/// Tunables for the live session and the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Socket endpoint of the layout process. Default: `ws://localhost:9160/`.
    pub endpoint: String,

    /// Minimum time between rendered intermediate frames. Default: **20 ms**.
    pub sample_interval_ms: f64,

    /// Catmull-Rom tension for curve records. Default: **1.0**.
    pub spline_tension: f64,

    /// Stroke width for curves, in pixels. Default: **3.0**.
    pub curve_stroke_width: f64,

    /// Dash (and gap) length for dashed curves. Default: **10.0**.
    pub dash_length: f64,

    /// Radius of point markers. Default: **4.0**.
    pub point_radius: f64,

    /// CSS font used for labels, both when drawing and measuring.
    pub label_font: String,

    /// Opacity applied to an object while it is being dragged. Default: **0.5**.
    pub drag_opacity: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:9160/".to_string(),
            sample_interval_ms: 20.0,
            spline_tension: 1.0,
            curve_stroke_width: 3.0,
            dash_length: 10.0,
            point_radius: 4.0,
            label_font: "italic 16px Palatino".to_string(),
            drag_opacity: 0.5,
        }
    }
}

impl ClientConfig {
    /// Parse a (possibly partial) JSON config object.
    ///
    /// # Errors
    /// Returns [`CodecError::Malformed`] if the text is not a JSON object
    /// with correctly typed fields.
    pub fn from_json(text: &str) -> Result<Self, CodecError> {
        Ok(serde_json::from_str(text)?)
    }
}
