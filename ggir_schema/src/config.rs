// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction configuration objects, supplied by the host alongside the
//! IR when a behavior is enabled.

use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

/// Tooltip configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TooltipConfig {
    /// Row fields to show; `None` means all non-internal fields
    /// (internal: `_`-prefixed, `PANEL`, `group`, `SCALE_X`, `SCALE_Y`).
    pub fields: Option<Vec<String>>,
}

/// Hover highlight configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    /// Opacity applied to non-hovered marks.
    pub opacity: f64,
    /// Optional accent stroke for the hovered mark.
    pub stroke: Option<String>,
    /// Accent stroke width.
    pub stroke_width: Option<f64>,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            opacity: 0.3,
            stroke: None,
            stroke_width: None,
        }
    }
}

/// Brush selection configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    /// Constrained brush axis: "xy", "x", or "y".
    pub direction: String,
    /// Selection rectangle fill color.
    pub fill: String,
    /// Opacity applied to non-selected marks.
    pub opacity: f64,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            direction: String::from("xy"),
            fill: String::from("steelblue"),
            opacity: 0.3,
        }
    }
}

/// Zoom/pan configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    /// Allowed zoom factor range `[min, max]`.
    pub scale_extent: [f64; 2],
    /// Constrained zoom axis: "both", "x", or "y".
    pub direction: String,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            scale_extent: [1.0, 20.0],
            direction: String::from("both"),
        }
    }
}

/// Linked-selection bus configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LinkedConfig {
    /// One external identity key per data row, in row order.
    pub key: Vec<String>,
    /// Selection group shared with peer widgets.
    pub group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_defaults_allow_twenty_x() {
        let z: ZoomConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(z.scale_extent, [1.0, 20.0]);
        assert_eq!(z.direction, "both");
    }

    #[test]
    fn brush_defaults() {
        let b: BrushConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(b.direction, "xy");
        assert!((b.opacity - 0.3).abs() < 1e-12);
    }
}
