// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `ggir_schema`: the chart intermediate representation (IR).
//!
//! The IR is a JSON tree describing one chart completely: scales, layers,
//! facets, theme, guides, and coordinate options. This crate owns:
//! - the serde data model for that tree ([`ChartIr`] and friends),
//! - loose-value coercion ([`DataValue`]),
//! - row/column data normalization ([`Frame`]),
//! - the accepted render payload forms ([`parse_payload`]), and
//! - the interaction configuration objects.
//!
//! Everything downstream (layout, geometry, interactions) consumes these
//! types; nothing here draws.

#![no_std]

extern crate alloc;

mod config;
mod frame;
mod ir;
mod value;

pub use config::{BrushConfig, HoverConfig, LinkedConfig, TooltipConfig, ZoomConfig};
pub use frame::{Frame, Row};
pub use ir::{
    AxesIr, AxisDesc, ChartIr, ColorScaleDesc, CoordDesc, FacetCell, FacetDesc, GuideDesc,
    GuideKey, LayerIr, LegendIr, PaddingIr, PanelDesc, ScaleDesc, ScalesIr, StripIr,
};
pub use value::DataValue;

use alloc::string::ToString;

/// Raw JSON value, used for the free-form theme subtree.
pub type JsonValue = serde_json::Value;

/// Errors produced while accepting a render payload.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// The payload string was not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    Json(alloc::string::String),
    /// The IR parsed but is structurally unusable (no `scales` key).
    ///
    /// Callers render a visible placeholder for this case rather than
    /// failing silently.
    #[error("IR is missing the required `scales` object")]
    MissingScales,
}

/// Parse a render payload from its JSON text form.
///
/// Three payload shapes are accepted: the IR object directly, an
/// `{"ir": ...}` wrapper, or a JSON *string* containing either of those
/// (hosts sometimes double-encode). A structurally invalid IR (no `scales`)
/// is an error so the caller can draw its placeholder.
pub fn parse_payload(text: &str) -> Result<ChartIr, IrError> {
    let value: JsonValue =
        serde_json::from_str(text).map_err(|e| IrError::Json(e.to_string()))?;
    payload_from_value(value)
}

/// Accept an already-parsed JSON payload in any of the three shapes.
pub fn payload_from_value(mut value: JsonValue) -> Result<ChartIr, IrError> {
    // Unwrap {"ir": ...} and double-encoded strings, in either order.
    loop {
        value = match value {
            JsonValue::String(text) => {
                serde_json::from_str(&text).map_err(|e| IrError::Json(e.to_string()))?
            }
            JsonValue::Object(mut map) if map.contains_key("ir") => {
                map.remove("ir").unwrap_or(JsonValue::Null)
            }
            other => {
                value = other;
                break;
            }
        };
    }
    if value.get("scales").is_none() {
        return Err(IrError::MissingScales);
    }
    serde_json::from_value(value).map_err(|e| IrError::Json(e.to_string()))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const MINIMAL: &str = r#"{"scales": {"x": {"domain": [0, 10]}, "y": {"domain": [0, 1]}}}"#;

    #[test]
    fn accepts_direct_ir() {
        let ir = parse_payload(MINIMAL).unwrap();
        assert!(ir.scales.x.is_some());
    }

    #[test]
    fn accepts_wrapped_ir() {
        let wrapped = std::format!(r#"{{"ir": {MINIMAL}}}"#);
        assert!(parse_payload(&wrapped).is_ok());
    }

    #[test]
    fn accepts_double_encoded_string() {
        let encoded = serde_json::to_string(MINIMAL).unwrap();
        assert!(parse_payload(&encoded).is_ok());
        let wrapped = std::format!(r#"{{"ir": {encoded}}}"#);
        assert!(parse_payload(&wrapped).is_ok());
    }

    #[test]
    fn missing_scales_is_structural_error() {
        let err = parse_payload(r#"{"layers": []}"#).unwrap_err();
        assert!(matches!(err, IrError::MissingScales));
    }

    #[test]
    fn bad_json_is_reported_not_panicked() {
        assert!(matches!(parse_payload("{nope"), Err(IrError::Json(_))));
    }
}
