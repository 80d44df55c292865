// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip content and placement.
//!
//! Pure functions only: the host owns the tooltip surface; this module
//! decides which fields to show, how to format them, and where to anchor
//! the box so it stays inside the viewport.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ggir_plot::{Scale, format_date_ms, format_sig};
use ggir_schema::{DataValue, LayerIr, TooltipConfig};
use kurbo::{Point, Size};

/// Significant digits for numeric tooltip values.
const NUMERIC_DIGITS: u32 = 4;

/// Gap between the cursor and the tooltip box, in pixels.
const CURSOR_OFFSET: f64 = 12.0;

/// Stat and bookkeeping columns never shown to the user.
fn is_internal(field: &str) -> bool {
    field.starts_with('_')
        || matches!(field, "PANEL" | "group" | "SCALE_X" | "SCALE_Y")
}

/// One formatted tooltip row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TooltipLine {
    /// Field label, the column name as-is.
    pub field: String,
    /// Formatted value.
    pub value: String,
}

fn format_value(value: &DataValue, temporal: bool) -> Option<String> {
    match value {
        DataValue::Null => None,
        DataValue::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        DataValue::Number(v) if temporal => Some(format_date_ms(*v)),
        DataValue::Number(v) => Some(format_sig(*v, NUMERIC_DIGITS)),
        DataValue::String(s) => Some(s.clone()),
        DataValue::List(_) => value.as_key(),
    }
}

/// Format a data row for display.
///
/// With `fields` configured, those columns appear in the configured order
/// (missing ones are skipped). Otherwise every non-internal column of the
/// row appears in column order. Columns mapped to a temporal positional
/// scale format as dates rather than raw millisecond counts.
pub fn tooltip_lines(
    layer: &LayerIr,
    row: usize,
    config: &TooltipConfig,
    x: &Scale,
    y: &Scale,
) -> Vec<TooltipLine> {
    let Some(cells) = layer.data.rows().get(row) else {
        return Vec::new();
    };
    let temporal_col = |field: &str| {
        (x.is_temporal() && layer.aes_col("x").unwrap_or("x") == field)
            || (y.is_temporal() && layer.aes_col("y").unwrap_or("y") == field)
    };

    let mut out = Vec::new();
    let mut push = |field: &str, value: &DataValue| {
        if let Some(value) = format_value(value, temporal_col(field)) {
            out.push(TooltipLine {
                field: field.to_string(),
                value,
            });
        }
    };
    match &config.fields {
        Some(fields) => {
            for field in fields {
                if let Some(value) = cells.get(field.as_str()) {
                    push(field, value);
                }
            }
        }
        None => {
            for (field, value) in cells {
                if !is_internal(field) {
                    push(field, value);
                }
            }
        }
    }
    out
}

/// Anchor a tooltip box near the cursor, flipping at viewport edges.
///
/// The box sits below-right of the cursor by default; when that would
/// overflow the right or bottom edge it flips to the opposite side of the
/// cursor on that axis. The result never goes negative.
pub fn tooltip_anchor(cursor: Point, tip: Size, viewport: Size) -> Point {
    let mut x = cursor.x + CURSOR_OFFSET;
    if x + tip.width > viewport.width {
        x = cursor.x - CURSOR_OFFSET - tip.width;
    }
    let mut y = cursor.y + CURSOR_OFFSET;
    if y + tip.height > viewport.height {
        y = cursor.y - CURSOR_OFFSET - tip.height;
    }
    Point::new(x.max(0.0), y.max(0.0))
}
