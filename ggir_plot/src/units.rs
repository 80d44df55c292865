// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Physical unit conversions.
//!
//! All sizes in the chart IR are authored in millimetres (line widths, point
//! sizes) or typographic points (font sizes, theme spacing). Rendering works
//! in CSS pixels at a fixed 96 dpi, so the conversions here are exact
//! constants rather than something queried from a display.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use ggir_core::DashPattern;

/// Render resolution in dots per inch. Fixed; never queried from a display.
pub const DPI: f64 = 96.0;

/// Pixels per millimetre at [`DPI`].
pub const PX_PER_MM: f64 = DPI / 25.4;

/// Pixels per typographic point at [`DPI`].
pub const PX_PER_PT: f64 = DPI / 72.0;

/// Converts a size in millimetres to a circle radius in pixels.
///
/// Point sizes in the IR are diameters, so the radius is half the converted
/// size.
pub fn mm_to_px_radius(mm: f64) -> f64 {
    mm * PX_PER_MM / 2.0
}

/// Converts a line width in millimetres to pixels.
pub fn mm_to_px_linewidth(mm: f64) -> f64 {
    mm * PX_PER_MM
}

/// Converts a font or spacing size in typographic points to pixels.
pub fn pt_to_px(pt: f64) -> f64 {
    pt * PX_PER_PT
}

/// Resolves a named or numeric linetype into a dash pattern in pixels.
///
/// Named linetypes carry the conventional R patterns. A hex-digit string like
/// `"1343"` is interpreted as alternating on/off run lengths. Returns an empty
/// pattern for `"solid"` or anything unrecognized, which renders as a solid
/// stroke.
pub fn linetype_dash(linetype: &str) -> DashPattern {
    let named: Option<&[f64]> = match linetype {
        "solid" | "1" => return DashPattern::new(),
        "dashed" | "2" => Some(&[4.0, 4.0]),
        "dotted" | "3" => Some(&[1.0, 3.0]),
        "dotdash" | "4" => Some(&[1.0, 3.0, 4.0, 3.0]),
        "longdash" | "5" => Some(&[7.0, 3.0]),
        "twodash" | "6" => Some(&[2.0, 2.0, 6.0, 2.0]),
        _ => None,
    };
    if let Some(pattern) = named {
        return DashPattern::from_slice(pattern);
    }
    if !linetype.is_empty() && linetype.bytes().all(|b| b.is_ascii_hexdigit()) {
        return linetype
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(f64::from)
            .collect();
    }
    DashPattern::new()
}

/// Formats a dash pattern as an SVG `stroke-dasharray` value.
pub fn dash_attr(dash: &DashPattern) -> Option<String> {
    if dash.is_empty() {
        return None;
    }
    let parts: Vec<String> = dash.iter().map(|d| crate::format::fmt_f64(*d)).collect();
    Some(parts.join(","))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn mm_conversions_match_96_dpi() {
        assert!((PX_PER_MM - 3.779_527_559_055_118).abs() < 1e-12);
        assert!((mm_to_px_radius(1.5) - 2.834_645_669_291_338_5).abs() < 1e-9);
        assert!((mm_to_px_linewidth(0.5) - 1.889_763_779_527_559).abs() < 1e-9);
    }

    #[test]
    fn pt_conversion_matches_96_dpi() {
        assert!((pt_to_px(11.0) - 14.666_666_666_666_666).abs() < 1e-9);
    }

    #[test]
    fn named_linetypes_resolve() {
        assert_eq!(linetype_dash("dashed").as_slice(), &[4.0, 4.0]);
        assert_eq!(linetype_dash("dotted").as_slice(), &[1.0, 3.0]);
        assert_eq!(linetype_dash("twodash").as_slice(), &[2.0, 2.0, 6.0, 2.0]);
        assert!(linetype_dash("solid").is_empty());
    }

    #[test]
    fn hex_linetype_expands_to_runs() {
        assert_eq!(linetype_dash("1343").as_slice(), &[1.0, 3.0, 4.0, 3.0]);
        assert_eq!(linetype_dash("F2").as_slice(), &[15.0, 2.0]);
    }

    #[test]
    fn unknown_linetype_is_solid() {
        assert!(linetype_dash("wavy").is_empty());
    }
}
