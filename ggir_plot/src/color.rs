// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color parsing, R-style grey conversion, and aesthetic color scales.
//!
//! Data columns mapped to the color aesthetic may hold literal colors (hex or
//! CSS names), R grey names (`grey0`..`grey100`), or categorical/continuous
//! values that go through the active color scale. The resolution order is:
//! literal first, grey conversion second, scale mapping last.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashMap;
use peniko::Color;
use peniko::color::{AlphaColor, Srgb};

use ggir_schema::{ColorScaleDesc, DataValue};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Parses a color string the way the IR authors them.
///
/// Handles `greyN`/`grayN` (N in 0..=100, each channel `round(N * 2.55)`),
/// hex strings, and CSS named colors. Returns `None` for `"NA"`, the empty
/// string, and anything unparseable, which callers treat as "not painted".
pub fn convert_color(s: &str) -> Option<Color> {
    if s.is_empty() || s == "NA" || s == "none" {
        return None;
    }
    if let Some(grey) = grey_level(s) {
        let v = (grey * 2.55).round().clamp(0.0, 255.0);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=255")]
        #[allow(clippy::cast_sign_loss, reason = "clamped to 0..=255")]
        let byte = v as u8;
        return Some(Color::from_rgba8(byte, byte, byte, 255));
    }
    peniko::color::parse_color(s)
        .ok()
        .map(|c| c.to_alpha_color::<Srgb>())
}

/// Returns the grey level for `greyN`/`grayN` names.
fn grey_level(s: &str) -> Option<f64> {
    let digits = s.strip_prefix("grey").or_else(|| s.strip_prefix("gray"))?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u32 = digits.parse().ok()?;
    if n > 100 {
        return None;
    }
    Some(f64::from(n))
}

/// Whether a data value is already a literal color rather than a category.
///
/// Hex strings and recognized CSS color names short-circuit the color scale.
pub fn is_literal_color(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix('#') {
        let n = hex.len();
        return (n == 3 || n == 4 || n == 6 || n == 8)
            && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    convert_color(s).is_some() && grey_level(s).is_none() && looks_like_css_name(s)
}

fn looks_like_css_name(s: &str) -> bool {
    // Bare numbers parse as nothing; CSS names are alphabetic (plus rgb()/hsl()).
    s.starts_with("rgb")
        || s.starts_with("hsl")
        || s.chars().all(|c| c.is_ascii_alphabetic())
}

/// The ten-color categorical palette used when the IR supplies no explicit
/// range.
pub const CATEGORICAL_PALETTE: [&str; 10] = [
    "#4e79a7", "#f28e2c", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#af7aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

/// Samples the turbo rainbow colormap at `t` in `[0, 1]`.
///
/// Polynomial approximation per channel, matching the sequential colormap the
/// IR's continuous color scales are defined against.
pub fn turbo(t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let r = 34.61 + t * (1172.33 - t * (10793.56 - t * (33300.12 - t * (38394.49 - t * 14825.05))));
    let g = 23.31 + t * (557.33 + t * (1225.33 - t * (3574.96 - t * (1073.77 + t * 707.56))));
    let b = 27.2 + t * (3211.1 - t * (15327.97 - t * (27814.0 - t * (22569.18 - t * 6838.66))));
    let ch = |v: f64| {
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=255")]
        #[allow(clippy::cast_sign_loss, reason = "clamped to 0..=255")]
        {
            v.round().clamp(0.0, 255.0) as u8
        }
    };
    Color::from_rgba8(ch(r), ch(g), ch(b), 255)
}

/// A color scale instantiated from the IR's color scale descriptor.
#[derive(Clone, Debug)]
pub enum ColorScale {
    /// Continuous domain mapped through [`turbo`].
    Continuous {
        /// Domain minimum.
        min: f64,
        /// Domain maximum.
        max: f64,
    },
    /// Discrete domain mapped through a fixed palette in domain order.
    Discrete {
        /// Palette assignment by category key.
        assignment: HashMap<alloc::string::String, Color>,
    },
}

impl ColorScale {
    /// Builds a color scale from the IR descriptor, or `None` when the chart
    /// maps no color aesthetic.
    pub fn from_desc(desc: Option<&ColorScaleDesc>) -> Option<Self> {
        let desc = desc?;
        if desc.kind.as_deref() == Some("continuous") {
            let nums: Vec<f64> = desc.domain.iter().filter_map(DataValue::as_f64).collect();
            let (min, max) = if nums.is_empty() {
                (0.0, 1.0)
            } else {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for v in nums {
                    lo = lo.min(v);
                    hi = hi.max(v);
                }
                (lo, hi)
            };
            return Some(Self::Continuous { min, max });
        }
        let palette: Vec<Color> = match &desc.range {
            Some(range) if !range.is_empty() => {
                range.iter().filter_map(|s| convert_color(s)).collect()
            }
            _ => CATEGORICAL_PALETTE
                .iter()
                .filter_map(|s| convert_color(s))
                .collect(),
        };
        let mut assignment = HashMap::new();
        for (i, value) in desc.domain.iter().enumerate() {
            if palette.is_empty() {
                break;
            }
            if let Some(key) = value.as_key() {
                assignment.insert(key, palette[i % palette.len()]);
            }
        }
        Some(Self::Discrete { assignment })
    }

    /// Maps a data value through the scale.
    pub fn map(&self, value: &DataValue) -> Option<Color> {
        match self {
            Self::Continuous { min, max } => {
                let v = value.as_f64()?;
                let span = max - min;
                let t = if span == 0.0 { 0.5 } else { (v - min) / span };
                Some(turbo(t))
            }
            Self::Discrete { assignment } => assignment.get(&value.as_key()?).copied(),
        }
    }

    /// Maps a normalized position in `[0, 1]`, used by colorbar guides.
    pub fn map_unit(&self, t: f64) -> Color {
        match self {
            Self::Continuous { .. } => turbo(t),
            Self::Discrete { assignment } => assignment
                .values()
                .next()
                .copied()
                .unwrap_or(AlphaColor::<Srgb>::BLACK),
        }
    }

    /// Domain bounds for continuous scales.
    pub fn continuous_domain(&self) -> Option<(f64, f64)> {
        match self {
            Self::Continuous { min, max } => Some((*min, *max)),
            Self::Discrete { .. } => None,
        }
    }
}
