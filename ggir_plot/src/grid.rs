// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panel gridline marks.
//!
//! Minor gridlines draw before major ones so major lines win where they
//! coincide. Major lines fall back to the scale's tick algorithm when the
//! producer supplies no breaks; minor lines draw only from explicit minor
//! breaks.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{Mark, MarkId, PathChannels, line_path};
use ggir_schema::DataValue;
use kurbo::Rect;
use peniko::Brush;

use crate::axis::DEFAULT_TICK_COUNT;
use crate::color::convert_color;
use crate::scale::Scale;
use crate::theme::{Theme, line_dash};
use crate::time;
use crate::z_order;

/// Which panel direction the gridlines run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridOrientation {
    /// Lines parallel to the y axis (positions come from the x scale).
    Vertical,
    /// Lines parallel to the x axis.
    Horizontal,
}

/// Gridline weight tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridTier {
    /// Major lines, at break positions.
    Major,
    /// Minor lines, between breaks.
    Minor,
}

/// Generates gridline marks for one scale direction.
pub fn grid_marks(
    scale: &Scale,
    orientation: GridOrientation,
    breaks: Option<&[DataValue]>,
    panel: Rect,
    theme: &Theme,
    tier: GridTier,
    id_base: u64,
) -> Vec<Mark> {
    let (path, z) = match tier {
        GridTier::Major => ("panel.grid.major", z_order::GRID_MAJOR),
        GridTier::Minor => ("panel.grid.minor", z_order::GRID_MINOR),
    };
    let Some(line) = theme.line(path) else {
        return Vec::new();
    };

    let positions = positions(scale, breaks, tier);
    if positions.is_empty() {
        return Vec::new();
    }

    let color = line
        .colour
        .as_deref()
        .and_then(convert_color)
        .or_else(|| convert_color("#FFFFFF"));
    let Some(color) = color else {
        return Vec::new();
    };
    let stroke = Brush::Solid(color);
    let width = line.linewidth.unwrap_or(1.89);
    let dash = line_dash(&line);

    positions
        .into_iter()
        .enumerate()
        .map(|(i, px)| {
            let geometry = match orientation {
                GridOrientation::Vertical => line_path(px, panel.y0, px, panel.y1),
                GridOrientation::Horizontal => line_path(panel.x0, px, panel.x1, px),
            };
            Mark::path(
                MarkId::from_raw(id_base + i as u64),
                PathChannels {
                    path: geometry,
                    stroke: Some(stroke.clone()),
                    stroke_width: width,
                    dash: dash.clone(),
                    ..PathChannels::default()
                },
            )
            .with_z(z)
            .with_opacity(0.8)
        })
        .collect()
}

/// Pixel positions to rule at: band centers for categorical scales, break
/// positions (else ticks, major only) for continuous ones.
fn positions(scale: &Scale, breaks: Option<&[DataValue]>, tier: GridTier) -> Vec<f64> {
    if let Some(cat) = scale.as_categorical() {
        return cat.centers().map(|(_, c)| c).collect();
    }

    let values: Vec<f64> = match breaks.filter(|b| !b.is_empty()) {
        Some(breaks) => breaks
            .iter()
            .filter_map(|v| {
                if scale.is_temporal() {
                    time::coerce_timestamp_ms(v)
                } else {
                    v.as_f64()
                }
            })
            .collect(),
        None if tier == GridTier::Major => scale.ticks(DEFAULT_TICK_COUNT),
        None => return Vec::new(),
    };

    let (r0, r1) = scale.range();
    let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
    values
        .into_iter()
        .map(|v| scale.map_f64(v))
        .filter(|px| px.is_finite() && *px >= lo - 1.0e-9 && *px <= hi + 1.0e-9)
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use ggir_core::MarkPayload;
    use ggir_schema::ScaleDesc;
    use kurbo::Shape;

    use super::*;

    fn desc(json: &str) -> ScaleDesc {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn minor_without_breaks_draws_nothing() {
        let scale = Scale::from_desc(Some(&desc(r#"{"domain": [0, 10]}"#)), (0.0, 100.0));
        let panel = Rect::new(0.0, 0.0, 100.0, 50.0);
        let marks = grid_marks(
            &scale,
            GridOrientation::Vertical,
            None,
            panel,
            &Theme::new(None),
            GridTier::Minor,
            0,
        );
        assert!(marks.is_empty());
    }

    #[test]
    fn major_falls_back_to_scale_ticks() {
        let scale = Scale::from_desc(Some(&desc(r#"{"domain": [0, 10]}"#)), (0.0, 100.0));
        let panel = Rect::new(0.0, 0.0, 100.0, 50.0);
        let marks = grid_marks(
            &scale,
            GridOrientation::Vertical,
            None,
            panel,
            &Theme::new(None),
            GridTier::Major,
            0,
        );
        assert!(!marks.is_empty());
        for m in &marks {
            assert_eq!(m.z, z_order::GRID_MAJOR);
            assert!((m.opacity - 0.8).abs() < 1e-12);
        }
    }

    #[test]
    fn horizontal_lines_span_the_panel_width() {
        let scale = Scale::from_desc(Some(&desc(r#"{"domain": [0, 10]}"#)), (50.0, 0.0));
        let panel = Rect::new(10.0, 0.0, 90.0, 50.0);
        let breaks = vec![DataValue::from(5.0)];
        let marks = grid_marks(
            &scale,
            GridOrientation::Horizontal,
            Some(&breaks),
            panel,
            &Theme::new(None),
            GridTier::Major,
            0,
        );
        assert_eq!(marks.len(), 1);
        let MarkPayload::Path(p) = &marks[0].payload else {
            panic!("expected path");
        };
        let b = p.path.bounding_box();
        assert_eq!((b.x0, b.x1), (10.0, 90.0));
        assert!((b.y0 - 25.0).abs() < 1e-9);
    }

    #[test]
    fn band_scale_rules_at_centers() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type": "band", "domain": ["a", "b"]}"#)),
            (0.0, 100.0),
        );
        let panel = Rect::new(0.0, 0.0, 100.0, 50.0);
        let marks = grid_marks(
            &scale,
            GridOrientation::Vertical,
            None,
            panel,
            &Theme::new(None),
            GridTier::Major,
            0,
        );
        assert_eq!(marks.len(), 2);
    }

    #[test]
    fn blank_grid_element_suppresses_lines() {
        let theme = Theme::new(Some(
            serde_json::from_str(r#"{"panel":{"grid":{"major":{"type":"blank"}}}}"#).unwrap(),
        ));
        let scale = Scale::from_desc(Some(&desc(r#"{"domain": [0, 10]}"#)), (0.0, 100.0));
        let marks = grid_marks(
            &scale,
            GridOrientation::Vertical,
            None,
            Rect::new(0.0, 0.0, 100.0, 50.0),
            &theme,
            GridTier::Major,
            0,
        );
        assert!(marks.is_empty());
    }
}
