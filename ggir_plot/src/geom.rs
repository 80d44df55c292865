// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry renderer registry and the helpers every renderer shares.
//!
//! Each layer names a geom; the registry maps that name onto a renderer in
//! one explicit match, so the full set of drawable geometries is a closed
//! enum rather than a mutable name table. All renderers follow the same
//! contract: filter rows whose required positional aesthetics fail coercion,
//! resolve paint through [`Paint`], branch per attribute under `coord_flip`,
//! and return how many marks they drew.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use ggir_core::Mark;
use ggir_schema::{DataValue, LayerIr};
use kurbo::Rect;
use peniko::Color;

use crate::color::{ColorScale, convert_color, is_literal_color};
use crate::scale::Scale;
use crate::units::mm_to_px_linewidth;
use crate::{
    area_mark, bar_mark, boxplot_mark, line_mark, point_mark, rect_mark, rule_mark, segment_mark,
    text_mark, violin_mark,
};

/// The closed set of drawable geometries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeomKind {
    /// `geom_point`.
    Point,
    /// `geom_line`: sorts by x within groups when x is continuous.
    Line,
    /// `geom_path`: preserves row order.
    Path,
    /// `geom_smooth`: confidence ribbon under an always-opaque fitted line.
    Smooth,
    /// `geom_bar`.
    Bar,
    /// `geom_col`.
    Col,
    /// `geom_rect`.
    RectGeom,
    /// `geom_tile`.
    Tile,
    /// `geom_area`.
    Area,
    /// `geom_ribbon`: fills `ymin..ymax`, never a baseline.
    Ribbon,
    /// `geom_density`: filled area plus an outline stroke.
    Density,
    /// `geom_boxplot`.
    Boxplot,
    /// `geom_violin`.
    Violin,
    /// `geom_text`.
    Text,
    /// `geom_segment`.
    Segment,
    /// `geom_hline`.
    HLine,
    /// `geom_vline`.
    VLine,
    /// `geom_abline`.
    ALine,
}

impl GeomKind {
    /// Resolves a producer geom tag, `None` when nothing can draw it.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "point" => Self::Point,
            "line" => Self::Line,
            "path" => Self::Path,
            "smooth" => Self::Smooth,
            "bar" => Self::Bar,
            "col" => Self::Col,
            "rect" => Self::RectGeom,
            "tile" => Self::Tile,
            "area" => Self::Area,
            "ribbon" => Self::Ribbon,
            "density" => Self::Density,
            "boxplot" => Self::Boxplot,
            "violin" => Self::Violin,
            "text" => Self::Text,
            "segment" => Self::Segment,
            "hline" => Self::HLine,
            "vline" => Self::VLine,
            "abline" => Self::ALine,
            _ => return None,
        })
    }
}

/// Everything a geometry renderer needs besides the layer itself.
///
/// Under `flip` the x scale's pixel range is vertical and the y scale's is
/// horizontal; renderers branch per attribute rather than swapping after the
/// fact.
#[derive(Clone, Copy)]
pub struct GeomCtx<'a> {
    /// Layer index, used for datum keys.
    pub layer_index: u32,
    /// Scale for the x aesthetic.
    pub x: &'a Scale,
    /// Scale for the y aesthetic.
    pub y: &'a Scale,
    /// Active color scale, if the chart maps a color aesthetic.
    pub color: Option<&'a ColorScale>,
    /// Panel box in scene coordinates.
    pub panel: Rect,
    /// Axis-swap mode.
    pub flip: bool,
    /// Clip id marks should carry so they stay inside the panel.
    pub clip: &'a str,
    /// When faceted, only rows whose `PANEL` column matches draw.
    pub panel_id: Option<&'a DataValue>,
}

impl GeomCtx<'_> {
    /// Row indices belonging to this panel.
    pub fn rows(&self, layer: &LayerIr) -> Vec<usize> {
        (0..layer.data.len())
            .filter(|&row| match self.panel_id {
                None => true,
                Some(want) => layer
                    .column_key(row, "PANEL")
                    .is_some_and(|k| Some(k) == want.as_key()),
            })
            .collect()
    }
}

/// Helper trait kept local: key coercion on an optional cell.
trait LayerExt {
    fn column_key(&self, row: usize, col: &str) -> Option<String>;
}

impl LayerExt for LayerIr {
    fn column_key(&self, row: usize, col: &str) -> Option<String> {
        self.column_value(row, col).and_then(DataValue::as_key)
    }
}

/// Renders one layer into `out`, dispatching on the geom tag.
///
/// Unknown geoms log a warning and contribute zero marks; a bad layer never
/// takes the chart down with it.
pub fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let Some(kind) = GeomKind::from_name(&layer.geom) else {
        tracing::warn!(geom = %layer.geom, "unknown geom, layer skipped");
        return 0;
    };
    match kind {
        GeomKind::Point => point_mark::render(layer, ctx, out),
        GeomKind::Line | GeomKind::Path => {
            line_mark::render(layer, ctx, kind == GeomKind::Line, out)
        }
        GeomKind::Smooth => area_mark::render_smooth(layer, ctx, out),
        GeomKind::Bar | GeomKind::Col => bar_mark::render(layer, ctx, out),
        GeomKind::RectGeom | GeomKind::Tile => rect_mark::render(layer, ctx, out),
        GeomKind::Area => area_mark::render_area(layer, ctx, false, out),
        GeomKind::Ribbon => area_mark::render_ribbon(layer, ctx, out),
        GeomKind::Density => area_mark::render_area(layer, ctx, true, out),
        GeomKind::Boxplot => boxplot_mark::render(layer, ctx, out),
        GeomKind::Violin => violin_mark::render(layer, ctx, out),
        GeomKind::Text => text_mark::render(layer, ctx, out),
        GeomKind::Segment => segment_mark::render(layer, ctx, out),
        GeomKind::HLine => rule_mark::render_hline(layer, ctx, out),
        GeomKind::VLine => rule_mark::render_vline(layer, ctx, out),
        GeomKind::ALine => rule_mark::render_abline(layer, ctx, out),
    }
}

/// Per-row paint resolution shared by every renderer.
///
/// Stroke and fill resolve in the same five steps: literal color string,
/// grey-name conversion, color-scale mapping, static layer parameter,
/// hardcoded terminal default. Opacity comes from the alpha aesthetic and
/// defaults to fully opaque.
pub struct Paint<'a> {
    layer: &'a LayerIr,
    color: Option<&'a ColorScale>,
}

impl<'a> Paint<'a> {
    /// Binds the layer's aesthetic mapping and the chart's color scale.
    pub fn new(layer: &'a LayerIr, ctx: &GeomCtx<'a>) -> Self {
        Self {
            layer,
            color: ctx.color,
        }
    }

    /// Stroke color for a row. Terminal default is black, standing in for
    /// the CSS `currentColor` the producer assumes.
    pub fn stroke(&self, row: usize) -> Color {
        self.resolve(row, &["color", "colour"], "colour")
            .unwrap_or(peniko::color::palette::css::BLACK)
    }

    /// Fill color for a row; terminal default `grey35`.
    pub fn fill(&self, row: usize) -> Color {
        self.resolve(row, &["fill"], "fill")
            .or_else(|| convert_color("grey35"))
            .unwrap_or(peniko::color::palette::css::BLACK)
    }

    /// Opacity from the alpha aesthetic, 1.0 when unmapped.
    pub fn opacity(&self, row: usize) -> f64 {
        let mapped = self
            .layer
            .aes_col("alpha")
            .and_then(|col| self.layer.column_value(row, col))
            .and_then(DataValue::as_f64);
        mapped.unwrap_or(1.0)
    }

    fn resolve(&self, row: usize, roles: &[&str], param: &str) -> Option<Color> {
        for role in roles {
            let Some(col) = self.layer.aes_col(role) else {
                continue;
            };
            if let Some(value) = self.layer.column_value(row, col) {
                if let Some(color) = map_color_value(value, self.color) {
                    return Some(color);
                }
            }
            // Aesthetic mapped but unresolvable: fall back to the parameter.
            break;
        }
        self.layer.param_str(param).and_then(convert_color)
    }
}

/// Resolves one data value to a color: literal strings win over the scale.
fn map_color_value(value: &DataValue, scale: Option<&ColorScale>) -> Option<Color> {
    if let Some(s) = value.as_str() {
        if is_literal_color(s) {
            return convert_color(s);
        }
        // greyN names convert without consulting the scale.
        if s.starts_with("grey") || s.starts_with("gray") {
            if let Some(c) = convert_color(s) {
                return Some(c);
            }
        }
    }
    scale?.map(value)
}

/// Row linewidth in px: the `linewidth` column in mm when present, else the
/// given pixel default.
pub fn linewidth_px(layer: &LayerIr, row: usize, default_px: f64) -> f64 {
    layer
        .column_value(row, "linewidth")
        .and_then(DataValue::as_f64)
        .map_or(default_px, mm_to_px_linewidth)
}

/// Baseline pixel for bar/area geoms: zero when the value domain straddles
/// it, else the domain minimum. Band value scales pin to the panel edge the
/// caller passes.
pub fn baseline_px(value_scale: &Scale, band_fallback: f64) -> f64 {
    match value_scale.domain_bounds() {
        Some((d0, d1)) => {
            let (lo, hi) = if d0 <= d1 { (d0, d1) } else { (d1, d0) };
            if lo <= 0.0 && hi >= 0.0 {
                value_scale.map_f64(0.0)
            } else {
                value_scale.map_f64(lo)
            }
        }
        None => band_fallback,
    }
}

/// Partitions rows by the `group` column, default group `1`, preserving
/// first-seen group order.
pub fn group_rows(layer: &LayerIr, rows: &[usize]) -> Vec<Vec<usize>> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for &row in rows {
        let key = layer
            .column_value(row, "group")
            .and_then(DataValue::as_key)
            .unwrap_or_else(|| String::from("1"));
        match order.iter().position(|k| *k == key) {
            Some(i) => buckets[i].push(row),
            None => {
                order.push(key);
                buckets.push(alloc::vec![row]);
            }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    extern crate std;

    use ggir_schema::LayerIr;

    use super::*;
    use crate::scale::Scale;

    fn layer(json: &str) -> LayerIr {
        serde_json::from_str(json).unwrap()
    }

    fn hex(c: Color) -> alloc::string::String {
        let rgba = c.to_rgba8();
        alloc::format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }

    fn ctx<'a>(x: &'a Scale, y: &'a Scale, color: Option<&'a ColorScale>) -> GeomCtx<'a> {
        GeomCtx {
            layer_index: 0,
            x,
            y,
            color,
            panel: Rect::new(0.0, 0.0, 100.0, 100.0),
            flip: false,
            clip: "panel-clip-0",
            panel_id: None,
        }
    }

    fn linear(range: (f64, f64)) -> Scale {
        let desc: ggir_schema::ScaleDesc =
            serde_json::from_str(r#"{"domain": [0, 10]}"#).unwrap();
        Scale::from_desc(Some(&desc), range)
    }

    #[test]
    fn literal_hex_beats_the_color_scale() {
        let l = layer(
            r##"{"geom":"point","aes":{"fill":"f"},
                "data":{"f":["#ff0000"]}}"##,
        );
        let scale_desc: ggir_schema::ColorScaleDesc = serde_json::from_str(
            r##"{"type":"discrete","domain":["#ff0000"]}"##,
        )
        .unwrap();
        let cs = ColorScale::from_desc(Some(&scale_desc)).unwrap();
        let x = linear((0.0, 100.0));
        let y = linear((100.0, 0.0));
        let c = ctx(&x, &y, Some(&cs));
        let paint = Paint::new(&l, &c);
        assert_eq!(hex(paint.fill(0)), "#ff0000");
    }

    #[test]
    fn unmapped_fill_falls_back_to_param_then_grey35() {
        let with_param = layer(r#"{"geom":"bar","params":{"fill":"steelblue"},"data":{}}"#);
        let bare = layer(r#"{"geom":"bar","data":{}}"#);
        let x = linear((0.0, 100.0));
        let y = linear((100.0, 0.0));
        let c = ctx(&x, &y, None);
        assert_eq!(
            hex(Paint::new(&with_param, &c).fill(0)),
            hex(convert_color("steelblue").unwrap())
        );
        assert_eq!(
            hex(Paint::new(&bare, &c).fill(0)),
            hex(convert_color("grey35").unwrap())
        );
    }

    #[test]
    fn category_values_map_through_the_scale() {
        let l = layer(
            r#"{"geom":"point","aes":{"color":"cls"},
                "data":{"cls":["a","b"]}}"#,
        );
        let scale_desc: ggir_schema::ColorScaleDesc =
            serde_json::from_str(r#"{"type":"discrete","domain":["a","b"]}"#).unwrap();
        let cs = ColorScale::from_desc(Some(&scale_desc)).unwrap();
        let x = linear((0.0, 100.0));
        let y = linear((100.0, 0.0));
        let c = ctx(&x, &y, Some(&cs));
        let paint = Paint::new(&l, &c);
        assert_eq!(hex(paint.stroke(0)), "#4e79a7");
        assert_eq!(hex(paint.stroke(1)), "#f28e2c");
    }

    #[test]
    fn baseline_prefers_zero_when_in_domain() {
        let y = linear((100.0, 0.0));
        assert!((baseline_px(&y, 100.0) - 100.0).abs() < 1e-9);

        let desc: ggir_schema::ScaleDesc =
            serde_json::from_str(r#"{"domain": [5, 10]}"#).unwrap();
        let above = Scale::from_desc(Some(&desc), (100.0, 0.0));
        assert!((baseline_px(&above, 100.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn grouping_defaults_to_one_bucket() {
        let no_group = layer(r#"{"geom":"line","data":{"x":[1,2,3]}}"#);
        let rows = [0usize, 1, 2].to_vec();
        assert_eq!(group_rows(&no_group, &rows).len(), 1);

        let grouped = layer(r#"{"geom":"line","data":{"x":[1,2,3],"group":[1,2,1]}}"#);
        let buckets = group_rows(&grouped, &rows);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0], alloc::vec![0, 2]);
    }

    #[test]
    fn panel_filter_keeps_matching_rows_only() {
        let l = layer(r#"{"geom":"point","data":{"x":[1,2,3],"PANEL":[1,2,1]}}"#);
        let x = linear((0.0, 100.0));
        let y = linear((100.0, 0.0));
        let want = DataValue::from(1.0);
        let mut c = ctx(&x, &y, None);
        c.panel_id = Some(&want);
        assert_eq!(c.rows(&l), alloc::vec![0, 2]);
    }
}
