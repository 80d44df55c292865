// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference lines: hline, vline, abline.
//!
//! These annotate the panel rather than encode data, so their styling comes
//! from literal columns on each row (`colour`, `linewidth`, `linetype`,
//! `alpha`) instead of the layer's color scale. One line per row.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels, line_path};
use ggir_schema::{DataValue, LayerIr};
use peniko::{Brush, Color, color::palette::css};

use crate::color::convert_color;
use crate::geom::GeomCtx;
use crate::units::{linetype_dash, mm_to_px_linewidth};
use crate::z_order;

pub(crate) fn render_hline(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let mut drawn = 0;
    for row in ctx.rows(layer) {
        let Some(v) = intercept(layer, row, "yintercept") else {
            continue;
        };
        let px = ctx.y.map_f64(v);
        if !px.is_finite() {
            continue;
        }
        // Under flip the y scale runs horizontally, so the rule turns vertical.
        let path = if ctx.flip {
            line_path(px, ctx.panel.y0, px, ctx.panel.y1)
        } else {
            line_path(ctx.panel.x0, px, ctx.panel.x1, px)
        };
        push(layer, ctx, row, path, out);
        drawn += 1;
    }
    drawn
}

pub(crate) fn render_vline(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let mut drawn = 0;
    for row in ctx.rows(layer) {
        let Some(v) = intercept(layer, row, "xintercept") else {
            continue;
        };
        let px = ctx.x.map_f64(v);
        if !px.is_finite() {
            continue;
        }
        let path = if ctx.flip {
            line_path(ctx.panel.x0, px, ctx.panel.x1, px)
        } else {
            line_path(px, ctx.panel.y0, px, ctx.panel.y1)
        };
        push(layer, ctx, row, path, out);
        drawn += 1;
    }
    drawn
}

pub(crate) fn render_abline(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let Some((x0, x1)) = ctx.x.domain_bounds() else {
        // A slope needs a continuous x domain to anchor its endpoints.
        return 0;
    };
    let mut drawn = 0;
    for row in ctx.rows(layer) {
        let (Some(slope), Some(intercept)) = (
            intercept(layer, row, "slope"),
            intercept(layer, row, "intercept"),
        ) else {
            continue;
        };
        let ends = [(x0, intercept + slope * x0), (x1, intercept + slope * x1)];
        let [(ax, ay), (bx, by)] = ends.map(|(xv, yv)| {
            if ctx.flip {
                (ctx.y.map_f64(yv), ctx.x.map_f64(xv))
            } else {
                (ctx.x.map_f64(xv), ctx.y.map_f64(yv))
            }
        });
        if ![ax, ay, bx, by].iter().all(|v| v.is_finite()) {
            continue;
        }
        push(layer, ctx, row, line_path(ax, ay, bx, by), out);
        drawn += 1;
    }
    drawn
}

/// The intercept value, honoring an aesthetic remap of the column name.
fn intercept(layer: &LayerIr, row: usize, role: &str) -> Option<f64> {
    layer.value(row, role).and_then(DataValue::as_f64)
}

fn push(
    layer: &LayerIr,
    ctx: &GeomCtx<'_>,
    row: usize,
    path: kurbo::BezPath,
    out: &mut Vec<Mark>,
) {
    let datum = DatumKey::new(ctx.layer_index, row as u32);
    out.push(
        Mark::path(
            MarkId::for_datum(datum, 0),
            PathChannels {
                path,
                stroke: Some(Brush::Solid(stroke_color(layer, row))),
                stroke_width: stroke_width(layer, row),
                dash: layer
                    .column_value(row, "linetype")
                    .and_then(|v| v.as_key())
                    .map(|lt| linetype_dash(&lt))
                    .unwrap_or_default(),
                ..PathChannels::default()
            },
        )
        .with_z(z_order::DATA)
        .with_opacity(
            layer
                .column_value(row, "alpha")
                .and_then(DataValue::as_f64)
                .unwrap_or(1.0),
        )
        .with_datum(datum)
        .with_clip(ctx.clip),
    );
}

fn stroke_color(layer: &LayerIr, row: usize) -> Color {
    layer
        .column_value(row, "colour")
        .and_then(|v| v.as_str())
        .and_then(convert_color)
        .unwrap_or(css::BLACK)
}

fn stroke_width(layer: &LayerIr, row: usize) -> f64 {
    layer
        .column_value(row, "linewidth")
        .and_then(DataValue::as_f64)
        .map_or_else(|| mm_to_px_linewidth(0.5), mm_to_px_linewidth)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use ggir_core::MarkPayload;
    use kurbo::{PathEl, Rect};

    use super::*;
    use crate::scale::Scale;

    fn scale(json: &str, range: (f64, f64)) -> Scale {
        let desc: ggir_schema::ScaleDesc = serde_json::from_str(json).unwrap();
        Scale::from_desc(Some(&desc), range)
    }

    fn ctx<'a>(x: &'a Scale, y: &'a Scale, flip: bool) -> GeomCtx<'a> {
        GeomCtx {
            layer_index: 0,
            x,
            y,
            color: None,
            panel: Rect::new(0.0, 0.0, 200.0, 100.0),
            flip,
            clip: "panel-clip-0",
            panel_id: None,
        }
    }

    fn endpoints(mark: &Mark) -> ((f64, f64), (f64, f64)) {
        let MarkPayload::Path(p) = &mark.payload else {
            panic!("expected path");
        };
        let els: Vec<_> = p.path.elements().to_vec();
        match (els[0], els[1]) {
            (PathEl::MoveTo(a), PathEl::LineTo(b)) => ((a.x, a.y), (b.x, b.y)),
            other => panic!("unexpected elements {other:?}"),
        }
    }

    #[test]
    fn hline_spans_the_panel_width() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"hline","data":{"yintercept":[5]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 200.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render_hline(&layer, &ctx(&x, &y, false), &mut out), 1);
        let ((ax, ay), (bx, by)) = endpoints(&out[0]);
        assert_eq!((ax, bx), (0.0, 200.0));
        assert!((ay - 50.0).abs() < 1e-9 && (by - 50.0).abs() < 1e-9);
    }

    #[test]
    fn flipped_hline_turns_vertical() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"hline","data":{"yintercept":[5]}}"#,
        )
        .unwrap();
        // Flip puts the y scale on the horizontal pixel range.
        let x = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let y = scale(r#"{"domain":[0,10]}"#, (0.0, 200.0));
        let mut out = Vec::new();
        render_hline(&layer, &ctx(&x, &y, true), &mut out);
        let ((ax, ay), (bx, by)) = endpoints(&out[0]);
        assert!((ax - 100.0).abs() < 1e-9 && (bx - 100.0).abs() < 1e-9);
        assert_eq!((ay, by), (0.0, 100.0));
    }

    #[test]
    fn abline_projects_domain_extremes() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"abline","data":{"slope":[1],"intercept":[0]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 200.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render_abline(&layer, &ctx(&x, &y, false), &mut out), 1);
        let ((ax, ay), (bx, by)) = endpoints(&out[0]);
        assert_eq!((ax, ay), (0.0, 100.0));
        assert_eq!((bx, by), (200.0, 0.0));
    }

    #[test]
    fn linetype_column_sets_the_dash_pattern() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"vline","data":{"xintercept":[5],"linetype":["dashed"]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 200.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        render_vline(&layer, &ctx(&x, &y, false), &mut out);
        let MarkPayload::Path(p) = &out[0].payload else {
            panic!("expected path");
        };
        assert_eq!(p.dash.as_slice(), &[4.0, 4.0]);
    }
}
