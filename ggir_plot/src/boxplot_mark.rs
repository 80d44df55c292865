// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boxplot geometry, drawn from precomputed stat columns.
//!
//! Each row carries `lower`, `middle`, `upper` (the box), optional
//! `ymin`/`ymax` (whisker ends, no caps) and an optional `outliers` list of
//! raw values drawn as solid dots in the stroke color.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels, RectChannels, circle_path, line_path};
use ggir_schema::{DataValue, LayerIr};
use kurbo::Rect;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint};
use crate::units::{mm_to_px_linewidth, mm_to_px_radius};
use crate::z_order;

struct Box {
    row: usize,
    center: f64,
    lower: f64,
    middle: f64,
    upper: f64,
}

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let boxes: Vec<Box> = ctx
        .rows(layer)
        .into_iter()
        .filter_map(|row| {
            let stat = |col: &str| {
                layer
                    .column_value(row, col)
                    .and_then(DataValue::as_f64)
                    .map(|v| ctx.y.map_f64(v))
                    .filter(|v| v.is_finite())
            };
            Some(Box {
                row,
                center: layer.value(row, "x").and_then(|v| ctx.x.center(v))?,
                lower: stat("lower")?,
                middle: stat("middle")?,
                upper: stat("upper")?,
            })
        })
        .collect();
    if boxes.is_empty() {
        return 0;
    }

    let param_lw = layer
        .param_f64("linewidth")
        .map_or_else(|| mm_to_px_linewidth(0.5), mm_to_px_linewidth);
    let (r0, r1) = ctx.x.range();
    let fallback_width = if ctx.x.is_categorical() {
        ctx.x.bandwidth() * 0.75
    } else {
        (r1 - r0).abs() / boxes.len() as f64 * 0.5
    };

    for b in &boxes {
        let width = box_width(layer, b.row, ctx).unwrap_or(fallback_width);
        let half = width / 2.0;
        let lw = layer
            .column_value(b.row, "linewidth")
            .and_then(DataValue::as_f64)
            .map_or(param_lw, mm_to_px_linewidth);
        let stroke = paint.stroke(b.row);
        let opacity = paint.opacity(b.row);
        let datum = DatumKey::new(ctx.layer_index, b.row as u32);
        let id = |slot: u32| MarkId::for_datum(datum, slot);
        let styled = |m: Mark| {
            m.with_z(z_order::DATA)
                .with_opacity(opacity)
                .with_datum(datum)
                .with_clip(ctx.clip)
        };

        let (v0, v1) = (b.lower.min(b.upper), b.lower.max(b.upper));
        let iqr = if ctx.flip {
            Rect::new(v0, b.center - half, v1, b.center + half)
        } else {
            Rect::new(b.center - half, v0, b.center + half, v1)
        };
        out.push(styled(Mark::rect(
            id(0),
            RectChannels {
                rect: iqr,
                fill: Some(Brush::Solid(paint.fill(b.row))),
                stroke: Some(Brush::Solid(stroke)),
                stroke_width: lw,
            },
        )));

        let cross = |value: f64| {
            if ctx.flip {
                line_path(value, b.center - half, value, b.center + half)
            } else {
                line_path(b.center - half, value, b.center + half, value)
            }
        };
        out.push(styled(Mark::path(
            id(1),
            PathChannels {
                path: cross(b.middle),
                stroke: Some(Brush::Solid(stroke)),
                stroke_width: lw,
                ..PathChannels::default()
            },
        )));

        // Whiskers run from the box edge to ymax/ymin, no end caps.
        let whisker = |from: f64, to: f64| {
            if ctx.flip {
                line_path(from, b.center, to, b.center)
            } else {
                line_path(b.center, from, b.center, to)
            }
        };
        let end = |col: &str| {
            layer
                .column_value(b.row, col)
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v))
                .filter(|v| v.is_finite())
        };
        if let Some(top) = end("ymax") {
            out.push(styled(Mark::path(
                id(2),
                PathChannels {
                    path: whisker(b.upper, top),
                    stroke: Some(Brush::Solid(stroke)),
                    stroke_width: lw,
                    ..PathChannels::default()
                },
            )));
        }
        if let Some(bottom) = end("ymin") {
            out.push(styled(Mark::path(
                id(3),
                PathChannels {
                    path: whisker(b.lower, bottom),
                    stroke: Some(Brush::Solid(stroke)),
                    stroke_width: lw,
                    ..PathChannels::default()
                },
            )));
        }

        if let Some(values) = layer
            .column_value(b.row, "outliers")
            .and_then(DataValue::as_list)
        {
            for (i, v) in values.iter().filter_map(DataValue::as_f64).enumerate() {
                let vp = ctx.y.map_f64(v);
                if !vp.is_finite() {
                    continue;
                }
                let (px, py) = if ctx.flip {
                    (vp, b.center)
                } else {
                    (b.center, vp)
                };
                out.push(styled(Mark::path(
                    id(10 + i as u32),
                    PathChannels {
                        path: circle_path(px, py, mm_to_px_radius(1.5)),
                        fill: Some(Brush::Solid(stroke)),
                        ..PathChannels::default()
                    },
                )));
            }
        }
    }
    boxes.len()
}

/// Box width from `xmin`/`xmax` when the stat supplies them.
fn box_width(layer: &LayerIr, row: usize, ctx: &GeomCtx<'_>) -> Option<f64> {
    let bound = |col: &str| layer.column_value(row, col).and_then(DataValue::as_f64);
    let (xmin, xmax) = (bound("xmin")?, bound("xmax")?);
    if ctx.x.is_categorical() {
        Some(ctx.x.bandwidth() * (xmax - xmin))
    } else {
        let w = (ctx.x.map_f64(xmax) - ctx.x.map_f64(xmin)).abs();
        w.is_finite().then_some(w)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use ggir_core::MarkPayload;

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
            panel: Rect::new(0.0, 0.0, 100.0, 100.0),
            flip,
            clip: "panel-clip-0",
            panel_id: None,
        }
    }

    const BOX: &str = r#"{"geom":"boxplot","aes":{"x":"g","y":"v"},
        "data":{"g":["a"],"lower":[2],"middle":[5],"upper":[8],
                "ymin":[1],"ymax":[9],"outliers":[[0,10]]}}"#;

    #[test]
    fn full_box_emits_box_median_whiskers_and_outliers() {
        let layer: LayerIr = serde_json::from_str(BOX).unwrap();
        let x = scale(r#"{"domain":["a"]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y, false), &mut out), 1);
        // Box, median, two whiskers, two outlier dots.
        assert_eq!(out.len(), 6);
        let MarkPayload::Rect(r) = &out[0].payload else {
            panic!("expected rect");
        };
        // lower=2 and upper=8 map to px 80 and 20.
        assert!((r.rect.y0 - 20.0).abs() < 1e-9);
        assert!((r.rect.y1 - 80.0).abs() < 1e-9);
    }

    #[test]
    fn rows_without_quartiles_draw_nothing() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"boxplot","aes":{"x":"g","y":"v"},
                "data":{"g":["a"],"lower":[2],"middle":[null],"upper":[8]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":["a"]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y, false), &mut out), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn flipped_box_extends_along_x() {
        let layer: LayerIr = serde_json::from_str(BOX).unwrap();
        // Flip routes the value scale onto the horizontal pixel range.
        let x = scale(r#"{"domain":["a"]}"#, (100.0, 0.0));
        let y = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let mut out = Vec::new();
        render(&layer, &ctx(&x, &y, true), &mut out);
        let MarkPayload::Rect(r) = &out[0].payload else {
            panic!("expected rect");
        };
        assert!((r.rect.x0 - 20.0).abs() < 1e-9);
        assert!((r.rect.x1 - 80.0).abs() < 1e-9);
    }
}
