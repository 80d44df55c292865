// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bar and column geometry.
//!
//! One rectangle per row. Stacked layers carry `ymin`/`ymax` stat columns
//! and draw between them; otherwise bars rise from a baseline at zero when
//! the value domain straddles zero, else at the domain minimum. The outline
//! is suppressed unless the row resolves an explicit `colour`, the upstream
//! default.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, RectChannels};
use ggir_schema::{DataValue, LayerIr};
use kurbo::Rect;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint, baseline_px, linewidth_px};
use crate::z_order;

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let rows = ctx.rows(layer);

    let rows: Vec<usize> = rows
        .into_iter()
        .filter(|&row| {
            let x_ok = match layer.value(row, "x") {
                Some(v) if ctx.x.is_categorical() => v.as_key().is_some(),
                Some(v) => v.as_f64().is_some(),
                None => false,
            };
            x_ok && layer.value(row, "y").and_then(DataValue::as_f64).is_some()
        })
        .collect();
    if rows.is_empty() {
        return 0;
    }

    let stacked = layer
        .column_value(rows[0], "ymin")
        .is_some_and(|v| !v.is_null())
        && layer
            .column_value(rows[0], "ymax")
            .is_some_and(|v| !v.is_null());

    // Category axis length drives the continuous-x bar width fallback.
    let (r0, r1) = ctx.x.range();
    let bw = if ctx.x.is_categorical() {
        ctx.x.bandwidth()
    } else {
        ((r1 - r0).abs() / rows.len() as f64).max(4.0)
    };

    // Band value scales have no numeric baseline; pin to the panel edge.
    let band_fallback = if ctx.flip { ctx.panel.x0 } else { ctx.panel.y1 };
    let baseline = baseline_px(ctx.y, band_fallback);

    let mut drawn = 0;
    for row in rows {
        let Some(cat) = layer.value(row, "x").and_then(|v| {
            if ctx.x.is_categorical() {
                ctx.x.position(v)
            } else {
                ctx.x.position(v).map(|p| p - bw / 2.0)
            }
        }) else {
            continue;
        };

        let (v0, v1) = if stacked {
            let lo = layer
                .column_value(row, "ymin")
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v));
            let hi = layer
                .column_value(row, "ymax")
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v));
            match (lo, hi) {
                (Some(lo), Some(hi)) => (lo, hi),
                _ => continue,
            }
        } else {
            let Some(value) = layer
                .value(row, "y")
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v))
            else {
                continue;
            };
            (baseline, value)
        };
        let (lo, hi) = if v0 <= v1 { (v0, v1) } else { (v1, v0) };

        let rect = if ctx.flip {
            Rect::new(lo, cat, hi, cat + bw)
        } else {
            Rect::new(cat, lo, cat + bw, hi)
        };

        let outline = layer
            .column_value(row, "colour")
            .filter(|v| !v.is_null() && v.as_str() != Some("NA"))
            .map(|_| Brush::Solid(paint.stroke(row)));
        let stroke_width = if outline.is_some() {
            linewidth_px(layer, row, 1.89)
        } else {
            0.0
        };

        let datum = DatumKey::new(ctx.layer_index, row as u32);
        out.push(
            Mark::rect(
                MarkId::for_datum(datum, 0),
                RectChannels {
                    rect,
                    fill: Some(Brush::Solid(paint.fill(row))),
                    stroke: outline,
                    stroke_width,
                },
            )
            .with_z(z_order::DATA)
            .with_opacity(paint.opacity(row))
            .with_datum(datum)
            .with_clip(ctx.clip),
        );
        drawn += 1;
    }
    drawn
}
