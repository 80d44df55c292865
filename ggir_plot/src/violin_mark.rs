// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Violin geometry, drawn from precomputed density columns.
//!
//! Rows grouped by their `x` value each carry `y` and `violinwidth` in
//! `0..=1`. The outline mirrors the width around the group center and is
//! smoothed with a cardinal spline at high tension, so it stays close to
//! the piecewise-linear density.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels};
use ggir_schema::{DataValue, LayerIr};
use kurbo::{BezPath, Point};
use peniko::Brush;

use crate::geom::{GeomCtx, Paint};
use crate::units::mm_to_px_linewidth;
use crate::z_order;

const SPLINE_TENSION: f64 = 0.9;

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let groups = group_by_x(layer, &ctx.rows(layer));
    if groups.is_empty() {
        return 0;
    }

    let (r0, r1) = ctx.x.range();
    let spacing = (r1 - r0).abs() / groups.len() as f64;
    let mut drawn = 0;

    for rows in &groups {
        let first = rows[0];
        let Some(center) = layer.value(first, "x").and_then(|v| ctx.x.center(v)) else {
            continue;
        };
        let max_width = if ctx.x.is_categorical() {
            let frac = layer
                .column_value(first, "width")
                .and_then(DataValue::as_f64)
                .unwrap_or(0.9);
            ctx.x.bandwidth() * frac
        } else {
            spacing * 0.9
        };
        let half = max_width / 2.0;

        // (value px, half-extent px), sorted along the value axis.
        let mut pts: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|&row| {
                let v = layer
                    .value(row, "y")
                    .and_then(DataValue::as_f64)
                    .map(|v| ctx.y.map_f64(v))
                    .filter(|v| v.is_finite())?;
                let w = layer
                    .column_value(row, "violinwidth")
                    .and_then(DataValue::as_f64)?;
                Some((v, w * half))
            })
            .collect();
        if pts.len() < 2 {
            continue;
        }
        pts.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(core::cmp::Ordering::Equal));

        let place = |along: f64, value: f64| {
            if ctx.flip {
                Point::new(value, along)
            } else {
                Point::new(along, value)
            }
        };
        let right: Vec<Point> = pts.iter().map(|&(v, e)| place(center + e, v)).collect();
        let left: Vec<Point> = pts.iter().rev().map(|&(v, e)| place(center - e, v)).collect();
        let mut path = BezPath::new();
        path.move_to(right[0]);
        cardinal_through(&mut path, &right);
        path.line_to(left[0]);
        cardinal_through(&mut path, &left);
        path.close_path();

        let datum = DatumKey::new(ctx.layer_index, first as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path,
                    fill: Some(Brush::Solid(paint.fill(first))),
                    stroke: Some(Brush::Solid(paint.stroke(first))),
                    stroke_width: layer
                        .column_value(first, "linewidth")
                        .and_then(DataValue::as_f64)
                        .or_else(|| layer.param_f64("linewidth"))
                        .map_or_else(|| mm_to_px_linewidth(0.5), mm_to_px_linewidth),
                    ..PathChannels::default()
                },
            )
            .with_z(z_order::DATA)
            .with_opacity(paint.opacity(first))
            .with_datum(datum)
            .with_clip(ctx.clip),
        );
        drawn += 1;
    }
    drawn
}

/// Rows bucketed by their `x` key, first-seen order.
fn group_by_x(layer: &LayerIr, rows: &[usize]) -> Vec<Vec<usize>> {
    let mut keys: Vec<alloc::string::String> = Vec::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for &row in rows {
        let Some(key) = layer.value(row, "x").and_then(DataValue::as_key) else {
            continue;
        };
        match keys.iter().position(|k| *k == key) {
            Some(i) => buckets[i].push(row),
            None => {
                keys.push(key);
                buckets.push(alloc::vec![row]);
            }
        }
    }
    buckets
}

/// Cardinal spline through `pts`, appended from the current point (which
/// must equal `pts[0]`). End tangents use duplicated endpoints.
fn cardinal_through(path: &mut BezPath, pts: &[Point]) {
    let k = (1.0 - SPLINE_TENSION) / 6.0;
    let n = pts.len();
    for i in 0..n - 1 {
        let p0 = pts[i.saturating_sub(1)];
        let p1 = pts[i];
        let p2 = pts[i + 1];
        let p3 = pts[(i + 2).min(n - 1)];
        let c1 = Point::new(p1.x + k * (p2.x - p0.x), p1.y + k * (p2.y - p0.y));
        let c2 = Point::new(p2.x - k * (p3.x - p1.x), p2.y - k * (p3.y - p1.y));
        path.curve_to(c1, c2, p2);
    }
}
