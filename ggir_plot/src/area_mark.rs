// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Area-family geometry: area, density, ribbon, smooth.
//!
//! All four fill a band between two edges per group, sorted ascending by x
//! when x is continuous. Area and density fill down to a baseline (or to a
//! stacked `ymin` when the stat provides one); ribbon and the confidence
//! band of smooth always fill `ymin..ymax`. Density adds an outline stroke
//! on top of its fill; smooth draws its fitted line over the band, and that
//! line is always fully opaque while the band honors the alpha aesthetic.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels};
use ggir_schema::{DataValue, LayerIr};
use kurbo::BezPath;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint, baseline_px, group_rows, linewidth_px};
use crate::z_order;

/// One sample along the band. `None` coordinates break the band into
/// disjoint closed regions.
struct BandPt {
    along: Option<f64>,
    upper: Option<f64>,
    lower: Option<f64>,
}

impl BandPt {
    fn defined(&self) -> bool {
        self.along.is_some() && self.upper.is_some() && self.lower.is_some()
    }
}

pub(crate) fn render_area(
    layer: &LayerIr,
    ctx: &GeomCtx<'_>,
    outline: bool,
    out: &mut Vec<Mark>,
) -> usize {
    let paint = Paint::new(layer, ctx);
    let band_fallback = if ctx.flip { ctx.panel.x0 } else { ctx.panel.y1 };
    let baseline = baseline_px(ctx.y, band_fallback);
    let mut drawn = 0;

    for group in group_rows(layer, &ctx.rows(layer)) {
        let rows = sorted_rows(layer, ctx, &group);
        let pts: Vec<BandPt> = rows
            .iter()
            .map(|&row| {
                let upper = layer.value(row, "y").and_then(|v| ctx.y.position(v));
                // Stacked stats carry ymin; else the fixed baseline.
                let lower = match layer.column_value(row, "ymin").and_then(DataValue::as_f64) {
                    Some(v) => Some(ctx.y.map_f64(v)),
                    None => upper.map(|_| baseline),
                };
                BandPt {
                    along: layer.value(row, "x").and_then(|v| ctx.x.center(v)),
                    upper,
                    lower,
                }
            })
            .collect();

        if pts.iter().filter(|p| p.defined()).count() < 2 {
            continue;
        }
        let first = rows[0];
        let datum = DatumKey::new(ctx.layer_index, first as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path: band_path(&pts, ctx.flip),
                    fill: Some(Brush::Solid(paint.fill(first))),
                    ..PathChannels::default()
                },
            )
            .with_z(z_order::DATA)
            .with_opacity(paint.opacity(first))
            .with_datum(datum)
            .with_clip(ctx.clip),
        );
        if outline {
            out.push(
                Mark::path(
                    MarkId::for_datum(datum, 1),
                    PathChannels {
                        path: edge_path(&pts, ctx.flip),
                        stroke: Some(Brush::Solid(paint.stroke(first))),
                        stroke_width: linewidth_px(layer, first, 1.89),
                        ..PathChannels::default()
                    },
                )
                .with_z(z_order::DATA)
                .with_opacity(paint.opacity(first))
                .with_datum(datum)
                .with_clip(ctx.clip),
            );
        }
        drawn += 1;
    }
    drawn
}

pub(crate) fn render_ribbon(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for group in group_rows(layer, &ctx.rows(layer)) {
        let rows = sorted_rows(layer, ctx, &group);
        let pts = band_points(layer, ctx, &rows);
        if pts.iter().filter(|p| p.defined()).count() < 2 {
            continue;
        }
        let first = rows[0];
        let datum = DatumKey::new(ctx.layer_index, first as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path: band_path(&pts, ctx.flip),
                    fill: Some(Brush::Solid(paint.fill(first))),
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

pub(crate) fn render_smooth(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for group in group_rows(layer, &ctx.rows(layer)) {
        let rows = sorted_rows(layer, ctx, &group);
        let line_pts: Vec<BandPt> = rows
            .iter()
            .map(|&row| {
                let y = layer.value(row, "y").and_then(|v| ctx.y.position(v));
                BandPt {
                    along: layer.value(row, "x").and_then(|v| ctx.x.center(v)),
                    upper: y,
                    lower: y,
                }
            })
            .collect();
        if line_pts.iter().filter(|p| p.defined()).count() < 2 {
            continue;
        }
        let first = rows[0];
        let datum = DatumKey::new(ctx.layer_index, first as u32);

        // Confidence band first, when the stat was fit with se = TRUE.
        let band = band_points(layer, ctx, &rows);
        if band.iter().any(|p| p.defined()) {
            out.push(
                Mark::path(
                    MarkId::for_datum(datum, 1),
                    PathChannels {
                        path: band_path(&band, ctx.flip),
                        fill: Some(Brush::Solid(paint.fill(first))),
                        ..PathChannels::default()
                    },
                )
                .with_z(z_order::DATA)
                .with_opacity(paint.opacity(first))
                .with_datum(datum)
                .with_clip(ctx.clip),
            );
        }

        // Fitted line on top, never translucent.
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path: edge_path(&line_pts, ctx.flip),
                    stroke: Some(Brush::Solid(paint.stroke(first))),
                    stroke_width: linewidth_px(layer, first, 3.78),
                    ..PathChannels::default()
                },
            )
            .with_z(z_order::DATA)
            .with_datum(datum)
            .with_clip(ctx.clip),
        );
        drawn += 1;
    }
    drawn
}

/// Rows sorted ascending by the x value when x is continuous.
fn sorted_rows(layer: &LayerIr, ctx: &GeomCtx<'_>, group: &[usize]) -> Vec<usize> {
    let mut rows = group.to_vec();
    if !ctx.x.is_categorical() {
        rows.sort_by(|&a, &b| {
            let key = |row: usize| layer.value(row, "x").and_then(DataValue::as_f64);
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(core::cmp::Ordering::Equal)
        });
    }
    rows
}

/// `ymin..ymax` band samples for ribbon and smooth.
fn band_points(layer: &LayerIr, ctx: &GeomCtx<'_>, rows: &[usize]) -> Vec<BandPt> {
    rows.iter()
        .map(|&row| BandPt {
            along: layer.value(row, "x").and_then(|v| ctx.x.center(v)),
            upper: layer
                .column_value(row, "ymax")
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v)),
            lower: layer
                .column_value(row, "ymin")
                .and_then(DataValue::as_f64)
                .map(|v| ctx.y.map_f64(v)),
        })
        .collect()
}

fn place(along: f64, value: f64, flip: bool) -> (f64, f64) {
    if flip { (value, along) } else { (along, value) }
}

/// Closed region per contiguous run of defined samples: forward along the
/// upper edge, back along the lower.
fn band_path(pts: &[BandPt], flip: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut run: Vec<(f64, f64, f64)> = Vec::new();
    let mut flush = |run: &mut Vec<(f64, f64, f64)>, path: &mut BezPath| {
        if run.len() >= 2 {
            let (x0, u0, _) = run[0];
            path.move_to(place(x0, u0, flip));
            for &(x, u, _) in &run[1..] {
                path.line_to(place(x, u, flip));
            }
            for &(x, _, l) in run.iter().rev() {
                path.line_to(place(x, l, flip));
            }
            path.close_path();
        }
        run.clear();
    };
    for p in pts {
        if p.defined() {
            // defined() checked all three.
            if let (Some(a), Some(u), Some(l)) = (p.along, p.upper, p.lower) {
                run.push((a, u, l));
            }
        } else {
            flush(&mut run, &mut path);
        }
    }
    flush(&mut run, &mut path);
    path
}

/// Open polyline along the upper edge, with gaps at undefined samples.
fn edge_path(pts: &[BandPt], flip: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut pen_down = false;
    for p in pts {
        match (p.along, p.upper) {
            (Some(a), Some(u)) => {
                let pt = place(a, u, flip);
                if pen_down {
                    path.line_to(pt);
                } else {
                    path.move_to(pt);
                    pen_down = true;
                }
            }
            _ => pen_down = false,
        }
    }
    path
}
