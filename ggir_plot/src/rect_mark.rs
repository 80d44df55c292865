// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rect and tile geometry.
//!
//! Requires all four of `xmin`/`xmax`/`ymin`/`ymax`; band scales use their
//! bandwidth for the corresponding dimension instead of the max edge.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, RectChannels};
use ggir_schema::LayerIr;
use kurbo::Rect;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint};
use crate::scale::Scale;
use crate::z_order;

/// One edge pair of a rectangle along a single scale.
fn span(layer: &LayerIr, row: usize, scale: &Scale, min_role: &str, max_role: &str) -> Option<(f64, f64)> {
    let min = layer.value(row, min_role)?;
    let max = layer.value(row, max_role)?;
    if scale.is_categorical() {
        let p = scale.position(min)?;
        // Band scales: one band wide starting at the min category.
        Some((p, p + scale.bandwidth()))
    } else {
        let a = scale.position(min)?;
        let b = scale.position(max)?;
        Some(if a <= b { (a, b) } else { (b, a) })
    }
}

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for row in ctx.rows(layer) {
        let Some((x0, x1)) = span(layer, row, ctx.x, "xmin", "xmax") else {
            continue;
        };
        let Some((y0, y1)) = span(layer, row, ctx.y, "ymin", "ymax") else {
            continue;
        };
        let rect = if ctx.flip {
            Rect::new(y0, x0, y1, x1)
        } else {
            Rect::new(x0, y0, x1, y1)
        };

        let datum = DatumKey::new(ctx.layer_index, row as u32);
        out.push(
            Mark::rect(
                MarkId::for_datum(datum, 0),
                RectChannels {
                    rect,
                    fill: Some(Brush::Solid(paint.fill(row))),
                    stroke: None,
                    stroke_width: 0.0,
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
