// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Segment geometry: one straight stroke per row from `(x, y)` to
//! `(xend, yend)`. Band positions are centered within their band.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels, line_path};
use ggir_schema::LayerIr;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint, linewidth_px};
use crate::z_order;

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for row in ctx.rows(layer) {
        let pos = |role: &str, on_x: bool| {
            let scale = if on_x { ctx.x } else { ctx.y };
            layer.value(row, role).and_then(|v| scale.center(v))
        };
        let (Some(x0), Some(y0), Some(x1), Some(y1)) = (
            pos("x", true),
            pos("y", false),
            pos("xend", true),
            pos("yend", false),
        ) else {
            continue;
        };
        let path = if ctx.flip {
            line_path(y0, x0, y1, x1)
        } else {
            line_path(x0, y0, x1, y1)
        };
        let datum = DatumKey::new(ctx.layer_index, row as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path,
                    stroke: Some(Brush::Solid(paint.stroke(row))),
                    stroke_width: linewidth_px(layer, row, 1.42),
                    ..PathChannels::default()
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
