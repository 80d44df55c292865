// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line and path geometry.
//!
//! One stroked path per group. `line` sorts rows ascending by x before
//! tracing, but only when x is continuous; `path` always preserves row
//! order. Rows whose x or y fail coercion break the path into disjoint
//! segments instead of interpolating across the gap.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels};
use ggir_schema::LayerIr;
use kurbo::BezPath;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint, group_rows, linewidth_px};
use crate::units::linetype_dash;
use crate::z_order;

pub(crate) fn render(
    layer: &LayerIr,
    ctx: &GeomCtx<'_>,
    sort_by_x: bool,
    out: &mut Vec<Mark>,
) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for group in group_rows(layer, &ctx.rows(layer)) {
        let mut pts: Vec<(usize, Option<(f64, f64)>)> = group
            .iter()
            .map(|&row| {
                let x = layer.value(row, "x").and_then(|v| ctx.x.center(v));
                let y = layer.value(row, "y").and_then(|v| ctx.y.center(v));
                (row, x.zip(y))
            })
            .collect();

        if sort_by_x && !ctx.x.is_categorical() {
            pts.sort_by(|a, b| {
                let key = |p: &(usize, Option<(f64, f64)>)| p.1.map(|(x, _)| x);
                key(a)
                    .partial_cmp(&key(b))
                    .unwrap_or(core::cmp::Ordering::Equal)
            });
        }

        let defined = pts.iter().filter(|(_, p)| p.is_some()).count();
        if defined < 2 {
            continue;
        }

        let path = trace(&pts, ctx.flip);
        let first = pts
            .iter()
            .find_map(|(row, p)| p.map(|_| *row))
            .unwrap_or(group[0]);
        let dash = layer
            .column_value(first, "linetype")
            .and_then(|v| v.as_key())
            .map(|lt| linetype_dash(&lt))
            .unwrap_or_default();

        let datum = DatumKey::new(ctx.layer_index, first as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path,
                    stroke: Some(Brush::Solid(paint.stroke(first))),
                    stroke_width: linewidth_px(layer, first, 1.89),
                    dash,
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

/// Traces defined points into a path; undefined points lift the pen.
fn trace(pts: &[(usize, Option<(f64, f64)>)], flip: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut pen_down = false;
    for (_, p) in pts {
        match p {
            Some((x, y)) => {
                let pt = if flip { (*y, *x) } else { (*x, *y) };
                if pen_down {
                    path.line_to(pt);
                } else {
                    path.move_to(pt);
                    pen_down = true;
                }
            }
            None => pen_down = false,
        }
    }
    path
}

#[cfg(test)]
mod tests {
    extern crate std;

    use ggir_core::MarkPayload;
    use kurbo::{PathEl, Rect};

    use super::*;
    use crate::scale::Scale;

    fn scales() -> (Scale, Scale) {
        let desc: ggir_schema::ScaleDesc = serde_json::from_str(r#"{"domain":[0,10]}"#).unwrap();
        (
            Scale::from_desc(Some(&desc), (0.0, 100.0)),
            Scale::from_desc(Some(&desc), (100.0, 0.0)),
        )
    }

    fn ctx<'a>(x: &'a Scale, y: &'a Scale) -> GeomCtx<'a> {
        GeomCtx {
            layer_index: 0,
            x,
            y,
            color: None,
            panel: Rect::new(0.0, 0.0, 100.0, 100.0),
            flip: false,
            clip: "panel-clip-0",
            panel_id: None,
        }
    }

    fn first_path(out: &[Mark]) -> &BezPath {
        match &out[0].payload {
            MarkPayload::Path(p) => &p.path,
            _ => panic!("expected path"),
        }
    }

    #[test]
    fn line_sorts_rows_by_x_before_tracing() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"line","aes":{"x":"x","y":"y"},
                "data":{"x":[3,1,2],"y":[3,1,2]}}"#,
        )
        .unwrap();
        let (x, y) = scales();
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y), true, &mut out), 1);
        let els: Vec<PathEl> = first_path(&out).iter().collect();
        let PathEl::MoveTo(start) = els[0] else {
            panic!("expected move");
        };
        assert!((start.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn path_preserves_row_order() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"path","aes":{"x":"x","y":"y"},
                "data":{"x":[3,1,2],"y":[3,1,2]}}"#,
        )
        .unwrap();
        let (x, y) = scales();
        let mut out = Vec::new();
        render(&layer, &ctx(&x, &y), false, &mut out);
        let els: Vec<PathEl> = first_path(&out).iter().collect();
        let PathEl::MoveTo(start) = els[0] else {
            panic!("expected move");
        };
        assert!((start.x - 30.0).abs() < 1e-9);
    }

    #[test]
    fn missing_values_split_the_path() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"line","aes":{"x":"x","y":"y"},
                "data":{"x":[1,2,3,4],"y":[1,null,3,4]}}"#,
        )
        .unwrap();
        let (x, y) = scales();
        let mut out = Vec::new();
        render(&layer, &ctx(&x, &y), true, &mut out);
        let moves = first_path(&out)
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(moves, 2);
    }

    #[test]
    fn one_mark_per_group() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"line","aes":{"x":"x","y":"y"},
                "data":{"x":[1,2,1,2],"y":[1,2,3,4],"group":[1,1,2,2]}}"#,
        )
        .unwrap();
        let (x, y) = scales();
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y), true, &mut out), 2);
    }
}
