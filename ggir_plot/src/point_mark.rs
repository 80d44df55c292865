// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point geometry.
//!
//! One circle per row. When the row's `fill` resolves to missing/NA the
//! point is drawn solid with the stroke color and no outline, matching the
//! upstream solid-point convention; otherwise fill and stroke paint
//! independently. Sizes arrive in mm (diameter) and convert to a pixel
//! radius, floored at half a pixel for per-row size aesthetics.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, PathChannels, circle_path};
use ggir_schema::{DataValue, LayerIr};
use peniko::Brush;

use crate::geom::{GeomCtx, Paint};
use crate::shape::Shape;
use crate::units::mm_to_px_radius;
use crate::z_order;

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let default_size = layer.param_f64("size").unwrap_or(1.5);
    let size_col = layer.aes_col("size");
    let shape_param = layer.param_f64("shape");
    let mut drawn = 0;

    for row in ctx.rows(layer) {
        let Some(x) = layer.value(row, "x").and_then(|v| ctx.x.center(v)) else {
            continue;
        };
        let Some(y) = layer.value(row, "y").and_then(|v| ctx.y.center(v)) else {
            continue;
        };
        // Under flip the x scale already maps vertically.
        let (cx, cy) = if ctx.flip { (y, x) } else { (x, y) };

        let radius = match size_col {
            Some(col) => {
                let mm = layer
                    .column_value(row, col)
                    .and_then(DataValue::as_f64)
                    .unwrap_or(default_size);
                mm_to_px_radius(mm).max(0.5)
            }
            None => mm_to_px_radius(default_size),
        };

        let fill_missing = match layer.value(row, "fill") {
            None => true,
            Some(v) => v.is_null() || v.as_str() == Some("NA"),
        };
        let (fill, stroke) = if fill_missing {
            (Some(Brush::Solid(paint.stroke(row))), None)
        } else {
            (
                Some(Brush::Solid(paint.fill(row))),
                Some(Brush::Solid(paint.stroke(row))),
            )
        };
        let stroke_width = layer
            .column_value(row, "stroke")
            .and_then(DataValue::as_f64)
            .unwrap_or(0.5);

        let shape = shape_param
            .or_else(|| layer.column_value(row, "shape").and_then(DataValue::as_f64));
        let path = match shape {
            Some(code) => Shape::from_code(code).path((cx, cy).into(), radius * 2.0),
            None => circle_path(cx, cy, radius),
        };

        let datum = DatumKey::new(ctx.layer_index, row as u32);
        out.push(
            Mark::path(
                MarkId::for_datum(datum, 0),
                PathChannels {
                    path,
                    fill,
                    stroke,
                    stroke_width,
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

#[cfg(test)]
mod tests {
    extern crate std;

    use ggir_core::MarkPayload;
    use kurbo::{Rect, Shape as _};

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

    #[test]
    fn rows_with_unparseable_positions_are_skipped() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"point","aes":{"x":"x","y":"y"},
                "data":{"x":[1,"",3],"y":[1,2,null]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y, false), &mut out), 1);
    }

    #[test]
    fn flip_transposes_the_point() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"point","aes":{"x":"x","y":"y"},"data":{"x":[2],"y":[5]}}"#,
        )
        .unwrap();
        let x_plain = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let y_plain = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut plain = Vec::new();
        render(&layer, &ctx(&x_plain, &y_plain, false), &mut plain);

        // Flipped: x maps vertically (inverted), y horizontally.
        let x_flip = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let y_flip = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let mut flipped = Vec::new();
        render(&layer, &ctx(&x_flip, &y_flip, true), &mut flipped);

        let center = |marks: &[Mark]| {
            let MarkPayload::Path(p) = &marks[0].payload else {
                panic!("expected path");
            };
            p.path.bounding_box().center()
        };
        let a = center(&plain);
        let b = center(&flipped);
        assert!((a.x - b.y).abs() < 1e-6);
        assert!((a.y - b.x).abs() < 1e-6);
    }

    #[test]
    fn missing_fill_uses_stroke_color_solid() {
        let layer: LayerIr = serde_json::from_str(
            r##"{"geom":"point","aes":{"x":"x","y":"y"},
                "params":{"colour":"#112233"},
                "data":{"x":[1],"y":[1],"fill":["NA"]}}"##,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        render(&layer, &ctx(&x, &y, false), &mut out);
        let MarkPayload::Path(p) = &out[0].payload else {
            panic!("expected path");
        };
        assert!(p.stroke.is_none());
        assert!(p.fill.is_some());
    }
}
