// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text geometry: a label centered on each datum position.

extern crate alloc;

use alloc::vec::Vec;

use ggir_core::{DatumKey, Mark, MarkId, TextAnchor, TextBaseline, TextChannels};
use ggir_schema::LayerIr;
use kurbo::Point;
use peniko::Brush;

use crate::geom::{GeomCtx, Paint};
use crate::z_order;

const LABEL_SIZE_PX: f64 = 10.0;

pub(crate) fn render(layer: &LayerIr, ctx: &GeomCtx<'_>, out: &mut Vec<Mark>) -> usize {
    let paint = Paint::new(layer, ctx);
    let mut drawn = 0;

    for row in ctx.rows(layer) {
        let (Some(cx), Some(cy)) = (
            layer.value(row, "x").and_then(|v| ctx.x.center(v)),
            layer.value(row, "y").and_then(|v| ctx.y.center(v)),
        ) else {
            continue;
        };
        let Some(text) = layer.value(row, "label").and_then(|v| v.as_key()) else {
            continue;
        };
        let pos = if ctx.flip {
            Point::new(cy, cx)
        } else {
            Point::new(cx, cy)
        };
        let datum = DatumKey::new(ctx.layer_index, row as u32);
        out.push(
            Mark::text(
                MarkId::for_datum(datum, 0),
                TextChannels {
                    pos,
                    text,
                    font_size: LABEL_SIZE_PX,
                    anchor: TextAnchor::Middle,
                    baseline: TextBaseline::Middle,
                    fill: Brush::Solid(paint.stroke(row)),
                    ..TextChannels::default()
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
    use kurbo::Rect;

    use super::*;
    use crate::scale::Scale;

    fn scale(json: &str, range: (f64, f64)) -> Scale {
        let desc: ggir_schema::ScaleDesc = serde_json::from_str(json).unwrap();
        Scale::from_desc(Some(&desc), range)
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

    #[test]
    fn labels_center_on_band_midpoints() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"text","aes":{"x":"cat","y":"y","label":"name"},
                "data":{"cat":["a","b"],"y":[5,5],"name":["first","second"]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":["a","b"]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y), &mut out), 2);
        let MarkPayload::Text(t) = &out[0].payload else {
            panic!("expected text");
        };
        assert_eq!(t.text, "first");
        let expected = x
            .center(&ggir_schema::DataValue::String("a".into()))
            .unwrap();
        assert!((t.pos.x - expected).abs() < 1e-9);
        assert_eq!(t.anchor, TextAnchor::Middle);
    }

    #[test]
    fn rows_without_a_label_are_skipped() {
        let layer: LayerIr = serde_json::from_str(
            r#"{"geom":"text","aes":{"x":"x","y":"y","label":"name"},
                "data":{"x":[1,2],"y":[1,2],"name":["only",null]}}"#,
        )
        .unwrap();
        let x = scale(r#"{"domain":[0,10]}"#, (0.0, 100.0));
        let y = scale(r#"{"domain":[0,10]}"#, (100.0, 0.0));
        let mut out = Vec::new();
        assert_eq!(render(&layer, &ctx(&x, &y), &mut out), 1);
    }
}
