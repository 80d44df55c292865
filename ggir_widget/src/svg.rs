// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SVG serialization of a rendered scene.
//!
//! Marks serialize in the scene's paint order (z, then id). Each mark's
//! interactive opacity folds into the paint's own alpha as a single
//! `fill-opacity`/`stroke-opacity` attribute, and panel clip rectangles
//! become `<clipPath>` defs referenced by the data marks.

use ggir_core::{Mark, MarkPayload, Scene, TextAnchor, TextBaseline};
use ggir_plot::{Layout, dash_attr, fmt_f64};
use kurbo::Rect;
use peniko::Brush;
use std::fmt::Write as _;

/// SVG writer for one rendered chart.
#[derive(Debug, Default)]
pub struct SvgScene {
    width: f64,
    height: f64,
    clips: Vec<(String, Rect)>,
}

impl SvgScene {
    /// Writer for a canvas of the given outer size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            clips: Vec::new(),
        }
    }

    /// Register the layout's panel clip rectangles as `<clipPath>` defs.
    pub fn set_clips(&mut self, layout: &Layout) {
        self.clips.clear();
        if layout.panels.is_empty() {
            self.clips.push((layout.clip_id.clone(), layout.panel));
        } else {
            for panel in &layout.panels {
                self.clips.push((panel.clip_id.clone(), panel.rect));
            }
        }
    }

    /// Serialize the scene to an SVG document string.
    pub fn to_svg_string(&self, scene: &Scene) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            fmt_f64(self.width),
            fmt_f64(self.height),
            fmt_f64(self.width),
            fmt_f64(self.height),
        );
        out.push('\n');

        if !self.clips.is_empty() {
            out.push_str("<defs>\n");
            for (id, rect) in &self.clips {
                let _ = write!(
                    out,
                    r#"<clipPath id="{}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
                    escape_xml(id),
                    fmt_f64(rect.x0),
                    fmt_f64(rect.y0),
                    fmt_f64(rect.width()),
                    fmt_f64(rect.height()),
                );
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        for mark in scene.ordered() {
            write_mark(&mut out, mark);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn write_mark(out: &mut String, mark: &Mark) {
    match &mark.payload {
        MarkPayload::Rect(r) => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                fmt_f64(r.rect.x0),
                fmt_f64(r.rect.y0),
                fmt_f64(r.rect.width()),
                fmt_f64(r.rect.height()),
            );
            write_paint_attr(out, "fill", r.fill.as_ref(), mark.opacity);
            if r.stroke_width > 0.0 && r.stroke.is_some() {
                write_paint_attr(out, "stroke", r.stroke.as_ref(), mark.opacity);
                let _ = write!(out, r#" stroke-width="{}""#, fmt_f64(r.stroke_width));
            }
            write_clip_attr(out, mark);
            out.push_str("/>\n");
        }
        MarkPayload::Text(t) => {
            let baseline = match t.baseline {
                TextBaseline::Middle => "middle",
                TextBaseline::Alphabetic => "alphabetic",
                TextBaseline::Hanging => "hanging",
            };
            let _ = write!(
                out,
                r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="{baseline}""#,
                fmt_f64(t.pos.x),
                fmt_f64(t.pos.y),
                fmt_f64(t.font_size),
            );
            out.push_str(match t.anchor {
                TextAnchor::Start => r#" text-anchor="start""#,
                TextAnchor::Middle => r#" text-anchor="middle""#,
                TextAnchor::End => r#" text-anchor="end""#,
            });
            if t.angle != 0.0 {
                let _ = write!(
                    out,
                    r#" transform="rotate({} {} {})""#,
                    fmt_f64(t.angle),
                    fmt_f64(t.pos.x),
                    fmt_f64(t.pos.y),
                );
            }
            if t.bold {
                out.push_str(r#" font-weight="bold""#);
            }
            write_paint_attr(out, "fill", Some(&t.fill), mark.opacity);
            write_clip_attr(out, mark);
            out.push('>');
            out.push_str(&escape_xml(&t.text));
            out.push_str("</text>\n");
        }
        MarkPayload::Path(p) => {
            let _ = write!(out, r#"<path d="{}""#, p.path.to_svg());
            write_paint_attr(out, "fill", p.fill.as_ref(), mark.opacity);
            if p.stroke_width > 0.0 && p.stroke.is_some() {
                write_paint_attr(out, "stroke", p.stroke.as_ref(), mark.opacity);
                let _ = write!(out, r#" stroke-width="{}""#, fmt_f64(p.stroke_width));
                if let Some(dash) = dash_attr(&p.dash) {
                    let _ = write!(out, r#" stroke-dasharray="{dash}""#);
                }
            }
            write_clip_attr(out, mark);
            out.push_str("/>\n");
        }
    }
}

fn write_clip_attr(out: &mut String, mark: &Mark) {
    if let Some(clip) = &mark.clip {
        let _ = write!(out, r#" clip-path="url(#{})""#, escape_xml(clip));
    }
}

/// Paint color plus combined opacity (paint alpha times mark opacity).
fn svg_paint(brush: Option<&Brush>, mark_opacity: f64) -> (String, Option<f64>) {
    let Some(Brush::Solid(color)) = brush else {
        return (String::from("none"), None);
    };
    let rgba = color.to_rgba8();
    let value = format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b);
    let opacity = (f64::from(rgba.a) / 255.0) * mark_opacity.clamp(0.0, 1.0);
    if opacity >= 1.0 {
        (value, None)
    } else {
        (value, Some(opacity))
    }
}

fn write_paint_attr(out: &mut String, name: &str, brush: Option<&Brush>, mark_opacity: f64) {
    let (value, opacity) = svg_paint(brush, mark_opacity);
    let _ = write!(out, r#" {name}="{value}""#);
    if let Some(o) = opacity {
        let _ = write!(out, r#" {name}-opacity="{}""#, fmt_f64(o));
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ggir_core::{MarkId, PathChannels, RectChannels, TextChannels};
    use kurbo::Point;
    use peniko::Color;

    #[test]
    fn marks_serialize_in_z_order() {
        let mut scene = Scene::new();
        let front = RectChannels {
            rect: Rect::new(0.0, 0.0, 5.0, 5.0),
            fill: Some(Brush::Solid(Color::from_rgba8(255, 0, 0, 255))),
            ..Default::default()
        };
        scene.insert(Mark::rect(MarkId(1), front).with_z(10));
        let back = RectChannels {
            rect: Rect::new(0.0, 0.0, 20.0, 20.0),
            fill: Some(Brush::Solid(Color::from_rgba8(0, 0, 255, 255))),
            ..Default::default()
        };
        scene.insert(Mark::rect(MarkId(2), back).with_z(-10));

        let svg = SvgScene::new(100.0, 80.0).to_svg_string(&scene);
        let blue = svg.find("#0000ff").expect("back rect present");
        let red = svg.find("#ff0000").expect("front rect present");
        assert!(blue < red, "lower z serializes first");
        assert!(svg.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 80""#));
    }

    #[test]
    fn mark_opacity_folds_into_paint_alpha() {
        let mut scene = Scene::new();
        let channels = RectChannels {
            rect: Rect::new(0.0, 0.0, 5.0, 5.0),
            fill: Some(Brush::Solid(Color::from_rgba8(0, 0, 0, 128))),
            ..Default::default()
        };
        scene.insert(Mark::rect(MarkId(1), channels).with_opacity(0.5));
        let svg = SvgScene::new(10.0, 10.0).to_svg_string(&scene);
        // 128/255 * 0.5 ~= 0.251
        let attr = svg
            .split("fill-opacity=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .expect("fill-opacity present");
        let o: f64 = attr.parse().unwrap();
        assert!((o - 0.5 * 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn text_escapes_markup_and_carries_rotation() {
        let mut scene = Scene::new();
        let channels = TextChannels {
            pos: Point::new(10.0, 20.0),
            text: String::from("a<b & \"c\""),
            angle: 90.0,
            bold: true,
            ..Default::default()
        };
        scene.insert(Mark::text(MarkId(1), channels));
        let svg = SvgScene::new(50.0, 50.0).to_svg_string(&scene);
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        assert!(svg.contains(r#"transform="rotate(90 10 20)""#));
        assert!(svg.contains(r#"font-weight="bold""#));
    }

    #[test]
    fn dashed_clipped_paths_get_their_attributes() {
        let mut scene = Scene::new();
        let mut channels = PathChannels::default();
        channels.path.move_to(Point::new(0.0, 0.0));
        channels.path.line_to(Point::new(10.0, 0.0));
        channels.dash = ggir_core::DashPattern::from_slice(&[4.0, 4.0]);
        scene.insert(Mark::path(MarkId(1), channels).with_clip("panel-clip-7"));

        let svg = SvgScene::new(20.0, 20.0).to_svg_string(&scene);
        assert!(svg.contains(r#"stroke-dasharray="4,4""#));
        assert!(svg.contains(r##"clip-path="url(#panel-clip-7)""##));
    }
}
