// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Legend and colorbar guides.
//!
//! Layout needs legend dimensions before any legend mark exists, so each
//! guide is compiled into a [`LegendBlock`] up front: the block computes its
//! key/label/title geometry once, [`LegendBlock::size`] feeds the layout
//! engine, and [`LegendBlock::marks`] emits marks from the same geometry at
//! the position layout chose. Discrete legends stack keys vertically when
//! the legend sits left or right of the panel and run them in a row when it
//! sits above or below. Colorbars approximate their gradient as a stack of
//! thin rect strips.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use ggir_core::{
    Mark, MarkId, RectChannels, TextAnchor, TextBaseline, TextChannels, line_path,
};
use ggir_schema::{DataValue, GuideDesc, GuideKey};
use ggir_text::{TextMeasurer, TextStyle};
use kurbo::{Point, Rect};
use peniko::color::palette::css;
use peniko::{Brush, Color};

use crate::color::convert_color;
use crate::layout::Size;
use crate::shape::{Shape, is_filled_code};
use crate::theme::Theme;
use crate::units::{mm_to_px_radius, pt_to_px};
use crate::z_order;

/// Gap between stacked guides, 11pt in the producer's defaults.
pub fn guide_spacing() -> f64 {
    pt_to_px(11.0)
}

/// Colorbar gradient resolution.
const COLORBAR_STRIPS: usize = 32;

/// Theme-resolved styling shared by every guide in a chart.
#[derive(Clone, Debug)]
struct LegendStyle {
    key_size: f64,
    text_size: f64,
    title_size: f64,
    key_spacing: f64,
    title_spacing: f64,
    margin: f64,
    title_fill: Brush,
    text_fill: Brush,
    key_fill: Option<Color>,
    key_stroke: Option<Color>,
}

impl LegendStyle {
    fn resolve(theme: &Theme) -> Self {
        let key = theme.rect("legend.key");
        let text = theme.text("legend.text");
        let title = theme.text("legend.title");
        let solid = |c: Option<Color>| Brush::Solid(c.unwrap_or(css::BLACK));
        Self {
            key_size: pt_to_px(13.2),
            text_size: text.as_ref().map_or(8.8, |t| t.size_or(8.8)),
            title_size: title.as_ref().map_or(11.0, |t| t.size_or(11.0)),
            key_spacing: pt_to_px(5.5),
            title_spacing: pt_to_px(5.5),
            margin: pt_to_px(5.5),
            title_fill: solid(
                title
                    .as_ref()
                    .and_then(|t| t.colour.as_deref())
                    .and_then(convert_color),
            ),
            text_fill: solid(
                text.as_ref()
                    .and_then(|t| t.colour.as_deref())
                    .and_then(convert_color),
            ),
            key_fill: key
                .as_ref()
                .and_then(|k| k.fill.as_deref())
                .and_then(convert_color)
                .or_else(|| convert_color("#FFFFFF")),
            key_stroke: key
                .as_ref()
                .and_then(|k| k.colour.as_deref())
                .and_then(convert_color)
                .or_else(|| convert_color("grey80")),
        }
    }
}

/// What gets drawn inside one key box, chosen from the guide's aesthetics.
#[derive(Clone, Debug)]
enum KeyGlyph {
    /// Color or fill swatch covering the key box.
    Swatch(Color),
    /// Point symbol for shape guides.
    Symbol { shape: Shape, filled: bool, color: Color },
    /// Radius circle for size guides.
    Dot { radius: f64 },
}

#[derive(Clone, Debug)]
struct KeyGeom {
    /// Key box origin relative to the block origin.
    offset: Point,
    glyph: KeyGlyph,
    label: String,
}

/// One guide compiled to concrete geometry.
#[derive(Clone, Debug)]
pub struct LegendBlock {
    id_base: u64,
    style: LegendStyle,
    title: Option<String>,
    keys: Vec<KeyGeom>,
    colorbar: Option<ColorbarGeom>,
    size: Size,
}

#[derive(Clone, Debug)]
struct ColorbarGeom {
    bar: Rect,
    stops: Vec<Color>,
    /// (y offset within the bar, label) pairs, crowded entries dropped.
    ticks: Vec<(f64, String)>,
}

impl LegendBlock {
    /// Compiles a guide into positioned geometry.
    ///
    /// `position` is the legend side ("right", "left", "top", "bottom");
    /// it decides whether discrete keys stack or flow.
    pub fn new(
        id_base: u64,
        guide: &GuideDesc,
        position: &str,
        theme: &Theme,
        measurer: &impl TextMeasurer,
    ) -> Self {
        let style = LegendStyle::resolve(theme);
        let horizontal = matches!(position, "top" | "bottom");
        if guide.kind.as_deref() == Some("colorbar") {
            Self::colorbar(id_base, guide, style, measurer)
        } else if horizontal {
            Self::discrete_row(id_base, guide, style, measurer)
        } else {
            Self::discrete_column(id_base, guide, style, measurer)
        }
    }

    /// The box this guide needs, margins included.
    pub fn size(&self) -> Size {
        self.size
    }

    fn title_height(style: &LegendStyle, title: Option<&str>) -> f64 {
        if title.is_some() {
            style.title_size * 1.2 + style.title_spacing
        } else {
            0.0
        }
    }

    fn discrete_column(
        id_base: u64,
        guide: &GuideDesc,
        style: LegendStyle,
        measurer: &impl TextMeasurer,
    ) -> Self {
        let title = guide.title.clone();
        let title_h = Self::title_height(&style, title.as_deref());
        let max_label = guide
            .keys
            .iter()
            .map(|k| label_width(k, style.text_size, measurer))
            .fold(0.0, f64::max);

        let keys = guide
            .keys
            .iter()
            .enumerate()
            .map(|(i, key)| KeyGeom {
                offset: Point::new(
                    style.margin,
                    style.margin + title_h + i as f64 * (style.key_size + style.key_spacing),
                ),
                glyph: key_glyph(guide, key),
                label: key_label(key),
            })
            .collect::<Vec<_>>();

        let width = style.margin * 2.0 + style.key_size + style.key_spacing + max_label;
        let height = style.margin * 2.0
            + title_h
            + keys.len() as f64 * (style.key_size + style.key_spacing);
        Self {
            id_base,
            style,
            title,
            keys,
            colorbar: None,
            size: Size { width, height },
        }
    }

    fn discrete_row(
        id_base: u64,
        guide: &GuideDesc,
        style: LegendStyle,
        measurer: &impl TextMeasurer,
    ) -> Self {
        let title = guide.title.clone();
        let title_h = Self::title_height(&style, title.as_deref());
        let mut x = style.margin;
        let keys = guide
            .keys
            .iter()
            .map(|key| {
                let offset = Point::new(x, style.margin + title_h);
                x += style.key_size
                    + style.key_spacing
                    + label_width(key, style.text_size, measurer)
                    + style.key_spacing;
                KeyGeom {
                    offset,
                    glyph: key_glyph(guide, key),
                    label: key_label(key),
                }
            })
            .collect::<Vec<_>>();

        let width = x - style.key_spacing + style.margin;
        let height = style.margin * 2.0 + title_h + style.key_size;
        Self {
            id_base,
            style,
            title,
            keys,
            colorbar: None,
            size: Size { width, height },
        }
    }

    fn colorbar(
        id_base: u64,
        guide: &GuideDesc,
        style: LegendStyle,
        measurer: &impl TextMeasurer,
    ) -> Self {
        let title = guide.title.clone();
        let title_h = Self::title_height(&style, title.as_deref());
        let bar_w = style.key_size;
        let bar_h = 5.0 * style.key_size;
        let bar = Rect::new(
            style.margin,
            style.margin + title_h,
            style.margin + bar_w,
            style.margin + title_h + bar_h,
        );

        let stops = gradient_stops(guide);
        let ticks = colorbar_ticks(guide, bar_h, style.text_size);
        let max_label = ticks
            .iter()
            .map(|(_, l)| measurer.measure(l, TextStyle::new(style.text_size)).advance_width)
            .fold(0.0, f64::max)
            .max(
                guide
                    .keys
                    .iter()
                    .map(|k| label_width(k, style.text_size, measurer))
                    .fold(0.0, f64::max),
            );

        let width = style.margin * 2.0 + bar_w + 3.0 + max_label;
        let height = style.margin * 2.0 + title_h + bar_h;
        Self {
            id_base,
            style,
            title,
            keys: Vec::new(),
            colorbar: Some(ColorbarGeom { bar, stops, ticks }),
            size: Size { width, height },
        }
    }

    /// Emits the guide's marks with the block's top-left corner at `origin`.
    pub fn marks(&self, origin: Point) -> Vec<Mark> {
        let mut out = Vec::new();
        let mut next = self.id_base;

        if let Some(title) = &self.title {
            out.push(
                Mark::text(
                    MarkId::from_raw(next),
                    TextChannels {
                        pos: Point::new(
                            origin.x + self.style.margin,
                            origin.y + self.style.margin + self.style.title_size * 0.8,
                        ),
                        text: title.clone(),
                        font_size: self.style.title_size,
                        anchor: TextAnchor::Start,
                        baseline: TextBaseline::Alphabetic,
                        fill: self.style.title_fill.clone(),
                        bold: true,
                        ..TextChannels::default()
                    },
                )
                .with_z(z_order::LEGEND_LABELS),
            );
            next += 1;
        }

        if let Some(bar) = &self.colorbar {
            self.colorbar_marks(origin, bar, &mut out, &mut next);
            return out;
        }

        for key in &self.keys {
            let x = origin.x + key.offset.x;
            let y = origin.y + key.offset.y;
            let ks = self.style.key_size;
            let center = Point::new(x + ks * 0.5, y + ks * 0.5);

            // Key background behind every glyph kind.
            out.push(
                Mark::rect(
                    MarkId::from_raw(next),
                    RectChannels {
                        rect: Rect::new(x, y, x + ks, y + ks),
                        fill: self.style.key_fill.map(Brush::Solid),
                        stroke: self.style.key_stroke.map(Brush::Solid),
                        stroke_width: 0.5,
                    },
                )
                .with_z(z_order::LEGEND_KEYS),
            );
            next += 1;

            match &key.glyph {
                KeyGlyph::Swatch(color) => out.push(
                    Mark::rect(
                        MarkId::from_raw(next),
                        RectChannels {
                            rect: Rect::new(x, y, x + ks, y + ks),
                            fill: Some(Brush::Solid(*color)),
                            stroke: self.style.key_stroke.map(Brush::Solid),
                            stroke_width: 0.5,
                        },
                    )
                    .with_z(z_order::LEGEND_KEYS),
                ),
                KeyGlyph::Symbol { shape, filled, color } => {
                    let path = shape.path(center, ks * 0.55);
                    let brush = Brush::Solid(*color);
                    out.push(
                        Mark::path(
                            MarkId::from_raw(next),
                            ggir_core::PathChannels {
                                path,
                                fill: filled.then(|| brush.clone()),
                                stroke: (!filled).then_some(brush),
                                stroke_width: 1.0,
                                ..ggir_core::PathChannels::default()
                            },
                        )
                        .with_z(z_order::LEGEND_KEYS),
                    );
                }
                KeyGlyph::Dot { radius } => out.push(
                    Mark::path(
                        MarkId::from_raw(next),
                        ggir_core::PathChannels {
                            path: ggir_core::circle_path(center.x, center.y, *radius),
                            fill: Some(Brush::Solid(css::BLACK)),
                            ..ggir_core::PathChannels::default()
                        },
                    )
                    .with_z(z_order::LEGEND_KEYS),
                ),
            }
            next += 1;

            out.push(
                Mark::text(
                    MarkId::from_raw(next),
                    TextChannels {
                        pos: Point::new(x + ks + self.style.key_spacing, center.y),
                        text: key.label.clone(),
                        font_size: self.style.text_size,
                        anchor: TextAnchor::Start,
                        baseline: TextBaseline::Middle,
                        fill: self.style.text_fill.clone(),
                        ..TextChannels::default()
                    },
                )
                .with_z(z_order::LEGEND_LABELS),
            );
            next += 1;
        }

        out
    }

    fn colorbar_marks(
        &self,
        origin: Point,
        geom: &ColorbarGeom,
        out: &mut Vec<Mark>,
        next: &mut u64,
    ) {
        let bar = Rect::new(
            origin.x + geom.bar.x0,
            origin.y + geom.bar.y0,
            origin.x + geom.bar.x1,
            origin.y + geom.bar.y1,
        );

        // Gradient as thin horizontal strips; the value axis runs bottom-up.
        let strips = COLORBAR_STRIPS.max(geom.stops.len());
        let strip_h = bar.height() / strips as f64;
        for i in 0..strips {
            let t = if strips > 1 {
                i as f64 / (strips - 1) as f64
            } else {
                0.0
            };
            let y1 = bar.y1 - i as f64 * strip_h;
            out.push(
                Mark::rect(
                    MarkId::from_raw(*next),
                    RectChannels {
                        rect: Rect::new(bar.x0, y1 - strip_h, bar.x1, y1),
                        fill: Some(Brush::Solid(sample_stops(&geom.stops, t))),
                        stroke: None,
                        stroke_width: 0.0,
                    },
                )
                .with_z(z_order::LEGEND_KEYS),
            );
            *next += 1;
        }

        // Bar outline.
        out.push(
            Mark::rect(
                MarkId::from_raw(*next),
                RectChannels {
                    rect: bar,
                    fill: None,
                    stroke: convert_color("grey50").map(Brush::Solid),
                    stroke_width: 0.5,
                },
            )
            .with_z(z_order::LEGEND_KEYS),
        );
        *next += 1;

        for (dy, label) in &geom.ticks {
            let y = bar.y1 - dy;
            out.push(
                Mark::path(
                    MarkId::from_raw(*next),
                    ggir_core::PathChannels {
                        path: line_path(bar.x1, y, bar.x1 + 3.0, y),
                        stroke: Some(self.style.text_fill.clone()),
                        stroke_width: 0.5,
                        ..ggir_core::PathChannels::default()
                    },
                )
                .with_z(z_order::LEGEND_KEYS),
            );
            *next += 1;
            out.push(
                Mark::text(
                    MarkId::from_raw(*next),
                    TextChannels {
                        pos: Point::new(bar.x1 + 5.0, y),
                        text: label.clone(),
                        font_size: self.style.text_size,
                        anchor: TextAnchor::Start,
                        baseline: TextBaseline::Middle,
                        fill: self.style.text_fill.clone(),
                        ..TextChannels::default()
                    },
                )
                .with_z(z_order::LEGEND_LABELS),
            );
            *next += 1;
        }
    }
}

fn key_label(key: &GuideKey) -> String {
    key.label.clone().unwrap_or_default()
}

fn label_width(key: &GuideKey, text_size: f64, measurer: &impl TextMeasurer) -> f64 {
    measurer
        .measure(&key_label(key), TextStyle::new(text_size))
        .advance_width
}

/// Picks the glyph for a key from the guide's aesthetics list, mirroring the
/// precedence the renderer applies: shape, then size, then colour/fill.
fn key_glyph(guide: &GuideDesc, key: &GuideKey) -> KeyGlyph {
    let has = |aes: &str| guide.aesthetics.iter().any(|a| a == aes);
    let fallback = Color::from_rgba8(0x4D, 0x4D, 0x4D, 255);
    if has("shape") {
        let code = key.shape.unwrap_or(19.0);
        let color = key
            .fill
            .as_deref()
            .or(key.colour.as_deref())
            .and_then(convert_color)
            .unwrap_or(css::BLACK);
        KeyGlyph::Symbol {
            shape: Shape::from_code(code),
            filled: is_filled_code(code),
            color,
        }
    } else if has("size") {
        KeyGlyph::Dot {
            radius: mm_to_px_radius(key.size.unwrap_or(1.5)),
        }
    } else {
        let raw = if has("fill") {
            key.fill.as_deref().or(key.colour.as_deref())
        } else {
            key.colour.as_deref().or(key.fill.as_deref())
        };
        KeyGlyph::Swatch(raw.and_then(convert_color).unwrap_or(fallback))
    }
}

/// Gradient stop colors: the explicit `colors` list when present, else the
/// key swatches in order.
fn gradient_stops(guide: &GuideDesc) -> Vec<Color> {
    let explicit: Vec<Color> = guide
        .colors
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|s| convert_color(s))
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }
    let from_keys: Vec<Color> = guide
        .keys
        .iter()
        .filter_map(|k| k.colour.as_deref().or(k.fill.as_deref()))
        .filter_map(convert_color)
        .collect();
    if from_keys.is_empty() {
        alloc::vec![Color::from_rgba8(0x4D, 0x4D, 0x4D, 255)]
    } else {
        from_keys
    }
}

/// Tick positions (offset up from the bar bottom) with labels placed
/// proportionally by key value; when labels would overlap only the first and
/// last keys keep theirs.
fn colorbar_ticks(guide: &GuideDesc, bar_h: f64, text_size: f64) -> Vec<(f64, String)> {
    let values: Vec<f64> = guide
        .keys
        .iter()
        .filter_map(|k| k.value.as_ref().and_then(DataValue::as_f64))
        .collect();
    if values.is_empty() {
        return Vec::new();
    }
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let span = max - min;

    let mut ticks: Vec<(f64, String)> = guide
        .keys
        .iter()
        .filter_map(|k| {
            let v = k.value.as_ref().and_then(DataValue::as_f64)?;
            let t = if span == 0.0 { 0.0 } else { (v - min) / span };
            Some((t * bar_h, key_label(k)))
        })
        .collect();

    let crowded = ticks.len() as f64 * text_size * 1.2 > bar_h;
    if crowded && ticks.len() > 2 {
        let last = ticks.len() - 1;
        ticks = alloc::vec![ticks[0].clone(), ticks[last].clone()];
    }
    ticks
}

fn sample_stops(stops: &[Color], t: f64) -> Color {
    match stops.len() {
        0 => css::BLACK,
        1 => stops[0],
        n => {
            let scaled = t.clamp(0.0, 1.0) * (n - 1) as f64;
            #[allow(clippy::cast_possible_truncation, reason = "clamped index")]
            #[allow(clippy::cast_sign_loss, reason = "clamped index")]
            let i = (scaled as usize).min(n - 2);
            lerp_color(stops[i], stops[i + 1], scaled - i as f64)
        }
    }
}

fn lerp_color(a: Color, b: Color, t: f64) -> Color {
    let (a, b) = (a.to_rgba8(), b.to_rgba8());
    let ch = |x: u8, y: u8| {
        let v = f64::from(x) + (f64::from(y) - f64::from(x)) * t;
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=255")]
        #[allow(clippy::cast_sign_loss, reason = "clamped to 0..=255")]
        {
            v.round().clamp(0.0, 255.0) as u8
        }
    };
    Color::from_rgba8(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b), ch(a.a, b.a))
}

/// Total box needed for a stack of guides at `position`, guides separated by
/// [`guide_spacing`]. This is what the layout engine reserves.
pub fn estimate_guides(
    guides: &[GuideDesc],
    position: &str,
    theme: &Theme,
    measurer: &impl TextMeasurer,
) -> Size {
    let vertical = !matches!(position, "top" | "bottom");
    let mut total = Size::default();
    let mut visible = 0usize;
    for guide in guides {
        if guide.position.as_deref() == Some("none") {
            continue;
        }
        let block = LegendBlock::new(0, guide, position, theme, measurer);
        let s = block.size();
        if vertical {
            total.width = total.width.max(s.width);
            total.height += s.height;
        } else {
            total.width += s.width;
            total.height = total.height.max(s.height);
        }
        visible += 1;
    }
    if visible > 1 {
        let gap = guide_spacing() * (visible - 1) as f64;
        if vertical {
            total.height += gap;
        } else {
            total.width += gap;
        }
    }
    total
}
