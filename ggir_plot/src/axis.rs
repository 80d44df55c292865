// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis mark generation.
//!
//! An axis is described by its physical placement (bottom, left, top, right)
//! plus the scale that positions its ticks. Producer-supplied break
//! positions win over the scale's own tick algorithm so gridlines and ticks
//! match the producer's break computation; categorical scales tick every
//! band center instead.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ggir_core::{Mark, MarkId, PathChannels, TextAnchor, TextBaseline, TextChannels, line_path};
use ggir_schema::DataValue;
use kurbo::Point;
use peniko::Brush;

use crate::color::convert_color;
use crate::format::{format_sig, format_tick_with_step};
use crate::layout::AxisBaseline;
use crate::scale::Scale;
use crate::theme::{LineElement, TextElement, Theme, ThemeElement};
use crate::time;
use crate::units::pt_to_px;
use crate::z_order;

/// Default tick count when the producer supplies no breaks.
pub const DEFAULT_TICK_COUNT: usize = 10;

/// Gap between the tick end and its label.
const LABEL_GAP: f64 = 3.0;

/// Physical axis placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// Horizontal axis below the panel.
    Bottom,
    /// Vertical axis left of the panel.
    Left,
    /// Secondary horizontal axis above the panel.
    Top,
    /// Secondary vertical axis right of the panel.
    Right,
}

impl AxisOrient {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Bottom | Self::Top)
    }

    /// Theme path qualifier: horizontal axes style as x, vertical as y.
    fn theme_suffix(self) -> &'static str {
        if self.is_horizontal() { "x" } else { "y" }
    }
}

/// One axis to generate marks for.
#[derive(Clone, Copy, Debug)]
pub struct AxisSpec<'a> {
    /// Physical placement.
    pub orient: AxisOrient,
    /// The positioning scale, already built against the panel range.
    pub scale: &'a Scale,
    /// Producer break positions; used verbatim for continuous scales.
    pub breaks: Option<&'a [DataValue]>,
    /// Labels paired with `breaks`.
    pub labels: Option<&'a [String]>,
    /// Tick label rotation in degrees.
    pub label_angle: f64,
    /// Base for this axis's decoration mark ids.
    pub id_base: u64,
}

impl<'a> AxisSpec<'a> {
    /// A bottom axis with no producer breaks.
    pub fn new(orient: AxisOrient, scale: &'a Scale, id_base: u64) -> Self {
        Self {
            orient,
            scale,
            breaks: None,
            labels: None,
            label_angle: 0.0,
            id_base,
        }
    }

    /// Tick positions in px paired with their label text, clamped to the
    /// scale's pixel range.
    pub fn tick_entries(&self) -> Vec<(f64, String)> {
        if let Some(cat) = self.scale.as_categorical() {
            return cat.centers().map(|(k, c)| (c, k.to_string())).collect();
        }

        // Track each value's index into `breaks` so paired labels survive
        // dropped (uncoercible or out-of-range) entries.
        let from_breaks: Option<Vec<(usize, f64)>> =
            self.breaks.filter(|b| !b.is_empty()).map(|breaks| {
                breaks
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| Some((i, self.coerce(v)?)))
                    .collect()
            });
        let values: Vec<(usize, f64)> = from_breaks.unwrap_or_else(|| {
            self.scale
                .ticks(DEFAULT_TICK_COUNT)
                .into_iter()
                .enumerate()
                .collect()
        });
        let steps: Vec<f64> = values.iter().map(|&(_, v)| v).collect();
        let step = min_step(&steps);

        let (lo, hi) = ordered_range(self.scale.range());
        let paired_labels = self
            .labels
            .filter(|l| self.breaks.is_some_and(|b| b.len() == l.len()));

        let mut out = Vec::with_capacity(values.len());
        for (i, v) in values {
            let px = self.scale.map_f64(v);
            if !px.is_finite() || px < lo - 1.0e-9 || px > hi + 1.0e-9 {
                continue;
            }
            let label = match paired_labels {
                Some(labels) => labels[i].clone(),
                None => self.format_value(v, step),
            };
            out.push((px, label));
        }
        out
    }

    fn coerce(&self, value: &DataValue) -> Option<f64> {
        if self.scale.is_temporal() {
            time::coerce_timestamp_ms(value)
        } else {
            value.as_f64()
        }
    }

    fn format_value(&self, v: f64, step: f64) -> String {
        if self.scale.is_temporal() {
            time::format_time_ms(v, step)
        } else if self.scale.is_transformed() {
            format_sig(v, 4)
        } else {
            format_tick_with_step(v, step)
        }
    }

    /// Generates the axis line, tick, and tick label marks.
    pub fn marks(&self, baseline: AxisBaseline, theme: &Theme) -> Vec<Mark> {
        let suffix = self.orient.theme_suffix();
        let mut out = Vec::new();
        let tick_len = pt_to_px(2.75);
        let entries = self.tick_entries();

        if let Some(line) = drawn_line(theme, "axis.line", suffix) {
            out.push(self.line_mark(self.id_base, baseline, &line));
        }

        if let Some(ticks) = drawn_line(theme, "axis.ticks", suffix) {
            let stroke = line_brush(&ticks, "#333333");
            let width = ticks.linewidth.unwrap_or(1.89);
            for (i, (px, _)) in entries.iter().enumerate() {
                let path = match self.orient {
                    AxisOrient::Bottom => {
                        line_path(*px, baseline.origin.y, *px, baseline.origin.y + tick_len)
                    }
                    AxisOrient::Top => {
                        line_path(*px, baseline.origin.y, *px, baseline.origin.y - tick_len)
                    }
                    AxisOrient::Left => {
                        line_path(baseline.origin.x - tick_len, *px, baseline.origin.x, *px)
                    }
                    AxisOrient::Right => {
                        line_path(baseline.origin.x, *px, baseline.origin.x + tick_len, *px)
                    }
                };
                out.push(
                    Mark::path(
                        MarkId::from_raw(self.id_base + 1 + i as u64),
                        PathChannels {
                            path,
                            stroke: Some(stroke.clone()),
                            stroke_width: width,
                            ..PathChannels::default()
                        },
                    )
                    .with_z(z_order::AXIS_RULES),
                );
            }
        }

        let text = match theme.get(&axis_path("axis.text", suffix)) {
            Some(ThemeElement::Text(t)) => Some(t),
            Some(_) => None,
            None => Some(TextElement::default()),
        };
        if let Some(text) = text {
            let fill = text_brush(&text, "#4D4D4D");
            let size = text.size_or(8.8);
            let bold = text.is_bold();
            let (lo, hi) = ordered_range(self.scale.range());
            let count = entries.len();
            for (i, (px, label)) in entries.into_iter().enumerate() {
                let (pos, anchor, bl) = self.label_placement(
                    baseline, px, tick_len, i, count, lo, hi,
                );
                out.push(
                    Mark::text(
                        MarkId::from_raw(self.id_base + 1000 + i as u64),
                        TextChannels {
                            pos,
                            text: label,
                            font_size: size,
                            angle: self.label_angle,
                            anchor,
                            baseline: bl,
                            fill: fill.clone(),
                            bold,
                        },
                    )
                    .with_z(z_order::AXIS_LABELS),
                );
            }
        }

        out
    }

    /// Anchor position and alignment for one tick label. The first and last
    /// labels of a horizontal axis clamp their anchors inward so long labels
    /// do not spill past the panel edge.
    fn label_placement(
        &self,
        baseline: AxisBaseline,
        px: f64,
        tick_len: f64,
        index: usize,
        count: usize,
        lo: f64,
        hi: f64,
    ) -> (Point, TextAnchor, TextBaseline) {
        match self.orient {
            AxisOrient::Bottom | AxisOrient::Top => {
                let (anchor, x) = if self.label_angle != 0.0 || count < 2 {
                    (TextAnchor::Middle, px)
                } else if index == 0 {
                    (TextAnchor::Start, px.clamp(lo, hi))
                } else if index + 1 == count {
                    (TextAnchor::End, px.clamp(lo, hi))
                } else {
                    (TextAnchor::Middle, px)
                };
                let (y, baseline_kind) = if self.orient == AxisOrient::Bottom {
                    (
                        baseline.origin.y + tick_len + LABEL_GAP,
                        TextBaseline::Hanging,
                    )
                } else {
                    (
                        baseline.origin.y - tick_len - LABEL_GAP,
                        TextBaseline::Alphabetic,
                    )
                };
                (Point::new(x, y), anchor, baseline_kind)
            }
            AxisOrient::Left => (
                Point::new(baseline.origin.x - tick_len - LABEL_GAP, px),
                TextAnchor::End,
                TextBaseline::Middle,
            ),
            AxisOrient::Right => (
                Point::new(baseline.origin.x + tick_len + LABEL_GAP, px),
                TextAnchor::Start,
                TextBaseline::Middle,
            ),
        }
    }

    fn line_mark(&self, id: u64, baseline: AxisBaseline, line: &LineElement) -> Mark {
        let Point { x, y } = baseline.origin;
        let path = if self.orient.is_horizontal() {
            line_path(x, y, x + baseline.length, y)
        } else {
            line_path(x, y, x, y + baseline.length)
        };
        Mark::path(
            MarkId::from_raw(id),
            PathChannels {
                path,
                stroke: Some(line_brush(line, "#000000")),
                stroke_width: line.linewidth.unwrap_or(1.89),
                dash: crate::theme::line_dash(line),
                ..PathChannels::default()
            },
        )
        .with_z(z_order::AXIS_RULES)
    }
}

/// The mark for an axis title, placed at a layout-derived anchor. The left
/// axis title reads bottom-up (`rotated`).
pub fn title_mark(
    id: u64,
    title: &str,
    anchor: Point,
    rotated: bool,
    horizontal: bool,
    theme: &Theme,
) -> Mark {
    let suffix = if horizontal { "x" } else { "y" };
    let text = theme
        .text(&axis_path("axis.title", suffix))
        .unwrap_or_default();
    Mark::text(
        MarkId::from_raw(id),
        TextChannels {
            pos: anchor,
            text: title.to_string(),
            font_size: text.size_or(11.0),
            angle: if rotated { -90.0 } else { 0.0 },
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Middle,
            fill: text_brush(&text, "#000000"),
            bold: text.is_bold(),
        },
    )
    .with_z(z_order::AXIS_TITLES)
}

fn axis_path(base: &str, suffix: &str) -> String {
    let mut path = String::from(base);
    path.push('.');
    path.push_str(suffix);
    path
}

/// Resolves a line theme element, honoring `element_blank`.
fn drawn_line(theme: &Theme, base: &str, suffix: &str) -> Option<LineElement> {
    match theme.get(&axis_path(base, suffix))? {
        ThemeElement::Line(l) => Some(l),
        _ => None,
    }
}

fn line_brush(line: &LineElement, fallback: &str) -> Brush {
    let color = line
        .colour
        .as_deref()
        .and_then(convert_color)
        .or_else(|| convert_color(fallback));
    Brush::Solid(color.unwrap_or(peniko::color::palette::css::BLACK))
}

fn text_brush(text: &TextElement, fallback: &str) -> Brush {
    let color = text
        .colour
        .as_deref()
        .and_then(convert_color)
        .or_else(|| convert_color(fallback));
    Brush::Solid(color.unwrap_or(peniko::color::palette::css::BLACK))
}

fn ordered_range(range: (f64, f64)) -> (f64, f64) {
    if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    }
}

fn min_step(values: &[f64]) -> f64 {
    let step = values
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use ggir_core::MarkPayload;
    use ggir_schema::ScaleDesc;

    use super::*;
    use crate::scale::Scale;

    fn desc(json: &str) -> ScaleDesc {
        serde_json::from_str(json).unwrap()
    }

    fn linear(range: (f64, f64)) -> Scale {
        Scale::from_desc(Some(&desc(r#"{"domain": [0, 10]}"#)), range)
    }

    fn labels_of(marks: &[Mark]) -> Vec<String> {
        marks
            .iter()
            .filter_map(|m| match &m.payload {
                MarkPayload::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn band_axis_ticks_every_category_center() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type": "band", "domain": ["a", "b", "c"]}"#)),
            (0.0, 300.0),
        );
        let axis = AxisSpec::new(AxisOrient::Bottom, &scale, 100);
        let entries = axis.tick_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1, "a");
        // Centers are ordered and inside the range.
        assert!(entries[0].0 < entries[1].0 && entries[1].0 < entries[2].0);
        assert!(entries[0].0 > 0.0 && entries[2].0 < 300.0);
    }

    #[test]
    fn producer_breaks_win_over_tick_algorithm() {
        let scale = linear((0.0, 100.0));
        let breaks = vec![
            DataValue::from(2.0),
            DataValue::from(5.0),
            DataValue::from(8.0),
        ];
        let axis = AxisSpec {
            breaks: Some(&breaks),
            ..AxisSpec::new(AxisOrient::Bottom, &scale, 100)
        };
        let entries = axis.tick_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].1, "2");
        assert!((entries[1].0 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn paired_labels_are_used_verbatim() {
        let scale = linear((0.0, 100.0));
        let breaks = vec![DataValue::from(0.0), DataValue::from(10.0)];
        let labels = vec![String::from("low"), String::from("high")];
        let axis = AxisSpec {
            breaks: Some(&breaks),
            labels: Some(&labels),
            ..AxisSpec::new(AxisOrient::Bottom, &scale, 100)
        };
        let entries = axis.tick_entries();
        assert_eq!(entries[0].1, "low");
        assert_eq!(entries[1].1, "high");
    }

    #[test]
    fn breaks_outside_the_range_are_dropped() {
        let scale = linear((0.0, 100.0));
        let breaks = vec![
            DataValue::from(-5.0),
            DataValue::from(5.0),
            DataValue::from(25.0),
        ];
        let axis = AxisSpec {
            breaks: Some(&breaks),
            ..AxisSpec::new(AxisOrient::Bottom, &scale, 100)
        };
        let entries = axis.tick_entries();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn transformed_scale_labels_use_significant_digits() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"transform": "sqrt", "domain": [0, 10]}"#)),
            (0.0, 100.0),
        );
        let breaks = vec![DataValue::from(3.162277660168379)];
        let axis = AxisSpec {
            breaks: Some(&breaks),
            ..AxisSpec::new(AxisOrient::Bottom, &scale, 100)
        };
        assert_eq!(axis.tick_entries()[0].1, "3.162");
    }

    #[test]
    fn horizontal_end_labels_clamp_their_anchors() {
        let scale = linear((0.0, 100.0));
        let axis = AxisSpec::new(AxisOrient::Bottom, &scale, 100);
        let baseline = AxisBaseline {
            origin: Point::new(0.0, 200.0),
            length: 100.0,
        };
        let marks = axis.marks(baseline, &Theme::new(None));
        let texts: Vec<&TextChannels> = marks
            .iter()
            .filter_map(|m| match &m.payload {
                MarkPayload::Text(t) => Some(t),
                _ => None,
            })
            .collect();
        assert!(texts.len() >= 2);
        assert_eq!(texts.first().unwrap().anchor, TextAnchor::Start);
        assert_eq!(texts.last().unwrap().anchor, TextAnchor::End);
        assert!(
            texts[1..texts.len() - 1]
                .iter()
                .all(|t| t.anchor == TextAnchor::Middle)
        );
    }

    #[test]
    fn blank_axis_line_is_not_drawn_but_ticks_are() {
        // theme_gray: axis.line is blank, axis.ticks is a line.
        let scale = linear((0.0, 100.0));
        let axis = AxisSpec::new(AxisOrient::Left, &scale, 100);
        let baseline = AxisBaseline {
            origin: Point::new(50.0, 0.0),
            length: 100.0,
        };
        let marks = axis.marks(baseline, &Theme::new(None));
        assert!(marks.iter().all(|m| m.id != MarkId::from_raw(100)));
        let ticks: Vec<&Mark> = marks
            .iter()
            .filter(|m| matches!(m.payload, MarkPayload::Path(_)))
            .collect();
        assert!(!ticks.is_empty());
        for t in &ticks {
            let MarkPayload::Path(p) = &t.payload else {
                unreachable!()
            };
            assert!((p.stroke_width - 1.89).abs() < 1e-9);
        }
    }

    #[test]
    fn temporal_axis_formats_clock_labels() {
        let scale = Scale::from_desc(
            Some(&desc(
                r#"{"transform": "time", "domain": [0, 7200000]}"#,
            )),
            (0.0, 200.0),
        );
        let axis = AxisSpec::new(AxisOrient::Bottom, &scale, 100);
        let labels: Vec<String> = axis.tick_entries().into_iter().map(|(_, l)| l).collect();
        assert!(labels.iter().any(|l| l.contains(':')), "{labels:?}");
    }

    #[test]
    fn title_mark_rotates_for_the_left_axis() {
        let mark = title_mark(9, "mpg", Point::new(20.0, 100.0), true, false, &Theme::new(None));
        let MarkPayload::Text(t) = &mark.payload else {
            panic!("expected text");
        };
        assert_eq!(t.angle, -90.0);
        assert_eq!(t.font_size, 11.0);
        assert_eq!(t.text, "mpg");
    }
}
