// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outside-in chart layout.
//!
//! The available canvas is carved up by repeated subtraction: plot margins,
//! then title/subtitle (top) and caption (bottom) slices, then a legend slice
//! on its configured side, then axis margins estimated from tick label text.
//! Whatever remains is the panel, subject to a 50x50 px floor. Faceting
//! subdivides the panel into a grid of cells with strip bands; a fixed-aspect
//! coordinate shrinks and centers it instead.
//!
//! Layout runs once per render. Interactive updates reuse the computed
//! `Layout` rather than re-running this pass.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU32, Ordering};

use ggir_schema::{DataValue, FacetDesc};
use ggir_text::{TextMeasurer, TextStyle};
use kurbo::{Point, Rect};

use crate::theme::{Margins, Theme};
use crate::units::pt_to_px;

/// A width/height pair used by chart layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    /// Width in px.
    pub width: f64,
    /// Height in px.
    pub height: f64,
}

/// Space-relevant facts about one positional axis.
#[derive(Clone, Copy, Debug, Default)]
pub struct AxisExtent<'a> {
    /// Formatted tick labels, used to estimate the label margin.
    pub tick_labels: &'a [String],
    /// Axis title, if any.
    pub title: Option<&'a str>,
}

/// A legend that wants space on one side of the panel.
#[derive(Clone, Copy, Debug)]
pub struct LegendExtent<'a> {
    /// "right", "left", "top", "bottom", "none" or "inside".
    pub position: &'a str,
    /// Measured legend block size.
    pub size: Size,
}

/// A `coord_fixed` aspect constraint.
#[derive(Clone, Copy, Debug)]
pub struct FixedAspect {
    /// Units of y per unit of x.
    pub ratio: f64,
    /// X domain span in data units.
    pub x_span: f64,
    /// Y domain span in data units.
    pub y_span: f64,
}

/// Layout inputs for a single chart.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutSpec<'a> {
    /// Outer canvas width in px.
    pub width: f64,
    /// Outer canvas height in px.
    pub height: f64,
    /// Resolved theme.
    pub theme: Option<&'a Theme>,
    /// Plot title.
    pub title: Option<&'a str>,
    /// Plot subtitle.
    pub subtitle: Option<&'a str>,
    /// Plot caption.
    pub caption: Option<&'a str>,
    /// Bottom axis extents.
    pub x_axis: AxisExtent<'a>,
    /// Left axis extents.
    pub y_axis: AxisExtent<'a>,
    /// Whether a secondary x axis is drawn along the top.
    pub x2_enabled: bool,
    /// Whether a secondary y axis is drawn along the right.
    pub y2_enabled: bool,
    /// Whether the secondary x axis carries its own title.
    pub x2_has_title: bool,
    /// Whether the secondary y axis carries its own title.
    pub y2_has_title: bool,
    /// Legend placement and measured size.
    pub legend: Option<LegendExtent<'a>>,
    /// Fixed-aspect constraint (ignored when faceted).
    pub fixed_aspect: Option<FixedAspect>,
    /// Facet specification.
    pub facets: Option<&'a FacetDesc>,
}

/// One facet cell with its clip id.
#[derive(Clone, Debug)]
pub struct PanelRect {
    /// Panel id, matching the `PANEL` column in layer data.
    pub panel: DataValue,
    /// Cell rectangle.
    pub rect: Rect,
    /// SVG clip-path id for marks in this cell.
    pub clip_id: String,
}

/// One facet strip band.
#[derive(Clone, Debug)]
pub struct StripRect {
    /// Strip label text.
    pub label: String,
    /// Strip rectangle.
    pub rect: Rect,
    /// Row strips on the right edge draw their label rotated 90 degrees.
    pub rotated: bool,
}

/// An axis baseline: where the rule starts and how far it runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBaseline {
    /// Top-left of the baseline.
    pub origin: Point,
    /// Run length in px (rightward for horizontal axes, downward for vertical).
    pub length: f64,
}

/// Output of the arrange pass.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Outer canvas size.
    pub size: Size,
    /// Plot margins that were subtracted first.
    pub plot_margin: Margins,
    /// Title anchor (middle-anchored), if a title is present.
    pub title: Option<Point>,
    /// Subtitle anchor.
    pub subtitle: Option<Point>,
    /// Caption anchor.
    pub caption: Option<Point>,
    /// The panel rectangle. For faceted charts this is the union of all
    /// cells, which keeps axis titles centered on the whole grid.
    pub panel: Rect,
    /// Centering offset applied by a fixed-aspect constraint.
    pub panel_offset: (f64, f64),
    /// Clip-path id for the single-panel case.
    pub clip_id: String,
    /// Bottom axis baseline.
    pub axis_bottom: AxisBaseline,
    /// Left axis baseline.
    pub axis_left: AxisBaseline,
    /// Top axis baseline, when a secondary x axis is enabled.
    pub axis_top: Option<AxisBaseline>,
    /// Right axis baseline, when a secondary y axis is enabled.
    pub axis_right: Option<AxisBaseline>,
    /// Bottom axis title anchor.
    pub x_title: Option<Point>,
    /// Left axis title anchor; drawn rotated -90 degrees.
    pub y_title: Option<Point>,
    /// Legend rectangle, when a legend reserved space.
    pub legend: Option<Rect>,
    /// Facet cells; empty for single-panel charts.
    pub panels: Vec<PanelRect>,
    /// Facet strip bands (wrap strips, grid column strips, grid row strips).
    pub strips: Vec<StripRect>,
    /// Strip band thickness in px (0 when unfaceted).
    pub strip_height: f64,
}

// Clip ids must be unique per render so stale <clipPath> defs from a
// previous render never capture new marks.
static CLIP_SEQ: AtomicU32 = AtomicU32::new(0);

fn next_clip_id(tag: &str) -> String {
    let n = CLIP_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("panel-{tag}clip-{n}")
}

fn text_height(font_size: f64) -> f64 {
    font_size * 1.2
}

fn max_label_width(measurer: &impl TextMeasurer, labels: &[String], font_size: f64) -> f64 {
    let mut max = 0.0_f64;
    for label in labels {
        let w = measurer
            .measure(label, TextStyle::new(font_size))
            .advance_width;
        max = max.max(w);
    }
    max
}

fn is_faceted(facets: Option<&FacetDesc>) -> bool {
    facets.is_some_and(|f| {
        matches!(f.kind.as_deref(), Some("wrap") | Some("grid")) && f.layout.len() > 1
    })
}

fn facet_grid_shape(facets: &FacetDesc) -> (usize, usize) {
    let max_row = facets.layout.iter().map(|c| c.row).max().unwrap_or(1);
    let max_col = facets.layout.iter().map(|c| c.col).max().unwrap_or(1);
    let nrow = facets.nrow.unwrap_or(max_row).max(1) as usize;
    let ncol = facets.ncol.unwrap_or(max_col).max(1) as usize;
    (nrow, ncol)
}

impl Layout {
    /// Computes a layout from the provided specification.
    pub fn arrange(spec: &LayoutSpec<'_>, measurer: &impl TextMeasurer) -> Self {
        let default_theme = Theme::new(None);
        let theme = spec.theme.unwrap_or(&default_theme);

        let title_size = theme.text("text.title").map_or(13.2, |t| t.size_or(13.2));
        let subtitle_size = theme.text("text.subtitle").map_or(11.0, |t| t.size_or(11.0));
        let caption_size = theme.text("text.caption").map_or(8.8, |t| t.size_or(8.8));
        let axis_text_x = theme.text("axis.text.x").map_or(8.8, |t| t.size_or(8.8));
        let axis_text_y = theme.text("axis.text.y").map_or(8.8, |t| t.size_or(8.8));
        let axis_title_x = theme.text("axis.title.x").map_or(11.0, |t| t.size_or(11.0));
        let axis_title_y = theme.text("axis.title.y").map_or(11.0, |t| t.size_or(11.0));
        let strip_text_size = theme.text("strip.text").map_or(8.8, |t| t.size_or(8.8));

        let tick_length = pt_to_px(2.75);
        let legend_spacing = pt_to_px(11.0);
        let faceted = is_faceted(spec.facets);

        let strip_height = if faceted {
            text_height(strip_text_size) + 2.0 * pt_to_px(4.4)
        } else {
            0.0
        };

        let title_height = if spec.title.is_some() {
            text_height(title_size) + 4.0
        } else {
            0.0
        };
        let subtitle_height = if spec.subtitle.is_some() {
            text_height(subtitle_size) + 2.0
        } else {
            0.0
        };
        let caption_height = if spec.caption.is_some() {
            text_height(caption_size) + 4.0
        } else {
            0.0
        };

        let y_tick_max_width = max_label_width(measurer, spec.y_axis.tick_labels, axis_text_y);
        let x_tick_height = if spec.x_axis.tick_labels.is_empty() {
            0.0
        } else {
            text_height(axis_text_x)
        };
        let x_title_height = if spec.x_axis.title.is_some() {
            text_height(axis_title_x) + 4.0
        } else {
            0.0
        };
        // The y title is rotated, so its footprint width is a text height.
        let y_title_width = if spec.y_axis.title.is_some() {
            text_height(axis_title_y) + 4.0
        } else {
            0.0
        };

        // Outside-in subtraction.
        let plot_margin = theme.plot_margin();
        let mut box_ = Rect::new(
            plot_margin.left,
            plot_margin.top,
            spec.width - plot_margin.right,
            spec.height - plot_margin.bottom,
        );

        let title_area_y = box_.y0;
        box_.y0 += title_height + subtitle_height;

        let caption_area_y = box_.y1 - caption_height;
        box_.y1 -= caption_height;

        let mut legend_box = None;
        if let Some(legend) = spec.legend {
            let Size { width, height } = legend.size;
            if (width > 0.0 || height > 0.0)
                && legend.position != "none"
                && legend.position != "inside"
            {
                match legend.position {
                    "left" => {
                        let amount = width + legend_spacing;
                        legend_box = Some(Rect::new(box_.x0, box_.y0, box_.x0 + amount, box_.y1));
                        box_.x0 += amount;
                    }
                    "top" => {
                        let amount = height + legend_spacing;
                        legend_box = Some(Rect::new(box_.x0, box_.y0, box_.x1, box_.y0 + amount));
                        box_.y0 += amount;
                    }
                    "bottom" => {
                        let amount = height + legend_spacing;
                        legend_box = Some(Rect::new(box_.x0, box_.y1 - amount, box_.x1, box_.y1));
                        box_.y1 -= amount;
                    }
                    // "right" and anything unrecognized.
                    _ => {
                        let amount = width + legend_spacing;
                        legend_box = Some(Rect::new(box_.x1 - amount, box_.y0, box_.x1, box_.y1));
                        box_.x1 -= amount;
                    }
                }
            }
        }

        let bottom_space = x_tick_height + tick_length + x_title_height + 8.0;
        let left_space = y_tick_max_width + tick_length + y_title_width + 8.0;
        let top_space = if spec.x2_enabled {
            x_tick_height
                + tick_length
                + if spec.x2_has_title { x_title_height } else { 0.0 }
                + 8.0
        } else {
            0.0
        };
        let right_space = if spec.y2_enabled {
            y_tick_max_width
                + tick_length
                + if spec.y2_has_title { y_title_width } else { 0.0 }
                + 8.0
        } else {
            0.0
        };

        let mut panel = Rect::new(
            box_.x0 + left_space,
            box_.y0 + top_space,
            box_.x0 + left_space + (box_.width() - left_space - right_space).max(50.0),
            box_.y0 + top_space + (box_.height() - bottom_space - top_space).max(50.0),
        );

        let mut panel_offset = (0.0, 0.0);
        if !faceted {
            if let Some(aspect) = spec.fixed_aspect {
                if aspect.ratio > 0.0 && aspect.x_span > 0.0 && aspect.y_span > 0.0 {
                    let avail_w = panel.width();
                    let avail_h = panel.height();
                    let target_aspect = aspect.ratio * (aspect.y_span / aspect.x_span);
                    let (w, h) = if avail_w / avail_h > 1.0 / target_aspect {
                        (avail_h / target_aspect, avail_h)
                    } else {
                        (avail_w, avail_w * target_aspect)
                    };
                    panel_offset = ((avail_w - w) / 2.0, (avail_h - h) / 2.0);
                    panel = Rect::new(
                        panel.x0 + panel_offset.0,
                        panel.y0 + panel_offset.1,
                        panel.x0 + panel_offset.0 + w,
                        panel.y0 + panel_offset.1 + h,
                    );
                }
            }
        }

        let mut panels = Vec::new();
        let mut strips = Vec::new();
        if faceted {
            let facets = spec.facets.unwrap_or(&DEFAULT_FACETS);
            let (nrow, ncol) = facet_grid_shape(facets);
            let spacing = facets.spacing.unwrap_or(7.3);
            let grid = facets.kind.as_deref() == Some("grid");

            let avail = panel;
            if grid {
                // Column strips run along the top, row strips (rotated) along
                // the right edge.
                let strip_width = strip_height;
                let panel_area_w = avail.width() - strip_width;
                let panel_area_h = avail.height() - strip_height;
                let panel_w = (panel_area_w - (ncol as f64 - 1.0) * spacing) / ncol as f64;
                let panel_h = (panel_area_h - (nrow as f64 - 1.0) * spacing) / nrow as f64;

                for cell in &facets.layout {
                    let col = cell.col.saturating_sub(1) as f64;
                    let row = cell.row.saturating_sub(1) as f64;
                    let x = avail.x0 + col * (panel_w + spacing);
                    let y = avail.y0 + strip_height + row * (panel_h + spacing);
                    panels.push(PanelRect {
                        panel: cell.panel.clone(),
                        rect: Rect::new(x, y, x + panel_w, y + panel_h),
                        clip_id: next_clip_id(""),
                    });
                }
                for strip in &facets.col_strips {
                    let col = strip.col.unwrap_or(1).saturating_sub(1) as f64;
                    let x = avail.x0 + col * (panel_w + spacing);
                    strips.push(StripRect {
                        label: strip.label.clone(),
                        rect: Rect::new(x, avail.y0, x + panel_w, avail.y0 + strip_height),
                        rotated: false,
                    });
                }
                for strip in &facets.row_strips {
                    let row = strip.row.unwrap_or(1).saturating_sub(1) as f64;
                    let y = avail.y0 + strip_height + row * (panel_h + spacing);
                    strips.push(StripRect {
                        label: strip.label.clone(),
                        rect: Rect::new(
                            avail.x0 + panel_area_w,
                            y,
                            avail.x0 + panel_area_w + strip_width,
                            y + panel_h,
                        ),
                        rotated: true,
                    });
                }
            } else {
                // facet_wrap: every panel carries its own strip above it.
                let panel_w = (avail.width() - (ncol as f64 - 1.0) * spacing) / ncol as f64;
                let panel_h =
                    (avail.height() - (nrow as f64 - 1.0) * spacing - nrow as f64 * strip_height)
                        / nrow as f64;

                for cell in &facets.layout {
                    let col = cell.col.saturating_sub(1) as f64;
                    let row = cell.row.saturating_sub(1) as f64;
                    let x = avail.x0 + col * (panel_w + spacing);
                    let y = avail.y0 + row * (strip_height + panel_h + spacing) + strip_height;
                    panels.push(PanelRect {
                        panel: cell.panel.clone(),
                        rect: Rect::new(x, y, x + panel_w, y + panel_h),
                        clip_id: next_clip_id(""),
                    });
                }
                for strip in &facets.strips {
                    let Some(cell) = panels
                        .iter()
                        .find(|p| Some(&p.panel) == strip.panel.as_ref())
                    else {
                        continue;
                    };
                    strips.push(StripRect {
                        label: strip.label.clone(),
                        rect: Rect::new(
                            cell.rect.x0,
                            cell.rect.y0 - strip_height,
                            cell.rect.x1,
                            cell.rect.y0,
                        ),
                        rotated: false,
                    });
                }
            }

            // The panel box becomes the union of all cells so axis titles
            // stay centered on the grid.
            if let Some(first) = panels.first() {
                let mut union = first.rect;
                for p in &panels[1..] {
                    union = union.union(p.rect);
                }
                panel = union;
            }
        }

        let title = spec.title.map(|_| {
            Point::new(
                panel.x0 + panel.width() / 2.0,
                title_area_y + title_height * 0.8,
            )
        });
        let subtitle = spec.subtitle.map(|_| {
            Point::new(
                panel.x0 + panel.width() / 2.0,
                title_area_y + title_height + subtitle_height * 0.8,
            )
        });
        let caption = spec.caption.map(|_| {
            Point::new(
                panel.x0 + panel.width() / 2.0,
                caption_area_y + caption_height * 0.8,
            )
        });

        let x_title = spec.x_axis.title.map(|_| {
            Point::new(
                panel.x0 + panel.width() / 2.0,
                panel.y1 + x_tick_height + tick_length + x_title_height * 0.8,
            )
        });
        let y_title = spec.y_axis.title.map(|_| {
            Point::new(
                panel.x0 - y_tick_max_width - tick_length - y_title_width / 2.0,
                panel.y0 + panel.height() / 2.0,
            )
        });

        Self {
            size: Size {
                width: spec.width,
                height: spec.height,
            },
            plot_margin,
            title,
            subtitle,
            caption,
            panel,
            panel_offset,
            clip_id: next_clip_id("-"),
            axis_bottom: AxisBaseline {
                origin: Point::new(panel.x0, panel.y1),
                length: panel.width(),
            },
            axis_left: AxisBaseline {
                origin: Point::new(panel.x0, panel.y0),
                length: panel.height(),
            },
            axis_top: (top_space > 0.0).then(|| AxisBaseline {
                origin: Point::new(panel.x0, panel.y0),
                length: panel.width(),
            }),
            axis_right: (right_space > 0.0).then(|| AxisBaseline {
                origin: Point::new(panel.x1, panel.y0),
                length: panel.height(),
            }),
            x_title,
            y_title,
            legend: legend_box,
            panels,
            strips,
            strip_height,
        }
    }

    /// Returns the cell rectangle for a panel id, or the whole panel for
    /// single-panel charts.
    #[must_use]
    pub fn panel_rect(&self, panel: Option<&DataValue>) -> Rect {
        match panel {
            Some(id) => self
                .panels
                .iter()
                .find(|p| &p.panel == id)
                .map_or(self.panel, |p| p.rect),
            None => self.panel,
        }
    }
}

static DEFAULT_FACETS: FacetDesc = FacetDesc {
    kind: None,
    nrow: None,
    ncol: None,
    layout: Vec::new(),
    strips: Vec::new(),
    row_strips: Vec::new(),
    col_strips: Vec::new(),
    scales: None,
    spacing: None,
};

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use ggir_text::HeuristicTextMeasurer;

    use super::*;
    use crate::units::PX_PER_PT;

    const TICK: f64 = 2.75 * PX_PER_PT;

    fn close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn bare_chart_leaves_margins_and_axis_gutters() {
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        // No tick labels and no titles: each axis gutter is tick + 8.
        close(layout.panel.x0, 7.3 + TICK + 8.0);
        close(layout.panel.x1, 400.0 - 7.3);
        close(layout.panel.y0, 7.3);
        close(layout.panel.y1, 300.0 - 7.3 - (TICK + 8.0));
        assert!(layout.title.is_none());
        assert!(layout.legend.is_none());
        assert!(layout.panels.is_empty());
    }

    #[test]
    fn title_and_subtitle_slice_the_top() {
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            title: Some("Title"),
            subtitle: Some("Sub"),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        let title_h = 13.2 * 1.2 + 4.0;
        let subtitle_h = 11.0 * 1.2 + 2.0;
        close(layout.panel.y0, 7.3 + title_h + subtitle_h);
        let title = layout.title.unwrap();
        close(title.y, 7.3 + title_h * 0.8);
        close(layout.subtitle.unwrap().y, 7.3 + title_h + subtitle_h * 0.8);
        close(title.x, layout.panel.x0 + layout.panel.width() / 2.0);
    }

    #[test]
    fn tick_labels_widen_the_left_gutter() {
        let labels = vec!["100".to_string(), "10000".to_string()];
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            x_axis: AxisExtent {
                tick_labels: &labels,
                title: Some("x"),
            },
            y_axis: AxisExtent {
                tick_labels: &labels,
                title: None,
            },
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        // Widest label is "10000" at 0.6em per char of 8.8px text.
        let y_tick_w = 5.0 * 8.8 * 0.6;
        close(layout.panel.x0, 7.3 + y_tick_w + TICK + 8.0);
        // Bottom gutter: label height + tick + title block + 8.
        let x_tick_h = 8.8 * 1.2;
        let x_title_h = 11.0 * 1.2 + 4.0;
        close(layout.panel.y1, 300.0 - 7.3 - (x_tick_h + TICK + x_title_h + 8.0));
        let x_title = layout.x_title.unwrap();
        close(x_title.y, layout.panel.y1 + x_tick_h + TICK + x_title_h * 0.8);
        assert!(layout.y_title.is_none());
    }

    #[test]
    fn right_legend_reserves_width_plus_spacing() {
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            legend: Some(LegendExtent {
                position: "right",
                size: Size {
                    width: 60.0,
                    height: 120.0,
                },
            }),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        let amount = 60.0 + 11.0 * PX_PER_PT;
        close(layout.panel.x1, 400.0 - 7.3 - amount);
        let legend = layout.legend.unwrap();
        close(legend.x0, 400.0 - 7.3 - amount);
        close(legend.x1, 400.0 - 7.3);
    }

    #[test]
    fn inside_legend_reserves_nothing() {
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            legend: Some(LegendExtent {
                position: "inside",
                size: Size {
                    width: 60.0,
                    height: 40.0,
                },
            }),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);
        assert!(layout.legend.is_none());
        close(layout.panel.x1, 400.0 - 7.3);
    }

    #[test]
    fn panel_never_collapses_below_floor() {
        let spec = LayoutSpec {
            width: 30.0,
            height: 20.0,
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);
        close(layout.panel.width(), 50.0);
        close(layout.panel.height(), 50.0);
    }

    #[test]
    fn fixed_aspect_centers_a_square_panel() {
        let spec = LayoutSpec {
            width: 500.0,
            height: 200.0,
            fixed_aspect: Some(FixedAspect {
                ratio: 1.0,
                x_span: 10.0,
                y_span: 10.0,
            }),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        // Wide canvas, square data: width-limited, so the panel is square.
        close(layout.panel.width(), layout.panel.height());
        assert!(layout.panel_offset.0 > 0.0);
        close(layout.panel_offset.1, 0.0);
    }

    #[test]
    fn facet_wrap_places_strip_above_each_cell() {
        let facets: FacetDesc = serde_json::from_str(
            r#"{
                "type": "wrap",
                "nrow": 1,
                "ncol": 2,
                "spacing": 10.0,
                "layout": [
                    {"PANEL": 1, "ROW": 1, "COL": 1},
                    {"PANEL": 2, "ROW": 1, "COL": 2}
                ],
                "strips": [{"PANEL": 1, "label": "a"}, {"PANEL": 2, "label": "b"}]
            }"#,
        )
        .unwrap();
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            facets: Some(&facets),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        assert_eq!(layout.panels.len(), 2);
        assert_eq!(layout.strips.len(), 2);
        let strip_h = 8.8 * 1.2 + 2.0 * (4.4 * PX_PER_PT);
        close(layout.strip_height, strip_h);

        let a = &layout.panels[0];
        let b = &layout.panels[1];
        close(a.rect.width(), b.rect.width());
        close(b.rect.x0, a.rect.x1 + 10.0);
        // Strip sits directly above its own panel.
        close(layout.strips[0].rect.y1, a.rect.y0);
        close(layout.strips[0].rect.x0, a.rect.x0);
        assert!(!layout.strips[0].rotated);

        // Union box spans both cells.
        close(layout.panel.x0, a.rect.x0);
        close(layout.panel.x1, b.rect.x1);
        assert_ne!(a.clip_id, b.clip_id);
    }

    #[test]
    fn facet_grid_puts_row_strips_on_the_right() {
        let facets: FacetDesc = serde_json::from_str(
            r#"{
                "type": "grid",
                "nrow": 2,
                "ncol": 1,
                "layout": [
                    {"PANEL": 1, "ROW": 1, "COL": 1},
                    {"PANEL": 2, "ROW": 2, "COL": 1}
                ],
                "col_strips": [{"COL": 1, "label": "c"}],
                "row_strips": [{"ROW": 1, "label": "r1"}, {"ROW": 2, "label": "r2"}]
            }"#,
        )
        .unwrap();
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            facets: Some(&facets),
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);

        assert_eq!(layout.panels.len(), 2);
        // One column strip plus two row strips.
        assert_eq!(layout.strips.len(), 3);
        let row_strips: Vec<_> = layout.strips.iter().filter(|s| s.rotated).collect();
        assert_eq!(row_strips.len(), 2);
        // Row strips hug the right edge of the cells.
        close(row_strips[0].rect.x0, layout.panels[0].rect.x1);
        close(row_strips[0].rect.y0, layout.panels[0].rect.y0);
        // The column strip spans the cell width above the first row.
        let col_strip = layout.strips.iter().find(|s| !s.rotated).unwrap();
        close(col_strip.rect.y1, layout.panels[0].rect.y0);
    }

    #[test]
    fn arranging_twice_gives_identical_boxes() {
        let labels = ["0".to_string(), "50".to_string(), "100".to_string()];
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            title: Some("Title"),
            x_axis: AxisExtent {
                tick_labels: &labels,
                title: Some("x"),
            },
            ..Default::default()
        };
        let a = Layout::arrange(&spec, &HeuristicTextMeasurer);
        let b = Layout::arrange(&spec, &HeuristicTextMeasurer);
        assert_eq!(a.panel, b.panel);
        assert_eq!(a.title, b.title);
        assert_eq!(a.x_title, b.x_title);
        assert_eq!(a.axis_bottom.origin, b.axis_bottom.origin);
        assert_eq!(a.axis_bottom.length, b.axis_bottom.length);
    }

    #[test]
    fn panel_rect_falls_back_to_union() {
        let spec = LayoutSpec {
            width: 400.0,
            height: 300.0,
            ..Default::default()
        };
        let layout = Layout::arrange(&spec, &HeuristicTextMeasurer);
        let rect = layout.panel_rect(Some(&DataValue::from(3.0)));
        assert_eq!(rect, layout.panel);
    }
}
