// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The full render pipeline.
//!
//! One call turns a parsed IR into a retained [`Scene`]: scales, legend
//! estimate, layout, backgrounds and grid, data layers clipped to their
//! panel, axes, titles, strips, legends. Failures degrade per layer and per
//! guide; only a chart that ends up with zero data marks gets the visible
//! placeholder dot so a broken plot never passes for an empty dataset.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use ggir_core::{
    Mark, MarkId, PathChannels, RectChannels, Scene, TextAnchor, TextBaseline, TextChannels,
    circle_path,
};
use ggir_schema::{AxisDesc, ChartIr, DataValue, PanelDesc, ScaleDesc};
use ggir_text::TextMeasurer;
use kurbo::{Point, Rect};
use peniko::{Brush, color::palette::css};

use crate::axis::{AxisOrient, AxisSpec, title_mark};
use crate::color::{ColorScale, convert_color};
use crate::geom::{self, GeomCtx};
use crate::grid::{GridOrientation, GridTier, grid_marks};
use crate::layout::{
    AxisBaseline, AxisExtent, FixedAspect, Layout, LayoutSpec, LegendExtent, PanelRect,
};
use crate::legend::{LegendBlock, estimate_guides, guide_spacing};
use crate::scale::Scale;
use crate::theme::{RectElement, TextElement, Theme};
use crate::z_order;

/// What a render pass produced, alongside the scene itself.
#[derive(Clone, Debug)]
pub struct RenderReport {
    /// Total marks in the scene, decorations included.
    pub marks_drawn: usize,
    /// The computed box tree, kept for interaction hit-testing.
    pub layout: Layout,
    /// The first panel's resolved x scale, for host-side brush inversion
    /// and zoom rescaling. Under `coord.flip` its pixel range is vertical.
    pub x_scale: Scale,
    /// The first panel's resolved y scale.
    pub y_scale: Scale,
}

/// A render that could not start at all.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Canvas dimensions were non-finite or non-positive.
    #[error("canvas size {width}x{height} is not renderable")]
    Canvas {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}

// Decoration mark ids live far above the sequential test/demo range; data
// marks use hashed datum ids and do not collide with a running counter.
const DECOR_ID_BASE: u64 = 0x6767_6972_0000_0000;

struct IdAlloc(u64);

impl IdAlloc {
    fn block(&mut self, len: u64) -> u64 {
        let base = self.0;
        self.0 += len;
        base
    }
}

/// One panel's drawing context: its rectangle, clip id, and the scales
/// ranged against it.
struct Panel<'a> {
    rect: Rect,
    clip: String,
    id: Option<&'a DataValue>,
    x: Scale,
    y: Scale,
    x_breaks: Option<&'a [DataValue]>,
    y_breaks: Option<&'a [DataValue]>,
}

/// Renders a chart into a fresh scene.
pub fn render(
    ir: &ChartIr,
    width: f64,
    height: f64,
    measurer: &impl TextMeasurer,
) -> Result<(Scene, RenderReport), RenderError> {
    let width = ir.width.unwrap_or(width);
    let height = ir.height.unwrap_or(height);
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(RenderError::Canvas { width, height });
    }

    let theme = Theme::new(ir.theme.clone());
    let flip = ir.coord.flip;
    let color = ColorScale::from_desc(ir.scales.color.as_ref());

    // Physical axes: under coord_flip the y scale runs along the bottom
    // edge and the x scale along the left edge.
    let (bottom_desc, bottom_axis) = physical_axis(ir, flip, true);
    let (left_desc, left_axis) = physical_axis(ir, flip, false);

    // Provisional scales, ranged over the raw canvas, exist only to format
    // tick labels for the space estimate; the panel range shifts positions,
    // not label text.
    let prov_bottom = Scale::from_desc(bottom_desc, (0.0, width));
    let prov_left = Scale::from_desc(left_desc, (height, 0.0));
    let bottom_labels = tick_label_texts(&prov_bottom, bottom_desc, AxisOrient::Bottom);
    let left_labels = tick_label_texts(&prov_left, left_desc, AxisOrient::Left);

    let legend_pos = ir.legend.position.as_str();
    let legend_size = estimate_guides(&ir.guides, legend_pos, &theme, measurer);
    let legend = (legend_size.width > 0.0 && legend_size.height > 0.0).then_some(LegendExtent {
        position: legend_pos,
        size: legend_size,
    });

    let spec = LayoutSpec {
        width,
        height,
        theme: Some(&theme),
        title: ir.title.as_deref(),
        subtitle: ir.subtitle.as_deref(),
        caption: ir.caption.as_deref(),
        x_axis: AxisExtent {
            tick_labels: &bottom_labels,
            title: bottom_axis.and_then(|a| a.title.as_deref()),
        },
        y_axis: AxisExtent {
            tick_labels: &left_labels,
            title: left_axis.and_then(|a| a.title.as_deref()),
        },
        x2_enabled: ir.axes.x2.is_some(),
        y2_enabled: ir.axes.y2.is_some(),
        x2_has_title: ir.axes.x2.as_ref().is_some_and(|a| a.title.is_some()),
        y2_has_title: ir.axes.y2.as_ref().is_some_and(|a| a.title.is_some()),
        legend,
        fixed_aspect: fixed_aspect(ir, &prov_bottom, &prov_left, flip),
        facets: ir.facets.as_ref(),
    };
    let layout = Layout::arrange(&spec, measurer);
    let panels = build_panels(ir, &layout, flip);

    let mut scene = Scene::new();
    let mut ids = IdAlloc(DECOR_ID_BASE);

    scene.extend(background_rect(
        &mut ids,
        Rect::new(0.0, 0.0, width, height),
        theme.rect("plot.background"),
        z_order::PLOT_BACKGROUND,
    ));
    for panel in &panels {
        scene.extend(background_rect(
            &mut ids,
            panel.rect,
            theme.rect("panel.background"),
            z_order::PANEL_BACKGROUND,
        ));
        scene.extend(panel_grid(&mut ids, panel, ir, &theme, flip));
    }

    let mut data_marks: Vec<Mark> = Vec::new();
    for (index, layer) in ir.layers.iter().enumerate() {
        let before = data_marks.len();
        for panel in &panels {
            let ctx = GeomCtx {
                layer_index: index as u32,
                x: &panel.x,
                y: &panel.y,
                color: color.as_ref(),
                panel: panel.rect,
                flip,
                clip: &panel.clip,
                panel_id: panel.id,
            };
            geom::render(layer, &ctx, &mut data_marks);
        }
        tracing::debug!(
            layer = index,
            geom = %layer.geom,
            marks = data_marks.len() - before,
            "layer rendered"
        );
    }
    let data_count = data_marks.len();
    scene.extend(data_marks);

    scene.extend(axes_marks(
        &mut ids,
        ir,
        &layout,
        &panels,
        (bottom_desc, bottom_axis),
        (left_desc, left_axis),
        &theme,
    ));
    scene.extend(chart_titles(&mut ids, ir, &layout, &theme));
    scene.extend(strip_marks(&mut ids, &layout, &theme));
    scene.extend(legend_marks(&mut ids, ir, &layout, &theme, measurer));

    if data_count == 0 {
        // Empty result across every layer: a visible indicator, not a
        // silently blank panel.
        let center = layout.panel.center();
        scene.insert(
            Mark::path(
                MarkId::from_raw(ids.block(1)),
                PathChannels {
                    path: circle_path(center.x, center.y, 6.0),
                    fill: Some(Brush::Solid(css::TOMATO)),
                    ..PathChannels::default()
                },
            )
            .with_z(z_order::PLACEHOLDER),
        );
        tracing::warn!("no layer produced marks, drawing placeholder");
    }

    // build_panels always yields at least one panel.
    let (x_scale, y_scale) = match panels.into_iter().next() {
        Some(panel) => (panel.x, panel.y),
        None => (
            Scale::from_desc(ir.scales.x.as_ref(), (0.0, width)),
            Scale::from_desc(ir.scales.y.as_ref(), (height, 0.0)),
        ),
    };
    let report = RenderReport {
        marks_drawn: scene.len(),
        layout,
        x_scale,
        y_scale,
    };
    Ok((scene, report))
}

/// The degraded output for a structurally invalid IR: a full-canvas tomato
/// rectangle, unmistakably not a chart.
pub fn invalid_ir_scene(width: f64, height: f64) -> Scene {
    let mut scene = Scene::new();
    scene.insert(
        Mark::rect(
            MarkId::from_raw(DECOR_ID_BASE),
            RectChannels {
                rect: Rect::new(0.0, 0.0, width.max(1.0), height.max(1.0)),
                fill: Some(Brush::Solid(css::TOMATO)),
                stroke: None,
                stroke_width: 0.0,
            },
        )
        .with_z(z_order::PLACEHOLDER),
    );
    scene
}

fn physical_axis(
    ir: &ChartIr,
    flip: bool,
    bottom: bool,
) -> (Option<&ScaleDesc>, Option<&AxisDesc>) {
    let wants_y = bottom == flip;
    if wants_y {
        (ir.scales.y.as_ref(), ir.axes.y.as_ref())
    } else {
        (ir.scales.x.as_ref(), ir.axes.x.as_ref())
    }
}

fn tick_label_texts(scale: &Scale, desc: Option<&ScaleDesc>, orient: AxisOrient) -> Vec<String> {
    let mut spec = AxisSpec::new(orient, scale, 0);
    if let Some(desc) = desc {
        spec.breaks = desc.breaks.as_deref();
        spec.labels = desc.labels.as_deref();
    }
    spec.tick_entries().into_iter().map(|(_, l)| l).collect()
}

fn fixed_aspect(ir: &ChartIr, bottom: &Scale, left: &Scale, flip: bool) -> Option<FixedAspect> {
    let ratio = ir.coord.ratio.filter(|r| r.is_finite() && *r > 0.0)?;
    let (x_scale, y_scale) = if flip { (left, bottom) } else { (bottom, left) };
    let (x0, x1) = x_scale.domain_bounds()?;
    let (y0, y1) = y_scale.domain_bounds()?;
    Some(FixedAspect {
        ratio,
        x_span: (x1 - x0).abs(),
        y_span: (y1 - y0).abs(),
    })
}

/// Scales and clip info for each facet cell, or a single pseudo-panel.
fn build_panels<'a>(ir: &'a ChartIr, layout: &Layout, flip: bool) -> Vec<Panel<'a>> {
    let make = |rect: Rect, clip: String, desc: Option<&'a PanelDesc>| {
        let x_range = if flip {
            (rect.y1, rect.y0)
        } else {
            (rect.x0, rect.x1)
        };
        let y_range = if flip {
            (rect.x0, rect.x1)
        } else {
            (rect.y1, rect.y0)
        };
        let mut x = Scale::from_desc(ir.scales.x.as_ref(), x_range);
        let mut y = Scale::from_desc(ir.scales.y.as_ref(), y_range);
        // Free facet scales narrow the shared domain per cell.
        if let Some(span) = desc.and_then(|d| numeric_span(d.x_range.as_deref())) {
            x = x.with_domain(span);
        }
        if let Some(span) = desc.and_then(|d| numeric_span(d.y_range.as_deref())) {
            y = y.with_domain(span);
        }
        Panel {
            rect,
            clip,
            id: desc.map(|d| &d.panel),
            x,
            y,
            x_breaks: desc.and_then(|d| d.x_breaks.as_deref()),
            y_breaks: desc.and_then(|d| d.y_breaks.as_deref()),
        }
    };

    if layout.panels.is_empty() {
        return alloc::vec![make(layout.panel, layout.clip_id.clone(), None)];
    }
    layout
        .panels
        .iter()
        .map(|cell| {
            let desc = ir.panels.iter().find(|p| p.panel == cell.panel);
            make(cell.rect, cell.clip_id.clone(), desc)
        })
        .collect()
}

fn numeric_span(range: Option<&[DataValue]>) -> Option<(f64, f64)> {
    let range = range?;
    match range {
        [a, b] => Some((a.as_f64()?, b.as_f64()?)),
        _ => None,
    }
}

fn background_rect(
    ids: &mut IdAlloc,
    rect: Rect,
    element: Option<RectElement>,
    z: i32,
) -> Option<Mark> {
    let element = element?;
    let fill = element.fill.as_deref().and_then(convert_color)?;
    let stroke = element.colour.as_deref().and_then(convert_color);
    Some(
        Mark::rect(
            MarkId::from_raw(ids.block(1)),
            RectChannels {
                rect,
                fill: Some(Brush::Solid(fill)),
                stroke_width: if stroke.is_some() {
                    element.linewidth.unwrap_or(1.0)
                } else {
                    0.0
                },
                stroke: stroke.map(Brush::Solid),
            },
        )
        .with_z(z),
    )
}

fn panel_grid(
    ids: &mut IdAlloc,
    panel: &Panel<'_>,
    ir: &ChartIr,
    theme: &Theme,
    flip: bool,
) -> Vec<Mark> {
    fn minor(desc: Option<&ScaleDesc>) -> Option<&[DataValue]> {
        desc.and_then(|d| d.minor_breaks.as_deref())
    }
    fn major<'a>(
        desc: Option<&'a ScaleDesc>,
        panel_breaks: Option<&'a [DataValue]>,
    ) -> Option<&'a [DataValue]> {
        panel_breaks.or_else(|| desc.and_then(|d| d.breaks.as_deref()))
    }

    // Vertical rules come from whichever scale runs horizontally.
    let (hscale, hdesc, hmajor) = if flip {
        (&panel.y, ir.scales.y.as_ref(), panel.y_breaks)
    } else {
        (&panel.x, ir.scales.x.as_ref(), panel.x_breaks)
    };
    let (vscale, vdesc, vmajor) = if flip {
        (&panel.x, ir.scales.x.as_ref(), panel.x_breaks)
    } else {
        (&panel.y, ir.scales.y.as_ref(), panel.y_breaks)
    };

    let mut out = Vec::new();
    for (scale, orientation, desc, major_breaks) in [
        (hscale, GridOrientation::Vertical, hdesc, major(hdesc, hmajor)),
        (
            vscale,
            GridOrientation::Horizontal,
            vdesc,
            major(vdesc, vmajor),
        ),
    ] {
        out.extend(grid_marks(
            scale,
            orientation,
            minor(desc),
            panel.rect,
            theme,
            GridTier::Minor,
            ids.block(256),
        ));
        out.extend(grid_marks(
            scale,
            orientation,
            major_breaks,
            panel.rect,
            theme,
            GridTier::Major,
            ids.block(256),
        ));
    }
    out
}

fn axis_spec<'a>(
    orient: AxisOrient,
    scale: &'a Scale,
    desc: Option<&'a ScaleDesc>,
    axis: Option<&'a AxisDesc>,
    panel_breaks: Option<&'a [DataValue]>,
    id_base: u64,
) -> AxisSpec<'a> {
    let mut spec = AxisSpec::new(orient, scale, id_base);
    spec.breaks = panel_breaks.or_else(|| desc.and_then(|d| d.breaks.as_deref()));
    spec.labels = desc.and_then(|d| d.labels.as_deref());
    spec.label_angle = axis.and_then(|a| a.label_angle).unwrap_or(0.0);
    spec
}

fn axes_marks(
    ids: &mut IdAlloc,
    ir: &ChartIr,
    layout: &Layout,
    panels: &[Panel<'_>],
    bottom: (Option<&ScaleDesc>, Option<&AxisDesc>),
    left: (Option<&ScaleDesc>, Option<&AxisDesc>),
    theme: &Theme,
) -> Vec<Mark> {
    let flip = ir.coord.flip;
    let mut out = Vec::new();

    let edges = facet_edges(ir, layout);
    for (i, panel) in panels.iter().enumerate() {
        let on_bottom = edges.as_ref().is_none_or(|e| e.bottom.contains(&i));
        let on_left = edges.as_ref().is_none_or(|e| e.left.contains(&i));
        let (b_scale, b_breaks) = if flip {
            (&panel.y, panel.y_breaks)
        } else {
            (&panel.x, panel.x_breaks)
        };
        let (l_scale, l_breaks) = if flip {
            (&panel.x, panel.x_breaks)
        } else {
            (&panel.y, panel.y_breaks)
        };

        if on_bottom {
            let baseline = if edges.is_some() {
                AxisBaseline {
                    origin: Point::new(panel.rect.x0, panel.rect.y1),
                    length: panel.rect.width(),
                }
            } else {
                layout.axis_bottom
            };
            out.extend(
                axis_spec(
                    AxisOrient::Bottom,
                    b_scale,
                    bottom.0,
                    bottom.1,
                    b_breaks,
                    ids.block(256),
                )
                .marks(baseline, theme),
            );
        }
        if on_left {
            let baseline = if edges.is_some() {
                AxisBaseline {
                    origin: Point::new(panel.rect.x0, panel.rect.y0),
                    length: panel.rect.height(),
                }
            } else {
                layout.axis_left
            };
            out.extend(
                axis_spec(
                    AxisOrient::Left,
                    l_scale,
                    left.0,
                    left.1,
                    l_breaks,
                    ids.block(256),
                )
                .marks(baseline, theme),
            );
        }
    }

    // Secondary axes mirror the primary scale on the opposite edge.
    if let (Some(baseline), Some(panel)) = (layout.axis_top, panels.first()) {
        let (scale, breaks) = if flip {
            (&panel.y, panel.y_breaks)
        } else {
            (&panel.x, panel.x_breaks)
        };
        let axis = ir.axes.x2.as_ref();
        out.extend(
            axis_spec(AxisOrient::Top, scale, bottom.0, axis, breaks, ids.block(256))
                .marks(baseline, theme),
        );
    }
    if let (Some(baseline), Some(panel)) = (layout.axis_right, panels.first()) {
        let (scale, breaks) = if flip {
            (&panel.x, panel.x_breaks)
        } else {
            (&panel.y, panel.y_breaks)
        };
        let axis = ir.axes.y2.as_ref();
        out.extend(
            axis_spec(AxisOrient::Right, scale, left.0, axis, breaks, ids.block(256))
                .marks(baseline, theme),
        );
    }

    if let (Some(anchor), Some(title)) = (layout.x_title, bottom.1.and_then(|a| a.title.as_deref()))
    {
        out.push(title_mark(ids.block(1), title, anchor, false, true, theme));
    }
    if let (Some(anchor), Some(title)) = (layout.y_title, left.1.and_then(|a| a.title.as_deref())) {
        out.push(title_mark(ids.block(1), title, anchor, true, false, theme));
    }
    out
}

/// Which panels sit on the drawing edges of a facet grid: bottom-most cell
/// per column, left-most cell per row.
struct FacetEdges {
    bottom: Vec<usize>,
    left: Vec<usize>,
}

fn facet_edges(ir: &ChartIr, layout: &Layout) -> Option<FacetEdges> {
    if layout.panels.is_empty() {
        return None;
    }
    let cells = &ir.facets.as_ref()?.layout;
    let place = |p: &PanelRect| cells.iter().find(|c| c.panel == p.panel);

    let mut bottom = Vec::new();
    let mut left = Vec::new();
    for (i, panel) in layout.panels.iter().enumerate() {
        let Some(cell) = place(panel) else {
            // Unplaced cells still get axes rather than none.
            bottom.push(i);
            left.push(i);
            continue;
        };
        let lowest_in_col = layout.panels.iter().filter_map(place).all(|other| {
            other.col != cell.col || other.row <= cell.row
        });
        if lowest_in_col {
            bottom.push(i);
        }
        if layout
            .panels
            .iter()
            .filter_map(place)
            .all(|other| other.row != cell.row || other.col >= cell.col)
        {
            left.push(i);
        }
    }
    Some(FacetEdges { bottom, left })
}

fn chart_titles(ids: &mut IdAlloc, ir: &ChartIr, layout: &Layout, theme: &Theme) -> Vec<Mark> {
    let mut out = Vec::new();
    let entries = [
        (layout.title, ir.title.as_deref(), "text.title", 13.2),
        (layout.subtitle, ir.subtitle.as_deref(), "text.subtitle", 11.0),
        (layout.caption, ir.caption.as_deref(), "text.caption", 8.8),
    ];
    for (anchor, text, path, default_size) in entries {
        let (Some(anchor), Some(text)) = (anchor, text) else {
            continue;
        };
        let element = theme.text(path).unwrap_or_default();
        out.push(styled_text(
            ids.block(1),
            text,
            anchor,
            &element,
            default_size,
            z_order::TITLES,
        ));
    }
    out
}

fn strip_marks(ids: &mut IdAlloc, layout: &Layout, theme: &Theme) -> Vec<Mark> {
    let mut out = Vec::new();
    for strip in &layout.strips {
        if let Some(mark) = background_rect(
            ids,
            strip.rect,
            theme.rect("strip.background"),
            z_order::STRIP_BACKGROUND,
        ) {
            out.push(mark);
        }
        let element = theme.text("strip.text").unwrap_or_default();
        let mut mark = styled_text(
            ids.block(1),
            &strip.label,
            strip.rect.center(),
            &element,
            8.8,
            z_order::STRIP_LABELS,
        );
        if strip.rotated {
            if let ggir_core::MarkPayload::Text(t) = &mut mark.payload {
                t.angle = 90.0;
            }
        }
        out.push(mark);
    }
    out
}

fn styled_text(
    id: u64,
    text: &str,
    pos: Point,
    element: &TextElement,
    default_size: f64,
    z: i32,
) -> Mark {
    let fill = element
        .colour
        .as_deref()
        .and_then(convert_color)
        .unwrap_or(css::BLACK);
    Mark::text(
        MarkId::from_raw(id),
        TextChannels {
            pos,
            text: text.to_string(),
            font_size: element.size_or(default_size),
            anchor: TextAnchor::Middle,
            baseline: TextBaseline::Middle,
            fill: Brush::Solid(fill),
            bold: element.is_bold(),
            ..TextChannels::default()
        },
    )
    .with_z(z)
}

fn legend_marks(
    ids: &mut IdAlloc,
    ir: &ChartIr,
    layout: &Layout,
    theme: &Theme,
    measurer: &impl TextMeasurer,
) -> Vec<Mark> {
    let Some(rect) = layout.legend else {
        return Vec::new();
    };
    let position = ir.legend.position.as_str();
    let horizontal = matches!(position, "top" | "bottom");
    let mut origin = Point::new(rect.x0, rect.y0);
    let mut out = Vec::new();
    for guide in &ir.guides {
        if guide.position.as_deref() == Some("none") {
            continue;
        }
        let block = LegendBlock::new(ids.block(4096), guide, position, theme, measurer);
        out.extend(block.marks(origin));
        let size = block.size();
        if horizontal {
            origin.x += size.width + guide_spacing();
        } else {
            origin.y += size.height + guide_spacing();
        }
    }
    out
}
