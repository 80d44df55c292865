// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ggir rendering core: a parsed chart IR in, a retained mark scene out.
//!
//! The pipeline is a pure function of the IR, the canvas size, and a text
//! measurer:
//! - **Scales** map data values into panel pixel coordinates.
//! - **Layout** subtracts titles, axes, legends, and facet strips from the
//!   canvas, outside in.
//! - **Geoms** turn each data layer into `ggir_core::Mark` values.
//! - **Guides** (axes, gridlines, legends) are generated as marks too, so a
//!   host only ever consumes one scene.
//!
//! Text shaping is out of scope; text marks store unshaped strings and all
//! space estimates come through the `ggir_text` measurer.

#![no_std]

extern crate alloc;

mod area_mark;
mod axis;
mod bar_mark;
mod boxplot_mark;
mod color;
mod float;
mod format;
mod geom;
mod grid;
mod layout;
mod legend;
mod line_mark;
mod point_mark;
mod rect_mark;
mod render;
mod rule_mark;
mod scale;
mod segment_mark;
mod shape;
mod text_mark;
mod theme;
mod time;
mod units;
mod violin_mark;
pub mod z_order;

pub use axis::{AxisOrient, AxisSpec, DEFAULT_TICK_COUNT, title_mark};
pub use color::{CATEGORICAL_PALETTE, ColorScale, convert_color, is_literal_color, turbo};
pub use format::{fmt_f64, format_sig, format_tick_with_step};
pub use geom::{
    GeomCtx, GeomKind, Paint, baseline_px, group_rows, linewidth_px, render as render_layer,
};
pub use grid::{GridOrientation, GridTier, grid_marks};
pub use layout::{
    AxisBaseline, AxisExtent, FixedAspect, Layout, LayoutSpec, LegendExtent, PanelRect, Size,
    StripRect,
};
pub use legend::{LegendBlock, estimate_guides, guide_spacing};
pub use render::{RenderError, RenderReport, invalid_ir_scene, render};
pub use scale::{
    CategoricalScale, ContinuousKind, ContinuousScale, Scale, SteppedScale, TemporalScale,
};
pub use shape::{Shape, is_filled_code};
pub use theme::{
    LineElement, Margins, RectElement, TextElement, Theme, ThemeElement, is_drawn, line_dash,
};
pub use time::{
    coerce_timestamp_ms, format_date_ms, format_datetime_ms, format_time_ms, nice_time_ticks_ms,
    parse_iso_ms, time_tick_step_ms,
};
pub use units::{
    DPI, PX_PER_MM, PX_PER_PT, dash_attr, linetype_dash, mm_to_px_linewidth, mm_to_px_radius,
    pt_to_px,
};
