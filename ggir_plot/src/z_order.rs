// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Z-order conventions for chart-generated marks.
//!
//! `ggir_core` marks carry an explicit `z` for render ordering. The plot layer sets
//! z-indexes consistently so callers don't have to hand-tune paint order per chart.
//!
//! These values are intentionally coarse. Renderers should sort by `(z, MarkId)` for a
//! deterministic tie-break.

/// Plot background fill.
pub const PLOT_BACKGROUND: i32 = -100;
/// Panel background fills (per facet cell).
pub const PANEL_BACKGROUND: i32 = -90;
/// Minor gridlines, drawn beneath major ones.
pub const GRID_MINOR: i32 = -60;
/// Major gridlines.
pub const GRID_MAJOR: i32 = -50;

/// Data-layer marks. Layers stack in IR order starting here.
pub const DATA: i32 = 0;

/// Axis domain line and tick marks, drawn above data.
pub const AXIS_RULES: i32 = 40;
/// Axis tick labels.
pub const AXIS_LABELS: i32 = 44;
/// Axis title labels.
pub const AXIS_TITLES: i32 = 48;

/// Facet strip backgrounds.
pub const STRIP_BACKGROUND: i32 = 50;
/// Facet strip labels.
pub const STRIP_LABELS: i32 = 54;

/// Legend key backgrounds and swatches.
pub const LEGEND_KEYS: i32 = 60;
/// Legend labels and titles.
pub const LEGEND_LABELS: i32 = 64;

/// Chart-level titles, subtitle, and caption.
pub const TITLES: i32 = 80;
/// Degraded-render placeholders, always on top.
pub const PLACEHOLDER: i32 = 90;
