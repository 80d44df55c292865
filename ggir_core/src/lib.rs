// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `ggir_core`: retained mark model and scene for the ggir chart renderer.
//!
//! This crate provides:
//! - stable mark identity ([`MarkId`])
//! - per-kind mark payloads ([`MarkPayload`])
//! - data-row back-references ([`DatumKey`])
//! - a retained [`Scene`] with z-ordered iteration and in-place updates
//!
//! It intentionally does NOT provide a visualization grammar. A chart
//! frontend generates one [`Mark`] per visual item (bar, tick, label, grid
//! line) with a stable id, inserts them into a [`Scene`], and hands the
//! z-ordered mark list to a renderer. Interactive layers (hover, brush,
//! zoom) mutate marks in place via the scene rather than re-running layout.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::{BezPath, Point, Rect, Shape};
use peniko::{Brush, Color};
use smallvec::SmallVec;

/// Stable identifier for a [`Mark`].
///
/// `MarkId`s must remain stable across interactive updates for the same
/// conceptual visual item; this is what lets zoom/brush replace a mark's
/// geometry without disturbing the rest of the scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkId(pub u64);

impl MarkId {
    /// Create a mark id from a raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Create a stable mark id for a data row within a layer.
    ///
    /// Deterministic namespacing mix so the same (layer, row, slot) triple
    /// always produces the same id across renders. `slot` distinguishes
    /// multiple marks emitted for one row (a boxplot emits a box, whisker
    /// lines, and outlier circles from a single row).
    pub fn for_datum(datum: DatumKey, slot: u32) -> Self {
        let layer_ns = u64::from(datum.layer).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let row = u64::from(datum.row) | (u64::from(slot) << 32);
        Self(layer_ns ^ row.rotate_left(17) ^ row.wrapping_mul(0xD6E8_FEB8_6659_FD93))
    }
}

/// Back-reference from a rendered mark to the data row that produced it.
///
/// `layer` is the index of the layer within the chart description and `row`
/// the index of the (normalized) data row within that layer. Interaction
/// layers use this to map marks back to rows for tooltips, brush hit tests,
/// and linked selection keys. Marks without a datum (axes, grid, titles) are
/// not interactive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DatumKey {
    /// Layer index within the chart.
    pub layer: u32,
    /// Row index within the layer's normalized data.
    pub row: u32,
}

impl DatumKey {
    /// Create a datum key.
    pub const fn new(layer: u32, row: u32) -> Self {
        Self { layer, row }
    }
}

/// The geometric "kind" of a mark, which determines how channels are
/// interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkKind {
    /// An axis-aligned rectangle using [`RectChannels`].
    Rect,
    /// A text item using [`TextChannels`].
    Text,
    /// A vector path using [`PathChannels`].
    Path,
}

/// Per-kind channels for a mark instance.
///
/// This is the render-facing data model: it is what downstream renderers
/// (the SVG writer) consume.
#[derive(Clone, Debug, PartialEq)]
pub enum MarkPayload {
    /// An axis-aligned rectangle.
    Rect(RectChannels),
    /// A text item positioned at a point.
    Text(TextChannels),
    /// A vector path.
    Path(PathChannels),
}

impl MarkPayload {
    /// Return the kind of this payload.
    pub fn kind(&self) -> MarkKind {
        match self {
            Self::Rect(_) => MarkKind::Rect,
            Self::Text(_) => MarkKind::Text,
            Self::Path(_) => MarkKind::Path,
        }
    }

    /// Optional bounds hint for view-box calculation.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(r.rect),
            // Text shaping is downstream; bounds are not known here.
            Self::Text(_) => None,
            Self::Path(p) => Some(p.path.bounding_box()),
        }
    }
}

/// Evaluated channels for [`MarkKind::Rect`].
#[derive(Clone, Debug, PartialEq)]
pub struct RectChannels {
    /// Rectangle geometry in scene coordinates.
    pub rect: Rect,
    /// Fill paint, or `None` for an unfilled outline.
    pub fill: Option<Brush>,
    /// Stroke paint, or `None` for no outline.
    pub stroke: Option<Brush>,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
}

impl Default for RectChannels {
    fn default() -> Self {
        Self {
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            fill: Some(Brush::Solid(Color::from_rgba8(0, 0, 0, 255))),
            stroke: None,
            stroke_width: 0.0,
        }
    }
}

/// Horizontal anchoring for text.
///
/// In SVG terms this maps to the `text-anchor` attribute. In typical chart
/// usage y-axis tick labels use [`TextAnchor::End`] so the label's right
/// edge sits against the axis, and x-axis tick labels use
/// [`TextAnchor::Middle`] to center under ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextAnchor {
    /// Anchor at the start (left in LTR).
    Start,
    /// Anchor in the middle.
    Middle,
    /// Anchor at the end (right in LTR).
    End,
}

/// Vertical alignment for text.
///
/// In SVG terms this maps to the `dominant-baseline` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextBaseline {
    /// Baseline is centered on the anchor point.
    Middle,
    /// Baseline is the font's alphabetic baseline.
    Alphabetic,
    /// Baseline is the font's hanging baseline.
    Hanging,
}

/// Evaluated channels for [`MarkKind::Text`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextChannels {
    /// Anchor position in scene coordinates.
    pub pos: Point,
    /// Text content (unshaped).
    pub text: String,
    /// Font size in scene coordinates (px).
    pub font_size: f64,
    /// Rotation angle in degrees, positive rotating clockwise about `pos`.
    ///
    /// A left axis title or a grid row strip is rendered with `-90`/`90`.
    pub angle: f64,
    /// Horizontal anchoring relative to `pos`.
    pub anchor: TextAnchor,
    /// Vertical alignment relative to `pos`.
    pub baseline: TextBaseline,
    /// Fill paint.
    pub fill: Brush,
    /// Bold face.
    pub bold: bool,
}

impl Default for TextChannels {
    fn default() -> Self {
        Self {
            pos: Point::new(0.0, 0.0),
            text: String::new(),
            font_size: 12.0,
            angle: 0.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Middle,
            fill: Brush::Solid(Color::from_rgba8(0, 0, 0, 255)),
            bold: false,
        }
    }
}

/// Dash pattern storage; most patterns are 2-4 entries.
pub type DashPattern = SmallVec<[f64; 4]>;

/// Evaluated channels for [`MarkKind::Path`].
#[derive(Clone, Debug, PartialEq)]
pub struct PathChannels {
    /// The vector path geometry.
    pub path: BezPath,
    /// Fill paint, or `None` for a stroke-only path.
    pub fill: Option<Brush>,
    /// Stroke paint, or `None` for a fill-only path.
    pub stroke: Option<Brush>,
    /// Stroke width in scene coordinates.
    pub stroke_width: f64,
    /// Dash pattern; empty means solid.
    pub dash: DashPattern,
}

impl Default for PathChannels {
    fn default() -> Self {
        Self {
            path: BezPath::new(),
            fill: None,
            stroke: Some(Brush::Solid(Color::from_rgba8(0, 0, 0, 255))),
            stroke_width: 1.0,
            dash: DashPattern::new(),
        }
    }
}

/// A single retained visual item.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    /// Stable identity.
    pub id: MarkId,
    /// Z order; larger draws later (on top). Ties break by id.
    pub z: i32,
    /// Multiplicative opacity in `[0, 1]`, applied over the paint's own
    /// alpha. Interactive dimming mutates this field only.
    pub opacity: f64,
    /// Data row that produced this mark, if any.
    pub datum: Option<DatumKey>,
    /// Clip-path id this mark is confined to, if any. Data marks are
    /// clipped to their panel; decorations are not.
    pub clip: Option<String>,
    /// Geometry and paint.
    pub payload: MarkPayload,
}

impl Mark {
    /// Create a mark with default z (0) and full opacity.
    pub fn new(id: MarkId, payload: MarkPayload) -> Self {
        Self {
            id,
            z: 0,
            opacity: 1.0,
            datum: None,
            clip: None,
            payload,
        }
    }

    /// Builder-style clip-path id.
    pub fn with_clip(mut self, clip: impl Into<String>) -> Self {
        self.clip = Some(clip.into());
        self
    }

    /// Builder-style z order.
    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    /// Builder-style opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Builder-style datum back-reference.
    pub fn with_datum(mut self, datum: DatumKey) -> Self {
        self.datum = Some(datum);
        self
    }

    /// Convenience: a rect mark.
    pub fn rect(id: MarkId, channels: RectChannels) -> Self {
        Self::new(id, MarkPayload::Rect(channels))
    }

    /// Convenience: a text mark.
    pub fn text(id: MarkId, channels: TextChannels) -> Self {
        Self::new(id, MarkPayload::Text(channels))
    }

    /// Convenience: a path mark.
    pub fn path(id: MarkId, channels: PathChannels) -> Self {
        Self::new(id, MarkPayload::Path(channels))
    }
}

/// Build a stroke-only line segment path.
pub fn line_path(x1: f64, y1: f64, x2: f64, y2: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(Point::new(x1, y1));
    path.line_to(Point::new(x2, y2));
    path
}

/// Build a closed circle path around a center point.
pub fn circle_path(cx: f64, cy: f64, r: f64) -> BezPath {
    kurbo::Circle::new(Point::new(cx, cy), r).to_path(0.1)
}

/// A retained set of marks with stable iteration order.
///
/// One scene corresponds to one rendered chart. A full re-render clears the
/// scene and rebuilds it from scratch; interactive updates replace or
/// mutate individual marks by id.
#[derive(Default, Debug)]
pub struct Scene {
    marks: Vec<Mark>,
    index: HashMap<MarkId, usize>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of marks in the scene.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// Whether the scene holds no marks.
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Insert a mark, replacing any existing mark with the same id.
    pub fn insert(&mut self, mark: Mark) {
        match self.index.get(&mark.id) {
            Some(&slot) => self.marks[slot] = mark,
            None => {
                self.index.insert(mark.id, self.marks.len());
                self.marks.push(mark);
            }
        }
    }

    /// Insert every mark from an iterator.
    pub fn extend(&mut self, marks: impl IntoIterator<Item = Mark>) {
        for mark in marks {
            self.insert(mark);
        }
    }

    /// Remove a mark by id. Returns the removed mark, if present.
    pub fn remove(&mut self, id: MarkId) -> Option<Mark> {
        let slot = self.index.remove(&id)?;
        let mark = self.marks.swap_remove(slot);
        if let Some(moved) = self.marks.get(slot) {
            self.index.insert(moved.id, slot);
        }
        Some(mark)
    }

    /// Look up a mark by id.
    pub fn get(&self, id: MarkId) -> Option<&Mark> {
        self.index.get(&id).map(|&slot| &self.marks[slot])
    }

    /// Look up a mark mutably by id.
    pub fn get_mut(&mut self, id: MarkId) -> Option<&mut Mark> {
        let slot = *self.index.get(&id)?;
        Some(&mut self.marks[slot])
    }

    /// Set a mark's opacity in place. Returns false if the id is unknown.
    pub fn set_opacity(&mut self, id: MarkId, opacity: f64) -> bool {
        match self.get_mut(id) {
            Some(mark) => {
                mark.opacity = opacity;
                true
            }
            None => false,
        }
    }

    /// Remove every mark.
    pub fn clear(&mut self) {
        self.marks.clear();
        self.index.clear();
    }

    /// Iterate marks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }

    /// Marks sorted by (z, id) — the paint order a renderer should use.
    pub fn ordered(&self) -> Vec<&Mark> {
        let mut out: Vec<&Mark> = self.marks.iter().collect();
        out.sort_by_key(|m| (m.z, m.id));
        out
    }

    /// Ids of all marks carrying a datum back-reference, in insertion order.
    pub fn interactive_ids(&self) -> Vec<MarkId> {
        self.marks
            .iter()
            .filter(|m| m.datum.is_some())
            .map(|m| m.id)
            .collect()
    }

    /// Union of payload bounds across all marks, if any are known.
    pub fn bounds(&self) -> Option<Rect> {
        let mut acc: Option<Rect> = None;
        for mark in &self.marks {
            if let Some(b) = mark.payload.bounds() {
                acc = Some(match acc {
                    Some(prev) => prev.union(b),
                    None => b,
                });
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    fn rect_mark(id: u64, z: i32) -> Mark {
        Mark::rect(
            MarkId(id),
            RectChannels {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                ..RectChannels::default()
            },
        )
        .with_z(z)
    }

    #[test]
    fn ordered_sorts_by_z_then_id() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(2, 5));
        scene.insert(rect_mark(1, 5));
        scene.insert(rect_mark(3, -10));
        let order: Vec<u64> = scene.ordered().iter().map(|m| m.id.0).collect();
        assert_eq!(order, std::vec![3, 1, 2]);
    }

    #[test]
    fn insert_replaces_same_id() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(7, 0));
        scene.insert(rect_mark(7, 3));
        assert_eq!(scene.len(), 1);
        assert_eq!(scene.get(MarkId(7)).map(|m| m.z), Some(3));
    }

    #[test]
    fn remove_keeps_index_consistent() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(1, 0));
        scene.insert(rect_mark(2, 0));
        scene.insert(rect_mark(3, 0));
        assert!(scene.remove(MarkId(2)).is_some());
        assert!(scene.get(MarkId(2)).is_none());
        assert_eq!(scene.get(MarkId(3)).map(|m| m.id.0), Some(3));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn set_opacity_mutates_in_place() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(9, 0));
        assert!(scene.set_opacity(MarkId(9), 0.2));
        assert!((scene.get(MarkId(9)).unwrap().opacity - 0.2).abs() < 1e-12);
        assert!(!scene.set_opacity(MarkId(99), 0.2));
    }

    #[test]
    fn datum_ids_are_stable_and_distinct() {
        let a = MarkId::for_datum(DatumKey::new(0, 0), 0);
        let b = MarkId::for_datum(DatumKey::new(0, 1), 0);
        let c = MarkId::for_datum(DatumKey::new(1, 0), 0);
        let d = MarkId::for_datum(DatumKey::new(0, 0), 1);
        assert_eq!(a, MarkId::for_datum(DatumKey::new(0, 0), 0));
        assert!(a != b && a != c && a != d && b != c);
    }

    #[test]
    fn interactive_ids_skip_decoration_marks() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(1, 0));
        scene.insert(rect_mark(2, 0).with_datum(DatumKey::new(0, 0)));
        assert_eq!(scene.interactive_ids(), std::vec![MarkId(2)]);
    }

    #[test]
    fn bounds_unions_rect_and_path() {
        let mut scene = Scene::new();
        scene.insert(rect_mark(1, 0));
        let mut channels = PathChannels::default();
        channels.path = line_path(20.0, 20.0, 40.0, 30.0);
        scene.insert(Mark::path(MarkId(2), channels));
        let b = scene.bounds().unwrap();
        assert_eq!(b, Rect::new(0.0, 0.0, 40.0, 30.0));
    }
}
