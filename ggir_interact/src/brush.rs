// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangular brush selection.
//!
//! The brush drags out a pixel rectangle over the panel, optionally
//! constrained to one axis, and translates it into data terms on demand:
//! continuous and temporal axes invert the pixel span, categorical axes
//! collect every category whose band center falls inside (they have no
//! inverse). Selected rows are resolved against layer data by position, so
//! the brush never needs to know how marks were drawn.

use alloc::string::String;
use alloc::vec::Vec;

use ggir_plot::Scale;
use ggir_schema::{BrushConfig, LayerIr};
use kurbo::{Point, Rect};

use crate::event::PointerEvent;

/// A degenerate drag below this span clears instead of selecting.
const MIN_SPAN_PX: f64 = 1.0;

/// Completed brush extent in data units, for the outbound channel.
///
/// Only produced when both axes are invertible; a brush over a categorical
/// axis reports through [`Brush::categories`] instead.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushBounds {
    /// Smaller x domain value.
    pub xmin: f64,
    /// Larger x domain value.
    pub xmax: f64,
    /// Smaller y domain value.
    pub ymin: f64,
    /// Larger y domain value.
    pub ymax: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Dragging { origin: Point, current: Point },
    Completed { origin: Point, current: Point },
}

/// What a brush event did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushOutcome {
    /// Event did not concern the brush.
    Ignored,
    /// Drag in progress; the selection rectangle moved.
    Moved,
    /// Drag finished with a non-degenerate extent.
    Completed,
    /// Selection cleared (degenerate drag, double-click, or external reset).
    Cleared,
}

/// The brush selection machine for one panel.
#[derive(Clone, Debug)]
pub struct Brush {
    config: BrushConfig,
    panel: Rect,
    phase: Phase,
}

impl Brush {
    /// New idle brush over a panel rectangle.
    pub fn new(config: BrushConfig, panel: Rect) -> Self {
        Self {
            config,
            panel,
            phase: Phase::Idle,
        }
    }

    /// The configuration this brush was built with.
    pub fn config(&self) -> &BrushConfig {
        &self.config
    }

    /// Whether a selection is being dragged or held.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Whether a completed selection is held.
    pub fn is_completed(&self) -> bool {
        matches!(self.phase, Phase::Completed { .. })
    }

    /// Feed one pointer event through the machine.
    pub fn on_event(&mut self, event: &PointerEvent) -> BrushOutcome {
        match *event {
            PointerEvent::Down(p) if self.panel.contains(p) => {
                self.phase = Phase::Dragging {
                    origin: p,
                    current: p,
                };
                BrushOutcome::Moved
            }
            PointerEvent::Move(p) => {
                let Phase::Dragging { origin, .. } = self.phase else {
                    return BrushOutcome::Ignored;
                };
                self.phase = Phase::Dragging {
                    origin,
                    current: self.clamp_to_panel(p),
                };
                BrushOutcome::Moved
            }
            PointerEvent::Up(p) => {
                let Phase::Dragging { origin, .. } = self.phase else {
                    return BrushOutcome::Ignored;
                };
                let current = self.clamp_to_panel(p);
                if self.span_of(origin, current) < MIN_SPAN_PX {
                    self.phase = Phase::Idle;
                    return BrushOutcome::Cleared;
                }
                self.phase = Phase::Completed { origin, current };
                BrushOutcome::Completed
            }
            PointerEvent::DoubleClick(_) => self.clear(),
            PointerEvent::Down(_) | PointerEvent::Wheel { .. } | PointerEvent::Leave => {
                BrushOutcome::Ignored
            }
        }
    }

    /// Drop any selection. Returns [`BrushOutcome::Cleared`] if one existed.
    pub fn clear(&mut self) -> BrushOutcome {
        if matches!(self.phase, Phase::Idle) {
            BrushOutcome::Ignored
        } else {
            self.phase = Phase::Idle;
            BrushOutcome::Cleared
        }
    }

    fn clamp_to_panel(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.panel.x0, self.panel.x1),
            p.y.clamp(self.panel.y0, self.panel.y1),
        )
    }

    fn constrains_x(&self) -> bool {
        self.config.direction != "y"
    }

    fn constrains_y(&self) -> bool {
        self.config.direction != "x"
    }

    fn span_of(&self, a: Point, b: Point) -> f64 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        match (self.constrains_x(), self.constrains_y()) {
            (true, false) => dx,
            (false, true) => dy,
            _ => dx.max(dy),
        }
    }

    /// The selection rectangle in pixels, if any.
    ///
    /// The unconstrained axis of an `"x"` or `"y"` brush spans the whole
    /// panel.
    pub fn rect(&self) -> Option<Rect> {
        let (origin, current) = match self.phase {
            Phase::Idle => return None,
            Phase::Dragging { origin, current } | Phase::Completed { origin, current } => {
                (origin, current)
            }
        };
        let (x0, x1) = if self.constrains_x() {
            (origin.x.min(current.x), origin.x.max(current.x))
        } else {
            (self.panel.x0, self.panel.x1)
        };
        let (y0, y1) = if self.constrains_y() {
            (origin.y.min(current.y), origin.y.max(current.y))
        } else {
            (self.panel.y0, self.panel.y1)
        };
        Some(Rect::new(x0, y0, x1, y1))
    }

    /// The held selection in data units, when both axes invert.
    pub fn bounds(&self, x: &Scale, y: &Scale) -> Option<BrushBounds> {
        let rect = self.rect()?;
        let (xa, xb) = (x.invert(rect.x0)?, x.invert(rect.x1)?);
        let (ya, yb) = (y.invert(rect.y0)?, y.invert(rect.y1)?);
        Some(BrushBounds {
            xmin: xa.min(xb),
            xmax: xa.max(xb),
            ymin: ya.min(yb),
            ymax: ya.max(yb),
        })
    }

    /// Categories of a categorical axis whose band centers fall inside the
    /// selection. Empty for non-categorical scales or an idle brush.
    pub fn categories(&self, scale: &Scale, horizontal: bool) -> Vec<String> {
        let Some(rect) = self.rect() else {
            return Vec::new();
        };
        let Some(cat) = scale.as_categorical() else {
            return Vec::new();
        };
        let (lo, hi) = if horizontal {
            (rect.x0, rect.x1)
        } else {
            (rect.y0, rect.y1)
        };
        cat.centers()
            .filter(|&(_, px)| px >= lo && px <= hi)
            .map(|(key, _)| String::from(key))
            .collect()
    }

    /// Row indices of a layer whose mapped position falls inside the
    /// selection. Rows missing either position are never selected.
    pub fn select_rows(&self, layer: &LayerIr, x: &Scale, y: &Scale, flip: bool) -> Vec<usize> {
        let Some(rect) = self.rect() else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for row in 0..layer.data.len() {
            let Some(xv) = layer.value(row, "x").and_then(|v| x.center(v)) else {
                continue;
            };
            let Some(yv) = layer.value(row, "y").and_then(|v| y.center(v)) else {
                continue;
            };
            let p = if flip {
                Point::new(yv, xv)
            } else {
                Point::new(xv, yv)
            };
            if rect.contains(p) {
                out.push(row);
            }
        }
        out
    }
}
