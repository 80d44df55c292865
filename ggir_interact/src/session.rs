// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event routing across behaviors.
//!
//! A [`Session`] owns whichever machines the host enabled for one widget
//! and routes pointer events between them, enforcing the exclusion rules:
//! starting a zoom gesture clears an active brush, and hover suppresses
//! itself while a brush selection is live. The session holds the single
//! [`MarkStateTable`] all behaviors write through; it is rebuilt from
//! scratch on every render, so interaction state never survives a redraw.

use alloc::string::String;

use ggir_core::{DatumKey, MarkId, Scene};
use ggir_schema::{BrushConfig, HoverConfig, LinkedConfig, ZoomConfig};
use kurbo::{Point, Rect};

use crate::brush::{Brush, BrushOutcome};
use crate::event::PointerEvent;
use crate::hover::Hover;
use crate::linked::Linked;
use crate::state::MarkStateTable;
use crate::zoom::{Zoom, ZoomOutcome, ZoomTransform};

/// Dim opacity for peers of a linked selection.
const LINKED_DIM_OPACITY: f64 = 0.3;

/// Topmost datum-carrying mark under a point, by paint order.
pub fn hit_test(scene: &Scene, p: Point) -> Option<MarkId> {
    scene
        .ordered()
        .into_iter()
        .rev()
        .find(|m| m.datum.is_some() && m.payload.bounds().is_some_and(|b| b.contains(p)))
        .map(|m| m.id)
}

/// What one routed event changed, so the host knows what to refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// The zoom transform changed; data marks need re-projection.
    pub rescaled: bool,
    /// The zoom transform was reset to identity.
    pub zoom_reset: bool,
    /// The brush selection rectangle moved or completed.
    pub brush_changed: bool,
    /// The brush selection was cleared; emit a null bounds message.
    pub brush_cleared: bool,
    /// Mark opacities were rewritten into the scene.
    pub opacities_changed: bool,
}

impl SessionUpdate {
    /// Whether nothing happened.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Interaction state for one rendered widget.
#[derive(Clone, Debug, Default)]
pub struct Session {
    table: MarkStateTable,
    zoom: Option<Zoom>,
    brush: Option<Brush>,
    hover: Option<Hover>,
    linked: Option<Linked>,
}

impl Session {
    /// New session over a freshly rendered scene, with no behaviors.
    pub fn new(scene: &Scene) -> Self {
        Self {
            table: MarkStateTable::capture(scene),
            ..Self::default()
        }
    }

    /// Enable zoom/pan.
    pub fn with_zoom(mut self, config: ZoomConfig) -> Self {
        self.zoom = Some(Zoom::new(config));
        self
    }

    /// Enable brushing over the panel rectangle.
    pub fn with_brush(mut self, config: BrushConfig, panel: Rect) -> Self {
        self.brush = Some(Brush::new(config, panel));
        self
    }

    /// Enable hover highlighting.
    pub fn with_hover(mut self, config: HoverConfig) -> Self {
        self.hover = Some(Hover::new(config));
        self
    }

    /// Join a linked-selection group.
    pub fn with_linked(mut self, config: LinkedConfig) -> Self {
        self.linked = Some(Linked::new(config));
        self
    }

    /// The zoom machine, if enabled.
    pub fn zoom(&self) -> Option<&Zoom> {
        self.zoom.as_ref()
    }

    /// The brush machine, if enabled.
    pub fn brush(&self) -> Option<&Brush> {
        self.brush.as_ref()
    }

    /// The linked-selection endpoint, if joined.
    pub fn linked(&self) -> Option<&Linked> {
        self.linked.as_ref()
    }

    /// The current zoom transform; identity when zoom is disabled.
    pub fn transform(&self) -> ZoomTransform {
        self.zoom
            .as_ref()
            .map_or(ZoomTransform::IDENTITY, |z| *z.transform())
    }

    fn brush_active(&self) -> bool {
        self.brush.as_ref().is_some_and(Brush::is_active)
    }

    /// Route one pointer event and update the scene's opacities in place.
    pub fn pointer(&mut self, event: &PointerEvent, scene: &mut Scene) -> SessionUpdate {
        let mut update = SessionUpdate::default();

        // Drags go to the brush when one is configured; zoom keeps wheel
        // and double-click. Without a brush the zoom machine also pans.
        let brush_takes_drag = self.brush.is_some();
        match event {
            PointerEvent::Down(_) | PointerEvent::Move(_) | PointerEvent::Up(_) => {
                if let Some(brush) = &mut self.brush {
                    match brush.on_event(event) {
                        BrushOutcome::Moved => update.brush_changed = true,
                        BrushOutcome::Completed => {
                            tracing::debug!(rect = ?brush.rect(), "brush completed");
                            update.brush_changed = true;
                        }
                        BrushOutcome::Cleared => update.brush_cleared = true,
                        BrushOutcome::Ignored => {}
                    }
                }
                if !brush_takes_drag {
                    if let Some(zoom) = &mut self.zoom {
                        match zoom.on_event(event) {
                            ZoomOutcome::Transformed => update.rescaled = true,
                            ZoomOutcome::GestureStarted
                            | ZoomOutcome::Reset
                            | ZoomOutcome::Ignored => {}
                        }
                    }
                }
            }
            PointerEvent::Wheel { .. } => {
                if let Some(zoom) = &mut self.zoom {
                    zoom.on_event(event);
                    update.rescaled = true;
                    // A zoom gesture forfeits the brush selection.
                    if let Some(brush) = &mut self.brush {
                        if brush.clear() == BrushOutcome::Cleared {
                            update.brush_cleared = true;
                        }
                    }
                }
            }
            PointerEvent::DoubleClick(_) => {
                if let Some(brush) = &mut self.brush {
                    if brush.clear() == BrushOutcome::Cleared {
                        update.brush_cleared = true;
                    }
                }
                if let Some(zoom) = &mut self.zoom {
                    if !zoom.is_identity() {
                        tracing::debug!("zoom reset to identity");
                        update.rescaled = true;
                        update.zoom_reset = true;
                    }
                    zoom.reset();
                }
            }
            PointerEvent::Leave => {
                if let Some(zoom) = &mut self.zoom {
                    zoom.on_event(event);
                }
            }
        }

        if update.brush_cleared {
            self.table.reset();
            update.opacities_changed = true;
        }
        update.opacities_changed |= self.route_hover(event, scene);
        if update.opacities_changed {
            self.table.apply(scene);
        }
        update
    }

    /// Hover tracking; returns true when the table changed.
    fn route_hover(&mut self, event: &PointerEvent, scene: &Scene) -> bool {
        let Some(hover) = &mut self.hover else {
            return false;
        };
        let suppressed = self
            .brush
            .as_ref()
            .is_some_and(Brush::is_active);
        let changed = match event {
            PointerEvent::Move(p) if !suppressed => match hit_test(scene, *p) {
                Some(id) => hover.enter(id),
                None => hover.leave(),
            },
            PointerEvent::Leave => hover.leave(),
            _ => false,
        };
        if changed {
            hover.write(&mut self.table, suppressed);
        }
        changed
    }

    /// Dim every mark whose datum fails a predicate and push the result
    /// into the scene. Used by the host after resolving brush rows.
    pub fn dim_where_not(
        &mut self,
        scene: &mut Scene,
        opacity: f64,
        keep: impl Fn(DatumKey) -> bool,
    ) {
        self.table.dim_where_not(opacity, keep);
        self.table.apply(scene);
    }

    /// Apply an incoming linked selection and update the scene.
    ///
    /// Returns true if the selection changed. Safe to call repeatedly with
    /// the same set.
    pub fn apply_linked(&mut self, selection: Option<&[String]>, scene: &mut Scene) -> bool {
        let Some(linked) = &mut self.linked else {
            return false;
        };
        if !linked.apply(selection) {
            return false;
        }
        linked.write(&mut self.table, LINKED_DIM_OPACITY);
        self.table.apply(scene);
        true
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use ggir_core::{Mark, RectChannels};

    fn scene_of(n: u32) -> Scene {
        let mut scene = Scene::new();
        for row in 0..n {
            let datum = DatumKey { layer: 0, row };
            let channels = RectChannels {
                rect: Rect::new(f64::from(row) * 20.0, 0.0, f64::from(row) * 20.0 + 10.0, 10.0),
                ..Default::default()
            };
            scene.insert(
                Mark::rect(MarkId::for_datum(datum, 0), channels).with_datum(datum),
            );
        }
        scene
    }

    fn panel() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 300.0)
    }

    fn drag(session: &mut Session, scene: &mut Scene, from: Point, to: Point) -> SessionUpdate {
        session.pointer(&PointerEvent::Down(from), scene);
        session.pointer(&PointerEvent::Move(to), scene);
        session.pointer(&PointerEvent::Up(to), scene)
    }

    #[test]
    fn wheel_zoom_clears_an_active_brush() {
        let mut scene = scene_of(2);
        let mut session = Session::new(&scene)
            .with_zoom(ZoomConfig::default())
            .with_brush(BrushConfig::default(), panel());
        drag(
            &mut session,
            &mut scene,
            Point::new(10.0, 10.0),
            Point::new(100.0, 100.0),
        );
        assert!(session.brush().unwrap().is_completed());

        let update = session.pointer(
            &PointerEvent::Wheel {
                pos: Point::new(50.0, 50.0),
                delta: -120.0,
            },
            &mut scene,
        );
        assert!(update.rescaled);
        assert!(update.brush_cleared);
        assert!(!session.brush().unwrap().is_active());
    }

    #[test]
    fn hover_is_suppressed_while_a_brush_is_held() {
        let mut scene = scene_of(2);
        let ids = scene.interactive_ids();
        let mut session = Session::new(&scene)
            .with_brush(BrushConfig::default(), panel())
            .with_hover(HoverConfig::default());
        drag(
            &mut session,
            &mut scene,
            Point::new(100.0, 100.0),
            Point::new(200.0, 200.0),
        );

        // Moving over a mark while the selection is held must not dim.
        let update = session.pointer(&PointerEvent::Move(Point::new(5.0, 5.0)), &mut scene);
        assert!(!update.opacities_changed);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 1.0);
    }

    #[test]
    fn hover_dims_once_the_brush_is_gone() {
        let mut scene = scene_of(2);
        let ids = scene.interactive_ids();
        let mut session = Session::new(&scene).with_hover(HoverConfig::default());
        let update = session.pointer(&PointerEvent::Move(Point::new(5.0, 5.0)), &mut scene);
        assert!(update.opacities_changed);
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 1.0);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 0.3);

        session.pointer(&PointerEvent::Leave, &mut scene);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 1.0);
    }

    #[test]
    fn double_click_resets_zoom_and_clears_the_brush() {
        let mut scene = scene_of(1);
        let mut session = Session::new(&scene)
            .with_zoom(ZoomConfig::default())
            .with_brush(BrushConfig::default(), panel());
        session.pointer(
            &PointerEvent::Wheel {
                pos: Point::new(50.0, 50.0),
                delta: -120.0,
            },
            &mut scene,
        );
        drag(
            &mut session,
            &mut scene,
            Point::new(10.0, 10.0),
            Point::new(80.0, 80.0),
        );

        let update = session.pointer(&PointerEvent::DoubleClick(Point::new(0.0, 0.0)), &mut scene);
        assert!(update.zoom_reset);
        assert!(update.brush_cleared);
        assert!(session.transform().is_identity());
    }

    #[test]
    fn linked_selection_is_idempotent_on_the_scene() {
        let mut scene = scene_of(3);
        let ids = scene.interactive_ids();
        let config: LinkedConfig =
            serde_json::from_str(r#"{"key": ["a", "b", "c"], "group": "g"}"#).unwrap();
        let mut session = Session::new(&scene).with_linked(config);

        let selection = vec![String::from("b")];
        assert!(session.apply_linked(Some(&selection), &mut scene));
        assert!(!session.apply_linked(Some(&selection), &mut scene));
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 0.3);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 1.0);

        assert!(session.apply_linked(None, &mut scene));
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 1.0);
    }
}
