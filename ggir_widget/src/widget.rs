// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host-facing widget shell.

use ggir_core::Scene;
use ggir_interact::{PointerEvent, Session, SessionUpdate};
use ggir_plot::{Layout, RenderReport, Scale, invalid_ir_scene, render};
use ggir_schema::{
    BrushConfig, ChartIr, HoverConfig, IrError, JsonValue, LinkedConfig, ZoomConfig,
    parse_payload, payload_from_value,
};
use ggir_text::HeuristicTextMeasurer;
use serde_json::json;

use crate::svg::SvgScene;

/// Interaction behaviors the host enabled for a widget.
///
/// Applied fresh on every render; a re-render is a hard reset of all
/// interaction state.
#[derive(Clone, Debug, Default)]
pub struct Behaviors {
    /// Zoom/pan configuration.
    pub zoom: Option<ZoomConfig>,
    /// Brush selection configuration.
    pub brush: Option<BrushConfig>,
    /// Hover highlight configuration.
    pub hover: Option<HoverConfig>,
    /// Linked-selection bus configuration.
    pub linked: Option<LinkedConfig>,
}

/// One chart widget bound to a host container of a fixed pixel size.
///
/// `render_value` and `resize` both run the full pipeline synchronously;
/// the caller serializes invocations per widget.
#[derive(Debug)]
pub struct Widget {
    width: f64,
    height: f64,
    behaviors: Behaviors,
    ir: Option<ChartIr>,
    scene: Scene,
    layout: Option<Layout>,
    scales: Option<(Scale, Scale)>,
    session: Session,
    svg: String,
}

impl Widget {
    /// New empty widget for a container of the declared size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            behaviors: Behaviors::default(),
            ir: None,
            scene: Scene::new(),
            layout: None,
            scales: None,
            session: Session::default(),
            svg: String::new(),
        }
    }

    /// Enable interaction behaviors. Takes effect from the next render.
    pub fn with_behaviors(mut self, behaviors: Behaviors) -> Self {
        self.behaviors = behaviors;
        self
    }

    /// Accept a render payload in text form.
    ///
    /// All three payload shapes are accepted (the IR directly, an
    /// `{"ir": ...}` wrapper, or a JSON string of either). A parse failure
    /// is logged and keeps the last good render on screen; a structurally
    /// invalid IR draws a placeholder instead.
    pub fn render_value(&mut self, payload: &str) {
        self.accept(parse_payload(payload));
    }

    /// Accept an already-parsed JSON payload.
    pub fn render_json(&mut self, payload: JsonValue) {
        self.accept(payload_from_value(payload));
    }

    fn accept(&mut self, parsed: Result<ChartIr, IrError>) {
        match parsed {
            Ok(ir) => {
                self.ir = Some(ir);
                self.redraw();
            }
            Err(IrError::MissingScales) => {
                tracing::warn!("IR has no scales; rendering placeholder");
                self.ir = None;
                self.layout = None;
                self.scales = None;
                self.scene = invalid_ir_scene(self.width, self.height);
                self.session = Session::new(&self.scene);
                self.svg = SvgScene::new(self.width, self.height).to_svg_string(&self.scene);
            }
            Err(err @ IrError::Json(_)) => {
                // Last good render stays on screen.
                tracing::error!(%err, "payload rejected");
            }
        }
    }

    /// Re-run the pipeline at a new size with the retained IR.
    ///
    /// A no-op until the first IR arrives.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        if self.ir.is_some() {
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        let Some(ir) = &self.ir else {
            return;
        };
        let _span = tracing::debug_span!("render", width = self.width, height = self.height)
            .entered();
        match render(ir, self.width, self.height, &HeuristicTextMeasurer) {
            Ok((scene, report)) => {
                let RenderReport {
                    marks_drawn,
                    layout,
                    x_scale,
                    y_scale,
                } = report;
                tracing::debug!(marks_drawn, "rendered");
                self.scales = Some((x_scale, y_scale));
                self.scene = scene;
                self.session = self.build_session(&layout);
                // The IR can pin its own size; the layout holds whichever won.
                let mut writer = SvgScene::new(layout.size.width, layout.size.height);
                writer.set_clips(&layout);
                self.svg = writer.to_svg_string(&self.scene);
                self.layout = Some(layout);
            }
            Err(err) => {
                tracing::error!(%err, "render failed");
            }
        }
    }

    // Interaction state never survives a redraw.
    fn build_session(&self, layout: &Layout) -> Session {
        let mut session = Session::new(&self.scene);
        if let Some(zoom) = &self.behaviors.zoom {
            session = session.with_zoom(zoom.clone());
        }
        if let Some(brush) = &self.behaviors.brush {
            session = session.with_brush(brush.clone(), layout.panel);
        }
        if let Some(hover) = &self.behaviors.hover {
            session = session.with_hover(hover.clone());
        }
        if let Some(linked) = &self.behaviors.linked {
            session = session.with_linked(linked.clone());
        }
        session
    }

    /// Route a pointer event through the interaction session.
    ///
    /// Opacity changes re-serialize the SVG in place; scale changes are
    /// reported for the host to trigger a redraw policy of its own.
    pub fn pointer(&mut self, event: &PointerEvent) -> SessionUpdate {
        let update = self.session.pointer(event, &mut self.scene);
        if update.opacities_changed {
            self.refresh_svg();
        }
        update
    }

    /// The completed brush selection as an outbound message value, in data
    /// units with `xmin`/`xmax` on the x aesthetic even under `coord.flip`.
    ///
    /// `None` while no completed selection exists, or when an axis does not
    /// invert numerically; the host sends a null payload on
    /// [`SessionUpdate::brush_cleared`].
    pub fn brush_message(&self) -> Option<serde_json::Value> {
        let brush = self.session.brush()?;
        if !brush.is_completed() {
            return None;
        }
        let (x_scale, y_scale) = self.scales.as_ref()?;
        let flip = self.ir.as_ref().is_some_and(|ir| ir.coord.flip);
        // Under flip the x scale inverts vertical pixels, so the physical
        // order swaps both going in and coming out.
        let (h, v) = if flip {
            (y_scale, x_scale)
        } else {
            (x_scale, y_scale)
        };
        let b = brush.bounds(h, v)?;
        let ((xmin, xmax), (ymin, ymax)) = if flip {
            ((b.ymin, b.ymax), (b.xmin, b.xmax))
        } else {
            ((b.xmin, b.xmax), (b.ymin, b.ymax))
        };
        Some(json!({"xmin": xmin, "xmax": xmax, "ymin": ymin, "ymax": ymax}))
    }

    /// Apply an incoming linked-selection set.
    pub fn apply_linked(&mut self, selection: Option<&[String]>) {
        if self.session.apply_linked(selection, &mut self.scene) {
            self.refresh_svg();
        }
    }

    fn refresh_svg(&mut self) {
        let writer = match &self.layout {
            Some(layout) => {
                let mut w = SvgScene::new(layout.size.width, layout.size.height);
                w.set_clips(layout);
                w
            }
            None => SvgScene::new(self.width, self.height),
        };
        self.svg = writer.to_svg_string(&self.scene);
    }

    /// The current SVG document; empty before the first render.
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// The rendered scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The interaction session for the current render.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The layout of the current render, if one succeeded.
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS: &str = r#"{
        "scales": {
            "x": {"domain": [0, 10]},
            "y": {"domain": [0, 5]}
        },
        "layers": [{
            "geom": "point",
            "data": [{"x": 1, "y": 2}, {"x": 8, "y": 4}]
        }]
    }"#;

    #[test]
    fn renders_a_payload_to_svg() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.render_value(POINTS);
        let svg = widget.svg();
        assert!(svg.starts_with("<svg "));
        assert!(svg.contains("viewBox=\"0 0 400 300\""));
        assert!(svg.contains("<path "), "point marks serialize as paths");
    }

    #[test]
    fn accepts_wrapped_and_double_encoded_payloads() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.render_value(&format!(r#"{{"ir": {POINTS}}}"#));
        assert!(!widget.svg().is_empty());

        let encoded = serde_json::to_string(POINTS).unwrap();
        let mut widget2 = Widget::new(400.0, 300.0);
        widget2.render_value(&encoded);
        assert_eq!(widget.svg(), widget2.svg());
    }

    #[test]
    fn bad_json_keeps_the_last_good_render() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.render_value(POINTS);
        let before = widget.svg().to_string();
        widget.render_value("{not json");
        assert_eq!(widget.svg(), before);
    }

    #[test]
    fn bad_json_before_any_render_draws_nothing() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.render_value("{not json");
        assert!(widget.svg().is_empty());
    }

    #[test]
    fn missing_scales_draws_the_placeholder() {
        let mut widget = Widget::new(200.0, 100.0);
        widget.render_value(r#"{"layers": []}"#);
        // Tomato placeholder rectangle.
        assert!(widget.svg().contains("#ff6347"));
    }

    #[test]
    fn resize_reruns_the_pipeline() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.render_value(POINTS);
        widget.resize(800.0, 600.0);
        assert!(widget.svg().contains("viewBox=\"0 0 800 600\""));
    }

    #[test]
    fn resize_before_first_ir_is_a_noop() {
        let mut widget = Widget::new(400.0, 300.0);
        widget.resize(800.0, 600.0);
        assert!(widget.svg().is_empty());
    }

    #[test]
    fn completed_brush_produces_a_bounds_message() {
        let behaviors = Behaviors {
            brush: Some(BrushConfig::default()),
            ..Default::default()
        };
        let mut widget = Widget::new(400.0, 300.0).with_behaviors(behaviors);
        widget.render_value(POINTS);
        assert!(widget.brush_message().is_none());

        let panel = widget.layout().unwrap().panel;
        let from = kurbo::Point::new(
            panel.x0 + panel.width() * 0.25,
            panel.y0 + panel.height() * 0.25,
        );
        let to = kurbo::Point::new(
            panel.x0 + panel.width() * 0.75,
            panel.y0 + panel.height() * 0.75,
        );
        widget.pointer(&PointerEvent::Down(from));
        widget.pointer(&PointerEvent::Move(to));
        let update = widget.pointer(&PointerEvent::Up(to));
        assert!(update.brush_changed);

        let message = widget.brush_message().unwrap();
        let xmin = message["xmin"].as_f64().unwrap();
        let xmax = message["xmax"].as_f64().unwrap();
        assert!(xmin < xmax);
        assert!((0.0..=10.0).contains(&xmin) && (0.0..=10.0).contains(&xmax));
    }

    #[test]
    fn re_render_resets_interaction_state() {
        let behaviors = Behaviors {
            zoom: Some(ZoomConfig::default()),
            ..Default::default()
        };
        let mut widget = Widget::new(400.0, 300.0).with_behaviors(behaviors);
        widget.render_value(POINTS);
        widget.pointer(&PointerEvent::Wheel {
            pos: kurbo::Point::new(100.0, 100.0),
            delta: -240.0,
        });
        assert!(!widget.session().transform().is_identity());

        widget.render_value(POINTS);
        assert!(widget.session().transform().is_identity());
    }
}
