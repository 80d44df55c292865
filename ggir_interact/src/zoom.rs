// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom and pan.
//!
//! The gesture machine accumulates a [`ZoomTransform`] from wheel and drag
//! events; rescaling is a pure function from the *original* scale and the
//! current transform, so a double-click reset reproduces the initial scales
//! exactly rather than unwinding increments.

use ggir_plot::Scale;
use ggir_schema::ZoomConfig;
use kurbo::Point;

use crate::event::PointerEvent;
use crate::float::FloatExt;

/// Wheel delta to zoom factor exponent, matching the d3 default.
const WHEEL_FACTOR: f64 = 0.002;

/// An affine zoom state: uniform scale `k` with per-axis translation.
///
/// Pixel positions map as `px * k + tx` (and `py * k + ty`); rescaling a
/// scale applies the inverse to its range endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    /// Zoom factor, `1.0` at rest.
    pub k: f64,
    /// Horizontal translation in pixels.
    pub tx: f64,
    /// Vertical translation in pixels.
    pub ty: f64,
}

impl ZoomTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        k: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Inverse-map a horizontal pixel position into pre-zoom space.
    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.tx) / self.k
    }

    /// Inverse-map a vertical pixel position into pre-zoom space.
    pub fn invert_y(&self, py: f64) -> f64 {
        (py - self.ty) / self.k
    }
}

/// Rescale a scale through a zoom transform.
///
/// Pure: the input scale is always the render's original, never a
/// previously rescaled one. Categorical scales have no inverse and pass
/// through unchanged; zooming a band axis is a no-op by design of the
/// upstream grammar.
pub fn rescale(original: &Scale, transform: &ZoomTransform, horizontal: bool) -> Scale {
    if original.is_categorical() || transform.is_identity() {
        return original.clone();
    }
    let (r0, r1) = original.range();
    let inv = |px: f64| {
        if horizontal {
            transform.invert_x(px)
        } else {
            transform.invert_y(px)
        }
    };
    match (original.invert(inv(r0)), original.invert(inv(r1))) {
        (Some(d0), Some(d1)) => original.with_domain((d0, d1)),
        _ => original.clone(),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    Panning { last: Point },
}

/// What a zoom event did, so the caller knows whether to redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// Event did not concern the zoom machine.
    Ignored,
    /// A drag gesture started; an active brush must be cleared.
    GestureStarted,
    /// The transform changed; data marks need recomputing.
    Transformed,
    /// Double-click reset the transform to identity.
    Reset,
}

/// The zoom/pan gesture machine.
#[derive(Clone, Debug)]
pub struct Zoom {
    config: ZoomConfig,
    transform: ZoomTransform,
    phase: Phase,
}

impl Zoom {
    /// New machine at identity.
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            transform: ZoomTransform::IDENTITY,
            phase: Phase::Idle,
        }
    }

    /// The accumulated transform.
    pub fn transform(&self) -> &ZoomTransform {
        &self.transform
    }

    /// Whether the view is currently unzoomed.
    pub fn is_identity(&self) -> bool {
        self.transform.is_identity()
    }

    fn pans_x(&self) -> bool {
        self.config.direction != "y"
    }

    fn pans_y(&self) -> bool {
        self.config.direction != "x"
    }

    /// Feed one pointer event through the machine.
    pub fn on_event(&mut self, event: &PointerEvent) -> ZoomOutcome {
        match *event {
            PointerEvent::Down(p) => {
                self.phase = Phase::Panning { last: p };
                ZoomOutcome::GestureStarted
            }
            PointerEvent::Move(p) => {
                let Phase::Panning { last } = self.phase else {
                    return ZoomOutcome::Ignored;
                };
                if self.pans_x() {
                    self.transform.tx += p.x - last.x;
                }
                if self.pans_y() {
                    self.transform.ty += p.y - last.y;
                }
                self.phase = Phase::Panning { last: p };
                ZoomOutcome::Transformed
            }
            PointerEvent::Up(_) | PointerEvent::Leave => {
                self.phase = Phase::Idle;
                ZoomOutcome::Ignored
            }
            PointerEvent::Wheel { pos, delta } => {
                self.zoom_about(pos, (-delta * WHEEL_FACTOR).exp2());
                ZoomOutcome::Transformed
            }
            PointerEvent::DoubleClick(_) => {
                self.reset();
                ZoomOutcome::Reset
            }
        }
    }

    /// Multiply the zoom factor about a pivot point, clamped to the
    /// configured extent. The pivot stays put on screen.
    pub fn zoom_about(&mut self, pivot: Point, factor: f64) {
        let [min_k, max_k] = self.config.scale_extent;
        let k = (self.transform.k * factor).clamp(min_k, max_k);
        let ratio = k / self.transform.k;
        if self.pans_x() {
            self.transform.tx = pivot.x - (pivot.x - self.transform.tx) * ratio;
        }
        if self.pans_y() {
            self.transform.ty = pivot.y - (pivot.y - self.transform.ty) * ratio;
        }
        self.transform.k = k;
    }

    /// Reset to the identity transform, exactly.
    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
        self.phase = Phase::Idle;
    }

    /// The x scale as seen through the current transform.
    ///
    /// With direction `"y"` the x axis is pinned to its original.
    pub fn rescale_x(&self, original: &Scale) -> Scale {
        if self.pans_x() {
            rescale(original, &self.transform, true)
        } else {
            original.clone()
        }
    }

    /// The y scale as seen through the current transform.
    pub fn rescale_y(&self, original: &Scale) -> Scale {
        if self.pans_y() {
            rescale(original, &self.transform, false)
        } else {
            original.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use ggir_schema::ScaleDesc;
    use kurbo::Point;

    fn linear(d0: f64, d1: f64, r0: f64, r1: f64) -> Scale {
        let desc: ScaleDesc =
            serde_json::from_str(&std::format!(r#"{{"domain": [{d0}, {d1}]}}"#)).unwrap();
        Scale::from_desc(Some(&desc), (r0, r1))
    }

    #[test]
    fn wheel_zoom_keeps_the_pivot_fixed() {
        let mut zoom = Zoom::new(ZoomConfig::default());
        let x = linear(0.0, 100.0, 0.0, 400.0);
        let pivot = Point::new(100.0, 50.0);
        let before = zoom.rescale_x(&x).invert(100.0).unwrap();
        zoom.on_event(&PointerEvent::Wheel {
            pos: pivot,
            delta: -240.0,
        });
        let after = zoom.rescale_x(&x).invert(100.0).unwrap();
        assert!((before - after).abs() < 1e-9);
        assert!(zoom.transform().k > 1.0);
    }

    #[test]
    fn double_click_resets_exactly() {
        let mut zoom = Zoom::new(ZoomConfig::default());
        let x = linear(3.0, 17.0, 0.0, 640.0);
        zoom.on_event(&PointerEvent::Wheel {
            pos: Point::new(200.0, 80.0),
            delta: -500.0,
        });
        zoom.on_event(&PointerEvent::Down(Point::new(10.0, 10.0)));
        zoom.on_event(&PointerEvent::Move(Point::new(60.0, 30.0)));
        assert!(!zoom.is_identity());

        assert_eq!(
            zoom.on_event(&PointerEvent::DoubleClick(Point::new(0.0, 0.0))),
            ZoomOutcome::Reset
        );
        let rescaled = zoom.rescale_x(&x);
        assert_eq!(rescaled.domain_bounds(), x.domain_bounds());
        assert_eq!(rescaled.map_f64(17.0), x.map_f64(17.0));
    }

    #[test]
    fn zoom_factor_clamps_to_the_scale_extent() {
        let mut zoom = Zoom::new(ZoomConfig::default());
        // A huge zoom-out request cannot go below the 1.0 floor.
        zoom.on_event(&PointerEvent::Wheel {
            pos: Point::new(0.0, 0.0),
            delta: 10_000.0,
        });
        assert_eq!(zoom.transform().k, 1.0);
        // And repeated zoom-in saturates at 20x.
        for _ in 0..100 {
            zoom.on_event(&PointerEvent::Wheel {
                pos: Point::new(0.0, 0.0),
                delta: -10_000.0,
            });
        }
        assert_eq!(zoom.transform().k, 20.0);
    }

    #[test]
    fn direction_x_pins_the_y_scale() {
        let config: ZoomConfig = serde_json::from_str(r#"{"direction": "x"}"#).unwrap();
        let mut zoom = Zoom::new(config);
        let y = linear(0.0, 10.0, 300.0, 0.0);
        zoom.on_event(&PointerEvent::Down(Point::new(0.0, 0.0)));
        zoom.on_event(&PointerEvent::Move(Point::new(40.0, 40.0)));
        assert_eq!(zoom.transform().ty, 0.0);
        assert_eq!(zoom.transform().tx, 40.0);
        assert_eq!(zoom.rescale_y(&y).domain_bounds(), y.domain_bounds());
    }

    #[test]
    fn categorical_scales_never_rescale() {
        let mut zoom = Zoom::new(ZoomConfig::default());
        let desc: ScaleDesc = serde_json::from_str(r#"{"domain": ["a", "b", "c"]}"#).unwrap();
        let band = Scale::from_desc(Some(&desc), (0.0, 300.0));
        zoom.on_event(&PointerEvent::Wheel {
            pos: Point::new(150.0, 150.0),
            delta: -300.0,
        });
        let rescaled = zoom.rescale_x(&band);
        assert!(rescaled.is_categorical());
        assert_eq!(rescaled.bandwidth(), band.bandwidth());
    }

    #[test]
    fn pan_shifts_the_visible_domain() {
        let mut zoom = Zoom::new(ZoomConfig::default());
        let x = linear(0.0, 100.0, 0.0, 400.0);
        zoom.on_event(&PointerEvent::Down(Point::new(200.0, 0.0)));
        zoom.on_event(&PointerEvent::Move(Point::new(240.0, 0.0)));
        // Dragging right by 40px shows 10 domain units further left.
        let (d0, d1) = zoom.rescale_x(&x).domain_bounds().unwrap();
        assert!((d0 - -10.0).abs() < 1e-9);
        assert!((d1 - 90.0).abs() < 1e-9);
    }
}
