// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer input model.

use kurbo::Point;

/// One pointer event in panel-local pixel coordinates.
///
/// The host translates whatever input system it sits on (DOM events, a
/// winit loop, test fixtures) into this shape; every interaction machine
/// consumes only these.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Primary button pressed.
    Down(Point),
    /// Pointer moved, with or without a button held.
    Move(Point),
    /// Primary button released.
    Up(Point),
    /// Wheel/scroll; positive `delta` scrolls away from the user.
    Wheel {
        /// Pointer position at the time of the wheel tick.
        pos: Point,
        /// Raw wheel delta in lines or pixels, sign convention as above.
        delta: f64,
    },
    /// Primary button double-clicked. Resets gestures.
    DoubleClick(Point),
    /// Pointer left the widget entirely.
    Leave,
}

impl PointerEvent {
    /// The event's position, if it has one.
    pub fn pos(&self) -> Option<Point> {
        match self {
            Self::Down(p) | Self::Move(p) | Self::Up(p) | Self::DoubleClick(p) => Some(*p),
            Self::Wheel { pos, .. } => Some(*pos),
            Self::Leave => None,
        }
    }
}
