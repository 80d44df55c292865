// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction state machines over a rendered ggir scene.
//!
//! This crate provides:
//! - explicit gesture machines for zoom/pan ([`Zoom`]), rectangular brush
//!   selection ([`Brush`]), and hover highlighting ([`Hover`]),
//! - pure tooltip content/placement helpers, and
//! - a cross-widget linked-selection endpoint ([`Linked`]).
//!
//! Everything consumes [`PointerEvent`]s and mutates only mark opacities
//! (through a [`MarkStateTable`]) or reports through return values; the IR
//! and the layout are never touched, so interactive updates stay cheap.
//! A [`Session`] wires the machines together for one widget and enforces
//! the exclusion rules between them.

#![no_std]

extern crate alloc;

mod brush;
mod event;
mod float;
mod hover;
mod linked;
mod session;
mod state;
mod tooltip;
mod zoom;

pub use brush::{Brush, BrushBounds, BrushOutcome};
pub use event::PointerEvent;
pub use hover::Hover;
pub use linked::Linked;
pub use session::{Session, SessionUpdate, hit_test};
pub use state::{Highlight, MarkStateTable};
pub use tooltip::{TooltipLine, tooltip_anchor, tooltip_lines};
pub use zoom::{Zoom, ZoomOutcome, ZoomTransform, rescale};
