// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host-facing chart widget: IR payloads in, SVG documents and interactive
//! sessions out.
//!
//! [`Widget`] owns one chart lifecycle. Feed it render payloads with
//! [`Widget::render_value`], pointer events with [`Widget::pointer`], and
//! read back the current document with [`Widget::svg`]. [`SvgScene`] is the
//! standalone scene-to-SVG writer for hosts that drive the pipeline
//! themselves.

mod svg;
mod widget;

pub use svg::SvgScene;
pub use widget::{Behaviors, Widget};
