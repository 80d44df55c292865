// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! Rust's float math methods are not available in `core`; this dispatches
//! to `libm` when `std` is off.

/// Float math helpers for `f64` in `no_std` mode.
pub(crate) trait FloatExt {
    fn exp2(self) -> Self;
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn exp2(self) -> Self {
        libm::exp2(self)
    }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("ggir_interact requires either the `std` or `libm` feature");
