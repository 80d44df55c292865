// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting for tick labels and value readouts.

extern crate alloc;

use alloc::format;
use alloc::string::String;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Formats a float using the shortest representation that round-trips.
///
/// Whole numbers render without a decimal point (`4`, not `4.0`).
pub fn fmt_f64(v: f64) -> String {
    format!("{v}")
}

/// Formats a tick value with a decimal count derived from the tick step.
///
/// A step of `0.25` yields two decimals, a step of `10` yields none. All ticks
/// on an axis share the same step, so labels line up with consistent
/// precision.
pub fn format_tick_with_step(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return fmt_f64(v);
    }
    let decimals = if step.is_finite() && step > 0.0 {
        let d = -step.log10().floor();
        if d > 0.0 {
            #[allow(clippy::cast_possible_truncation, reason = "capped at 10 decimals")]
            {
                d.min(10.0) as usize
            }
        } else {
            0
        }
    } else {
        0
    };
    format!("{v:.decimals$}")
}

/// Rounds to `digits` significant digits and drops trailing zeros.
///
/// Used for tooltip readouts where `1234.567` should display as `1235` and
/// `0.123456` as `0.1235`.
pub fn format_sig(v: f64, digits: u32) -> String {
    if v == 0.0 || !v.is_finite() || digits == 0 {
        return fmt_f64(v);
    }
    let magnitude = v.abs().log10().floor();
    let shift = f64::from(digits) - 1.0 - magnitude;
    let factor = 10_f64.powf(shift);
    if !factor.is_finite() || factor == 0.0 {
        return fmt_f64(v);
    }
    fmt_f64((v * factor).round() / factor)
}
