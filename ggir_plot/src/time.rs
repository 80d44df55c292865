// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time tick generation and calendar formatting over millisecond timestamps.
//!
//! Temporal domains arrive as milliseconds since the Unix epoch (numbers) or
//! ISO-8601 date strings. Everything here is UTC; no timezone database is
//! consulted. Month and year tick steps are approximated with fixed 30/365
//! day durations, which keeps tick spacing even at the cost of not snapping
//! to calendar month boundaries.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use ggir_schema::DataValue;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::scale::nice_ticks;

const MS_SECOND: f64 = 1_000.0;
const MS_MINUTE: f64 = 60.0 * MS_SECOND;
const MS_HOUR: f64 = 60.0 * MS_MINUTE;
const MS_DAY: f64 = 24.0 * MS_HOUR;
const MS_WEEK: f64 = 7.0 * MS_DAY;
const MS_MONTH: f64 = 30.0 * MS_DAY;
const MS_YEAR: f64 = 365.0 * MS_DAY;

/// Coerces a data value to a millisecond timestamp.
///
/// Numbers pass through as milliseconds; strings are parsed as ISO-8601
/// dates (`YYYY-MM-DD`, optionally followed by `THH:MM:SS` or ` HH:MM:SS`).
pub fn coerce_timestamp_ms(value: &DataValue) -> Option<f64> {
    match value {
        DataValue::Number(n) if n.is_finite() => Some(*n),
        DataValue::String(s) => parse_iso_ms(s),
        DataValue::List(items) => items.first().and_then(coerce_timestamp_ms),
        _ => None,
    }
}

/// Parses an ISO-8601 date or datetime string to milliseconds since epoch.
pub fn parse_iso_ms(s: &str) -> Option<f64> {
    let s = s.trim();
    let (date, rest) = match s.find(['T', ' ']) {
        Some(i) => (&s[..i], Some(&s[i + 1..])),
        None => (s, None),
    };
    let mut parts = date.split('-');
    let year: i64 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    let mut ms = days_from_civil(year, month, day) as f64 * MS_DAY;
    if let Some(rest) = rest {
        let rest = rest.trim_end_matches('Z');
        let mut time = rest.split(':');
        let hour: f64 = time.next()?.parse().ok()?;
        let minute: f64 = time.next().unwrap_or("0").parse().ok()?;
        let second: f64 = time.next().unwrap_or("0").parse().ok()?;
        ms += hour * MS_HOUR + minute * MS_MINUTE + second * MS_SECOND;
    }
    Some(ms)
}

/// Days since the Unix epoch for a civil date (proleptic Gregorian, UTC).
fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let y = year - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (m + if m > 2 { -3 } else { 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Civil date for a day count since the Unix epoch.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    #[allow(clippy::cast_possible_truncation, reason = "month/day are small")]
    #[allow(clippy::cast_sign_loss, reason = "month/day are positive")]
    {
        (y + i64::from(month <= 2), month as u32, day as u32)
    }
}

/// Nice tick step ladder for time axes, in milliseconds.
const TIME_STEPS: &[f64] = &[
    MS_SECOND,
    5.0 * MS_SECOND,
    15.0 * MS_SECOND,
    30.0 * MS_SECOND,
    MS_MINUTE,
    5.0 * MS_MINUTE,
    15.0 * MS_MINUTE,
    30.0 * MS_MINUTE,
    MS_HOUR,
    3.0 * MS_HOUR,
    6.0 * MS_HOUR,
    12.0 * MS_HOUR,
    MS_DAY,
    2.0 * MS_DAY,
    MS_WEEK,
    MS_MONTH,
    3.0 * MS_MONTH,
    MS_YEAR,
];

/// Picks the tick step for a millisecond span.
pub fn time_tick_step_ms(min: f64, max: f64, count: usize) -> f64 {
    let span = (max - min).abs();
    let target = span / count.max(1) as f64;
    for step in TIME_STEPS {
        if *step >= target {
            return *step;
        }
    }
    // Beyond a year per tick: whole multiples of years.
    (target / MS_YEAR).ceil() * MS_YEAR
}

/// Generates tick timestamps for a millisecond domain.
///
/// Sub-second spans fall back to plain numeric ticks.
pub fn nice_time_ticks_ms(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    if max - min < MS_SECOND {
        return nice_ticks(min, max, count);
    }
    let step = time_tick_step_ms(min, max, count);
    if step <= 0.0 {
        return Vec::new();
    }
    let mut t = (min / step).ceil() * step;
    let mut out = Vec::new();
    while t <= max + 1e-6 {
        out.push(t);
        t += step;
        if out.len() > 10_000 {
            break;
        }
    }
    out
}

/// Formats a tick timestamp for an axis label, at a granularity chosen from
/// the tick step.
pub fn format_time_ms(t: f64, step: f64) -> String {
    if step >= MS_DAY {
        return format_date_ms(t);
    }
    let (_, _, _, hour, minute, second) = decompose_ms(t);
    if step >= MS_MINUTE {
        format!("{hour:02}:{minute:02}")
    } else {
        format!("{hour:02}:{minute:02}:{second:02}")
    }
}

/// Formats a timestamp as `YYYY-MM-DD`, appending ` HH:MM:SS` when the value
/// is not at midnight. Used for tooltip readouts of temporal fields.
pub fn format_datetime_ms(t: f64) -> String {
    let (year, month, day, hour, minute, second) = decompose_ms(t);
    if hour == 0 && minute == 0 && second == 0 {
        format!("{year:04}-{month:02}-{day:02}")
    } else {
        format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
    }
}

/// Formats a timestamp as `YYYY-MM-DD`.
pub fn format_date_ms(t: f64) -> String {
    let (year, month, day, ..) = decompose_ms(t);
    format!("{year:04}-{month:02}-{day:02}")
}

fn decompose_ms(t: f64) -> (i64, u32, u32, u32, u32, u32) {
    let total_seconds = (t / MS_SECOND).floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "timestamps in chart domains fit i64 seconds"
    )]
    let secs = total_seconds as i64;
    let days = secs.div_euclid(86_400);
    let tod = secs.rem_euclid(86_400);
    let (year, month, day) = civil_from_days(days);
    #[allow(clippy::cast_possible_truncation, reason = "time of day is bounded")]
    #[allow(clippy::cast_sign_loss, reason = "rem_euclid is non-negative")]
    {
        let hour = (tod / 3600) as u32;
        let minute = ((tod % 3600) / 60) as u32;
        let second = (tod % 60) as u32;
        (year, month, day, hour, minute, second)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn iso_date_round_trips() {
        let ms = parse_iso_ms("2024-03-01").unwrap();
        assert_eq!(format_date_ms(ms), "2024-03-01");
        let ms = parse_iso_ms("2024-02-29T12:30:05").unwrap();
        assert_eq!(format_datetime_ms(ms), "2024-02-29 12:30:05");
    }

    #[test]
    fn epoch_is_day_zero() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(parse_iso_ms("1970-01-01"), Some(0.0));
    }

    #[test]
    fn coercion_accepts_numbers_and_strings() {
        assert_eq!(
            coerce_timestamp_ms(&DataValue::Number(1_700_000_000_000.0)),
            Some(1_700_000_000_000.0)
        );
        assert!(coerce_timestamp_ms(&DataValue::from("2023-11-14")).is_some());
        assert!(coerce_timestamp_ms(&DataValue::from("not a date")).is_none());
    }

    #[test]
    fn day_span_ticks_land_on_midnights() {
        let start = parse_iso_ms("2024-01-01").unwrap();
        let end = parse_iso_ms("2024-01-08").unwrap();
        let ticks = nice_time_ticks_ms(start, end, 7);
        assert!(!ticks.is_empty());
        for t in &ticks {
            assert_eq!(t % MS_DAY, 0.0);
        }
    }

    #[test]
    fn minute_granularity_labels() {
        let t = parse_iso_ms("2024-01-01T09:05:00").unwrap();
        assert_eq!(format_time_ms(t, MS_MINUTE), "09:05");
        assert_eq!(format_time_ms(t, MS_SECOND), "09:05:00");
        assert_eq!(format_time_ms(t, MS_DAY), "2024-01-01");
    }

    #[test]
    fn midnight_datetime_omits_time() {
        let t = parse_iso_ms("2024-06-15").unwrap();
        assert_eq!(format_datetime_ms(t), "2024-06-15");
    }
}
