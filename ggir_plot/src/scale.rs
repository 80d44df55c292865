// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Position scales built from IR scale descriptors.
//!
//! A [`Scale`] is a tagged union over the three families the renderer
//! distinguishes: continuous (with an inverse), temporal (continuous over
//! millisecond timestamps), and categorical (band/point, with a bandwidth and
//! an enumerable domain but no inverse). Call sites match on the tag instead
//! of probing for capabilities, so "can this scale invert" is settled at the
//! type level.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use ggir_schema::{DataValue, ScaleDesc};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::time;

/// A position scale instantiated against a pixel range.
#[derive(Clone, Debug)]
pub enum Scale {
    /// Continuous, invertible mapping.
    Continuous(ContinuousScale),
    /// Continuous mapping over millisecond timestamps.
    Temporal(TemporalScale),
    /// Discrete band or point mapping. No inverse.
    Categorical(CategoricalScale),
}

impl Scale {
    /// Builds a scale from an IR descriptor for the given pixel range.
    ///
    /// Resolution order: the `transform` field (when present and not
    /// `"identity"`), then the `type` field, then a domain-content heuristic
    /// (all-numeric domain is linear, anything else is a band scale with
    /// 0.2 inner / 0.6 outer padding). Unknown kinds fall through to the next
    /// strategy rather than erroring; a missing descriptor yields a linear
    /// `[0, 1]` scale.
    pub fn from_desc(desc: Option<&ScaleDesc>, range: (f64, f64)) -> Self {
        let Some(desc) = desc else {
            return Self::Continuous(ContinuousScale::linear((0.0, 1.0), range));
        };

        if let Some(transform) = &desc.transform {
            let transform = lowercase(transform);
            if transform != "identity" {
                if let Some(scale) = Self::build_kind(&transform, desc, range) {
                    return scale;
                }
            }
        }
        if let Some(kind) = &desc.kind {
            if let Some(scale) = Self::build_kind(&lowercase(kind), desc, range) {
                return scale;
            }
        }

        if desc.domain.is_empty() {
            return Self::Continuous(ContinuousScale::linear((0.0, 1.0), range));
        }
        if let Some(domain) = numeric_domain(desc) {
            return Self::Continuous(ContinuousScale::linear(domain, range));
        }
        // Schema-less fallback: wider outer padding gives edge spacing closer
        // to what upstream layout assumed for untyped categorical domains.
        Self::Categorical(CategoricalScale::band(
            key_domain(desc),
            range,
            0.2,
            0.6,
            0.5,
        ))
    }

    fn build_kind(kind: &str, desc: &ScaleDesc, range: (f64, f64)) -> Option<Self> {
        match kind {
            "continuous" | "linear" | "identity" => Some(Self::Continuous(
                ContinuousScale::linear(numeric_domain_or_unit(desc), range),
            )),
            "log" | "logarithmic" | "log10" | "log2" => {
                let base = desc.base.filter(|b| b.is_finite() && *b > 0.0 && *b != 1.0);
                let base = base.unwrap_or(match kind {
                    "log2" => 2.0,
                    _ => 10.0,
                });
                let positive: Vec<f64> = desc
                    .domain
                    .iter()
                    .filter_map(DataValue::as_f64)
                    .filter(|v| *v > 0.0)
                    .collect();
                let domain = span_of(&positive).unwrap_or((1.0, 10.0));
                Some(Self::Continuous(ContinuousScale::new(
                    ContinuousKind::Log { base },
                    domain,
                    range,
                )))
            }
            "sqrt" | "square-root" => Some(Self::Continuous(ContinuousScale::new(
                ContinuousKind::Pow { exponent: 0.5 },
                numeric_domain_or_unit(desc),
                range,
            ))),
            "pow" | "power" => {
                let exponent = desc.exponent.filter(|e| e.is_finite()).unwrap_or(1.0);
                Some(Self::Continuous(ContinuousScale::new(
                    ContinuousKind::Pow { exponent },
                    numeric_domain_or_unit(desc),
                    range,
                )))
            }
            "symlog" | "sym-log" => {
                let constant = desc
                    .constant
                    .filter(|c| c.is_finite() && *c > 0.0)
                    .unwrap_or(1.0);
                Some(Self::Continuous(ContinuousScale::new(
                    ContinuousKind::Symlog { constant },
                    numeric_domain_or_unit(desc),
                    range,
                )))
            }
            "reverse" => {
                let (d0, d1) = numeric_domain_or_unit(desc);
                Some(Self::Continuous(ContinuousScale::linear((d1, d0), range)))
            }
            "time" | "date" | "datetime" | "utc" | "time-utc" => {
                let stamps: Vec<f64> = desc
                    .domain
                    .iter()
                    .filter_map(time::coerce_timestamp_ms)
                    .collect();
                let domain = span_of(&stamps).unwrap_or((0.0, 1.0));
                Some(Self::Temporal(TemporalScale::new(domain, range)))
            }
            "band" | "categorical" | "ordinal" | "discrete" => {
                let (inner, outer) = band_padding(desc);
                let align = desc.align.filter(|a| a.is_finite()).unwrap_or(0.5);
                Some(Self::Categorical(CategoricalScale::band(
                    key_domain(desc),
                    range,
                    inner,
                    outer,
                    align,
                )))
            }
            "point" => {
                let padding = desc.padding.filter(|p| p.is_finite()).unwrap_or(0.5);
                let align = desc.align.filter(|a| a.is_finite()).unwrap_or(0.5);
                Some(Self::Categorical(CategoricalScale::point(
                    key_domain(desc),
                    range,
                    padding,
                    align,
                )))
            }
            "quantize" | "quantile" | "threshold" => {
                // These need an explicit output range; otherwise resolution
                // falls through to the next strategy.
                let outputs: Vec<f64> = desc
                    .range
                    .as_ref()?
                    .iter()
                    .filter_map(DataValue::as_f64)
                    .collect();
                if outputs.is_empty() {
                    return None;
                }
                let values: Vec<f64> = desc
                    .domain
                    .iter()
                    .filter_map(DataValue::as_f64)
                    .filter(|v| v.is_finite())
                    .collect();
                let stepped = match kind {
                    "quantize" => {
                        let domain = span_of(&values).unwrap_or((0.0, 1.0));
                        SteppedScale::quantize(domain, outputs)
                    }
                    "quantile" => SteppedScale::quantile(values, outputs),
                    _ => SteppedScale::threshold(values, outputs),
                };
                Some(Self::Continuous(ContinuousScale::stepped(stepped, range)))
            }
            _ => None,
        }
    }

    /// Maps a data value to a pixel position.
    ///
    /// Categorical scales return the band start; use [`Self::center`] for the
    /// band midpoint. Returns `None` for values missing from a categorical
    /// domain or not coercible for a continuous one.
    pub fn position(&self, value: &DataValue) -> Option<f64> {
        match self {
            Self::Continuous(s) => Some(s.map(value.as_f64()?)),
            Self::Temporal(s) => Some(s.map(time::coerce_timestamp_ms(value)?)),
            Self::Categorical(s) => s.map(&value.as_key()?),
        }
    }

    /// Maps a data value to its center position.
    ///
    /// Continuous and temporal positions are already centers; categorical
    /// positions shift by half the bandwidth.
    pub fn center(&self, value: &DataValue) -> Option<f64> {
        let p = self.position(value)?;
        match self {
            Self::Categorical(s) => Some(p + s.bandwidth() / 2.0),
            _ => Some(p),
        }
    }

    /// Maps an already-numeric domain value.
    pub fn map_f64(&self, v: f64) -> f64 {
        match self {
            Self::Continuous(s) => s.map(v),
            Self::Temporal(s) => s.map(v),
            Self::Categorical(_) => f64::NAN,
        }
    }

    /// Inverts a pixel position back to a domain value.
    ///
    /// Categorical scales have no inverse and return `None`; brush logic
    /// collects band centers instead.
    pub fn invert(&self, px: f64) -> Option<f64> {
        match self {
            Self::Continuous(s) => Some(s.invert(px)),
            Self::Temporal(s) => Some(s.invert(px)),
            Self::Categorical(_) => None,
        }
    }

    /// Band width, zero for non-categorical and point scales.
    pub fn bandwidth(&self) -> f64 {
        match self {
            Self::Categorical(s) => s.bandwidth(),
            _ => 0.0,
        }
    }

    /// The pixel range the scale was built against.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Continuous(s) => s.range(),
            Self::Temporal(s) => s.range(),
            Self::Categorical(s) => s.range(),
        }
    }

    /// Numeric domain bounds for continuous and temporal scales.
    pub fn domain_bounds(&self) -> Option<(f64, f64)> {
        match self {
            Self::Continuous(s) => Some(s.domain()),
            Self::Temporal(s) => Some(s.domain()),
            Self::Categorical(_) => None,
        }
    }

    /// Tick values in domain space. Empty for categorical scales, whose
    /// "ticks" are the domain categories themselves.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match self {
            Self::Continuous(s) => s.ticks(count),
            Self::Temporal(s) => s.ticks(count),
            Self::Categorical(_) => Vec::new(),
        }
    }

    /// Returns the categorical payload, if any.
    pub fn as_categorical(&self) -> Option<&CategoricalScale> {
        match self {
            Self::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this is a band/point scale.
    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Categorical(_))
    }

    /// Whether this is a temporal scale.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Temporal(_))
    }

    /// Whether a non-identity transform precedes interpolation. Tick labels
    /// for transformed scales use compact significant-digit formatting.
    pub fn is_transformed(&self) -> bool {
        matches!(self, Self::Continuous(s) if s.is_transformed())
    }

    /// Returns a copy with a replaced numeric domain.
    ///
    /// Zoom rescaling takes a copy of the original scale with a narrowed
    /// domain; categorical scales are returned unchanged.
    pub fn with_domain(&self, domain: (f64, f64)) -> Self {
        match self {
            Self::Continuous(s) => Self::Continuous(s.with_domain(domain)),
            Self::Temporal(s) => Self::Temporal(TemporalScale::new(domain, s.range())),
            Self::Categorical(s) => Self::Categorical(s.clone()),
        }
    }
}

fn lowercase(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

fn numeric_domain(desc: &ScaleDesc) -> Option<(f64, f64)> {
    if desc.domain.is_empty() {
        return None;
    }
    let nums: Vec<f64> = desc.domain.iter().filter_map(DataValue::as_f64).collect();
    if nums.len() != desc.domain.len() {
        return None;
    }
    span_of(&nums)
}

fn numeric_domain_or_unit(desc: &ScaleDesc) -> (f64, f64) {
    let finite: Vec<f64> = desc
        .domain
        .iter()
        .filter_map(DataValue::as_f64)
        .filter(|v| v.is_finite())
        .collect();
    span_of(&finite).unwrap_or((0.0, 1.0))
}

/// First and last of a coerced domain, preserving authored direction.
fn span_of(values: &[f64]) -> Option<(f64, f64)> {
    match values {
        [] => None,
        [only] => Some((*only, *only)),
        [first, .., last] => Some((*first, *last)),
    }
}

fn key_domain(desc: &ScaleDesc) -> Vec<String> {
    desc.domain.iter().filter_map(DataValue::as_key).collect()
}

fn band_padding(desc: &ScaleDesc) -> (f64, f64) {
    let inner = desc.padding_inner.filter(|p| p.is_finite());
    let outer = desc.padding_outer.filter(|p| p.is_finite());
    if inner.is_some() || outer.is_some() {
        return (inner.unwrap_or(0.0), outer.unwrap_or(0.0));
    }
    if let Some(p) = desc.padding.filter(|p| p.is_finite()) {
        return (p, p);
    }
    (0.1, 0.1)
}

/// The transform a continuous scale applies before linear interpolation.
#[derive(Clone, Debug)]
pub enum ContinuousKind {
    /// Identity transform.
    Linear,
    /// Logarithm in the given base. Domain must be positive.
    Log {
        /// Log base.
        base: f64,
    },
    /// Sign-preserving power transform (`sqrt` is exponent 0.5).
    Pow {
        /// Exponent.
        exponent: f64,
    },
    /// Symmetric log: linear near zero, logarithmic far from it.
    Symlog {
        /// Linearity constant.
        constant: f64,
    },
    /// Step function over precomputed cut points (quantize/quantile/threshold).
    Stepped(SteppedScale),
}

/// A continuous, invertible scale.
#[derive(Clone, Debug)]
pub struct ContinuousScale {
    kind: ContinuousKind,
    domain: (f64, f64),
    range: (f64, f64),
}

impl ContinuousScale {
    /// Creates a continuous scale with the given transform.
    pub fn new(kind: ContinuousKind, domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            kind,
            domain,
            range,
        }
    }

    /// Creates a linear scale.
    pub fn linear(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self::new(ContinuousKind::Linear, domain, range)
    }

    fn stepped(stepped: SteppedScale, range: (f64, f64)) -> Self {
        let domain = stepped.domain;
        Self::new(ContinuousKind::Stepped(stepped), domain, range)
    }

    /// Whether the transform is anything other than identity.
    pub fn is_transformed(&self) -> bool {
        !matches!(self.kind, ContinuousKind::Linear)
    }

    fn forward(&self, x: f64) -> f64 {
        match &self.kind {
            ContinuousKind::Linear | ContinuousKind::Stepped(_) => x,
            ContinuousKind::Log { base } => log_base(x, *base),
            ContinuousKind::Pow { exponent } => signed_pow(x, *exponent),
            ContinuousKind::Symlog { constant } => {
                x.signum() * (1.0 + (x / constant).abs()).ln()
            }
        }
    }

    fn backward(&self, y: f64) -> f64 {
        match &self.kind {
            ContinuousKind::Linear | ContinuousKind::Stepped(_) => y,
            ContinuousKind::Log { base } => base.powf(y),
            ContinuousKind::Pow { exponent } => {
                if *exponent == 0.0 {
                    y
                } else {
                    signed_pow(y, 1.0 / exponent)
                }
            }
            ContinuousKind::Symlog { constant } => y.signum() * constant * (y.abs().exp() - 1.0),
        }
    }

    /// Maps a domain value to a pixel position.
    pub fn map(&self, x: f64) -> f64 {
        if let ContinuousKind::Stepped(stepped) = &self.kind {
            return stepped.map(x);
        }
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let f0 = self.forward(d0);
        let f1 = self.forward(d1);
        let denom = f1 - f0;
        if denom == 0.0 || !denom.is_finite() {
            return r0;
        }
        let t = (self.forward(x) - f0) / denom;
        r0 + t * (r1 - r0)
    }

    /// Maps a pixel position back to a domain value.
    ///
    /// Stepped scales invert approximately, by linear interpolation over the
    /// domain extent.
    pub fn invert(&self, px: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if let ContinuousKind::Stepped(_) = &self.kind {
            let denom = r1 - r0;
            if denom == 0.0 {
                return d0;
            }
            return d0 + (px - r0) / denom * (d1 - d0);
        }
        let denom = r1 - r0;
        if denom == 0.0 {
            return d0;
        }
        let t = (px - r0) / denom;
        let f0 = self.forward(d0);
        let f1 = self.forward(d1);
        self.backward(f0 + t * (f1 - f0))
    }

    /// Domain bounds as authored.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Pixel range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns a copy with a replaced domain.
    pub fn with_domain(&self, domain: (f64, f64)) -> Self {
        Self {
            kind: self.kind.clone(),
            domain,
            range: self.range,
        }
    }

    /// Tick values in domain space.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        match &self.kind {
            ContinuousKind::Log { base } => log_ticks(self.domain, *base, count),
            ContinuousKind::Stepped(stepped) => stepped.cuts.clone(),
            _ => nice_ticks(self.domain.0, self.domain.1, count),
        }
    }
}

fn log_base(x: f64, base: f64) -> f64 {
    let denom = base.ln();
    if denom == 0.0 { x.ln() } else { x.ln() / denom }
}

fn signed_pow(x: f64, exponent: f64) -> f64 {
    x.signum() * x.abs().powf(exponent)
}

fn log_ticks(domain: (f64, f64), base: f64, count: usize) -> Vec<f64> {
    let (mut min, mut max) = domain;
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    if min <= 0.0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let to_exp = |v: f64, up: bool| {
        let e = log_base(v, base);
        let e = if up { e.ceil() } else { e.floor() };
        let e = e.clamp(f64::from(i32::MIN), f64::from(i32::MAX));
        #[allow(clippy::cast_possible_truncation, reason = "clamped to the i32 range")]
        {
            e as i32
        }
    };
    let mut out = Vec::new();
    for e in to_exp(min, false)..=to_exp(max, true) {
        out.push(base.powi(e));
        if count != 0 && out.len() >= count {
            break;
        }
    }
    out
}

/// A step function over sorted cut points, used by the quantize family.
#[derive(Clone, Debug)]
pub struct SteppedScale {
    domain: (f64, f64),
    cuts: Vec<f64>,
    outputs: Vec<f64>,
}

impl SteppedScale {
    fn quantize(domain: (f64, f64), outputs: Vec<f64>) -> Self {
        let n = outputs.len();
        let (d0, d1) = domain;
        let cuts = (1..n)
            .map(|i| d0 + (d1 - d0) * i as f64 / n as f64)
            .collect();
        Self {
            domain,
            cuts,
            outputs,
        }
    }

    fn quantile(mut values: Vec<f64>, outputs: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let domain = match (values.first(), values.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => (0.0, 1.0),
        };
        let n = outputs.len();
        let cuts = (1..n)
            .map(|i| sample_quantile(&values, i as f64 / n as f64))
            .collect();
        Self {
            domain,
            cuts,
            outputs,
        }
    }

    fn threshold(values: Vec<f64>, outputs: Vec<f64>) -> Self {
        let domain = match (values.first(), values.last()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => (0.0, 1.0),
        };
        Self {
            domain,
            cuts: values,
            outputs,
        }
    }

    fn map(&self, x: f64) -> f64 {
        if self.outputs.is_empty() {
            return f64::NAN;
        }
        let idx = self.cuts.iter().filter(|c| x >= **c).count();
        self.outputs[idx.min(self.outputs.len() - 1)]
    }
}

fn sample_quantile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor();
    #[allow(clippy::cast_possible_truncation, reason = "bounded by slice length")]
    #[allow(clippy::cast_sign_loss, reason = "p is in [0, 1]")]
    let i = lo as usize;
    if i + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[i] + (sorted[i + 1] - sorted[i]) * (h - lo)
}

/// A continuous scale over millisecond-since-epoch timestamps.
#[derive(Clone, Debug)]
pub struct TemporalScale {
    inner: ContinuousScale,
}

impl TemporalScale {
    /// Creates a temporal scale over a millisecond domain.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: ContinuousScale::linear(domain, range),
        }
    }

    /// Maps a timestamp to a pixel position.
    pub fn map(&self, t: f64) -> f64 {
        self.inner.map(t)
    }

    /// Maps a pixel position back to a timestamp.
    pub fn invert(&self, px: f64) -> f64 {
        self.inner.invert(px)
    }

    /// Domain bounds.
    pub fn domain(&self) -> (f64, f64) {
        self.inner.domain()
    }

    /// Pixel range.
    pub fn range(&self) -> (f64, f64) {
        self.inner.range()
    }

    /// Calendar-aware tick timestamps.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.inner.domain();
        time::nice_time_ticks_ms(d0, d1, count)
    }
}

/// A discrete band or point scale.
///
/// Positions are precomputed at construction; reversed pixel ranges yield
/// reversed position order, matching the usual inverted y-range convention.
#[derive(Clone, Debug)]
pub struct CategoricalScale {
    domain: Vec<String>,
    positions: Vec<f64>,
    range: (f64, f64),
    bandwidth: f64,
    step: f64,
    point: bool,
}

impl CategoricalScale {
    /// Creates a band scale.
    pub fn band(
        domain: Vec<String>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
        align: f64,
    ) -> Self {
        Self::build(domain, range, padding_inner, padding_outer, align, false)
    }

    /// Creates a point scale (a band scale with zero-width bands).
    pub fn point(domain: Vec<String>, range: (f64, f64), padding: f64, align: f64) -> Self {
        Self::build(domain, range, 1.0, padding, align, true)
    }

    fn build(
        domain: Vec<String>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
        align: f64,
        point: bool,
    ) -> Self {
        let n = domain.len() as f64;
        let (r0, r1) = range;
        let reverse = r1 < r0;
        let (lo, hi) = if reverse { (r1, r0) } else { (r0, r1) };
        let denom = (n - padding_inner + padding_outer * 2.0).max(1.0);
        let step = (hi - lo) / denom;
        let start = lo + (hi - lo - step * (n - padding_inner)) * align;
        let mut positions: Vec<f64> = (0..domain.len())
            .map(|i| start + step * i as f64)
            .collect();
        if reverse {
            positions.reverse();
        }
        let bandwidth = if point { 0.0 } else { step * (1.0 - padding_inner) };
        Self {
            domain,
            positions,
            range,
            bandwidth,
            step,
            point,
        }
    }

    /// Band start position for a category, `None` if not in the domain.
    pub fn map(&self, key: &str) -> Option<f64> {
        let idx = self.domain.iter().position(|d| d == key)?;
        Some(self.positions[idx])
    }

    /// Band width (zero for point scales).
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Distance between adjacent band starts.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Pixel range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// The category domain, in authored order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    /// Whether this is a point scale.
    pub fn is_point(&self) -> bool {
        self.point
    }

    /// Iterates `(category, band center)` pairs in domain order.
    pub fn centers(&self) -> impl Iterator<Item = (&str, f64)> {
        self.domain
            .iter()
            .zip(&self.positions)
            .map(|(k, p)| (k.as_str(), p + self.bandwidth / 2.0))
    }
}

pub(crate) fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let span = max - min;
    let step0 = span / count.max(1) as f64;
    let step = nice_step(step0);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

    let start = (min / step).ceil() * step;
    let stop = (max / step).floor() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        #[allow(clippy::cast_sign_loss, reason = "guarded non-negative")]
        {
            n_f as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

pub(crate) fn tick_step(min: f64, max: f64, count: usize) -> f64 {
    let span = (max - min).abs();
    nice_step(span / count.max(1) as f64)
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use super::*;

    fn desc(json: &str) -> ScaleDesc {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn continuous_round_trip() {
        let s = ContinuousScale::linear((2.0, 8.0), (0.0, 300.0));
        assert!((s.map(2.0) - 0.0).abs() < 1e-9);
        assert!((s.map(8.0) - 300.0).abs() < 1e-9);
        for x in [2.0, 3.5, 5.0, 7.9] {
            assert!((s.invert(s.map(x)) - x).abs() < 1e-9);
        }
    }

    #[test]
    fn log_round_trip() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"transform":"log10","domain":[1,1000]}"#)),
            (0.0, 300.0),
        );
        assert!((scale.map_f64(1.0) - 0.0).abs() < 1e-9);
        assert!((scale.map_f64(1000.0) - 300.0).abs() < 1e-9);
        assert!((scale.map_f64(10.0) - 100.0).abs() < 1e-9);
        assert!((scale.invert(100.0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn log_excludes_nonpositive_domain() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"log","domain":[-5,0]}"#)),
            (0.0, 100.0),
        );
        assert_eq!(scale.domain_bounds(), Some((1.0, 10.0)));
    }

    #[test]
    fn symlog_round_trip_through_zero() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"symlog","domain":[-100,100]}"#)),
            (0.0, 200.0),
        );
        assert!((scale.map_f64(-100.0) - 0.0).abs() < 1e-9);
        assert!((scale.map_f64(100.0) - 200.0).abs() < 1e-9);
        assert!((scale.map_f64(0.0) - 100.0).abs() < 1e-9);
        assert!((scale.invert(scale.map_f64(7.0)).unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn transform_takes_priority_over_type() {
        let scale = Scale::from_desc(
            Some(&desc(
                r#"{"type":"continuous","transform":"sqrt","domain":[0,100]}"#,
            )),
            (0.0, 100.0),
        );
        assert!((scale.map_f64(25.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn identity_transform_defers_to_type() {
        let scale = Scale::from_desc(
            Some(&desc(
                r#"{"type":"band","transform":"identity","domain":["a","b"]}"#,
            )),
            (0.0, 100.0),
        );
        assert!(scale.is_categorical());
    }

    #[test]
    fn band_default_padding_literal() {
        // Schema path: default padding 0.1/0.1.
        // step = 300 / (3 - 0.1 + 0.2) = 96.7741..; bandwidth = step * 0.9.
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"band","domain":["a","b","c"]}"#)),
            (0.0, 300.0),
        );
        let band = scale.as_categorical().unwrap();
        assert!((band.step() - 300.0 / 3.1).abs() < 1e-9);
        assert!((band.bandwidth() - 300.0 / 3.1 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn heuristic_band_padding_literal() {
        // Schema-less path: 0.2 inner / 0.6 outer.
        // step = 300 / (3 - 0.2 + 1.2) = 75; bandwidth = 60.
        let scale = Scale::from_desc(
            Some(&desc(r#"{"domain":["a","b","c"]}"#)),
            (0.0, 300.0),
        );
        let band = scale.as_categorical().unwrap();
        assert!((band.step() - 75.0).abs() < 1e-9);
        assert!((band.bandwidth() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn band_coverage_stays_in_range() {
        let band = CategoricalScale::band(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            (0.0, 300.0),
            0.1,
            0.1,
            0.5,
        );
        for key in ["a", "b", "c"] {
            let x = band.map(key).unwrap();
            assert!(x >= 0.0);
            assert!(x + band.bandwidth() <= 300.0 + 1e-9);
        }
        // n bands plus (n-1) inner gaps plus two outer margins fill the range.
        let inner_gap = band.step() - band.bandwidth();
        let outer = band.map("a").unwrap();
        let covered = 3.0 * band.bandwidth() + 2.0 * inner_gap + 2.0 * outer;
        assert!((covered - 300.0).abs() < 1e-9);
    }

    #[test]
    fn reversed_range_reverses_band_order() {
        let band = CategoricalScale::band(
            vec!["a".to_string(), "b".to_string()],
            (200.0, 0.0),
            0.1,
            0.1,
            0.5,
        );
        assert!(band.map("a").unwrap() > band.map("b").unwrap());
    }

    #[test]
    fn point_scale_has_zero_bandwidth() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"point","domain":["a","b","c"]}"#)),
            (0.0, 100.0),
        );
        assert_eq!(scale.bandwidth(), 0.0);
        assert!(scale.invert(50.0).is_none());
    }

    #[test]
    fn missing_descriptor_is_unit_linear() {
        let scale = Scale::from_desc(None, (0.0, 640.0));
        assert!((scale.map_f64(0.5) - 320.0).abs() < 1e-9);
    }

    #[test]
    fn empty_domain_falls_back_to_unit() {
        let scale = Scale::from_desc(Some(&desc(r#"{"domain":[]}"#)), (0.0, 10.0));
        assert_eq!(scale.domain_bounds(), Some((0.0, 1.0)));
    }

    #[test]
    fn quantize_without_range_falls_through() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"quantize","domain":[0,10]}"#)),
            (0.0, 100.0),
        );
        // Falls to the numeric heuristic: plain linear.
        assert!((scale.map_f64(5.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_maps_by_cut() {
        let scale = Scale::from_desc(
            Some(&desc(
                r#"{"type":"threshold","domain":[10,20],"range":[0,50,100]}"#,
            )),
            (0.0, 100.0),
        );
        assert_eq!(scale.map_f64(5.0), 0.0);
        assert_eq!(scale.map_f64(15.0), 50.0);
        assert_eq!(scale.map_f64(25.0), 100.0);
    }

    #[test]
    fn temporal_maps_and_inverts() {
        let scale = Scale::from_desc(
            Some(&desc(
                r#"{"type":"time","domain":[1700000000000,1700000100000]}"#,
            )),
            (0.0, 100.0),
        );
        assert!(scale.is_temporal());
        assert!((scale.map_f64(1_700_000_050_000.0) - 50.0).abs() < 1e-9);
        assert!((scale.invert(50.0).unwrap() - 1_700_000_050_000.0).abs() < 1e-3);
    }

    #[test]
    fn with_domain_preserves_kind_and_range() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"linear","domain":[0,10]}"#)),
            (0.0, 100.0),
        );
        let zoomed = scale.with_domain((2.0, 4.0));
        assert!((zoomed.map_f64(2.0) - 0.0).abs() < 1e-9);
        assert!((zoomed.map_f64(4.0) - 100.0).abs() < 1e-9);
        assert_eq!(zoomed.range(), (0.0, 100.0));
    }

    #[test]
    fn position_and_center_for_band() {
        let scale = Scale::from_desc(
            Some(&desc(r#"{"type":"band","domain":["a","b"]}"#)),
            (0.0, 100.0),
        );
        let v = DataValue::from("a");
        let start = scale.position(&v).unwrap();
        let center = scale.center(&v).unwrap();
        assert!((center - start - scale.bandwidth() / 2.0).abs() < 1e-9);
        assert!(scale.position(&DataValue::from("zzz")).is_none());
    }
}
