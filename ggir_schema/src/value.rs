// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loose data values and the coercion rules renderers depend on.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use serde::Deserialize;

/// A single cell of layer data, as loose as the JSON it came from.
///
/// Geometry renderers never consume these raw; they go through the two
/// coercions below. Continuous aesthetics use [`DataValue::as_f64`]
/// (non-finite, empty-string and null all mean "missing"); categorical
/// aesthetics use [`DataValue::as_key`], which takes the first element of a
/// list (R vectors of length one arrive as arrays) and renders numbers
/// without a trailing `.0` so they match band domain entries.
#[derive(Clone, Debug, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// JSON null.
    #[default]
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number.
    Number(f64),
    /// JSON string.
    String(String),
    /// JSON array (e.g. boxplot `outliers`, single-element R vectors).
    List(Vec<DataValue>),
}

impl DataValue {
    /// Whether this value is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric coercion. `""`, null, booleans, unparseable strings and
    /// non-finite numbers are all `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::String(s) if !s.is_empty() => {
                s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
            }
            Self::List(items) => items.first().and_then(Self::as_f64),
            _ => None,
        }
    }

    /// Categorical coercion to a domain key.
    ///
    /// Lists coerce through their first element; numbers format integrally
    /// when whole so `1` and `1.0` name the same band.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Self::String(s) => Some(s.clone()),
            Self::Number(n) => Some(format_key(*n)),
            Self::Bool(b) => Some(if *b {
                String::from("TRUE")
            } else {
                String::from("FALSE")
            }),
            Self::List(items) => items.first().and_then(Self::as_key),
            Self::Null => None,
        }
    }

    /// The list items, when this value is a list.
    pub fn as_list(&self) -> Option<&[DataValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// The raw string, when this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{}", format_key(*n)),
            Self::String(s) => write!(f, "{s}"),
            Self::List(items) => match items.first() {
                Some(first) => write!(f, "{first}"),
                None => Ok(()),
            },
        }
    }
}

impl From<f64> for DataValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        Self::String(String::from(s))
    }
}

fn format_key(n: f64) -> String {
    use alloc::string::ToString;
    if n.fract() == 0.0 && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}
