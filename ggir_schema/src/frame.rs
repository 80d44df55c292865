// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer data normalization.
//!
//! Layer `data` arrives in one of two JSON shapes: an array of row objects
//! (`[{x: 1, y: 2}, ...]`) or a column-oriented object (`{x: [1, ...],
//! y: [2, ...]}`). Both normalize to a [`Frame`] of rows before rendering;
//! every geometry renderer consumes rows only.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use serde::Deserialize;

use crate::value::DataValue;

/// One normalized data row: column name to loose value.
pub type Row = BTreeMap<String, DataValue>;

/// Normalized, row-oriented layer data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    rows: Vec<Row>,
}

impl Frame {
    /// Build a frame from rows directly.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows, in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A cell by row index and column name. Missing cells read as null.
    pub fn get<'a>(&'a self, row: usize, col: &str) -> Option<&'a DataValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

impl<'de> Deserialize<'de> for Frame {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Rows(Vec<Row>),
            Columns(BTreeMap<String, Vec<DataValue>>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Rows(rows) => Self { rows },
            Raw::Columns(cols) => {
                // Ragged columns pad with null rather than truncating.
                let n = cols.values().map(Vec::len).max().unwrap_or(0);
                let mut rows = Vec::with_capacity(n);
                for i in 0..n {
                    let mut row = Row::new();
                    for (name, values) in &cols {
                        row.insert(
                            name.clone(),
                            values.get(i).cloned().unwrap_or(DataValue::Null),
                        );
                    }
                    rows.push(row);
                }
                Self { rows }
            }
        })
    }
}
