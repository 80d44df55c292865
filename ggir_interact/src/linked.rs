// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-widget linked selection.
//!
//! A widget joins a named group with one external identity key per data
//! row. Selection sets of keys travel over a host-owned bus; applying a
//! set dims every mark whose row key is absent. Applying is idempotent so
//! repeated broadcasts of the same set are safe, and a `None` set restores
//! every mark.

use alloc::string::String;
use alloc::vec::Vec;

use ggir_schema::LinkedConfig;
use hashbrown::HashSet;

use crate::state::MarkStateTable;

/// Linked-selection endpoint for one widget.
#[derive(Clone, Debug, Default)]
pub struct Linked {
    keys: Vec<String>,
    group: Option<String>,
    selection: Option<HashSet<String>>,
}

impl Linked {
    /// New endpoint from the host configuration.
    pub fn new(config: LinkedConfig) -> Self {
        Self {
            keys: config.key,
            group: config.group,
            selection: None,
        }
    }

    /// The group this endpoint listens on.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The identity key of a data row.
    pub fn key_for_row(&self, row: usize) -> Option<&str> {
        self.keys.get(row).map(String::as_str)
    }

    /// Whether a selection is currently applied.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Apply an incoming selection set, or `None` to clear.
    ///
    /// Returns true if the stored selection changed.
    pub fn apply(&mut self, selection: Option<&[String]>) -> bool {
        let next = selection.map(|keys| keys.iter().cloned().collect::<HashSet<_>>());
        if next == self.selection {
            return false;
        }
        self.selection = next;
        true
    }

    /// Whether a row is inside the current selection.
    ///
    /// With no selection applied every row counts as selected. Rows with
    /// no key never match a selection.
    pub fn row_selected(&self, row: usize) -> bool {
        match &self.selection {
            None => true,
            Some(set) => self
                .key_for_row(row)
                .is_some_and(|key| set.contains(key)),
        }
    }

    /// Write the current selection into the state table.
    pub fn write(&self, table: &mut MarkStateTable, opacity: f64) {
        match &self.selection {
            None => table.reset(),
            Some(_) => {
                table.dim_where_not(opacity, |datum| self.row_selected(datum.row as usize));
            }
        }
    }

    /// Translate selected row indices into keys for broadcasting.
    ///
    /// Rows without a key are dropped; duplicates collapse.
    pub fn broadcast(&self, rows: &[usize]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &row in rows {
            if let Some(key) = self.key_for_row(row) {
                if seen.insert(key) {
                    out.push(String::from(key));
                }
            }
        }
        out
    }
}
