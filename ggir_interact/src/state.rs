// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-mark interaction state.
//!
//! Every behavior that dims or restores marks goes through a
//! [`MarkStateTable`] rather than reading opacities back out of the scene.
//! The table snapshots each interactive mark's base opacity once, right
//! after a render, so repeated highlight/unhighlight cycles always restore
//! the exact rendered value instead of compounding.

use alloc::vec::Vec;

use ggir_core::{DatumKey, MarkId, Scene};
use hashbrown::HashMap;

/// Highlight state of one mark.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Highlight {
    /// Base rendered opacity.
    #[default]
    Base,
    /// Dimmed to the given absolute opacity.
    Dimmed(f64),
    /// Forced fully opaque (the hovered/selected mark).
    Full,
}

#[derive(Clone, Copy, Debug)]
struct MarkState {
    base_opacity: f64,
    datum: DatumKey,
    highlight: Highlight,
}

/// Side table mapping interactive mark ids to base opacity and highlight
/// state.
#[derive(Clone, Debug, Default)]
pub struct MarkStateTable {
    states: HashMap<MarkId, MarkState>,
}

impl MarkStateTable {
    /// Snapshot every datum-carrying mark of a freshly rendered scene.
    pub fn capture(scene: &Scene) -> Self {
        let mut states = HashMap::new();
        for mark in scene.iter() {
            if let Some(datum) = mark.datum {
                states.insert(
                    mark.id,
                    MarkState {
                        base_opacity: mark.opacity,
                        datum,
                        highlight: Highlight::Base,
                    },
                );
            }
        }
        Self { states }
    }

    /// Number of tracked marks.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the table tracks no marks.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The data row a tracked mark came from.
    pub fn datum(&self, id: MarkId) -> Option<DatumKey> {
        self.states.get(&id).map(|s| s.datum)
    }

    /// Clear every highlight back to base.
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.highlight = Highlight::Base;
        }
    }

    /// Dim every tracked mark except one, which goes fully opaque.
    pub fn dim_except(&mut self, keep: MarkId, opacity: f64) {
        for (id, state) in &mut self.states {
            state.highlight = if *id == keep {
                Highlight::Full
            } else {
                Highlight::Dimmed(opacity)
            };
        }
    }

    /// Dim every tracked mark whose datum fails a predicate; passing marks
    /// return to base. Idempotent for a fixed predicate.
    pub fn dim_where_not(&mut self, opacity: f64, keep: impl Fn(DatumKey) -> bool) {
        for state in self.states.values_mut() {
            state.highlight = if keep(state.datum) {
                Highlight::Base
            } else {
                Highlight::Dimmed(opacity)
            };
        }
    }

    /// The effective opacity a mark should render with right now.
    pub fn effective_opacity(&self, id: MarkId) -> Option<f64> {
        self.states.get(&id).map(|s| match s.highlight {
            Highlight::Base => s.base_opacity,
            Highlight::Dimmed(o) => o,
            Highlight::Full => 1.0,
        })
    }

    /// Write every tracked mark's effective opacity into the scene.
    pub fn apply(&self, scene: &mut Scene) {
        for (&id, state) in &self.states {
            let opacity = match state.highlight {
                Highlight::Base => state.base_opacity,
                Highlight::Dimmed(o) => o,
                Highlight::Full => 1.0,
            };
            scene.set_opacity(id, opacity);
        }
    }

    /// Ids of all tracked marks, in arbitrary order.
    pub fn ids(&self) -> Vec<MarkId> {
        self.states.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use ggir_core::{Mark, RectChannels};
    use kurbo::Rect;

    fn scene_with_rows(opacities: &[f64]) -> Scene {
        let mut scene = Scene::new();
        for (row, &opacity) in opacities.iter().enumerate() {
            let datum = DatumKey {
                layer: 0,
                row: row as u32,
            };
            let channels = RectChannels {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                ..Default::default()
            };
            scene.insert(
                Mark::rect(MarkId::for_datum(datum, 0), channels)
                    .with_datum(datum)
                    .with_opacity(opacity),
            );
        }
        scene
    }

    #[test]
    fn highlight_cycles_restore_the_rendered_opacity() {
        let mut scene = scene_with_rows(&[0.7, 1.0]);
        let ids = scene.interactive_ids();
        let mut table = MarkStateTable::capture(&scene);

        table.dim_except(ids[1], 0.3);
        table.apply(&mut scene);
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 0.3);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 1.0);

        // A second dim cycle must not stack on the already dimmed value.
        table.dim_except(ids[1], 0.3);
        table.reset();
        table.apply(&mut scene);
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 0.7);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 1.0);
    }

    #[test]
    fn predicate_dimming_is_idempotent() {
        let scene = scene_with_rows(&[1.0, 1.0, 1.0]);
        let mut table = MarkStateTable::capture(&scene);
        for _ in 0..3 {
            table.dim_where_not(0.2, |d| d.row == 1);
        }
        let full: Vec<MarkId> = table
            .ids()
            .into_iter()
            .filter(|&id| table.effective_opacity(id) == Some(1.0))
            .collect();
        assert_eq!(full.len(), 1);
        assert_eq!(table.datum(full[0]).unwrap().row, 1);
    }

    #[test]
    fn decoration_marks_are_not_tracked() {
        let mut scene = scene_with_rows(&[1.0]);
        scene.insert(Mark::rect(MarkId(999), RectChannels::default()).with_z(-100));
        let table = MarkStateTable::capture(&scene);
        assert_eq!(table.len(), 1);
        assert_eq!(table.effective_opacity(MarkId(999)), None);
    }
}
