// Copyright 2025 the ggir Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover highlighting.
//!
//! Hovering a mark dims every other interactive mark to the configured
//! opacity. Hover writes through the shared [`MarkStateTable`] and must be
//! suppressed while a brush selection is active, so the two never rewrite
//! the same opacities in conflicting order.

use ggir_core::MarkId;
use ggir_schema::HoverConfig;

use crate::state::MarkStateTable;

/// The hover highlight machine.
#[derive(Clone, Debug)]
pub struct Hover {
    config: HoverConfig,
    hovered: Option<MarkId>,
}

impl Hover {
    /// New machine with nothing hovered.
    pub fn new(config: HoverConfig) -> Self {
        Self {
            config,
            hovered: None,
        }
    }

    /// The configuration this machine was built with.
    pub fn config(&self) -> &HoverConfig {
        &self.config
    }

    /// The currently hovered mark, if any.
    pub fn hovered(&self) -> Option<MarkId> {
        self.hovered
    }

    /// Pointer entered a mark. Returns true if the highlight changed.
    pub fn enter(&mut self, id: MarkId) -> bool {
        if self.hovered == Some(id) {
            return false;
        }
        self.hovered = Some(id);
        true
    }

    /// Pointer left all marks. Returns true if the highlight changed.
    pub fn leave(&mut self) -> bool {
        self.hovered.take().is_some()
    }

    /// Write the current highlight into the state table.
    ///
    /// `suppressed` is set while a brush selection is active; the hover
    /// then leaves the table to the brush entirely.
    pub fn write(&self, table: &mut MarkStateTable, suppressed: bool) {
        if suppressed {
            return;
        }
        match self.hovered {
            Some(id) => table.dim_except(id, self.config.opacity),
            None => table.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use ggir_core::{DatumKey, Mark, RectChannels, Scene};

    fn scene_of(n: u32) -> Scene {
        let mut scene = Scene::new();
        for row in 0..n {
            let datum = DatumKey { layer: 0, row };
            scene.insert(
                Mark::rect(MarkId::for_datum(datum, 0), RectChannels::default()).with_datum(datum),
            );
        }
        scene
    }

    #[test]
    fn hovering_dims_everything_else() {
        let mut scene = scene_of(3);
        let ids = scene.interactive_ids();
        let mut table = MarkStateTable::capture(&scene);
        let mut hover = Hover::new(HoverConfig::default());

        assert!(hover.enter(ids[0]));
        hover.write(&mut table, false);
        table.apply(&mut scene);
        assert_eq!(scene.get(ids[0]).unwrap().opacity, 1.0);
        assert_eq!(scene.get(ids[1]).unwrap().opacity, 0.3);

        assert!(hover.leave());
        hover.write(&mut table, false);
        table.apply(&mut scene);
        assert!(scene.iter().all(|m| m.opacity == 1.0));
    }

    #[test]
    fn suppressed_hover_leaves_the_table_alone() {
        let scene = scene_of(2);
        let ids = scene.interactive_ids();
        let mut table = MarkStateTable::capture(&scene);
        // Pretend a brush dimmed row 0.
        table.dim_where_not(0.2, |d| d.row == 1);

        let mut hover = Hover::new(HoverConfig::default());
        hover.enter(ids[0]);
        hover.write(&mut table, true);
        assert_eq!(table.effective_opacity(ids[0]), Some(0.2));
    }

    #[test]
    fn re_entering_the_same_mark_reports_no_change() {
        let scene = scene_of(1);
        let id = scene.interactive_ids()[0];
        let mut hover = Hover::new(HoverConfig::default());
        assert!(hover.enter(id));
        assert!(!hover.enter(id));
        assert!(hover.leave());
        assert!(!hover.leave());
    }
}
