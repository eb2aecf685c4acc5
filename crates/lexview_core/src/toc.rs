//! Navigation index (table of contents) synchronization.
//!
//! # Responsibility
//! - Mirror every box as one index entry with a copied provenance set.
//! - Recompute entry visibility with the same predicate as the filter.
//! - Track which entry is currently in view while the reader scrolls.
//!
//! # Invariants
//! - Entry order is document order and never changes after build.
//! - Visibility is computed from the copied provenance sets, never by
//!   re-querying the live box tree.

use crate::host::HostLayout;
use crate::model::tag::ProvenanceSet;
use crate::render::{BoxArena, BoxId};

/// Viewport offset below which a header counts as "reached" while scrolling.
const ACTIVATION_OFFSET: f64 = 8.0;

/// One navigation entry mirroring a box.
#[derive(Debug, Clone)]
pub struct TocEntry {
    pub anchor: String,
    pub title: String,
    pub box_id: BoxId,
    pub is_container: bool,
    /// Copy of the mirrored unit's provenance; empty for containers.
    pub provenance: ProvenanceSet,
    pub visible: bool,
    /// Index of the parent entry, for bottom-up container visibility.
    parent: Option<usize>,
}

/// Secondary anchor list kept in sync with the box tree.
#[derive(Debug, Clone)]
pub struct TocIndex {
    entries: Vec<TocEntry>,
    current: Option<usize>,
}

impl TocIndex {
    /// Builds the index from the arena, one entry per box in document order.
    pub fn build(arena: &BoxArena) -> Self {
        let mut entries = Vec::with_capacity(arena.len());
        for node in arena.iter() {
            let parent = node
                .parent
                .and_then(|pid| entries.iter().position(|e: &TocEntry| e.box_id == pid));
            entries.push(TocEntry {
                anchor: node.anchor.clone(),
                title: node.heading.clone(),
                box_id: node.id,
                is_container: node.kind.is_container(),
                provenance: node.provenance.clone(),
                visible: true,
                parent,
            });
        }
        Self {
            entries,
            current: None,
        }
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Recomputes visibility from the copied provenance sets.
    ///
    /// `predicate` must be the identical unit-visibility predicate the
    /// filter engine applied to the box tree. Containers become visible
    /// when any unit entry below them is.
    pub fn sync_visibility(&mut self, predicate: impl Fn(&ProvenanceSet) -> bool) {
        for entry in &mut self.entries {
            if !entry.is_container {
                entry.visible = predicate(&entry.provenance);
            }
        }
        // Containers, bottom-up: a unit's visibility bubbles through its
        // whole ancestor chain.
        for entry in &mut self.entries {
            if entry.is_container {
                entry.visible = false;
            }
        }
        for index in 0..self.entries.len() {
            if self.entries[index].is_container || !self.entries[index].visible {
                continue;
            }
            let mut parent = self.entries[index].parent;
            while let Some(pi) = parent {
                self.entries[pi].visible = true;
                parent = self.entries[pi].parent;
            }
        }
    }

    /// Recomputes which entry is currently in view.
    ///
    /// The current entry is the last visible one in document order whose box
    /// top sits at or above `scroll + ACTIVATION_OFFSET`. Returns its anchor.
    pub fn update_current<H: HostLayout + ?Sized>(&mut self, host: &H) -> Option<&str> {
        let threshold = host.scroll_offset() + ACTIVATION_OFFSET;
        let mut current = None;
        for (index, entry) in self.entries.iter().enumerate() {
            if !entry.visible {
                continue;
            }
            match host.box_top(entry.box_id) {
                Some(top) if top <= threshold => current = Some(index),
                _ => {}
            }
        }
        self.current = current;
        self.current_anchor()
    }

    /// Anchor of the entry last marked current, if any.
    pub fn current_anchor(&self) -> Option<&str> {
        self.current.map(|i| self.entries[i].anchor.as_str())
    }

    pub fn visible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.visible).count()
    }
}

#[cfg(test)]
mod tests {
    use super::TocIndex;
    use crate::artifact::parse_artifact;
    use crate::host::{HostLayout, StackedLayout};
    use crate::render::BoxArena;

    const ARTIFACT: &str = r#"{
        "title": "Directive",
        "catalog": [
            {"tag": "L1", "label": "Base act"},
            {"tag": "L2", "label": "First amendment"}
        ],
        "chapters": [
            {
                "anchor": "chp-1",
                "title": "Chapter I",
                "articles": [
                    {"anchor": "art-1", "number": "1", "tags": ["L1"], "body": []},
                    {"anchor": "art-2", "number": "2", "tags": ["L2"], "body": []}
                ]
            }
        ]
    }"#;

    #[test]
    fn build_mirrors_every_box() {
        let document = parse_artifact(ARTIFACT).unwrap();
        let arena = BoxArena::build(&document).unwrap();
        let toc = TocIndex::build(&arena);
        assert_eq!(toc.entries().len(), arena.len());
        assert!(toc.entries()[0].is_container);
    }

    #[test]
    fn container_entry_hides_when_all_units_hide() {
        let document = parse_artifact(ARTIFACT).unwrap();
        let arena = BoxArena::build(&document).unwrap();
        let mut toc = TocIndex::build(&arena);

        toc.sync_visibility(|_| false);
        assert_eq!(toc.visible_count(), 0);

        toc.sync_visibility(|set| set.iter().any(|t| t.as_str() == "L2"));
        let visible: Vec<_> = toc
            .entries()
            .iter()
            .filter(|e| e.visible)
            .map(|e| e.anchor.as_str())
            .collect();
        assert_eq!(visible, vec!["chp-1", "art-2"]);
    }

    #[test]
    fn current_entry_tracks_scroll_position() {
        let document = parse_artifact(ARTIFACT).unwrap();
        let arena = BoxArena::build(&document).unwrap();
        let mut toc = TocIndex::build(&arena);
        let mut layout = StackedLayout::new(10.0, 30.0);
        layout.relayout(&arena);

        assert_eq!(toc.update_current(&layout), Some("chp-1"));

        layout.scroll_to(21.0);
        assert_eq!(toc.update_current(&layout), Some("art-2"));
    }
}
