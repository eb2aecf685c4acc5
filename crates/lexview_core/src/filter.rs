//! Provenance-based visibility filtering.
//!
//! # Responsibility
//! - Compute per-box visibility from the active amendment-layer set.
//! - Propagate visibility to sub-region segments and the navigation index.
//! - Preserve the reader's visual scroll anchor across the reflow.
//!
//! # Invariants
//! - When every catalog tag is active, everything is visible, including
//!   units tagged only with non-catalog tags.
//! - Hidden boxes stay in the arena; their anchors remain resolvable.
//! - The post-filter scroll adjustment is corrective, never animated.

use crate::host::{HostLayout, ScrollCommand};
use crate::model::document::Document;
use crate::model::tag::{ProvenanceSet, TagCatalog};
use crate::render::{BoxArena, BoxId};
use crate::toc::TocIndex;
use log::{debug, info};

/// Counts reported to the presentation layer after a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub visible_units: usize,
    pub total_units: usize,
}

/// Scroll anchor captured before a visibility mutation.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    box_id: BoxId,
    /// Viewport-relative offset the anchor must keep after the reflow.
    viewport_offset: f64,
}

/// Owns the active tag set and the regional preset toggle.
///
/// The preset flag lives here, next to the set it qualifies, so the two can
/// never drift apart.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    active: ProvenanceSet,
    preset_active: bool,
}

impl FilterEngine {
    /// Starts with every catalog tag active ("show everything").
    pub fn new(catalog: &TagCatalog) -> Self {
        Self {
            active: catalog.full_set(),
            preset_active: false,
        }
    }

    pub fn active_tags(&self) -> &ProvenanceSet {
        &self.active
    }

    pub fn is_preset_active(&self) -> bool {
        self.preset_active
    }

    /// Applies a new active tag set to the whole view.
    ///
    /// An empty set is a legitimate "show nothing" request, not an error.
    /// Selecting a tag set manually leaves any preset toggle behind.
    pub fn apply_filter<H: HostLayout + ?Sized>(
        &mut self,
        tags: ProvenanceSet,
        document: &mut Document,
        arena: &mut BoxArena,
        toc: &mut TocIndex,
        host: &mut H,
    ) -> FilterOutcome {
        self.preset_active = false;
        self.apply(tags, document, arena, toc, host)
    }

    /// Re-activates the full catalog.
    pub fn show_all<H: HostLayout + ?Sized>(
        &mut self,
        document: &mut Document,
        arena: &mut BoxArena,
        toc: &mut TocIndex,
        host: &mut H,
    ) -> FilterOutcome {
        self.preset_active = false;
        let full = document.catalog.full_set();
        self.apply(full, document, arena, toc, host)
    }

    /// Applies a named preset subset; re-toggling it returns to "show all".
    pub fn toggle_preset<H: HostLayout + ?Sized>(
        &mut self,
        preset: &ProvenanceSet,
        document: &mut Document,
        arena: &mut BoxArena,
        toc: &mut TocIndex,
        host: &mut H,
    ) -> FilterOutcome {
        if self.preset_active {
            self.show_all(document, arena, toc, host)
        } else {
            let outcome = self.apply(preset.clone(), document, arena, toc, host);
            self.preset_active = true;
            outcome
        }
    }

    fn apply<H: HostLayout + ?Sized>(
        &mut self,
        tags: ProvenanceSet,
        document: &mut Document,
        arena: &mut BoxArena,
        toc: &mut TocIndex,
        host: &mut H,
    ) -> FilterOutcome {
        let anchor = capture_anchor(arena, host);

        let all_active = document
            .catalog
            .tags()
            .iter()
            .all(|tag| tags.contains(tag));
        if tags.is_empty() {
            debug!("event=filter_apply module=filter status=ok note=empty_active_set");
        }

        let mut visible_units = 0usize;
        let mut total_units = 0usize;
        for node in arena.iter_mut() {
            if !node.kind.is_unit() {
                continue;
            }
            total_units += 1;
            node.visible = all_active || !node.provenance.is_disjoint(&tags);
            if node.visible {
                visible_units += 1;
            }
        }

        // Sub-regions attributed to a single layer follow the same predicate
        // over their singleton set.
        for unit in document.units_mut() {
            for segment in &mut unit.body {
                if let Some(tag) = &segment.tag {
                    segment.visible = all_active || tags.contains(tag);
                }
            }
        }

        // Containers derive visibility bottom-up from their units.
        let containers: Vec<BoxId> = arena
            .iter()
            .filter(|n| n.kind.is_container())
            .map(|n| n.id)
            .collect();
        for id in containers {
            let visible = arena.any_visible_unit_below(id);
            arena.get_mut(id).visible = visible;
        }

        toc.sync_visibility(|set| all_active || !set.is_disjoint(&tags));

        host.relayout(arena);
        restore_anchor(anchor, arena, host);

        info!(
            "event=filter_apply module=filter status=ok active={} all_active={} visible_units={} total_units={}",
            tags.len(),
            all_active,
            visible_units,
            total_units
        );

        self.active = tags;
        FilterOutcome {
            visible_units,
            total_units,
        }
    }
}

/// Picks the realized header whose on-screen offset is closest to the
/// viewport top, ties broken by document order.
fn capture_anchor<H: HostLayout + ?Sized>(arena: &BoxArena, host: &H) -> Option<Anchor> {
    let scroll = host.scroll_offset();
    let mut best: Option<(f64, Anchor)> = None;
    for node in arena.iter() {
        if !node.visible {
            continue;
        }
        let Some(top) = host.box_top(node.id) else {
            continue;
        };
        let offset = top - scroll;
        let distance = offset.abs();
        let better = match &best {
            Some((best_distance, _)) => distance < *best_distance,
            None => true,
        };
        if better {
            best = Some((
                distance,
                Anchor {
                    box_id: node.id,
                    viewport_offset: offset,
                },
            ));
        }
    }
    best.map(|(_, anchor)| anchor)
}

/// Re-locates the anchor by identity and issues the corrective scroll.
///
/// A hidden anchor falls back to the nearest still-visible preceding header
/// in document order. With no candidate at all the adjustment is skipped.
fn restore_anchor<H: HostLayout + ?Sized>(
    anchor: Option<Anchor>,
    arena: &BoxArena,
    host: &mut H,
) {
    let Some(anchor) = anchor else {
        return;
    };

    let mut target = None;
    let mut index = anchor.box_id.0;
    loop {
        let id = BoxId(index);
        if arena.get(id).visible {
            if let Some(top) = host.box_top(id) {
                target = Some(top);
                break;
            }
        }
        if index == 0 {
            break;
        }
        index -= 1;
    }

    let Some(new_top) = target else {
        return;
    };
    host.apply_scroll(ScrollCommand::Corrective {
        offset: new_top - anchor.viewport_offset,
    });
}

#[cfg(test)]
mod tests {
    use super::FilterEngine;
    use crate::artifact::parse_artifact;
    use crate::host::{HostLayout, StackedLayout};
    use crate::model::tag::provenance_set;
    use crate::render::BoxArena;
    use crate::toc::TocIndex;

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
                    {"anchor": "art-2", "number": "2", "tags": ["L2"], "body": []},
                    {"anchor": "art-3", "number": "3", "tags": ["L1", "L2"], "body": []}
                ]
            }
        ]
    }"#;

    #[test]
    fn preset_toggle_returns_to_show_all() {
        let mut document = parse_artifact(ARTIFACT).unwrap();
        let mut arena = BoxArena::build(&document).unwrap();
        let mut toc = TocIndex::build(&arena);
        let mut host = StackedLayout::new(10.0, 40.0);
        host.relayout(&arena);

        let mut engine = FilterEngine::new(&document.catalog);
        let preset = provenance_set(["L2"]);

        let outcome =
            engine.toggle_preset(&preset, &mut document, &mut arena, &mut toc, &mut host);
        assert!(engine.is_preset_active());
        assert_eq!(outcome.visible_units, 2);

        let outcome =
            engine.toggle_preset(&preset, &mut document, &mut arena, &mut toc, &mut host);
        assert!(!engine.is_preset_active());
        assert_eq!(outcome.visible_units, 3);
    }

    #[test]
    fn manual_filter_clears_preset_flag() {
        let mut document = parse_artifact(ARTIFACT).unwrap();
        let mut arena = BoxArena::build(&document).unwrap();
        let mut toc = TocIndex::build(&arena);
        let mut host = StackedLayout::new(10.0, 40.0);
        host.relayout(&arena);

        let mut engine = FilterEngine::new(&document.catalog);
        let preset = provenance_set(["L2"]);
        engine.toggle_preset(&preset, &mut document, &mut arena, &mut toc, &mut host);
        engine.apply_filter(
            provenance_set(["L1"]),
            &mut document,
            &mut arena,
            &mut toc,
            &mut host,
        );
        assert!(!engine.is_preset_active());
    }

    #[test]
    fn empty_active_set_shows_nothing() {
        let mut document = parse_artifact(ARTIFACT).unwrap();
        let mut arena = BoxArena::build(&document).unwrap();
        let mut toc = TocIndex::build(&arena);
        let mut host = StackedLayout::new(10.0, 40.0);
        host.relayout(&arena);

        let mut engine = FilterEngine::new(&document.catalog);
        let outcome = engine.apply_filter(
            provenance_set(Vec::<String>::new()),
            &mut document,
            &mut arena,
            &mut toc,
            &mut host,
        );
        assert_eq!(outcome.visible_units, 0);
        assert_eq!(toc.visible_count(), 0);
    }
}
