//! Index-based arena for the on-screen box tree.
//!
//! # Responsibility
//! - Realize every chapter, section, article and annex as exactly one box.
//! - Keep a stable anchor-to-box lookup so deep links resolve even when a
//!   box is filtered out.
//!
//! # Invariants
//! - Boxes are created once per session and never destroyed; engines mutate
//!   the `visible` / `collapsed` flags in place.
//! - Arena order is document order.

use crate::artifact::DataIntegrityError;
use crate::model::document::{Document, UnitKind};
use crate::model::tag::{ProvenanceSet, ProvenanceTag};
use std::collections::BTreeMap;

/// Stable handle of one box in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(pub usize);

/// Structural role of one box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Chapter,
    Section,
    Article,
    Annex,
}

impl BoxKind {
    /// Containers derive visibility from their units; they carry no
    /// provenance of their own.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Chapter | Self::Section)
    }

    pub fn is_unit(self) -> bool {
        !self.is_container()
    }
}

/// One realized box.
#[derive(Debug, Clone)]
pub struct BoxNode {
    pub id: BoxId,
    pub kind: BoxKind,
    /// Stable identifier shared with the model and the navigation index.
    pub anchor: String,
    /// Heading text shown for this box (chapter/section title, unit number).
    pub heading: String,
    /// Copy of the unit's provenance set; empty for containers.
    pub provenance: ProvenanceSet,
    /// Resolver-picked primary tag; `None` for containers.
    pub primary: Option<ProvenanceTag>,
    pub visible: bool,
    pub collapsed: bool,
    /// Position of the mirrored unit in document order; `None` for containers.
    pub unit_index: Option<usize>,
    pub parent: Option<BoxId>,
    pub children: Vec<BoxId>,
}

/// Arena of boxes in document order with stable-anchor lookup.
#[derive(Debug, Clone)]
pub struct BoxArena {
    boxes: Vec<BoxNode>,
    by_anchor: BTreeMap<String, BoxId>,
}

impl BoxArena {
    /// Builds the box tree from a loaded document.
    ///
    /// The primary tag of every unit box is resolved here, once, so the
    /// visual attribution never depends on set iteration order later.
    ///
    /// # Errors
    /// - Propagates `DataIntegrityError::EmptyProvenanceSet` from the
    ///   resolver; a validated artifact never triggers it.
    pub fn build(document: &Document) -> Result<Self, DataIntegrityError> {
        let mut arena = Self {
            boxes: Vec::new(),
            by_anchor: BTreeMap::new(),
        };
        let mut unit_index = 0usize;

        for chapter in &document.chapters {
            let chapter_id = arena.push(
                BoxKind::Chapter,
                &chapter.anchor,
                chapter.title.clone(),
                ProvenanceSet::new(),
                None,
                None,
                None,
            );
            for unit in &chapter.units {
                let primary = document.catalog.primary(&unit.provenance)?.clone();
                arena.push(
                    BoxKind::Article,
                    &unit.anchor,
                    unit_heading(&unit.number, unit.kind),
                    unit.provenance.clone(),
                    Some(primary),
                    Some(unit_index),
                    Some(chapter_id),
                );
                unit_index += 1;
            }
            for section in &chapter.sections {
                let section_id = arena.push(
                    BoxKind::Section,
                    &section.anchor,
                    section.title.clone(),
                    ProvenanceSet::new(),
                    None,
                    None,
                    Some(chapter_id),
                );
                for unit in &section.units {
                    let primary = document.catalog.primary(&unit.provenance)?.clone();
                    arena.push(
                        BoxKind::Article,
                        &unit.anchor,
                        unit_heading(&unit.number, unit.kind),
                        unit.provenance.clone(),
                        Some(primary),
                        Some(unit_index),
                        Some(section_id),
                    );
                    unit_index += 1;
                }
            }
        }

        for annex in &document.annexes {
            let primary = document.catalog.primary(&annex.provenance)?.clone();
            arena.push(
                BoxKind::Annex,
                &annex.anchor,
                unit_heading(&annex.number, annex.kind),
                annex.provenance.clone(),
                Some(primary),
                Some(unit_index),
                None,
            );
            unit_index += 1;
        }

        Ok(arena)
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: BoxKind,
        anchor: &str,
        heading: String,
        provenance: ProvenanceSet,
        primary: Option<ProvenanceTag>,
        unit_index: Option<usize>,
        parent: Option<BoxId>,
    ) -> BoxId {
        let id = BoxId(self.boxes.len());
        self.boxes.push(BoxNode {
            id,
            kind,
            anchor: anchor.to_string(),
            heading,
            provenance,
            primary,
            visible: true,
            collapsed: false,
            unit_index,
            parent,
            children: Vec::new(),
        });
        if let Some(parent_id) = parent {
            self.boxes[parent_id.0].children.push(id);
        }
        self.by_anchor.insert(anchor.to_string(), id);
        id
    }

    pub fn get(&self, id: BoxId) -> &BoxNode {
        &self.boxes[id.0]
    }

    pub fn get_mut(&mut self, id: BoxId) -> &mut BoxNode {
        &mut self.boxes[id.0]
    }

    /// Resolves a stable anchor to its box, whether or not it is visible.
    pub fn by_anchor(&self, anchor: &str) -> Option<BoxId> {
        self.by_anchor.get(anchor).copied()
    }

    /// All boxes in document order.
    pub fn iter(&self) -> impl Iterator<Item = &BoxNode> {
        self.boxes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BoxNode> {
        self.boxes.iter_mut()
    }

    /// Unit boxes only, in document order.
    pub fn units(&self) -> impl Iterator<Item = &BoxNode> {
        self.boxes.iter().filter(|b| b.kind.is_unit())
    }

    /// Box of the unit at `unit_index` in document order.
    pub fn unit_box(&self, unit_index: usize) -> Option<BoxId> {
        self.boxes
            .iter()
            .find(|b| b.unit_index == Some(unit_index))
            .map(|b| b.id)
    }

    /// Whether any unit below this container is visible.
    pub fn any_visible_unit_below(&self, id: BoxId) -> bool {
        self.boxes[id.0].children.iter().any(|child| {
            let node = &self.boxes[child.0];
            if node.kind.is_unit() {
                node.visible
            } else {
                self.any_visible_unit_below(node.id)
            }
        })
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

fn unit_heading(number: &str, kind: UnitKind) -> String {
    match kind {
        UnitKind::Article => format!("Article {number}"),
        UnitKind::Annex => format!("Annex {number}"),
    }
}
