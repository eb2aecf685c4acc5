//! Runtime document model consumed by the render layer.
//!
//! # Responsibility
//! - Hold the loaded directive as chapters, sections, units and footnotes.
//! - Keep the shape read-only after load; engines mutate flags, not structure.
//!
//! # Invariants
//! - Every content unit carries a non-empty provenance set (validated at
//!   load time by the artifact module).
//! - Unit anchors are unique across the whole document.

use crate::model::content::Segment;
use crate::model::tag::{ProvenanceSet, TagCatalog};

/// Whether a content unit is an article or an annex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Article,
    Annex,
}

/// An article or annex: the smallest independently filterable unit.
#[derive(Debug, Clone)]
pub struct ContentUnit {
    /// Stable identifier, used for anchors and deep links.
    pub anchor: String,
    /// Display number ("4", "IVa", "Annex II").
    pub number: String,
    pub subtitle: Option<String>,
    pub kind: UnitKind,
    /// Non-empty set of layers that introduced or touched this unit.
    pub provenance: ProvenanceSet,
    /// Pre-rendered body as typed segments.
    pub body: Vec<Segment>,
}

/// A section inside a chapter. Carries no provenance of its own.
#[derive(Debug, Clone)]
pub struct Section {
    pub anchor: String,
    pub title: String,
    pub units: Vec<ContentUnit>,
}

/// A chapter: either direct articles, or sections holding articles.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub anchor: String,
    pub title: String,
    /// Chapter-direct articles, ordered before any sections.
    pub units: Vec<ContentUnit>,
    pub sections: Vec<Section>,
}

/// One footnote entry: identifier to tooltip text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub id: String,
    pub text: String,
}

/// The loaded directive.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub catalog: TagCatalog,
    pub chapters: Vec<Chapter>,
    pub annexes: Vec<ContentUnit>,
    pub footnotes: Vec<Footnote>,
}

impl Document {
    /// Iterates all content units in document order: chapter-direct
    /// articles, then section articles per chapter, then annexes.
    pub fn units(&self) -> impl Iterator<Item = &ContentUnit> {
        self.chapters
            .iter()
            .flat_map(|chapter| {
                chapter
                    .units
                    .iter()
                    .chain(chapter.sections.iter().flat_map(|s| s.units.iter()))
            })
            .chain(self.annexes.iter())
    }

    /// Mutable variant of [`Document::units`], same order.
    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut ContentUnit> {
        self.chapters
            .iter_mut()
            .flat_map(|chapter| {
                chapter
                    .units
                    .iter_mut()
                    .chain(chapter.sections.iter_mut().flat_map(|s| s.units.iter_mut()))
            })
            .chain(self.annexes.iter_mut())
    }

    pub fn unit_count(&self) -> usize {
        self.units().count()
    }
}
