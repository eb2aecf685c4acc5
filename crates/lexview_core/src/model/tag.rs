//! Provenance tags and the amendment-layer catalog.
//!
//! # Responsibility
//! - Define the opaque tag identifying which amendment layer touched a unit.
//! - Keep the catalog's total precedence order in one place.
//! - Resolve a provenance set to its single primary tag.
//!
//! # Invariants
//! - Catalog order is fixed for the lifetime of a loaded document.
//! - `primary` never depends on the iteration order of its input set.
//! - Tags absent from the catalog rank strictly after every catalog tag.

use crate::artifact::DataIntegrityError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque identifier of one amendment layer (e.g. `L3` or a corrigendum).
///
/// Ordering and equality are by tag text, but precedence questions must
/// always go through [`TagCatalog`], never through string comparison.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceTag(pub String);

impl ProvenanceTag {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProvenanceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-empty, duplicate-free collection of tags attached to a content unit.
///
/// A `BTreeSet` keeps membership order-irrelevant by construction.
pub type ProvenanceSet = BTreeSet<ProvenanceTag>;

/// Fixed precedence catalog over amendment layers.
///
/// The catalog holds the layers in precedence order (earliest first) plus a
/// human-readable label per layer for display. Special layers such as a
/// pandemic-era corrigendum simply occupy a position in the same order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCatalog {
    /// Layers in precedence order; index 0 is the earliest layer.
    order: Vec<ProvenanceTag>,
    /// Display label and source reference per layer.
    labels: BTreeMap<ProvenanceTag, String>,
}

impl TagCatalog {
    /// Builds a catalog from `(tag, label)` pairs in precedence order.
    pub fn new(entries: Vec<(ProvenanceTag, String)>) -> Self {
        let mut order = Vec::with_capacity(entries.len());
        let mut labels = BTreeMap::new();
        for (tag, label) in entries {
            if !order.contains(&tag) {
                order.push(tag.clone());
            }
            labels.insert(tag, label);
        }
        Self { order, labels }
    }

    /// Returns all catalog tags in precedence order.
    pub fn tags(&self) -> &[ProvenanceTag] {
        &self.order
    }

    /// Returns the full catalog as a provenance set ("show all" filter).
    pub fn full_set(&self) -> ProvenanceSet {
        self.order.iter().cloned().collect()
    }

    /// Returns the display label for a tag, or the raw tag text for tags
    /// outside the catalog.
    pub fn label<'a>(&'a self, tag: &'a ProvenanceTag) -> &'a str {
        self.labels
            .get(tag)
            .map(String::as_str)
            .unwrap_or_else(|| tag.as_str())
    }

    /// Returns the precedence position of a tag, `None` for unknown tags.
    pub fn rank(&self, tag: &ProvenanceTag) -> Option<usize> {
        self.order.iter().position(|t| t == tag)
    }

    pub fn contains(&self, tag: &ProvenanceTag) -> bool {
        self.rank(tag).is_some()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolves a provenance set to its single primary tag.
    ///
    /// The primary tag is the one with the lowest catalog rank. Tags outside
    /// the catalog rank after every catalog tag; ties among unknown tags are
    /// broken by tag text so the result is stable across runs.
    ///
    /// # Errors
    /// - `DataIntegrityError::EmptyProvenanceSet` on an empty input set.
    ///   Sets are non-empty by construction; an empty one means the artifact
    ///   validation was bypassed, so this fails fast instead of defaulting.
    pub fn primary<'a>(
        &self,
        tags: &'a ProvenanceSet,
    ) -> Result<&'a ProvenanceTag, DataIntegrityError> {
        tags.iter()
            .min_by_key(|tag| match self.rank(tag) {
                Some(rank) => (rank, ""),
                None => (self.order.len(), tag.as_str()),
            })
            .ok_or(DataIntegrityError::EmptyProvenanceSet)
    }
}

/// Convenience constructor for provenance sets in call sites and tests.
pub fn provenance_set<I, S>(tags: I) -> ProvenanceSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tags.into_iter().map(|t| ProvenanceTag::new(t)).collect()
}
