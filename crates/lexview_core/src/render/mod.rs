//! Render layer: box arena and footnote lookup.
//!
//! # Responsibility
//! - Materialize the document into the box tree exactly once per session.
//! - Expose the read-only footnote table built from the artifact.

pub mod arena;

pub use arena::{BoxArena, BoxId, BoxKind, BoxNode};

use crate::model::document::Document;
use std::collections::BTreeMap;

/// Read-only footnote lookup: identifier to tooltip text.
///
/// Built once from the document; not owned by any box.
#[derive(Debug, Clone, Default)]
pub struct FootnoteTable {
    entries: BTreeMap<String, String>,
}

impl FootnoteTable {
    pub fn build(document: &Document) -> Self {
        Self {
            entries: document
                .footnotes
                .iter()
                .map(|f| (f.id.clone(), f.text.clone()))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
