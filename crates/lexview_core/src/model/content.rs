//! Segment/span content model for a unit's rendered body.
//!
//! # Responsibility
//! - Represent a unit's body as an ordered sequence of typed segments.
//! - Keep highlight state as typed span runs inside each segment.
//!
//! # Invariants
//! - Concatenating a segment's span texts is byte-identical to the text
//!   the segment was loaded with, regardless of highlight state.
//! - Label and marker segments are decoration: displayed, never searched.

use crate::model::tag::ProvenanceTag;
use serde::{Deserialize, Serialize};

/// Structural role of one body segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Searchable prose.
    Prose,
    /// Structural numbering label ("(1)", "Article 4"), decoration only.
    Label,
    /// Embedded provenance marker decoration, decoration only.
    Marker,
}

/// One run of text inside a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    /// A search match. `ordinal` is the document-order match number.
    Highlight { text: String, ordinal: usize },
}

impl Span {
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Highlight { text, .. } => text,
        }
    }
}

/// One segment of a unit's rendered body.
///
/// A segment with `tag: Some(_)` is a finer-grained sub-region attributed to
/// a single amendment layer and is independently filterable even when its
/// unit stays visible through another tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Single-layer attribution for sub-region filtering, when present.
    pub tag: Option<ProvenanceTag>,
    /// Filter visibility; mutated by the filter engine only.
    pub visible: bool,
    /// Span runs; exactly one `Plain` run when no search is active.
    pub spans: Vec<Span>,
}

impl Segment {
    pub fn new(kind: SegmentKind, tag: Option<ProvenanceTag>, text: impl Into<String>) -> Self {
        Self {
            kind,
            tag,
            visible: true,
            spans: vec![Span::Plain(text.into())],
        }
    }

    pub fn prose(text: impl Into<String>) -> Self {
        Self::new(SegmentKind::Prose, None, text)
    }

    /// Full text of the segment, independent of highlight state.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for span in &self.spans {
            out.push_str(span.text());
        }
        out
    }

    /// Whether the search walk may scan this segment.
    pub fn searchable(&self) -> bool {
        self.kind == SegmentKind::Prose && self.visible
    }

    /// Collapses the span runs back to a single plain run.
    ///
    /// Restores the pre-search shape: no empty runs, no fragmentation, text
    /// byte-identical to the original.
    pub fn merge_spans(&mut self) {
        if self.spans.len() == 1 && matches!(self.spans[0], Span::Plain(_)) {
            return;
        }
        let text = self.text();
        self.spans = vec![Span::Plain(text)];
    }

    /// Number of highlight runs currently in this segment.
    pub fn highlight_count(&self) -> usize {
        self.spans
            .iter()
            .filter(|span| matches!(span, Span::Highlight { .. }))
            .count()
    }
}
