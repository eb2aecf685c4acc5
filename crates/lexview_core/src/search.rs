//! In-place full-text search with highlight spans.
//!
//! # Responsibility
//! - Scan the visible prose of the box tree for a literal query.
//! - Wrap matches as highlight spans without altering the text content.
//! - Provide ordered forward/backward navigation among matches.
//!
//! # Invariants
//! - A new search fully reverses the previous one before scanning; searches
//!   are never additive.
//! - Span concatenation stays byte-identical to the original segment text
//!   through any number of search/clear cycles.
//! - Decoration segments (labels, provenance markers) are never matched.

use crate::host::{HostLayout, ScrollCommand};
use crate::model::content::Span;
use crate::model::document::Document;
use crate::render::{BoxArena, BoxId};
use log::{debug, error, info};
use regex::{Regex, RegexBuilder};

/// Queries shorter than this are ignored without scanning.
pub const MIN_QUERY_LEN: usize = 2;

/// Direction for match navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Result of a `search` call, for the presentation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query was empty or below [`MIN_QUERY_LEN`]; nothing was scanned.
    TooShort,
    /// Query was applied; `total` matches exist, match 0 is current.
    Applied { total: usize },
}

/// One match, addressable by its document-order ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRef {
    pub ordinal: usize,
    /// Document-order index of the containing unit.
    pub unit_index: usize,
    /// Box of the containing unit, for expansion and scrolling.
    pub box_id: BoxId,
}

/// Owns the match list and the current-match cursor.
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    matches: Vec<MatchRef>,
    current: Option<usize>,
    query: Option<String>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a new query, superseding any previous search.
    ///
    /// Walks visible units in document order and their searchable segments
    /// left to right, so ordinals follow reading order. On one or more
    /// matches the first becomes current, its unit is expanded and an
    /// animated scroll centers it in the viewport.
    pub fn search<H: HostLayout + ?Sized>(
        &mut self,
        query: &str,
        document: &mut Document,
        arena: &mut BoxArena,
        host: &mut H,
    ) -> SearchOutcome {
        self.clear(document);

        if query.chars().count() < MIN_QUERY_LEN {
            debug!("event=search module=search status=ignored reason=query_too_short");
            return SearchOutcome::TooShort;
        }

        // Literal substring search: metacharacters are data, not syntax.
        let matcher = match RegexBuilder::new(&regex::escape(query))
            .case_insensitive(true)
            .build()
        {
            Ok(matcher) => matcher,
            Err(err) => {
                error!("event=search module=search status=error error={err}");
                return SearchOutcome::Applied { total: 0 };
            }
        };

        // Unit boxes in document order; index position equals unit_index.
        let unit_boxes: Vec<(BoxId, bool)> =
            arena.units().map(|node| (node.id, node.visible)).collect();

        for (unit_index, unit) in document.units_mut().enumerate() {
            let Some((box_id, visible)) = unit_boxes.get(unit_index).copied() else {
                continue;
            };
            if !visible {
                continue;
            }
            for segment in &mut unit.body {
                if !segment.searchable() {
                    continue;
                }
                let next_ordinal = self.matches.len();
                let found = highlight_segment(&mut segment.spans, &matcher, next_ordinal);
                for _ in 0..found {
                    self.matches.push(MatchRef {
                        ordinal: self.matches.len(),
                        unit_index,
                        box_id,
                    });
                }
            }
        }

        let total = self.matches.len();
        self.query = Some(query.to_string());
        if total > 0 {
            self.current = Some(0);
            self.reveal(self.matches[0], arena, host);
        }

        info!("event=search module=search status=ok query_len={} total={total}", query.len());
        SearchOutcome::Applied { total }
    }

    /// Moves the current-match cursor with wraparound.
    ///
    /// Returns `(current + 1, total)` for display, or `None` with zero
    /// matches.
    pub fn navigate<H: HostLayout + ?Sized>(
        &mut self,
        direction: Direction,
        arena: &mut BoxArena,
        host: &mut H,
    ) -> Option<(usize, usize)> {
        let total = self.matches.len();
        if total == 0 {
            return None;
        }
        let current = self.current.unwrap_or(0);
        let next = match direction {
            Direction::Forward => (current + 1) % total,
            Direction::Backward => (current + total - 1) % total,
        };
        self.current = Some(next);
        self.reveal(self.matches[next], arena, host);
        debug!("event=search_navigate module=search status=ok current={} total={total}", next + 1);
        Some((next + 1, total))
    }

    /// Reverses the active search completely.
    ///
    /// Every touched segment returns to a single plain span whose text is
    /// byte-identical to the original; match list and cursor reset.
    pub fn clear(&mut self, document: &mut Document) {
        if self.query.take().is_some() {
            for unit in document.units_mut() {
                for segment in &mut unit.body {
                    segment.merge_spans();
                }
            }
            debug!("event=search_clear module=search status=ok");
        }
        self.matches.clear();
        self.current = None;
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    /// `(current + 1, total)` counters, `(0, 0)` with no active search.
    pub fn counters(&self) -> (usize, usize) {
        match self.current {
            Some(current) => (current + 1, self.matches.len()),
            None => (0, self.matches.len()),
        }
    }

    pub fn current_match(&self) -> Option<MatchRef> {
        self.current.map(|i| self.matches[i])
    }

    pub fn active_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Expands the containing unit and centers it with an animated scroll.
    fn reveal<H: HostLayout + ?Sized>(
        &self,
        match_ref: MatchRef,
        arena: &mut BoxArena,
        host: &mut H,
    ) {
        arena.get_mut(match_ref.box_id).collapsed = false;
        if let Some(top) = host.box_top(match_ref.box_id) {
            let offset = (top - host.viewport_height() / 2.0).max(0.0);
            host.apply_scroll(ScrollCommand::Animated { offset });
        }
    }
}

/// Splits one segment's spans into plain/highlight runs for the matcher.
///
/// Returns the number of matches found. Empty plain runs are never emitted,
/// and the concatenated run text equals the input text exactly.
fn highlight_segment(spans: &mut Vec<Span>, matcher: &Regex, first_ordinal: usize) -> usize {
    let text: String = spans.iter().map(Span::text).collect();
    let mut out = Vec::new();
    let mut cursor = 0usize;
    let mut found = 0usize;

    for hit in matcher.find_iter(&text) {
        if hit.start() > cursor {
            out.push(Span::Plain(text[cursor..hit.start()].to_string()));
        }
        out.push(Span::Highlight {
            text: hit.as_str().to_string(),
            ordinal: first_ordinal + found,
        });
        cursor = hit.end();
        found += 1;
    }

    if found == 0 {
        return 0;
    }
    if cursor < text.len() {
        out.push(Span::Plain(text[cursor..].to_string()));
    }
    *spans = out;
    found
}
