//! Per-document engine session.
//!
//! # Responsibility
//! - Own all mutable view state for one loaded document: box tree, active
//!   filter, match list, navigation index, coalescing timers.
//! - Expose only the public operations; no ambient globals.
//!
//! # Invariants
//! - Constructed once per document session; the box tree is never rebuilt.
//! - Every operation leaves the tree self-consistent before returning, since
//!   the next event may interleave arbitrarily.

use crate::artifact::DataIntegrityError;
use crate::filter::{FilterEngine, FilterOutcome};
use crate::host::{HostLayout, ScrollCommand};
use crate::model::document::Document;
use crate::model::tag::{ProvenanceSet, TagCatalog};
use crate::render::{BoxArena, BoxId, FootnoteTable};
use crate::search::{Direction, SearchEngine, SearchOutcome};
use crate::timing::{Clock, Debouncer, SystemClock, Throttle, SCROLL_THROTTLE, SEARCH_DEBOUNCE};
use crate::toc::TocIndex;
use log::info;

/// One reader session over one loaded document.
pub struct DocumentSession<H: HostLayout, C: Clock = SystemClock> {
    document: Document,
    arena: BoxArena,
    toc: TocIndex,
    footnotes: FootnoteTable,
    filter: FilterEngine,
    search: SearchEngine,
    host: H,
    clock: C,
    search_debounce: Debouncer,
    pending_query: Option<String>,
    scroll_throttle: Throttle,
}

impl<H: HostLayout> DocumentSession<H> {
    /// Builds the box tree and indexes for a validated document, timed by
    /// the wall clock.
    ///
    /// # Errors
    /// - Propagates resolver integrity failures from arena construction;
    ///   surfaced as a rendering failure, never defaulted.
    pub fn new(document: Document, host: H) -> Result<Self, DataIntegrityError> {
        Self::with_clock(document, host, SystemClock::new())
    }
}

impl<H: HostLayout, C: Clock> DocumentSession<H, C> {
    /// Same as [`DocumentSession::new`] with an explicit time source, so the
    /// coalescing timers can be driven without sleeping.
    pub fn with_clock(document: Document, mut host: H, clock: C) -> Result<Self, DataIntegrityError> {
        let arena = BoxArena::build(&document)?;
        let toc = TocIndex::build(&arena);
        let footnotes = FootnoteTable::build(&document);
        let filter = FilterEngine::new(&document.catalog);
        host.relayout(&arena);

        info!(
            "event=session_open module=session status=ok boxes={} units={} footnotes={}",
            arena.len(),
            arena.units().count(),
            footnotes.len()
        );

        Ok(Self {
            document,
            arena,
            toc,
            footnotes,
            filter,
            search: SearchEngine::new(),
            host,
            clock,
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            pending_query: None,
            scroll_throttle: Throttle::new(SCROLL_THROTTLE),
        })
    }

    // Filtering.

    /// Restricts the view to units touched by any of `tags`.
    pub fn apply_filter(&mut self, tags: ProvenanceSet) -> FilterOutcome {
        self.filter.apply_filter(
            tags,
            &mut self.document,
            &mut self.arena,
            &mut self.toc,
            &mut self.host,
        )
    }

    /// Shows every unit again (full catalog active).
    pub fn show_all(&mut self) -> FilterOutcome {
        self.filter.show_all(
            &mut self.document,
            &mut self.arena,
            &mut self.toc,
            &mut self.host,
        )
    }

    /// Applies or reverts a named preset subset (e.g. regional relevance).
    pub fn toggle_preset(&mut self, preset: &ProvenanceSet) -> FilterOutcome {
        self.filter.toggle_preset(
            preset,
            &mut self.document,
            &mut self.arena,
            &mut self.toc,
            &mut self.host,
        )
    }

    pub fn active_tags(&self) -> &ProvenanceSet {
        self.filter.active_tags()
    }

    pub fn is_preset_active(&self) -> bool {
        self.filter.is_preset_active()
    }

    // Search.

    /// Runs a search immediately, superseding any previous one.
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        self.pending_query = None;
        let outcome = self
            .search
            .search(query, &mut self.document, &mut self.arena, &mut self.host);
        self.toc.update_current(&self.host);
        outcome
    }

    /// Records a keystroke; the search fires after the quiet window.
    pub fn queue_search(&mut self, query: impl Into<String>) {
        self.pending_query = Some(query.into());
        self.search_debounce.request(self.clock.now());
    }

    /// Moves the current match forward or backward with wraparound.
    pub fn navigate(&mut self, direction: Direction) -> Option<(usize, usize)> {
        let counters = self
            .search
            .navigate(direction, &mut self.arena, &mut self.host)?;
        self.toc.update_current(&self.host);
        Some(counters)
    }

    /// Explicitly reverses the active search.
    pub fn clear_search(&mut self) {
        self.pending_query = None;
        self.search.clear(&mut self.document);
    }

    /// `(current, total)` match counters for display.
    pub fn match_counters(&self) -> (usize, usize) {
        self.search.counters()
    }

    // Event pump.

    /// Notes a scroll event; current-in-view recomputes after the interval.
    pub fn on_scroll(&mut self) {
        self.scroll_throttle.notify(self.clock.now());
    }

    /// Drives the coalescing timers.
    ///
    /// Fires at most one debounced search per call and returns its outcome.
    pub fn tick(&mut self) -> Option<SearchOutcome> {
        let now = self.clock.now();
        let mut outcome = None;
        if self.search_debounce.poll(now) {
            if let Some(query) = self.pending_query.take() {
                outcome = Some(self.search(&query));
            }
        }
        if self.scroll_throttle.poll(now) {
            self.toc.update_current(&self.host);
        }
        outcome
    }

    // Navigation.

    /// Jumps to a stable anchor (TOC click or deep link).
    ///
    /// A filtered-out anchor resolves to the nearest visible preceding box.
    pub fn go_to_anchor(&mut self, anchor: &str) -> bool {
        let Some(box_id) = self.arena.by_anchor(anchor) else {
            return false;
        };
        self.arena.get_mut(box_id).collapsed = false;

        let mut target = None;
        let mut index = box_id.0;
        loop {
            let id = BoxId(index);
            if self.arena.get(id).visible {
                if let Some(top) = self.host.box_top(id) {
                    target = Some(top);
                    break;
                }
            }
            if index == 0 {
                break;
            }
            index -= 1;
        }

        if let Some(top) = target {
            self.host.apply_scroll(ScrollCommand::Animated { offset: top });
        }
        self.toc.update_current(&self.host);
        true
    }

    /// Collapses or expands one unit by anchor, as a reader toggle would.
    pub fn set_collapsed(&mut self, anchor: &str, collapsed: bool) -> bool {
        match self.arena.by_anchor(anchor) {
            Some(box_id) => {
                self.arena.get_mut(box_id).collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    /// Anchor of the navigation entry currently in view.
    pub fn current_toc_anchor(&self) -> Option<&str> {
        self.toc.current_anchor()
    }

    // Read-only surfaces.

    pub fn catalog(&self) -> &TagCatalog {
        &self.document.catalog
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn arena(&self) -> &BoxArena {
        &self.arena
    }

    pub fn toc(&self) -> &TocIndex {
        &self.toc
    }

    pub fn footnote(&self, id: &str) -> Option<&str> {
        self.footnotes.get(id)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
