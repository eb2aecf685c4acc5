//! Host layout boundary.
//!
//! # Responsibility
//! - Define the contract between the engines and the environment that lays
//!   out the box tree and owns the real viewport.
//! - Distinguish corrective (instant) from navigational (animated) scroll.
//!
//! # Invariants
//! - `relayout` returns only after positions have settled, so a caller may
//!   read `box_top` immediately afterwards.
//! - Hosts must honor the `ScrollCommand` kind: animating a corrective
//!   scroll produces a visible jump on every filter toggle.

use crate::render::{BoxArena, BoxId};
use std::collections::BTreeMap;

/// A scroll instruction emitted by the engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollCommand {
    /// Instant correction after a reflow; not a navigation.
    Corrective { offset: f64 },
    /// Navigational jump the reader should be able to follow.
    Animated { offset: f64 },
}

impl ScrollCommand {
    pub fn offset(self) -> f64 {
        match self {
            Self::Corrective { offset } | Self::Animated { offset } => offset,
        }
    }
}

/// Layout and viewport capabilities the engines require from the host.
pub trait HostLayout {
    /// Document-absolute top of a realized box; `None` while filtered out.
    fn box_top(&self, id: BoxId) -> Option<f64>;

    /// Recomputes positions after visibility mutations.
    fn relayout(&mut self, arena: &BoxArena);

    fn viewport_height(&self) -> f64;

    /// Current document-absolute scroll offset of the viewport top.
    fn scroll_offset(&self) -> f64;

    /// Applies a scroll command and updates the scroll offset.
    fn apply_scroll(&mut self, command: ScrollCommand);
}

/// Minimal host: stacks visible boxes vertically at fixed heights.
///
/// Used by the CLI probe and by tests; a real presentation layer supplies
/// its own `HostLayout` backed by actual layout geometry.
#[derive(Debug, Clone)]
pub struct StackedLayout {
    heights: BTreeMap<BoxId, f64>,
    default_height: f64,
    viewport_height: f64,
    tops: BTreeMap<BoxId, f64>,
    scroll: f64,
    /// Last command applied, exposed so callers can verify the kind.
    pub last_command: Option<ScrollCommand>,
}

impl StackedLayout {
    pub fn new(default_height: f64, viewport_height: f64) -> Self {
        Self {
            heights: BTreeMap::new(),
            default_height,
            viewport_height,
            tops: BTreeMap::new(),
            scroll: 0.0,
            last_command: None,
        }
    }

    /// Overrides the height of one box.
    pub fn set_height(&mut self, id: BoxId, height: f64) {
        self.heights.insert(id, height);
    }

    /// Moves the viewport directly, as a user scroll would.
    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll = offset.max(0.0);
    }

    fn height(&self, id: BoxId) -> f64 {
        self.heights.get(&id).copied().unwrap_or(self.default_height)
    }
}

impl HostLayout for StackedLayout {
    fn box_top(&self, id: BoxId) -> Option<f64> {
        self.tops.get(&id).copied()
    }

    fn relayout(&mut self, arena: &BoxArena) {
        self.tops.clear();
        let mut y = 0.0;
        for node in arena.iter() {
            if !node.visible {
                continue;
            }
            self.tops.insert(node.id, y);
            y += self.height(node.id);
        }
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_offset(&self) -> f64 {
        self.scroll
    }

    fn apply_scroll(&mut self, command: ScrollCommand) {
        self.scroll = command.offset().max(0.0);
        self.last_command = Some(command);
    }
}
