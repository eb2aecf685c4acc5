//! Core engines for the layered-directive viewer.
//!
//! This crate is the single source of truth for provenance-aware visibility
//! and in-place search over a rendered legal text.

pub mod artifact;
pub mod filter;
pub mod host;
pub mod logging;
pub mod model;
pub mod render;
pub mod search;
pub mod session;
pub mod timing;
pub mod toc;

pub use artifact::{load_artifact, parse_artifact, ArtifactError, DataIntegrityError};
pub use filter::{FilterEngine, FilterOutcome};
pub use host::{HostLayout, ScrollCommand, StackedLayout};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::content::{Segment, SegmentKind, Span};
pub use model::document::{Chapter, ContentUnit, Document, Footnote, Section, UnitKind};
pub use model::tag::{provenance_set, ProvenanceSet, ProvenanceTag, TagCatalog};
pub use render::{BoxArena, BoxId, BoxKind, FootnoteTable};
pub use search::{Direction, MatchRef, SearchEngine, SearchOutcome, MIN_QUERY_LEN};
pub use session::DocumentSession;
pub use timing::{Clock, Debouncer, SystemClock, Throttle};
pub use toc::{TocEntry, TocIndex};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
