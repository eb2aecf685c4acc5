//! Domain model for the rendered directive.
//!
//! # Responsibility
//! - Define canonical data structures shared by all engines.
//! - Keep one typed shape for provenance, structure and body content.
//!
//! # Invariants
//! - Every content unit is identified by a stable anchor string.
//! - Provenance sets are non-empty and duplicate-free by construction.

pub mod content;
pub mod document;
pub mod tag;
