//! Document artifact loading and integrity validation.
//!
//! # Responsibility
//! - Deserialize the preprocessed JSON artifact into the runtime model.
//! - Reject structurally invalid artifacts before any rendering happens.
//!
//! # Invariants
//! - A returned `Document` has unique unit anchors and non-empty provenance
//!   sets everywhere.
//! - Loading is all-or-nothing: there is no partial-document fallback.

use crate::model::content::{Segment, SegmentKind};
use crate::model::document::{Chapter, ContentUnit, Document, Footnote, Section, UnitKind};
use crate::model::tag::{ProvenanceTag, TagCatalog};
use log::{error, info};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Instant;

pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Programming-invariant violation inside a loaded artifact.
///
/// These are defects of the preprocessing step, not user errors; they abort
/// rendering instead of being silently defaulted, because defaulting would
/// corrupt the visual provenance attribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    /// A provenance set was empty where a non-empty one is required.
    EmptyProvenanceSet,
    /// A required field was missing or blank on a content unit.
    MissingField { anchor: String, field: &'static str },
    /// Two units share the same stable anchor.
    DuplicateAnchor(String),
    /// A marker segment referenced no layer tag.
    UntaggedMarker { anchor: String },
}

impl Display for DataIntegrityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyProvenanceSet => write!(f, "content unit carries an empty provenance set"),
            Self::MissingField { anchor, field } => {
                write!(f, "content unit `{anchor}` is missing required field `{field}`")
            }
            Self::DuplicateAnchor(anchor) => write!(f, "duplicate unit anchor `{anchor}`"),
            Self::UntaggedMarker { anchor } => {
                write!(f, "marker segment in `{anchor}` carries no layer tag")
            }
        }
    }
}

impl Error for DataIntegrityError {}

/// Artifact-layer error for IO, parsing and integrity checks.
#[derive(Debug)]
pub enum ArtifactError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Integrity(DataIntegrityError),
}

impl Display for ArtifactError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read artifact: {err}"),
            Self::Parse(err) => write!(f, "failed to parse artifact: {err}"),
            Self::Integrity(err) => write!(f, "artifact failed integrity check: {err}"),
        }
    }
}

impl Error for ArtifactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Integrity(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ArtifactError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<DataIntegrityError> for ArtifactError {
    fn from(value: DataIntegrityError) -> Self {
        Self::Integrity(value)
    }
}

// Wire schema. The preprocessing step emits this shape; it is converted to
// the runtime model after validation so engines never see raw records.

#[derive(Debug, Deserialize)]
struct RawArtifact {
    title: String,
    catalog: Vec<RawCatalogEntry>,
    chapters: Vec<RawChapter>,
    #[serde(default)]
    annexes: Vec<RawUnit>,
    #[serde(default)]
    footnotes: Vec<RawFootnote>,
}

#[derive(Debug, Deserialize)]
struct RawCatalogEntry {
    tag: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    anchor: String,
    title: String,
    #[serde(default)]
    articles: Vec<RawUnit>,
    #[serde(default)]
    sections: Vec<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    anchor: String,
    title: String,
    #[serde(default)]
    articles: Vec<RawUnit>,
}

#[derive(Debug, Deserialize)]
struct RawUnit {
    anchor: String,
    number: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    body: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    kind: SegmentKind,
    #[serde(default)]
    tag: Option<String>,
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawFootnote {
    id: String,
    text: String,
}

/// Loads and validates an artifact from a JSON file.
///
/// # Side effects
/// - Emits `artifact_load` logging events with duration and status.
pub fn load_artifact(path: impl AsRef<Path>) -> ArtifactResult<Document> {
    let started_at = Instant::now();
    info!("event=artifact_load module=artifact status=start");

    let result = std::fs::read_to_string(path)
        .map_err(ArtifactError::from)
        .and_then(|text| parse_artifact(&text));

    match &result {
        Ok(document) => info!(
            "event=artifact_load module=artifact status=ok duration_ms={} units={} footnotes={}",
            started_at.elapsed().as_millis(),
            document.unit_count(),
            document.footnotes.len()
        ),
        Err(err) => error!(
            "event=artifact_load module=artifact status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result
}

/// Parses and validates an artifact from in-memory JSON text.
pub fn parse_artifact(text: &str) -> ArtifactResult<Document> {
    let raw: RawArtifact = serde_json::from_str(text)?;
    convert(raw)
}

fn convert(raw: RawArtifact) -> ArtifactResult<Document> {
    let catalog = TagCatalog::new(
        raw.catalog
            .into_iter()
            .map(|entry| (ProvenanceTag::new(entry.tag), entry.label))
            .collect(),
    );

    let mut seen_anchors = BTreeSet::new();
    let mut chapters = Vec::with_capacity(raw.chapters.len());
    for raw_chapter in raw.chapters {
        let mut sections = Vec::with_capacity(raw_chapter.sections.len());
        for raw_section in raw_chapter.sections {
            sections.push(Section {
                anchor: raw_section.anchor,
                title: raw_section.title,
                units: convert_units(raw_section.articles, UnitKind::Article, &mut seen_anchors)?,
            });
        }
        chapters.push(Chapter {
            anchor: raw_chapter.anchor,
            title: raw_chapter.title,
            units: convert_units(raw_chapter.articles, UnitKind::Article, &mut seen_anchors)?,
            sections,
        });
    }

    let annexes = convert_units(raw.annexes, UnitKind::Annex, &mut seen_anchors)?;

    let footnotes = raw
        .footnotes
        .into_iter()
        .map(|raw| Footnote {
            id: raw.id,
            text: raw.text,
        })
        .collect();

    Ok(Document {
        title: raw.title,
        catalog,
        chapters,
        annexes,
        footnotes,
    })
}

fn convert_units(
    raw_units: Vec<RawUnit>,
    kind: UnitKind,
    seen_anchors: &mut BTreeSet<String>,
) -> ArtifactResult<Vec<ContentUnit>> {
    let mut units = Vec::with_capacity(raw_units.len());
    for raw in raw_units {
        units.push(convert_unit(raw, kind, seen_anchors)?);
    }
    Ok(units)
}

fn convert_unit(
    raw: RawUnit,
    kind: UnitKind,
    seen_anchors: &mut BTreeSet<String>,
) -> ArtifactResult<ContentUnit> {
    if raw.anchor.trim().is_empty() {
        return Err(DataIntegrityError::MissingField {
            anchor: raw.number.clone(),
            field: "anchor",
        }
        .into());
    }
    if raw.number.trim().is_empty() {
        return Err(DataIntegrityError::MissingField {
            anchor: raw.anchor.clone(),
            field: "number",
        }
        .into());
    }
    if raw.tags.is_empty() {
        return Err(DataIntegrityError::EmptyProvenanceSet.into());
    }
    if !seen_anchors.insert(raw.anchor.clone()) {
        return Err(DataIntegrityError::DuplicateAnchor(raw.anchor).into());
    }

    let provenance = raw.tags.into_iter().map(ProvenanceTag::new).collect();

    let mut body = Vec::with_capacity(raw.body.len());
    for raw_segment in raw.body {
        if raw_segment.kind == SegmentKind::Marker && raw_segment.tag.is_none() {
            return Err(DataIntegrityError::UntaggedMarker {
                anchor: raw.anchor.clone(),
            }
            .into());
        }
        body.push(Segment::new(
            raw_segment.kind,
            raw_segment.tag.map(ProvenanceTag::new),
            raw_segment.text,
        ));
    }

    Ok(ContentUnit {
        anchor: raw.anchor,
        number: raw.number,
        subtitle: raw.subtitle,
        kind,
        provenance,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_artifact, ArtifactError, DataIntegrityError};

    const MINIMAL: &str = r#"{
        "title": "Directive 2009/00/EC",
        "catalog": [
            {"tag": "L1", "label": "Base act"},
            {"tag": "L2", "label": "First amendment"}
        ],
        "chapters": [
            {
                "anchor": "chp-1",
                "title": "General provisions",
                "articles": [
                    {
                        "anchor": "art-1",
                        "number": "1",
                        "tags": ["L1"],
                        "body": [
                            {"kind": "label", "text": "Article 1"},
                            {"kind": "prose", "text": "Scope of this Directive."}
                        ]
                    }
                ]
            }
        ],
        "annexes": [
            {
                "anchor": "anx-1",
                "number": "I",
                "tags": ["L2"],
                "body": [{"kind": "prose", "text": "Annex body."}]
            }
        ],
        "footnotes": [{"id": "fn-1", "text": "OJ L 140, 5.6.2009."}]
    }"#;

    #[test]
    fn parses_minimal_artifact() {
        let document = parse_artifact(MINIMAL).unwrap();
        assert_eq!(document.title, "Directive 2009/00/EC");
        assert_eq!(document.unit_count(), 2);
        assert_eq!(document.catalog.len(), 2);
        assert_eq!(document.footnotes.len(), 1);
    }

    #[test]
    fn rejects_empty_provenance_set() {
        let text = MINIMAL.replace(r#""tags": ["L1"]"#, r#""tags": []"#);
        let err = parse_artifact(&text).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Integrity(DataIntegrityError::EmptyProvenanceSet)
        ));
    }

    #[test]
    fn rejects_duplicate_anchor() {
        let text = MINIMAL.replace("anx-1", "art-1");
        let err = parse_artifact(&text).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Integrity(DataIntegrityError::DuplicateAnchor(anchor)) if anchor == "art-1"
        ));
    }

    #[test]
    fn rejects_marker_segment_without_tag() {
        let text = MINIMAL.replace(
            r#"{"kind": "label", "text": "Article 1"}"#,
            r#"{"kind": "marker", "text": "M1"}"#,
        );
        let err = parse_artifact(&text).unwrap_err();
        assert!(matches!(
            err,
            ArtifactError::Integrity(DataIntegrityError::UntaggedMarker { .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_artifact("{not json"),
            Err(ArtifactError::Parse(_))
        ));
    }
}
