use lexview_core::{
    parse_artifact, provenance_set, Direction, DocumentSession, ScrollCommand, SearchOutcome,
    Segment, StackedLayout,
};

const ARTIFACT: &str = r#"{
    "title": "Directive (consolidated)",
    "catalog": [
        {"tag": "L1", "label": "Base act"},
        {"tag": "L2", "label": "First amendment"}
    ],
    "chapters": [
        {
            "anchor": "chp-1",
            "title": "Chapter I",
            "articles": [
                {"anchor": "art-1", "number": "1", "tags": ["L1"], "body": [
                    {"kind": "label", "text": "Article 1 rate"},
                    {"kind": "prose", "text": "This Directive establishes a framework."}
                ]},
                {"anchor": "art-2", "number": "2", "tags": ["L2"], "body": [
                    {"kind": "marker", "tag": "L2", "text": "rate marker"},
                    {"kind": "prose", "text": "the rate shall be 10% the rate"}
                ]},
                {"anchor": "art-3", "number": "3", "tags": ["L1", "L2"], "body": [
                    {"kind": "prose", "text": "Common provisions on the rate of reduction."},
                    {"kind": "prose", "tag": "L2", "text": "Amended rate sub-paragraph."}
                ]}
            ]
        }
    ],
    "annexes": [
        {"anchor": "anx-1", "number": "I", "tags": ["L2"], "body": [
            {"kind": "prose", "text": "Technical annex on rate tables."}
        ]}
    ]
}"#;

fn session() -> DocumentSession<StackedLayout> {
    let document = parse_artifact(ARTIFACT).unwrap();
    DocumentSession::new(document, StackedLayout::new(10.0, 40.0)).unwrap()
}

fn bodies(session: &DocumentSession<StackedLayout>) -> Vec<Vec<Segment>> {
    session
        .document()
        .units()
        .map(|unit| unit.body.clone())
        .collect()
}

fn texts(session: &DocumentSession<StackedLayout>) -> Vec<String> {
    session
        .document()
        .units()
        .flat_map(|unit| unit.body.iter().map(|segment| segment.text()))
        .collect()
}

#[test]
fn search_counts_matches_in_document_order_excluding_decorations() {
    let mut session = session();
    // "rate" occurs in a label and a marker too; only prose may match:
    // art-2 twice, art-3 twice (main + sub-paragraph), anx-1 once.
    assert_eq!(session.search("rate"), SearchOutcome::Applied { total: 5 });
    assert_eq!(session.match_counters(), (1, 5));

    // The per-segment highlight runs account for every match exactly once.
    let highlighted: usize = session
        .document()
        .units()
        .flat_map(|unit| unit.body.iter())
        .map(Segment::highlight_count)
        .sum();
    assert_eq!(highlighted, 5);
}

#[test]
fn short_or_empty_query_is_ignored_without_scanning() {
    let mut session = session();
    assert_eq!(session.search(""), SearchOutcome::TooShort);
    assert_eq!(session.search("r"), SearchOutcome::TooShort);
    assert_eq!(session.match_counters(), (0, 0));
}

#[test]
fn search_then_clear_restores_exact_original_text() {
    let mut session = session();
    let before = texts(&session);
    let shape_before = bodies(&session);

    session.search("rate");
    assert_eq!(texts(&session), before);

    session.clear_search();
    assert_eq!(bodies(&session), shape_before);
    assert_eq!(session.match_counters(), (0, 0));
}

#[test]
fn new_search_supersedes_the_previous_one() {
    let mut session = session();
    session.search("rate");
    let after_reformulation = {
        session.search("annex");
        bodies(&session)
    };

    let mut fresh = self::session();
    fresh.search("annex");
    assert_eq!(bodies(&fresh), after_reformulation);
}

#[test]
fn navigation_wraps_around_in_both_directions() {
    let mut session = session();
    session.search("rate");
    assert_eq!(session.match_counters(), (1, 5));

    for expected in [2, 3, 4, 5, 1] {
        let (current, total) = session.navigate(Direction::Forward).unwrap();
        assert_eq!((current, total), (expected, 5));
    }

    let (current, _) = session.navigate(Direction::Backward).unwrap();
    assert_eq!(current, 5);
}

#[test]
fn backward_from_first_match_wraps_to_last() {
    let document = parse_artifact(
        r#"{
            "title": "Mini",
            "catalog": [{"tag": "L1", "label": "Base act"}],
            "chapters": [
                {"anchor": "chp-1", "title": "Chapter I", "articles": [
                    {"anchor": "art-1", "number": "1", "tags": ["L1"], "body": [
                        {"kind": "prose", "text": "the rate shall be 10% the rate"}
                    ]}
                ]}
            ]
        }"#,
    )
    .unwrap();
    let mut session = DocumentSession::new(document, StackedLayout::new(10.0, 40.0)).unwrap();

    assert_eq!(session.search("rate"), SearchOutcome::Applied { total: 2 });
    let (current, total) = session.navigate(Direction::Backward).unwrap();
    assert_eq!((current, total), (2, 2));
}

#[test]
fn navigate_with_no_matches_is_a_no_op() {
    let mut session = session();
    assert!(session.navigate(Direction::Forward).is_none());
    session.search("no such phrase");
    assert!(session.navigate(Direction::Forward).is_none());
}

#[test]
fn filtered_out_units_are_not_searched() {
    let mut session = session();
    session.apply_filter(provenance_set(["L1"]));
    // art-2 and anx-1 are hidden; art-3's L2 sub-paragraph is hidden too.
    assert_eq!(session.search("rate"), SearchOutcome::Applied { total: 1 });
}

#[test]
fn first_match_is_revealed_with_an_animated_scroll() {
    let mut session = session();
    session.host_mut().scroll_to(0.0);
    session.search("annex");
    assert!(matches!(
        session.host().last_command,
        Some(ScrollCommand::Animated { .. })
    ));
}

#[test]
fn search_expands_the_collapsed_containing_unit() {
    let mut session = session();
    assert!(session.set_collapsed("anx-1", true));

    session.search("annex");

    let anx_1 = session.arena().by_anchor("anx-1").unwrap();
    assert!(!session.arena().get(anx_1).collapsed);
}

#[test]
fn navigation_expands_each_visited_unit() {
    let mut session = session();
    session.search("rate");
    session.set_collapsed("art-3", true);

    // Matches 1 and 2 live in art-2; match 3 is the first in art-3.
    session.navigate(Direction::Forward);
    session.navigate(Direction::Forward);

    let art_3 = session.arena().by_anchor("art-3").unwrap();
    assert!(!session.arena().get(art_3).collapsed);
}
