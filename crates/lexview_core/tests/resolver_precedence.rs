use lexview_core::{provenance_set, ProvenanceSet, ProvenanceTag, TagCatalog};

fn catalog() -> TagCatalog {
    TagCatalog::new(vec![
        (ProvenanceTag::new("L1"), "Base act".to_string()),
        (ProvenanceTag::new("L2"), "First amendment".to_string()),
        (ProvenanceTag::new("L3"), "Second amendment".to_string()),
        (ProvenanceTag::new("COVID"), "Pandemic corrigendum".to_string()),
        (ProvenanceTag::new("L4"), "Third amendment".to_string()),
    ])
}

#[test]
fn primary_follows_catalog_precedence_examples() {
    let catalog = catalog();
    assert_eq!(
        catalog
            .primary(&provenance_set(["L4", "L2"]))
            .unwrap()
            .as_str(),
        "L2"
    );
    assert_eq!(
        catalog
            .primary(&provenance_set(["COVID", "L1"]))
            .unwrap()
            .as_str(),
        "L1"
    );
    assert_eq!(
        catalog
            .primary(&provenance_set(["L4", "COVID"]))
            .unwrap()
            .as_str(),
        "COVID"
    );
}

#[test]
fn primary_is_invariant_under_insertion_order() {
    let catalog = catalog();
    let tags = ["L4", "COVID", "L2", "unknown-x"];

    let mut expected: Option<String> = None;
    // Insert in every rotation of the source order; the marker order in the
    // source content is arbitrary and must not leak into the result.
    for rotation in 0..tags.len() {
        let mut set = ProvenanceSet::new();
        for offset in 0..tags.len() {
            let tag = tags[(rotation + offset) % tags.len()];
            set.insert(ProvenanceTag::new(tag));
        }
        let primary = catalog.primary(&set).unwrap().as_str().to_string();
        match &expected {
            Some(previous) => assert_eq!(previous, &primary),
            None => expected = Some(primary),
        }
    }
    assert_eq!(expected.as_deref(), Some("L2"));
}

#[test]
fn catalog_tag_always_beats_unknown_tags() {
    let catalog = catalog();
    let set = provenance_set(["zz-regional", "aa-regional", "L4"]);
    assert_eq!(catalog.primary(&set).unwrap().as_str(), "L4");
}

#[test]
fn unknown_only_sets_resolve_stably() {
    let catalog = catalog();
    let a = catalog
        .primary(&provenance_set(["zz-regional", "aa-regional"]))
        .unwrap()
        .as_str()
        .to_string();
    let b = catalog
        .primary(&provenance_set(["aa-regional", "zz-regional"]))
        .unwrap()
        .as_str()
        .to_string();
    assert_eq!(a, b);
    assert_eq!(a, "aa-regional");
}
