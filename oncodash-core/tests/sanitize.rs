use oncodash_core::{
    parse_lab_panel, parse_list, parse_progression, sanitize, sanitize_with, NormalizedField,
    RawField, MISSING_TEXT,
};

#[test]
fn placeholder_markers_are_missing() {
    for raw in ["nan", "NaN", "N/A", "n/a", "null", "NULL", "", "   "] {
        let field = sanitize(Some(raw));
        assert!(field.is_missing(), "{raw:?} should be missing");
        assert_eq!(field.display(), MISSING_TEXT);
    }
    assert!(sanitize(None).is_missing());
}

#[test]
fn genuine_values_pass_through_unchanged() {
    let field = sanitize(Some("Stage  IV  (bone)"));
    assert_eq!(field, NormalizedField::Present("Stage  IV  (bone)".to_string()));
    assert_eq!(field.value(), Some("Stage  IV  (bone)"));
}

#[test]
fn sanitize_is_idempotent() {
    for raw in ["nan", "", "PR", "  spaced  "] {
        let once = sanitize(Some(raw));
        let twice = sanitize(Some(once.value_or(raw)));
        assert_eq!(once, twice);
    }
}

#[test]
fn custom_sentinel_is_carried() {
    let field = sanitize_with(Some("nan"), "None detected");
    assert_eq!(field.display(), "None detected");
}

#[test]
fn pipe_lists_are_trimmed_and_pruned() {
    assert_eq!(
        parse_list(Some("EGFR | KRAS |  "), '|'),
        vec!["EGFR".to_string(), "KRAS".to_string()]
    );
    assert!(parse_list(Some("nan"), '|').is_empty());
    assert!(parse_list(None, '|').is_empty());
    // No dedup, order preserved.
    assert_eq!(
        parse_list(Some("b|a|b"), '|'),
        vec!["b".to_string(), "a".to_string(), "b".to_string()]
    );
}

#[test]
fn progression_splits_on_arrow() {
    let stage = parse_progression(Some("IIIA -> IVB")).expect("progression");
    assert_eq!(stage.from.as_deref(), Some("IIIA"));
    assert_eq!(stage.current, "IVB");
}

#[test]
fn progression_without_arrow_is_current_only() {
    let stage = parse_progression(Some("IVB")).expect("progression");
    assert_eq!(stage.from, None);
    assert_eq!(stage.current, "IVB");
}

#[test]
fn placeholder_progressions_drop_out() {
    assert!(parse_progression(Some("nan -> nan")).is_none());
    assert!(parse_progression(Some("nan")).is_none());
    assert!(parse_progression(None).is_none());

    let stage = parse_progression(Some("nan -> IVB")).expect("progression");
    assert_eq!(stage.from, None);
    assert_eq!(stage.current, "IVB");
}

#[test]
fn raw_field_resolves_both_shapes() {
    let scalar = RawField::Scalar("Liver | Bone".to_string());
    assert_eq!(
        scalar.items('|'),
        vec!["Liver".to_string(), "Bone".to_string()]
    );

    let list = RawField::List(vec![" Liver ".to_string(), String::new()]);
    assert_eq!(list.items('|'), vec!["Liver".to_string()]);

    assert!(RawField::Absent.items('|').is_empty());
    assert!(RawField::Absent.sanitize(MISSING_TEXT).is_missing());
}

#[test]
fn lab_panels_parse_both_encodings() {
    let squashed = parse_lab_panel(Some("Hb10.8 WBC3.4"));
    assert_eq!(squashed.len(), 2);
    assert_eq!(squashed[0].label, "Hb");
    assert_eq!(squashed[0].value, "10.8");
    assert_eq!(squashed[1].label, "WBC");
    assert_eq!(squashed[1].value, "3.4");

    let labeled = parse_lab_panel(Some("Sodium: 140|Potassium: 4.2"));
    assert_eq!(labeled.len(), 2);
    assert_eq!(labeled[0].label, "Sodium");
    assert_eq!(labeled[0].value, "140");
    assert_eq!(labeled[1].label, "Potassium");
    assert_eq!(labeled[1].value, "4.2");

    assert!(parse_lab_panel(Some("nan")).is_empty());
    let label_only = parse_lab_panel(Some("Pending"));
    assert_eq!(label_only[0].label, "Pending");
    assert_eq!(label_only[0].value, "");
}
