use oncodash_core::{
    classify_status, classify_status_with, partition_drivers, Severity, StatusCategory,
    MISSING_TEXT,
};

#[test]
fn response_abbreviations_expand() {
    let status = classify_status(StatusCategory::TreatmentResponse, Some("pr"));
    assert_eq!(status.canonical_tag, "PartialResponse");
    assert_eq!(status.display_label, "PR (Partial Response)");
    assert_eq!(status.severity, Severity::Positive);

    let status = classify_status(StatusCategory::TreatmentResponse, Some("Stable Disease"));
    assert_eq!(status.canonical_tag, "StableDisease");
    assert_eq!(status.display_label, "SD (Stable Disease)");
    assert_eq!(status.severity, Severity::Neutral);

    let status = classify_status(StatusCategory::TreatmentResponse, Some("PD"));
    assert_eq!(status.canonical_tag, "ProgressiveDisease");
    assert_eq!(status.severity, Severity::Negative);
}

#[test]
fn response_matching_is_exact_not_substring() {
    // "partial response to therapy" is not in the synonym set, so it passes
    // through unchanged rather than matching PartialResponse.
    let status = classify_status(
        StatusCategory::TreatmentResponse,
        Some("partial response to therapy"),
    );
    assert_eq!(status.canonical_tag, "partial response to therapy");
    assert_eq!(status.display_label, "partial response to therapy");
    assert_eq!(status.severity, Severity::Unknown);
}

#[test]
fn recurrence_matches_by_substring() {
    let status = classify_status(
        StatusCategory::RecurrenceStatus,
        Some("Metastatic disease, new sites"),
    );
    assert_eq!(status.canonical_tag, "Metastatic/Progressive");
    assert_eq!(status.severity, Severity::Negative);
    assert_eq!(status.display_label, "Metastatic disease, new sites");

    let status = classify_status(StatusCategory::RecurrenceStatus, Some("currently stable"));
    assert_eq!(status.canonical_tag, "Stable");
    assert_eq!(status.severity, Severity::Neutral);

    // Unmatched recurrence values stay neutral, tag passes through.
    let status = classify_status(StatusCategory::RecurrenceStatus, Some("NED"));
    assert_eq!(status.canonical_tag, "NED");
    assert_eq!(status.severity, Severity::Neutral);
}

#[test]
fn trend_matches_by_substring() {
    let status = classify_status(StatusCategory::Trend, Some("Slightly Worsening Nodules"));
    assert_eq!(status.canonical_tag, "Worsening");
    assert_eq!(status.severity, Severity::Negative);

    let status = classify_status(StatusCategory::Trend, Some("improving on therapy"));
    assert_eq!(status.canonical_tag, "Improving");
    assert_eq!(status.severity, Severity::Positive);

    let status = classify_status(StatusCategory::Trend, Some("mixed picture"));
    assert_eq!(status.canonical_tag, "Unclassified");
    assert_eq!(status.severity, Severity::Unknown);
    assert_eq!(status.display_label, "mixed picture");
}

#[test]
fn missing_statuses_report_unknown() {
    for raw in [None, Some("nan"), Some("  ")] {
        let status = classify_status(StatusCategory::TreatmentResponse, raw);
        assert_eq!(status.canonical_tag, "unknown");
        assert_eq!(status.display_label, MISSING_TEXT);
        assert_eq!(status.severity, Severity::Unknown);
    }

    let status = classify_status_with(StatusCategory::Trend, Some("N/A"), "No trend data");
    assert_eq!(status.display_label, "No trend data");
}

#[test]
fn drivers_partition_preserves_order() {
    let partition = partition_drivers([
        ("KRAS".to_string(), "G12C".to_string()),
        ("TP53".to_string(), "Wild Type".to_string()),
        ("EGFR".to_string(), String::new()),
    ]);

    assert_eq!(partition.drivers.len(), 1);
    assert_eq!(partition.drivers[0].gene, "KRAS");
    assert_eq!(partition.drivers[0].value, "G12C");

    assert_eq!(partition.others.len(), 2);
    assert_eq!(partition.others[0].gene, "TP53");
    assert_eq!(partition.others[0].value, "Wild Type");
    assert_eq!(partition.others[1].gene, "EGFR");
}

#[test]
fn negative_lexicon_is_case_insensitive() {
    let partition = partition_drivers([
        ("ALK".to_string(), "NOT DETECTED".to_string()),
        ("ROS1".to_string(), " negative ".to_string()),
        ("BRAF".to_string(), "V600E".to_string()),
        ("RET".to_string(), "Data Insufficient".to_string()),
    ]);

    assert_eq!(partition.drivers.len(), 1);
    assert_eq!(partition.drivers[0].gene, "BRAF");
    assert_eq!(partition.others.len(), 3);
}
