use oncodash_core::{classify_event, event_sort_key, normalize_date, EventCategory};

#[test]
fn labels_resolve_in_priority_order() {
    assert_eq!(classify_event("Diagnosis"), EventCategory::Diagnosis);
    assert_eq!(classify_event("Surgery"), EventCategory::Surgery);
    assert_eq!(classify_event("Biopsy"), EventCategory::Biopsy);
    assert_eq!(classify_event("Treatment start"), EventCategory::TreatmentStart);
    assert_eq!(classify_event("Brain MRI"), EventCategory::Scan);
    assert_eq!(classify_event("PET/CT"), EventCategory::Scan);
    assert_eq!(classify_event("Follow-up visit"), EventCategory::Generic);
}

#[test]
fn multi_keyword_labels_take_the_first_rule() {
    // Surgery is checked before biopsy, and the stem also covers "surgical".
    assert_eq!(
        classify_event("Surgical biopsy follow-up"),
        EventCategory::Surgery
    );
    assert_eq!(
        classify_event("CT-guided biopsy of diagnosis site"),
        EventCategory::Diagnosis
    );
}

#[test]
fn full_dates_split_into_display_parts() {
    let date = normalize_date("2023-03-12");
    assert_eq!(date.primary, "Mar 12");
    assert_eq!(date.secondary, "2023");

    let date = normalize_date("2024-11-03");
    assert_eq!(date.primary, "Nov 3");
    assert_eq!(date.secondary, "2024");
}

#[test]
fn year_only_dates_keep_the_raw_year() {
    let date = normalize_date("2023");
    assert_eq!(date.primary, "2023");
    assert_eq!(date.secondary, "");
}

#[test]
fn unparsable_dates_pass_through() {
    let date = normalize_date("not-a-date");
    assert_eq!(date.primary, "not-a-date");
    assert_eq!(date.secondary, "");

    let date = normalize_date("");
    assert_eq!(date.primary, "");
    assert_eq!(date.secondary, "");
}

#[test]
fn year_only_events_sort_after_dated_events_of_that_year() {
    let year_only = event_sort_key("2023");
    let december = event_sort_key("2023-12-31");
    let next_year = event_sort_key("2024-01-01");

    assert!(year_only > december);
    assert!(year_only < next_year);
}

#[test]
fn sort_keys_fall_back_gracefully() {
    assert_eq!(event_sort_key(""), (0, 0, 0));
    assert_eq!(event_sort_key("soon"), (0, 0, 0));
    assert_eq!(event_sort_key("2023-04"), (2023, 4, 0));
    assert_eq!(event_sort_key("2023-04-09"), (2023, 4, 9));
}
