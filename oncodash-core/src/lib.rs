//! Core classification and normalization rules for the oncology dashboard.
//!
//! Everything in this crate is a pure mapping over its arguments. Upstream
//! record fields arrive as free text with mixed encodings and frequent gaps;
//! the rules here map them onto a small set of stable display states. No
//! function fails on malformed input: missing or unrecognized values degrade
//! to a typed default.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel shown wherever a field is absent or carries a placeholder value.
pub const MISSING_TEXT: &str = "Data Insufficient";

/// Tunable assembly defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Text standing in for missing values.
    pub missing_text: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            missing_text: MISSING_TEXT.to_string(),
        }
    }
}

/// A field after the missing-value check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NormalizedField {
    /// Carries the display sentinel it should render as.
    Missing(String),
    /// The raw value, unchanged.
    Present(String),
}

impl Default for NormalizedField {
    fn default() -> Self {
        Self::Missing(MISSING_TEXT.to_string())
    }
}

impl NormalizedField {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing(_))
    }

    /// Text to render: the value itself or the sentinel.
    pub fn display(&self) -> &str {
        match self {
            Self::Missing(placeholder) => placeholder,
            Self::Present(value) => value,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Missing(_) => None,
            Self::Present(value) => Some(value),
        }
    }

    pub fn value_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.value().unwrap_or(fallback)
    }
}

/// Upstream placeholders treated the same as an absent field.
const MISSING_MARKERS: [&str; 3] = ["nan", "n/a", "null"];

fn is_missing_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Decide whether a raw value counts as present, with the default sentinel.
pub fn sanitize(raw: Option<&str>) -> NormalizedField {
    sanitize_with(raw, MISSING_TEXT)
}

/// Decide whether a raw value counts as present.
///
/// Absent values, values that are empty after trimming and the literal
/// placeholders `nan`/`N/A`/`null` (any case) are missing. Everything else is
/// passed through unchanged, internal whitespace included.
pub fn sanitize_with(raw: Option<&str>, missing_text: &str) -> NormalizedField {
    match raw {
        Some(value) if !is_missing_marker(value) => NormalizedField::Present(value.to_string()),
        _ => NormalizedField::Missing(missing_text.to_string()),
    }
}

/// Shape of a raw record field, resolved once at the boundary.
///
/// The upstream register serves the same logical field as a string in one
/// record and a list in the next; adapters fold that into this variant so the
/// rules below only ever see one shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RawField {
    #[default]
    Absent,
    Scalar(String),
    List(Vec<String>),
}

impl RawField {
    /// The scalar payload, if this field holds one.
    pub fn scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn sanitize(&self, missing_text: &str) -> NormalizedField {
        match self {
            Self::Scalar(value) => sanitize_with(Some(value), missing_text),
            Self::List(items) if !items.is_empty() => {
                NormalizedField::Present(items.join(", "))
            }
            _ => NormalizedField::Missing(missing_text.to_string()),
        }
    }

    /// Items of a list-valued field; scalars go through the list parser.
    pub fn items(&self, delimiter: char) -> Vec<String> {
        match self {
            Self::Absent => Vec::new(),
            Self::Scalar(value) => parse_list(Some(value), delimiter),
            Self::List(items) => items
                .iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

/// Split a delimited field into trimmed, non-empty tokens.
///
/// Missing fields yield an empty list. Token order follows the input and
/// duplicates are kept.
pub fn parse_list(raw: Option<&str>, delimiter: char) -> Vec<String> {
    let Some(value) = raw else {
        return Vec::new();
    };
    if is_missing_marker(value) {
        return Vec::new();
    }
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// A two-stage progression such as a TNM stage moving from `IIIA` to `IVB`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StageProgression {
    pub from: Option<String>,
    pub current: String,
}

/// Parse an arrow-separated progression (`"A -> B"`).
///
/// Without an arrow the whole value is the current state. A side that is
/// itself a placeholder sanitizes away; when that leaves no current state the
/// progression as a whole is absent.
pub fn parse_progression(raw: Option<&str>) -> Option<StageProgression> {
    let value = sanitize(raw).value()?.to_string();
    let (from, current) = match value.split_once("->") {
        Some((left, right)) => (
            sanitize(Some(left)).value().map(|s| s.trim().to_string()),
            sanitize(Some(right)).value().map(|s| s.trim().to_string()),
        ),
        None => (None, Some(value.trim().to_string())),
    };
    current.map(|current| StageProgression { from, current })
}

/// Which keyword table the status classifier consults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    TreatmentResponse,
    RecurrenceStatus,
    Trend,
}

/// Coarse styling bucket for a classified status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

/// A status string mapped onto its canonical tag and display form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifiedStatus {
    /// Stable identifier, independent of the display label. Unrecognized
    /// values pass through here unchanged so callers can still show them.
    pub canonical_tag: String,
    pub display_label: String,
    pub severity: Severity,
}

/// Treatment response vocabulary: exact membership, declaration order.
const RESPONSE_TABLE: [(&[&str], &str, &str, Severity); 3] = [
    (
        &["pr", "partial response"],
        "PartialResponse",
        "PR (Partial Response)",
        Severity::Positive,
    ),
    (
        &["sd", "stable disease", "stable"],
        "StableDisease",
        "SD (Stable Disease)",
        Severity::Neutral,
    ),
    (
        &["pd", "progressive disease", "progressive"],
        "ProgressiveDisease",
        "PD (Progressive Disease)",
        Severity::Negative,
    ),
];

/// Recurrence vocabulary: substring containment, declaration order.
const RECURRENCE_TABLE: [(&[&str], &str, Severity); 2] = [
    (
        &["metastatic", "progressive"],
        "Metastatic/Progressive",
        Severity::Negative,
    ),
    (&["stable"], "Stable", Severity::Neutral),
];

/// Trend vocabulary: substring containment, declaration order.
const TREND_TABLE: [(&[&str], &str, Severity); 3] = [
    (&["improving"], "Improving", Severity::Positive),
    (&["stable"], "Stable", Severity::Neutral),
    (&["worsening", "progressive"], "Worsening", Severity::Negative),
];

/// Classify a status string with the default missing-value sentinel.
pub fn classify_status(category: StatusCategory, raw: Option<&str>) -> ClassifiedStatus {
    classify_status_with(category, raw, MISSING_TEXT)
}

/// Classify a status string against the category's ordered vocabulary.
///
/// Treatment responses match by exact set membership of the lowercased value;
/// recurrence and trend match by substring containment. The asymmetry is a
/// deliberate rule of the upstream vocabulary, not an accident. First match
/// wins; unrecognized values pass through rather than erroring.
pub fn classify_status_with(
    category: StatusCategory,
    raw: Option<&str>,
    missing_text: &str,
) -> ClassifiedStatus {
    let value = match sanitize_with(raw, missing_text) {
        NormalizedField::Missing(placeholder) => {
            return ClassifiedStatus {
                canonical_tag: "unknown".to_string(),
                display_label: placeholder,
                severity: Severity::Unknown,
            };
        }
        NormalizedField::Present(value) => value,
    };
    let lower = value.to_lowercase();

    match category {
        StatusCategory::TreatmentResponse => {
            for (synonyms, tag, label, severity) in RESPONSE_TABLE {
                if synonyms.contains(&lower.as_str()) {
                    return ClassifiedStatus {
                        canonical_tag: tag.to_string(),
                        display_label: label.to_string(),
                        severity,
                    };
                }
            }
            ClassifiedStatus {
                canonical_tag: value.clone(),
                display_label: value,
                severity: Severity::Unknown,
            }
        }
        StatusCategory::RecurrenceStatus => {
            for (keywords, tag, severity) in RECURRENCE_TABLE {
                if keywords.iter().any(|keyword| lower.contains(keyword)) {
                    return ClassifiedStatus {
                        canonical_tag: tag.to_string(),
                        display_label: value,
                        severity,
                    };
                }
            }
            ClassifiedStatus {
                canonical_tag: value.clone(),
                display_label: value,
                severity: Severity::Neutral,
            }
        }
        StatusCategory::Trend => {
            for (keywords, tag, severity) in TREND_TABLE {
                if keywords.iter().any(|keyword| lower.contains(keyword)) {
                    return ClassifiedStatus {
                        canonical_tag: tag.to_string(),
                        display_label: value,
                        severity,
                    };
                }
            }
            ClassifiedStatus {
                canonical_tag: "Unclassified".to_string(),
                display_label: value,
                severity: Severity::Unknown,
            }
        }
    }
}

/// One tested gene and its raw result string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneResult {
    pub gene: String,
    pub value: String,
}

/// Tested genes split into actionable drivers and the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverPartition {
    pub drivers: Vec<GeneResult>,
    pub others: Vec<GeneResult>,
}

/// Result strings that mean "nothing actionable found".
const NEGATIVE_RESULTS: [&str; 7] = [
    "negative",
    "not detected",
    "wt",
    "wild type",
    "nan",
    "none",
    "data insufficient",
];

fn is_driver_result(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    !lower.is_empty() && !NEGATIVE_RESULTS.contains(&lower.as_str())
}

/// Partition gene results into drivers and non-actionable findings.
///
/// This is a syntactic heuristic over the result text, not a clinical
/// judgment: any non-empty value outside the negative lexicon counts as a
/// driver. Input order is preserved in both halves.
pub fn partition_drivers<I>(genes: I) -> DriverPartition
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut partition = DriverPartition::default();
    for (gene, value) in genes {
        let result = GeneResult { gene, value };
        if is_driver_result(&result.value) {
            partition.drivers.push(result);
        } else {
            partition.others.push(result);
        }
    }
    partition
}

/// Canonical category of a timeline event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Diagnosis,
    Surgery,
    Biopsy,
    TreatmentStart,
    Scan,
    Generic,
}

/// Ordered keyword rules for event labels. Labels can contain several
/// keywords ("Surgical biopsy sample"); the first matching rule decides, so
/// the order here is part of the contract. Keywords are stems on purpose:
/// `surg` catches both "surgery" and "surgical".
const EVENT_RULES: [(&[&str], EventCategory); 5] = [
    (&["diagnos"], EventCategory::Diagnosis),
    (&["surg"], EventCategory::Surgery),
    (&["biops"], EventCategory::Biopsy),
    (&["treatment"], EventCategory::TreatmentStart),
    (&["scan", "mri", "ct"], EventCategory::Scan),
];

/// Map a free-text event label onto its canonical category.
pub fn classify_event(label: &str) -> EventCategory {
    let lower = label.to_lowercase();
    for (keywords, category) in EVENT_RULES {
        if keywords.iter().any(|keyword| lower.contains(keyword)) {
            return category;
        }
    }
    EventCategory::Generic
}

/// A date split into its display parts: `"Mar 12"` / `"2023"`.
///
/// Year-only and unparsable dates keep the raw text in `primary` with an
/// empty `secondary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateDisplay {
    pub primary: String,
    pub secondary: String,
}

fn parse_full_date(value: &str) -> Option<NaiveDate> {
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.date_naive())
        .ok()
}

/// Normalize a date string of mixed precision for display.
pub fn normalize_date(raw: &str) -> DateDisplay {
    let trimmed = raw.trim();
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return DateDisplay {
            primary: raw.to_string(),
            secondary: String::new(),
        };
    }

    match parse_full_date(trimmed) {
        Some(date) => DateDisplay {
            primary: date.format("%b %-d").to_string(),
            secondary: date.format("%Y").to_string(),
        },
        None => DateDisplay {
            primary: raw.to_string(),
            secondary: String::new(),
        },
    }
}

/// Chronological sort key for raw event dates.
///
/// Year-only events sort after every dated event of that year, so
/// "RUL lobectomy 2023" lands behind the 2023 scans that carry full dates.
/// Unparsable dates sort first.
pub fn event_sort_key(raw: &str) -> (i32, u32, u32) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return (0, 0, 0);
    }
    if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(year) = trimmed.parse::<i32>() {
            return (year, 13, 32);
        }
    }

    let mut parts = trimmed.split('-');
    let year = parts.next().and_then(|p| p.parse::<i32>().ok());
    let month = parts.next().and_then(|p| p.parse::<u32>().ok());
    let day = parts
        .next()
        .map(|p| p.split_whitespace().next().unwrap_or(p))
        .and_then(|p| p.parse::<u32>().ok());

    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        (Some(y), Some(m), None) => (y, m, 0),
        _ => (0, 0, 0),
    }
}

/// One labeled laboratory value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabValue {
    pub label: String,
    pub value: String,
}

/// Parse a compact lab panel string into labeled values.
///
/// Accepts `"Sodium: 140|Potassium: 4.2"` (pipe, semicolon or comma
/// separated) as well as the squashed `"Hb10.8 WBC3.4"` form, where the value
/// starts at the first digit.
pub fn parse_lab_panel(raw: Option<&str>) -> Vec<LabValue> {
    let Some(text) = raw else {
        return Vec::new();
    };
    if is_missing_marker(text) {
        return Vec::new();
    }

    let unified = text.replace([';', ','], "|");
    let mut parts: Vec<String> = unified.split('|').map(str::to_string).collect();
    if parts.len() == 1 && text.contains(' ') {
        parts = text.split_whitespace().map(str::to_string).collect();
    }

    let mut values = Vec::new();
    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((label, value)) = part.split_once(':') {
            values.push(LabValue {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            });
        } else if let Some(idx) = part.find(|c: char| c.is_ascii_digit()) {
            values.push(LabValue {
                label: part[..idx].trim().to_string(),
                value: part[idx..].trim().to_string(),
            });
        } else {
            values.push(LabValue {
                label: part.to_string(),
                value: String::new(),
            });
        }
    }
    values
}

/// Demographics and stage shown in the dashboard header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeaderPanel {
    pub name: String,
    pub age: Option<u32>,
    pub sex: NormalizedField,
    pub performance_status: NormalizedField,
    pub primary_diagnosis: NormalizedField,
    pub histology: NormalizedField,
    pub last_visit: DateDisplay,
    pub stage: Option<StageProgression>,
}

/// The four status cards plus tumor burden and radiology findings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiseaseStatusPanel {
    pub treatment_response: ClassifiedStatus,
    pub recurrence_status: ClassifiedStatus,
    pub imaging_trend: ClassifiedStatus,
    pub longitudinal_trend: ClassifiedStatus,
    pub metastatic_status: NormalizedField,
    pub metastatic_sites: Vec<String>,
    pub new_lesions: NormalizedField,
    pub lesion_burden: NormalizedField,
    pub radiology_findings: Vec<String>,
    pub report_link: NormalizedField,
}

/// One event on the disease and treatment timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub category: EventCategory,
    pub label: String,
    pub date: DateDisplay,
    pub description: NormalizedField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreatmentPanel {
    pub current_line: NormalizedField,
    pub prior_therapies: NormalizedField,
    pub reason_for_change: NormalizedField,
    pub regimen: NormalizedField,
    pub plan_summary: NormalizedField,
    pub disease_course: NormalizedField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganRiskPanel {
    pub renal_function: String,
    pub hepatic_function: String,
    pub lab_abnormalities: Vec<String>,
    pub lab_trend: NormalizedField,
    pub toxicities: Vec<String>,
    pub pathology_uncertainty: NormalizedField,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ComorbidityPanel {
    pub active_conditions: Vec<String>,
    pub smoking_history: NormalizedField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathologySection {
    pub summary: NormalizedField,
    pub grade: NormalizedField,
    pub margins: NormalizedField,
    pub features: Vec<String>,
    pub keywords: Vec<String>,
    pub ihc_markers: NormalizedField,
    pub report_count: NormalizedField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenomicsSection {
    pub mutations: DriverPartition,
    pub pdl1: NormalizedField,
    pub tmb: NormalizedField,
    pub msi: NormalizedField,
    pub ctdna: NormalizedField,
    pub new_mutations: NormalizedField,
    pub actionable_summary: NormalizedField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BiomarkerSection {
    pub trend: ClassifiedStatus,
    pub longitudinal_trend: ClassifiedStatus,
    pub cea: NormalizedField,
    pub ca19_9: NormalizedField,
    pub other_markers: NormalizedField,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LabSection {
    pub cbc: Vec<LabValue>,
    pub cmp: Vec<LabValue>,
    pub electrolytes: Vec<LabValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSection {
    pub pathology_report: NormalizedField,
    pub radiology_report: NormalizedField,
    pub genomic_report: NormalizedField,
    pub provider_notes: NormalizedField,
}

/// Detailed clinical evidence accordion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvidencePanel {
    pub pathology: PathologySection,
    pub genomics: GenomicsSection,
    pub biomarkers: BiomarkerSection,
    pub labs: LabSection,
    pub documents: DocumentSection,
}

/// The fully assembled per-patient view model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSnapshot {
    pub generated_at: DateTime<Utc>,
    pub header: HeaderPanel,
    pub disease_status: DiseaseStatusPanel,
    pub timeline: Vec<TimelineEntry>,
    pub treatment: TreatmentPanel,
    pub organ_risk: OrganRiskPanel,
    pub comorbidities: ComorbidityPanel,
    pub evidence: EvidencePanel,
}

impl PatientSnapshot {
    /// Events in chronological order, as assembled.
    pub fn timeline(&self) -> &[TimelineEntry] {
        &self.timeline
    }

    /// Gene results classified as actionable drivers.
    pub fn drivers(&self) -> &[GeneResult] {
        &self.evidence.genomics.mutations.drivers
    }
}

/// Boundary error for the record adapter. The classification rules above
/// never fail; only malformed record payloads surface here.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("record payload is missing required structure")]
    MissingData,
    #[error("could not read record: {0}")]
    Parse(String),
    #[error("dashboard error: {0}")]
    Other(String),
}
