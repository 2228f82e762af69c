//! Patient record JSON to `PatientSnapshot` assembler.
//!
//! The upstream register serves one JSON object per patient, keyed by its
//! column names (`Response`, `Recurrence_Status`, `EGFR`, ...). Every field is
//! resolved into a [`RawField`] once, then routed through the classification
//! core; the assembler itself holds no missing-value rules of its own.

use chrono::{NaiveDate, Utc};
use serde_json::Value;

use oncodash_core::{
    classify_event, classify_status_with, event_sort_key, normalize_date, parse_lab_panel,
    parse_list, parse_progression, partition_drivers, sanitize_with, BiomarkerSection,
    ClassifiedStatus, ComorbidityPanel, DashboardConfig, DashboardError, DiseaseStatusPanel,
    DocumentSection, EvidencePanel, GenomicsSection, HeaderPanel, LabSection, NormalizedField,
    OrganRiskPanel, PathologySection, PatientSnapshot, RawField, StatusCategory, TimelineEntry,
    TreatmentPanel,
};

/// Gene panel reported by the upstream register, in its column order.
const GENE_PANEL: [&str; 9] = [
    "EGFR",
    "ALK",
    "ROS1",
    "KRAS",
    "BRAF",
    "MET_Exon14",
    "RET",
    "HER2",
    "NTRK",
];

/// Assemble a snapshot from a JSON string.
pub fn assemble_record_str(
    record_json: &str,
    config: &DashboardConfig,
) -> Result<PatientSnapshot, DashboardError> {
    let value: Value =
        serde_json::from_str(record_json).map_err(|err| DashboardError::Parse(err.to_string()))?;
    assemble_record_value(&value, config)
}

/// Assemble a snapshot from a `serde_json::Value`.
pub fn assemble_record_value(
    record: &Value,
    config: &DashboardConfig,
) -> Result<PatientSnapshot, DashboardError> {
    if !record.is_object() {
        return Err(DashboardError::MissingData);
    }

    Ok(PatientSnapshot {
        generated_at: Utc::now(),
        header: build_header(record, config),
        disease_status: build_disease_status(record, config),
        timeline: build_timeline(record, config),
        treatment: build_treatment(record, config),
        organ_risk: build_organ_risk(record, config),
        comorbidities: build_comorbidities(record, config),
        evidence: build_evidence(record, config),
    })
}

fn raw_field(record: &Value, key: &str) -> RawField {
    match record.get(key) {
        None | Some(Value::Null) => RawField::Absent,
        Some(Value::String(text)) => RawField::Scalar(text.clone()),
        Some(Value::Number(number)) => RawField::Scalar(number.to_string()),
        Some(Value::Bool(flag)) => RawField::Scalar(flag.to_string()),
        Some(Value::Array(items)) => RawField::List(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect(),
        ),
        Some(other) => RawField::Scalar(other.to_string()),
    }
}

fn scalar_of(record: &Value, key: &str) -> Option<String> {
    match raw_field(record, key) {
        RawField::Scalar(value) => Some(value),
        _ => None,
    }
}

fn field(record: &Value, key: &str, config: &DashboardConfig) -> NormalizedField {
    raw_field(record, key).sanitize(&config.missing_text)
}

fn items_of(record: &Value, key: &str) -> Vec<String> {
    raw_field(record, key).items('|')
}

fn status_of(
    record: &Value,
    key: &str,
    category: StatusCategory,
    config: &DashboardConfig,
) -> ClassifiedStatus {
    let value = scalar_of(record, key);
    classify_status_with(category, value.as_deref(), &config.missing_text)
}

fn present_scalar(record: &Value, key: &str) -> Option<String> {
    scalar_of(record, key)
        .and_then(|value| sanitize_with(Some(&value), "").value().map(str::to_string))
}

fn build_header(record: &Value, config: &DashboardConfig) -> HeaderPanel {
    let age = record
        .get("Age")
        .and_then(Value::as_u64)
        .map(|age| age as u32)
        .or_else(|| present_scalar(record, "Age").and_then(|raw| raw.trim().parse().ok()));

    // The register joins the initial and current TNM stage with an arrow.
    let initial = present_scalar(record, "Initial_TNM_Stage");
    let current = present_scalar(record, "Current_TNM_Stage");
    let stage_raw = match (&initial, &current) {
        (None, None) => None,
        (a, b) => Some(format!(
            "{} -> {}",
            a.as_deref().unwrap_or_default(),
            b.as_deref().unwrap_or_default()
        )),
    };
    let stage = parse_progression(stage_raw.as_deref());

    HeaderPanel {
        name: present_scalar(record, "Name").unwrap_or_default(),
        age,
        sex: field(record, "Sex", config),
        performance_status: field(record, "Performance_Status", config),
        primary_diagnosis: field(record, "Primary_Diagnosis", config),
        histology: field(record, "Histologic_Type", config),
        last_visit: normalize_date(&present_scalar(record, "Last_Encounter_Date").unwrap_or_default()),
        stage,
    }
}

fn build_disease_status(record: &Value, config: &DashboardConfig) -> DiseaseStatusPanel {
    // Treatment response may live in either column; the first present wins.
    let response = present_scalar(record, "Response").or_else(|| present_scalar(record, "RECIST"));

    DiseaseStatusPanel {
        treatment_response: classify_status_with(
            StatusCategory::TreatmentResponse,
            response.as_deref(),
            &config.missing_text,
        ),
        recurrence_status: status_of(
            record,
            "Recurrence_Status",
            StatusCategory::RecurrenceStatus,
            config,
        ),
        imaging_trend: status_of(record, "Radiology_Trend", StatusCategory::Trend, config),
        longitudinal_trend: status_of(
            record,
            "Radiology_Trends_Longitudinal",
            StatusCategory::Trend,
            config,
        ),
        metastatic_status: field(record, "Metastatic_Status", config),
        metastatic_sites: items_of(record, "Metastatic_Sites"),
        new_lesions: field(record, "New_Lesions", config),
        lesion_burden: field(record, "Lesion_Count_Size", config),
        radiology_findings: items_of(record, "Radiology_Keywords"),
        report_link: field(record, "Radiology_Links", config),
    }
}

/// Collects events along with their raw dates so the chronological sort can
/// run on the original strings rather than the display form.
struct TimelineBuilder<'a> {
    config: &'a DashboardConfig,
    events: Vec<(String, TimelineEntry)>,
}

impl<'a> TimelineBuilder<'a> {
    fn new(config: &'a DashboardConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
        }
    }

    fn push(&mut self, raw_date: &str, label: &str, description: Option<String>) {
        let entry = TimelineEntry {
            category: classify_event(label),
            label: label.to_string(),
            date: normalize_date(raw_date),
            description: sanitize_with(description.as_deref(), &self.config.missing_text),
        };
        self.events.push((raw_date.to_string(), entry));
    }

    /// A scan field packs `"YYYY-MM-DD free text"` into one value; the first
    /// token is the date, the remainder the finding.
    fn push_scan(&mut self, raw: &str, label: &str) {
        let date = raw.split_whitespace().next().unwrap_or("").to_string();
        let mut description = raw
            .get(10..)
            .map(|rest| rest.trim_matches([' ', '-', ':']).to_string())
            .unwrap_or_default();
        if description.is_empty() {
            description = label.to_string();
        }
        if !description.to_lowercase().contains(&label.to_lowercase()) {
            description = format!("{label} - {description}");
        }
        self.push(&date, label, Some(description));
    }

    fn finish(mut self) -> Vec<TimelineEntry> {
        self.events
            .sort_by_key(|(raw_date, _)| event_sort_key(raw_date));
        self.events.into_iter().map(|(_, entry)| entry).collect()
    }
}

/// Rewrite a day-first date (`DD-MM-YYYY`) to ISO; other shapes keep their
/// first token unchanged.
fn normalize_day_first(value: &str) -> String {
    let token = value.split_whitespace().next().unwrap_or(value);
    match NaiveDate::parse_from_str(token, "%d-%m-%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => token.to_string(),
    }
}

fn build_timeline(record: &Value, config: &DashboardConfig) -> Vec<TimelineEntry> {
    let mut builder = TimelineBuilder::new(config);

    if let Some(raw) = present_scalar(record, "Diagnosis_Date") {
        builder.push(
            &normalize_day_first(&raw),
            "Diagnosis",
            present_scalar(record, "Primary_Diagnosis"),
        );
    }

    if let Some(raw) = present_scalar(record, "Biopsy_Date") {
        let description =
            present_scalar(record, "Biopsy_Site").map(|site| format!("Site: {site}"));
        builder.push(&normalize_day_first(&raw), "Biopsy", description);
    }

    for (key, label) in [
        ("Latest_Brain_MRI", "Brain MRI"),
        ("Latest_PET_CT", "PET/CT"),
        ("Latest_CT_Chest", "CT Chest"),
    ] {
        if let Some(raw) = present_scalar(record, key) {
            builder.push_scan(&raw, label);
        }
    }

    // Surgery arrives as free text with an optional trailing year, e.g.
    // "RUL lobectomy 2023".
    if let Some(raw) = present_scalar(record, "Surgery") {
        let parts: Vec<&str> = raw.split_whitespace().collect();
        match parts.split_last() {
            Some((last, rest))
                if last.len() == 4 && last.chars().all(|c| c.is_ascii_digit()) =>
            {
                builder.push(last, "Surgery", Some(rest.join(" ")));
            }
            _ => builder.push("", "Surgery", Some(raw)),
        }
    }

    if let Some(raw) = present_scalar(record, "Treatment_Dates") {
        let start = raw.split_whitespace().next().unwrap_or("");
        if start.len() >= 10 {
            let mut parts = Vec::new();
            if let Some(regimen) = present_scalar(record, "Regimen") {
                parts.push(regimen.trim().to_string());
            }
            if let Some(line) = present_scalar(record, "Current_Line") {
                parts.push(format!("(Line {})", line.trim()));
            }
            let mut description = parts.join(" ");
            if let Some(timeline) = present_scalar(record, "Treatment_Response_Timeline") {
                description.push('\n');
                description.push_str(&timeline);
            }
            builder.push(start, "Treatment start", Some(description));
        }
    }

    builder.finish()
}

fn build_treatment(record: &Value, config: &DashboardConfig) -> TreatmentPanel {
    TreatmentPanel {
        current_line: field(record, "Current_Line", config),
        prior_therapies: field(record, "Prior_Therapies", config),
        reason_for_change: field(record, "Reason_For_Change", config),
        regimen: field(record, "Regimen", config),
        plan_summary: field(record, "Treatment_Plan_Summary", config),
        disease_course: field(record, "Disease_Course_Summary", config),
    }
}

fn organ_function(record: &Value, key: &str) -> String {
    let flagged = scalar_of(record, key)
        .map(|value| value.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false);
    if flagged { "Abnormal" } else { "Preserved" }.to_string()
}

fn build_organ_risk(record: &Value, config: &DashboardConfig) -> OrganRiskPanel {
    OrganRiskPanel {
        renal_function: organ_function(record, "Renal_Flag"),
        hepatic_function: organ_function(record, "Liver_Flag"),
        lab_abnormalities: items_of(record, "Abnormal_Labs"),
        lab_trend: field(record, "Lab_Flag_Trend", config),
        toxicities: items_of(record, "Toxicities"),
        pathology_uncertainty: field(record, "Ambiguous_Pathology", config),
    }
}

/// A comorbidity column is active unless missing or an explicit negation.
fn active_comorbidity(record: &Value, key: &str) -> Option<String> {
    let value = present_scalar(record, key)?;
    let lower = value.trim().to_lowercase();
    if lower == "no" || lower == "none" {
        return None;
    }
    Some(value.trim().to_string())
}

fn build_comorbidities(record: &Value, config: &DashboardConfig) -> ComorbidityPanel {
    let mut active = Vec::new();
    if let Some(value) = active_comorbidity(record, "Diabetes") {
        active.push(format!("Diabetes {value}"));
    }
    if active_comorbidity(record, "Hypertension").is_some() {
        active.push("Hypertension".to_string());
    }
    if active_comorbidity(record, "Heart_Disease").is_some() {
        active.push("Heart Disease".to_string());
    }
    if let Some(value) = active_comorbidity(record, "COPD_Asthma") {
        active.push(value);
    }
    if let Some(value) = active_comorbidity(record, "Other_Comorbidities") {
        active.push(value);
    }

    ComorbidityPanel {
        active_conditions: active,
        smoking_history: field(record, "Smoking_Status", config),
    }
}

fn build_evidence(record: &Value, config: &DashboardConfig) -> EvidencePanel {
    let mutations = partition_drivers(GENE_PANEL.iter().map(|gene| {
        (
            (*gene).to_string(),
            scalar_of(record, gene).unwrap_or_default(),
        )
    }));

    EvidencePanel {
        pathology: PathologySection {
            summary: field(record, "Pathology_Diagnosis_Text", config),
            grade: field(record, "Tumor_Grade", config),
            margins: field(record, "Margin_Status", config),
            features: items_of(record, "Histopathologic_Features"),
            keywords: parse_list(scalar_of(record, "Pathology_Keywords").as_deref(), '|'),
            ihc_markers: field(record, "IHC_Markers", config),
            report_count: field(record, "Num_Pathology_Reports", config),
        },
        genomics: GenomicsSection {
            mutations,
            pdl1: field(record, "PDL1_Percent", config),
            tmb: field(record, "TMB", config),
            msi: field(record, "MSI", config),
            ctdna: field(record, "ctDNA_Findings", config),
            new_mutations: field(record, "New_Mutations", config),
            actionable_summary: field(record, "Actionable_Mutation_Summary", config),
        },
        biomarkers: BiomarkerSection {
            trend: status_of(record, "Biomarker_Trend", StatusCategory::Trend, config),
            longitudinal_trend: status_of(
                record,
                "Biomarker_Trends_Longitudinal",
                StatusCategory::Trend,
                config,
            ),
            cea: field(record, "CEA", config),
            ca19_9: field(record, "CA19_9", config),
            other_markers: field(record, "Other_Tumor_Markers", config),
        },
        labs: LabSection {
            cbc: parse_lab_panel(scalar_of(record, "CBC").as_deref()),
            cmp: parse_lab_panel(scalar_of(record, "CMP").as_deref()),
            electrolytes: parse_lab_panel(scalar_of(record, "Electrolytes").as_deref()),
        },
        documents: DocumentSection {
            pathology_report: field(record, "Pathology_Links", config),
            radiology_report: field(record, "Radiology_Links", config),
            genomic_report: field(record, "Genomic_Links", config),
            provider_notes: field(record, "Provider_Notes", config),
        },
    }
}
