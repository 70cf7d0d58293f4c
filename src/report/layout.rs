//! Report layout model: a `TestResult` reduced to the exact blocks and rows
//! the PDF renderer draws, in print order.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use super::ReportError;
use crate::models::TestResult;

// ─── Static report content ────────────────────────────────────────────────────

pub const LAB_NAME: &str = "SRI VENKATESWAR DIGITAL X-RAY";
pub const LAB_SUBTITLE: &str = "& CLINICAL LABORATORY";
pub const LAB_ADDRESS: &str =
    "Plot No. 45, Beside City Hospital, Main Road | Tel: +91 98765 43210 | Email: balu.diagnostics@gmail.com";
pub const ACCREDITATION: &str = "NABL ACCREDITED LABORATORY | ISO 15189:2022";

pub const DEFAULT_REMARKS: &str = "Clinical correlation suggested.";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const DEFAULT_ANALYZER: &str = "Standard Laboratory Analyzer";
pub const DEFAULT_METHOD: &str = "Standard Laboratory Procedure";
pub const DEFAULT_QC: &str = "Within Acceptable Limits";

pub const DISCLAIMER: &str = "The results relate only to the sample tested. This report is not valid for \
medico-legal purposes. Results should be interpreted by a qualified clinician in the context of the \
patient's clinical history.";

pub const TABLE_HEADERS: [&str; 4] = ["PARAMETER", "RESULT", "UNIT", "REFERENCE INTERVAL"];

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Letterhead {
    pub name: &'static str,
    pub subtitle: &'static str,
    pub address: &'static str,
    pub accreditation: &'static str,
}

/// Label/value pair in the two-column patient block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientBlock {
    pub left: Vec<Field>,
    pub right: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TableRow {
    Section(String),
    Parameter {
        name: String,
        value: String,
        unit: String,
        reference: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Methodology {
    pub analyzer: String,
    pub method: String,
    pub internal_qc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signatory {
    pub role: &'static str,
    pub name: &'static str,
    pub credentials: &'static str,
}

pub const SIGNATORIES: [Signatory; 2] = [
    Signatory {
        role: "LAB TECHNICIAN",
        name: "K. Srinivas",
        credentials: "DMLT, B.Sc (MLT)",
    },
    Signatory {
        role: "CONSULTANT PATHOLOGIST",
        name: "Dr. Balu",
        credentials: "MBBS, MD (Pathology) | Reg. No: 54932",
    },
];

/// Everything the renderer needs, already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLayout {
    pub document_title: String,
    pub report_id: String,
    /// Parsed `TestResult::date`; pins the PDF metadata dates.
    pub issued_on: Option<NaiveDate>,
    pub letterhead: Letterhead,
    pub patient: PatientBlock,
    pub test_title: String,
    pub table: Vec<TableRow>,
    pub morphology: Option<String>,
    pub methodology: Methodology,
    pub remarks: String,
    pub signatories: [Signatory; 2],
    pub disclaimer: &'static str,
}

impl ReportLayout {
    /// Section headers in print order.
    pub fn section_headers(&self) -> Vec<&str> {
        self.table
            .iter()
            .filter_map(|row| match row {
                TableRow::Section(s) => Some(s.as_str()),
                TableRow::Parameter { .. } => None,
            })
            .collect()
    }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// Builds the report layout. `generated_at` is the only input not taken from
/// the result; it fills the "Report Date" field.
pub fn assemble(result: &TestResult, generated_at: DateTime<Local>) -> Result<ReportLayout, ReportError> {
    check_preconditions(result)?;

    let patient = PatientBlock {
        left: vec![
            Field { label: "Patient Name", value: result.patient_name.clone() },
            Field { label: "Age / Gender", value: age_gender(&result.age, &result.gender) },
            Field { label: "Patient ID", value: result.patient_id.clone() },
            Field { label: "Referred By", value: or_placeholder(&result.ref_doctor, NOT_SPECIFIED) },
        ],
        right: vec![
            Field { label: "Sample Type", value: or_placeholder(&result.sample_type, NOT_SPECIFIED) },
            Field { label: "Collected On", value: format_timestamp(&result.collected_at) },
            Field { label: "Received On", value: format_timestamp(&result.received_at) },
            Field { label: "Report Date", value: long_datetime(&generated_at.naive_local()) },
        ],
    };

    // "Method" comes from the first row only; per-row methods are not shown.
    let first_method = result.parameters.first().and_then(|p| p.method.as_deref());
    let methodology = Methodology {
        analyzer: opt_or_placeholder(result.analyzer_used.as_deref(), DEFAULT_ANALYZER),
        method: opt_or_placeholder(first_method, DEFAULT_METHOD),
        internal_qc: opt_or_placeholder(result.internal_qc.as_deref(), DEFAULT_QC),
    };

    let morphology = result
        .morphology
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    Ok(ReportLayout {
        document_title: format!("{} - {}", result.test_name, result.patient_name),
        report_id: result.id.clone(),
        issued_on: NaiveDate::parse_from_str(result.date.trim(), "%Y-%m-%d").ok(),
        letterhead: Letterhead {
            name: LAB_NAME,
            subtitle: LAB_SUBTITLE,
            address: LAB_ADDRESS,
            accreditation: ACCREDITATION,
        },
        patient,
        test_title: result.test_name.to_uppercase(),
        table: build_table(result),
        morphology,
        methodology,
        remarks: or_placeholder(&result.doctor_remarks, DEFAULT_REMARKS),
        signatories: SIGNATORIES,
        disclaimer: DISCLAIMER,
    })
}

/// Parameter rows with a header before every contiguous run of the same
/// section. Input order is kept; `[A, B, A]` yields three headers.
pub fn build_table(result: &TestResult) -> Vec<TableRow> {
    let mut rows = Vec::with_capacity(result.parameters.len() * 2);
    let mut current: Option<&str> = None;

    for p in &result.parameters {
        let section = p.section_label();
        if section != current {
            if let Some(s) = section {
                rows.push(TableRow::Section(s.to_string()));
            }
            current = section;
        }
        rows.push(TableRow::Parameter {
            name: p.name.clone(),
            value: p.value.clone(),
            unit: p.unit.clone(),
            reference: p.reference_range.clone(),
        });
    }
    rows
}

fn check_preconditions(result: &TestResult) -> Result<(), ReportError> {
    let required = [
        ("id", &result.id),
        ("patientName", &result.patient_name),
        ("patientId", &result.patient_id),
        ("testName", &result.test_name),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ReportError::MissingField { field });
        }
    }
    if result.parameters.is_empty() {
        return Err(ReportError::EmptyParameters { result_id: result.id.clone() });
    }
    if let Some(index) = result
        .parameters
        .iter()
        .position(|p| p.name.trim().is_empty() || p.value.trim().is_empty())
    {
        return Err(ReportError::IncompleteParameter { result_id: result.id.clone(), index });
    }
    Ok(())
}

// ─── Formatting helpers ───────────────────────────────────────────────────────

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { placeholder.to_string() } else { trimmed.to_string() }
}

fn opt_or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    or_placeholder(value.unwrap_or_default(), placeholder)
}

fn age_gender(age: &str, gender: &str) -> String {
    match (age.trim(), gender.trim()) {
        ("", "") => NOT_SPECIFIED.to_string(),
        ("", g) => g.to_string(),
        (a, "") => format!("{a} Years"),
        (a, g) => format!("{a} Years / {g}"),
    }
}

fn long_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%-d %B %Y, %I:%M %p").to_string()
}

/// Renders a stored timestamp in long form. Accepts RFC 3339, the form
/// inputs' `YYYY-MM-DDTHH:MM[:SS]` and bare dates. Anything else was typed by
/// hand and is shown as entered.
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return NOT_SPECIFIED.to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return long_datetime(&Local.from_utc_datetime(&dt.naive_utc()).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return long_datetime(&dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%-d %B %Y").to_string();
    }
    raw.to_string()
}

// ─── Tests ────────────────────────────────────────────────────────────────────
