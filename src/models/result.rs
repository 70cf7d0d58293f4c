use serde::{Deserialize, Serialize};

/// One measured row of a report. `value` is free text so qualitative
/// results ("Negative", "Pale yellow") fit alongside numbers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestParameter {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub reference_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl TestParameter {
    /// Section label, treating an empty string like no section.
    pub fn section_label(&self) -> Option<&str> {
        self.section.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// A finalized lab report. Created once per completed appointment and never
/// edited afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: String,
    pub appointment_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub ref_doctor: String,
    pub sample_type: String,
    pub collected_at: String,
    pub received_at: String,
    pub test_name: String,
    pub date: String,
    pub parameters: Vec<TestParameter>,
    pub doctor_remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_used: Option<String>,
    #[serde(default, rename = "internalQC", skip_serializing_if = "Option::is_none")]
    pub internal_qc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub morphology: Option<String>,
}
