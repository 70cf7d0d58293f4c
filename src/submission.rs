//! Staff data entry for a report: the form state, template seeding,
//! validation and finalization into a `TestResult`.

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Appointment, TestParameter, TestResult};
use crate::report::layout::DEFAULT_REMARKS;
use crate::templates;

pub const DEFAULT_GENDER: &str = "Male";
pub const DEFAULT_REF_DOCTOR: &str = "Self";
pub const DEFAULT_SAMPLE_TYPE: &str = "EDTA Whole Blood";
pub const DEFAULT_ANALYZER: &str = "Automated Hematology Analyzer";
pub const DEFAULT_INTERNAL_QC: &str = "Within Acceptable Limits";
pub const DEFAULT_MORPHOLOGY: &str = "RBC Morphology: Normocytic Normochromic. \
WBC Morphology: Within normal limits. Platelets: Adequate.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add at least one parameter before finalization.")]
    NoParameters,

    #[error("Please ensure all parameters have names and values before finalization (row {row} has no name).")]
    MissingName { row: usize },

    #[error("Please ensure all parameters have names and values before finalization (row {row} has no value).")]
    MissingValue { row: usize },
}

/// Report form as a staff member fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub age: String,
    pub gender: String,
    pub ref_doctor: String,
    pub sample_type: String,
    pub collected_at: String,
    pub received_at: String,
    pub analyzer_used: String,
    pub internal_qc: String,
    pub morphology: String,
    pub remarks: String,
    pub parameters: Vec<TestParameter>,
}

impl Default for ReportDraft {
    fn default() -> Self {
        let now = Local::now().format("%Y-%m-%dT%H:%M").to_string();
        Self {
            age: String::new(),
            gender: DEFAULT_GENDER.into(),
            ref_doctor: DEFAULT_REF_DOCTOR.into(),
            sample_type: DEFAULT_SAMPLE_TYPE.into(),
            collected_at: now.clone(),
            received_at: now,
            analyzer_used: DEFAULT_ANALYZER.into(),
            internal_qc: DEFAULT_INTERNAL_QC.into(),
            morphology: DEFAULT_MORPHOLOGY.into(),
            remarks: DEFAULT_REMARKS.into(),
            parameters: vec![templates::blank_parameter()],
        }
    }
}

impl ReportDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rows with the template for `code` and adopts its
    /// analyzer. Returns false and leaves the draft alone for unknown codes.
    pub fn apply_template(&mut self, code: &str) -> bool {
        let Some(template) = templates::get_template(code) else {
            tracing::debug!(code, "No template for code");
            return false;
        };
        self.parameters = templates::instantiate(template);
        if let Some(analyzer) = template.analyzer {
            self.analyzer_used = analyzer.to_string();
        }
        true
    }

    pub fn add_parameter(&mut self) {
        self.parameters.push(templates::blank_parameter());
    }

    /// Removes a row. Out-of-range indexes are ignored.
    pub fn remove_parameter(&mut self, index: usize) -> Option<TestParameter> {
        (index < self.parameters.len()).then(|| self.parameters.remove(index))
    }

    pub fn parameter_mut(&mut self, index: usize) -> Option<&mut TestParameter> {
        self.parameters.get_mut(index)
    }

    /// Replaces a whole row. Returns false for an unknown row.
    pub fn update_parameter(&mut self, index: usize, parameter: TestParameter) -> bool {
        match self.parameters.get_mut(index) {
            Some(slot) => {
                *slot = parameter;
                true
            }
            None => false,
        }
    }

    /// Sets a row's measured value. Returns false for an unknown row.
    pub fn set_value(&mut self, index: usize, value: &str) -> bool {
        match self.parameters.get_mut(index) {
            Some(p) => {
                p.value = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parameters(&self.parameters)
    }

    /// Validates and builds the result for `appointment`, issued on `today`.
    pub fn finalize(&self, appointment: &Appointment, today: NaiveDate) -> Result<TestResult, ValidationError> {
        self.validate()?;

        let morphology = is_blood_count(&appointment.service_name)
            .then(|| self.morphology.trim().to_string())
            .filter(|m| !m.is_empty());

        Ok(TestResult {
            id: generate_result_id(),
            appointment_id: appointment.id.clone(),
            patient_id: appointment.patient_id.clone(),
            patient_name: appointment.patient_name.clone(),
            age: self.age.trim().to_string(),
            gender: self.gender.clone(),
            ref_doctor: self.ref_doctor.clone(),
            sample_type: self.sample_type.clone(),
            collected_at: self.collected_at.clone(),
            received_at: self.received_at.clone(),
            test_name: appointment.service_name.clone(),
            date: today.format("%Y-%m-%d").to_string(),
            parameters: self.parameters.clone(),
            doctor_remarks: self.remarks.clone(),
            analyzer_used: non_empty(&self.analyzer_used),
            internal_qc: non_empty(&self.internal_qc),
            morphology,
        })
    }
}

/// Every row needs a name and a value; rows are numbered from 1.
pub fn validate_parameters(parameters: &[TestParameter]) -> Result<(), ValidationError> {
    if parameters.is_empty() {
        return Err(ValidationError::NoParameters);
    }
    for (i, p) in parameters.iter().enumerate() {
        if p.name.trim().is_empty() {
            return Err(ValidationError::MissingName { row: i + 1 });
        }
        if p.value.trim().is_empty() {
            return Err(ValidationError::MissingValue { row: i + 1 });
        }
    }
    Ok(())
}

/// Blood-count services get a peripheral smear block.
pub fn is_blood_count(service_name: &str) -> bool {
    service_name.contains("CBC") || service_name.contains("CBP")
}

/// `REP-` followed by six digits.
pub fn generate_result_id() -> String {
    format!("REP-{}", rand::thread_rng().gen_range(100_000..1_000_000))
}

fn non_empty(value: &str) -> Option<String> {
    let v = value.trim();
    (!v.is_empty()).then(|| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppointmentStatus;

    fn appointment(service_name: &str) -> Appointment {
        Appointment {
            id: "APP-2001".into(),
            patient_id: "patient_01".into(),
            patient_name: "Rahul Sharma".into(),
            service_id: "b1".into(),
            service_name: service_name.into(),
            date: "2024-03-01".into(),
            time_slot: "09:30 AM".into(),
            status: AppointmentStatus::Pending,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn new_draft_has_form_defaults() {
        let draft = ReportDraft::new();
        assert_eq!(draft.gender, "Male");
        assert_eq!(draft.ref_doctor, "Self");
        assert_eq!(draft.remarks, "Clinical correlation suggested.");
        assert_eq!(draft.parameters, vec![TestParameter::default()]);
        assert_eq!(draft.collected_at.len(), "2024-03-01T09:30".len());
    }

    #[test]
    fn apply_known_template() {
        let mut draft = ReportDraft::new();
        assert!(draft.apply_template("SUGAR"));
        assert_eq!(draft.parameters.len(), 3);
        assert_eq!(draft.analyzer_used, "Semi-Automated Biochemistry Analyzer");
    }

    #[test]
    fn template_without_analyzer_keeps_current() {
        let mut draft = ReportDraft::new();
        draft.analyzer_used = "Manual microscopy".into();
        assert!(draft.apply_template("URINE"));
        assert_eq!(draft.analyzer_used, "Manual microscopy");
    }

    #[test]
    fn unknown_template_leaves_draft_untouched() {
        let mut draft = ReportDraft::new();
        let before = draft.clone();
        assert!(!draft.apply_template("NONSENSE"));
        assert_eq!(draft, before);
    }

    #[test]
    fn add_and_remove_rows() {
        let mut draft = ReportDraft::new();
        draft.add_parameter();
        assert_eq!(draft.parameters.len(), 2);
        assert!(draft.remove_parameter(5).is_none());
        assert!(draft.remove_parameter(0).is_some());
        assert_eq!(draft.parameters.len(), 1);

        let row = TestParameter {
            name: "ESR".into(),
            unit: "mm/hr".into(),
            ..Default::default()
        };
        assert!(draft.update_parameter(0, row.clone()));
        assert!(!draft.update_parameter(3, row));
        assert_eq!(draft.parameters[0].name, "ESR");
    }

    #[test]
    fn validation_reports_first_bad_row() {
        let mut draft = ReportDraft::new();
        assert_eq!(draft.validate(), Err(ValidationError::MissingName { row: 1 }));

        draft.apply_template("SUGAR");
        draft.set_value(0, "92");
        assert_eq!(draft.validate(), Err(ValidationError::MissingValue { row: 2 }));

        draft.parameters.clear();
        assert_eq!(draft.validate(), Err(ValidationError::NoParameters));
    }

    #[test]
    fn validation_message_is_user_facing() {
        let msg = ValidationError::MissingValue { row: 2 }.to_string();
        assert!(msg.starts_with("Please ensure all parameters have names and values"));
    }

    #[test]
    fn finalize_cbc_includes_morphology() {
        let mut draft = ReportDraft::new();
        draft.apply_template("CBC");
        for i in 0..draft.parameters.len() {
            draft.set_value(i, "1");
        }
        let result = draft.finalize(&appointment("Complete Blood Picture (CBC)"), today()).unwrap();
        assert_eq!(result.morphology.as_deref(), Some(DEFAULT_MORPHOLOGY));
        assert_eq!(result.test_name, "Complete Blood Picture (CBC)");
        assert_eq!(result.appointment_id, "APP-2001");
        assert_eq!(result.date, "2024-03-01");
        assert_eq!(result.analyzer_used.as_deref(), Some("Automated Hematology Analyzer"));
    }

    #[test]
    fn finalize_other_tests_drop_morphology() {
        let mut draft = ReportDraft::new();
        draft.apply_template("LFT");
        for i in 0..draft.parameters.len() {
            draft.set_value(i, "1");
        }
        let result = draft.finalize(&appointment("Liver Function Test (LFT)"), today()).unwrap();
        assert!(result.morphology.is_none());
    }

    #[test]
    fn finalize_refuses_invalid_draft() {
        let draft = ReportDraft::new();
        assert!(draft.finalize(&appointment("Lipid Profile"), today()).is_err());
    }

    #[test]
    fn result_ids_have_expected_shape() {
        for _ in 0..50 {
            let id = generate_result_id();
            assert!(id.starts_with("REP-"));
            assert_eq!(id.len(), 10);
            assert!(id[4..].chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn blood_count_detection() {
        assert!(is_blood_count("Complete Blood Picture (CBC)"));
        assert!(is_blood_count("CBP with ESR"));
        assert!(!is_blood_count("Lipid Profile"));
    }
}
