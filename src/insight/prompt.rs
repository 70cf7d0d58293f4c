//! Prompt builders for result interpretation.

use crate::models::{TestParameter, TestResult};

/// Parameters per result included in a history summary.
pub const HISTORY_PARAMS_PER_RESULT: usize = 3;

/// Word ceiling requested for the history summary.
pub const HISTORY_WORD_LIMIT: usize = 150;

fn parameter_line(p: &TestParameter) -> String {
    format!("{}: {} {} (Ref: {})", p.name, p.value, p.unit, p.reference_range)
}

/// Prompt asking for a lay-terms explanation of one report.
pub fn build_single_insight_prompt(result: &TestResult) -> String {
    let mut prompt = String::new();
    prompt.push_str(
        "As a clinical laboratory assistant, explain the following test results to the patient in simple terms.\n",
    );
    prompt.push_str(
        "Always include a disclaimer that this is an AI interpretation and they MUST consult their doctor.\n\n",
    );

    prompt.push_str(&format!("Test: {}\n", result.test_name));
    prompt.push_str("Results:\n");
    for p in &result.parameters {
        prompt.push_str(&format!("- {}\n", parameter_line(p)));
    }
    prompt.push('\n');
    prompt.push_str(&format!("Remarks: {}\n\n", result.doctor_remarks));
    prompt.push_str("Focus on clarity, empathy, and professional medical tone.");
    prompt
}

/// Prompt asking for a short synthesis across a patient's reports.
pub fn build_history_prompt(results: &[TestResult]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "As a clinical laboratory assistant, summarize this patient's laboratory history in no more than {HISTORY_WORD_LIMIT} words.\n"
    ));
    prompt.push_str(
        "A disclaimer is shown above your summary, so do not add one. Remind them they MUST consult their doctor about any concern.\n",
    );
    prompt.push_str(
        "Then cover: overall status, any notable abnormalities or trends across reports, and general wellness guidance.\n\n",
    );

    prompt.push_str("<HISTORY>\n");
    for (i, r) in results.iter().enumerate() {
        prompt.push_str(&format!("{}. {} | {}\n", i + 1, r.date, r.test_name));
        for p in r.parameters.iter().take(HISTORY_PARAMS_PER_RESULT) {
            prompt.push_str(&format!("   - {}\n", parameter_line(p)));
        }
        if !r.doctor_remarks.trim().is_empty() {
            prompt.push_str(&format!("   Remarks: {}\n", r.doctor_remarks.trim()));
        }
    }
    prompt.push_str("</HISTORY>\n\n");
    prompt.push_str("Use plain, patient-friendly language. Do not prescribe treatments.");
    prompt
}
