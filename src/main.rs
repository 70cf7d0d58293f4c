use chrono::Local;

use labdesk_lib::config::{self, InsightConfig};
use labdesk_lib::insight::{GeminiClient, InsightRequester};
use labdesk_lib::models::{User, UserRole};
use labdesk_lib::report;
use labdesk_lib::store::LabStore;
use labdesk_lib::submission::ReportDraft;

fn main() {
    labdesk_lib::init_tracing();

    if let Err(e) = run_demo() {
        tracing::error!(error = %e, "Demo run failed");
        std::process::exit(1);
    }
}

/// Books a blood count for the demo patient, files the report, writes the
/// PDF and, when an API key is configured, asks for an insight.
fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let today = Local::now().date_naive();
    let mut store = LabStore::with_demo_data(today);

    let patient = User {
        id: "patient_01".into(),
        name: "Rahul Sharma".into(),
        email: "rahul.sharma@example.com".into(),
        role: UserRole::Patient,
        phone: Some("+91 98765 43210".into()),
    };

    let appointment = store.book_appointment(
        &patient,
        "b1",
        &today.format("%Y-%m-%d").to_string(),
        "09:00 AM",
    )?;

    let mut draft = ReportDraft::new();
    draft.age = "34".into();
    draft.apply_template("CBC");
    let values = [
        "11.5", "4.6", "38.2", "83.0", "25.0", "30.1", "13.4", // haemogram
        "7200", // leukocytes
        "58", "32", "6", "3", "1", // differential
        "240000", "9.8", // platelets
    ];
    for (index, value) in values.iter().enumerate() {
        draft.set_value(index, value);
    }
    draft.remarks = "Hemoglobin slightly below range. Clinical correlation suggested.".into();

    let result = store.submit_report(&appointment.id, &draft, today)?;

    let bytes = report::generate_report_pdf(&result)?;
    let path = report::export_report_to_file(
        &bytes,
        &report::report_filename(&result),
        &config::exports_dir(),
    )?;
    tracing::info!(path = %path.display(), "Report written");

    let insight_config = InsightConfig::from_env();
    if insight_config.api_key.is_none() {
        tracing::info!("No insight API key configured, skipping insights");
        return Ok(());
    }

    let requester = InsightRequester::new(GeminiClient::new(&insight_config)?);
    let insight = requester.request_single_insight(&result);
    println!("Insight for {}:\n{insight}\n", result.id);

    let summary = requester.request_history_summary(&store.patient_history(&patient.id));
    println!("History summary:\n{summary}");

    Ok(())
}
