//! Report assembly: `TestResult` → layout → A4 PDF → file.
//!
//! Assembly is a pure function of the result plus the render time, which
//! only feeds the visible "Report Date". Malformed results are a caller bug
//! and fail fast with a `ReportError` instead of producing a partial report.

pub mod layout;
pub mod pdf;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use thiserror::Error;

use crate::models::TestResult;

pub use layout::{assemble, build_table, ReportLayout, TableRow};
pub use pdf::render_pdf;

/// Download name prefix: `NABL_Report_<Patient_Name>_<ResultId>.pdf`.
pub const FILENAME_PREFIX: &str = "NABL_Report";

/// Runs of anything that is not a letter (with its marks), digit, `-` or `_`. Covers
/// whitespace and path separators.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}_-]+").expect("valid regex"));

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Test result is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Test result {result_id} has no parameters")]
    EmptyParameters { result_id: String },

    #[error("Test result {result_id}: parameter #{index} needs both a name and a value")]
    IncompleteParameter { result_id: String, index: usize },

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Assembles and renders a report, stamping the current local time as the
/// report date.
pub fn generate_report_pdf(result: &TestResult) -> Result<Vec<u8>, ReportError> {
    let layout = assemble(result, Local::now())?;
    let bytes = render_pdf(&layout)?;
    tracing::info!(
        result_id = %result.id,
        rows = layout.table.len(),
        bytes = bytes.len(),
        "Report rendered"
    );
    Ok(bytes)
}

/// Deterministic download name for a result's report. Always a single path
/// component.
pub fn report_filename(result: &TestResult) -> String {
    format!(
        "{FILENAME_PREFIX}_{}_{}.pdf",
        filename_part(&result.patient_name),
        filename_part(&result.id)
    )
}

fn filename_part(raw: &str) -> String {
    UNSAFE_FILENAME_CHARS
        .replace_all(raw, "_")
        .trim_matches('_')
        .to_string()
}

/// Saves PDF bytes into `exports_dir`, creating it if needed.
pub fn export_report_to_file(
    pdf_bytes: &[u8],
    filename: &str,
    exports_dir: &Path,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(exports_dir)?;
    let path = exports_dir.join(filename);
    std::fs::write(&path, pdf_bytes)?;
    tracing::info!(path = %path.display(), "Report exported");
    Ok(path)
}
