//! Plain-language interpretation of lab results through an external text
//! generator.
//!
//! The generator is the single external boundary of the crate and sits
//! behind `TextGenerator` so it can be swapped or mocked. Every request is
//! one call with no retry: any failure or blank answer becomes a fixed
//! fallback string, never an error for the caller.

pub mod gemini;
pub mod prompt;

use thiserror::Error;

use crate::models::TestResult;

pub use gemini::GeminiClient;
pub use prompt::{build_history_prompt, build_single_insight_prompt};

pub const INSIGHT_FALLBACK: &str =
    "Unable to provide AI insights at this time. Please speak with your doctor directly.";

/// First line of every generated history summary.
pub const HISTORY_DISCLAIMER: &str =
    "This is an AI summary, not a diagnosis. Please consult your doctor about these results.";

pub const NO_RECORDS_MESSAGE: &str =
    "No medical records found. Complete a test to see your health summary here.";

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("No API key configured for the insight service")]
    MissingApiKey,

    #[error("Cannot reach insight service at {0}")]
    Connection(String),

    #[error("Insight request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Insight service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Insight service returned an empty response")]
    EmptyResponse,
}

/// Text generation abstraction (allows mocking)
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, InsightError>;
}

/// Builds prompts from results and turns generator failures into the
/// fallback text.
pub struct InsightRequester<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> InsightRequester<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Lay-terms explanation of one report, or `INSIGHT_FALLBACK`.
    pub fn request_single_insight(&self, result: &TestResult) -> String {
        let prompt = build_single_insight_prompt(result);
        self.generate_or_fallback(&prompt, &result.id)
    }

    /// Short synthesis over several reports, prefixed by `HISTORY_DISCLAIMER`.
    /// An empty history never reaches the generator.
    pub fn request_history_summary(&self, results: &[TestResult]) -> String {
        if results.is_empty() {
            return NO_RECORDS_MESSAGE.to_string();
        }
        let prompt = build_history_prompt(results);
        match self.generate(&prompt, "history") {
            Some(text) => format!("{HISTORY_DISCLAIMER}\n\n{}", text.trim()),
            None => INSIGHT_FALLBACK.to_string(),
        }
    }

    fn generate_or_fallback(&self, prompt: &str, subject: &str) -> String {
        self.generate(prompt, subject)
            .unwrap_or_else(|| INSIGHT_FALLBACK.to_string())
    }

    /// One generator call. `None` on error or blank text.
    fn generate(&self, prompt: &str, subject: &str) -> Option<String> {
        match self.generator.generate(prompt) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(subject, chars = text.len(), "Insight generated");
                Some(text)
            }
            Ok(_) => {
                tracing::warn!(subject, "Insight service returned blank text, using fallback");
                None
            }
            Err(e) => {
                tracing::warn!(subject, error = %e, "Insight request failed, using fallback");
                None
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// InsightSlot: stale-response guard
// ═══════════════════════════════════════════════════════════

/// Receipt for one in-flight insight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightTicket {
    result_id: String,
    seq: u64,
}

impl InsightTicket {
    pub fn result_id(&self) -> &str {
        &self.result_id
    }
}

/// Tracks which result the user is looking at so an answer that arrives
/// after they moved on is dropped instead of shown under the wrong report.
#[derive(Debug, Default)]
pub struct InsightSlot {
    pending: Option<InsightTicket>,
    next_seq: u64,
    shown: Option<(String, String)>,
}

impl InsightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a request for `result_id`, superseding any request in flight.
    pub fn begin(&mut self, result_id: &str) -> InsightTicket {
        self.next_seq += 1;
        let ticket = InsightTicket {
            result_id: result_id.to_string(),
            seq: self.next_seq,
        };
        self.pending = Some(ticket.clone());
        self.shown = None;
        ticket
    }

    /// Applies a response. Returns the text only if `ticket` is still the
    /// current request; stale responses are discarded.
    pub fn accept(&mut self, ticket: &InsightTicket, text: String) -> Option<&str> {
        if self.pending.as_ref() != Some(ticket) {
            tracing::debug!(result_id = %ticket.result_id, "Discarding stale insight response");
            return None;
        }
        self.pending = None;
        self.shown = Some((ticket.result_id.clone(), text));
        self.shown.as_ref().map(|(_, t)| t.as_str())
    }

    /// Forgets the current request and any shown text (user closed the view).
    pub fn clear(&mut self) {
        self.pending = None;
        self.shown = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Insight text currently shown for `result_id`, if any.
    pub fn shown_for(&self, result_id: &str) -> Option<&str> {
        match &self.shown {
            Some((id, text)) if id == result_id => Some(text.as_str()),
            _ => None,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestParameter;
    use std::cell::{Cell, RefCell};

    /// Mock generator: replays a fixed outcome and counts calls.
    struct MockGenerator {
        outcome: Result<String, fn() -> InsightError>,
        calls: Cell<usize>,
        last_prompt: RefCell<String>,
    }

    impl MockGenerator {
        fn replying(text: &str) -> Self {
            Self { outcome: Ok(text.to_string()), calls: Cell::new(0), last_prompt: RefCell::default() }
        }

        fn failing(err: fn() -> InsightError) -> Self {
            Self { outcome: Err(err), calls: Cell::new(0), last_prompt: RefCell::default() }
        }
    }

    impl TextGenerator for MockGenerator {
        fn generate(&self, prompt: &str) -> Result<String, InsightError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_prompt.borrow_mut() = prompt.to_string();
            match &self.outcome {
                Ok(text) => Ok(text.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn result(id: &str) -> TestResult {
        TestResult {
            id: id.into(),
            appointment_id: "APP-1010".into(),
            patient_id: "patient_01".into(),
            patient_name: "Rahul Sharma".into(),
            age: "34".into(),
            gender: "Male".into(),
            ref_doctor: "Self".into(),
            sample_type: "EDTA Whole Blood".into(),
            collected_at: String::new(),
            received_at: String::new(),
            test_name: "Complete Blood Picture (CBC)".into(),
            date: "2023-11-20".into(),
            parameters: vec![TestParameter {
                name: "Hemoglobin".into(),
                value: "11.5".into(),
                unit: "g/dL".into(),
                reference_range: "13.5 - 17.5".into(),
                method: None,
                section: None,
            }],
            doctor_remarks: "Suggest iron-rich diet.".into(),
            analyzer_used: None,
            internal_qc: None,
            morphology: None,
        }
    }

    #[test]
    fn single_insight_returns_text_verbatim() {
        let requester = InsightRequester::new(MockGenerator::replying("  Your hemoglobin is low.\n"));
        let text = requester.request_single_insight(&result("REP-1"));
        assert_eq!(text, "  Your hemoglobin is low.\n");
        assert_eq!(requester.generator().calls.get(), 1);
        assert!(requester.generator().last_prompt.borrow().contains("Hemoglobin: 11.5 g/dL"));
    }

    #[test]
    fn single_insight_falls_back_on_error() {
        let failures: [fn() -> InsightError; 3] = [
            || InsightError::Connection("http://localhost".into()),
            || InsightError::Timeout(20),
            || InsightError::Api { status: 429, body: "rate limited".into() },
        ];
        for make in failures {
            let requester = InsightRequester::new(MockGenerator::failing(make));
            assert_eq!(requester.request_single_insight(&result("REP-1")), INSIGHT_FALLBACK);
            assert_eq!(requester.generator().calls.get(), 1, "no retry");
        }
    }

    #[test]
    fn single_insight_falls_back_on_blank_text() {
        let requester = InsightRequester::new(MockGenerator::replying("   "));
        assert_eq!(requester.request_single_insight(&result("REP-1")), INSIGHT_FALLBACK);
    }

    #[test]
    fn empty_history_short_circuits() {
        let requester = InsightRequester::new(MockGenerator::replying("unused"));
        assert_eq!(requester.request_history_summary(&[]), NO_RECORDS_MESSAGE);
        assert_eq!(requester.generator().calls.get(), 0);
    }

    #[test]
    fn history_summary_calls_once() {
        let requester = InsightRequester::new(MockGenerator::replying("Overall stable."));
        let text = requester.request_history_summary(&[result("REP-1"), result("REP-2")]);
        assert_eq!(text, format!("{HISTORY_DISCLAIMER}\n\nOverall stable."));
        assert_eq!(requester.generator().calls.get(), 1);
    }

    #[test]
    fn history_summary_always_starts_with_disclaimer() {
        let requester = InsightRequester::new(MockGenerator::replying("\n  Cholesterol trending down.\n"));
        let text = requester.request_history_summary(&[result("REP-1")]);
        assert!(text.starts_with(HISTORY_DISCLAIMER));
        assert!(text.ends_with("Cholesterol trending down."));
    }

    #[test]
    fn history_fallback_has_no_disclaimer_prefix() {
        let requester = InsightRequester::new(MockGenerator::replying(" "));
        assert_eq!(requester.request_history_summary(&[result("REP-1")]), INSIGHT_FALLBACK);
    }

    #[test]
    fn history_summary_falls_back_on_error() {
        let requester = InsightRequester::new(MockGenerator::failing(|| InsightError::EmptyResponse));
        assert_eq!(requester.request_history_summary(&[result("REP-1")]), INSIGHT_FALLBACK);
    }

    #[test]
    fn slot_accepts_current_ticket() {
        let mut slot = InsightSlot::new();
        let ticket = slot.begin("REP-1");
        assert!(slot.is_pending());
        assert_eq!(slot.accept(&ticket, "fine".into()), Some("fine"));
        assert!(!slot.is_pending());
        assert_eq!(slot.shown_for("REP-1"), Some("fine"));
        assert_eq!(slot.shown_for("REP-2"), None);
    }

    #[test]
    fn slot_discards_stale_response() {
        let mut slot = InsightSlot::new();
        let old = slot.begin("REP-1");
        let current = slot.begin("REP-2");
        assert_eq!(old.result_id(), "REP-1");

        assert_eq!(slot.accept(&old, "for REP-1".into()), None);
        assert!(slot.is_pending());
        assert_eq!(slot.shown_for("REP-1"), None);

        assert_eq!(slot.accept(&current, "for REP-2".into()), Some("for REP-2"));
    }

    #[test]
    fn slot_discards_reselect_of_same_result() {
        let mut slot = InsightSlot::new();
        let first = slot.begin("REP-1");
        let second = slot.begin("REP-1");
        assert_eq!(slot.accept(&first, "old".into()), None);
        assert_eq!(slot.accept(&second, "new".into()), Some("new"));
    }

    #[test]
    fn slot_clear_drops_pending() {
        let mut slot = InsightSlot::new();
        let ticket = slot.begin("REP-1");
        slot.clear();
        assert_eq!(slot.accept(&ticket, "late".into()), None);
    }
}
