//! PDF rendering of a `ReportLayout` via `printpdf` (A4 portrait).
//!
//! Document id, trailer id and metadata dates are pinned to the report itself, so two
//! renders of one layout produce the same file.

use std::io::BufWriter;

use printpdf::*;
use printpdf::lopdf;
use time::OffsetDateTime;

use super::layout::{ReportLayout, TableRow, TABLE_HEADERS};
use super::ReportError;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const TOP_Y: f32 = 280.0;
const BOTTOM_Y: f32 = 25.0;
const LINE_H: f32 = 4.5;

// Table column x positions (mm).
const COL_PARAM: f32 = 15.0;
const COL_RESULT: f32 = 95.0;
const COL_UNIT: f32 = 125.0;
const COL_REF: f32 = 150.0;

const PT_TO_MM: f32 = 0.3528;

// Wrap widths (characters at 9pt) for columns drawn at fixed x positions.
const RESULT_CHARS: usize = 14;
const PATIENT_LEFT_CHARS: usize = 34;
const PATIENT_RIGHT_CHARS: usize = 28;

fn navy() -> Color {
    Color::Rgb(Rgb::new(30.0 / 255.0, 58.0 / 255.0, 138.0 / 255.0, None))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn grey() -> Color {
    Color::Rgb(Rgb::new(0.45, 0.45, 0.45, None))
}

/// Cursor over the pages of one document. Starts a new page when the next
/// block would cross the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    report_id: &'a str,
    page_no: usize,
    y: f32,
    in_table: bool,
}

impl<'a> PageWriter<'a> {
    fn text(&self, text: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(y), font);
    }

    fn centered(&self, text: &str, size: f32, y: f32, font: &IndirectFontRef) {
        // Helvetica averages roughly half an em per glyph.
        let width = text.chars().count() as f32 * size * 0.5 * PT_TO_MM;
        let x = ((PAGE_W - width) / 2.0).max(MARGIN_X);
        self.text(text, size, x, y, font);
    }

    fn rule(&self, y: f32, thickness: f32) {
        self.layer.set_outline_color(grey());
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN_X), Mm(y)), false),
                (Point::new(Mm(PAGE_W - MARGIN_X), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn page_footer(&self) {
        self.layer.set_fill_color(grey());
        self.text(&format!("Report ID: {}", self.report_id), 7.0, MARGIN_X, 12.0, &self.regular);
        self.text(&format!("Page {}", self.page_no), 7.0, PAGE_W - MARGIN_X - 12.0, 12.0, &self.regular);
        self.layer.set_fill_color(black());
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height >= BOTTOM_Y {
            return;
        }
        let (page, layer) = self.doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_no += 1;
        self.y = TOP_Y;
        self.page_footer();
        if self.in_table {
            self.table_header();
        }
    }

    fn heading(&mut self, title: &str) {
        self.ensure_space(LINE_H * 3.0);
        self.layer.set_fill_color(navy());
        self.text(title, 10.0, MARGIN_X, self.y, &self.bold);
        self.layer.set_fill_color(black());
        self.y -= LINE_H + 1.0;
    }

    fn paragraph(&mut self, text: &str, size: f32, max_chars: usize) {
        for line in wrap_text(text, max_chars) {
            self.ensure_space(LINE_H);
            self.text(&line, size, MARGIN_X, self.y, &self.regular);
            self.y -= LINE_H;
        }
    }

    fn table_header(&mut self) {
        let y = self.y;
        self.layer.set_fill_color(navy());
        for (header, x) in TABLE_HEADERS.iter().zip([COL_PARAM, COL_RESULT, COL_UNIT, COL_REF]) {
            self.text(header, 9.0, x, y, &self.bold);
        }
        self.layer.set_fill_color(black());
        self.rule(y - 1.8, 0.6);
        self.y -= LINE_H + 2.0;
    }

    fn table_row(&mut self, row: &TableRow) {
        match row {
            TableRow::Section(title) => {
                self.ensure_space(LINE_H * 2.0);
                self.y -= 1.0;
                self.layer.set_fill_color(navy());
                self.text(title, 9.0, COL_PARAM, self.y, &self.bold);
                self.layer.set_fill_color(black());
                self.y -= LINE_H;
            }
            TableRow::Parameter { name, value, unit, reference } => {
                let names = wrap_text(name, 42);
                let values = wrap_text(value, RESULT_CHARS);
                let refs = wrap_text(reference, 30);
                let lines = names.len().max(values.len()).max(refs.len());
                self.ensure_space(lines as f32 * LINE_H);

                let y = self.y;
                for (i, line) in names.iter().enumerate() {
                    self.text(line, 9.0, COL_PARAM, y - i as f32 * LINE_H, &self.regular);
                }
                for (i, line) in values.iter().enumerate() {
                    self.text(line, 9.0, COL_RESULT, y - i as f32 * LINE_H, &self.bold);
                }
                self.text(unit, 9.0, COL_UNIT, y, &self.regular);
                for (i, line) in refs.iter().enumerate() {
                    self.text(line, 8.5, COL_REF, y - i as f32 * LINE_H, &self.italic);
                }
                self.y -= lines as f32 * LINE_H;
            }
        }
    }
}

/// Renders the layout to PDF bytes.
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(&layout.document_title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let pinned = pinned_timestamp(layout);
    let doc = doc
        .with_document_id(layout.report_id.clone())
        .with_creation_date(pinned)
        .with_mod_date(pinned)
        .with_metadata_date(pinned);

    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?;
    let italic = doc.add_builtin_font(BuiltinFont::HelveticaOblique)
        .map_err(|e| ReportError::Pdf(format!("PDF font error: {e}")))?;

    let mut w = PageWriter {
        doc: &doc,
        layer: doc.get_page(page1).get_layer(layer1),
        regular,
        bold,
        italic,
        report_id: &layout.report_id,
        page_no: 1,
        y: TOP_Y,
        in_table: false,
    };
    w.page_footer();

    // Letterhead
    let lh = &layout.letterhead;
    w.layer.set_fill_color(navy());
    w.centered(lh.name, 18.0, 283.0, &w.bold);
    w.centered(lh.subtitle, 12.0, 276.0, &w.regular);
    w.layer.set_fill_color(black());
    w.centered(lh.address, 7.5, 270.0, &w.regular);
    w.centered(lh.accreditation, 7.5, 266.0, &w.bold);
    w.rule(262.0, 1.2);
    w.y = 255.0;

    // Patient / sample block
    let rows = layout.patient.left.len().max(layout.patient.right.len());
    for i in 0..rows {
        let left = layout.patient.left.get(i);
        let right = layout.patient.right.get(i);
        let left_lines = left.map(|f| wrap_text(&f.value, PATIENT_LEFT_CHARS)).unwrap_or_default();
        let right_lines = right.map(|f| wrap_text(&f.value, PATIENT_RIGHT_CHARS)).unwrap_or_default();

        if let Some(f) = left {
            w.text(&format!("{}:", f.label), 9.0, MARGIN_X, w.y, &w.bold);
        }
        if let Some(f) = right {
            w.text(&format!("{}:", f.label), 9.0, 110.0, w.y, &w.bold);
        }
        for (j, line) in left_lines.iter().enumerate() {
            w.text(line, 9.0, 42.0, w.y - j as f32 * LINE_H, &w.regular);
        }
        for (j, line) in right_lines.iter().enumerate() {
            w.text(line, 9.0, 136.0, w.y - j as f32 * LINE_H, &w.regular);
        }
        let lines = left_lines.len().max(right_lines.len()).max(1);
        w.y -= lines as f32 * LINE_H + 0.5;
    }
    w.rule(w.y + 1.5, 0.6);
    w.y -= 6.0;

    // Test title bar
    w.layer.set_fill_color(navy());
    w.centered(&layout.test_title, 12.0, w.y, &w.bold);
    w.layer.set_fill_color(black());
    w.y -= 9.0;

    // Parameter table
    w.ensure_space(LINE_H * 3.0);
    w.in_table = true;
    w.table_header();
    for row in &layout.table {
        w.table_row(row);
    }
    w.in_table = false;
    w.y -= 2.0;
    w.ensure_space(LINE_H);
    w.rule(w.y + 2.0, 0.4);
    w.y -= 4.0;

    if let Some(morphology) = &layout.morphology {
        w.heading("PERIPHERAL SMEAR (MORPHOLOGY)");
        w.paragraph(morphology, 9.0, 95);
        w.y -= 3.0;
    }

    w.heading("METHODOLOGY & QUALITY CONTROL");
    let m = &layout.methodology;
    for (label, value) in [("Analyzer", &m.analyzer), ("Method", &m.method), ("Internal QC", &m.internal_qc)] {
        w.ensure_space(LINE_H);
        w.text(&format!("{label}:"), 9.0, MARGIN_X, w.y, &w.bold);
        w.text(value, 9.0, 42.0, w.y, &w.regular);
        w.y -= LINE_H;
    }
    w.y -= 3.0;

    w.heading("CLINICAL REMARKS");
    w.paragraph(&layout.remarks, 9.0, 95);
    w.y -= 6.0;

    // Signatures: rule, role, name, credentials side by side
    w.ensure_space(28.0);
    w.y -= 10.0;
    for (sig, x) in layout.signatories.iter().zip([MARGIN_X, 125.0]) {
        w.text("__________________________", 10.0, x, w.y, &w.regular);
        w.text(sig.role, 9.0, x, w.y - 5.0, &w.bold);
        w.text(sig.name, 9.0, x, w.y - 9.5, &w.regular);
        w.text(sig.credentials, 8.0, x, w.y - 13.5, &w.regular);
    }
    w.y -= 22.0;

    // Footer
    w.ensure_space(LINE_H * 5.0);
    w.layer.set_fill_color(grey());
    w.centered("* End of Report *", 8.0, w.y, &w.regular);
    w.y -= LINE_H + 1.0;
    for line in wrap_text(layout.disclaimer, 120) {
        w.ensure_space(LINE_H);
        w.text(&line, 7.0, MARGIN_X, w.y, &w.regular);
        w.y -= 3.5;
    }
    w.layer.set_fill_color(black());

    drop(w);
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    let bytes = buf.into_inner()
        .map_err(|e| ReportError::Pdf(format!("PDF buffer error: {e}")))?;
    pin_trailer_id(&bytes, &layout.report_id)
}

/// printpdf writes a random trailer `/ID` on every save. Rewrite it from the
/// report id so equal layouts give equal bytes.
fn pin_trailer_id(bytes: &[u8], report_id: &str) -> Result<Vec<u8>, ReportError> {
    let mut pdf = lopdf::Document::load_mem(bytes)
        .map_err(|e| ReportError::Pdf(format!("PDF reload error: {e}")))?;
    let id = lopdf::Object::String(report_id.as_bytes().to_vec(), lopdf::StringFormat::Literal);
    pdf.trailer.set("ID", lopdf::Object::Array(vec![id.clone(), id]));

    let mut out = Vec::with_capacity(bytes.len());
    pdf.save_to(&mut out)
        .map_err(|e| ReportError::Pdf(format!("PDF save error: {e}")))?;
    Ok(out)
}

/// Metadata timestamp: the report's issue date at midnight UTC, or the epoch
/// when the date does not parse.
fn pinned_timestamp(layout: &ReportLayout) -> OffsetDateTime {
    layout
        .issued_on
        .and_then(|d| {
            use chrono::Datelike;
            let month = time::Month::try_from(d.month() as u8).ok()?;
            time::Date::from_calendar_date(d.year(), month, d.day() as u8).ok()
        })
        .map(|d| d.midnight().assume_utc())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TestParameter, TestResult};
    use crate::report::layout::assemble;
    use chrono::{Local, TimeZone};

    fn result_with_rows(n: usize) -> TestResult {
        let parameters = (0..n)
            .map(|i| TestParameter {
                name: format!("Parameter {i}"),
                value: format!("{}.5", i),
                unit: "mg/dL".into(),
                reference_range: "1 - 100".into(),
                method: Some("Photometric".into()),
                section: Some(if i % 10 < 5 { "PANEL A" } else { "PANEL B" }.into()),
            })
            .collect();
        TestResult {
            id: "REP-100200".into(),
            appointment_id: "APP-1".into(),
            patient_id: "patient_01".into(),
            patient_name: "Rahul Sharma".into(),
            age: "34".into(),
            gender: "Male".into(),
            ref_doctor: "Self".into(),
            sample_type: "Serum".into(),
            collected_at: "2023-11-20T09:15".into(),
            received_at: "2023-11-20T09:40".into(),
            test_name: "Liver Function Test (LFT)".into(),
            date: "2023-11-20".into(),
            parameters,
            doctor_remarks: "Values within expected limits.".into(),
            analyzer_used: None,
            internal_qc: None,
            morphology: Some("Smear unremarkable.".into()),
        }
    }

    fn render(n: usize) -> Vec<u8> {
        let when = Local.with_ymd_and_hms(2023, 11, 21, 10, 30, 0).unwrap();
        let layout = assemble(&result_with_rows(n), when).unwrap();
        render_pdf(&layout).unwrap()
    }

    #[test]
    fn test_pdf_generation() {
        let bytes = render(5);
        assert!(!bytes.is_empty());
        // PDF magic bytes: %PDF
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn same_layout_renders_identical_bytes() {
        let when = Local.with_ymd_and_hms(2023, 11, 21, 10, 30, 0).unwrap();
        let layout = assemble(&result_with_rows(8), when).unwrap();
        let a = render_pdf(&layout).unwrap();
        let b = render_pdf(&layout).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn trailer_id_carries_report_id() {
        let bytes = render(3);
        let pdf = lopdf::Document::load_mem(&bytes).unwrap();
        let id = pdf.trailer.get(b"ID").unwrap().as_array().unwrap();
        assert_eq!(id[0].as_str().unwrap(), b"REP-100200");
    }

    #[test]
    fn long_tables_spill_onto_more_pages() {
        let short = render(5);
        let long = render(120);
        assert_eq!(&long[0..4], b"%PDF");
        assert!(long.len() > short.len());
    }

    #[test]
    fn pinned_timestamp_uses_issue_date() {
        let when = Local.with_ymd_and_hms(2023, 11, 21, 10, 30, 0).unwrap();
        let layout = assemble(&result_with_rows(1), when).unwrap();
        let ts = pinned_timestamp(&layout);
        assert_eq!(ts.year(), 2023);
        assert_eq!(u8::from(ts.month()), 11);
        assert_eq!(ts.day(), 20);
    }

    #[test]
    fn test_wrap_text() {
        let text = "This is a long sentence that should be wrapped at around forty characters or so.";
        let lines = wrap_text(text, 40);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 40);
        }
    }

    #[test]
    fn long_values_render() {
        let mut result = result_with_rows(2);
        result.patient_name = "Venkata Subrahmanya Lakshmi Narasimha Rao Chowdary".into();
        result.parameters[0].value = "Pale yellow, slightly turbid with faint sediment".into();
        let when = Local.with_ymd_and_hms(2023, 11, 21, 10, 30, 0).unwrap();
        let layout = assemble(&result, when).unwrap();
        let bytes = render_pdf(&layout).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
        assert!(wrap_text(&layout.patient.left[0].value, PATIENT_LEFT_CHARS).len() > 1);
        assert!(wrap_text("Pale yellow, slightly turbid with faint sediment", RESULT_CHARS)
            .iter()
            .all(|l| l.chars().count() <= RESULT_CHARS));
    }

    #[test]
    fn test_wrap_text_empty() {
        let lines = wrap_text("", 40);
        assert_eq!(lines, vec![String::new()]);
    }
}
