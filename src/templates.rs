//! Per-test-type parameter templates used to seed report data entry.
//!
//! Lookup is exact-match on a hand-authored code set. An unknown code is not
//! an error: callers fall back to a single blank row.

use crate::models::{Template, TemplateParam, TestParameter};

const fn row(
    name: &'static str,
    unit: &'static str,
    reference_range: &'static str,
    method: Option<&'static str>,
    section: Option<&'static str>,
) -> TemplateParam {
    TemplateParam { name, unit, reference_range, method, section }
}

const HAEMOGRAM: Option<&str> = Some("HAEMOGRAM");
const LEUKOCYTES: Option<&str> = Some("LEUKOCYTE COUNT");
const DIFFERENTIAL: Option<&str> = Some("DIFFERENTIAL COUNT");
const PLATELETS: Option<&str> = Some("PLATELET COUNT");

static CBC: Template = Template {
    name: "Complete Blood Picture (CBC)",
    analyzer: Some("Automated Hematology Analyzer"),
    params: &[
        row("Hemoglobin (Hb)", "g/dL", "13.0 - 17.0", Some("Photometric"), HAEMOGRAM),
        row("Total RBC Count", "mill/cumm", "4.5 - 5.5", Some("Impedance"), HAEMOGRAM),
        row("Packed Cell Volume (PCV)", "%", "40 - 50", Some("Calculated"), HAEMOGRAM),
        row("Mean Corpuscular Volume (MCV)", "fL", "83 - 101", Some("Calculated"), HAEMOGRAM),
        row("MCH", "pg", "27 - 32", Some("Calculated"), HAEMOGRAM),
        row("MCHC", "g/dL", "31.5 - 34.5", Some("Calculated"), HAEMOGRAM),
        row("RDW-CV", "%", "11.6 - 14.0", Some("Calculated"), HAEMOGRAM),
        row("Total WBC Count", "cumm", "4000 - 11000", Some("Impedance"), LEUKOCYTES),
        row("Neutrophils", "%", "40 - 80", Some("Flow Cytometry"), DIFFERENTIAL),
        row("Lymphocytes", "%", "20 - 40", Some("Flow Cytometry"), DIFFERENTIAL),
        row("Eosinophils", "%", "1 - 6", Some("Flow Cytometry"), DIFFERENTIAL),
        row("Monocytes", "%", "2 - 10", Some("Flow Cytometry"), DIFFERENTIAL),
        row("Basophils", "%", "0 - 2", Some("Flow Cytometry"), DIFFERENTIAL),
        row("Platelet Count", "cumm", "150000 - 410000", Some("Impedance"), PLATELETS),
        row("Mean Platelet Volume (MPV)", "fL", "7.5 - 11.5", Some("Calculated"), PLATELETS),
    ],
};

static SUGAR: Template = Template {
    name: "Blood Sugar Tests",
    analyzer: Some("Semi-Automated Biochemistry Analyzer"),
    params: &[
        row("Fasting Blood Sugar (FBS)", "mg/dL", "70 - 99", Some("GOD-POD"), None),
        row("Post Prandial Blood Sugar (PPBS)", "mg/dL", "< 140", Some("GOD-POD"), None),
        row("HbA1c", "%", "< 5.7", Some("HPLC"), None),
    ],
};

static LIPID: Template = Template {
    name: "Lipid Profile",
    analyzer: Some("Fully Automated Biochemistry Analyzer"),
    params: &[
        row("Total Cholesterol", "mg/dL", "< 200", Some("CHOD-PAP"), None),
        row("Triglycerides", "mg/dL", "< 150", Some("GPO-PAP"), None),
        row("HDL Cholesterol", "mg/dL", "M: > 40, F: > 50", Some("Direct"), None),
        row("LDL Cholesterol", "mg/dL", "< 100", Some("Calculated"), None),
        row("VLDL Cholesterol", "mg/dL", "< 30", Some("Calculated"), None),
    ],
};

static LFT: Template = Template {
    name: "Liver Function Test (LFT)",
    analyzer: Some("Fully Automated Biochemistry Analyzer"),
    params: &[
        row("Total Bilirubin", "mg/dL", "0.3 - 1.2", Some("Diazo"), Some("BILIRUBIN")),
        row("Direct Bilirubin", "mg/dL", "0.0 - 0.3", Some("Diazo"), Some("BILIRUBIN")),
        row("Indirect Bilirubin", "mg/dL", "0.2 - 0.9", Some("Calculated"), Some("BILIRUBIN")),
        row("SGOT (AST)", "U/L", "5 - 40", Some("IFCC"), Some("ENZYMES")),
        row("SGPT (ALT)", "U/L", "7 - 56", Some("IFCC"), Some("ENZYMES")),
        row("Alkaline Phosphatase (ALP)", "U/L", "44 - 147", Some("PNPP"), Some("ENZYMES")),
        row("Total Protein", "g/dL", "6.0 - 8.3", Some("Biuret"), Some("PROTEINS")),
        row("Albumin", "g/dL", "3.5 - 5.5", Some("BCG"), Some("PROTEINS")),
    ],
};

static KFT: Template = Template {
    name: "Kidney Function Test (KFT)",
    analyzer: Some("Fully Automated Biochemistry Analyzer"),
    params: &[
        row("Blood Urea", "mg/dL", "15 - 40", Some("Urease-GLDH"), None),
        row("Serum Creatinine", "mg/dL", "0.6 - 1.3", Some("Jaffe Kinetic"), None),
        row("Uric Acid", "mg/dL", "M: 3.5 - 7.2, F: 2.6 - 6.0", Some("Uricase"), None),
        row("Sodium", "mEq/L", "135 - 145", Some("ISE"), Some("ELECTROLYTES")),
        row("Potassium", "mEq/L", "3.5 - 5.0", Some("ISE"), Some("ELECTROLYTES")),
        row("Chloride", "mEq/L", "98 - 107", Some("ISE"), Some("ELECTROLYTES")),
    ],
};

static THYROID: Template = Template {
    name: "Thyroid Profile (T3, T4, TSH)",
    analyzer: Some("Chemiluminescence Immunoassay Analyzer"),
    params: &[
        row("Total T3", "ng/dL", "80 - 200", Some("CLIA"), None),
        row("Total T4", "µg/dL", "5.1 - 14.1", Some("CLIA"), None),
        row("TSH", "µIU/mL", "0.27 - 4.2", Some("CLIA"), None),
    ],
};

static VITAMINS: Template = Template {
    name: "Vitamins & Minerals",
    analyzer: Some("Chemiluminescence Immunoassay Analyzer"),
    params: &[
        row("Vitamin D (25-OH)", "ng/mL", "30 - 100", Some("CLIA"), None),
        row("Vitamin B12", "pg/mL", "200 - 900", Some("CLIA"), None),
        row("Calcium", "mg/dL", "8.6 - 10.2", Some("Arsenazo III"), None),
    ],
};

static URINE: Template = Template {
    name: "Routine Urine Examination",
    analyzer: None,
    params: &[
        row("Colour", "n/a", "Pale yellow", Some("Visual"), Some("PHYSICAL EXAMINATION")),
        row("Appearance", "n/a", "Clear", Some("Visual"), Some("PHYSICAL EXAMINATION")),
        row("pH", "n/a", "4.5 - 8.0", Some("Dipstick"), Some("CHEMICAL EXAMINATION")),
        row("Protein", "n/a", "Negative", Some("Dipstick"), Some("CHEMICAL EXAMINATION")),
        row("Glucose", "n/a", "Negative", Some("Dipstick"), Some("CHEMICAL EXAMINATION")),
        row("Ketones", "n/a", "Negative", Some("Dipstick"), Some("CHEMICAL EXAMINATION")),
        row("Pus Cells", "/HPF", "0 - 5", Some("Microscopy"), Some("MICROSCOPIC EXAMINATION")),
        row("RBC", "/HPF", "0 - 2", Some("Microscopy"), Some("MICROSCOPIC EXAMINATION")),
        row("Bacteria", "n/a", "Absent", Some("Microscopy"), Some("MICROSCOPIC EXAMINATION")),
    ],
};

static HORMONES: Template = Template {
    name: "Hormone Test Panel",
    analyzer: Some("Chemiluminescence Immunoassay Analyzer"),
    params: &[
        row("Testosterone Total", "ng/dL", "M: 300 - 1000, F: 15 - 70", Some("CLIA"), None),
        row("Prolactin", "ng/mL", "4 - 23", Some("CLIA"), None),
        row("FSH", "mIU/mL", "4 - 10", Some("CLIA"), None),
        row("LH", "mIU/mL", "5 - 20", Some("CLIA"), None),
        row("Cortisol (AM)", "µg/dL", "5 - 25", Some("CLIA"), None),
    ],
};

/// Every code `get_template` answers for, in display order.
pub const TEMPLATE_CODES: &[&str] = &[
    "CBC", "SUGAR", "LFT", "KFT", "LIPID", "THYROID", "VITAMINS", "URINE", "HORMONES",
];

/// Exact-match template lookup. "RFT" is the renal-panel alias of "KFT".
pub fn get_template(code: &str) -> Option<&'static Template> {
    match code {
        "CBC" => Some(&CBC),
        "SUGAR" => Some(&SUGAR),
        "LFT" => Some(&LFT),
        "KFT" | "RFT" => Some(&KFT),
        "LIPID" => Some(&LIPID),
        "THYROID" => Some(&THYROID),
        "VITAMINS" => Some(&VITAMINS),
        "URINE" => Some(&URINE),
        "HORMONES" => Some(&HORMONES),
        _ => None,
    }
}

/// Empty-valued rows for a template, in declared order.
pub fn instantiate(template: &Template) -> Vec<TestParameter> {
    template
        .params
        .iter()
        .map(|p| TestParameter {
            name: p.name.to_string(),
            value: String::new(),
            unit: p.unit.to_string(),
            reference_range: p.reference_range.to_string(),
            method: p.method.map(str::to_string),
            section: p.section.map(str::to_string),
        })
        .collect()
}

/// The row a fresh entry form starts with.
pub fn blank_parameter() -> TestParameter {
    TestParameter::default()
}

/// Template rows for `code`, or a single blank row when the code is unknown.
pub fn parameters_for_code(code: &str) -> Vec<TestParameter> {
    match get_template(code) {
        Some(template) => instantiate(template),
        None => vec![blank_parameter()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_code_resolves() {
        for code in TEMPLATE_CODES {
            let t = get_template(code).unwrap_or_else(|| panic!("missing {code}"));
            assert!(!t.params.is_empty(), "{code} has no rows");
        }
    }

    #[test]
    fn lookup_is_exact_match() {
        assert!(get_template("cbc").is_none());
        assert!(get_template(" CBC").is_none());
        assert!(get_template("NONSENSE").is_none());
    }

    #[test]
    fn rft_aliases_kft() {
        assert_eq!(get_template("RFT"), get_template("KFT"));
    }

    #[test]
    fn instantiated_rows_are_blank_and_ordered() {
        for code in TEMPLATE_CODES {
            let template = get_template(code).unwrap();
            let rows = instantiate(template);
            assert_eq!(rows.len(), template.params.len());
            for (row, declared) in rows.iter().zip(template.params) {
                assert_eq!(row.value, "");
                assert_eq!(row.name, declared.name);
                assert_eq!(row.unit, declared.unit);
                assert_eq!(row.reference_range, declared.reference_range);
                assert_eq!(row.method.as_deref(), declared.method);
                assert_eq!(row.section.as_deref(), declared.section);
            }
        }
    }

    #[test]
    fn cbc_has_fifteen_sectioned_rows() {
        let rows = instantiate(get_template("CBC").unwrap());
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].section.as_deref(), Some("HAEMOGRAM"));
        assert_eq!(rows[0].name, "Hemoglobin (Hb)");
        assert!(rows.iter().all(|r| r.section.is_some()));
        assert_eq!(rows[14].section.as_deref(), Some("PLATELET COUNT"));
    }

    #[test]
    fn sugar_has_three_unsectioned_rows() {
        let rows = instantiate(get_template("SUGAR").unwrap());
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.section.is_none()));
    }

    #[test]
    fn unknown_code_falls_back_to_one_blank_row() {
        let rows = parameters_for_code("NONSENSE");
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "");
        assert_eq!(row.value, "");
        assert_eq!(row.unit, "");
        assert_eq!(row.reference_range, "");
    }
}
