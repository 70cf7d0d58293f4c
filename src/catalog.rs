//! Static service catalog, categories and bookable time slots.

use std::sync::LazyLock;

use crate::models::DiagnosticService;

pub const CATEGORIES: &[&str] = &[
    "Blood Tests",
    "Urine Tests",
    "Sputum Tests",
    "Hormone Tests",
    "Vitamin Tests",
    "Clinical Pathology",
    "Microbiology",
    "Biochemistry",
];

/// Category label that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

pub const TIME_SLOTS: &[&str] = &[
    "08:00 AM", "08:30 AM", "09:00 AM", "09:30 AM", "10:00 AM", "10:30 AM",
    "11:00 AM", "11:30 AM", "04:00 PM", "04:30 PM", "05:00 PM", "05:30 PM",
    "06:00 PM", "06:30 PM", "07:00 PM",
];

// (id, name, category, description, price)
const SERVICE_ROWS: &[(&str, &str, &str, &str, u32)] = &[
    ("b1", "Complete Blood Picture (CBC)", "Blood Tests", "Comprehensive panel measuring red cells, white cells, and platelets.", 350),
    ("b2", "Blood Sugar (Fasting/PP)", "Blood Tests", "Measures blood glucose levels to screen for diabetes.", 150),
    ("b3", "Lipid Profile", "Blood Tests", "Measures cholesterol and triglyceride levels.", 600),
    ("u1", "Routine Urine Analysis", "Urine Tests", "Basic screening for kidney function and infection.", 200),
    ("u2", "Urine Culture & Sensitivity", "Urine Tests", "Identifies bacteria causing urinary tract infections.", 550),
    ("s1", "Sputum for AFB", "Sputum Tests", "Tests for acid-fast bacilli (typically TB screening).", 400),
    ("h1", "Thyroid Profile (T3, T4, TSH)", "Hormone Tests", "Assesses thyroid gland activity.", 750),
    ("h2", "Testosterone Total", "Hormone Tests", "Measures primary male sex hormone levels.", 850),
    ("v1", "Vitamin D (25-OH)", "Vitamin Tests", "Checks for Vitamin D deficiency.", 1200),
    ("v2", "Vitamin B12", "Vitamin Tests", "Measures Vitamin B12 levels in blood.", 900),
    ("cp1", "Stool Examination", "Clinical Pathology", "Screening for parasites or hidden blood.", 250),
    ("m1", "Widal Test", "Microbiology", "Diagnostic test for typhoid fever.", 300),
    ("bc1", "Liver Function Test (LFT)", "Biochemistry", "Assesses health of your liver.", 800),
    ("bc2", "Kidney Function Test (KFT)", "Biochemistry", "Assesses health of your kidneys.", 700),
];

pub static SERVICES: LazyLock<Vec<DiagnosticService>> = LazyLock::new(|| {
    SERVICE_ROWS
        .iter()
        .map(|&(id, name, category, description, price)| DiagnosticService {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            description: description.into(),
            price,
        })
        .collect()
});

pub fn find_service(id: &str) -> Option<&'static DiagnosticService> {
    SERVICES.iter().find(|s| s.id == id)
}

/// Services matching a category (`None` or "All" matches every category)
/// and a case-insensitive name substring. Catalog order is preserved.
pub fn filter_services(category: Option<&str>, query: &str) -> Vec<&'static DiagnosticService> {
    let query = query.trim().to_lowercase();
    SERVICES
        .iter()
        .filter(|s| match category {
            None | Some(ALL_CATEGORIES) => true,
            Some(c) => s.category == c,
        })
        .filter(|s| query.is_empty() || s.name.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_has_a_known_category() {
        for s in SERVICES.iter() {
            assert!(CATEGORIES.contains(&s.category.as_str()), "{}", s.id);
        }
    }

    #[test]
    fn service_ids_are_unique() {
        let mut ids: Vec<&str> = SERVICES.iter().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SERVICES.len());
    }

    #[test]
    fn find_cbc_service() {
        let s = find_service("b1").unwrap();
        assert_eq!(s.name, "Complete Blood Picture (CBC)");
        assert!(find_service("zz").is_none());
    }

    #[test]
    fn filter_by_category() {
        let urine = filter_services(Some("Urine Tests"), "");
        assert_eq!(urine.len(), 2);
        assert!(urine.iter().all(|s| s.category == "Urine Tests"));
    }

    #[test]
    fn filter_all_with_query_is_case_insensitive() {
        let hits = filter_services(Some(ALL_CATEGORIES), "vitamin");
        let ids: Vec<&str> = hits.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
    }

    #[test]
    fn filter_no_match() {
        assert!(filter_services(None, "x-ray").is_empty());
        assert!(filter_services(Some("Biochemistry"), "urine").is_empty());
    }
}
