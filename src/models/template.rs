use serde::Serialize;

/// One expected row of a test template. Same shape as a `TestParameter`
/// minus the measured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateParam {
    pub name: &'static str,
    pub unit: &'static str,
    pub reference_range: &'static str,
    pub method: Option<&'static str>,
    pub section: Option<&'static str>,
}

/// Named, pre-populated parameter list for a test type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub name: &'static str,
    pub analyzer: Option<&'static str>,
    pub params: &'static [TemplateParam],
}
