use serde::{Deserialize, Serialize};

/// Static catalog entry. `category` is a free-form filter label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticService {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Price in rupees.
    pub price: u32,
}
