use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Labdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_INSIGHT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_INSIGHT_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_INSIGHT_TIMEOUT_SECS: u64 = 20;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "labdesk=info,labdesk_lib=info"
}

/// Get the application data directory
/// ~/Labdesk/ on all platforms; falls back to the working directory when no
/// home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Where generated report PDFs are written.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Settings for the hosted text-generation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_INSIGHT_MODEL.to_string(),
            base_url: DEFAULT_INSIGHT_URL.to_string(),
            timeout_secs: DEFAULT_INSIGHT_TIMEOUT_SECS,
        }
    }
}

impl InsightConfig {
    /// Reads `LABDESK_GEMINI_API_KEY` (or `GEMINI_API_KEY`),
    /// `LABDESK_INSIGHT_MODEL`, `LABDESK_INSIGHT_URL` and
    /// `LABDESK_INSIGHT_TIMEOUT_SECS`. Unset or invalid values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout_secs = match non_empty("LABDESK_INSIGHT_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    tracing::warn!(value = %raw, "Invalid LABDESK_INSIGHT_TIMEOUT_SECS, using default");
                    defaults.timeout_secs
                }
            },
            None => defaults.timeout_secs,
        };

        Self {
            api_key: non_empty("LABDESK_GEMINI_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")),
            model: non_empty("LABDESK_INSIGHT_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("LABDESK_INSIGHT_URL").unwrap_or(defaults.base_url),
            timeout_secs,
        }
    }
}
