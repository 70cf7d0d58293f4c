pub mod catalog;
pub mod config;
pub mod insight; // Plain-language result insights
pub mod models;
pub mod report; // NABL-style PDF report
pub mod store;
pub mod submission; // Staff report entry
pub mod templates;

use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
