//! Logging backend
//!
//! Library crates log through the `log` facade; this installs a `tracing`
//! subscriber that also receives those records.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Install the global subscriber, writing to stderr.
///
/// `filter` uses `EnvFilter` directive syntax (`"info"`,
/// `"iap_editor_core=debug,info"`). Fails if a logger is already installed.
pub fn init_logging(filter: &str) -> AppResult<()> {
    let filter = EnvFilter::try_new(filter).map_err(|e| AppError::Logging(e.to_string()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_ansi(false),
        )
        .with(filter)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::debug!("Logging initialized");
    Ok(())
}
