//! Bootstrap error type

use std::path::PathBuf;

use thiserror::Error;

use iap_editor_client::ClientError;
use iap_editor_core::EditorError;

#[derive(Error, Debug)]
pub enum AppError {
    /// The page configuration is inconsistent
    #[error("Invalid page configuration: {0}")]
    Config(String),

    /// The configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid JSON for [`PageConfig`](crate::PageConfig)
    #[error("Failed to parse page configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// A global logger is already installed
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
