//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export wire layer error type
pub use iap_editor_client::ClientError;

/// Editor core error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum EditorError {
    /// A component configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two units in one row claim the same field name
    #[error("Duplicate field in row: {0}")]
    DuplicateField(String),

    /// The row has no unit registered under this field name
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// An operation that requires the row to be in editing mode
    #[error("Row is not being edited")]
    NotEditing,

    /// Transport error (converted from the wire layer)
    #[error("{0}")]
    Client(#[from] ClientError),
}

impl EditorError {
    /// Whether it is expected behavior (caller input), used for log classification.
    ///
    /// `true` logs at `warn`, `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidConfig(_)
            | Self::DuplicateField(_)
            | Self::UnknownField(_)
            | Self::NotEditing => true,
            Self::Client(e) => e.is_expected(),
        }
    }
}

/// Editor core Result type alias
pub type EditorResult<T> = std::result::Result<T, EditorError>;
