use serde::{Deserialize, Serialize};

use crate::types::FieldErrorSet;

/// Unified error type for all catalog transport operations.
///
/// Every variant is serializable for structured error reporting, and the enum is
/// `Clone` so that a single failed lookup can be handed to every caller waiting
/// on the same shared future.
///
/// # Row-scoped vs. field-scoped failures
///
/// - [`FieldErrors`](Self::FieldErrors) carries a per-field validation payload
///   and is routed to the individual field editors.
/// - Every other variant is unstructured and shown once at row scope, see
///   [`user_message`](Self::user_message).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum ClientError {
    /// A network-level error occurred (connection refused, DNS failure, gateway errors).
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The server rejected the record with per-field validation errors.
    FieldErrors {
        /// Field name → ordered error messages.
        errors: FieldErrorSet,
    },

    /// The server rejected the request without a structured field payload.
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Failed to parse the server response.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// Failed to serialize a request body.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// A configured or computed URL could not be used.
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        detail: String,
    },

    /// A price point has no entry for the requested currency.
    CurrencyUnavailable {
        /// Price point identifier.
        price_id: String,
        /// Currency code that was looked for.
        currency: String,
    },
}

impl ClientError {
    /// Whether the failure is expected behavior (user input, missing data),
    /// used to pick the log level.
    ///
    /// `true` logs at `warn`, `false` at `error`.
    /// **Update this method when adding variants.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::FieldErrors { .. } | Self::Rejected { .. } | Self::CurrencyUnavailable { .. }
        )
    }

    /// Text shown at row scope when the failure carries no field payload.
    ///
    /// A rejected request shows the raw response text, everything else its
    /// display string.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { body, .. } if !body.trim().is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NetworkError { detail } => write!(f, "Network error: {detail}"),
            Self::Timeout { detail } => write!(f, "Request timeout: {detail}"),
            Self::FieldErrors { errors } => {
                let fields: Vec<&str> = errors.fields().collect();
                write!(f, "Validation failed for: {}", fields.join(", "))
            }
            Self::Rejected { status, body } => {
                if body.trim().is_empty() {
                    write!(f, "Request rejected (HTTP {status})")
                } else {
                    write!(f, "Request rejected (HTTP {status}): {body}")
                }
            }
            Self::ParseError { detail } => write!(f, "Parse error: {detail}"),
            Self::SerializationError { detail } => write!(f, "Serialization error: {detail}"),
            Self::InvalidUrl { url, detail } => write!(f, "Invalid URL '{url}': {detail}"),
            Self::CurrencyUnavailable { price_id, currency } => {
                write!(f, "Price point '{price_id}' has no {currency} price")
            }
        }
    }
}

impl std::error::Error for ClientError {}

/// Convenience type alias for `Result<T, ClientError>`.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
