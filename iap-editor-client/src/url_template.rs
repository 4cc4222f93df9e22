//! Detail URL templates such as `/api/v1/apps/{origin}/in-app/{id}/`

use crate::error::{ClientError, ClientResult};

/// A URL containing `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// Build a template from its URI-encoded form (the way pages embed it, with
    /// the braces escaped as `%7B`/`%7D`).
    pub fn decode(encoded: &str) -> ClientResult<Self> {
        urlencoding::decode(encoded)
            .map(|decoded| Self::new(decoded.into_owned()))
            .map_err(|e| ClientError::InvalidUrl {
                url: encoded.to_string(),
                detail: e.to_string(),
            })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.raw.contains(&format!("{{{name}}}"))
    }

    /// Substitute every `{name}` with the percent-encoded `value`.
    #[must_use]
    pub fn expand(&self, name: &str, value: &str) -> String {
        self.raw
            .replace(&format!("{{{name}}}"), &urlencoding::encode(value))
    }
}

impl std::fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
