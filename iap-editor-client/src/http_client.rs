//! Shared HTTP request handling
//!
//! Sending, logging and status interpretation live here so that every call
//! made by [`HttpTransport`](crate::HttpTransport) classifies failures the same
//! way. Requests are never retried: a failed save is re-triggered by the user.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::types::FieldErrorSet;
use crate::utils::log_sanitizer::truncate_for_log;

/// HTTP helper functions
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the status code and response text
    ///
    /// # Arguments
    /// * `request_builder` - configured request (URL, headers, body)
    /// * `method_name` - verb, for logs
    /// * `url` - target URL, for logs
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` for any status the caller must interpret
    /// * `Err(ClientError::Timeout)` / `Err(ClientError::NetworkError)` for transport
    ///   failures and gateway errors (502–504)
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String), ClientError> {
        log::debug!("[http] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ClientError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[http] Response Status: {status_code}");

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[http] Gateway error (HTTP {status_code}) for {method_name} {url}");
            return Err(ClientError::NetworkError {
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError {
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[http] Response Body: {}", truncate_for_log(&response_text));

        Ok((status_code, response_text))
    }

    /// Parse a JSON response body
    pub fn parse_json<T>(response_text: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[http] JSON parse failed: {e}");
            log::error!("[http] Raw response: {}", truncate_for_log(response_text));
            ClientError::ParseError {
                detail: e.to_string(),
            }
        })
    }

    /// Interpret a status/body pair
    ///
    /// - 2xx: the body is parsed as `T`
    /// - 4xx with a field → messages object: [`ClientError::FieldErrors`]
    /// - anything else: [`ClientError::Rejected`] carrying the raw body
    pub fn interpret<T>(status_code: u16, response_text: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        if (200..300).contains(&status_code) {
            return Self::parse_json(response_text);
        }

        if (400..500).contains(&status_code) {
            if let Some(errors) = field_errors(response_text) {
                return Err(ClientError::FieldErrors { errors });
            }
        }

        Err(ClientError::Rejected {
            status: status_code,
            body: response_text.to_string(),
        })
    }
}

/// A non-empty field-error payload, if the body is one.
fn field_errors(response_text: &str) -> Option<FieldErrorSet> {
    serde_json::from_str::<FieldErrorSet>(response_text)
        .ok()
        .filter(|errors| !errors.is_empty())
}
