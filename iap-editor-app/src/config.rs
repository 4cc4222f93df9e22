//! Page configuration
//!
//! The values the page markup exposes on its root container, as a typed and
//! validated struct. Loaded from JSON; every optional key has a default.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use iap_editor_client::{
    BodyEncoding, HttpTransportConfig, SaveMethod, UrlTemplate, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_PRICE_POINT_URL, DEFAULT_REQUEST_TIMEOUT_SECS,
};
use iap_editor_core::components::DEFAULT_ID_FIELD;
use iap_editor_core::{Endpoints, OptionTable, SaveOptions};

use crate::error::{AppError, AppResult};

/// Wire shape of saved records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingKind {
    Form,
    Json,
    LocalizedJson,
}

/// One entry of an already loaded price option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageConfig {
    /// Create endpoint.
    pub list_url: String,
    /// Detail endpoint template, URI-encoded the way the page embeds it.
    pub detail_url_format: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Active language; selects the localized body when no encoding is named.
    #[serde(default)]
    pub active_lang: Option<String>,
    #[serde(default)]
    pub body_encoding: Option<EncodingKind>,
    #[serde(default = "default_update_method")]
    pub update_method: SaveMethod,
    /// Base URL for the relative URLs above.
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default = "default_price_point_url")]
    pub price_point_url_format: String,
    #[serde(default = "default_currency_code")]
    pub currency_code: String,
    /// When present, prices are labelled from this list instead of the network.
    #[serde(default)]
    pub price_options: Option<Vec<PriceOption>>,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_id_field() -> String {
    DEFAULT_ID_FIELD.to_string()
}

fn default_update_method() -> SaveMethod {
    SaveMethod::Patch
}

fn default_price_point_url() -> String {
    DEFAULT_PRICE_POINT_URL.to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl PageConfig {
    /// Minimal configuration with defaults for everything optional.
    #[must_use]
    pub fn new(list_url: impl Into<String>, detail_url_format: impl Into<String>) -> Self {
        Self {
            list_url: list_url.into(),
            detail_url_format: detail_url_format.into(),
            id_field: default_id_field(),
            active_lang: None,
            body_encoding: None,
            update_method: default_update_method(),
            origin: None,
            price_point_url_format: default_price_point_url(),
            currency_code: default_currency_code(),
            price_options: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded page configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        let invalid = |msg: String| Err(AppError::Config(msg));

        if self.list_url.trim().is_empty() {
            return invalid("list_url is empty".to_string());
        }
        if self.id_field.trim().is_empty() {
            return invalid("id_field is empty".to_string());
        }
        let detail = self.detail_url()?;
        if !detail.has_placeholder(&self.id_field) {
            return invalid(format!(
                "detail_url_format '{detail}' has no {{{}}} placeholder",
                self.id_field
            ));
        }
        if self.update_method == SaveMethod::Post {
            return invalid("update_method must be patch or put".to_string());
        }
        if !UrlTemplate::new(self.price_point_url_format.as_str()).has_placeholder("id") {
            return invalid("price_point_url_format has no {id} placeholder".to_string());
        }
        if self.currency_code.trim().is_empty() {
            return invalid("currency_code is empty".to_string());
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return invalid("timeouts must be positive".to_string());
        }
        self.body_encoding()?;
        Ok(())
    }

    /// Decoded detail URL template.
    pub fn detail_url(&self) -> AppResult<UrlTemplate> {
        Ok(UrlTemplate::decode(&self.detail_url_format)?)
    }

    /// Body encoding, localized when a language is configured and no encoding
    /// is named.
    pub fn body_encoding(&self) -> AppResult<BodyEncoding> {
        let lang = self
            .active_lang
            .as_deref()
            .map(str::trim)
            .filter(|lang| !lang.is_empty());

        match (self.body_encoding, lang) {
            (Some(EncodingKind::Form), _) => Ok(BodyEncoding::Form),
            (Some(EncodingKind::Json), _) => Ok(BodyEncoding::Json),
            (Some(EncodingKind::LocalizedJson) | None, Some(lang)) => Ok(BodyEncoding::LocalizedJson {
                active_lang: lang.to_string(),
            }),
            (Some(EncodingKind::LocalizedJson), None) => Err(AppError::Config(
                "localized_json encoding requires active_lang".to_string(),
            )),
            (None, None) => Ok(BodyEncoding::Form),
        }
    }

    pub fn endpoints(&self) -> AppResult<Endpoints> {
        Ok(Endpoints {
            list_url: self.list_url.clone(),
            detail_url: self.detail_url()?,
        })
    }

    pub fn save_options(&self) -> AppResult<SaveOptions> {
        Ok(SaveOptions {
            encoding: self.body_encoding()?,
            update_method: self.update_method,
        })
    }

    #[must_use]
    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            origin: self.origin.clone(),
            price_point_url: UrlTemplate::new(self.price_point_url_format.as_str()),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    /// Table-backed price formatter, when an option list is configured.
    #[must_use]
    pub fn price_table(&self) -> Option<OptionTable> {
        self.price_options.as_ref().map(|options| {
            OptionTable::from_options(
                options
                    .iter()
                    .map(|o| (o.value.as_str(), o.label.as_str())),
            )
        })
    }
}
