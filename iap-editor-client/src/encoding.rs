//! Request body encodings
//!
//! Backends disagree on how a record is submitted: classic form posts, plain
//! JSON, and a JSON variant whose `name` is a locale-keyed mapping. The row
//! controller only ever hands over a [`Record`]; the encoding decides the wire
//! shape and, for the localized variant, how to read the response back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldValue, Record, RequestBody};

/// Field reshaped by [`BodyEncoding::LocalizedJson`].
pub const LOCALIZED_FIELD: &str = "name";
/// Field carrying the locale the localized name is written in.
pub const DEFAULT_LOCALE_FIELD: &str = "default_locale";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`.
    #[default]
    Form,
    /// The record as a JSON object.
    Json,
    /// JSON with `name` sent as `{ <active_lang>: <name> }`.
    LocalizedJson { active_lang: String },
}

impl BodyEncoding {
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Form => "application/x-www-form-urlencoded",
            Self::Json | Self::LocalizedJson { .. } => "application/json",
        }
    }

    /// Encode a record for submission.
    #[must_use]
    pub fn encode(&self, record: &Record) -> RequestBody {
        match self {
            Self::Form => RequestBody::Form(
                record
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.form_value()))
                    .collect(),
            ),
            Self::Json => RequestBody::Json(Value::Object(record.to_json_map())),
            Self::LocalizedJson { active_lang } => {
                let mut body = record.to_json_map();
                if let Some(name) = body.get_mut(LOCALIZED_FIELD) {
                    if !name.is_object() {
                        let mut localized = serde_json::Map::new();
                        localized.insert(active_lang.clone(), name.take());
                        *name = Value::Object(localized);
                    }
                }
                body.entry(DEFAULT_LOCALE_FIELD)
                    .or_insert_with(|| Value::String(active_lang.clone()));
                RequestBody::Json(Value::Object(body))
            }
        }
    }

    /// Normalize a canonical record returned by the server.
    ///
    /// The localized variant flattens `name` back to the active language's
    /// string (falling back to the first string translation).
    #[must_use]
    pub fn decode(&self, mut record: Record) -> Record {
        let Self::LocalizedJson { active_lang } = self else {
            return record;
        };
        let flattened = match record.get(LOCALIZED_FIELD).map(FieldValue::as_json) {
            Some(Value::Object(translations)) => translations
                .get(active_lang)
                .filter(|v| v.is_string())
                .or_else(|| translations.values().find(|v| v.is_string()))
                .cloned(),
            _ => None,
        };
        if let Some(name) = flattened {
            record.insert(LOCALIZED_FIELD, FieldValue::from_json(name));
        }
        record
    }
}
