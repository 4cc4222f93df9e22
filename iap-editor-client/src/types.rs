//! Catalog record and wire types

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Field values ============

/// An opaque field value (text, boolean, number or identifier).
///
/// Serialized transparently as the underlying JSON value so that server
/// responses map onto records without a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValue(Value);

impl FieldValue {
    #[must_use]
    pub fn null() -> Self {
        Self(Value::Null)
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self(Value::String(value.into()))
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self(Value::Bool(value))
    }

    #[must_use]
    pub fn from_json(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_json(self) -> Value {
        self.0
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Null or an empty/whitespace-only string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text shown for this value, `None` for null.
    #[must_use]
    pub fn display_text(&self) -> Option<String> {
        match &self.0 {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Boolean reading of the value. Strings `true`, `on` and `1` count as set.
    #[must_use]
    pub fn as_bool(&self) -> bool {
        match &self.0 {
            Value::Bool(b) => *b,
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "on" | "1"),
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => false,
        }
    }

    /// Loose comparison: scalars compare by their text, so `"5"` equals `5`
    /// and `true` equals `"true"`. Null only equals null.
    #[must_use]
    pub fn loosely_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                self.0 == other.0
            }
            _ => self.display_text() == other.display_text(),
        }
    }

    /// Value as sent in a form-encoded body.
    #[must_use]
    pub fn form_value(&self) -> String {
        self.display_text().unwrap_or_default()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::boolean(value)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.form_value())
    }
}

// ============ Records ============

/// One catalog row: field name → value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, FieldValue>);

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.0.remove(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Server identifier stored under `id_field`, `None` for a record that has
    /// not been created yet.
    #[must_use]
    pub fn identifier(&self, id_field: &str) -> Option<String> {
        self.get(id_field)
            .filter(|v| !v.is_blank())
            .and_then(FieldValue::display_text)
            .map(|id| id.trim().to_string())
    }

    /// The record as a JSON object.
    #[must_use]
    pub fn to_json_map(&self) -> serde_json::Map<String, Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.as_json().clone()))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ============ Field errors ============

/// Per-field validation errors returned by a failed save.
///
/// Deserializes from `{"field": ["msg", ...]}` as well as `{"field": "msg"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrorSet(BTreeMap<String, Vec<String>>);

impl FieldErrorSet {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, the one a field editor shows.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for FieldErrorSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Messages {
            Many(Vec<String>),
            One(String),
        }

        let raw = BTreeMap::<String, Messages>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .map(|(field, messages)| {
                    let messages = match messages {
                        Messages::Many(list) => list,
                        Messages::One(single) => vec![single],
                    };
                    (field, messages)
                })
                .collect(),
        ))
    }
}

// ============ Price points ============

/// One price of a price point in a given currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Amount as text (the API sends either a string or a number).
    #[serde(deserialize_with = "amount_as_text")]
    pub price: String,
    pub currency: String,
}

/// A price point resource: all prices for one price identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(default)]
    pub prices: Vec<Price>,
}

impl PricePoint {
    /// `"<amount> <currency>"` for the first price in `currency`.
    #[must_use]
    pub fn formatted_for(&self, currency: &str) -> Option<String> {
        self.prices
            .iter()
            .find(|p| p.currency == currency)
            .map(|p| format!("{} {}", p.price, p.currency))
    }
}

fn amount_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("unexpected price amount: {other}"))),
    }
}

// ============ Save requests ============

/// HTTP verb used to persist a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMethod {
    Post,
    Put,
    Patch,
}

impl SaveMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl fmt::Display for SaveMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// `application/json` document.
    Json(Value),
}

/// A fully resolved create/update request.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub method: SaveMethod,
    pub url: String,
    pub body: RequestBody,
}
