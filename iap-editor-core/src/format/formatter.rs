//! Synchronous formatters

use std::collections::HashMap;

use iap_editor_client::FieldValue;

use super::{Formatted, OutputFormatter};

/// Shows the value's own text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl OutputFormatter for Identity {
    fn format(&self, value: &FieldValue) -> Formatted {
        Formatted::Ready(value.display_text())
    }
}

/// Labels a boolean field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLabel {
    pub on: String,
    pub off: String,
}

impl Default for BooleanLabel {
    fn default() -> Self {
        Self::new("Enabled", "Disabled")
    }
}

impl BooleanLabel {
    #[must_use]
    pub fn new(on: impl Into<String>, off: impl Into<String>) -> Self {
        Self {
            on: on.into(),
            off: off.into(),
        }
    }
}

impl OutputFormatter for BooleanLabel {
    fn format(&self, value: &FieldValue) -> Formatted {
        let label = if value.as_bool() { &self.on } else { &self.off };
        Formatted::text(label.clone())
    }
}

/// Table-backed formatter built once from an already loaded option list.
///
/// Lookups never touch the network; unknown keys render empty.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    labels: HashMap<String, String>,
}

impl OptionTable {
    pub fn from_options<I, K, V>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: options
                .into_iter()
                .map(|(key, label)| (key.into(), label.into()))
                .collect(),
        }
    }

    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl OutputFormatter for OptionTable {
    fn format(&self, value: &FieldValue) -> Formatted {
        let label = value
            .display_text()
            .and_then(|key| self.label(&key).map(str::to_string));
        Formatted::Ready(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identity_shows_text() {
        assert_eq!(Identity.format(&FieldValue::text("Widget")).await, Some("Widget".into()));
        assert_eq!(Identity.format(&FieldValue::null()).await, None);
    }

    #[tokio::test]
    async fn boolean_labels() {
        let labels = BooleanLabel::default();
        assert_eq!(labels.format(&FieldValue::boolean(true)).await, Some("Enabled".into()));
        assert_eq!(labels.format(&FieldValue::text("")).await, Some("Disabled".into()));
    }

    #[tokio::test]
    async fn option_table_lookups() {
        let table = OptionTable::from_options([("5", "0.99 USD"), ("6", "1.99 USD")]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.format(&FieldValue::text("5")).await, Some("0.99 USD".into()));
        assert_eq!(
            table.format(&FieldValue::from_json(serde_json::json!(6))).await,
            Some("1.99 USD".into())
        );
        assert_eq!(table.format(&FieldValue::text("7")).await, None);
        assert!(!table.format(&FieldValue::text("5")).is_pending());
    }
}
