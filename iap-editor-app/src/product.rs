//! In-app product rows
//!
//! Field wiring for one product row: a price select labelled through the
//! shared price formatter, a free-text name, an active checkbox, a logo URL
//! edited through a prompt, and the read-only identifier.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use iap_editor_client::{FieldValue, Record};
use iap_editor_core::types::RawInput;
use iap_editor_core::{
    DisplayConfig, EditorContext, FieldEditConfig, RowConfig, RowTemplate, SharedFormatter,
};

pub const PRICE_FIELD: &str = "price_id";
pub const NAME_FIELD: &str = "name";
pub const ACTIVE_FIELD: &str = "active";
pub const LOGO_FIELD: &str = "logo_url";

/// Values read out of an already rendered product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRowSnapshot {
    /// Text of the identifier cell, empty for a product not created yet.
    pub pk_text: String,
    pub name_input: String,
    pub name_text: String,
    /// Selected price option value.
    pub price_value: String,
    /// Price label currently shown.
    pub price_label: String,
    pub active: bool,
    pub logo_src: Option<String>,
}

impl Default for ProductRowSnapshot {
    fn default() -> Self {
        Self {
            pk_text: String::new(),
            name_input: String::new(),
            name_text: String::new(),
            price_value: String::new(),
            price_label: String::new(),
            active: true,
            logo_src: None,
        }
    }
}

impl ProductRowSnapshot {
    /// Record known before any field unit is attached.
    #[must_use]
    pub fn initial_record(&self, id_field: &str) -> Record {
        let mut record = Record::new();
        record.insert(id_field, self.pk_text.trim());
        if let Some(logo) = self.logo_src.as_deref().filter(|src| !src.trim().is_empty()) {
            record.insert(LOGO_FIELD, logo);
        }
        record
    }
}

/// Builds product rows.
pub struct ProductTemplate {
    id_field: String,
    price_formatter: SharedFormatter,
}

impl ProductTemplate {
    #[must_use]
    pub fn new(id_field: impl Into<String>, price_formatter: SharedFormatter) -> Self {
        Self {
            id_field: id_field.into(),
            price_formatter,
        }
    }

    /// Template labelling prices through the context's shared cache.
    #[must_use]
    pub fn with_price_cache(id_field: impl Into<String>, ctx: &EditorContext) -> Self {
        let price_formatter: SharedFormatter = ctx.price_cache().clone();
        Self::new(id_field, price_formatter)
    }

    fn config(&self, fields: [FieldEditConfig; 3], initial: Record, start_editing: bool) -> RowConfig {
        RowConfig {
            id_field: self.id_field.clone(),
            start_editing,
            initial,
            fields: fields
                .into_iter()
                .map(|field| field.start_editing(start_editing))
                .collect(),
            displays: vec![DisplayConfig::new(self.id_field.clone())],
            external_fields: vec![LOGO_FIELD.to_string()],
            focus_field: Some(NAME_FIELD.to_string()),
            ..RowConfig::default()
        }
    }

    fn price(&self) -> FieldEditConfig {
        FieldEditConfig::select(PRICE_FIELD).with_formatter(Arc::clone(&self.price_formatter))
    }

    /// Row over a rendered product, each field seeded from what the row shows.
    #[must_use]
    pub fn config_for_snapshot(&self, snapshot: &ProductRowSnapshot, start_editing: bool) -> RowConfig {
        let fields = [
            self.price()
                .with_input(RawInput::text(snapshot.price_value.as_str()))
                .with_output(snapshot.price_label.as_str()),
            FieldEditConfig::new(NAME_FIELD)
                .with_input(RawInput::text(snapshot.name_input.as_str()))
                .with_output(snapshot.name_text.as_str()),
            FieldEditConfig::checkbox(ACTIVE_FIELD).with_input(RawInput::checkbox(snapshot.active)),
        ];
        self.config(fields, snapshot.initial_record(&self.id_field), start_editing)
    }
}

impl RowTemplate for ProductTemplate {
    fn blank_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(self.id_field.as_str(), "");
        record.insert(NAME_FIELD, "");
        record.insert(PRICE_FIELD, "");
        record.insert(ACTIVE_FIELD, true);
        record
    }

    fn row_config(&self, record: Record, start_editing: bool) -> RowConfig {
        let value = |name: &str| record.get(name).cloned().unwrap_or_else(FieldValue::null);
        let fields = [
            self.price().with_value(value(PRICE_FIELD)),
            FieldEditConfig::new(NAME_FIELD).with_value(value(NAME_FIELD)),
            FieldEditConfig::checkbox(ACTIVE_FIELD).with_value(value(ACTIVE_FIELD).as_bool()),
        ];
        self.config(fields, record, start_editing)
    }
}
