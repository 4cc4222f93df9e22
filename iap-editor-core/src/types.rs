//! View-model types shared by the editing components

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use iap_editor_client::FieldValue;

// Re-export wire layer types used throughout the components
pub use iap_editor_client::{FieldErrorSet, Record};

/// Visual mode of a row or a field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

impl EditMode {
    #[must_use]
    pub fn from_start_editing(start_editing: bool) -> Self {
        if start_editing {
            Self::Editing
        } else {
            Self::Viewing
        }
    }

    #[must_use]
    pub fn is_editing(self) -> bool {
        self == Self::Editing
    }
}

/// Kind of input element a field edits through.
///
/// Free text reacts to every key release, selects and checkboxes to `change`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Select,
    Checkbox,
}

impl InputKind {
    /// Whether `event` is the one this kind of input commits on.
    #[must_use]
    pub fn reacts_to(self, event: &InputEvent) -> bool {
        matches!(
            (self, event),
            (Self::Text, InputEvent::KeyUp(_))
                | (Self::Select | Self::Checkbox, InputEvent::Change(_))
        )
    }
}

/// Raw state of an input element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    pub value: String,
    pub checked: bool,
}

impl RawInput {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            checked: false,
        }
    }

    #[must_use]
    pub fn checkbox(checked: bool) -> Self {
        Self {
            value: "on".to_string(),
            checked,
        }
    }
}

/// An input event as delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    KeyUp(RawInput),
    Change(RawInput),
}

impl InputEvent {
    #[must_use]
    pub fn raw(&self) -> &RawInput {
        match self {
            Self::KeyUp(raw) | Self::Change(raw) => raw,
        }
    }
}

/// Reads the field value out of the raw input state.
#[derive(Clone, Default)]
pub enum InputReader {
    /// The input's text value.
    #[default]
    Value,
    /// The checkbox `checked` state, as a boolean.
    Checked,
    Custom(Arc<dyn Fn(&RawInput) -> FieldValue + Send + Sync>),
}

impl InputReader {
    #[must_use]
    pub fn read(&self, raw: &RawInput) -> FieldValue {
        match self {
            Self::Value => FieldValue::text(raw.value.clone()),
            Self::Checked => FieldValue::boolean(raw.checked),
            Self::Custom(read) => read(raw),
        }
    }

    /// Write `value` back into the raw input state.
    pub fn reflect(&self, raw: &mut RawInput, value: &FieldValue) {
        match self {
            Self::Checked => raw.checked = value.as_bool(),
            Self::Value | Self::Custom(_) => raw.value = value.form_value(),
        }
    }
}

impl fmt::Debug for InputReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => f.write_str("Value"),
            Self::Checked => f.write_str("Checked"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Selectors locating the sub-elements of a field within its host node.
///
/// The host glue uses them to bind the component to markup; the core only
/// carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSelectors {
    pub output: String,
    pub input: String,
    pub error: String,
}

impl Default for FieldSelectors {
    fn default() -> Self {
        Self {
            output: "span".to_string(),
            input: r#"input[type="text"]"#.to_string(),
            error: ".field-error".to_string(),
        }
    }
}

impl FieldSelectors {
    #[must_use]
    pub fn with_input(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}
