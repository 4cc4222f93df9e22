//! Field Edit Unit: the editable counterpart of one field
//!
//! A unit owns three sub-elements (rendered output, raw input, error text) and
//! a two-state visual mode. It keeps a committed value and a scratch record
//! holding just that value; the scratch record feeds the unit's own
//! [`FieldDisplay`] through a private bus so the formatted output follows the
//! input without going through the row.
//!
//! Value changes are announced on the row bus as `field-changed`. Errors
//! addressed to the unit's field are claimed (propagation stops) and the first
//! message is shown.

use std::sync::{Arc, Mutex, Weak};

use iap_editor_client::{FieldValue, Record};

use super::display::{DisplayConfig, FieldDisplay};
use crate::error::{EditorError, EditorResult};
use crate::events::{EventBus, Phase, Propagation, RowEvent, Subscription};
use crate::format::{identity, BooleanLabel, SharedFormatter};
use crate::types::{EditMode, FieldSelectors, InputEvent, InputKind, InputReader, RawInput};
use crate::utils::lock;

/// Marker class toggled while a field or row is being edited.
pub const DEFAULT_EDITING_CLASS: &str = "editing";

/// Configuration of a [`FieldEdit`].
#[derive(Clone)]
pub struct FieldEditConfig {
    pub name: String,
    pub input_kind: InputKind,
    pub selectors: FieldSelectors,
    pub editing_class: String,
    /// Begin in editing mode.
    pub start_editing: bool,
    /// Follow the row's `start-edit`/`done-edit`.
    pub track_row_mode: bool,
    pub formatter: SharedFormatter,
    pub input_reader: InputReader,
    /// Explicit initial value; seeded from the input or output when absent.
    pub value: Option<FieldValue>,
    /// Input state found at mount.
    pub initial_input: RawInput,
    /// Output text found at mount.
    pub initial_output: String,
}

impl FieldEditConfig {
    /// Free-text field with default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            input_kind: InputKind::Text,
            selectors: FieldSelectors::default(),
            editing_class: DEFAULT_EDITING_CLASS.to_string(),
            start_editing: false,
            track_row_mode: true,
            formatter: identity(),
            input_reader: InputReader::Value,
            value: None,
            initial_input: RawInput::default(),
            initial_output: String::new(),
        }
    }

    /// Field edited through a `<select>`.
    #[must_use]
    pub fn select(name: impl Into<String>) -> Self {
        Self {
            input_kind: InputKind::Select,
            selectors: FieldSelectors::with_input("select"),
            ..Self::new(name)
        }
    }

    /// Boolean field edited through a checkbox, shown as enabled/disabled.
    #[must_use]
    pub fn checkbox(name: impl Into<String>) -> Self {
        Self {
            input_kind: InputKind::Checkbox,
            selectors: FieldSelectors::with_input(r#"input[type="checkbox"]"#),
            formatter: Arc::new(BooleanLabel::default()),
            input_reader: InputReader::Checked,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: RawInput) -> Self {
        self.initial_input = input;
        self
    }

    #[must_use]
    pub fn with_output(mut self, text: impl Into<String>) -> Self {
        self.initial_output = text.into();
        self
    }

    #[must_use]
    pub fn start_editing(mut self, start_editing: bool) -> Self {
        self.start_editing = start_editing;
        self
    }

    #[must_use]
    pub fn track_row_mode(mut self, track: bool) -> Self {
        self.track_row_mode = track;
        self
    }

    pub fn validate(&self) -> EditorResult<()> {
        if self.name.trim().is_empty() {
            return Err(EditorError::InvalidConfig("field name is empty".to_string()));
        }
        if self.editing_class.trim().is_empty() {
            return Err(EditorError::InvalidConfig(format!(
                "field '{}' has an empty editing class",
                self.name
            )));
        }
        Ok(())
    }

    /// Initial value: explicit, else a non-blank input, else the shown text.
    fn seed(&self) -> FieldValue {
        if let Some(value) = &self.value {
            return value.clone();
        }
        let from_input = self.input_reader.read(&self.initial_input);
        if from_input.is_blank() {
            FieldValue::text(self.initial_output.clone())
        } else {
            from_input
        }
    }
}

impl std::fmt::Debug for FieldEditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEditConfig")
            .field("name", &self.name)
            .field("input_kind", &self.input_kind)
            .field("start_editing", &self.start_editing)
            .field("track_row_mode", &self.track_row_mode)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

struct EditState {
    /// `None` until the seed value is committed.
    committed: Option<FieldValue>,
    scratch: Record,
    input: RawInput,
    error: Option<String>,
    mode: EditMode,
    has_focus: bool,
}

struct EditInner {
    name: String,
    input_kind: InputKind,
    input_reader: InputReader,
    editing_class: String,
    track_row_mode: bool,
    selectors: FieldSelectors,
    row_bus: EventBus,
    local_bus: EventBus,
    state: Mutex<EditState>,
}

impl EditInner {
    fn set_value(&self, value: FieldValue) -> bool {
        let scratch = {
            let mut state = lock(&self.state);
            if state
                .committed
                .as_ref()
                .is_some_and(|committed| committed.loosely_eq(&value))
            {
                return false;
            }
            state.committed = Some(value.clone());
            state.scratch.insert(self.name.clone(), value.clone());
            self.input_reader.reflect(&mut state.input, &value);
            state.scratch.clone()
        };

        log::debug!("[field {}] Value changed to {value}", self.name);
        self.row_bus.publish(&RowEvent::FieldChanged {
            name: self.name.clone(),
            value,
        });
        self.local_bus
            .publish(&RowEvent::RecordChanged { record: scratch });
        lock(&self.state).error = None;
        true
    }

    /// Adopt a canonical value without announcing a change.
    fn sync(&self, value: &FieldValue) {
        let scratch = {
            let mut state = lock(&self.state);
            if state
                .committed
                .as_ref()
                .is_some_and(|committed| committed.loosely_eq(value))
            {
                return;
            }
            state.committed = Some(value.clone());
            state.scratch.insert(self.name.clone(), value.clone());
            self.input_reader.reflect(&mut state.input, value);
            state.scratch.clone()
        };
        self.local_bus
            .publish(&RowEvent::RecordChanged { record: scratch });
    }

    fn set_mode(&self, mode: EditMode) {
        let mut state = lock(&self.state);
        state.mode = mode;
        if !mode.is_editing() {
            state.has_focus = false;
        }
    }

    /// Claim the row's input focus for this field.
    fn take_focus(&self) {
        self.row_bus.publish(&RowEvent::Focus {
            name: self.name.clone(),
        });
    }

    fn show_errors(&self, errors: &[String]) {
        let message = errors.first().cloned();
        if let Some(message) = &message {
            log::debug!("[field {}] Showing error: {message}", self.name);
        }
        lock(&self.state).error = message;
    }

    fn handle_row_event(&self, event: &RowEvent) -> Propagation {
        match event {
            RowEvent::FieldErrors {
                target: Some(target),
                errors,
            } if *target == self.name => {
                self.show_errors(errors);
                Propagation::Stop
            }
            RowEvent::StartEdit if self.track_row_mode => {
                self.set_mode(EditMode::Editing);
                Propagation::Continue
            }
            RowEvent::DoneEdit if self.track_row_mode => {
                self.set_mode(EditMode::Viewing);
                Propagation::Continue
            }
            RowEvent::RecordChanged { record } => {
                if let Some(value) = record.get(&self.name) {
                    self.sync(value);
                }
                Propagation::Continue
            }
            RowEvent::Focus { name } => {
                let mut state = lock(&self.state);
                state.has_focus = *name == self.name && state.mode.is_editing();
                Propagation::Continue
            }
            _ => Propagation::Continue,
        }
    }
}

/// Editable unit for one field of a row.
pub struct FieldEdit {
    inner: Arc<EditInner>,
    display: FieldDisplay,
    _row_subscription: Subscription,
}

impl FieldEdit {
    /// Mount a unit on `row_bus`.
    ///
    /// The seed value is committed right away, which announces it on the row
    /// bus as the field's first `field-changed`.
    pub fn new(config: FieldEditConfig, row_bus: &EventBus) -> EditorResult<Self> {
        config.validate()?;

        let local_bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new(config.name.clone()).with_formatter(Arc::clone(&config.formatter)),
            &local_bus,
        )?;

        let mode = EditMode::from_start_editing(config.start_editing);
        let seed = config.seed();
        let inner = Arc::new(EditInner {
            name: config.name,
            input_kind: config.input_kind,
            input_reader: config.input_reader,
            editing_class: config.editing_class,
            track_row_mode: config.track_row_mode,
            selectors: config.selectors,
            row_bus: row_bus.clone(),
            local_bus,
            state: Mutex::new(EditState {
                committed: None,
                scratch: Record::new(),
                input: config.initial_input,
                error: None,
                mode,
                has_focus: false,
            }),
        });

        let weak: Weak<EditInner> = Arc::downgrade(&inner);
        let subscription = row_bus.subscribe(Phase::Field, move |event| match weak.upgrade() {
            Some(inner) => inner.handle_row_event(event),
            None => Propagation::Continue,
        });

        inner.set_value(seed);
        if mode.is_editing() {
            inner.take_focus();
        }

        Ok(Self {
            inner,
            display,
            _row_subscription: subscription,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Commit `value`. Returns whether it differed from the committed value.
    pub fn set_value(&self, value: impl Into<FieldValue>) -> bool {
        self.inner.set_value(value.into())
    }

    /// Feed a raw input event. Events the input kind does not commit on are
    /// ignored.
    pub fn handle_input(&self, event: InputEvent) -> bool {
        if !self.inner.input_kind.reacts_to(&event) {
            return false;
        }
        let raw = match event {
            InputEvent::KeyUp(raw) | InputEvent::Change(raw) => raw,
        };
        let value = self.inner.input_reader.read(&raw);
        lock(&self.inner.state).input = raw;
        self.inner.set_value(value)
    }

    /// Enter editing on this field alone and move focus to it.
    pub fn start_edit(&self) {
        self.inner.set_mode(EditMode::Editing);
        self.inner.take_focus();
    }

    pub fn done_edit(&self) {
        self.inner.set_mode(EditMode::Viewing);
    }

    #[must_use]
    pub fn value(&self) -> Option<FieldValue> {
        lock(&self.inner.state).committed.clone()
    }

    /// Formatted output text.
    #[must_use]
    pub fn output_text(&self) -> String {
        self.display.text()
    }

    #[must_use]
    pub fn input(&self) -> RawInput {
        lock(&self.inner.state).input.clone()
    }

    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        lock(&self.inner.state).error.clone()
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        lock(&self.inner.state).mode
    }

    /// Whether the editing marker class is applied.
    #[must_use]
    pub fn has_editing_class(&self) -> bool {
        self.mode().is_editing()
    }

    #[must_use]
    pub fn editing_class(&self) -> &str {
        &self.inner.editing_class
    }

    /// Whether this field's input holds the row's focus. At most one field
    /// of a row does.
    #[must_use]
    pub fn has_focus(&self) -> bool {
        lock(&self.inner.state).has_focus
    }

    #[must_use]
    pub fn input_kind(&self) -> InputKind {
        self.inner.input_kind
    }

    #[must_use]
    pub fn selectors(&self) -> &FieldSelectors {
        &self.inner.selectors
    }

    /// Bus carrying the scratch record to the unit's own display.
    #[must_use]
    pub fn local_bus(&self) -> &EventBus {
        &self.inner.local_bus
    }

    /// Wait for pending formatted output.
    pub async fn settled(&self) {
        self.display.settled().await;
    }
}

impl std::fmt::Debug for FieldEdit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEdit")
            .field("name", &self.inner.name)
            .field("value", &self.value())
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}
