//! Record Row Controller
//!
//! A row owns the authoritative record for one catalog entry. Its field units
//! announce value changes on the row bus and the row merges them into the
//! record; saving sends the record, then either adopts the server's canonical
//! version or routes the returned errors back to the owning fields.
//!
//! A failed save leaves the record as last edited.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, Weak};

use uuid::Uuid;

use iap_editor_client::{ClientError, FieldErrorSet, FieldValue, Record};

use super::display::{DisplayConfig, FieldDisplay};
use super::edit::{FieldEdit, FieldEditConfig, DEFAULT_EDITING_CLASS};
use crate::context::EditorContext;
use crate::error::{EditorError, EditorResult};
use crate::events::{EventBus, Phase, Propagation, RowEvent, Subscription};
use crate::types::EditMode;
use crate::utils::lock;

/// Default identifier field.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Configuration of a [`RecordRow`].
#[derive(Clone, Debug)]
pub struct RowConfig {
    /// Field carrying the server identifier, also the detail URL placeholder.
    pub id_field: String,
    pub start_editing: bool,
    pub editing_class: String,
    /// Values read out of the row at mount.
    pub initial: Record,
    pub fields: Vec<FieldEditConfig>,
    /// Read-only displays bound to the row record.
    pub displays: Vec<DisplayConfig>,
    /// Fields edited outside the row (for example through a prompt dialog).
    pub external_fields: Vec<String>,
    /// Field focused on `start-edit`; the first field following row mode
    /// when unset.
    pub focus_field: Option<String>,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            id_field: DEFAULT_ID_FIELD.to_string(),
            start_editing: false,
            editing_class: DEFAULT_EDITING_CLASS.to_string(),
            initial: Record::new(),
            fields: Vec::new(),
            displays: Vec::new(),
            external_fields: Vec::new(),
            focus_field: None,
        }
    }
}

/// Which unit answers for a field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldSlot {
    Edit(usize),
    Display(usize),
    External,
}

impl RowConfig {
    /// Check the configuration against `ctx` and build the field registry.
    fn registry(&self, ctx: &EditorContext) -> EditorResult<BTreeMap<String, FieldSlot>> {
        if self.id_field.trim().is_empty() {
            return Err(EditorError::InvalidConfig("identifier field is empty".to_string()));
        }
        if self.editing_class.trim().is_empty() {
            return Err(EditorError::InvalidConfig("row editing class is empty".to_string()));
        }
        if !ctx.endpoints().detail_url.has_placeholder(&self.id_field) {
            return Err(EditorError::InvalidConfig(format!(
                "detail URL '{}' has no {{{}}} placeholder",
                ctx.endpoints().detail_url,
                self.id_field
            )));
        }

        let names = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), FieldSlot::Edit(i)))
            .chain(
                self.displays
                    .iter()
                    .enumerate()
                    .map(|(i, d)| (d.name.as_str(), FieldSlot::Display(i))),
            )
            .chain(self.external_fields.iter().map(|n| (n.as_str(), FieldSlot::External)));

        let mut registry = BTreeMap::new();
        for (name, slot) in names {
            if name.trim().is_empty() {
                return Err(EditorError::InvalidConfig("row field name is empty".to_string()));
            }
            if registry.insert(name.to_string(), slot).is_some() {
                return Err(EditorError::DuplicateField(name.to_string()));
            }
        }
        if let Some(focus) = &self.focus_field {
            if !matches!(registry.get(focus), Some(FieldSlot::Edit(_))) {
                return Err(EditorError::InvalidConfig(format!(
                    "focus field '{focus}' is not an editable field"
                )));
            }
        }
        Ok(registry)
    }

    fn focus_target(&self) -> Option<String> {
        self.focus_field.clone().or_else(|| {
            self.fields
                .iter()
                .find(|field| field.track_row_mode)
                .map(|field| field.name.clone())
        })
    }
}

/// Result of [`RecordRow::save`].
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The server accepted the record; holds the canonical version.
    Saved(Record),
    /// The server rejected individual fields.
    Rejected(FieldErrorSet),
    /// Any other failure, with the message shown on the row.
    Failed(String),
    /// A save of this row is already in flight.
    Busy,
}

struct RowState {
    record: Record,
    mode: EditMode,
    saving: bool,
    error: Option<String>,
    external_errors: HashMap<String, String>,
}

/// Clears the in-flight flag when a save completes or its future is dropped.
struct SavingGuard<'a>(&'a Mutex<RowState>);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).saving = false;
    }
}

struct RowInner {
    instance_id: Uuid,
    ctx: Arc<EditorContext>,
    id_field: String,
    editing_class: String,
    focus_field: Option<String>,
    bus: EventBus,
    registry: BTreeMap<String, FieldSlot>,
    state: Mutex<RowState>,
}

impl RowInner {
    fn handle_event(&self, event: &RowEvent) -> Propagation {
        match event {
            RowEvent::FieldChanged { name, value } => {
                lock(&self.state).record.insert(name.clone(), value.clone());
                Propagation::Continue
            }
            RowEvent::StartEdit => {
                lock(&self.state).mode = EditMode::Editing;
                if let Some(name) = &self.focus_field {
                    self.bus.publish(&RowEvent::Focus { name: name.clone() });
                }
                Propagation::Continue
            }
            RowEvent::DoneEdit => {
                let record = {
                    let mut state = lock(&self.state);
                    state.mode = EditMode::Viewing;
                    state.record.clone()
                };
                self.bus.publish(&RowEvent::RecordChanged { record });
                Propagation::Continue
            }
            RowEvent::FieldErrors {
                target: Some(target),
                errors,
            } if self.registry.get(target) == Some(&FieldSlot::External) => {
                let mut state = lock(&self.state);
                match errors.first() {
                    Some(message) => {
                        state.external_errors.insert(target.clone(), message.clone());
                    }
                    None => {
                        state.external_errors.remove(target);
                    }
                }
                Propagation::Stop
            }
            RowEvent::FieldErrors { target, errors } => {
                // errors no field unit claimed end up on the row
                if let Some(message) = errors.first() {
                    let message = match target {
                        Some(field) => format!("{field}: {message}"),
                        None => message.clone(),
                    };
                    lock(&self.state).error = Some(message);
                }
                Propagation::Continue
            }
            RowEvent::RecordChanged { .. } | RowEvent::Focus { .. } => Propagation::Continue,
        }
    }
}

/// One editable record row.
pub struct RecordRow {
    inner: Arc<RowInner>,
    fields: Vec<FieldEdit>,
    displays: Vec<FieldDisplay>,
    _subscription: Subscription,
}

impl RecordRow {
    /// Mount a row: register the row handler, attach the field units (each
    /// announcing its seed value), enter editing if configured, and broadcast
    /// the initial record.
    pub fn mount(ctx: Arc<EditorContext>, config: RowConfig) -> EditorResult<Self> {
        let registry = config.registry(&ctx)?;
        let focus_field = config.focus_target();
        let mode = EditMode::from_start_editing(config.start_editing);

        let inner = Arc::new(RowInner {
            instance_id: Uuid::new_v4(),
            ctx,
            id_field: config.id_field,
            editing_class: config.editing_class,
            focus_field,
            bus: EventBus::new(),
            registry,
            state: Mutex::new(RowState {
                record: config.initial,
                mode: EditMode::Viewing,
                saving: false,
                error: None,
                external_errors: HashMap::new(),
            }),
        });

        let weak: Weak<RowInner> = Arc::downgrade(&inner);
        let subscription = inner.bus.subscribe(Phase::Row, move |event| match weak.upgrade() {
            Some(inner) => inner.handle_event(event),
            None => Propagation::Continue,
        });

        let displays = config
            .displays
            .into_iter()
            .map(|display| FieldDisplay::new(display, &inner.bus))
            .collect::<EditorResult<Vec<_>>>()?;
        let fields = config
            .fields
            .into_iter()
            .map(|field| FieldEdit::new(field, &inner.bus))
            .collect::<EditorResult<Vec<_>>>()?;

        let row = Self {
            inner,
            fields,
            displays,
            _subscription: subscription,
        };

        if mode.is_editing() {
            row.inner.bus.publish(&RowEvent::StartEdit);
        }
        let record = row.record();
        row.inner.bus.publish(&RowEvent::RecordChanged { record });

        log::debug!(
            "[row {}] Mounted with {} fields (identifier: {:?})",
            row.inner.instance_id,
            row.inner.registry.len(),
            row.identifier()
        );
        Ok(row)
    }

    /// Send the record to the server.
    ///
    /// While a save is in flight further calls return [`SaveOutcome::Busy`].
    /// Failures never escape: field errors are routed to their units, anything
    /// else is shown once on the row.
    pub async fn save(&self) -> SaveOutcome {
        let request = {
            let mut state = lock(&self.inner.state);
            if state.saving {
                log::debug!("[row {}] Save already in flight", self.inner.instance_id);
                return SaveOutcome::Busy;
            }
            state.saving = true;
            state.error = None;
            self.inner
                .ctx
                .build_save_request(&self.inner.id_field, &state.record)
        };
        let in_flight = SavingGuard(&self.inner.state);

        log::info!(
            "[row {}] Saving: {} {}",
            self.inner.instance_id,
            request.method,
            request.url
        );
        let result = self.inner.ctx.transport().send_record(&request).await;
        drop(in_flight);

        match result {
            Ok(record) => {
                let record = self.inner.ctx.decode_record(record);
                log::info!(
                    "[row {}] Saved record {:?}",
                    self.inner.instance_id,
                    record.identifier(&self.inner.id_field)
                );
                lock(&self.inner.state).record = record.clone();
                self.inner.bus.publish(&RowEvent::DoneEdit);
                SaveOutcome::Saved(record)
            }
            Err(ClientError::FieldErrors { errors }) => {
                log::warn!(
                    "[row {}] Save rejected for fields: {}",
                    self.inner.instance_id,
                    errors.fields().collect::<Vec<_>>().join(", ")
                );
                for (field, messages) in errors.iter() {
                    self.inner.bus.publish(&RowEvent::FieldErrors {
                        target: Some(field.to_string()),
                        errors: messages.to_vec(),
                    });
                }
                SaveOutcome::Rejected(errors)
            }
            Err(e) => {
                if e.is_expected() {
                    log::warn!("[row {}] Save failed: {e}", self.inner.instance_id);
                } else {
                    log::error!("[row {}] Save failed: {e}", self.inner.instance_id);
                }
                let message = e.user_message();
                self.inner.bus.publish(&RowEvent::FieldErrors {
                    target: None,
                    errors: vec![message.clone()],
                });
                SaveOutcome::Failed(message)
            }
        }
    }

    pub fn start_edit(&self) {
        self.inner.bus.publish(&RowEvent::StartEdit);
    }

    pub fn done_edit(&self) {
        self.inner.bus.publish(&RowEvent::DoneEdit);
    }

    /// Apply a value produced outside the row's units.
    ///
    /// Only honoured while editing. `None` (a cancelled prompt) changes
    /// nothing. Returns whether a value was applied.
    pub fn set_external_field(&self, name: &str, value: Option<String>) -> EditorResult<bool> {
        if self.inner.registry.get(name) != Some(&FieldSlot::External) {
            return Err(EditorError::UnknownField(name.to_string()));
        }
        if !self.is_editing() {
            return Err(EditorError::NotEditing);
        }
        let Some(value) = value else {
            return Ok(false);
        };

        lock(&self.inner.state).external_errors.remove(name);
        self.inner.bus.publish(&RowEvent::FieldChanged {
            name: name.to_string(),
            value: FieldValue::text(value),
        });
        Ok(true)
    }

    #[must_use]
    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    /// Current record.
    #[must_use]
    pub fn record(&self) -> Record {
        lock(&self.inner.state).record.clone()
    }

    #[must_use]
    pub fn identifier(&self) -> Option<String> {
        lock(&self.inner.state)
            .record
            .identifier(&self.inner.id_field)
    }

    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.inner.id_field
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        lock(&self.inner.state).mode
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.mode().is_editing()
    }

    #[must_use]
    pub fn editing_class(&self) -> &str {
        &self.inner.editing_class
    }

    /// Whether the save control is enabled.
    #[must_use]
    pub fn is_save_enabled(&self) -> bool {
        !lock(&self.inner.state).saving
    }

    /// Row-level error text.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        lock(&self.inner.state).error.clone()
    }

    #[must_use]
    pub fn external_error(&self, name: &str) -> Option<String> {
        lock(&self.inner.state).external_errors.get(name).cloned()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldEdit> {
        match self.inner.registry.get(name) {
            Some(FieldSlot::Edit(i)) => self.fields.get(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn display(&self, name: &str) -> Option<&FieldDisplay> {
        match self.inner.registry.get(name) {
            Some(FieldSlot::Display(i)) => self.displays.get(*i),
            _ => None,
        }
    }

    /// Field names registered in this row.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.inner.registry.keys().map(String::as_str)
    }

    /// Row bus, for host observers.
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    /// Wait for every pending formatted render in the row.
    pub async fn settled(&self) {
        for display in &self.displays {
            display.settled().await;
        }
        for field in &self.fields {
            field.settled().await;
        }
    }
}

impl std::fmt::Debug for RecordRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordRow")
            .field("instance_id", &self.inner.instance_id)
            .field("record", &self.record())
            .field("mode", &self.mode())
            .finish_non_exhaustive()
    }
}
