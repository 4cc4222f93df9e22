//! Row Factory: instantiate new rows from a template

use std::sync::Arc;

use iap_editor_client::Record;

use super::row::{RecordRow, RowConfig};
use crate::context::EditorContext;
use crate::error::EditorResult;

/// Describes how rows of one kind are built.
pub trait RowTemplate: Send + Sync {
    /// Record of a row that has not been created yet.
    fn blank_record(&self) -> Record;

    /// Row configuration for `record`.
    fn row_config(&self, record: Record, start_editing: bool) -> RowConfig;
}

/// The rows of one page section, in display order.
#[derive(Debug, Default)]
pub struct RowList {
    rows: Vec<RecordRow>,
}

impl RowList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `row` and return it.
    pub fn push(&mut self, row: RecordRow) -> &RecordRow {
        let index = self.rows.len();
        self.rows.push(row);
        &self.rows[index]
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RecordRow> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Creates rows from a template.
pub struct RowFactory {
    ctx: Arc<EditorContext>,
    template: Arc<dyn RowTemplate>,
}

impl RowFactory {
    #[must_use]
    pub fn new(ctx: Arc<EditorContext>, template: Arc<dyn RowTemplate>) -> Self {
        Self { ctx, template }
    }

    /// Mount a row over an existing record.
    pub fn mount(&self, record: Record, start_editing: bool) -> EditorResult<RecordRow> {
        RecordRow::mount(
            Arc::clone(&self.ctx),
            self.template.row_config(record, start_editing),
        )
    }

    /// Add a blank row to `rows`, already in editing mode.
    pub fn add_row<'a>(&self, rows: &'a mut RowList) -> EditorResult<&'a RecordRow> {
        let row = self.mount(self.template.blank_record(), true)?;
        log::info!("[factory] Added row {}", row.instance_id());
        Ok(rows.push(row))
    }
}

impl std::fmt::Debug for RowFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowFactory").finish_non_exhaustive()
    }
}
