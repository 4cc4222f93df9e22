//! Editing components
//!
//! Leaf first: [`FieldDisplay`] renders a field, [`FieldEdit`] edits one,
//! [`RecordRow`] composes them over one record and persists it, and
//! [`RowFactory`] mounts new rows from a [`RowTemplate`].

mod display;
mod edit;
mod factory;
mod row;

pub use display::{DisplayConfig, FieldDisplay};
pub use edit::{FieldEdit, FieldEditConfig, DEFAULT_EDITING_CLASS};
pub use factory::{RowFactory, RowList, RowTemplate};
pub use row::{RecordRow, RowConfig, SaveOutcome, DEFAULT_ID_FIELD};
