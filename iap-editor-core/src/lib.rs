//! In-app product editor core
//!
//! Row-scoped inline editing of catalog records:
//! - Value formatter cache (memoized asynchronous lookups)
//! - Field display and field edit units
//! - Record row controller (record ownership, persistence, error routing)
//! - Row factory
//!
//! Components of a row communicate over an explicit [`EventBus`] instead of
//! page-level events, and receive their dependencies through a read-only
//! [`EditorContext`] built once per page.

pub mod components;
pub mod context;
pub mod error;
pub mod events;
pub mod format;
pub mod types;
mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use components::{
    DisplayConfig, FieldDisplay, FieldEdit, FieldEditConfig, RecordRow, RowConfig, RowFactory,
    RowList, RowTemplate, SaveOutcome,
};
pub use context::{EditorContext, Endpoints, SaveOptions};
pub use error::{EditorError, EditorResult};
pub use events::{Delivery, EventBus, Phase, Propagation, RowEvent, Subscription};
pub use format::{
    BooleanLabel, Formatted, FormatterCache, Identity, OptionTable, OutputFormatter,
    PricePointLookup, SharedFormatter, ValueLookup,
};
