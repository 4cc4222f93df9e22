//! Row-scoped publish/subscribe channel
//!
//! Components of one row talk through an [`EventBus`]. Delivery mimics the
//! bubbling order of nested page elements: handlers registered at
//! [`Phase::Field`] run first, then [`Phase::Row`], then [`Phase::Page`]
//! (host observers). Any handler may return [`Propagation::Stop`] to end
//! delivery, which is how a field editor claims the errors addressed to it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use iap_editor_client::{FieldValue, Record};

use crate::utils::lock;

/// Notifications exchanged between the units of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowEvent {
    /// A field produced a new value.
    FieldChanged { name: String, value: FieldValue },
    /// A data source has a new version of its record.
    RecordChanged { record: Record },
    /// Enter editing mode.
    StartEdit,
    /// Leave editing mode.
    DoneEdit,
    /// Move input focus to the named field.
    Focus { name: String },
    /// Errors for one field, or for the whole row when `target` is `None`.
    FieldErrors {
        target: Option<String>,
        errors: Vec<String>,
    },
}

impl RowEvent {
    /// Wire name shared with the surrounding page glue.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FieldChanged { .. } => "field-changed",
            Self::RecordChanged { .. } => "record-changed",
            Self::StartEdit => "start-edit",
            Self::DoneEdit => "done-edit",
            Self::Focus { .. } => "focus",
            Self::FieldErrors { .. } => "field-errors",
        }
    }
}

/// Handler verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

/// Delivery stage, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Field,
    Row,
    Page,
}

/// Outcome of [`EventBus::publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Every handler saw the event.
    Completed,
    /// A handler stopped propagation.
    Stopped,
}

type Handler = Arc<dyn Fn(&RowEvent) -> Propagation + Send + Sync>;

struct Entry {
    id: u64,
    phase: Phase,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry>>,
}

/// A cloneable handle to one channel.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` at `phase`. The handler stays registered until the
    /// returned [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, phase: Phase, handler: F) -> Subscription
    where
        F: Fn(&RowEvent) -> Propagation + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let mut entries = lock(&self.inner.entries);
        // keep entries ordered by phase, subscription order within a phase
        let at = entries.partition_point(|e| e.phase <= phase);
        entries.insert(
            at,
            Entry {
                id,
                phase,
                handler: Arc::new(handler),
            },
        );
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver `event` to the current subscribers.
    ///
    /// Handlers run without the bus lock held, so they may publish or
    /// subscribe themselves.
    pub fn publish(&self, event: &RowEvent) -> Delivery {
        let handlers: Vec<Handler> = lock(&self.inner.entries)
            .iter()
            .map(|e| Arc::clone(&e.handler))
            .collect();

        for handler in handlers {
            if handler(event) == Propagation::Stop {
                return Delivery::Stopped;
            }
        }
        Delivery::Completed
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.entries).len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Registration guard returned by [`EventBus::subscribe`].
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            lock(&bus.entries).retain(|e| e.id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
