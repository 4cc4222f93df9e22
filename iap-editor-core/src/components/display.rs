//! Field Display Unit: read-only rendering of one field

use std::sync::{Arc, Mutex};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use iap_editor_client::FieldValue;

use crate::error::{EditorError, EditorResult};
use crate::events::{EventBus, Phase, Propagation, RowEvent, Subscription};
use crate::format::{identity, Formatted, PendingFormat, SharedFormatter};
use crate::utils::lock;

/// Configuration of a [`FieldDisplay`].
#[derive(Clone)]
pub struct DisplayConfig {
    pub name: String,
    pub formatter: SharedFormatter,
}

impl DisplayConfig {
    /// Display of `name` through the identity formatter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            formatter: identity(),
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }
}

impl std::fmt::Debug for DisplayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
struct DisplayState {
    text: String,
    /// Bumped on every render; only the latest render may apply its text.
    generation: u64,
    /// Pending render started outside a runtime, resolved by `settled()`.
    deferred: Option<(u64, PendingFormat)>,
}

struct DisplayInner {
    name: String,
    formatter: SharedFormatter,
    state: Mutex<DisplayState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DisplayInner {
    fn render(self: &Arc<Self>, value: &FieldValue) {
        let generation = {
            let mut state = lock(&self.state);
            state.generation += 1;
            state.generation
        };

        match self.formatter.format(value) {
            Formatted::Ready(text) => self.apply(generation, text),
            Formatted::Pending(pending) => {
                let Ok(runtime) = Handle::try_current() else {
                    log::warn!(
                        "[display {}] No async runtime, deferring formatted render",
                        self.name
                    );
                    lock(&self.state).deferred = Some((generation, pending));
                    return;
                };
                // the task must not keep a dropped display alive
                let weak = Arc::downgrade(self);
                let task = runtime.spawn(async move {
                    let text = Formatted::Pending(pending).await;
                    match weak.upgrade() {
                        Some(inner) => inner.apply(generation, text),
                        None => log::debug!("[display] Discarding format result for a dropped display"),
                    }
                });
                lock(&self.tasks).push(task);
            }
        }
    }

    fn apply(&self, generation: u64, text: Option<String>) {
        let mut state = lock(&self.state);
        if state.generation != generation {
            log::debug!(
                "[display {}] Dropping stale render {generation} (current {})",
                self.name,
                state.generation
            );
            return;
        }
        state.text = text.unwrap_or_default();
    }
}

/// Renders one named field of whatever record its source announces.
pub struct FieldDisplay {
    inner: Arc<DisplayInner>,
    _subscription: Subscription,
}

impl FieldDisplay {
    /// Create a display bound to `source`'s `record-changed` notifications.
    pub fn new(config: DisplayConfig, source: &EventBus) -> EditorResult<Self> {
        if config.name.trim().is_empty() {
            return Err(EditorError::InvalidConfig(
                "display field name is empty".to_string(),
            ));
        }

        let inner = Arc::new(DisplayInner {
            name: config.name,
            formatter: config.formatter,
            state: Mutex::new(DisplayState::default()),
            tasks: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&inner);
        let subscription = source.subscribe(Phase::Field, move |event| {
            if let (RowEvent::RecordChanged { record }, Some(inner)) = (event, weak.upgrade()) {
                let value = record.get(&inner.name).cloned().unwrap_or_default();
                inner.render(&value);
            }
            Propagation::Continue
        });

        Ok(Self {
            inner,
            _subscription: subscription,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Currently rendered text.
    #[must_use]
    pub fn text(&self) -> String {
        lock(&self.inner.state).text.clone()
    }

    /// Render `value` directly, bypassing the source.
    pub fn render(&self, value: &FieldValue) {
        self.inner.render(value);
    }

    /// Wait for every pending formatted render started so far, including a
    /// render deferred for lack of a runtime.
    pub async fn settled(&self) {
        let deferred = lock(&self.inner.state).deferred.take();
        if let Some((generation, pending)) = deferred {
            let text = Formatted::Pending(pending).await;
            self.inner.apply(generation, text);
        }
        loop {
            let tasks = std::mem::take(&mut *lock(&self.inner.tasks));
            if tasks.is_empty() {
                break;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    log::error!("[display {}] Render task failed: {e}", self.inner.name);
                }
            }
        }
    }
}

impl std::fmt::Debug for FieldDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDisplay")
            .field("name", &self.inner.name)
            .field("text", &self.text())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BooleanLabel, FormatterCache};
    use crate::test_utils::{wait_until, CountingLookup, GatedLookup};
    use iap_editor_client::Record;

    fn announce(bus: &EventBus, record: Record) {
        bus.publish(&RowEvent::RecordChanged { record });
    }

    #[tokio::test]
    async fn renders_synchronous_formatter_immediately() {
        let bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new("active").with_formatter(Arc::new(BooleanLabel::default())),
            &bus,
        )
        .unwrap();

        announce(&bus, [("active", true)].into_iter().collect());
        assert_eq!(display.text(), "Enabled");
    }

    #[tokio::test]
    async fn renders_cached_lookup() {
        let lookup = Arc::new(CountingLookup::new([("5", "0.99 USD")]));
        let cache = Arc::new(FormatterCache::new(lookup.clone()));
        let bus = EventBus::new();
        let first = FieldDisplay::new(DisplayConfig::new("price_id").with_formatter(cache.clone()), &bus).unwrap();
        let second = FieldDisplay::new(DisplayConfig::new("price_id").with_formatter(cache), &bus).unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        first.settled().await;
        second.settled().await;

        assert_eq!(first.text(), "0.99 USD");
        assert_eq!(second.text(), "0.99 USD");
        assert_eq!(lookup.calls("5"), 1);
    }

    #[tokio::test]
    async fn missing_field_and_failed_lookup_render_empty() {
        let lookup = Arc::new(CountingLookup::new([("5", "0.99 USD")]));
        let bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new("price_id").with_formatter(Arc::new(FormatterCache::new(lookup))),
            &bus,
        )
        .unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        display.settled().await;
        assert_eq!(display.text(), "0.99 USD");

        announce(&bus, [("price_id", "404")].into_iter().collect());
        display.settled().await;
        assert_eq!(display.text(), "");

        announce(&bus, [("name", "Widget")].into_iter().collect());
        assert_eq!(display.text(), "");
    }

    #[tokio::test]
    async fn latest_render_wins() {
        let lookup = Arc::new(GatedLookup::new([("5", "0.99 USD"), ("6", "1.99 USD")]));
        let bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new("price_id")
                .with_formatter(Arc::new(FormatterCache::new(lookup.clone()))),
            &bus,
        )
        .unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        announce(&bus, [("price_id", "6")].into_iter().collect());

        lookup.release("6");
        wait_until(|| display.text() == "1.99 USD").await;

        // the older lookup resolves last and must not overwrite
        lookup.release("5");
        display.settled().await;
        assert_eq!(display.text(), "1.99 USD");
    }

    #[tokio::test]
    async fn sync_render_supersedes_pending_lookup() {
        let lookup = Arc::new(GatedLookup::new([("5", "0.99 USD")]));
        let bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new("price_id")
                .with_formatter(Arc::new(FormatterCache::new(lookup.clone()))),
            &bus,
        )
        .unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        // empty key formats synchronously
        announce(&bus, [("price_id", "")].into_iter().collect());
        lookup.release("5");
        display.settled().await;
        assert_eq!(display.text(), "");
    }

    #[tokio::test]
    async fn dropped_display_ignores_late_results() {
        let lookup = Arc::new(GatedLookup::new([("5", "0.99 USD")]));
        let cache = Arc::new(FormatterCache::new(lookup.clone()));
        let bus = EventBus::new();
        let display =
            FieldDisplay::new(DisplayConfig::new("price_id").with_formatter(cache.clone()), &bus).unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        let weak = Arc::downgrade(&display.inner);
        drop(display);
        assert!(weak.upgrade().is_none());
        assert_eq!(bus.subscriber_count(), 0);

        lookup.release("5");
        let pending = cache.format("5").unwrap();
        assert_eq!(pending.await, Ok("0.99 USD".to_string()));
    }

    #[test]
    fn render_without_runtime_completes_on_settle() {
        let lookup = Arc::new(CountingLookup::new([("5", "0.99 USD"), ("6", "1.99 USD")]));
        let bus = EventBus::new();
        let display = FieldDisplay::new(
            DisplayConfig::new("price_id").with_formatter(Arc::new(FormatterCache::new(lookup))),
            &bus,
        )
        .unwrap();

        announce(&bus, [("price_id", "5")].into_iter().collect());
        announce(&bus, [("price_id", "6")].into_iter().collect());
        assert_eq!(display.text(), "");
        assert!(lock(&display.inner.tasks).is_empty());

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(display.settled());
        assert_eq!(display.text(), "1.99 USD");
    }

    #[test]
    fn empty_name_is_rejected() {
        let bus = EventBus::new();
        assert!(matches!(
            FieldDisplay::new(DisplayConfig::new(""), &bus),
            Err(EditorError::InvalidConfig(_))
        ));
    }
}
