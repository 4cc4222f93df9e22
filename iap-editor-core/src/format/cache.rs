//! Process-wide memoization of asynchronous lookups

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};

use iap_editor_client::{ClientResult, FieldValue};

use super::{Formatted, OutputFormatter};
use crate::utils::lock;

/// A lookup shared by every caller that asked for the same key.
pub type PendingFormat = Shared<BoxFuture<'static, ClientResult<String>>>;

/// Resolves one key to its display text.
#[async_trait]
pub trait ValueLookup: Send + Sync {
    async fn lookup(&self, key: &str) -> ClientResult<String>;
}

/// Append-only cache of pending and resolved lookups.
///
/// A key is looked up at most once for the lifetime of the cache; failures
/// are cached as well and never retried.
pub struct FormatterCache {
    lookup: Arc<dyn ValueLookup>,
    entries: Mutex<HashMap<String, PendingFormat>>,
}

impl FormatterCache {
    #[must_use]
    pub fn new(lookup: Arc<dyn ValueLookup>) -> Self {
        Self {
            lookup,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The pending lookup for `key`, issuing it on first request.
    ///
    /// Returns `None` for an empty key, which is neither cached nor looked up.
    pub fn format(&self, key: &str) -> Option<PendingFormat> {
        if key.trim().is_empty() {
            return None;
        }

        let mut entries = lock(&self.entries);
        if let Some(pending) = entries.get(key) {
            return Some(pending.clone());
        }

        log::debug!("[format] Caching lookup for key '{key}'");
        let lookup = Arc::clone(&self.lookup);
        let owned = key.to_string();
        let pending = async move { lookup.lookup(&owned).await }.boxed().shared();
        entries.insert(key.to_string(), pending.clone());
        Some(pending)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl OutputFormatter for FormatterCache {
    fn format(&self, value: &FieldValue) -> Formatted {
        let key = value.display_text().unwrap_or_default();
        match FormatterCache::format(self, &key) {
            Some(pending) => Formatted::Pending(pending),
            None => Formatted::empty(),
        }
    }
}

impl fmt::Debug for FormatterCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}
