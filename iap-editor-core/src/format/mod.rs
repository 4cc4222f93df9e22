//! Output formatters
//!
//! A formatter turns a raw field value into the text a display shows. Some
//! formatters answer synchronously ([`Identity`], [`BooleanLabel`],
//! [`OptionTable`]); the network-backed [`FormatterCache`] hands out a shared
//! pending lookup instead. Both shapes are awaitable through [`Formatted`].

mod cache;
mod formatter;
mod lookup;

pub use cache::{FormatterCache, PendingFormat, ValueLookup};
pub use formatter::{BooleanLabel, Identity, OptionTable};
pub use lookup::PricePointLookup;

use std::fmt;
use std::future::IntoFuture;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use iap_editor_client::FieldValue;

/// Result of formatting one value.
#[derive(Clone)]
pub enum Formatted {
    /// Text available immediately. `None` renders as empty.
    Ready(Option<String>),
    /// A lookup that resolves later.
    Pending(PendingFormat),
}

impl Formatted {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Ready(Some(text.into()))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::Ready(None)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

impl fmt::Debug for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(text) => f.debug_tuple("Ready").field(text).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl IntoFuture for Formatted {
    type Output = Option<String>;
    type IntoFuture = BoxFuture<'static, Option<String>>;

    /// Failed lookups resolve to `None`; they are logged, never surfaced.
    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(text) => future::ready(text).boxed(),
            Self::Pending(pending) => async move {
                match pending.await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        if e.is_expected() {
                            log::warn!("[format] Lookup failed: {e}");
                        } else {
                            log::error!("[format] Lookup failed: {e}");
                        }
                        None
                    }
                }
            }
            .boxed(),
        }
    }
}

/// Converts a field value into display text.
pub trait OutputFormatter: Send + Sync {
    fn format(&self, value: &FieldValue) -> Formatted;
}

impl<F> OutputFormatter for F
where
    F: Fn(&FieldValue) -> Formatted + Send + Sync,
{
    fn format(&self, value: &FieldValue) -> Formatted {
        self(value)
    }
}

/// Shared formatter handle, as stored in component configurations.
pub type SharedFormatter = Arc<dyn OutputFormatter>;

/// The default formatter.
#[must_use]
pub fn identity() -> SharedFormatter {
    Arc::new(Identity)
}
