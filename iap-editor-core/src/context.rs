//! Read-only editor context
//!
//! Built once at page initialization and threaded into every row. Nothing in
//! here changes after construction.

use std::sync::Arc;

use iap_editor_client::{
    BodyEncoding, CatalogTransport, Record, SaveMethod, SaveRequest, UrlTemplate,
};

use crate::error::{EditorError, EditorResult};
use crate::format::{FormatterCache, PricePointLookup};

/// Persistence endpoints of one record collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Create target.
    pub list_url: String,
    /// Update target, with the row's identifier field as placeholder.
    pub detail_url: UrlTemplate,
}

/// How records are sent to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOptions {
    pub encoding: BodyEncoding,
    /// Verb used for records that already carry an identifier.
    pub update_method: SaveMethod,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            encoding: BodyEncoding::Form,
            update_method: SaveMethod::Patch,
        }
    }
}

/// Dependencies and settings shared by all rows of a page.
pub struct EditorContext {
    transport: Arc<dyn CatalogTransport>,
    endpoints: Endpoints,
    save: SaveOptions,
    price_cache: Arc<FormatterCache>,
}

impl EditorContext {
    /// Create the context. The price formatter cache resolves price points
    /// through `transport` in `currency`.
    pub fn new(
        transport: Arc<dyn CatalogTransport>,
        endpoints: Endpoints,
        save: SaveOptions,
        currency: &str,
    ) -> EditorResult<Self> {
        if endpoints.list_url.trim().is_empty() {
            return Err(EditorError::InvalidConfig("list URL is empty".to_string()));
        }
        if endpoints.detail_url.as_str().trim().is_empty() {
            return Err(EditorError::InvalidConfig(
                "detail URL format is empty".to_string(),
            ));
        }
        if currency.trim().is_empty() {
            return Err(EditorError::InvalidConfig(
                "currency code is empty".to_string(),
            ));
        }

        let lookup = PricePointLookup::new(Arc::clone(&transport), currency);
        let price_cache = Arc::new(FormatterCache::new(Arc::new(lookup)));

        Ok(Self {
            transport,
            endpoints,
            save,
            price_cache,
        })
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn CatalogTransport> {
        &self.transport
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    #[must_use]
    pub fn save_options(&self) -> &SaveOptions {
        &self.save
    }

    /// Process-wide price formatter, shared by every price field.
    #[must_use]
    pub fn price_cache(&self) -> &Arc<FormatterCache> {
        &self.price_cache
    }

    /// Create request for a record without identifier, update request otherwise.
    #[must_use]
    pub fn build_save_request(&self, id_field: &str, record: &Record) -> SaveRequest {
        let body = self.save.encoding.encode(record);
        match record.identifier(id_field) {
            None => SaveRequest {
                method: SaveMethod::Post,
                url: self.endpoints.list_url.clone(),
                body,
            },
            Some(id) => SaveRequest {
                method: self.save.update_method,
                url: self.endpoints.detail_url.expand(id_field, &id),
                body,
            },
        }
    }

    /// Canonical record as the row keeps it.
    #[must_use]
    pub fn decode_record(&self, record: Record) -> Record {
        self.save.encoding.decode(record)
    }
}

impl std::fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorContext")
            .field("endpoints", &self.endpoints)
            .field("save", &self.save)
            .field("price_cache", &self.price_cache)
            .finish_non_exhaustive()
    }
}
