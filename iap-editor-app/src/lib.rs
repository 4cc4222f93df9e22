//! Page bootstrap for the in-app product editor.
//!
//! Provides `PageConfig` (the page's configuration surface), `AppState` (the
//! mounted rows and their shared context), `AppStateBuilder` (the single
//! initialization point) and the product row template.

mod config;
mod error;
mod logging;
mod product;

use std::sync::Arc;

use iap_editor_client::{CatalogTransport, HttpTransport};
use iap_editor_core::{
    EditorContext, RecordRow, RowFactory, RowList, RowTemplate, SharedFormatter,
};

pub use config::{EncodingKind, PageConfig, PriceOption};
pub use error::{AppError, AppResult};
pub use logging::init_logging;
pub use product::{
    ProductRowSnapshot, ProductTemplate, ACTIVE_FIELD, LOGO_FIELD, NAME_FIELD, PRICE_FIELD,
};

/// Application state of one product page.
///
/// Built once via `AppStateBuilder`; the context it holds is never mutated.
pub struct AppState {
    /// Shared read-only context
    pub ctx: Arc<EditorContext>,
    /// Configuration the state was built from
    pub config: PageConfig,
    template: Arc<ProductTemplate>,
    factory: RowFactory,
    rows: RowList,
}

impl AppState {
    /// Mount rows over the products already rendered on the page.
    pub fn mount_rows(&mut self, snapshots: &[ProductRowSnapshot]) -> AppResult<usize> {
        for snapshot in snapshots {
            let row = RecordRow::mount(
                Arc::clone(&self.ctx),
                self.template.config_for_snapshot(snapshot, false),
            )?;
            self.rows.push(row);
        }
        log::info!("Mounted {} product rows", snapshots.len());
        Ok(snapshots.len())
    }

    /// Append a blank product row in editing mode.
    pub fn add_product(&mut self) -> AppResult<&RecordRow> {
        Ok(self.factory.add_row(&mut self.rows)?)
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&RecordRow> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn rows(&self) -> &RowList {
        &self.rows
    }
}

/// Builder for `AppState`.
///
/// # Required
/// - `config` — the page configuration
///
/// # Optional
/// - `transport` — defaults to an `HttpTransport` built from the configuration
pub struct AppStateBuilder {
    config: Option<PageConfig>,
    transport: Option<Arc<dyn CatalogTransport>>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: PageConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn CatalogTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the configuration is missing or invalid.
    pub fn build(self) -> AppResult<AppState> {
        let config = self
            .config
            .ok_or_else(|| AppError::Config("config is required".to_string()))?;
        config.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(config.transport_config())?),
        };

        let ctx = Arc::new(EditorContext::new(
            transport,
            config.endpoints()?,
            config.save_options()?,
            &config.currency_code,
        )?);

        let template = Arc::new(match config.price_table() {
            Some(table) => {
                let price_formatter: SharedFormatter = Arc::new(table);
                ProductTemplate::new(config.id_field.as_str(), price_formatter)
            }
            None => ProductTemplate::with_price_cache(config.id_field.as_str(), &ctx),
        });
        let row_template: Arc<dyn RowTemplate> = template.clone();
        let factory = RowFactory::new(Arc::clone(&ctx), row_template);

        log::info!("Editor initialized for {}", config.list_url);
        Ok(AppState {
            ctx,
            config,
            template,
            factory,
            rows: RowList::new(),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
