//! Network-backed price point lookup

use std::sync::Arc;

use async_trait::async_trait;

use iap_editor_client::{CatalogTransport, ClientError, ClientResult};

use super::ValueLookup;

/// Resolves a price point identifier to `"<amount> <currency>"`.
pub struct PricePointLookup {
    transport: Arc<dyn CatalogTransport>,
    currency: String,
}

impl PricePointLookup {
    #[must_use]
    pub fn new(transport: Arc<dyn CatalogTransport>, currency: impl Into<String>) -> Self {
        Self {
            transport,
            currency: currency.into(),
        }
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }
}

#[async_trait]
impl ValueLookup for PricePointLookup {
    async fn lookup(&self, price_id: &str) -> ClientResult<String> {
        let point = self.transport.fetch_price_point(price_id).await?;
        point
            .formatted_for(&self.currency)
            .ok_or_else(|| ClientError::CurrencyUnavailable {
                price_id: price_id.to_string(),
                currency: self.currency.clone(),
            })
    }
}
