use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{PricePoint, Record, SaveRequest};

/// Catalog backend Trait
///
/// Everything the editing components need from the network. The HTTP
/// implementation is [`HttpTransport`](crate::HttpTransport); tests and
/// embedders may provide their own.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    /// Fetch the price point resource for `price_id`.
    async fn fetch_price_point(&self, price_id: &str) -> ClientResult<PricePoint>;

    /// Submit a create/update request and return the canonical record.
    ///
    /// Validation failures with a per-field payload come back as
    /// [`ClientError::FieldErrors`](crate::ClientError::FieldErrors).
    async fn send_record(&self, request: &SaveRequest) -> ClientResult<Record>;
}
