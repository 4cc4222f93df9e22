//! # iap-editor-client
//!
//! Wire layer for the in-app product editor: the record model shared by all
//! editing components, request body encodings, URL templates, and the
//! [`CatalogTransport`] abstraction with its HTTP implementation.
//!
//! ## Feature Flags
//!
//! - **`rustls`** *(default)* — Use rustls for TLS.
//! - **`native-tls`** — Use the platform's native TLS implementation.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use iap_editor_client::{
//!     BodyEncoding, CatalogTransport, HttpTransport, HttpTransportConfig, Record, SaveMethod,
//!     SaveRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = HttpTransport::new(HttpTransportConfig {
//!         origin: Some("https://marketplace.example.com".to_string()),
//!         ..HttpTransportConfig::default()
//!     })?;
//!
//!     let point = transport.fetch_price_point("5").await?;
//!     println!("{:?}", point.formatted_for("USD"));
//!
//!     let record: Record = [("name", "Gadget"), ("price_id", "5")].into_iter().collect();
//!     let saved = transport
//!         .send_record(&SaveRequest {
//!             method: SaveMethod::Post,
//!             url: "/api/v1/in-app/".to_string(),
//!             body: BodyEncoding::Form.encode(&record),
//!         })
//!         .await?;
//!     println!("created {:?}", saved.identifier("id"));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All transport operations return [`ClientResult<T>`](ClientResult). Server
//! validation failures arrive as [`ClientError::FieldErrors`]; everything else
//! is unstructured and meant to be shown once per row. Nothing is retried.

mod encoding;
mod error;
mod http_client;
mod traits;
mod transport;
mod types;
mod url_template;
mod utils;

pub use encoding::{BodyEncoding, DEFAULT_LOCALE_FIELD, LOCALIZED_FIELD};
pub use error::{ClientError, ClientResult};
pub use traits::CatalogTransport;
pub use transport::{
    HttpTransport, HttpTransportConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PRICE_POINT_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use types::{
    FieldErrorSet, FieldValue, Price, PricePoint, Record, RequestBody, SaveMethod, SaveRequest,
};
pub use url_template::UrlTemplate;
