//! `reqwest`-backed catalog transport

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::http_client::HttpUtils;
use crate::traits::CatalogTransport;
use crate::types::{PricePoint, Record, RequestBody, SaveMethod, SaveRequest};
use crate::url_template::UrlTemplate;

/// Default connect timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Price point resource, `{id}` is the price identifier
pub const DEFAULT_PRICE_POINT_URL: &str = "/api/v1/webpay/prices/{id}/";

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Base URL that relative URLs (the ones pages embed) are joined to.
    pub origin: Option<String>,
    pub price_point_url: UrlTemplate,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            origin: None,
            price_point_url: UrlTemplate::new(DEFAULT_PRICE_POINT_URL),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Catalog transport over HTTP
pub struct HttpTransport {
    client: Client,
    origin: Option<Url>,
    price_point_url: UrlTemplate,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::NetworkError {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;

        let origin = config
            .origin
            .as_deref()
            .map(|origin| {
                Url::parse(origin).map_err(|e| ClientError::InvalidUrl {
                    url: origin.to_string(),
                    detail: e.to_string(),
                })
            })
            .transpose()?;

        Ok(Self {
            client,
            origin,
            price_point_url: config.price_point_url,
        })
    }

    /// Absolute URL for `url`, joining relative ones to the origin.
    fn resolve(&self, url: &str) -> ClientResult<Url> {
        let invalid = |detail: String| ClientError::InvalidUrl {
            url: url.to_string(),
            detail,
        };
        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.origin {
                Some(base) => base.join(url).map_err(|e| invalid(e.to_string())),
                None => Err(invalid("relative URL without a configured origin".to_string())),
            },
            Err(e) => Err(invalid(e.to_string())),
        }
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn fetch_price_point(&self, price_id: &str) -> ClientResult<PricePoint> {
        let url = self.resolve(&self.price_point_url.expand("id", price_id))?;
        let request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json");

        let (status, text) = HttpUtils::execute_request(request, "GET", url.as_str()).await?;
        HttpUtils::interpret(status, &text)
    }

    async fn send_record(&self, request: &SaveRequest) -> ClientResult<Record> {
        let url = self.resolve(&request.url)?;
        let builder = match request.method {
            SaveMethod::Post => self.client.post(url.clone()),
            SaveMethod::Put => self.client.put(url.clone()),
            SaveMethod::Patch => self.client.patch(url.clone()),
        }
        .header(ACCEPT, "application/json");

        let builder = match &request.body {
            RequestBody::Form(pairs) => builder.form(pairs),
            RequestBody::Json(body) => builder.json(body),
        };

        let (status, text) =
            HttpUtils::execute_request(builder, request.method.as_str(), url.as_str()).await?;
        HttpUtils::interpret(status, &text)
    }
}
