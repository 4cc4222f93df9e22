//! Test helpers
//!
//! Transport and lookup doubles plus a ready-made context.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use iap_editor_client::{
    CatalogTransport, ClientError, ClientResult, Price, PricePoint, Record, SaveRequest,
    UrlTemplate,
};

use crate::context::{EditorContext, Endpoints, SaveOptions};
use crate::format::ValueLookup;
use crate::utils::lock;

pub const LIST_URL: &str = "/api/v1/in-app/";
pub const DETAIL_URL: &str = "/api/v1/in-app/{id}/";

pub fn test_context(transport: Arc<MockTransport>) -> Arc<EditorContext> {
    Arc::new(
        EditorContext::new(
            transport,
            Endpoints {
                list_url: LIST_URL.to_string(),
                detail_url: UrlTemplate::new(DETAIL_URL),
            },
            SaveOptions::default(),
            "USD",
        )
        .unwrap(),
    )
}

fn not_found() -> ClientError {
    ClientError::Rejected {
        status: 404,
        body: "Not found".to_string(),
    }
}

// ===== MockTransport =====

#[derive(Default)]
pub struct MockTransport {
    price_points: Mutex<HashMap<String, PricePoint>>,
    price_point_requests: Mutex<Vec<String>>,
    save_responses: Mutex<VecDeque<ClientResult<Record>>>,
    save_requests: Mutex<Vec<SaveRequest>>,
    /// When set, `send_record` waits for a permit before answering.
    save_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_price_point(&self, id: &str, prices: &[(&str, &str)]) {
        let point = PricePoint {
            prices: prices
                .iter()
                .map(|(price, currency)| Price {
                    price: (*price).to_string(),
                    currency: (*currency).to_string(),
                })
                .collect(),
        };
        lock(&self.price_points).insert(id.to_string(), point);
    }

    pub fn respond_with(&self, response: ClientResult<Record>) {
        lock(&self.save_responses).push_back(response);
    }

    pub fn hold_saves(&self) {
        *lock(&self.save_gate) = Some(Arc::new(Notify::new()));
    }

    pub fn release_save(&self) {
        if let Some(gate) = lock(&self.save_gate).as_ref() {
            gate.notify_one();
        }
    }

    pub fn price_point_requests(&self) -> Vec<String> {
        lock(&self.price_point_requests).clone()
    }

    pub fn save_requests(&self) -> Vec<SaveRequest> {
        lock(&self.save_requests).clone()
    }
}

#[async_trait]
impl CatalogTransport for MockTransport {
    async fn fetch_price_point(&self, price_id: &str) -> ClientResult<PricePoint> {
        lock(&self.price_point_requests).push(price_id.to_string());
        lock(&self.price_points)
            .get(price_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn send_record(&self, request: &SaveRequest) -> ClientResult<Record> {
        lock(&self.save_requests).push(request.clone());
        let gate = lock(&self.save_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.save_responses)
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::Rejected {
                    status: 500,
                    body: "no scripted response".to_string(),
                })
            })
    }
}

// ===== Lookups =====

/// Answers from a fixed table and counts calls per key.
pub struct CountingLookup {
    labels: HashMap<String, String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingLookup {
    pub fn new<const N: usize>(labels: [(&str, &str); N]) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self, key: &str) -> usize {
        lock(&self.calls).get(key).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }
}

#[async_trait]
impl ValueLookup for CountingLookup {
    async fn lookup(&self, key: &str) -> ClientResult<String> {
        *lock(&self.calls).entry(key.to_string()).or_insert(0) += 1;
        self.labels.get(key).cloned().ok_or_else(not_found)
    }
}

/// Answers each key only once the test releases it.
pub struct GatedLookup {
    labels: HashMap<String, String>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl GatedLookup {
    pub fn new<const N: usize>(labels: [(&str, &str); N]) -> Self {
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            gates: Mutex::new(HashMap::new()),
        }
    }

    fn gate(&self, key: &str) -> Arc<Notify> {
        Arc::clone(lock(&self.gates).entry(key.to_string()).or_default())
    }

    pub fn release(&self, key: &str) {
        self.gate(key).notify_one();
    }
}

#[async_trait]
impl ValueLookup for GatedLookup {
    async fn lookup(&self, key: &str) -> ClientResult<String> {
        self.gate(key).notified().await;
        self.labels.get(key).cloned().ok_or_else(not_found)
    }
}

/// Yield to spawned tasks until `done` holds.
pub async fn wait_until(mut done: impl FnMut() -> bool) {
    for _ in 0..100 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
