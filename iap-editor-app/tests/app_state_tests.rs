#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `AppStateBuilder` and the product row flow.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use iap_editor_app::{
    AppError, AppStateBuilder, PageConfig, PriceOption, ProductRowSnapshot, LOGO_FIELD,
    NAME_FIELD, PRICE_FIELD,
};
use iap_editor_client::{
    CatalogTransport, ClientError, ClientResult, FieldValue, Price, PricePoint, Record,
    RequestBody, SaveMethod, SaveRequest,
};
use iap_editor_core::types::{EditMode, InputEvent, RawInput};
use iap_editor_core::{Phase, Propagation, RowEvent, SaveOutcome};

// ===== Mock Implementations =====

/// Serves fixed price points and scripted save responses.
#[derive(Default)]
struct MockTransport {
    price_points: HashMap<String, PricePoint>,
    price_point_requests: Mutex<Vec<String>>,
    responses: Mutex<Vec<ClientResult<Record>>>,
    requests: Mutex<Vec<SaveRequest>>,
}

impl MockTransport {
    fn with_price(mut self, id: &str, price: &str, currency: &str) -> Self {
        self.price_points.insert(
            id.to_string(),
            PricePoint {
                prices: vec![Price {
                    price: price.to_string(),
                    currency: currency.to_string(),
                }],
            },
        );
        self
    }

    fn respond_with(&self, response: ClientResult<Record>) {
        self.responses.lock().unwrap().push(response);
    }

    fn requests(&self) -> Vec<SaveRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn price_point_requests(&self) -> usize {
        self.price_point_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogTransport for MockTransport {
    async fn fetch_price_point(&self, price_id: &str) -> ClientResult<PricePoint> {
        self.price_point_requests
            .lock()
            .unwrap()
            .push(price_id.to_string());
        self.price_points
            .get(price_id)
            .cloned()
            .ok_or(ClientError::Rejected {
                status: 404,
                body: "Not found".to_string(),
            })
    }

    async fn send_record(&self, request: &SaveRequest) -> ClientResult<Record> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().remove(0)
    }
}

fn page_config() -> PageConfig {
    PageConfig::from_json(
        r#"{
            "list_url": "/api/v1/in-app/",
            "detail_url_format": "/api/v1/in-app/%7Bid%7D/"
        }"#,
    )
    .unwrap()
}

fn widget_snapshot() -> ProductRowSnapshot {
    ProductRowSnapshot {
        pk_text: " ".to_string(),
        name_input: "Widget".to_string(),
        name_text: "Widget".to_string(),
        price_value: "5".to_string(),
        ..ProductRowSnapshot::default()
    }
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

// ===== Builder =====

#[test]
fn build_requires_config() {
    let result = AppStateBuilder::new().build();
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn build_rejects_invalid_config() {
    let config = PageConfig::new("/api/v1/in-app/", "/api/v1/in-app/");
    let result = AppStateBuilder::new()
        .config(config)
        .transport(Arc::new(MockTransport::default()))
        .build();
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn build_without_transport_uses_http() {
    let mut config = page_config();
    config.origin = Some("https://marketplace.example.com".to_string());
    let state = AppStateBuilder::new().config(config).build().unwrap();
    assert!(state.rows().is_empty());
    assert_eq!(state.ctx.endpoints().list_url, "/api/v1/in-app/");
}

// ===== Product rows =====

#[tokio::test]
async fn end_to_end_create() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();
    assert_eq!(state.mount_rows(&[widget_snapshot()]).unwrap(), 1);

    let row = state.row(0).unwrap();
    row.settled().await;
    assert_eq!(row.identifier(), None);
    assert_eq!(row.field(PRICE_FIELD).unwrap().output_text(), "0.99 USD");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _observer = row.bus().subscribe(Phase::Page, move |event| {
        sink.lock().unwrap().push(event.clone());
        Propagation::Continue
    });

    row.start_edit();
    let name = row.field(NAME_FIELD).unwrap();
    assert!(name.handle_input(InputEvent::KeyUp(RawInput::text("Gadget"))));
    assert!(seen.lock().unwrap().contains(&RowEvent::FieldChanged {
        name: NAME_FIELD.to_string(),
        value: FieldValue::text("Gadget"),
    }));
    assert_eq!(name.output_text(), "Gadget");

    transport.respond_with(Ok(record(&[
        ("id", "42"),
        ("name", "Gadget"),
        ("price_id", "5"),
    ])));
    let outcome = row.save().await;
    assert!(matches!(outcome, SaveOutcome::Saved(_)));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, SaveMethod::Post);
    assert_eq!(requests[0].url, "/api/v1/in-app/");
    let RequestBody::Form(pairs) = &requests[0].body else {
        panic!("expected a form body");
    };
    assert!(pairs.contains(&("name".to_string(), "Gadget".to_string())));
    assert!(pairs.contains(&("price_id".to_string(), "5".to_string())));

    assert_eq!(row.identifier().as_deref(), Some("42"));
    assert_eq!(row.mode(), EditMode::Viewing);
    assert!(row.is_save_enabled());
    row.settled().await;
    assert_eq!(row.display("id").unwrap().text(), "42");
}

#[tokio::test]
async fn existing_product_updates_detail_url() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();
    state
        .mount_rows(&[ProductRowSnapshot {
            pk_text: "\n  7 ".to_string(),
            ..widget_snapshot()
        }])
        .unwrap();

    let row = state.row(0).unwrap();
    transport.respond_with(Ok(record(&[("id", "7"), ("name", "Widget")])));
    row.save().await;

    let requests = transport.requests();
    assert_eq!(requests[0].method, SaveMethod::Patch);
    assert_eq!(requests[0].url, "/api/v1/in-app/7/");
}

#[tokio::test]
async fn price_lookups_are_shared_across_rows() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();
    state
        .mount_rows(&[widget_snapshot(), widget_snapshot(), widget_snapshot()])
        .unwrap();

    for row in state.rows().iter() {
        row.settled().await;
        assert_eq!(row.field(PRICE_FIELD).unwrap().output_text(), "0.99 USD");
    }
    assert_eq!(transport.price_point_requests(), 1);
}

#[tokio::test]
async fn price_options_avoid_the_network() {
    let transport = Arc::new(MockTransport::default());
    let mut config = page_config();
    config.price_options = Some(vec![PriceOption {
        value: "5".to_string(),
        label: "Tier 1".to_string(),
    }]);
    let mut state = AppStateBuilder::new()
        .config(config)
        .transport(transport.clone())
        .build()
        .unwrap();
    state.mount_rows(&[widget_snapshot()]).unwrap();

    let row = state.row(0).unwrap();
    assert_eq!(row.field(PRICE_FIELD).unwrap().output_text(), "Tier 1");
    assert_eq!(transport.price_point_requests(), 0);
}

#[tokio::test]
async fn validation_errors_route_to_fields() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();
    state.mount_rows(&[widget_snapshot()]).unwrap();
    let row = state.row(0).unwrap();

    let errors = serde_json::from_str(r#"{"price_id": ["Invalid price"], "logo_url": ["Bad URL"]}"#)
        .unwrap();
    transport.respond_with(Err(ClientError::FieldErrors { errors }));
    assert!(matches!(row.save().await, SaveOutcome::Rejected(_)));

    assert_eq!(
        row.field(PRICE_FIELD).unwrap().error_text().as_deref(),
        Some("Invalid price")
    );
    assert_eq!(row.field(NAME_FIELD).unwrap().error_text(), None);
    assert_eq!(row.external_error(LOGO_FIELD).as_deref(), Some("Bad URL"));
    assert_eq!(row.error_text(), None);
}

#[tokio::test]
async fn plain_text_failure_shows_on_row() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();
    state.mount_rows(&[widget_snapshot()]).unwrap();
    let row = state.row(0).unwrap();

    transport.respond_with(Err(ClientError::Rejected {
        status: 403,
        body: "You do not own this app.".to_string(),
    }));
    assert_eq!(
        row.save().await,
        SaveOutcome::Failed("You do not own this app.".to_string())
    );
    assert_eq!(row.error_text().as_deref(), Some("You do not own this app."));
    assert!(row.is_save_enabled());
}

#[tokio::test]
async fn added_product_starts_editing() {
    let transport = Arc::new(MockTransport::default());
    let mut state = AppStateBuilder::new()
        .config(page_config())
        .transport(transport.clone())
        .build()
        .unwrap();

    let row = state.add_product().unwrap();
    assert_eq!(row.mode(), EditMode::Editing);
    assert!(row.field(NAME_FIELD).unwrap().has_focus());
    assert!(!row.field(PRICE_FIELD).unwrap().has_focus());
    assert_eq!(row.record().get("active"), Some(&FieldValue::boolean(true)));

    assert!(row
        .set_external_field(LOGO_FIELD, Some("https://cdn.example.com/logo.png".to_string()))
        .unwrap());
    assert!(row.record().contains(LOGO_FIELD));
    assert_eq!(state.rows().len(), 1);
}

#[tokio::test]
async fn localized_json_round_trip() {
    let transport = Arc::new(MockTransport::default().with_price("5", "0.99", "USD"));
    let mut config = page_config();
    config.active_lang = Some("fr".to_string());
    let mut state = AppStateBuilder::new()
        .config(config)
        .transport(transport.clone())
        .build()
        .unwrap();
    state.mount_rows(&[widget_snapshot()]).unwrap();
    let row = state.row(0).unwrap();

    let mut saved = record(&[("id", "9"), ("price_id", "5")]);
    saved.insert("name", serde_json::json!({"fr": "Gadget", "en": "Gadget EN"}));
    transport.respond_with(Ok(saved));
    row.save().await;

    let RequestBody::Json(body) = &transport.requests()[0].body else {
        panic!("expected a JSON body");
    };
    assert_eq!(body["name"], serde_json::json!({"fr": "Widget"}));
    assert_eq!(body["default_locale"], "fr");
    assert_eq!(row.record().get("name"), Some(&FieldValue::text("Gadget")));
    row.settled().await;
    assert_eq!(row.field(NAME_FIELD).unwrap().output_text(), "Gadget");
}
