//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use api::routes::orders::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use checkout::InMemoryDependencies;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config {
        build_id: Some("testbuild".to_string()),
        ..Config::default()
    }
}

fn setup() -> axum::Router {
    setup_with_state().0
}

fn setup_with_state() -> (axum::Router, Arc<AppState>, InMemoryDependencies) {
    let (state, services) = api::create_default_state(&test_config());
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state, services)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, json: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&json).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn order_body(user_id: &str, currency: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "user_currency": currency,
        "email": "someone@example.com",
        "address": {
            "street_address": "1600 Amphitheatre Parkway",
            "city": "Mountain View",
            "state": "CA",
            "country": "USA",
            "zip_code": 94043
        },
        "credit_card": {
            "credit_card_number": "4432-8015-6152-0454",
            "credit_card_cvv": 672,
            "credit_card_expiration_year": 2099,
            "credit_card_expiration_month": 1
        }
    })
}

async fn add_to_cart(app: &axum::Router, user_id: &str, product_id: &str, quantity: u32) {
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/carts/{user_id}/items"),
            serde_json::json!({ "product_id": product_id, "quantity": quantity }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["build"], "testbuild");
}

#[tokio::test]
async fn test_load_counter_starts_at_zero() {
    let app = setup();

    let response = app.oneshot(get("/load-counter")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["size"], 0);
    assert_eq!(json["over_user_threshold"], false);
}

#[tokio::test]
async fn test_add_items_to_cart() {
    let app = setup();

    add_to_cart(&app, "u-1", "OLJCESPC7Z", 1).await;
    add_to_cart(&app, "u-1", "OLJCESPC7Z", 2).await;

    let response = app.oneshot(get("/carts/u-1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user_id"], "u-1");
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_add_zero_quantity_rejected() {
    let app = setup();

    let response = app
        .oneshot(post_json(
            "/carts/u-1/items",
            serde_json::json!({ "product_id": "OLJCESPC7Z", "quantity": 0 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("quantity"));
}

#[tokio::test]
async fn test_add_overflowing_quantity_rejected() {
    let app = setup();
    add_to_cart(&app, "u-9", "OLJCESPC7Z", u32::MAX).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/carts/u-9/items",
            serde_json::json!({ "product_id": "OLJCESPC7Z", "quantity": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/carts/u-9")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["items"][0]["quantity"], u32::MAX);
}

#[tokio::test]
async fn test_place_order() {
    let (app, state, services) = setup_with_state();
    add_to_cart(&app, "u-2", "OLJCESPC7Z", 1).await;
    add_to_cart(&app, "u-2", "66VCHSJNUP", 2).await;

    let response = app
        .clone()
        .oneshot(post_json("/orders", order_body("u-2", "USD")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["order_id"].is_string());
    assert_eq!(json["shipping_cost"]["currency_code"], "USD");
    assert_eq!(json["shipping_cost"]["units"], 8);
    assert_eq!(json["shipping_cost"]["nanos"], 990_000_000);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["shipping_address"]["zip_code"], 94043);

    // 67.99 + 12.49 * 2 + 8.99
    let charges = services.payment.charges();
    assert_eq!(charges.len(), 1);
    assert_eq!(charges[0].amount.to_string(), "101.96 USD");

    let size = state.orchestrator.load_counter_size();
    assert!((10..=11).contains(&size));
}

#[tokio::test]
async fn test_place_order_uses_request_id_header() {
    let app = setup();

    let mut request = post_json("/orders", order_body("u-3", "USD"));
    request
        .headers_mut()
        .insert("x-request-id", "req-abc".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_place_order_invalid_currency() {
    let app = setup();

    let response = app
        .oneshot(post_json("/orders", order_body("u-4", "US")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_place_order_unknown_product_fails() {
    let (app, _state, services) = setup_with_state();
    add_to_cart(&app, "u-5", "NOT-A-PRODUCT", 1).await;

    let response = app
        .oneshot(post_json("/orders", order_body("u-5", "USD")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("product_catalog failed"));
    assert_eq!(services.payment.charge_calls(), 0);
}

#[tokio::test]
async fn test_place_order_declined_card() {
    let app = setup();
    let mut body = order_body("u-6", "USD");
    body["credit_card"]["credit_card_number"] = serde_json::json!("378282246310005");

    let response = app.oneshot(post_json("/orders", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("payment failed"));
}

#[tokio::test]
async fn test_shipping_failure_is_service_unavailable() {
    let (app, _state, services) = setup_with_state();
    services.shipping.set_fail_on_ship(true);

    let response = app
        .oneshot(post_json("/orders", order_body("u-7", "USD")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(services.payment.charges().len(), 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(post_json("/orders", order_body("u-8", "USD")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("checkout_orders_total"));
}

#[tokio::test]
async fn test_error_responses_are_counted() {
    let app = setup();

    let response = app
        .clone()
        .oneshot(post_json("/orders", order_body("u-10", "DOLLARS")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("api_error_responses_total{status=\"400\"}"));
}
