//! Checkout hand-off through the storefront router against a mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jc_closet_integration_tests::{Recorder, browser, spawn, spawn_storefront};
use serde_json::{Value, json};

/// Mock state: the call log plus every order body received.
#[derive(Clone, Default)]
struct Shop {
    recorder: Recorder,
    orders: Arc<Mutex<Vec<Value>>>,
}

impl FromRef<Shop> for Recorder {
    fn from_ref(shop: &Shop) -> Self {
        shop.recorder.clone()
    }
}

async fn start_session(State(backend): State<Recorder>, headers: HeaderMap) -> impl IntoResponse {
    backend.record("/session/start", &headers);
    Json(json!({ "sessionId": "visitor-1" }))
}

async fn page_view(State(backend): State<Recorder>, headers: HeaderMap) -> impl IntoResponse {
    backend.record("/v1/analytics/pageview", &headers);
    Json(json!({ "ok": true }))
}

async fn perfume(
    State(backend): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    backend.record(&format!("/perfumes/{id}"), &headers);
    Json(json!({
        "_id": id, "name": "Oud Royale", "price": 12500,
        "stock": 10, "images": ["/img/oud.jpg"]
    }))
}

/// Accepts any order and offers a payment page that is not https.
async fn create_order(
    State(shop): State<Shop>,
    headers: HeaderMap,
    Json(order): Json<Value>,
) -> impl IntoResponse {
    shop.recorder.record("/orders", &headers);
    shop.orders.lock().unwrap().push(order);
    (
        StatusCode::CREATED,
        Json(json!({
            "_id": "ord_42",
            "orderNumber": "JC-1042",
            "paymentUrl": "http://pay.example.com/checkout/ord_42"
        })),
    )
}

async fn get_order(
    State(backend): State<Recorder>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    backend.record(&format!("/orders/{id}"), &headers);
    Json(json!({
        "_id": id,
        "orderNumber": "JC-1042",
        "customer": { "name": "Wanjiru Kamau", "email": "wanjiru@example.co.ke" },
        "items": [{ "productId": "p1", "name": "Oud Royale", "price": 12500, "quantity": 2 }],
        "total": 25000
    }))
}

async fn setup() -> (String, Shop) {
    let shop = Shop::default();
    let api = spawn(
        Router::new()
            .route("/api/session/start", post(start_session))
            .route("/api/v1/analytics/pageview", post(page_view))
            .route("/api/perfumes/{id}", get(perfume))
            .route("/api/orders", post(create_order))
            .route("/api/orders/{id}", get(get_order))
            .with_state(shop.clone()),
    )
    .await;
    let storefront = spawn_storefront(&format!("{api}/api")).await;
    (storefront, shop)
}

const DETAILS: [(&str, &str); 5] = [
    ("name", "Wanjiru Kamau"),
    ("email", "wanjiru@example.co.ke"),
    ("phone", "+254 700 000 000"),
    ("address", "Ngong Road 12"),
    ("city", "Nairobi"),
];

#[tokio::test]
async fn test_checkout_places_order_and_empties_cart() {
    let (storefront, shop) = setup().await;
    let client = browser();

    client
        .post(format!("{storefront}/cart/add"))
        .form(&[("product_id", "p1"), ("quantity", "2")])
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{storefront}/checkout"))
        .form(&DETAILS)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    // A payment page without https is never followed.
    assert_eq!(resp.headers()["location"], "/checkout/complete/ord_42");

    assert_eq!(shop.recorder.calls_to("/orders").len(), 1);
    let orders = shop.orders.lock().unwrap().clone();
    assert_eq!(orders[0]["customer"]["name"], "Wanjiru Kamau");
    assert_eq!(orders[0]["items"][0]["productId"], "p1");
    assert_eq!(orders[0]["items"][0]["quantity"], 2);

    let count = client
        .get(format!("{storefront}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!count.contains("cart-badge"));

    let page = client
        .get(format!("{storefront}/checkout/complete/ord_42"))
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    let body = page.text().await.unwrap();
    assert!(body.contains("JC-1042"));
    assert!(body.contains("Wanjiru Kamau"));
}

#[tokio::test]
async fn test_confirmation_is_private_to_the_buyer() {
    let (storefront, shop) = setup().await;
    let buyer = browser();

    buyer
        .post(format!("{storefront}/cart/add"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    buyer
        .post(format!("{storefront}/checkout"))
        .form(&DETAILS)
        .send()
        .await
        .unwrap();

    let stranger = browser()
        .get(format!("{storefront}/checkout/complete/ord_42"))
        .send()
        .await
        .unwrap();
    assert_eq!(stranger.status(), StatusCode::NOT_FOUND);
    assert!(!stranger.text().await.unwrap().contains("Wanjiru"));

    let other = buyer
        .get(format!("{storefront}/checkout/complete/ord_7"))
        .send()
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::NOT_FOUND);

    // Neither refusal reached the backend.
    assert!(shop.recorder.calls_to("/orders/ord_42").is_empty());
    assert!(shop.recorder.calls_to("/orders/ord_7").is_empty());
}

#[tokio::test]
async fn test_invalid_details_rerender_without_ordering() {
    let (storefront, shop) = setup().await;
    let client = browser();

    client
        .post(format!("{storefront}/cart/add"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{storefront}/checkout"))
        .form(&[("name", "Wanjiru Kamau"), ("email", "not-an-email")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("valid email"));
    assert!(shop.recorder.calls_to("/orders").is_empty());
}
