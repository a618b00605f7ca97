//! Cart round trip through the storefront router against a mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use jc_closet_integration_tests::{Recorder, browser, spawn, spawn_storefront};
use serde_json::json;

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
    match id.as_str() {
        "p1" => (
            StatusCode::OK,
            Json(json!({
                "_id": "p1", "name": "Oud Royale", "price": 12500,
                "stock": 10, "images": ["/img/oud.jpg"]
            })),
        ),
        "p0" => (
            StatusCode::OK,
            Json(json!({ "_id": "p0", "name": "Amber Nuit", "price": 9000, "stock": 0 })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Perfume not found" })),
        ),
    }
}

async fn setup() -> (String, Recorder) {
    let backend = Recorder::default();
    let api = spawn(
        Router::new()
            .route("/api/session/start", post(start_session))
            .route("/api/v1/analytics/pageview", post(page_view))
            .route("/api/perfumes/{id}", get(perfume))
            .with_state(backend.clone()),
    )
    .await;
    let shop = spawn_storefront(&format!("{api}/api")).await;
    (shop, backend)
}

#[tokio::test]
async fn test_add_then_count_then_view_cart() {
    let (shop, backend) = setup().await;
    let client = browser();

    let resp = client
        .post(format!("{shop}/cart/add"))
        .form(&[("product_id", "p1"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["hx-trigger"], "cart-updated");
    assert!(resp.text().await.unwrap().contains(">2<"));

    let resp = client
        .post(format!("{shop}/cart/add"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    assert!(resp.text().await.unwrap().contains(">3<"));

    let count = client
        .get(format!("{shop}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(count.contains("cart-badge"));
    assert!(count.contains(">3<"));

    let page = client
        .get(format!("{shop}/cart"))
        .header("accept", "text/html")
        .send()
        .await
        .unwrap();
    assert_eq!(page.status(), StatusCode::OK);
    assert!(page.text().await.unwrap().contains("Oud Royale"));

    // The product is fetched once and then served from the response cache.
    assert_eq!(backend.calls_to("/perfumes/p1").len(), 1);
    // Viewing a page starts the visitor's backend session.
    assert_eq!(backend.calls_to("/session/start").len(), 1);
}

#[tokio::test]
async fn test_cart_is_per_visitor() {
    let (shop, _backend) = setup().await;

    browser()
        .post(format!("{shop}/cart/add"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();

    let other = browser()
        .get(format!("{shop}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!other.contains("cart-badge"));
}

#[tokio::test]
async fn test_sold_out_and_unknown_products_are_rejected() {
    let (shop, _backend) = setup().await;
    let client = browser();

    let sold_out = client
        .post(format!("{shop}/cart/add"))
        .form(&[("product_id", "p0")])
        .send()
        .await
        .unwrap();
    assert_eq!(sold_out.status(), StatusCode::CONFLICT);
    assert_eq!(sold_out.headers()["hx-retarget"], "#cart-feedback");
    assert!(sold_out.text().await.unwrap().contains("cart-error"));

    let unknown = client
        .post(format!("{shop}/cart/add"))
        .form(&[("product_id", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let count = client
        .get(format!("{shop}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!count.contains("cart-badge"));
}
