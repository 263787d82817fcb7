use std::time::Duration;

use axum::{
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use mongodb::Client;
use tower::ServiceExt;

use marketpulse::{config, controllers::market_controller, services, AppState};

// The state connects lazily: none of these requests may reach the database
// or the provider, they all fail validation first.
async fn test_state() -> AppState {
    let settings = config::load();

    let client = Client::with_uri_str(&settings.mongodb_uri)
        .await
        .expect("mongodb client");
    let db = client.database(&settings.mongodb_db);

    let provider = services::yahoo::YahooClient::new(
        settings.provider_base_url.clone(),
        Duration::from_secs(settings.provider_timeout_secs),
    );

    AppState {
        db,
        settings,
        provider,
        cache: services::cache::MemoryCache::new(),
    }
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn history_app(state: AppState) -> Router {
    Router::new()
        .route("/api/history", get(market_controller::get_history))
        .with_state(state)
}

fn compare_app(state: AppState) -> Router {
    Router::new()
        .route("/api/compare", get(market_controller::get_compare))
        .with_state(state)
}

#[tokio::test]
async fn history_with_inverted_range_returns_422() {
    let app = history_app(test_state().await);

    let req = Request::builder()
        .uri("/api/history?symbol=AAPL&start=2025-12-31&end=2025-01-01")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_body_string(res).await;
    assert!(body.contains("start"));
}

#[tokio::test]
async fn history_with_blank_symbol_returns_422() {
    let app = history_app(test_state().await);

    let req = Request::builder()
        .uri("/api/history?symbol=%20&start=2025-01-01&end=2025-01-31")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_body_string(res).await;
    assert!(body.contains("symbol"));
}

#[tokio::test]
async fn compare_with_single_symbol_returns_400() {
    let app = compare_app(test_state().await);

    let req = Request::builder()
        .uri("/api/compare?symbols=AAPL&start=2025-01-01&end=2025-01-31")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compare_dedupes_case_variants_before_counting() {
    let app = compare_app(test_state().await);

    // AAPL and aapl are the same instrument, so only one symbol remains
    let req = Request::builder()
        .uri("/api/compare?symbols=AAPL,aapl&start=2025-01-01&end=2025-01-31")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn compare_with_inverted_range_returns_422() {
    let app = compare_app(test_state().await);

    let req = Request::builder()
        .uri("/api/compare?symbols=AAPL,MSFT&start=2025-12-31&end=2025-01-01")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
