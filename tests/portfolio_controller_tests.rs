use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use http_body_util::BodyExt;
use mongodb::Client;
use tower::ServiceExt;

use marketpulse::{config, controllers::portfolio_controller, services, AppState};

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

fn positions_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/portfolio/positions",
            post(portfolio_controller::post_position),
        )
        .with_state(state)
}

fn json_post(body: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri("/api/portfolio/positions")
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn position_with_zero_quantity_returns_422() {
    let app = positions_app(test_state().await);

    let req = json_post(r#"{"symbol":"AAPL","quantity":0.0,"avg_open_price":100.0}"#);

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_body_string(res).await;
    assert!(body.contains("quantity"));
}

#[tokio::test]
async fn position_with_non_positive_price_returns_422() {
    let app = positions_app(test_state().await);

    let req = json_post(r#"{"symbol":"AAPL","quantity":3.0,"avg_open_price":-100.0}"#);

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = response_body_string(res).await;
    assert!(body.contains("avg_open_price"));
}

#[tokio::test]
async fn position_with_blank_symbol_returns_422() {
    let app = positions_app(test_state().await);

    let req = json_post(r#"{"symbol":" ","quantity":3.0,"avg_open_price":100.0}"#);

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
