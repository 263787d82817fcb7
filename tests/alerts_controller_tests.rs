use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    routing::{delete, post},
    Router,
};
use http_body_util::BodyExt;
use mongodb::Client;
use tower::ServiceExt;

use marketpulse::{config, controllers::alerts_controller, services, AppState};

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

fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/api/alerts", post(alerts_controller::post_create_alert))
        .with_state(state)
}

fn json_post(uri: &str, body: &str) -> Request<axum::body::Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn create_alert_with_invalid_condition_returns_400() {
    let app = create_app(test_state().await);

    let req = json_post(
        "/api/alerts",
        r#"{"symbol":"AAPL","condition":"WRONG","threshold_price":100.0}"#,
    );

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("condition"));
}

#[tokio::test]
async fn create_alert_with_non_positive_threshold_returns_400() {
    let app = create_app(test_state().await);

    let req = json_post(
        "/api/alerts",
        r#"{"symbol":"AAPL","condition":"above","threshold_price":-10.0}"#,
    );

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body = response_body_string(res).await;
    assert!(body.contains("threshold_price"));
}

#[tokio::test]
async fn create_alert_with_blank_symbol_returns_400() {
    let app = create_app(test_state().await);

    let req = json_post(
        "/api/alerts",
        r#"{"symbol":"  ","condition":"below","threshold_price":10.0}"#,
    );

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggle_with_malformed_id_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route(
            "/api/alerts/:id/toggle",
            post(alerts_controller::post_toggle_alert),
        )
        .with_state(state);

    let req = Request::builder()
        .method("POST")
        .uri("/api/alerts/not-an-id/toggle")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_with_malformed_id_returns_400() {
    let state = test_state().await;
    let app = Router::new()
        .route("/api/alerts/:id", delete(alerts_controller::delete_alert))
        .with_state(state);

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/alerts/not-an-id")
        .body(axum::body::Body::empty())
        .unwrap();

    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
