use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "not found" })))
}
