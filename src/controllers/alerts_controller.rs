use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::Alert, services::alerts_service, AppState};

#[derive(Debug, Serialize)]
pub struct AlertDto {
    pub id: String,
    pub symbol: String,
    pub condition: String,
    pub threshold_price: f64,
    pub active: bool,
    pub created_at: i64,
    pub last_triggered_at: Option<i64>,
}

impl From<Alert> for AlertDto {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id.to_hex(),
            symbol: a.symbol,
            condition: a.condition,
            threshold_price: a.threshold_price,
            active: a.active,
            created_at: a.created_at,
            last_triggered_at: a.last_triggered_at,
        }
    }
}

fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::BadRequest("malformed alert id".to_string()))
}

// GET /api/alerts
pub async fn get_alerts(State(state): State<AppState>) -> Result<Json<Vec<AlertDto>>, ApiError> {
    let alerts = alerts_service::list_alerts(&state).await?;
    Ok(Json(alerts.into_iter().map(AlertDto::from).collect()))
}

#[derive(Deserialize)]
pub struct CreateAlertRequest {
    pub symbol: String,
    pub condition: String,
    pub threshold_price: f64,
}

// POST /api/alerts
pub async fn post_create_alert(
    State(state): State<AppState>,
    Json(payload): Json<CreateAlertRequest>,
) -> Result<Json<AlertDto>, ApiError> {
    let alert = alerts_service::create_alert(
        &state,
        &payload.symbol,
        &payload.condition,
        payload.threshold_price,
    )
    .await?;

    Ok(Json(AlertDto::from(alert)))
}

// POST /api/alerts/:id/toggle
pub async fn post_toggle_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AlertDto>, ApiError> {
    let oid = parse_id(&id)?;
    let alert = alerts_service::toggle_alert(&state, oid).await?;
    Ok(Json(AlertDto::from(alert)))
}

// DELETE /api/alerts/:id
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let oid = parse_id(&id)?;
    alerts_service::delete_alert(&state, oid).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct AlertCheckResponse {
    pub triggered: Vec<AlertDto>,
}

// POST /api/alerts/check
pub async fn post_check_alerts(
    State(state): State<AppState>,
) -> Result<Json<AlertCheckResponse>, ApiError> {
    let triggered = alerts_service::check_alerts(&state).await?;

    Ok(Json(AlertCheckResponse {
        triggered: triggered.into_iter().map(AlertDto::from).collect(),
    }))
}
