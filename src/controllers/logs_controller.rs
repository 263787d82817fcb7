use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, models::LogEntry, services::audit_service, AppState};

#[derive(Debug, Serialize)]
pub struct LogDto {
    pub id: String,
    pub message: String,
    pub level: String,
    pub source: String,
    pub created_at: i64,
}

impl From<LogEntry> for LogDto {
    fn from(e: LogEntry) -> Self {
        Self {
            id: e.id.to_hex(),
            message: e.message,
            level: e.level,
            source: e.source,
            created_at: e.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct LogsParams {
    pub level: Option<String>,
    pub source: Option<String>,
    pub limit: Option<i64>,
}

// GET /api/logs
pub async fn get_logs(
    State(state): State<AppState>,
    Query(params): Query<LogsParams>,
) -> Result<Json<Vec<LogDto>>, ApiError> {
    let limit = params.limit.unwrap_or(100).clamp(1, 1000);

    let entries = audit_service::list_logs(&state, params.level, params.source, limit).await?;
    Ok(Json(entries.into_iter().map(LogDto::from).collect()))
}
