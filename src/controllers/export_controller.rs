use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    error::ApiError,
    services::{audit_service, export_service},
    AppState,
};

#[derive(Deserialize)]
pub struct ExportParams {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// GET /api/export/csv
pub async fn get_export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<impl IntoResponse, ApiError> {
    let sym = params.symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ApiError::Validation("symbol must not be empty".to_string()));
    }
    if params.start > params.end {
        return Err(ApiError::Validation(
            "start must not be after end".to_string(),
        ));
    }

    let csv_data =
        export_service::export_history_to_csv(&state, &sym, Some(params.start), Some(params.end))
            .await?;

    audit_service::record(
        &state,
        "INFO",
        "export",
        &format!("CSV export: {sym} {}..{}", params.start, params.end),
    )
    .await;

    let filename = format!("{}_{}_{}.csv", sym, params.start, params.end);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| ApiError::Internal(format!("bad header value: {e}")))?,
    );

    Ok((headers, csv_data))
}
