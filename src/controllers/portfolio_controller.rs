use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::ApiError,
    services::portfolio_service::{self, PortfolioSummary},
    AppState,
};

#[derive(Deserialize)]
pub struct PortfolioParams {
    // caller-supplied portfolio key; falls back to the configured default
    pub portfolio: Option<String>,
}

fn portfolio_key(state: &AppState, params: &PortfolioParams) -> String {
    params
        .portfolio
        .clone()
        .unwrap_or_else(|| state.settings.default_portfolio.clone())
}

#[derive(Deserialize)]
pub struct CreatePositionRequest {
    pub symbol: String,
    pub quantity: f64,
    pub avg_open_price: f64,
}

// POST /api/portfolio/positions
pub async fn post_position(
    State(state): State<AppState>,
    Query(params): Query<PortfolioParams>,
    Json(payload): Json<CreatePositionRequest>,
) -> Result<Json<PortfolioSummary>, ApiError> {
    let sym = payload.symbol.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ApiError::Validation("symbol must not be empty".to_string()));
    }
    if !payload.quantity.is_finite() || payload.quantity == 0.0 {
        return Err(ApiError::Validation(
            "quantity must be non-zero (negative reduces the position)".to_string(),
        ));
    }
    if !payload.avg_open_price.is_finite() || payload.avg_open_price <= 0.0 {
        return Err(ApiError::Validation(
            "avg_open_price must be > 0".to_string(),
        ));
    }

    let key = portfolio_key(&state, &params);
    let portfolio = portfolio_service::get_or_create_portfolio(&state, &key).await?;

    portfolio_service::add_or_update_position(
        &state,
        &portfolio,
        &sym,
        payload.quantity,
        payload.avg_open_price,
    )
    .await?;

    let summary = portfolio_service::get_portfolio_summary(&state, &portfolio).await?;
    Ok(Json(summary))
}

// GET /api/portfolio
pub async fn get_portfolio(
    State(state): State<AppState>,
    Query(params): Query<PortfolioParams>,
) -> Result<Json<PortfolioSummary>, ApiError> {
    let key = portfolio_key(&state, &params);
    let portfolio = portfolio_service::get_or_create_portfolio(&state, &key).await?;

    let summary = portfolio_service::get_portfolio_summary(&state, &portfolio).await?;
    Ok(Json(summary))
}
