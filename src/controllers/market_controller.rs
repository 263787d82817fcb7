use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::Quote,
    services::{audit_service, compare_service, market_service},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDto {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl From<Quote> for QuoteDto {
    fn from(q: Quote) -> Self {
        Self {
            date: q.date,
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub quotes: Vec<QuoteDto>,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn validated_symbol(raw: &str) -> Result<String, ApiError> {
    let sym = raw.trim().to_uppercase();
    if sym.is_empty() {
        return Err(ApiError::Validation("symbol must not be empty".to_string()));
    }
    Ok(sym)
}

fn validated_range(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::Validation(
            "start must not be after end".to_string(),
        ));
    }
    Ok(())
}

// GET /api/history
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let sym = validated_symbol(&params.symbol)?;
    validated_range(params.start, params.end)?;

    let cache_key = format!("history:{sym}:{}:{}", params.start, params.end);
    if let Some(hit) = state.cache.get(&cache_key) {
        if let Ok(cached) = serde_json::from_value::<HistoryResponse>(hit) {
            return Ok(Json(cached));
        }
    }

    let quotes =
        market_service::fetch_and_store_history(&state, &sym, params.start, params.end).await?;

    audit_service::record(
        &state,
        "INFO",
        "history",
        &format!("History fetched: {sym} {}..{}", params.start, params.end),
    )
    .await;

    let response = HistoryResponse {
        symbol: sym,
        quotes: quotes.into_iter().map(QuoteDto::from).collect(),
    };

    if let Ok(value) = serde_json::to_value(&response) {
        state.cache.set(
            &cache_key,
            value,
            Duration::from_secs(state.settings.history_cache_ttl_secs),
        );
    }

    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct CurrentParams {
    pub symbol: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentQuoteResponse {
    pub symbol: String,
    pub quote: QuoteDto,
}

// GET /api/current
pub async fn get_current(
    State(state): State<AppState>,
    Query(params): Query<CurrentParams>,
) -> Result<Json<CurrentQuoteResponse>, ApiError> {
    let sym = validated_symbol(&params.symbol)?;

    let cache_key = format!("current:{sym}");
    if let Some(hit) = state.cache.get(&cache_key) {
        if let Ok(cached) = serde_json::from_value::<CurrentQuoteResponse>(hit) {
            return Ok(Json(cached));
        }
    }

    // pull the last few days so the latest candle is fresh
    market_service::refresh_recent_history(&state, &sym, state.settings.refresh_lookback_days)
        .await?;

    let Some(latest) = market_service::get_latest_quote(&state, &sym).await? else {
        return Err(ApiError::NotFound(format!("no data for symbol {sym}")));
    };

    let response = CurrentQuoteResponse {
        symbol: sym,
        quote: QuoteDto::from(latest),
    };

    if let Ok(value) = serde_json::to_value(&response) {
        state.cache.set(
            &cache_key,
            value,
            Duration::from_secs(state.settings.quote_cache_ttl_secs),
        );
    }

    Ok(Json(response))
}

#[derive(Deserialize)]
pub struct CompareParams {
    // comma-separated, e.g. "AAPL,MSFT,TSLA"
    pub symbols: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// GET /api/compare
pub async fn get_compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<compare_service::Comparison>, ApiError> {
    validated_range(params.start, params.end)?;

    let symbols = compare_service::normalize_symbols(&params.symbols);
    if symbols.len() < 2 {
        return Err(ApiError::BadRequest(
            "provide at least two distinct symbols, e.g. AAPL,MSFT".to_string(),
        ));
    }

    let comparison = compare_service::compare(&state, &symbols, params.start, params.end).await?;
    Ok(Json(comparison))
}

#[derive(Debug, Serialize)]
pub struct InstrumentDto {
    pub symbol: String,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub pricing_currency: Option<String>,
}

// GET /api/instruments
pub async fn get_instruments(
    State(state): State<AppState>,
) -> Result<Json<Vec<InstrumentDto>>, ApiError> {
    let instruments = market_service::list_instruments(&state).await?;

    let items = instruments
        .into_iter()
        .map(|i| InstrumentDto {
            symbol: i.symbol,
            name: i.name,
            kind: i.kind,
            pricing_currency: i.pricing_currency,
        })
        .collect();

    Ok(Json(items))
}
