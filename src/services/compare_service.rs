use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::Quote,
    services::{market_service, metrics},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub close: f64,
    // 100 = price at the start of the range
    pub normalized: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentMetrics {
    pub symbol: String,
    pub return_pct: f64,
    pub volatility_pct: f64,
    pub max_drawdown_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub symbols: Vec<String>,
    pub series: BTreeMap<String, Vec<ComparisonPoint>>,
    pub metrics: Vec<InstrumentMetrics>,
}

/// Splits a comma-separated symbol list, uppercases, and drops duplicates
/// while keeping first-seen order. Case-variants of the same symbol would
/// otherwise be compared against themselves.
pub fn normalize_symbols(raw: &str) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let sym = part.trim().to_uppercase();
        if !sym.is_empty() && !seen.contains(&sym) {
            seen.push(sym);
        }
    }
    seen
}

/// Assembles the response from per-symbol series. All-or-nothing: any symbol
/// with zero quotes in range fails the whole comparison, so no partial series
/// ever leaves this function.
fn build_comparison(
    symbols: &[String],
    series_by_symbol: Vec<(String, Vec<Quote>)>,
) -> Result<Comparison, ApiError> {
    let mut series: BTreeMap<String, Vec<ComparisonPoint>> = BTreeMap::new();
    let mut all_metrics: Vec<InstrumentMetrics> = Vec::new();

    for (sym, quotes) in series_by_symbol {
        if quotes.is_empty() {
            return Err(ApiError::NotFound(format!(
                "no data for symbol {sym} in the requested range"
            )));
        }

        let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
        let normalized = metrics::normalize(&closes);

        let points: Vec<ComparisonPoint> = quotes
            .iter()
            .zip(normalized)
            .map(|(q, n)| ComparisonPoint {
                date: q.date,
                close: q.close,
                normalized: n,
            })
            .collect();

        let m = metrics::compute(&closes);
        all_metrics.push(InstrumentMetrics {
            symbol: sym.clone(),
            return_pct: m.return_pct,
            volatility_pct: m.volatility_pct,
            max_drawdown_pct: m.max_drawdown_pct,
        });

        series.insert(sym, points);
    }

    Ok(Comparison {
        symbols: symbols.to_vec(),
        series,
        metrics: all_metrics,
    })
}

/// Refreshes and reads every symbol's series over the range, then computes
/// per-symbol normalized points and metrics.
pub async fn compare(
    state: &AppState,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Comparison, ApiError> {
    let mut fetched: Vec<(String, Vec<Quote>)> = Vec::with_capacity(symbols.len());

    for sym in symbols {
        let quotes = market_service::fetch_and_store_history(state, sym, start, end).await?;
        fetched.push((sym.clone(), quotes));
    }

    build_comparison(symbols, fetched)
}
