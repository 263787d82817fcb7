use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Client for the Yahoo Finance chart API.
///
/// Callers treat any failure here as "no data": an invalid symbol, a
/// rate-limited request or a timeout degrades to an empty result at the
/// market-data layer, never to a hard failure of the whole request.
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// One OHLCV row as returned by the provider. Only the close is guaranteed.
#[derive(Debug, Clone)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl YahooClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { http, base_url }
    }

    /// Daily bars for `[start, end]`, ordered by date ascending.
    pub async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        interval: &str,
    ) -> Result<Vec<Bar>, ProviderError> {
        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // chart API treats period2 as exclusive
        let end_excl = end.succ_opt().unwrap_or(end);
        let period2 = end_excl.and_time(NaiveTime::MIN).and_utc().timestamp();

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", interval.to_string()),
            ])
            .send()
            .await?;

        if res.status().is_client_error() {
            // unknown symbol or rate limiting: no data
            return Ok(Vec::new());
        }
        if !res.status().is_success() {
            return Err(ProviderError::Decode(format!(
                "chart request for {symbol} returned {}",
                res.status()
            )));
        }

        let body = res.json::<ChartResponse>().await?;
        Ok(bars_from_chart(body))
    }

    /// Most recent intraday price, or None when the provider has nothing.
    pub async fn live_price(&self, symbol: &str) -> Result<Option<f64>, ProviderError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let res = self
            .http
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1m")])
            .send()
            .await?;

        if res.status().is_client_error() {
            return Ok(None);
        }
        if !res.status().is_success() {
            return Err(ProviderError::Decode(format!(
                "quote request for {symbol} returned {}",
                res.status()
            )));
        }

        let body = res.json::<ChartResponse>().await?;
        let last = bars_from_chart(body).into_iter().last().map(|b| b.close);
        Ok(last)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<f64>>>,
}

fn field_at(field: &Option<Vec<Option<f64>>>, i: usize) -> Option<f64> {
    field.as_ref().and_then(|v| v.get(i).copied().flatten())
}

/// Flattens the chart payload into bars, dropping rows without a close.
fn bars_from_chart(body: ChartResponse) -> Vec<Bar> {
    let Some(result) = body.chart.result.and_then(|mut r| {
        if r.is_empty() { None } else { Some(r.remove(0)) }
    }) else {
        return Vec::new();
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Vec::new();
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(*ts, 0).map(|dt| dt.date_naive()) else {
            continue;
        };
        let Some(close) = field_at(&quote.close, i) else {
            continue;
        };

        bars.push(Bar {
            date,
            open: field_at(&quote.open, i),
            high: field_at(&quote.high, i),
            low: field_at(&quote.low, i),
            close,
            volume: field_at(&quote.volume, i),
        });
    }

    bars
}
