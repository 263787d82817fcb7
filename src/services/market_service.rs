use chrono::{Duration, NaiveDate, Utc};
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{FindOneOptions, FindOptions, UpdateOptions};

use crate::{
    error::ApiError,
    models::{Instrument, Quote},
    AppState,
};

/// Looks the instrument up by symbol, creating it on first reference.
/// A concurrent insert losing the race on the unique index falls back to the
/// row the winner wrote.
pub async fn get_or_create_instrument(
    state: &AppState,
    symbol: &str,
) -> Result<Instrument, ApiError> {
    let sym = symbol.trim().to_uppercase();
    let instruments = state.db.collection::<Instrument>("instruments");

    if let Some(existing) = instruments.find_one(doc! { "symbol": &sym }, None).await? {
        return Ok(existing);
    }

    let instrument = Instrument {
        id: ObjectId::new(),
        symbol: sym.clone(),
        name: None,
        kind: None,
        pricing_currency: None,
    };

    match instruments.insert_one(&instrument, None).await {
        Ok(_) => Ok(instrument),
        Err(err) => {
            // duplicate key: someone else created it between our read and write
            if let Some(existing) = instruments.find_one(doc! { "symbol": &sym }, None).await? {
                Ok(existing)
            } else {
                Err(err.into())
            }
        }
    }
}

pub async fn list_instruments(state: &AppState) -> Result<Vec<Instrument>, ApiError> {
    let instruments = state.db.collection::<Instrument>("instruments");
    let find_opts = FindOptions::builder().sort(doc! { "symbol": 1 }).build();

    let mut cursor = instruments.find(None, find_opts).await?;

    let mut items: Vec<Instrument> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}

/// Fetches the range from the provider and upserts every bar on
/// (symbol, date). Provider failures degrade to "no new data"; whatever the
/// store already holds for the range is returned either way.
pub async fn fetch_and_store_history(
    state: &AppState,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Quote>, ApiError> {
    let instrument = get_or_create_instrument(state, symbol).await?;
    let sym = instrument.symbol.clone();

    let bars = match state.provider.history(&sym, start, end, "1d").await {
        Ok(bars) => bars,
        Err(err) => {
            tracing::warn!(symbol = %sym, "provider fetch failed: {err}");
            Vec::new()
        }
    };

    let quotes = state.db.collection::<Quote>("quotes");
    for bar in &bars {
        quotes
            .update_one(
                doc! { "symbol": &sym, "date": bar.date.to_string() },
                doc! {
                    "$set": {
                        "open": bar.open,
                        "high": bar.high,
                        "low": bar.low,
                        "close": bar.close,
                        "volume": bar.volume,
                    },
                    "$setOnInsert": { "_id": ObjectId::new() },
                },
                UpdateOptions::builder().upsert(true).build(),
            )
            .await?;
    }

    get_history_from_db(state, &sym, Some(start), Some(end)).await
}

/// Stored series for a symbol, date ascending, optionally bounded.
pub async fn get_history_from_db(
    state: &AppState,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Quote>, ApiError> {
    let sym = symbol.trim().to_uppercase();
    let quotes = state.db.collection::<Quote>("quotes");

    let mut filter = doc! { "symbol": &sym };
    let mut range = Document::new();
    if let Some(start) = start {
        range.insert("$gte", start.to_string());
    }
    if let Some(end) = end {
        range.insert("$lte", end.to_string());
    }
    if !range.is_empty() {
        filter.insert("date", range);
    }

    let find_opts = FindOptions::builder().sort(doc! { "date": 1 }).build();
    let mut cursor = quotes.find(filter, find_opts).await?;

    let mut items: Vec<Quote> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}

/// Re-fetches the last `days` calendar days for a symbol.
pub async fn refresh_recent_history(
    state: &AppState,
    symbol: &str,
    days: i64,
) -> Result<Vec<Quote>, ApiError> {
    let today = Utc::now().date_naive();
    let start = today - Duration::days(days);
    fetch_and_store_history(state, symbol, start, today).await
}

/// Newest stored quote for a symbol, if any.
pub async fn get_latest_quote(state: &AppState, symbol: &str) -> Result<Option<Quote>, ApiError> {
    let sym = symbol.trim().to_uppercase();
    let quotes = state.db.collection::<Quote>("quotes");

    let find_opts = FindOneOptions::builder().sort(doc! { "date": -1 }).build();
    Ok(quotes.find_one(doc! { "symbol": &sym }, find_opts).await?)
}
