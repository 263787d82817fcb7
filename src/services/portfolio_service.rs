use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::UpdateOptions;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::{Portfolio, Position},
    services::{audit_service, market_service},
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSummary {
    pub instrument: String,
    pub quantity: f64,
    pub avg_open_price: f64,
    pub current_price: f64,
    pub position_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub portfolio: String,
    pub name: String,
    pub base_currency: Option<String>,
    pub positions: Vec<PositionSummary>,
    pub total_value: f64,
}

/// Weighted-average merge of an existing position with a new lot.
///
/// A merge landing on exactly zero keeps the prior average open price and
/// only zeroes the quantity; the record is kept, not deleted.
pub fn merge_position(old_qty: f64, old_avg: f64, qty: f64, price: f64) -> (f64, f64) {
    let new_qty = old_qty + qty;
    if new_qty == 0.0 {
        (0.0, old_avg)
    } else {
        let new_avg = (old_avg * old_qty + price * qty) / new_qty;
        (new_qty, new_avg)
    }
}

/// Merges a new lot into an existing position record.
fn apply_lot(mut pos: Position, quantity: f64, price: f64, now: i64) -> Position {
    let (new_qty, new_avg) = merge_position(pos.quantity, pos.avg_open_price, quantity, price);
    pos.quantity = new_qty;
    pos.avg_open_price = new_avg;
    pos.updated_at = now;
    pos
}

fn position_fields(pos: &Position) -> Document {
    doc! {
        "portfolio_id": pos.portfolio_id,
        "symbol": &pos.symbol,
        "quantity": pos.quantity,
        "avg_open_price": pos.avg_open_price,
        "opened_at": pos.opened_at,
        "updated_at": pos.updated_at,
    }
}

/// Values positions given the latest stored close per symbol; a position
/// whose symbol has no quotes falls back to its average open price.
fn summarize_positions(entries: Vec<(Position, Option<f64>)>) -> (Vec<PositionSummary>, f64) {
    let mut items: Vec<PositionSummary> = Vec::with_capacity(entries.len());
    let mut total_value = 0.0;

    for (pos, latest_close) in entries {
        let current_price = latest_close.unwrap_or(pos.avg_open_price);
        let position_value = current_price * pos.quantity;
        total_value += position_value;

        items.push(PositionSummary {
            instrument: pos.symbol,
            quantity: pos.quantity,
            avg_open_price: pos.avg_open_price,
            current_price,
            position_value,
        });
    }

    (items, total_value)
}

pub async fn get_or_create_portfolio(state: &AppState, key: &str) -> Result<Portfolio, ApiError> {
    let portfolios = state.db.collection::<Portfolio>("portfolios");

    if let Some(existing) = portfolios.find_one(doc! { "key": key }, None).await? {
        return Ok(existing);
    }

    let portfolio = Portfolio {
        id: ObjectId::new(),
        key: key.to_string(),
        name: format!("Portfolio {key}"),
        base_currency: Some("USD".to_string()),
    };

    match portfolios.insert_one(&portfolio, None).await {
        Ok(_) => Ok(portfolio),
        Err(err) => {
            if let Some(existing) = portfolios.find_one(doc! { "key": key }, None).await? {
                Ok(existing)
            } else {
                Err(err.into())
            }
        }
    }
}

/// Creates the (portfolio, instrument) position or merges the new lot into
/// it. Negative quantity is a reduction; see `merge_position` for the
/// zero-quantity rule.
pub async fn add_or_update_position(
    state: &AppState,
    portfolio: &Portfolio,
    symbol: &str,
    quantity: f64,
    avg_open_price: f64,
) -> Result<Position, ApiError> {
    let instrument = market_service::get_or_create_instrument(state, symbol).await?;
    let sym = instrument.symbol.clone();

    let positions = state.db.collection::<Position>("positions");
    let existing = positions
        .find_one(doc! { "portfolio_id": portfolio.id, "symbol": &sym }, None)
        .await?;

    let now = Utc::now().timestamp();
    let was_new = existing.is_none();

    let mut position = match existing {
        Some(pos) => apply_lot(pos, quantity, avg_open_price, now),
        None => Position {
            id: ObjectId::new(),
            portfolio_id: portfolio.id,
            symbol: sym.clone(),
            quantity,
            avg_open_price,
            opened_at: now,
            updated_at: now,
        },
    };

    let write = positions
        .update_one(
            doc! { "_id": position.id },
            doc! { "$set": position_fields(&position) },
            UpdateOptions::builder().upsert(true).build(),
        )
        .await;

    if let Err(err) = write {
        // Two first-time posts can both miss find_one and upsert under
        // distinct ids; the unique (portfolio_id, symbol) index rejects the
        // loser. Re-read the winner's row and merge into it, same as
        // get_or_create_instrument does for symbols.
        if !was_new {
            return Err(err.into());
        }
        let Some(winner) = positions
            .find_one(doc! { "portfolio_id": portfolio.id, "symbol": &sym }, None)
            .await?
        else {
            return Err(err.into());
        };

        position = apply_lot(winner, quantity, avg_open_price, now);
        positions
            .update_one(
                doc! { "_id": position.id },
                doc! { "$set": position_fields(&position) },
                None,
            )
            .await?;
    }

    audit_service::record(
        state,
        "INFO",
        "portfolio",
        &format!("Position upsert: {} {} @ {}", sym, quantity, avg_open_price),
    )
    .await;

    Ok(position)
}

/// Values every position at the latest stored close, falling back to the
/// average open price when the store has no quotes for the symbol.
pub async fn get_portfolio_summary(
    state: &AppState,
    portfolio: &Portfolio,
) -> Result<PortfolioSummary, ApiError> {
    let positions = state.db.collection::<Position>("positions");

    let mut cursor = positions
        .find(doc! { "portfolio_id": portfolio.id }, None)
        .await?;

    let mut entries: Vec<(Position, Option<f64>)> = Vec::new();

    while let Some(res) = cursor.next().await {
        let pos = res?;
        let latest_close = market_service::get_latest_quote(state, &pos.symbol)
            .await?
            .map(|quote| quote.close);
        entries.push((pos, latest_close));
    }

    let (items, total_value) = summarize_positions(entries);

    Ok(PortfolioSummary {
        portfolio: portfolio.key.clone(),
        name: portfolio.name.clone(),
        base_currency: portfolio.base_currency.clone(),
        positions: items,
        total_value,
    })
}
