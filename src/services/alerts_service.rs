use std::collections::{HashMap, HashSet};

use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{error::ApiError, models::Alert, services::audit_service, AppState};

pub async fn list_alerts(state: &AppState) -> Result<Vec<Alert>, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");
    let find_opts = FindOptions::builder()
        .sort(doc! { "symbol": 1, "threshold_price": 1 })
        .build();

    let mut cursor = alerts.find(None, find_opts).await?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}

/// Creates an active alert. Symbol is trimmed and uppercased on write;
/// condition and threshold are validated before anything touches the store.
pub async fn create_alert(
    state: &AppState,
    symbol: &str,
    condition: &str,
    threshold_price: f64,
) -> Result<Alert, ApiError> {
    let sym = symbol.trim().to_uppercase();
    let cond = condition.trim().to_lowercase();

    if sym.is_empty() {
        return Err(ApiError::BadRequest("symbol must not be empty".to_string()));
    }
    if cond != "above" && cond != "below" {
        return Err(ApiError::BadRequest(
            "condition must be 'above' or 'below'".to_string(),
        ));
    }
    if !threshold_price.is_finite() || threshold_price <= 0.0 {
        return Err(ApiError::BadRequest(
            "threshold_price must be > 0".to_string(),
        ));
    }

    let alert = Alert {
        id: ObjectId::new(),
        symbol: sym,
        condition: cond,
        threshold_price,
        active: true,
        created_at: Utc::now().timestamp(),
        last_triggered_at: None,
    };

    let alerts = state.db.collection::<Alert>("alerts");
    alerts.insert_one(&alert, None).await?;

    audit_service::record(
        state,
        "INFO",
        "alerts",
        &format!(
            "Created alert: {} {} {}",
            alert.symbol, alert.condition, alert.threshold_price
        ),
    )
    .await;

    Ok(alert)
}

/// Flips active <-> inactive, unconditionally.
pub async fn toggle_alert(state: &AppState, id: ObjectId) -> Result<Alert, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let Some(alert) = alerts.find_one(doc! { "_id": id }, None).await? else {
        return Err(ApiError::NotFound("alert not found".to_string()));
    };

    let active = !alert.active;
    alerts
        .update_one(doc! { "_id": id }, doc! { "$set": { "active": active } }, None)
        .await?;

    Ok(Alert { active, ..alert })
}

pub async fn delete_alert(state: &AppState, id: ObjectId) -> Result<(), ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let res = alerts.delete_one(doc! { "_id": id }, None).await?;
    if res.deleted_count == 0 {
        return Err(ApiError::NotFound("alert not found".to_string()));
    }

    audit_service::record(state, "INFO", "alerts", &format!("Deleted alert {id}")).await;

    Ok(())
}

/// "above" fires at price >= threshold, "below" at price <= threshold.
pub fn condition_met(condition: &str, price: f64, threshold: f64) -> bool {
    match condition {
        "above" => price >= threshold,
        "below" => price <= threshold,
        _ => false,
    }
}

/// Evaluates one snapshot of active alerts against the prices fetched for
/// this cycle. A symbol absent from `prices` is skipped with no state change;
/// triggered alerts get `last_triggered_at` stamped and are returned.
pub fn evaluate_snapshot(
    snapshot: Vec<Alert>,
    prices: &HashMap<String, f64>,
    now: i64,
) -> Vec<Alert> {
    let mut triggered: Vec<Alert> = Vec::new();

    for mut alert in snapshot {
        let Some(&price) = prices.get(&alert.symbol) else {
            continue;
        };
        if condition_met(&alert.condition, price, alert.threshold_price) {
            alert.last_triggered_at = Some(now);
            triggered.push(alert);
        }
    }

    triggered
}

/// One evaluation pass over a snapshot of the active alerts.
///
/// The live price is fetched once per symbol; a symbol the provider has no
/// price for is skipped this cycle with no state change. Triggered alerts get
/// `last_triggered_at` stamped in one batch write, issued only when something
/// actually fired. An alert deleted mid-pass simply no longer matches the
/// batch filter. Alerts stay active after firing.
pub async fn check_alerts(state: &AppState) -> Result<Vec<Alert>, ApiError> {
    let alerts = state.db.collection::<Alert>("alerts");

    let mut cursor = alerts.find(doc! { "active": true }, None).await?;

    let mut snapshot: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        snapshot.push(res?);
    }

    if snapshot.is_empty() {
        return Ok(Vec::new());
    }

    let symbols: HashSet<String> = snapshot.iter().map(|a| a.symbol.clone()).collect();

    let mut prices: HashMap<String, f64> = HashMap::new();
    for sym in symbols {
        match state.provider.live_price(&sym).await {
            Ok(Some(p)) if p.is_finite() && p > 0.0 => {
                prices.insert(sym, p);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(symbol = %sym, "live price fetch failed: {err}");
            }
        }
    }

    let now = Utc::now().timestamp();
    let triggered = evaluate_snapshot(snapshot, &prices, now);

    if !triggered.is_empty() {
        let ids: Vec<ObjectId> = triggered.iter().map(|a| a.id).collect();
        alerts
            .update_many(
                doc! { "_id": { "$in": ids } },
                doc! { "$set": { "last_triggered_at": now } },
                None,
            )
            .await?;

        for alert in &triggered {
            audit_service::record(
                state,
                "INFO",
                "alerts",
                &format!(
                    "Alert triggered: {} {} {}",
                    alert.symbol, alert.condition, alert.threshold_price
                ),
            )
            .await;
        }
    }

    Ok(triggered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn alert(symbol: &str, condition: &str, threshold: f64) -> Alert {
        Alert {
            id: ObjectId::new(),
            symbol: symbol.to_string(),
            condition: condition.to_string(),
            threshold_price: threshold,
            active: true,
            created_at: 0,
            last_triggered_at: None,
        }
    }

    fn prices(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn triggered_alert_is_stamped_and_returned() {
        let snapshot = vec![alert("AAPL", "above", 100.0)];
        let now = 1_700_000_000;

        let triggered = evaluate_snapshot(snapshot, &prices(&[("AAPL", 150.0)]), now);

        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].symbol, "AAPL");
        assert_eq!(triggered[0].last_triggered_at, Some(now));
        // triggering never deactivates
        assert!(triggered[0].active);
    }

    #[test]
    fn unmet_condition_changes_nothing() {
        let snapshot = vec![alert("AAPL", "above", 100.0)];

        let triggered = evaluate_snapshot(snapshot, &prices(&[("AAPL", 50.0)]), 1);
        assert!(triggered.is_empty());
    }

    #[test]
    fn symbol_without_a_price_is_skipped_this_cycle() {
        let snapshot = vec![
            alert("AAPL", "above", 100.0),
            alert("MSFT", "below", 500.0),
        ];

        // only MSFT could be priced this cycle
        let triggered = evaluate_snapshot(snapshot, &prices(&[("MSFT", 400.0)]), 1);

        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].symbol, "MSFT");
    }

    #[test]
    fn held_condition_retriggers_on_the_next_pass() {
        let mut already = alert("AAPL", "above", 100.0);
        already.last_triggered_at = Some(10);

        let triggered = evaluate_snapshot(vec![already], &prices(&[("AAPL", 150.0)]), 20);

        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].last_triggered_at, Some(20));
    }

    #[test]
    fn above_fires_at_or_over_threshold() {
        assert!(condition_met("above", 150.0, 100.0));
        assert!(condition_met("above", 100.0, 100.0));
        assert!(!condition_met("above", 50.0, 100.0));
    }

    #[test]
    fn below_fires_at_or_under_threshold() {
        assert!(condition_met("below", 50.0, 100.0));
        assert!(condition_met("below", 100.0, 100.0));
        assert!(!condition_met("below", 150.0, 100.0));
    }

    #[test]
    fn unknown_condition_never_fires() {
        assert!(!condition_met("sideways", 100.0, 100.0));
    }
}
