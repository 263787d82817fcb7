//! Background periodic jobs. Each tick opens its own store session via the
//! shared client; nothing is borrowed from an in-flight request. A failed
//! tick is logged and the loop keeps running.

use std::time::Duration;

use tokio::time;

use crate::{
    services::{alerts_service, market_service},
    AppState,
};

/// Evaluates active alerts on a fixed interval.
pub fn spawn_alert_monitor(state: AppState) {
    let every = Duration::from_secs(state.settings.alert_check_interval_secs);

    tokio::spawn(async move {
        let mut interval = time::interval(every);

        loop {
            interval.tick().await;

            match alerts_service::check_alerts(&state).await {
                Ok(triggered) if !triggered.is_empty() => {
                    tracing::info!(count = triggered.len(), "alerts triggered");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!("alert check tick failed: {err}"),
            }
        }
    });
}

/// Re-fetches the last few days for every known instrument so stored series
/// stay current without a request having to pay for the refresh.
pub fn spawn_daily_refresh(state: AppState) {
    let every = Duration::from_secs(state.settings.refresh_interval_secs);
    let lookback = state.settings.refresh_lookback_days;

    tokio::spawn(async move {
        let mut interval = time::interval(every);

        loop {
            interval.tick().await;

            let instruments = match market_service::list_instruments(&state).await {
                Ok(items) => items,
                Err(err) => {
                    tracing::warn!("refresh tick failed to list instruments: {err}");
                    continue;
                }
            };

            for instrument in instruments {
                if let Err(err) =
                    market_service::refresh_recent_history(&state, &instrument.symbol, lookback)
                        .await
                {
                    tracing::warn!(symbol = %instrument.symbol, "refresh failed: {err}");
                }
            }
        }
    });
}
