use chrono::NaiveDate;

use crate::{error::ApiError, services::market_service, AppState};

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Renders a symbol's stored history as CSV. When both bounds are given the
/// range is refreshed from the provider first, so the export matches what
/// `GET history` would return.
pub async fn export_history_to_csv(
    state: &AppState,
    symbol: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<String, ApiError> {
    if let (Some(start), Some(end)) = (start, end) {
        market_service::fetch_and_store_history(state, symbol, start, end).await?;
    }

    let quotes = market_service::get_history_from_db(state, symbol, start, end).await?;

    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["date", "open", "high", "low", "close", "volume"])
        .map_err(|e| ApiError::Internal(format!("csv write failed: {e}")))?;

    for q in &quotes {
        writer
            .write_record([
                q.date.to_string(),
                cell(q.open),
                cell(q.high),
                cell(q.low),
                q.close.to_string(),
                cell(q.volume),
            ])
            .map_err(|e| ApiError::Internal(format!("csv write failed: {e}")))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("csv flush failed: {e}")))?;

    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("csv encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::cell;

    #[test]
    fn nulls_become_empty_cells() {
        assert_eq!(cell(None), "");
        assert_eq!(cell(Some(12.5)), "12.5");
    }
}
