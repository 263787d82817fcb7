use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{error::ApiError, models::LogEntry, AppState};

/// Fire-and-forget audit write: a failed insert is logged and swallowed so
/// the calling operation never fails because of its audit trail.
pub async fn record(state: &AppState, level: &str, source: &str, message: &str) {
    let logs = state.db.collection::<LogEntry>("logs");

    let entry = LogEntry {
        id: ObjectId::new(),
        message: message.to_string(),
        level: level.trim().to_uppercase(),
        source: source.to_string(),
        created_at: Utc::now().timestamp(),
    };

    if let Err(err) = logs.insert_one(&entry, None).await {
        tracing::warn!("audit log write failed: {err}");
    }
}

/// Newest-first audit entries, optionally filtered by level and source.
pub async fn list_logs(
    state: &AppState,
    level: Option<String>,
    source: Option<String>,
    limit: i64,
) -> Result<Vec<LogEntry>, ApiError> {
    let logs = state.db.collection::<LogEntry>("logs");

    let mut filter = doc! {};
    if let Some(level) = level {
        filter.insert("level", level.trim().to_uppercase());
    }
    if let Some(source) = source {
        filter.insert("source", source);
    }

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .limit(limit)
        .build();

    let mut cursor = logs.find(filter, find_opts).await?;

    let mut items: Vec<LogEntry> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res?);
    }
    Ok(items)
}
