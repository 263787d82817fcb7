use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Append-only audit record of a domain event. Writes are fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub message: String,

    // INFO, WARNING, ERROR
    pub level: String,
    pub source: String,

    pub created_at: i64,
}
