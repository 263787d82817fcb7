use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A standing threshold condition on an instrument's live price.
///
/// Triggering never deactivates an alert: while the condition holds it fires
/// again on every evaluation cycle. Only `toggle` flips `active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,

    // "above" | "below"
    pub condition: String,
    pub threshold_price: f64,

    pub active: bool,

    pub created_at: i64,
    pub last_triggered_at: Option<i64>,
}
