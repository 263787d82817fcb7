use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Unique per (portfolio_id, symbol); repeated buys merge into one record
/// using weighted-average cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub portfolio_id: ObjectId,
    pub symbol: String,

    pub quantity: f64,
    pub avg_open_price: f64,

    pub opened_at: i64,
    pub updated_at: i64,
}
