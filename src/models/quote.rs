use chrono::NaiveDate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One OHLCV record for an instrument on a calendar date.
/// Unique per (symbol, date); refetching a date overwrites in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,

    // serialized as "YYYY-MM-DD", so lexicographic range queries sort by day
    pub date: NaiveDate,

    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}
