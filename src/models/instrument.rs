use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A tradable symbol with an identity independent of any single quote.
/// Created lazily the first time a symbol is referenced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub symbol: String,
    pub name: Option<String>,

    // STOCK, FOREX, ...
    pub kind: Option<String>,

    // currency the price is quoted in; stored, never converted
    pub pricing_currency: Option<String>,
}
