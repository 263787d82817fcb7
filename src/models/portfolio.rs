use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A named bag of positions. `key` is supplied by the caller (identity is an
/// external collaborator), so there is no user table here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub key: String,
    pub name: String,
    pub base_currency: Option<String>,
}
