use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};

use super::budget::Basket;
use super::crop::Crop;

/// Everything that must survive a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub crops: Vec<Crop>,
    /// caller id -> vendor id -> star value (0 = no vote)
    #[serde(default)]
    pub votes: BTreeMap<String, BTreeMap<String, u8>>,
    #[serde(default)]
    pub baskets: HashMap<String, Basket>,
    pub saved_at: DateTime<Utc>,
}
