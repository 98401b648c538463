use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use super::vendor::VendorListing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vegetable,
    Fruit,
    Spice,
    Root,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Vegetable,
        Category::Fruit,
        Category::Spice,
        Category::Root,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetable => "Vegetable",
            Category::Fruit => "Fruit",
            Category::Spice => "Spice",
            Category::Root => "Root",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Demand {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
}

/// A tradable produce item with one canonical price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub icon: String,
    pub current_price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    pub history: Vec<PricePoint>,
    pub demand: Demand,
    pub weight_per_unit: f64,
    pub vendors: Vec<VendorListing>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Crop {
    pub fn listing(&self, vendor_id: &str) -> Option<&VendorListing> {
        self.vendors.iter().find(|v| v.vendor_id == vendor_id)
    }

    pub fn listing_mut(&mut self, vendor_id: &str) -> Option<&mut VendorListing> {
        self.vendors.iter_mut().find(|v| v.vendor_id == vendor_id)
    }

    pub fn is_fruit(&self) -> bool {
        self.category == Category::Fruit
    }

    /// Appends a price point and makes it the current price.
    ///
    /// The point is never dated before the previous one, so the series stays
    /// ordered even when the wall clock lags behind recorded history.
    pub fn record_price(&mut self, price: f64, at: DateTime<Utc>) {
        let date = match self.history.last() {
            Some(last) if last.date > at => last.date,
            _ => at,
        };
        self.history.push(PricePoint { date, price });
        self.current_price = price;
        self.last_updated = Some(at);
    }
}
