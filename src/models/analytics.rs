use serde::{Deserialize, Serialize};

/// Calendar-month aggregate of every price point recorded that month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityBucket {
    /// Display label such as "Jan 2024".
    pub period: String,
    pub year: i32,
    pub month: u32,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub change_pct: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceComparison {
    pub my_price: f64,
    pub market_avg: f64,
    pub diff_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSignal {
    pub avg_change: f64,
    pub sentiment: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorInventory {
    pub vendor_id: String,
    pub crop_ids: Vec<String>,
    pub total_stock: f64,
}

/// Compact per-crop line used by rankings and the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropQuote {
    pub id: String,
    pub name: String,
    pub current_price: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
}

impl From<&crate::models::Crop> for CropQuote {
    fn from(crop: &crate::models::Crop) -> Self {
        Self {
            id: crop.id.clone(),
            name: crop.name.clone(),
            current_price: crop.current_price,
            change_24h: crop.change_24h,
        }
    }
}
