use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityUnit {
    /// Count of purchasing units (one onion, one melon).
    Units,
    Kilograms,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetListItem {
    pub crop_id: String,
    pub quantity: f64,
    pub unit: QuantityUnit,
}

impl BudgetListItem {
    pub fn weight_kg(&self, weight_per_unit: f64) -> f64 {
        match self.unit {
            QuantityUnit::Units => self.quantity * weight_per_unit,
            QuantityUnit::Kilograms => self.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStats {
    pub total_cost: f64,
    pub total_weight: f64,
    pub limit: f64,
    pub utilization_pct: f64,
    pub over_budget: bool,
}

/// A caller's working basket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basket {
    pub items: Vec<BudgetListItem>,
    pub limit: f64,
}

impl Basket {
    pub fn new(limit: f64) -> Self {
        Self {
            items: Vec::new(),
            limit,
        }
    }
}
