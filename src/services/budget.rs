use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Basket, BudgetListItem, BudgetStats, Crop, QuantityUnit};
use crate::services::validation::{validate_quantity, ValidationError};
use crate::utils::round_to;

fn find_crop<'a>(crops: &'a [Crop], crop_id: &str) -> Result<&'a Crop> {
    crops
        .iter()
        .find(|c| c.id == crop_id)
        .ok_or_else(|| Error::UnknownCrop(crop_id.to_string()))
}

impl Basket {
    pub fn item(&self, crop_id: &str) -> Option<&BudgetListItem> {
        self.items.iter().find(|i| i.crop_id == crop_id)
    }

    fn item_mut(&mut self, crop_id: &str) -> Result<&mut BudgetListItem> {
        self.items
            .iter_mut()
            .find(|i| i.crop_id == crop_id)
            .ok_or_else(|| Error::NotInBudget(crop_id.to_string()))
    }

    /// Adds one purchasing unit, or one more of whatever unit the line
    /// already uses.
    pub fn add(&mut self, crops: &[Crop], crop_id: &str) -> Result<&BudgetListItem> {
        find_crop(crops, crop_id)?;

        let index = match self.items.iter().position(|i| i.crop_id == crop_id) {
            Some(index) => {
                self.items[index].quantity += 1.0;
                index
            }
            None => {
                self.items.push(BudgetListItem {
                    crop_id: crop_id.to_string(),
                    quantity: 1.0,
                    unit: QuantityUnit::Units,
                });
                self.items.len() - 1
            }
        };

        debug!(crop_id = crop_id, quantity = self.items[index].quantity, "Budget item added");
        Ok(&self.items[index])
    }

    pub fn remove(&mut self, crop_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.crop_id != crop_id);
        self.items.len() != before
    }

    /// Unit counts are whole and never drop below one; kilograms only need
    /// to be positive.
    pub fn set_quantity(&mut self, crop_id: &str, quantity: f64) -> Result<&BudgetListItem> {
        let item = self.item_mut(crop_id)?;
        item.quantity = match item.unit {
            QuantityUnit::Units if quantity.is_finite() => quantity.round().max(1.0),
            QuantityUnit::Units => return Err(ValidationError::NonPositiveQuantity(quantity).into()),
            QuantityUnit::Kilograms => validate_quantity(quantity)?,
        };
        Ok(&*item)
    }

    pub fn convert_unit(&mut self, crops: &[Crop], crop_id: &str, unit: QuantityUnit) -> Result<&BudgetListItem> {
        let weight_per_unit = find_crop(crops, crop_id)?.weight_per_unit;
        let item = self.item_mut(crop_id)?;

        item.quantity = match (item.unit, unit) {
            (QuantityUnit::Units, QuantityUnit::Kilograms) => round_to(item.quantity * weight_per_unit, 3),
            (QuantityUnit::Kilograms, QuantityUnit::Units) => (item.quantity / weight_per_unit).round().max(1.0),
            _ => item.quantity,
        };
        item.unit = unit;
        Ok(&*item)
    }

    /// Lines whose crop has left the catalog are skipped.
    pub fn stats(&self, crops: &[Crop]) -> BudgetStats {
        let mut total_cost = 0.0;
        let mut total_weight = 0.0;
        for item in &self.items {
            if let Some(crop) = crops.iter().find(|c| c.id == item.crop_id) {
                let weight = item.weight_kg(crop.weight_per_unit);
                total_weight += weight;
                total_cost += weight * crop.current_price;
            }
        }

        let utilization_pct = if self.limit > 0.0 {
            round_to(total_cost / self.limit * 100.0, 0)
        } else {
            0.0
        };

        BudgetStats {
            total_cost: round_to(total_cost, 2),
            total_weight: round_to(total_weight, 2),
            limit: self.limit,
            utilization_pct,
            over_budget: total_cost > self.limit,
        }
    }
}
