use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::models::{Basket, BudgetStats, Crop, MarketSnapshot, QuantityUnit, VendorListing, VoteOutcome};
use crate::services::catalog::{CatalogStore, ListingUpdate, NewListing};
use crate::services::ratings::RatingLedger;
use crate::services::validation::{validate_bulk_percent, validate_quantity, ValidVote};

/// One market shared by the HTTP handlers and background tasks.
pub type SharedMarket = Arc<Mutex<Market>>;

/// The whole mutable market state: catalog, caller votes and baskets.
///
/// Callers that share one `Market` across tasks must serialize access to it
/// (the service keeps it behind a single mutex), since a vote reads, computes
/// and writes the vendor aggregate in one step.
#[derive(Debug, Clone)]
pub struct Market {
    catalog: CatalogStore,
    ratings: RatingLedger,
    baskets: HashMap<String, Basket>,
    default_budget_limit: f64,
}

impl Market {
    pub fn new(crops: Vec<Crop>, default_budget_limit: f64) -> Self {
        Self {
            catalog: CatalogStore::new(crops),
            ratings: RatingLedger::default(),
            baskets: HashMap::new(),
            default_budget_limit,
        }
    }

    pub fn from_snapshot(snapshot: MarketSnapshot, default_budget_limit: f64) -> Self {
        Self {
            catalog: CatalogStore::new(snapshot.crops),
            ratings: RatingLedger::new(snapshot.votes),
            baskets: snapshot.baskets,
            default_budget_limit,
        }
    }

    pub fn snapshot(&self) -> MarketSnapshot {
        MarketSnapshot {
            crops: self.catalog.crops().to_vec(),
            votes: self.ratings.votes().clone(),
            baskets: self.baskets.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn crops(&self) -> &[Crop] {
        self.catalog.crops()
    }

    pub fn ratings(&self) -> &RatingLedger {
        &self.ratings
    }

    pub fn into_shared(self) -> SharedMarket {
        Arc::new(Mutex::new(self))
    }

    pub fn add_vendor_listing(&mut self, crop_id: &str, new: NewListing) -> Result<VendorListing> {
        self.catalog.add_vendor_listing(crop_id, new)
    }

    pub fn update_vendor_listing(
        &mut self,
        crop_id: &str,
        vendor_id: &str,
        update: ListingUpdate,
    ) -> Result<VendorListing> {
        self.catalog.update_vendor_listing(crop_id, vendor_id, update)
    }

    pub fn remove_vendor_listing(&mut self, crop_id: &str, vendor_id: &str) -> bool {
        self.catalog.remove_vendor_listing(crop_id, vendor_id)
    }

    pub fn bulk_adjust_prices(&mut self, vendor_id: &str, percent: f64) -> Result<usize> {
        let percent = validate_bulk_percent(percent)?;
        self.catalog.bulk_adjust_prices(vendor_id, percent)
    }

    pub fn cast_vote(&mut self, vendor_id: &str, vote: &ValidVote) -> Result<VoteOutcome> {
        self.ratings.cast_vote(&mut self.catalog, vendor_id, vote)
    }

    pub fn default_budget_limit(&self) -> f64 {
        self.default_budget_limit
    }

    pub fn basket(&self, caller_id: &str) -> Option<&Basket> {
        self.baskets.get(caller_id)
    }

    fn basket_mut(&mut self, caller_id: &str) -> &mut Basket {
        let limit = self.default_budget_limit;
        self.baskets
            .entry(caller_id.to_string())
            .or_insert_with(|| Basket::new(limit))
    }

    pub fn add_to_budget(&mut self, caller_id: &str, crop_id: &str) -> Result<Basket> {
        if self.catalog.crop(crop_id).is_none() {
            return Err(Error::UnknownCrop(crop_id.to_string()));
        }
        let limit = self.default_budget_limit;
        let Market { catalog, baskets, .. } = self;
        let basket = baskets
            .entry(caller_id.to_string())
            .or_insert_with(|| Basket::new(limit));
        basket.add(catalog.crops(), crop_id)?;
        Ok(basket.clone())
    }

    pub fn remove_from_budget(&mut self, caller_id: &str, crop_id: &str) -> bool {
        self.baskets
            .get_mut(caller_id)
            .is_some_and(|b| b.remove(crop_id))
    }

    pub fn set_budget_quantity(&mut self, caller_id: &str, crop_id: &str, quantity: f64) -> Result<Basket> {
        self.update_budget_item(caller_id, crop_id, None, Some(quantity))
    }

    pub fn convert_budget_unit(&mut self, caller_id: &str, crop_id: &str, unit: QuantityUnit) -> Result<Basket> {
        self.update_budget_item(caller_id, crop_id, Some(unit), None)
    }

    /// Converts the line to `unit`, then sets `quantity` in that unit. The
    /// basket is left untouched unless every step succeeds.
    pub fn update_budget_item(
        &mut self,
        caller_id: &str,
        crop_id: &str,
        unit: Option<QuantityUnit>,
        quantity: Option<f64>,
    ) -> Result<Basket> {
        let Market { catalog, baskets, .. } = self;
        let basket = baskets
            .get_mut(caller_id)
            .filter(|b| b.item(crop_id).is_some())
            .ok_or_else(|| Error::NotInBudget(crop_id.to_string()))?;

        let mut draft = basket.clone();
        if let Some(unit) = unit {
            draft.convert_unit(catalog.crops(), crop_id, unit)?;
        }
        if let Some(quantity) = quantity {
            draft.set_quantity(crop_id, quantity)?;
        }

        *basket = draft;
        Ok(basket.clone())
    }

    pub fn set_budget_limit(&mut self, caller_id: &str, limit: f64) -> Result<Basket> {
        let limit = validate_quantity(limit)?;
        let basket = self.basket_mut(caller_id);
        basket.limit = limit;
        Ok(basket.clone())
    }

    /// Stats for the caller's basket; an unknown caller has an empty one.
    pub fn budget_stats(&self, caller_id: &str) -> BudgetStats {
        match self.baskets.get(caller_id) {
            Some(basket) => basket.stats(self.catalog.crops()),
            None => Basket::new(self.default_budget_limit).stats(self.catalog.crops()),
        }
    }

    /// Empties the caller's basket, as on logout. Votes are kept.
    pub fn clear_budget(&mut self, caller_id: &str) -> bool {
        self.baskets.remove(caller_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::services::catalog::tests::{crop, listing};

    fn market() -> Market {
        Market::new(
            vec![
                crop("onion", Category::Vegetable, 50.0, vec![listing("v1", 50.0, 4.0, 1)]),
                crop("melon", Category::Fruit, 45.0, vec![]),
            ],
            1000.0,
        )
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut m = market();
        m.cast_vote(
            "v1",
            &ValidVote {
                caller_id: "alice".to_string(),
                value: 4,
            },
        )
        .unwrap();
        m.add_to_budget("alice", "melon").unwrap();

        let json = serde_json::to_string(&m.snapshot()).unwrap();
        let restored = Market::from_snapshot(serde_json::from_str(&json).unwrap(), 1000.0);

        assert_eq!(restored.crops(), m.crops());
        assert_eq!(restored.ratings().vote_of("alice", "v1"), 4);
        assert_eq!(restored.basket("alice"), m.basket("alice"));
    }

    #[test]
    fn bulk_adjust_validates_percent_first() {
        let mut m = market();
        assert!(matches!(m.bulk_adjust_prices("v1", -100.0), Err(Error::InvalidValue(_))));
        assert_eq!(m.crops()[0].vendors[0].price, 50.0);
    }

    #[test]
    fn budget_flow_for_a_caller() {
        let mut m = market();
        m.add_to_budget("bob", "onion").unwrap();
        m.convert_budget_unit("bob", "onion", QuantityUnit::Kilograms).unwrap();
        let basket = m.set_budget_quantity("bob", "onion", 2.0).unwrap();
        assert_eq!(basket.items[0].quantity, 2.0);

        let stats = m.budget_stats("bob");
        assert_eq!(stats.total_cost, 100.0);
        assert_eq!(m.budget_stats("nobody").total_cost, 0.0);

        assert!(m.remove_from_budget("bob", "onion"));
        assert!(!m.remove_from_budget("nobody", "onion"));
    }

    #[test]
    fn clearing_a_budget_keeps_votes() {
        let mut m = market();
        let vote = ValidVote {
            caller_id: "alice".to_string(),
            value: 2,
        };
        m.cast_vote("v1", &vote).unwrap();
        m.add_to_budget("alice", "onion").unwrap();

        assert!(m.clear_budget("alice"));

        assert!(m.basket("alice").is_none());
        assert_eq!(m.ratings().vote_of("alice", "v1"), 2);
        assert_eq!(m.crops()[0].vendors[0].review_count, 2);
    }

    #[test]
    fn rejected_quantity_keeps_the_old_unit() {
        let mut m = market();
        m.add_to_budget("alice", "onion").unwrap();

        let result = m.update_budget_item("alice", "onion", Some(QuantityUnit::Kilograms), Some(0.0));

        assert!(matches!(result, Err(Error::InvalidValue(_))));
        let item = m.basket("alice").unwrap().item("onion").unwrap();
        assert_eq!((item.unit, item.quantity), (QuantityUnit::Units, 1.0));
    }

    #[test]
    fn missing_basket_line_is_reported_as_such() {
        let mut m = market();
        assert!(matches!(
            m.set_budget_quantity("nobody", "onion", 2.0),
            Err(Error::NotInBudget(id)) if id == "onion"
        ));

        m.add_to_budget("alice", "melon").unwrap();
        assert!(matches!(
            m.convert_budget_unit("alice", "onion", QuantityUnit::Kilograms),
            Err(Error::NotInBudget(_))
        ));
    }

    #[test]
    fn adding_an_unknown_crop_creates_no_basket() {
        let mut m = market();
        assert!(matches!(m.add_to_budget("carol", "ghost"), Err(Error::UnknownCrop(_))));
        assert!(m.basket("carol").is_none());
    }
}
