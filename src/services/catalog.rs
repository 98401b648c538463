use chrono::Utc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Crop, RatingAggregate, VendorListing};
use crate::utils::round_to;

/// Aggregate score given to a vendor the first time it lists anything.
pub const NEW_VENDOR_RATING: RatingAggregate = RatingAggregate {
    rating: 5.0,
    review_count: 1,
};

const DEFAULT_SPECIALTY: &str = "General Produce";

#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub vendor_id: String,
    pub price: f64,
    pub stock: f64,
    pub display_name: Option<String>,
    pub specialty: Option<String>,
    pub listing_name_override: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingUpdate {
    pub price: Option<f64>,
    pub stock: Option<f64>,
    pub listing_name_override: Option<String>,
}

/// Authoritative list of crops and their vendor listings.
///
/// Every mutation checks all of its preconditions before touching a crop, so
/// a failed call leaves the catalog exactly as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStore {
    crops: Vec<Crop>,
}

impl CatalogStore {
    pub fn new(crops: Vec<Crop>) -> Self {
        Self { crops }
    }

    pub fn crops(&self) -> &[Crop] {
        &self.crops
    }

    pub fn into_crops(self) -> Vec<Crop> {
        self.crops
    }

    pub fn crop(&self, crop_id: &str) -> Option<&Crop> {
        self.crops.iter().find(|c| c.id == crop_id)
    }

    fn crop_mut(&mut self, crop_id: &str) -> Result<&mut Crop> {
        self.crops
            .iter_mut()
            .find(|c| c.id == crop_id)
            .ok_or_else(|| Error::UnknownCrop(crop_id.to_string()))
    }

    /// Any listing owned by the vendor; all of them carry the same aggregate.
    pub fn vendor_listing(&self, vendor_id: &str) -> Option<&VendorListing> {
        self.crops.iter().find_map(|c| c.listing(vendor_id))
    }

    pub fn vendor_aggregate(&self, vendor_id: &str) -> Option<RatingAggregate> {
        self.vendor_listing(vendor_id).map(|l| RatingAggregate {
            rating: l.rating,
            review_count: l.review_count,
        })
    }

    /// A vendor new to the market starts at 5.0 from one review; one already
    /// listed elsewhere carries its existing rating and review count over.
    pub fn add_vendor_listing(&mut self, crop_id: &str, new: NewListing) -> Result<VendorListing> {
        let existing = self.vendor_listing(&new.vendor_id).cloned();
        let crop = self.crop_mut(crop_id)?;

        if crop.listing(&new.vendor_id).is_some() {
            return Err(Error::DuplicateListing {
                crop_id: crop_id.to_string(),
                vendor_id: new.vendor_id,
            });
        }

        // A vendor already trading elsewhere keeps its identity and score.
        let (display_name, specialty, aggregate) = match existing {
            Some(other) => (
                new.display_name.unwrap_or(other.display_name),
                new.specialty.unwrap_or(other.specialty),
                RatingAggregate {
                    rating: other.rating,
                    review_count: other.review_count,
                },
            ),
            None => (
                new.display_name.unwrap_or_else(|| new.vendor_id.clone()),
                new.specialty.unwrap_or_else(|| DEFAULT_SPECIALTY.to_string()),
                NEW_VENDOR_RATING,
            ),
        };

        let listing = VendorListing {
            vendor_id: new.vendor_id,
            display_name,
            specialty,
            price: new.price,
            stock: new.stock,
            rating: aggregate.rating,
            review_count: aggregate.review_count,
            is_hot: true,
            listing_name_override: new.listing_name_override,
        };

        crop.vendors.push(listing.clone());
        crop.record_price(listing.price, Utc::now());

        info!(
            crop_id = crop_id,
            vendor_id = %listing.vendor_id,
            price = listing.price,
            stock = listing.stock,
            "Listing added"
        );
        Ok(listing)
    }

    pub fn update_vendor_listing(
        &mut self,
        crop_id: &str,
        vendor_id: &str,
        update: ListingUpdate,
    ) -> Result<VendorListing> {
        let crop = self.crop_mut(crop_id)?;
        let not_found = || Error::ListingNotFound {
            crop_id: crop_id.to_string(),
            vendor_id: vendor_id.to_string(),
        };

        let listing = crop.listing_mut(vendor_id).ok_or_else(not_found)?;
        let price_changed = update.price.is_some_and(|p| p != listing.price);

        if let Some(price) = update.price {
            listing.price = price;
        }
        if let Some(stock) = update.stock {
            listing.stock = stock;
        }
        if update.listing_name_override.is_some() {
            listing.listing_name_override = update.listing_name_override;
        }
        let updated = listing.clone();

        if price_changed {
            crop.record_price(updated.price, Utc::now());
        }

        info!(
            crop_id = crop_id,
            vendor_id = vendor_id,
            price = updated.price,
            stock = updated.stock,
            price_changed = price_changed,
            "Listing updated"
        );
        Ok(updated)
    }

    /// Returns whether a listing was actually removed.
    pub fn remove_vendor_listing(&mut self, crop_id: &str, vendor_id: &str) -> bool {
        let Some(crop) = self.crops.iter_mut().find(|c| c.id == crop_id) else {
            debug!(crop_id = crop_id, "Remove on unknown crop ignored");
            return false;
        };

        let before = crop.vendors.len();
        crop.vendors.retain(|v| v.vendor_id != vendor_id);
        let removed = crop.vendors.len() != before;

        info!(
            crop_id = crop_id,
            vendor_id = vendor_id,
            removed = removed,
            "Listing removed"
        );
        removed
    }

    /// Scales every price of the vendor by `1 + percent/100`, rounded to cents.
    ///
    /// History is left alone: the adjustment changes offers, not the crop's
    /// reference price series.
    pub fn bulk_adjust_prices(&mut self, vendor_id: &str, percent: f64) -> Result<usize> {
        if self.vendor_listing(vendor_id).is_none() {
            return Err(Error::UnknownVendor(vendor_id.to_string()));
        }

        let factor = 1.0 + percent / 100.0;
        let now = Utc::now();
        let mut adjusted = 0;

        for crop in &mut self.crops {
            if let Some(listing) = crop.listing_mut(vendor_id) {
                listing.price = round_to(listing.price * factor, 2);
                crop.last_updated = Some(now);
                adjusted += 1;
            }
        }

        info!(
            vendor_id = vendor_id,
            percent = percent,
            listings = adjusted,
            "Bulk price adjustment applied"
        );
        Ok(adjusted)
    }

    /// Writes one aggregate onto every listing of the vendor.
    pub(crate) fn set_vendor_aggregate(&mut self, vendor_id: &str, aggregate: RatingAggregate) -> usize {
        let mut touched = 0;
        for listing in self
            .crops
            .iter_mut()
            .flat_map(|c| c.vendors.iter_mut())
            .filter(|l| l.vendor_id == vendor_id)
        {
            listing.rating = aggregate.rating;
            listing.review_count = aggregate.review_count;
            touched += 1;
        }
        touched
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Category, Demand, PricePoint};
    use chrono::{TimeZone, Utc};

    pub(crate) fn listing(vendor_id: &str, price: f64, rating: f64, review_count: u32) -> VendorListing {
        VendorListing {
            vendor_id: vendor_id.to_string(),
            display_name: format!("{} stall", vendor_id),
            specialty: "Mixed".to_string(),
            price,
            stock: 10.0,
            rating,
            review_count,
            is_hot: false,
            listing_name_override: None,
        }
    }

    pub(crate) fn crop(id: &str, category: Category, price: f64, vendors: Vec<VendorListing>) -> Crop {
        Crop {
            id: id.to_string(),
            name: id.to_uppercase(),
            category,
            icon: String::new(),
            current_price: price,
            change_24h: 0.0,
            history: vec![PricePoint {
                date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                price,
            }],
            demand: Demand::Medium,
            weight_per_unit: 1.0,
            vendors,
            last_updated: None,
        }
    }

    fn new_listing(vendor_id: &str, price: f64, stock: f64) -> NewListing {
        NewListing {
            vendor_id: vendor_id.to_string(),
            price,
            stock,
            display_name: None,
            specialty: None,
            listing_name_override: None,
        }
    }

    #[test]
    fn add_listing_appends_history_and_defaults_rating() {
        let mut store = CatalogStore::new(vec![crop("onion", Category::Vegetable, 50.0, vec![])]);
        let before = Utc::now();

        let added = store.add_vendor_listing("onion", new_listing("v1", 10.0, 5.0)).unwrap();

        assert_eq!(added.rating, 5.0);
        assert_eq!(added.review_count, 1);
        let onion = store.crop("onion").unwrap();
        assert_eq!(onion.history.len(), 2);
        assert_eq!(onion.history.last().unwrap().price, 10.0);
        assert_eq!(onion.current_price, 10.0);
        assert!(onion.last_updated.unwrap() >= before);
    }

    #[test]
    fn duplicate_listing_is_rejected_and_original_kept() {
        let mut store = CatalogStore::new(vec![crop("onion", Category::Vegetable, 50.0, vec![])]);
        store.add_vendor_listing("onion", new_listing("v1", 10.0, 5.0)).unwrap();
        let snapshot = store.clone();

        let err = store.add_vendor_listing("onion", new_listing("v1", 12.0, 7.0)).unwrap_err();

        assert!(matches!(err, Error::DuplicateListing { .. }));
        assert_eq!(store, snapshot);
        let kept = store.crop("onion").unwrap().listing("v1").unwrap();
        assert_eq!((kept.price, kept.stock), (10.0, 5.0));
    }

    #[test]
    fn add_listing_on_unknown_crop_fails() {
        let mut store = CatalogStore::default();
        let err = store.add_vendor_listing("ghost", new_listing("v1", 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, Error::UnknownCrop(id) if id == "ghost"));
    }

    #[test]
    fn existing_vendor_keeps_its_score_on_a_new_crop() {
        let mut store = CatalogStore::new(vec![
            crop("onion", Category::Vegetable, 50.0, vec![listing("v1", 48.0, 4.2, 30)]),
            crop("garlic", Category::Spice, 90.0, vec![]),
        ]);

        let added = store.add_vendor_listing("garlic", new_listing("v1", 95.0, 3.0)).unwrap();

        assert_eq!(added.rating, 4.2);
        assert_eq!(added.review_count, 30);
        assert_eq!(added.display_name, "v1 stall");
    }

    #[test]
    fn price_update_appends_history_and_moves_current_price() {
        let mut store = CatalogStore::new(vec![crop(
            "onion",
            Category::Vegetable,
            50.0,
            vec![listing("v1", 50.0, 4.0, 2)],
        )]);
        let before = Utc::now();

        store
            .update_vendor_listing(
                "onion",
                "v1",
                ListingUpdate {
                    price: Some(55.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let onion = store.crop("onion").unwrap();
        assert_eq!(onion.current_price, 55.0);
        assert_eq!(onion.history.last().unwrap().price, 55.0);
        assert_eq!(onion.history.len(), 2);
        assert!(onion.last_updated.unwrap() >= before);
        assert!(onion.history.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn stock_only_update_leaves_history_untouched() {
        let mut store = CatalogStore::new(vec![crop(
            "onion",
            Category::Vegetable,
            50.0,
            vec![listing("v1", 50.0, 4.0, 2)],
        )]);

        let updated = store
            .update_vendor_listing(
                "onion",
                "v1",
                ListingUpdate {
                    stock: Some(99.0),
                    listing_name_override: Some("Red Onion".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.stock, 99.0);
        assert_eq!(updated.listing_name_override.as_deref(), Some("Red Onion"));
        let onion = store.crop("onion").unwrap();
        assert_eq!(onion.history.len(), 1);
        assert_eq!(onion.last_updated, None);
    }

    #[test]
    fn update_of_missing_listing_fails() {
        let mut store = CatalogStore::new(vec![crop("onion", Category::Vegetable, 50.0, vec![])]);
        let err = store
            .update_vendor_listing("onion", "v9", ListingUpdate::default())
            .unwrap_err();
        assert!(matches!(err, Error::ListingNotFound { .. }));
    }

    #[test]
    fn history_stays_ordered_when_clock_lags_recorded_points() {
        let mut future = crop("onion", Category::Vegetable, 50.0, vec![listing("v1", 50.0, 4.0, 2)]);
        future.history[0].date = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        let mut store = CatalogStore::new(vec![future]);

        store
            .update_vendor_listing(
                "onion",
                "v1",
                ListingUpdate {
                    price: Some(60.0),
                    ..Default::default()
                },
            )
            .unwrap();

        let onion = store.crop("onion").unwrap();
        assert!(onion.history.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(onion.current_price, 60.0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = CatalogStore::new(vec![crop(
            "onion",
            Category::Vegetable,
            50.0,
            vec![listing("v1", 50.0, 4.0, 2)],
        )]);

        assert!(store.remove_vendor_listing("onion", "v1"));
        assert!(!store.remove_vendor_listing("onion", "v1"));
        assert!(!store.remove_vendor_listing("ghost", "v1"));
        assert!(store.crop("onion").unwrap().vendors.is_empty());
    }

    #[test]
    fn bulk_adjust_scales_every_listing_of_the_vendor() {
        let mut store = CatalogStore::new(vec![
            crop("a", Category::Fruit, 100.0, vec![listing("v1", 100.0, 4.0, 2), listing("v2", 80.0, 4.0, 2)]),
            crop("b", Category::Fruit, 200.0, vec![listing("v1", 200.0, 4.0, 2)]),
        ]);

        let adjusted = store.bulk_adjust_prices("v1", 10.0).unwrap();

        assert_eq!(adjusted, 2);
        assert_eq!(store.crop("a").unwrap().listing("v1").unwrap().price, 110.0);
        assert_eq!(store.crop("b").unwrap().listing("v1").unwrap().price, 220.0);
        assert_eq!(store.crop("a").unwrap().listing("v2").unwrap().price, 80.0);
        assert_eq!(store.crop("a").unwrap().history.len(), 1);
    }

    #[test]
    fn bulk_adjust_rounds_to_cents() {
        let mut store = CatalogStore::new(vec![crop(
            "a",
            Category::Fruit,
            9.99,
            vec![listing("v1", 9.99, 4.0, 2)],
        )]);

        store.bulk_adjust_prices("v1", 7.5).unwrap();

        assert_eq!(store.crop("a").unwrap().listing("v1").unwrap().price, 10.74);
    }

    #[test]
    fn bulk_adjust_for_unknown_vendor_fails() {
        let mut store = CatalogStore::new(vec![crop("a", Category::Fruit, 1.0, vec![])]);
        assert!(matches!(
            store.bulk_adjust_prices("nobody", 5.0),
            Err(Error::UnknownVendor(_))
        ));
    }
}
