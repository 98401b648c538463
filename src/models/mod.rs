mod analytics;
mod budget;
mod crop;
mod ratings;
mod snapshot;
mod vendor;

pub use analytics::{CropQuote, MarketSignal, PriceComparison, Sentiment, VendorInventory, VolatilityBucket};
pub use budget::{Basket, BudgetListItem, BudgetStats, QuantityUnit};
pub use crop::{Category, Crop, Demand, PricePoint};
pub use ratings::{RatingAggregate, VoteOutcome};
pub use snapshot::MarketSnapshot;
pub use vendor::{CropRef, VendorListing, VendorProfile, VendorRegistration};
