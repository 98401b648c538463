pub mod advisory;
pub mod aggregation;
pub mod budget;
pub mod catalog;
pub mod market;
pub mod ratings;
pub mod seed;
pub mod validation;

pub use advisory::{run_advisory_feed, Advisory, AdvisoryKind, AdvisorySource, RandomAdvisories};
pub use catalog::{CatalogStore, ListingUpdate, NewListing};
pub use market::{Market, SharedMarket};
pub use ratings::{apply_vote_delta, RatingLedger};
pub use validation::ValidationError;
