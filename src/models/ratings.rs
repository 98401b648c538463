use serde::{Deserialize, Serialize};

/// A vendor's aggregate score as stored on each of its listings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingAggregate {
    pub rating: f64,
    pub review_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub listings_updated: usize,
    pub rating: f64,
    pub review_count: u32,
    /// Vote now held for the caller; 0 after a retraction.
    pub caller_vote: u8,
}
