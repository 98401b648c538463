use std::collections::BTreeMap;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{RatingAggregate, VoteOutcome};
use crate::services::catalog::CatalogStore;
use crate::services::validation::ValidVote;
use crate::utils::round_to;

const MAX_RATING: f64 = 5.0;

/// Per-caller star votes and the incremental update of vendor aggregates.
///
/// Only each caller's current vote is kept. The vendor aggregate is moved by
/// the delta between a caller's previous and new vote, never refolded from a
/// full vote history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingLedger {
    votes: BTreeMap<String, BTreeMap<String, u8>>,
}

impl RatingLedger {
    pub fn new(votes: BTreeMap<String, BTreeMap<String, u8>>) -> Self {
        Self { votes }
    }

    pub fn votes(&self) -> &BTreeMap<String, BTreeMap<String, u8>> {
        &self.votes
    }

    /// The caller's current vote for the vendor, 0 when none is held.
    pub fn vote_of(&self, caller_id: &str, vendor_id: &str) -> u8 {
        self.votes
            .get(caller_id)
            .and_then(|by_vendor| by_vendor.get(vendor_id))
            .copied()
            .unwrap_or(0)
    }

    /// Applies a vote. Repeating the caller's current value retracts it.
    pub fn cast_vote(
        &mut self,
        catalog: &mut CatalogStore,
        vendor_id: &str,
        vote: &ValidVote,
    ) -> Result<VoteOutcome> {
        let current = catalog
            .vendor_aggregate(vendor_id)
            .ok_or_else(|| Error::UnknownVendor(vendor_id.to_string()))?;

        let prev = self.vote_of(&vote.caller_id, vendor_id);
        let next = if vote.value == prev { 0 } else { vote.value };
        let aggregate = apply_vote_delta(current, prev, next);

        let listings_updated = catalog.set_vendor_aggregate(vendor_id, aggregate);
        self.votes
            .entry(vote.caller_id.clone())
            .or_default()
            .insert(vendor_id.to_string(), next);

        info!(
            caller_id = %vote.caller_id,
            vendor_id = vendor_id,
            previous_vote = prev,
            vote = next,
            rating = aggregate.rating,
            review_count = aggregate.review_count,
            "Vote applied"
        );

        Ok(VoteOutcome {
            listings_updated,
            rating: aggregate.rating,
            review_count: aggregate.review_count,
            caller_vote: next,
        })
    }
}

/// Moves an aggregate from one caller vote to another. `0` means "no vote".
pub fn apply_vote_delta(current: RatingAggregate, prev: u8, next: u8) -> RatingAggregate {
    let mut count = current.review_count;
    let mut total = current.rating * f64::from(current.review_count);
    let (prev_f, next_f) = (f64::from(prev), f64::from(next));

    match (prev, next) {
        (0, 0) => return current,
        (0, _) => {
            count += 1;
            total += next_f;
        }
        (_, 0) => {
            count = count.saturating_sub(1);
            total = (total - prev_f).max(0.0);
        }
        _ => {
            total = total - prev_f + next_f;
        }
    }

    // Reconstructing the total from a rounded average can drift past the
    // star range; the stored rating never leaves it.
    let rating = if count == 0 {
        0.0
    } else {
        round_to(total / f64::from(count), 1).clamp(0.0, MAX_RATING)
    };

    RatingAggregate {
        rating,
        review_count: count,
    }
}
