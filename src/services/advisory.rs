use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::models::Crop;
use crate::services::aggregation::ticker_line;
use crate::services::market::SharedMarket;
use crate::utils::sleep_with_jitter;

const MOVE_THRESHOLD_PCT: f64 = 5.0;
const LOW_STOCK: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdvisoryKind {
    PriceSpike,
    PriceDrop,
    LowStock,
    Steady,
}

/// A market notice. Purely informational; nothing in the market reacts to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub crop_id: String,
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

/// Anything that can produce a stream of advisories for the market.
///
/// `None` ends the feed.
#[async_trait]
pub trait AdvisorySource: Send {
    async fn next_advisory(&mut self, market: &SharedMarket) -> Option<Advisory>;
}

/// Classifies a crop from its 24h move and total stock.
pub fn advisory_for(crop: &Crop, issued_at: DateTime<Utc>) -> Advisory {
    let total_stock: f64 = crop.vendors.iter().map(|l| l.stock).sum();

    let kind = if crop.change_24h >= MOVE_THRESHOLD_PCT {
        AdvisoryKind::PriceSpike
    } else if crop.change_24h <= -MOVE_THRESHOLD_PCT {
        AdvisoryKind::PriceDrop
    } else if total_stock < LOW_STOCK {
        AdvisoryKind::LowStock
    } else {
        AdvisoryKind::Steady
    };

    let message = match kind {
        AdvisoryKind::PriceSpike => format!("Price spike: {}", ticker_line(crop)),
        AdvisoryKind::PriceDrop => format!("Price drop: {}", ticker_line(crop)),
        AdvisoryKind::LowStock => format!("Low stock: {} has {} left across vendors", crop.name, total_stock),
        AdvisoryKind::Steady => format!("Steady: {}", ticker_line(crop)),
    };

    Advisory {
        kind,
        crop_id: crop.id.clone(),
        message,
        issued_at,
    }
}

/// Picks a random crop and describes it.
pub fn pick_advisory<R: Rng>(crops: &[Crop], rng: &mut R) -> Option<Advisory> {
    if crops.is_empty() {
        return None;
    }
    let crop = &crops[rng.random_range(0..crops.len())];
    Some(advisory_for(crop, Utc::now()))
}

/// Emits one advisory about a random crop every `interval_ms`, plus up to
/// `jitter_ms` of random delay.
#[derive(Debug, Clone)]
pub struct RandomAdvisories {
    interval_ms: u64,
    jitter_ms: u64,
}

impl RandomAdvisories {
    pub fn new(interval_ms: u64, jitter_ms: u64) -> Self {
        Self { interval_ms, jitter_ms }
    }
}

#[async_trait]
impl AdvisorySource for RandomAdvisories {
    async fn next_advisory(&mut self, market: &SharedMarket) -> Option<Advisory> {
        sleep_with_jitter(self.interval_ms, self.jitter_ms).await;
        let market = market.lock().await;
        pick_advisory(market.crops(), &mut rand::rng())
    }
}

/// Logs advisories until the source runs dry. Returns how many were emitted.
pub async fn run_advisory_feed<S: AdvisorySource>(mut source: S, market: SharedMarket) -> usize {
    let mut emitted = 0;
    while let Some(advisory) = source.next_advisory(&market).await {
        info!(
            kind = ?advisory.kind,
            crop_id = %advisory.crop_id,
            message = %advisory.message,
            "Market advisory"
        );
        emitted += 1;
    }
    debug!(emitted = emitted, "Advisory feed stopped");
    emitted
}
