use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::AppState;
use crate::error::{Error, Result};
use crate::models::{
    Basket, BudgetStats, Crop, CropQuote, MarketSignal, PriceComparison, QuantityUnit, VendorInventory,
    VendorListing, VendorProfile, VolatilityBucket,
};
use crate::services::aggregation::{self, ShopFilter};
use crate::services::market::Market;
use crate::services::validation::{
    parse_category, validate_listing_update, validate_new_listing, validate_vote, AddListingRequest,
    UpdateListingRequest, VoteRequest,
};

const DEFAULT_RANKING_SIZE: usize = 5;

fn publish(state: &AppState, market: &Market) {
    state.persister.publish(market.snapshot());
}

#[derive(Debug, Default, Deserialize)]
pub struct CropQuery {
    #[serde(default)]
    pub search: String,
    pub category: Option<String>,
}

pub async fn list_crops(State(state): State<AppState>, Query(query): Query<CropQuery>) -> Result<Json<Vec<Crop>>> {
    let category = parse_category(query.category.as_deref())?;
    let market = state.market.lock().await;
    let crops = aggregation::filter_crops(market.crops(), &query.search, category)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(crops))
}

pub async fn add_listing(
    State(state): State<AppState>,
    Path(crop_id): Path<String>,
    Json(req): Json<AddListingRequest>,
) -> Result<(StatusCode, Json<VendorListing>)> {
    let new = validate_new_listing(req)?;
    let mut market = state.market.lock().await;
    let listing = market.add_vendor_listing(&crop_id, new)?;
    publish(&state, &market);
    Ok((StatusCode::CREATED, Json(listing)))
}

pub async fn update_listing(
    State(state): State<AppState>,
    Path((crop_id, vendor_id)): Path<(String, String)>,
    Json(req): Json<UpdateListingRequest>,
) -> Result<Json<VendorListing>> {
    let update = validate_listing_update(req)?;
    let mut market = state.market.lock().await;
    let listing = market.update_vendor_listing(&crop_id, &vendor_id, update)?;
    publish(&state, &market);
    Ok(Json(listing))
}

pub async fn remove_listing(
    State(state): State<AppState>,
    Path((crop_id, vendor_id)): Path<(String, String)>,
) -> StatusCode {
    let mut market = state.market.lock().await;
    if market.remove_vendor_listing(&crop_id, &vendor_id) {
        publish(&state, &market);
    }
    StatusCode::NO_CONTENT
}

pub async fn compare_listing(
    State(state): State<AppState>,
    Path((crop_id, vendor_id)): Path<(String, String)>,
) -> Result<Json<PriceComparison>> {
    let market = state.market.lock().await;
    let crop = market
        .catalog()
        .crop(&crop_id)
        .ok_or_else(|| Error::UnknownCrop(crop_id.clone()))?;
    aggregation::price_comparison(crop, &vendor_id)
        .map(Json)
        .ok_or(Error::ListingNotFound { crop_id, vendor_id })
}

#[derive(Debug, Default, Deserialize)]
pub struct VendorQuery {
    #[serde(default)]
    pub shop: ShopFilter,
    pub exclude: Option<String>,
}

pub async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorQuery>,
) -> Json<Vec<VendorProfile>> {
    let market = state.market.lock().await;
    let roster = aggregation::vendor_roster(market.crops());
    let filtered = aggregation::filter_roster(&roster, query.shop, query.exclude.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Json(filtered)
}

pub async fn vendor_inventory(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
) -> Json<VendorInventory> {
    let market = state.market.lock().await;
    Json(aggregation::vendor_inventory(market.crops(), &vendor_id))
}

pub async fn rate_vendor(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>> {
    let vote = validate_vote(req)?;
    let mut market = state.market.lock().await;
    let outcome = market.cast_vote(&vendor_id, &vote)?;
    publish(&state, &market);
    Ok(Json(json!({
        "rating": outcome.rating,
        "reviewCount": outcome.review_count,
        "callerVote": outcome.caller_vote,
    })))
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub percent: f64,
}

pub async fn adjust_prices(
    State(state): State<AppState>,
    Path(vendor_id): Path<String>,
    Json(req): Json<AdjustRequest>,
) -> Result<Json<Value>> {
    let mut market = state.market.lock().await;
    let updated = market.bulk_adjust_prices(&vendor_id, req.percent)?;
    publish(&state, &market);
    Ok(Json(json!({ "updated": updated })))
}

#[derive(Debug, Default, Deserialize)]
pub struct VolatilityQuery {
    pub period: Option<String>,
}

/// All monthly buckets, or just the one matching `period` ("Jan 2024").
pub async fn volatility(
    State(state): State<AppState>,
    Query(query): Query<VolatilityQuery>,
) -> Json<Vec<VolatilityBucket>> {
    let market = state.market.lock().await;
    let buckets = aggregation::monthly_volatility(market.crops());
    match query.period {
        Some(period) => Json(
            aggregation::volatility_for_period(&buckets, &period)
                .into_iter()
                .cloned()
                .collect(),
        ),
        None => Json(buckets),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    #[default]
    Expensive,
    Cheap,
    Movers,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankingQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub kind: RankingKind,
    pub n: Option<usize>,
}

pub async fn rankings(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<CropQuote>>> {
    let category = parse_category(query.category.as_deref())?;
    let n = query.n.unwrap_or(DEFAULT_RANKING_SIZE);
    let in_category = |c: &Crop| category.is_none_or(|cat| c.category == cat);

    let market = state.market.lock().await;
    let crops = market.crops();
    let ranked: Vec<&Crop> = match query.kind {
        RankingKind::Expensive => aggregation::extremes_by_category(crops, in_category, n).most_expensive,
        RankingKind::Cheap => aggregation::extremes_by_category(crops, in_category, n).cheapest,
        RankingKind::Movers => aggregation::top_movers(crops, crops.len())
            .into_iter()
            .filter(|c| in_category(*c))
            .take(n)
            .collect(),
    };

    Ok(Json(ranked.into_iter().map(CropQuote::from).collect()))
}

pub async fn signal(State(state): State<AppState>) -> Json<Option<MarketSignal>> {
    let market = state.market.lock().await;
    Json(aggregation::market_signal(market.crops()))
}

#[derive(Debug, Serialize)]
pub struct BudgetView {
    pub basket: Basket,
    pub stats: BudgetStats,
}

fn budget_view(market: &Market, caller_id: &str) -> BudgetView {
    let basket = market
        .basket(caller_id)
        .cloned()
        .unwrap_or_else(|| Basket::new(market.default_budget_limit()));
    BudgetView {
        stats: market.budget_stats(caller_id),
        basket,
    }
}

pub async fn get_budget(State(state): State<AppState>, Path(caller_id): Path<String>) -> Json<BudgetView> {
    let market = state.market.lock().await;
    Json(budget_view(&market, &caller_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBudgetItemRequest {
    pub crop_id: String,
}

pub async fn add_budget_item(
    State(state): State<AppState>,
    Path(caller_id): Path<String>,
    Json(req): Json<AddBudgetItemRequest>,
) -> Result<Json<BudgetView>> {
    let mut market = state.market.lock().await;
    market.add_to_budget(&caller_id, &req.crop_id)?;
    publish(&state, &market);
    Ok(Json(budget_view(&market, &caller_id)))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBudgetItemRequest {
    pub quantity: Option<f64>,
    pub unit: Option<QuantityUnit>,
}

/// A unit change is applied before a new quantity, so the quantity is read in
/// the new unit. Either both apply or neither does.
pub async fn update_budget_item(
    State(state): State<AppState>,
    Path((caller_id, crop_id)): Path<(String, String)>,
    Json(req): Json<UpdateBudgetItemRequest>,
) -> Result<Json<BudgetView>> {
    let mut market = state.market.lock().await;
    market.update_budget_item(&caller_id, &crop_id, req.unit, req.quantity)?;
    publish(&state, &market);
    Ok(Json(budget_view(&market, &caller_id)))
}

pub async fn remove_budget_item(
    State(state): State<AppState>,
    Path((caller_id, crop_id)): Path<(String, String)>,
) -> StatusCode {
    let mut market = state.market.lock().await;
    if market.remove_from_budget(&caller_id, &crop_id) {
        publish(&state, &market);
    }
    StatusCode::NO_CONTENT
}

#[derive(Debug, Deserialize)]
pub struct BudgetLimitRequest {
    pub limit: f64,
}

pub async fn set_budget_limit(
    State(state): State<AppState>,
    Path(caller_id): Path<String>,
    Json(req): Json<BudgetLimitRequest>,
) -> Result<Json<BudgetView>> {
    let mut market = state.market.lock().await;
    market.set_budget_limit(&caller_id, req.limit)?;
    publish(&state, &market);
    Ok(Json(budget_view(&market, &caller_id)))
}

pub async fn clear_budget(State(state): State<AppState>, Path(caller_id): Path<String>) -> StatusCode {
    let mut market = state.market.lock().await;
    if market.clear_budget(&caller_id) {
        publish(&state, &market);
    }
    StatusCode::NO_CONTENT
}
