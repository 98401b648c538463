//! HTTP surface over the shared market.

pub mod handlers;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::services::SharedMarket;
use crate::storage::Persister;

#[derive(Clone)]
pub struct AppState {
    pub market: SharedMarket,
    pub persister: Persister,
}

impl AppState {
    pub fn new(market: SharedMarket, persister: Persister) -> Self {
        Self { market, persister }
    }
}

pub fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::DuplicateListing { .. } => StatusCode::CONFLICT,
        Error::ListingNotFound { .. }
        | Error::UnknownCrop(_)
        | Error::UnknownVendor(_)
        | Error::NotInBudget(_) => StatusCode::NOT_FOUND,
        Error::InvalidValue(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = error_status(&self);
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/crops", get(handlers::list_crops))
        .route("/crops/:crop_id/listings", post(handlers::add_listing))
        .route(
            "/crops/:crop_id/listings/:vendor_id",
            patch(handlers::update_listing).delete(handlers::remove_listing),
        )
        .route(
            "/crops/:crop_id/listings/:vendor_id/comparison",
            get(handlers::compare_listing),
        )
        .route("/vendors", get(handlers::list_vendors))
        .route("/vendors/:vendor_id/inventory", get(handlers::vendor_inventory))
        .route("/vendors/:vendor_id/ratings", post(handlers::rate_vendor))
        .route("/vendors/:vendor_id/prices/adjust", post(handlers::adjust_prices))
        .route("/analytics/volatility", get(handlers::volatility))
        .route("/analytics/rankings", get(handlers::rankings))
        .route("/analytics/signal", get(handlers::signal))
        .route(
            "/budgets/:caller_id",
            get(handlers::get_budget).delete(handlers::clear_budget),
        )
        .route("/budgets/:caller_id/items", post(handlers::add_budget_item))
        .route(
            "/budgets/:caller_id/items/:crop_id",
            patch(handlers::update_budget_item).delete(handlers::remove_budget_item),
        )
        .route("/budgets/:caller_id/limit", put(handlers::set_budget_limit))
        .with_state(state)
}
