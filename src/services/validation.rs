//! Boundary checks applied to raw requests before they reach the market.
//!
//! The store trusts what it is handed; everything user-supplied passes through
//! one of these functions first.

use serde::Deserialize;
use thiserror::Error;

use crate::models::Category;
use crate::services::catalog::{ListingUpdate, NewListing};

pub const MIN_VOTE: i64 = 1;
pub const MAX_VOTE: i64 = 5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("price must be greater than zero, got {0}")]
    NonPositivePrice(f64),

    #[error("stock must be greater than zero, got {0}")]
    NonPositiveStock(f64),

    #[error("vote must be between 1 and 5, got {0}")]
    VoteOutOfRange(i64),

    #[error("percent must be a finite value above -100, got {0}")]
    PercentOutOfRange(f64),

    #[error("quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(f64),

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddListingRequest {
    pub vendor_id: String,
    pub price: f64,
    pub stock: f64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub listing_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListingRequest {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: Option<f64>,
    #[serde(default)]
    pub listing_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub caller_id: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidVote {
    pub caller_id: String,
    pub value: u8,
}

fn positive_price(price: f64) -> Result<f64, ValidationError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(ValidationError::NonPositivePrice(price))
    }
}

fn positive_stock(stock: f64) -> Result<f64, ValidationError> {
    if stock.is_finite() && stock > 0.0 {
        Ok(stock)
    } else {
        Err(ValidationError::NonPositiveStock(stock))
    }
}

fn non_empty(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Blank names mean "keep the canonical crop name".
fn optional_name(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_new_listing(req: AddListingRequest) -> Result<NewListing, ValidationError> {
    Ok(NewListing {
        vendor_id: non_empty(&req.vendor_id, "vendorId")?,
        price: positive_price(req.price)?,
        stock: positive_stock(req.stock)?,
        display_name: optional_name(req.display_name),
        specialty: optional_name(req.specialty),
        listing_name_override: optional_name(req.listing_name),
    })
}

pub fn validate_listing_update(req: UpdateListingRequest) -> Result<ListingUpdate, ValidationError> {
    Ok(ListingUpdate {
        price: req.price.map(positive_price).transpose()?,
        stock: req.stock.map(positive_stock).transpose()?,
        listing_name_override: optional_name(req.listing_name),
    })
}

pub fn validate_vote(req: VoteRequest) -> Result<ValidVote, ValidationError> {
    let caller_id = non_empty(&req.caller_id, "callerId")?;
    if !(MIN_VOTE..=MAX_VOTE).contains(&req.value) {
        return Err(ValidationError::VoteOutOfRange(req.value));
    }
    Ok(ValidVote {
        caller_id,
        value: req.value as u8,
    })
}

/// A cut of 100% or more would zero or negate every price.
pub fn validate_bulk_percent(percent: f64) -> Result<f64, ValidationError> {
    if percent.is_finite() && percent > -100.0 {
        Ok(percent)
    } else {
        Err(ValidationError::PercentOutOfRange(percent))
    }
}

pub fn validate_quantity(quantity: f64) -> Result<f64, ValidationError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(quantity)
    } else {
        Err(ValidationError::NonPositiveQuantity(quantity))
    }
}

/// Blank means "every category".
pub fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ValidationError> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(name) => name
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::UnknownCategory(name.to_string())),
    }
}
