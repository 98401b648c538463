use thiserror::Error;
use aws_sdk_s3::primitives::ByteStreamError;
use parquet::errors::ParquetError;
use arrow::error::ArrowError;
use crate::services::validation::ValidationError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Vendor {vendor_id} already lists crop {crop_id}")]
    DuplicateListing { crop_id: String, vendor_id: String },

    #[error("Vendor {vendor_id} has no listing on crop {crop_id}")]
    ListingNotFound { crop_id: String, vendor_id: String },

    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ValidationError),

    #[error("Unknown vendor: {0}")]
    UnknownVendor(String),

    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    #[error("Crop {0} is not in the budget")]
    NotInBudget(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("ByteStream error: {0}")]
    ByteStream(#[from] ByteStreamError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl Error {
    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::DuplicateListing { .. } => "duplicate_listing",
            Error::ListingNotFound { .. } => "listing_not_found",
            Error::InvalidValue(_) => "invalid_value",
            Error::UnknownVendor(_) => "unknown_vendor",
            Error::UnknownCrop(_) => "unknown_crop",
            Error::NotInBudget(_) => "not_in_budget",
            Error::Io(_)
            | Error::Json(_)
            | Error::Config(_)
            | Error::Storage(_)
            | Error::ByteStream(_)
            | Error::Parquet(_)
            | Error::Arrow(_) => "internal",
        }
    }
}
