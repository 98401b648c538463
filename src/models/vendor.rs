use serde::{Deserialize, Serialize};

use super::crop::Category;

/// One vendor's offer for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorListing {
    pub vendor_id: String,
    pub display_name: String,
    pub specialty: String,
    pub price: f64,
    pub stock: f64,
    pub rating: f64,
    pub review_count: u32,
    #[serde(default)]
    pub is_hot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_name_override: Option<String>,
}

/// A vendor known before it lists anything. Its fields only seed roster
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRegistration {
    pub vendor_id: String,
    pub display_name: String,
    pub specialty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRef {
    pub id: String,
    pub name: String,
    pub category: Category,
}

/// Derived roster entry folding every listing that shares a vendor id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorProfile {
    pub vendor_id: String,
    pub display_name: String,
    pub specialty: String,
    pub rating: f64,
    pub review_count: u32,
    pub crops_sold: Vec<CropRef>,
}

impl VendorProfile {
    pub fn sells_only_fruit(&self) -> bool {
        self.crops_sold.iter().all(|c| c.category == Category::Fruit)
    }

    pub fn sells_only_produce(&self) -> bool {
        self.crops_sold.iter().all(|c| c.category != Category::Fruit)
    }

    pub fn sells_any_produce(&self) -> bool {
        self.crops_sold.iter().any(|c| c.category != Category::Fruit)
    }
}
