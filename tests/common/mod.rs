#![allow(dead_code)]

use chrono::{TimeZone, Utc};

use agripresyo::models::{Category, Crop, Demand, PricePoint, VendorListing};

pub fn listing(vendor_id: &str, name: &str, price: f64, stock: f64, rating: f64, review_count: u32) -> VendorListing {
    VendorListing {
        vendor_id: vendor_id.to_string(),
        display_name: name.to_string(),
        specialty: "Mixed Produce".to_string(),
        price,
        stock,
        rating,
        review_count,
        is_hot: false,
        listing_name_override: None,
    }
}

fn point(month: u32, day: u32, price: f64) -> PricePoint {
    PricePoint {
        date: Utc.with_ymd_and_hms(2024, month, day, 0, 0, 0).unwrap(),
        price,
    }
}

/// Three crops whose combined history is Jan 2024 {100, 120} and Feb 2024
/// {200}.
pub fn market_crops() -> Vec<Crop> {
    vec![
        Crop {
            id: "tomato".to_string(),
            name: "Native Tomato".to_string(),
            category: Category::Vegetable,
            icon: "🍅".to_string(),
            current_price: 120.0,
            change_24h: 12.4,
            history: vec![point(1, 5, 100.0), point(1, 20, 120.0)],
            demand: Demand::High,
            weight_per_unit: 0.5,
            vendors: vec![
                listing("v_veg_1", "Veggies Plus", 60.0, 500.0, 4.7, 156),
                listing("v_veg_2", "Farm Fresh Greens", 70.0, 400.0, 4.4, 92),
            ],
            last_updated: None,
        },
        Crop {
            id: "mango".to_string(),
            name: "Carabao Mango".to_string(),
            category: Category::Fruit,
            icon: "🥭".to_string(),
            current_price: 200.0,
            change_24h: -2.0,
            history: vec![point(2, 10, 200.0)],
            demand: Demand::High,
            weight_per_unit: 0.25,
            vendors: vec![listing("v_fruit_1", "The Fruit Basket", 10.0, 5.0, 4.8, 120)],
            last_updated: None,
        },
        Crop {
            id: "garlic".to_string(),
            name: "Ilocos Garlic".to_string(),
            category: Category::Spice,
            icon: "🧄".to_string(),
            current_price: 180.0,
            change_24h: 2.5,
            history: Vec::new(),
            demand: Demand::Medium,
            weight_per_unit: 0.05,
            vendors: vec![listing("v_veg_1", "Veggies Plus", 175.0, 300.0, 4.7, 156)],
            last_updated: None,
        },
    ]
}
