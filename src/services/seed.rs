//! Default produce catalog and synthetic weekly price history, used when no
//! snapshot has been persisted yet.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use rand::Rng;
use std::f64::consts::TAU;
use tracing::debug;

use crate::models::{Category, Crop, Demand, PricePoint, VendorListing};
use crate::utils::round_to;

const SEASONAL_AMPLITUDE: f64 = 0.06;
const TREND_AMPLITUDE: f64 = 0.02;
const TREND_PERIOD_WEEKS: f64 = 200.0;
const NOISE_SPAN: f64 = 0.08;

struct VendorSeed {
    id: &'static str,
    name: &'static str,
    specialty: &'static str,
    rating: f64,
    review_count: u32,
}

const VENDORS: &[VendorSeed] = &[
    VendorSeed { id: "v_fruit_1", name: "The Fruit Basket", specialty: "Premium Fruits", rating: 4.8, review_count: 120 },
    VendorSeed { id: "v_fruit_2", name: "Sweet Harvest", specialty: "Direct Orchard", rating: 4.5, review_count: 85 },
    VendorSeed { id: "v_fruit_3", name: "Tropical Oasis", specialty: "Exotic Delights", rating: 4.9, review_count: 42 },
    VendorSeed { id: "v_fruit_4", name: "Sun-Kissed Orchard", specialty: "Seasonal Picks", rating: 4.6, review_count: 75 },
    VendorSeed { id: "v_veg_1", name: "Veggies Plus", specialty: "Highland Greens", rating: 4.7, review_count: 156 },
    VendorSeed { id: "v_veg_2", name: "Farm Fresh Greens", specialty: "Hydroponics Specialist", rating: 4.4, review_count: 92 },
    VendorSeed { id: "v_veg_3", name: "Root & Stem", specialty: "Bulk Root Crops", rating: 4.6, review_count: 310 },
    VendorSeed { id: "v_veg_4", name: "Highland Harvest", specialty: "Mountain Fresh", rating: 4.8, review_count: 110 },
];

struct CropSeed {
    id: &'static str,
    name: &'static str,
    category: Category,
    icon: &'static str,
    price: f64,
    change_24h: f64,
    demand: Demand,
    weight_per_unit: f64,
    // (vendor id, price, stock, hot)
    listings: &'static [(&'static str, f64, f64, bool)],
}

const CROPS: &[CropSeed] = &[
    CropSeed {
        id: "pineapple-premium", name: "Premium Pineapple", category: Category::Fruit, icon: "🍍",
        price: 120.0, change_24h: 3.2, demand: Demand::High, weight_per_unit: 1.8,
        listings: &[("v_fruit_3", 115.0, 150.0, true), ("v_fruit_1", 125.0, 80.0, false)],
    },
    CropSeed {
        id: "watermelon", name: "Sweet Watermelon", category: Category::Fruit, icon: "🍉",
        price: 45.0, change_24h: -1.5, demand: Demand::Medium, weight_per_unit: 5.0,
        listings: &[("v_fruit_2", 42.0, 300.0, false), ("v_fruit_4", 48.0, 120.0, false)],
    },
    CropSeed {
        id: "mango-carabao", name: "Carabao Mango", category: Category::Fruit, icon: "🥭",
        price: 150.0, change_24h: 2.1, demand: Demand::High, weight_per_unit: 0.25,
        listings: &[("v_fruit_1", 145.0, 100.0, true), ("v_fruit_2", 155.0, 200.0, false)],
    },
    CropSeed {
        id: "tomato-native", name: "Native Tomato", category: Category::Vegetable, icon: "🍅",
        price: 65.0, change_24h: 12.4, demand: Demand::High, weight_per_unit: 0.08,
        listings: &[("v_veg_1", 60.0, 500.0, false), ("v_veg_2", 70.0, 400.0, false)],
    },
    CropSeed {
        id: "cabbage-rare", name: "Scorpio Cabbage", category: Category::Vegetable, icon: "🥬",
        price: 85.0, change_24h: -4.2, demand: Demand::Medium, weight_per_unit: 1.5,
        listings: &[("v_veg_4", 80.0, 600.0, true), ("v_veg_1", 90.0, 450.0, false)],
    },
    CropSeed {
        id: "okra", name: "Fresh Okra", category: Category::Vegetable, icon: "🥒",
        price: 55.0, change_24h: 1.1, demand: Demand::High, weight_per_unit: 0.02,
        listings: &[("v_veg_2", 50.0, 800.0, false), ("v_veg_3", 58.0, 1200.0, false)],
    },
    CropSeed {
        id: "eggplant", name: "Long Eggplant", category: Category::Vegetable, icon: "🍆",
        price: 90.0, change_24h: 3.5, demand: Demand::High, weight_per_unit: 0.2,
        listings: &[("v_veg_1", 85.0, 1200.0, false), ("v_veg_3", 95.0, 1000.0, false)],
    },
    CropSeed {
        id: "garlic-ilocos", name: "Ilocos Garlic", category: Category::Spice, icon: "🧄",
        price: 180.0, change_24h: 2.5, demand: Demand::High, weight_per_unit: 0.05,
        listings: &[("v_veg_3", 175.0, 500.0, true), ("v_veg_1", 190.0, 300.0, false)],
    },
    CropSeed {
        id: "onion-red", name: "Red Onion", category: Category::Spice, icon: "🧅",
        price: 160.0, change_24h: -15.4, demand: Demand::High, weight_per_unit: 0.1,
        listings: &[("v_veg_3", 150.0, 2000.0, false), ("v_veg_2", 170.0, 1500.0, false)],
    },
    CropSeed {
        id: "chili-labuyo", name: "Siling Labuyo", category: Category::Spice, icon: "🌶️",
        price: 350.0, change_24h: 18.2, demand: Demand::High, weight_per_unit: 0.005,
        listings: &[("v_veg_1", 340.0, 50.0, true), ("v_veg_4", 370.0, 30.0, false)],
    },
    CropSeed {
        id: "potato-baguio", name: "Granola Potato", category: Category::Root, icon: "🥔",
        price: 95.0, change_24h: -2.1, demand: Demand::High, weight_per_unit: 0.15,
        listings: &[("v_veg_4", 90.0, 2000.0, true), ("v_veg_3", 100.0, 1500.0, false)],
    },
    CropSeed {
        id: "sweet-potato", name: "Yellow Kamote", category: Category::Root, icon: "🍠",
        price: 55.0, change_24h: 0.8, demand: Demand::Medium, weight_per_unit: 0.2,
        listings: &[("v_veg_3", 50.0, 3000.0, false), ("v_veg_2", 60.0, 1000.0, false)],
    },
    CropSeed {
        id: "cassava", name: "Fresh Cassava", category: Category::Root, icon: "🪵",
        price: 40.0, change_24h: -1.2, demand: Demand::Low, weight_per_unit: 0.8,
        listings: &[("v_veg_3", 38.0, 5000.0, false), ("v_veg_2", 42.0, 2000.0, false)],
    },
];

fn at_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Weekly price points from `start` up to `end`, closing on exactly `base`
/// at `end` so the series agrees with the crop's current price.
///
/// Each weekly price combines an annual wave, a slow multi-year oscillation
/// and uniform noise around `base`, rounded to cents.
pub fn generate_history<R: Rng>(base: f64, start: NaiveDate, end: NaiveDate, rng: &mut R) -> Vec<PricePoint> {
    let mut history = Vec::new();
    let mut date = start;
    let mut week = 0u32;

    while date < end {
        let seasonal = (f64::from(date.ordinal0()) / 365.0 * TAU).sin() * SEASONAL_AMPLITUDE;
        let trend = (f64::from(week) / TREND_PERIOD_WEEKS).sin() * TREND_AMPLITUDE;
        let noise = (rng.random::<f64>() - 0.5) * NOISE_SPAN;

        history.push(PricePoint {
            date: at_midnight(date),
            price: round_to(base * (1.0 + seasonal + trend + noise), 2),
        });

        date += Duration::weeks(1);
        week += 1;
    }

    history.push(PricePoint {
        date: at_midnight(end),
        price: base,
    });
    history
}

/// The built-in catalog with generated history between `start` and `end`.
pub fn default_catalog<R: Rng>(start: NaiveDate, end: NaiveDate, rng: &mut R) -> Vec<Crop> {
    let crops: Vec<Crop> = CROPS
        .iter()
        .map(|seed| Crop {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            category: seed.category,
            icon: seed.icon.to_string(),
            current_price: seed.price,
            change_24h: seed.change_24h,
            history: generate_history(seed.price, start, end, &mut *rng),
            demand: seed.demand,
            weight_per_unit: seed.weight_per_unit,
            vendors: seed
                .listings
                .iter()
                .filter_map(|&(vendor_id, price, stock, is_hot)| {
                    let vendor = VENDORS.iter().find(|v| v.id == vendor_id)?;
                    Some(VendorListing {
                        vendor_id: vendor.id.to_string(),
                        display_name: vendor.name.to_string(),
                        specialty: vendor.specialty.to_string(),
                        price,
                        stock,
                        rating: vendor.rating,
                        review_count: vendor.review_count,
                        is_hot,
                        listing_name_override: None,
                    })
                })
                .collect(),
            last_updated: None,
        })
        .collect();

    debug!(crops = crops.len(), start = %start, end = %end, "Seed catalog generated");
    crops
}
