//! Derived market views. Every function here is pure and total: empty input
//! yields an empty collection or `None`, never an error.

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Category, Crop, CropRef, MarketSignal, PriceComparison, Sentiment, VendorInventory,
    VendorProfile, VendorRegistration, VolatilityBucket,
};
use crate::utils::{format_price, round_to};

const BULLISH_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Extremes<'a> {
    pub most_expensive: Vec<&'a Crop>,
    pub cheapest: Vec<&'a Crop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ShopFilter {
    #[default]
    All,
    Fruit,
    Vegetable,
}

/// The `n` crops with the highest 24h change. Ties keep catalog order.
pub fn top_movers(crops: &[Crop], n: usize) -> Vec<&Crop> {
    let mut sorted: Vec<&Crop> = crops.iter().collect();
    sorted.sort_by(|a, b| b.change_24h.total_cmp(&a.change_24h));
    sorted.truncate(n);
    sorted
}

pub fn extremes_by_category<P>(crops: &[Crop], predicate: P, n: usize) -> Extremes<'_>
where
    P: Fn(&Crop) -> bool,
{
    let matching: Vec<&Crop> = crops.iter().filter(|c| predicate(*c)).collect();

    let mut most_expensive = matching.clone();
    most_expensive.sort_by(|a, b| b.current_price.total_cmp(&a.current_price));
    most_expensive.truncate(n);

    let mut cheapest = matching;
    cheapest.sort_by(|a, b| a.current_price.total_cmp(&b.current_price));
    cheapest.truncate(n);

    Extremes {
        most_expensive,
        cheapest,
    }
}

/// Buckets every history point of every crop by the point's calendar month.
pub fn monthly_volatility(crops: &[Crop]) -> Vec<VolatilityBucket> {
    let mut months: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for point in crops.iter().flat_map(|c| c.history.iter()) {
        months
            .entry((point.date.year(), point.date.month()))
            .or_default()
            .push(point.price);
    }

    months
        .into_iter()
        .map(|((year, month), prices)| bucket_stats(year, month, &prices))
        .collect()
}

fn bucket_stats(year: i32, month: u32, prices: &[f64]) -> VolatilityBucket {
    let count = prices.len();
    let mean = prices.iter().sum::<f64>() / count as f64;
    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let first = prices[0];
    let last = prices[count - 1];
    // Halves round toward positive infinity, so -0.005 % reads as 0.
    let change_pct = if count > 1 && first != 0.0 {
        ((last - first) * 10000.0 / first + 0.5).floor() / 100.0
    } else {
        0.0
    };

    VolatilityBucket {
        period: month_label(year, month),
        year,
        month,
        avg: round_to(mean, 2),
        min,
        max,
        change_pct,
        count,
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{:02} {}", month, year))
}

pub fn volatility_for_period<'a>(buckets: &'a [VolatilityBucket], period: &str) -> Option<&'a VolatilityBucket> {
    buckets.iter().find(|b| b.period.eq_ignore_ascii_case(period.trim()))
}

pub fn vendor_roster(crops: &[Crop]) -> Vec<VendorProfile> {
    vendor_roster_seeded(&[], crops)
}

/// Folds listings into one entry per vendor id.
///
/// Registrations are applied first and only provide defaults. For display
/// fields and the aggregate score the last listing processed wins; crops are
/// accumulated once each, in catalog order.
pub fn vendor_roster_seeded(registrations: &[VendorRegistration], crops: &[Crop]) -> Vec<VendorProfile> {
    let mut roster: Vec<VendorProfile> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for reg in registrations {
        if index.contains_key(&reg.vendor_id) {
            continue;
        }
        index.insert(reg.vendor_id.clone(), roster.len());
        roster.push(VendorProfile {
            vendor_id: reg.vendor_id.clone(),
            display_name: reg.display_name.clone(),
            specialty: reg.specialty.clone(),
            rating: 0.0,
            review_count: 0,
            crops_sold: Vec::new(),
        });
    }

    for crop in crops {
        for listing in &crop.vendors {
            let slot = *index.entry(listing.vendor_id.clone()).or_insert_with(|| {
                roster.push(VendorProfile {
                    vendor_id: listing.vendor_id.clone(),
                    display_name: String::new(),
                    specialty: String::new(),
                    rating: 0.0,
                    review_count: 0,
                    crops_sold: Vec::new(),
                });
                roster.len() - 1
            });

            let entry = &mut roster[slot];
            entry.display_name = listing.display_name.clone();
            entry.specialty = listing.specialty.clone();
            entry.rating = listing.rating;
            entry.review_count = listing.review_count;
            if !entry.crops_sold.iter().any(|c| c.id == crop.id) {
                entry.crops_sold.push(CropRef {
                    id: crop.id.clone(),
                    name: crop.name.clone(),
                    category: crop.category,
                });
            }
        }
    }

    roster
}

/// Narrows a roster to a shop type, optionally hiding one vendor (the
/// caller's own shop).
pub fn filter_roster<'a>(
    roster: &'a [VendorProfile],
    filter: ShopFilter,
    exclude_vendor: Option<&str>,
) -> Vec<&'a VendorProfile> {
    roster
        .iter()
        .filter(|v| Some(v.vendor_id.as_str()) != exclude_vendor)
        .filter(|v| match filter {
            ShopFilter::All => true,
            ShopFilter::Fruit => v.sells_only_fruit(),
            ShopFilter::Vegetable => v.sells_only_produce(),
        })
        .collect()
}

/// Vendors whose every listed crop is a fruit.
pub fn fruit_shops(roster: &[VendorProfile]) -> Vec<&VendorProfile> {
    roster.iter().filter(|v| v.sells_only_fruit()).collect()
}

/// Vendors listing at least one non-fruit crop.
pub fn produce_shops(roster: &[VendorProfile]) -> Vec<&VendorProfile> {
    roster.iter().filter(|v| v.sells_any_produce()).collect()
}

pub fn price_comparison(crop: &Crop, vendor_id: &str) -> Option<PriceComparison> {
    let mine = crop.listing(vendor_id)?;
    let market_avg = crop.vendors.iter().map(|v| v.price).sum::<f64>() / crop.vendors.len() as f64;
    let diff_pct = if market_avg == 0.0 {
        0.0
    } else {
        round_to((mine.price - market_avg) / market_avg * 100.0, 1)
    };

    Some(PriceComparison {
        my_price: mine.price,
        market_avg,
        diff_pct,
    })
}

pub fn market_signal(crops: &[Crop]) -> Option<MarketSignal> {
    if crops.is_empty() {
        return None;
    }
    let avg_change = crops.iter().map(|c| c.change_24h).sum::<f64>() / crops.len() as f64;
    let sentiment = if avg_change >= BULLISH_THRESHOLD {
        Sentiment::Bullish
    } else if avg_change >= 0.0 {
        Sentiment::Neutral
    } else {
        Sentiment::Bearish
    };

    Some(MarketSignal {
        avg_change: round_to(avg_change, 2),
        sentiment,
    })
}

/// Market-grid filter: case-insensitive name search plus optional category.
pub fn filter_crops<'a>(crops: &'a [Crop], search: &str, category: Option<Category>) -> Vec<&'a Crop> {
    let needle = search.trim().to_lowercase();
    crops
        .iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .filter(|c| category.is_none_or(|cat| c.category == cat))
        .collect()
}

pub fn vendor_inventory(crops: &[Crop], vendor_id: &str) -> VendorInventory {
    let mut crop_ids = Vec::new();
    let mut total_stock = 0.0;
    for crop in crops {
        if let Some(listing) = crop.listing(vendor_id) {
            crop_ids.push(crop.id.clone());
            total_stock += listing.stock;
        }
    }

    VendorInventory {
        vendor_id: vendor_id.to_string(),
        crop_ids,
        total_stock,
    }
}

/// One ticker entry, e.g. `ONION ₱52.00 ▲ 1.5%`.
pub fn ticker_line(crop: &Crop) -> String {
    let arrow = if crop.change_24h >= 0.0 { '▲' } else { '▼' };
    format!(
        "{} {} {} {}%",
        crop.name.to_uppercase(),
        format_price(crop.current_price),
        arrow,
        crop.change_24h.abs()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;
    use crate::services::catalog::tests::{crop, listing};
    use chrono::{TimeZone, Utc};

    fn point(year: i32, month: u32, day: u32, price: f64) -> PricePoint {
        PricePoint {
            date: Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap(),
            price,
        }
    }

    fn with_change(id: &str, change: f64) -> Crop {
        let mut c = crop(id, Category::Vegetable, 10.0, vec![]);
        c.change_24h = change;
        c
    }

    #[test]
    fn volatility_buckets_by_month() {
        let mut c = crop("onion", Category::Vegetable, 200.0, vec![]);
        c.history = vec![
            point(2024, 1, 3, 100.0),
            point(2024, 1, 20, 120.0),
            point(2024, 2, 7, 200.0),
        ];

        let buckets = monthly_volatility(&[c]);

        assert_eq!(buckets.len(), 2);
        let jan = &buckets[0];
        assert_eq!(jan.period, "Jan 2024");
        assert_eq!((jan.avg, jan.min, jan.max, jan.change_pct), (110.0, 100.0, 120.0, 20.0));
        assert_eq!(jan.count, 2);
        let feb = &buckets[1];
        assert_eq!(feb.period, "Feb 2024");
        assert_eq!((feb.avg, feb.min, feb.max, feb.change_pct), (200.0, 200.0, 200.0, 0.0));
    }

    #[test]
    fn volatility_orders_chronologically_across_crops_and_years() {
        let mut a = crop("a", Category::Fruit, 1.0, vec![]);
        a.history = vec![point(2025, 1, 1, 10.0)];
        let mut b = crop("b", Category::Fruit, 1.0, vec![]);
        b.history = vec![point(2024, 12, 1, 30.0), point(2025, 1, 15, 5.0)];

        let buckets = monthly_volatility(&[a, b]);

        let periods: Vec<&str> = buckets.iter().map(|b| b.period.as_str()).collect();
        assert_eq!(periods, vec!["Dec 2024", "Jan 2025"]);
        let jan = volatility_for_period(&buckets, "jan 2025").unwrap();
        assert_eq!(jan.avg, 7.5);
        assert_eq!(jan.change_pct, -50.0);
    }

    #[test]
    fn volatility_change_rounds_halves_upward() {
        let mut c = crop("onion", Category::Vegetable, 1.0, vec![]);
        c.history = vec![point(2024, 3, 1, 10000.0), point(2024, 3, 8, 9999.5)];
        assert_eq!(monthly_volatility(std::slice::from_ref(&c))[0].change_pct, 0.0);

        c.history[1].price = 9999.4;
        assert_eq!(monthly_volatility(&[c])[0].change_pct, -0.01);
    }

    #[test]
    fn volatility_of_empty_catalog_is_empty() {
        assert!(monthly_volatility(&[]).is_empty());
        assert!(volatility_for_period(&[], "Jan 2024").is_none());
    }

    #[test]
    fn top_movers_is_stable_on_ties() {
        let crops = vec![
            with_change("a", 1.0),
            with_change("b", 5.0),
            with_change("c", 1.0),
            with_change("d", -2.0),
        ];

        let ids: Vec<&str> = top_movers(&crops, 3).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert!(top_movers(&[], 3).is_empty());
    }

    #[test]
    fn extremes_sort_each_side_independently() {
        let crops = vec![
            crop("apple", Category::Fruit, 120.0, vec![]),
            crop("kale", Category::Vegetable, 500.0, vec![]),
            crop("melon", Category::Fruit, 45.0, vec![]),
            crop("mango", Category::Fruit, 150.0, vec![]),
        ];

        let fruit = extremes_by_category(&crops, Crop::is_fruit, 2);

        let top: Vec<&str> = fruit.most_expensive.iter().map(|c| c.id.as_str()).collect();
        let low: Vec<&str> = fruit.cheapest.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(top, vec!["mango", "apple"]);
        assert_eq!(low, vec!["melon", "apple"]);
    }

    #[test]
    fn roster_merges_vendors_and_dedups_crops() {
        let mut renamed = listing("v1", 20.0, 4.8, 120);
        renamed.display_name = "Fruit Basket".to_string();
        let crops = vec![
            crop("apple", Category::Fruit, 10.0, vec![listing("v1", 10.0, 4.8, 120), listing("v2", 11.0, 4.5, 85)]),
            crop("mango", Category::Fruit, 20.0, vec![renamed]),
        ];

        let roster = vendor_roster(&crops);

        assert_eq!(roster.len(), 2);
        let v1 = &roster[0];
        assert_eq!(v1.vendor_id, "v1");
        assert_eq!(v1.display_name, "Fruit Basket");
        let sold: Vec<&str> = v1.crops_sold.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(sold, vec!["apple", "mango"]);
        assert_eq!((v1.rating, v1.review_count), (4.8, 120));

        for c in &crops {
            for l in &c.vendors {
                let entry = roster.iter().find(|v| v.vendor_id == l.vendor_id).unwrap();
                assert!(entry.crops_sold.iter().any(|s| s.id == c.id));
            }
        }
    }

    #[test]
    fn registrations_only_seed_defaults() {
        let regs = vec![
            VendorRegistration {
                vendor_id: "v1".to_string(),
                display_name: "Registered".to_string(),
                specialty: "Roots".to_string(),
            },
            VendorRegistration {
                vendor_id: "v9".to_string(),
                display_name: "Newcomer".to_string(),
                specialty: "Herbs".to_string(),
            },
        ];
        let crops = vec![crop("yam", Category::Root, 10.0, vec![listing("v1", 10.0, 4.0, 3)])];

        let roster = vendor_roster_seeded(&regs, &crops);

        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].display_name, "v1 stall");
        assert_eq!(roster[0].review_count, 3);
        assert_eq!(roster[1].display_name, "Newcomer");
        assert!(roster[1].crops_sold.is_empty());
    }

    #[test]
    fn shop_filters_split_fruit_and_produce_vendors() {
        let crops = vec![
            crop("apple", Category::Fruit, 10.0, vec![listing("fruit", 10.0, 4.0, 1), listing("mixed", 10.0, 4.0, 1)]),
            crop("ginger", Category::Spice, 10.0, vec![listing("mixed", 10.0, 4.0, 1), listing("veg", 10.0, 4.0, 1)]),
        ];
        let roster = vendor_roster(&crops);

        let ids = |list: Vec<&VendorProfile>| list.iter().map(|v| v.vendor_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(fruit_shops(&roster)), vec!["fruit"]);
        assert_eq!(ids(produce_shops(&roster)), vec!["mixed", "veg"]);
        assert_eq!(ids(filter_roster(&roster, ShopFilter::Vegetable, None)), vec!["veg"]);
        assert_eq!(ids(filter_roster(&roster, ShopFilter::All, Some("mixed"))), vec!["fruit", "veg"]);
    }

    #[test]
    fn price_comparison_preserves_sign() {
        let c = crop(
            "apple",
            Category::Fruit,
            10.0,
            vec![listing("v1", 90.0, 4.0, 1), listing("v2", 110.0, 4.0, 1), listing("v3", 130.0, 4.0, 1)],
        );

        let cheap = price_comparison(&c, "v1").unwrap();
        assert_eq!(cheap.market_avg, 110.0);
        assert_eq!(cheap.diff_pct, -18.2);
        assert_eq!(price_comparison(&c, "v3").unwrap().diff_pct, 18.2);
        assert!(price_comparison(&c, "missing").is_none());
    }

    #[test]
    fn market_signal_thresholds() {
        assert_eq!(market_signal(&[]), None);
        let bull = market_signal(&[with_change("a", 4.0), with_change("b", 2.0)]).unwrap();
        assert_eq!(bull.sentiment, Sentiment::Bullish);
        let flat = market_signal(&[with_change("a", 0.0)]).unwrap();
        assert_eq!(flat.sentiment, Sentiment::Neutral);
        let bear = market_signal(&[with_change("a", -0.5)]).unwrap();
        assert_eq!(bear.sentiment, Sentiment::Bearish);
    }

    #[test]
    fn filter_and_inventory() {
        let mut melon = crop("melon", Category::Fruit, 45.0, vec![listing("v1", 40.0, 4.0, 1)]);
        melon.name = "Seedless Watermelon".to_string();
        let mut ginger = crop("ginger", Category::Spice, 90.0, vec![listing("v1", 95.0, 4.0, 1)]);
        ginger.vendors[0].stock = 5.0;
        let crops = vec![melon, ginger];

        let hits: Vec<&str> = filter_crops(&crops, "WATER", None).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(hits, vec!["melon"]);
        assert_eq!(filter_crops(&crops, "", Some(Category::Spice)).len(), 1);
        assert!(filter_crops(&crops, "water", Some(Category::Spice)).is_empty());

        let inventory = vendor_inventory(&crops, "v1");
        assert_eq!(inventory.crop_ids, vec!["melon", "ginger"]);
        assert_eq!(inventory.total_stock, 15.0);
        assert!(vendor_inventory(&crops, "nobody").crop_ids.is_empty());
    }

    #[test]
    fn ticker_line_shows_direction() {
        let mut c = with_change("okra", -2.4);
        c.name = "Okra".to_string();
        assert_eq!(ticker_line(&c), "OKRA ₱10.00 ▼ 2.4%");
    }
}
