const CURRENCY_SYMBOL: &str = "₱";

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Formats a price as `₱1,234.50`.
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, CURRENCY_SYMBOL, grouped, fraction)
}
