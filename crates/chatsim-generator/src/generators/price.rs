//! Synthetic market prices.

use crate::rng::XorShift32;

/// Lowest price ever produced.
const MIN_PRICE: f64 = 0.0001;

/// Entry price with take-profit and stop-loss levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLevels {
    pub price: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Base price for a token before jitter.
pub fn base_price(token: &str) -> f64 {
    match token {
        "BTC" => 30_000.0,
        "ETH" => 2_000.0,
        _ => {
            let first = token.bytes().next().unwrap_or(0);
            100.0 * f64::from(1 + first % 7)
        }
    }
}

/// Draw price, take-profit and stop-loss (three draws, in that order).
pub fn generate_levels(token: &str, rng: &mut XorShift32) -> PriceLevels {
    let base = base_price(token);
    let jitter = (rng.next_f64() - 0.5) * base * 0.12;
    let price = (base + jitter).max(MIN_PRICE);
    let take_profit = price * (1.0 + (rng.next_f64() * 0.08 + 0.02));
    let stop_loss = price * (1.0 - (rng.next_f64() * 0.12 + 0.01));
    PriceLevels {
        price,
        take_profit,
        stop_loss,
    }
}

/// Round to cents and render with thousands separators, trimming trailing
/// zeros (`30123.4` -> `30,123.4`, `2000` -> `2,000`).
pub fn format_price(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let negative = cents < 0;
    let cents = cents.unsigned_abs();
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac != 0 {
        let frac = format!("{frac:02}");
        grouped.push('.');
        grouped.push_str(frac.trim_end_matches('0'));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_price() {
        assert_eq!(base_price("BTC"), 30_000.0);
        assert_eq!(base_price("ETH"), 2_000.0);
        // 'S' = 83, 83 % 7 = 6
        assert_eq!(base_price("SOL"), 700.0);
        // 'D' = 68, 68 % 7 = 5
        assert_eq!(base_price("DOGE"), 600.0);
    }

    #[test]
    fn test_levels_bounds() {
        let mut rng = XorShift32::new(4000);
        for token in crate::vocab::TOKENS {
            let base = base_price(token);
            let levels = generate_levels(token, &mut rng);
            assert!(levels.price >= base * 0.94 && levels.price <= base * 1.06);
            assert!(levels.take_profit > levels.price);
            assert!(levels.stop_loss < levels.price);
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(30_123.4), "30,123.4");
        assert_eq!(format_price(2_000.0), "2,000");
        assert_eq!(format_price(999.999), "1,000");
        assert_eq!(format_price(1_234_567.891), "1,234,567.89");
        assert_eq!(format_price(0.05), "0.05");
        assert_eq!(format_price(12.5), "12.5");
        assert_eq!(format_price(0.0001), "0");
    }
}
