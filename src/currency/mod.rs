//! Amount formatting for the two ledger currencies, plus the fixed ranking ratio.
//!
//! Nothing in here converts a stored or displayed amount. [`KHR_PER_USD`] only
//! feeds ranking scores and chart bar lengths.

use crate::ledger::Currency;

/// Riel per dollar used for ranking and chart scaling.
pub const KHR_PER_USD: f64 = 4000.0;

pub const USD_SYMBOL: &str = "$";
pub const KHR_SYMBOL: &str = "៛";

const GROUPING_SEPARATOR: char = ',';

pub fn symbol_for(currency: Currency) -> &'static str {
    match currency {
        Currency::Usd => USD_SYMBOL,
        Currency::Khr => KHR_SYMBOL,
    }
}

/// Decimal places an amount carries in its own currency.
pub fn minor_units_for(currency: Currency) -> usize {
    match currency {
        Currency::Usd => 2,
        Currency::Khr => 0,
    }
}

/// Whether `amount` is a whole number of the currency's smallest unit: riel
/// for KHR, cents for USD.
pub fn fits_minor_units(amount: f64, currency: Currency) -> bool {
    let scaled = amount * 10f64.powi(minor_units_for(currency) as i32);
    (scaled - scaled.round()).abs() < 1e-6
}

/// Scales an amount into USD-equivalent units for ordering or pixel lengths.
pub fn ranking_units(amount: f64, currency: Currency) -> f64 {
    match currency {
        Currency::Usd => amount,
        Currency::Khr => amount / KHR_PER_USD,
    }
}

/// Formats an amount in its own currency: `$1,234.50`, `4,100 ៛`.
pub fn format_amount(amount: f64, currency: Currency) -> String {
    let body = format_number(amount, minor_units_for(currency));
    let symbol = symbol_for(currency);
    match currency {
        Currency::Usd => format!("{symbol}{body}"),
        Currency::Khr => format!("{body} {symbol}"),
    }
}

/// Fixed-precision number with thousands grouping.
pub fn format_number(value: f64, precision: usize) -> String {
    let body = format!("{:.*}", precision, value);
    let (int_part, fraction) = match body.find('.') {
        Some(pos) => body.split_at(pos),
        None => (body.as_str(), ""),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    format!("{}{}{}", sign, group_digits(digits), fraction)
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().enumerate() {
        if count != 0 && (digits.len() - count) % 3 == 0 {
            grouped.push(GROUPING_SEPARATOR);
        }
        grouped.push(ch);
    }
    grouped
}

/// Axis tick label in USD-equivalent units: `$0`, `$250`, `$1.5k`, `$12k`.
pub fn abbreviate_usd(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{USD_SYMBOL}{}k", trim_decimal(value / 1000.0))
    } else {
        format!("{USD_SYMBOL}{}", trim_decimal(value))
    }
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{:.1}", value);
    match text.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usd_keeps_two_decimals_and_groups_thousands() {
        assert_eq!(format_amount(1234.5, Currency::Usd), "$1,234.50");
        assert_eq!(format_amount(0.5, Currency::Usd), "$0.50");
    }

    #[test]
    fn khr_is_whole_unit_with_trailing_glyph() {
        assert_eq!(format_amount(4100.0, Currency::Khr), "4,100 ៛");
        assert_eq!(format_amount(1_250_000.0, Currency::Khr), "1,250,000 ៛");
        assert_eq!(format_amount(500.0, Currency::Khr), "500 ៛");
    }

    #[test]
    fn negative_values_keep_sign_ahead_of_groups() {
        assert_eq!(format_number(-1234567.0, 0), "-1,234,567");
    }

    #[test]
    fn ranking_units_only_scale_riel() {
        assert_eq!(ranking_units(12.0, Currency::Usd), 12.0);
        assert!((ranking_units(4100.0, Currency::Khr) - 1.025).abs() < 1e-12);
    }

    #[test]
    fn tick_labels_abbreviate_thousands() {
        assert_eq!(abbreviate_usd(0.0), "$0");
        assert_eq!(abbreviate_usd(250.0), "$250");
        assert_eq!(abbreviate_usd(1500.0), "$1.5k");
        assert_eq!(abbreviate_usd(12_000.0), "$12k");
        assert_eq!(abbreviate_usd(2.5), "$2.5");
    }
}
