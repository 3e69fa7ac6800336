use bigdecimal::BigDecimal;
use num_format::{Locale, ToFormattedString as _};
use num_traits::Zero;

use crate::common::money::{round_half_even, scale_of};

/// Currency amounts always show at least cents.
const MIN_PRICE_SCALE: i64 = 2;

/// Formats `value` with exactly `scale` fraction digits, using the locale's
/// grouping separator and decimal mark.
pub fn format_decimal(value: &BigDecimal, scale: i64, locale: &Locale) -> String {
    let scale = scale.max(0);
    let rounded = round_half_even(value, scale);
    let sign = if rounded < BigDecimal::zero() { "-" } else { "" };
    let text = rounded.abs().to_plain_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let grouped = match int_part.parse::<u64>() {
        Ok(n) => n.to_formatted_string(locale),
        Err(_) => int_part.to_string(),
    };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}{}{frac_part}", locale.decimal())
    }
}

/// Formats one of a set of compared amounts so they all line up on the
/// widest scale present (minimum 2 places).
pub fn format_price(value: &BigDecimal, peers: &[&BigDecimal], locale: &Locale) -> String {
    format_decimal(value, common_scale(value, peers, MIN_PRICE_SCALE), locale)
}

/// Like [`format_price`] for share quantities, which need no minimum scale.
pub fn format_quantity(value: &BigDecimal, peers: &[&BigDecimal], locale: &Locale) -> String {
    format_decimal(value, common_scale(value, peers, 0), locale)
}

fn common_scale(value: &BigDecimal, peers: &[&BigDecimal], min: i64) -> i64 {
    peers
        .iter()
        .map(|p| scale_of(p))
        .chain(std::iter::once(scale_of(value)))
        .fold(min, i64::max)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn groups_thousands_per_locale() {
        assert_eq!(format_decimal(&dec("1234567.5"), 2, &Locale::en), "1,234,567.50");
        assert_eq!(format_decimal(&dec("1234567.5"), 2, &Locale::de), "1.234.567,50");
        assert_eq!(format_decimal(&dec("-42.125"), 2, &Locale::en), "-42.12");
    }

    #[test]
    fn price_uses_widest_peer_scale() {
        let old = dec("150");
        let new = dec("150.003");
        assert_eq!(format_price(&old, &[&new], &Locale::en), "150.000");
        assert_eq!(format_price(&new, &[&old], &Locale::en), "150.003");
        assert_eq!(format_price(&old, &[], &Locale::en), "150.00");
    }

    #[test]
    fn tiny_prices_stay_in_plain_notation() {
        assert_eq!(format_price(&dec("0.00000012"), &[], &Locale::en), "0.00000012");
        assert_eq!(format_decimal(&dec("0.00000012"), 9, &Locale::de), "0,000000120");
    }

    #[test]
    fn quantity_has_no_minimum_scale() {
        assert_eq!(format_quantity(&dec("1200"), &[&dec("1200")], &Locale::en), "1,200");
        assert_eq!(format_quantity(&dec("10"), &[&dec("10.5")], &Locale::en), "10.0");
    }
}
