use bigdecimal::{BigDecimal, ParseBigDecimalError, RoundingMode};
use num_traits::{ToPrimitive, Zero};

/// Fraction digits kept when a price is re-derived from value / shares.
pub const DERIVED_PRICE_SCALE: i64 = 6;

/// Parses a decimal field from an import file.
///
/// # Examples
/// ```
/// use price_import::common::money::parse_decimal;
///
/// let shares = parse_decimal(" 12.500 ").unwrap();
/// assert_eq!(shares.to_string(), "12.500");
/// assert!(parse_decimal("").is_err());
/// ```
pub fn parse_decimal(s: &str) -> Result<BigDecimal, ParseBigDecimalError> {
    let t = s.trim();
    if t.is_empty() {
        return Err(ParseBigDecimalError::Other("empty amount".into()));
    }
    t.parse()
}

/// Number of fraction digits carried by `value`, e.g. 2 for `15000.00`.
pub fn scale_of(value: &BigDecimal) -> i64 {
    value.as_bigint_and_exponent().1
}

pub fn round_half_even(value: &BigDecimal, scale: i64) -> BigDecimal {
    value.with_scale_round(scale, RoundingMode::HalfEven)
}

/// Chooses the price to record for a reported shares/price/value triple.
///
/// The reported price stands when `shares * price`, rounded half-even to the
/// scale of `value`, reproduces `value`. Otherwise the feed's price carries
/// rounding noise and `value / shares` (half-even, 6 places) is used instead.
/// Zero shares leave nothing to divide by, so the reported price is kept.
pub fn derive_price(shares: &BigDecimal, price: &BigDecimal, value: &BigDecimal) -> BigDecimal {
    if shares.is_zero() {
        return price.clone();
    }
    let product = round_half_even(&(shares * price), scale_of(value));
    if product == *value {
        price.clone()
    } else {
        round_half_even(&(value / shares), DERIVED_PRICE_SCALE)
    }
}

/// Drops trailing fraction zeros down to `min_scale` without changing the value.
pub fn trim_scale(value: &BigDecimal, min_scale: i64) -> BigDecimal {
    let scale = scale_of(value);
    (min_scale..scale)
        .map(|s| round_half_even(value, s))
        .find(|candidate| candidate == value)
        .unwrap_or_else(|| value.clone())
}

pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Percentage change from `old` to `new`, for display only.
pub fn percent_change(old: &BigDecimal, new: &BigDecimal) -> Option<f64> {
    if old.is_zero() {
        return None;
    }
    Some((to_f64(new) / to_f64(old) - 1.0) * 100.0)
}
