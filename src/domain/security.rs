use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, ParseBigDecimalError};
use chrono::NaiveDate;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::common::{
    date::{from_date_int, to_date_int},
    money::{round_half_even, to_f64, trim_scale},
};

/// Fraction digits kept when a stored rate is turned back into a price.
pub const SNAPSHOT_PRICE_SCALE: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityInfo {
    pub id: SecurityId,
    pub ticker: String,
    pub name: String,
}

/// A dated price record, with the optional daily trading range.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub date: NaiveDate,
    pub price: BigDecimal,
    pub volume: Option<u64>,
    pub high: Option<BigDecimal>,
    pub low: Option<BigDecimal>,
}

impl PriceSnapshot {
    pub fn new(date: NaiveDate, price: BigDecimal) -> Self {
        Self {
            date,
            price,
            volume: None,
            high: None,
            low: None,
        }
    }
}

/// A snapshot the way the host application keeps it: rates relative to the
/// base currency (`1 / price`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredSnapshot {
    pub rate: f64,
    pub volume: Option<u64>,
    pub high_rate: Option<f64>,
    pub low_rate: Option<f64>,
}

pub fn price_to_rate(price: &BigDecimal) -> f64 {
    if price.is_zero() {
        return 0.0;
    }
    1.0 / to_f64(price)
}

/// Turns a stored rate back into a price, rounded half-even to
/// [`SNAPSHOT_PRICE_SCALE`] places with trailing zeros dropped.
pub fn rate_to_price(rate: f64) -> Result<BigDecimal, ParseBigDecimalError> {
    if rate == 0.0 || !rate.is_finite() {
        return Ok(BigDecimal::zero());
    }
    let raw: BigDecimal = (1.0 / rate).to_string().parse()?;
    Ok(trim_scale(&round_half_even(&raw, SNAPSHOT_PRICE_SCALE), 0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Security {
    pub id: SecurityId,
    pub ticker: String,
    pub name: String,
    /// Keyed by `YYYYMMDD` date integer.
    pub snapshots: BTreeMap<u32, StoredSnapshot>,
    /// The live quote, as a rate.
    pub user_rate: Option<f64>,
}

impl Security {
    pub fn new(id: SecurityId, ticker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            ticker: ticker.into(),
            name: name.into(),
            snapshots: BTreeMap::new(),
            user_rate: None,
        }
    }

    pub fn info(&self) -> SecurityInfo {
        SecurityInfo {
            id: self.id,
            ticker: self.ticker.clone(),
            name: self.name.clone(),
        }
    }

    /// The snapshot in effect on `date`: the latest one dated on or before it.
    pub fn snapshot_for_date(&self, date: NaiveDate) -> Option<PriceSnapshot> {
        self.snapshots
            .range(..=to_date_int(date))
            .next_back()
            .and_then(|(date_int, stored)| decode(*date_int, stored))
    }

    pub fn latest_snapshot(&self) -> Option<PriceSnapshot> {
        self.snapshots
            .iter()
            .next_back()
            .and_then(|(date_int, stored)| decode(*date_int, stored))
    }

    pub fn set_snapshot(&mut self, snapshot: &PriceSnapshot) {
        let stored = StoredSnapshot {
            rate: price_to_rate(&snapshot.price),
            volume: snapshot.volume,
            high_rate: snapshot.high.as_ref().map(price_to_rate),
            low_rate: snapshot.low.as_ref().map(price_to_rate),
        };
        self.snapshots.insert(to_date_int(snapshot.date), stored);
    }

    pub fn current_price(&self) -> Option<BigDecimal> {
        self.user_rate.and_then(|rate| rate_to_price(rate).ok())
    }

    pub fn set_current_price(&mut self, price: &BigDecimal) {
        self.user_rate = Some(price_to_rate(price));
    }
}

fn decode(date_int: u32, stored: &StoredSnapshot) -> Option<PriceSnapshot> {
    let date = from_date_int(date_int)?;
    let price = rate_to_price(stored.rate).ok()?;
    Some(PriceSnapshot {
        date,
        price,
        volume: stored.volume,
        high: stored.high_rate.and_then(|r| rate_to_price(r).ok()),
        low: stored.low_rate.and_then(|r| rate_to_price(r).ok()),
    })
}
