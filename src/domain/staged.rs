use std::collections::HashSet;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::domain::{
    ledger::LedgerStore,
    security::{PriceSnapshot, SecurityId},
};

/// Daily trading range that may accompany a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRange {
    pub volume: u64,
    pub high: BigDecimal,
    pub low: BigDecimal,
}

/// A price quote waiting for commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPriceUpdate {
    pub security: SecurityId,
    pub ticker: String,
    pub name: String,
    pub price: BigDecimal,
    pub date: NaiveDate,
    pub range: Option<DailyRange>,
}

impl PendingPriceUpdate {
    pub fn with_range(mut self, range: Option<DailyRange>) -> Self {
        self.range = range;
        self
    }

    /// Writes this quote into the ledger. The live price only moves when the
    /// quote is at least as new as the security's latest snapshot.
    pub fn apply(&self, ledger: &mut dyn LedgerStore) {
        let latest = ledger.latest_snapshot(self.security);

        let mut snapshot = PriceSnapshot::new(self.date, self.price.clone());
        if let Some(range) = self
            .range
            .as_ref()
            .filter(|r| r.high > BigDecimal::zero() && r.low > BigDecimal::zero())
        {
            snapshot.volume = Some(range.volume);
            snapshot.high = Some(range.high.clone());
            snapshot.low = Some(range.low.clone());
        }
        ledger.set_snapshot(self.security, &snapshot);

        if latest.is_none_or(|s| self.date >= s.date) {
            ledger.set_current_price(self.security, &self.price);
        }
    }
}

/// Pending price updates for one import session, at most one per security,
/// kept in the order they were staged.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StagedChangeSet {
    updates: Vec<PendingPriceUpdate>,
    #[serde(skip)]
    staged: HashSet<SecurityId>,
}

impl StagedChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, security: SecurityId) -> bool {
        self.staged.contains(&security)
    }

    /// Stages `update` unless its security already has one; the first
    /// update for a security wins. Returns whether it was staged.
    pub fn add_update(&mut self, update: PendingPriceUpdate) -> bool {
        if !self.staged.insert(update.security) {
            return false;
        }
        self.updates.push(update);
        true
    }

    pub fn is_modified(&self) -> bool {
        !self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn updates(&self) -> &[PendingPriceUpdate] {
        &self.updates
    }

    /// Applies every pending update in staging order, then clears the set.
    pub fn commit(&mut self, ledger: &mut dyn LedgerStore) -> usize {
        let count = self.updates.len();
        for update in &self.updates {
            update.apply(ledger);
        }
        self.forget();
        count
    }

    pub fn forget(&mut self) {
        self.updates.clear();
        self.staged.clear();
    }
}
