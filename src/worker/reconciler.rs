use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing::debug;

use crate::{
    common::message::ImportMessage,
    domain::{
        security::{PriceSnapshot, SecurityInfo},
        staged::PendingPriceUpdate,
    },
    worker::processor::RowContext,
};

/// Decides whether `price` on `date` is news for `security`.
///
/// The baseline is the snapshot in effect on `date`. A quote is staged when
/// the security has nothing pending yet this session and the baseline is
/// missing, dated differently, or priced differently. A staged quote is
/// announced with a price change message and returned for the caller to stage.
pub fn reconcile_price(
    ctx: &mut RowContext<'_>,
    security: &SecurityInfo,
    price: BigDecimal,
    date: NaiveDate,
) -> Option<PendingPriceUpdate> {
    let baseline = ctx.ledger.snapshot_for_date(security.id, date);
    if let Some(snapshot) = &baseline {
        validate_current_price(ctx, security, snapshot);
    }

    if ctx.staged.contains(security.id) {
        return None;
    }
    let unchanged = baseline
        .as_ref()
        .is_some_and(|s| s.date == date && s.price == price);
    if unchanged {
        return None;
    }

    let old = baseline.map(|s| s.price);
    debug!(ticker = %security.ticker, old = ?old, new = %price, %date, "price change");
    ctx.messages.push(ImportMessage::PriceChange {
        security: security.name.clone(),
        ticker: security.ticker.clone(),
        old,
        new: price.clone(),
    });

    Some(PendingPriceUpdate {
        security: security.id,
        ticker: security.ticker.clone(),
        name: security.name.clone(),
        price,
        date,
        range: None,
    })
}

/// The live price should agree with the latest snapshot; say so when it
/// does not. Older snapshots are not checked.
fn validate_current_price(
    ctx: &mut RowContext<'_>,
    security: &SecurityInfo,
    snapshot: &PriceSnapshot,
) {
    let is_latest = ctx
        .ledger
        .latest_snapshot(security.id)
        .is_some_and(|latest| latest.date == snapshot.date);
    if !is_latest {
        return;
    }
    if let Some(current) = ctx.ledger.current_price(security.id) {
        if current != snapshot.price {
            ctx.messages.push(ImportMessage::CurrentPriceMismatch {
                security: security.name.clone(),
                ticker: security.ticker.clone(),
                current,
                snapshot: snapshot.price.clone(),
                date: snapshot.date,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::domain::{
        ledger::{Ledger, LedgerStore},
        staged::StagedChangeSet,
    };

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // Helper: a ledger holding AAPL with the given snapshots and live price.
    fn ledger_with(prices: &[(NaiveDate, &str)], current: Option<&str>) -> (Ledger, SecurityInfo) {
        let mut ledger = Ledger::new();
        let id = ledger.add_security("AAPL", "Apple Inc");
        for (date, price) in prices {
            ledger.set_snapshot(id, &PriceSnapshot::new(*date, dec(price)));
        }
        if let Some(price) = current {
            ledger.set_current_price(id, &dec(price));
        }
        let info = ledger.security_by_ticker("AAPL").unwrap();
        (ledger, info)
    }

    // Helper: reconcile one quote, returning what would be staged and the log.
    fn reconcile(
        ledger: &Ledger,
        staged: &mut StagedChangeSet,
        security: &SecurityInfo,
        price: &str,
        date: NaiveDate,
    ) -> (Option<PendingPriceUpdate>, Vec<ImportMessage>) {
        let mut messages = Vec::new();
        let mut ctx = RowContext {
            ledger,
            staged,
            messages: &mut messages,
        };
        let update = reconcile_price(&mut ctx, security, dec(price), date);
        (update, messages)
    }

    #[test]
    fn stages_when_no_snapshot_exists() {
        let (ledger, sec) = ledger_with(&[], None);
        let mut staged = StagedChangeSet::new();

        let (update, messages) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));

        let update = update.expect("should stage");
        assert_eq!(update.price, dec("150.00"));
        assert_eq!(update.date, ymd(2024, 1, 5));
        assert!(matches!(
            messages.as_slice(),
            [ImportMessage::PriceChange { old: None, .. }]
        ));
    }

    #[test]
    fn skips_when_same_date_and_price() {
        let (ledger, sec) = ledger_with(&[(ymd(2024, 1, 5), "150.00")], Some("150.00"));
        let mut staged = StagedChangeSet::new();

        let (update, messages) =
            reconcile(&ledger, &mut staged, &sec, "150.000000", ymd(2024, 1, 5));

        assert!(update.is_none());
        assert!(messages.is_empty());
    }

    #[test]
    fn stages_when_price_differs() {
        let (ledger, sec) = ledger_with(&[(ymd(2024, 1, 5), "149.50")], Some("149.50"));
        let mut staged = StagedChangeSet::new();

        let (update, messages) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));

        assert!(update.is_some());
        match messages.as_slice() {
            [ImportMessage::PriceChange { old: Some(old), new, .. }] => {
                assert_eq!(old, &dec("149.50"));
                assert_eq!(new, &dec("150.00"));
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }

    #[test]
    fn prior_snapshot_is_baseline_for_a_new_date() {
        let (ledger, sec) = ledger_with(&[(ymd(2024, 1, 4), "150.00")], Some("150.00"));
        let mut staged = StagedChangeSet::new();

        // same price, but dated the day before: still news for the 5th
        let (update, messages) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));

        assert!(update.is_some());
        assert_eq!(messages[0].direction(), Some(crate::common::message::ChangeDirection::Flat));
    }

    #[test]
    fn already_pending_security_is_suppressed() {
        let (ledger, sec) = ledger_with(&[], None);
        let mut staged = StagedChangeSet::new();
        let (first, _) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));
        staged.add_update(first.unwrap());

        let (second, messages) = reconcile(&ledger, &mut staged, &sec, "155.00", ymd(2024, 1, 6));

        assert!(second.is_none());
        assert!(messages.is_empty());
    }

    #[test]
    fn reports_live_price_out_of_step_with_latest_snapshot() {
        let (ledger, sec) = ledger_with(&[(ymd(2024, 1, 5), "150.00")], Some("151.00"));
        let mut staged = StagedChangeSet::new();

        let (update, messages) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));

        assert!(update.is_none());
        assert!(matches!(
            messages.as_slice(),
            [ImportMessage::CurrentPriceMismatch { .. }]
        ));
    }

    #[test]
    fn older_snapshots_are_not_validated() {
        let (ledger, sec) = ledger_with(
            &[(ymd(2024, 1, 5), "150.00"), (ymd(2024, 2, 1), "170.00")],
            Some("170.00"),
        );
        let mut staged = StagedChangeSet::new();

        let (_, messages) = reconcile(&ledger, &mut staged, &sec, "150.00", ymd(2024, 1, 5));

        assert!(messages.is_empty());
    }
}
