use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::{
    common::{error::ImportError, message::ImportMessage, money::derive_price},
    config::Field,
    io::mapper::ColumnMapper,
    worker::{
        processor::{RowContext, RowHandler},
        reconciler::reconcile_price,
        verifier::{verify_account_balance, verify_share_balance},
    },
};

/// One position line of a workplace account export.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRow {
    pub account_number: String,
    pub ticker: String,
    pub security_name: String,
    pub shares: BigDecimal,
    pub price: BigDecimal,
    /// Market value of the position.
    pub balance: BigDecimal,
    pub effective_date: NaiveDate,
}

impl ImportedRow {
    pub fn read(row: &ColumnMapper<'_>, date_format: &str) -> Result<Self, ImportError> {
        Ok(Self {
            account_number: row.resolve(Field::AccountNumber)?.to_string(),
            ticker: row.resolve(Field::Ticker)?.to_string(),
            security_name: row.resolve(Field::Name)?.to_string(),
            shares: row.decimal(Field::Shares)?,
            price: row.decimal(Field::Price)?,
            balance: row.decimal(Field::Value)?,
            effective_date: row.date(Field::Date, date_format)?,
        })
    }
}

/// Workplace positions: prices are reconciled and both share and cash
/// balances are checked.
#[derive(Debug, Clone)]
pub struct FidelityHandler {
    date_format: String,
}

impl FidelityHandler {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl RowHandler for FidelityHandler {
    fn process_row(
        &self,
        row: &ColumnMapper<'_>,
        ctx: &mut RowContext<'_>,
    ) -> Result<NaiveDate, ImportError> {
        let imp = ImportedRow::read(row, &self.date_format)?;

        let account = ctx.ledger.investment_account(&imp.account_number);
        if account.is_none() {
            ctx.messages.push(ImportMessage::UnknownInvestmentAccount {
                number: imp.account_number.clone(),
            });
        }

        match ctx.ledger.security_by_ticker(&imp.ticker) {
            None => {
                if let Some(account) = &account {
                    verify_account_balance(
                        ctx,
                        account,
                        &imp.balance,
                        &imp.ticker,
                        &imp.security_name,
                    );
                }
            }
            Some(security) => {
                let price = derive_price(&imp.shares, &imp.price, &imp.balance);
                if let Some(update) = reconcile_price(ctx, &security, price, imp.effective_date) {
                    ctx.staged.add_update(update);
                }
                if let Some(account) = &account {
                    verify_share_balance(ctx, account, &security, &imp.shares);
                }
            }
        }

        Ok(imp.effective_date)
    }
}

#[cfg(test)]
mod tests {
    use std::{path::Path, str::FromStr, sync::Arc};

    use super::*;
    use crate::{
        config::ImportConfig,
        domain::{
            ledger::{Ledger, LedgerStore},
            security::PriceSnapshot,
            staged::StagedChangeSet,
        },
        io::reader::CsvRow,
    };

    const HEADERS: [&str; 7] = [
        "Account Number",
        "Symbol",
        "Description",
        "Shares",
        "Price",
        "Value",
        "Effective Date",
    ];

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn csv_row(values: &[&str]) -> CsvRow {
        let headers: Arc<[String]> = HEADERS.iter().map(|h| h.to_string()).collect();
        CsvRow::new(headers, values.iter().map(|v| v.to_string()).collect(), 2)
    }

    // Helper: push one row through the handler.
    fn handle(
        ledger: &Ledger,
        staged: &mut StagedChangeSet,
        values: &[&str],
    ) -> (Result<NaiveDate, ImportError>, Vec<ImportMessage>) {
        let config = ImportConfig::fidelity();
        let row = csv_row(values);
        let mapper = ColumnMapper::new(&config.columns, &row, Path::new("fw.csv"));
        let mut messages = Vec::new();
        let mut ctx = RowContext {
            ledger,
            staged,
            messages: &mut messages,
        };
        let result = FidelityHandler::new(&config.date_format).process_row(&mapper, &mut ctx);
        (result, messages)
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let acct = ledger.add_investment_account("401k", "12345");
        ledger.add_sub_account(acct, "Apple Inc", dec("100"));
        ledger.add_security("AAPL", "Apple Inc");
        ledger
    }

    #[test]
    fn reads_typed_row() {
        let config = ImportConfig::fidelity();
        let row = csv_row(&[
            "12345",
            "\"AAPL\"",
            "Apple Inc",
            "100",
            "150.00",
            "15000.00",
            "2024-01-05",
        ]);
        let mapper = ColumnMapper::new(&config.columns, &row, Path::new("fw.csv"));

        let imp = ImportedRow::read(&mapper, &config.date_format).unwrap();

        assert_eq!(imp.ticker, "AAPL");
        assert_eq!(imp.shares, dec("100"));
        assert_eq!(imp.balance, dec("15000.00"));
        assert_eq!(imp.effective_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn stages_derived_price_and_checks_shares() {
        let ledger = ledger();
        let mut staged = StagedChangeSet::new();

        let (result, messages) = handle(
            &ledger,
            &mut staged,
            &["12345", "AAPL", "Apple Inc", "100", "150.003", "15000.00", "2024-01-05"],
        );

        assert!(result.is_ok());
        assert_eq!(staged.len(), 1);
        assert_eq!(staged.updates()[0].price, dec("150"));
        assert_eq!(messages.len(), 1, "shares match, only the price change: {messages:?}");
    }

    #[test]
    fn unknown_ticker_checks_account_balance_only() {
        let mut ledger = ledger();
        let acct = ledger.investment_account("12345").unwrap().id;
        ledger.account_mut(acct).unwrap().balance = dec("500.00");
        let mut staged = StagedChangeSet::new();

        let (result, messages) = handle(
            &ledger,
            &mut staged,
            &["12345", "ZZZZ", "Mystery Fund", "10", "55.00", "550.00", "2024-01-05"],
        );

        assert!(result.is_ok());
        assert!(!staged.is_modified());
        assert!(matches!(messages.as_slice(), [ImportMessage::BalanceMismatch { .. }]));
    }

    #[test]
    fn unknown_account_is_reported_but_price_still_staged() {
        let ledger = ledger();
        let mut staged = StagedChangeSet::new();

        let (_, messages) = handle(
            &ledger,
            &mut staged,
            &["99999", "AAPL", "Apple Inc", "100", "150.00", "15000.00", "2024-01-05"],
        );

        assert!(matches!(
            messages.as_slice(),
            [ImportMessage::UnknownInvestmentAccount { .. }, ImportMessage::PriceChange { .. }]
        ));
        assert!(staged.is_modified());
    }

    #[test]
    fn unchanged_price_stages_nothing() {
        let mut ledger = ledger();
        let id = ledger.security_by_ticker("AAPL").unwrap().id;
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        ledger.set_snapshot(id, &PriceSnapshot::new(date, dec("150")));
        let mut staged = StagedChangeSet::new();

        let (_, messages) = handle(
            &ledger,
            &mut staged,
            &["12345", "AAPL", "Apple Inc", "100", "150.00", "15000.00", "2024-01-05"],
        );

        assert!(!staged.is_modified());
        assert!(messages.is_empty());
    }

    #[test]
    fn malformed_shares_is_a_parse_error() {
        let ledger = ledger();
        let mut staged = StagedChangeSet::new();

        let (result, _) = handle(
            &ledger,
            &mut staged,
            &["12345", "AAPL", "Apple Inc", "lots", "150.00", "15000.00", "2024-01-05"],
        );

        assert!(matches!(result, Err(ImportError::Parse { field: "col.shares", .. })));
    }
}
