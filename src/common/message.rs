use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use num_format::Locale;

use crate::common::{
    date::display_date,
    format::{format_price, format_quantity},
    money::percent_change,
};

/// Which way a price moved, so a host can color the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Flat,
}

impl ChangeDirection {
    pub fn between(old: Option<&BigDecimal>, new: &BigDecimal) -> Self {
        match old.map(|old| new.cmp(old)) {
            Some(std::cmp::Ordering::Greater) => ChangeDirection::Increase,
            Some(std::cmp::Ordering::Less) => ChangeDirection::Decrease,
            _ => ChangeDirection::Flat,
        }
    }
}

/// One line of user-visible import output.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportMessage {
    ImportingFile {
        file_name: String,
    },
    UnknownInvestmentAccount {
        number: String,
    },
    PriceChange {
        security: String,
        ticker: String,
        old: Option<BigDecimal>,
        new: BigDecimal,
    },
    CurrentPriceMismatch {
        security: String,
        ticker: String,
        current: BigDecimal,
        snapshot: BigDecimal,
        date: NaiveDate,
    },
    /// Ticker has no security; the row's value was checked against the account.
    BalanceMismatch {
        account: String,
        have: BigDecimal,
        imported: BigDecimal,
        ticker: String,
        security_name: String,
    },
    ShareBalanceMismatch {
        sub_account: String,
        ticker: String,
        account: String,
        have: BigDecimal,
        imported: BigDecimal,
    },
    MissingSecurityAccount {
        security: String,
        ticker: String,
        account: String,
    },
    BadQuoteData {
        volume: String,
        high: String,
        low: String,
        reason: String,
    },
    RowSkipped {
        reason: String,
    },
    EffectiveDates {
        dates: Vec<NaiveDate>,
    },
    NoNewPriceData,
    PricesChanged {
        count: usize,
    },
    Failure {
        reason: String,
    },
}

impl ImportMessage {
    /// Direction for price change lines, `None` for everything else.
    pub fn direction(&self) -> Option<ChangeDirection> {
        match self {
            ImportMessage::PriceChange { old, new, .. } => {
                Some(ChangeDirection::between(old.as_ref(), new))
            }
            _ => None,
        }
    }

    pub fn render(&self, locale: &Locale) -> String {
        match self {
            ImportMessage::ImportingFile { file_name } => {
                format!("Importing price data from file {file_name}")
            }
            ImportMessage::UnknownInvestmentAccount { number } => {
                format!("Unable to obtain investment account with number [{number}]")
            }
            ImportMessage::PriceChange {
                security,
                ticker,
                old: Some(old),
                new,
            } => {
                let change = percent_change(old, new)
                    .map(|pct| format!(" ({pct:+.2}%)"))
                    .unwrap_or_default();
                format!(
                    "Change {security} ({ticker}) price from {} to {}{change}",
                    format_price(old, &[new], locale),
                    format_price(new, &[old], locale),
                )
            }
            ImportMessage::PriceChange {
                security,
                ticker,
                old: None,
                new,
            } => format!(
                "Set {security} ({ticker}) price to {} (no previous price)",
                format_price(new, &[], locale),
            ),
            ImportMessage::CurrentPriceMismatch {
                security,
                ticker,
                current,
                snapshot,
                date,
            } => format!(
                "Found current price {} for {security} ({ticker}) that differs from the latest price {} on {}",
                format_price(current, &[snapshot], locale),
                format_price(snapshot, &[current], locale),
                display_date(*date),
            ),
            ImportMessage::BalanceMismatch {
                account,
                have,
                imported,
                ticker,
                security_name,
            } => format!(
                "Found a different balance in account {account}: have {}, imported {}; \
                 Note: No security for ticker symbol [{ticker}] ({security_name})",
                format_price(have, &[imported], locale),
                format_price(imported, &[have], locale),
            ),
            ImportMessage::ShareBalanceMismatch {
                sub_account,
                ticker,
                account,
                have,
                imported,
            } => format!(
                "Found a different {sub_account} ({ticker}) share balance in account {account}: have {}, imported {}",
                format_quantity(have, &[imported], locale),
                format_quantity(imported, &[have], locale),
            ),
            ImportMessage::MissingSecurityAccount {
                security,
                ticker,
                account,
            } => format!("Unable to obtain security [{security} ({ticker})] in account {account}"),
            ImportMessage::BadQuoteData {
                volume,
                high,
                low,
                reason,
            } => format!(
                "Exception parsing quote data (volume [{volume}], high [{high}], low [{low}]): {reason}"
            ),
            ImportMessage::RowSkipped { reason } => format!("Skipped row: {reason}"),
            ImportMessage::EffectiveDates { dates } => format!(
                "Found effective date{} {}",
                if dates.len() == 1 { "" } else { "s" },
                dates
                    .iter()
                    .map(|d| display_date(*d))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            ImportMessage::NoNewPriceData => "No new price data found".to_string(),
            ImportMessage::PricesChanged { count } => format!(
                "Changed {count} security price{}",
                if *count == 1 { "" } else { "s" }
            ),
            ImportMessage::Failure { reason } => reason.clone(),
        }
    }
}
