use std::io::Write;

use crate::domain::staged::StagedChangeSet;

#[derive(serde::Serialize)]
/// Output row for one pending price update.
///
/// Headers written (in this order): `ticker,security,date,price,volume,high,low`.
/// The daily range columns are empty when the quote has none.
struct OutputRow<'a> {
    ticker: &'a str,
    security: &'a str,
    date: String,
    price: String,
    volume: Option<u64>,
    high: Option<String>,
    low: Option<String>,
}

/// Writes the staged price updates, in staging order, as CSV so they can be
/// reviewed before commit.
///
/// # Errors
///
/// Returns a `csv::Error` if writing/serializing any row fails.
///
/// # Examples
///
/// ```
/// use price_import::domain::staged::StagedChangeSet;
/// use price_import::io::writer::write_pending_updates;
///
/// let mut out = Vec::new();
/// write_pending_updates(&mut out, &StagedChangeSet::new()).unwrap();
///
/// let s = String::from_utf8(out).unwrap();
/// assert_eq!(s, "ticker,security,date,price,volume,high,low\n");
/// ```
pub fn write_pending_updates<W: Write>(
    writer: W,
    staged: &StagedChangeSet,
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    // Written by hand so an empty set still gets a header line.
    wtr.write_record(["ticker", "security", "date", "price", "volume", "high", "low"])?;

    for update in staged.updates() {
        let range = update.range.as_ref();
        let row = OutputRow {
            ticker: &update.ticker,
            security: &update.name,
            date: update.date.to_string(),
            price: update.price.to_plain_string(),
            volume: range.map(|r| r.volume),
            high: range.map(|r| r.high.to_plain_string()),
            low: range.map(|r| r.low.to_plain_string()),
        };
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{
        security::SecurityId,
        staged::{DailyRange, PendingPriceUpdate},
    };

    // Helper: writes staged updates to a Vec<u8> and returns UTF-8 string.
    fn write_to_string(staged: &StagedChangeSet) -> String {
        let mut out = Vec::new();
        write_pending_updates(&mut out, staged).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn update(id: u32, ticker: &str, price: &str) -> PendingPriceUpdate {
        PendingPriceUpdate {
            security: SecurityId(id),
            ticker: ticker.into(),
            name: format!("{ticker} Corp"),
            price: BigDecimal::from_str(price).unwrap(),
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            range: None,
        }
    }

    #[test]
    fn writes_rows_in_staging_order() {
        let mut staged = StagedChangeSet::new();
        staged.add_update(update(2, "MSFT", "400.10"));
        staged.add_update(update(1, "AAPL", "150.000000"));

        let s = write_to_string(&staged);
        let lines: Vec<&str> = s.lines().collect();

        assert_eq!(lines.len(), 3, "expected header + 2 rows");
        assert_eq!(lines[0], "ticker,security,date,price,volume,high,low");
        assert_eq!(lines[1], "MSFT,MSFT Corp,2024-01-05,400.10,,,");
        assert_eq!(lines[2], "AAPL,AAPL Corp,2024-01-05,150.000000,,,");
    }

    #[test]
    fn writes_daily_range_when_present() {
        let mut staged = StagedChangeSet::new();
        staged.add_update(update(1, "AAPL", "150").with_range(Some(DailyRange {
            volume: 1200,
            high: BigDecimal::from_str("151.5").unwrap(),
            low: BigDecimal::from_str("149").unwrap(),
        })));

        let s = write_to_string(&staged);
        assert_eq!(s.lines().nth(1), Some("AAPL,AAPL Corp,2024-01-05,150,1200,151.5,149"));
    }

    #[test]
    fn tiny_prices_are_written_without_exponent() {
        let mut staged = StagedChangeSet::new();
        staged.add_update(update(1, "PENNY", "0.00000012"));

        let s = write_to_string(&staged);
        assert_eq!(s.lines().nth(1), Some("PENNY,PENNY Corp,2024-01-05,0.00000012,,,"));
    }
}
