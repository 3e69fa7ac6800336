use chrono::NaiveDate;
use tracing::info;

use crate::{
    common::{error::ImportError, message::ImportMessage, money::parse_decimal},
    config::Field,
    domain::staged::DailyRange,
    io::mapper::ColumnMapper,
    worker::{
        processor::{RowContext, RowHandler},
        reconciler::reconcile_price,
    },
};

/// Daily quote files: price only, plus the day's range when present.
#[derive(Debug, Clone)]
pub struct YahooHandler {
    date_format: String,
}

impl YahooHandler {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl RowHandler for YahooHandler {
    fn process_row(
        &self,
        row: &ColumnMapper<'_>,
        ctx: &mut RowContext<'_>,
    ) -> Result<NaiveDate, ImportError> {
        let ticker = row.resolve(Field::Ticker)?;
        let date = row.date(Field::Date, &self.date_format)?;

        let Some(security) = ctx.ledger.security_by_ticker(ticker) else {
            info!(ticker, line = row.line(), "no security for ticker");
            return Ok(date);
        };

        let price = row.decimal(Field::Price)?;
        if let Some(update) = reconcile_price(ctx, &security, price, date) {
            let range = daily_range(row, ctx)?;
            ctx.staged.add_update(update.with_range(range));
        }
        Ok(date)
    }
}

/// The row's volume, high and low, if all three are present.
///
/// Malformed values are reported and dropped; the quote itself still stands.
fn daily_range(
    row: &ColumnMapper<'_>,
    ctx: &mut RowContext<'_>,
) -> Result<Option<DailyRange>, ImportError> {
    let (Some(volume), Some(high), Some(low)) = (
        row.resolve_optional(Field::Volume)?,
        row.resolve_optional(Field::High)?,
        row.resolve_optional(Field::Low)?,
    ) else {
        return Ok(None);
    };
    if volume.is_empty() || high.is_empty() || low.is_empty() {
        return Ok(None);
    }

    let parsed = volume
        .parse::<u64>()
        .map_err(|e| e.to_string())
        .and_then(|volume| {
            let high = parse_decimal(high).map_err(|e| e.to_string())?;
            let low = parse_decimal(low).map_err(|e| e.to_string())?;
            Ok(DailyRange { volume, high, low })
        });

    match parsed {
        Ok(range) => Ok(Some(range)),
        Err(reason) => {
            ctx.messages.push(ImportMessage::BadQuoteData {
                volume: volume.to_string(),
                high: high.to_string(),
                low: low.to_string(),
                reason,
            });
            Ok(None)
        }
    }
}
