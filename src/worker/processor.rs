use std::io::Read;

use chrono::NaiveDate;
use tracing::warn;

use crate::{
    common::{error::ImportError, message::ImportMessage},
    config::{ColumnMap, ParseErrorPolicy},
    domain::{ledger::LedgerStore, staged::StagedChangeSet},
    io::{mapper::ColumnMapper, reader::CsvRowReader},
};

/// Everything a row handler may read or add to while processing one row.
/// The ledger is read-only here; writes wait for commit.
pub struct RowContext<'a> {
    pub ledger: &'a dyn LedgerStore,
    pub staged: &'a mut StagedChangeSet,
    pub messages: &'a mut Vec<ImportMessage>,
}

/// Per-format logic for one data row.
pub trait RowHandler {
    /// Reconciles the row against the ledger and returns its effective date.
    fn process_row(
        &self,
        row: &ColumnMapper<'_>,
        ctx: &mut RowContext<'_>,
    ) -> Result<NaiveDate, ImportError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessSummary {
    pub rows: usize,
    pub skipped: usize,
    /// Distinct effective dates in the order first seen.
    pub dates: Vec<NaiveDate>,
}

impl ProcessSummary {
    fn record_date(&mut self, date: NaiveDate) {
        if !self.dates.contains(&date) {
            self.dates.push(date);
        }
    }
}

/// Drives a row handler over every row of a file.
#[derive(Debug)]
pub struct Processor<'a> {
    columns: &'a ColumnMap,
    on_parse_error: ParseErrorPolicy,
}

impl<'a> Processor<'a> {
    pub fn new(columns: &'a ColumnMap, on_parse_error: ParseErrorPolicy) -> Self {
        Self {
            columns,
            on_parse_error,
        }
    }

    /// Stops at the first read failure, column mapping error, or (under
    /// [`ParseErrorPolicy::Abort`]) parse error. Whatever earlier rows staged
    /// stays staged. `summary` is filled in as rows complete, so it is
    /// accurate on the error path too.
    pub fn process<R: Read>(
        &self,
        reader: &mut CsvRowReader<R>,
        handler: &dyn RowHandler,
        ctx: &mut RowContext<'_>,
        summary: &mut ProcessSummary,
    ) -> Result<(), ImportError> {
        let path = reader.path().to_path_buf();

        for row in reader.rows() {
            let row = row?;
            let mapper = ColumnMapper::new(self.columns, &row, &path);

            match handler.process_row(&mapper, ctx) {
                Ok(date) => {
                    summary.rows += 1;
                    summary.record_date(date);
                }
                Err(e) if e.is_parse() && self.on_parse_error == ParseErrorPolicy::SkipRow => {
                    warn!(line = row.line(), error = %e, "skipping row");
                    summary.skipped += 1;
                    ctx.messages.push(ImportMessage::RowSkipped {
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
