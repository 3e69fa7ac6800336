use std::{fmt::Display, path::Path, str::FromStr};

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};

use crate::{
    common::{
        date::{LEDGER_YEARS, parse_date},
        error::ImportError,
        money::parse_decimal,
    },
    config::{ColumnMap, Field},
    io::reader::CsvRow,
};

/// Reads logical fields out of the current row through the column map.
pub struct ColumnMapper<'a> {
    columns: &'a ColumnMap,
    row: &'a CsvRow,
    path: &'a Path,
}

impl<'a> ColumnMapper<'a> {
    pub fn new(columns: &'a ColumnMap, row: &'a CsvRow, path: &'a Path) -> Self {
        Self { columns, row, path }
    }

    pub fn line(&self) -> u64 {
        self.row.line()
    }

    /// The field's value with one pair of surrounding double quotes removed
    /// and whitespace trimmed. A configured column that the file lacks means
    /// the mapping is wrong for the whole file.
    pub fn resolve(&self, field: Field) -> Result<&'a str, ImportError> {
        let column = self
            .columns
            .header(field)
            .ok_or(ImportError::UnmappedField(field.key()))?;
        let value = self
            .row
            .get(column)
            .ok_or_else(|| ImportError::MissingColumn {
                column: column.to_string(),
                key: field.key(),
                path: self.path.to_path_buf(),
                found: self.row.headers().to_vec(),
            })?;
        Ok(strip_quotes(value).trim())
    }

    /// Like [`resolve`](Self::resolve), but `None` when the field has no
    /// configured column.
    pub fn resolve_optional(&self, field: Field) -> Result<Option<&'a str>, ImportError> {
        if self.columns.header(field).is_none() {
            return Ok(None);
        }
        self.resolve(field).map(Some)
    }

    pub fn decimal(&self, field: Field) -> Result<BigDecimal, ImportError> {
        let raw = self.resolve(field)?;
        parse_decimal(raw).map_err(|e| self.parse_error(field, raw, e))
    }

    /// Dates outside the ledger's year range are parse errors too.
    pub fn date(&self, field: Field, format: &str) -> Result<NaiveDate, ImportError> {
        let raw = self.resolve(field)?;
        let date = parse_date(raw, format).map_err(|e| self.parse_error(field, raw, e))?;
        if !LEDGER_YEARS.contains(&date.year()) {
            return Err(self.parse_error(field, raw, "year out of range 1..=9999"));
        }
        Ok(date)
    }

    pub fn parse<T>(&self, field: Field, raw: &str) -> Result<T, ImportError>
    where
        T: FromStr,
        T::Err: Display,
    {
        raw.parse().map_err(|e| self.parse_error(field, raw, e))
    }

    fn parse_error(&self, field: Field, raw: &str, reason: impl Display) -> ImportError {
        ImportError::Parse {
            field: field.key(),
            value: raw.to_string(),
            line: self.row.line(),
            reason: reason.to_string(),
        }
    }
}

/// Removes a leading and trailing double quote when both are present.
pub fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
