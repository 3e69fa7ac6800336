use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::common::{
    date::{ISO_DATE_FORMAT, MARKET_DATE_FORMAT},
    error::ImportError,
};

/// A logical value the importers read from each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AccountNumber,
    Ticker,
    Name,
    Shares,
    Price,
    Value,
    Date,
    High,
    Low,
    Volume,
}

impl Field {
    /// Key under which the field's csv header is configured.
    pub fn key(self) -> &'static str {
        match self {
            Field::AccountNumber => "col.account.num",
            Field::Ticker => "col.ticker",
            Field::Name => "col.name",
            Field::Shares => "col.shares",
            Field::Price => "col.price",
            Field::Value => "col.value",
            Field::Date => "col.date",
            Field::High => "col.high",
            Field::Low => "col.low",
            Field::Volume => "col.vol",
        }
    }
}

/// Maps configuration keys such as `col.ticker` to csv header names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMap(HashMap<String, String>);

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, header: impl Into<String>) {
        self.0.insert(field.key().to_string(), header.into());
    }

    pub fn header(&self, field: Field) -> Option<&str> {
        self.0.get(field.key()).map(String::as_str)
    }

    /// Entries in `other` replace ours.
    pub fn merge(&mut self, other: ColumnMap) {
        self.0.extend(other.0);
    }

    /// Reads `key=value` lines. Blank lines and lines starting with `#` or
    /// `!` are ignored; `:` is accepted in place of `=`.
    ///
    /// # Examples
    /// ```
    /// use price_import::config::{ColumnMap, Field};
    ///
    /// let map = ColumnMap::from_properties("# fidelity\ncol.ticker=Symbol\n").unwrap();
    /// assert_eq!(map.header(Field::Ticker), Some("Symbol"));
    /// ```
    pub fn from_properties(text: &str) -> Result<Self, ImportError> {
        let mut map = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let (key, value) = line.split_once(['=', ':']).ok_or_else(|| {
                ImportError::Config(format!(
                    "line {}: expected key=value, got [{line}]",
                    idx + 1
                ))
            })?;
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
        Ok(Self(map))
    }
}

/// The export formats this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImporterKind {
    /// Workplace retirement account positions: balances and prices.
    Fidelity,
    /// Quote downloads: prices with an optional daily range.
    Yahoo,
}

impl ImporterKind {
    pub fn name(self) -> &'static str {
        match self {
            ImporterKind::Fidelity => "FW Import",
            ImporterKind::Yahoo => "YQ Import",
        }
    }

    pub fn default_columns(self) -> ColumnMap {
        let mut map = ColumnMap::new();
        match self {
            ImporterKind::Fidelity => {
                map.set(Field::AccountNumber, "Account Number");
                map.set(Field::Ticker, "Symbol");
                map.set(Field::Name, "Description");
                map.set(Field::Shares, "Shares");
                map.set(Field::Price, "Price");
                map.set(Field::Value, "Value");
                map.set(Field::Date, "Effective Date");
            }
            ImporterKind::Yahoo => {
                map.set(Field::Ticker, "Symbol");
                map.set(Field::Price, "Current Price");
                map.set(Field::Date, "Date");
                map.set(Field::High, "High");
                map.set(Field::Low, "Low");
                map.set(Field::Volume, "Volume");
            }
        }
        map
    }

    pub fn default_date_format(self) -> &'static str {
        match self {
            ImporterKind::Fidelity => ISO_DATE_FORMAT,
            ImporterKind::Yahoo => MARKET_DATE_FORMAT,
        }
    }
}

/// What to do with a row whose number or date cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorPolicy {
    /// Stop processing the rest of the file.
    #[default]
    Abort,
    /// Log the row and carry on with the next one.
    SkipRow,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub kind: ImporterKind,
    pub columns: ColumnMap,
    /// chrono format string for the date column.
    pub date_format: String,
    pub on_parse_error: ParseErrorPolicy,
}

#[derive(Deserialize)]
struct RawConfig {
    kind: ImporterKind,
    #[serde(default)]
    columns: ColumnMap,
    date_format: Option<String>,
    #[serde(default)]
    on_parse_error: ParseErrorPolicy,
}

impl ImportConfig {
    pub fn new(kind: ImporterKind) -> Self {
        Self {
            kind,
            columns: kind.default_columns(),
            date_format: kind.default_date_format().to_string(),
            on_parse_error: ParseErrorPolicy::default(),
        }
    }

    pub fn fidelity() -> Self {
        Self::new(ImporterKind::Fidelity)
    }

    pub fn yahoo() -> Self {
        Self::new(ImporterKind::Yahoo)
    }

    pub fn with_parse_error_policy(mut self, policy: ParseErrorPolicy) -> Self {
        self.on_parse_error = policy;
        self
    }

    /// Loads a TOML config; anything left out falls back to the kind's
    /// defaults.
    ///
    /// ```toml
    /// kind = "fidelity"
    /// on_parse_error = "skip_row"
    ///
    /// [columns]
    /// "col.value" = "Current Value"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ImportError> {
        let raw: RawConfig =
            toml::from_str(text).map_err(|e| ImportError::Config(e.to_string()))?;

        let mut config = Self::new(raw.kind);
        config.columns.merge(raw.columns);
        if let Some(format) = raw.date_format {
            config.date_format = format;
        }
        config.on_parse_error = raw.on_parse_error;
        Ok(config)
    }
}
