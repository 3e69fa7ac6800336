use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("an import or commit is already in progress")]
    Busy,
    #[error("failed to open input file {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed reading from file {}: {source}", .path.display())]
    Read { path: PathBuf, source: csv::Error },
    #[error("no csv column configured for {0}")]
    UnmappedField(&'static str),
    #[error("unable to locate column {column} ({key}) in {}; found columns {found:?}", .path.display())]
    MissingColumn {
        column: String,
        key: &'static str,
        path: PathBuf,
        found: Vec<String>,
    },
    #[error("invalid {field} [{value}] on line {line}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        line: u64,
        reason: String,
    },
    #[error("config error: {0}")]
    Config(String),
}

impl ImportError {
    /// Row-level parse failures are the only errors a `SkipRow` policy may
    /// swallow; everything else stops the file.
    pub fn is_parse(&self) -> bool {
        matches!(self, ImportError::Parse { .. })
    }
}
