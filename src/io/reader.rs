use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::common::error::ImportError;

/// One data line of an import file, addressed by header name.
#[derive(Debug, Clone)]
pub struct CsvRow {
    headers: Arc<[String]>,
    values: Vec<String>,
    line: u64,
}

impl CsvRow {
    /// Pairs `values` with `headers`. Missing trailing values read as empty
    /// strings and values beyond the last header are dropped.
    pub fn new(headers: Arc<[String]>, mut values: Vec<String>, line: u64) -> Self {
        values.resize(headers.len(), String::new());
        Self {
            headers,
            values,
            line,
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| self.values[i].as_str())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 1-based line number in the source file.
    pub fn line(&self) -> u64 {
        self.line
    }
}

/// Reads a comma separated file whose first line names the columns.
///
/// Fields are split on every comma; double quotes are left in place for
/// the column mapper to strip.
///
/// # Examples
///
/// ```
/// use price_import::io::reader::CsvRowReader;
///
/// let data = "Symbol,Price\nAAPL,150.00\nMSFT\n";
/// let mut reader = CsvRowReader::from_reader(data.as_bytes(), "quotes.csv");
/// let rows: Vec<_> = reader.rows().collect::<Result<_, _>>().unwrap();
///
/// assert_eq!(rows[0].get("Price"), Some("150.00"));
/// assert_eq!(rows[1].get("Price"), Some(""));
/// ```
pub struct CsvRowReader<R> {
    reader: csv::Reader<R>,
    path: PathBuf,
}

impl CsvRowReader<File> {
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let file = File::open(path).map_err(|source| ImportError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file, path))
    }
}

impl<R: Read> CsvRowReader<R> {
    pub fn from_reader(rdr: R, path: impl Into<PathBuf>) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(rdr);
        Self {
            reader,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Yields the data rows. A read failure ends the file: it is yielded
    /// once and nothing follows it.
    pub fn rows(&mut self) -> impl Iterator<Item = Result<CsvRow, ImportError>> + '_ {
        let path = self.path.clone();
        let mut records = self.reader.records();
        let mut headers: Option<Arc<[String]>> = None;
        let mut failed = false;

        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            loop {
                let record = match records.next()? {
                    Ok(record) => record,
                    Err(source) => {
                        failed = true;
                        return Some(Err(ImportError::Read {
                            path: path.clone(),
                            source,
                        }));
                    }
                };
                let line = record.position().map_or(0, |p| p.line());
                let fields: Vec<String> = record.iter().map(str::to_string).collect();

                match &headers {
                    None => headers = Some(fields.into()),
                    Some(h) => return Some(Ok(CsvRow::new(Arc::clone(h), fields, line))),
                }
            }
        })
    }
}
