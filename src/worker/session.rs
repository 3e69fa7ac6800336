use std::{io::Read, path::Path};

use chrono::NaiveDate;
use tracing::info;

use crate::{
    common::{error::ImportError, message::ImportMessage},
    config::{ImportConfig, ImporterKind},
    domain::{ledger::LedgerStore, staged::StagedChangeSet},
    io::reader::CsvRowReader,
    worker::{
        handlers::{fidelity::FidelityHandler, yahoo::YahooHandler},
        processor::{ProcessSummary, Processor, RowContext, RowHandler},
    },
};

/// One import window's worth of state: the staged price updates awaiting
/// commit and the messages produced by the last action.
pub struct ImportSession {
    config: ImportConfig,
    handler: Box<dyn RowHandler + Send>,
    staged: StagedChangeSet,
    messages: Vec<ImportMessage>,
    dates: Vec<NaiveDate>,
}

impl ImportSession {
    pub fn new(config: ImportConfig) -> Self {
        let handler: Box<dyn RowHandler + Send> = match config.kind {
            ImporterKind::Fidelity => Box::new(FidelityHandler::new(&config.date_format)),
            ImporterKind::Yahoo => Box::new(YahooHandler::new(&config.date_format)),
        };
        Self {
            config,
            handler,
            staged: StagedChangeSet::new(),
            messages: Vec::new(),
            dates: Vec::new(),
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Reads `path` and stages every price it changes.
    ///
    /// Anything staged by an earlier, uncommitted import is discarded first.
    /// On error the rows before the failure stay staged; the ledger itself is
    /// never written here.
    ///
    /// ```no_run
    /// use std::path::Path;
    ///
    /// use price_import::config::ImportConfig;
    /// use price_import::domain::ledger::Ledger;
    /// use price_import::worker::session::ImportSession;
    ///
    /// let ledger = Ledger::new();
    /// let mut session = ImportSession::new(ImportConfig::fidelity());
    /// session.import_file(Path::new("positions.csv"), &ledger)?;
    /// println!("{} price(s) staged", session.staged().len());
    /// # Ok::<(), price_import::common::error::ImportError>(())
    /// ```
    pub fn import_file(
        &mut self,
        path: &Path,
        ledger: &dyn LedgerStore,
    ) -> Result<(), ImportError> {
        self.begin_import(path);
        let mut reader = CsvRowReader::open(path)?;
        self.run(&mut reader, ledger)
    }

    /// Same as [`import_file`](Self::import_file) for an already open source.
    pub fn import_reader<R: Read>(
        &mut self,
        reader: &mut CsvRowReader<R>,
        ledger: &dyn LedgerStore,
    ) -> Result<(), ImportError> {
        self.begin_import(reader.path());
        self.run(reader, ledger)
    }

    fn begin_import(&mut self, path: &Path) {
        self.messages.clear();
        self.forget_changes();

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        info!(importer = self.config.kind.name(), file = %path.display(), "importing prices");
        self.messages.push(ImportMessage::ImportingFile { file_name });
    }

    fn run<R: Read>(
        &mut self,
        reader: &mut CsvRowReader<R>,
        ledger: &dyn LedgerStore,
    ) -> Result<(), ImportError> {
        let mut summary = ProcessSummary::default();
        let mut ctx = RowContext {
            ledger,
            staged: &mut self.staged,
            messages: &mut self.messages,
        };
        let processor = Processor::new(&self.config.columns, self.config.on_parse_error);
        let result = processor.process(reader, self.handler.as_ref(), &mut ctx, &mut summary);

        self.dates = summary.dates;
        result?;

        info!(
            rows = summary.rows,
            skipped = summary.skipped,
            staged = self.staged.len(),
            "import finished"
        );
        if !self.dates.is_empty() {
            self.messages.push(ImportMessage::EffectiveDates {
                dates: self.dates.clone(),
            });
        }
        if !self.staged.is_modified() {
            self.messages.push(ImportMessage::NoNewPriceData);
        }
        Ok(())
    }

    /// Writes every staged update to `ledger` in staging order and reports
    /// how many there were.
    pub fn commit_changes(&mut self, ledger: &mut dyn LedgerStore) -> usize {
        let count = self.staged.commit(ledger);
        self.dates.clear();
        info!(count, "committed price changes");
        self.messages.push(ImportMessage::PricesChanged { count });
        count
    }

    pub fn forget_changes(&mut self) {
        self.staged.forget();
        self.dates.clear();
    }

    pub fn is_modified(&self) -> bool {
        self.staged.is_modified()
    }

    pub fn staged(&self) -> &StagedChangeSet {
        &self.staged
    }

    pub fn messages(&self) -> &[ImportMessage] {
        &self.messages
    }

    pub fn take_messages(&mut self) -> Vec<ImportMessage> {
        std::mem::take(&mut self.messages)
    }

    /// Distinct effective dates of the last import, in the order first seen.
    pub fn effective_dates(&self) -> &[NaiveDate] {
        &self.dates
    }
}
