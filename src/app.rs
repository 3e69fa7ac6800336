use std::path::PathBuf;

use num_format::Locale;
use parking_lot::Mutex;
use tracing::error;

use crate::{
    common::{error::ImportError, message::ImportMessage},
    config::ImportConfig,
    domain::ledger::LedgerStore,
    worker::session::ImportSession,
};

/// What the importer needs from the window hosting it.
pub trait ImportWindow {
    fn file_to_import(&self) -> PathBuf;
    fn add_text(&mut self, message: &ImportMessage);
    fn clear_text(&mut self);
    fn enable_commit_button(&mut self, enabled: bool);
    fn locale(&self) -> Locale;
}

struct State<L, W> {
    session: ImportSession,
    ledger: L,
    window: W,
}

impl<L: LedgerStore, W: ImportWindow> State<L, W> {
    fn flush_messages(&mut self) {
        for message in self.session.take_messages() {
            self.window.add_text(&message);
        }
    }
}

/// The import and commit actions behind a window's buttons.
///
/// Only one action runs at a time. A call made while another is in flight
/// fails with [`ImportError::Busy`] instead of waiting.
pub struct PriceImporter<L, W> {
    state: Mutex<State<L, W>>,
}

impl<L: LedgerStore, W: ImportWindow> PriceImporter<L, W> {
    pub fn new(config: ImportConfig, ledger: L, window: W) -> Self {
        Self {
            state: Mutex::new(State {
                session: ImportSession::new(config),
                ledger,
                window,
            }),
        }
    }

    /// Imports the window's chosen file and enables commit if anything was
    /// staged. Failures are also written to the window.
    pub fn import_file(&self) -> Result<(), ImportError> {
        let mut guard = self.state.try_lock().ok_or(ImportError::Busy)?;
        let state = &mut *guard;

        state.window.clear_text();
        let path = state.window.file_to_import();
        let result = state.session.import_file(&path, &state.ledger);
        state.flush_messages();

        match result {
            Ok(()) => {
                let modified = state.session.is_modified();
                state.window.enable_commit_button(modified);
                Ok(())
            }
            Err(e) => {
                error!(file = %path.display(), error = %e, "import failed");
                state.window.add_text(&ImportMessage::Failure {
                    reason: e.to_string(),
                });
                state.window.enable_commit_button(false);
                Err(e)
            }
        }
    }

    /// Applies the staged prices to the ledger. Returns how many were written.
    pub fn commit_changes(&self) -> Result<usize, ImportError> {
        let mut guard = self.state.try_lock().ok_or(ImportError::Busy)?;
        let state = &mut *guard;

        let count = state.session.commit_changes(&mut state.ledger);
        state.flush_messages();
        state.window.enable_commit_button(false);
        Ok(count)
    }

    pub fn forget_changes(&self) -> Result<(), ImportError> {
        let mut guard = self.state.try_lock().ok_or(ImportError::Busy)?;
        guard.session.forget_changes();
        guard.window.enable_commit_button(false);
        Ok(())
    }

    pub fn is_modified(&self) -> Result<bool, ImportError> {
        let guard = self.state.try_lock().ok_or(ImportError::Busy)?;
        Ok(guard.session.is_modified())
    }

    /// Runs `f` with the ledger.
    pub fn with_ledger<T>(&self, f: impl FnOnce(&L) -> T) -> Result<T, ImportError> {
        let guard = self.state.try_lock().ok_or(ImportError::Busy)?;
        Ok(f(&guard.ledger))
    }

    /// The window and ledger, once the importer is closed.
    pub fn into_parts(self) -> (L, W) {
        let state = self.state.into_inner();
        (state.ledger, state.window)
    }
}
