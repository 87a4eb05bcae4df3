//! Output backends.
//!
//! Each backend loads whatever a previous run left behind (so it can seed the
//! dedup store) and writes the merged dataset back in resolved column order.
//!
//! - `excel`: local xlsx file. Never fails to load: an unreadable file is
//!   treated as an empty starting dataset.
//! - `sheets`: Google Sheets. Initialization can fail, in which case the
//!   pipeline falls back to `excel`.

mod excel;
mod sheets;

pub use excel::ExcelBackend;
pub use sheets::SheetsBackend;

use std::fmt;

use leadmerge_engine::LeadRow;

pub trait Backend {
    /// Short name used in logs and reports ("excel", "sheets").
    fn name(&self) -> &'static str;

    /// Where the output lives (file path or spreadsheet range).
    fn location(&self) -> String;

    /// Rows already present in the output, in stored order.
    fn load_existing(&mut self) -> Result<Vec<LeadRow>, BackendError>;

    /// Replace the output with `rows` projected onto `columns`.
    fn export(&mut self, rows: &[LeadRow], columns: &[String]) -> Result<ExportOutcome, BackendError>;
}

/// Result of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    /// True when no output existed before this run.
    pub created: bool,
    pub location: String,
    pub rows_written: usize,
}

/// Outcome of initializing a backend that can fail before any IO on the
/// output itself. The pipeline consumes this instead of threading errors.
pub enum BackendInit {
    Initialized(Box<dyn Backend>),
    Failed(String),
}

#[derive(Debug)]
pub enum BackendError {
    /// Reading existing output failed.
    Load(String),
    /// Writing the merged dataset failed.
    Export(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(msg) => write!(f, "load failed: {msg}"),
            Self::Export(msg) => write!(f, "export failed: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}
