// File I/O operations

pub mod csv;
pub mod xlsx;

pub use crate::csv::{ingest, scan_categories, CategoryScan, IngestReport, SkippedFile};
