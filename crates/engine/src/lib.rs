//! `leadmerge-engine`: rows, dedup store and column ordering.
//!
//! Pure engine crate: receives rows from whichever loader produced them and
//! decides what survives. No filesystem or network access.

pub mod columns;
pub mod dedup;
pub mod row;

pub use columns::{project_row, resolve_column_order, rows_from_grid};
pub use dedup::{DedupKey, DedupKeyFields, DedupStore, KEY_SEPARATOR};
pub use row::LeadRow;
