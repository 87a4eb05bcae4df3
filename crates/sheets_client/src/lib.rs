//! Google Sheets API client.
//!
//! Covers what a merge run needs: service-account auth, spreadsheet
//! metadata, read the occupied range, clear it, bulk-write it back.
//!
//! Blocking reqwest, no retries. Callers decide what a failure means.

pub mod a1;
mod auth;
mod client;

pub use auth::{
    fetch_access_token, load_service_account, sign_assertion, ServiceAccountKey,
    GOOGLE_TOKEN_URI, SHEETS_SCOPE,
};
pub use client::{SheetsClient, SheetsError, SpreadsheetInfo, SHEETS_API_BASE};
