//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                              |
//! |------|----------------------------------------------------------|
//! | 0    | Success, including "no CSV files" and "no new records"   |
//! | 1    | General error (unspecified)                              |
//! | 2    | Usage or configuration error                             |
//! | 3    | Input data folder missing or unreadable                  |
//! | 4    | Export failed (Excel file or Google Sheet)               |
//! | 5    | Google Sheets connectivity check failed                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid config file.
pub const EXIT_USAGE: u8 = 2;

/// Data folder missing or cannot be listed.
pub const EXIT_INPUT: u8 = 3;

/// Writing the merged dataset failed. For Sheets this may happen after the
/// remote range was cleared.
pub const EXIT_EXPORT: u8 = 4;

/// `check-sheets` could not authenticate or reach the spreadsheet.
pub const EXIT_SHEETS_CHECK: u8 = 5;
