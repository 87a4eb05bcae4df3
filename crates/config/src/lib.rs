// Configuration loading

pub mod error;
pub mod settings;

pub use error::ConfigError;
pub use settings::{
    CsvSettings, DedupSettings, ExcelSettings, Mode, RunConfig, SheetsSettings,
    CONFIG_FILE_NAME, PLACEHOLDER_SPREADSHEET_ID,
};
