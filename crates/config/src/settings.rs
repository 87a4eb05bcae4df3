// Run settings
// Loaded from leadmerge.toml (optional); every key has a default.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "leadmerge.toml";

/// Spreadsheet id shipped in the sample config; treated as "not configured".
pub const PLACEHOLDER_SPREADSHEET_ID: &str = "YOUR_GOOGLE_SHEET_ID_HERE";

/// Output backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local xlsx file
    Excel,
    /// Google Sheets
    Sheets,
    /// Sheets when credentials, id and network are all available, else Excel
    #[default]
    Auto,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excel => write!(f, "excel"),
            Self::Sheets => write!(f, "sheets"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excel" => Ok(Self::Excel),
            "sheets" => Ok(Self::Sheets),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown mode '{other}' (expected excel, sheets or auto)")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcelSettings {
    /// "Desktop" for the user's desktop, otherwise a directory path
    pub output_dir: String,
    pub file_name: String,
    pub worksheet_name: String,
}

impl Default for ExcelSettings {
    fn default() -> Self {
        Self {
            output_dir: "Desktop".to_string(),
            file_name: "Leads-Merged.xlsx".to_string(),
            worksheet_name: "Leads".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetsSettings {
    /// Id from the spreadsheet URL
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    /// Service account key file
    pub credentials_path: PathBuf,
    /// Anchor cell for the bulk write
    pub start_range: String,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            spreadsheet_id: PLACEHOLDER_SPREADSHEET_ID.to_string(),
            worksheet_name: "Leads".to_string(),
            credentials_path: PathBuf::from("./credentials.json"),
            start_range: "A1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvSettings {
    /// Root holding one subfolder per lead category
    pub data_folder: PathBuf,
    pub preferred_column_order: Vec<String>,
    /// Excel column width, in characters
    pub column_width: f64,
    /// Column that receives the category folder name
    pub category_column: String,
}

impl Default for CsvSettings {
    fn default() -> Self {
        Self {
            data_folder: PathBuf::from("./data"),
            preferred_column_order: [
                "LeadType",
                "Title",
                "Phone",
                "Address",
                "Website",
                "Google Maps Link",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            column_width: 13.0,
            category_column: "LeadType".to_string(),
        }
    }
}

/// Fields combined into the dedup key
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DedupSettings {
    pub name_field: String,
    pub phone_field: String,
}

impl Default for DedupSettings {
    fn default() -> Self {
        Self {
            name_field: "Title".to_string(),
            phone_field: "Phone".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub mode: Mode,
    pub excel: ExcelSettings,
    pub sheets: SheetsSettings,
    pub csv: CsvSettings,
    pub dedup: DedupSettings,
}

impl RunConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: RunConfig =
            toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    /// Explicit path if given, else `./leadmerge.toml` when present, else
    /// defaults. Returns the file actually used.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Ok((Self::load(&local)?, Some(local)));
        }
        Ok((Self::default(), None))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.csv.column_width > 0.0 && self.csv.column_width <= 255.0) {
            return Err(ConfigError::Validation(format!(
                "csv.column_width must be in (0, 255], got {}",
                self.csv.column_width
            )));
        }

        if self.excel.file_name.trim().is_empty() {
            return Err(ConfigError::Validation("excel.file_name must not be empty".into()));
        }

        if self.csv.category_column.trim().is_empty() {
            return Err(ConfigError::Validation("csv.category_column must not be empty".into()));
        }

        if !is_cell_ref(&self.sheets.start_range) {
            return Err(ConfigError::Validation(format!(
                "sheets.start_range must be a cell reference like A1, got '{}'",
                self.sheets.start_range
            )));
        }

        if self.dedup.name_field == self.dedup.phone_field {
            return Err(ConfigError::Validation(format!(
                "dedup.name_field and dedup.phone_field must differ (both '{}')",
                self.dedup.name_field
            )));
        }

        Ok(())
    }

    /// Full path of the Excel output file.
    pub fn excel_output_path(&self) -> PathBuf {
        let dir = if self.excel.output_dir.eq_ignore_ascii_case("desktop") {
            dirs::desktop_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            PathBuf::from(&self.excel.output_dir)
        };
        dir.join(&self.excel.file_name)
    }

    pub fn is_placeholder_spreadsheet_id(&self) -> bool {
        let id = self.sheets.spreadsheet_id.trim();
        id.is_empty() || id == PLACEHOLDER_SPREADSHEET_ID
    }
}

/// `A1`-style reference: 1-3 column letters followed by a row number >= 1.
fn is_cell_ref(s: &str) -> bool {
    let letters = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let digits = &s[letters..];
    (1..=3).contains(&letters)
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
}
