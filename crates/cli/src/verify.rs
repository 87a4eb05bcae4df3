//! Setup verification and the Sheets connectivity check.
//!
//! `verify` never touches the network. It inspects the data folder, the
//! credentials file and the configured ids, and reports each finding as
//! ok / warn / fail. Only a missing data folder makes it exit non-zero,
//! since everything else still leaves Excel mode usable.

use std::path::Path;

use leadmerge_config::RunConfig;
use leadmerge_io::scan_categories;
use leadmerge_sheets_client::{load_service_account, ServiceAccountKey, SheetsClient, SheetsError, SpreadsheetInfo};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self { name: name.into(), status, detail: detail.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub config_file: Option<String>,
    pub data_folder_ok: bool,
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }
}

pub fn run_verify(config: &RunConfig, config_file: Option<&Path>) -> VerifyReport {
    let mut checks = Vec::new();

    checks.push(match config_file {
        Some(path) => Check::new("config", CheckStatus::Ok, path.display().to_string()),
        None => Check::new("config", CheckStatus::Ok, "built-in defaults"),
    });

    let data_folder_ok = check_data_folder(&config.csv.data_folder, &mut checks);
    checks.push(check_credentials(&config.sheets.credentials_path));

    checks.push(if config.is_placeholder_spreadsheet_id() {
        Check::new("spreadsheet_id", CheckStatus::Warn, "not configured (Excel mode only)")
    } else {
        Check::new("spreadsheet_id", CheckStatus::Ok, config.sheets.spreadsheet_id.clone())
    });

    let output = config.excel_output_path();
    let parent_exists = output.parent().map(|p| p.as_os_str().is_empty() || p.is_dir()).unwrap_or(true);
    checks.push(if parent_exists {
        Check::new("excel_output", CheckStatus::Ok, output.display().to_string())
    } else {
        Check::new(
            "excel_output",
            CheckStatus::Warn,
            format!("{} (folder will be created)", output.display()),
        )
    });

    VerifyReport {
        config_file: config_file.map(|p| p.display().to_string()),
        data_folder_ok,
        checks,
    }
}

fn check_data_folder(root: &Path, checks: &mut Vec<Check>) -> bool {
    if !root.is_dir() {
        checks.push(Check::new(
            "data_folder",
            CheckStatus::Fail,
            format!("{} not found", root.display()),
        ));
        return false;
    }

    let categories = match scan_categories(root) {
        Ok(categories) => categories,
        Err(e) => {
            checks.push(Check::new("data_folder", CheckStatus::Fail, e));
            return false;
        }
    };

    if categories.is_empty() {
        checks.push(Check::new(
            "data_folder",
            CheckStatus::Warn,
            format!("{} has no category folders", root.display()),
        ));
        return true;
    }

    checks.push(Check::new(
        "data_folder",
        CheckStatus::Ok,
        format!("{} ({} categories)", root.display(), categories.len()),
    ));
    for scan in categories {
        let status = if scan.csv_files == 0 { CheckStatus::Warn } else { CheckStatus::Ok };
        checks.push(Check::new(
            format!("category:{}", scan.name),
            status,
            format!("{} CSV file(s)", scan.csv_files),
        ));
    }
    true
}

fn check_credentials(path: &Path) -> Check {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            return Check::new(
                "credentials",
                CheckStatus::Warn,
                format!("{} not found (Excel mode only)", path.display()),
            )
        }
    };

    match serde_json::from_str::<ServiceAccountKey>(&content) {
        Ok(key) if key.is_service_account() => Check::new(
            "credentials",
            CheckStatus::Ok,
            format!("service account {}", key.client_email),
        ),
        Ok(_) => Check::new(
            "credentials",
            CheckStatus::Warn,
            format!("{} is not a service account key", path.display()),
        ),
        Err(e) => Check::new(
            "credentials",
            CheckStatus::Fail,
            format!("{} is not valid JSON: {}", path.display(), e),
        ),
    }
}

/// Authenticate and read spreadsheet metadata.
pub fn check_sheets(config: &RunConfig) -> Result<SpreadsheetInfo, SheetsError> {
    if config.is_placeholder_spreadsheet_id() {
        return Err(SheetsError::Credentials("spreadsheet id is not configured".into()));
    }
    let key = load_service_account(&config.sheets.credentials_path)?;
    let client = SheetsClient::connect(&key)?;
    client.spreadsheet_info(&config.sheets.spreadsheet_id)
}
