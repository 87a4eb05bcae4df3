//! One merge run: pick a backend, seed the dedup store with what the
//! output already holds, admit freshly ingested rows, write everything back.

use std::fmt;

use leadmerge_config::{Mode, RunConfig};
use leadmerge_engine::{resolve_column_order, DedupKeyFields, DedupStore};
use leadmerge_io::{ingest, SkippedFile};
use serde::Serialize;

use crate::backend::{Backend, BackendInit, ExcelBackend, SheetsBackend};
use crate::exit_codes::{EXIT_EXPORT, EXIT_INPUT};
use crate::mode::{resolve_mode, ResolvedMode};
use crate::probe::{ReachabilityProbe, TcpProbe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// No CSV file under the data folder. Output left untouched.
    NoCsvFiles,
    /// CSV files found but neither they nor the output held any rows.
    NothingToDo,
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub mode: ResolvedMode,
    pub mode_reason: String,
    /// Why Sheets was abandoned for Excel, if it was.
    pub fallback: Option<String>,
    pub total: usize,
    pub new_records: usize,
    pub existing: usize,
    pub created: bool,
    pub location: Option<String>,
    pub files_read: usize,
    pub skipped_files: Vec<SkippedFile>,
    pub columns: Vec<String>,
}

#[derive(Debug)]
pub enum PipelineError {
    /// Data folder missing or unreadable
    Input(String),
    /// Writing the merged dataset failed
    Export(String),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Input(_) => EXIT_INPUT,
            Self::Export(_) => EXIT_EXPORT,
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(msg) => write!(f, "cannot read input: {msg}"),
            Self::Export(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Run with the real network probe and Sheets authentication.
pub fn run(config: &RunConfig, requested: Mode) -> Result<RunReport, PipelineError> {
    run_with(config, requested, &TcpProbe::sheets_api(), SheetsBackend::init)
}

/// Run with an injected probe and Sheets initializer.
pub fn run_with<F>(
    config: &RunConfig,
    requested: Mode,
    probe: &dyn ReachabilityProbe,
    init_sheets: F,
) -> Result<RunReport, PipelineError>
where
    F: FnOnce(&RunConfig) -> BackendInit,
{
    let decision = resolve_mode(requested, config, probe);
    log::info!("mode: {} ({})", decision.mode, decision.reason);

    let data_folder = &config.csv.data_folder;
    let ingested = ingest(data_folder, &config.csv.category_column).map_err(PipelineError::Input)?;

    let mut report = RunReport {
        status: RunStatus::NoCsvFiles,
        mode: decision.mode,
        mode_reason: decision.reason,
        fallback: None,
        total: 0,
        new_records: 0,
        existing: 0,
        created: false,
        location: None,
        files_read: ingested.files_read,
        skipped_files: ingested.skipped.clone(),
        columns: Vec::new(),
    };

    if ingested.csv_files_found() == 0 {
        log::warn!("no CSV files found under {}", data_folder.display());
        return Ok(report);
    }
    log::info!(
        "read {} record(s) from {} file(s) in {} categor(ies)",
        ingested.rows.len(),
        ingested.files_read,
        ingested.categories.len()
    );

    let mut backend: Box<dyn Backend> = match report.mode {
        ResolvedMode::Excel => Box::new(ExcelBackend::from_config(config)),
        ResolvedMode::Sheets => match init_sheets(config) {
            BackendInit::Initialized(backend) => backend,
            BackendInit::Failed(reason) => {
                log::warn!("Google Sheets unavailable ({}), falling back to Excel", reason);
                report.fallback = Some(reason);
                Box::new(ExcelBackend::from_config(config))
            }
        },
    };

    let existing = match backend.load_existing() {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!("{} backend: {}, falling back to Excel", backend.name(), e);
            report.fallback = Some(e.to_string());
            backend = Box::new(ExcelBackend::from_config(config));
            backend.load_existing().map_err(|e| PipelineError::Export(e.to_string()))?
        }
    };
    if report.fallback.is_some() {
        report.mode = ResolvedMode::Excel;
    }
    report.location = Some(backend.location());

    let key_fields = DedupKeyFields::new(
        config.dedup.name_field.clone(),
        config.dedup.phone_field.clone(),
    );
    let mut store = DedupStore::new(key_fields.clone());
    report.existing = store.seed(existing);

    for row in ingested.rows {
        let key = key_fields.key_for(&row);
        if store.accept(row) {
            report.new_records += 1;
        } else {
            log::debug!("duplicate lead {}", key);
        }
    }
    report.total = store.len();
    log::info!(
        "{} new record(s), {} already present, {} total",
        report.new_records,
        report.existing,
        report.total
    );

    if store.is_empty() {
        log::info!("nothing to export");
        report.status = RunStatus::NothingToDo;
        return Ok(report);
    }

    let rows = store.into_rows();
    report.columns = resolve_column_order(&rows, &config.csv.preferred_column_order);

    let outcome = backend
        .export(&rows, &report.columns)
        .map_err(|e| PipelineError::Export(format!("{} backend: {}", backend.name(), e)))?;

    report.created = outcome.created;
    report.location = Some(outcome.location);
    report.status = if outcome.created { RunStatus::Created } else { RunStatus::Updated };
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::StaticProbe;
    use leadmerge_io::xlsx;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn write_csv(root: &Path, category: &str, file: &str, content: &str) {
        let dir = root.join("data").join(category);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(file), content).unwrap();
    }

    fn test_config(dir: &TempDir) -> RunConfig {
        let mut config = RunConfig::default();
        config.csv.data_folder = dir.path().join("data");
        config.excel.output_dir = dir.path().join("out").display().to_string();
        config.sheets.credentials_path = dir.path().join("credentials.json");
        config
    }

    fn never_init(_: &RunConfig) -> BackendInit {
        panic!("sheets backend must not be initialized")
    }

    fn run_excel(config: &RunConfig) -> RunReport {
        run_with(config, Mode::Excel, &StaticProbe(false), never_init).unwrap()
    }

    #[test]
    fn test_duplicate_across_categories_kept_once() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "LinkedIn", "a.csv", "Title,Phone\nAcme,555-1\n");
        write_csv(dir.path(), "Maps", "b.csv", "Title,Phone\nAcme,555-1\n");
        let config = test_config(&dir);

        let report = run_excel(&config);
        assert_eq!(report.status, RunStatus::Created);
        assert_eq!(report.total, 1);
        assert_eq!(report.new_records, 1);

        let rows = xlsx::read_rows(&config.excel_output_path(), "Leads").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("LeadType"), Some("LinkedIn"));
    }

    #[test]
    fn test_existing_output_plus_new_record() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        write_csv(dir.path(), "LinkedIn", "a.csv", "Title,Phone\nAcme,555-1\n");
        run_excel(&config);

        write_csv(dir.path(), "LinkedIn", "b.csv", "Title,Phone\nAcme,555-1\nBeta,555-2\n");
        let report = run_excel(&config);

        assert_eq!(report.status, RunStatus::Updated);
        assert_eq!(report.existing, 1);
        assert_eq!(report.new_records, 1);
        assert_eq!(report.total, 2);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "Maps", "a.csv", "Title,Phone,Website\nAcme,555-1,acme.io\nBeta,555-2,\n");
        let config = test_config(&dir);

        let first = run_excel(&config);
        let before = xlsx::read_rows(&config.excel_output_path(), "Leads").unwrap();
        let second = run_excel(&config);
        let after = xlsx::read_rows(&config.excel_output_path(), "Leads").unwrap();

        assert_eq!(first.total, 2);
        assert_eq!(second.new_records, 0);
        assert_eq!(second.total, 2);
        assert_eq!(before, after);
        assert_eq!(first.columns, second.columns);
    }

    #[test]
    fn test_column_order_prefix_then_extras() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "Maps", "a.csv", "Rating,Title,Phone\n4.5,Acme,555-1\n");
        let config = test_config(&dir);

        let report = run_excel(&config);
        assert_eq!(
            report.columns,
            vec!["LeadType", "Title", "Phone", "Address", "Website", "Google Maps Link", "Rating"]
        );
    }

    #[test]
    fn test_empty_data_folder_leaves_output_alone() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data/LinkedIn")).unwrap();
        let config = test_config(&dir);

        let report = run_excel(&config);
        assert_eq!(report.status, RunStatus::NoCsvFiles);
        assert!(report.location.is_none());
        assert!(!config.excel_output_path().exists());
    }

    #[test]
    fn test_missing_data_folder_is_input_error() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        let err = run_with(&config, Mode::Excel, &StaticProbe(false), never_init).unwrap_err();
        assert!(matches!(err, PipelineError::Input(_)));
        assert_eq!(err.exit_code(), EXIT_INPUT);
    }

    #[test]
    fn test_headers_only_is_nothing_to_do() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\n");
        let config = test_config(&dir);

        let report = run_excel(&config);
        assert_eq!(report.status, RunStatus::NothingToDo);
        assert!(!config.excel_output_path().exists());
    }

    #[test]
    fn test_malformed_file_is_skipped() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\nAcme,555-1\n");
        write_csv(dir.path(), "Maps", "b.csv", "");
        let config = test_config(&dir);

        let report = run_excel(&config);
        assert_eq!(report.files_read, 1);
        assert_eq!(report.skipped_files.len(), 1);
        assert_eq!(report.total, 1);
    }

    #[test]
    fn test_sheets_init_failure_falls_back_to_excel() {
        let dir = tempdir().unwrap();
        write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\nAcme,555-1\n");
        let config = test_config(&dir);

        let report = run_with(&config, Mode::Sheets, &StaticProbe(true), |_| {
            BackendInit::Failed("token exchange failed".into())
        })
        .unwrap();

        assert_eq!(report.mode, ResolvedMode::Excel);
        assert_eq!(report.fallback.as_deref(), Some("token exchange failed"));
        assert!(config.excel_output_path().exists());
    }

    #[test]
    fn test_no_csv_files_skips_sheets_init() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        let config = test_config(&dir);

        let report = run_with(&config, Mode::Sheets, &StaticProbe(true), never_init).unwrap();
        assert_eq!(report.status, RunStatus::NoCsvFiles);
    }

    mod sheets {
        use super::*;
        use httpmock::prelude::*;
        use leadmerge_sheets_client::SheetsClient;

        fn init_against(server: &MockServer) -> impl FnOnce(&RunConfig) -> BackendInit + '_ {
            move |config: &RunConfig| {
                let client = SheetsClient::with_token("test_token".into(), server.base_url());
                SheetsBackend::init_with_client(client, &config.sheets)
            }
        }

        fn sheets_config(dir: &TempDir) -> RunConfig {
            let mut config = test_config(dir);
            config.sheets.spreadsheet_id = "sheet123".into();
            config
        }

        fn mock_metadata(server: &MockServer) {
            server.mock(|when, then| {
                when.method(GET).path("/v4/spreadsheets/sheet123");
                then.status(200)
                    .json_body(serde_json::json!({
                        "properties": { "title": "Leads" },
                        "sheets": [{ "properties": { "title": "Leads" } }]
                    }));
            });
        }

        #[test]
        fn test_sheets_merge_with_existing_rows() {
            let dir = tempdir().unwrap();
            write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\nAcme,555-1\nBeta,555-2\n");
            let config = sheets_config(&dir);

            let server = MockServer::start();
            mock_metadata(&server);
            server.mock(|when, then| {
                when.method(GET).path_includes("/values/");
                then.status(200)
                    .json_body(serde_json::json!({
                        "values": [["LeadType", "Title", "Phone"], ["LinkedIn", "Acme", "555-1"]]
                    }));
            });
            let clear = server.mock(|when, then| {
                when.method(POST).path_includes(":clear");
                then.status(200).json_body(serde_json::json!({}));
            });
            let write = server.mock(|when, then| {
                when.method(PUT).path_includes("/values/");
                then.status(200).json_body(serde_json::json!({ "updatedCells": 18 }));
            });

            let report = run_with(&config, Mode::Sheets, &StaticProbe(true), init_against(&server)).unwrap();

            assert_eq!(report.mode, ResolvedMode::Sheets);
            assert_eq!(report.status, RunStatus::Updated);
            assert_eq!(report.existing, 1);
            assert_eq!(report.new_records, 1);
            assert_eq!(report.total, 2);
            clear.assert();
            write.assert_calls(1);
            assert!(!config.excel_output_path().exists());
        }

        #[test]
        fn test_sheets_load_failure_falls_back_to_excel() {
            let dir = tempdir().unwrap();
            write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\nAcme,555-1\n");
            let config = sheets_config(&dir);

            let server = MockServer::start();
            mock_metadata(&server);
            server.mock(|when, then| {
                when.method(GET).path_includes("/values/");
                then.status(500).body("internal");
            });

            let report = run_with(&config, Mode::Sheets, &StaticProbe(true), init_against(&server)).unwrap();

            assert_eq!(report.mode, ResolvedMode::Excel);
            assert!(report.fallback.is_some());
            assert!(config.excel_output_path().exists());
        }

        #[test]
        fn test_sheets_export_failure_is_fatal() {
            let dir = tempdir().unwrap();
            write_csv(dir.path(), "Maps", "a.csv", "Title,Phone\nAcme,555-1\n");
            let config = sheets_config(&dir);

            let server = MockServer::start();
            mock_metadata(&server);
            server.mock(|when, then| {
                when.method(GET).path_includes("/values/");
                then.status(200).json_body(serde_json::json!({}));
            });
            server.mock(|when, then| {
                when.method(POST).path_includes(":clear");
                then.status(403)
                    .json_body(serde_json::json!({ "error": { "message": "The caller does not have permission" } }));
            });

            let err = run_with(&config, Mode::Sheets, &StaticProbe(true), init_against(&server)).unwrap_err();

            assert!(matches!(err, PipelineError::Export(_)));
            assert_eq!(err.exit_code(), EXIT_EXPORT);
            assert!(!config.excel_output_path().exists());
        }
    }
}
