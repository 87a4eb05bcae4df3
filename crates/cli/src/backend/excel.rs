use std::path::PathBuf;

use leadmerge_config::RunConfig;
use leadmerge_engine::LeadRow;
use leadmerge_io::xlsx;

use super::{Backend, BackendError, ExportOutcome};

pub struct ExcelBackend {
    path: PathBuf,
    worksheet: String,
    column_width: f64,
}

impl ExcelBackend {
    pub fn new(path: PathBuf, worksheet: String, column_width: f64) -> Self {
        Self { path, worksheet, column_width }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            config.excel_output_path(),
            config.excel.worksheet_name.clone(),
            config.csv.column_width,
        )
    }
}

impl Backend for ExcelBackend {
    fn name(&self) -> &'static str {
        "excel"
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load_existing(&mut self) -> Result<Vec<LeadRow>, BackendError> {
        if !self.path.exists() {
            log::info!("no existing output at {}, starting fresh", self.path.display());
            return Ok(Vec::new());
        }

        match xlsx::read_rows(&self.path, &self.worksheet) {
            Ok(rows) => {
                log::info!("loaded {} existing record(s) from {}", rows.len(), self.path.display());
                Ok(rows)
            }
            Err(e) => {
                log::warn!(
                    "could not read existing output {} ({}), starting from an empty dataset",
                    self.path.display(),
                    e
                );
                Ok(Vec::new())
            }
        }
    }

    fn export(&mut self, rows: &[LeadRow], columns: &[String]) -> Result<ExportOutcome, BackendError> {
        let created = !self.path.exists();
        xlsx::write_rows(&self.path, &self.worksheet, columns, rows, self.column_width)
            .map_err(BackendError::Export)?;
        log::info!(
            "{} {} with {} record(s)",
            if created { "created" } else { "updated" },
            self.path.display(),
            rows.len()
        );
        Ok(ExportOutcome {
            created,
            location: self.location(),
            rows_written: rows.len(),
        })
    }
}
