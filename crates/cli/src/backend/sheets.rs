use leadmerge_config::{RunConfig, SheetsSettings};
use leadmerge_engine::{project_row, rows_from_grid, LeadRow};
use leadmerge_sheets_client::{a1, load_service_account, SheetsClient};

use super::{Backend, BackendError, BackendInit, ExportOutcome};

pub struct SheetsBackend {
    client: SheetsClient,
    spreadsheet_id: String,
    worksheet: String,
    anchor: String,
    /// Whether the worksheet held any cells when loaded.
    had_data: bool,
}

impl SheetsBackend {
    pub fn new(client: SheetsClient, settings: &SheetsSettings) -> Self {
        Self {
            client,
            spreadsheet_id: settings.spreadsheet_id.clone(),
            worksheet: settings.worksheet_name.clone(),
            anchor: settings.start_range.clone(),
            had_data: false,
        }
    }

    /// Authenticate with the configured key file and make sure the target
    /// worksheet exists. Any failure is returned as `BackendInit::Failed`.
    pub fn init(config: &RunConfig) -> BackendInit {
        let settings = &config.sheets;
        if config.is_placeholder_spreadsheet_id() {
            return BackendInit::Failed("spreadsheet id is not configured".into());
        }

        let key = match load_service_account(&settings.credentials_path) {
            Ok(key) => key,
            Err(e) => return BackendInit::Failed(e.to_string()),
        };
        let client = match SheetsClient::connect(&key) {
            Ok(client) => client,
            Err(e) => return BackendInit::Failed(e.to_string()),
        };
        Self::init_with_client(client, settings)
    }

    /// Second half of [`SheetsBackend::init`], for an already authenticated client.
    pub fn init_with_client(client: SheetsClient, settings: &SheetsSettings) -> BackendInit {
        if let Err(e) = client.ensure_sheet(&settings.spreadsheet_id, &settings.worksheet_name) {
            return BackendInit::Failed(e.to_string());
        }
        log::info!(
            "connected to spreadsheet {} (worksheet '{}')",
            settings.spreadsheet_id,
            settings.worksheet_name
        );
        BackendInit::Initialized(Box::new(Self::new(client, settings)))
    }
}

impl Backend for SheetsBackend {
    fn name(&self) -> &'static str {
        "sheets"
    }

    fn location(&self) -> String {
        format!(
            "spreadsheet {} ({})",
            self.spreadsheet_id,
            a1::sheet_range(&self.worksheet, &self.anchor)
        )
    }

    fn load_existing(&mut self) -> Result<Vec<LeadRow>, BackendError> {
        let grid = self
            .client
            .get_values(&self.spreadsheet_id, &a1::whole_sheet(&self.worksheet))
            .map_err(|e| BackendError::Load(e.to_string()))?;
        self.had_data = !grid.is_empty();

        // Data written at a non-A1 anchor comes back with leading blank
        // rows and columns
        let col_offset = a1::column_index(&self.anchor).unwrap_or(0);
        let mut lines = grid
            .into_iter()
            .skip_while(|line| line.iter().all(|cell| cell.is_empty()))
            .map(|line| line.into_iter().skip(col_offset).collect::<Vec<String>>());

        let header = match lines.next() {
            Some(header) => header,
            None => return Ok(Vec::new()),
        };
        let records: Vec<Vec<String>> = lines.collect();
        let rows = rows_from_grid(&header, &records);
        log::info!("loaded {} existing record(s) from worksheet '{}'", rows.len(), self.worksheet);
        Ok(rows)
    }

    fn export(&mut self, rows: &[LeadRow], columns: &[String]) -> Result<ExportOutcome, BackendError> {
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
        grid.push(columns.to_vec());
        grid.extend(rows.iter().map(|row| project_row(row, columns)));

        self.client
            .clear_values(&self.spreadsheet_id, &a1::whole_sheet(&self.worksheet))
            .map_err(|e| BackendError::Export(format!("clearing worksheet '{}': {}", self.worksheet, e)))?;

        let cells = self
            .client
            .update_values(
                &self.spreadsheet_id,
                &a1::sheet_range(&self.worksheet, &self.anchor),
                &grid,
            )
            .map_err(|e| {
                BackendError::Export(format!(
                    "writing worksheet '{}' after it was cleared: {}",
                    self.worksheet, e
                ))
            })?;

        log::info!("wrote {} cell(s) to worksheet '{}'", cells, self.worksheet);
        Ok(ExportOutcome {
            created: !self.had_data,
            location: self.location(),
            rows_written: rows.len(),
        })
    }
}
