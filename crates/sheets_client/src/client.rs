//! Google Sheets v4 HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers one merge round trip: metadata → read values → clear → bulk write.

use std::time::Duration;

use url::Url;

use crate::auth::{fetch_access_token, ServiceAccountKey};

pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Sheets API client (blocking).
#[derive(Clone)]
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Error type for sheets operations.
#[derive(Debug)]
pub enum SheetsError {
    /// Key file missing, unreadable or not a service account key
    Credentials(String),
    /// Token exchange rejected
    Auth(String),
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Unexpected response shape
    Parse(String),
}

impl std::fmt::Display for SheetsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsError::Credentials(msg) => write!(f, "Credentials error: {}", msg),
            SheetsError::Auth(msg) => write!(f, "Auth error: {}", msg),
            SheetsError::Network(msg) => write!(f, "Network error: {}", msg),
            SheetsError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            SheetsError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for SheetsError {}

/// Spreadsheet title and worksheet titles.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub sheets: Vec<String>,
}

impl SheetsClient {
    /// Authenticate with a service account key and build a client.
    pub fn connect(key: &ServiceAccountKey) -> Result<Self, SheetsError> {
        let http = build_http();
        let token = fetch_access_token(&http, key)?;
        log::debug!("obtained access token for {}", key.client_email);
        Ok(Self {
            http,
            api_base: SHEETS_API_BASE.to_string(),
            token,
        })
    }

    /// Client with an already issued token, against any API base.
    pub fn with_token(token: String, api_base: String) -> Self {
        Self {
            http: build_http(),
            api_base,
            token,
        }
    }

    /// Spreadsheet title and worksheet titles.
    pub fn spreadsheet_info(&self, spreadsheet_id: &str) -> Result<SpreadsheetInfo, SheetsError> {
        let mut url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "properties.title,sheets.properties.title");

        let json: serde_json::Value = self.send(self.http.get(url))?;

        let title = json["properties"]["title"]
            .as_str()
            .ok_or_else(|| SheetsError::Parse("spreadsheet response has no title".into()))?
            .to_string();
        let sheets = json["sheets"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|s| s["properties"]["title"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(SpreadsheetInfo { title, sheets })
    }

    /// Add worksheet `title` unless it exists. Returns true when it was created.
    pub fn ensure_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<bool, SheetsError> {
        let info = self.spreadsheet_info(spreadsheet_id)?;
        if info.sheets.iter().any(|s| s == title) {
            return Ok(false);
        }

        let url = self.endpoint(&["v4", "spreadsheets", &format!("{}:batchUpdate", spreadsheet_id)])?;
        let body = serde_json::json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        self.send(self.http.post(url).json(&body))?;
        log::info!("created worksheet '{}' in spreadsheet {}", title, spreadsheet_id);
        Ok(true)
    }

    /// Occupied cells of `range` as text rows. Trailing empty cells are
    /// omitted by the API, so rows can be ragged.
    pub fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let mut url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id, "values", range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");

        let json: serde_json::Value = self.send(self.http.get(url))?;

        let rows = match json["values"].as_array() {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        rows.iter()
            .map(|row| {
                row.as_array()
                    .map(|cells| cells.iter().map(value_to_text).collect())
                    .ok_or_else(|| SheetsError::Parse("values row is not an array".into()))
            })
            .collect()
    }

    pub fn clear_values(&self, spreadsheet_id: &str, range: &str) -> Result<(), SheetsError> {
        let url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id, "values", &format!("{}:clear", range)])?;
        self.send(self.http.post(url).json(&serde_json::json!({})))?;
        Ok(())
    }

    /// Write `rows` starting at the top-left of `range` in one request.
    /// Returns the number of cells the API reports as updated.
    pub fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<u64, SheetsError> {
        let mut url = self.endpoint(&["v4", "spreadsheets", spreadsheet_id, "values", range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = serde_json::json!({
            "majorDimension": "ROWS",
            "values": rows,
        });
        let json = self.send(self.http.put(url).json(&body))?;
        Ok(json["updatedCells"].as_u64().unwrap_or(0))
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| SheetsError::Parse(format!("invalid API base '{}': {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Parse(format!("API base '{}' cannot take a path", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<serde_json::Value, SheetsError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| SheetsError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SheetsError::Http(status, api_error_message(&body)));
        }

        response.json().map_err(|e| SheetsError::Parse(e.to_string()))
    }
}

fn build_http() -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        .user_agent(format!("leadmerge/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

/// `error.message` from a Google API error body, else the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        other => other.to_string(),
    }
}
