//! Output mode resolution.
//!
//! An explicit `excel` or `sheets` request is taken as is. `auto` picks
//! Sheets only when all of the following hold, checked in order and
//! stopping at the first failure:
//!
//! 1. the credentials file exists
//! 2. the spreadsheet id is not the placeholder
//! 3. the reachability probe succeeds
//!
//! The probe is the only step that touches the network, so it runs last.

use std::fmt;

use leadmerge_config::{Mode, RunConfig};
use serde::Serialize;

use crate::probe::ReachabilityProbe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedMode {
    Excel,
    Sheets,
}

impl fmt::Display for ResolvedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excel => write!(f, "excel"),
            Self::Sheets => write!(f, "sheets"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: ResolvedMode,
    pub reason: String,
}

impl ModeDecision {
    fn new(mode: ResolvedMode, reason: impl Into<String>) -> Self {
        Self { mode, reason: reason.into() }
    }
}

pub fn resolve_mode(requested: Mode, config: &RunConfig, probe: &dyn ReachabilityProbe) -> ModeDecision {
    match requested {
        Mode::Excel => ModeDecision::new(ResolvedMode::Excel, "excel mode requested"),
        Mode::Sheets => ModeDecision::new(ResolvedMode::Sheets, "sheets mode requested"),
        Mode::Auto => {
            let credentials = &config.sheets.credentials_path;
            if !credentials.is_file() {
                return ModeDecision::new(
                    ResolvedMode::Excel,
                    format!("credentials file {} not found", credentials.display()),
                );
            }
            if config.is_placeholder_spreadsheet_id() {
                return ModeDecision::new(ResolvedMode::Excel, "spreadsheet id is not configured");
            }
            if !probe.is_reachable() {
                return ModeDecision::new(ResolvedMode::Excel, "Google Sheets API is unreachable");
            }
            ModeDecision::new(ResolvedMode::Sheets, "credentials, spreadsheet id and network available")
        }
    }
}
