// Category CSV ingest
//
// Layout: <root>/<category>/*.csv. Every record becomes a LeadRow tagged with
// the name of the folder it came from. Traversal order (category name, then
// file name, then record order) is the first-seen-wins tie-break downstream.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use leadmerge_engine::LeadRow;

/// A CSV file that could not be read or parsed. The run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    /// Rows in traversal order, category already attached.
    pub rows: Vec<LeadRow>,
    pub files_read: usize,
    pub skipped: Vec<SkippedFile>,
    /// Category folders visited, in traversal order.
    pub categories: Vec<String>,
}

impl IngestReport {
    /// CSV files discovered, whether or not they parsed.
    pub fn csv_files_found(&self) -> usize {
        self.files_read + self.skipped.len()
    }
}

/// CSV file count per category folder.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CategoryScan {
    pub name: String,
    pub csv_files: usize,
}

/// Read every `<root>/<category>/*.csv` into rows.
///
/// Fails only when `root` itself cannot be listed. Unreadable category
/// folders and malformed files are logged and skipped.
pub fn ingest(root: &Path, category_column: &str) -> Result<IngestReport, String> {
    let mut report = IngestReport::default();

    for category_dir in list_sorted(root)? {
        if !category_dir.is_dir() {
            if is_csv(&category_dir) {
                log::debug!("ignoring {} (not inside a category folder)", category_dir.display());
            }
            continue;
        }
        let category = match category_dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                log::warn!("skipping folder with non UTF-8 name: {}", category_dir.display());
                continue;
            }
        };

        let files = match list_sorted(&category_dir) {
            Ok(entries) => entries.into_iter().filter(|p| p.is_file() && is_csv(p)).collect::<Vec<_>>(),
            Err(e) => {
                log::warn!("skipping category '{}': {}", category, e);
                continue;
            }
        };

        log::info!("category '{}': {} CSV file(s)", category, files.len());
        report.categories.push(category.clone());

        for path in files {
            match read_file_as_utf8(&path).and_then(|content| parse_records(&content)) {
                Ok(rows) => {
                    log::debug!("{}: {} record(s)", path.display(), rows.len());
                    report.files_read += 1;
                    report
                        .rows
                        .extend(rows.into_iter().map(|row| row.with_category(category_column, &category)));
                }
                Err(reason) => {
                    log::warn!("skipping {}: {}", path.display(), reason);
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
        }
    }

    Ok(report)
}

/// Count CSV files per category folder without parsing them.
pub fn scan_categories(root: &Path) -> Result<Vec<CategoryScan>, String> {
    let mut scans = Vec::new();
    for dir in list_sorted(root)?.into_iter().filter(|p| p.is_dir()) {
        let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        let csv_files = list_sorted(&dir)
            .map(|entries| entries.iter().filter(|p| p.is_file() && is_csv(p)).count())
            .unwrap_or(0);
        scans.push(CategoryScan { name, csv_files });
    }
    Ok(scans)
}

/// Parse CSV text with header-row semantics.
///
/// Records made only of empty cells are skipped. Short records are padded
/// with empty cells; cells beyond the header are dropped.
pub fn parse_records(content: &str) -> Result<Vec<LeadRow>, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rename_repeated_headers(
        reader
            .headers()
            .map_err(|e| e.to_string())?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
    );

    if headers.iter().all(|h| h.is_empty()) {
        return Err("missing header row".to_string());
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let mut row = LeadRow::new();
        for (idx, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            row.insert(name.as_str(), record.get(idx).unwrap_or(""));
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Give repeated header names a numeric suffix (`Phone`, `Phone_1`, ...)
/// so every column keeps its own cell. Suffixes skip names already taken.
fn rename_repeated_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: Vec<String> = headers.iter().filter(|h| !h.is_empty()).cloned().collect();
    let mut seen: Vec<&str> = Vec::with_capacity(headers.len());
    let mut renamed = Vec::with_capacity(headers.len());

    for header in &headers {
        if header.is_empty() || !seen.contains(&header.as_str()) {
            seen.push(header.as_str());
            renamed.push(header.clone());
            continue;
        }
        let mut n = 1;
        let mut candidate = format!("{}_{}", header, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", header, n);
        }
        log::warn!("repeated header '{}' renamed to '{}'", header, candidate);
        taken.push(candidate.clone());
        renamed.push(candidate);
    }
    renamed
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Directory entries sorted by file name, so traversal does not depend on
/// the platform's listing order.
fn list_sorted(dir: &Path) -> Result<Vec<PathBuf>, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("cannot read {}: {}", dir.display(), e))?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
