// Excel output file: load previously merged leads, write the merged dataset
//
// Import: row 1 is the header, every later row is a lead keyed by header.
// Export: header + projected rows, every cell written as text, one fixed
//         column width for all columns.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use leadmerge_engine::{project_row, rows_from_grid, LeadRow};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};

/// Excel's worksheet row and column limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read the leads stored in `worksheet` of the workbook at `path`.
///
/// Falls back to the first sheet when `worksheet` does not exist, so a
/// renamed tab does not silently drop the existing data.
pub fn read_rows(path: &Path, worksheet: &str) -> Result<Vec<LeadRow>, String> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| format!("Failed to open Excel file: {}", e))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let sheet_name = if sheet_names.iter().any(|n| n == worksheet) {
        worksheet.to_string()
    } else {
        match sheet_names.first() {
            Some(first) => {
                log::warn!(
                    "worksheet '{}' not found in {}, reading '{}' instead",
                    worksheet,
                    path.display(),
                    first
                );
                first.clone()
            }
            None => return Err("Excel file contains no sheets".to_string()),
        }
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("Failed to read sheet '{}': {}", sheet_name, e))?;

    let mut lines = range.rows().map(|cells| cells.iter().map(cell_to_text).collect::<Vec<String>>());
    let header = match lines.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };
    let records: Vec<Vec<String>> = lines.collect();

    Ok(rows_from_grid(&header, &records))
}

/// Write `rows` projected onto `columns` as the only sheet of a new workbook.
///
/// Parent directories are created. An existing file at `path` is replaced.
pub fn write_rows(
    path: &Path,
    worksheet: &str,
    columns: &[String],
    rows: &[LeadRow],
    column_width: f64,
) -> Result<(), String> {
    if columns.len() > MAX_COLS {
        return Err(format!("{} columns exceed the Excel limit of {}", columns.len(), MAX_COLS));
    }
    if rows.len() + 1 > MAX_ROWS {
        return Err(format!("{} rows exceed the Excel limit of {}", rows.len(), MAX_ROWS - 1));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    let mut xlsx_workbook = XlsxWorkbook::new();
    let sheet = xlsx_workbook
        .add_worksheet()
        .set_name(worksheet)
        .map_err(|e| format!("Failed to create sheet '{}': {}", worksheet, e))?;

    let header_format = Format::new().set_bold();
    for (col, name) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(|e| format!("Failed to write header '{}': {}", name, e))?;
        sheet
            .set_column_width(col as u16, column_width)
            .map_err(|e| format!("Failed to set column {} width: {}", col, e))?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let target_row = (idx + 1) as u32;
        for (col, value) in project_row(row, columns).iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            sheet
                .write_string(target_row, col as u16, value)
                .map_err(|e| format!("Failed to write cell ({}, {}): {}", target_row, col, e))?;
        }
    }

    xlsx_workbook
        .save(path)
        .map_err(|e| format!("Failed to save XLSX file: {}", e))?;

    Ok(())
}

/// Cell as text. Integral floats lose the trailing `.0` so phone numbers
/// typed as numbers in Excel dedup against their CSV form.
fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        other => other.to_string(),
    }
}
