// Column ordering and grid <-> row conversion shared by every backend

use rustc_hash::FxHashSet;

use crate::row::LeadRow;

/// Final header order: `preferred` verbatim, then every other column seen in
/// `rows`, in order of first appearance.
///
/// Repeated names in `preferred` keep only their first occurrence.
pub fn resolve_column_order(rows: &[LeadRow], preferred: &[String]) -> Vec<String> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut order: Vec<String> = Vec::with_capacity(preferred.len());

    for name in preferred {
        if seen.insert(name.as_str()) {
            order.push(name.clone());
        }
    }

    for row in rows {
        for column in row.columns() {
            if seen.insert(column) {
                order.push(column.to_string());
            }
        }
    }

    order
}

/// Materialize `row` in `columns` order. Missing columns become `""`.
pub fn project_row(row: &LeadRow, columns: &[String]) -> Vec<String> {
    columns
        .iter()
        .map(|c| row.get_or_empty(c).to_string())
        .collect()
}

/// Rebuild rows from a header line and value lines (sheet or xlsx layout).
///
/// Cells past the end of a short line are stored as `""`. Columns with an
/// empty header are dropped, as are lines with no non-empty cell.
pub fn rows_from_grid(header: &[String], records: &[Vec<String>]) -> Vec<LeadRow> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let mut row = LeadRow::new();
        for (idx, name) in header.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let value = record.get(idx).map(String::as_str).unwrap_or("");
            row.insert(name.as_str(), value);
        }
        rows.push(row);
    }

    rows
}
