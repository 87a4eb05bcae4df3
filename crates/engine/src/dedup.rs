//! Dedup store: first-seen-wins admission of lead rows.
//!
//! The store owns both the seen-key set and the merged dataset, so the two
//! can never disagree. A run seeds it with whatever the output backend
//! already holds, then feeds freshly ingested rows through [`DedupStore::accept`].

use std::fmt;

use rustc_hash::FxHashSet;

use crate::row::LeadRow;

/// Joins the name-like and phone-like fields when a key is displayed.
pub const KEY_SEPARATOR: &str = "::";

/// Name-like and phone-like values of a row, compared as a pair.
/// Values containing the separator never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub name: String,
    pub phone: String,
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, KEY_SEPARATOR, self.phone)
    }
}

/// Which two fields form the composite dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupKeyFields {
    pub name_field: String,
    pub phone_field: String,
}

impl Default for DedupKeyFields {
    fn default() -> Self {
        Self {
            name_field: "Title".to_string(),
            phone_field: "Phone".to_string(),
        }
    }
}

impl DedupKeyFields {
    pub fn new(name_field: impl Into<String>, phone_field: impl Into<String>) -> Self {
        Self {
            name_field: name_field.into(),
            phone_field: phone_field.into(),
        }
    }

    /// Composite key for `row`. Absent fields count as empty text.
    pub fn key_for(&self, row: &LeadRow) -> DedupKey {
        DedupKey {
            name: row.get_or_empty(&self.name_field).to_string(),
            phone: row.get_or_empty(&self.phone_field).to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct DedupStore {
    fields: DedupKeyFields,
    seen: FxHashSet<DedupKey>,
    rows: Vec<LeadRow>,
}

impl DedupStore {
    pub fn new(fields: DedupKeyFields) -> Self {
        Self {
            fields,
            seen: FxHashSet::default(),
            rows: Vec::new(),
        }
    }

    /// Admit `row` if its key has not been seen during this run.
    ///
    /// Returns `true` when the row was appended to the merged dataset.
    pub fn accept(&mut self, row: LeadRow) -> bool {
        let key = self.fields.key_for(&row);
        if !self.seen.insert(key) {
            return false;
        }
        self.rows.push(row);
        true
    }

    /// Load pre-existing rows. Returns how many were admitted; callers must
    /// not report these as new records.
    pub fn seed<I: IntoIterator<Item = LeadRow>>(&mut self, rows: I) -> usize {
        let mut admitted = 0;
        for row in rows {
            if self.accept(row) {
                admitted += 1;
            }
        }
        admitted
    }

    /// Merged dataset in admission order.
    pub fn rows(&self) -> &[LeadRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LeadRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
