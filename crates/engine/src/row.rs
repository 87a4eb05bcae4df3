// Lead rows: open-schema mapping of column name to cell text

/// A single lead record.
///
/// Columns keep their insertion order so that column discovery over a set of
/// rows is deterministic. Lookups are linear; lead exports carry a handful of
/// columns, not hundreds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadRow {
    fields: Vec<(String, String)>,
}

impl LeadRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs. Later duplicates of a column
    /// overwrite earlier ones, keeping the first position.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.insert(column, value);
        }
        row
    }

    /// Set a column's value. An existing column keeps its position.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Value of `column`, or `""` when the row has no such column.
    pub fn get_or_empty(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Attach the category tag under `column`.
    pub fn with_category(mut self, column: &str, category: &str) -> Self {
        self.insert(column, category);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_empty_for_missing_column() {
        let row = LeadRow::from_pairs([("Title", "Acme")]);
        assert_eq!(row.get_or_empty("Title"), "Acme");
        assert_eq!(row.get_or_empty("Phone"), "");
        assert_eq!(row.get("Phone"), None);
    }

    #[test]
    fn test_insert_existing_column_keeps_position() {
        let mut row = LeadRow::from_pairs([("Title", "Acme"), ("Phone", "555-1")]);
        row.insert("Title", "Acme Corp");
        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["Title", "Phone"]);
        assert_eq!(row.get("Title"), Some("Acme Corp"));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_with_category_appends_tag() {
        let row = LeadRow::from_pairs([("Title", "Acme")]).with_category("LeadType", "LinkedIn");
        let cols: Vec<&str> = row.columns().collect();
        assert_eq!(cols, vec!["Title", "LeadType"]);
        assert_eq!(row.get("LeadType"), Some("LinkedIn"));
    }

    #[test]
    fn test_with_category_overrides_source_column() {
        // A CSV that already carries LeadType gets the folder name instead
        let row = LeadRow::from_pairs([("LeadType", "stale"), ("Title", "Acme")])
            .with_category("LeadType", "Maps");
        assert_eq!(row.get("LeadType"), Some("Maps"));
        assert_eq!(row.columns().next(), Some("LeadType"));
    }

    #[test]
    fn test_empty_row() {
        let row = LeadRow::new();
        assert!(row.is_empty());
        assert_eq!(row.get("Title"), None);
    }
}
