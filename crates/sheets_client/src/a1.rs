//! A1 notation helpers for the values API.

/// Quote a worksheet title for use in a range. Embedded quotes are doubled.
pub fn quote_sheet_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Range covering every cell of a worksheet.
pub fn whole_sheet(sheet: &str) -> String {
    quote_sheet_name(sheet)
}

/// Range starting at `anchor` on `sheet`, open-ended to the right and down.
pub fn sheet_range(sheet: &str, anchor: &str) -> String {
    format!("{}!{}", quote_sheet_name(sheet), anchor)
}

/// Zero-based column of a cell reference (`A1` → 0, `AA3` → 26).
pub fn column_index(cell: &str) -> Option<usize> {
    let letters: Vec<char> = cell.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let mut n = 0usize;
    for c in letters {
        n = n * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_sheet_name() {
        assert_eq!(quote_sheet_name("Leads"), "'Leads'");
        assert_eq!(quote_sheet_name("Q1 Leads"), "'Q1 Leads'");
        assert_eq!(quote_sheet_name("Bob's"), "'Bob''s'");
    }

    #[test]
    fn test_sheet_range() {
        assert_eq!(sheet_range("Lucknow", "A1"), "'Lucknow'!A1");
        assert_eq!(whole_sheet("Lucknow"), "'Lucknow'");
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("c7"), Some(2));
        assert_eq!(column_index("Z1"), Some(25));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("12"), None);
    }
}
