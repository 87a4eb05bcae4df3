// Property-based tests for dedup admission and column ordering.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use leadmerge_engine::{resolve_column_order, DedupKey, DedupKeyFields, DedupStore, LeadRow};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small alphabets so duplicates are common.
fn arb_lead() -> impl Strategy<Value = LeadRow> {
    (
        prop_oneof![Just(None), r"[AB]{0,2}".prop_map(Some)],
        prop_oneof![Just(None), r"[12]{0,2}".prop_map(Some)],
        r"[a-z]{0,3}",
    )
        .prop_map(|(title, phone, tag)| {
            let mut row = LeadRow::new();
            if let Some(t) = title {
                row.insert("Title", t);
            }
            if let Some(p) = phone {
                row.insert("Phone", p);
            }
            row.insert("Tag", tag);
            row
        })
}

fn arb_column_name() -> impl Strategy<Value = String> {
    r"[A-F]"
}

fn arb_row_of_columns() -> impl Strategy<Value = LeadRow> {
    prop::collection::vec(arb_column_name(), 0..5)
        .prop_map(|cols| LeadRow::from_pairs(cols.into_iter().map(|c| (c, "v"))))
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn accepted_rows_have_unique_keys(rows in prop::collection::vec(arb_lead(), 0..40)) {
        let mut store = DedupStore::default();
        for row in rows {
            store.accept(row);
        }

        let fields = DedupKeyFields::default();
        let keys: Vec<DedupKey> = store.rows().iter().map(|r| fields.key_for(r)).collect();
        let unique: HashSet<&DedupKey> = keys.iter().collect();
        prop_assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn first_occurrence_is_the_survivor(rows in prop::collection::vec(arb_lead(), 0..40)) {
        let fields = DedupKeyFields::default();
        let mut expected: Vec<LeadRow> = Vec::new();
        let mut seen = HashSet::new();
        for row in &rows {
            if seen.insert(fields.key_for(row)) {
                expected.push(row.clone());
            }
        }

        let mut store = DedupStore::default();
        for row in rows {
            store.accept(row);
        }
        prop_assert_eq!(store.rows(), expected.as_slice());
    }

    #[test]
    fn seeding_with_merged_output_is_idempotent(rows in prop::collection::vec(arb_lead(), 0..40)) {
        let mut first = DedupStore::default();
        for row in rows.clone() {
            first.accept(row);
        }
        let merged = first.into_rows();

        // Second run: seed with the previous output, re-ingest the same input
        let mut second = DedupStore::default();
        second.seed(merged.clone());
        let new_records = rows.into_iter().filter(|r| second.accept(r.clone())).count();
        prop_assert_eq!(new_records, 0);
        prop_assert_eq!(second.rows(), merged.as_slice());
    }
}

// ---------------------------------------------------------------------------
// Column order
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn column_order_starts_with_prefix(
        rows in prop::collection::vec(arb_row_of_columns(), 0..10),
        prefix in prop::collection::hash_set(arb_column_name(), 0..4),
    ) {
        let prefix: Vec<String> = prefix.into_iter().collect();
        let order = resolve_column_order(&rows, &prefix);
        prop_assert_eq!(&order[..prefix.len()], prefix.as_slice());
    }

    #[test]
    fn column_order_remainder_is_first_appearance(
        rows in prop::collection::vec(arb_row_of_columns(), 0..10),
        prefix in prop::collection::hash_set(arb_column_name(), 0..4),
    ) {
        let prefix: Vec<String> = prefix.into_iter().collect();
        let order = resolve_column_order(&rows, &prefix);

        let mut expected: Vec<String> = Vec::new();
        for row in &rows {
            for col in row.columns() {
                if !prefix.iter().any(|p| p == col) && !expected.iter().any(|e| e == col) {
                    expected.push(col.to_string());
                }
            }
        }
        prop_assert_eq!(&order[prefix.len()..], expected.as_slice());
    }
}
