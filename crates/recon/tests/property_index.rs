// Property-based tests for normalization, merge and ordering.
// CI: 128 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;
use responsa_recon::engine::{build_superset, normalize_source};
use responsa_recon::model::SourceRow;
use responsa_recon::numeral::hebrew_to_integer;
use responsa_recon::{run, IndexConfig, KeyLog, Locator, Normalizer, PrefixRule, SourceTable, SpecialCases};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_128() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(128),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn index_config() -> IndexConfig {
    IndexConfig::from_toml(
        r#"
name = "Property Index"
version = "0.1.0"

[sources]
pattern = "*.csv"
"#,
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const LETTERS: [(char, u64); 22] = [
    ('א', 1), ('ב', 2), ('ג', 3), ('ד', 4), ('ה', 5), ('ו', 6), ('ז', 7), ('ח', 8),
    ('ט', 9), ('י', 10), ('כ', 20), ('ל', 30), ('מ', 40), ('נ', 50), ('ס', 60),
    ('ע', 70), ('פ', 80), ('צ', 90), ('ק', 100), ('ר', 200), ('ש', 300), ('ת', 400),
];

fn arb_numeral() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(LETTERS.to_vec()), 1..=3)
        .prop_map(|letters| letters.into_iter().map(|(c, _)| c).collect())
}

fn arb_locator() -> impl Strategy<Value = String> {
    (arb_numeral(), arb_numeral()).prop_map(|(a, b)| format!("{a}:{b}"))
}

/// Raw key cells: mostly clean, sometimes compound, bracketed or junk.
fn arb_key_cell() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        4 => arb_locator().prop_map(Some),
        2 => (arb_locator(), arb_locator(), prop::sample::select(vec![" ", "+", " + "]))
            .prop_map(|(a, b, sep)| Some(format!("{a}{sep}{b}"))),
        1 => (arb_locator(), arb_locator()).prop_map(|(a, b)| Some(format!("{a} ({b})"))),
        1 => (prop::sample::select(LETTERS.to_vec()), arb_locator())
            .prop_map(|((prefix, _), l)| Some(format!("{prefix}-{l}"))),
        1 => Just(Some("???".to_string())),
        1 => Just(None),
    ]
}

fn arb_row() -> impl Strategy<Value = SourceRow> {
    (arb_key_cell(), prop::option::of("[a-z]{1,3}")).prop_map(|(key, value)| SourceRow {
        key,
        values: vec![value],
    })
}

fn arb_tables() -> impl Strategy<Value = Vec<SourceTable>> {
    prop::collection::vec(prop::collection::vec(arb_row(), 0..12), 1..4).prop_map(|tables| {
        tables
            .into_iter()
            .enumerate()
            .map(|(i, rows)| SourceTable {
                id: format!("s{i}"),
                columns: vec!["page".to_string()],
                rows,
            })
            .collect()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_128())]

    #[test]
    fn numeral_is_sum_of_letter_values(
        letters in prop::collection::vec(prop::sample::select(LETTERS.to_vec()), 1..6)
    ) {
        let text: String = letters.iter().map(|(c, _)| *c).collect();
        let expected: u64 = letters.iter().map(|(_, v)| v).sum();
        prop_assert_eq!(hebrew_to_integer(&text).unwrap(), expected);
    }

    #[test]
    fn accepted_locators_reparse(cell in arb_key_cell()) {
        let cases = SpecialCases::new();
        let normalizer = Normalizer::new(&cases, PrefixRule::Whole);
        let mut log = KeyLog::new();
        for locator in normalizer.normalize("p", cell.as_deref(), &mut log) {
            prop_assert!(Locator::parse(locator.as_str(), PrefixRule::Whole).is_some());
        }
    }

    #[test]
    fn one_sorted_row_per_superset_locator(tables in arb_tables()) {
        let config = index_config();
        let result = run(&config, &tables, &SpecialCases::new());

        prop_assert_eq!(result.table.rows.len(), result.superset.len());
        let distinct: HashSet<_> = result.table.rows.iter().map(|r| &r.locator).collect();
        prop_assert_eq!(distinct.len(), result.table.rows.len());

        let keys: Vec<f64> = result.table.rows.iter().map(|r| r.numeric_key.sort_value()).collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));

        for row in &result.table.rows {
            prop_assert_eq!(row.cells.len(), result.table.columns.len());
            prop_assert!(row.cells.iter().flatten().all(|c| !c.is_empty()));
        }
    }

    #[test]
    fn source_counts_partition_rows(tables in arb_tables()) {
        let result = run(&index_config(), &tables, &SpecialCases::new());
        for table in &tables {
            let stats = &result.report.sources[&table.id];
            prop_assert_eq!(stats.all_count, table.rows.len());
            prop_assert!(stats.problematic_keys >= 0);
            prop_assert_eq!(
                stats.clean_count + stats.nan_count + stats.problematic_keys as usize,
                stats.all_count
            );
        }
    }

    #[test]
    fn superset_ignores_source_order(tables in arb_tables()) {
        let cases = SpecialCases::new();
        let normalizer = Normalizer::new(&cases, PrefixRule::Whole);
        let mut log = KeyLog::new();

        let forward: Vec<_> = tables.iter().map(|t| normalize_source(&normalizer, t, &mut log)).collect();
        let backward: Vec<_> = tables.iter().rev().map(|t| normalize_source(&normalizer, t, &mut log)).collect();

        prop_assert_eq!(build_superset(&forward), build_superset(&backward));
    }
}
