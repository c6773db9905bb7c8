use std::collections::{BTreeMap, BTreeSet};

use crate::locator::Locator;
use crate::model::NormalizedSource;

/// The data values of one source row.
pub type RowValues<'t> = &'t [Option<String>];

/// Explode each row onto the locators it cites and group by locator.
///
/// A row citing three locators lands under all three; a row citing the same
/// locator twice lands there twice. Row order is kept within each group.
/// Locators outside `superset` are dropped.
pub fn explode_and_group<'t>(
    source: &NormalizedSource<'t>,
    superset: &BTreeSet<Locator>,
) -> BTreeMap<Locator, Vec<RowValues<'t>>> {
    let mut groups: BTreeMap<Locator, Vec<RowValues<'t>>> = BTreeMap::new();
    let mut dropped = 0usize;

    for (row, locators) in source.table.rows.iter().zip(&source.keys) {
        for locator in locators {
            if !superset.contains(locator) {
                dropped += 1;
                continue;
            }
            groups
                .entry(locator.clone())
                .or_default()
                .push(row.values.as_slice());
        }
    }

    if dropped > 0 {
        log::debug!(
            "source '{}': {dropped} exploded row(s) outside the superset",
            source.table.id
        );
    }

    groups
}

/// Drop placeholder and missing entries; an empty result becomes `None`.
pub fn clean_values(values: Vec<Option<String>>, placeholder: &str) -> Option<Vec<String>> {
    let kept: Vec<String> = values
        .into_iter()
        .flatten()
        .filter(|v| v != placeholder)
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::PrefixRule;
    use crate::model::{SourceCounts, SourceRow, SourceTable};

    fn loc(s: &str) -> Locator {
        Locator::parse(s, PrefixRule::Whole).unwrap()
    }

    fn table() -> SourceTable {
        SourceTable {
            id: "a".into(),
            columns: vec!["note".into()],
            rows: vec![
                SourceRow { key: Some("א:א ב:ב".into()), values: vec![Some("first".into())] },
                SourceRow { key: Some("א:א".into()), values: vec![Some("second".into())] },
                SourceRow { key: Some("ג:ג".into()), values: vec![None] },
            ],
        }
    }

    #[test]
    fn rows_explode_onto_each_locator() {
        let table = table();
        let source = NormalizedSource {
            table: &table,
            keys: vec![vec![loc("א:א"), loc("ב:ב")], vec![loc("א:א")], vec![loc("ג:ג")]],
            counts: SourceCounts::default(),
        };
        let superset: BTreeSet<Locator> = [loc("א:א"), loc("ב:ב"), loc("ג:ג")].into();

        let groups = explode_and_group(&source, &superset);
        assert_eq!(groups.len(), 3);
        let aa: Vec<_> = groups[&loc("א:א")].iter().map(|v| v[0].as_deref()).collect();
        assert_eq!(aa, vec![Some("first"), Some("second")]);
        assert_eq!(groups[&loc("ב:ב")].len(), 1);
    }

    #[test]
    fn repeated_locator_keeps_multiplicity() {
        let table = table();
        let source = NormalizedSource {
            table: &table,
            keys: vec![vec![loc("א:א"), loc("א:א")], vec![], vec![]],
            counts: SourceCounts::default(),
        };
        let superset: BTreeSet<Locator> = [loc("א:א")].into();
        let groups = explode_and_group(&source, &superset);
        assert_eq!(groups[&loc("א:א")].len(), 2);
    }

    #[test]
    fn locators_outside_superset_are_dropped() {
        let table = table();
        let source = NormalizedSource {
            table: &table,
            keys: vec![vec![loc("א:א")], vec![], vec![loc("ג:ג")]],
            counts: SourceCounts::default(),
        };
        let superset: BTreeSet<Locator> = [loc("ג:ג")].into();
        let groups = explode_and_group(&source, &superset);
        assert_eq!(groups.keys().collect::<Vec<_>>(), vec![&loc("ג:ג")]);
    }

    #[test]
    fn clean_drops_placeholders_and_missing() {
        let values = vec![Some("--".into()), None, Some("x".into()), Some("y".into())];
        assert_eq!(clean_values(values, "--"), Some(vec!["x".into(), "y".into()]));

        let all_placeholder = vec![Some("--".into()), None];
        assert_eq!(clean_values(all_placeholder, "--"), None);
        assert_eq!(clean_values(Vec::new(), "--"), None);
    }
}
