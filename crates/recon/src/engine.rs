use std::collections::{BTreeMap, BTreeSet, HashSet};

use ordered_float::OrderedFloat;

use crate::aggregate::{clean_values, explode_and_group, RowValues};
use crate::config::IndexConfig;
use crate::error::ReconError;
use crate::locator::Locator;
use crate::model::{
    IndexMeta, IndexResult, IndexRow, IndexTable, MergedColumn, MergedTable, NormalizedSource,
    SourceCounts, SourceRow, SourceTable, NUMERIC_KEY_COLUMN,
};
use crate::normalize::{KeyLog, Normalizer};
use crate::numeral::{display_key, locator_to_numeric};
use crate::special_cases::SpecialCases;
use crate::stats::Statistics;

/// Run the whole pipeline over pre-loaded source tables.
///
/// Per-source normalization runs first and must finish for every source
/// before the superset is built and the sources are merged.
pub fn run(config: &IndexConfig, sources: &[SourceTable], special_cases: &SpecialCases) -> IndexResult {
    let normalizer = Normalizer::new(special_cases, config.prefix_rule);
    let mut key_log = KeyLog::new();
    let mut stats = Statistics::new();

    let normalized: Vec<NormalizedSource<'_>> = sources
        .iter()
        .map(|table| {
            let mut source_log = KeyLog::new();
            let source = normalize_source(&normalizer, table, &mut source_log);
            let c = source.counts;
            stats.record(&table.id, c.clean, c.all, c.nan);
            log::info!(
                "source '{}': {} rows, {} clean, {} missing, {} unmatched fragments",
                table.id,
                c.all,
                c.clean,
                c.nan,
                source_log.unmatched.len()
            );
            key_log.merge(source_log);
            source
        })
        .collect();

    let superset = build_superset(&normalized);
    let merged = merge(&normalized, &superset, &config.key_column, &config.merge.placeholder);
    let table = flatten(merged, &config.key_column, &config.merge.separator);
    let report = stats.report(superset.len(), sources.len(), &config.version);

    log::info!(
        "{} locators across {} sources, {} unmatched fragments",
        superset.len(),
        sources.len(),
        key_log.unmatched.len()
    );

    IndexResult {
        meta: IndexMeta {
            config_name: config.name.clone(),
            version: config.version.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        table,
        superset,
        report,
        key_log,
    }
}

/// Normalize every key cell of one source and count its rows.
pub fn normalize_source<'t>(
    normalizer: &Normalizer<'_>,
    table: &'t SourceTable,
    log: &mut KeyLog,
) -> NormalizedSource<'t> {
    let mut counts = SourceCounts {
        all: table.rows.len(),
        ..SourceCounts::default()
    };

    let keys: Vec<Vec<Locator>> = table
        .rows
        .iter()
        .map(|row| {
            let raw = row.key.as_deref();
            if raw.map_or(true, |r| r.trim().is_empty()) {
                counts.nan += 1;
            }
            let locators = normalizer.normalize(&table.id, raw, log);
            if !locators.is_empty() {
                counts.clean += 1;
            }
            locators
        })
        .collect();

    NormalizedSource { table, keys, counts }
}

/// Union of every locator produced by any source.
pub fn build_superset(sources: &[NormalizedSource<'_>]) -> BTreeSet<Locator> {
    sources
        .iter()
        .flat_map(|s| s.keys.iter().flatten().cloned())
        .collect()
}

/// Outer-merge all sources on locator.
///
/// Every superset locator gets exactly one row. A cell holds the values the
/// source contributed for that locator, in row order, after placeholder and
/// missing values are dropped.
pub fn merge(
    sources: &[NormalizedSource<'_>],
    superset: &BTreeSet<Locator>,
    key_column: &str,
    placeholder: &str,
) -> MergedTable {
    let columns = column_labels(sources, key_column);

    // locator → source index → exploded rows
    let mut grouped: BTreeMap<Locator, BTreeMap<usize, Vec<RowValues<'_>>>> = superset
        .iter()
        .map(|l| (l.clone(), BTreeMap::new()))
        .collect();
    for (idx, source) in sources.iter().enumerate() {
        for (locator, rows) in explode_and_group(source, superset) {
            grouped.entry(locator).or_default().insert(idx, rows);
        }
    }

    let rows = grouped
        .into_iter()
        .map(|(locator, by_source)| {
            let mut cells = Vec::with_capacity(columns.len());
            for (idx, source) in sources.iter().enumerate() {
                let rows = by_source.get(&idx);
                for col in 0..source.table.columns.len() {
                    let cell = rows.and_then(|rows| {
                        let values = rows.iter().map(|r| r.get(col).cloned().flatten()).collect();
                        clean_values(values, placeholder)
                    });
                    cells.push(cell);
                }
            }
            (locator, cells)
        })
        .collect();

    MergedTable { columns, rows }
}

/// Label each (source, column) pair, suffixing the source id on collision
/// (and a counter if that is taken too).
fn column_labels(sources: &[NormalizedSource<'_>], key_column: &str) -> Vec<MergedColumn> {
    let mut taken: HashSet<String> = [NUMERIC_KEY_COLUMN.to_string(), key_column.to_string()].into();
    let mut columns = Vec::new();
    for source in sources {
        for name in &source.table.columns {
            let mut label = name.clone();
            if taken.contains(&label) {
                label = format!("{name}_{}", source.table.id);
                let mut n = 2;
                while taken.contains(&label) {
                    label = format!("{name}_{}_{n}", source.table.id);
                    n += 1;
                }
            }
            taken.insert(label.clone());
            columns.push(MergedColumn {
                source: source.table.id.clone(),
                name: name.clone(),
                label,
            });
        }
    }
    columns
}

/// Join every list cell with `separator`, attach the numeric sort key, and
/// sort ascending with unparsed keys last.
pub fn flatten(merged: MergedTable, key_column: &str, separator: &str) -> IndexTable {
    let mut rows: Vec<IndexRow> = merged
        .rows
        .into_iter()
        .map(|(locator, cells)| {
            let key = display_key(locator.as_str());
            let numeric_key = locator_to_numeric(&key);
            IndexRow {
                locator,
                key,
                numeric_key,
                cells: cells.into_iter().map(|c| c.map(|v| v.join(separator))).collect(),
            }
        })
        .collect();

    rows.sort_by_key(|r| OrderedFloat(r.numeric_key.sort_value()));

    let unparsed = rows.iter().filter(|r| !r.numeric_key.is_numeric()).count();
    if unparsed > 0 {
        log::warn!("{unparsed} locators have no numeric key and sort last");
    }

    IndexTable {
        key_column: key_column.to_string(),
        columns: merged.columns,
        rows,
    }
}

/// Parse one headered CSV into a source table.
///
/// The key column is split off; columns in `exclude_columns` are dropped
/// (case-insensitive). Empty cells load as missing.
pub fn load_source_csv(
    source_id: &str,
    csv_data: &str,
    key_column: &str,
    exclude_columns: &[String],
) -> Result<SourceTable, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let excluded: HashSet<String> = exclude_columns.iter().map(|c| c.to_lowercase()).collect();

    let key_idx = headers
        .iter()
        .position(|h| h == key_column)
        .ok_or_else(|| ReconError::MissingColumn {
            source_id: source_id.into(),
            column: key_column.into(),
        })?;

    let kept: Vec<usize> = (0..headers.len())
        .filter(|&i| i != key_idx && !excluded.contains(&headers[i].to_lowercase()))
        .collect();

    let cell = |record: &csv::StringRecord, i: usize| -> Option<String> {
        record
            .get(i)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.to_string())
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(SourceRow {
            key: cell(&record, key_idx),
            values: kept.iter().map(|&i| cell(&record, i)).collect(),
        });
    }

    Ok(SourceTable {
        id: source_id.to_string(),
        columns: kept.iter().map(|&i| headers[i].clone()).collect(),
        rows,
    })
}
