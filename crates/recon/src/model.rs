use std::collections::BTreeSet;

use serde::Serialize;

use crate::locator::Locator;
use crate::normalize::KeyLog;
use crate::numeral::NumericKey;
use crate::stats::StatsReport;

/// Header of the numeric sort column in the exported index.
pub const NUMERIC_KEY_COLUMN: &str = "numeric_key";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One catalog: its key column split off, every other column kept in order.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub id: String,
    pub columns: Vec<String>,
    pub rows: Vec<SourceRow>,
}

/// `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub key: Option<String>,
    pub values: Vec<Option<String>>,
}

/// A source table with the locators each of its rows normalized to.
#[derive(Debug)]
pub struct NormalizedSource<'t> {
    pub table: &'t SourceTable,
    /// Parallel to `table.rows`.
    pub keys: Vec<Vec<Locator>>,
    pub counts: SourceCounts,
}

/// Row-based key counts for one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    pub all: usize,
    pub clean: usize,
    pub nan: usize,
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedColumn {
    pub source: String,
    pub name: String,
    /// Exported header; `<name>_<source>` when `name` was already taken.
    pub label: String,
}

/// After cleanup: `None` means no usable data from that source, never an
/// empty list.
pub type MergedCell = Option<Vec<String>>;

/// One row per superset locator, ordered by locator.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub columns: Vec<MergedColumn>,
    pub rows: Vec<(Locator, Vec<MergedCell>)>,
}

// ---------------------------------------------------------------------------
// Flattened index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IndexRow {
    pub locator: Locator,
    /// The locator as exported (range notation rewritten).
    pub key: String,
    pub numeric_key: NumericKey,
    pub cells: Vec<Option<String>>,
}

/// Flattened merged table, sorted by numeric key with unparsed keys last.
#[derive(Debug, Clone, Serialize)]
pub struct IndexTable {
    pub key_column: String,
    pub columns: Vec<MergedColumn>,
    pub rows: Vec<IndexRow>,
}

impl IndexTable {
    pub fn headers(&self) -> Vec<&str> {
        let mut headers = vec![NUMERIC_KEY_COLUMN, self.key_column.as_str()];
        headers.extend(self.columns.iter().map(|c| c.label.as_str()));
        headers
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct IndexMeta {
    pub config_name: String,
    pub version: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone)]
pub struct IndexResult {
    pub meta: IndexMeta,
    pub table: IndexTable,
    pub superset: BTreeSet<Locator>,
    pub report: StatsReport,
    pub key_log: KeyLog,
}
