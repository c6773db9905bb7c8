use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStats {
    pub clean_count: usize,
    pub all_count: usize,
    pub nan_count: usize,
    /// `all - clean - nan`.
    pub problematic_keys: i64,
    pub clean_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub num_clean_keys: usize,
    pub num_sources: usize,
    pub version: String,
    pub sources: BTreeMap<String, SourceStats>,
    pub total_all_count: usize,
    pub total_clean_count: usize,
    pub total_nan_count: usize,
    pub total_problematic_keys: i64,
    pub total_clean_percent: f64,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-source key counts with running totals.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    sources: BTreeMap<String, SourceStats>,
    total_all_count: usize,
    total_clean_count: usize,
    total_nan_count: usize,
    total_problematic_keys: i64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record counts for a source. Recording the same source again replaces
    /// its earlier entry in both the per-source map and the totals.
    pub fn record(&mut self, source: &str, clean_count: usize, all_count: usize, nan_count: usize) {
        let problematic_keys = all_count as i64 - clean_count as i64 - nan_count as i64;
        let stats = SourceStats {
            clean_count,
            all_count,
            nan_count,
            problematic_keys,
            clean_percent: percent(clean_count, all_count),
        };

        if let Some(old) = self.sources.insert(source.to_string(), stats) {
            self.total_all_count -= old.all_count;
            self.total_clean_count -= old.clean_count;
            self.total_nan_count -= old.nan_count;
            self.total_problematic_keys -= old.problematic_keys;
        }

        self.total_all_count += all_count;
        self.total_clean_count += clean_count;
        self.total_nan_count += nan_count;
        self.total_problematic_keys += problematic_keys;
    }

    pub fn get(&self, source: &str) -> Option<&SourceStats> {
        self.sources.get(source)
    }

    pub fn total_clean_percent(&self) -> f64 {
        percent(self.total_clean_count, self.total_all_count)
    }

    pub fn report(&self, num_clean_keys: usize, num_sources: usize, version: &str) -> StatsReport {
        StatsReport {
            num_clean_keys,
            num_sources,
            version: version.to_string(),
            sources: self.sources.clone(),
            total_all_count: self.total_all_count,
            total_clean_count: self.total_clean_count,
            total_nan_count: self.total_nan_count,
            total_problematic_keys: self.total_problematic_keys,
            total_clean_percent: self.total_clean_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_single_source() {
        let mut stats = Statistics::new();
        stats.record("df_1", 10, 20, 2);

        assert_eq!(
            stats.get("df_1").unwrap(),
            &SourceStats {
                clean_count: 10,
                all_count: 20,
                nan_count: 2,
                problematic_keys: 8,
                clean_percent: 50.0,
            }
        );
        let report = stats.report(10, 1, "1.0.0");
        assert_eq!(report.total_all_count, 20);
        assert_eq!(report.total_clean_count, 10);
        assert_eq!(report.total_nan_count, 2);
        assert_eq!(report.total_problematic_keys, 8);
    }

    #[test]
    fn zero_rows_gives_zero_percent() {
        let mut stats = Statistics::new();
        stats.record("empty", 0, 0, 0);
        assert_eq!(stats.get("empty").unwrap().clean_percent, 0.0);
        assert_eq!(stats.total_clean_percent(), 0.0);
    }

    #[test]
    fn report_two_sources() {
        let mut stats = Statistics::new();
        stats.record("df_1", 10, 20, 2);
        stats.record("df_2", 15, 30, 3);

        let report = stats.report(25, 2, "0.3.2");
        assert_eq!(report.num_clean_keys, 25);
        assert_eq!(report.num_sources, 2);
        assert_eq!(report.version, "0.3.2");
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.sources["df_2"].problematic_keys, 12);
        assert_eq!(report.total_all_count, 50);
        assert_eq!(report.total_clean_count, 25);
        assert_eq!(report.total_nan_count, 5);
        assert_eq!(report.total_problematic_keys, 20);
        assert_eq!(report.total_clean_percent, 50.0);

        let totals: i64 = report.sources.values().map(|s| s.problematic_keys).sum();
        assert_eq!(totals, report.total_problematic_keys);
    }

    #[test]
    fn rerecording_replaces_previous_entry() {
        let mut stats = Statistics::new();
        stats.record("df_1", 10, 20, 2);
        stats.record("df_1", 5, 10, 1);

        let report = stats.report(5, 1, "1.0.0");
        assert_eq!(report.sources.len(), 1);
        assert_eq!(report.total_all_count, 10);
        assert_eq!(report.total_clean_count, 5);
        assert_eq!(report.total_problematic_keys, 4);
    }

    #[test]
    fn report_serializes_flat_fields() {
        let mut stats = Statistics::new();
        stats.record("a", 7, 10, 0);
        let json = serde_json::to_value(stats.report(7, 1, "1.0.0")).unwrap();
        assert_eq!(json["sources"]["a"]["problematic_keys"], 3);
        assert_eq!(json["total_clean_percent"], 70.0);
    }
}
