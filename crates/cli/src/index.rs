//! `rindex run` / `rindex validate` / `rindex normalize`: config-driven index build.

use std::path::{Path, PathBuf};

use serde::Serialize;

use responsa_recon::engine::load_source_csv;
use responsa_recon::export::{handler_summary, index_to_csv, report_to_json, unmatched_to_text};
use responsa_recon::model::IndexMeta;
use responsa_recon::normalize::HandlerCounts;
use responsa_recon::numeral::{display_key, locator_to_numeric};
use responsa_recon::{
    IndexConfig, KeyLog, Normalizer, NumericKey, PrefixRule, ReconError, SourceTable, SpecialCases,
    StatsReport,
};

use crate::exit_codes::{EXIT_INDEX_INVALID_CONFIG, EXIT_INDEX_LOW_COVERAGE, EXIT_INDEX_RUNTIME};
use crate::CliError;

fn index_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse and validate the run config. Paths in it resolve against the
/// returned directory.
fn load_config(config_path: &Path) -> Result<(IndexConfig, PathBuf), CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        index_err(EXIT_INDEX_RUNTIME, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    let config = IndexConfig::from_toml(&config_str).map_err(|e| {
        index_err(EXIT_INDEX_INVALID_CONFIG, format!("{}: {e}", config_path.display()))
            .with_hint("fix the config, then check it with `rindex validate <config>`")
    })?;
    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((config, base_dir))
}

fn read_special_cases(path: &Path) -> Result<SpecialCases, CliError> {
    let json = std::fs::read_to_string(path).map_err(|e| {
        index_err(EXIT_INDEX_INVALID_CONFIG, format!("cannot read special cases {}: {e}", path.display()))
    })?;
    let cases = SpecialCases::from_json(&json).map_err(|e| {
        index_err(EXIT_INDEX_INVALID_CONFIG, format!("{}: {e}", path.display()))
    })?;
    if cases.is_empty() {
        log::warn!("special-case table {} has no entries", path.display());
    } else {
        log::info!("loaded {} special cases from {}", cases.len(), path.display());
    }
    Ok(cases)
}

fn load_special_cases(config: &IndexConfig, base_dir: &Path) -> Result<SpecialCases, CliError> {
    match config.special_cases {
        Some(ref file) => read_special_cases(&base_dir.join(file)),
        None => Ok(SpecialCases::new()),
    }
}

/// Source files matched by `sources.pattern`, in sorted path order.
fn discover_sources(config: &IndexConfig, base_dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    let base = base_dir.to_str().ok_or_else(|| {
        index_err(EXIT_INDEX_RUNTIME, format!("config directory is not UTF-8: {}", base_dir.display()))
    })?;
    let pattern = if base.is_empty() {
        config.sources.pattern.clone()
    } else {
        format!("{}/{}", glob::Pattern::escape(base), config.sources.pattern)
    };

    let entries = glob::glob(&pattern).map_err(|e| {
        index_err(EXIT_INDEX_INVALID_CONFIG, format!("bad sources.pattern '{}': {e}", config.sources.pattern))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| index_err(EXIT_INDEX_RUNTIME, e.to_string()))?;
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    if paths.is_empty() {
        log::warn!("no source tables matched '{pattern}'");
    }
    Ok(paths)
}

fn source_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_sources(config: &IndexConfig, paths: &[PathBuf]) -> Result<Vec<SourceTable>, CliError> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let csv_data = std::fs::read_to_string(path).map_err(|e| {
            index_err(EXIT_INDEX_RUNTIME, format!("cannot read {}: {e}", path.display()))
        })?;
        let table = load_source_csv(
            &source_id(path),
            &csv_data,
            &config.key_column,
            &config.exclude_columns,
        )
        .map_err(|e| {
            let err = index_err(EXIT_INDEX_RUNTIME, format!("{}: {e}", path.display()));
            match e {
                ReconError::MissingColumn { .. } => {
                    err.with_hint("every source needs the column named by key_column")
                }
                _ => err,
            }
        })?;
        tables.push(table);
    }
    Ok(tables)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct OutputPaths {
    index: PathBuf,
    stats: PathBuf,
    unmatched: PathBuf,
    handler_summary: PathBuf,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    meta: &'a IndexMeta,
    report: &'a StatsReport,
    handler_counts: &'a HandlerCounts,
    unmatched_keys: usize,
    outputs: OutputPaths,
}

fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| index_err(EXIT_INDEX_RUNTIME, format!("cannot write {}: {e}", path.display())))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_dir: Option<PathBuf>,
    fail_under: Option<f64>,
) -> Result<(), CliError> {
    let (config, base_dir) = load_config(&config_path)?;
    // Special cases must load before anything is normalized.
    let special_cases = load_special_cases(&config, &base_dir)?;
    let paths = discover_sources(&config, &base_dir)?;
    let tables = load_sources(&config, &paths)?;

    let result = responsa_recon::run(&config, &tables, &special_cases);

    let out_dir = output_dir.unwrap_or_else(|| base_dir.join(&config.output.dir));
    std::fs::create_dir_all(&out_dir).map_err(|e| {
        index_err(EXIT_INDEX_RUNTIME, format!("cannot create {}: {e}", out_dir.display()))
    })?;

    let version = &config.version;
    let format = config.output.summary_format;
    let outputs = OutputPaths {
        index: out_dir.join(format!("{}_{version}.csv", config.output.prefix)),
        stats: out_dir.join(format!("output_stats_v{version}.json")),
        unmatched: out_dir.join(format!("unmatched_keys_v{version}.txt")),
        handler_summary: out_dir.join(format!("handler_summary_v{version}.{}", format.extension())),
    };

    let render_err = |e: ReconError| index_err(EXIT_INDEX_RUNTIME, e.to_string());
    write_output(&outputs.index, &index_to_csv(&result.table).map_err(render_err)?)?;
    write_output(&outputs.stats, &report_to_json(&result.report).map_err(render_err)?)?;
    write_output(&outputs.unmatched, &unmatched_to_text(&result.key_log))?;
    write_output(
        &outputs.handler_summary,
        &handler_summary(&result.key_log.counts, format).map_err(render_err)?,
    )?;

    let report = &result.report;
    if json_output {
        let summary = RunSummary {
            meta: &result.meta,
            report,
            handler_counts: &result.key_log.counts,
            unmatched_keys: result.key_log.unmatched.len(),
            outputs,
        };
        let json_str = serde_json::to_string_pretty(&summary)
            .map_err(|e| index_err(EXIT_INDEX_RUNTIME, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
    }

    // Human summary to stderr
    eprintln!(
        "index {}: {} locators from {} sources, {:.1}% clean keys, {} problematic, {} unmatched fragments",
        version,
        report.num_clean_keys,
        report.num_sources,
        report.total_clean_percent,
        report.total_problematic_keys,
        result.key_log.unmatched.len(),
    );

    if let Some(threshold) = fail_under {
        if report.total_clean_percent < threshold {
            return Err(index_err(
                EXIT_INDEX_LOW_COVERAGE,
                format!(
                    "clean keys {:.1}% below --fail-under {threshold}",
                    report.total_clean_percent
                ),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let (config, base_dir) = load_config(&config_path)?;
    let special_cases = load_special_cases(&config, &base_dir)?;
    let paths = discover_sources(&config, &base_dir)?;
    eprintln!(
        "config '{}' v{} is valid: {} special cases, {} source tables, prefix rule {}",
        config.name,
        config.version,
        special_cases.len(),
        paths.len(),
        config.prefix_rule,
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct NormalizedLocator {
    locator: String,
    key: String,
    numeric_key: NumericKey,
}

#[derive(Serialize)]
struct NormalizedCell {
    input: String,
    locators: Vec<NormalizedLocator>,
    unmatched: Vec<String>,
}

pub fn cmd_normalize(
    cells: Vec<String>,
    special_cases: Option<PathBuf>,
    prefix_rule: PrefixRule,
    json_output: bool,
) -> Result<(), CliError> {
    let special_cases = match special_cases {
        Some(ref path) => read_special_cases(path)?,
        None => SpecialCases::new(),
    };
    let normalizer = Normalizer::new(&special_cases, prefix_rule);

    let results: Vec<NormalizedCell> = cells
        .into_iter()
        .map(|input| {
            let mut log = KeyLog::new();
            let locators = normalizer
                .normalize("<args>", Some(&input), &mut log)
                .into_iter()
                .map(|l| {
                    let key = display_key(l.as_str());
                    let numeric_key = locator_to_numeric(&key);
                    NormalizedLocator { locator: l.as_str().to_string(), key, numeric_key }
                })
                .collect();
            NormalizedCell { input, locators, unmatched: log.unmatched }
        })
        .collect();

    if json_output {
        let json_str = serde_json::to_string_pretty(&results)
            .map_err(|e| index_err(EXIT_INDEX_RUNTIME, format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    for cell in &results {
        println!("{}", cell.input);
        for l in &cell.locators {
            println!("  {}\t{}\t{}", l.locator, l.key, l.numeric_key);
        }
        for fragment in &cell.unmatched {
            eprintln!("  unmatched: {fragment}");
        }
    }
    Ok(())
}
