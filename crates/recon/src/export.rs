//! Render run outputs to strings. Writing them to disk is the caller's job.

use crate::config::SummaryFormat;
use crate::error::ReconError;
use crate::model::IndexTable;
use crate::normalize::{HandlerCounts, KeyLog};
use crate::stats::StatsReport;

fn csv_into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, ReconError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::Csv(e.to_string()))
}

/// The flattened index as CSV: `numeric_key`, key column, data columns.
/// Missing cells are empty; unparsed numeric keys are `inf`.
pub fn index_to_csv(table: &IndexTable) -> Result<String, ReconError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.headers())?;
    for row in &table.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 2);
        record.push(row.numeric_key.to_string());
        record.push(row.key.clone());
        record.extend(row.cells.iter().map(|c| c.clone().unwrap_or_default()));
        writer.write_record(&record)?;
    }
    csv_into_string(writer)
}

pub fn report_to_json(report: &StatsReport) -> Result<String, ReconError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// One unmatched fragment per line.
pub fn unmatched_to_text(log: &KeyLog) -> String {
    let mut text = log.unmatched.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    text
}

pub fn handler_summary(counts: &HandlerCounts, format: SummaryFormat) -> Result<String, ReconError> {
    match format {
        SummaryFormat::Json => Ok(serde_json::to_string_pretty(counts)?),
        SummaryFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(["handler", "count"])?;
            for (name, count) in counts.entries() {
                writer.write_record([name, count.to_string().as_str()])?;
            }
            csv_into_string(writer)
        }
    }
}
