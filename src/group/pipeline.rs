//! High-level grouping pipeline.
//!
//! Combines input parsing (CSV with auto-detection, or a JSON array)
//! with the grouping engine, logging progress through the broadcast
//! channel. This is the layer the CLI and the HTTP API call into.

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::config::GroupConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::group::{engine::group_records, CollectedDiagnostics};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};

/// CSV input metadata, when the input was CSV.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete grouping run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    /// One output record per group, in emission order.
    pub groups: Vec<Value>,

    /// For each group, the original input indices of its members.
    pub lineage: Vec<Vec<usize>>,

    /// Number of input records.
    pub input_count: usize,

    /// Number of emitted groups.
    pub group_count: usize,

    /// Records dropped by the `skip` missing-value policy.
    pub skipped_count: usize,

    /// Non-fatal diagnostics raised while grouping.
    pub hints: Vec<String>,

    /// CSV parsing metadata, when the input was CSV.
    pub csv_info: Option<CsvInfo>,
}

/// Group already-materialized records.
pub fn group_values(records: &[Value], config: &GroupConfig) -> PipelineResult<GroupReport> {
    log_info(format!(
        "Grouping {} records by '{}'...",
        records.len(),
        config.field_to_group_by.trim()
    ));

    let mut diagnostics = CollectedDiagnostics::default();
    let grouped = group_records(records, config, &mut diagnostics)?;

    for hint in &diagnostics.hints {
        log_warning(hint.clone());
    }

    let member_count: usize = grouped.iter().map(|g| g.source_rows.len()).sum();
    let (groups, lineage): (Vec<Value>, Vec<Vec<usize>>) = grouped
        .into_iter()
        .map(|g| (g.record, g.source_rows))
        .unzip();

    log_success(format!("{} groups", groups.len()));

    Ok(GroupReport {
        group_count: groups.len(),
        input_count: records.len(),
        skipped_count: records.len() - member_count,
        groups,
        lineage,
        hints: diagnostics.hints,
        csv_info: None,
    })
}

/// Group records from a JSON array string.
pub fn group_json_str(content: &str, config: &GroupConfig) -> PipelineResult<GroupReport> {
    let value: Value = serde_json::from_str(content)?;
    let records = match value {
        Value::Array(records) => records,
        other => return Err(PipelineError::NotAnArray(json_type_name(&other).to_string())),
    };
    group_values(&records, config)
}

/// Group records from CSV bytes, with encoding and delimiter
/// auto-detection.
pub fn group_csv_bytes(bytes: &[u8], config: &GroupConfig) -> PipelineResult<GroupReport> {
    let parsed = parse_bytes_auto(bytes)?;
    log_parse(&parsed);
    let mut report = group_values(&parsed.records, config)?;
    report.csv_info = Some(csv_info(&parsed));
    Ok(report)
}

/// Group records from a file, dispatching on the extension
/// (`.csv` or `.json`).
pub fn group_file<P: AsRef<Path>>(path: P, config: &GroupConfig) -> PipelineResult<GroupReport> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let parsed = parse_csv_file_auto(path)?;
            log_parse(&parsed);
            let mut report = group_values(&parsed.records, config)?;
            report.csv_info = Some(csv_info(&parsed));
            Ok(report)
        }
        "json" => {
            let content = std::fs::read_to_string(path)?;
            group_json_str(&content, config)
        }
        other => Err(PipelineError::UnsupportedFormat(other.to_string())),
    }
}

fn log_parse(parsed: &ParseResult) {
    log_info(format!(
        "Parsed CSV: {} rows, encoding {}, delimiter '{}'",
        parsed.records.len(),
        parsed.encoding,
        format_delimiter(parsed.delimiter)
    ));
}

fn csv_info(parsed: &ParseResult) -> CsvInfo {
    CsvInfo {
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        headers: parsed.headers.clone(),
        row_count: parsed.records.len(),
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
