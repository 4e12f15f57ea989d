//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::GroupConfig;
use crate::group::pipeline::GroupReport;

/// Request body for `POST /api/group`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRequest {
    /// Records to group.
    pub records: Vec<Value>,
    /// Grouping configuration.
    pub config: GroupConfig,
}

/// Response sent after a grouping run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    /// Unique job identifier.
    pub job_id: String,

    /// Status: "ready" or "warning" (non-fatal hints raised).
    pub status: String,

    /// One record per group, in emission order.
    pub groups: Vec<Value>,

    /// For each group, the input indices of its members.
    pub lineage: Vec<Vec<usize>>,

    /// Metadata about the run.
    pub metadata: ResponseMetadata,
}

/// Metadata about the grouping run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_groups: usize,
    pub input_count: usize,
    pub skipped_count: usize,
    pub hints: Vec<String>,
    pub csv_info: Option<CsvMetadata>,
}

/// CSV input metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

impl From<GroupReport> for GroupResponse {
    fn from(report: GroupReport) -> Self {
        GroupResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if report.hints.is_empty() { "ready" } else { "warning" }.to_string(),
            groups: report.groups,
            lineage: report.lineage,
            metadata: ResponseMetadata {
                total_groups: report.group_count,
                input_count: report.input_count,
                skipped_count: report.skipped_count,
                hints: report.hints,
                csv_info: report.csv_info.map(|info| CsvMetadata {
                    encoding: info.encoding,
                    delimiter: info.delimiter.to_string(),
                    row_count: info.row_count,
                    columns: info.headers,
                }),
            },
        }
    }
}

/// Create an error response body.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "groups": [],
        "lineage": [],
        "metadata": {
            "totalGroups": 0,
            "inputCount": 0,
            "skippedCount": 0,
            "hints": []
        }
    })
}
