//! Wire types for the subset of the BigQuery v2 REST API the pager uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use bqpager_types::{Field, Schema};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub query: String,
    pub use_legacy_sql: bool,
    pub max_results: u32,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    pub project_id: String,
    pub job_id: String,
    #[serde(default)]
    pub location: Option<String>,
}

/// Response of `jobs.query` and `jobs.getQueryResults`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub job_reference: Option<JobReference>,
    #[serde(default)]
    pub job_complete: bool,
    #[serde(default)]
    pub schema: Option<TableSchema>,
    /// Serialized as a decimal string.
    #[serde(default)]
    pub total_rows: Option<String>,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub errors: Vec<ErrorProto>,
}

impl QueryResponse {
    pub fn total_rows(&self) -> u64 {
        self.total_rows
            .as_deref()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl TableSchema {
    pub fn to_schema(&self) -> Schema {
        Schema::new(self.fields.iter().map(TableFieldSchema::to_field).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableFieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub fields: Vec<TableFieldSchema>,
}

impl TableFieldSchema {
    pub fn is_required(&self) -> bool {
        self.mode.as_deref() == Some("REQUIRED")
    }

    pub fn to_field(&self) -> Field {
        Field::new(&self.name, &self.field_type, self.is_required())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub f: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub v: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorProto {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorProto {
    pub fn describe(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{}: {}", reason, message),
            (None, Some(message)) => message.clone(),
            (Some(reason), None) => reason.clone(),
            (None, None) => "unknown error".to_string(),
        }
    }
}

/// Response of `jobs.get`; only the fields the pager reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub statistics: Option<JobStatistics>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatistics {
    #[serde(default)]
    pub query: Option<QueryStatistics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatistics {
    #[serde(default)]
    pub cache_hit: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub error_result: Option<ErrorProto>,
}

impl Job {
    pub fn cache_hit(&self) -> bool {
        self.statistics
            .as_ref()
            .and_then(|s| s.query.as_ref())
            .and_then(|q| q.cache_hit)
            .unwrap_or(false)
    }
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS: &str = r#"{
        "kind": "bigquery#getQueryResultsResponse",
        "jobReference": {"projectId": "demo", "jobId": "job_1", "location": "US"},
        "jobComplete": true,
        "totalRows": "65",
        "pageToken": "BFY2",
        "schema": {"fields": [
            {"name": "id", "type": "INTEGER", "mode": "REQUIRED"},
            {"name": "tags", "type": "STRING", "mode": "REPEATED"},
            {"name": "note", "type": "STRING"}
        ]},
        "rows": [{"f": [{"v": "1"}, {"v": [{"v": "a"}]}, {"v": null}]}]
    }"#;

    #[test]
    fn test_decode_query_results() {
        let response: QueryResponse = serde_json::from_str(RESULTS).unwrap();
        assert!(response.job_complete);
        assert_eq!(response.total_rows(), 65);
        assert_eq!(response.page_token.as_deref(), Some("BFY2"));
        assert_eq!(response.rows.len(), 1);
        assert_eq!(
            response.job_reference.unwrap().location.as_deref(),
            Some("US")
        );
    }

    #[test]
    fn test_schema_conversion_reads_mode() {
        let response: QueryResponse = serde_json::from_str(RESULTS).unwrap();
        let schema = response.schema.unwrap().to_schema();
        let required: Vec<bool> = schema.fields().iter().map(|f| f.required).collect();
        assert_eq!(required, vec![true, false, false]);
        assert_eq!(schema.fields()[1].field_type, "STRING");
    }

    #[test]
    fn test_job_cache_hit() {
        let json = r#"{"statistics": {"query": {"cacheHit": true}}}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert!(job.cache_hit());
        assert!(!Job::default().cache_hit());
    }

    #[test]
    fn test_incomplete_job_has_no_rows() {
        let response: QueryResponse = serde_json::from_str(
            r#"{"jobReference": {"projectId": "p", "jobId": "j"}, "jobComplete": false}"#,
        )
        .unwrap();
        assert!(!response.job_complete);
        assert_eq!(response.total_rows(), 0);
        assert!(response.rows.is_empty());
    }
}
