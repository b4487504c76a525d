//! Raw query result as returned by the server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryResult {
    pub results: Vec<Value>,
    pub includes: Map<String, Value>,
    pub included_paths: Vec<String>,
    pub is_stale: bool,
    pub index_name: Option<String>,
    pub index_timestamp: Option<DateTime<Utc>>,
    pub last_query_time: Option<DateTime<Utc>>,
    pub result_etag: Option<i64>,
    pub total_results: usize,
    pub skipped_results: usize,
    pub duration_in_ms: i64,
    pub highlightings: Option<Value>,
    pub explanations: Option<Value>,
    pub timings: Option<Value>,
    pub counter_includes: Option<Value>,
}
