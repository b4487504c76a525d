//! Statistics of the last executed query

use chrono::{DateTime, Utc};

use crate::result::QueryResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStatistics {
    pub is_stale: bool,
    pub duration_in_ms: i64,
    pub total_results: usize,
    pub skipped_results: usize,
    /// When the statistics were last updated
    pub timestamp: Option<DateTime<Utc>>,
    pub index_name: Option<String>,
    pub index_timestamp: Option<DateTime<Utc>>,
    pub last_query_time: Option<DateTime<Utc>>,
    pub result_etag: Option<i64>,
}

impl QueryStatistics {
    pub fn update_from(&mut self, result: &QueryResult) {
        self.is_stale = result.is_stale;
        self.duration_in_ms = result.duration_in_ms;
        self.total_results = result.total_results;
        self.skipped_results = result.skipped_results;
        self.timestamp = Some(Utc::now());
        self.index_name = result.index_name.clone();
        self.index_timestamp = result.index_timestamp;
        self.last_query_time = result.last_query_time;
        self.result_etag = result.result_etag;
    }
}
