//! Transport abstraction for sending compiled queries

use async_trait::async_trait;
use lodestone_query::CompiledQuery;
use serde_json::Value;

use crate::error::{OperationError, OperationResult, TransportResult};
use crate::result::QueryResult;

/// A query request ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// Path and query string, e.g. `/queries?queryHash=...`
    pub path: String,
    pub body: Value,
    pub can_cache: bool,
    pub can_cache_aggressively: bool,
    pub index_name: Option<String>,
    pub query: CompiledQuery,
}

impl QueryRequest {
    pub fn new(
        query: CompiledQuery,
        index_name: Option<String>,
        metadata_only: bool,
        index_entries_only: bool,
    ) -> OperationResult<Self> {
        let mut path = format!(
            "/queries?queryHash={}",
            urlencoding::encode(&query.query_hash())
        );
        if metadata_only {
            path.push_str("&metadataOnly=true");
        }
        if index_entries_only {
            path.push_str("&debug=entries");
        }

        let body = serde_json::to_value(query.request_body())
            .map_err(|e| OperationError::Serialization(e.to_string()))?;

        Ok(Self {
            path,
            body,
            can_cache: query.can_cache(),
            can_cache_aggressively: query.can_cache_aggressively(),
            index_name,
            query,
        })
    }
}

/// Sends query requests to the server
///
/// Implementations own retries, failover and authentication. Errors are
/// returned as-is to the caller of the query.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    async fn execute(&self, request: &QueryRequest) -> TransportResult<QueryResult>;
}

#[cfg(feature = "test-utils")]
pub mod mock {
    use super::*;
    use crate::error::TransportError;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Mock transport for testing
    ///
    /// Queued responses are returned first, then the fallback response.
    /// Every request is recorded.
    pub struct MockTransport {
        queued: Arc<Mutex<VecDeque<TransportResult<QueryResult>>>>,
        fallback: Option<QueryResult>,
        requests: Arc<Mutex<Vec<QueryRequest>>>,
        server_side_wait: bool,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                queued: Arc::new(Mutex::new(VecDeque::new())),
                fallback: None,
                requests: Arc::new(Mutex::new(Vec::new())),
                server_side_wait: false,
            }
        }

        /// Answer every request with `result`
        pub fn returning(result: QueryResult) -> Self {
            Self {
                fallback: Some(result),
                ..Self::new()
            }
        }

        /// Sleep for the request's wait timeout before answering with a stale
        /// result, the way the server holds a waiting query.
        pub fn with_server_side_wait(mut self) -> Self {
            self.server_side_wait = true;
            self
        }

        pub async fn push_response(&self, result: QueryResult) {
            self.queued.lock().await.push_back(Ok(result));
        }

        pub async fn push_error(&self, error: TransportError) {
            self.queued.lock().await.push_back(Err(error));
        }

        pub async fn requests(&self) -> Vec<QueryRequest> {
            self.requests.lock().await.clone()
        }

        pub async fn request_count(&self) -> usize {
            self.requests.lock().await.len()
        }
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl QueryTransport for MockTransport {
        async fn execute(&self, request: &QueryRequest) -> TransportResult<QueryResult> {
            self.requests.lock().await.push(request.clone());

            let next = self.queued.lock().await.pop_front();
            let response = match next {
                Some(response) => response,
                None => self
                    .fallback
                    .clone()
                    .ok_or_else(|| TransportError::Network("no mock response configured".into())),
            };

            if let Ok(result) = &response {
                let waiting = request.query.wait_for_non_stale_results();
                if self.server_side_wait && waiting && result.is_stale {
                    if let Some(timeout) = request.query.wait_timeout() {
                        tokio::time::sleep(timeout).await;
                    }
                }
            }
            response
        }
    }

}
