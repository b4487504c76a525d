//! Deferred execution inside a batched multi-request

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{OperationError, OperationResult};
use crate::operation::QueryOperation;
use crate::result::QueryResult;
use crate::shape::EntityShape;
use crate::traits::SessionOperations;

/// One entry of a batched multi-request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetRequest {
    pub url: String,
    pub method: String,
    pub query: String,
    pub body: Value,
}

/// The matching entry of a batched response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BatchResponse {
    pub result: Option<Value>,
    pub status_code: u16,
    pub force_retry: bool,
}

/// A query whose request is sent by someone else
///
/// `create_request` hands out the request for the batch; the response is fed
/// back through `handle_response`, which applies the same staleness and
/// hydration rules as direct execution.
#[derive(Debug)]
pub struct LazyQueryOperation<T> {
    operation: QueryOperation,
    result: Option<QueryResult>,
    requires_retry: bool,
    _shape: PhantomData<fn() -> T>,
}

impl<T: EntityShape> LazyQueryOperation<T> {
    pub fn new(operation: QueryOperation) -> Self {
        Self {
            operation,
            result: None,
            requires_retry: false,
            _shape: PhantomData,
        }
    }

    /// Counts one request against the session budget.
    pub fn create_request(&mut self, session: &dyn SessionOperations) -> OperationResult<GetRequest> {
        self.operation.start_timing();
        let request = self.operation.create_request(session)?;
        let hash = request.query.query_hash();
        debug!(hash = %hash, "Deferred query into batch");

        Ok(GetRequest {
            url: "/queries".to_string(),
            method: "POST".to_string(),
            query: format!("?queryHash={}", urlencoding::encode(&hash)),
            body: request.body,
        })
    }

    /// Accept the batched response and hydrate it.
    ///
    /// A forced retry fails with [`OperationError::ForcedRetry`] and leaves
    /// the operation waiting for the next response.
    pub fn handle_response(
        &mut self,
        session: &dyn SessionOperations,
        response: BatchResponse,
    ) -> OperationResult<Vec<T>> {
        if response.force_retry {
            self.requires_retry = true;
            return Err(OperationError::ForcedRetry);
        }
        self.requires_retry = false;

        let raw = response.result.ok_or_else(|| {
            OperationError::InvalidResponse(format!(
                "batched response with status {} carried no result",
                response.status_code
            ))
        })?;
        let result: QueryResult =
            serde_json::from_value(raw).map_err(|e| OperationError::InvalidResponse(e.to_string()))?;

        self.operation.set_result(result.clone())?;
        self.result = Some(result);
        self.operation.complete(session)
    }

    pub fn requires_retry(&self) -> bool {
        self.requires_retry
    }

    pub fn query_result(&self) -> Option<&QueryResult> {
        self.result.as_ref()
    }

    /// Total matches reported by the accepted response
    pub fn total_results(&self) -> Option<usize> {
        self.result.as_ref().map(|r| r.total_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::session::mock::RecordingSession;
    use lodestone_config::Conventions;
    use lodestone_query::QueryBuilder;
    use serde_json::json;

    fn lazy() -> LazyQueryOperation<Value> {
        let mut builder = QueryBuilder::for_collection(Conventions::default(), "Users").unwrap();
        builder.where_equals("name", "Ann").unwrap();
        LazyQueryOperation::new(QueryOperation::new(builder.compile().unwrap(), None, false))
    }

    fn response(docs: Vec<Value>) -> BatchResponse {
        let total = docs.len();
        BatchResponse {
            result: Some(json!({ "Results": docs, "TotalResults": total })),
            status_code: 200,
            force_retry: false,
        }
    }

    #[test]
    fn test_create_request_triple() {
        let session = RecordingSession::default();
        let mut op = lazy();
        let request = op.create_request(&session).unwrap();
        assert_eq!(request.url, "/queries");
        assert_eq!(request.method, "POST");
        assert!(request.query.starts_with("?queryHash="));
        assert_eq!(request.body["Query"], "from Users where name = $p0");
        assert_eq!(session.request_count(), 1);
    }

    #[test]
    fn test_handle_response_hydrates() {
        let session = RecordingSession::default();
        let mut op = lazy();
        op.create_request(&session).unwrap();
        let list = op
            .handle_response(&session, response(vec![json!({ "Name": "Ann", "@metadata": { "@id": "users/1" } })]))
            .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(op.total_results(), Some(1));
        assert_eq!(session.registered_ids(), vec!["users/1".to_string()]);
    }

    #[test]
    fn test_forced_retry_is_surfaced() {
        let session = RecordingSession::default();
        let mut op = lazy();
        op.create_request(&session).unwrap();
        let retry = BatchResponse {
            force_retry: true,
            ..BatchResponse::default()
        };
        assert!(matches!(
            op.handle_response(&session, retry),
            Err(OperationError::ForcedRetry)
        ));
        assert!(op.requires_retry());
        assert!(op.query_result().is_none());

        let list = op.handle_response(&session, response(vec![])).unwrap();
        assert!(list.is_empty());
        assert!(!op.requires_retry());
    }

    #[test]
    fn test_missing_result_is_invalid() {
        let session = RecordingSession::default();
        let mut op = lazy();
        op.create_request(&session).unwrap();
        let empty = BatchResponse {
            status_code: 404,
            ..BatchResponse::default()
        };
        assert!(matches!(
            op.handle_response(&session, empty),
            Err(OperationError::InvalidResponse(_))
        ));
    }
}
