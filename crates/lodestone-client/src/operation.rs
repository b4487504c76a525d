//! Single query execution
//!
//! A [`QueryOperation`] owns one compiled query and walks it through
//! request creation, result acceptance and hydration. Each step checks the
//! current [`OperationState`] so steps cannot run out of order.

use std::sync::Arc;
use std::time::Instant;

use lodestone_query::token::FieldsToFetchToken;
use lodestone_query::CompiledQuery;
use tracing::{debug, info, warn};

use crate::error::{OperationError, OperationResult};
use crate::hydrate::hydrate;
use crate::result::QueryResult;
use crate::shape::EntityShape;
use crate::traits::{CachingSuppression, EntityRegistration, QueryRequest, QueryTransport, SessionOperations};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    RequestBuilt,
    Sent,
    ResultReceived,
    Hydrated,
    Failed,
}

#[derive(Debug)]
pub struct QueryOperation {
    compiled: CompiledQuery,
    index_name: Option<String>,
    fields_to_fetch: Option<FieldsToFetchToken>,
    disable_entities_tracking: bool,
    metadata_only: bool,
    index_entries_only: bool,
    state: OperationState,
    started: Option<Instant>,
    current: Option<QueryResult>,
}

impl QueryOperation {
    pub fn new(
        compiled: CompiledQuery,
        fields_to_fetch: Option<FieldsToFetchToken>,
        disable_entities_tracking: bool,
    ) -> Self {
        Self {
            compiled,
            index_name: None,
            fields_to_fetch,
            disable_entities_tracking,
            metadata_only: false,
            index_entries_only: false,
            state: OperationState::Idle,
            started: None,
            current: None,
        }
    }

    pub fn with_index_name(mut self, index_name: Option<String>) -> Self {
        self.index_name = index_name;
        self
    }

    /// Ask the server for metadata only.
    pub fn metadata_only(mut self, enabled: bool) -> Self {
        self.metadata_only = enabled;
        self
    }

    /// Ask the server for raw index entries instead of documents.
    pub fn index_entries_only(mut self, enabled: bool) -> Self {
        self.index_entries_only = enabled;
        self
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn compiled(&self) -> &CompiledQuery {
        &self.compiled
    }

    pub fn current_result(&self) -> Option<&QueryResult> {
        self.current.as_ref()
    }

    /// Start the stopwatch. While waiting for non-stale results the returned
    /// guard keeps the session's aggressive cache out of the way.
    pub fn enter_query_context(
        &mut self,
        session: &dyn SessionOperations,
    ) -> Option<CachingSuppression> {
        self.start_timing();
        if self.compiled.wait_for_non_stale_results() {
            Some(session.disable_aggressive_caching())
        } else {
            None
        }
    }

    pub(crate) fn start_timing(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Build the request. Counts one request against the session budget.
    pub fn create_request(&mut self, session: &dyn SessionOperations) -> OperationResult<QueryRequest> {
        self.expect_state("create a request", &[OperationState::Idle])?;

        if let Err(e) = session.increment_request_count() {
            self.state = OperationState::Failed;
            return Err(e.into());
        }

        debug!(
            query = %self.compiled.text(),
            parameters = self.compiled.parameters().len(),
            index = ?self.index_name,
            "Executing query"
        );

        let request = QueryRequest::new(
            self.compiled.clone(),
            self.index_name.clone(),
            self.metadata_only,
            self.index_entries_only,
        );
        match request {
            Ok(request) => {
                self.state = OperationState::RequestBuilt;
                Ok(request)
            }
            Err(e) => {
                self.state = OperationState::Failed;
                Err(e)
            }
        }
    }

    pub fn mark_sent(&mut self) -> OperationResult<()> {
        self.expect_state("send the request", &[OperationState::RequestBuilt])?;
        self.state = OperationState::Sent;
        Ok(())
    }

    /// Accept the server's answer. A stale answer to a waiting query fails
    /// with the time spent waiting.
    pub fn set_result(&mut self, result: QueryResult) -> OperationResult<()> {
        self.expect_state(
            "accept a result",
            &[OperationState::RequestBuilt, OperationState::Sent],
        )?;

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();

        if self.compiled.wait_for_non_stale_results() && result.is_stale {
            warn!(
                index = ?result.index_name,
                elapsed_ms = elapsed.as_millis() as u64,
                "Query results are still stale after waiting"
            );
            self.state = OperationState::Failed;
            return Err(OperationError::StaleResults {
                elapsed,
                index_name: result.index_name,
            });
        }

        info!(
            query = %self.compiled.text(),
            parameters = self.compiled.parameters().len(),
            index = ?result.index_name,
            results = result.results.len(),
            total_results = result.total_results,
            duration_ms = result.duration_in_ms,
            stale = result.is_stale,
            "Query returned results"
        );

        self.current = Some(result);
        self.state = OperationState::ResultReceived;
        Ok(())
    }

    /// Hydrate the accepted result into `T`, registering includes and
    /// entities with the session unless tracking is disabled.
    pub fn complete<T: EntityShape>(&mut self, session: &dyn SessionOperations) -> OperationResult<Vec<T>> {
        self.expect_state("hydrate results", &[OperationState::ResultReceived])?;

        let outcome = match self.current.as_ref() {
            Some(result) => hydrate_all(
                result,
                self.fields_to_fetch.as_ref(),
                self.disable_entities_tracking,
                session,
            ),
            None => Err(OperationError::InvalidResponse("no result to hydrate".into())),
        };

        self.state = if outcome.is_ok() {
            OperationState::Hydrated
        } else {
            OperationState::Failed
        };
        outcome
    }

    /// Send the request and accept the result without hydrating it.
    pub async fn fetch(
        &mut self,
        session: &dyn SessionOperations,
        transport: &dyn QueryTransport,
    ) -> OperationResult<&QueryResult> {
        let _suppression = self.enter_query_context(session);
        let request = self.create_request(session)?;
        self.mark_sent()?;

        let result = match transport.execute(&request).await {
            Ok(result) => result,
            Err(e) => {
                self.state = OperationState::Failed;
                return Err(e.into());
            }
        };

        self.set_result(result)?;
        self.current
            .as_ref()
            .ok_or_else(|| OperationError::InvalidResponse("result was not stored".into()))
    }

    pub async fn execute<T: EntityShape>(
        &mut self,
        session: &dyn SessionOperations,
        transport: &dyn QueryTransport,
    ) -> OperationResult<Vec<T>> {
        self.fetch(session, transport).await?;
        self.complete(session)
    }

    fn expect_state(&self, action: &'static str, allowed: &[OperationState]) -> OperationResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(OperationError::UnexpectedState {
                action,
                state: self.state,
            })
        }
    }
}

fn hydrate_all<T: EntityShape>(
    result: &QueryResult,
    fields_to_fetch: Option<&FieldsToFetchToken>,
    disable_entities_tracking: bool,
    session: &dyn SessionOperations,
) -> OperationResult<Vec<T>> {
    let identity_property = session.conventions().identity_property.as_str();

    if !disable_entities_tracking {
        session.register_includes(&result.includes);
    }

    let mut entities = Vec::with_capacity(result.results.len());
    for document in &result.results {
        let hydrated = hydrate::<T>(document, fields_to_fetch, identity_property)?;

        if !disable_entities_tracking {
            if let Some(id) = hydrated.metadata.non_empty_id() {
                session.register_entity(EntityRegistration {
                    id: id.to_string(),
                    document: document.clone(),
                    metadata: hydrated.metadata.raw().clone(),
                    shape: std::any::type_name::<T>(),
                    entity: Arc::new(hydrated.entity.clone()),
                });
            }
        }
        entities.push(hydrated.entity);
    }

    if !disable_entities_tracking {
        session.register_missing_includes(&result.results, &result.includes, &result.included_paths);
    }
    Ok(entities)
}
