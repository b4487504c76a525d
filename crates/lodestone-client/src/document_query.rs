//! Typed query facade bound to a session and transport

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use lodestone_query::token::QueryData;
use lodestone_query::{BuildResult, QueryBuilder};

use crate::error::{OperationError, OperationResult};
use crate::lazy::LazyQueryOperation;
use crate::operation::QueryOperation;
use crate::result::QueryResult;
use crate::shape::EntityShape;
use crate::statistics::QueryStatistics;
use crate::traits::{QueryTransport, SessionOperations};

type AfterQueryExecuted<'s> = Box<dyn Fn(&QueryResult) + Send + Sync + 's>;

/// A query whose results hydrate into `T`.
///
/// Builder calls go through `Deref` to the underlying [`QueryBuilder`];
/// terminals compile the current state and execute it.
pub struct DocumentQuery<'s, T> {
    session: &'s dyn SessionOperations,
    transport: &'s dyn QueryTransport,
    builder: QueryBuilder,
    statistics: QueryStatistics,
    last_result: Option<QueryResult>,
    listeners: Vec<AfterQueryExecuted<'s>>,
    _shape: PhantomData<fn() -> T>,
}

impl<'s, T: EntityShape> DocumentQuery<'s, T> {
    pub fn new(
        session: &'s dyn SessionOperations,
        transport: &'s dyn QueryTransport,
        builder: QueryBuilder,
    ) -> Self {
        Self {
            session,
            transport,
            builder,
            statistics: QueryStatistics::default(),
            last_result: None,
            listeners: Vec::new(),
            _shape: PhantomData,
        }
    }

    pub fn for_collection(
        session: &'s dyn SessionOperations,
        transport: &'s dyn QueryTransport,
        collection: &str,
    ) -> BuildResult<Self> {
        let builder = QueryBuilder::for_collection(session.conventions().clone(), collection)?;
        Ok(Self::new(session, transport, builder))
    }

    pub fn for_index(
        session: &'s dyn SessionOperations,
        transport: &'s dyn QueryTransport,
        index: &str,
    ) -> BuildResult<Self> {
        let builder = QueryBuilder::for_index(session.conventions().clone(), index)?;
        Ok(Self::new(session, transport, builder))
    }

    /// Project the results into a different shape.
    pub fn select_fields_as<P: EntityShape>(mut self, data: &QueryData) -> BuildResult<DocumentQuery<'s, P>> {
        self.builder.select_fields(data)?;
        Ok(DocumentQuery {
            session: self.session,
            transport: self.transport,
            builder: self.builder,
            statistics: self.statistics,
            last_result: self.last_result,
            listeners: self.listeners,
            _shape: PhantomData,
        })
    }

    pub fn add_after_query_executed_listener(
        &mut self,
        listener: impl Fn(&QueryResult) + Send + Sync + 's,
    ) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn statistics(&self) -> &QueryStatistics {
        &self.statistics
    }

    pub fn builder(&self) -> &QueryBuilder {
        &self.builder
    }

    pub fn assert_page_size_set(&self) -> OperationResult<()> {
        if self.builder.conventions().require_page_size && self.builder.page_size().is_none() {
            return Err(OperationError::PageSizeNotSet);
        }
        Ok(())
    }

    /// Compile the current builder state into an operation.
    pub fn initialize_operation(&self) -> OperationResult<QueryOperation> {
        self.assert_page_size_set()?;
        let compiled = self.builder.compile()?;
        let tracking_disabled = self.builder.is_entities_tracking_disabled()
            || self.session.conventions().disable_entities_tracking;

        Ok(QueryOperation::new(
            compiled,
            self.builder.fields_to_fetch().cloned(),
            tracking_disabled,
        )
        .with_index_name(self.builder.index_name().map(str::to_string)))
    }

    // ---- terminals ----

    pub async fn to_list(&mut self) -> OperationResult<Vec<T>> {
        self.execute().await
    }

    pub async fn first(&mut self) -> OperationResult<Option<T>> {
        self.limit_page_size(1);
        Ok(self.execute().await?.into_iter().next())
    }

    /// The only result, if any; more than one is an error.
    pub async fn single(&mut self) -> OperationResult<Option<T>> {
        self.limit_page_size(2);
        let mut list = self.execute().await?;
        if list.len() > 1 {
            return Err(OperationError::NonUniqueResult(list.len()));
        }
        Ok(list.pop())
    }

    pub async fn count(&mut self) -> OperationResult<usize> {
        self.builder.take(0);
        Ok(self.query_result().await?.total_results)
    }

    pub async fn any(&mut self) -> OperationResult<bool> {
        if self.builder.is_distinct() {
            self.limit_page_size(1);
            return Ok(!self.execute().await?.is_empty());
        }
        self.builder.take(0);
        Ok(self.query_result().await?.total_results > 0)
    }

    /// Execute without hydrating and return the raw result.
    pub async fn query_result(&mut self) -> OperationResult<QueryResult> {
        let mut operation = self.initialize_operation()?;
        let result = operation.fetch(self.session, self.transport).await?.clone();
        self.record(result.clone());
        Ok(result)
    }

    pub fn lazily(&mut self) -> OperationResult<LazyQueryOperation<T>> {
        Ok(LazyQueryOperation::new(self.initialize_operation()?))
    }

    /// Read the count from `total_results` once the response is handled.
    pub fn count_lazily(&mut self) -> OperationResult<LazyQueryOperation<T>> {
        self.builder.take(0);
        self.lazily()
    }

    /// Raw result of the last executed query
    pub fn last_result(&self) -> Option<&QueryResult> {
        self.last_result.as_ref()
    }

    async fn execute(&mut self) -> OperationResult<Vec<T>> {
        let mut operation = self.initialize_operation()?;
        let result = operation.fetch(self.session, self.transport).await?.clone();
        self.record(result);
        operation.complete(self.session)
    }

    fn record(&mut self, result: QueryResult) {
        self.statistics.update_from(&result);
        for listener in &self.listeners {
            listener(&result);
        }
        self.last_result = Some(result);
    }

    fn limit_page_size(&mut self, limit: usize) {
        match self.builder.page_size() {
            Some(size) if size <= limit => {}
            _ => {
                self.builder.take(limit);
            }
        }
    }
}

impl<T> Deref for DocumentQuery<'_, T> {
    type Target = QueryBuilder;

    fn deref(&self) -> &QueryBuilder {
        &self.builder
    }
}

impl<T> DerefMut for DocumentQuery<'_, T> {
    fn deref_mut(&mut self) -> &mut QueryBuilder {
        &mut self.builder
    }
}
