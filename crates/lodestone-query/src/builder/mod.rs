//! Fluent query builder
//!
//! The builder accumulates tokens per section as calls are made. Every call
//! validates its arguments before touching state, so a failed call leaves the
//! builder as it was. [`QueryBuilder::compile`] turns the state into text.

mod clauses;
mod include;
mod ordering;
mod select;

use std::collections::HashMap;
use std::time::Duration;

use lodestone_config::Conventions;
use tracing::debug;

use crate::compiled::CompiledQuery;
use crate::compiler::QueryCompiler;
use crate::error::{BuildError, BuildResult, RenderError};
use crate::parameters::Parameters;
use crate::token::{
    BooleanOperator, DeclareToken, FieldsToFetchToken, FromToken, LoadToken, QueryToken,
    WhereOperator, WhereToken,
};
use crate::value::QueryValue;

/// Where new where-clauses are appended.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ClauseTarget {
    Root,
    MoreLikeThis(MoreLikeThisScope),
}

/// Clauses collected while a more-like-this scope is open
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MoreLikeThisScope {
    pub(crate) where_tokens: Vec<QueryToken>,
    pub(crate) document_parameter: Option<String>,
    pub(crate) options_parameter: Option<String>,
    /// Subclause depth when the scope was opened
    pub(crate) base_depth: usize,
}

/// Accumulated state of one query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    conventions: Conventions,

    pub(crate) declare: Option<DeclareToken>,
    pub(crate) from: Option<FromToken>,
    pub(crate) load_tokens: Vec<LoadToken>,
    pub(crate) where_tokens: Vec<QueryToken>,
    pub(crate) group_by_tokens: Vec<QueryToken>,
    pub(crate) order_by_tokens: Vec<QueryToken>,
    pub(crate) select_tokens: Vec<QueryToken>,
    pub(crate) document_includes: Vec<String>,
    pub(crate) include_tokens: Vec<QueryToken>,

    pub(crate) target: ClauseTarget,
    pub(crate) clause_depth: usize,
    negate: bool,
    default_operator: BooleanOperator,
    pub(crate) is_group_by: bool,
    pub(crate) is_intersect: bool,
    alias_to_group_by_field: HashMap<String, String>,
    fields_to_fetch: Option<FieldsToFetchToken>,

    pub(crate) parameters: Parameters,
    pub(crate) raw_query: Option<String>,

    start: usize,
    page_size: Option<usize>,
    wait_for_non_stale_results: bool,
    wait_timeout: Option<Duration>,
    disable_caching: bool,
    disable_entities_tracking: bool,
}

impl QueryBuilder {
    /// An empty builder. A source must be set before the query compiles.
    pub fn new(conventions: Conventions) -> Self {
        let default_operator = conventions.default_operator.into();
        let disable_entities_tracking = conventions.disable_entities_tracking;
        Self {
            conventions,
            declare: None,
            from: None,
            load_tokens: Vec::new(),
            where_tokens: Vec::new(),
            group_by_tokens: Vec::new(),
            order_by_tokens: Vec::new(),
            select_tokens: Vec::new(),
            document_includes: Vec::new(),
            include_tokens: Vec::new(),
            target: ClauseTarget::Root,
            clause_depth: 0,
            negate: false,
            default_operator,
            is_group_by: false,
            is_intersect: false,
            alias_to_group_by_field: HashMap::new(),
            fields_to_fetch: None,
            parameters: Parameters::new(),
            raw_query: None,
            start: 0,
            page_size: None,
            wait_for_non_stale_results: false,
            wait_timeout: None,
            disable_caching: false,
            disable_entities_tracking,
        }
    }

    pub fn for_collection(conventions: Conventions, collection: &str) -> BuildResult<Self> {
        let mut builder = Self::new(conventions);
        builder.from_collection(collection, None)?;
        Ok(builder)
    }

    pub fn for_index(conventions: Conventions, index: &str) -> BuildResult<Self> {
        let mut builder = Self::new(conventions);
        builder.from_index(index, None)?;
        Ok(builder)
    }

    // ---- source ----

    pub fn from_collection(&mut self, collection: &str, alias: Option<&str>) -> BuildResult<&mut Self> {
        self.from = Some(FromToken::collection(collection, alias.map(str::to_string))?);
        Ok(self)
    }

    pub fn from_index(&mut self, index: &str, alias: Option<&str>) -> BuildResult<&mut Self> {
        let token = FromToken::index(index, alias.map(str::to_string))?;
        if self.is_group_by {
            return Err(BuildError::GroupByOnStaticIndex);
        }
        self.from = Some(token);
        Ok(self)
    }

    pub fn declare_function(&mut self, name: &str, parameters: &str, body: &str) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.declare = Some(DeclareToken::create(name, parameters, body)?);
        Ok(self)
    }

    /// `load argument as alias`
    pub fn load(&mut self, argument: &str, alias: &str) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.load_tokens.push(LoadToken::create(argument, alias)?);
        Ok(self)
    }

    // ---- raw mode ----

    /// Use `text` verbatim instead of fluent clauses.
    pub fn raw_query(&mut self, text: &str) -> BuildResult<&mut Self> {
        if !self.where_tokens.is_empty()
            || !self.select_tokens.is_empty()
            || !self.order_by_tokens.is_empty()
            || !self.group_by_tokens.is_empty()
            || !self.load_tokens.is_empty()
            || self.declare.is_some()
        {
            return Err(BuildError::FluentClausesPresent);
        }
        self.raw_query = Some(text.to_string());
        Ok(self)
    }

    /// Bind a caller-named parameter, e.g. for use in a raw query.
    pub fn add_parameter(&mut self, name: &str, value: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        self.parameters.insert(name, &value.into())?;
        Ok(self)
    }

    // ---- paging and execution flags ----

    pub fn skip(&mut self, count: usize) -> &mut Self {
        self.start = count;
        self
    }

    pub fn take(&mut self, count: usize) -> &mut Self {
        self.page_size = Some(count);
        self
    }

    /// Ask the server to wait until the index is up to date, up to `timeout`.
    pub fn wait_for_non_stale_results(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.wait_for_non_stale_results = true;
        self.wait_timeout = Some(timeout.unwrap_or(self.conventions.default_wait_timeout));
        self
    }

    pub fn no_caching(&mut self) -> &mut Self {
        self.disable_caching = true;
        self
    }

    /// Results of this query are not registered in the session.
    pub fn no_tracking(&mut self) -> &mut Self {
        self.disable_entities_tracking = true;
        self
    }

    // ---- compile ----

    /// Render the query text.
    pub fn to_query_text(&self) -> Result<String, RenderError> {
        QueryCompiler::new(self).render()
    }

    /// Compile text, parameters and flags into an executable query.
    pub fn compile(&self) -> Result<CompiledQuery, RenderError> {
        let text = self.to_query_text()?;
        debug!(query = %text, parameters = self.parameters.len(), "Compiled query");
        Ok(CompiledQuery::new(text, self.parameters.clone())
            .with_paging(self.start, self.page_size)
            .with_staleness(self.wait_for_non_stale_results, self.wait_timeout)
            .with_caching_disabled(self.disable_caching))
    }

    // ---- accessors ----

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn where_tokens(&self) -> &[QueryToken] {
        &self.where_tokens
    }

    pub fn select_tokens(&self) -> &[QueryToken] {
        &self.select_tokens
    }

    pub fn fields_to_fetch(&self) -> Option<&FieldsToFetchToken> {
        self.fields_to_fetch.as_ref()
    }

    pub fn index_name(&self) -> Option<&str> {
        self.from.as_ref().and_then(FromToken::index_name)
    }

    pub fn collection_name(&self) -> Option<&str> {
        self.from.as_ref().and_then(FromToken::collection_name)
    }

    pub fn clause_depth(&self) -> usize {
        self.clause_depth
    }

    pub fn is_distinct(&self) -> bool {
        matches!(self.select_tokens.first(), Some(QueryToken::Distinct))
    }

    pub fn is_group_by(&self) -> bool {
        self.is_group_by
    }

    pub fn is_intersect(&self) -> bool {
        self.is_intersect
    }

    pub fn is_raw(&self) -> bool {
        self.raw_query.is_some()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn is_waiting_for_non_stale_results(&self) -> bool {
        self.wait_for_non_stale_results
    }

    pub fn is_entities_tracking_disabled(&self) -> bool {
        self.disable_entities_tracking
    }

    /// True while a more-like-this scope collects clauses.
    pub fn is_more_like_this_open(&self) -> bool {
        matches!(self.target, ClauseTarget::MoreLikeThis(_))
    }

    // ---- shared internals ----

    pub(crate) fn assert_no_raw_query(&self) -> BuildResult<()> {
        if self.raw_query.is_some() {
            return Err(BuildError::RawQueryPresent);
        }
        Ok(())
    }

    /// Resolve a caller field name; the identity property becomes `id()`.
    pub(crate) fn resolve_field(&self, field: &str, nested_path: bool) -> BuildResult<String> {
        if field.trim().is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        if self.is_group_by {
            return Ok(field.to_string());
        }
        if !nested_path && field == self.conventions.identity_property {
            return Ok("id()".to_string());
        }
        Ok(field.to_string())
    }

    pub(crate) fn group_by_field_for_alias(&self, name: &str) -> String {
        self.alias_to_group_by_field
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    pub(crate) fn register_group_by_alias(&mut self, alias: &str, field: &str) {
        self.alias_to_group_by_field
            .insert(alias.to_string(), field.to_string());
    }

    pub(crate) fn set_fields_to_fetch(&mut self, token: FieldsToFetchToken) {
        self.fields_to_fetch = Some(token);
    }

    pub(crate) fn active_clauses(&mut self) -> &mut Vec<QueryToken> {
        match &mut self.target {
            ClauseTarget::Root => &mut self.where_tokens,
            ClauseTarget::MoreLikeThis(scope) => &mut scope.where_tokens,
        }
    }

    pub(crate) fn default_operator(&self) -> BooleanOperator {
        self.default_operator
    }

    pub(crate) fn set_default_operator(&mut self, operator: BooleanOperator) {
        self.default_operator = operator;
    }

    pub(crate) fn set_negate(&mut self) {
        self.negate = true;
    }

    /// Append a clause-producing token to the active list.
    ///
    /// Inserts the implicit boolean operator first, then the negation
    /// scaffolding when a negate is pending.
    pub(crate) fn append_clause(&mut self, token: QueryToken, field: Option<&str>) {
        let operator = self.default_operator;
        let negate = std::mem::take(&mut self.negate);
        let clauses = self.active_clauses();
        append_operator_if_needed(clauses, operator);
        if negate {
            append_negation(clauses, field);
        }
        clauses.push(token);
    }
}

/// A token after which the next clause needs a joining operator.
fn ends_clause(token: &QueryToken) -> bool {
    matches!(
        token,
        QueryToken::Where(_)
            | QueryToken::CloseSubclause
            | QueryToken::True
            | QueryToken::MoreLikeThis(_)
    )
}

pub(crate) fn append_operator_if_needed(clauses: &mut Vec<QueryToken>, default: BooleanOperator) {
    let Some(last) = clauses.last() else {
        return;
    };
    if !ends_clause(last) {
        return;
    }

    let last_where = clauses.iter().rev().find_map(QueryToken::as_where);
    let operator = match last_where {
        // terms of a search must stay "any of"
        Some(w) if w.options().search_operator().is_some() => BooleanOperator::Or,
        _ => default,
    };
    clauses.push(QueryToken::Operator(operator));
}

pub(crate) fn append_negation(clauses: &mut Vec<QueryToken>, field: Option<&str>) {
    let needs_filler = matches!(clauses.last(), None | Some(QueryToken::OpenSubclause));
    if needs_filler {
        let filler = field
            .and_then(|f| WhereToken::create(WhereOperator::Exists, f, None).ok())
            .map_or(QueryToken::True, QueryToken::Where);
        clauses.push(filler);
        clauses.push(QueryToken::Operator(BooleanOperator::And));
    }
    clauses.push(QueryToken::Negate);
}
