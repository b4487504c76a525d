//! Where-section calls: comparisons, modifiers, operators and scopes

use tracing::trace;

use super::{append_negation, append_operator_if_needed, ClauseTarget, MoreLikeThisScope, QueryBuilder};
use crate::error::{BuildError, BuildResult};
use crate::token::{
    BooleanOperator, MethodType, MoreLikeThisOptions, MoreLikeThisToken, QueryToken,
    SearchOperator, ShapeToken, SpatialCriteria, WhereMethodCall, WhereOperator, WhereOptions,
    WhereToken,
};
use crate::value::{MethodCall, QueryValue};

impl QueryBuilder {
    // ---- comparisons ----

    pub fn where_equals(&mut self, field: &str, value: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        self.where_equals_with(field, value, false)
    }

    /// Equality; `exact` makes the comparison case sensitive.
    pub fn where_equals_with(
        &mut self,
        field: &str,
        value: impl Into<QueryValue>,
        exact: bool,
    ) -> BuildResult<&mut Self> {
        self.add_comparison(WhereOperator::Equals, field, value.into(), exact)
    }

    /// Equality against a server-evaluated method, e.g. a compare-exchange value.
    pub fn where_equals_method(&mut self, field: &str, method: MethodCall, exact: bool) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let method_type = MethodType::parse(&method.method)?;

        let parameters = method
            .args
            .iter()
            .map(|arg| self.parameters.bind(arg))
            .collect();
        let call = WhereMethodCall {
            method_type,
            parameters,
            property: method.access_path.clone(),
        };
        let token = WhereToken::with_options(
            WhereOperator::Equals,
            field.clone(),
            None,
            WhereOptions::method(call, exact),
        )?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    pub fn where_not_equals(&mut self, field: &str, value: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        self.where_not_equals_with(field, value, false)
    }

    pub fn where_not_equals_with(
        &mut self,
        field: &str,
        value: impl Into<QueryValue>,
        exact: bool,
    ) -> BuildResult<&mut Self> {
        self.add_comparison(WhereOperator::NotEquals, field, value.into(), exact)
    }

    /// A null lower bound means "any value".
    pub fn where_greater_than(&mut self, field: &str, value: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        let value = lower_bound(value.into());
        self.add_comparison(WhereOperator::GreaterThan, field, value, false)
    }

    pub fn where_greater_than_or_equal(
        &mut self,
        field: &str,
        value: impl Into<QueryValue>,
    ) -> BuildResult<&mut Self> {
        let value = lower_bound(value.into());
        self.add_comparison(WhereOperator::GreaterThanOrEqual, field, value, false)
    }

    /// A null upper bound compares against the null sentinel.
    pub fn where_less_than(&mut self, field: &str, value: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        let value = upper_bound(value.into());
        self.add_comparison(WhereOperator::LessThan, field, value, false)
    }

    pub fn where_less_than_or_equal(
        &mut self,
        field: &str,
        value: impl Into<QueryValue>,
    ) -> BuildResult<&mut Self> {
        let value = upper_bound(value.into());
        self.add_comparison(WhereOperator::LessThanOrEqual, field, value, false)
    }

    pub fn where_between(
        &mut self,
        field: &str,
        start: impl Into<QueryValue>,
        end: impl Into<QueryValue>,
    ) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let from = self.parameters.bind(&lower_bound(start.into()));
        let to = self.parameters.bind(&upper_bound(end.into()));
        let token = WhereToken::with_options(
            WhereOperator::Between,
            field.clone(),
            None,
            WhereOptions::range(from, to, false),
        )?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    /// Matches when the field equals any of `values`.
    pub fn where_in<I, V>(&mut self, field: &str, values: I) -> BuildResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.add_collection_clause(WhereOperator::In, field, values)
    }

    /// Matches when the (array) field contains any of `values`.
    pub fn contains_any<I, V>(&mut self, field: &str, values: I) -> BuildResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.add_collection_clause(WhereOperator::In, field, values)
    }

    /// Matches when the (array) field contains all of `values`.
    /// An empty set of values matches everything.
    pub fn contains_all<I, V>(&mut self, field: &str, values: I) -> BuildResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let flat = QueryValue::flatten(values.into_iter().map(Into::into));
        if flat.is_empty() {
            self.append_clause(QueryToken::True, Some(&field));
            return Ok(self);
        }
        let parameter = self.parameters.bind(&QueryValue::List(flat));
        let token = WhereToken::create(WhereOperator::AllIn, field.clone(), Some(parameter))?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    pub fn where_starts_with(&mut self, field: &str, prefix: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        self.add_function_clause(WhereOperator::StartsWith, field, prefix.into())
    }

    pub fn where_ends_with(&mut self, field: &str, suffix: impl Into<QueryValue>) -> BuildResult<&mut Self> {
        self.add_function_clause(WhereOperator::EndsWith, field, suffix.into())
    }

    pub fn where_regex(&mut self, field: &str, pattern: &str) -> BuildResult<&mut Self> {
        self.add_function_clause(WhereOperator::Regex, field, pattern.into())
    }

    /// Raw Lucene syntax against one field.
    pub fn where_lucene(&mut self, field: &str, clause: &str) -> BuildResult<&mut Self> {
        self.add_function_clause(WhereOperator::Lucene, field, clause.into())
    }

    pub fn where_exists(&mut self, field: &str) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let token = WhereToken::create(WhereOperator::Exists, field.clone(), None)?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    /// Full-text search; any of the terms may match.
    pub fn search(&mut self, field: &str, terms: &str) -> BuildResult<&mut Self> {
        self.search_with(field, terms, SearchOperator::Or)
    }

    pub fn search_with(&mut self, field: &str, terms: &str, operator: SearchOperator) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let parameter = self.parameters.bind(&terms.into());
        let token = WhereToken::with_options(
            WhereOperator::Search,
            field.clone(),
            Some(parameter),
            WhereOptions::search(operator),
        )?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    /// Spatial relation between a field and a shape.
    ///
    /// `distance_error_pct` defaults to the convention value and is only
    /// written to the query when it differs from it.
    pub fn spatial(
        &mut self,
        field: &str,
        criteria: &SpatialCriteria,
        distance_error_pct: Option<f64>,
    ) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let default_pct = self.conventions().default_distance_error_pct;
        if let Some(pct) = distance_error_pct {
            if !(0.0..=0.5).contains(&pct) {
                return Err(BuildError::InvalidArgument(format!(
                    "distance error percentage must be between 0 and 0.5, got {pct}"
                )));
            }
        }
        let pct = distance_error_pct.filter(|pct| (pct - default_pct).abs() > f64::EPSILON);

        let shape = match criteria {
            SpatialCriteria::Circle {
                radius,
                latitude,
                longitude,
                units,
                ..
            } => {
                let r = self.parameters.bind(&(*radius).into());
                let lat = self.parameters.bind(&(*latitude).into());
                let lng = self.parameters.bind(&(*longitude).into());
                ShapeToken::circle(&r, &lat, &lng, *units)
            }
            SpatialCriteria::Wkt { shape, .. } => {
                let p = self.parameters.bind(&shape.as_str().into());
                ShapeToken::wkt(&p)
            }
        };

        let token = WhereToken::with_options(
            WhereOperator::Spatial(criteria.relation()),
            field.clone(),
            None,
            WhereOptions::spatial(shape, pct),
        )?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    /// A clause that matches every document.
    pub fn where_true(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.append_clause(QueryToken::True, None);
        Ok(self)
    }

    // ---- modifiers of the last clause ----

    pub fn boost(&mut self, boost: f64) -> BuildResult<&mut Self> {
        if boost == 1.0 {
            return Ok(self);
        }
        if boost.is_nan() || boost <= 0.0 {
            return Err(BuildError::InvalidBoost(boost));
        }
        self.modify_last_where(|token| token.with_boost(boost))
    }

    pub fn fuzzy(&mut self, fuzzy: f64) -> BuildResult<&mut Self> {
        self.modify_last_where(|token| token.with_fuzzy(fuzzy))
    }

    pub fn proximity(&mut self, proximity: i64) -> BuildResult<&mut Self> {
        self.modify_last_where(|token| token.with_proximity(proximity))
    }

    /// Make the last clause case sensitive.
    pub fn exact(&mut self) -> BuildResult<&mut Self> {
        self.modify_last_where(|token| Ok(token.with_exact()))
    }

    // ---- operators and structure ----

    pub fn and_also(&mut self) -> BuildResult<&mut Self> {
        self.add_explicit_operator(BooleanOperator::And)
    }

    pub fn or_else(&mut self) -> BuildResult<&mut Self> {
        self.add_explicit_operator(BooleanOperator::Or)
    }

    /// Negate the next clause.
    pub fn negate_next(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.set_negate();
        Ok(self)
    }

    /// Change the implicit operator; only allowed before any clause exists.
    pub fn using_default_operator(&mut self, operator: BooleanOperator) -> BuildResult<&mut Self> {
        if !self.where_tokens.is_empty() {
            return Err(BuildError::DefaultOperatorAfterWhere);
        }
        self.set_default_operator(operator);
        Ok(self)
    }

    pub fn open_subclause(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.clause_depth += 1;
        self.append_clause(QueryToken::OpenSubclause, None);
        Ok(self)
    }

    pub fn close_subclause(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let floor = match &self.target {
            ClauseTarget::MoreLikeThis(scope) => scope.base_depth,
            ClauseTarget::Root => 0,
        };
        if self.clause_depth <= floor {
            return Err(BuildError::UnbalancedSubclause);
        }
        self.clause_depth -= 1;
        self.active_clauses().push(QueryToken::CloseSubclause);
        Ok(self)
    }

    /// Start a new intersect group; the where section renders as `intersect(...)`.
    pub fn intersect(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let clauses = self.active_clauses();
        let allowed = matches!(
            clauses.last(),
            Some(QueryToken::Where(_)) | Some(QueryToken::CloseSubclause)
        );
        if !allowed {
            return Err(BuildError::IllegalIntersect);
        }
        clauses.push(QueryToken::IntersectMarker);
        self.is_intersect = true;
        Ok(self)
    }

    // ---- more like this ----

    /// Open a more-like-this scope; clauses added until
    /// [`close_more_like_this`](Self::close_more_like_this) describe the
    /// source document.
    pub fn open_more_like_this(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if self.is_more_like_this_open() {
            return Err(BuildError::MoreLikeThisAlreadyOpen);
        }
        let operator = self.default_operator();
        append_operator_if_needed(&mut self.where_tokens, operator);
        if std::mem::take(&mut self.negate) {
            append_negation(&mut self.where_tokens, None);
        }
        self.target = ClauseTarget::MoreLikeThis(MoreLikeThisScope {
            base_depth: self.clause_depth,
            ..MoreLikeThisScope::default()
        });
        trace!("Opened more-like-this scope");
        Ok(self)
    }

    /// Use a JSON document instead of clauses to describe the source.
    pub fn more_like_this_document(&mut self, document_json: &str) -> BuildResult<&mut Self> {
        self.open_scope()?;
        let parameter = self.parameters.bind(&document_json.into());
        self.open_scope()?.document_parameter = Some(parameter);
        Ok(self)
    }

    pub fn more_like_this_options(&mut self, options: &MoreLikeThisOptions) -> BuildResult<&mut Self> {
        let json = serde_json::to_value(options)
            .map_err(|e| BuildError::InvalidArgument(e.to_string()))?;
        self.open_scope()?;
        let parameter = self.parameters.bind_json(json);
        self.open_scope()?.options_parameter = Some(parameter);
        Ok(self)
    }

    /// Close the scope and append the more-like-this clause to the where section.
    pub fn close_more_like_this(&mut self) -> BuildResult<&mut Self> {
        if self.open_scope()?.base_depth != self.clause_depth {
            return Err(BuildError::UnbalancedSubclause);
        }
        let scope = match std::mem::replace(&mut self.target, ClauseTarget::Root) {
            ClauseTarget::MoreLikeThis(scope) => scope,
            ClauseTarget::Root => return Err(BuildError::MoreLikeThisNotOpen),
        };
        let token = MoreLikeThisToken::create(
            scope.document_parameter,
            scope.options_parameter,
            scope.where_tokens,
        );
        self.where_tokens.push(QueryToken::MoreLikeThis(token));
        trace!("Closed more-like-this scope");
        Ok(self)
    }

    /// Open a scope, let `clauses` describe the source, then close it.
    pub fn more_like_this<F>(
        &mut self,
        options: Option<&MoreLikeThisOptions>,
        clauses: F,
    ) -> BuildResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> BuildResult<()>,
    {
        self.open_more_like_this()?;
        if let Some(options) = options {
            self.more_like_this_options(options)?;
        }
        clauses(self)?;
        self.close_more_like_this()
    }

    // ---- helpers ----

    fn open_scope(&mut self) -> BuildResult<&mut MoreLikeThisScope> {
        match &mut self.target {
            ClauseTarget::MoreLikeThis(scope) => Ok(scope),
            ClauseTarget::Root => Err(BuildError::MoreLikeThisNotOpen),
        }
    }

    fn add_comparison(
        &mut self,
        operator: WhereOperator,
        field: &str,
        value: QueryValue,
        exact: bool,
    ) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let parameter = self.parameters.bind(&value);
        let token = WhereToken::with_options(
            operator,
            field.clone(),
            Some(parameter),
            WhereOptions::exact(exact),
        )?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    fn add_function_clause(
        &mut self,
        operator: WhereOperator,
        field: &str,
        value: QueryValue,
    ) -> BuildResult<&mut Self> {
        self.add_comparison(operator, field, value, false)
    }

    fn add_collection_clause<I, V>(
        &mut self,
        operator: WhereOperator,
        field: &str,
        values: I,
    ) -> BuildResult<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let flat = QueryValue::flatten(values.into_iter().map(Into::into));
        let parameter = self.parameters.bind(&QueryValue::List(flat));
        let token = WhereToken::create(operator, field.clone(), Some(parameter))?;
        self.append_clause(QueryToken::Where(token), Some(&field));
        Ok(self)
    }

    fn add_explicit_operator(&mut self, operator: BooleanOperator) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let clauses = self.active_clauses();
        match clauses.last().map(QueryToken::is_operator) {
            None => {}
            Some(true) => return Err(BuildError::ConsecutiveOperators(operator.as_str())),
            Some(false) => clauses.push(QueryToken::Operator(operator)),
        }
        Ok(self)
    }

    fn modify_last_where<F>(&mut self, modify: F) -> BuildResult<&mut Self>
    where
        F: FnOnce(WhereToken) -> BuildResult<WhereToken>,
    {
        let clauses = self.active_clauses();
        let last = match clauses.last() {
            Some(QueryToken::Where(token)) => token.clone(),
            _ => return Err(BuildError::MissingWhereClause),
        };
        let modified = modify(last)?;
        if let Some(slot) = clauses.last_mut() {
            *slot = QueryToken::Where(modified);
        }
        Ok(self)
    }
}

fn lower_bound(value: QueryValue) -> QueryValue {
    if value.is_null() {
        QueryValue::String("*".to_string())
    } else {
        value
    }
}

fn upper_bound(value: QueryValue) -> QueryValue {
    if value.is_null() {
        QueryValue::String("NULL".to_string())
    } else {
        value
    }
}
