//! Select-section calls: projections, distinct, grouping, facets, suggestions

use crate::error::{BuildError, BuildResult};
use crate::token::{
    Facet, FacetToken, FieldsToFetchToken, GroupBy, GroupByCountToken, GroupByKeyToken,
    GroupBySumToken, GroupByToken, QueryData, QueryToken, SuggestToken, Suggestion,
    SuggestionOptions,
};

use super::QueryBuilder;

impl QueryBuilder {
    /// Project the listed fields instead of whole documents.
    ///
    /// Calling this again replaces the previous projection.
    pub fn select_fields(&mut self, data: &QueryData) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.assert_not_facet_or_suggest("select fields")?;
        let token = FieldsToFetchToken::create(data)?;
        let slot = self
            .select_tokens
            .iter()
            .position(|t| matches!(t, QueryToken::FieldsToFetch(_)));
        match slot {
            Some(index) => self.select_tokens[index] = QueryToken::FieldsToFetch(token.clone()),
            None => self.select_tokens.push(QueryToken::FieldsToFetch(token.clone())),
        }
        self.set_fields_to_fetch(token);
        Ok(self)
    }

    pub fn distinct(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if self.is_distinct() {
            return Err(BuildError::AlreadyDistinct);
        }
        self.assert_not_facet_or_suggest("distinct")?;
        self.select_tokens.insert(0, QueryToken::Distinct);
        Ok(self)
    }

    // ---- grouping ----

    pub fn group_by(&mut self, fields: &[&str]) -> BuildResult<&mut Self> {
        let fields: Vec<GroupBy> = fields.iter().map(|f| GroupBy::field(*f)).collect();
        self.group_by_with(&fields)
    }

    pub fn group_by_with(&mut self, fields: &[GroupBy]) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if self.from.as_ref().is_some_and(|from| !from.is_dynamic()) {
            return Err(BuildError::GroupByOnStaticIndex);
        }
        let tokens = fields
            .iter()
            .map(|g| GroupByToken::create(g.field.clone(), g.method).map(QueryToken::GroupBy))
            .collect::<BuildResult<Vec<_>>>()?;
        self.is_group_by = true;
        self.group_by_tokens.extend(tokens);
        Ok(self)
    }

    /// Select the group key. `field` may be an alias registered with
    /// [`add_group_by_alias`](Self::add_group_by_alias).
    pub fn group_by_key(&mut self, field: Option<&str>, projected: Option<&str>) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = field.map(|f| self.group_by_field_for_alias(f));
        let token = GroupByKeyToken::create(field, projected.map(str::to_string));
        self.select_tokens.push(QueryToken::GroupByKey(token));
        Ok(self)
    }

    pub fn group_by_sum(&mut self, field: &str, projected: Option<&str>) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let token = GroupBySumToken::create(field, projected.map(str::to_string))?;
        self.select_tokens.push(QueryToken::GroupBySum(token));
        Ok(self)
    }

    pub fn group_by_count(&mut self, projected: Option<&str>) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let token = GroupByCountToken::create(projected.map(str::to_string));
        self.select_tokens.push(QueryToken::GroupByCount(token));
        Ok(self)
    }

    /// Record that `alias` in the select list stands for the grouping `field`.
    pub fn add_group_by_alias(&mut self, field: &str, alias: &str) -> &mut Self {
        self.register_group_by_alias(alias, field);
        self
    }

    // ---- facets ----

    pub fn aggregate_by(&mut self, facet: &Facet) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.assert_only_facets()?;
        let token = FacetToken::from_facet(facet, &mut self.parameters)?;
        self.select_tokens.push(QueryToken::Facet(token));
        Ok(self)
    }

    /// Facets defined by a stored setup document.
    pub fn aggregate_using(&mut self, setup_document_id: &str) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        self.assert_only_facets()?;
        let token = FacetToken::from_setup_document(setup_document_id)?;
        self.select_tokens.push(QueryToken::Facet(token));
        Ok(self)
    }

    // ---- suggestions ----

    pub fn suggest_using(&mut self, suggestion: &Suggestion) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if !self.where_tokens.is_empty() || !self.order_by_tokens.is_empty() {
            return Err(BuildError::IllegalSelect(
                "suggestions cannot be combined with where or order by clauses".to_string(),
            ));
        }
        if !self.select_tokens.is_empty() {
            return Err(BuildError::IllegalSelect(
                "suggestions cannot be combined with other select entries".to_string(),
            ));
        }
        let field = suggestion.field.trim();
        if field.is_empty() {
            return Err(BuildError::BlankFieldName);
        }
        if suggestion.terms.is_empty() {
            return Err(BuildError::InvalidArgument(
                "suggestion requires at least one term".to_string(),
            ));
        }

        let term_parameter = if suggestion.terms.len() == 1 {
            self.parameters.bind(&suggestion.terms[0].as_str().into())
        } else {
            self.parameters.bind(&suggestion.terms.clone().into())
        };
        let options_parameter = match &suggestion.options {
            Some(options) if *options != SuggestionOptions::default() => {
                let json = serde_json::to_value(options)
                    .map_err(|e| BuildError::InvalidArgument(e.to_string()))?;
                Some(self.parameters.bind_json(json))
            }
            _ => None,
        };

        let token = SuggestToken::create(
            suggestion.field.clone(),
            suggestion.display_name.clone(),
            term_parameter,
            options_parameter,
        );
        self.select_tokens.push(QueryToken::Suggest(token));
        Ok(self)
    }

    fn assert_only_facets(&self) -> BuildResult<()> {
        if self
            .select_tokens
            .iter()
            .any(|t| !matches!(t, QueryToken::Facet(_)))
        {
            return Err(BuildError::IllegalSelect(
                "aggregation query can select only facets".to_string(),
            ));
        }
        Ok(())
    }

    fn assert_not_facet_or_suggest(&self, operation: &str) -> BuildResult<()> {
        let exclusive = self
            .select_tokens
            .iter()
            .any(|t| matches!(t, QueryToken::Facet(_) | QueryToken::Suggest(_)));
        if exclusive {
            return Err(BuildError::IllegalSelect(format!(
                "cannot {operation} in a facet or suggestion query"
            )));
        }
        Ok(())
    }
}
