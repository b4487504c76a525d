//! Include-section calls: related documents, counters, highlights, diagnostics

use crate::error::{BuildError, BuildResult};
use crate::token::{
    CounterIncludesToken, ExplanationOptions, ExplanationToken, HighlightingOptions,
    HighlightingToken, QueryToken,
};

use super::QueryBuilder;

impl QueryBuilder {
    /// Include documents referenced by `path` in the response.
    pub fn include(&mut self, path: &str) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if path.trim().is_empty() {
            return Err(BuildError::InvalidArgument(
                "include path cannot be blank".to_string(),
            ));
        }
        if !self.document_includes.iter().any(|p| p == path) {
            self.document_includes.push(path.to_string());
        }
        Ok(self)
    }

    /// Include the named counters of the matched documents, or of the
    /// documents referenced by `path`.
    pub fn include_counters(&mut self, path: Option<&str>, names: &[&str]) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if names.is_empty() {
            return Err(BuildError::InvalidArgument(
                "counter names cannot be empty".to_string(),
            ));
        }
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        let parameter = self.parameters.bind(&names.into());
        let token = CounterIncludesToken::named(path.map(str::to_string), parameter);
        self.include_tokens.push(QueryToken::CounterIncludes(token));
        Ok(self)
    }

    pub fn include_all_counters(&mut self, path: Option<&str>) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let token = CounterIncludesToken::all(path.map(str::to_string));
        self.include_tokens.push(QueryToken::CounterIncludes(token));
        Ok(self)
    }

    /// Return highlighted fragments of `field` with the results.
    pub fn highlight(
        &mut self,
        field: &str,
        fragment_length: u32,
        fragment_count: u32,
        options: Option<&HighlightingOptions>,
    ) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let field = self.resolve_field(field, false)?;
        let options_parameter = match options {
            Some(options) => Some(self.bind_options(options)?),
            None => None,
        };
        let token = HighlightingToken::create(field, fragment_length, fragment_count, options_parameter);
        self.include_tokens.push(QueryToken::Highlighting(token));
        Ok(self)
    }

    /// Ask the server to explain scoring. Only one explanation request is kept.
    pub fn include_explanations(&mut self, options: Option<&ExplanationOptions>) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        let options_parameter = match options {
            Some(options) => Some(self.bind_options(options)?),
            None => None,
        };
        self.include_tokens
            .retain(|t| !matches!(t, QueryToken::Explanation(_)));
        self.include_tokens
            .push(QueryToken::Explanation(ExplanationToken::create(options_parameter)));
        Ok(self)
    }

    pub fn include_timings(&mut self) -> BuildResult<&mut Self> {
        self.assert_no_raw_query()?;
        if !self.include_tokens.contains(&QueryToken::Timings) {
            self.include_tokens.push(QueryToken::Timings);
        }
        Ok(self)
    }

    fn bind_options<T: serde::Serialize>(&mut self, options: &T) -> BuildResult<String> {
        let json = serde_json::to_value(options)
            .map_err(|e| BuildError::InvalidArgument(e.to_string()))?;
        Ok(self.parameters.bind_json(json))
    }
}
