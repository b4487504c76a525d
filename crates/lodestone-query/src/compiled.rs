//! Compiled query: text, parameters and execution flags

use serde::Serialize;
use std::time::Duration;

use crate::hash::QueryHashCalculator;
use crate::parameters::Parameters;

/// Output of the compiler. Created once per execution and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    text: String,
    parameters: Parameters,
    start: usize,
    page_size: Option<usize>,
    wait_for_non_stale_results: bool,
    wait_timeout: Option<Duration>,
    disable_caching: bool,
    skip_duplicate_checking: bool,
}

/// JSON body of a query request
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryRequestBody<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub wait_for_non_stale_results: bool,
    #[serde(skip_serializing_if = "is_zero")]
    pub start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_non_stale_results_timeout: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_caching: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skip_duplicate_checking: bool,
    pub query_parameters: &'a Parameters,
}

fn is_zero(value: &usize) -> bool {
    *value == 0
}

impl CompiledQuery {
    pub(crate) fn new(text: String, parameters: Parameters) -> Self {
        Self {
            text,
            parameters,
            start: 0,
            page_size: None,
            wait_for_non_stale_results: false,
            wait_timeout: None,
            disable_caching: false,
            skip_duplicate_checking: false,
        }
    }

    pub(crate) fn with_paging(mut self, start: usize, page_size: Option<usize>) -> Self {
        self.start = start;
        self.page_size = page_size;
        self
    }

    pub(crate) fn with_staleness(mut self, wait: bool, timeout: Option<Duration>) -> Self {
        self.wait_for_non_stale_results = wait;
        self.wait_timeout = timeout;
        self
    }

    pub(crate) fn with_caching_disabled(mut self, disabled: bool) -> Self {
        self.disable_caching = disabled;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn wait_for_non_stale_results(&self) -> bool {
        self.wait_for_non_stale_results
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout
    }

    pub fn is_caching_disabled(&self) -> bool {
        self.disable_caching
    }

    /// Responses may be served from the HTTP cache.
    pub fn can_cache(&self) -> bool {
        !self.disable_caching
    }

    /// Responses may be served from the aggressive cache without revalidation.
    pub fn can_cache_aggressively(&self) -> bool {
        self.can_cache() && !self.wait_for_non_stale_results
    }

    pub fn request_body(&self) -> QueryRequestBody<'_> {
        QueryRequestBody {
            query: &self.text,
            page_size: self.page_size,
            wait_for_non_stale_results: self.wait_for_non_stale_results,
            start: self.start,
            wait_for_non_stale_results_timeout: self
                .wait_timeout
                .filter(|_| self.wait_for_non_stale_results)
                .map(format_time_span),
            disable_caching: self.disable_caching,
            skip_duplicate_checking: self.skip_duplicate_checking,
            query_parameters: &self.parameters,
        }
    }

    /// Hash over text, flags, paging and parameters.
    pub fn query_hash(&self) -> String {
        let mut calculator = QueryHashCalculator::new();
        calculator
            .write_str(&self.text)
            .write_bool(self.wait_for_non_stale_results)
            .write_bool(self.skip_duplicate_checking)
            .write_optional_u64(self.wait_timeout.map(|t| t.as_millis() as u64))
            .write_u64(self.start as u64)
            .write_optional_u64(self.page_size.map(|p| p as u64))
            .write_parameters(&self.parameters);
        calculator.finish()
    }
}

/// `[d.]hh:mm:ss[.fffffff]`
pub fn format_time_span(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;
    let ticks = duration.subsec_nanos() / 100;

    let mut text = String::new();
    if days > 0 {
        text.push_str(&format!("{days}."));
    }
    text.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if ticks > 0 {
        text.push_str(&format!(".{ticks:07}"));
    }
    text
}
