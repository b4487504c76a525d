//! Query conventions
//!
//! Conventions are read by the builder (identity field, default operator,
//! staleness timeout) and by the execution layer (request budget, page-size
//! policy, tracking default).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default boolean operator inserted between consecutive where clauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DefaultOperator {
    /// `and`
    #[default]
    And,
    /// `or`
    Or,
}

/// Conventions shared by every query created from one client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conventions {
    /// Entity field that holds the document id; renders as `id()` in queries
    pub identity_property: String,
    /// Maximum number of round trips one session may perform
    pub max_requests_per_session: u32,
    /// Staleness wait used when a query asks for non-stale results without a timeout
    #[serde(with = "duration_millis")]
    pub default_wait_timeout: Duration,
    /// Reject queries that were not given an explicit page size
    pub require_page_size: bool,
    /// Operator inserted between clauses unless the query overrides it
    pub default_operator: DefaultOperator,
    /// Skip identity-map registration for every query by default
    pub disable_entities_tracking: bool,
    /// Distance error percentage the server assumes for spatial clauses
    pub default_distance_error_pct: f64,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            identity_property: "id".to_string(),
            max_requests_per_session: 30,
            default_wait_timeout: Duration::from_secs(15),
            require_page_size: false,
            default_operator: DefaultOperator::And,
            disable_entities_tracking: false,
            default_distance_error_pct: 0.025,
        }
    }
}

impl Conventions {
    /// Conventions with a different identity property name
    pub fn with_identity_property(mut self, name: impl Into<String>) -> Self {
        self.identity_property = name.into();
        self
    }

    /// Conventions with a different request budget
    pub fn with_max_requests_per_session(mut self, max: u32) -> Self {
        self.max_requests_per_session = max;
        self
    }

    /// Conventions with a different default staleness timeout
    pub fn with_default_wait_timeout(mut self, timeout: Duration) -> Self {
        self.default_wait_timeout = timeout;
        self
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
