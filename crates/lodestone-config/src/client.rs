//! Client configuration

use crate::conventions::Conventions;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Configuration for one document-database client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Database every request targets
    pub database: String,
    /// Server URLs, in preference order
    pub urls: Vec<String>,
    /// Per-request timeout handed to the transport
    pub request_timeout_seconds: u64,
    /// Query conventions
    pub conventions: Conventions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database: String::new(),
            urls: vec!["http://127.0.0.1:8080".to_string()],
            request_timeout_seconds: 30,
            conventions: Conventions::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration for a database with default conventions
    pub fn for_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::validation("database name cannot be empty"));
        }
        if self.urls.is_empty() {
            return Err(ConfigError::validation("at least one server url is required"));
        }
        if self.conventions.max_requests_per_session == 0 {
            return Err(ConfigError::validation(
                "max_requests_per_session must be positive",
            ));
        }
        if self.conventions.identity_property.trim().is_empty() {
            return Err(ConfigError::validation("identity_property cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_database() {
        let config = ClientConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = ClientConfig::for_database("northwind");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = ClientConfig::for_database("northwind");
        config.conventions.max_requests_per_session = 0;
        assert!(config.validate().is_err());
    }
}
