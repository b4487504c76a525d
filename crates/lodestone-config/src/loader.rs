//! Configuration loading from disk

use crate::client::ClientConfig;
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Loads [`ClientConfig`] from TOML or JSON files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a configuration file; the format follows the extension
    pub async fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<ClientConfig> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let config = Self::parse(&content, &extension)?;
        config.validate()?;

        debug!(path = %path.display(), database = %config.database, "Loaded client configuration");
        Ok(config)
    }

    /// Parse configuration text in the given format (`toml` or `json`)
    pub fn parse(content: &str, format: &str) -> Result<ClientConfig, ConfigError> {
        match format {
            #[cfg(feature = "toml")]
            "toml" => toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string())),
            "json" => serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string())),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[cfg(feature = "toml")]
    #[tokio::test]
    async fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lodestone.toml");
        tokio::fs::write(
            &path,
            r#"
database = "northwind"
urls = ["http://db-a:8080", "http://db-b:8080"]

[conventions]
identity_property = "Id"
default_wait_timeout = 5000
"#,
        )
        .await
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).await.unwrap();
        assert_eq!(config.database, "northwind");
        assert_eq!(config.urls.len(), 2);
        assert_eq!(config.conventions.identity_property, "Id");
        assert_eq!(
            config.conventions.default_wait_timeout,
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn test_load_json_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lodestone.json");
        tokio::fs::write(&path, r#"{"database": ""}"#).await.unwrap();

        let err = ConfigLoader::load_from_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("database name cannot be empty"));
    }

    #[test]
    fn test_unsupported_format() {
        let err = ConfigLoader::parse("database: x", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
