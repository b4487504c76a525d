//! Configuration errors

use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("I/O error reading {path}: {message}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error text
        message: String,
    },

    /// The file extension does not map to a supported format
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// The file content could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is out of range or missing
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
}
