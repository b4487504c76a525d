//! Error types for query execution
//!
//! Transport and session failures are produced by the collaborators and
//! passed through unchanged; the operation adds its own staleness, hydration
//! and state errors.

use std::time::Duration;

use lodestone_query::{BuildError, RenderError};
use thiserror::Error;

use crate::operation::OperationState;

/// Errors produced by a [`QueryTransport`](crate::QueryTransport)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Index '{0}' does not exist")]
    IndexDoesNotExist(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Errors produced by a [`SessionOperations`](crate::SessionOperations) implementation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error(
        "The maximum number of requests ({max}) allowed for this session has been reached"
    )]
    RequestBudgetExceeded { max: u32 },
}

/// Errors raised while preparing, executing or hydrating a query
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Waited for {elapsed:?} for the query to return non stale results")]
    StaleResults {
        elapsed: Duration,
        index_name: Option<String>,
    },

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to convert document '{id}': {message}")]
    Hydration { id: String, message: String },

    #[error("Failed to serialize request: {0}")]
    Serialization(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("The batched response asked for the request to be retried")]
    ForcedRetry,

    #[error("Page size was not set explicitly; the conventions require it")]
    PageSizeNotSet,

    #[error("Expected at most one result, got {0}")]
    NonUniqueResult(usize),

    #[error("Cannot {action} while the operation is {state:?}")]
    UnexpectedState {
        action: &'static str,
        state: OperationState,
    },
}

impl OperationError {
    pub fn hydration(id: impl Into<String>, message: impl ToString) -> Self {
        OperationError::Hydration {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// True for the non-stale wait timeout
    pub fn is_stale_timeout(&self) -> bool {
        matches!(self, OperationError::StaleResults { .. })
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

pub type OperationResult<T> = Result<T, OperationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_passes_through_unchanged() {
        let err: OperationError = TransportError::IndexDoesNotExist("Users/ByName".into()).into();
        assert_eq!(err.to_string(), "Index 'Users/ByName' does not exist");
        assert!(matches!(
            err,
            OperationError::Transport(TransportError::IndexDoesNotExist(_))
        ));
    }

    #[test]
    fn test_budget_error_passes_through_unchanged() {
        let err: OperationError = SessionError::RequestBudgetExceeded { max: 30 }.into();
        assert_eq!(
            err.to_string(),
            "The maximum number of requests (30) allowed for this session has been reached"
        );
    }
}
