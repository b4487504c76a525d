//! Query execution for Lodestone
//!
//! Runs queries built with [`lodestone_query`] against a remote document
//! database and hydrates the results into typed entities. The network and
//! the session's identity map are collaborators behind the
//! [`QueryTransport`] and [`SessionOperations`] traits.
//!
//! ## Example
//!
//! ```no_run
//! use lodestone_client::{DocumentQuery, OperationResult, QueryTransport, SessionOperations};
//! use serde_json::Value;
//!
//! async fn active_users(
//!     session: &dyn SessionOperations,
//!     transport: &dyn QueryTransport,
//! ) -> OperationResult<Vec<Value>> {
//!     let mut query = DocumentQuery::<Value>::for_collection(session, transport, "Users")?;
//!     query.where_equals("active", true)?.take(20);
//!     query.to_list().await
//! }
//! ```

#![warn(clippy::all)]

pub mod document_query;
pub mod error;
pub mod hydrate;
pub mod lazy;
pub mod metadata;
pub mod operation;
pub mod result;
pub mod shape;
pub mod statistics;
pub mod traits;

pub use document_query::DocumentQuery;
pub use error::{
    OperationError, OperationResult, SessionError, TransportError, TransportResult,
};
pub use hydrate::{hydrate, Hydrated};
pub use lazy::{BatchResponse, GetRequest, LazyQueryOperation};
pub use metadata::DocumentMetadata;
pub use operation::{OperationState, QueryOperation};
pub use result::QueryResult;
pub use shape::{EntityShape, ShapeKind};
pub use statistics::QueryStatistics;
pub use traits::{
    CachingSuppression, EntityRegistration, QueryRequest, QueryTransport, SessionOperations,
};

#[cfg(feature = "test-utils")]
pub use traits::session::mock::RecordingSession;
#[cfg(feature = "test-utils")]
pub use traits::transport::mock::MockTransport;
