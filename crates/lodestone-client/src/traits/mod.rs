//! Collaborator abstractions
//!
//! The query layer never talks to the network or owns the identity map
//! itself. Both are injected behind these traits so the same operation runs
//! against a real session or the test doubles in each module's `mock`.

pub mod session;
pub mod transport;

pub use session::{CachingSuppression, EntityRegistration, SessionOperations};
pub use transport::{QueryRequest, QueryTransport};
