//! Session collaborator: request budget, caching and identity map

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use lodestone_config::Conventions;
use serde_json::{Map, Value};

use crate::error::SessionError;

/// Guard returned by [`SessionOperations::disable_aggressive_caching`].
///
/// Aggressive caching stays suppressed until the guard is dropped.
pub struct CachingSuppression {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CachingSuppression {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A guard for sessions without an aggressive cache
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for CachingSuppression {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for CachingSuppression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachingSuppression")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// A hydrated entity handed to the session's identity map.
///
/// `document` is the raw result the session diffs against on save.
#[derive(Clone)]
pub struct EntityRegistration {
    pub id: String,
    pub document: Value,
    pub metadata: Value,
    /// Type name of the hydrated shape
    pub shape: &'static str,
    pub entity: Arc<dyn Any + Send + Sync>,
}

impl EntityRegistration {
    pub fn entity<T: Any>(&self) -> Option<&T> {
        self.entity.downcast_ref::<T>()
    }
}

impl fmt::Debug for EntityRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRegistration")
            .field("id", &self.id)
            .field("shape", &self.shape)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Operations a query needs from the owning session
pub trait SessionOperations: Send + Sync {
    fn conventions(&self) -> &Conventions;

    /// Count one request against the session budget.
    fn increment_request_count(&self) -> Result<(), SessionError>;

    fn disable_aggressive_caching(&self) -> CachingSuppression;

    fn register_includes(&self, _includes: &Map<String, Value>) {}

    /// Called after hydration with the include paths the query asked for.
    fn register_missing_includes(
        &self,
        _results: &[Value],
        _includes: &Map<String, Value>,
        _included_paths: &[String],
    ) {
    }

    fn register_entity(&self, registration: EntityRegistration);
}

#[cfg(feature = "test-utils")]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Session double that records everything a query hands it
    pub struct RecordingSession {
        conventions: Conventions,
        request_count: AtomicU32,
        active_suppressions: Arc<AtomicUsize>,
        suppressions_engaged: AtomicUsize,
        registrations: Mutex<Vec<EntityRegistration>>,
        includes: Mutex<Vec<Map<String, Value>>>,
    }

    impl RecordingSession {
        pub fn new(conventions: Conventions) -> Self {
            Self {
                conventions,
                request_count: AtomicU32::new(0),
                active_suppressions: Arc::new(AtomicUsize::new(0)),
                suppressions_engaged: AtomicUsize::new(0),
                registrations: Mutex::new(Vec::new()),
                includes: Mutex::new(Vec::new()),
            }
        }

        pub fn request_count(&self) -> u32 {
            self.request_count.load(Ordering::SeqCst)
        }

        /// Guards handed out and not yet dropped
        pub fn active_suppressions(&self) -> usize {
            self.active_suppressions.load(Ordering::SeqCst)
        }

        pub fn suppressions_engaged(&self) -> usize {
            self.suppressions_engaged.load(Ordering::SeqCst)
        }

        pub fn registrations(&self) -> Vec<EntityRegistration> {
            lock(&self.registrations).clone()
        }

        pub fn registered_ids(&self) -> Vec<String> {
            lock(&self.registrations)
                .iter()
                .map(|r| r.id.clone())
                .collect()
        }

        pub fn includes(&self) -> Vec<Map<String, Value>> {
            lock(&self.includes).clone()
        }
    }

    impl Default for RecordingSession {
        fn default() -> Self {
            Self::new(Conventions::default())
        }
    }

    impl SessionOperations for RecordingSession {
        fn conventions(&self) -> &Conventions {
            &self.conventions
        }

        fn increment_request_count(&self) -> Result<(), SessionError> {
            let max = self.conventions.max_requests_per_session;
            let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
            if count > max {
                return Err(SessionError::RequestBudgetExceeded { max });
            }
            Ok(())
        }

        fn disable_aggressive_caching(&self) -> CachingSuppression {
            self.suppressions_engaged.fetch_add(1, Ordering::SeqCst);
            self.active_suppressions.fetch_add(1, Ordering::SeqCst);
            let active = Arc::clone(&self.active_suppressions);
            CachingSuppression::new(move || {
                active.fetch_sub(1, Ordering::SeqCst);
            })
        }

        fn register_includes(&self, includes: &Map<String, Value>) {
            lock(&self.includes).push(includes.clone());
        }

        fn register_entity(&self, registration: EntityRegistration) {
            lock(&self.registrations).push(registration);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_budget_is_enforced() {
            let session =
                RecordingSession::new(Conventions::default().with_max_requests_per_session(2));
            assert!(session.increment_request_count().is_ok());
            assert!(session.increment_request_count().is_ok());
            assert_eq!(
                session.increment_request_count(),
                Err(SessionError::RequestBudgetExceeded { max: 2 })
            );
        }

        #[test]
        fn test_suppression_released_on_drop() {
            let session = RecordingSession::default();
            {
                let _guard = session.disable_aggressive_caching();
                assert_eq!(session.active_suppressions(), 1);
            }
            assert_eq!(session.active_suppressions(), 0);
            assert_eq!(session.suppressions_engaged(), 1);
        }
    }
}
