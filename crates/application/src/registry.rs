//! Shared route chaos registry
//!
//! One instance is created at process start and shared by every
//! request-handling task (reads) and every management task (writes).
//! Reads are frequent and must stay cheap; writes are rare and
//! operator-driven, so a single reader/writer lock around the whole
//! map is sufficient. The lock is never held across an await point.

use std::collections::HashMap;

use domain::{ChaosSpec, DomainError, RouteKey};
use parking_lot::RwLock;
use tracing::debug;

/// Concurrency-safe store of `route key -> chaos spec`.
///
/// Expired specs are not evicted here; expiry is a decision-time gate
/// in the middleware. An entry only leaves the map through
/// [`ChaosRegistry::delete`] or by being overwritten.
#[derive(Debug, Default)]
pub struct ChaosRegistry {
    routes: RwLock<HashMap<RouteKey, ChaosSpec>>,
}

impl ChaosRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `spec` and atomically replace any prior entry for `key`.
    ///
    /// Validation runs fully before any mutation: a rejected spec
    /// leaves the prior entry (if any) untouched.
    pub fn set(&self, key: RouteKey, spec: ChaosSpec) -> Result<(), DomainError> {
        spec.validate()?;
        debug!(route = %key, "setting chaos spec");
        self.routes.write().insert(key, spec);
        Ok(())
    }

    /// Read the spec for `key`, if any. No validation, no side effects.
    #[must_use]
    pub fn get(&self, key: &RouteKey) -> Option<ChaosSpec> {
        self.routes.read().get(key).cloned()
    }

    /// Remove the entry for `key`, reporting whether it existed.
    /// Deleting an absent key is not an error.
    pub fn delete(&self, key: &RouteKey) -> bool {
        let removed = self.routes.write().remove(key).is_some();
        if removed {
            debug!(route = %key, "deleted chaos spec");
        }
        removed
    }

    /// Number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    /// Whether no routes are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use domain::{DelaySpec, ErrorSpec};

    use super::*;

    fn key() -> RouteKey {
        RouteKey::new("POST", "/api/a")
    }

    fn delay_spec(millis: i64) -> ChaosSpec {
        ChaosSpec::new(
            Some(DelaySpec::new(millis, 1.0).expect("valid delay")),
            None,
            None,
        )
    }

    #[test]
    fn set_then_get_roundtrip() {
        let registry = ChaosRegistry::new();
        registry.set(key(), delay_spec(100)).expect("valid spec");

        let spec = registry.get(&key()).expect("entry present");
        assert_eq!(
            spec.delay.expect("delay present").duration,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn get_absent_key_returns_none() {
        let registry = ChaosRegistry::new();
        assert!(registry.get(&RouteKey::new("GET", "/never")).is_none());
    }

    #[test]
    fn set_replaces_prior_entry() {
        let registry = ChaosRegistry::new();
        registry.set(key(), delay_spec(100)).expect("valid spec");
        registry.set(key(), delay_spec(200)).expect("valid spec");

        let spec = registry.get(&key()).expect("entry present");
        assert_eq!(
            spec.delay.expect("delay present").duration,
            Duration::from_millis(200)
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejected_set_leaves_prior_entry_untouched() {
        let registry = ChaosRegistry::new();
        registry.set(key(), delay_spec(100)).expect("valid spec");

        let invalid = ChaosSpec {
            error: Some(ErrorSpec {
                status_code: 0,
                message: String::new(),
                probability: 1.0,
            }),
            ..ChaosSpec::default()
        };
        assert!(registry.set(key(), invalid).is_err());

        let spec = registry.get(&key()).expect("entry still present");
        assert_eq!(
            spec.delay.expect("delay present").duration,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn delete_is_idempotent() {
        let registry = ChaosRegistry::new();
        registry.set(key(), delay_spec(100)).expect("valid spec");

        assert!(registry.delete(&key()));
        assert!(!registry.delete(&key()));
        assert!(registry.get(&key()).is_none());
    }

    #[test]
    fn expired_entry_remains_retrievable() {
        let registry = ChaosRegistry::new();
        let spec = ChaosSpec {
            until: Some(chrono::Utc::now() - chrono::Duration::seconds(10)),
            ..delay_spec(100)
        };
        registry.set(key(), spec).expect("valid spec");

        let stored = registry.get(&key()).expect("still stored after expiry");
        assert!(stored.is_expired_at(chrono::Utc::now()));
    }

    #[test]
    fn concurrent_set_get_delete_on_same_key() {
        let registry = Arc::new(ChaosRegistry::new());
        let mut handles = Vec::new();

        for i in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                for j in 1..200i64 {
                    match (i + j) % 3 {
                        0 => {
                            registry
                                .set(RouteKey::new("POST", "/api/a"), delay_spec(j))
                                .expect("valid spec");
                        },
                        1 => {
                            // A read must observe a fully-written spec
                            if let Some(spec) = registry.get(&RouteKey::new("POST", "/api/a")) {
                                assert!(spec.validate().is_ok());
                            }
                        },
                        _ => {
                            registry.delete(&RouteKey::new("POST", "/api/a"));
                        },
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }

    #[test]
    fn routes_are_independent() {
        let registry = ChaosRegistry::new();
        registry
            .set(RouteKey::new("POST", "/api/a"), delay_spec(100))
            .expect("valid spec");

        assert!(registry.get(&RouteKey::new("GET", "/api/a")).is_none());
        assert!(registry.get(&RouteKey::new("POST", "/api/b")).is_none());
    }
}
