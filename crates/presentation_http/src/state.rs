//! Controller state shared across handlers

use std::sync::Arc;

use application::ChaosRegistry;

/// Shared management controller state
#[derive(Debug, Clone)]
pub struct AppState {
    /// The route chaos registry, shared with the traffic middleware
    pub registry: Arc<ChaosRegistry>,
}

impl AppState {
    /// Wrap a registry for the controller router.
    #[must_use]
    pub fn new(registry: Arc<ChaosRegistry>) -> Self {
        Self { registry }
    }
}
