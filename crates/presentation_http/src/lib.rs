//! HTTP presentation layer for the chaos middleware
//!
//! Two surfaces share one [`application::ChaosRegistry`]: the
//! [`middleware::ChaosLayer`] tower layer intercepting live traffic,
//! and the management controller mutating route specs on the fly.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use middleware::ChaosLayer;
pub use routes::create_router;
pub use server::{DEFAULT_BIND_ADDR, serve_controller};
pub use state::AppState;
