//! Domain layer for the chaos middleware
//!
//! Contains the chaos specification value objects, their validation
//! rules, and domain errors. This layer has no I/O dependencies.

pub mod errors;
pub mod route_key;
pub mod spec;

pub use errors::DomainError;
pub use route_key::RouteKey;
pub use spec::{ChaosSpec, DelaySpec, ErrorSpec};
