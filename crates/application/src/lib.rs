//! Application layer for the chaos middleware
//!
//! Owns the shared route registry and the per-request injection
//! decision logic that the HTTP layer drives.

pub mod injection;
pub mod registry;

pub use injection::{DelayHit, ErrorHit, InjectionDecision, decide};
pub use registry::ChaosRegistry;
