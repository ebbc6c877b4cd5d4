//! HTTP middleware components

pub mod chaos;

pub use chaos::{ChaosLayer, ChaosService, DELAY_HEADER, ERROR_HEADER};
