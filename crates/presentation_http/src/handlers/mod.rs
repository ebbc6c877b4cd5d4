//! Management HTTP request handlers

pub mod route_spec;
