//! Configuration loading and the live configuration store

pub mod loader;
pub mod store;
