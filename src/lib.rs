//! CiviBot library — re-exports all modules for integration testing.
//!
//! The binary (`main.rs`) and integration tests (`tests/`) both import from
//! this crate root. Module declarations here mirror those in `main.rs`.

pub mod classifier;
pub mod composer;
pub mod config;
pub mod error;
pub mod generation;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod taxonomy;
pub mod types;
