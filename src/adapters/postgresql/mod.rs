//! PostgreSQL catalog storage
//!
//! This module persists the PiiCatcher catalog in PostgreSQL so that
//! incremental scans survive between runs.

pub mod catalog;
pub mod client;
pub mod models;

pub use catalog::PostgresCatalog;
pub use client::PostgreSQLClient;
