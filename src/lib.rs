// PiiCatcher - PII scanner for relational databases
// Copyright (c) 2025 Atlas Contributors
// Licensed under the MIT License

//! # PiiCatcher - PII scanner for relational databases
//!
//! PiiCatcher finds columns holding personally identifiable information in
//! SQLite, PostgreSQL, MySQL and Redshift databases and records the result
//! in a catalog.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Syncing** schemata, tables and columns of a source into a catalog
//! - **Classifying** columns by name (metadata scan) or by sampled values (data scan)
//! - **Tracking** scan runs as tasks so later scans only revisit changed columns
//! - **Reporting** annotations as flat rows or a nested JSON document
//!
//! ## Architecture
//!
//! PiiCatcher follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Scan pipeline (filters, generators, detectors, scanner, reports)
//! - [`adapters`] - Catalog storage and source database drivers
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use piicatcher::adapters::catalog::{Catalog, InMemoryCatalog};
//! use piicatcher::adapters::source::SqliteConnector;
//! use piicatcher::core::api::{scan_database, ScanOptions, ScanType};
//! use piicatcher::core::detectors::DetectorRegistry;
//! use piicatcher::domain::SourceType;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = InMemoryCatalog::new();
//!     let source = catalog.add_source("app", SourceType::Sqlite, None).await?;
//!     let connector = SqliteConnector::new("app.db");
//!     let registry = DetectorRegistry::with_builtin()?;
//!
//!     let options = ScanOptions {
//!         scan_type: ScanType::Data,
//!         ..ScanOptions::default()
//!     };
//!     let report = scan_database(&catalog, &connector, &registry, &source, &options).await?;
//!     println!("{report:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type is
//! [`domain::PiiCatcherError`]. Driver errors are carried unchanged.
//!
//! ## Logging
//!
//! PiiCatcher uses structured logging with the `tracing` crate. Every scan
//! runs inside a `scan` span carrying its `scan_id`.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
