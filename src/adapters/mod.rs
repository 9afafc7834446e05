//! External system integrations for PiiCatcher.
//!
//! - [`catalog`] - Metadata catalog abstraction with in-memory and
//!   PostgreSQL backends
//! - [`postgresql`] - PostgreSQL catalog storage
//! - [`source`] - Drivers for the databases being scanned
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits
//! ([`catalog::Catalog`], [`source::SourceConnector`]) so the scan pipeline
//! can be exercised against SQLite files and the in-memory catalog.
//!
//! ```rust,no_run
//! use piicatcher::adapters::catalog::{Catalog, InMemoryCatalog};
//! use piicatcher::domain::SourceType;
//!
//! # async fn example() -> piicatcher::domain::Result<()> {
//! let catalog = InMemoryCatalog::new();
//! let source = catalog.add_source("warehouse", SourceType::Sqlite, None).await?;
//! assert_eq!(catalog.get_source("warehouse").await?, source);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod postgresql;
pub mod source;
