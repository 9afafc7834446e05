//! Core scan pipeline for PiiCatcher.
//!
//! # Modules
//!
//! - [`filter`] - Include/exclude regex filtering of catalog objects
//! - [`dbinfo`] - Per-dialect count, select and sample query templates
//! - [`generators`] - Lazy column and value cursors over the catalog
//! - [`detectors`] - Metadata and datum detectors with their registry
//! - [`scanner`] - Runs detectors and writes annotations
//! - [`api`] - `scan_database` orchestration with task bookkeeping
//! - [`output`] - Nested and tabular reports
//!
//! # Scan Workflow
//!
//! 1. **Sync**: Refresh schemata, tables and columns from the live source
//! 2. **Watermark**: Read the latest task when scanning incrementally
//! 3. **Scan**: Classify columns by name (metadata) or by sampled values (data)
//! 4. **Report**: Render the full annotation state
//! 5. **Record**: Append one task, successful or failed
//!
//! # Example
//!
//! ```rust,no_run
//! use piicatcher::adapters::catalog::{Catalog, InMemoryCatalog};
//! use piicatcher::adapters::source::SqliteConnector;
//! use piicatcher::core::api::{scan_database, ScanOptions};
//! use piicatcher::core::detectors::DetectorRegistry;
//! use piicatcher::domain::SourceType;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = InMemoryCatalog::new();
//! let source = catalog.add_source("app", SourceType::Sqlite, None).await?;
//! let connector = SqliteConnector::new("app.db");
//! let registry = DetectorRegistry::with_builtin()?;
//!
//! let report = scan_database(&catalog, &connector, &registry, &source, &ScanOptions::default()).await?;
//! println!("Empty: {}", report.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod dbinfo;
pub mod detectors;
pub mod filter;
pub mod generators;
pub mod output;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::adapters::catalog::Catalog;
    use crate::adapters::source::SourceConnector;
    use crate::core::api::sync_source;
    use crate::domain::{Column, Source, SourceType};
    use chrono::Utc;
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Unsaved column with the given name and type
    pub fn column(name: &str, data_type: &str) -> Column {
        Column {
            id: 1,
            table_id: 1,
            name: name.to_string(),
            data_type: data_type.to_string(),
            sort_order: 0,
            pii_type: None,
            pii_plugin: None,
            updated_at: Utc::now(),
        }
    }

    /// Create a SQLite database file and run `statements` against it
    pub async fn sqlite_fixture(statements: &[&str]) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.db");
        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete),
            )
            .await
            .unwrap();
        for sql in statements {
            sqlx::query(sql).execute(&writer).await.unwrap();
        }
        writer.close().await;
        (dir, path)
    }

    /// Register a sqlite source named `db` and sync it from `connector`
    pub async fn sync_fixture(catalog: &dyn Catalog, connector: &dyn SourceConnector) -> Source {
        let source = catalog
            .add_source("db", SourceType::Sqlite, None)
            .await
            .unwrap();
        sync_source(catalog, connector, &source).await.unwrap();
        source
    }
}
