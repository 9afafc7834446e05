//! Catalog factory
//!
//! This module creates the catalog backend selected in configuration.

use super::memory::InMemoryCatalog;
use super::traits::Catalog;
use crate::adapters::postgresql::PostgresCatalog;
use crate::config::{CatalogBackend, CatalogConfig};
use crate::domain::{PiiCatcherError, Result};
use std::sync::Arc;

/// Create a catalog based on the configuration
///
/// # Errors
///
/// Returns an error if the PostgreSQL section is missing for the
/// `postgresql` backend, or if the catalog database cannot be reached.
pub async fn create_catalog(config: &CatalogConfig) -> Result<Arc<dyn Catalog>> {
    match config.backend {
        CatalogBackend::Memory => {
            tracing::debug!("Using in-memory catalog");
            Ok(Arc::new(InMemoryCatalog::new()))
        }
        CatalogBackend::PostgreSQL => {
            let pg_config = config.postgresql.clone().ok_or_else(|| {
                PiiCatcherError::Configuration(
                    "catalog.postgresql section is required for the postgresql backend"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL catalog");
            let catalog = PostgresCatalog::connect(pg_config).await?;
            Ok(Arc::new(catalog))
        }
    }
}
