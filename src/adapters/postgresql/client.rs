//! PostgreSQL client implementation
//!
//! Pooled access to the database that hosts the PiiCatcher catalog.

use crate::config::{redact_connection_string, PostgreSQLConfig};
use crate::domain::{PiiCatcherError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

/// Migration applied by [`PostgreSQLClient::ensure_schema`]
const CATALOG_SCHEMA_SQL: &str = include_str!("../../../migrations/001_catalog_schema.sql");

/// PostgreSQL client for the catalog
///
/// Every call to [`PostgreSQLClient::get_connection`] checks out its own
/// pooled connection with the configured statement timeout applied.
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be built. No connection is opened yet.
    pub fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config =
            config.connection_string.expose_secret().parse().map_err(|e| {
                PiiCatcherError::Configuration(format!("Invalid PostgreSQL connection string: {e}"))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                PiiCatcherError::Database(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, config })
    }

    /// Create the catalog tables and indexes if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client.batch_execute(CATALOG_SCHEMA_SQL).await?;

        tracing::debug!("PostgreSQL catalog schema ensured");
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    pub async fn get_connection(&self) -> Result<Object> {
        let client = self.pool.get().await?;

        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client.batch_execute(&timeout_query).await?;

        Ok(client)
    }

    /// Connection string with the password masked
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(&self.config.connection_string)
    }
}
