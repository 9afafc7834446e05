//! PostgreSQL-backed catalog
//!
//! Persists the catalog across runs so incremental scans can resume from the
//! last recorded task. Timestamps are produced by a [`MonotonicClock`] and
//! bound as parameters rather than taken from `now()`, which keeps them
//! strictly increasing even when several writes land in one transaction tick.

use super::client::PostgreSQLClient;
use super::models::{
    column_from_row, object_from_row, schema_from_row, source_from_row, table_from_row,
    task_from_row, COLUMN_COLUMNS, SCHEMA_COLUMNS, SOURCE_COLUMNS, TABLE_COLUMNS, TASK_COLUMNS,
};
use crate::adapters::catalog::{Catalog, MonotonicClock};
use crate::config::PostgreSQLConfig;
use crate::domain::{
    CatalogObject, Column, PiiCatcherError, PiiType, Result, Schema, Source, SourceType, Table,
    Task,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Catalog stored in the `piicatcher_*` tables
pub struct PostgresCatalog {
    client: PostgreSQLClient,
    clock: MonotonicClock,
}

impl PostgresCatalog {
    /// Wrap an existing client without touching the database
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client,
            clock: MonotonicClock::new(),
        }
    }

    /// Connect, create the catalog tables if needed and seed the clock
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable or the schema
    /// migration fails.
    pub async fn connect(config: PostgreSQLConfig) -> Result<Self> {
        let catalog = Self::new(PostgreSQLClient::new(config)?);
        catalog.client.ensure_schema().await?;
        catalog.seed_clock().await?;

        tracing::info!(
            catalog = %catalog.client.connection_string_safe(),
            "Connected to PostgreSQL catalog"
        );
        Ok(catalog)
    }

    /// Advance the clock past every timestamp already stored
    async fn seed_clock(&self) -> Result<()> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one(
                "SELECT GREATEST(
                    (SELECT MAX(updated_at) FROM piicatcher_columns),
                    (SELECT MAX(updated_at) FROM piicatcher_tasks)
                 ) AS latest",
                &[],
            )
            .await?;

        let latest: Option<DateTime<Utc>> = row.try_get("latest")?;
        if let Some(latest) = latest {
            self.clock.observe(latest);
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for PostgresCatalog {
    async fn add_source(
        &self,
        name: &str,
        source_type: SourceType,
        database: Option<String>,
    ) -> Result<Source> {
        let conn = self.client.get_connection().await?;

        conn.execute(
            "INSERT INTO piicatcher_sources (name, source_type, database)
             VALUES ($1, $2, $3)
             ON CONFLICT (name) DO NOTHING",
            &[&name, &source_type.as_str(), &database],
        )
        .await?;

        let row = conn
            .query_one(
                &format!("SELECT {SOURCE_COLUMNS} FROM piicatcher_sources WHERE name = $1"),
                &[&name],
            )
            .await?;
        let source = source_from_row(&row)?;

        if source.source_type != source_type {
            return Err(PiiCatcherError::Validation(format!(
                "Source '{name}' is already registered as {}",
                source.source_type
            )));
        }
        Ok(source)
    }

    async fn get_source(&self, name: &str) -> Result<Source> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {SOURCE_COLUMNS} FROM piicatcher_sources WHERE name = $1"),
                &[&name],
            )
            .await?
            .ok_or_else(|| PiiCatcherError::SourceNotFound(name.to_string()))?;
        source_from_row(&row)
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                &format!("SELECT {SOURCE_COLUMNS} FROM piicatcher_sources ORDER BY name"),
                &[],
            )
            .await?;
        rows.iter().map(source_from_row).collect()
    }

    async fn add_schema(&self, source: &Source, name: &str) -> Result<Schema> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO piicatcher_schemata (source_id, name)
                     VALUES ($1, $2)
                     ON CONFLICT (source_id, name) DO UPDATE SET name = EXCLUDED.name
                     RETURNING {SCHEMA_COLUMNS}"
                ),
                &[&source.id, &name],
            )
            .await?;
        schema_from_row(&row)
    }

    async fn add_table(&self, schema: &Schema, name: &str) -> Result<Table> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO piicatcher_tables (schema_id, name)
                     VALUES ($1, $2)
                     ON CONFLICT (schema_id, name) DO UPDATE SET name = EXCLUDED.name
                     RETURNING {TABLE_COLUMNS}"
                ),
                &[&schema.id, &name],
            )
            .await?;
        table_from_row(&row)
    }

    async fn add_column(
        &self,
        table: &Table,
        name: &str,
        data_type: &str,
        sort_order: i32,
    ) -> Result<Column> {
        let conn = self.client.get_connection().await?;
        let now = self.clock.tick();

        // The upsert only returns a row when it inserted or changed something
        let written = conn
            .query_opt(
                &format!(
                    "INSERT INTO piicatcher_columns (table_id, name, data_type, sort_order, updated_at)
                     VALUES ($1, $2, $3, $4, $5)
                     ON CONFLICT (table_id, name) DO UPDATE
                         SET data_type = EXCLUDED.data_type,
                             sort_order = EXCLUDED.sort_order,
                             updated_at = EXCLUDED.updated_at
                         WHERE piicatcher_columns.data_type <> EXCLUDED.data_type
                            OR piicatcher_columns.sort_order <> EXCLUDED.sort_order
                     RETURNING {COLUMN_COLUMNS}"
                ),
                &[&table.id, &name, &data_type, &sort_order, &now],
            )
            .await?;

        let row = match written {
            Some(row) => row,
            None => {
                conn.query_one(
                    &format!(
                        "SELECT {COLUMN_COLUMNS} FROM piicatcher_columns
                         WHERE table_id = $1 AND name = $2"
                    ),
                    &[&table.id, &name],
                )
                .await?
            }
        };
        column_from_row(&row)
    }

    async fn search_schemas(
        &self,
        source: &Source,
        schema_like: &str,
    ) -> Result<Vec<CatalogObject>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name FROM piicatcher_schemata
                 WHERE source_id = $1 AND name LIKE $2
                 ORDER BY name",
                &[&source.id, &schema_like],
            )
            .await?;
        rows.iter().map(object_from_row).collect()
    }

    async fn search_tables(&self, schema: &Schema, table_like: &str) -> Result<Vec<CatalogObject>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                "SELECT id, name FROM piicatcher_tables
                 WHERE schema_id = $1 AND name LIKE $2
                 ORDER BY name",
                &[&schema.id, &table_like],
            )
            .await?;
        rows.iter().map(object_from_row).collect()
    }

    async fn get_schema_by_id(&self, id: i64) -> Result<Schema> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {SCHEMA_COLUMNS} FROM piicatcher_schemata WHERE id = $1"),
                &[&id],
            )
            .await?
            .ok_or_else(|| PiiCatcherError::SchemaNotFound(id.to_string()))?;
        schema_from_row(&row)
    }

    async fn get_table_by_id(&self, id: i64) -> Result<Table> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt(
                &format!("SELECT {TABLE_COLUMNS} FROM piicatcher_tables WHERE id = $1"),
                &[&id],
            )
            .await?
            .ok_or_else(|| PiiCatcherError::TableNotFound(id.to_string()))?;
        table_from_row(&row)
    }

    async fn get_columns_for_table(
        &self,
        table: &Table,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Column>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {COLUMN_COLUMNS} FROM piicatcher_columns
                     WHERE table_id = $1
                       AND ($2::timestamptz IS NULL OR updated_at > $2 OR pii_plugin IS NULL)
                     ORDER BY sort_order"
                ),
                &[&table.id, &newer_than],
            )
            .await?;
        rows.iter().map(column_from_row).collect()
    }

    async fn set_column_pii_type(
        &self,
        column: &Column,
        pii_type: Option<PiiType>,
        pii_plugin: &str,
    ) -> Result<Column> {
        let conn = self.client.get_connection().await?;
        let now = self.clock.tick();

        let row = conn
            .query_opt(
                &format!(
                    "UPDATE piicatcher_columns
                     SET pii_type = $2, pii_plugin = $3, updated_at = $4
                     WHERE id = $1
                     RETURNING {COLUMN_COLUMNS}"
                ),
                &[
                    &column.id,
                    &pii_type.map(|t| t.as_str()),
                    &pii_plugin,
                    &now,
                ],
            )
            .await?
            .ok_or_else(|| {
                PiiCatcherError::Catalog(format!("Column {} no longer exists", column.id))
            })?;
        column_from_row(&row)
    }

    async fn get_latest_task(&self, app_name: &str) -> Result<Option<Task>> {
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_opt(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM piicatcher_tasks
                     WHERE app_name = $1
                     ORDER BY id DESC
                     LIMIT 1"
                ),
                &[&app_name],
            )
            .await?;
        row.as_ref().map(task_from_row).transpose()
    }

    async fn get_tasks(&self, app_name: &str) -> Result<Vec<Task>> {
        let conn = self.client.get_connection().await?;
        let rows = conn
            .query(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM piicatcher_tasks
                     WHERE app_name = $1
                     ORDER BY id"
                ),
                &[&app_name],
            )
            .await?;
        rows.iter().map(task_from_row).collect()
    }

    async fn add_task(&self, app_name: &str, status: i32, message: &str) -> Result<Task> {
        let conn = self.client.get_connection().await?;
        let now = self.clock.tick();

        let row = conn
            .query_one(
                &format!(
                    "INSERT INTO piicatcher_tasks (app_name, status, message, created_at, updated_at)
                     VALUES ($1, $2, $3, $4, $4)
                     RETURNING {TASK_COLUMNS}"
                ),
                &[&app_name, &status, &message, &now],
            )
            .await?;
        task_from_row(&row)
    }
}
