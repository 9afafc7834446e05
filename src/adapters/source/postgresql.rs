//! PostgreSQL and Redshift source driver

use super::traits::{Row, RowStream, SourceConnection, SourceConnector};
use super::{group_columns, owned_row_stream};
use crate::config::SecretString;
use crate::domain::{ColumnMetadata, PiiCatcherError, Result, SourceType, TableMetadata};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod, Runtime};
use futures::{pin_mut, SinkExt, StreamExt};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::NoTls;

const INTROSPECT_SQL: &str = "\
SELECT table_schema::text, table_name::text, column_name::text, data_type::text, \
ordinal_position::int4 \
FROM information_schema.columns \
WHERE table_schema NOT IN ('pg_catalog', 'information_schema') \
ORDER BY table_schema, table_name, ordinal_position";

/// Connector for PostgreSQL-protocol sources
pub struct PostgresConnector {
    pool: Pool,
    source_type: SourceType,
}

impl PostgresConnector {
    /// Create a connector from a libpq-style connection string or URL
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::Configuration` if the connection string is
    /// invalid or the pool cannot be built.
    pub fn new(source_type: SourceType, connection_string: &SecretString) -> Result<Self> {
        let pg_config: tokio_postgres::Config =
            connection_string.expose_secret().parse().map_err(|e| {
                PiiCatcherError::Configuration(format!(
                    "Invalid {source_type} connection string: {e}"
                ))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(manager)
            .max_size(2)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(Duration::from_secs(30)))
            .create_timeout(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| {
                PiiCatcherError::Configuration(format!("Failed to create connection pool: {e}"))
            })?;

        Ok(Self { pool, source_type })
    }
}

#[async_trait]
impl SourceConnector for PostgresConnector {
    fn source_type(&self) -> SourceType {
        self.source_type
    }

    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let client = self.pool.get().await?;
        Ok(Box::new(PostgresSourceConnection { client }))
    }
}

struct PostgresSourceConnection {
    client: Object,
}

#[async_trait]
impl SourceConnection for PostgresSourceConnection {
    async fn introspect(&mut self) -> Result<Vec<TableMetadata>> {
        let rows = self.client.query(INTROSPECT_SQL, &[]).await?;

        let columns = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<_, String>(0)?,
                    row.try_get::<_, String>(1)?,
                    ColumnMetadata::new(
                        row.try_get::<_, String>(2)?,
                        row.try_get::<_, String>(3)?,
                        row.try_get::<_, i32>(4)?,
                    ),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(group_columns(columns))
    }

    async fn count(&mut self, sql: &str) -> Result<u64> {
        let row = self.client.query_one(sql, &[]).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count.max(0) as u64)
    }

    fn into_rows(self: Box<Self>, sql: String) -> RowStream {
        let client = self.client;
        owned_row_stream(move |mut tx| async move {
            let rows = match client.query_raw(sql.as_str(), Vec::<String>::new()).await {
                Ok(rows) => rows,
                Err(e) => {
                    let _ = tx.send(Err(e.into())).await;
                    return;
                }
            };
            pin_mut!(rows);

            while let Some(next) = rows.next().await {
                let item = next.map_err(PiiCatcherError::from).and_then(|row| decode_row(&row));
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
        })
    }
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row> {
    (0..row.len())
        .map(|i| row.try_get::<_, Option<String>>(i).map_err(PiiCatcherError::from))
        .collect()
}
