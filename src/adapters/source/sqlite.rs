//! SQLite source driver

use super::traits::{Row, RowStream, SourceConnection, SourceConnector};
use super::{group_columns, owned_row_stream};
use crate::domain::{ColumnMetadata, PiiCatcherError, Result, SourceType, TableMetadata};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row as _, Sqlite};
use std::path::Path;

const INTROSPECT_SQL: &str = "\
SELECT m.name, p.name, p.type, p.cid \
FROM sqlite_master m JOIN pragma_table_info(m.name) p \
WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
ORDER BY m.name, p.cid";

/// Connector for a SQLite database file, opened read-only
pub struct SqliteConnector {
    pool: SqlitePool,
}

impl SqliteConnector {
    /// Create a connector for the database at `path`
    ///
    /// The file is not opened until the first connection is requested.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_lazy_with(options);
        Self { pool }
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceConnector for SqliteConnector {
    fn source_type(&self) -> SourceType {
        SourceType::Sqlite
    }

    async fn connect(&self) -> Result<Box<dyn SourceConnection>> {
        let conn = self.pool.acquire().await?;
        Ok(Box::new(SqliteSourceConnection { conn }))
    }
}

struct SqliteSourceConnection {
    conn: PoolConnection<Sqlite>,
}

#[async_trait]
impl SourceConnection for SqliteSourceConnection {
    async fn introspect(&mut self) -> Result<Vec<TableMetadata>> {
        let rows: Vec<(String, String, String, i64)> = sqlx::query_as(INTROSPECT_SQL)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(group_columns(rows.into_iter().map(
            |(table, column, data_type, cid)| {
                (
                    String::new(),
                    table,
                    ColumnMetadata::new(column, data_type, cid as i32),
                )
            },
        )))
    }

    async fn count(&mut self, sql: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(sql).fetch_one(&mut *self.conn).await?;
        Ok(count.max(0) as u64)
    }

    fn into_rows(self: Box<Self>, sql: String) -> RowStream {
        let mut conn = self.conn;
        owned_row_stream(move |mut tx| async move {
            let mut rows = sqlx::query(&sql).fetch(&mut *conn);
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

// Column affinity is advisory in SQLite, so a text column may hold integers
// or reals; those are rendered through SQLite's own text conversion.
fn decode_row(row: &SqliteRow) -> Result<Row> {
    (0..row.len())
        .map(|i| {
            row.try_get::<Option<String>, _>(i)
                .or_else(|_| row.try_get_unchecked::<Option<String>, _>(i))
                .map_err(PiiCatcherError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqliteJournalMode;
    use tempfile::TempDir;

    async fn fixture() -> (TempDir, SqliteConnector) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("source.db");
        let writer = SqlitePoolOptions::new()
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Delete),
            )
            .await
            .unwrap();
        for sql in [
            "CREATE TABLE people (id INTEGER, name TEXT, state VARCHAR(2))",
            "INSERT INTO people VALUES (1, 'Jane', 'CA'), (2, NULL, 'NY'), (3, 'Bob', 42)",
        ] {
            sqlx::query(sql).execute(&writer).await.unwrap();
        }
        writer.close().await;

        (dir, SqliteConnector::new(path))
    }

    #[tokio::test]
    async fn test_introspect() {
        let (_dir, connector) = fixture().await;
        let mut conn = connector.connect().await.unwrap();
        let tables = conn.introspect().await.unwrap();

        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].schema, "");
        assert_eq!(tables[0].table, "people");
        let columns: Vec<(&str, &str, i32)> = tables[0]
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.data_type.as_str(), c.sort_order))
            .collect();
        assert_eq!(
            columns,
            vec![("id", "INTEGER", 0), ("name", "TEXT", 1), ("state", "VARCHAR(2)", 2)]
        );
    }

    #[tokio::test]
    async fn test_count_and_rows() {
        let (_dir, connector) = fixture().await;
        let mut conn = connector.connect().await.unwrap();
        assert_eq!(conn.count(r#"SELECT COUNT(*) FROM "people""#).await.unwrap(), 3);

        let rows: Vec<Row> = conn
            .into_rows(r#"SELECT "name", "state" FROM "people" ORDER BY "id""#.to_string())
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(
            rows,
            vec![
                vec![Some("Jane".to_string()), Some("CA".to_string())],
                vec![None, Some("NY".to_string())],
                vec![Some("Bob".to_string()), Some("42".to_string())],
            ]
        );
    }

    #[tokio::test]
    async fn test_bad_query_surfaces_driver_error() {
        let (_dir, connector) = fixture().await;
        let conn = connector.connect().await.unwrap();
        let mut rows = conn.into_rows("SELECT nope FROM missing".to_string());
        let first = rows.next().await.unwrap();
        assert!(matches!(first, Err(PiiCatcherError::Sqlx(_))));
        assert!(rows.next().await.is_none());
    }
}
