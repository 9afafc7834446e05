//! Source database drivers
//!
//! - [`sqlite`] and [`mysql`] use `sqlx` pools
//! - [`postgresql`] serves PostgreSQL and Redshift through `tokio-postgres`
//!   and `deadpool-postgres`
//!
//! Snowflake, Athena and BigQuery have query templates but no driver; the
//! [`factory`] reports them as unsupported.

pub mod factory;
pub mod mysql;
pub mod postgresql;
pub mod sqlite;
pub mod traits;

pub use factory::connector_for;
pub use mysql::MySqlConnector;
pub use postgresql::PostgresConnector;
pub use sqlite::SqliteConnector;
pub use traits::{Row, RowStream, SourceConnection, SourceConnector};

use crate::domain::{ColumnMetadata, Result, TableMetadata};
use futures::channel::mpsc;
use futures::{future, stream, Future, FutureExt, StreamExt};

/// Build a row stream from a producer that owns its connection.
///
/// The producer runs on the consumer's task: it is polled alongside the
/// receiving end, so no task is spawned and dropping the stream drops the
/// producer together with the connection it holds.
pub(crate) fn owned_row_stream<F, Fut>(produce: F) -> RowStream
where
    F: FnOnce(mpsc::Sender<Result<Row>>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(0);
    let driver = produce(tx)
        .into_stream()
        .filter_map(|()| future::ready(None::<Result<Row>>));
    stream::select(rx, driver).boxed()
}

/// Group `(schema, table, column)` rows, already ordered by schema and
/// table, into per-table metadata
pub(crate) fn group_columns(
    rows: impl IntoIterator<Item = (String, String, ColumnMetadata)>,
) -> Vec<TableMetadata> {
    let mut tables: Vec<TableMetadata> = Vec::new();
    for (schema, table, column) in rows {
        match tables.last_mut() {
            Some(last) if last.schema == schema && last.table == table => {
                last.columns.push(column)
            }
            _ => tables.push(TableMetadata {
                schema,
                table,
                columns: vec![column],
            }),
        }
    }
    tables
}
