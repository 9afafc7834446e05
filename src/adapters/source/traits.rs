//! Source database abstraction traits
//!
//! A [`SourceConnector`] opens connections to the database being scanned.
//! Row streams returned by [`SourceConnection::into_rows`] own their
//! connection, so dropping the stream releases it on every exit path.

use crate::domain::{Result, SourceType, TableMetadata};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// One decoded source row, values in column order (`None` for SQL NULL)
pub type Row = Vec<Option<String>>;

/// Owned stream of rows
pub type RowStream = BoxStream<'static, Result<Row>>;

/// Factory for source connections
#[async_trait]
pub trait SourceConnector: Send + Sync {
    /// Dialect of the source this connector reaches
    fn source_type(&self) -> SourceType;

    /// Open a new connection
    ///
    /// # Errors
    ///
    /// Returns the driver error if the connection cannot be established.
    async fn connect(&self) -> Result<Box<dyn SourceConnection>>;
}

/// A live connection to the source database
#[async_trait]
pub trait SourceConnection: Send {
    /// Read every user table with its columns (name, data type, ordinal)
    async fn introspect(&mut self) -> Result<Vec<TableMetadata>>;

    /// Run a `SELECT COUNT(*)` style query and return the single value
    async fn count(&mut self, sql: &str) -> Result<u64>;

    /// Run `sql` and stream its rows; the stream takes over the connection
    fn into_rows(self: Box<Self>, sql: String) -> RowStream;
}
