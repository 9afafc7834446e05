//! Source connector factory

use super::{MySqlConnector, PostgresConnector, SourceConnector, SqliteConnector};
use crate::config::SecretString;
use crate::domain::{PiiCatcherError, Result, Source, SourceType};
use secrecy::ExposeSecret;
use std::sync::Arc;

/// Create the connector for `source`
///
/// `connection` is the database file path for sqlite and a connection URL
/// for server databases.
///
/// # Errors
///
/// Returns `PiiCatcherError::UnsupportedDriver` for dialects without a
/// driver, or a configuration error if `connection` cannot be parsed.
pub fn connector_for(source: &Source, connection: &SecretString) -> Result<Arc<dyn SourceConnector>> {
    let connector: Arc<dyn SourceConnector> = match source.source_type {
        SourceType::Sqlite => Arc::new(SqliteConnector::new(connection.expose_secret().as_str())),
        SourceType::Mysql => Arc::new(MySqlConnector::new(connection)?),
        SourceType::Postgresql | SourceType::Redshift => {
            Arc::new(PostgresConnector::new(source.source_type, connection)?)
        }
        SourceType::Snowflake | SourceType::Athena | SourceType::Bigquery => {
            return Err(PiiCatcherError::UnsupportedDriver(source.source_type))
        }
    };

    tracing::debug!(
        source = %source.name,
        source_type = %source.source_type,
        "Created source connector"
    );
    Ok(connector)
}
