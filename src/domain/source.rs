//! Data source model
//!
//! A [`Source`] is a named connection target registered in the catalog. The
//! connection string itself is never part of the catalog entity; it is
//! supplied at run time to the source connector.

use super::errors::PiiCatcherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// SQLite database file
    Sqlite,
    /// MySQL / MariaDB
    Mysql,
    /// PostgreSQL
    Postgresql,
    /// Amazon Redshift
    Redshift,
    /// Snowflake
    Snowflake,
    /// Amazon Athena
    Athena,
    /// Google BigQuery
    Bigquery,
}

impl SourceType {
    /// All supported source types
    pub const ALL: [SourceType; 7] = [
        SourceType::Sqlite,
        SourceType::Mysql,
        SourceType::Postgresql,
        SourceType::Redshift,
        SourceType::Snowflake,
        SourceType::Athena,
        SourceType::Bigquery,
    ];

    /// Lowercase discriminant as stored in the catalog
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Athena => "athena",
            Self::Bigquery => "bigquery",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = PiiCatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            "postgresql" | "postgres" => Ok(Self::Postgresql),
            "redshift" => Ok(Self::Redshift),
            "snowflake" => Ok(Self::Snowflake),
            "athena" => Ok(Self::Athena),
            "bigquery" => Ok(Self::Bigquery),
            _ => Err(PiiCatcherError::UnknownSourceType(s.to_string())),
        }
    }
}

/// A catalogued data source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Catalog identifier
    pub id: i64,

    /// Unique source name
    pub name: String,

    /// Dialect of the source
    pub source_type: SourceType,

    /// Project (BigQuery) or data catalog (Athena) qualifier
    pub database: Option<String>,
}

impl Source {
    /// Application name under which scan tasks for this source are recorded
    pub fn app_name(&self) -> String {
        app_name(&self.name)
    }
}

/// Task key for a source name: `piicatcher.<source_name>`
pub fn app_name(source_name: &str) -> String {
    format!("piicatcher.{source_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_round_trip_names() {
        for source_type in SourceType::ALL {
            assert_eq!(
                SourceType::from_str(source_type.as_str()).unwrap(),
                source_type
            );
        }
    }

    #[test]
    fn test_source_type_aliases_and_case() {
        assert_eq!(
            SourceType::from_str("Postgres").unwrap(),
            SourceType::Postgresql
        );
        assert_eq!(SourceType::from_str(" SQLITE ").unwrap(), SourceType::Sqlite);
    }

    #[test]
    fn test_unknown_source_type() {
        let err = SourceType::from_str("oracle").unwrap_err();
        assert!(matches!(err, PiiCatcherError::UnknownSourceType(ref s) if s == "oracle"));
    }

    #[test]
    fn test_app_name() {
        let source = Source {
            id: 1,
            name: "warehouse".to_string(),
            source_type: SourceType::Postgresql,
            database: None,
        };
        assert_eq!(source.app_name(), "piicatcher.warehouse");
    }
}
