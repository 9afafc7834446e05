//! Per-dialect query templates
//!
//! Each source type has a [`DbInfo`] implementation that knows how to quote
//! identifiers and how to phrase the count, full-select and sample-select
//! queries used by the data generator.

use crate::domain::{PiiCatcherError, Result, Source, SourceType};

/// Default Athena data catalog when the source does not name one
pub const DEFAULT_ATHENA_CATALOG: &str = "AwsDataCatalog";

/// Query templates for one dialect
pub trait DbInfo: Send + Sync {
    /// Dialect this strategy serves
    fn source_type(&self) -> SourceType;

    /// Quote a single identifier
    fn quote(&self, identifier: &str) -> String;

    /// Fully qualified table reference
    fn table_ref(&self, schema: &str, table: &str) -> String {
        format!("{}.{}", self.quote(schema), self.quote(table))
    }

    /// Comma-separated, quoted column list
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Row count query
    fn count_query(&self, schema: &str, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", self.table_ref(schema, table))
    }

    /// Full select of the given columns
    fn select_query(&self, schema: &str, table: &str, columns: &[String]) -> String {
        format!(
            "SELECT {} FROM {}",
            self.column_list(columns),
            self.table_ref(schema, table)
        )
    }

    /// Sampled select returning at most `num_rows` rows
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::SamplingNotSupported` when the dialect has no
    /// sampling clause; callers fall back to [`DbInfo::select_query`].
    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String>;
}

fn quote_with(identifier: &str, quote: char) -> String {
    let doubled = format!("{quote}{quote}");
    format!(
        "{quote}{}{quote}",
        identifier.replace(quote, &doubled)
    )
}

/// SQLite: schema-less, no sampling clause
#[derive(Debug, Clone, Default)]
pub struct SqliteInfo;

impl DbInfo for SqliteInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Sqlite
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn table_ref(&self, _schema: &str, table: &str) -> String {
        self.quote(table)
    }

    fn sample_query(
        &self,
        _schema: &str,
        _table: &str,
        _columns: &[String],
        _num_rows: u64,
    ) -> Result<String> {
        Err(PiiCatcherError::SamplingNotSupported(SourceType::Sqlite))
    }
}

/// MySQL: backtick quoting, random-order sampling
#[derive(Debug, Clone, Default)]
pub struct MySqlInfo;

impl DbInfo for MySqlInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Mysql
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '`')
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} ORDER BY RAND() LIMIT {num_rows}",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// PostgreSQL: Bernoulli table sampling
#[derive(Debug, Clone, Default)]
pub struct PostgresInfo;

impl DbInfo for PostgresInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Postgresql
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} TABLESAMPLE BERNOULLI (10) LIMIT {num_rows}",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// Redshift: no TABLESAMPLE, random-order sampling
#[derive(Debug, Clone, Default)]
pub struct RedshiftInfo;

impl DbInfo for RedshiftInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Redshift
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} ORDER BY RANDOM() LIMIT {num_rows}",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// Snowflake: fixed-row Bernoulli sampling
#[derive(Debug, Clone, Default)]
pub struct SnowflakeInfo;

impl DbInfo for SnowflakeInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Snowflake
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} TABLESAMPLE BERNOULLI ({num_rows} ROWS)",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// Athena: every table reference carries the data catalog
#[derive(Debug, Clone)]
pub struct AthenaInfo {
    catalog: String,
}

impl AthenaInfo {
    /// Create templates for the given data catalog
    pub fn new(catalog: impl Into<String>) -> Self {
        Self {
            catalog: catalog.into(),
        }
    }
}

impl DbInfo for AthenaInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Athena
    }

    fn quote(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn table_ref(&self, schema: &str, table: &str) -> String {
        format!(
            "{}.{}.{}",
            self.quote(&self.catalog),
            self.quote(schema),
            self.quote(table)
        )
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} TABLESAMPLE BERNOULLI (10) LIMIT {num_rows}",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// BigQuery: every table reference carries the project
#[derive(Debug, Clone)]
pub struct BigQueryInfo {
    project: String,
}

impl BigQueryInfo {
    /// Create templates for the given project
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

impl DbInfo for BigQueryInfo {
    fn source_type(&self) -> SourceType {
        SourceType::Bigquery
    }

    // Embedded backticks and backslashes take a backslash escape
    fn quote(&self, identifier: &str) -> String {
        format!(
            "`{}`",
            identifier.replace('\\', "\\\\").replace('`', "\\`")
        )
    }

    // BigQuery quotes the whole path as one identifier
    fn table_ref(&self, schema: &str, table: &str) -> String {
        self.quote(&format!("{}.{schema}.{table}", self.project))
    }

    fn sample_query(
        &self,
        schema: &str,
        table: &str,
        columns: &[String],
        num_rows: u64,
    ) -> Result<String> {
        Ok(format!(
            "SELECT {} FROM {} TABLESAMPLE SYSTEM (10 PERCENT) LIMIT {num_rows}",
            self.column_list(columns),
            self.table_ref(schema, table)
        ))
    }
}

/// Select the query templates for a source
///
/// # Errors
///
/// Returns `PiiCatcherError::Validation` when a BigQuery source has no
/// project qualifier.
pub fn get_dbinfo(source: &Source) -> Result<Box<dyn DbInfo>> {
    let dbinfo: Box<dyn DbInfo> = match source.source_type {
        SourceType::Sqlite => Box::new(SqliteInfo),
        SourceType::Mysql => Box::new(MySqlInfo),
        SourceType::Postgresql => Box::new(PostgresInfo),
        SourceType::Redshift => Box::new(RedshiftInfo),
        SourceType::Snowflake => Box::new(SnowflakeInfo),
        SourceType::Athena => Box::new(AthenaInfo::new(
            source
                .database
                .clone()
                .unwrap_or_else(|| DEFAULT_ATHENA_CATALOG.to_string()),
        )),
        SourceType::Bigquery => {
            let project = source.database.clone().ok_or_else(|| {
                PiiCatcherError::Validation(format!(
                    "BigQuery source '{}' requires a project",
                    source.name
                ))
            })?;
            Box::new(BigQueryInfo::new(project))
        }
    };
    Ok(dbinfo)
}

/// Select query templates by source type discriminant
///
/// # Errors
///
/// Returns `PiiCatcherError::UnknownSourceType` for unrecognized names.
pub fn get_dbinfo_by_name(source_type: &str, database: Option<String>) -> Result<Box<dyn DbInfo>> {
    let source_type: SourceType = source_type.parse()?;
    get_dbinfo(&Source {
        id: 0,
        name: source_type.to_string(),
        source_type,
        database,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        vec!["name".to_string(), "state".to_string()]
    }

    #[test]
    fn test_postgres_templates() {
        let info = PostgresInfo;
        assert_eq!(
            info.count_query("public", "full_pii"),
            r#"SELECT COUNT(*) FROM "public"."full_pii""#
        );
        assert_eq!(
            info.select_query("public", "full_pii", &columns()),
            r#"SELECT "name", "state" FROM "public"."full_pii""#
        );
        assert_eq!(
            info.sample_query("public", "full_pii", &columns(), 10).unwrap(),
            r#"SELECT "name", "state" FROM "public"."full_pii" TABLESAMPLE BERNOULLI (10) LIMIT 10"#
        );
    }

    #[test]
    fn test_sqlite_is_schema_less_and_cannot_sample() {
        let info = SqliteInfo;
        assert_eq!(
            info.select_query("", "full_pii", &columns()),
            r#"SELECT "name", "state" FROM "full_pii""#
        );
        assert_eq!(info.count_query("", "full_pii"), r#"SELECT COUNT(*) FROM "full_pii""#);

        let err = info.sample_query("", "full_pii", &columns(), 10).unwrap_err();
        assert!(matches!(err, PiiCatcherError::SamplingNotSupported(SourceType::Sqlite)));
    }

    #[test]
    fn test_mysql_backticks() {
        let info = MySqlInfo;
        assert_eq!(
            info.sample_query("piidb", "full_pii", &columns(), 5).unwrap(),
            "SELECT `name`, `state` FROM `piidb`.`full_pii` ORDER BY RAND() LIMIT 5"
        );
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(PostgresInfo.quote(r#"odd"name"#), r#""odd""name""#);
        assert_eq!(MySqlInfo.quote("odd`name"), "`odd``name`");
    }

    #[test]
    fn test_bigquery_escapes_with_backslash() {
        let info = BigQueryInfo::new("proj");
        assert_eq!(info.quote("odd`name"), r"`odd\`name`");
        assert_eq!(info.quote(r"back\slash"), r"`back\\slash`");
    }

    #[test]
    fn test_redshift_and_snowflake_sampling() {
        assert!(RedshiftInfo
            .sample_query("s", "t", &columns(), 7)
            .unwrap()
            .ends_with("ORDER BY RANDOM() LIMIT 7"));
        assert!(SnowflakeInfo
            .sample_query("s", "t", &columns(), 7)
            .unwrap()
            .ends_with("TABLESAMPLE BERNOULLI (7 ROWS)"));
    }

    #[test]
    fn test_athena_threads_catalog_through_every_template() {
        let info = get_dbinfo_by_name("athena", None).unwrap();
        assert_eq!(
            info.count_query("db", "t"),
            r#"SELECT COUNT(*) FROM "AwsDataCatalog"."db"."t""#
        );
        assert!(info
            .select_query("db", "t", &columns())
            .contains(r#""AwsDataCatalog"."db"."t""#));
        assert!(info
            .sample_query("db", "t", &columns(), 3)
            .unwrap()
            .contains(r#""AwsDataCatalog"."db"."t""#));
    }

    #[test]
    fn test_bigquery_requires_project() {
        assert!(get_dbinfo_by_name("bigquery", None).is_err());

        let info = get_dbinfo_by_name("bigquery", Some("my-project".to_string())).unwrap();
        assert_eq!(
            info.select_query("dataset", "users", &columns()),
            "SELECT `name`, `state` FROM `my-project.dataset.users`"
        );
    }

    #[test]
    fn test_unknown_source_type() {
        let err = get_dbinfo_by_name("oracle", None).err().unwrap();
        assert!(matches!(err, PiiCatcherError::UnknownSourceType(_)));
    }

    #[test]
    fn test_factory_selects_dialect() {
        for source_type in SourceType::ALL {
            let info = get_dbinfo_by_name(source_type.as_str(), Some("p".to_string())).unwrap();
            assert_eq!(info.source_type(), source_type);
        }
    }
}
