//! Lazy catalog walks feeding the scan engine
//!
//! [`ColumnGenerator`] yields `(schema, table, column)` triples for metadata
//! scans. [`DataGenerator`] yields `(schema, table, column, value)` for every
//! text column of every fetched row. Both are single-pass cursors: a second
//! iteration requires a second generator.
//!
//! Incremental filtering happens here. With a `last_run` watermark only
//! columns changed after it, or never scanned, are yielded.

use crate::adapters::catalog::Catalog;
use crate::adapters::source::{RowStream, SourceConnector};
use crate::core::dbinfo::DbInfo;
use crate::core::filter::{compile_patterns, ObjectFilter};
use crate::domain::{CatalogObject, Column, PiiCatcherError, Result, Schema, Source, Table};
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream};
use futures::StreamExt;
use regex::Regex;
use std::collections::VecDeque;

/// Data types eligible for value-level scanning
const TEXT_TYPE_PATTERNS: [&str; 2] = [".*char.*", ".*text.*"];

/// Include/exclude regex patterns for schema and table names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFilters {
    pub include_schema: Vec<String>,
    pub exclude_schema: Vec<String>,
    pub include_table: Vec<String>,
    pub exclude_table: Vec<String>,
}

impl ScanFilters {
    fn compile(&self) -> Result<(ObjectFilter, ObjectFilter)> {
        Ok((
            ObjectFilter::new(&self.include_schema, &self.exclude_schema)?,
            ObjectFilter::new(&self.include_table, &self.exclude_table)?,
        ))
    }
}

/// Row sampling bounds for data scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampling {
    /// Rows requested from a sample query
    pub sample_size: u64,
    /// Tables with at most this many rows are read in full
    pub small_table_threshold: u64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            sample_size: 10,
            small_table_threshold: 100,
        }
    }
}

/// Walks filtered schemata and tables in name order, one table at a time
struct TableCursor<'a> {
    catalog: &'a dyn Catalog,
    last_run: Option<DateTime<Utc>>,
    table_filter: ObjectFilter,
    schemata: VecDeque<CatalogObject>,
    schema: Option<(Schema, VecDeque<CatalogObject>)>,
}

impl<'a> TableCursor<'a> {
    async fn new(
        catalog: &'a dyn Catalog,
        source: &Source,
        filters: &ScanFilters,
        last_run: Option<DateTime<Utc>>,
    ) -> Result<Self> {
        let (schema_filter, table_filter) = filters.compile()?;
        let schemata = sorted(schema_filter.apply(catalog.search_schemas(source, "%").await?));

        Ok(Self {
            catalog,
            last_run,
            table_filter,
            schemata,
            schema: None,
        })
    }

    async fn next_table(&mut self) -> Result<Option<(Schema, Table, Vec<Column>)>> {
        loop {
            if let Some((schema, tables)) = self.schema.as_mut() {
                if let Some(object) = tables.pop_front() {
                    let table = self.catalog.get_table_by_id(object.id).await?;
                    let columns = self
                        .catalog
                        .get_columns_for_table(&table, self.last_run)
                        .await?;
                    return Ok(Some((schema.clone(), table, columns)));
                }
                self.schema = None;
            }

            let Some(object) = self.schemata.pop_front() else {
                return Ok(None);
            };
            let schema = self.catalog.get_schema_by_id(object.id).await?;
            let tables = sorted(
                self.table_filter
                    .apply(self.catalog.search_tables(&schema, "%").await?),
            );
            tracing::trace!(schema = %schema.name, tables = tables.len(), "Walking schema");
            self.schema = Some((schema, tables));
        }
    }
}

fn sorted(mut objects: Vec<CatalogObject>) -> VecDeque<CatalogObject> {
    objects.sort_by(|a, b| a.name.cmp(&b.name));
    objects.into()
}

/// Cursor over `(schema, table, column)` in schema, table and sort order
pub struct ColumnGenerator<'a> {
    tables: TableCursor<'a>,
    current: Option<(Schema, Table, VecDeque<Column>)>,
}

/// Build a column generator for `source`
///
/// # Errors
///
/// Returns `PiiCatcherError::Pattern` for an invalid filter pattern, or the
/// catalog error if the schema listing fails.
pub async fn column_generator<'a>(
    catalog: &'a dyn Catalog,
    source: &Source,
    filters: &ScanFilters,
    last_run: Option<DateTime<Utc>>,
) -> Result<ColumnGenerator<'a>> {
    Ok(ColumnGenerator {
        tables: TableCursor::new(catalog, source, filters, last_run).await?,
        current: None,
    })
}

impl<'a> ColumnGenerator<'a> {
    /// Next column, or `None` once the walk is finished
    pub async fn next(&mut self) -> Result<Option<(Schema, Table, Column)>> {
        loop {
            if let Some((schema, table, columns)) = self.current.as_mut() {
                if let Some(column) = columns.pop_front() {
                    return Ok(Some((schema.clone(), table.clone(), column)));
                }
            }

            match self.tables.next_table().await? {
                Some((schema, table, columns)) => {
                    self.current = Some((schema, table, columns.into()));
                }
                None => {
                    self.current = None;
                    return Ok(None);
                }
            }
        }
    }

    /// Consume the generator as a stream
    pub fn into_stream(self) -> impl Stream<Item = Result<(Schema, Table, Column)>> + 'a {
        stream::try_unfold(self, |mut generator| async move {
            Ok(generator.next().await?.map(|item| (item, generator)))
        })
    }

    /// Consume the generator, counting the remaining columns
    pub async fn count(mut self) -> Result<u64> {
        let mut total = 0;
        while self.next().await?.is_some() {
            total += 1;
        }
        Ok(total)
    }
}

/// One value of one text column
pub type Datum = (Schema, Table, Column, Option<String>);

struct ActiveTable {
    schema: Schema,
    table: Table,
    columns: Vec<Column>,
    rows: RowStream,
    pending: std::vec::IntoIter<(Column, Option<String>)>,
}

/// Cursor over the values of text columns, one table connection at a time
pub struct DataGenerator<'a> {
    tables: TableCursor<'a>,
    connector: &'a dyn SourceConnector,
    dbinfo: &'a dyn DbInfo,
    sampling: Sampling,
    text_types: Vec<Regex>,
    active: Option<ActiveTable>,
}

/// Build a data generator for `source`
///
/// # Errors
///
/// Returns `PiiCatcherError::Pattern` for an invalid filter pattern, or the
/// catalog error if the schema listing fails.
pub async fn data_generator<'a>(
    catalog: &'a dyn Catalog,
    connector: &'a dyn SourceConnector,
    dbinfo: &'a dyn DbInfo,
    source: &Source,
    filters: &ScanFilters,
    last_run: Option<DateTime<Utc>>,
    sampling: Sampling,
) -> Result<DataGenerator<'a>> {
    let text_types = TEXT_TYPE_PATTERNS
        .iter()
        .map(|p| format!("^(?:{p})$"))
        .collect::<Vec<_>>();

    Ok(DataGenerator {
        tables: TableCursor::new(catalog, source, filters, last_run).await?,
        connector,
        dbinfo,
        sampling,
        text_types: compile_patterns(&text_types)?,
        active: None,
    })
}

impl<'a> DataGenerator<'a> {
    /// Next value, or `None` once every table has been read
    ///
    /// A table's connection is released as soon as its rows are exhausted,
    /// when a fetch fails, or when the generator is dropped.
    pub async fn next(&mut self) -> Result<Option<Datum>> {
        loop {
            if let Some(active) = self.active.as_mut() {
                if let Some((column, value)) = active.pending.next() {
                    return Ok(Some((
                        active.schema.clone(),
                        active.table.clone(),
                        column,
                        value,
                    )));
                }

                match active.rows.next().await {
                    Some(Ok(row)) => {
                        active.pending = active
                            .columns
                            .iter()
                            .cloned()
                            .zip(row)
                            .collect::<Vec<_>>()
                            .into_iter();
                        continue;
                    }
                    Some(Err(err)) => {
                        self.active = None;
                        return Err(err);
                    }
                    None => self.active = None,
                }
            }

            let Some((schema, table, columns)) = self.tables.next_table().await? else {
                return Ok(None);
            };
            self.open(schema, table, columns).await?;
        }
    }

    async fn open(&mut self, schema: Schema, table: Table, columns: Vec<Column>) -> Result<()> {
        let columns: Vec<Column> = columns
            .into_iter()
            .filter(|c| self.is_text(&c.data_type))
            .collect();
        if columns.is_empty() {
            tracing::trace!(schema = %schema.name, table = %table.name, "No text columns");
            return Ok(());
        }

        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let mut conn = self.connector.connect().await?;
        let row_count = conn
            .count(&self.dbinfo.count_query(&schema.name, &table.name))
            .await?;
        let sql = build_query(
            self.dbinfo,
            &schema.name,
            &table.name,
            &names,
            row_count,
            self.sampling,
        )?;

        tracing::debug!(
            schema = %schema.name,
            table = %table.name,
            row_count,
            query = %sql,
            "Reading table"
        );

        self.active = Some(ActiveTable {
            schema,
            table,
            columns,
            rows: conn.into_rows(sql),
            pending: Vec::new().into_iter(),
        });
        Ok(())
    }

    fn is_text(&self, data_type: &str) -> bool {
        self.text_types.iter().any(|re| re.is_match(data_type))
    }

    /// Consume the generator as a stream
    pub fn into_stream(self) -> impl Stream<Item = Result<Datum>> + 'a {
        stream::try_unfold(self, |mut generator| async move {
            Ok(generator.next().await?.map(|item| (item, generator)))
        })
    }

    /// Consume the generator, counting the remaining values
    pub async fn count(mut self) -> Result<u64> {
        let mut total = 0;
        while self.next().await?.is_some() {
            total += 1;
        }
        Ok(total)
    }
}

/// Pick the query used to read a table
///
/// Tables above the small-table threshold are sampled; a dialect without a
/// sampling clause falls back to the full select.
pub fn build_query(
    dbinfo: &dyn DbInfo,
    schema: &str,
    table: &str,
    columns: &[String],
    row_count: u64,
    sampling: Sampling,
) -> Result<String> {
    if row_count <= sampling.small_table_threshold {
        return Ok(dbinfo.select_query(schema, table, columns));
    }

    match dbinfo.sample_query(schema, table, columns, sampling.sample_size) {
        Ok(sql) => Ok(sql),
        Err(PiiCatcherError::SamplingNotSupported(source_type)) => {
            tracing::debug!(
                %source_type,
                table,
                "Sampling not supported, reading the full table"
            );
            Ok(dbinfo.select_query(schema, table, columns))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::InMemoryCatalog;
    use crate::adapters::source::SqliteConnector;
    use crate::core::dbinfo::{PostgresInfo, SqliteInfo};
    use crate::core::test_support::{sqlite_fixture, sync_fixture};
    use futures::TryStreamExt;

    #[test]
    fn test_build_query_small_table_reads_everything() {
        let columns = vec!["name".to_string()];
        let sql = build_query(&PostgresInfo, "public", "t", &columns, 100, Sampling::default())
            .unwrap();
        assert_eq!(sql, r#"SELECT "name" FROM "public"."t""#);
    }

    #[test]
    fn test_build_query_samples_large_table() {
        let columns = vec!["name".to_string()];
        let sql = build_query(&PostgresInfo, "public", "t", &columns, 101, Sampling::default())
            .unwrap();
        assert!(sql.contains("TABLESAMPLE BERNOULLI (10)"));
        assert!(sql.ends_with("LIMIT 10"));
    }

    #[test]
    fn test_build_query_falls_back_without_sampling() {
        let columns = vec!["name".to_string()];
        let sql = build_query(&SqliteInfo, "", "t", &columns, 10_000, Sampling::default()).unwrap();
        assert_eq!(sql, SqliteInfo.select_query("", "t", &columns));
    }

    #[tokio::test]
    async fn test_column_generator_orders_and_filters() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE zeta (b TEXT, a TEXT)",
            "CREATE TABLE alpha (id INTEGER, name TEXT)",
            "CREATE TABLE skipped (email TEXT)",
        ])
        .await;
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &SqliteConnector::new(&path)).await;

        let filters = ScanFilters {
            exclude_table: vec!["^skip".to_string()],
            ..Default::default()
        };
        let items: Vec<(Schema, Table, Column)> =
            column_generator(&catalog, &source, &filters, None)
                .await
                .unwrap()
                .into_stream()
                .try_collect()
                .await
                .unwrap();

        let walked: Vec<String> = items
            .into_iter()
            .map(|(_, t, c)| format!("{}.{}", t.name, c.name))
            .collect();
        assert_eq!(walked, vec!["alpha.id", "alpha.name", "zeta.b", "zeta.a"]);
    }

    #[tokio::test]
    async fn test_column_generator_invalid_pattern() {
        let catalog = InMemoryCatalog::new();
        let source = catalog
            .add_source("db", crate::domain::SourceType::Sqlite, None)
            .await
            .unwrap();
        let filters = ScanFilters {
            include_schema: vec!["(".to_string()],
            ..Default::default()
        };
        let result = column_generator(&catalog, &source, &filters, None).await;
        assert!(matches!(result, Err(PiiCatcherError::Pattern { .. })));
    }

    #[tokio::test]
    async fn test_column_generator_empty_catalog() {
        let catalog = InMemoryCatalog::new();
        let source = catalog
            .add_source("db", crate::domain::SourceType::Sqlite, None)
            .await
            .unwrap();
        let generator = column_generator(&catalog, &source, &ScanFilters::default(), None)
            .await
            .unwrap();
        assert_eq!(generator.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_data_generator_reads_text_columns_only() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE people (id INTEGER, name TEXT, state VARCHAR(2))",
            "INSERT INTO people VALUES (1, 'Jane', 'CA'), (2, NULL, 'NY')",
            "CREATE TABLE numbers (n INTEGER)",
            "INSERT INTO numbers VALUES (1)",
        ])
        .await;
        let connector = SqliteConnector::new(&path);
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &connector).await;

        let datums: Vec<Datum> = data_generator(
            &catalog,
            &connector,
            &SqliteInfo,
            &source,
            &ScanFilters::default(),
            None,
            Sampling::default(),
        )
        .await
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();

        let values: Vec<(String, Option<String>)> = datums
            .into_iter()
            .map(|(_, _, c, v)| (c.name, v))
            .collect();
        assert_eq!(
            values,
            vec![
                ("name".to_string(), Some("Jane".to_string())),
                ("state".to_string(), Some("CA".to_string())),
                ("name".to_string(), None),
                ("state".to_string(), Some("NY".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_data_generator_count_matches_items() {
        let (_dir, path) = sqlite_fixture(&[
            "CREATE TABLE people (name TEXT, email VARCHAR(64))",
            "INSERT INTO people VALUES ('a', 'a@example.com'), ('b', 'b@example.com')",
        ])
        .await;
        let connector = SqliteConnector::new(&path);
        let catalog = InMemoryCatalog::new();
        let source = sync_fixture(&catalog, &connector).await;

        let filters = ScanFilters::default();
        let total = data_generator(
            &catalog,
            &connector,
            &SqliteInfo,
            &source,
            &filters,
            None,
            Sampling::default(),
        )
        .await
        .unwrap()
        .count()
        .await
        .unwrap();
        let items: Vec<Datum> = data_generator(
            &catalog,
            &connector,
            &SqliteInfo,
            &source,
            &filters,
            None,
            Sampling::default(),
        )
        .await
        .unwrap()
        .into_stream()
        .try_collect()
        .await
        .unwrap();
        assert_eq!(total, 4);
        assert_eq!(items.len() as u64, total);
    }
}
