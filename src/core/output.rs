//! Report rendering
//!
//! Both renderers walk the catalog in schema, table and column order and
//! keep only qualifying columns: every column with `list_all`, otherwise
//! those carrying a PII type or, given a watermark, changed after it.

use crate::adapters::catalog::Catalog;
use crate::core::generators::{column_generator, ScanFilters};
use crate::domain::{Column, PiiType, Result, Schema, Source, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the tabular report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub schema: String,
    pub table: String,
    pub column: String,
    /// PII type as displayed, empty when absent
    pub pii_type: String,
}

impl ReportRow {
    /// Cells in display order
    pub fn cells(&self) -> [&str; 4] {
        [&self.schema, &self.table, &self.column, &self.pii_type]
    }
}

/// Nested report for one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub name: String,
    pub schemata: Vec<SchemaReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub name: String,
    pub tables: Vec<TableReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableReport {
    pub name: String,
    pub columns: Vec<ColumnReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnReport {
    pub name: String,
    pub data_type: String,
    pub sort_order: i32,
    pub pii_type: Option<PiiType>,
}

impl From<&Column> for ColumnReport {
    fn from(column: &Column) -> Self {
        Self {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            sort_order: column.sort_order,
            pii_type: column.pii_type,
        }
    }
}

fn qualifies(column: &Column, list_all: bool, last_run: Option<DateTime<Utc>>) -> bool {
    list_all
        || column.pii_type.is_some()
        || last_run.is_some_and(|watermark| column.updated_at > watermark)
}

/// Groups contiguous runs of the (schema, table)-ordered column stream
struct Grouper {
    list_all: bool,
    schemata: Vec<SchemaReport>,
    schema: Option<(i64, SchemaReport)>,
    table: Option<(i64, TableReport)>,
}

impl Grouper {
    fn new(list_all: bool) -> Self {
        Self {
            list_all,
            schemata: Vec::new(),
            schema: None,
            table: None,
        }
    }

    fn push(&mut self, schema: &Schema, table: &Table, column: Option<ColumnReport>) {
        if self.table.as_ref().map(|(id, _)| *id) != Some(table.id) {
            self.flush_table();
        }
        if self.schema.as_ref().map(|(id, _)| *id) != Some(schema.id) {
            self.flush_schema();
            self.schema = Some((
                schema.id,
                SchemaReport {
                    name: schema.name.clone(),
                    tables: Vec::new(),
                },
            ));
        }

        let (_, current) = self.table.get_or_insert_with(|| {
            (
                table.id,
                TableReport {
                    name: table.name.clone(),
                    columns: Vec::new(),
                },
            )
        });
        if let Some(column) = column {
            current.columns.push(column);
        }
    }

    fn flush_table(&mut self) {
        if let Some((_, table)) = self.table.take() {
            if self.list_all || !table.columns.is_empty() {
                if let Some((_, schema)) = self.schema.as_mut() {
                    schema.tables.push(table);
                }
            }
        }
    }

    fn flush_schema(&mut self) {
        if let Some((_, schema)) = self.schema.take() {
            if self.list_all || !schema.tables.is_empty() {
                self.schemata.push(schema);
            }
        }
    }

    fn finish(mut self) -> Vec<SchemaReport> {
        self.flush_table();
        self.flush_schema();
        self.schemata
    }
}

/// Render the nested report for `source`
///
/// A schema or table appears when it holds at least one qualifying column,
/// or always with `list_all`.
pub async fn output_dict(
    catalog: &dyn Catalog,
    source: &Source,
    list_all: bool,
    last_run: Option<DateTime<Utc>>,
    filters: &ScanFilters,
) -> Result<SourceReport> {
    let mut generator = column_generator(catalog, source, filters, None).await?;
    let mut grouper = Grouper::new(list_all);

    while let Some((schema, table, column)) = generator.next().await? {
        let report = qualifies(&column, list_all, last_run).then(|| ColumnReport::from(&column));
        grouper.push(&schema, &table, report);
    }

    Ok(SourceReport {
        name: source.name.clone(),
        schemata: grouper.finish(),
    })
}

/// Render one row per qualifying column of `source`
pub async fn output_tabular(
    catalog: &dyn Catalog,
    source: &Source,
    list_all: bool,
    last_run: Option<DateTime<Utc>>,
    filters: &ScanFilters,
) -> Result<Vec<ReportRow>> {
    let mut generator = column_generator(catalog, source, filters, None).await?;
    let mut rows = Vec::new();

    while let Some((schema, table, column)) = generator.next().await? {
        if qualifies(&column, list_all, last_run) {
            rows.push(ReportRow {
                schema: schema.name,
                table: table.name,
                pii_type: column.pii_type_display(),
                column: column.name,
            });
        }
    }
    Ok(rows)
}
