//! Row mappings for the PostgreSQL catalog tables
//!
//! Enumerations are stored as text (`source_type`, `pii_type`) and parsed
//! back into domain types when a row is read.

use crate::domain::{CatalogObject, Column, PiiType, Result, Schema, Source, Table, Task};
use tokio_postgres::Row;

/// Column lists matching the mappers below
pub const SOURCE_COLUMNS: &str = "id, name, source_type, database";
pub const SCHEMA_COLUMNS: &str = "id, source_id, name";
pub const TABLE_COLUMNS: &str = "id, schema_id, name";
pub const COLUMN_COLUMNS: &str =
    "id, table_id, name, data_type, sort_order, pii_type, pii_plugin, updated_at";
pub const TASK_COLUMNS: &str = "id, app_name, status, message, created_at, updated_at";

pub fn source_from_row(row: &Row) -> Result<Source> {
    let source_type: String = row.try_get("source_type")?;
    Ok(Source {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        source_type: source_type.parse()?,
        database: row.try_get("database")?,
    })
}

pub fn schema_from_row(row: &Row) -> Result<Schema> {
    Ok(Schema {
        id: row.try_get("id")?,
        source_id: row.try_get("source_id")?,
        name: row.try_get("name")?,
    })
}

pub fn table_from_row(row: &Row) -> Result<Table> {
    Ok(Table {
        id: row.try_get("id")?,
        schema_id: row.try_get("schema_id")?,
        name: row.try_get("name")?,
    })
}

pub fn column_from_row(row: &Row) -> Result<Column> {
    let pii_type: Option<String> = row.try_get("pii_type")?;
    Ok(Column {
        id: row.try_get("id")?,
        table_id: row.try_get("table_id")?,
        name: row.try_get("name")?,
        data_type: row.try_get("data_type")?,
        sort_order: row.try_get("sort_order")?,
        pii_type: pii_type.as_deref().map(str::parse::<PiiType>).transpose()?,
        pii_plugin: row.try_get("pii_plugin")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub fn task_from_row(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.try_get("id")?,
        app_name: row.try_get("app_name")?,
        status: row.try_get("status")?,
        message: row.try_get("message")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub fn object_from_row(row: &Row) -> Result<CatalogObject> {
    Ok(CatalogObject::new(
        row.try_get::<_, String>("name")?,
        row.try_get::<_, i64>("id")?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_lists_are_distinct_per_table() {
        for list in [SOURCE_COLUMNS, SCHEMA_COLUMNS, TABLE_COLUMNS, COLUMN_COLUMNS, TASK_COLUMNS] {
            assert!(list.starts_with("id, "));
        }
        assert!(COLUMN_COLUMNS.contains("pii_plugin"));
    }
}
