//! In-memory catalog
//!
//! Used for one-shot scans and tests. State lives for the lifetime of the
//! value; nothing is persisted.

use super::clock::MonotonicClock;
use super::traits::{like_match, Catalog};
use crate::domain::{
    CatalogObject, Column, PiiCatcherError, PiiType, Result, Schema, Source, SourceType, Table,
    Task,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    sources: Vec<Source>,
    schemata: Vec<Schema>,
    tables: Vec<Table>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Mutex-guarded catalog held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
    clock: MonotonicClock,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| PiiCatcherError::Catalog(format!("Catalog lock poisoned: {e}")))
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn add_source(
        &self,
        name: &str,
        source_type: SourceType,
        database: Option<String>,
    ) -> Result<Source> {
        let mut state = self.lock()?;

        if let Some(existing) = state.sources.iter().find(|s| s.name == name) {
            if existing.source_type != source_type {
                return Err(PiiCatcherError::Validation(format!(
                    "Source '{name}' is already registered as {}",
                    existing.source_type
                )));
            }
            return Ok(existing.clone());
        }

        let source = Source {
            id: state.next_id(),
            name: name.to_string(),
            source_type,
            database,
        };
        state.sources.push(source.clone());
        Ok(source)
    }

    async fn get_source(&self, name: &str) -> Result<Source> {
        self.lock()?
            .sources
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| PiiCatcherError::SourceNotFound(name.to_string()))
    }

    async fn list_sources(&self) -> Result<Vec<Source>> {
        let mut sources = self.lock()?.sources.clone();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sources)
    }

    async fn add_schema(&self, source: &Source, name: &str) -> Result<Schema> {
        let mut state = self.lock()?;

        if let Some(existing) = state
            .schemata
            .iter()
            .find(|s| s.source_id == source.id && s.name == name)
        {
            return Ok(existing.clone());
        }

        let schema = Schema {
            id: state.next_id(),
            source_id: source.id,
            name: name.to_string(),
        };
        state.schemata.push(schema.clone());
        Ok(schema)
    }

    async fn add_table(&self, schema: &Schema, name: &str) -> Result<Table> {
        let mut state = self.lock()?;

        if let Some(existing) = state
            .tables
            .iter()
            .find(|t| t.schema_id == schema.id && t.name == name)
        {
            return Ok(existing.clone());
        }

        let table = Table {
            id: state.next_id(),
            schema_id: schema.id,
            name: name.to_string(),
        };
        state.tables.push(table.clone());
        Ok(table)
    }

    async fn add_column(
        &self,
        table: &Table,
        name: &str,
        data_type: &str,
        sort_order: i32,
    ) -> Result<Column> {
        let mut state = self.lock()?;

        if let Some(index) = state
            .columns
            .iter()
            .position(|c| c.table_id == table.id && c.name == name)
        {
            let changed = {
                let existing = &state.columns[index];
                existing.data_type != data_type || existing.sort_order != sort_order
            };
            if changed {
                let now = self.clock.tick();
                let column = &mut state.columns[index];
                column.data_type = data_type.to_string();
                column.sort_order = sort_order;
                column.updated_at = now;
            }
            return Ok(state.columns[index].clone());
        }

        let column = Column {
            id: state.next_id(),
            table_id: table.id,
            name: name.to_string(),
            data_type: data_type.to_string(),
            sort_order,
            pii_type: None,
            pii_plugin: None,
            updated_at: self.clock.tick(),
        };
        state.columns.push(column.clone());
        Ok(column)
    }

    async fn search_schemas(
        &self,
        source: &Source,
        schema_like: &str,
    ) -> Result<Vec<CatalogObject>> {
        Ok(self
            .lock()?
            .schemata
            .iter()
            .filter(|s| s.source_id == source.id && like_match(schema_like, &s.name))
            .map(|s| CatalogObject::new(s.name.clone(), s.id))
            .collect())
    }

    async fn search_tables(&self, schema: &Schema, table_like: &str) -> Result<Vec<CatalogObject>> {
        Ok(self
            .lock()?
            .tables
            .iter()
            .filter(|t| t.schema_id == schema.id && like_match(table_like, &t.name))
            .map(|t| CatalogObject::new(t.name.clone(), t.id))
            .collect())
    }

    async fn get_schema_by_id(&self, id: i64) -> Result<Schema> {
        self.lock()?
            .schemata
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| PiiCatcherError::SchemaNotFound(id.to_string()))
    }

    async fn get_table_by_id(&self, id: i64) -> Result<Table> {
        self.lock()?
            .tables
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| PiiCatcherError::TableNotFound(id.to_string()))
    }

    async fn get_columns_for_table(
        &self,
        table: &Table,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Column>> {
        let mut columns: Vec<Column> = self
            .lock()?
            .columns
            .iter()
            .filter(|c| c.table_id == table.id)
            .filter(|c| match newer_than {
                Some(watermark) => c.updated_at > watermark || !c.is_scanned(),
                None => true,
            })
            .cloned()
            .collect();
        columns.sort_by_key(|c| c.sort_order);
        Ok(columns)
    }

    async fn set_column_pii_type(
        &self,
        column: &Column,
        pii_type: Option<PiiType>,
        pii_plugin: &str,
    ) -> Result<Column> {
        let mut state = self.lock()?;
        let now = self.clock.tick();

        let stored = state
            .columns
            .iter_mut()
            .find(|c| c.id == column.id)
            .ok_or_else(|| {
                PiiCatcherError::Catalog(format!("Column {} no longer exists", column.id))
            })?;
        stored.pii_type = pii_type;
        stored.pii_plugin = Some(pii_plugin.to_string());
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn get_latest_task(&self, app_name: &str) -> Result<Option<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .rev()
            .find(|t| t.app_name == app_name)
            .cloned())
    }

    async fn get_tasks(&self, app_name: &str) -> Result<Vec<Task>> {
        Ok(self
            .lock()?
            .tasks
            .iter()
            .filter(|t| t.app_name == app_name)
            .cloned()
            .collect())
    }

    async fn add_task(&self, app_name: &str, status: i32, message: &str) -> Result<Task> {
        let mut state = self.lock()?;
        let now = self.clock.tick();

        let task = Task {
            id: state.next_id(),
            app_name: app_name.to_string(),
            status,
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());
        Ok(task)
    }
}
