//! Catalog abstraction traits
//!
//! The catalog persists sources, schemata, tables, columns with their PII
//! annotation, and the append-only task history used as the incremental
//! scan watermark.

use crate::domain::{
    CatalogObject, Column, PiiType, Result, Schema, Source, SourceType, Table, Task,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Metadata catalog used by the scan pipeline
///
/// Name searches take SQL `LIKE` patterns: `%` matches any run of
/// characters, `_` matches one character and a backslash escapes the next
/// character. Use [`like_escape`] to search for an exact name.
///
/// Every timestamp written by one catalog instance is strictly greater than
/// the previous one.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Register a source, or return the existing one with the same name
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::Validation` if a source with this name is
    /// already registered with a different type.
    async fn add_source(
        &self,
        name: &str,
        source_type: SourceType,
        database: Option<String>,
    ) -> Result<Source>;

    /// Look up a source by exact name
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::SourceNotFound` if no such source exists.
    async fn get_source(&self, name: &str) -> Result<Source>;

    /// All registered sources ordered by name
    async fn list_sources(&self) -> Result<Vec<Source>>;

    /// Get or create a schema
    async fn add_schema(&self, source: &Source, name: &str) -> Result<Schema>;

    /// Get or create a table
    async fn add_table(&self, schema: &Schema, name: &str) -> Result<Table>;

    /// Get or create a column
    ///
    /// An existing column whose data type or sort order differs is updated
    /// and its `updated_at` bumped; an unchanged column is returned as is.
    async fn add_column(
        &self,
        table: &Table,
        name: &str,
        data_type: &str,
        sort_order: i32,
    ) -> Result<Column>;

    /// Schemata of `source` whose names match `schema_like`
    async fn search_schemas(&self, source: &Source, schema_like: &str)
        -> Result<Vec<CatalogObject>>;

    /// Tables of `schema` whose names match `table_like`
    async fn search_tables(&self, schema: &Schema, table_like: &str) -> Result<Vec<CatalogObject>>;

    /// # Errors
    ///
    /// Returns `PiiCatcherError::SchemaNotFound` for an unknown id.
    async fn get_schema_by_id(&self, id: i64) -> Result<Schema>;

    /// # Errors
    ///
    /// Returns `PiiCatcherError::TableNotFound` for an unknown id.
    async fn get_table_by_id(&self, id: i64) -> Result<Table>;

    /// Columns of `table` ordered by `sort_order`
    ///
    /// With `newer_than` set, only columns updated after that instant or
    /// never scanned are returned.
    async fn get_columns_for_table(
        &self,
        table: &Table,
        newer_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Column>>;

    /// Overwrite the PII annotation of a column and bump its `updated_at`
    async fn set_column_pii_type(
        &self,
        column: &Column,
        pii_type: Option<PiiType>,
        pii_plugin: &str,
    ) -> Result<Column>;

    /// Most recent task recorded under `app_name`
    async fn get_latest_task(&self, app_name: &str) -> Result<Option<Task>>;

    /// All tasks recorded under `app_name`, oldest first
    async fn get_tasks(&self, app_name: &str) -> Result<Vec<Task>>;

    /// Append a task record
    async fn add_task(&self, app_name: &str, status: i32, message: &str) -> Result<Task>;
}

/// Escape `LIKE` wildcards so that `name` matches only itself
pub fn like_escape(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Match `value` against a `LIKE` pattern
pub fn like_match(pattern: &str, value: &str) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Token {
        Any,
        One,
        Char(char),
    }

    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Char(chars.next().unwrap_or('\\')),
            other => Token::Char(other),
        });
    }

    let value: Vec<char> = value.chars().collect();

    // matched[j]: tokens consumed so far match value[..j]
    let mut matched = vec![false; value.len() + 1];
    matched[0] = true;
    for token in tokens {
        let mut next = vec![false; value.len() + 1];
        match token {
            Token::Any => {
                let mut reachable = false;
                for j in 0..=value.len() {
                    reachable |= matched[j];
                    next[j] = reachable;
                }
            }
            Token::One => {
                for j in 0..value.len() {
                    next[j + 1] = matched[j];
                }
            }
            Token::Char(c) => {
                for j in 0..value.len() {
                    next[j + 1] = matched[j] && value[j] == c;
                }
            }
        }
        matched = next;
    }
    matched[value.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("%", "anything", true)]
    #[test_case("%", "", true)]
    #[test_case("full%", "full_pii", true)]
    #[test_case("%pii", "no_pii", true)]
    #[test_case("no_pii", "noXpii", true)]
    #[test_case(r"no\_pii", "noXpii", false)]
    #[test_case(r"no\_pii", "no_pii", true)]
    #[test_case("full_pii", "full_pii_2", false)]
    #[test_case("a_c", "ac", false)]
    fn test_like_match(pattern: &str, value: &str, expected: bool) {
        assert_eq!(like_match(pattern, value), expected);
    }

    #[test]
    fn test_like_escape_matches_only_itself() {
        let name = r"50%_off\sale";
        let pattern = like_escape(name);
        assert!(like_match(&pattern, name));
        assert!(!like_match(&pattern, "50%Xoff\\sale"));
        assert!(!like_match(&pattern, "50 percent_off\\sale"));
    }
}
