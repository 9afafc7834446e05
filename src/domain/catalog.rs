//! Catalog entity models
//!
//! These types mirror what the catalog collaborator persists. Only the PII
//! annotation on [`Column`] is written by the scan pipeline.

use super::pii::PiiType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lightweight `(name, id)` handle used for filtering before the full
/// entity is loaded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogObject {
    /// Object name
    pub name: String,
    /// Catalog identifier
    pub id: i64,
}

impl CatalogObject {
    /// Create a new catalog object handle
    pub fn new(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Namespace within a source (empty for schema-less engines)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub id: i64,
    pub source_id: i64,
    pub name: String,
}

/// A table within a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    pub schema_id: i64,
    pub name: String,
}

/// A column with its mutable PII annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub table_id: i64,
    pub name: String,
    pub data_type: String,
    pub sort_order: i32,

    /// Detected PII type; `None` either means "not scanned" or "no PII"
    pub pii_type: Option<PiiType>,

    /// Detector(s) that produced the annotation; `None` until first scanned
    pub pii_plugin: Option<String>,

    /// Last structural change or annotation write
    pub updated_at: DateTime<Utc>,
}

impl Column {
    /// Whether any scan has written an annotation for this column
    pub fn is_scanned(&self) -> bool {
        self.pii_plugin.is_some()
    }

    /// PII type as shown in reports (empty when absent)
    pub fn pii_type_display(&self) -> String {
        self.pii_type
            .map(|t| t.to_string())
            .unwrap_or_default()
    }
}

/// Append-only scan history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub app_name: String,

    /// 0 = success, nonzero = failure
    pub status: i32,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Whether the task recorded a successful scan
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

/// Structural description of a table as read from a live database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnMetadata>,
}

/// Structural description of a column as read from a live database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub sort_order: i32,
}

impl ColumnMetadata {
    /// Create a column description
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, sort_order: i32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            sort_order,
        }
    }
}
