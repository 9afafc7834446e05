//! Domain models and types for PiiCatcher.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Catalog entities** ([`Source`], [`Schema`], [`Table`], [`Column`], [`Task`])
//! - **Classification** ([`PiiType`])
//! - **Error types** ([`PiiCatcherError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, PiiCatcherError>`]:
//!
//! ```rust
//! use piicatcher::domain::{PiiCatcherError, Result, SourceType};
//! use std::str::FromStr;
//!
//! fn example() -> Result<SourceType> {
//!     SourceType::from_str("postgresql")
//! }
//! ```

pub mod catalog;
pub mod errors;
pub mod pii;
pub mod result;
pub mod scan;
pub mod source;

pub use catalog::{CatalogObject, Column, ColumnMetadata, Schema, Table, TableMetadata, Task};
pub use errors::PiiCatcherError;
pub use pii::PiiType;
pub use result::Result;
pub use scan::{OutputFormat, ScanType};
pub use source::{app_name, Source, SourceType};
