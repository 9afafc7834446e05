//! Domain error types
//!
//! This module defines the error hierarchy for PiiCatcher. Driver errors from
//! sqlx and tokio-postgres are carried unchanged so callers see the original
//! failure; everything else is a domain-specific variant.

use crate::domain::source::SourceType;
use thiserror::Error;

/// Main PiiCatcher error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum PiiCatcherError {
    /// Invalid include/exclude (or detector) regular expression
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern text
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Unrecognized source type discriminant
    #[error("Unknown source type: {0}")]
    UnknownSourceType(String),

    /// The dialect has no native sampling clause
    #[error("Sampling is not supported for {0} sources")]
    SamplingNotSupported(SourceType),

    /// Requested detector is not registered
    #[error("Detector not found: {0}")]
    DetectorNotFound(String),

    /// Source is not present in the catalog
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Schema is not present in the catalog
    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    /// Table is not present in the catalog
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// No database driver is compiled in for this source type
    #[error("No database driver available for {0} sources")]
    UnsupportedDriver(SourceType),

    /// No columns matched the scan filters
    #[error("No columns matched the given filters")]
    NoMatches,

    /// SQLite / MySQL driver errors
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// PostgreSQL / Redshift driver errors
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),

    /// Database errors that do not originate from a driver call (pools, decoding)
    #[error("Database error: {0}")]
    Database(String),

    /// Catalog consistency errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A detector failed while classifying a column or value
    #[error("Detector '{detector}' failed: {message}")]
    Detector {
        /// Name of the failing detector
        detector: String,
        /// Failure description
        message: String,
    },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl PiiCatcherError {
    /// Build a pattern error from the pattern text and the regex failure
    pub fn pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Whether this error is the soft "nothing matched" condition
    pub fn is_no_matches(&self) -> bool {
        matches!(self, Self::NoMatches)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for PiiCatcherError {
    fn from(err: std::io::Error) -> Self {
        PiiCatcherError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PiiCatcherError {
    fn from(err: serde_json::Error) -> Self {
        PiiCatcherError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PiiCatcherError {
    fn from(err: toml::de::Error) -> Self {
        PiiCatcherError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Pool errors carry no driver state worth preserving
impl From<deadpool_postgres::PoolError> for PiiCatcherError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        PiiCatcherError::Database(format!("Failed to get connection from pool: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PiiCatcherError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");

        let err = PiiCatcherError::UnknownSourceType("oracle".to_string());
        assert_eq!(err.to_string(), "Unknown source type: oracle");
    }

    #[test]
    fn test_pattern_error_keeps_source() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err = PiiCatcherError::pattern("(unclosed", regex_err);
        assert!(err.to_string().contains("(unclosed"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_sampling_not_supported_names_dialect() {
        let err = PiiCatcherError::SamplingNotSupported(SourceType::Sqlite);
        assert_eq!(err.to_string(), "Sampling is not supported for sqlite sources");
    }

    #[test]
    fn test_no_matches_is_soft() {
        assert!(PiiCatcherError::NoMatches.is_no_matches());
        assert!(!PiiCatcherError::Validation("x".to_string()).is_no_matches());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PiiCatcherError = io_err.into();
        assert!(matches!(err, PiiCatcherError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PiiCatcherError = json_err.into();
        assert!(matches!(err, PiiCatcherError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PiiCatcherError = toml_err.into();
        assert!(matches!(err, PiiCatcherError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
