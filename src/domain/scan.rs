//! Scan mode and report format selectors

use super::errors::PiiCatcherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a scan inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Column names and types only
    #[default]
    Metadata,
    /// Sampled column values
    Data,
}

impl ScanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanType {
    type Err = PiiCatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metadata" | "shallow" => Ok(Self::Metadata),
            "data" | "deep" => Ok(Self::Data),
            _ => Err(PiiCatcherError::Validation(format!(
                "Invalid scan type '{s}'. Must be one of: metadata, data"
            ))),
        }
    }
}

/// Shape of the rendered report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flat `[schema, table, column, pii_type]` rows
    #[default]
    Tabular,
    /// Nested source/schemata/tables/columns document
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tabular => "tabular",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PiiCatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tabular" | "table" => Ok(Self::Tabular),
            "json" | "dict" => Ok(Self::Json),
            _ => Err(PiiCatcherError::Validation(format!(
                "Invalid output format '{s}'. Must be one of: tabular, json"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_type_parse() {
        assert_eq!(ScanType::from_str("metadata").unwrap(), ScanType::Metadata);
        assert_eq!(ScanType::from_str("DATA").unwrap(), ScanType::Data);
        assert_eq!(ScanType::from_str("deep").unwrap(), ScanType::Data);
        assert!(ScanType::from_str("full").is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("Tabular").unwrap(), OutputFormat::Tabular);
        assert!(OutputFormat::from_str("csv").is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ScanType::default(), ScanType::Metadata);
        assert_eq!(OutputFormat::default(), OutputFormat::Tabular);
    }
}
