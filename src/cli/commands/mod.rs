//! CLI command implementations
//!
//! Every handler returns the process exit code: 0 on success, 1 when a
//! report came back empty without `--list-all`, 2 for configuration
//! errors and 5 for any other failure.

pub mod detectors;
pub mod init;
pub mod report;
pub mod scan;
pub mod status;
pub mod validate;

use crate::adapters::catalog::{create_catalog, Catalog};
use crate::config::{load_config_or_default, PiiCatcherConfig};
use crate::core::detectors::{ConfiguredDetectors, DetectorRegistry};
use crate::core::generators::ScanFilters;
use crate::domain::{PiiCatcherError, Result};
use clap::Args;
use std::path::Path;
use std::sync::Arc;

/// Exit code for a failed command
pub fn exit_code(err: &PiiCatcherError) -> i32 {
    match err {
        PiiCatcherError::NoMatches => 1,
        PiiCatcherError::Configuration(_)
        | PiiCatcherError::Validation(_)
        | PiiCatcherError::Pattern { .. }
        | PiiCatcherError::UnknownSourceType(_)
        | PiiCatcherError::DetectorNotFound(_) => 2,
        _ => 5,
    }
}

/// Print `err` under `headline` and return its exit code
pub(crate) fn report_failure(headline: &str, err: &PiiCatcherError) -> i32 {
    eprintln!("❌ {headline}");
    eprintln!("   Error: {err}");
    exit_code(err)
}

/// Load the configuration named on the command line, or the defaults
pub(crate) fn load_config(config_path: Option<&str>) -> Result<PiiCatcherConfig> {
    load_config_or_default(config_path.map(Path::new))
}

/// Built-in detectors followed by the configured ones
pub(crate) fn build_registry(config: &PiiCatcherConfig) -> Result<DetectorRegistry> {
    let mut registry = DetectorRegistry::with_builtin()?;
    registry.register_plugin(&ConfiguredDetectors::new(&config.detectors.custom))?;
    Ok(registry)
}

/// Open the configured catalog
pub(crate) async fn open_catalog(config: &PiiCatcherConfig) -> Result<Arc<dyn Catalog>> {
    create_catalog(&config.catalog).await
}

/// Repeated include/exclude regex flags
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only scan schemata matching this regex (repeatable)
    #[arg(long = "include-schema", value_name = "REGEX")]
    pub include_schema: Vec<String>,

    /// Skip schemata matching this regex (repeatable)
    #[arg(long = "exclude-schema", value_name = "REGEX")]
    pub exclude_schema: Vec<String>,

    /// Only scan tables matching this regex (repeatable)
    #[arg(long = "include-table", value_name = "REGEX")]
    pub include_table: Vec<String>,

    /// Skip tables matching this regex (repeatable)
    #[arg(long = "exclude-table", value_name = "REGEX")]
    pub exclude_table: Vec<String>,
}

impl FilterArgs {
    pub fn to_filters(&self) -> ScanFilters {
        ScanFilters {
            include_schema: self.include_schema.clone(),
            exclude_schema: self.exclude_schema.clone(),
            include_table: self.include_table.clone(),
            exclude_table: self.exclude_table.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomDetectorConfig, PiiCatcherConfig};
    use crate::core::detectors::DetectorKind;
    use crate::domain::{PiiType, SourceType};
    use test_case::test_case;

    #[test_case(PiiCatcherError::NoMatches, 1 ; "no matches")]
    #[test_case(PiiCatcherError::Configuration("bad".into()), 2 ; "configuration")]
    #[test_case(PiiCatcherError::DetectorNotFound("x".into()), 2 ; "unknown detector")]
    #[test_case(PiiCatcherError::UnsupportedDriver(SourceType::Athena), 5 ; "unsupported driver")]
    #[test_case(PiiCatcherError::Database("down".into()), 5 ; "database")]
    fn test_exit_code(err: PiiCatcherError, expected: i32) {
        assert_eq!(exit_code(&err), expected);
    }

    #[test]
    fn test_build_registry_appends_configured_detectors() {
        let mut config = PiiCatcherConfig::default();
        config.detectors.custom.push(CustomDetectorConfig {
            name: "EmployeeIdDetector".to_string(),
            kind: DetectorKind::Metadata,
            pii_type: PiiType::Ssn,
            patterns: vec!["^emp_id$".to_string()],
        });

        let registry = build_registry(&config).unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "ColumnNameRegexDetector",
                "DatumRegexDetector",
                "EmployeeIdDetector"
            ]
        );
    }
}
