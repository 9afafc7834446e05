//! Regex detectors declared in configuration

use super::{DatumDetector, Detector, DetectorKind, DetectorPlugin, DetectorRegistry, MetadataDetector};
use crate::config::CustomDetectorConfig;
use crate::core::filter::compile_patterns;
use crate::domain::{Column, PiiCatcherError, PiiType, Result};
use regex::Regex;

/// A detector that reports a single PII type when any of its patterns match.
///
/// As a metadata detector it matches column names; as a datum detector it
/// matches values.
pub struct CustomRegexDetector {
    name: String,
    pii_type: PiiType,
    patterns: Vec<Regex>,
}

impl CustomRegexDetector {
    /// Compile a detector from case-insensitive patterns
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::Pattern` for an invalid pattern and
    /// `PiiCatcherError::Validation` when no pattern is given.
    pub fn new(name: impl Into<String>, pii_type: PiiType, patterns: &[String]) -> Result<Self> {
        let name = name.into();
        if patterns.is_empty() {
            return Err(PiiCatcherError::Validation(format!(
                "Detector '{name}' has no patterns"
            )));
        }

        Ok(Self {
            name,
            pii_type,
            patterns: compile_patterns(patterns)?,
        })
    }

    /// Build a registry entry from a configuration block
    pub fn from_config(config: &CustomDetectorConfig) -> Result<Detector> {
        let detector = Self::new(config.name.clone(), config.pii_type, &config.patterns)?;
        Ok(match config.kind {
            DetectorKind::Metadata => Detector::metadata(detector),
            DetectorKind::Datum => Detector::datum(detector),
        })
    }

    fn classify(&self, text: &str) -> Option<PiiType> {
        self.patterns
            .iter()
            .any(|re| re.is_match(text))
            .then_some(self.pii_type)
    }
}

impl MetadataDetector for CustomRegexDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, column: &Column) -> Result<Option<PiiType>> {
        Ok(self.classify(&column.name))
    }
}

impl DatumDetector for CustomRegexDetector {
    fn name(&self) -> &str {
        &self.name
    }

    fn detect(&self, _column: &Column, datum: &str) -> Result<Option<PiiType>> {
        Ok(self.classify(datum))
    }
}

/// Plugin that registers every `[[detectors.custom]]` entry
pub struct ConfiguredDetectors<'a> {
    configs: &'a [CustomDetectorConfig],
}

impl<'a> ConfiguredDetectors<'a> {
    pub fn new(configs: &'a [CustomDetectorConfig]) -> Self {
        Self { configs }
    }
}

impl DetectorPlugin for ConfiguredDetectors<'_> {
    fn register(&self, registry: &mut DetectorRegistry) -> Result<()> {
        for config in self.configs {
            registry.register(CustomRegexDetector::from_config(config)?);
            tracing::debug!(
                detector = %config.name,
                kind = %config.kind,
                "Registered configured detector"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::column;

    fn config(kind: DetectorKind, patterns: &[&str]) -> CustomDetectorConfig {
        CustomDetectorConfig {
            name: "EmployeeIdDetector".to_string(),
            kind,
            pii_type: PiiType::UserName,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_metadata_detector_matches_column_name() {
        let detector = CustomRegexDetector::from_config(&config(DetectorKind::Metadata, &["^emp_no$"])).unwrap();
        let Detector::Metadata(detector) = detector else {
            panic!("expected a metadata detector");
        };

        assert_eq!(
            detector.detect(&column("EMP_NO", "int")).unwrap(),
            Some(PiiType::UserName)
        );
        assert_eq!(detector.detect(&column("emp_name", "text")).unwrap(), None);
    }

    #[test]
    fn test_datum_detector_matches_values() {
        let detector = CustomRegexDetector::from_config(&config(DetectorKind::Datum, &[r"^E\d{6}$"])).unwrap();
        let Detector::Datum(detector) = detector else {
            panic!("expected a datum detector");
        };

        let col = column("badge", "text");
        assert_eq!(detector.detect(&col, "e123456").unwrap(), Some(PiiType::UserName));
        assert_eq!(detector.detect(&col, "E12").unwrap(), None);
    }

    #[test]
    fn test_invalid_or_empty_patterns() {
        assert!(matches!(
            CustomRegexDetector::from_config(&config(DetectorKind::Datum, &["(oops"])),
            Err(PiiCatcherError::Pattern { .. })
        ));
        assert!(matches!(
            CustomRegexDetector::from_config(&config(DetectorKind::Datum, &[])),
            Err(PiiCatcherError::Validation(_))
        ));
    }

    #[test]
    fn test_plugin_registers_after_builtins() {
        let configs = vec![config(DetectorKind::Metadata, &["emp"])];
        let mut registry = DetectorRegistry::with_builtin().unwrap();
        registry
            .register_plugin(&ConfiguredDetectors::new(&configs))
            .unwrap();

        assert_eq!(registry.names().last().map(String::as_str), Some("EmployeeIdDetector"));
        assert_eq!(registry.metadata_detectors().len(), 2);
    }
}
