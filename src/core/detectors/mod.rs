//! PII detectors and the registry that holds them
//!
//! Two detector kinds exist:
//! - [`MetadataDetector`] classifies a column from its catalog entry alone
//! - [`DatumDetector`] classifies a column from one of its values
//!
//! The [`DetectorRegistry`] is an explicit value passed to the scan engine.
//! Detectors run in registration order and the first non-empty result wins.

pub mod custom;
pub mod datum;
pub mod metadata;

pub use custom::{ConfiguredDetectors, CustomRegexDetector};
pub use datum::DatumRegexDetector;
pub use metadata::ColumnNameRegexDetector;

use crate::domain::{Column, PiiCatcherError, PiiType, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Detector that inspects column metadata
pub trait MetadataDetector: Send + Sync {
    /// Unique detector name
    fn name(&self) -> &str;

    /// Classify a column, returning `None` when nothing applies
    fn detect(&self, column: &Column) -> Result<Option<PiiType>>;
}

/// Detector that inspects individual column values
pub trait DatumDetector: Send + Sync {
    /// Unique detector name
    fn name(&self) -> &str;

    /// Classify a single non-null value of `column`
    fn detect(&self, column: &Column, datum: &str) -> Result<Option<PiiType>>;
}

/// Kind of a registered detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Metadata,
    Datum,
}

impl DetectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Datum => "datum",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = PiiCatcherError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "metadata" => Ok(Self::Metadata),
            "datum" | "data" => Ok(Self::Datum),
            _ => Err(PiiCatcherError::Validation(format!(
                "Unknown detector kind: {s}"
            ))),
        }
    }
}

/// A registered detector capability
#[derive(Clone)]
pub enum Detector {
    Metadata(Arc<dyn MetadataDetector>),
    Datum(Arc<dyn DatumDetector>),
}

impl Detector {
    /// Wrap a metadata detector
    pub fn metadata(detector: impl MetadataDetector + 'static) -> Self {
        Self::Metadata(Arc::new(detector))
    }

    /// Wrap a datum detector
    pub fn datum(detector: impl DatumDetector + 'static) -> Self {
        Self::Datum(Arc::new(detector))
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Metadata(d) => d.name(),
            Self::Datum(d) => d.name(),
        }
    }

    pub fn kind(&self) -> DetectorKind {
        match self {
            Self::Metadata(_) => DetectorKind::Metadata,
            Self::Datum(_) => DetectorKind::Datum,
        }
    }
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Extension point for registering externally provided detectors
pub trait DetectorPlugin {
    /// Add this plugin's detectors to `registry`
    fn register(&self, registry: &mut DetectorRegistry) -> Result<()>;
}

/// Ordered, name-unique collection of detectors
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<Detector>,
}

impl DetectorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in detectors
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::Pattern` if a built-in pattern fails to compile.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Detector::metadata(ColumnNameRegexDetector::new()?));
        registry.register(Detector::datum(DatumRegexDetector::new()?));
        Ok(registry)
    }

    /// Register a detector
    ///
    /// Registering a name twice replaces the earlier detector in place.
    pub fn register(&mut self, detector: Detector) {
        match self
            .detectors
            .iter_mut()
            .find(|d| d.name() == detector.name())
        {
            Some(existing) => *existing = detector,
            None => self.detectors.push(detector),
        }
    }

    /// Let a plugin register its detectors
    pub fn register_plugin(&mut self, plugin: &dyn DetectorPlugin) -> Result<()> {
        plugin.register(self)
    }

    /// All detectors in registration order
    pub fn get_all(&self) -> &[Detector] {
        &self.detectors
    }

    /// Look up a detector by name
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::DetectorNotFound` for unknown names.
    pub fn get(&self, name: &str) -> Result<&Detector> {
        self.detectors
            .iter()
            .find(|d| d.name() == name)
            .ok_or_else(|| PiiCatcherError::DetectorNotFound(name.to_string()))
    }

    /// Registry restricted to the named detectors, in the order given
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let mut selected = Self::new();
        for name in names {
            selected.register(self.get(name)?.clone());
        }
        Ok(selected)
    }

    pub fn names(&self) -> Vec<String> {
        self.detectors.iter().map(|d| d.name().to_string()).collect()
    }

    pub fn metadata_detectors(&self) -> Vec<Arc<dyn MetadataDetector>> {
        self.detectors
            .iter()
            .filter_map(|d| match d {
                Detector::Metadata(m) => Some(Arc::clone(m)),
                Detector::Datum(_) => None,
            })
            .collect()
    }

    pub fn datum_detectors(&self) -> Vec<Arc<dyn DatumDetector>> {
        self.detectors
            .iter()
            .filter_map(|d| match d {
                Detector::Datum(m) => Some(Arc::clone(m)),
                Detector::Metadata(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        name: &'static str,
        result: Option<PiiType>,
    }

    impl MetadataDetector for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        fn detect(&self, _column: &Column) -> Result<Option<PiiType>> {
            Ok(self.result)
        }
    }

    struct Plugin;

    impl DetectorPlugin for Plugin {
        fn register(&self, registry: &mut DetectorRegistry) -> Result<()> {
            registry.register(Detector::metadata(Fixed {
                name: "plugin",
                result: Some(PiiType::Gender),
            }));
            Ok(())
        }
    }

    #[test]
    fn test_builtin_registration_order() {
        let registry = DetectorRegistry::with_builtin().unwrap();
        assert_eq!(
            registry.names(),
            vec!["ColumnNameRegexDetector", "DatumRegexDetector"]
        );
        assert_eq!(registry.metadata_detectors().len(), 1);
        assert_eq!(registry.datum_detectors().len(), 1);
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let mut registry = DetectorRegistry::new();
        registry.register(Detector::metadata(Fixed {
            name: "a",
            result: None,
        }));
        registry.register(Detector::metadata(Fixed {
            name: "b",
            result: None,
        }));
        registry.register(Detector::metadata(Fixed {
            name: "a",
            result: Some(PiiType::Email),
        }));

        assert_eq!(registry.names(), vec!["a", "b"]);
        let column = crate::core::test_support::column("x", "text");
        let replaced = &registry.metadata_detectors()[0];
        assert_eq!(replaced.detect(&column).unwrap(), Some(PiiType::Email));
    }

    #[test]
    fn test_get_unknown_detector() {
        let registry = DetectorRegistry::with_builtin().unwrap();
        let err = registry.get("NoSuchDetector").unwrap_err();
        assert!(matches!(err, PiiCatcherError::DetectorNotFound(ref n) if n == "NoSuchDetector"));
        assert_eq!(registry.get("DatumRegexDetector").unwrap().kind(), DetectorKind::Datum);
    }

    #[test]
    fn test_select_subset() {
        let registry = DetectorRegistry::with_builtin().unwrap();
        let selected = registry
            .select(&["DatumRegexDetector".to_string()])
            .unwrap();
        assert_eq!(selected.names(), vec!["DatumRegexDetector"]);
        assert!(selected.metadata_detectors().is_empty());

        assert!(registry.select(&["missing".to_string()]).is_err());
    }

    #[test]
    fn test_plugin_registration() {
        let mut registry = DetectorRegistry::with_builtin().unwrap();
        registry.register_plugin(&Plugin).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get_all()[2].name(), "plugin");
    }

    #[test]
    fn test_detector_kind_parse() {
        assert_eq!(DetectorKind::from_str("Metadata").unwrap(), DetectorKind::Metadata);
        assert_eq!(DetectorKind::from_str("datum").unwrap(), DetectorKind::Datum);
        assert!(DetectorKind::from_str("column").is_err());
    }
}
