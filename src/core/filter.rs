//! Include/exclude filtering of catalog objects
//!
//! Patterns are case-insensitive and unanchored: a pattern matches an object
//! when it is found anywhere in the object's name.

use crate::domain::{CatalogObject, PiiCatcherError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Compiled include/exclude pattern sets
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl ObjectFilter {
    /// Compile include and exclude patterns
    ///
    /// # Errors
    ///
    /// Returns `PiiCatcherError::Pattern` for the first pattern that fails to
    /// compile; no object has been matched at that point.
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    /// A filter that keeps everything
    pub fn pass_through() -> Self {
        Self::default()
    }

    /// Whether a single name survives the filter
    pub fn matches(&self, name: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|re| re.is_match(name));
        included && !self.exclude.iter().any(|re| re.is_match(name))
    }

    /// Apply the filter to a collection of objects
    ///
    /// The include stage is a union across patterns deduplicated by id.
    /// No ordering is guaranteed.
    pub fn apply(&self, objects: Vec<CatalogObject>) -> Vec<CatalogObject> {
        let included: Vec<CatalogObject> = if self.include.is_empty() {
            objects
        } else {
            let mut seen = HashSet::new();
            let mut union = Vec::new();
            for re in &self.include {
                for object in objects.iter().filter(|o| re.is_match(&o.name)) {
                    if seen.insert(object.id) {
                        union.push(object.clone());
                    }
                }
            }
            union
        };

        self.exclude.iter().fold(included, |remaining, re| {
            remaining
                .into_iter()
                .filter(|o| !re.is_match(&o.name))
                .collect()
        })
    }
}

/// Filter catalog objects by include/exclude regex sets
///
/// Absent or empty `include` means no include filtering.
///
/// # Errors
///
/// Returns `PiiCatcherError::Pattern` if any pattern is invalid.
pub fn filter(
    include: Option<&[String]>,
    exclude: Option<&[String]>,
    objects: Vec<CatalogObject>,
) -> Result<Vec<CatalogObject>> {
    let filter = ObjectFilter::new(include.unwrap_or_default(), exclude.unwrap_or_default())?;
    Ok(filter.apply(objects))
}

/// Compile case-insensitive patterns, failing on the first invalid one
pub(crate) fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| PiiCatcherError::pattern(p.clone(), e))
        })
        .collect()
}
