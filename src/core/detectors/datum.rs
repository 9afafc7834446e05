//! Value-level pattern matching

use super::DatumDetector;
use crate::domain::{Column, PiiCatcherError, PiiType, Result};
use regex::{Regex, RegexBuilder};

// Numeric patterns are bounded by a non-digit, non-dash character (or the
// ends of the value) so that they do not match inside longer digit runs.
const PHONE: &str =
    r"(?:^|[^\d-])(?:\+?1[-.\s]?)?(?:\(\d{3}\)\s?|\d{3}[-.\s]?)\d{3}[-.\s]?\d{4}(?:[^\d-]|$)";
const EMAIL: &str = r"[\w.+-]+@[\w-]+\.[\w.-]*[a-z]";
const CREDIT_CARD: &str = r"(?:^|[^\d-])(?:\d{4}[- ]?){3}\d{4}(?:[^\d-]|$)";
const ADDRESS: &str = r"\d{1,4}\s[\w\s]{1,20}\b(?:street|st|avenue|ave|road|rd|highway|hwy|square|sq|trail|trl|drive|dr|court|ct|parkway|pkwy|circle|cir|boulevard|blvd)\b";
const SSN: &str = r"(?:^|[^\d-])\d{3}-\d{2}-\d{4}(?:[^\d-]|$)";
const ZIP_CODE: &str = r"(?:^|[^\d-])\d{5}(?:-\d{4})?(?:[^\d-]|$)";
const PO_BOX: &str = r"\bP\.?\s?O\.?\s?Box\s+\d+";

/// Cascade order; the first match wins
const DATUM_PATTERNS: &[(PiiType, &str)] = &[
    (PiiType::Phone, PHONE),
    (PiiType::Email, EMAIL),
    (PiiType::CreditCard, CREDIT_CARD),
    (PiiType::Address, ADDRESS),
    (PiiType::Ssn, SSN),
    (PiiType::ZipCode, ZIP_CODE),
    (PiiType::PoBox, PO_BOX),
];

/// Classifies values with a fixed cascade of common PII shapes
pub struct DatumRegexDetector {
    cascade: Vec<(PiiType, Regex)>,
}

impl DatumRegexDetector {
    pub const NAME: &'static str = "DatumRegexDetector";

    pub fn new() -> Result<Self> {
        let cascade = DATUM_PATTERNS
            .iter()
            .map(|(pii_type, pattern)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (*pii_type, re))
                    .map_err(|e| PiiCatcherError::pattern(*pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { cascade })
    }

    /// Classify a bare value
    pub fn classify(&self, value: &str) -> Option<PiiType> {
        self.cascade
            .iter()
            .find(|(_, re)| re.is_match(value))
            .map(|(t, _)| *t)
    }
}

impl DatumDetector for DatumRegexDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, _column: &Column, datum: &str) -> Result<Option<PiiType>> {
        Ok(self.classify(datum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("917-908-2234", Some(PiiType::Phone))]
    #[test_case("call (212) 555-0199 today", Some(PiiType::Phone))]
    #[test_case("jane.doe@example.com", Some(PiiType::Email))]
    #[test_case("4111 1111 1111 1111", Some(PiiType::CreditCard))]
    #[test_case("1600 Pennsylvania Avenue", Some(PiiType::Address))]
    #[test_case("123-45-6789", Some(PiiType::Ssn))]
    #[test_case("94107", Some(PiiType::ZipCode))]
    #[test_case("PO Box 123", Some(PiiType::PoBox))]
    #[test_case("abc", None)]
    #[test_case("", None)]
    #[test_case("1234", None)]
    fn test_classify(value: &str, expected: Option<PiiType>) {
        let detector = DatumRegexDetector::new().unwrap();
        assert_eq!(detector.classify(value), expected);
    }

    #[test]
    fn test_detect_ignores_column() {
        let detector = DatumRegexDetector::new().unwrap();
        let column = crate::core::test_support::column("a", "text");
        assert_eq!(detector.detect(&column, "917-908-2234").unwrap(), Some(PiiType::Phone));
        assert_eq!(detector.detect(&column, "abc").unwrap(), None);
    }
}
