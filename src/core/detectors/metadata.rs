//! Column-name heuristics

use super::MetadataDetector;
use crate::core::filter::compile_patterns;
use crate::domain::{Column, PiiType, Result};
use regex::Regex;

/// Ordered `(type, pattern)` table; the first matching entry wins, so more
/// specific name shapes are declared before broader ones.
const COLUMN_NAME_PATTERNS: &[(PiiType, &str)] = &[
    (PiiType::UserName, r"^.*user(_?id|_?name).*$"),
    (PiiType::Password, r"^.*(pass|passwd|password|pwd).*$"),
    (
        PiiType::Person,
        r"^.*(firstname|fname|lastname|lname|fullname|maidenname|_name|nickname|name_suffix|name).*$",
    ),
    (PiiType::Email, r"^.*email.*$"),
    (
        PiiType::BirthDate,
        r"^.*(date_of_birth|dateofbirth|dob|birthday|date_of_death|dateofdeath).*$",
    ),
    (PiiType::Gender, r"^.*(gender).*$"),
    (PiiType::Nationality, r"^.*(nationality).*$"),
    (PiiType::ZipCode, r"^.*(zip_code|zipcode|zip|postcode).*$"),
    (
        PiiType::Address,
        r"^.*(address|city|state|county|country|postal|zone|borough).*$",
    ),
    (
        PiiType::Ssn,
        r"^.*(ssn|social_number|social_security|social_security_number|social_security_no).*$",
    ),
    (PiiType::PoBox, r"^.*(po_box|pobox).*$"),
    (
        PiiType::CreditCard,
        r"^.*(credit_card|cc_number|cc_num|creditcard|credit_card_num|creditcardnumber).*$",
    ),
    (
        PiiType::Phone,
        r"^.*(phone|phone_number|phone_no|phone_num|telephone|telephone_num|telephone_no).*$",
    ),
];

/// Classifies columns by matching their names against a fixed pattern table
pub struct ColumnNameRegexDetector {
    patterns: Vec<(PiiType, Regex)>,
}

impl ColumnNameRegexDetector {
    pub const NAME: &'static str = "ColumnNameRegexDetector";

    pub fn new() -> Result<Self> {
        let sources: Vec<String> = COLUMN_NAME_PATTERNS
            .iter()
            .map(|(_, p)| p.to_string())
            .collect();
        let compiled = compile_patterns(&sources)?;

        Ok(Self {
            patterns: COLUMN_NAME_PATTERNS
                .iter()
                .map(|(t, _)| *t)
                .zip(compiled)
                .collect(),
        })
    }

    /// Classify a bare column name
    pub fn classify(&self, name: &str) -> Option<PiiType> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(name))
            .map(|(t, _)| *t)
    }
}

impl MetadataDetector for ColumnNameRegexDetector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn detect(&self, column: &Column) -> Result<Option<PiiType>> {
        Ok(self.classify(&column.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("username", Some(PiiType::UserName))]
    #[test_case("user_id", Some(PiiType::UserName))]
    #[test_case("password", Some(PiiType::Password))]
    #[test_case("name", Some(PiiType::Person))]
    #[test_case("LastName", Some(PiiType::Person))]
    #[test_case("email", Some(PiiType::Email))]
    #[test_case("dob", Some(PiiType::BirthDate))]
    #[test_case("gender", Some(PiiType::Gender))]
    #[test_case("nationality", Some(PiiType::Nationality))]
    #[test_case("zip_code", Some(PiiType::ZipCode))]
    #[test_case("state", Some(PiiType::Address))]
    #[test_case("ssn", Some(PiiType::Ssn))]
    #[test_case("po_box", Some(PiiType::PoBox))]
    #[test_case("credit_card", Some(PiiType::CreditCard))]
    #[test_case("phone", Some(PiiType::Phone))]
    #[test_case("a", None)]
    #[test_case("id", None)]
    fn test_classify(name: &str, expected: Option<PiiType>) {
        let detector = ColumnNameRegexDetector::new().unwrap();
        assert_eq!(detector.classify(name), expected);
    }

    #[test]
    fn test_username_wins_over_person() {
        let detector = ColumnNameRegexDetector::new().unwrap();
        let column = crate::core::test_support::column("username", "varchar");
        assert_eq!(detector.detect(&column).unwrap(), Some(PiiType::UserName));
    }
}
