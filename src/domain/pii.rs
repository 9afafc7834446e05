//! PII type classification

use super::errors::PiiCatcherError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified category of sensitive data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PiiType {
    /// Person names
    Person,
    /// Email addresses
    Email,
    /// Dates of birth (or death)
    BirthDate,
    /// Gender
    Gender,
    /// Nationality
    Nationality,
    /// Street addresses and location components
    Address,
    /// Postal / ZIP codes
    ZipCode,
    /// Login or user names
    UserName,
    /// Passwords and secrets
    Password,
    /// Social security numbers
    #[serde(rename = "SSN")]
    Ssn,
    /// PO boxes
    PoBox,
    /// Credit card numbers
    CreditCard,
    /// Telephone numbers
    Phone,
}

impl PiiType {
    /// Display name, also used for serialization and the catalog column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Email => "Email",
            Self::BirthDate => "BirthDate",
            Self::Gender => "Gender",
            Self::Nationality => "Nationality",
            Self::Address => "Address",
            Self::ZipCode => "ZipCode",
            Self::UserName => "UserName",
            Self::Password => "Password",
            Self::Ssn => "SSN",
            Self::PoBox => "PoBox",
            Self::CreditCard => "CreditCard",
            Self::Phone => "Phone",
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiType {
    type Err = PiiCatcherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_uppercase();

        match normalized.as_str() {
            "PERSON" | "NAME" => Ok(Self::Person),
            "EMAIL" => Ok(Self::Email),
            "BIRTHDATE" | "DOB" => Ok(Self::BirthDate),
            "GENDER" => Ok(Self::Gender),
            "NATIONALITY" => Ok(Self::Nationality),
            "ADDRESS" => Ok(Self::Address),
            "ZIPCODE" | "ZIP" => Ok(Self::ZipCode),
            "USERNAME" => Ok(Self::UserName),
            "PASSWORD" => Ok(Self::Password),
            "SSN" => Ok(Self::Ssn),
            "POBOX" => Ok(Self::PoBox),
            "CREDITCARD" => Ok(Self::CreditCard),
            "PHONE" => Ok(Self::Phone),
            _ => Err(PiiCatcherError::Validation(format!(
                "Unknown PII type: {s}"
            ))),
        }
    }
}
