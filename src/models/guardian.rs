//! Parent and guardian model
//!
//! Guardians are captured by the "parents" step of the registration wizard:
//! one primary guardian, an optional secondary guardian, and an optional
//! custody arrangement.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GuardianId;

/// A postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    fn validate(&self) -> Result<(), GuardianValidationError> {
        if self.street.trim().len() < 5 {
            return Err(GuardianValidationError::StreetTooShort);
        }
        if self.city.trim().len() < 2 {
            return Err(GuardianValidationError::CityTooShort);
        }
        if self.state.trim().len() < 2 {
            return Err(GuardianValidationError::MissingState);
        }
        if self.zip.trim().len() < 5 {
            return Err(GuardianValidationError::InvalidZip(self.zip.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

/// A parent or legal guardian
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guardian {
    pub id: GuardianId,
    pub first_name: String,
    pub last_name: String,

    /// Relationship to the child (Mother, Father, Grandparent, ...)
    pub relationship: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: Address,

    #[serde(default)]
    pub legal_custody: bool,

    #[serde(default)]
    pub lives_with_child: bool,

    #[serde(default)]
    pub authorized_pickup: bool,

    #[serde(default)]
    pub emergency_contact: bool,
}

impl Guardian {
    /// Create a guardian with contact details left empty
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            id: GuardianId::new(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            relationship: relationship.into(),
            email: String::new(),
            phone: String::new(),
            address: Address::default(),
            legal_custody: false,
            lives_with_child: false,
            authorized_pickup: false,
            emergency_contact: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Validate a primary guardian: every contact field is mandatory
    pub fn validate_primary(&self) -> Result<(), GuardianValidationError> {
        self.validate_identity()?;
        if !is_valid_email(&self.email) {
            return Err(GuardianValidationError::InvalidEmail(self.email.clone()));
        }
        if !is_valid_phone(&self.phone) {
            return Err(GuardianValidationError::InvalidPhone(self.phone.clone()));
        }
        self.address.validate()
    }

    /// Validate a secondary guardian: contact fields are checked only when given
    pub fn validate_secondary(&self) -> Result<(), GuardianValidationError> {
        self.validate_identity()?;
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            return Err(GuardianValidationError::InvalidEmail(self.email.clone()));
        }
        if !self.phone.trim().is_empty() && !is_valid_phone(&self.phone) {
            return Err(GuardianValidationError::InvalidPhone(self.phone.clone()));
        }
        Ok(())
    }

    fn validate_identity(&self) -> Result<(), GuardianValidationError> {
        if self.first_name.trim().len() < 2 {
            return Err(GuardianValidationError::FirstNameTooShort);
        }
        if self.last_name.trim().len() < 2 {
            return Err(GuardianValidationError::LastNameTooShort);
        }
        if self.relationship.trim().is_empty() {
            return Err(GuardianValidationError::MissingRelationship);
        }
        Ok(())
    }
}

impl fmt::Display for Guardian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.relationship)
    }
}

/// Custody arrangement between guardians
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustodyType {
    Joint,
    Sole,
    Other,
}

impl CustodyType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "joint" => Some(Self::Joint),
            "sole" => Some(Self::Sole),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for CustodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joint => write!(f, "Joint"),
            Self::Sole => write!(f, "Sole"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyArrangement {
    pub custody_type: CustodyType,

    /// Whether court documents are on file
    #[serde(default)]
    pub documents_on_file: bool,

    #[serde(default)]
    pub notes: String,
}

/// Payload of the "parents" wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentInformation {
    pub primary: Guardian,

    #[serde(default)]
    pub secondary: Option<Guardian>,

    /// Secondary guardian shares the primary's address
    #[serde(default = "default_true")]
    pub same_address: bool,

    #[serde(default)]
    pub custody: Option<CustodyArrangement>,
}

fn default_true() -> bool {
    true
}

impl ParentInformation {
    /// Parent information with only a primary guardian
    pub fn new(primary: Guardian) -> Self {
        Self {
            primary,
            secondary: None,
            same_address: true,
            custody: None,
        }
    }

    /// Attach a secondary guardian
    pub fn with_secondary(mut self, secondary: Guardian, same_address: bool) -> Self {
        self.secondary = Some(secondary);
        self.same_address = same_address;
        self
    }

    /// Validate the step payload
    pub fn validate(&self) -> Result<(), GuardianValidationError> {
        self.primary.validate_primary()?;
        if let Some(secondary) = &self.secondary {
            secondary.validate_secondary()?;
        }
        Ok(())
    }

    /// All guardians with the secondary's address resolved
    pub fn guardians(&self) -> Vec<Guardian> {
        let mut guardians = vec![self.primary.clone()];
        if let Some(secondary) = &self.secondary {
            let mut secondary = secondary.clone();
            if self.same_address {
                secondary.address = self.primary.address.clone();
            }
            guardians.push(secondary);
        }
        guardians
    }
}

/// Loose email check: one `@`, a non-empty local part and a dotted domain
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// A phone number needs at least ten digits; punctuation is ignored
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
}

/// Validation errors for guardians
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardianValidationError {
    FirstNameTooShort,
    LastNameTooShort,
    MissingRelationship,
    InvalidEmail(String),
    InvalidPhone(String),
    StreetTooShort,
    CityTooShort,
    MissingState,
    InvalidZip(String),
}

impl fmt::Display for GuardianValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstNameTooShort => write!(f, "First name must be at least 2 characters"),
            Self::LastNameTooShort => write!(f, "Last name must be at least 2 characters"),
            Self::MissingRelationship => write!(f, "Please select a relationship"),
            Self::InvalidEmail(e) => write!(f, "Invalid email address: '{}'", e),
            Self::InvalidPhone(p) => write!(f, "Invalid phone number: '{}'", p),
            Self::StreetTooShort => write!(f, "Address must be at least 5 characters"),
            Self::CityTooShort => write!(f, "City must be at least 2 characters"),
            Self::MissingState => write!(f, "Please select a state"),
            Self::InvalidZip(z) => write!(f, "Invalid ZIP code: '{}'", z),
        }
    }
}

impl std::error::Error for GuardianValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn primary() -> Guardian {
        let mut g = Guardian::new("John", "Doe", "Father");
        g.email = "john.doe@example.com".into();
        g.phone = "(555) 123-4567".into();
        g.address = Address::new("123 Main St", "Anytown", "CA", "12345");
        g.legal_custody = true;
        g
    }

    #[test]
    fn test_valid_primary() {
        assert!(ParentInformation::new(primary()).validate().is_ok());
    }

    #[test]
    fn test_primary_rules() {
        let mut g = primary();
        g.first_name = "J".into();
        assert_eq!(g.validate_primary(), Err(GuardianValidationError::FirstNameTooShort));

        let mut g = primary();
        g.email = "not-an-email".into();
        assert!(matches!(
            g.validate_primary(),
            Err(GuardianValidationError::InvalidEmail(_))
        ));

        let mut g = primary();
        g.phone = "555-1234".into();
        assert!(matches!(
            g.validate_primary(),
            Err(GuardianValidationError::InvalidPhone(_))
        ));

        let mut g = primary();
        g.address.zip = "123".into();
        assert!(matches!(
            g.validate_primary(),
            Err(GuardianValidationError::InvalidZip(_))
        ));
    }

    #[test]
    fn test_secondary_contact_fields_optional() {
        let secondary = Guardian::new("Jane", "Doe", "Mother");
        let info = ParentInformation::new(primary()).with_secondary(secondary, true);
        assert!(info.validate().is_ok());

        let mut bad = Guardian::new("Jane", "Doe", "Mother");
        bad.email = "jane@".into();
        let info = ParentInformation::new(primary()).with_secondary(bad, true);
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_same_address_copies_primary() {
        let mut secondary = Guardian::new("Jane", "Doe", "Mother");
        secondary.address = Address::new("9 Elm Road", "Othertown", "NY", "54321");

        let info = ParentInformation::new(primary()).with_secondary(secondary.clone(), true);
        let guardians = info.guardians();
        assert_eq!(guardians.len(), 2);
        assert_eq!(guardians[1].address, guardians[0].address);

        let info = ParentInformation::new(primary()).with_secondary(secondary, false);
        assert_eq!(info.guardians()[1].address.city, "Othertown");
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.co"));
        assert!(!is_valid_email("a@@b.co"));
    }
}
