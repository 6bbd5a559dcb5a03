//! Child model
//!
//! A registered child together with everything collected by the registration
//! wizard: personal details, guardians, emergency contacts and documents.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::contact::EmergencyContact;
use super::document::DocumentChecklist;
use super::guardian::{CustodyArrangement, Guardian};
use super::ids::ChildId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unspecified,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Some(Self::Female),
            "male" | "m" => Some(Self::Male),
            "" | "unspecified" | "other" | "prefer not to say" => Some(Self::Unspecified),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Female => write!(f, "Female"),
            Self::Male => write!(f, "Male"),
            Self::Unspecified => write!(f, "Unspecified"),
        }
    }
}

/// Enrollment status shown in the children directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Inactive,
    Waitlist,
}

impl EnrollmentStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" | "former" => Some(Self::Inactive),
            "waitlist" | "waitlisted" => Some(Self::Waitlist),
            _ => None,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Inactive => write!(f, "Inactive"),
            Self::Waitlist => write!(f, "Waitlist"),
        }
    }
}

/// Health information kept on file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalInfo {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub blood_type: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub doctor_phone: String,
}

impl MedicalInfo {
    /// Whether staff need to be alerted (allergies, medications or conditions)
    pub fn has_alerts(&self) -> bool {
        !self.allergies.is_empty() || !self.medications.is_empty() || !self.conditions.is_empty()
    }
}

/// Payload of the "personal" wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub address: String,

    pub enrollment_date: NaiveDate,

    #[serde(default)]
    pub status: EnrollmentStatus,

    #[serde(default)]
    pub classroom: Option<String>,

    #[serde(default)]
    pub medical: MedicalInfo,
}

impl PersonalDetails {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
        enrollment_date: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            gender: Gender::default(),
            address: String::new(),
            enrollment_date,
            status: EnrollmentStatus::default(),
            classroom: None,
            medical: MedicalInfo::default(),
        }
    }

    /// Validate the step payload
    pub fn validate(&self) -> Result<(), ChildValidationError> {
        if self.first_name.trim().len() < 2 {
            return Err(ChildValidationError::FirstNameTooShort);
        }
        if self.last_name.trim().len() < 2 {
            return Err(ChildValidationError::LastNameTooShort);
        }
        if self.date_of_birth > self.enrollment_date {
            return Err(ChildValidationError::BornAfterEnrollment {
                date_of_birth: self.date_of_birth,
                enrollment_date: self.enrollment_date,
            });
        }
        if let Some(room) = &self.classroom {
            if room.trim().is_empty() {
                return Err(ChildValidationError::EmptyClassroom);
            }
        }
        Ok(())
    }
}

/// A registered child
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub address: String,

    pub enrollment_date: NaiveDate,
    pub status: EnrollmentStatus,

    /// Assigned room; `None` while unassigned
    #[serde(default)]
    pub classroom: Option<String>,

    #[serde(default)]
    pub medical: MedicalInfo,

    /// Primary guardian first
    #[serde(default)]
    pub guardians: Vec<Guardian>,

    #[serde(default)]
    pub custody: Option<CustodyArrangement>,

    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,

    #[serde(default)]
    pub documents: DocumentChecklist,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Child {
    /// Create a child from the personal-details step alone
    pub fn new(details: PersonalDetails) -> Self {
        let now = Utc::now();
        Self {
            id: ChildId::new(),
            first_name: details.first_name,
            last_name: details.last_name,
            date_of_birth: details.date_of_birth,
            gender: details.gender,
            address: details.address,
            enrollment_date: details.enrollment_date,
            status: details.status,
            classroom: details.classroom,
            medical: details.medical,
            guardians: Vec::new(),
            custody: None,
            emergency_contacts: Vec::new(),
            documents: DocumentChecklist::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Name of the primary guardian, or an empty string
    pub fn primary_guardian_name(&self) -> String {
        self.guardians
            .first()
            .map(Guardian::full_name)
            .unwrap_or_default()
    }

    /// Age in whole years on a given date
    pub fn age_on(&self, date: NaiveDate) -> u32 {
        let dob = self.date_of_birth;
        if date < dob {
            return 0;
        }
        let mut years = date.year() - dob.year();
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            years -= 1;
        }
        years.max(0) as u32
    }

    /// The personal-details view of this child, used to pre-fill the edit wizard
    pub fn personal_details(&self) -> PersonalDetails {
        PersonalDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            address: self.address.clone(),
            enrollment_date: self.enrollment_date,
            status: self.status,
            classroom: self.classroom.clone(),
            medical: self.medical.clone(),
        }
    }

    /// Replace the personal details, keeping ID and creation time
    pub fn apply_personal_details(&mut self, details: PersonalDetails) {
        self.first_name = details.first_name;
        self.last_name = details.last_name;
        self.date_of_birth = details.date_of_birth;
        self.gender = details.gender;
        self.address = details.address;
        self.enrollment_date = details.enrollment_date;
        self.status = details.status;
        self.classroom = details.classroom;
        self.medical = details.medical;
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: EnrollmentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_classroom(&mut self, classroom: Option<String>) {
        self.classroom = classroom;
        self.updated_at = Utc::now();
    }

    /// Validate the child record
    pub fn validate(&self) -> Result<(), ChildValidationError> {
        self.personal_details().validate()?;
        if self.guardians.is_empty() {
            return Err(ChildValidationError::NoGuardian);
        }
        Ok(())
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// Validation errors for children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildValidationError {
    FirstNameTooShort,
    LastNameTooShort,
    BornAfterEnrollment {
        date_of_birth: NaiveDate,
        enrollment_date: NaiveDate,
    },
    EmptyClassroom,
    NoGuardian,
}

impl fmt::Display for ChildValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstNameTooShort => write!(f, "First name must be at least 2 characters"),
            Self::LastNameTooShort => write!(f, "Last name must be at least 2 characters"),
            Self::BornAfterEnrollment {
                date_of_birth,
                enrollment_date,
            } => write!(
                f,
                "Date of birth {} is after enrollment date {}",
                date_of_birth, enrollment_date
            ),
            Self::EmptyClassroom => write!(f, "Classroom name cannot be blank"),
            Self::NoGuardian => write!(f, "A child needs at least one guardian"),
        }
    }
}

impl std::error::Error for ChildValidationError {}
