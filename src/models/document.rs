//! Enrollment document checklist
//!
//! Tracks which enrollment paperwork has been supplied. Only the file name is
//! recorded; the document itself lives outside this tool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::DocumentId;

/// Status of a single document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Nothing supplied yet
    #[default]
    Pending,
    /// A file has been attached
    Uploaded,
    /// Required but missing when the checklist was submitted
    Error,
    /// Checked by staff
    Verified,
}

impl DocumentStatus {
    /// Whether the document counts as supplied
    pub fn is_supplied(&self) -> bool {
        matches!(self, Self::Uploaded | Self::Verified)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Uploaded => write!(f, "Uploaded"),
            Self::Error => write!(f, "Missing"),
            Self::Verified => write!(f, "Verified"),
        }
    }
}

/// A checklist entry definition, as configured in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequirement {
    pub name: String,
    pub required: bool,
}

impl DocumentRequirement {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            required,
        }
    }
}

/// The default enrollment paperwork
pub fn standard_requirements() -> Vec<DocumentRequirement> {
    vec![
        DocumentRequirement::new("Birth Certificate", true),
        DocumentRequirement::new("Immunization Records", true),
        DocumentRequirement::new("Medical Authorization Form", true),
        DocumentRequirement::new("Emergency Contact Form", true),
        DocumentRequirement::new("Photo Release Form", false),
    ]
}

/// A document on a child's checklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub required: bool,

    #[serde(default)]
    pub status: DocumentStatus,

    #[serde(default)]
    pub file_name: Option<String>,

    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(name: impl Into<String>, required: bool) -> Self {
        Self {
            id: DocumentId::new(),
            name: name.into(),
            required,
            status: DocumentStatus::Pending,
            file_name: None,
            uploaded_at: None,
        }
    }
}

/// Payload of the "documents" wizard step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChecklist {
    pub documents: Vec<Document>,
}

impl DocumentChecklist {
    /// Build an empty checklist from requirements
    pub fn from_requirements(requirements: &[DocumentRequirement]) -> Self {
        Self {
            documents: requirements
                .iter()
                .map(|r| Document::new(r.name.clone(), r.required))
                .collect(),
        }
    }

    /// Find a document by case-insensitive name
    pub fn find(&self, name: &str) -> Option<&Document> {
        let name = name.trim().to_lowercase();
        self.documents.iter().find(|d| d.name.to_lowercase() == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut Document> {
        let name = name.trim().to_lowercase();
        self.documents
            .iter_mut()
            .find(|d| d.name.to_lowercase() == name)
    }

    /// Attach a file to a document; returns false when no such document exists
    pub fn attach(&mut self, name: &str, file_name: impl Into<String>) -> bool {
        let Some(doc) = self.find_mut(name) else {
            return false;
        };
        doc.file_name = Some(file_name.into());
        doc.status = DocumentStatus::Uploaded;
        doc.uploaded_at = Some(Utc::now());
        true
    }

    /// Detach a document's file, resetting it to pending
    pub fn remove_file(&mut self, name: &str) -> bool {
        let Some(doc) = self.find_mut(name) else {
            return false;
        };
        doc.file_name = None;
        doc.status = DocumentStatus::Pending;
        doc.uploaded_at = None;
        true
    }

    /// Mark an uploaded document as checked by staff
    pub fn verify(&mut self, name: &str) -> bool {
        match self.find_mut(name) {
            Some(doc) if doc.status == DocumentStatus::Uploaded => {
                doc.status = DocumentStatus::Verified;
                true
            }
            _ => false,
        }
    }

    /// Names of required documents not yet supplied
    pub fn missing_required(&self) -> Vec<String> {
        self.documents
            .iter()
            .filter(|d| d.required && !d.status.is_supplied())
            .map(|d| d.name.clone())
            .collect()
    }

    /// Whether every required document has been supplied
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Validate for submission, flagging missing required documents
    ///
    /// Missing required documents are set to `Error` so the next display shows
    /// them as missing.
    pub fn check_submission(&mut self) -> Result<(), DocumentValidationError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            return Ok(());
        }
        for doc in &mut self.documents {
            if doc.required && !doc.status.is_supplied() {
                doc.status = DocumentStatus::Error;
            }
        }
        Err(DocumentValidationError::MissingRequired(missing))
    }
}

/// Validation errors for the document checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValidationError {
    MissingRequired(Vec<String>),
}

impl fmt::Display for DocumentValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRequired(names) => {
                write!(f, "Required documents missing: {}", names.join(", "))
            }
        }
    }
}

impl std::error::Error for DocumentValidationError {}
