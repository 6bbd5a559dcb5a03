//! Emergency contact model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ContactId;

/// A person to call when no guardian can be reached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: ContactId,
    pub name: String,
    pub relationship: String,
    pub phone: String,

    #[serde(default)]
    pub authorized_for_pickup: bool,
}

impl EmergencyContact {
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: ContactId::new(),
            name: name.into(),
            relationship: relationship.into(),
            phone: phone.into(),
            authorized_for_pickup: false,
        }
    }

    pub fn authorized(mut self) -> Self {
        self.authorized_for_pickup = true;
        self
    }
}

impl fmt::Display for EmergencyContact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.name, self.relationship, self.phone)
    }
}

/// Fields of a contact that can be edited in place
#[derive(Debug, Clone)]
pub enum ContactField {
    Name(String),
    Relationship(String),
    Phone(String),
    AuthorizedForPickup(bool),
}

/// Payload of the "emergency" wizard step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContacts {
    pub contacts: Vec<EmergencyContact>,
}

impl EmergencyContacts {
    pub fn new(contacts: Vec<EmergencyContact>) -> Self {
        Self { contacts }
    }

    /// Append a contact and return its ID
    pub fn add(&mut self, contact: EmergencyContact) -> ContactId {
        let id = contact.id;
        self.contacts.push(contact);
        id
    }

    /// Remove a contact; returns false when the ID is unknown
    pub fn remove(&mut self, id: ContactId) -> bool {
        let before = self.contacts.len();
        self.contacts.retain(|c| c.id != id);
        self.contacts.len() != before
    }

    /// Update one field of a contact; returns false when the ID is unknown
    pub fn update(&mut self, id: ContactId, field: ContactField) -> bool {
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        match field {
            ContactField::Name(v) => contact.name = v,
            ContactField::Relationship(v) => contact.relationship = v,
            ContactField::Phone(v) => contact.phone = v,
            ContactField::AuthorizedForPickup(v) => contact.authorized_for_pickup = v,
        }
        true
    }

    /// Contacts allowed to collect the child
    pub fn authorized_for_pickup(&self) -> impl Iterator<Item = &EmergencyContact> {
        self.contacts.iter().filter(|c| c.authorized_for_pickup)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Every contact needs a name and a phone number
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        for (i, contact) in self.contacts.iter().enumerate() {
            if contact.name.trim().is_empty() {
                return Err(ContactValidationError::MissingName(i + 1));
            }
            if contact.phone.trim().is_empty() {
                return Err(ContactValidationError::MissingPhone(contact.name.clone()));
            }
        }
        Ok(())
    }
}

/// Validation errors for emergency contacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// 1-based position of the unnamed contact
    MissingName(usize),
    MissingPhone(String),
}

impl fmt::Display for ContactValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName(pos) => write!(f, "Emergency contact #{} has no name", pos),
            Self::MissingPhone(name) => {
                write!(f, "Emergency contact '{}' has no phone number", name)
            }
        }
    }
}

impl std::error::Error for ContactValidationError {}
