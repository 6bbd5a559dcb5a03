//! Core data models
//!
//! This module contains the data structures of the child-care domain:
//! children, guardians, emergency contacts, enrollment documents, invoices
//! and payments.

pub mod child;
pub mod contact;
pub mod document;
pub mod guardian;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod payment;

pub use child::{Child, EnrollmentStatus, Gender, MedicalInfo, PersonalDetails};
pub use contact::{ContactField, EmergencyContact, EmergencyContacts};
pub use document::{Document, DocumentChecklist, DocumentRequirement, DocumentStatus};
pub use guardian::{Address, CustodyArrangement, CustodyType, Guardian, ParentInformation};
pub use ids::{ChildId, ContactId, DocumentId, GuardianId, InvoiceId, PaymentId};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use money::Money;
pub use payment::{Payment, PaymentMethod, PaymentStatus};
