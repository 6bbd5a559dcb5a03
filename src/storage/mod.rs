//! Storage layer
//!
//! JSON files under `data/` with atomic writes, one repository per record
//! type, and the append-only audit log.

pub mod children;
pub mod file_io;
pub mod init;
pub mod invoices;
pub mod payments;

pub use children::ChildRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use invoices::InvoiceRepository;
pub use payments::PaymentRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::CarePaths;
use crate::error::CareError;

/// Owns every repository plus the audit logger
pub struct Storage {
    paths: CarePaths,
    pub children: ChildRepository,
    pub invoices: InvoiceRepository,
    pub payments: PaymentRepository,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: CarePaths) -> Result<Self, CareError> {
        paths.ensure_directories()?;

        Ok(Self {
            children: ChildRepository::new(paths.children_file()),
            invoices: InvoiceRepository::new(paths.invoices_file()),
            payments: PaymentRepository::new(paths.payments_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Open storage and load all data files
    pub fn open(paths: CarePaths) -> Result<Self, CareError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &CarePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    pub fn load_all(&self) -> Result<(), CareError> {
        self.children.load()?;
        self.invoices.load()?;
        self.payments.load()?;
        Ok(())
    }

    pub fn save_all(&self) -> Result<(), CareError> {
        self.children.save()?;
        self.invoices.save()?;
        self.payments.save()?;
        Ok(())
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Result<(), CareError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, label, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), CareError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            label,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        label: Option<String>,
        entity: &T,
    ) -> Result<(), CareError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, label, entity))
    }
}
