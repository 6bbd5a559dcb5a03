//! Invoice repository backed by `invoices.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CareError;
use crate::models::{ChildId, Invoice, InvoiceId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct InvoiceData {
    invoices: Vec<Invoice>,
}

/// Newest issue date first; ties broken by invoice number
fn sort_newest_first(invoices: &mut [Invoice]) {
    invoices.sort_by(|a, b| {
        b.issue_date
            .cmp(&a.issue_date)
            .then_with(|| b.invoice_number.cmp(&a.invoice_number))
    });
}

pub struct InvoiceRepository {
    path: PathBuf,
    data: RwLock<HashMap<InvoiceId, Invoice>>,
}

impl InvoiceRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CareError> {
        let file_data: InvoiceData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        data.extend(file_data.invoices.into_iter().map(|inv| (inv.id, inv)));
        Ok(())
    }

    pub fn save(&self) -> Result<(), CareError> {
        let mut invoices = self.get_all()?;
        invoices.reverse();
        write_json_atomic(&self.path, &InvoiceData { invoices })
    }

    pub fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All invoices, newest first
    pub fn get_all(&self) -> Result<Vec<Invoice>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut invoices: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut invoices);
        Ok(invoices)
    }

    /// Look up by invoice number (case-insensitive)
    pub fn get_by_number(&self, number: &str) -> Result<Option<Invoice>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|inv| inv.invoice_number.eq_ignore_ascii_case(number.trim()))
            .cloned())
    }

    pub fn get_by_child(&self, child_id: ChildId) -> Result<Vec<Invoice>, CareError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|inv| inv.child_id == child_id)
            .collect())
    }

    pub fn upsert(&self, invoice: Invoice) -> Result<(), CareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(invoice.id, invoice);
        Ok(())
    }

    pub fn delete(&self, id: InvoiceId) -> Result<Option<Invoice>, CareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
