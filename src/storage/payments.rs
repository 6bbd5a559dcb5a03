//! Payment repository backed by `payments.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CareError;
use crate::models::{InvoiceId, Payment, PaymentId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct PaymentData {
    payments: Vec<Payment>,
}

pub struct PaymentRepository {
    path: PathBuf,
    data: RwLock<HashMap<PaymentId, Payment>>,
}

impl PaymentRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CareError> {
        let file_data: PaymentData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        data.extend(file_data.payments.into_iter().map(|p| (p.id, p)));
        Ok(())
    }

    pub fn save(&self) -> Result<(), CareError> {
        let mut payments = self.get_all()?;
        payments.reverse();
        write_json_atomic(&self.path, &PaymentData { payments })
    }

    pub fn get(&self, id: PaymentId) -> Result<Option<Payment>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All payments, most recent payment date first
    pub fn get_all(&self) -> Result<Vec<Payment>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut payments: Vec<_> = data.values().cloned().collect();
        payments.sort_by(|a, b| {
            b.payment_date
                .cmp(&a.payment_date)
                .then_with(|| b.payment_number.cmp(&a.payment_number))
        });
        Ok(payments)
    }

    pub fn get_by_number(&self, number: &str) -> Result<Option<Payment>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .find(|p| p.payment_number.eq_ignore_ascii_case(number.trim()))
            .cloned())
    }

    pub fn get_by_invoice(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, CareError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.invoice_id == invoice_id)
            .collect())
    }

    pub fn upsert(&self, payment: Payment) -> Result<(), CareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(payment.id, payment);
        Ok(())
    }

    pub fn delete(&self, id: PaymentId) -> Result<Option<Payment>, CareError> {
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
