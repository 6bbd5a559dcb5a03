//! Payment service
//!
//! Records payments against invoices. A completed payment that covers the
//! rest of an invoice marks it paid; refunding reopens it.

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use crate::audit::EntityType;
use crate::error::{CareError, CareResult};
use crate::models::{
    InvoiceId, InvoiceStatus, Money, Payment, PaymentId, PaymentMethod, PaymentStatus,
};
use crate::storage::Storage;

use super::invoice::InvoiceService;
use super::next_document_number;

/// Input for a new payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub notes: String,
    /// Generated as `PAY-YYYY-NNN` when absent
    pub payment_number: Option<String>,
}

/// Payment listing filter
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    /// Case-insensitive substring of child, parent, invoice or payment number
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        if self.status.is_some_and(|s| s != payment.status) {
            return false;
        }
        if self.method.is_some_and(|m| m != payment.method) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [
                    &payment.child_name,
                    &payment.parent_name,
                    &payment.invoice_number,
                    &payment.payment_number,
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

/// Service for payment management
pub struct PaymentService<'a> {
    storage: &'a Storage,
    invoices: InvoiceService<'a>,
}

impl<'a> PaymentService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            // Payments never create invoices, so the due-date default is unused
            invoices: InvoiceService::new(storage, 0),
        }
    }

    /// Record a payment against an invoice
    pub fn record(&self, request: NewPayment) -> CareResult<Payment> {
        let invoice = self
            .storage
            .invoices
            .get(request.invoice_id)?
            .ok_or_else(|| CareError::invoice_not_found(request.invoice_id.to_string()))?;

        match invoice.status {
            InvoiceStatus::Cancelled => {
                return Err(CareError::Billing(format!(
                    "{} is cancelled and cannot take payments",
                    invoice.invoice_number
                )))
            }
            InvoiceStatus::Paid if request.status == PaymentStatus::Completed => {
                return Err(CareError::Billing(format!(
                    "{} is already paid in full",
                    invoice.invoice_number
                )))
            }
            _ => {}
        }

        if request.status == PaymentStatus::Completed {
            let balance = self.invoices.balance_due(&invoice)?;
            if request.amount > balance {
                return Err(CareError::Billing(format!(
                    "Payment of {} exceeds the {} balance due on {}",
                    request.amount, balance, invoice.invoice_number
                )));
            }
        }

        let number = match request.payment_number {
            Some(n) => n.trim().to_string(),
            None => self.next_number(request.payment_date.year())?,
        };
        if self.storage.payments.get_by_number(&number)?.is_some() {
            return Err(CareError::Duplicate {
                entity_type: "Payment",
                identifier: number,
            });
        }

        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new(),
            payment_number: number,
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number.clone(),
            child_name: invoice.child_name.clone(),
            parent_name: invoice.parent_name.clone(),
            amount: request.amount,
            payment_date: request.payment_date,
            method: request.method,
            status: request.status,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        };
        payment
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;
        self.storage.log_create(
            EntityType::Payment,
            payment.id.to_string(),
            Some(payment.payment_number.clone()),
            &payment,
        )?;

        info!(
            payment = %payment.payment_number,
            invoice = %payment.invoice_number,
            amount = %payment.amount,
            "Recorded payment"
        );

        if payment.counts_toward_invoice()
            && self.invoices.amount_paid(invoice.id)? >= invoice.total()
        {
            self.invoices.change_status(invoice, InvoiceStatus::Paid)?;
        }

        Ok(payment)
    }

    pub fn next_number(&self, year: i32) -> CareResult<String> {
        let payments = self.storage.payments.get_all()?;
        next_document_number(
            "PAY",
            year,
            payments.iter().map(|p| p.payment_number.as_str()),
        )
    }

    pub fn get(&self, id: PaymentId) -> CareResult<Option<Payment>> {
        self.storage.payments.get(id)
    }

    /// Find by payment number, full ID, or ID prefix
    pub fn find(&self, identifier: &str) -> CareResult<Option<Payment>> {
        if let Some(payment) = self.storage.payments.get_by_number(identifier)? {
            return Ok(Some(payment));
        }
        if let Ok(id) = identifier.trim().parse::<PaymentId>() {
            return self.storage.payments.get(id);
        }

        let mut matches: Vec<_> = self
            .storage
            .payments
            .get_all()?
            .into_iter()
            .filter(|p| p.id.matches(identifier))
            .collect();
        if matches.len() > 1 {
            return Err(CareError::Validation(format!(
                "ID prefix '{}' is ambiguous",
                identifier.trim()
            )));
        }
        Ok(matches.pop())
    }

    pub fn require(&self, identifier: &str) -> CareResult<Payment> {
        self.find(identifier)?
            .ok_or_else(|| CareError::payment_not_found(identifier.trim()))
    }

    /// Payments matching the filter, most recent first
    pub fn list(&self, filter: &PaymentFilter) -> CareResult<Vec<Payment>> {
        Ok(self
            .storage
            .payments
            .get_all()?
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect())
    }

    pub fn list_for_invoice(&self, invoice_id: InvoiceId) -> CareResult<Vec<Payment>> {
        self.storage.payments.get_by_invoice(invoice_id)
    }

    /// Refund a completed payment
    ///
    /// A paid invoice that no longer has enough completed payments goes back
    /// to pending.
    pub fn refund(&self, id: PaymentId) -> CareResult<Payment> {
        let before = self
            .storage
            .payments
            .get(id)?
            .ok_or_else(|| CareError::payment_not_found(id.to_string()))?;

        if before.status != PaymentStatus::Completed {
            return Err(CareError::Billing(format!(
                "Only completed payments can be refunded; {} is {}",
                before.payment_number,
                before.status.to_string().to_lowercase()
            )));
        }

        let mut payment = before.clone();
        payment.set_status(PaymentStatus::Refunded);

        self.storage.payments.upsert(payment.clone())?;
        self.storage.payments.save()?;
        self.storage.log_update(
            EntityType::Payment,
            payment.id.to_string(),
            Some(payment.payment_number.clone()),
            &before,
            &payment,
        )?;

        info!(payment = %payment.payment_number, amount = %payment.amount, "Refunded payment");

        match self.storage.invoices.get(payment.invoice_id)? {
            Some(invoice) if invoice.status == InvoiceStatus::Paid => {
                if self.invoices.amount_paid(invoice.id)? < invoice.total() {
                    self.invoices.change_status(invoice, InvoiceStatus::Pending)?;
                }
            }
            Some(_) => {}
            None => warn!(
                invoice = %payment.invoice_number,
                "Refunded payment references a missing invoice"
            ),
        }

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarePaths;
    use crate::models::{Invoice, InvoiceItem};
    use crate::services::fixtures::{date, registration};
    use crate::services::{ChildService, NewInvoice};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, Invoice) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CarePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let child = ChildService::new(&storage)
            .register(registration("Emma", "Johnson"))
            .unwrap();
        let invoice = InvoiceService::new(&storage, 14)
            .create(NewInvoice {
                child_id: child.id,
                issue_date: date(2024, 3, 1),
                due_date: None,
                items: vec![InvoiceItem::new("Tuition", 1, Money::from_units(850, 0))],
                notes: String::new(),
                invoice_number: None,
            })
            .unwrap();
        (temp_dir, storage, invoice)
    }

    fn pay(invoice_id: InvoiceId, dollars: i64) -> NewPayment {
        NewPayment {
            invoice_id,
            amount: Money::from_units(dollars, 0),
            payment_date: date(2024, 3, 10),
            method: PaymentMethod::Bank,
            status: PaymentStatus::Completed,
            notes: String::new(),
            payment_number: None,
        }
    }

    fn invoice_status(storage: &Storage, id: InvoiceId) -> InvoiceStatus {
        storage.invoices.get(id).unwrap().unwrap().status
    }

    #[test]
    fn test_partial_then_full_payment_marks_paid() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);

        let first = service.record(pay(invoice.id, 300)).unwrap();
        assert_eq!(first.payment_number, "PAY-2024-001");
        assert_eq!(first.child_name, "Emma Johnson");
        assert_eq!(invoice_status(&storage, invoice.id), InvoiceStatus::Pending);

        service.record(pay(invoice.id, 550)).unwrap();
        assert_eq!(invoice_status(&storage, invoice.id), InvoiceStatus::Paid);
    }

    #[test]
    fn test_pending_payment_does_not_settle_invoice() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);

        let mut pending = pay(invoice.id, 850);
        pending.status = PaymentStatus::Pending;
        service.record(pending).unwrap();

        assert_eq!(invoice_status(&storage, invoice.id), InvoiceStatus::Pending);
    }

    #[test]
    fn test_overpayment_and_cancelled_invoice_rejected() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);

        assert!(matches!(
            service.record(pay(invoice.id, 900)).unwrap_err(),
            CareError::Billing(_)
        ));

        InvoiceService::new(&storage, 14).cancel(invoice.id).unwrap();
        assert!(matches!(
            service.record(pay(invoice.id, 100)).unwrap_err(),
            CareError::Billing(_)
        ));
        assert_eq!(storage.payments.count().unwrap(), 0);
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);

        assert!(service
            .record(pay(invoice.id, 0))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_refund_reopens_paid_invoice() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);
        let payment = service.record(pay(invoice.id, 850)).unwrap();
        assert_eq!(invoice_status(&storage, invoice.id), InvoiceStatus::Paid);

        let refunded = service.refund(payment.id).unwrap();
        assert_eq!(refunded.status, PaymentStatus::Refunded);
        assert_eq!(invoice_status(&storage, invoice.id), InvoiceStatus::Pending);

        assert!(matches!(
            service.refund(payment.id).unwrap_err(),
            CareError::Billing(_)
        ));
    }

    #[test]
    fn test_list_filters() {
        let (_temp, storage, invoice) = setup();
        let service = PaymentService::new(&storage);
        service.record(pay(invoice.id, 100)).unwrap();
        let mut cash = pay(invoice.id, 50);
        cash.method = PaymentMethod::Cash;
        service.record(cash).unwrap();

        let by_method = PaymentFilter {
            method: Some(PaymentMethod::Cash),
            ..Default::default()
        };
        assert_eq!(service.list(&by_method).unwrap().len(), 1);

        let by_number = PaymentFilter {
            search: Some("pay-2024-002".into()),
            ..Default::default()
        };
        let found = service.list(&by_number).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, Money::from_units(50, 0));

        let by_invoice = PaymentFilter {
            search: Some(invoice.invoice_number.to_lowercase()),
            status: Some(PaymentStatus::Completed),
            ..Default::default()
        };
        assert_eq!(service.list(&by_invoice).unwrap().len(), 2);
    }
}
