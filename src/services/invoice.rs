//! Invoice service
//!
//! Creates invoices for registered children, tracks their status and works
//! out how much is still owed against recorded payments.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{CareError, CareResult};
use crate::models::{ChildId, Invoice, InvoiceId, InvoiceItem, InvoiceStatus, Money};
use crate::storage::Storage;

use super::next_document_number;

/// Input for a new invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub child_id: ChildId,
    pub issue_date: NaiveDate,
    /// Defaults to the issue date plus the configured number of days
    pub due_date: Option<NaiveDate>,
    pub items: Vec<InvoiceItem>,
    pub notes: String,
    /// Generated as `INV-YYYY-NNN` when absent
    pub invoice_number: Option<String>,
}

/// Invoice listing filter
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Case-insensitive substring of child name, parent name or number
    pub search: Option<String>,
    pub status: Option<InvoiceStatus>,
}

impl InvoiceFilter {
    pub fn matches(&self, invoice: &Invoice) -> bool {
        if self.status.is_some_and(|s| s != invoice.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                [&invoice.child_name, &invoice.parent_name, &invoice.invoice_number]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
        }
    }
}

/// Service for invoice management
pub struct InvoiceService<'a> {
    storage: &'a Storage,
    due_days: u32,
}

impl<'a> InvoiceService<'a> {
    pub fn new(storage: &'a Storage, due_days: u32) -> Self {
        Self { storage, due_days }
    }

    pub fn create(&self, request: NewInvoice) -> CareResult<Invoice> {
        let child = self
            .storage
            .children
            .get(request.child_id)?
            .ok_or_else(|| CareError::child_not_found(request.child_id.to_string()))?;

        let number = match request.invoice_number {
            Some(n) => n.trim().to_string(),
            None => self.next_number(request.issue_date.year())?,
        };
        if self.storage.invoices.get_by_number(&number)?.is_some() {
            return Err(CareError::Duplicate {
                entity_type: "Invoice",
                identifier: number,
            });
        }

        let due_date = request
            .due_date
            .unwrap_or(request.issue_date + Duration::days(i64::from(self.due_days)));

        let mut invoice = Invoice::new(
            number,
            child.id,
            child.full_name(),
            child.primary_guardian_name(),
            request.issue_date,
            due_date,
            request.items,
        );
        invoice.notes = request.notes;
        invoice
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;

        self.storage.invoices.upsert(invoice.clone())?;
        self.storage.invoices.save()?;
        self.storage.log_create(
            EntityType::Invoice,
            invoice.id.to_string(),
            Some(invoice.invoice_number.clone()),
            &invoice,
        )?;

        info!(
            invoice = %invoice.invoice_number,
            child = %invoice.child_name,
            total = %invoice.total(),
            "Created invoice"
        );
        Ok(invoice)
    }

    /// The next generated number for invoices issued in `year`
    pub fn next_number(&self, year: i32) -> CareResult<String> {
        let invoices = self.storage.invoices.get_all()?;
        next_document_number(
            "INV",
            year,
            invoices.iter().map(|i| i.invoice_number.as_str()),
        )
    }

    pub fn get(&self, id: InvoiceId) -> CareResult<Option<Invoice>> {
        self.storage.invoices.get(id)
    }

    /// Find by invoice number, full ID, or ID prefix
    pub fn find(&self, identifier: &str) -> CareResult<Option<Invoice>> {
        if let Some(invoice) = self.storage.invoices.get_by_number(identifier)? {
            return Ok(Some(invoice));
        }
        if let Ok(id) = identifier.trim().parse::<InvoiceId>() {
            return self.storage.invoices.get(id);
        }

        let mut matches: Vec<_> = self
            .storage
            .invoices
            .get_all()?
            .into_iter()
            .filter(|i| i.id.matches(identifier))
            .collect();
        if matches.len() > 1 {
            return Err(CareError::Validation(format!(
                "ID prefix '{}' is ambiguous",
                identifier.trim()
            )));
        }
        Ok(matches.pop())
    }

    pub fn require(&self, identifier: &str) -> CareResult<Invoice> {
        self.find(identifier)?
            .ok_or_else(|| CareError::invoice_not_found(identifier.trim()))
    }

    /// Invoices matching the filter, newest first
    pub fn list(&self, filter: &InvoiceFilter) -> CareResult<Vec<Invoice>> {
        Ok(self
            .storage
            .invoices
            .get_all()?
            .into_iter()
            .filter(|i| filter.matches(i))
            .collect())
    }

    pub fn list_for_child(&self, child_id: ChildId) -> CareResult<Vec<Invoice>> {
        self.storage.invoices.get_by_child(child_id)
    }

    /// Sum of completed payments against an invoice
    pub fn amount_paid(&self, id: InvoiceId) -> CareResult<Money> {
        Ok(self
            .storage
            .payments
            .get_by_invoice(id)?
            .iter()
            .filter(|p| p.counts_toward_invoice())
            .map(|p| p.amount)
            .sum())
    }

    /// What is still owed; zero for paid or cancelled invoices
    pub fn balance_due(&self, invoice: &Invoice) -> CareResult<Money> {
        if !invoice.status.is_outstanding() {
            return Ok(Money::zero());
        }
        let remaining = invoice.total() - self.amount_paid(invoice.id)?;
        Ok(if remaining.is_negative() {
            Money::zero()
        } else {
            remaining
        })
    }

    /// Cancel an outstanding invoice
    pub fn cancel(&self, id: InvoiceId) -> CareResult<Invoice> {
        let invoice = self
            .storage
            .invoices
            .get(id)?
            .ok_or_else(|| CareError::invoice_not_found(id.to_string()))?;

        match invoice.status {
            InvoiceStatus::Paid => Err(CareError::Billing(format!(
                "{} is already paid; refund its payments first",
                invoice.invoice_number
            ))),
            InvoiceStatus::Cancelled => Err(CareError::Billing(format!(
                "{} is already cancelled",
                invoice.invoice_number
            ))),
            InvoiceStatus::Pending | InvoiceStatus::Overdue => {
                self.change_status(invoice, InvoiceStatus::Cancelled)
            }
        }
    }

    /// Mark pending invoices past their due date as overdue
    ///
    /// Returns the invoices that changed.
    pub fn refresh_overdue(&self, today: NaiveDate) -> CareResult<Vec<Invoice>> {
        let mut changed = Vec::new();
        for invoice in self.storage.invoices.get_all()? {
            if invoice.is_past_due(today) {
                changed.push(self.change_status(invoice, InvoiceStatus::Overdue)?);
            }
        }
        if !changed.is_empty() {
            info!(count = changed.len(), "Marked invoices overdue");
        }
        Ok(changed)
    }

    /// Delete an invoice that has no payments recorded against it
    pub fn delete(&self, id: InvoiceId) -> CareResult<Invoice> {
        let invoice = self
            .storage
            .invoices
            .get(id)?
            .ok_or_else(|| CareError::invoice_not_found(id.to_string()))?;

        let payments = self.storage.payments.get_by_invoice(id)?;
        if !payments.is_empty() {
            return Err(CareError::Billing(format!(
                "{} has {} payment(s) recorded; cancel it instead",
                invoice.invoice_number,
                payments.len()
            )));
        }

        self.storage.invoices.delete(id)?;
        self.storage.invoices.save()?;
        self.storage.log_delete(
            EntityType::Invoice,
            id.to_string(),
            Some(invoice.invoice_number.clone()),
            &invoice,
        )?;
        Ok(invoice)
    }

    pub(crate) fn change_status(
        &self,
        before: Invoice,
        status: InvoiceStatus,
    ) -> CareResult<Invoice> {
        let mut invoice = before.clone();
        invoice.set_status(status);

        self.storage.invoices.upsert(invoice.clone())?;
        self.storage.invoices.save()?;
        self.storage.log_update(
            EntityType::Invoice,
            invoice.id.to_string(),
            Some(invoice.invoice_number.clone()),
            &before,
            &invoice,
        )?;

        debug!(invoice = %invoice.invoice_number, from = %before.status, to = %status, "Invoice status changed");
        Ok(invoice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarePaths;
    use crate::models::Child;
    use crate::services::fixtures::{date, registration};
    use crate::services::ChildService;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, Child) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CarePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        let child = ChildService::new(&storage)
            .register(registration("Emma", "Johnson"))
            .unwrap();
        (temp_dir, storage, child)
    }

    fn tuition(child_id: ChildId, issued: NaiveDate) -> NewInvoice {
        NewInvoice {
            child_id,
            issue_date: issued,
            due_date: None,
            items: vec![
                InvoiceItem::new("Monthly Tuition", 1, Money::from_units(850, 0)),
                InvoiceItem::new("Meal Plan", 4, Money::from_units(25, 0)),
            ],
            notes: String::new(),
            invoice_number: None,
        }
    }

    #[test]
    fn test_create_fills_names_number_and_due_date() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);

        let invoice = service.create(tuition(child.id, date(2024, 3, 1))).unwrap();

        assert_eq!(invoice.invoice_number, "INV-2024-001");
        assert_eq!(invoice.child_name, "Emma Johnson");
        assert_eq!(invoice.parent_name, "Sarah Johnson");
        assert_eq!(invoice.due_date, date(2024, 3, 15));
        assert_eq!(invoice.total(), Money::from_units(950, 0));
        assert_eq!(invoice.status, InvoiceStatus::Pending);

        let second = service.create(tuition(child.id, date(2024, 4, 1))).unwrap();
        assert_eq!(second.invoice_number, "INV-2024-002");
    }

    #[test]
    fn test_create_rejects_unknown_child_and_bad_input() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);

        assert!(service
            .create(tuition(ChildId::new(), date(2024, 3, 1)))
            .unwrap_err()
            .is_not_found());

        let mut empty = tuition(child.id, date(2024, 3, 1));
        empty.items.clear();
        assert!(service.create(empty).unwrap_err().is_validation());

        let mut backwards = tuition(child.id, date(2024, 3, 1));
        backwards.due_date = Some(date(2024, 2, 1));
        assert!(service.create(backwards).unwrap_err().is_validation());
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);

        let mut first = tuition(child.id, date(2024, 3, 1));
        first.invoice_number = Some("INV-2024-050".into());
        service.create(first.clone()).unwrap();

        let err = service.create(first).unwrap_err();
        assert!(matches!(err, CareError::Duplicate { .. }));
    }

    #[test]
    fn test_numbering_exhausted_for_year() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);

        let mut last = tuition(child.id, date(2024, 3, 1));
        last.invoice_number = Some("INV-2024-4294967295".into());
        service.create(last).unwrap();

        let err = service.create(tuition(child.id, date(2024, 4, 1))).unwrap_err();
        assert!(matches!(err, CareError::Billing(_)));

        let next_year = service.create(tuition(child.id, date(2025, 1, 6))).unwrap();
        assert_eq!(next_year.invoice_number, "INV-2025-001");
    }

    #[test]
    fn test_list_search_and_status() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);
        let a = service.create(tuition(child.id, date(2024, 1, 1))).unwrap();
        service.create(tuition(child.id, date(2024, 2, 1))).unwrap();
        service.cancel(a.id).unwrap();

        let by_parent = InvoiceFilter {
            search: Some("sarah".into()),
            ..Default::default()
        };
        assert_eq!(service.list(&by_parent).unwrap().len(), 2);

        let cancelled = InvoiceFilter {
            search: Some("inv-2024".into()),
            status: Some(InvoiceStatus::Cancelled),
        };
        let found = service.list(&cancelled).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, a.id);
    }

    #[test]
    fn test_refresh_overdue_only_touches_pending() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);
        let old = service.create(tuition(child.id, date(2024, 1, 1))).unwrap();
        let cancelled = service.create(tuition(child.id, date(2024, 1, 2))).unwrap();
        let current = service.create(tuition(child.id, date(2024, 3, 1))).unwrap();
        service.cancel(cancelled.id).unwrap();

        let changed = service.refresh_overdue(date(2024, 3, 5)).unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].id, old.id);

        assert_eq!(service.get(old.id).unwrap().unwrap().status, InvoiceStatus::Overdue);
        assert_eq!(
            service.get(current.id).unwrap().unwrap().status,
            InvoiceStatus::Pending
        );
        assert!(service.refresh_overdue(date(2024, 3, 5)).unwrap().is_empty());
    }

    #[test]
    fn test_cancel_twice_is_billing_error() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);
        let invoice = service.create(tuition(child.id, date(2024, 1, 1))).unwrap();

        service.cancel(invoice.id).unwrap();
        assert!(matches!(
            service.cancel(invoice.id).unwrap_err(),
            CareError::Billing(_)
        ));
    }

    #[test]
    fn test_find_by_number_and_delete() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);
        let invoice = service.create(tuition(child.id, date(2024, 1, 1))).unwrap();

        assert_eq!(service.require("inv-2024-001").unwrap().id, invoice.id);
        service.delete(invoice.id).unwrap();
        assert!(service.find("INV-2024-001").unwrap().is_none());
    }

    #[test]
    fn test_balance_due_without_payments() {
        let (_temp, storage, child) = setup();
        let service = InvoiceService::new(&storage, 14);
        let invoice = service.create(tuition(child.id, date(2024, 1, 1))).unwrap();

        assert_eq!(service.amount_paid(invoice.id).unwrap(), Money::zero());
        assert_eq!(service.balance_due(&invoice).unwrap(), invoice.total());
    }
}
