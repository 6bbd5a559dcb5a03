//! Billing overview across all invoices and payments

use crate::error::CareResult;
use crate::models::{InvoiceStatus, Money, PaymentStatus};
use crate::storage::Storage;

use super::invoice::InvoiceService;

/// Totals for the billing dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BillingSummary {
    /// Balance still due on pending and overdue invoices
    pub outstanding: Money,
    /// Sum of completed payments
    pub collected: Money,
    pub paid: usize,
    pub pending: usize,
    pub overdue: usize,
    pub cancelled: usize,
}

impl BillingSummary {
    pub fn invoice_count(&self) -> usize {
        self.paid + self.pending + self.overdue + self.cancelled
    }
}

pub struct BillingService<'a> {
    storage: &'a Storage,
}

impl<'a> BillingService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn summary(&self) -> CareResult<BillingSummary> {
        let invoices = InvoiceService::new(self.storage, 0);
        let mut summary = BillingSummary::default();

        for invoice in self.storage.invoices.get_all()? {
            match invoice.status {
                InvoiceStatus::Paid => summary.paid += 1,
                InvoiceStatus::Pending => summary.pending += 1,
                InvoiceStatus::Overdue => summary.overdue += 1,
                InvoiceStatus::Cancelled => summary.cancelled += 1,
            }
            summary.outstanding += invoices.balance_due(&invoice)?;
        }

        summary.collected = self
            .storage
            .payments
            .get_all()?
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .map(|p| p.amount)
            .sum();

        Ok(summary)
    }
}
