//! Billing summary and audit history commands

use chrono::Local;

use crate::config::Settings;
use crate::display::format_billing_summary;
use crate::error::CareResult;
use crate::services::{BillingService, InvoiceService};
use crate::storage::Storage;

/// Print the billing summary, marking overdue invoices first
pub fn handle_billing_command(storage: &Storage, settings: &Settings) -> CareResult<()> {
    let today = Local::now().date_naive();
    InvoiceService::new(storage, settings.invoice_due_days).refresh_overdue(today)?;

    let summary = BillingService::new(storage).summary()?;
    println!("{}", format_billing_summary(&summary, &settings.facility_name));
    Ok(())
}

/// Print the most recent audit entries, oldest first
pub fn handle_audit_command(storage: &Storage, count: usize) -> CareResult<()> {
    let entries = storage.audit().read_recent(count)?;
    if entries.is_empty() {
        println!("No changes recorded.");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", entry.summary_line());
    }
    Ok(())
}
