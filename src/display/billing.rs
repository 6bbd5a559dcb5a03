//! Invoice, payment and summary display formatting

use crate::models::{Invoice, InvoiceStatus, Money, Payment};
use crate::services::BillingSummary;

use super::truncate;

fn status_icon(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Paid => "✓",
        InvoiceStatus::Pending => " ",
        InvoiceStatus::Overdue => "!",
        InvoiceStatus::Cancelled => "x",
    }
}

pub fn format_invoice_list(invoices: &[Invoice]) -> String {
    if invoices.is_empty() {
        return "No invoices found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:2} {:<14} {:<20} {:<10} {:<10} {:>12}  {}\n",
        "St", "Number", "Child", "Issued", "Due", "Total", "Status"
    ));
    output.push_str(&"-".repeat(82));
    output.push('\n');

    for invoice in invoices {
        output.push_str(&format!(
            "{:2} {:<14} {:<20} {:<10} {:<10} {:>12}  {}\n",
            status_icon(invoice.status),
            truncate(&invoice.invoice_number, 14),
            truncate(&invoice.child_name, 20),
            invoice.issue_date.format("%Y-%m-%d"),
            invoice.due_date.format("%Y-%m-%d"),
            invoice.total().to_string(),
            invoice.status,
        ));
    }

    let total: Money = invoices.iter().map(Invoice::total).sum();
    output.push_str(&format!("\n{} invoice(s), {} billed", invoices.len(), total));
    output
}

/// Invoice header, line items and the payments made against it
pub fn format_invoice_details(
    invoice: &Invoice,
    payments: &[Payment],
    paid: Money,
    balance: Money,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Invoice {}\n", invoice.invoice_number));
    output.push_str(&format!("  Child:    {}\n", invoice.child_name));
    output.push_str(&format!("  Parent:   {}\n", invoice.parent_name));
    output.push_str(&format!("  Issued:   {}\n", invoice.issue_date));
    output.push_str(&format!("  Due:      {}\n", invoice.due_date));
    output.push_str(&format!("  Status:   {}\n", invoice.status));
    if !invoice.notes.is_empty() {
        output.push_str(&format!("  Notes:    {}\n", invoice.notes));
    }

    output.push_str(&format!(
        "\n  {:<30} {:>5} {:>12} {:>12}\n",
        "Item", "Qty", "Unit", "Amount"
    ));
    for item in &invoice.items {
        output.push_str(&format!(
            "  {:<30} {:>5} {:>12} {:>12}\n",
            truncate(&item.description, 30),
            item.quantity,
            item.unit_price.to_string(),
            item.total().to_string(),
        ));
    }
    output.push_str(&format!("  {:>61}\n", format!("Total {}", invoice.total())));

    if !payments.is_empty() {
        output.push_str("\n  Payments\n");
        for payment in payments {
            output.push_str(&format!(
                "  {:<14} {} {:>12}  {} ({})\n",
                payment.payment_number,
                payment.payment_date,
                payment.amount.to_string(),
                payment.method,
                payment.status,
            ));
        }
    }

    output.push_str(&format!("\n  Paid:     {}\n", paid));
    output.push_str(&format!("  Balance:  {}\n", balance));
    output
}

pub fn format_payment_list(payments: &[Payment]) -> String {
    if payments.is_empty() {
        return "No payments found.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<14} {:<14} {:<20} {:<10} {:<14} {:>12}  {}\n",
        "Number", "Invoice", "Child", "Date", "Method", "Amount", "Status"
    ));
    output.push_str(&"-".repeat(98));
    output.push('\n');

    for payment in payments {
        output.push_str(&format!(
            "{:<14} {:<14} {:<20} {:<10} {:<14} {:>12}  {}\n",
            truncate(&payment.payment_number, 14),
            truncate(&payment.invoice_number, 14),
            truncate(&payment.child_name, 20),
            payment.payment_date.format("%Y-%m-%d"),
            payment.method.to_string(),
            payment.amount.to_string(),
            payment.status,
        ));
    }

    output.push_str(&format!("\n{} payment(s)", payments.len()));
    output
}

pub fn format_billing_summary(summary: &BillingSummary, facility: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Billing summary: {}\n\n", facility));
    output.push_str(&format!("  Outstanding:  {:>12}\n", summary.outstanding.to_string()));
    output.push_str(&format!("  Collected:    {:>12}\n\n", summary.collected.to_string()));
    output.push_str(&format!("  Invoices:     {:>5}\n", summary.invoice_count()));
    output.push_str(&format!("    Paid        {:>5}\n", summary.paid));
    output.push_str(&format!("    Pending     {:>5}\n", summary.pending));
    output.push_str(&format!("    Overdue     {:>5}\n", summary.overdue));
    output.push_str(&format!("    Cancelled   {:>5}", summary.cancelled));
    output
}
