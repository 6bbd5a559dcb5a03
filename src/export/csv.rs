//! CSV export
//!
//! Rows are flat serde structs written with `csv::Writer`, so quoting and
//! escaping follow RFC 4180.

use std::io::Write;

use serde::Serialize;

use crate::error::CareResult;
use crate::models::{Child, Invoice, Payment};

#[derive(Serialize)]
struct ChildRow<'a> {
    id: String,
    first_name: &'a str,
    last_name: &'a str,
    date_of_birth: String,
    status: String,
    classroom: &'a str,
    enrollment_date: String,
    primary_guardian: String,
    guardian_phone: &'a str,
    guardian_email: &'a str,
    emergency_contacts: usize,
    documents_complete: bool,
    allergies: String,
}

impl<'a> From<&'a Child> for ChildRow<'a> {
    fn from(child: &'a Child) -> Self {
        let primary = child.guardians.first();
        Self {
            id: child.id.to_string(),
            first_name: &child.first_name,
            last_name: &child.last_name,
            date_of_birth: child.date_of_birth.to_string(),
            status: child.status.to_string(),
            classroom: child.classroom.as_deref().unwrap_or(""),
            enrollment_date: child.enrollment_date.to_string(),
            primary_guardian: child.primary_guardian_name(),
            guardian_phone: primary.map(|g| g.phone.as_str()).unwrap_or(""),
            guardian_email: primary.map(|g| g.email.as_str()).unwrap_or(""),
            emergency_contacts: child.emergency_contacts.len(),
            documents_complete: child.documents.is_complete(),
            allergies: child.medical.allergies.join("; "),
        }
    }
}

#[derive(Serialize)]
struct InvoiceRow<'a> {
    invoice_number: &'a str,
    child: &'a str,
    parent: &'a str,
    issue_date: String,
    due_date: String,
    status: String,
    items: usize,
    total: String,
    notes: &'a str,
}

impl<'a> From<&'a Invoice> for InvoiceRow<'a> {
    fn from(invoice: &'a Invoice) -> Self {
        Self {
            invoice_number: &invoice.invoice_number,
            child: &invoice.child_name,
            parent: &invoice.parent_name,
            issue_date: invoice.issue_date.to_string(),
            due_date: invoice.due_date.to_string(),
            status: invoice.status.to_string(),
            items: invoice.items.len(),
            total: decimal(invoice.total().cents()),
            notes: &invoice.notes,
        }
    }
}

#[derive(Serialize)]
struct PaymentRow<'a> {
    payment_number: &'a str,
    invoice_number: &'a str,
    child: &'a str,
    parent: &'a str,
    payment_date: String,
    method: String,
    status: String,
    amount: String,
    notes: &'a str,
}

impl<'a> From<&'a Payment> for PaymentRow<'a> {
    fn from(payment: &'a Payment) -> Self {
        Self {
            payment_number: &payment.payment_number,
            invoice_number: &payment.invoice_number,
            child: &payment.child_name,
            parent: &payment.parent_name,
            payment_date: payment.payment_date.to_string(),
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            amount: decimal(payment.amount.cents()),
            notes: &payment.notes,
        }
    }
}

/// Plain decimal without currency symbol, for spreadsheets
fn decimal(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, cents.abs() / 100, cents.abs() % 100)
}

/// Write the given children as CSV, returning the row count
pub fn export_children_csv<W: Write>(children: &[Child], writer: W) -> CareResult<usize> {
    let mut out = csv::Writer::from_writer(writer);
    for child in children {
        out.serialize(ChildRow::from(child))?;
    }
    out.flush()?;
    Ok(children.len())
}

pub fn export_invoices_csv<W: Write>(invoices: &[Invoice], writer: W) -> CareResult<usize> {
    let mut out = csv::Writer::from_writer(writer);
    for invoice in invoices {
        out.serialize(InvoiceRow::from(invoice))?;
    }
    out.flush()?;
    Ok(invoices.len())
}

pub fn export_payments_csv<W: Write>(payments: &[Payment], writer: W) -> CareResult<usize> {
    let mut out = csv::Writer::from_writer(writer);
    for payment in payments {
        out.serialize(PaymentRow::from(payment))?;
    }
    out.flush()?;
    Ok(payments.len())
}
