//! Export module
//!
//! Spreadsheet-friendly CSV exports of the child directory, invoices and
//! payments.

pub mod csv;

pub use self::csv::{export_children_csv, export_invoices_csv, export_payments_csv};
