//! Display formatting for terminal output
//!
//! Plain-text tables and detail views for children, invoices and payments.

pub mod billing;
pub mod child;

pub use billing::{
    format_billing_summary, format_invoice_details, format_invoice_list, format_payment_list,
};
pub use child::{format_child_details, format_child_list, format_child_stats};

/// Shorten to `max` characters, marking the cut with `…`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
