//! Invoice CLI commands

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_invoice_details, format_invoice_list};
use crate::error::{CareError, CareResult};
use crate::export::export_invoices_csv;
use crate::models::{InvoiceItem, InvoiceStatus};
use crate::services::{ChildService, InvoiceFilter, InvoiceService, NewInvoice, PaymentService};
use crate::storage::Storage;

/// Invoice subcommands
#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Create an invoice for a child
    Create {
        /// Child name or ID
        child: String,
        /// Line item as "description:quantity:price" or "description:price" (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<String>,
        /// Issue date (YYYY-MM-DD, default: today)
        #[arg(long)]
        issue_date: Option<String>,
        /// Due date (YYYY-MM-DD, default: issue date plus the configured due days)
        #[arg(long)]
        due_date: Option<String>,
        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Invoice number (generated when omitted)
        #[arg(long)]
        number: Option<String>,
    },
    /// List invoices
    List {
        /// Match child, parent or invoice number
        #[arg(short, long)]
        search: Option<String>,
        /// paid, pending, overdue or cancelled
        #[arg(long)]
        status: Option<String>,
    },
    /// Show an invoice with its payments
    Show {
        /// Invoice number or ID
        invoice: String,
    },
    /// Cancel an invoice
    Cancel {
        /// Invoice number or ID
        invoice: String,
    },
    /// Mark pending invoices past their due date as overdue
    Refresh {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        today: Option<String>,
    },
    /// Delete an invoice without payments
    Delete {
        /// Invoice number or ID
        invoice: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Export invoices to CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// paid, pending, overdue or cancelled
        #[arg(long)]
        status: Option<String>,
    },
}

pub(crate) fn parse_date(s: &str) -> CareResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| CareError::Validation(format!("Invalid date '{}'. Use YYYY-MM-DD", s)))
}

fn parse_invoice_status(s: &str) -> CareResult<InvoiceStatus> {
    InvoiceStatus::parse(s).ok_or_else(|| {
        CareError::Validation(format!(
            "Invalid status '{}'. Use paid, pending, overdue or cancelled",
            s
        ))
    })
}

fn parse_items(items: &[String]) -> CareResult<Vec<InvoiceItem>> {
    items
        .iter()
        .map(|s| InvoiceItem::parse(s).map_err(|e| CareError::Validation(e.to_string())))
        .collect()
}

/// Handle an invoice command
pub fn handle_invoice_command(
    storage: &Storage,
    settings: &Settings,
    cmd: InvoiceCommands,
) -> CareResult<()> {
    let service = InvoiceService::new(storage, settings.invoice_due_days);

    match cmd {
        InvoiceCommands::Create {
            child,
            items,
            issue_date,
            due_date,
            notes,
            number,
        } => {
            let child = ChildService::new(storage).require(&child)?;
            let issue_date = match issue_date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let invoice = service.create(NewInvoice {
                child_id: child.id,
                issue_date,
                due_date: due_date.as_deref().map(parse_date).transpose()?,
                items: parse_items(&items)?,
                notes: notes.unwrap_or_default(),
                invoice_number: number,
            })?;

            println!(
                "Created invoice {} for {}: {} due {}",
                invoice.invoice_number,
                invoice.child_name,
                invoice.total().format_with_symbol(&settings.currency_symbol),
                settings.format_date(invoice.due_date)
            );
        }

        InvoiceCommands::List { search, status } => {
            let filter = InvoiceFilter {
                search,
                status: status.as_deref().map(parse_invoice_status).transpose()?,
            };
            let invoices = service.list(&filter)?;
            println!("{}", format_invoice_list(&invoices));
        }

        InvoiceCommands::Show { invoice } => {
            let invoice = service.require(&invoice)?;
            let payments = PaymentService::new(storage).list_for_invoice(invoice.id)?;
            let paid = service.amount_paid(invoice.id)?;
            let balance = service.balance_due(&invoice)?;
            println!(
                "{}",
                format_invoice_details(&invoice, &payments, paid, balance)
            );
        }

        InvoiceCommands::Cancel { invoice } => {
            let invoice = service.require(&invoice)?;
            let cancelled = service.cancel(invoice.id)?;
            println!("Cancelled invoice {}", cancelled.invoice_number);
        }

        InvoiceCommands::Refresh { today } => {
            let today = match today {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };
            let changed = service.refresh_overdue(today)?;
            if changed.is_empty() {
                println!("No invoices became overdue.");
            } else {
                for invoice in &changed {
                    println!(
                        "{} is now overdue (due {})",
                        invoice.invoice_number,
                        settings.format_date(invoice.due_date)
                    );
                }
            }
        }

        InvoiceCommands::Delete { invoice, force } => {
            let invoice = service.require(&invoice)?;

            if !force {
                println!(
                    "About to delete invoice {} ({})",
                    invoice.invoice_number, invoice.child_name
                );
                println!("Use --force to confirm.");
                return Ok(());
            }

            let deleted = service.delete(invoice.id)?;
            println!("Deleted invoice {}", deleted.invoice_number);
        }

        InvoiceCommands::Export { output, status } => {
            let filter = InvoiceFilter {
                search: None,
                status: status.as_deref().map(parse_invoice_status).transpose()?,
            };
            let invoices = service.list(&filter)?;

            match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let count = export_invoices_csv(&invoices, BufWriter::new(file))?;
                    println!("Exported {} invoice(s) to {}", count, path.display());
                }
                None => {
                    export_invoices_csv(&invoices, io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}
