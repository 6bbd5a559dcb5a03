//! Payment CLI commands

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::cli::invoice::parse_date;
use crate::config::Settings;
use crate::display::format_payment_list;
use crate::error::{CareError, CareResult};
use crate::export::export_payments_csv;
use crate::models::{Money, PaymentMethod, PaymentStatus};
use crate::services::{InvoiceService, NewPayment, PaymentFilter, PaymentService};
use crate::storage::Storage;

/// Payment subcommands
#[derive(Subcommand)]
pub enum PaymentCommands {
    /// Record a payment against an invoice
    Record {
        /// Invoice number or ID
        invoice: String,
        /// Amount (e.g., "425.00")
        amount: String,
        /// credit, debit, cash, check, bank or other
        #[arg(short, long, default_value = "cash")]
        method: String,
        /// completed, pending or failed
        #[arg(long, default_value = "completed")]
        status: String,
        /// Payment date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
        /// Payment number (generated when omitted)
        #[arg(long)]
        number: Option<String>,
    },
    /// List payments
    List {
        /// Match child, parent, invoice or payment number
        #[arg(short, long)]
        search: Option<String>,
        /// completed, pending, failed or refunded
        #[arg(long)]
        status: Option<String>,
        /// credit, debit, cash, check, bank or other
        #[arg(short, long)]
        method: Option<String>,
    },
    /// Refund a completed payment
    Refund {
        /// Payment number or ID
        payment: String,
    },
    /// Export payments to CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_method(s: &str) -> CareResult<PaymentMethod> {
    PaymentMethod::parse(s).ok_or_else(|| {
        CareError::Validation(format!(
            "Invalid payment method '{}'. Use credit, debit, cash, check, bank or other",
            s
        ))
    })
}

fn parse_payment_status(s: &str) -> CareResult<PaymentStatus> {
    PaymentStatus::parse(s).ok_or_else(|| {
        CareError::Validation(format!(
            "Invalid payment status '{}'. Use completed, pending, failed or refunded",
            s
        ))
    })
}

/// Handle a payment command
pub fn handle_payment_command(
    storage: &Storage,
    settings: &Settings,
    cmd: PaymentCommands,
) -> CareResult<()> {
    let service = PaymentService::new(storage);

    match cmd {
        PaymentCommands::Record {
            invoice,
            amount,
            method,
            status,
            date,
            notes,
            number,
        } => {
            let invoices = InvoiceService::new(storage, settings.invoice_due_days);
            let invoice = invoices.require(&invoice)?;
            let amount = Money::parse(&amount)
                .map_err(|e| CareError::Validation(format!("Invalid amount: {}", e)))?;
            let payment_date = match date {
                Some(d) => parse_date(&d)?,
                None => Local::now().date_naive(),
            };

            let payment = service.record(NewPayment {
                invoice_id: invoice.id,
                amount,
                payment_date,
                method: parse_method(&method)?,
                status: parse_payment_status(&status)?,
                notes: notes.unwrap_or_default(),
                payment_number: number,
            })?;

            let symbol = &settings.currency_symbol;
            println!(
                "Recorded payment {} of {} on invoice {}",
                payment.payment_number,
                payment.amount.format_with_symbol(symbol),
                payment.invoice_number
            );
            if let Some(invoice) = invoices.get(invoice.id)? {
                println!(
                    "Invoice is {}; balance {}",
                    invoice.status,
                    invoices.balance_due(&invoice)?.format_with_symbol(symbol)
                );
            }
        }

        PaymentCommands::List {
            search,
            status,
            method,
        } => {
            let filter = PaymentFilter {
                search,
                status: status.as_deref().map(parse_payment_status).transpose()?,
                method: method.as_deref().map(parse_method).transpose()?,
            };
            let payments = service.list(&filter)?;
            println!("{}", format_payment_list(&payments));
        }

        PaymentCommands::Refund { payment } => {
            let payment = service.require(&payment)?;
            let refunded = service.refund(payment.id)?;
            println!(
                "Refunded payment {} ({})",
                refunded.payment_number,
                refunded.amount.format_with_symbol(&settings.currency_symbol)
            );
        }

        PaymentCommands::Export { output } => {
            let payments = service.list(&PaymentFilter::default())?;

            match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let count = export_payments_csv(&payments, BufWriter::new(file))?;
                    println!("Exported {} payment(s) to {}", count, path.display());
                }
                None => {
                    export_payments_csv(&payments, io::stdout().lock())?;
                }
            }
        }
    }

    Ok(())
}
