//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod billing;
pub mod child;
pub mod invoice;
pub mod payment;
pub mod register;

pub use billing::{handle_audit_command, handle_billing_command};
pub use child::{handle_child_command, ChildCommands};
pub use invoice::{handle_invoice_command, InvoiceCommands};
pub use payment::{handle_payment_command, PaymentCommands};
pub use register::{handle_register_command, RegistrationSession, SessionOutcome};
