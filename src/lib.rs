//! childcare-cli - Enrollment and billing for a child-care center
//!
//! The heart of the crate is a multi-step registration wizard: a plain state
//! machine that sequences a fixed list of steps, accumulates each step's
//! payload and hands the finished record to a completion callback. Around it
//! sit the children directory, invoicing and payments, all persisted as JSON
//! files with a JSONL audit trail.
//!
//! # Architecture
//!
//! - `wizard`: the generic step wizard and the child registration flow
//! - `models`: children, guardians, contacts, documents, invoices, payments
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `config`: Configuration and path management
//! - `export`: CSV export
//! - `display`: Plain-text terminal formatting
//! - `cli`: clap subcommands and their handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use childcare::config::{CarePaths, Settings};
//! use childcare::storage::Storage;
//!
//! let paths = CarePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;
pub mod wizard;

pub use error::{CareError, CareResult};
