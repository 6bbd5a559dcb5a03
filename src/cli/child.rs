//! Child CLI commands
//!
//! Directory listing, detail views, enrollment changes and export.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;

use crate::cli::register::{RegistrationSession, SessionOutcome};
use crate::config::Settings;
use crate::display::{format_child_details, format_child_list, format_child_stats};
use crate::error::{CareError, CareResult};
use crate::export::export_children_csv;
use crate::models::EnrollmentStatus;
use crate::services::{ChildFilter, ChildService, ClassroomFilter, InvoiceService};
use crate::storage::Storage;
use crate::wizard::RegistrationWizard;

/// Child subcommands
#[derive(Subcommand)]
pub enum ChildCommands {
    /// List registered children
    List {
        /// Match first, last or guardian name
        #[arg(short, long)]
        search: Option<String>,
        /// active, inactive or waitlist
        #[arg(long)]
        status: Option<String>,
        /// Classroom name, or "unassigned"
        #[arg(short, long)]
        classroom: Option<String>,
    },
    /// Show a child's full record
    Show {
        /// Child name or ID
        child: String,
    },
    /// Edit a child's record with the registration wizard
    Edit {
        /// Child name or ID
        child: String,
    },
    /// Change enrollment status
    Status {
        /// Child name or ID
        child: String,
        /// active, inactive or waitlist
        status: String,
    },
    /// Assign a classroom
    Assign {
        /// Child name or ID
        child: String,
        /// Classroom name
        #[arg(required_unless_present = "clear")]
        classroom: Option<String>,
        /// Remove the classroom assignment
        #[arg(long, conflicts_with = "classroom")]
        clear: bool,
    },
    /// Mark an uploaded document as verified
    VerifyDoc {
        /// Child name or ID
        child: String,
        /// Document name, e.g. "Birth Certificate"
        document: String,
    },
    /// Delete a child
    Delete {
        /// Child name or ID
        child: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Export the directory to CSV
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// active, inactive or waitlist
        #[arg(long)]
        status: Option<String>,
        /// Classroom name, or "unassigned"
        #[arg(short, long)]
        classroom: Option<String>,
    },
    /// Show enrollment counts
    Stats,
    /// List classrooms in use
    Classrooms,
}

pub(crate) fn parse_status(s: &str) -> CareResult<EnrollmentStatus> {
    EnrollmentStatus::parse(s).ok_or_else(|| {
        CareError::Validation(format!(
            "Invalid status '{}'. Use active, inactive or waitlist",
            s
        ))
    })
}

fn build_filter(
    search: Option<String>,
    status: Option<String>,
    classroom: Option<String>,
) -> CareResult<ChildFilter> {
    Ok(ChildFilter {
        search,
        status: status.as_deref().map(parse_status).transpose()?,
        classroom: classroom
            .as_deref()
            .map(ClassroomFilter::parse)
            .unwrap_or_default(),
    })
}

/// Handle a child command
pub fn handle_child_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ChildCommands,
) -> CareResult<()> {
    let service = ChildService::new(storage);
    let today = Local::now().date_naive();

    match cmd {
        ChildCommands::List {
            search,
            status,
            classroom,
        } => {
            let filter = build_filter(search, status, classroom)?;
            let children = service.list(&filter)?;
            println!("{}", format_child_list(&children, today));
        }

        ChildCommands::Show { child } => {
            let child = service.require(&child)?;
            println!("{}", format_child_details(&child, today));

            let invoices = InvoiceService::new(storage, settings.invoice_due_days)
                .list_for_child(child.id)?;
            if !invoices.is_empty() {
                println!("Invoices");
                for invoice in &invoices {
                    println!(
                        "  {}  {}  {:>12}  {}",
                        invoice.invoice_number,
                        settings.format_date(invoice.issue_date),
                        invoice.total().to_string(),
                        invoice.status
                    );
                }
            }
        }

        ChildCommands::Edit { child } => {
            let existing = service.require(&child)?;
            let wizard = RegistrationWizard::for_child(&existing)?;
            let stdin = io::stdin();
            let session = RegistrationSession::new(
                stdin.lock(),
                io::stdout(),
                settings.document_requirements.clone(),
            );

            match session.run(wizard)? {
                SessionOutcome::Completed(registration) => {
                    let updated = service.update(existing.id, registration)?;
                    println!("Updated {}", updated.full_name());
                }
                SessionOutcome::Cancelled => println!("No changes saved."),
            }
        }

        ChildCommands::Status { child, status } => {
            let status = parse_status(&status)?;
            let child = service.require(&child)?;
            let updated = service.set_status(child.id, status)?;
            println!("{} is now {}", updated.full_name(), updated.status);
        }

        ChildCommands::Assign {
            child,
            classroom,
            clear,
        } => {
            let child = service.require(&child)?;
            let room = if clear { None } else { classroom.as_deref() };
            let updated = service.assign_classroom(child.id, room)?;
            match &updated.classroom {
                Some(room) => println!("Assigned {} to {}", updated.full_name(), room),
                None => println!("Cleared classroom for {}", updated.full_name()),
            }
        }

        ChildCommands::VerifyDoc { child, document } => {
            let child = service.require(&child)?;
            let updated = service.verify_document(child.id, &document)?;
            println!("Verified {} for {}", document.trim(), updated.full_name());
        }

        ChildCommands::Delete { child, force } => {
            let child = service.require(&child)?;

            if !force {
                println!("About to delete {} ({})", child.full_name(), child.id);
                println!("Use --force to confirm.");
                return Ok(());
            }

            let deleted = service.delete(child.id)?;
            println!("Deleted {}", deleted.full_name());
        }

        ChildCommands::Export {
            output,
            status,
            classroom,
        } => {
            let filter = build_filter(None, status, classroom)?;
            let children = service.list(&filter)?;

            match output {
                Some(path) => {
                    let file = File::create(&path)?;
                    let count = export_children_csv(&children, BufWriter::new(file))?;
                    println!("Exported {} child(ren) to {}", count, path.display());
                }
                None => {
                    export_children_csv(&children, io::stdout().lock())?;
                }
            }
        }

        ChildCommands::Stats => {
            let stats = service.stats()?;
            println!("{}", format_child_stats(&stats));
        }

        ChildCommands::Classrooms => {
            let rooms = service.classrooms()?;
            if rooms.is_empty() {
                println!("No classrooms assigned.");
            }
            for room in rooms {
                println!("{}", room);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Waitlist").unwrap(), EnrollmentStatus::Waitlist);
        assert!(parse_status("graduated").unwrap_err().is_validation());
    }

    #[test]
    fn test_build_filter() {
        let filter = build_filter(None, Some("active".into()), Some("unassigned".into())).unwrap();
        assert_eq!(filter.status, Some(EnrollmentStatus::Active));
        assert_eq!(filter.classroom, ClassroomFilter::Unassigned);

        let filter = build_filter(None, None, None).unwrap();
        assert_eq!(filter.classroom, ClassroomFilter::Any);
    }
}
