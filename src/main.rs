use anyhow::Result;
use clap::{Parser, Subcommand};

use childcare::cli::{
    handle_audit_command, handle_billing_command, handle_child_command, handle_invoice_command,
    handle_payment_command, handle_register_command, ChildCommands, InvoiceCommands,
    PaymentCommands,
};
use childcare::config::{CarePaths, Settings};
use childcare::logging::init_logging;
use childcare::storage::{init::initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "childcare",
    version,
    about = "Enrollment and billing for a child-care center",
    long_about = "childcare registers children through a step-by-step wizard \
                  (personal details, parents, emergency contacts, documents), \
                  keeps the children directory, and tracks invoices and payments."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a child with the interactive wizard
    Register,

    /// Children directory commands
    #[command(subcommand)]
    Child(ChildCommands),

    /// Invoice commands
    #[command(subcommand)]
    Invoice(InvoiceCommands),

    /// Payment commands
    #[command(subcommand, alias = "pay")]
    Payment(PaymentCommands),

    /// Show the billing summary
    Billing,

    /// Show recent changes from the audit log
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CarePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings.log_level, cli.verbose);

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing childcare-cli at: {}", paths.data_dir().display());
            if initialize_storage(&paths, &settings)? {
                println!("Initialization complete!");
            } else {
                println!("Already initialized; existing files were kept.");
            }
            println!();
            println!("Run 'childcare register' to enroll the first child.");
        }
        Some(Commands::Config) => {
            println!("childcare-cli Configuration");
            println!("===========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Facility:         {}", settings.facility_name);
            println!("  Currency symbol:  {}", settings.currency_symbol);
            println!("  Invoice due days: {}", settings.invoice_due_days);
            println!("  Log level:        {}", settings.log_level);
            println!("  Documents:");
            for requirement in &settings.document_requirements {
                let marker = if requirement.required { " (required)" } else { "" };
                println!("    - {}{}", requirement.name, marker);
            }
        }
        Some(command) => {
            let storage = Storage::open(paths)?;
            match command {
                Commands::Register => handle_register_command(&storage, &settings)?,
                Commands::Child(cmd) => handle_child_command(&storage, &settings, cmd)?,
                Commands::Invoice(cmd) => handle_invoice_command(&storage, &settings, cmd)?,
                Commands::Payment(cmd) => handle_payment_command(&storage, &settings, cmd)?,
                Commands::Billing => handle_billing_command(&storage, &settings)?,
                Commands::Audit { count } => handle_audit_command(&storage, count)?,
                Commands::Init | Commands::Config => {}
            }
        }
        None => {
            println!("childcare-cli - Enrollment and billing for child care");
            println!();
            println!("Run 'childcare --help' for usage information.");
            println!("Run 'childcare init' to set up the data directory.");
        }
    }

    Ok(())
}
