//! Multi-step registration wizard
//!
//! The wizard is a plain state object with no I/O: it sequences a fixed list
//! of steps, accumulates each step's submitted payload, tracks which steps
//! have been submitted, and hands the assembled record to a completion
//! callback. Front ends (the interactive `register` command, tests) drive it
//! through its methods.
//!
//! - `step`: step descriptors and progress reporting
//! - `state`: the generic `Wizard<P>` state machine
//! - `registration`: the child registration flow built on top of it

pub mod registration;
pub mod state;
pub mod step;

pub use registration::{Registration, RegistrationWizard, StepPayload};
pub use state::{Record, Wizard};
pub use step::{Step, StepProgress, StepStatus, WizardProgress};

use thiserror::Error;

/// Errors raised by wizard navigation and submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// A step index outside the fixed sequence
    #[error("step index {index} is out of range (wizard has {len} steps)")]
    InvalidStepIndex { index: usize, len: usize },

    /// Completion requested before the last step was reached and submitted
    #[error("cannot complete on step {current}: step {last} must be reached and submitted first")]
    PrematureCompletion { current: usize, last: usize },

    /// Two steps share the same identifier
    #[error("duplicate step identifier: {0}")]
    DuplicateStep(String),

    /// The wizard already handed its record to the completion callback
    #[error("wizard has already been completed")]
    AlreadyCompleted,
}
