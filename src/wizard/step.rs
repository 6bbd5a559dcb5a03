//! Step descriptors and progress reporting

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named stage of a wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Identifier used as the record key for this step's payload
    pub id: String,

    /// Human-readable label
    pub label: String,
}

impl Step {
    /// Create a new step
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Display status of a step in the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Submitted at least once; reachable by direct navigation
    Completed,
    /// The step currently shown
    Current,
    /// Not reached yet; direct navigation is ignored
    Locked,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "done"),
            Self::Current => write!(f, "current"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// Progress entry for a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub status: StepStatus,
}

/// Snapshot of the whole wizard's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardProgress {
    pub steps: Vec<StepProgress>,
    pub current_index: usize,
    pub completed_count: usize,
}

impl WizardProgress {
    /// Total number of steps
    pub fn total(&self) -> usize {
        self.steps.len()
    }

    /// Whether every step has been submitted
    pub fn all_completed(&self) -> bool {
        self.completed_count == self.steps.len()
    }
}

impl fmt::Display for WizardProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .steps
            .iter()
            .map(|s| match s.status {
                StepStatus::Completed => format!("[x] {}", s.label),
                StepStatus::Current => format!("[>] {}", s.label),
                StepStatus::Locked => format!("[ ] {}", s.label),
            })
            .collect();
        write!(f, "{}", parts.join("  "))
    }
}
