//! Generic wizard state machine
//!
//! States are the step indices `0..len`; the set of completed steps gates
//! direct navigation. Completion is an exit action: the record is moved out
//! to the caller's callback and the wizard refuses further mutation.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::{debug, warn};

use super::step::{Step, StepProgress, StepStatus, WizardProgress};
use super::WizardError;

/// Accumulated payloads keyed by step identifier
pub type Record<P> = HashMap<String, P>;

/// A wizard over an ordered, fixed list of steps
///
/// The payload type `P` is opaque to the wizard: payloads are stored and
/// overwritten, never inspected.
#[derive(Debug, Clone)]
pub struct Wizard<P> {
    steps: Vec<Step>,
    current: usize,
    completed: BTreeSet<usize>,
    record: Record<P>,
    finished: bool,
}

impl<P> Wizard<P> {
    /// Create a wizard positioned on the first step
    ///
    /// `defaults` pre-fills the record (e.g. a resumed draft). Entries whose
    /// key names no step are dropped. Pre-filled steps are not marked
    /// completed.
    pub fn new(steps: Vec<Step>, defaults: Record<P>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::InvalidStepIndex { index: 0, len: 0 });
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(WizardError::DuplicateStep(step.id.clone()));
            }
        }

        let mut record = HashMap::with_capacity(steps.len());
        for (key, payload) in defaults {
            if seen.contains(key.as_str()) {
                record.insert(key, payload);
            } else {
                warn!(step = %key, "Ignoring default for unknown wizard step");
            }
        }

        Ok(Self {
            steps,
            current: 0,
            completed: BTreeSet::new(),
            record,
            finished: false,
        })
    }

    /// Create a wizard with an empty record
    pub fn with_steps(steps: Vec<Step>) -> Result<Self, WizardError> {
        Self::new(steps, HashMap::new())
    }

    /// Submit a payload for a step
    ///
    /// Stores the payload under the step's identifier (replacing any earlier
    /// submission), marks the step completed, and advances to the following
    /// step unless `index` is the last one.
    pub fn submit_step(&mut self, index: usize, payload: P) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.check_index(index)?;

        let id = self.steps[index].id.clone();
        let resubmitted = self.record.insert(id.clone(), payload).is_some();
        self.completed.insert(index);

        if index < self.last_index() {
            self.current = index + 1;
        }

        debug!(
            step = %id,
            resubmitted,
            current = self.current,
            "Wizard step submitted"
        );
        Ok(())
    }

    /// Move back one step; stays on the first step
    pub fn go_to_previous(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.current = self.current.saturating_sub(1);
        Ok(())
    }

    /// Jump to a completed step or the current one
    ///
    /// Returns `Ok(false)` when the target is in range but not reachable yet;
    /// the request is ignored in that case.
    pub fn go_to_step(&mut self, target: usize) -> Result<bool, WizardError> {
        self.ensure_open()?;
        self.check_index(target)?;

        if !self.can_navigate_to(target) {
            debug!(target, current = self.current, "Ignoring navigation to locked step");
            return Ok(false);
        }

        self.current = target;
        Ok(true)
    }

    /// Finish the wizard and hand the record to `on_complete`
    ///
    /// Requires the current step to be the last one and to have been
    /// submitted. On failure the callback is not invoked and the wizard is
    /// left untouched.
    pub fn complete<F>(&mut self, on_complete: F) -> Result<(), WizardError>
    where
        F: FnOnce(Record<P>),
    {
        self.ensure_open()?;

        let last = self.last_index();
        if self.current != last || !self.completed.contains(&last) {
            return Err(WizardError::PrematureCompletion {
                current: self.current,
                last,
            });
        }

        self.completed.insert(last);
        self.finished = true;
        let record = std::mem::take(&mut self.record);
        debug!(entries = record.len(), "Wizard completed");
        on_complete(record);
        Ok(())
    }

    /// The fixed step sequence
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Index of the current step
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current step
    pub fn current_step(&self) -> &Step {
        &self.steps[self.current]
    }

    /// Whether the current step is the last one
    pub fn is_last_step(&self) -> bool {
        self.current == self.last_index()
    }

    /// Whether a step has been submitted at least once
    pub fn is_completed(&self, index: usize) -> bool {
        self.completed.contains(&index)
    }

    /// Completed step indices in ascending order
    pub fn completed_steps(&self) -> Vec<usize> {
        self.completed.iter().copied().collect()
    }

    /// Whether `complete` has already run
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether direct navigation to `index` would be honored
    pub fn can_navigate_to(&self, index: usize) -> bool {
        index == self.current || self.completed.contains(&index)
    }

    /// The record accumulated so far
    pub fn record(&self) -> &Record<P> {
        &self.record
    }

    /// The payload stored for a step identifier
    pub fn payload(&self, step_id: &str) -> Option<&P> {
        self.record.get(step_id)
    }

    /// Step-by-step progress snapshot
    pub fn progress(&self) -> WizardProgress {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let status = if self.completed.contains(&index) {
                    StepStatus::Completed
                } else if index == self.current {
                    StepStatus::Current
                } else {
                    StepStatus::Locked
                };
                StepProgress {
                    index,
                    id: step.id.clone(),
                    label: step.label.clone(),
                    status,
                }
            })
            .collect();

        WizardProgress {
            steps,
            current_index: self.current,
            completed_count: self.completed.len(),
        }
    }

    fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    fn check_index(&self, index: usize) -> Result<(), WizardError> {
        if index >= self.steps.len() {
            return Err(WizardError::InvalidStepIndex {
                index,
                len: self.steps.len(),
            });
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.finished {
            return Err(WizardError::AlreadyCompleted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_steps() -> Vec<Step> {
        vec![
            Step::new("personal", "Personal Details"),
            Step::new("parents", "Parent Information"),
            Step::new("emergency", "Emergency Contacts"),
            Step::new("documents", "Documents"),
        ]
    }

    fn wizard() -> Wizard<String> {
        Wizard::with_steps(four_steps()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let w = wizard();
        assert_eq!(w.current_index(), 0);
        assert!(w.completed_steps().is_empty());
        assert!(w.record().is_empty());
        assert_eq!(w.current_step().id, "personal");
    }

    #[test]
    fn test_empty_steps_rejected() {
        let result = Wizard::<String>::with_steps(Vec::new());
        assert_eq!(
            result.unwrap_err(),
            WizardError::InvalidStepIndex { index: 0, len: 0 }
        );
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let steps = vec![Step::new("a", "A"), Step::new("a", "Again")];
        let result = Wizard::<String>::with_steps(steps);
        assert_eq!(result.unwrap_err(), WizardError::DuplicateStep("a".into()));
    }

    #[test]
    fn test_defaults_seed_record_without_completing() {
        let mut defaults = HashMap::new();
        defaults.insert("parents".to_string(), "draft".to_string());
        defaults.insert("unknown".to_string(), "ignored".to_string());

        let w = Wizard::new(four_steps(), defaults).unwrap();
        assert_eq!(w.payload("parents").map(String::as_str), Some("draft"));
        assert!(w.payload("unknown").is_none());
        assert_eq!(w.record().len(), 1);
        assert!(w.completed_steps().is_empty());
    }

    #[test]
    fn test_submit_advances_and_completes() {
        let mut w = wizard();
        w.submit_step(0, "p".into()).unwrap();

        assert_eq!(w.current_index(), 1);
        assert_eq!(w.completed_steps(), vec![0]);
        assert_eq!(w.payload("personal").map(String::as_str), Some("p"));
    }

    #[test]
    fn test_submit_all_in_order() {
        let mut w = wizard();
        for i in 0..4 {
            w.submit_step(i, format!("payload-{}", i)).unwrap();
        }

        assert_eq!(w.completed_steps(), vec![0, 1, 2, 3]);
        assert_eq!(w.record().len(), 4);
        assert_eq!(w.current_index(), 3);
        assert!(w.is_last_step());
    }

    #[test]
    fn test_submit_out_of_range() {
        let mut w = wizard();
        let err = w.submit_step(4, "x".into()).unwrap_err();
        assert_eq!(err, WizardError::InvalidStepIndex { index: 4, len: 4 });
        assert!(w.record().is_empty());
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_submit_last_step_stays_on_last() {
        let mut w = wizard();
        for i in 0..3 {
            w.submit_step(i, "x".into()).unwrap();
        }
        w.submit_step(3, "docs".into()).unwrap();
        assert_eq!(w.current_index(), 3);
    }

    #[test]
    fn test_previous_floors_at_zero() {
        let mut w = wizard();
        w.go_to_previous().unwrap();
        assert_eq!(w.current_index(), 0);
        w.go_to_previous().unwrap();
        assert_eq!(w.current_index(), 0);

        w.submit_step(0, "p".into()).unwrap();
        w.go_to_previous().unwrap();
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_go_to_locked_step_ignored() {
        let mut w = wizard();
        w.submit_step(0, "p".into()).unwrap();

        assert_eq!(w.go_to_step(3), Ok(false));
        assert_eq!(w.current_index(), 1);

        assert_eq!(w.go_to_step(0), Ok(true));
        assert_eq!(w.current_index(), 0);

        // Step 1 is neither completed nor current any more
        assert_eq!(w.go_to_step(1), Ok(false));
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_go_to_current_step_allowed() {
        let mut w = wizard();
        assert_eq!(w.go_to_step(0), Ok(true));
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_go_to_out_of_range() {
        let mut w = wizard();
        assert_eq!(
            w.go_to_step(9),
            Err(WizardError::InvalidStepIndex { index: 9, len: 4 })
        );
    }

    #[test]
    fn test_resubmit_overwrites_without_duplicating() {
        let mut w = wizard();
        w.submit_step(0, "first".into()).unwrap();
        w.submit_step(1, "parents".into()).unwrap();
        assert!(w.go_to_step(0).unwrap());

        w.submit_step(0, "second".into()).unwrap();

        assert_eq!(w.completed_steps(), vec![0, 1]);
        assert_eq!(w.payload("personal").map(String::as_str), Some("second"));
        assert_eq!(w.record().len(), 2);
        assert_eq!(w.current_index(), 1);
    }

    #[test]
    fn test_backward_edit_keeps_later_steps_completed() {
        let mut w = wizard();
        for i in 0..3 {
            w.submit_step(i, "x".into()).unwrap();
        }
        w.go_to_step(0).unwrap();
        w.submit_step(0, "edited".into()).unwrap();

        assert!(w.is_completed(2));
        assert_eq!(w.go_to_step(3), Ok(true));
    }

    #[test]
    fn test_complete_before_last_step_fails() {
        let mut w = wizard();
        w.submit_step(0, "p".into()).unwrap();

        let mut fired = 0;
        let err = w.complete(|_| fired += 1).unwrap_err();

        assert_eq!(err, WizardError::PrematureCompletion { current: 1, last: 3 });
        assert_eq!(fired, 0);
        assert_eq!(w.record().len(), 1);
    }

    #[test]
    fn test_complete_on_last_step_without_submission_fails() {
        let mut w = wizard();
        for i in 0..3 {
            w.submit_step(i, "x".into()).unwrap();
        }
        assert_eq!(w.current_index(), 3);

        let mut fired = false;
        let err = w.complete(|_| fired = true).unwrap_err();
        assert!(matches!(err, WizardError::PrematureCompletion { .. }));
        assert!(!fired);
    }

    #[test]
    fn test_complete_from_earlier_completed_step_fails() {
        let mut w = wizard();
        for i in 0..4 {
            w.submit_step(i, "x".into()).unwrap();
        }
        w.go_to_previous().unwrap();

        let result = w.complete(|_| {});
        assert!(matches!(result, Err(WizardError::PrematureCompletion { .. })));
    }

    #[test]
    fn test_complete_fires_once_with_full_record() {
        let mut w = wizard();
        for i in 0..4 {
            w.submit_step(i, format!("payload-{}", i)).unwrap();
        }

        let mut calls = 0;
        let mut delivered = None;
        w.complete(|record| {
            calls += 1;
            delivered = Some(record);
        })
        .unwrap();

        assert_eq!(calls, 1);
        let record = delivered.unwrap();
        let mut keys: Vec<_> = record.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["documents", "emergency", "parents", "personal"]);
        assert!(w.is_finished());
    }

    #[test]
    fn test_mutation_after_completion_rejected() {
        let mut w = wizard();
        for i in 0..4 {
            w.submit_step(i, "x".into()).unwrap();
        }
        w.complete(|_| {}).unwrap();

        assert_eq!(w.submit_step(0, "y".into()), Err(WizardError::AlreadyCompleted));
        assert_eq!(w.go_to_previous(), Err(WizardError::AlreadyCompleted));
        assert_eq!(w.go_to_step(0), Err(WizardError::AlreadyCompleted));

        let mut fired = false;
        assert_eq!(w.complete(|_| fired = true), Err(WizardError::AlreadyCompleted));
        assert!(!fired);
    }

    #[test]
    fn test_progress_statuses() {
        let mut w = wizard();
        w.submit_step(0, "p".into()).unwrap();
        w.go_to_step(0).unwrap();

        let progress = w.progress();
        let statuses: Vec<_> = progress.steps.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Completed,
                StepStatus::Locked,
                StepStatus::Locked,
                StepStatus::Locked
            ]
        );
        assert_eq!(progress.current_index, 0);
        assert_eq!(progress.completed_count, 1);
    }
}
