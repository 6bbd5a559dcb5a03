//! Child registration flow
//!
//! Four fixed steps: personal details, parent information, emergency
//! contacts and documents. Each typed submitter validates its payload before
//! handing it to the generic wizard, so the wizard itself only ever sees
//! valid payloads.

use std::collections::HashMap;

use tracing::info;

use crate::error::{CareError, CareResult};
use crate::models::{
    Child, DocumentChecklist, EmergencyContacts, ParentInformation, PersonalDetails,
};

use super::state::{Record, Wizard};
use super::step::{Step, WizardProgress};
use super::WizardError;

pub const PERSONAL: &str = "personal";
pub const PARENTS: &str = "parents";
pub const EMERGENCY: &str = "emergency";
pub const DOCUMENTS: &str = "documents";

/// The registration steps in traversal order
pub fn registration_steps() -> Vec<Step> {
    vec![
        Step::new(PERSONAL, "Personal Details"),
        Step::new(PARENTS, "Parent Information"),
        Step::new(EMERGENCY, "Emergency Contacts"),
        Step::new(DOCUMENTS, "Documents"),
    ]
}

/// A step's payload, tagged by step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepPayload {
    Personal(PersonalDetails),
    Parents(ParentInformation),
    Emergency(EmergencyContacts),
    Documents(DocumentChecklist),
}

impl StepPayload {
    /// Identifier of the step this payload belongs to
    pub fn step_id(&self) -> &'static str {
        match self {
            Self::Personal(_) => PERSONAL,
            Self::Parents(_) => PARENTS,
            Self::Emergency(_) => EMERGENCY,
            Self::Documents(_) => DOCUMENTS,
        }
    }

    /// Index of the step this payload belongs to
    pub fn step_index(&self) -> usize {
        match self {
            Self::Personal(_) => RegistrationWizard::PERSONAL_STEP,
            Self::Parents(_) => RegistrationWizard::PARENTS_STEP,
            Self::Emergency(_) => RegistrationWizard::EMERGENCY_STEP,
            Self::Documents(_) => RegistrationWizard::DOCUMENTS_STEP,
        }
    }
}

/// Everything collected by a finished registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub personal: PersonalDetails,
    pub parents: ParentInformation,
    pub emergency: EmergencyContacts,
    pub documents: DocumentChecklist,
}

impl Registration {
    /// Assemble a registration from a wizard record
    pub fn from_record(mut record: Record<StepPayload>) -> CareResult<Self> {
        let personal = match record.remove(PERSONAL) {
            Some(StepPayload::Personal(p)) => p,
            other => return Err(step_mismatch(PERSONAL, other)),
        };
        let parents = match record.remove(PARENTS) {
            Some(StepPayload::Parents(p)) => p,
            other => return Err(step_mismatch(PARENTS, other)),
        };
        let emergency = match record.remove(EMERGENCY) {
            Some(StepPayload::Emergency(e)) => e,
            other => return Err(step_mismatch(EMERGENCY, other)),
        };
        let documents = match record.remove(DOCUMENTS) {
            Some(StepPayload::Documents(d)) => d,
            other => return Err(step_mismatch(DOCUMENTS, other)),
        };

        Ok(Self {
            personal,
            parents,
            emergency,
            documents,
        })
    }

    /// Build a new child record
    pub fn into_child(self) -> Child {
        let mut child = Child::new(self.personal.clone());
        self.apply_sections(&mut child);
        child
    }

    /// Overwrite an existing child with the registration's contents
    pub fn apply_to(self, child: &mut Child) {
        child.apply_personal_details(self.personal.clone());
        self.apply_sections(child);
    }

    fn apply_sections(self, child: &mut Child) {
        child.guardians = self.parents.guardians();
        child.custody = self.parents.custody;
        child.emergency_contacts = self.emergency.contacts;
        child.documents = self.documents;
    }
}

fn step_mismatch(step: &str, found: Option<StepPayload>) -> CareError {
    match found {
        None => CareError::Validation(format!("Registration is missing the '{}' step", step)),
        Some(payload) => CareError::Validation(format!(
            "Registration step '{}' holds a '{}' payload",
            step,
            payload.step_id()
        )),
    }
}

/// The registration wizard
#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    wizard: Wizard<StepPayload>,
}

impl RegistrationWizard {
    pub const PERSONAL_STEP: usize = 0;
    pub const PARENTS_STEP: usize = 1;
    pub const EMERGENCY_STEP: usize = 2;
    pub const DOCUMENTS_STEP: usize = 3;

    /// Start an empty registration
    pub fn new() -> Result<Self, WizardError> {
        Self::resume(HashMap::new())
    }

    /// Resume a draft; pre-filled steps still have to be submitted
    pub fn resume(draft: Record<StepPayload>) -> Result<Self, WizardError> {
        Ok(Self {
            wizard: Wizard::new(registration_steps(), draft)?,
        })
    }

    /// Start an edit of an existing child, pre-filled from its record
    pub fn for_child(child: &Child) -> Result<Self, WizardError> {
        let mut draft = HashMap::new();
        draft.insert(
            PERSONAL.to_string(),
            StepPayload::Personal(child.personal_details()),
        );

        if let Some(primary) = child.guardians.first() {
            let secondary = child.guardians.get(1).cloned();
            let same_address = secondary
                .as_ref()
                .map(|s| s.address == primary.address)
                .unwrap_or(true);
            draft.insert(
                PARENTS.to_string(),
                StepPayload::Parents(ParentInformation {
                    primary: primary.clone(),
                    secondary,
                    same_address,
                    custody: child.custody.clone(),
                }),
            );
        }

        draft.insert(
            EMERGENCY.to_string(),
            StepPayload::Emergency(EmergencyContacts::new(child.emergency_contacts.clone())),
        );
        draft.insert(
            DOCUMENTS.to_string(),
            StepPayload::Documents(child.documents.clone()),
        );

        Self::resume(draft)
    }

    /// Validate and submit the personal details step
    pub fn submit_personal(&mut self, details: PersonalDetails) -> CareResult<()> {
        details
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;
        self.submit_valid(StepPayload::Personal(details))
    }

    /// Validate and submit the parent information step
    pub fn submit_parents(&mut self, parents: ParentInformation) -> CareResult<()> {
        parents
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;
        self.submit_valid(StepPayload::Parents(parents))
    }

    /// Validate and submit the emergency contacts step
    pub fn submit_emergency(&mut self, contacts: EmergencyContacts) -> CareResult<()> {
        contacts
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;
        self.submit_valid(StepPayload::Emergency(contacts))
    }

    /// Validate and submit the documents step
    ///
    /// On failure the returned checklist has its missing required documents
    /// flagged, ready to show again.
    pub fn submit_documents(
        &mut self,
        mut checklist: DocumentChecklist,
    ) -> Result<(), (CareError, DocumentChecklist)> {
        if let Err(e) = checklist.check_submission() {
            return Err((CareError::Validation(e.to_string()), checklist));
        }
        self.submit_valid(StepPayload::Documents(checklist.clone()))
            .map_err(|e| (e, checklist))
    }

    /// Validate and submit any step payload
    pub fn submit(&mut self, payload: StepPayload) -> CareResult<()> {
        match payload {
            StepPayload::Personal(p) => self.submit_personal(p),
            StepPayload::Parents(p) => self.submit_parents(p),
            StepPayload::Emergency(e) => self.submit_emergency(e),
            StepPayload::Documents(d) => self.submit_documents(d).map_err(|(e, _)| e),
        }
    }

    fn submit_valid(&mut self, payload: StepPayload) -> CareResult<()> {
        let index = payload.step_index();
        self.wizard.submit_step(index, payload)?;
        Ok(())
    }

    pub fn go_to_previous(&mut self) -> CareResult<()> {
        Ok(self.wizard.go_to_previous()?)
    }

    /// Jump to a completed or current step; `Ok(false)` when ignored
    pub fn go_to_step(&mut self, index: usize) -> CareResult<bool> {
        Ok(self.wizard.go_to_step(index)?)
    }

    /// Finish the registration and hand it to `on_complete`
    ///
    /// Besides the wizard's own completion rule, every step must hold a
    /// submitted payload; a resumed draft whose earlier steps were never
    /// submitted is rejected before the wizard is closed.
    pub fn complete<F>(&mut self, on_complete: F) -> CareResult<()>
    where
        F: FnOnce(Registration),
    {
        let unsubmitted: Vec<&str> = self
            .wizard
            .steps()
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.wizard.is_completed(*i))
            .map(|(_, s)| s.id.as_str())
            .collect();
        if self.wizard.is_last_step()
            && self.wizard.is_completed(Self::DOCUMENTS_STEP)
            && !unsubmitted.is_empty()
        {
            return Err(CareError::Validation(format!(
                "Steps not yet submitted: {}",
                unsubmitted.join(", ")
            )));
        }

        let mut record = None;
        self.wizard.complete(|r| record = Some(r))?;
        let record = record.ok_or(WizardError::AlreadyCompleted)?;
        let registration = Registration::from_record(record)?;

        info!(
            child = %format!("{} {}", registration.personal.first_name, registration.personal.last_name),
            "Registration completed"
        );
        on_complete(registration);
        Ok(())
    }

    pub fn current_index(&self) -> usize {
        self.wizard.current_index()
    }

    pub fn current_step(&self) -> &Step {
        self.wizard.current_step()
    }

    pub fn steps(&self) -> &[Step] {
        self.wizard.steps()
    }

    pub fn is_last_step(&self) -> bool {
        self.wizard.is_last_step()
    }

    pub fn is_finished(&self) -> bool {
        self.wizard.is_finished()
    }

    pub fn completed_steps(&self) -> Vec<usize> {
        self.wizard.completed_steps()
    }

    pub fn progress(&self) -> WizardProgress {
        self.wizard.progress()
    }

    pub fn record(&self) -> &Record<StepPayload> {
        self.wizard.record()
    }

    /// Personal details entered so far (submitted or pre-filled)
    pub fn personal(&self) -> Option<&PersonalDetails> {
        match self.wizard.payload(PERSONAL) {
            Some(StepPayload::Personal(p)) => Some(p),
            _ => None,
        }
    }

    pub fn parents(&self) -> Option<&ParentInformation> {
        match self.wizard.payload(PARENTS) {
            Some(StepPayload::Parents(p)) => Some(p),
            _ => None,
        }
    }

    pub fn emergency(&self) -> Option<&EmergencyContacts> {
        match self.wizard.payload(EMERGENCY) {
            Some(StepPayload::Emergency(e)) => Some(e),
            _ => None,
        }
    }

    pub fn documents(&self) -> Option<&DocumentChecklist> {
        match self.wizard.payload(DOCUMENTS) {
            Some(StepPayload::Documents(d)) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::standard_requirements;
    use crate::models::{Address, EmergencyContact, Guardian};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn personal() -> PersonalDetails {
        PersonalDetails::new("Emma", "Johnson", date(2019, 5, 12), date(2022, 9, 1))
    }

    fn parents() -> ParentInformation {
        let mut g = Guardian::new("Sarah", "Johnson", "Mother");
        g.email = "sarah.johnson@example.com".into();
        g.phone = "(555) 987-6543".into();
        g.address = Address::new("123 Main Street", "Anytown", "CA", "12345");
        ParentInformation::new(g)
    }

    fn contacts() -> EmergencyContacts {
        EmergencyContacts::new(vec![EmergencyContact::new(
            "Robert Smith",
            "Grandfather",
            "(555) 234-5678",
        )])
    }

    fn documents() -> DocumentChecklist {
        let mut checklist = DocumentChecklist::from_requirements(&standard_requirements());
        for req in standard_requirements().iter().filter(|r| r.required) {
            checklist.attach(&req.name, "scan.pdf");
        }
        checklist
    }

    fn filled() -> RegistrationWizard {
        let mut w = RegistrationWizard::new().unwrap();
        w.submit_personal(personal()).unwrap();
        w.submit_parents(parents()).unwrap();
        w.submit_emergency(contacts()).unwrap();
        w.submit_documents(documents()).unwrap();
        w
    }

    #[test]
    fn test_step_order() {
        let ids: Vec<_> = registration_steps().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["personal", "parents", "emergency", "documents"]);
    }

    #[test]
    fn test_invalid_payload_not_submitted() {
        let mut w = RegistrationWizard::new().unwrap();
        let mut bad = personal();
        bad.last_name = "J".into();

        let err = w.submit_personal(bad).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(w.current_index(), 0);
        assert!(w.completed_steps().is_empty());
    }

    #[test]
    fn test_missing_documents_returned_flagged() {
        let mut w = RegistrationWizard::new().unwrap();
        let checklist = DocumentChecklist::from_requirements(&standard_requirements());

        let (err, flagged) = w.submit_documents(checklist).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(flagged.missing_required().len(), 4);
        assert!(!w.completed_steps().contains(&RegistrationWizard::DOCUMENTS_STEP));
    }

    #[test]
    fn test_complete_builds_child() {
        let mut w = filled();
        let mut registered = None;
        w.complete(|r| registered = Some(r.into_child())).unwrap();

        let child = registered.unwrap();
        assert_eq!(child.full_name(), "Emma Johnson");
        assert_eq!(child.primary_guardian_name(), "Sarah Johnson");
        assert_eq!(child.emergency_contacts.len(), 1);
        assert!(child.documents.is_complete());
        assert!(child.validate().is_ok());
    }

    #[test]
    fn test_complete_premature() {
        let mut w = RegistrationWizard::new().unwrap();
        w.submit_personal(personal()).unwrap();

        let mut fired = false;
        let err = w.complete(|_| fired = true).unwrap_err();
        assert!(matches!(
            err,
            CareError::Wizard(WizardError::PrematureCompletion { .. })
        ));
        assert!(!fired);
    }

    #[test]
    fn test_skipped_steps_rejected() {
        let mut w = RegistrationWizard::new().unwrap();
        // Submitting the last step directly is allowed by the wizard...
        w.submit_documents(documents()).unwrap();
        assert_eq!(w.current_index(), 0);
        w.submit_personal(personal()).unwrap();
        w.submit_parents(parents()).unwrap();
        assert!(w.go_to_step(RegistrationWizard::DOCUMENTS_STEP).unwrap());

        // ...but completion needs every step
        let err = w.complete(|_| {}).unwrap_err();
        assert!(err.is_validation());
        assert!(!w.is_finished());
    }

    #[test]
    fn test_edit_prefills_from_child() {
        let mut w = filled();
        let mut child = None;
        w.complete(|r| child = Some(r.into_child())).unwrap();
        let child = child.unwrap();

        let edit = RegistrationWizard::for_child(&child).unwrap();
        assert_eq!(edit.personal().unwrap().first_name, "Emma");
        assert_eq!(edit.parents().unwrap().primary.first_name, "Sarah");
        assert_eq!(edit.emergency().unwrap().len(), 1);
        assert!(edit.documents().unwrap().is_complete());
        assert!(edit.completed_steps().is_empty());
    }

    #[test]
    fn test_from_record_mismatch() {
        let mut record = HashMap::new();
        record.insert(PERSONAL.to_string(), StepPayload::Emergency(contacts()));
        let err = Registration::from_record(record).unwrap_err();
        assert!(err.to_string().contains("holds a 'emergency' payload"));
    }
}
