//! Interactive registration
//!
//! Drives a `RegistrationWizard` from line-based input. Between steps the
//! user can type `back`, `goto <n>`, `done` or `quit`; pressing enter fills
//! in the current step. Prompts show the current value in brackets. An
//! empty answer keeps it and `-` clears it.

use std::io::{self, BufRead, Write};

use chrono::{Local, NaiveDate};

use crate::config::Settings;
use crate::error::{CareError, CareResult};
use crate::models::{
    Address, ContactField, CustodyArrangement, CustodyType, DocumentChecklist,
    DocumentRequirement, EmergencyContact, EnrollmentStatus, Gender, Guardian, ParentInformation,
    PersonalDetails,
};
use crate::services::ChildService;
use crate::storage::Storage;
use crate::wizard::{Registration, RegistrationWizard};

/// How an interactive session ended
#[derive(Debug)]
pub enum SessionOutcome {
    Completed(Registration),
    Cancelled,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Fill,
    Back,
    GoTo(usize),
    Done,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim().to_lowercase();
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (None, _) | (Some("next"), None) => Self::Fill,
            (Some("back" | "b"), None) => Self::Back,
            (Some("goto" | "g"), Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::GoTo(n - 1),
                _ => Self::Unknown(line.clone()),
            },
            (Some("done" | "finish"), None) => Self::Done,
            (Some("quit" | "q" | "exit"), None) => Self::Quit,
            _ => Self::Unknown(line.clone()),
        }
    }
}

/// Answer that empties an optional field
const CLEAR: &str = "-";

/// What to do with a contact already on file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactAction {
    Keep,
    Edit,
    Remove,
}

impl ContactAction {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keep" | "k" => Some(Self::Keep),
            "edit" | "e" => Some(Self::Edit),
            "remove" | "r" | "delete" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// Custody answer: blank or "none" for no arrangement
fn parse_custody(s: &str) -> Option<Option<CustodyType>> {
    match s.trim().to_lowercase().as_str() {
        "" | "none" => Some(None),
        other => CustodyType::parse(other).map(Some),
    }
}

fn parse_yes_no(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

/// Why a prompt did not produce an answer
#[derive(Debug)]
enum Interrupt {
    EndOfInput,
    Failed(CareError),
}

impl From<CareError> for Interrupt {
    fn from(e: CareError) -> Self {
        Self::Failed(e)
    }
}

impl From<io::Error> for Interrupt {
    fn from(e: io::Error) -> Self {
        Self::Failed(e.into())
    }
}

type Flow<T> = Result<T, Interrupt>;

/// A registration session over any line reader and writer
pub struct RegistrationSession<R, W> {
    input: R,
    output: W,
    requirements: Vec<DocumentRequirement>,
    today: NaiveDate,
}

impl<R: BufRead, W: Write> RegistrationSession<R, W> {
    pub fn new(input: R, output: W, requirements: Vec<DocumentRequirement>) -> Self {
        Self {
            input,
            output,
            requirements,
            today: Local::now().date_naive(),
        }
    }

    /// Date used as the default enrollment date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Run until the wizard completes, the user quits or input ends
    pub fn run(mut self, mut wizard: RegistrationWizard) -> CareResult<SessionOutcome> {
        match self.drive(&mut wizard) {
            Ok(outcome) => Ok(outcome),
            Err(Interrupt::EndOfInput) => Ok(SessionOutcome::Cancelled),
            Err(Interrupt::Failed(e)) => Err(e),
        }
    }

    fn drive(&mut self, wizard: &mut RegistrationWizard) -> Flow<SessionOutcome> {
        loop {
            let total = wizard.steps().len();
            let index = wizard.current_index();
            let label = wizard.current_step().label.clone();

            self.say("")?;
            self.say(&wizard.progress().to_string())?;
            self.say(&format!("Step {}/{}: {}", index + 1, total, label))?;

            let line = self.read_line("[enter] fill in, back, goto <n>, done, quit: ")?;
            match Command::parse(&line) {
                Command::Fill => {
                    match index {
                        RegistrationWizard::PERSONAL_STEP => self.fill_personal(wizard)?,
                        RegistrationWizard::PARENTS_STEP => self.fill_parents(wizard)?,
                        RegistrationWizard::EMERGENCY_STEP => self.fill_emergency(wizard)?,
                        _ => self.fill_documents(wizard)?,
                    }
                    if index + 1 == total && wizard.progress().all_completed() {
                        if let Some(registration) = self.try_complete(wizard)? {
                            return Ok(SessionOutcome::Completed(registration));
                        }
                    }
                }
                Command::Back => wizard.go_to_previous()?,
                Command::GoTo(target) => match wizard.go_to_step(target) {
                    Ok(true) => {}
                    Ok(false) => self.say(&format!("Step {} is not available yet.", target + 1))?,
                    Err(e) => self.say(&format!("Error: {}", e))?,
                },
                Command::Done => {
                    if let Some(registration) = self.try_complete(wizard)? {
                        return Ok(SessionOutcome::Completed(registration));
                    }
                }
                Command::Quit => {
                    self.say("Registration cancelled.")?;
                    return Ok(SessionOutcome::Cancelled);
                }
                Command::Unknown(cmd) => self.say(&format!("Unknown command: {}", cmd))?,
            }
        }
    }

    fn try_complete(&mut self, wizard: &mut RegistrationWizard) -> Flow<Option<Registration>> {
        let mut finished = None;
        match wizard.complete(|registration| finished = Some(registration)) {
            Ok(()) => Ok(finished),
            Err(e) => {
                self.say(&format!("Cannot finish yet: {}", e))?;
                Ok(None)
            }
        }
    }

    fn fill_personal(&mut self, wizard: &mut RegistrationWizard) -> Flow<()> {
        let current = wizard.personal().cloned();
        let old = |f: fn(&PersonalDetails) -> String| current.as_ref().map(f).unwrap_or_default();

        let [first_name, last_name] = self.ask_fields([
            ("First name", old(|p| p.first_name.clone())),
            ("Last name", old(|p| p.last_name.clone())),
        ])?;
        let date_of_birth =
            self.ask_date("Date of birth (YYYY-MM-DD)", current.as_ref().map(|p| p.date_of_birth))?;
        let enrollment_default = current
            .as_ref()
            .map(|p| p.enrollment_date)
            .unwrap_or(self.today);
        let enrollment_date =
            self.ask_date("Enrollment date (YYYY-MM-DD)", Some(enrollment_default))?;
        let gender = self.ask_choice(
            "Gender (female/male/unspecified)",
            &old(|p| p.gender.to_string().to_lowercase()),
            "gender",
            Gender::parse,
        )?;
        let status_default = current.as_ref().map(|p| p.status).unwrap_or_default();
        let status = self.ask_choice(
            "Enrollment status (active/waitlist/inactive)",
            &status_default.to_string().to_lowercase(),
            "status",
            EnrollmentStatus::parse,
        )?;
        let [classroom, address] = self.ask_fields([
            ("Classroom (blank for none)", old(|p| p.classroom.clone().unwrap_or_default())),
            ("Home address", old(|p| p.address.clone())),
        ])?;

        self.say("Medical information")?;
        let [allergies, medications, conditions, blood_type, doctor_name, doctor_phone] = self
            .ask_fields([
                ("  Allergies (comma separated)", old(|p| p.medical.allergies.join(", "))),
                ("  Medications (comma separated)", old(|p| p.medical.medications.join(", "))),
                ("  Conditions (comma separated)", old(|p| p.medical.conditions.join(", "))),
                ("  Blood type", old(|p| p.medical.blood_type.clone())),
                ("  Doctor name", old(|p| p.medical.doctor_name.clone())),
                ("  Doctor phone", old(|p| p.medical.doctor_phone.clone())),
            ])?;

        let mut details = current
            .unwrap_or_else(|| PersonalDetails::new("", "", date_of_birth, enrollment_date));
        details.first_name = first_name;
        details.last_name = last_name;
        details.date_of_birth = date_of_birth;
        details.enrollment_date = enrollment_date;
        details.gender = gender;
        details.status = status;
        details.classroom = Some(classroom).filter(|c| !c.is_empty());
        details.address = address;
        details.medical.allergies = split_list(&allergies);
        details.medical.medications = split_list(&medications);
        details.medical.conditions = split_list(&conditions);
        details.medical.blood_type = blood_type;
        details.medical.doctor_name = doctor_name;
        details.medical.doctor_phone = doctor_phone;

        self.report(wizard.submit_personal(details))
    }

    fn fill_parents(&mut self, wizard: &mut RegistrationWizard) -> Flow<()> {
        let current = wizard.parents().cloned();

        self.say("Primary guardian")?;
        let primary = self.ask_guardian(current.as_ref().map(|p| &p.primary), true)?;
        let mut parents = ParentInformation::new(primary);

        let had_secondary = current.as_ref().is_some_and(|p| p.secondary.is_some());
        if self.ask_yes_no("Add a second guardian?", had_secondary)? {
            self.say("Second guardian")?;
            let same = current.as_ref().map(|p| p.same_address).unwrap_or(true);
            let same_address = self.ask_yes_no("Same address as primary?", same)?;
            let existing = current.as_ref().and_then(|p| p.secondary.as_ref());
            let secondary = self.ask_guardian(existing, !same_address)?;
            parents = parents.with_secondary(secondary, same_address);
        }

        let stored = current.and_then(|p| p.custody);
        let custody_default = stored
            .as_ref()
            .map(|c| c.custody_type.to_string().to_lowercase())
            .unwrap_or_default();
        let custody_type = self.ask_choice(
            "Custody arrangement (joint/sole/other/none)",
            &custody_default,
            "custody arrangement",
            parse_custody,
        )?;
        parents.custody = match custody_type {
            Some(custody_type) => {
                let on_file = stored.as_ref().is_some_and(|c| c.documents_on_file);
                let documents_on_file = self.ask_yes_no("  Court documents on file?", on_file)?;
                let notes = stored.map(|c| c.notes).unwrap_or_default();
                let notes = self.ask("  Custody notes", &notes)?;
                Some(CustodyArrangement {
                    custody_type,
                    documents_on_file,
                    notes,
                })
            }
            None => None,
        };

        self.report(wizard.submit_parents(parents))
    }

    fn ask_guardian(&mut self, existing: Option<&Guardian>, with_address: bool) -> Flow<Guardian> {
        let old = |f: fn(&Guardian) -> String| existing.map(f).unwrap_or_default();
        let [first_name, last_name, relationship, email, phone] = self.ask_fields([
            ("  First name", old(|g| g.first_name.clone())),
            ("  Last name", old(|g| g.last_name.clone())),
            ("  Relationship", old(|g| g.relationship.clone())),
            ("  Email", old(|g| g.email.clone())),
            ("  Phone", old(|g| g.phone.clone())),
        ])?;

        let mut guardian = existing
            .cloned()
            .unwrap_or_else(|| Guardian::new("", "", ""));
        guardian.first_name = first_name;
        guardian.last_name = last_name;
        guardian.relationship = relationship;
        guardian.email = email;
        guardian.phone = phone;

        if with_address {
            let address = &guardian.address;
            let [street, city, state, zip] = self.ask_fields([
                ("  Street", address.street.clone()),
                ("  City", address.city.clone()),
                ("  State", address.state.clone()),
                ("  ZIP code", address.zip.clone()),
            ])?;
            guardian.address = Address::new(street, city, state, zip);
        }

        Ok(guardian)
    }

    fn fill_emergency(&mut self, wizard: &mut RegistrationWizard) -> Flow<()> {
        let mut contacts = wizard.emergency().cloned().unwrap_or_default();

        for contact in contacts.contacts.clone() {
            self.say(&format!("  {}", contact))?;
            let action = self.ask_choice(
                "  Keep, edit or remove? (keep/edit/remove)",
                "keep",
                "choice",
                ContactAction::parse,
            )?;
            match action {
                ContactAction::Keep => {}
                ContactAction::Edit => {
                    for change in self.ask_contact_changes(&contact)? {
                        contacts.update(contact.id, change);
                    }
                }
                ContactAction::Remove => {
                    contacts.remove(contact.id);
                }
            }
        }

        loop {
            let name = self.ask("Contact name (blank to finish)", "")?;
            if name.is_empty() {
                break;
            }
            let [relationship, phone] =
                self.ask_fields([("  Relationship", String::new()), ("  Phone", String::new())])?;
            let mut contact = EmergencyContact::new(name, relationship, phone);
            if self.ask_yes_no("  Authorized for pickup?", false)? {
                contact = contact.authorized();
            }
            contacts.add(contact);
        }

        self.report(wizard.submit_emergency(contacts))
    }

    fn ask_contact_changes(&mut self, contact: &EmergencyContact) -> Flow<Vec<ContactField>> {
        let [name, relationship, phone] = self.ask_fields([
            ("    Name", contact.name.clone()),
            ("    Relationship", contact.relationship.clone()),
            ("    Phone", contact.phone.clone()),
        ])?;
        let pickup = self.ask_yes_no("    Authorized for pickup?", contact.authorized_for_pickup)?;

        let mut changes = Vec::new();
        if name != contact.name {
            changes.push(ContactField::Name(name));
        }
        if relationship != contact.relationship {
            changes.push(ContactField::Relationship(relationship));
        }
        if phone != contact.phone {
            changes.push(ContactField::Phone(phone));
        }
        if pickup != contact.authorized_for_pickup {
            changes.push(ContactField::AuthorizedForPickup(pickup));
        }
        Ok(changes)
    }

    fn fill_documents(&mut self, wizard: &mut RegistrationWizard) -> Flow<()> {
        let mut checklist = wizard
            .documents()
            .cloned()
            .unwrap_or_else(|| DocumentChecklist::from_requirements(&self.requirements));

        let entries: Vec<(String, bool, String)> = checklist
            .documents
            .iter()
            .map(|d| (d.name.clone(), d.required, d.file_name.clone().unwrap_or_default()))
            .collect();

        self.say("File name for each document (* = required)")?;
        for (name, required, current) in entries {
            let label = format!("  {}{}", name, if required { "*" } else { "" });
            let file = self.ask(&label, &current)?;
            if file.is_empty() {
                checklist.remove_file(&name);
            } else if file != current {
                checklist.attach(&name, file);
            }
        }

        if let Err((e, flagged)) = wizard.submit_documents(checklist) {
            self.say(&format!("Error: {}", e))?;
            for doc in flagged.documents.iter().filter(|d| d.required) {
                self.say(&format!("  [{}] {}", doc.status, doc.name))?;
            }
        }
        Ok(())
    }

    /// Show validation failures and stay on the step; anything else aborts
    fn report(&mut self, result: CareResult<()>) -> Flow<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_validation() => self.say(&format!("Error: {}", e)),
            Err(e) => Err(e.into()),
        }
    }

    fn ask_fields<const N: usize>(&mut self, prompts: [(&str, String); N]) -> Flow<[String; N]> {
        let mut answers: [String; N] = std::array::from_fn(|_| String::new());
        for (answer, (label, default)) in answers.iter_mut().zip(prompts) {
            *answer = self.ask(label, &default)?;
        }
        Ok(answers)
    }

    fn ask(&mut self, label: &str, default: &str) -> Flow<String> {
        let prompt = if default.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, default)
        };
        let answer = self.read_line(&prompt)?;
        Ok(match answer.as_str() {
            "" => default.to_string(),
            CLEAR => String::new(),
            _ => answer,
        })
    }

    /// Ask until the answer parses, repeating the prompt on bad input
    fn ask_choice<T>(
        &mut self,
        label: &str,
        default: &str,
        what: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Flow<T> {
        loop {
            let answer = self.ask(label, default)?;
            match parse(&answer) {
                Some(value) => return Ok(value),
                None => self.say(&format!("Invalid {}: '{}'", what, answer))?,
            }
        }
    }

    fn ask_date(&mut self, label: &str, default: Option<NaiveDate>) -> Flow<NaiveDate> {
        let default_text = default.map(|d| d.to_string()).unwrap_or_default();
        self.ask_choice(label, &default_text, "date", |s| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
        })
    }

    fn ask_yes_no(&mut self, label: &str, default: bool) -> Flow<bool> {
        let hint = if default { "yes" } else { "no" };
        self.ask_choice(&format!("{} (yes/no)", label), hint, "answer", parse_yes_no)
    }

    fn read_line(&mut self, prompt: &str) -> Flow<String> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Interrupt::EndOfInput);
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, line: &str) -> Flow<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

/// Run the registration wizard on the terminal and save the new child
pub fn handle_register_command(storage: &Storage, settings: &Settings) -> CareResult<()> {
    println!("Register a child at {}", settings.facility_name);
    println!("Press enter to fill in each step; type 'quit' to stop without saving.");

    let stdin = std::io::stdin();
    let session = RegistrationSession::new(
        stdin.lock(),
        std::io::stdout(),
        settings.document_requirements.clone(),
    );

    match session.run(RegistrationWizard::new()?)? {
        SessionOutcome::Completed(registration) => {
            let child = ChildService::new(storage).register(registration)?;
            println!();
            println!("Registered {} ({})", child.full_name(), child.id);
        }
        SessionOutcome::Cancelled => println!("Nothing saved."),
    }
    Ok(())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::standard_requirements;
    use crate::models::Child;
    use crate::services::fixtures::registration;
    use std::io::Cursor;

    fn session(script: &str) -> RegistrationSession<Cursor<Vec<u8>>, Vec<u8>> {
        RegistrationSession::new(
            Cursor::new(script.as_bytes().to_vec()),
            Vec::new(),
            standard_requirements(),
        )
        .with_today(NaiveDate::from_ymd_opt(2024, 9, 1).unwrap())
    }

    fn run_edit(child: &Child, script: &str) -> Registration {
        let outcome = session(script)
            .run(RegistrationWizard::for_child(child).unwrap())
            .unwrap();
        match outcome {
            SessionOutcome::Completed(registration) => registration,
            SessionOutcome::Cancelled => panic!("expected a completed edit"),
        }
    }

    fn blank(lines: usize) -> String {
        "\n".repeat(lines)
    }

    const PERSONAL: &str = "\nEmma\nJohnson\n2019-05-12\n\nf\n\nSunflowers\n\n\
                            Peanuts, Dairy\nInhaler\n\nO+\nDr. Patel\n555-222-3333\n";
    const PARENTS: &str = "\nSarah\nJohnson\nMother\nsarah@example.com\n555-123-4567\n\
                           123 Main Street\nSpringfield\nIL\n62701\nno\n\n";
    const EMERGENCY: &str = "\nMary Smith\nGrandmother\n555-987-6543\nyes\n\n";
    const DOCUMENTS: &str = "\nbirth.pdf\nshots.pdf\nmedical.pdf\ncontacts.pdf\n\n";

    // Answers for an edit of the fixture child that keep every stored value
    const KEEP_PERSONAL: usize = 15;
    const KEEP_PARENTS: usize = 12;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(""), Command::Fill);
        assert_eq!(Command::parse(" BACK "), Command::Back);
        assert_eq!(Command::parse("goto 3"), Command::GoTo(2));
        assert_eq!(Command::parse("goto 0"), Command::Unknown("goto 0".into()));
        assert_eq!(Command::parse("q"), Command::Quit);
    }

    #[test]
    fn test_answer_parsing() {
        assert_eq!(parse_custody(""), Some(None));
        assert_eq!(parse_custody("None"), Some(None));
        assert_eq!(parse_custody("sole"), Some(Some(CustodyType::Sole)));
        assert_eq!(parse_custody("shared"), None);
        assert_eq!(parse_yes_no("Y"), Some(true));
        assert_eq!(parse_yes_no("no"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
        assert_eq!(ContactAction::parse("Remove"), Some(ContactAction::Remove));
    }

    #[test]
    fn test_dash_clears_and_blank_keeps() {
        let mut session = session("-\n\nPeanuts\n");
        assert_eq!(session.ask("Allergies", "Dairy").unwrap(), "");
        assert_eq!(session.ask("Allergies", "Dairy").unwrap(), "Dairy");
        assert_eq!(session.ask("Allergies", "Dairy").unwrap(), "Peanuts");
    }

    #[test]
    fn test_full_session_completes() {
        let script = format!("{}{}{}{}", PERSONAL, PARENTS, EMERGENCY, DOCUMENTS);
        let outcome = session(&script)
            .run(RegistrationWizard::new().unwrap())
            .unwrap();

        let SessionOutcome::Completed(registration) = outcome else {
            panic!("expected a completed registration");
        };
        let personal = &registration.personal;
        assert_eq!(personal.first_name, "Emma");
        assert_eq!(personal.gender, Gender::Female);
        assert_eq!(personal.status, EnrollmentStatus::Active);
        assert_eq!(personal.classroom.as_deref(), Some("Sunflowers"));
        assert_eq!(
            personal.enrollment_date,
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
        );
        assert_eq!(personal.medical.allergies, vec!["Peanuts", "Dairy"]);
        assert_eq!(personal.medical.medications, vec!["Inhaler"]);
        assert!(personal.medical.conditions.is_empty());
        assert_eq!(personal.medical.blood_type, "O+");
        assert_eq!(personal.medical.doctor_name, "Dr. Patel");
        assert_eq!(personal.medical.doctor_phone, "555-222-3333");
        assert_eq!(registration.parents.primary.address.city, "Springfield");
        assert!(registration.parents.custody.is_none());
        assert_eq!(registration.emergency.len(), 1);
        assert!(registration.emergency.contacts[0].authorized_for_pickup);
        assert!(registration.documents.is_complete());
    }

    #[test]
    fn test_unrecognised_choice_is_asked_again() {
        let personal = format!(
            "\nEmma\nJohnson\n2019-05-12\n\nx\nm\ngraduated\nwaitlist\n{}",
            blank(8)
        );
        let parents = PARENTS.replace("\nno\n\n", "\nperhaps\nno\nshared\nsole\n\n\n");
        let script = format!("{}{}{}{}", personal, parents, EMERGENCY, DOCUMENTS);
        let mut output = Vec::new();
        let outcome = RegistrationSession::new(
            Cursor::new(script.into_bytes()),
            &mut output,
            standard_requirements(),
        )
        .run(RegistrationWizard::new().unwrap())
        .unwrap();

        let SessionOutcome::Completed(registration) = outcome else {
            panic!("expected a completed registration");
        };
        assert_eq!(registration.personal.gender, Gender::Male);
        assert_eq!(registration.personal.status, EnrollmentStatus::Waitlist);
        let custody = registration.parents.custody.unwrap();
        assert_eq!(custody.custody_type, CustodyType::Sole);
        assert!(!custody.documents_on_file);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Invalid gender: 'x'"));
        assert!(text.contains("Invalid status: 'graduated'"));
        assert!(text.contains("Invalid answer: 'perhaps'"));
        assert!(text.contains("Invalid custody arrangement: 'shared'"));
    }

    #[test]
    fn test_invalid_step_stays_put() {
        // Too-short first name is rejected, then the user quits
        let script = format!("\nE\nJohnson\n2019-05-12\n{}quit\n", blank(11));
        let mut output = Vec::new();
        let outcome = RegistrationSession::new(
            Cursor::new(script.into_bytes()),
            &mut output,
            standard_requirements(),
        )
        .run(RegistrationWizard::new().unwrap())
        .unwrap();

        assert!(matches!(outcome, SessionOutcome::Cancelled));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Error:"));
        assert!(text.contains("Registration cancelled."));
    }

    #[test]
    fn test_locked_goto_is_reported() {
        let script = "goto 3\n";
        let mut output = Vec::new();
        let outcome = RegistrationSession::new(
            Cursor::new(script.as_bytes().to_vec()),
            &mut output,
            standard_requirements(),
        )
        .run(RegistrationWizard::new().unwrap())
        .unwrap();

        // Input ends after the command
        assert!(matches!(outcome, SessionOutcome::Cancelled));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Step 3 is not available yet."));
    }

    #[test]
    fn test_missing_documents_block_completion() {
        let script = format!("{}{}{}\n\n\n\n\n\n", PERSONAL, PARENTS, EMERGENCY);
        let mut output = Vec::new();
        let outcome = RegistrationSession::new(
            Cursor::new(script.into_bytes()),
            &mut output,
            standard_requirements(),
        )
        .run(RegistrationWizard::new().unwrap())
        .unwrap();

        assert!(matches!(outcome, SessionOutcome::Cancelled));
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("[Missing] Birth Certificate"));
    }

    #[test]
    fn test_back_then_resubmit_keeps_later_steps() {
        // Complete three steps, go back to personal and change the name,
        // then jump to the emergency step, keep it and finish
        let edit = format!("back\nback\nback\n\nEmily\n{}", blank(13));
        let script = format!(
            "{}{}{}{}goto 3\n\n\n\n{}",
            PERSONAL, PARENTS, EMERGENCY, edit, DOCUMENTS
        );
        let outcome = session(&script)
            .run(RegistrationWizard::new().unwrap())
            .unwrap();

        let SessionOutcome::Completed(registration) = outcome else {
            panic!("expected a completed registration");
        };
        assert_eq!(registration.personal.first_name, "Emily");
        assert_eq!(registration.personal.classroom.as_deref(), Some("Sunflowers"));
        assert_eq!(registration.parents.primary.first_name, "Sarah");
    }

    #[test]
    fn test_edit_keeps_custody_details() {
        let mut child = registration("Emma", "Johnson").into_child();
        child.custody = Some(CustodyArrangement {
            custody_type: CustodyType::Joint,
            documents_on_file: true,
            notes: "Court order 2023-17".into(),
        });

        // Accept every default
        let edited = run_edit(&child, &blank(60));
        assert_eq!(edited.parents.custody, child.custody);

        // Change only the notes
        let script = format!(
            "{}{}Court order 2024-02\n{}",
            blank(KEEP_PERSONAL),
            blank(KEEP_PARENTS + 1),
            blank(20)
        );
        let custody = run_edit(&child, &script).parents.custody.unwrap();
        assert_eq!(custody.custody_type, CustodyType::Joint);
        assert!(custody.documents_on_file);
        assert_eq!(custody.notes, "Court order 2024-02");
    }

    #[test]
    fn test_edit_and_remove_single_contacts() {
        let mut child = registration("Emma", "Johnson").into_child();
        let robert = child.emergency_contacts[0].id;
        child
            .emergency_contacts
            .push(EmergencyContact::new("Mary Smith", "Grandmother", "555-987-6543"));

        // Edit Robert's phone and pickup flag, remove Mary
        let script = format!(
            "{}{}\nedit\n\n\n555-000-1111\nyes\nremove\n\n{}",
            blank(KEEP_PERSONAL),
            blank(KEEP_PARENTS),
            blank(6)
        );
        let edited = run_edit(&child, &script);

        assert_eq!(edited.emergency.len(), 1);
        let contact = &edited.emergency.contacts[0];
        assert_eq!(contact.id, robert);
        assert_eq!(contact.name, "Robert Smith");
        assert_eq!(contact.relationship, "Grandfather");
        assert_eq!(contact.phone, "555-000-1111");
        assert!(contact.authorized_for_pickup);
    }

    #[test]
    fn test_edit_clears_optional_fields() {
        let mut reg = registration("Emma", "Johnson");
        reg.personal.classroom = Some("Sunflowers".into());
        reg.personal.medical.allergies = vec!["Peanuts".into()];
        let mut father = Guardian::new("David", "Johnson", "Father");
        father.email = "david@example.com".into();
        reg.parents = reg.parents.with_secondary(father, true);
        let child = reg.into_child();

        // Classroom and allergies, then the second guardian's email
        let personal = format!("\n{}-\n\n-\n{}", blank(6), blank(5));
        let parents = format!("\n{}\n\n\n\n\n-\n\n\n", blank(9));
        let script = format!("{}{}{}", personal, parents, blank(20));
        let edited = run_edit(&child, &script);

        assert!(edited.personal.classroom.is_none());
        assert!(edited.personal.medical.allergies.is_empty());
        let second = edited.parents.secondary.unwrap();
        assert_eq!(second.first_name, "David");
        assert!(second.email.is_empty());
    }
}
