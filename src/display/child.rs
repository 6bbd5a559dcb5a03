//! Child directory display formatting

use chrono::NaiveDate;

use crate::models::{Child, DocumentStatus};
use crate::services::ChildStats;

use super::truncate;

/// Format the directory as a table
pub fn format_child_list(children: &[Child], today: NaiveDate) -> String {
    if children.is_empty() {
        return "No children found.".to_string();
    }

    let name_width = children
        .iter()
        .map(|c| c.full_name().len())
        .max()
        .unwrap_or(4)
        .clamp(4, 28);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<name_width$}  {:>3}  {:<9}  {:<14}  {}\n",
        "ID",
        "Name",
        "Age",
        "Status",
        "Classroom",
        "Guardian",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<name_width$}  {:->3}  {:-<9}  {:-<14}  {:-<20}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for child in children {
        let alert = if child.medical.has_alerts() { " !" } else { "" };
        output.push_str(&format!(
            "{:<12}  {:<name_width$}  {:>3}  {:<9}  {:<14}  {}{}\n",
            child.id.to_string(),
            truncate(&child.full_name(), name_width),
            child.age_on(today),
            child.status.to_string(),
            truncate(child.classroom.as_deref().unwrap_or("-"), 14),
            child.primary_guardian_name(),
            alert,
            name_width = name_width,
        ));
    }

    output.push_str(&format!("\n{} child(ren)", children.len()));
    output
}

/// Format the full record of one child
pub fn format_child_details(child: &Child, today: NaiveDate) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", child.full_name()));
    output.push_str(&format!("{}\n", "=".repeat(child.full_name().len())));
    output.push_str(&format!("ID:          {}\n", child.id));
    output.push_str(&format!(
        "Born:        {} (age {})\n",
        child.date_of_birth,
        child.age_on(today)
    ));
    output.push_str(&format!("Gender:      {}\n", child.gender));
    output.push_str(&format!("Status:      {}\n", child.status));
    output.push_str(&format!("Enrolled:    {}\n", child.enrollment_date));
    output.push_str(&format!(
        "Classroom:   {}\n",
        child.classroom.as_deref().unwrap_or("(unassigned)")
    ));
    if !child.address.is_empty() {
        output.push_str(&format!("Address:     {}\n", child.address));
    }

    let medical = &child.medical;
    if medical.has_alerts() || !medical.blood_type.is_empty() || !medical.doctor_name.is_empty() {
        output.push_str("\nMedical\n");
        for (label, values) in [
            ("Allergies", &medical.allergies),
            ("Medications", &medical.medications),
            ("Conditions", &medical.conditions),
        ] {
            if !values.is_empty() {
                output.push_str(&format!("  {:<12} {}\n", label, values.join(", ")));
            }
        }
        if !medical.blood_type.is_empty() {
            output.push_str(&format!("  {:<12} {}\n", "Blood type", medical.blood_type));
        }
        if !medical.doctor_name.is_empty() {
            output.push_str(&format!(
                "  {:<12} {} {}\n",
                "Doctor", medical.doctor_name, medical.doctor_phone
            ));
        }
    }

    output.push_str("\nGuardians\n");
    if child.guardians.is_empty() {
        output.push_str("  (none)\n");
    }
    for guardian in &child.guardians {
        output.push_str(&format!(
            "  {} ({})  {}  {}\n",
            guardian.full_name(),
            guardian.relationship,
            guardian.phone,
            guardian.email
        ));
    }
    if let Some(custody) = &child.custody {
        output.push_str(&format!("  Custody: {}", custody.custody_type));
        if custody.documents_on_file {
            output.push_str(" (court documents on file)");
        }
        if !custody.notes.is_empty() {
            output.push_str(&format!(", {}", custody.notes));
        }
        output.push('\n');
    }

    output.push_str("\nEmergency contacts\n");
    if child.emergency_contacts.is_empty() {
        output.push_str("  (none)\n");
    }
    for contact in &child.emergency_contacts {
        let pickup = if contact.authorized_for_pickup {
            "  [pickup]"
        } else {
            ""
        };
        output.push_str(&format!(
            "  {} ({})  {}{}\n",
            contact.name, contact.relationship, contact.phone, pickup
        ));
    }

    output.push_str("\nDocuments\n");
    for doc in &child.documents.documents {
        let mark = match doc.status {
            DocumentStatus::Verified => "✓",
            DocumentStatus::Uploaded => "+",
            DocumentStatus::Error => "!",
            DocumentStatus::Pending => " ",
        };
        let required = if doc.required { "*" } else { " " };
        output.push_str(&format!(
            "  [{}] {}{} {}\n",
            mark,
            doc.name,
            required,
            doc.file_name.as_deref().unwrap_or("")
        ));
    }

    output
}

pub fn format_child_stats(stats: &ChildStats) -> String {
    format!(
        "Total:     {}\nActive:    {}\nWaitlist:  {}\nInactive:  {}",
        stats.total, stats.active, stats.waitlist, stats.inactive
    )
}
