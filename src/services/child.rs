//! Child directory service
//!
//! Registers children from completed registration wizards and maintains the
//! directory: search, status changes, classroom assignment and statistics.

use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{CareError, CareResult};
use crate::models::{Child, ChildId, EnrollmentStatus};
use crate::storage::Storage;
use crate::wizard::Registration;

/// Which classroom assignments a listing includes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClassroomFilter {
    #[default]
    Any,
    Unassigned,
    Named(String),
}

impl ClassroomFilter {
    /// Parse a CLI value: `any`, `unassigned`/`none`, or a room name
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Self::Any,
            "unassigned" | "none" => Self::Unassigned,
            _ => Self::Named(s.trim().to_string()),
        }
    }

    fn matches(&self, classroom: Option<&str>) -> bool {
        match (self, classroom) {
            (Self::Any, _) => true,
            (Self::Unassigned, room) => room.is_none(),
            (Self::Named(wanted), Some(room)) => wanted.eq_ignore_ascii_case(room),
            (Self::Named(_), None) => false,
        }
    }
}

/// Directory filter; every set criterion must match
#[derive(Debug, Clone, Default)]
pub struct ChildFilter {
    /// Case-insensitive substring of first, last or primary guardian name
    pub search: Option<String>,
    pub status: Option<EnrollmentStatus>,
    pub classroom: ClassroomFilter,
}

impl ChildFilter {
    pub fn matches(&self, child: &Child) -> bool {
        if let Some(status) = self.status {
            if child.status != status {
                return false;
            }
        }

        if !self.classroom.matches(child.classroom.as_deref()) {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                child.first_name.to_lowercase().contains(&term)
                    || child.last_name.to_lowercase().contains(&term)
                    || child.primary_guardian_name().to_lowercase().contains(&term)
            }
        }
    }
}

/// Counts by enrollment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChildStats {
    pub total: usize,
    pub active: usize,
    pub waitlist: usize,
    pub inactive: usize,
}

/// Service for the child directory
pub struct ChildService<'a> {
    storage: &'a Storage,
}

impl<'a> ChildService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a child from a finished registration
    pub fn register(&self, registration: Registration) -> CareResult<Child> {
        let child = registration.into_child();
        child
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;

        let duplicate = self
            .storage
            .children
            .get_by_name(&child.full_name())?
            .into_iter()
            .any(|c| c.date_of_birth == child.date_of_birth);
        if duplicate {
            return Err(CareError::Duplicate {
                entity_type: "Child",
                identifier: child.full_name(),
            });
        }

        self.storage.children.upsert(child.clone())?;
        self.storage.children.save()?;

        self.storage.log_create(
            EntityType::Child,
            child.id.to_string(),
            Some(child.full_name()),
            &child,
        )?;

        info!(child = %child.full_name(), id = %child.id, "Registered child");
        Ok(child)
    }

    /// Replace a child's record with an edited registration
    pub fn update(&self, id: ChildId, registration: Registration) -> CareResult<Child> {
        let before = self
            .storage
            .children
            .get(id)?
            .ok_or_else(|| CareError::child_not_found(id.to_string()))?;

        let mut child = before.clone();
        registration.apply_to(&mut child);
        child
            .validate()
            .map_err(|e| CareError::Validation(e.to_string()))?;

        self.save_change(&before, child)
    }

    pub fn get(&self, id: ChildId) -> CareResult<Option<Child>> {
        self.storage.children.get(id)
    }

    /// Find a child by full name, full ID, or ID prefix
    pub fn find(&self, identifier: &str) -> CareResult<Option<Child>> {
        if let Ok(id) = identifier.trim().parse::<ChildId>() {
            return self.storage.children.get(id);
        }

        let mut by_name = self.storage.children.get_by_name(identifier)?;
        match by_name.len() {
            0 => {}
            1 => return Ok(by_name.pop()),
            n => {
                return Err(CareError::Validation(format!(
                    "{} children are named '{}'; use the ID instead",
                    n,
                    identifier.trim()
                )))
            }
        }

        let mut by_id: Vec<_> = self
            .storage
            .children
            .get_all()?
            .into_iter()
            .filter(|c| c.id.matches(identifier))
            .collect();
        if by_id.len() > 1 {
            return Err(CareError::Validation(format!(
                "ID prefix '{}' is ambiguous",
                identifier.trim()
            )));
        }
        Ok(by_id.pop())
    }

    /// Like `find`, but a missing child is an error
    pub fn require(&self, identifier: &str) -> CareResult<Child> {
        self.find(identifier)?
            .ok_or_else(|| CareError::child_not_found(identifier.trim()))
    }

    /// Children matching the filter, ordered by name
    pub fn list(&self, filter: &ChildFilter) -> CareResult<Vec<Child>> {
        let children: Vec<_> = self
            .storage
            .children
            .get_all()?
            .into_iter()
            .filter(|c| filter.matches(c))
            .collect();
        debug!(count = children.len(), "Listed children");
        Ok(children)
    }

    /// Distinct classroom names in use, sorted
    pub fn classrooms(&self) -> CareResult<Vec<String>> {
        let mut rooms: Vec<String> = self
            .storage
            .children
            .get_all()?
            .into_iter()
            .filter_map(|c| c.classroom)
            .collect();
        rooms.sort_by_key(|r| r.to_lowercase());
        rooms.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
        Ok(rooms)
    }

    pub fn set_status(&self, id: ChildId, status: EnrollmentStatus) -> CareResult<Child> {
        let before = self
            .storage
            .children
            .get(id)?
            .ok_or_else(|| CareError::child_not_found(id.to_string()))?;

        let mut child = before.clone();
        child.set_status(status);
        self.save_change(&before, child)
    }

    /// Assign a classroom, or clear it with `None`
    pub fn assign_classroom(&self, id: ChildId, classroom: Option<&str>) -> CareResult<Child> {
        let classroom = match classroom.map(str::trim) {
            Some("") => {
                return Err(CareError::Validation(
                    "Classroom name cannot be empty".into(),
                ))
            }
            other => other.map(str::to_string),
        };

        let before = self
            .storage
            .children
            .get(id)?
            .ok_or_else(|| CareError::child_not_found(id.to_string()))?;

        let mut child = before.clone();
        child.set_classroom(classroom);
        self.save_change(&before, child)
    }

    /// Mark one of the child's uploaded documents as checked by staff
    pub fn verify_document(&self, id: ChildId, document: &str) -> CareResult<Child> {
        let before = self
            .storage
            .children
            .get(id)?
            .ok_or_else(|| CareError::child_not_found(id.to_string()))?;

        let status = before
            .documents
            .find(document)
            .map(|d| d.status)
            .ok_or_else(|| CareError::NotFound {
                entity_type: "Document",
                identifier: document.trim().to_string(),
            })?;

        let mut child = before.clone();
        if !child.documents.verify(document) {
            return Err(CareError::Validation(format!(
                "'{}' cannot be verified while it is {}",
                document.trim(),
                status
            )));
        }
        self.save_change(&before, child)
    }

    /// Remove a child; refused while the child has outstanding invoices
    pub fn delete(&self, id: ChildId) -> CareResult<Child> {
        let child = self
            .storage
            .children
            .get(id)?
            .ok_or_else(|| CareError::child_not_found(id.to_string()))?;

        let outstanding = self
            .storage
            .invoices
            .get_by_child(id)?
            .iter()
            .filter(|inv| inv.status.is_outstanding())
            .count();
        if outstanding > 0 {
            return Err(CareError::Billing(format!(
                "{} has {} outstanding invoice(s)",
                child.full_name(),
                outstanding
            )));
        }

        self.storage.children.delete(id)?;
        self.storage.children.save()?;
        self.storage.log_delete(
            EntityType::Child,
            id.to_string(),
            Some(child.full_name()),
            &child,
        )?;

        info!(child = %child.full_name(), "Deleted child");
        Ok(child)
    }

    pub fn stats(&self) -> CareResult<ChildStats> {
        let children = self.storage.children.get_all()?;
        let count = |status| children.iter().filter(|c| c.status == status).count();

        Ok(ChildStats {
            total: children.len(),
            active: count(EnrollmentStatus::Active),
            waitlist: count(EnrollmentStatus::Waitlist),
            inactive: count(EnrollmentStatus::Inactive),
        })
    }

    fn save_change(&self, before: &Child, after: Child) -> CareResult<Child> {
        self.storage.children.upsert(after.clone())?;
        self.storage.children.save()?;
        self.storage.log_update(
            EntityType::Child,
            after.id.to_string(),
            Some(after.full_name()),
            before,
            &after,
        )?;

        debug!(child = %after.full_name(), "Updated child");
        Ok(after)
    }
}
