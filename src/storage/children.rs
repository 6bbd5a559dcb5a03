//! Child repository backed by `children.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CareError;
use crate::models::{Child, ChildId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Default, Serialize, Deserialize)]
struct ChildData {
    children: Vec<Child>,
}

fn sort_by_name(children: &mut [Child]) {
    children.sort_by(|a, b| {
        (a.last_name.to_lowercase(), a.first_name.to_lowercase())
            .cmp(&(b.last_name.to_lowercase(), b.first_name.to_lowercase()))
    });
}

/// In-memory index of enrolled children
pub struct ChildRepository {
    path: PathBuf,
    data: RwLock<HashMap<ChildId, Child>>,
}

impl ChildRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CareError> {
        let file_data: ChildData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for child in file_data.children {
            data.insert(child.id, child);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut children: Vec<_> = data.values().cloned().collect();
        sort_by_name(&mut children);

        write_json_atomic(&self.path, &ChildData { children })
    }

    pub fn get(&self, id: ChildId) -> Result<Option<Child>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// All children ordered by last name, then first name
    pub fn get_all(&self) -> Result<Vec<Child>, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut children: Vec<_> = data.values().cloned().collect();
        sort_by_name(&mut children);
        Ok(children)
    }

    /// Children whose full name matches exactly (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> Result<Vec<Child>, CareError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|c| c.full_name().to_lowercase() == wanted)
            .collect())
    }

    pub fn upsert(&self, child: Child) -> Result<(), CareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.insert(child.id, child);
        Ok(())
    }

    /// Remove a child, returning the removed record
    pub fn delete(&self, id: ChildId) -> Result<Option<Child>, CareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(&id))
    }

    pub fn count(&self) -> Result<usize, CareError> {
        let data = self
            .data
            .read()
            .map_err(|e| CareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PersonalDetails;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn child(first: &str, last: &str) -> Child {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        Child::new(PersonalDetails::new(first, last, date, date))
    }

    fn create_test_repo() -> (TempDir, ChildRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ChildRepository::new(temp_dir.path().join("children.json"));
        repo.load().unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_get_all_sorted_by_last_name() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(child("Noah", "Williams")).unwrap();
        repo.upsert(child("Emma", "Johnson")).unwrap();
        repo.upsert(child("Olivia", "Brown")).unwrap();

        let names: Vec<_> = repo
            .get_all()
            .unwrap()
            .iter()
            .map(|c| c.last_name.clone())
            .collect();
        assert_eq!(names, vec!["Brown", "Johnson", "Williams"]);
    }

    #[test]
    fn test_get_by_name_case_insensitive() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(child("Emma", "Johnson")).unwrap();

        assert_eq!(repo.get_by_name("emma johnson").unwrap().len(), 1);
        assert!(repo.get_by_name("Emma").unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let emma = child("Emma", "Johnson");
        let id = emma.id;
        repo.upsert(emma).unwrap();
        repo.save().unwrap();

        let reloaded = ChildRepository::new(temp_dir.path().join("children.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(id).unwrap().unwrap().first_name, "Emma");
    }

    #[test]
    fn test_delete_returns_record() {
        let (_temp_dir, repo) = create_test_repo();
        let emma = child("Emma", "Johnson");
        let id = emma.id;
        repo.upsert(emma).unwrap();

        assert!(repo.delete(id).unwrap().is_some());
        assert!(repo.delete(id).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 0);
    }
}
