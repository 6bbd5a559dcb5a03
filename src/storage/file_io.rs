//! JSON file helpers
//!
//! Data files are replaced atomically: the new content goes to a sibling
//! `.tmp` file, is synced, then renamed over the original.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CareError;

fn storage_err(action: &str, path: &Path, e: impl std::fmt::Display) -> CareError {
    CareError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
}

/// Read a JSON file, or `T::default()` when it does not exist yet
pub fn read_json<T, P>(path: P) -> Result<T, CareError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path).map_err(|e| storage_err("open", path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_err("parse", path, e))
}

/// Replace a JSON file atomically, creating parent directories as needed
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CareError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_err("create directory", parent, e))?;
    }

    // Must live in the same directory for rename to be atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path).map_err(|e| storage_err("create", &temp_path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_err("serialize", path, e))?;
    writer.flush().map_err(|e| storage_err("flush", &temp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_err("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        storage_err("replace", path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Default, Serialize, Deserialize)]
    struct Roster {
        names: Vec<String>,
    }

    fn roster() -> Roster {
        Roster {
            names: vec!["Emma".into(), "Liam".into()],
        }
    }

    #[test]
    fn test_missing_file_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Roster = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(loaded, Roster::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data").join("roster.json");

        write_json_atomic(&path, &roster()).unwrap();

        let loaded: Roster = read_json(&path).unwrap();
        assert_eq!(loaded, roster());
        assert!(!temp_dir.path().join("data").join("roster.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.json");
        fs::write(&path, "not json").unwrap();

        let result: Result<Roster, _> = read_json(&path);
        assert!(matches!(result, Err(CareError::Storage(_))));
    }
}
