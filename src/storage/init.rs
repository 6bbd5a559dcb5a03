//! First-run setup

use crate::config::{CarePaths, Settings};
use crate::error::CareError;

use super::file_io::write_json_atomic;

/// Create the directory layout, a settings file and empty data files
///
/// Existing files are left untouched, so running this twice is harmless.
/// Returns `true` when the settings file was newly written.
pub fn initialize_storage(paths: &CarePaths, settings: &Settings) -> Result<bool, CareError> {
    paths.ensure_directories()?;

    let empty = [
        (paths.children_file(), "children"),
        (paths.invoices_file(), "invoices"),
        (paths.payments_file(), "payments"),
    ];
    for (file, key) in empty {
        if !file.exists() {
            let mut body = serde_json::Map::new();
            body.insert(key.to_string(), serde_json::Value::Array(Vec::new()));
            write_json_atomic(&file, &body)?;
        }
    }

    if paths.is_initialized() {
        return Ok(false);
    }
    settings.save(paths)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CarePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(initialize_storage(&paths, &Settings::default()).unwrap());
        assert!(paths.children_file().exists());
        assert!(paths.invoices_file().exists());
        assert!(paths.payments_file().exists());
        assert!(paths.settings_file().exists());

        assert!(!initialize_storage(&paths, &Settings::default()).unwrap());
    }
}
