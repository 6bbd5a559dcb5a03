//! User settings
//!
//! Facility-wide preferences: display options, billing defaults, logging and
//! the enrollment document checklist.

use serde::{Deserialize, Serialize};

use super::paths::CarePaths;
use crate::error::CareError;
use crate::models::document::{standard_requirements, DocumentRequirement};

/// Persistent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Name shown in headers and exports
    #[serde(default = "default_facility_name")]
    pub facility_name: String,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Days between an invoice's issue date and its default due date
    #[serde(default = "default_invoice_due_days")]
    pub invoice_due_days: u32,

    /// Default log filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Paperwork collected by the documents step
    #[serde(default = "standard_requirements")]
    pub document_requirements: Vec<DocumentRequirement>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_facility_name() -> String {
    "Child Care Center".to_string()
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_invoice_due_days() -> u32 {
    14
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            facility_name: default_facility_name(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            invoice_due_days: default_invoice_due_days(),
            log_level: default_log_level(),
            document_requirements: standard_requirements(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &CarePaths) -> Result<Self, CareError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| CareError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| CareError::Config(format!("Failed to parse settings file: {}", e)))?;

            Ok(settings)
        } else {
            // Not saved until the caller decides to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CarePaths) -> Result<(), CareError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CareError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CareError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Format a date with the configured pattern
    pub fn format_date(&self, date: chrono::NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.invoice_due_days, 14);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.document_requirements.len(), 5);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CarePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.facility_name = "Little Sprouts".into();
        settings.invoice_due_days = 30;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.facility_name, "Little Sprouts");
        assert_eq!(loaded.invoice_due_days, 30);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"facility_name":"Tiny Steps"}"#).unwrap();
        assert_eq!(settings.facility_name, "Tiny Steps");
        assert_eq!(settings.currency_symbol, "$");
        assert_eq!(settings.document_requirements.len(), 5);
    }
}
