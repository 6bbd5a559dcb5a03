//! Path management
//!
//! Provides XDG-compliant path resolution for configuration, data and the
//! audit log.
//!
//! ## Path Resolution Order
//!
//! 1. `CHILDCARE_CLI_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/childcare-cli` or `~/.config/childcare-cli`
//! 3. Windows: `%APPDATA%\childcare-cli`

use std::path::PathBuf;

use crate::error::CareError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "CHILDCARE_CLI_DATA_DIR";

/// Manages all paths used by the tool
#[derive(Debug, Clone)]
pub struct CarePaths {
    base_dir: PathBuf,
}

impl CarePaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home or config directory can be determined.
    pub fn new() -> Result<Self, CareError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the JSON data files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn children_file(&self) -> PathBuf {
        self.data_dir().join("children.json")
    }

    pub fn invoices_file(&self) -> PathBuf {
        self.data_dir().join("invoices.json")
    }

    pub fn payments_file(&self) -> PathBuf {
        self.data_dir().join("payments.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), CareError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| CareError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| CareError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Whether `init` has been run (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CareError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME").map_err(|_| {
                CareError::Config("Could not determine HOME directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("childcare-cli"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CareError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| CareError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("childcare-cli"))
}
