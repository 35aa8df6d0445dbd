//! Configuration: credentials from the environment and default file paths.

use std::path::PathBuf;

use crate::error::{MileageError, Result};

/// Default data directory name
const DATA_DIR_NAME: &str = "mileage";

/// Garmin Connect credentials, read from the environment
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from `GARMIN_EMAIL` / `GARMIN_PASSWORD`
    pub fn from_env() -> Result<Self> {
        let email = std::env::var("GARMIN_EMAIL")
            .map_err(|_| MileageError::config("GARMIN_EMAIL must be set"))?;
        let password = std::env::var("GARMIN_PASSWORD")
            .map_err(|_| MileageError::config("GARMIN_PASSWORD must be set"))?;
        Ok(Self { email, password })
    }
}

/// Get the data directory path
/// Returns ~/.local/share/mileage on Unix, ~/Library/Application Support/mileage on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_local_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| MileageError::config("Could not determine data directory"))
}

/// Get the default activity database path
pub fn default_db_path() -> Result<PathBuf> {
    data_dir().map(|p| p.join("activities.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
