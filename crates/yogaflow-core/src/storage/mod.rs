mod config;
pub mod database;
pub mod kv;

pub use config::{MoodCheckConfig, PracticeConfig, Preferences};
pub use database::Database;
pub use kv::{load_or_default, persist, KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns the data directory, creating it if needed.
///
/// `YOGAFLOW_DATA_DIR` wins when set. Otherwise `~/.config/yogaflow[-dev]/`
/// based on `YOGAFLOW_ENV` (set it to `dev` for a development directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("YOGAFLOW_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("YOGAFLOW_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("yogaflow-dev")
            } else {
                base_dir.join("yogaflow")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
