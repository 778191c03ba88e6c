mod config;
pub mod database;

pub use config::{Config, NotificationsConfig};
pub use database::{Database, FocusRecord, FocusStats, FocusWindowStats};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the directory holding `config.toml` and the focus ledger.
///
/// `FOCUSCYCLE_DATA_DIR` wins when set. Otherwise `~/.config/focuscycle/`,
/// or `~/.config/focuscycle-dev/` when `FOCUSCYCLE_ENV=dev`.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSCYCLE_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focuscycle-dev")
            } else {
                base_dir.join("focuscycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
