mod config;
pub mod state_store;

pub use config::{Config, GateConfig, MessagesConfig, Poles, StoreConfig, CONFIG_FILE};
pub use state_store::{load_or_default, JsonFileStore, MemoryStore, StateStore, STATE_FILE};

use std::path::PathBuf;

/// Returns the data directory.
///
/// `COMPASS_DATA_DIR` wins when set. Otherwise this is
/// `~/.config/daily-compass[-dev]/`, with the `-dev` suffix when
/// `COMPASS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("COMPASS_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("COMPASS_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("daily-compass-dev")
            } else {
                base_dir.join("daily-compass")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
