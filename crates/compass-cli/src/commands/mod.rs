pub mod commit;
pub mod config;
pub mod render;
pub mod show;
pub mod status;

use compass_core::storage::{data_dir, JsonFileStore};
use compass_core::Compass;

/// Open the compass in the configured data directory.
pub fn open_compass() -> Result<Compass<JsonFileStore>, Box<dyn std::error::Error>> {
    let dir = data_dir()?;
    Ok(Compass::open(&dir)?)
}
