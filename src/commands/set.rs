//! Set command: store the animation preference.
//!
//! Writes through the same file store a running controller watches, so every
//! running instance picks the new value up and applies it.

use anyhow::{Context, Result};

use crate::config::{Config, get_custom_config_dir};
use crate::preference::{FileStore, Preference, save_preference};

pub fn handle_set_command(preference: Preference, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let key = config.storage_key();
    let mut store = FileStore::open_default(get_custom_config_dir().as_deref(), debug_enabled)?;

    save_preference(&mut store, key, preference)
        .with_context(|| format!("Failed to store preference '{preference}'"))?;

    log_version!();
    log_block_start!("Stored preference: {}", preference);
    if debug_enabled {
        log_indented!("Key: {}", key);
        log_indented!("Store: {}", store.dir().display());
    }
    log_end!();

    Ok(())
}
