//! Get command: print the stored animation preference.

use anyhow::Result;
use serde_json::json;

use crate::config::{Config, get_custom_config_dir};
use crate::preference::{FileStore, PreferenceStore, load_preference};

/// Handle the get command.
///
/// JSON output stays clean: no header, just the object.
pub fn handle_get_command(json: bool, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let key = config.storage_key();
    let store = FileStore::open_default(get_custom_config_dir().as_deref(), debug_enabled)?;

    let raw = store.get(key)?;
    let preference = load_preference(&store, key);

    if json {
        let output = json!({
            "key": key,
            "preference": preference,
            "raw": raw,
            "store": store.dir().display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    log_version!();
    match preference {
        Some(preference) => log_block_start!("Stored preference: {}", preference),
        None => log_block_start!("No stored preference (snowfall starts by default in winter)"),
    }
    if debug_enabled {
        log_indented!("Key: {}", key);
        log_indented!("Store: {}", store.dir().display());
    }
    log_end!();

    Ok(())
}
