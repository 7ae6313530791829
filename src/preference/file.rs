//! File-backed preference store, following XDG Base Directory standards.
//!
//! Each key is one small file in the state directory
//! (`$XDG_STATE_HOME/snowfall/<namespace>/<key>`), so every process using the
//! same namespace shares the same preferences. Writes go to a temporary file
//! that is renamed over the key file while holding an exclusive `fs2` lock,
//! which keeps each key atomic for readers and serializes concurrent writers.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::watcher::PreferenceWatcher;
use super::{PreferenceStore, StorageListener};
use crate::constants::APP_DIR_NAME;

const LOCK_FILE_NAME: &str = ".lock";

/// Last value each key was seen with, shared with the watcher thread.
pub(crate) type SeenValues = Arc<Mutex<HashMap<String, Option<String>>>>;

/// Get the state directory for a given configuration directory.
///
/// State is stored in `XDG_STATE_HOME/snowfall/{namespace}` where namespace is:
/// - "default" for the default config directory
/// - "custom_<hash>" for custom config directories (via --config)
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join(APP_DIR_NAME);
            if path == default_config {
                "default".to_string()
            } else {
                state_namespace(path)
            }
        }
    };

    Ok(state_home.join(APP_DIR_NAME).join(namespace))
}

/// Stable namespace for a custom config directory.
fn state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

/// Keys become file names, so they must not contain path syntax.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('.')
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        anyhow::bail!(
            "storage key '{}' must be non-empty, must not start with '.', and may only contain letters, digits, '_', '-' and '.'",
            key
        );
    }
    Ok(())
}

pub struct FileStore {
    dir: PathBuf,
    seen: SeenValues,
    watcher: Option<PreferenceWatcher>,
    debug_enabled: bool,
}

impl FileStore {
    /// Open (and create if needed) the store in `dir`.
    pub fn open(dir: impl Into<PathBuf>, debug_enabled: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create state directory {}", dir.display()))?;

        Ok(Self {
            dir,
            seen: Arc::new(Mutex::new(HashMap::new())),
            watcher: None,
            debug_enabled,
        })
    }

    /// Open the store for the active config directory.
    pub fn open_default(config_dir: Option<&Path>, debug_enabled: bool) -> Result<Self> {
        Self::open(get_state_dir(config_dir)?, debug_enabled)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }

    fn lock_file(&self) -> Result<File> {
        let path = self.dir.join(LOCK_FILE_NAME);
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to open lock file {}", path.display()))
    }

    fn remember(&self, key: &str, value: Option<String>) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(key.to_string(), value);
        }
    }

    fn last_seen(&self, key: &str) -> Option<Option<String>> {
        self.seen.lock().ok().and_then(|seen| seen.get(key).cloned())
    }

    /// Undo a [`Self::remember`] for a write that never happened.
    fn forget(&self, key: &str, previous: Option<Option<String>>) {
        if let Ok(mut seen) = self.seen.lock() {
            match previous {
                Some(value) => seen.insert(key.to_string(), value),
                None => seen.remove(key),
            };
        }
    }
}

/// Read a key file. Missing or empty files mean "no value".
pub(crate) fn read_value(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let value = content.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        let lock = self.lock_file()?;
        lock.lock_shared().context("Failed to lock preference store")?;
        let value = read_value(&path);
        let _ = FileExt::unlock(&lock);
        value
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let lock = self.lock_file()?;
        lock.lock_exclusive()
            .context("Failed to lock preference store")?;

        // Record before the rename so the watcher recognizes our own write
        let previous = self.last_seen(key);
        self.remember(key, Some(value.to_string()));

        let result = (|| -> Result<()> {
            let mut temp = tempfile::Builder::new()
                .prefix(".tmp-")
                .tempfile_in(&self.dir)
                .context("Failed to create temporary preference file")?;
            writeln!(temp, "{value}")?;
            temp.flush()?;
            temp.persist(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(())
        })();

        if result.is_err() {
            self.forget(key, previous);
        }

        let _ = FileExt::unlock(&lock);
        result
    }

    fn subscribe(&mut self, listener: StorageListener) -> Result<()> {
        if self.watcher.is_some() {
            anyhow::bail!("Preference store already has a subscriber");
        }

        // Snapshot current values so only real changes are reported
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                if validate_key(&name).is_ok() {
                    let value = read_value(&entry.path()).unwrap_or(None);
                    self.remember(&name, value);
                }
            }
        }

        let watcher = PreferenceWatcher::start(
            self.dir.clone(),
            Arc::clone(&self.seen),
            listener,
            self.debug_enabled,
        )?;
        self.watcher = Some(watcher);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path(), false).unwrap();
        assert_eq!(store.get("snow").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), false).unwrap();
        store.set("snow", "snowfall").unwrap();
        assert_eq!(store.get("snow").unwrap().as_deref(), Some("snowfall"));

        store.set("snow", "none").unwrap();
        assert_eq!(store.get("snow").unwrap().as_deref(), Some("none"));

        // No temporary files left behind
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_two_handles_share_values() {
        let dir = tempdir().unwrap();
        let mut first = FileStore::open(dir.path(), false).unwrap();
        let second = FileStore::open(dir.path(), false).unwrap();
        first.set("snow", "none").unwrap();
        assert_eq!(second.get("snow").unwrap().as_deref(), Some("none"));
    }

    #[test]
    fn test_empty_file_is_no_value() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("snow"), "\n").unwrap();
        let store = FileStore::open(dir.path(), false).unwrap();
        assert_eq!(store.get("snow").unwrap(), None);
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        assert!(validate_key("snow").is_ok());
        assert!(validate_key("snow-v2.pref").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key(".lock").is_err());
        assert!(validate_key("../escape").is_err());
        assert!(validate_key("a/b").is_err());

        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), false).unwrap();
        assert!(store.set("../snow", "none").is_err());
    }

    #[test]
    fn test_failed_write_is_not_remembered() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::open(dir.path(), false).unwrap();
        store.remember("snow", Some("snowfall".to_string()));
        // A directory in the way makes the rename fail
        fs::create_dir(dir.path().join("snow")).unwrap();

        assert!(store.set("snow", "none").is_err());
        assert_eq!(store.last_seen("snow"), Some(Some("snowfall".to_string())));

        fs::create_dir(dir.path().join("drift")).unwrap();
        assert!(store.set("drift", "none").is_err());
        assert_eq!(store.last_seen("drift"), None);
    }

    #[test]
    #[serial]
    fn test_state_dir_namespaces() {
        let temp = tempdir().unwrap();
        let original = std::env::var("XDG_STATE_HOME").ok();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", temp.path());
        }

        let default_dir = get_state_dir(None).unwrap();
        let custom_dir = get_state_dir(Some(temp.path())).unwrap();

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_STATE_HOME", val),
                None => std::env::remove_var("XDG_STATE_HOME"),
            }
        }

        assert_eq!(default_dir, temp.path().join("snowfall").join("default"));
        let namespace = custom_dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(namespace.starts_with("custom_"));
        assert_eq!(namespace.len(), "custom_".len() + 16);
    }
}
