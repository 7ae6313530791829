//! Watches the preference directory for writes made by other processes.
//!
//! A write by another process shows up as create/rename events on the key
//! file. Events are coalesced for a short debounce window, then every touched
//! key is re-read and compared with the last value this process saw for it;
//! only real changes reach the listener. Writes made through the owning
//! [`super::FileStore`] update that record first, so they are never reported
//! back to their author.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::mpsc::{RecvTimeoutError, channel};
use std::thread;
use std::time::Duration;

use super::StorageChange;
use super::StorageListener;
use super::file::{SeenValues, read_value, validate_key};
use crate::constants::PREFERENCE_DEBOUNCE_MS;

/// Keeps the underlying `notify` watcher alive. Dropping it stops watching.
pub struct PreferenceWatcher {
    _watcher: RecommendedWatcher,
}

impl PreferenceWatcher {
    /// Start watching `dir` on a background thread.
    pub fn start(
        dir: PathBuf,
        seen: SeenValues,
        listener: StorageListener,
        debug_enabled: bool,
    ) -> Result<Self> {
        let (tx, rx) = channel::<Event>();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create preference watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        if debug_enabled {
            log_pipe!();
            log_debug!("Watching preference store for changes from other instances");
            log_indented!("Directory: {}", dir.display());
        }

        thread::spawn(move || {
            let debounce = Duration::from_millis(PREFERENCE_DEBOUNCE_MS);

            while let Ok(first) = rx.recv() {
                let mut touched = BTreeSet::new();
                collect_keys(&first, &mut touched);

                // Coalesce the burst that follows a single write
                loop {
                    match rx.recv_timeout(debounce) {
                        Ok(event) => collect_keys(&event, &mut touched),
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }

                for key in touched {
                    let current = read_value(&dir.join(&key)).unwrap_or(None);

                    let changed = match seen.lock() {
                        Ok(mut seen) => {
                            let previous = seen.insert(key.clone(), current.clone());
                            previous.flatten() != current
                        }
                        Err(_) => true,
                    };

                    if changed {
                        if debug_enabled {
                            log_pipe!();
                            log_debug!("Preference '{}' changed externally", key);
                        }
                        listener(StorageChange {
                            key,
                            new_value: current,
                        });
                    }
                }
            }
        });

        Ok(Self { _watcher: watcher })
    }
}

/// Add the key names touched by `event`, skipping temp and lock files.
fn collect_keys(event: &Event, keys: &mut BTreeSet<String>) {
    for path in &event.paths {
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && validate_key(name).is_ok()
        {
            keys.insert(name.to_string());
        }
    }
}
