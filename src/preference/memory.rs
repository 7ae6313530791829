//! In-memory preference store with multiple handles.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{PreferenceStore, StorageChange, StorageListener};

type SharedListener = Arc<dyn Fn(StorageChange) + Send + Sync + 'static>;

#[derive(Default)]
struct Shared {
    values: HashMap<String, String>,
    listeners: Vec<(usize, SharedListener)>,
    next_handle: usize,
}

/// One handle on a shared in-memory map.
///
/// [`MemoryStore::open_tab`] creates another handle on the same map, the
/// way a second browser tab shares the first tab's storage.
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
    handle: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        let shared = Shared {
            next_handle: 1,
            ..Shared::default()
        };
        Self {
            shared: Arc::new(Mutex::new(shared)),
            handle: 0,
        }
    }

    /// Open another handle on the same storage.
    pub fn open_tab(&self) -> Self {
        let mut shared = self.lock();
        let handle = shared.next_handle;
        shared.next_handle += 1;
        Self {
            shared: Arc::clone(&self.shared),
            handle,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        match self.shared.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let recipients: Vec<SharedListener> = {
            let mut shared = self.lock();
            shared.values.insert(key.to_string(), value.to_string());
            shared
                .listeners
                .iter()
                .filter(|(handle, _)| *handle != self.handle)
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };

        // Notify after unlocking; listeners may read the store
        let change = StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        };
        for listener in recipients {
            listener(change.clone());
        }
        Ok(())
    }

    fn subscribe(&mut self, listener: StorageListener) -> Result<()> {
        let handle = self.handle;
        self.lock().listeners.push((handle, Arc::from(listener)));
        Ok(())
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        let handle = self.handle;
        let removed: Vec<(usize, SharedListener)> = {
            let mut shared = self.lock();
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut shared.listeners)
                .into_iter()
                .partition(|(owner, _)| *owner == handle);
            shared.listeners = kept;
            removed
        };
        // A listener may own another handle whose drop takes the lock
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_tabs_share_values() {
        let mut first = MemoryStore::new();
        let second = first.open_tab();

        first.set("snow", "snowfall").unwrap();
        assert_eq!(second.get("snow").unwrap().as_deref(), Some("snowfall"));
        assert_eq!(second.get("other").unwrap(), None);
    }

    #[test]
    fn test_writer_is_not_notified() {
        let mut first = MemoryStore::new();
        let mut second = first.open_tab();

        let (first_tx, first_rx) = channel();
        first
            .subscribe(Box::new(move |change| {
                let _ = first_tx.send(change);
            }))
            .unwrap();
        let (second_tx, second_rx) = channel();
        second
            .subscribe(Box::new(move |change| {
                let _ = second_tx.send(change);
            }))
            .unwrap();

        first.set("snow", "none").unwrap();

        assert!(first_rx.try_recv().is_err());
        assert_eq!(
            second_rx.try_recv().unwrap(),
            StorageChange {
                key: "snow".to_string(),
                new_value: Some("none".to_string()),
            }
        );
    }

    #[test]
    fn test_every_other_tab_is_notified() {
        let mut writer = MemoryStore::new();
        let (tx, rx) = channel();
        let mut tabs: Vec<MemoryStore> = (0..3).map(|_| writer.open_tab()).collect();
        for tab in &mut tabs {
            let tx = tx.clone();
            tab.subscribe(Box::new(move |change| {
                let _ = tx.send(change);
            }))
            .unwrap();
        }

        writer.set("snow", "snowfall").unwrap();
        assert_eq!(rx.try_iter().count(), 3);
    }

    #[test]
    fn test_listener_can_read_the_store() {
        let mut writer = MemoryStore::new();
        let mut reader = writer.open_tab();
        let peek = writer.open_tab();

        let (tx, rx) = channel();
        reader
            .subscribe(Box::new(move |change| {
                let _ = tx.send(peek.get(&change.key).unwrap());
            }))
            .unwrap();

        let (done_tx, done_rx) = channel();
        thread::spawn(move || {
            writer.set("snow", "none").unwrap();
            let _ = done_tx.send(());
        });

        done_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("set did not return while a listener read the store");
        assert_eq!(rx.recv().unwrap().as_deref(), Some("none"));
        drop(reader);
    }

    #[test]
    fn test_dropped_tab_stops_listening() {
        let mut writer = MemoryStore::new();
        let mut tab = writer.open_tab();
        let (tx, rx) = channel();
        tab.subscribe(Box::new(move |change| {
            let _ = tx.send(change);
        }))
        .unwrap();

        drop(tab);
        assert!(writer.lock().listeners.is_empty());
        writer.set("snow", "snowfall").unwrap();
        assert!(rx.try_recv().is_err());
    }
}
