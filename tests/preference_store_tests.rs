//! Cross-handle behaviour of the file-backed preference store.

use std::sync::mpsc;
use std::time::Duration;
use tempfile::tempdir;

use snowfall::preference::{
    FileStore, Preference, PreferenceStore, StorageChange, load_preference, save_preference,
};

const WAIT: Duration = Duration::from_secs(3);

#[test]
fn test_write_from_other_handle_is_reported() {
    let dir = tempdir().unwrap();
    let mut watching = FileStore::open(dir.path(), false).unwrap();
    let mut writer = FileStore::open(dir.path(), false).unwrap();

    let (tx, rx) = mpsc::channel();
    watching
        .subscribe(Box::new(move |change| {
            let _ = tx.send(change);
        }))
        .unwrap();

    save_preference(&mut writer, "snow", Preference::NoAnimation).unwrap();

    let change = rx.recv_timeout(WAIT).unwrap();
    assert_eq!(
        change,
        StorageChange {
            key: "snow".to_string(),
            new_value: Some("none".to_string()),
        }
    );
    assert_eq!(
        load_preference(&watching, "snow"),
        Some(Preference::NoAnimation)
    );
}

#[test]
fn test_own_writes_are_not_reported() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), false).unwrap();

    let (tx, rx) = mpsc::channel();
    store
        .subscribe(Box::new(move |change| {
            let _ = tx.send(change);
        }))
        .unwrap();

    store.set("snow", "snowfall").unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
}

#[test]
fn test_second_subscription_is_rejected() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), false).unwrap();
    store.subscribe(Box::new(|_| {})).unwrap();
    assert!(store.subscribe(Box::new(|_| {})).is_err());
}

#[test]
fn test_unrecognized_value_loads_as_none() {
    let dir = tempdir().unwrap();
    let mut store = FileStore::open(dir.path(), false).unwrap();
    store.set("snow", "blizzard").unwrap();
    assert_eq!(load_preference(&store, "snow"), None);
}
