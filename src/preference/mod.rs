//! Persisted animation preference.
//!
//! The user's choice is a single string stored under a fixed key in a
//! [`PreferenceStore`]. Every controller sharing the store sees the same
//! value, and other controllers are told about writes through the store's
//! change notifications, which is how several open instances stay in sync.
//!
//! Two stores are provided:
//!
//! - [`MemoryStore`]: in-process, any number of handles ("tabs") on one
//!   shared map. Used in tests and embeddings.
//! - [`FileStore`]: one file per key under the XDG state directory, shared
//!   between processes and watched for external writes.

pub mod file;
pub mod memory;
pub mod watcher;

pub use file::{FileStore, get_state_dir};
pub use memory::MemoryStore;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::season::ParseError;

/// Whether the user wants the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    /// Stored as `"snowfall"`.
    #[serde(rename = "snowfall")]
    Snowfall,
    /// Stored as `"none"`.
    #[serde(rename = "none")]
    NoAnimation,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Snowfall => "snowfall",
            Preference::NoAnimation => "none",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Preference::Snowfall => Preference::NoAnimation,
            Preference::NoAnimation => Preference::Snowfall,
        }
    }
}

impl FromStr for Preference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snowfall" => Ok(Preference::Snowfall),
            "none" => Ok(Preference::NoAnimation),
            _ => Err(ParseError {
                kind: "animation preference",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A write observed by a store handle other than the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Option<String>,
}

/// Callback invoked for every [`StorageChange`].
pub type StorageListener = Box<dyn Fn(StorageChange) + Send + Sync + 'static>;

/// Origin-scoped key/value storage.
///
/// Each key is read and written atomically. Listeners registered through
/// [`PreferenceStore::subscribe`] are told about writes made by *other*
/// handles, never about the subscriber's own writes.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn subscribe(&mut self, listener: StorageListener) -> Result<()>;
}

/// Read the preference stored under `key`.
///
/// Read failures and unrecognized values count as "no preference".
pub fn load_preference(store: &dyn PreferenceStore, key: &str) -> Option<Preference> {
    match store.get(key) {
        Ok(Some(raw)) => match raw.parse() {
            Ok(preference) => Some(preference),
            Err(e) => {
                log_warning!("Ignoring stored preference: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log_warning!("Could not read stored preference: {}", e);
            None
        }
    }
}

/// Persist `preference` under `key`.
pub fn save_preference(
    store: &mut dyn PreferenceStore,
    key: &str,
    preference: Preference,
) -> Result<()> {
    store.set(key, preference.as_str())
}
