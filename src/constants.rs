//! Application-wide defaults and limits.

use std::time::Duration;

// # Persisted preference

/// Storage key holding the user's animation choice.
pub const DEFAULT_STORAGE_KEY: &str = "snow";

// # Resize throttling

/// Minimum interval between forwarded resize messages, in milliseconds.
pub const DEFAULT_THROTTLE_MS: u64 = 33;
pub const MINIMUM_THROTTLE_MS: u64 = 1;
pub const MAXIMUM_THROTTLE_MS: u64 = 1000;

pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(DEFAULT_THROTTLE_MS);

// # Page title

pub const DEFAULT_TITLE: &str = "snowfall";
/// Prepended to the title while the animation is running.
pub const DEFAULT_TITLE_PREFIX: &str = "❄ ";

// # Files

pub const CONFIG_FILE_NAME: &str = "snowfall.toml";
pub const APP_DIR_NAME: &str = "snowfall";

/// Debounce for preference file events; editors and atomic renames emit bursts.
pub const PREFERENCE_DEBOUNCE_MS: u64 = 50;

// # Exit codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
