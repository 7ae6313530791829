//! Configuration system for snowfall.
//!
//! Settings live in `snowfall.toml`, looked up in
//! `$XDG_CONFIG_HOME/snowfall/` or in the directory given with `--config`.
//! A commented default file is generated on first run.
//!
//! ```toml
//! #[Season]
//! calendar_type = "Astronomical" # Season boundaries: "Astronomical" or "Meteorological"
//! season_type = "Calendar"       # Season scheme: "Calendar" ("Special" behaves the same)
//! hemisphere = "Northern"        # "Northern" or "Southern" (overrides location)
//! country_code = "NZ"            # ISO 3166-1 alpha-2 code, used when no hemisphere is set
//! latitude = -36.85              # Used when no hemisphere is set (-90 to 90)
//! longitude = 174.76             # Required together with latitude (-180 to 180)
//!
//! #[Display]
//! storage_key = "snow"           # Key of the persisted animation preference
//! throttle_ms = 33               # Minimum spacing of resize messages (1-1000) ms
//! title = "snowfall"             # Page title
//! title_prefix = "❄ "            # Prepended to the title while snowing
//! worker_command = "renderer"    # Command receiving worker messages on stdin
//! ```
//!
//! Every field is optional. Invalid values are reported with the offending
//! field and the accepted range; an unrecognized `hemisphere` only produces a
//! warning and falls through to the location based rules.

pub mod builder;
pub mod loading;
pub mod validation;


use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;
use crate::display::DisplaySettings;
use crate::season::{CalendarType, HemisphereInput, SeasonOptions, SeasonType};

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub calendar_type: Option<String>,
    pub season_type: Option<String>,
    pub hemisphere: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub language_culture: Option<String>,
    pub storage_key: Option<String>,
    pub throttle_ms: Option<u64>,
    pub title: Option<String>,
    pub title_prefix: Option<String>,
    pub worker_command: Option<String>,
}

impl Config {
    /// Load using the active config directory.
    pub fn load() -> anyhow::Result<Self> {
        loading::load()
    }

    pub fn get_config_path() -> anyhow::Result<PathBuf> {
        loading::get_config_path()
    }

    /// Season inputs described by this configuration.
    ///
    /// Text values have already been checked by validation, so unparseable
    /// calendar or season types cannot occur here and are treated as unset.
    pub fn to_season_options(&self) -> SeasonOptions {
        SeasonOptions {
            calendar_type: self
                .calendar_type
                .as_deref()
                .and_then(|s| s.parse::<CalendarType>().ok()),
            season_type: self
                .season_type
                .as_deref()
                .and_then(|s| s.parse::<SeasonType>().ok()),
            hemisphere: self.hemisphere.as_deref().map(HemisphereInput::from),
            country_code: self.country_code.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            language_culture: self.language_culture.clone(),
        }
    }

    pub fn storage_key(&self) -> &str {
        self.storage_key.as_deref().unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn throttle_window(&self) -> Duration {
        Duration::from_millis(self.throttle_ms.unwrap_or(DEFAULT_THROTTLE_MS))
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn title_prefix(&self) -> &str {
        self.title_prefix.as_deref().unwrap_or(DEFAULT_TITLE_PREFIX)
    }

    /// Orchestrator settings described by this configuration.
    pub fn display_settings(&self) -> DisplaySettings {
        DisplaySettings {
            season_options: self.to_season_options(),
            storage_key: self.storage_key().to_string(),
            throttle_window: self.throttle_window(),
            title_prefix: self.title_prefix().to_string(),
        }
    }

    /// Print the effective settings.
    pub fn log_config(&self) {
        let options = self.to_season_options();

        log_block_start!("Loaded configuration");
        log_indented!("Calendar: {}", options.effective_calendar_type());

        match (&options.hemisphere, &options.country_code, options.latitude) {
            (Some(HemisphereInput::Known(hemisphere)), _, _) => {
                log_indented!("Hemisphere: {}", hemisphere);
            }
            (_, _, Some(latitude)) => {
                log_indented!(
                    "Hemisphere: {} (latitude {:.4}°)",
                    crate::season::resolve(&options),
                    latitude
                );
            }
            (_, Some(code), _) => {
                log_indented!(
                    "Hemisphere: {} (country {})",
                    crate::season::resolve(&options),
                    code.to_ascii_uppercase()
                );
            }
            _ => log_indented!("Hemisphere: Northern (default)"),
        }

        if matches!(options.season_type, Some(SeasonType::Special)) {
            log_indented!("Season type: Special (classified as Calendar)");
        }

        log_indented!("Storage key: {}", self.storage_key());
        log_indented!("Resize throttle: {}ms", self.throttle_window().as_millis());
        log_indented!("Title: \"{}{}\"", self.title_prefix(), self.title());

        if let Some(ref command) = self.worker_command {
            log_indented!("Worker: {}", command);
        }
    }
}
