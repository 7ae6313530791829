//! Default configuration file generation.
//!
//! The generated file lists every setting with an aligned comment. Location
//! settings have no sensible default, so they are written commented out.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::constants::*;

/// Write a default `snowfall.toml` to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    fs::write(path, default_config_content())
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", path.display());

    Ok(())
}

pub(crate) fn default_config_content() -> String {
    let mut content = ConfigBuilder::new()
        .add_section("Season")
        .add_setting(
            "calendar_type",
            "\"Astronomical\"",
            "Season boundaries: \"Astronomical\" or \"Meteorological\"",
        )
        .add_setting(
            "season_type",
            "\"Calendar\"",
            "Season scheme: \"Calendar\" (\"Special\" behaves the same)",
        )
        .add_disabled_setting(
            "hemisphere",
            "\"Northern\"",
            "\"Northern\" or \"Southern\" (overrides location)",
        )
        .add_disabled_setting(
            "country_code",
            "\"AU\"",
            "ISO 3166-1 alpha-2 code, used when no hemisphere is set",
        )
        .add_disabled_setting(
            "latitude",
            "-33.868800",
            "Used when no hemisphere is set (-90 to 90)",
        )
        .add_disabled_setting(
            "longitude",
            "151.209300",
            "Required together with latitude (-180 to 180)",
        )
        .add_section("Display")
        .add_setting(
            "storage_key",
            &format!("\"{DEFAULT_STORAGE_KEY}\""),
            "Key of the persisted animation preference",
        )
        .add_setting(
            "throttle_ms",
            &DEFAULT_THROTTLE_MS.to_string(),
            &format!(
                "Minimum spacing of resize messages ({MINIMUM_THROTTLE_MS}-{MAXIMUM_THROTTLE_MS}) ms"
            ),
        )
        .add_setting("title", &format!("\"{DEFAULT_TITLE}\""), "Page title")
        .add_setting(
            "title_prefix",
            &format!("\"{DEFAULT_TITLE_PREFIX}\""),
            "Prepended to the title while snowing",
        )
        .add_disabled_setting(
            "worker_command",
            "\"snowfall-renderer\"",
            "Receives worker messages as JSON lines on stdin",
        )
        .build();

    content.push('\n');
    content
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting written as a comment, for the user to enable.
    fn add_disabled_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("# {key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Align all comments one column past the longest setting
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.chars().count()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(width - line.chars().count());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        lines.join("\n")
    }
}
