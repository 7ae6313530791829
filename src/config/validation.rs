//! Configuration validation functionality.
//!
//! Rejects values the controller cannot work with. The one lenient field is
//! `hemisphere`: an unknown value is reported and then ignored, so season
//! detection falls back to the location rules.

use anyhow::{Context, Result};

use super::Config;
use crate::constants::*;
use crate::preference::file::validate_key;
use crate::season::{CalendarType, Hemisphere, SeasonType};

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(ref value) = config.calendar_type {
        value
            .parse::<CalendarType>()
            .context("calendar_type must be \"Astronomical\" or \"Meteorological\"")?;
    }

    if let Some(ref value) = config.season_type {
        value
            .parse::<SeasonType>()
            .context("season_type must be \"Calendar\" or \"Special\"")?;
    }

    if let Some(ref value) = config.hemisphere
        && value.parse::<Hemisphere>().is_err()
    {
        log_pipe!();
        log_warning!(
            "Ignoring hemisphere \"{}\": expected \"Northern\" or \"Southern\"",
            value
        );
        log_indented!("Falling back to coordinates, country code, or Northern");
    }

    if let Some(ref code) = config.country_code {
        let code = code.trim();
        if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!(
                "country_code (\"{}\") must be a two-letter ISO 3166-1 code such as \"AU\"",
                code
            );
        }
    }

    validate_coordinates(config.latitude, config.longitude)?;

    if let Some(throttle) = config.throttle_ms
        && !(MINIMUM_THROTTLE_MS..=MAXIMUM_THROTTLE_MS).contains(&throttle)
    {
        anyhow::bail!(
            "throttle_ms ({} ms) must be between {} and {} milliseconds",
            throttle,
            MINIMUM_THROTTLE_MS,
            MAXIMUM_THROTTLE_MS
        );
    }

    if let Some(ref key) = config.storage_key {
        validate_key(key.trim()).context("Invalid storage_key")?;
    }

    if let Some(ref command) = config.worker_command
        && command.trim().is_empty()
    {
        anyhow::bail!("worker_command must not be empty (remove it to log messages instead)");
    }

    Ok(())
}

/// Latitude and longitude come as a pair and must be on the globe.
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    if let Some(lat) = latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    match (latitude, longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        _ => Ok(()),
    }
}
