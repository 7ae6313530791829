//! Command-line command handlers for snowfall.
//!
//! Each one-shot command lives in its own submodule. The controller itself
//! is started from [`crate::snowfall`].

pub mod calendar;
pub mod get;
pub mod season;
pub mod set;

use anyhow::Result;

use crate::args::SeasonQuery;
use crate::config::Config;
use crate::config::validation::validate_coordinates;
use crate::season::{HemisphereInput, SeasonOptions, SeasonType};

/// Merge command-line season inputs over the configured ones.
///
/// Location given on the command line replaces the configured location as a
/// whole, so `--country ZA` is not overridden by a configured hemisphere.
pub(crate) fn season_options_for(query: &SeasonQuery, config: &Config) -> Result<SeasonOptions> {
    let mut options = config.to_season_options();

    if let Some(calendar_type) = query.calendar_type {
        options.calendar_type = Some(calendar_type);
    }
    if query.special {
        options.season_type = Some(SeasonType::Special);
    }

    if query.has_location() {
        validate_coordinates(query.latitude, query.longitude)?;

        if let Some(ref code) = query.country_code
            && (code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()))
        {
            anyhow::bail!("--country expects a two-letter ISO 3166-1 code (got \"{}\")", code);
        }

        if let Some(ref hemisphere) = query.hemisphere
            && let HemisphereInput::Unrecognized(_) = HemisphereInput::from(hemisphere.as_str())
        {
            log_warning!(
                "Ignoring hemisphere \"{}\": expected \"Northern\" or \"Southern\"",
                hemisphere
            );
        }

        options.hemisphere = query.hemisphere.as_deref().map(HemisphereInput::from);
        options.country_code = query.country_code.as_ref().map(|c| c.to_ascii_uppercase());
        options.latitude = query.latitude;
        options.longitude = query.longitude;
    }

    Ok(options)
}

/// Describe how the hemisphere was decided, for human output.
pub(crate) fn hemisphere_source(options: &SeasonOptions) -> String {
    let hemisphere = crate::season::resolve(options);
    match (&options.hemisphere, options.latitude, options.longitude) {
        (Some(HemisphereInput::Known(_)), _, _) => format!("{hemisphere} (explicit)"),
        (_, Some(latitude), Some(_)) => format!("{hemisphere} (latitude {latitude:.4}°)"),
        _ => match options.country_code {
            Some(ref code) => format!("{hemisphere} (country {code})"),
            None => format!("{hemisphere} (default)"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::{CalendarType, Hemisphere};

    fn configured() -> Config {
        Config {
            calendar_type: Some("Meteorological".to_string()),
            hemisphere: Some("Southern".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_query_without_location_keeps_config() {
        let options = season_options_for(&SeasonQuery::default(), &configured()).unwrap();
        assert_eq!(options.calendar_type, Some(CalendarType::Meteorological));
        assert_eq!(
            options.hemisphere,
            Some(HemisphereInput::Known(Hemisphere::Southern))
        );
    }

    #[test]
    fn test_query_location_replaces_config_location() {
        let query = SeasonQuery {
            country_code: Some("us".to_string()),
            calendar_type: Some(CalendarType::Astronomical),
            special: true,
            ..SeasonQuery::default()
        };
        let options = season_options_for(&query, &configured()).unwrap();
        assert_eq!(options.hemisphere, None);
        assert_eq!(options.country_code.as_deref(), Some("US"));
        assert_eq!(options.calendar_type, Some(CalendarType::Astronomical));
        assert_eq!(options.season_type, Some(SeasonType::Special));
        assert_eq!(crate::season::resolve(&options), Hemisphere::Northern);
    }

    #[test]
    fn test_query_validation() {
        let half_pair = SeasonQuery {
            latitude: Some(-10.0),
            ..SeasonQuery::default()
        };
        assert!(season_options_for(&half_pair, &Config::default()).is_err());

        let bad_country = SeasonQuery {
            country_code: Some("Australia".to_string()),
            ..SeasonQuery::default()
        };
        assert!(season_options_for(&bad_country, &Config::default()).is_err());
    }

    #[test]
    fn test_hemisphere_source() {
        let options = SeasonOptions::default().with_coordinates(-33.9, 18.4);
        assert_eq!(hemisphere_source(&options), "Southern (latitude -33.9000°)");
        assert_eq!(
            hemisphere_source(&SeasonOptions::default()),
            "Northern (default)"
        );
        assert_eq!(
            hemisphere_source(&SeasonOptions::default().with_country_code("BR")),
            "Southern (country BR)"
        );
    }
}
