//! Calendar command: list the season boundaries for a hemisphere.

use anyhow::Result;
use serde_json::{Map, Value, json};

use crate::args::SeasonQuery;
use crate::config::Config;
use crate::season::{self, CalendarType, Hemisphere, SEASON_TABLE, SeasonRanges};

/// Handle the calendar command.
pub fn handle_calendar_command(query: &SeasonQuery, json: bool) -> Result<()> {
    let config = Config::load()?;
    let options = super::season_options_for(query, &config)?;
    let hemisphere = season::resolve(&options);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&calendar_json(hemisphere))?
        );
        return Ok(());
    }

    log_version!();
    log_block_start!("Season boundaries");
    log_indented!("Hemisphere: {}", super::hemisphere_source(&options));

    for calendar_type in CalendarType::ALL {
        log_block_start!("{}", calendar_type);
        match SEASON_TABLE.ranges(calendar_type, hemisphere) {
            Some(ranges) => {
                for (season, range) in in_calendar_order(ranges) {
                    log_indented!("{:<7} {}", season.as_str(), range);
                }
            }
            None => log_indented!("No boundaries available"),
        }
    }
    log_end!();

    Ok(())
}

pub(crate) fn calendar_json(hemisphere: Hemisphere) -> Value {
    let mut calendars = Map::new();
    for calendar_type in CalendarType::ALL {
        let mut seasons = Map::new();
        if let Some(ranges) = SEASON_TABLE.ranges(calendar_type, hemisphere) {
            for (season, range) in in_calendar_order(ranges) {
                seasons.insert(
                    season.as_str().to_string(),
                    json!({
                        "start": range.start.to_string(),
                        "end": range.end.to_string(),
                    }),
                );
            }
        }
        calendars.insert(calendar_type.as_str().to_string(), Value::Object(seasons));
    }

    json!({
        "hemisphere": hemisphere,
        "calendars": calendars,
    })
}

/// Ranges sorted by the day each season starts.
fn in_calendar_order(ranges: &SeasonRanges) -> Vec<(season::Season, season::DateRange)> {
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|(_, range)| range.start);
    sorted
}
