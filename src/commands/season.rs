//! Season command: classify a date.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde_json::json;

use crate::args::SeasonQuery;
use crate::config::Config;
use crate::season::{self, SeasonType};

/// Handle the season command.
///
/// Without `--date` today's local date is used.
pub fn handle_season_command(query: &SeasonQuery, json: bool, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let options = super::season_options_for(query, &config)?;
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let season = season::classify(&date, &options);
    let hemisphere = season::resolve(&options);
    let calendar_type = options.effective_calendar_type();

    if json {
        let output = json!({
            "date": date.format("%Y-%m-%d").to_string(),
            "season": season,
            "is_winter": season.is_winter(),
            "calendar_type": calendar_type,
            "hemisphere": hemisphere,
            "season_type": options.season_type.unwrap_or_default(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    log_version!();
    if debug_enabled {
        config.log_config();
    }
    log_block_start!("{} is in {}", describe(date), season);
    log_indented!("Calendar: {}", calendar_type);
    log_indented!("Hemisphere: {}", super::hemisphere_source(&options));
    if options.season_type == Some(SeasonType::Special) {
        log_indented!("Special seasons are not available, using calendar seasons");
    }
    log_end!();

    Ok(())
}

fn describe(date: NaiveDate) -> String {
    if date == Local::now().date_naive() {
        format!("Today ({})", date.format("%Y-%m-%d"))
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}
