//! Date and hemisphere based season classification.
//!
//! ## Module Structure
//!
//! - [`hemisphere`]: resolves Northern/Southern from explicit input,
//!   coordinates, or a country code
//! - [`table`]: the fixed season boundary tables and their validation
//!
//! Classification only looks at the month and day of a date. Boundaries are
//! fixed calendar days (an approximation of the solstices and equinoxes for
//! the astronomical scheme), and a season range may wrap across New Year.
//!
//! ```
//! use chrono::NaiveDate;
//! use snowfall::season::{classify, Season, SeasonOptions};
//!
//! let christmas = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
//! assert_eq!(classify(&christmas, &SeasonOptions::default()), Season::Winter);
//! ```

pub mod hemisphere;
pub mod table;

pub use hemisphere::{is_southern_country, resolve};
pub use table::{
    DateRange, MonthDay, SEASON_TABLE, SeasonRanges, SeasonTable, TableError, all_month_days,
};

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::time_source::TimeSource;

#[cfg(test)]
mod tests;

/// Error for textual season option values that are not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// What was being parsed ("calendar type", "hemisphere", ...)
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseError {}

/// Season boundary scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CalendarType {
    /// Solstice/equinox aligned, using fixed approximate days (21st of
    /// March, June, September, December).
    #[default]
    Astronomical,
    /// Whole calendar months (March-May, June-August, ...).
    Meteorological,
}

impl CalendarType {
    pub const ALL: [CalendarType; 2] = [CalendarType::Astronomical, CalendarType::Meteorological];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarType::Astronomical => "Astronomical",
            CalendarType::Meteorological => "Meteorological",
        }
    }
}

impl FromStr for CalendarType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("astronomical") {
            Ok(CalendarType::Astronomical)
        } else if s.eq_ignore_ascii_case("meteorological") {
            Ok(CalendarType::Meteorological)
        } else {
            Err(ParseError {
                kind: "calendar type",
                value: s.to_string(),
            })
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Season scheme. Only `Calendar` is implemented; `Special` is accepted and
/// classified exactly like `Calendar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonType {
    #[default]
    Calendar,
    Special,
}

impl FromStr for SeasonType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("calendar") {
            Ok(SeasonType::Calendar)
        } else if s.eq_ignore_ascii_case("special") {
            Ok(SeasonType::Special)
        } else {
            Err(ParseError {
                kind: "season type",
                value: s.to_string(),
            })
        }
    }
}

/// Half of the Earth relative to the equator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    pub const ALL: [Hemisphere; 2] = [Hemisphere::Northern, Hemisphere::Southern];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hemisphere::Northern => "Northern",
            Hemisphere::Southern => "Southern",
        }
    }
}

/// Only the exact names `Northern` and `Southern` are accepted.
impl FromStr for Hemisphere {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Northern" => Ok(Hemisphere::Northern),
            "Southern" => Ok(Hemisphere::Southern),
            _ => Err(ParseError {
                kind: "hemisphere",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
    /// No range matched. Only reachable with an incomplete table.
    Unknown,
}

impl Season {
    /// The four real seasons in the order ranges are tested.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn is_winter(&self) -> bool {
        matches!(self, Season::Winter)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
            Season::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for a classification. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonOptions {
    /// Boundary scheme, `Astronomical` when unset.
    pub calendar_type: Option<CalendarType>,
    /// Accepted but has no effect.
    pub season_type: Option<SeasonType>,
    /// Explicit hemisphere, highest precedence.
    pub hemisphere: Option<HemisphereInput>,
    /// ISO-3166-1 alpha-2 code, compared case-insensitively.
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    /// Accepted but unused: only the latitude decides the hemisphere.
    pub longitude: Option<f64>,
    /// Accepted and ignored.
    pub language_culture: Option<String>,
}

/// An explicit hemisphere as given by the caller.
///
/// Textual input that is not exactly `Northern` or `Southern` is kept as
/// `Unrecognized` so resolution can fall through to the next rule instead of
/// failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HemisphereInput {
    Known(Hemisphere),
    Unrecognized(String),
}

impl From<Hemisphere> for HemisphereInput {
    fn from(hemisphere: Hemisphere) -> Self {
        HemisphereInput::Known(hemisphere)
    }
}

impl From<&str> for HemisphereInput {
    fn from(s: &str) -> Self {
        match s.parse::<Hemisphere>() {
            Ok(hemisphere) => HemisphereInput::Known(hemisphere),
            Err(_) => HemisphereInput::Unrecognized(s.to_string()),
        }
    }
}

impl SeasonOptions {
    pub fn with_calendar_type(mut self, calendar_type: CalendarType) -> Self {
        self.calendar_type = Some(calendar_type);
        self
    }

    pub fn with_season_type(mut self, season_type: SeasonType) -> Self {
        self.season_type = Some(season_type);
        self
    }

    pub fn with_hemisphere(mut self, hemisphere: impl Into<HemisphereInput>) -> Self {
        self.hemisphere = Some(hemisphere.into());
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_latitude(mut self, latitude: f64) -> Self {
        self.latitude = Some(latitude);
        self
    }

    pub fn with_longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self
    }

    pub fn with_coordinates(self, latitude: f64, longitude: f64) -> Self {
        self.with_latitude(latitude).with_longitude(longitude)
    }

    /// Calendar scheme after applying the default.
    pub fn effective_calendar_type(&self) -> CalendarType {
        self.calendar_type.unwrap_or_default()
    }
}

/// Classify `date` against the built-in season table.
pub fn classify<D: Datelike>(date: &D, options: &SeasonOptions) -> Season {
    classify_with_table(&SEASON_TABLE, date, options)
}

/// Classify the current day of `time_source`.
pub fn classify_now(time_source: &dyn TimeSource, options: &SeasonOptions) -> Season {
    classify(&time_source.now(), options)
}

/// Classify `date` against an arbitrary table.
///
/// Returns [`Season::Unknown`] when the table has no ranges for the resolved
/// calendar/hemisphere pair or none of them contains the date.
pub fn classify_with_table<D: Datelike>(
    table: &SeasonTable,
    date: &D,
    options: &SeasonOptions,
) -> Season {
    let calendar_type = options.effective_calendar_type();
    let hemisphere = resolve(options);

    let Some(ranges) = table.ranges(calendar_type, hemisphere) else {
        return Season::Unknown;
    };

    let current = MonthDay::from_date(date);
    ranges
        .iter()
        .find(|(_, range)| range.contains(current))
        .map(|(season, _)| *season)
        .unwrap_or(Season::Unknown)
}
