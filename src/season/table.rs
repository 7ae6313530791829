//! Season boundary tables.
//!
//! A [`SeasonTable`] maps every (calendar type, hemisphere) pair to four
//! inclusive [`DateRange`]s, one per season. Construction checks that the
//! ranges of each pair cover all 366 possible month-days exactly once, so a
//! validated table can never leave a date unclassified.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::{CalendarType, Hemisphere, Season};

/// Leap year used to enumerate every possible month-day.
const REFERENCE_LEAP_YEAR: i32 = 2024;

/// A day of the year without the year. Orders like `month * 100 + day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub const fn new(month: u32, day: u32) -> Self {
        Self { month, day }
    }

    pub fn from_date<D: Datelike>(date: &D) -> Self {
        Self::new(date.month(), date.day())
    }

    /// Numeric form used for comparisons, e.g. 1225 for December 25th.
    pub const fn ordinal(&self) -> u32 {
        self.month * 100 + self.day
    }

    /// Whether this month-day exists in a leap year.
    pub fn is_valid(&self) -> bool {
        NaiveDate::from_ymd_opt(REFERENCE_LEAP_YEAR, self.month, self.day).is_some()
    }
}

impl fmt::Display for MonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}", self.month, self.day)
    }
}

/// Inclusive range of month-days. `start > end` wraps across New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: MonthDay,
    pub end: MonthDay,
}

impl DateRange {
    pub const fn new(start: MonthDay, end: MonthDay) -> Self {
        Self { start, end }
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, current: MonthDay) -> bool {
        if self.wraps() {
            current >= self.start || current <= self.end
        } else {
            self.start <= current && current <= self.end
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// The four ranges for one calendar/hemisphere pair, in test order.
pub type SeasonRanges = [(Season, DateRange); 4];

/// Why a table was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum TableError {
    /// A boundary names a day that does not exist (e.g. 04-31).
    InvalidBoundary {
        calendar_type: CalendarType,
        hemisphere: Hemisphere,
        boundary: MonthDay,
    },
    /// The four entries are not Spring, Summer, Autumn and Winter once each.
    SeasonMismatch {
        calendar_type: CalendarType,
        hemisphere: Hemisphere,
    },
    /// A day is covered by zero or several ranges.
    Coverage {
        calendar_type: CalendarType,
        hemisphere: Hemisphere,
        day: MonthDay,
        matches: usize,
    },
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::InvalidBoundary {
                calendar_type,
                hemisphere,
                boundary,
            } => write!(
                f,
                "{calendar_type}/{hemisphere}: boundary {boundary} is not a calendar day"
            ),
            TableError::SeasonMismatch {
                calendar_type,
                hemisphere,
            } => write!(
                f,
                "{calendar_type}/{hemisphere}: expected each of the four seasons exactly once"
            ),
            TableError::Coverage {
                calendar_type,
                hemisphere,
                day,
                matches,
            } => write!(
                f,
                "{calendar_type}/{hemisphere}: {day} falls in {matches} ranges, expected 1"
            ),
        }
    }
}

impl std::error::Error for TableError {}

/// Lookup of season ranges keyed by calendar type and hemisphere.
#[derive(Debug, Clone, Default)]
pub struct SeasonTable {
    entries: HashMap<(CalendarType, Hemisphere), SeasonRanges>,
}

const fn range(start: (u32, u32), end: (u32, u32)) -> DateRange {
    DateRange::new(MonthDay::new(start.0, start.1), MonthDay::new(end.0, end.1))
}

const ASTRONOMICAL_NORTHERN: SeasonRanges = [
    (Season::Spring, range((3, 21), (6, 20))),
    (Season::Summer, range((6, 21), (9, 20))),
    (Season::Autumn, range((9, 21), (12, 20))),
    (Season::Winter, range((12, 21), (3, 20))),
];

const ASTRONOMICAL_SOUTHERN: SeasonRanges = [
    (Season::Spring, range((9, 21), (12, 20))),
    (Season::Summer, range((12, 21), (3, 20))),
    (Season::Autumn, range((3, 21), (6, 20))),
    (Season::Winter, range((6, 21), (9, 20))),
];

const METEOROLOGICAL_NORTHERN: SeasonRanges = [
    (Season::Spring, range((3, 1), (5, 31))),
    (Season::Summer, range((6, 1), (8, 31))),
    (Season::Autumn, range((9, 1), (11, 30))),
    (Season::Winter, range((12, 1), (2, 29))),
];

const METEOROLOGICAL_SOUTHERN: SeasonRanges = [
    (Season::Spring, range((9, 1), (11, 30))),
    (Season::Summer, range((12, 1), (2, 29))),
    (Season::Autumn, range((3, 1), (5, 31))),
    (Season::Winter, range((6, 1), (8, 31))),
];

/// Table used by [`super::classify`], built on first use.
///
/// If the built-in ranges ever failed validation the table would be empty
/// and every classification would return `Unknown`.
pub static SEASON_TABLE: Lazy<SeasonTable> = Lazy::new(|| {
    SeasonTable::builtin().unwrap_or_else(|e| {
        log_error!("Built-in season table is invalid: {}", e);
        SeasonTable::empty()
    })
});

impl SeasonTable {
    /// Build and validate a table.
    pub fn new<I>(entries: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = ((CalendarType, Hemisphere), SeasonRanges)>,
    {
        let entries: HashMap<_, _> = entries.into_iter().collect();
        for ((calendar_type, hemisphere), ranges) in &entries {
            validate_ranges(*calendar_type, *hemisphere, ranges)?;
        }
        Ok(Self { entries })
    }

    /// A table without entries. Classifies everything as `Unknown`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The astronomical and meteorological tables for both hemispheres.
    pub fn builtin() -> Result<Self, TableError> {
        Self::new([
            (
                (CalendarType::Astronomical, Hemisphere::Northern),
                ASTRONOMICAL_NORTHERN,
            ),
            (
                (CalendarType::Astronomical, Hemisphere::Southern),
                ASTRONOMICAL_SOUTHERN,
            ),
            (
                (CalendarType::Meteorological, Hemisphere::Northern),
                METEOROLOGICAL_NORTHERN,
            ),
            (
                (CalendarType::Meteorological, Hemisphere::Southern),
                METEOROLOGICAL_SOUTHERN,
            ),
        ])
    }

    pub fn ranges(
        &self,
        calendar_type: CalendarType,
        hemisphere: Hemisphere,
    ) -> Option<&SeasonRanges> {
        self.entries.get(&(calendar_type, hemisphere))
    }

    /// Range of a single season, if the pair is present.
    pub fn range_of(
        &self,
        calendar_type: CalendarType,
        hemisphere: Hemisphere,
        season: Season,
    ) -> Option<DateRange> {
        self.ranges(calendar_type, hemisphere)?
            .iter()
            .find(|(s, _)| *s == season)
            .map(|(_, range)| *range)
    }
}

/// All 366 month-days of a leap year, in calendar order.
pub fn all_month_days() -> impl Iterator<Item = MonthDay> {
    (1..=12u32)
        .flat_map(|month| (1..=31u32).map(move |day| MonthDay::new(month, day)))
        .filter(MonthDay::is_valid)
}

fn validate_ranges(
    calendar_type: CalendarType,
    hemisphere: Hemisphere,
    ranges: &SeasonRanges,
) -> Result<(), TableError> {
    for (_, range) in ranges {
        for boundary in [range.start, range.end] {
            if !boundary.is_valid() {
                return Err(TableError::InvalidBoundary {
                    calendar_type,
                    hemisphere,
                    boundary,
                });
            }
        }
    }

    let all_seasons_once = Season::ALL
        .iter()
        .all(|season| ranges.iter().filter(|(s, _)| s == season).count() == 1);
    if !all_seasons_once {
        return Err(TableError::SeasonMismatch {
            calendar_type,
            hemisphere,
        });
    }

    for day in all_month_days() {
        let matches = ranges.iter().filter(|(_, r)| r.contains(day)).count();
        if matches != 1 {
            return Err(TableError::Coverage {
                calendar_type,
                hemisphere,
                day,
                matches,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_valid() {
        let table = SeasonTable::builtin().unwrap();
        for calendar_type in CalendarType::ALL {
            for hemisphere in Hemisphere::ALL {
                assert!(table.ranges(calendar_type, hemisphere).is_some());
            }
        }
    }

    #[test]
    fn test_all_month_days_covers_leap_year() {
        let days: Vec<MonthDay> = all_month_days().collect();
        assert_eq!(days.len(), 366);
        assert_eq!(days.first(), Some(&MonthDay::new(1, 1)));
        assert!(days.contains(&MonthDay::new(2, 29)));
        assert!(!days.contains(&MonthDay::new(4, 31)));
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_month_day_ordering_matches_ordinal() {
        let a = MonthDay::new(2, 29);
        let b = MonthDay::new(3, 1);
        assert!(a < b);
        assert!(a.ordinal() < b.ordinal());
        assert_eq!(MonthDay::new(12, 25).ordinal(), 1225);
    }

    #[test]
    fn test_wrapping_range_contains() {
        let winter = range((12, 21), (3, 20));
        assert!(winter.wraps());
        assert!(winter.contains(MonthDay::new(12, 21)));
        assert!(winter.contains(MonthDay::new(12, 31)));
        assert!(winter.contains(MonthDay::new(1, 1)));
        assert!(winter.contains(MonthDay::new(3, 20)));
        assert!(!winter.contains(MonthDay::new(3, 21)));
        assert!(!winter.contains(MonthDay::new(12, 20)));
    }

    #[test]
    fn test_plain_range_contains_bounds() {
        let spring = range((3, 1), (5, 31));
        assert!(!spring.wraps());
        assert!(spring.contains(MonthDay::new(3, 1)));
        assert!(spring.contains(MonthDay::new(5, 31)));
        assert!(!spring.contains(MonthDay::new(2, 29)));
        assert!(!spring.contains(MonthDay::new(6, 1)));
    }

    #[test]
    fn test_gap_is_rejected() {
        let mut ranges = METEOROLOGICAL_NORTHERN;
        ranges[0].1 = range((3, 2), (5, 31));
        let err = SeasonTable::new([(
            (CalendarType::Meteorological, Hemisphere::Northern),
            ranges,
        )])
        .unwrap_err();
        assert_eq!(
            err,
            TableError::Coverage {
                calendar_type: CalendarType::Meteorological,
                hemisphere: Hemisphere::Northern,
                day: MonthDay::new(3, 1),
                matches: 0,
            }
        );
    }

    #[test]
    fn test_overlap_is_rejected() {
        let mut ranges = ASTRONOMICAL_NORTHERN;
        ranges[1].1 = range((6, 20), (9, 20));
        let err = SeasonTable::new([((CalendarType::Astronomical, Hemisphere::Northern), ranges)])
            .unwrap_err();
        assert!(matches!(err, TableError::Coverage { matches: 2, .. }));
    }

    #[test]
    fn test_invalid_boundary_is_rejected() {
        let mut ranges = METEOROLOGICAL_SOUTHERN;
        ranges[2].1 = range((3, 1), (4, 31));
        let err = SeasonTable::new([(
            (CalendarType::Meteorological, Hemisphere::Southern),
            ranges,
        )])
        .unwrap_err();
        assert!(matches!(err, TableError::InvalidBoundary { .. }));
    }

    #[test]
    fn test_duplicate_season_is_rejected() {
        let mut ranges = ASTRONOMICAL_SOUTHERN;
        ranges[0].0 = Season::Winter;
        let err = SeasonTable::new([((CalendarType::Astronomical, Hemisphere::Southern), ranges)])
            .unwrap_err();
        assert!(matches!(err, TableError::SeasonMismatch { .. }));
    }

    #[test]
    fn test_range_of() {
        let table = SeasonTable::builtin().unwrap();
        assert_eq!(
            table.range_of(
                CalendarType::Meteorological,
                Hemisphere::Southern,
                Season::Summer
            ),
            Some(range((12, 1), (2, 29)))
        );
        assert_eq!(
            SeasonTable::empty().range_of(
                CalendarType::Astronomical,
                Hemisphere::Northern,
                Season::Winter
            ),
            None
        );
    }
}
