//! Time source abstraction for real and virtual time.
//!
//! The controller needs two clocks: a wall clock (which calendar day is it?)
//! and a monotonic clock (how long since the last forwarded resize?). Both
//! come from a [`TimeSource`] so tests can replace them with a
//! [`VirtualTimeSource`] that only moves when told to, and the `--date`
//! override can pin the calendar day with a [`PinnedDateTimeSource`].

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Local>;

    /// Monotonic time elapsed since this source was created.
    fn monotonic(&self) -> Duration;
}

/// Real time from the system clock.
pub struct RealTimeSource {
    origin: Instant,
}

impl RealTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual time that only advances through [`VirtualTimeSource::advance`].
///
/// Advancing moves both the wall clock and the monotonic clock by the same
/// amount, so a throttle window measured against it is fully deterministic.
pub struct VirtualTimeSource {
    current: Mutex<DateTime<Local>>,
    elapsed: Mutex<Duration>,
}

impl VirtualTimeSource {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            current: Mutex::new(start),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    /// Start at local noon of `date`.
    ///
    /// Noon avoids DST gaps, which only ever fall in the early morning.
    pub fn at_date(date: NaiveDate) -> Option<Self> {
        let naive = date.and_hms_opt(12, 0, 0)?;
        let start = Local.from_local_datetime(&naive).single()?;
        Some(Self::new(start))
    }

    /// Move both clocks forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += by;
        }
        if let Ok(mut current) = self.current.lock()
            && let Ok(delta) = chrono::Duration::from_std(by)
        {
            *current += delta;
        }
    }

    /// Jump the wall clock to a different day without touching elapsed time.
    pub fn set_date(&self, date: NaiveDate) {
        if let Some(naive) = date.and_hms_opt(12, 0, 0)
            && let Some(moved) = Local.from_local_datetime(&naive).single()
            && let Ok(mut current) = self.current.lock()
        {
            *current = moved;
        }
    }
}

impl TimeSource for VirtualTimeSource {
    fn now(&self) -> DateTime<Local> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn monotonic(&self) -> Duration {
        match self.elapsed.lock() {
            Ok(elapsed) => *elapsed,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// A fixed calendar day with a real clock.
///
/// The time of day and the monotonic clock keep running, only the date is
/// replaced. Used to run the controller "as if" it were another day.
pub struct PinnedDateTimeSource {
    date: NaiveDate,
    origin: Instant,
}

impl PinnedDateTimeSource {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            origin: Instant::now(),
        }
    }
}

impl TimeSource for PinnedDateTimeSource {
    fn now(&self) -> DateTime<Local> {
        let real = Local::now();
        let naive = self.date.and_time(real.time());
        // Times skipped by a DST change on the pinned date fall back to noon
        Local
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                let noon = self.date.and_hms_opt(12, 0, 0)?;
                Local.from_local_datetime(&noon).earliest()
            })
            .unwrap_or(real)
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Parse a date in the format "YYYY-MM-DD".
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date format: {e}. Use YYYY-MM-DD"))
}
