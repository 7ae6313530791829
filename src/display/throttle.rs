//! Leading-edge throttle.
//!
//! The first call in a window passes and latches; every further call is
//! dropped until the window has elapsed. There is no trailing flush, so the
//! last of a burst of events may never be forwarded.

use std::sync::Arc;
use std::time::Duration;

use crate::time_source::TimeSource;

pub struct Throttle {
    window: Duration,
    time_source: Arc<dyn TimeSource>,
    latched_at: Option<Duration>,
}

impl Throttle {
    pub fn new(window: Duration, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            window,
            time_source,
            latched_at: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` if the caller may proceed, latching the throttle.
    pub fn try_acquire(&mut self) -> bool {
        let now = self.time_source.monotonic();

        if let Some(latched_at) = self.latched_at
            && now.saturating_sub(latched_at) < self.window
        {
            return false;
        }

        self.latched_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::VirtualTimeSource;
    use chrono::NaiveDate;

    fn clock() -> Arc<VirtualTimeSource> {
        Arc::new(VirtualTimeSource::at_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap())
    }

    #[test]
    fn test_burst_within_window_passes_once() {
        let clock = clock();
        let mut throttle = Throttle::new(Duration::from_millis(33), clock.clone());

        let passed = (0..10)
            .filter(|_| {
                let ok = throttle.try_acquire();
                clock.advance(Duration::from_millis(3));
                ok
            })
            .count();
        assert_eq!(passed, 1);
    }

    #[test]
    fn test_spaced_events_all_pass() {
        let clock = clock();
        let mut throttle = Throttle::new(Duration::from_millis(33), clock.clone());

        for _ in 0..5 {
            assert!(throttle.try_acquire());
            clock.advance(Duration::from_millis(34));
        }
    }

    #[test]
    fn test_window_boundary_reopens() {
        let clock = clock();
        let mut throttle = Throttle::new(Duration::from_millis(33), clock.clone());

        assert!(throttle.try_acquire());
        clock.advance(Duration::from_millis(32));
        assert!(!throttle.try_acquire());
        clock.advance(Duration::from_millis(1));
        assert!(throttle.try_acquire());
    }

    #[test]
    fn test_dropped_events_do_not_extend_window() {
        let clock = clock();
        let mut throttle = Throttle::new(Duration::from_millis(33), clock.clone());

        assert!(throttle.try_acquire());
        clock.advance(Duration::from_millis(20));
        assert!(!throttle.try_acquire());
        clock.advance(Duration::from_millis(13));
        assert!(throttle.try_acquire());
    }
}
