//! Time source for scheduling decisions.
//!
//! All timestamps are milliseconds since the Unix epoch. Scheduling code never
//! reads the wall clock directly; callers pass `now` taken from a [`Clock`].

use chrono::{DateTime, Local, Utc};
use std::cell::Cell;

/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }

    pub fn advance_days(&self, days: i64) {
        self.advance(days * DAY_MS);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Formats a timestamp as a local YYYY-MM-DD string
pub fn format_date(timestamp: Timestamp) -> String {
    match DateTime::<Utc>::from_timestamp_millis(timestamp) {
        Some(utc) => {
            let local: DateTime<Local> = utc.into();
            local.format("%Y-%m-%d").to_string()
        }
        None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now(), 1_500);

        clock.advance_days(2);
        assert_eq!(clock.now(), 1_500 + 2 * DAY_MS);

        clock.set(0);
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800_000);
    }

    #[test]
    fn test_format_date_out_of_range() {
        assert_eq!(format_date(i64::MAX), "Unknown");
        assert_eq!(format_date(0).len(), 10);
    }
}
