//! Injectable time source.
//!
//! Year validation and confirmation-code expiry read the current time through
//! [`Clock`] so both stay deterministic under test.

use chrono::{Datelike, Utc};

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
    /// Current UTC instant.
    fn now(&self) -> Timestamp;

    /// Calendar year of [`Clock::now`].
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl FixedClock {
    /// Midnight UTC on January 1st of `year`.
    pub fn at_year(year: i32) -> Self {
        let instant = chrono::NaiveDate::from_ymd_opt(year, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_year() {
        assert_eq!(FixedClock::at_year(2021).current_year(), 2021);
    }

    #[test]
    fn system_clock_is_not_in_the_past() {
        assert!(SystemClock.current_year() >= 2024);
    }
}
