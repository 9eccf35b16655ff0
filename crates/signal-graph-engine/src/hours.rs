//! Market-hours boundary.
//!
//! Holiday and early-close awareness is owned entirely by the external
//! trading-calendar collaborator; the engine only asks "is regular trading
//! hours open at time T". The built-in [`WeekdaySessionCalendar`] covers
//! the weekday/session-window part for deployments without that
//! collaborator wired in.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};

/// The external trading-calendar capability.
pub trait MarketCalendar: Send + Sync {
    fn is_open(&self, ts: DateTime<Utc>) -> bool;
}

/// Calendar that is always open. Used when RTH enforcement is disabled and
/// in tests.
pub struct AlwaysOpen;

impl MarketCalendar for AlwaysOpen {
    fn is_open(&self, _ts: DateTime<Utc>) -> bool {
        true
    }
}

/// Monday-Friday session window in UTC, open-inclusive, close-exclusive.
///
/// Defaults to 14:30-21:00 UTC (09:30-16:00 New York outside DST shifts).
pub struct WeekdaySessionCalendar {
    open: NaiveTime,
    close: NaiveTime,
}

impl WeekdaySessionCalendar {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Self {
        Self { open, close }
    }
}

impl Default for WeekdaySessionCalendar {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(14, 30, 0).expect("valid session open"),
            close: NaiveTime::from_hms_opt(21, 0, 0).expect("valid session close"),
        }
    }
}

impl MarketCalendar for WeekdaySessionCalendar {
    fn is_open(&self, ts: DateTime<Utc>) -> bool {
        match ts.weekday() {
            Weekday::Sat | Weekday::Sun => false,
            _ => {
                let t = ts.time();
                t >= self.open && t < self.close
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn weekday_session_window() {
        let cal = WeekdaySessionCalendar::default();
        // Wednesday 2024-06-05.
        assert!(cal.is_open(at(2024, 6, 5, 15, 0)));
        assert!(cal.is_open(at(2024, 6, 5, 14, 30)), "open is inclusive");
        assert!(!cal.is_open(at(2024, 6, 5, 21, 0)), "close is exclusive");
        assert!(!cal.is_open(at(2024, 6, 5, 9, 0)), "pre-market closed");
    }

    #[test]
    fn weekend_is_closed() {
        let cal = WeekdaySessionCalendar::default();
        // Saturday 2024-06-08.
        assert!(!cal.is_open(at(2024, 6, 8, 15, 0)));
        // Sunday 2024-06-09.
        assert!(!cal.is_open(at(2024, 6, 9, 15, 0)));
    }

    #[test]
    fn always_open_is_always_open() {
        assert!(AlwaysOpen.is_open(at(2024, 6, 9, 3, 0)));
    }
}
