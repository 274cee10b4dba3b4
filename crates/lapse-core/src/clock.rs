//! Wall-clock source and minute-window arithmetic.

use std::sync::Mutex;

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Source of "now" for trace stamping and flush decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real UTC clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replay tooling.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = to;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Truncate to the start of the minute (seconds and sub-seconds zeroed).
pub fn truncate_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.duration_trunc(Duration::minutes(1)).unwrap_or(ts)
}

/// Minute bucket label, e.g. `2024-01-01T00:05:00`.
pub fn minute_bucket(ts: DateTime<Utc>) -> String {
    truncate_to_minute(ts).format("%Y-%m-%dT%H:%M:00").to_string()
}

/// True when `a` and `b` fall in different wall-clock minutes.
pub fn crossed_minute(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    truncate_to_minute(a) != truncate_to_minute(b)
}

/// Next fire time of the `* * * * *` schedule strictly after `now`.
pub fn next_minute_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    truncate_to_minute(now) + Duration::minutes(1)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, h, m, s).unwrap()
    }

    #[test]
    fn truncation_and_bucket_label() {
        let ts = at(13, 7, 42) + Duration::milliseconds(250);
        assert_eq!(truncate_to_minute(ts), at(13, 7, 0));
        assert_eq!(minute_bucket(ts), "2024-03-09T13:07:00");
    }

    #[test]
    fn next_boundary_is_strictly_after() {
        assert_eq!(next_minute_boundary(at(0, 0, 10)), at(0, 1, 0));
        assert_eq!(next_minute_boundary(at(0, 1, 0)), at(0, 2, 0));
        assert_eq!(
            next_minute_boundary(at(23, 59, 59)),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn crossed_minute_compares_whole_minute_not_field() {
        // Same minute-of-hour, different hour.
        assert!(crossed_minute(at(1, 5, 0), at(2, 5, 0)));
        assert!(!crossed_minute(at(1, 5, 0), at(1, 5, 59)));
    }

    #[test]
    fn manual_clock_advances() {
        let c = ManualClock::new(at(0, 0, 0));
        c.advance(Duration::seconds(90));
        assert_eq!(c.now(), at(0, 1, 30));
        c.set(at(5, 0, 0));
        assert_eq!(c.now(), at(5, 0, 0));
    }
}
