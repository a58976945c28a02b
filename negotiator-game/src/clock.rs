//! Wall-clock access for history and export timestamps.
use chrono::{DateTime, Local, SecondsFormat, Utc};

use crate::constants::HISTORY_TIME_FORMAT;

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the host's system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant; used for reproducible runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Local time-of-day shown next to each history entry, e.g. `3:07:12 PM`.
#[must_use]
pub fn history_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format(HISTORY_TIME_FORMAT)
        .to_string()
}

/// RFC 3339 UTC timestamp with millisecond precision, as written to exports.
#[must_use]
pub fn export_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap())
    }

    #[test]
    fn export_timestamp_uses_utc_millis() {
        assert_eq!(export_timestamp(fixed().now()), "2026-03-14T15:09:26.000Z");
    }

    #[test]
    fn history_timestamp_is_time_of_day() {
        let stamp = history_timestamp(fixed().now());
        assert!(
            stamp.ends_with(":26 AM") || stamp.ends_with(":26 PM"),
            "{stamp}"
        );
    }

    #[test]
    fn borrowed_clock_delegates() {
        let clock = fixed();
        let borrowed = &clock;
        assert_eq!(borrowed.now(), clock.now());
    }
}
