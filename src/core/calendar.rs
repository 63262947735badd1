use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Source of "now" for quota and cooldown decisions
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance(&self, by: Duration) {
        let next = self.now() + by;
        self.set(next);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// One calendar day as the half-open UTC range `[start, end)`.
///
/// Day boundaries are local midnights of the configured offset. Both the
/// PASS cooldown and the daily quota use the same window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// The calendar day containing `now` in `offset`
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_midnight = now
            .with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let utc_midnight =
            local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
        let start = Utc.from_utc_datetime(&utc_midnight);

        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    #[inline]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_utc_window() {
        let window = DayWindow::containing(utc("2024-03-10T15:30:00Z"), FixedOffset::east_opt(0).unwrap());

        assert_eq!(window.start, utc("2024-03-10T00:00:00Z"));
        assert_eq!(window.end, utc("2024-03-11T00:00:00Z"));
        assert!(window.contains(utc("2024-03-10T00:00:00Z")));
        assert!(!window.contains(utc("2024-03-11T00:00:00Z")));
        assert!(!window.contains(utc("2024-03-09T23:59:59Z")));
    }

    #[test]
    fn test_offset_window_crosses_utc_date() {
        // 23:30 UTC on the 10th is already the 11th in UTC+7
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let window = DayWindow::containing(utc("2024-03-10T23:30:00Z"), offset);

        assert_eq!(window.start, utc("2024-03-10T17:00:00Z"));
        assert_eq!(window.end, utc("2024-03-11T17:00:00Z"));
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::new(utc("2024-03-10T12:00:00Z"));
        clock.advance(Duration::days(1));

        assert_eq!(clock.now(), utc("2024-03-11T12:00:00Z"));
    }
}
