//! Calendar-day helpers and the wall clock
//!
//! Duties and attendance are keyed by *local calendar day*. Every stored
//! day is normalized to local midnight, and "same day" lookups use the
//! inclusive range `[00:00:00.000, 23:59:59.999]` of that day.

use std::sync::Mutex;

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc,
};

/// Inclusive bounds of one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayRange {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            start: start_of_day(date),
            end: end_of_day(date),
        }
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// The day following this one.
    pub fn next(&self) -> Self {
        Self::of(self.start.date() + Duration::days(1))
    }
}

/// Local midnight of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Last representable millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::days(1) - Duration::milliseconds(1)
}

/// Truncate an instant to the midnight of its calendar day.
pub fn normalize(instant: NaiveDateTime) -> NaiveDateTime {
    start_of_day(instant.date())
}

/// Wall-clock time of day as `HH:MM:SS` (24h).
pub fn wall_clock_time(instant: NaiveDateTime) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}

/// Long human form used in e-mails, e.g. `Tuesday, June 10, 2025`.
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Parse `HH:MM` (24h).
pub fn parse_hour_minute(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Parse a fixed UTC offset such as `+08:00` or `-05:30`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "0"));
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse a caller-supplied duty date.
///
/// Accepts a plain `YYYY-MM-DD` (already a local calendar day) or an
/// RFC 3339 timestamp, which is first moved into the clock's local frame.
/// The result is the local midnight of that day.
pub fn parse_day(value: &str, clock: &dyn Clock) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(start_of_day(date));
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(normalize(clock.to_local(instant)));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(normalize)
}

/// Source of "now" in the service's local time zone.
pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Convert an offset-carrying instant into the local frame.
    fn to_local(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Real clock. Uses a fixed UTC offset when configured, otherwise the
/// process-local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn new(offset: Option<FixedOffset>) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset).naive_local(),
            None => Local::now().naive_local(),
        }
    }

    fn to_local(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime {
        match self.offset {
            Some(offset) => instant.with_timezone(&offset).naive_local(),
            None => instant.with_timezone(&Local).naive_local(),
        }
    }
}

/// Settable clock, treated as already local. Offset-carrying inputs are
/// reduced to their own wall-clock reading.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn to_local(&self, instant: DateTime<FixedOffset>) -> NaiveDateTime {
        instant.naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn day_range_is_inclusive_to_the_millisecond() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let range = DayRange::of(day);
        assert_eq!(range.start, dt("2025-06-10 00:00:00.000"));
        assert_eq!(range.end, dt("2025-06-10 23:59:59.999"));
        assert!(range.contains(dt("2025-06-10 23:59:59.999")));
        assert!(!range.contains(dt("2025-06-11 00:00:00.000")));
        assert_eq!(range.next().start, dt("2025-06-11 00:00:00.000"));
    }

    #[test]
    fn normalize_drops_time_of_day() {
        assert_eq!(
            normalize(dt("2025-06-10 17:45:03.120")),
            dt("2025-06-10 00:00:00.000")
        );
    }

    #[test]
    fn wall_clock_is_zero_padded() {
        assert_eq!(wall_clock_time(dt("2025-06-10 08:05:09.000")), "08:05:09");
        assert_eq!(wall_clock_time(dt("2025-06-10 23:59:59.999")), "23:59:59");
    }

    #[test]
    fn long_date_matches_mail_format() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        assert_eq!(long_date(day), "Tuesday, June 10, 2025");
    }

    #[test]
    fn parse_day_accepts_plain_and_rfc3339() {
        let clock = FixedClock::new(dt("2025-06-01 00:00:00.000"));
        assert_eq!(
            parse_day("2025-06-10", &clock),
            Some(dt("2025-06-10 00:00:00.000"))
        );
        assert_eq!(
            parse_day("2025-06-10T15:30:00+08:00", &clock),
            Some(dt("2025-06-10 00:00:00.000"))
        );
        assert_eq!(parse_day("next tuesday", &clock), None);
    }

    #[test]
    fn rfc3339_dates_follow_the_configured_offset() {
        let clock = SystemClock::new(parse_utc_offset("+08:00"));
        // 20:00 UTC on the 9th is already the 10th at +08:00
        assert_eq!(
            parse_day("2025-06-09T20:00:00Z", &clock),
            Some(dt("2025-06-10 00:00:00.000"))
        );
    }

    #[test]
    fn hour_minute_and_offset_parsing() {
        assert_eq!(
            parse_hour_minute("18:30"),
            NaiveTime::from_hms_opt(18, 30, 0)
        );
        assert_eq!(parse_hour_minute("25:00"), None);
        assert_eq!(
            parse_utc_offset("-05:30").map(|o| o.local_minus_utc()),
            Some(-(5 * 3600 + 30 * 60))
        );
        assert_eq!(parse_utc_offset("+8").map(|o| o.local_minus_utc()), Some(8 * 3600));
        assert_eq!(parse_utc_offset("08:00"), None);
    }

    #[test]
    fn fixed_clock_can_be_moved() {
        let clock = FixedClock::new(dt("2025-06-10 08:00:00.000"));
        clock.advance(Duration::days(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 11).unwrap());
        clock.set(dt("2025-01-01 00:00:00.000"));
        assert_eq!(clock.now(), dt("2025-01-01 00:00:00.000"));
    }
}
