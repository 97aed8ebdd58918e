//! Wall-clock source and timestamp formatting.
//!
//! Timestamps render as `YYYY-MM-DDThh:mm:ss.mmm±hhmm`: millisecond precision
//! (truncated, never rounded) and a numeric UTC offset.

use chrono::{DateTime, FixedOffset, Local};

/// `strftime` pattern for the `timestamp` attribute.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Source of the current time for message timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl FixedClock {
    /// Parse an RFC 3339 instant, e.g. `2015-05-28T16:14:12.170+07:00`.
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(FixedClock)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Render an instant in service message form.
pub fn format_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_positive_offset() {
        let clock = FixedClock::parse("2015-05-28T16:14:12.170+07:00").unwrap();
        assert_eq!(format_timestamp(&clock.now()), "2015-05-28T16:14:12.170+0700");
    }

    #[test]
    fn test_format_with_negative_offset() {
        let clock = FixedClock::parse("2021-01-02T03:04:05.006-05:30").unwrap();
        assert_eq!(format_timestamp(&clock.now()), "2021-01-02T03:04:05.006-0530");
    }

    #[test]
    fn test_utc_renders_numeric_offset() {
        let clock = FixedClock::parse("2021-01-02T03:04:05Z").unwrap();
        let rendered = format_timestamp(&clock.now());
        assert_eq!(rendered, "2021-01-02T03:04:05.000+0000");
        assert!(!rendered.ends_with('Z'));
    }

    #[test]
    fn test_milliseconds_are_truncated() {
        let clock = FixedClock::parse("2021-01-02T03:04:05.999999+00:00").unwrap();
        assert_eq!(format_timestamp(&clock.now()), "2021-01-02T03:04:05.999+0000");
    }

    #[test]
    fn test_system_clock_shape() {
        let rendered = format_timestamp(&SystemClock.now());
        // 2015-05-28T16:14:12.170+0700
        assert_eq!(rendered.len(), 28);
        assert_eq!(&rendered[10..11], "T");
        assert_eq!(&rendered[19..20], ".");
        assert!(matches!(&rendered[23..24], "+" | "-"));
    }
}
