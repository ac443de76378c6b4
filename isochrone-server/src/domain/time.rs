//! Service-day clock times from transit feeds.
//!
//! Feeds give stop times as "HH:MM:SS" measured from the start of the service
//! day. Hours may run past 24 for trips that continue after midnight
//! ("25:10:00" is ten past one the next morning), and some feeds instead wrap
//! back to "00:..". Both forms are handled here.

use std::fmt;
use std::ops::Sub;

use chrono::Duration;

/// Seconds in one service day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day on the service day, in seconds since its midnight.
///
/// # Examples
///
/// ```
/// use isochrone_server::domain::ServiceTime;
///
/// let t = ServiceTime::parse("08:15:30").unwrap();
/// assert_eq!(t.seconds(), 8 * 3600 + 15 * 60 + 30);
///
/// // Single-digit hours and post-midnight hours are both valid
/// assert!(ServiceTime::parse("7:05:00").is_ok());
/// assert_eq!(ServiceTime::parse("25:00:00").unwrap().seconds(), 90_000);
///
/// // Malformed input is rejected
/// assert!(ServiceTime::parse("08:15").is_err());
/// assert!(ServiceTime::parse("08:61:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceTime(u32);

impl ServiceTime {
    /// Create a time from seconds since service-day midnight.
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Parse "H:MM:SS" or "HH:MM:SS". Hours are not capped at 23.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 3 || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TimeError::new("invalid hour digits"));
        }
        let hour: u32 = h.parse().map_err(|_| TimeError::new("invalid hour digits"))?;

        let minute = parse_two_digits(m.as_bytes())
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let second = parse_two_digits(sec.as_bytes())
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }

        Ok(Self(hour * 3600 + minute * 60 + second))
    }

    /// Returns seconds since service-day midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }
}

impl Sub for ServiceTime {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        Duration::seconds(i64::from(self.0) - i64::from(rhs.0))
    }
}

impl fmt::Debug for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceTime({})", self)
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.0 / 3600,
            (self.0 / 60) % 60,
            self.0 % 60
        )
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

/// Time from leaving one stop to arriving at the next, in seconds.
///
/// A negative difference means the feed wrapped the clock at midnight
/// instead of counting past 24:00, so one day is added back.
///
/// # Examples
///
/// ```
/// use isochrone_server::domain::{ServiceTime, hop_seconds};
///
/// let dep = ServiceTime::parse("23:59:50").unwrap();
/// let arr = ServiceTime::parse("00:00:20").unwrap();
/// assert_eq!(hop_seconds(dep, arr), 30);
/// ```
pub fn hop_seconds(departure: ServiceTime, arrival: ServiceTime) -> i64 {
    let raw = (arrival - departure).num_seconds();
    if raw < 0 { raw + SECONDS_PER_DAY } else { raw }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ServiceTime {
        ServiceTime::parse(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(t("00:00:00").seconds(), 0);
        assert_eq!(t("23:59:59").seconds(), 86_399);
        assert_eq!(t("14:30:05").seconds(), 14 * 3600 + 30 * 60 + 5);
        assert_eq!(t("5:00:00").seconds(), 5 * 3600);
        assert_eq!(t(" 06:00:00 ").seconds(), 6 * 3600);
    }

    #[test]
    fn parse_past_midnight() {
        let late = t("24:10:00");
        assert_eq!(late.seconds(), 87_000);
        assert_eq!(t("47:59:59").seconds(), 47 * 3600 + 59 * 60 + 59);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(ServiceTime::parse("").is_err());
        assert!(ServiceTime::parse("12:00").is_err());
        assert!(ServiceTime::parse("12:00:00:00").is_err());
        assert!(ServiceTime::parse("12-00-00").is_err());
        assert!(ServiceTime::parse("12:0:00").is_err());
        assert!(ServiceTime::parse("12:00:0").is_err());
        assert!(ServiceTime::parse("ab:00:00").is_err());
        assert!(ServiceTime::parse(":00:00").is_err());
    }

    #[test]
    fn parse_out_of_range() {
        assert!(ServiceTime::parse("12:60:00").is_err());
        assert!(ServiceTime::parse("12:00:60").is_err());
    }

    #[test]
    fn display_zero_pads() {
        assert_eq!(t("7:05:09").to_string(), "07:05:09");
        assert_eq!(t("25:00:00").to_string(), "25:00:00");
        assert_eq!(format!("{:?}", t("01:02:03")), "ServiceTime(01:02:03)");
    }

    #[test]
    fn subtraction_is_signed() {
        assert_eq!(t("10:01:00") - t("10:00:00"), Duration::seconds(60));
        assert_eq!(t("10:00:00") - t("10:01:00"), Duration::seconds(-60));
    }

    #[test]
    fn hop_plain() {
        assert_eq!(hop_seconds(t("10:00:00"), t("10:02:30")), 150);
        assert_eq!(hop_seconds(t("10:00:00"), t("10:00:00")), 0);
    }

    #[test]
    fn hop_over_midnight_wrapped_clock() {
        assert_eq!(hop_seconds(t("23:59:50"), t("00:00:20")), 30);
        assert_eq!(hop_seconds(t("23:58:00"), t("00:03:00")), 300);
    }

    #[test]
    fn hop_over_midnight_extended_clock() {
        assert_eq!(hop_seconds(t("23:59:50"), t("24:00:20")), 30);
    }
}
