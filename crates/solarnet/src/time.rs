//! Time parsing and ranges.
//!
//! Solar-physics archives are loose about timestamp formats, so queries accept
//! the handful of spellings the catalogues actually use and normalize them to
//! UTC. Everything is treated as UTC; a trailing `Z` is accepted and ignored.

use crate::error::{Result, SolarnetError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

/// Wire format used by the HEK for `event_starttime`/`event_endtime`.
pub const HEK_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a timestamp in any of the accepted formats.
pub fn parse_time(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(SolarnetError::Time(format!(
        "'{}' is not a recognised time format",
        input
    )))
}

/// A closed interval of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(SolarnetError::Time(format!(
                "end {} is before start {}",
                end.format(HEK_TIME_FORMAT),
                start.format(HEK_TIME_FORMAT)
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse both ends of the range from strings.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Every calendar day touched by the range, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        let last = self.end.date_naive();
        let mut day = self.start.date_naive();
        let mut days = Vec::new();
        while day <= last {
            days.push(day);
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_slash_format() {
        let t = parse_time("2011/08/09 07:23:56").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2011, 8, 9));
        assert_eq!((t.hour(), t.minute(), t.second()), (7, 23, 56));
    }

    #[test]
    fn parses_iso_with_fraction_and_zulu() {
        let t = parse_time("2011-08-09T07:23:56.500Z").unwrap();
        assert_eq!(t.second(), 56);
        assert_eq!(t.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let t = parse_time("2011-01-02").unwrap();
        assert_eq!((t.day(), t.hour()), (2, 0));
        assert_eq!(parse_time("20110102").unwrap(), t);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_time("next tuesday").unwrap_err();
        assert!(matches!(err, SolarnetError::Time(_)));
    }

    #[test]
    fn range_rejects_reversed_ends() {
        assert!(TimeRange::parse("2011-01-02", "2011-01-01").is_err());
    }

    #[test]
    fn range_days_are_inclusive() {
        let range = TimeRange::parse("2011-01-30 12:00:00", "2011-02-01 01:00:00").unwrap();
        let days: Vec<String> = range.days().iter().map(|d| d.to_string()).collect();
        assert_eq!(days, vec!["2011-01-30", "2011-01-31", "2011-02-01"]);
    }
}
