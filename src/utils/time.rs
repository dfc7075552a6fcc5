use chrono::{
    DateTime, Days, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, SecondsFormat, TimeDelta,
    TimeZone, Utc,
};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while resolving a relative time phrase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Expected '<amount> <unit>', got '{0}'")]
    InvalidPhrase(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown time unit: {0}")]
    UnsupportedUnit(String),

    #[error("Resolved time is out of range: {0}")]
    OutOfRange(String),
}

/// Units accepted in a relative time phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for TimeUnit {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "minute" | "minutes" => Ok(TimeUnit::Minute),
            "hour" | "hours" => Ok(TimeUnit::Hour),
            "day" | "days" => Ok(TimeUnit::Day),
            "week" | "weeks" => Ok(TimeUnit::Week),
            "month" | "months" => Ok(TimeUnit::Month),
            "year" | "years" => Ok(TimeUnit::Year),
            _ => Err(TimeError::UnsupportedUnit(s.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        };
        f.write_str(name)
    }
}

/// A parsed "<amount> <unit>" phrase such as "10 minutes" or "2 days"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeTime {
    pub amount: u32,
    pub unit: TimeUnit,
}

impl FromStr for RelativeTime {
    type Err = TimeError;

    /// Tokens are split on any run of whitespace. Exactly two are required:
    /// an unsigned integer amount followed by a unit word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let [amount, unit] = tokens.as_slice() else {
            return Err(TimeError::InvalidPhrase(s.to_string()));
        };

        let unit = unit.parse::<TimeUnit>()?;
        let amount = amount
            .parse::<u32>()
            .map_err(|_| TimeError::InvalidAmount(amount.to_string()))?;

        Ok(RelativeTime { amount, unit })
    }
}

impl RelativeTime {
    /// The instant `amount` units before `reference`.
    ///
    /// Minutes and hours are exact durations. Days, weeks, months and years
    /// step the local wall clock and are read back in the reference's zone
    /// with [`localize`], so "1 day" across a DST change keeps the wall-clock
    /// time. Month arithmetic clamps to the last day of a shorter month
    /// (2024-03-31 minus one month is 2024-02-29).
    pub fn before<Tz: TimeZone>(&self, reference: &DateTime<Tz>) -> Result<DateTime<Tz>, TimeError> {
        let amount = u64::from(self.amount);
        let out_of_range = || TimeError::OutOfRange(format!("{} {}(s)", self.amount, self.unit));
        let local = reference.naive_local();

        let wall_clock = match self.unit {
            TimeUnit::Minute => {
                return TimeDelta::try_minutes(amount as i64)
                    .and_then(|delta| reference.clone().checked_sub_signed(delta))
                    .ok_or_else(out_of_range)
            }
            TimeUnit::Hour => {
                return TimeDelta::try_hours(amount as i64)
                    .and_then(|delta| reference.clone().checked_sub_signed(delta))
                    .ok_or_else(out_of_range)
            }
            TimeUnit::Day => local.checked_sub_days(Days::new(amount)),
            TimeUnit::Week => amount
                .checked_mul(7)
                .and_then(|days| local.checked_sub_days(Days::new(days))),
            TimeUnit::Month => local.checked_sub_months(Months::new(self.amount)),
            TimeUnit::Year => self
                .amount
                .checked_mul(12)
                .and_then(|months| local.checked_sub_months(Months::new(months))),
        };

        wall_clock
            .and_then(|naive| localize(&naive, &reference.timezone()))
            .map(|dt| dt.with_timezone(&reference.timezone()))
            .ok_or_else(out_of_range)
    }
}

/// Resolve a human phrase like "10 minutes" to the instant that long before `reference`
pub fn resolve<Tz: TimeZone>(phrase: &str, reference: &DateTime<Tz>) -> Result<DateTime<Tz>, TimeError> {
    phrase.parse::<RelativeTime>()?.before(reference)
}

/// Parse an absolute timestamp.
///
/// Accepts RFC 3339 / RFC 2822 strings with an offset, ISO-like local date
/// times without one, and bare `YYYY-MM-DD` dates (midnight). Values with no
/// offset are read in `tz`.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const LOCAL_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return localize(&naive, tz);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| localize(&naive, tz))
}

/// Read a wall-clock time in `tz`.
///
/// A time repeated by a DST fold maps to its earlier instant. A time skipped
/// by a DST gap is read with the offset in force before the gap, which moves
/// it forward by the gap's length (02:30 on a spring-forward night becomes
/// 03:30, a skipped midnight becomes the first instant of the day).
pub fn localize<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => {
            // A day earlier is safely before the transition for any real offset
            let before_gap = naive.checked_sub_signed(TimeDelta::days(1))?;
            let offset = tz.offset_from_utc_datetime(&before_gap).fix();
            offset
                .from_local_datetime(naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc))
        }
    }
}

/// Format as `2024-06-05T09:50:00.000Z`
pub fn to_iso_string(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::{Los_Angeles, Santiago};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_relative_time() {
        assert_eq!(
            "10 minutes".parse::<RelativeTime>(),
            Ok(RelativeTime { amount: 10, unit: TimeUnit::Minute })
        );
        assert_eq!(
            "  10   minutes ".parse::<RelativeTime>(),
            Ok(RelativeTime { amount: 10, unit: TimeUnit::Minute })
        );
        assert_eq!(
            "1 Hour".parse::<RelativeTime>(),
            Ok(RelativeTime { amount: 1, unit: TimeUnit::Hour })
        );

        // Invalid cases
        assert!(matches!("10".parse::<RelativeTime>(), Err(TimeError::InvalidPhrase(_))));
        assert!(matches!(
            "10 minutes before".parse::<RelativeTime>(),
            Err(TimeError::InvalidPhrase(_))
        ));
        assert!(matches!("ten minutes".parse::<RelativeTime>(), Err(TimeError::InvalidAmount(_))));
        assert!(matches!("-5 minutes".parse::<RelativeTime>(), Err(TimeError::InvalidAmount(_))));
        assert_eq!(
            "3 fortnights".parse::<RelativeTime>(),
            Err(TimeError::UnsupportedUnit("fortnights".to_string()))
        );
    }

    #[test]
    fn test_resolve_fixed_units() {
        let reference = utc(2024, 6, 5, 10, 0);

        assert_eq!(resolve("10 minutes", &reference).unwrap(), utc(2024, 6, 5, 9, 50));
        assert_eq!(resolve("1 minute", &reference).unwrap(), utc(2024, 6, 5, 9, 59));
        assert_eq!(resolve("3 hours", &reference).unwrap(), utc(2024, 6, 5, 7, 0));
        assert_eq!(resolve("2 days", &reference).unwrap(), utc(2024, 6, 3, 10, 0));
        assert_eq!(resolve("1 week", &reference).unwrap(), utc(2024, 5, 29, 10, 0));
        assert_eq!(resolve("0 days", &reference).unwrap(), reference);
    }

    #[test]
    fn test_resolve_month_clamps_to_end_of_month() {
        assert_eq!(resolve("1 month", &utc(2024, 3, 31, 0, 0)).unwrap(), utc(2024, 2, 29, 0, 0));
        assert_eq!(resolve("1 month", &utc(2023, 3, 31, 0, 0)).unwrap(), utc(2023, 2, 28, 0, 0));
        assert_eq!(resolve("2 months", &utc(2024, 1, 15, 8, 30)).unwrap(), utc(2023, 11, 15, 8, 30));
        assert_eq!(resolve("1 year", &utc(2024, 2, 29, 12, 0)).unwrap(), utc(2023, 2, 28, 12, 0));
    }

    #[test]
    fn test_resolve_day_keeps_wall_clock_across_dst() {
        // DST started in Los Angeles at 02:00 on 2024-03-10
        let reference = Los_Angeles.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let resolved = resolve("1 day", &reference).unwrap();
        assert_eq!(
            resolved.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-09 12:00"
        );
        assert_eq!((reference - resolved).num_hours(), 23);

        // Hours are exact durations instead
        let resolved = resolve("24 hours", &reference).unwrap();
        assert_eq!(
            resolved.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-09 11:00"
        );

        // 02:30 did not exist on 2025-03-09; the result moves past the gap
        let reference = Los_Angeles.with_ymd_and_hms(2025, 3, 10, 2, 30, 0).unwrap();
        let resolved = resolve("1 day", &reference).unwrap();
        assert_eq!(
            resolved.format("%Y-%m-%d %H:%M %Z").to_string(),
            "2025-03-09 03:30 PDT"
        );
        assert_eq!(resolved.with_timezone(&Utc), utc(2025, 3, 9, 10, 30));

        let reference = Los_Angeles.with_ymd_and_hms(2025, 4, 9, 2, 30, 0).unwrap();
        let resolved = resolve("1 month", &reference).unwrap();
        assert_eq!(
            resolved.format("%Y-%m-%d %H:%M").to_string(),
            "2025-03-09 03:30"
        );
        let reference = Los_Angeles.with_ymd_and_hms(2025, 3, 16, 2, 30, 0).unwrap();
        assert!(resolve("1 week", &reference).is_ok());
    }

    #[test]
    fn test_localize_dst_gap_and_fold() {
        // Santiago skipped midnight on 2024-09-08 (clocks jumped to 01:00)
        let midnight = NaiveDate::from_ymd_opt(2024, 9, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(localize(&midnight, &Santiago), Some(utc(2024, 9, 8, 4, 0)));

        // 01:30 happened twice in Los Angeles on 2024-11-03; the earlier one wins
        let repeated = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(localize(&repeated, &Los_Angeles), Some(utc(2024, 11, 3, 8, 30)));
    }

    #[test]
    fn test_resolve_unsupported_unit() {
        let reference = utc(2024, 6, 5, 10, 0);
        assert!(matches!(
            resolve("5 decades", &reference),
            Err(TimeError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        // With offset
        assert_eq!(
            parse_timestamp("2024-06-05T10:00:00-07:00", &Los_Angeles),
            Some(utc(2024, 6, 5, 17, 0))
        );
        assert_eq!(
            parse_timestamp("2024-06-05T10:00:00.000Z", &Utc),
            Some(utc(2024, 6, 5, 10, 0))
        );

        // Local date time is read in the given zone
        assert_eq!(
            parse_timestamp("2024-06-05T10:00:00", &Los_Angeles),
            Some(utc(2024, 6, 5, 17, 0))
        );
        assert_eq!(
            parse_timestamp("2024-06-05 10:00", &Utc),
            Some(utc(2024, 6, 5, 10, 0))
        );

        // Bare date is midnight
        assert_eq!(
            parse_timestamp("2024-06-12", &Los_Angeles),
            Some(utc(2024, 6, 12, 7, 0))
        );

        // Bare date whose midnight was skipped starts at the end of the gap
        assert_eq!(
            parse_timestamp("2024-09-08", &Santiago),
            Some(utc(2024, 9, 8, 4, 0))
        );

        // Relative phrases are not absolute timestamps
        assert_eq!(parse_timestamp("10 minutes", &Utc), None);
        assert_eq!(parse_timestamp("", &Utc), None);
        assert_eq!(parse_timestamp("tomorrow", &Utc), None);
    }

    #[test]
    fn test_to_iso_string() {
        assert_eq!(to_iso_string(&utc(2024, 6, 5, 9, 50)), "2024-06-05T09:50:00.000Z");
    }
}
