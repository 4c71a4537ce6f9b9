//! Timestamps and calendar-aware elapsed time
//!
//! Design principles:
//! - Unix seconds, UTC, second resolution, no external datetime crates
//! - Proleptic Gregorian calendar via Howard Hinnant's civil-date algorithms
//! - Calendar-unit elapsed time is monotonic, continuous, and lands exactly
//!   on whole numbers at civil anniversaries

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, TimeError};

// ============================================================================
// Calendar constants and helpers
// ============================================================================

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days from 0000-03-01 to 1970-01-01 in the proleptic Gregorian calendar
const UNIX_EPOCH_DAYS: i64 = 719_468;

const SECS_PER_MINUTE: i64 = 60;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_DAY: i64 = 86_400;

/// True for leap years in the proleptic Gregorian calendar
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Number of days in a civil month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[(month - 1) as usize]
    }
}

/// Number of days in a civil year
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Days since the Unix epoch for a civil date (Hinnant's days_from_civil)
fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - UNIX_EPOCH_DAYS
}

/// Civil date for days since the Unix epoch (Hinnant's civil_from_days)
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + UNIX_EPOCH_DAYS;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = (if month <= 2 { y + 1 } else { y }) as i32;
    (year, month, day)
}

// ============================================================================
// Timestamp
// ============================================================================

/// A point in time: Unix seconds, UTC, second resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: i64,
}

impl Timestamp {
    // ========== Construction ==========

    /// Wrap a raw Unix timestamp in seconds
    pub fn from_unix(secs: i64) -> Self {
        Timestamp { secs }
    }

    /// Midnight UTC on a civil date
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, TimeError> {
        Self::from_ymd_hms(year, month, day, 0, 0, 0)
    }

    /// A civil date and time of day, validated component by component
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, TimeError> {
        if !(1..=12).contains(&month) {
            return Err(TimeError::InvalidMonth(month));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(TimeError::InvalidDay { year, month, day });
        }
        if hour > 23 {
            return Err(TimeError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(TimeError::InvalidMinute(minute));
        }
        if second > 59 {
            return Err(TimeError::InvalidSecond(second));
        }
        let days = days_from_civil(year, month, day);
        let secs = days * SECS_PER_DAY
            + hour as i64 * SECS_PER_HOUR
            + minute as i64 * SECS_PER_MINUTE
            + second as i64;
        Ok(Timestamp { secs })
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[Z]`, or `YYYY-MM-DD HH:MM:SS`.
    ///
    /// Fractional seconds are accepted and truncated.
    pub fn parse(input: &str) -> Result<Self, TimeError> {
        let s = input.trim();
        let (date, time) = match s.find(['T', ' ']) {
            Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
            None => (s, None),
        };
        let (year, month, day) =
            parse_date(date).ok_or_else(|| TimeError::Parse(input.to_string()))?;
        let (hour, minute, second) = match time {
            None => (0, 0, 0),
            Some(t) => parse_time(t.trim_end_matches('Z'))
                .ok_or_else(|| TimeError::Parse(input.to_string()))?,
        };
        Self::from_ymd_hms(year, month, day, hour, minute, second)
    }

    /// Raw Unix seconds
    pub fn unix_seconds(&self) -> i64 {
        self.secs
    }

    // ========== Civil accessors ==========

    fn civil(&self) -> (i32, u32, u32) {
        civil_from_days(self.secs.div_euclid(SECS_PER_DAY))
    }

    pub fn year(&self) -> i32 {
        self.civil().0
    }

    pub fn month(&self) -> u32 {
        self.civil().1
    }

    pub fn day(&self) -> u32 {
        self.civil().2
    }

    /// Seconds since midnight UTC
    pub fn seconds_of_day(&self) -> i64 {
        self.secs.rem_euclid(SECS_PER_DAY)
    }

    pub fn hour(&self) -> u32 {
        (self.seconds_of_day() / SECS_PER_HOUR) as u32
    }

    pub fn minute(&self) -> u32 {
        ((self.seconds_of_day() % SECS_PER_HOUR) / SECS_PER_MINUTE) as u32
    }

    pub fn second(&self) -> u32 {
        (self.seconds_of_day() % SECS_PER_MINUTE) as u32
    }

    /// 1-based ordinal day within the year (Jan 1 is 1)
    pub fn day_of_year(&self) -> u32 {
        let (year, month, day) = self.civil();
        let mut doy = day;
        for m in 1..month {
            doy += days_in_month(year, m);
        }
        doy
    }

    // ========== Calendar arithmetic ==========

    /// Shift by whole calendar months, clamping the day to the target
    /// month's length and preserving the time of day.
    ///
    /// 2023-01-31 plus one month is 2023-02-28.
    pub fn add_months(&self, months: i64) -> Self {
        let (year, month, day) = self.civil();
        let total = year as i64 * 12 + (month as i64 - 1) + months;
        let new_year = total.div_euclid(12) as i32;
        let new_month = (total.rem_euclid(12) + 1) as u32;
        let new_day = day.min(days_in_month(new_year, new_month));
        let days = days_from_civil(new_year, new_month, new_day);
        Timestamp {
            secs: days * SECS_PER_DAY + self.seconds_of_day(),
        }
    }

    // ========== Elapsed time ==========

    /// Elapsed time since `reference`, expressed in `unit`.
    ///
    /// Hours and days are exact second arithmetic (3600 s and 86400 s).
    /// Calendar units follow the civil calendar: one calendar month from
    /// Jan 31 is Feb 28 (or 29), one calendar year from Mar 1 2023 is
    /// Mar 1 2024 even across the leap day. Negative when `self`
    /// precedes the reference.
    pub fn elapsed(&self, reference: Timestamp, unit: TimeUnit) -> f64 {
        match unit {
            TimeUnit::Hour => (self.secs - reference.secs) as f64 / SECS_PER_HOUR as f64,
            TimeUnit::Day => (self.secs - reference.secs) as f64 / SECS_PER_DAY as f64,
            TimeUnit::CalendarMonth => self.elapsed_calendar_months(reference),
            TimeUnit::CalendarYear => self.elapsed_calendar_years(reference),
        }
    }

    /// Whole months between the reference and `self`, plus the fraction
    /// of the current anchor-to-anchor span.
    ///
    /// Anchors are the reference shifted by whole months. Normalizing the
    /// remainder by the anchor span (rather than a fixed month length)
    /// keeps the result monotonic and exactly integral at every month
    /// anniversary, including day-clamped anniversaries of month-end
    /// references.
    fn elapsed_calendar_months(&self, reference: Timestamp) -> f64 {
        let (ref_year, ref_month, _) = reference.civil();
        let (year, month, _) = self.civil();
        let mut whole = (year as i64 - ref_year as i64) * 12 + (month as i64 - ref_month as i64);
        let mut anchor = reference.add_months(whole);
        if anchor.secs > self.secs {
            // The initial guess lands in self's civil month, so it can
            // overshoot by at most one month.
            whole -= 1;
            anchor = reference.add_months(whole);
        }
        let next = reference.add_months(whole + 1);
        let span = (next.secs - anchor.secs) as f64;
        whole as f64 + (self.secs - anchor.secs) as f64 / span
    }

    /// Civil year difference plus the difference of fractional year
    /// positions, each position normalized by its own year's length.
    fn elapsed_calendar_years(&self, reference: Timestamp) -> f64 {
        fn position(ts: Timestamp) -> f64 {
            let days = (ts.day_of_year() - 1) as f64
                + ts.seconds_of_day() as f64 / SECS_PER_DAY as f64;
            days / days_in_year(ts.year()) as f64
        }
        (self.year() - reference.year()) as f64 + position(*self) - position(reference)
    }

    // ========== Formatting ==========

    /// ISO 8601 `YYYY-MM-DDTHH:MM:SSZ`
    pub fn to_iso_string(&self) -> String {
        let (year, month, day) = self.civil();
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            year,
            month,
            day,
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

fn parse_date(s: &str) -> Option<(i32, u32, u32)> {
    let mut parts = s.split('-');
    let year = parts.next()?.parse().ok()?;
    let month = parts.next()?.parse().ok()?;
    let day = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((year, month, day))
}

fn parse_time(s: &str) -> Option<(u32, u32, u32)> {
    let mut parts = s.split(':');
    let hour = parts.next()?.parse().ok()?;
    let minute = parts.next()?.parse().ok()?;
    let second = match parts.next() {
        Some(sec) => sec.split('.').next()?.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((hour, minute, second))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Time units
// ============================================================================

/// Unit for an elapsed-time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hour,
    Day,
    CalendarMonth,
    CalendarYear,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::CalendarMonth => "calendar_month",
            TimeUnit::CalendarYear => "calendar_year",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(TimeUnit::Hour),
            "day" => Ok(TimeUnit::Day),
            "calendar_month" => Ok(TimeUnit::CalendarMonth),
            "calendar_year" => Ok(TimeUnit::CalendarYear),
            other => Err(ConfigError::InvalidTimeUnit(other.to_string())),
        }
    }
}
