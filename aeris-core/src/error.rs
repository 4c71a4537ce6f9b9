//! Structured errors for configuration and data contract failures
//!
//! Configuration problems are reported before any computation runs.
//! Degenerate numeric situations (tiny samples, zero variance, all
//! values missing) are not errors; analyses report NaN and advisory
//! flags for those.

use thiserror::Error;

use crate::time::Timestamp;

/// Invalid analysis configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid time unit '{0}'. Valid units are: hour, day, calendar_month, calendar_year")]
    InvalidTimeUnit(String),

    #[error("Invalid correlation method '{0}'. Valid methods are: pearson, spearman")]
    InvalidMethod(String),

    #[error("Invalid statistic name '{0}'")]
    InvalidStatistic(String),

    #[error("Invalid quantile {0}: must be strictly between 0 and 1")]
    InvalidQuantile(f64),

    #[error("Invalid {name}: {reason}")]
    InvalidThreshold { name: &'static str, reason: String },

    #[error("QC flag '{0}' appears in both the exclude and missing sets")]
    ConflictingQcFlag(String),
}

/// Invalid civil date/time component or unparseable timestamp text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeError {
    #[error("Invalid month {0}: must be 1-12")]
    InvalidMonth(u32),

    #[error("Invalid day {day} for {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    #[error("Invalid hour {0}: must be 0-23")]
    InvalidHour(u32),

    #[error("Invalid minute {0}: must be 0-59")]
    InvalidMinute(u32),

    #[error("Invalid second {0}: must be 0-59")]
    InvalidSecond(u32),

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    Parse(String),
}

/// Violation of the canonical data contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("Duplicate observation for category '{category}' at {time}")]
    DuplicateObservation { category: String, time: Timestamp },
}
