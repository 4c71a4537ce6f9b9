//! Aeris Core - Fundamental types
//!
//! This crate provides the core types used throughout Aeris:
//! - `Observation`: long-format measurement records
//! - `QcFlag` / `QcPolicy` / `apply_qc`: quality-control filtering
//! - `Timestamp` / `TimeUnit`: UTC timestamps and calendar elapsed time
//! - `ConfigError` / `TimeError` / `DataError`: structured failure modes

mod error;
mod qc;
mod record;
mod time;

pub use error::{ConfigError, DataError, TimeError};
pub use qc::{apply_qc, QcFlag, QcOutcome, QcPolicy, QcRow};
pub use record::Observation;
pub use time::{days_in_month, days_in_year, is_leap_year, TimeUnit, Timestamp};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        apply_qc, ConfigError, DataError, Observation, QcFlag, QcPolicy, TimeError, TimeUnit,
        Timestamp,
    };
}
