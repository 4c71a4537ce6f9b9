//! Quality-control flags and record filtering
//!
//! A QC policy splits flags into two roles: flags that drop a record
//! entirely (bad data that must not influence anything, counts included)
//! and flags that keep the record but blank its value (a real sampling
//! slot whose value is unusable, such as below the detection limit).

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::Observation;

/// Quality-control annotation on an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcFlag {
    Valid,
    Invalid,
    Outlier,
    BelowDl,
    Missing,
}

impl QcFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QcFlag::Valid => "valid",
            QcFlag::Invalid => "invalid",
            QcFlag::Outlier => "outlier",
            QcFlag::BelowDl => "below_dl",
            QcFlag::Missing => "missing",
        }
    }
}

impl fmt::Display for QcFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which flags drop a record and which keep it with a blanked value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcPolicy {
    /// Records with these flags are removed entirely
    pub exclude: BTreeSet<QcFlag>,
    /// Records with these flags are kept with their value treated as missing
    pub missing: BTreeSet<QcFlag>,
}

impl Default for QcPolicy {
    fn default() -> Self {
        QcPolicy {
            exclude: BTreeSet::from([QcFlag::Invalid, QcFlag::Outlier]),
            missing: BTreeSet::from([QcFlag::BelowDl, QcFlag::Missing]),
        }
    }
}

impl QcPolicy {
    /// A flag may not both drop a record and blank its value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(flag) = self.exclude.intersection(&self.missing).next() {
            return Err(ConfigError::ConflictingQcFlag(flag.as_str().to_string()));
        }
        Ok(())
    }
}

/// A record kept by QC filtering, borrowing its observation
#[derive(Debug, Clone, Copy)]
pub struct QcRow<'a> {
    pub obs: &'a Observation,
    /// `None` when the flag blanks the value or the raw value is NaN
    pub value: Option<f64>,
}

/// Kept rows plus the count of records the policy removed
#[derive(Debug, Clone)]
pub struct QcOutcome<'a> {
    pub rows: Vec<QcRow<'a>>,
    pub excluded: usize,
}

/// Split records into kept rows and an excluded count.
///
/// An absent flag is treated as `Valid`. Kept records with a blanked or
/// NaN value stay in the row set so downstream counts satisfy
/// `n_total == n_valid + n_missing` over kept rows.
pub fn apply_qc<'a>(
    rows: &'a [Observation],
    policy: &QcPolicy,
) -> Result<QcOutcome<'a>, ConfigError> {
    policy.validate()?;
    let mut kept = Vec::with_capacity(rows.len());
    let mut excluded = 0usize;
    for obs in rows {
        if matches!(obs.flag, Some(flag) if policy.exclude.contains(&flag)) {
            excluded += 1;
            continue;
        }
        let blanked = matches!(obs.flag, Some(flag) if policy.missing.contains(&flag));
        let value = if blanked || obs.value.is_nan() {
            None
        } else {
            Some(obs.value)
        };
        kept.push(QcRow { obs, value });
    }
    Ok(QcOutcome { rows: kept, excluded })
}
