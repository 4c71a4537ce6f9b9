//! Descriptive aggregation over (group, category) partitions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use aeris_core::{apply_qc, ConfigError, Observation, QcPolicy};

use crate::error::AnalysisError;
use crate::helpers;
use crate::partition;

/// Default quantile levels reported alongside the fixed statistics
pub const DEFAULT_QUANTILES: [f64; 4] = [0.05, 0.25, 0.75, 0.95];

// ============================================================================
// Statistic names
// ============================================================================

/// Name of an emitted statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatName {
    Mean,
    Median,
    Std,
    Min,
    Max,
    /// Quantile by rounded percent (5 renders as "q05")
    Quantile(u8),
}

impl StatName {
    /// Rendered name: "mean", "median", "std", "min", "max", "qNN"
    pub fn as_label(&self) -> String {
        match self {
            StatName::Mean => "mean".to_string(),
            StatName::Median => "median".to_string(),
            StatName::Std => "std".to_string(),
            StatName::Min => "min".to_string(),
            StatName::Max => "max".to_string(),
            StatName::Quantile(pct) => format!("q{:02}", pct),
        }
    }

    /// Statistic name for a quantile level, rounding the percent.
    ///
    /// Rounding matters: `0.95 * 100.0` sits just below 95 in binary
    /// floating point, and truncation would mislabel it "q94".
    pub fn for_quantile(q: f64) -> StatName {
        StatName::Quantile((q * 100.0).round() as u8)
    }
}

impl fmt::Display for StatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_label())
    }
}

impl FromStr for StatName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(StatName::Mean),
            "median" => Ok(StatName::Median),
            "std" => Ok(StatName::Std),
            "min" => Ok(StatName::Min),
            "max" => Ok(StatName::Max),
            other => other
                .strip_prefix('q')
                .and_then(|digits| digits.parse::<u8>().ok())
                .map(StatName::Quantile)
                .ok_or_else(|| ConfigError::InvalidStatistic(other.to_string())),
        }
    }
}

impl Serialize for StatName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_label())
    }
}

impl<'de> Deserialize<'de> for StatName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Configuration and output rows
// ============================================================================

/// Configuration for `describe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptiveConfig {
    /// Quantile levels, each strictly between 0 and 1
    pub quantiles: Vec<f64>,
    /// Restrict output to these statistics; `None` emits the full set
    pub statistics: Option<Vec<StatName>>,
}

impl Default for DescriptiveConfig {
    fn default() -> Self {
        DescriptiveConfig {
            quantiles: DEFAULT_QUANTILES.to_vec(),
            statistics: None,
        }
    }
}

impl DescriptiveConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for &q in &self.quantiles {
            if !q.is_finite() || q <= 0.0 || q >= 1.0 {
                return Err(ConfigError::InvalidQuantile(q));
            }
        }
        Ok(())
    }

    fn wants(&self, stat: StatName) -> bool {
        match &self.statistics {
            None => true,
            Some(list) => list.contains(&stat),
        }
    }
}

/// One statistic for one (group, category) partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticRow {
    pub group: Vec<String>,
    pub category: String,
    pub stat: StatName,
    pub value: f64,
    pub n_total: u64,
    pub n_valid: u64,
    pub n_missing: u64,
}

// ============================================================================
// Operation
// ============================================================================

/// Descriptive statistics per (group, category) partition.
///
/// Records dropped by the QC policy contribute to nothing, so
/// `n_total == n_valid + n_missing` holds for every partition. A
/// partition whose values are all missing reports NaN for every
/// statistic; a partition whose records were all dropped emits nothing.
/// Rows are sorted by group, category, then rendered statistic name.
pub fn describe(
    rows: &[Observation],
    policy: &QcPolicy,
    config: &DescriptiveConfig,
) -> Result<Vec<StatisticRow>, AnalysisError> {
    config.validate()?;
    let outcome = apply_qc(rows, policy)?;
    debug!(
        kept = outcome.rows.len(),
        excluded = outcome.excluded,
        "descriptive aggregation"
    );

    let mut quantiles = config.quantiles.clone();
    quantiles.sort_by(f64::total_cmp);
    quantiles.dedup();

    let mut out = Vec::new();
    for ((group, category), part) in partition::by_series(&outcome.rows) {
        let n_total = part.len() as u64;
        let values: Vec<f64> = part.iter().filter_map(|r| r.value).collect();
        let n_valid = values.len() as u64;
        let n_missing = n_total - n_valid;
        let sorted_values = helpers::sorted(&values);

        let mut emit = |stat: StatName, value: f64, out: &mut Vec<StatisticRow>| {
            out.push(StatisticRow {
                group: group.clone(),
                category: category.clone(),
                stat,
                value,
                n_total,
                n_valid,
                n_missing,
            });
        };

        let fixed = [
            (StatName::Mean, helpers::mean(&values)),
            (StatName::Median, helpers::median_sorted(&sorted_values)),
            (StatName::Std, helpers::sample_std(&values)),
            (StatName::Min, helpers::min(&values)),
            (StatName::Max, helpers::max(&values)),
        ];
        for (stat, value) in fixed {
            if config.wants(stat) {
                emit(stat, value, &mut out);
            }
        }
        for &q in &quantiles {
            let stat = StatName::for_quantile(q);
            if config.wants(stat) {
                emit(stat, helpers::quantile_sorted(&sorted_values, q), &mut out);
            }
        }
    }

    out.sort_by(|a, b| {
        a.group
            .cmp(&b.group)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.stat.as_label().cmp(&b.stat.as_label()))
    });
    Ok(out)
}
