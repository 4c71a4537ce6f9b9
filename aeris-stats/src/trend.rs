//! Linear trend estimation per (group, category)

use serde::{Deserialize, Serialize};
use tracing::debug;

use aeris_core::{apply_qc, ConfigError, Observation, QcPolicy, TimeUnit, Timestamp};
use aeris_units::{UnitError, UnitMap};

use crate::diagnostics::Diagnostics;
use crate::error::AnalysisError;
use crate::helpers;
use crate::partition;

// ============================================================================
// Configuration and output rows
// ============================================================================

/// Configuration for `estimate_trends`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Unit of the regression time axis
    pub time_unit: TimeUnit,
    /// Sample-size floor below which `low_n_flag` is raised
    pub min_samples: usize,
    /// Span floor, in calendar years, below which `short_duration_flag`
    /// is raised
    pub min_duration_years: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            time_unit: TimeUnit::CalendarYear,
            min_samples: 3,
            min_duration_years: 1.0,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_samples < 2 {
            return Err(ConfigError::InvalidThreshold {
                name: "min_samples",
                reason: format!("must be at least 2, got {}", self.min_samples),
            });
        }
        if !self.min_duration_years.is_finite() || self.min_duration_years < 0.0 {
            return Err(ConfigError::InvalidThreshold {
                name: "min_duration_years",
                reason: format!(
                    "must be finite and non-negative, got {}",
                    self.min_duration_years
                ),
            });
        }
        Ok(())
    }
}

/// Fitted trend for one (group, category) partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub group: Vec<String>,
    pub category: String,
    /// Unit of the regression time axis the slope refers to
    pub time_unit: TimeUnit,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: u64,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Span between first and last valid observation, always in calendar
    /// years regardless of `time_unit`
    pub duration_years: f64,
    pub low_n_flag: bool,
    pub short_duration_flag: bool,
    /// "{value unit}/{time unit}", e.g. "ug/m3/calendar_year"
    pub slope_units: String,
    pub diagnostics: Diagnostics,
}

// ============================================================================
// Operation
// ============================================================================

/// Least-squares trend per (group, category).
///
/// The time axis is elapsed time since the partition's earliest valid
/// observation, in `config.time_unit`. Every partition with at least one
/// valid value produces a row; sparse or short series are flagged, never
/// suppressed. A unit is required for every category, with no override:
/// a slope without its measurement unit is uninterpretable.
pub fn estimate_trends(
    rows: &[Observation],
    policy: &QcPolicy,
    units: &UnitMap,
    config: &TrendConfig,
) -> Result<Vec<TrendRow>, AnalysisError> {
    config.validate()?;
    let outcome = apply_qc(rows, policy)?;
    let missing = units.missing_for(partition::distinct_categories(&outcome.rows));
    if !missing.is_empty() {
        return Err(UnitError::MissingUnits {
            operation: "trend estimation",
            categories: missing,
        }
        .into());
    }
    debug!(
        kept = outcome.rows.len(),
        excluded = outcome.excluded,
        time_unit = %config.time_unit,
        "trend estimation"
    );

    let mut out = Vec::new();
    for ((group, category), part) in partition::by_series(&outcome.rows) {
        let mut points: Vec<(Timestamp, f64)> = part
            .iter()
            .filter_map(|r| r.value.map(|v| (r.obs.time, v)))
            .collect();
        if points.is_empty() {
            // No valid observation means no reference instant to regress
            // against.
            continue;
        }
        points.sort_by_key(|(time, _)| *time);
        let start_time = points[0].0;
        let end_time = points[points.len() - 1].0;

        let xs: Vec<f64> = points
            .iter()
            .map(|(time, _)| time.elapsed(start_time, config.time_unit))
            .collect();
        let ys: Vec<f64> = points.iter().map(|(_, value)| *value).collect();
        let fit = helpers::least_squares(&xs, &ys);

        let n = points.len() as u64;
        let duration_years = end_time.elapsed(start_time, TimeUnit::CalendarYear);
        let unit = units.get(&category).ok_or_else(|| UnitError::MissingUnits {
            operation: "trend estimation",
            categories: vec![category.clone()],
        })?;

        out.push(TrendRow {
            group,
            category,
            time_unit: config.time_unit,
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            n,
            start_time,
            end_time,
            duration_years,
            low_n_flag: (n as usize) < config.min_samples,
            short_duration_flag: duration_years < config.min_duration_years,
            slope_units: format!("{}/{}", unit.symbol, config.time_unit),
            diagnostics: Diagnostics::default(),
        });
    }
    Ok(out)
}
