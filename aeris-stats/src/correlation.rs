//! Pairwise correlation within groups

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use aeris_core::{apply_qc, ConfigError, DataError, Observation, QcPolicy, QcRow, Timestamp};
use aeris_units::{UnitError, UnitMap};

use crate::diagnostics::Diagnostics;
use crate::error::AnalysisError;
use crate::helpers;
use crate::partition;

// ============================================================================
// Configuration and output rows
// ============================================================================

/// Correlation estimator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrMethod {
    #[default]
    Pearson,
    Spearman,
}

impl CorrMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrMethod::Pearson => "pearson",
            CorrMethod::Spearman => "spearman",
        }
    }
}

impl fmt::Display for CorrMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CorrMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pearson" => Ok(CorrMethod::Pearson),
            "spearman" => Ok(CorrMethod::Spearman),
            other => Err(ConfigError::InvalidMethod(other.to_string())),
        }
    }
}

/// Configuration for `correlate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationConfig {
    pub method: CorrMethod,
    /// Skip the unit-metadata requirement (coefficients lose their
    /// interpretable units)
    pub allow_missing_units: bool,
}

/// One category pair within one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRow {
    pub group: Vec<String>,
    pub x: String,
    pub y: String,
    pub method: CorrMethod,
    pub coefficient: f64,
    /// Paired sample size; for the diagonal, the category's valid count
    pub n: u64,
    pub diagnostics: Diagnostics,
}

// ============================================================================
// Operation
// ============================================================================

/// Valid and missing values per category, keyed by timestamp
type CategorySeries = BTreeMap<Timestamp, Option<f64>>;

/// Correlation matrix rows (upper triangle plus diagonal) per group.
///
/// Off-diagonal coefficients use the pairwise-complete sample: the
/// timestamps at which both categories have a valid value. Categories
/// observed at disjoint or shifted times are matched by timestamp, never
/// by position. The diagonal reports 1.0 for any category with at least
/// one valid value. Rows are ordered by group, then by the category pair
/// with `x <= y`.
pub fn correlate(
    rows: &[Observation],
    policy: &QcPolicy,
    units: &UnitMap,
    config: &CorrelationConfig,
) -> Result<Vec<CorrelationRow>, AnalysisError> {
    let outcome = apply_qc(rows, policy)?;
    if !config.allow_missing_units {
        let missing = units.missing_for(partition::distinct_categories(&outcome.rows));
        if !missing.is_empty() {
            return Err(UnitError::MissingUnits {
                operation: "correlation",
                categories: missing,
            }
            .into());
        }
    }
    debug!(
        kept = outcome.rows.len(),
        excluded = outcome.excluded,
        method = %config.method,
        "pairwise correlation"
    );

    let mut out = Vec::new();
    for (group, part) in partition::by_group(&outcome.rows) {
        let series = series_by_category(&part)?;
        let categories: Vec<&String> = series.keys().collect();
        for (i, &x) in categories.iter().enumerate() {
            for &y in &categories[i..] {
                let (coefficient, n) = if x == y {
                    diagonal(&series[x])
                } else {
                    paired(&series[x], &series[y], config.method)
                };
                out.push(CorrelationRow {
                    group: group.clone(),
                    x: x.clone(),
                    y: y.clone(),
                    method: config.method,
                    coefficient,
                    n,
                    diagnostics: Diagnostics::default(),
                });
            }
        }
    }
    Ok(out)
}

/// Index each group's kept rows by (category, timestamp).
///
/// Two kept rows sharing a (category, timestamp) cannot be addressed
/// unambiguously, whatever their values; that is a canonical-form
/// violation in the input.
fn series_by_category<'a>(
    rows: &[QcRow<'a>],
) -> Result<BTreeMap<String, CategorySeries>, DataError> {
    let mut series: BTreeMap<String, CategorySeries> = BTreeMap::new();
    for row in rows {
        let by_time = series.entry(row.obs.category.clone()).or_default();
        if by_time.insert(row.obs.time, row.value).is_some() {
            return Err(DataError::DuplicateObservation {
                category: row.obs.category.clone(),
                time: row.obs.time,
            });
        }
    }
    Ok(series)
}

fn diagonal(series: &CategorySeries) -> (f64, u64) {
    let n = series.values().filter(|v| v.is_some()).count() as u64;
    let coefficient = if n > 0 { 1.0 } else { f64::NAN };
    (coefficient, n)
}

fn paired(xs: &CategorySeries, ys: &CategorySeries, method: CorrMethod) -> (f64, u64) {
    let mut paired_x = Vec::new();
    let mut paired_y = Vec::new();
    for (time, x) in xs {
        let Some(x) = x else { continue };
        let Some(Some(y)) = ys.get(time) else { continue };
        paired_x.push(*x);
        paired_y.push(*y);
    }
    let coefficient = match method {
        CorrMethod::Pearson => helpers::pearson(&paired_x, &paired_y),
        CorrMethod::Spearman => helpers::spearman(&paired_x, &paired_y),
    };
    (coefficient, paired_x.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeris_core::QcFlag;

    fn day(d: u32) -> Timestamp {
        Timestamp::from_ymd(2023, 6, d).unwrap()
    }

    fn units_for(categories: &[&str]) -> UnitMap {
        let mut map = UnitMap::new();
        for category in categories {
            map.assign(*category, "ug/m3").unwrap();
        }
        map
    }

    fn two_series() -> Vec<Observation> {
        let mut rows = Vec::new();
        for (i, (x, y)) in [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0), (5.0, 10.0)]
            .iter()
            .enumerate()
        {
            rows.push(Observation::new("no2", day(i as u32 + 1), *x));
            rows.push(Observation::new("pm10", day(i as u32 + 1), *y));
        }
        rows
    }

    fn find<'a>(rows: &'a [CorrelationRow], x: &str, y: &str) -> &'a CorrelationRow {
        rows.iter()
            .find(|r| r.x == x && r.y == y)
            .unwrap_or_else(|| panic!("no ({x}, {y}) row"))
    }

    #[test]
    fn test_perfect_pearson_pair() {
        let rows = two_series();
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();

        assert_eq!(out.len(), 3);
        let pair = find(&out, "no2", "pm10");
        assert!((pair.coefficient - 1.0).abs() < 1e-10);
        assert_eq!(pair.n, 5);
        assert_eq!(pair.method, CorrMethod::Pearson);
        assert_eq!(pair.diagnostics, Diagnostics::default());

        assert_eq!(find(&out, "no2", "no2").coefficient, 1.0);
        assert_eq!(find(&out, "pm10", "pm10").n, 5);
    }

    #[test]
    fn test_spearman_method() {
        let mut rows = Vec::new();
        for (i, x) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            rows.push(Observation::new("no2", day(i as u32 + 1), *x));
            rows.push(Observation::new("pm10", day(i as u32 + 1), x * x));
        }
        let units = units_for(&["no2", "pm10"]);
        let config = CorrelationConfig {
            method: CorrMethod::Spearman,
            allow_missing_units: false,
        };
        let out = correlate(&rows, &QcPolicy::default(), &units, &config).unwrap();
        let pair = find(&out, "no2", "pm10");
        assert!((pair.coefficient - 1.0).abs() < 1e-10);
        assert_eq!(pair.method, CorrMethod::Spearman);
    }

    #[test]
    fn test_pairwise_complete_matches_by_timestamp() {
        // no2 observed on days 1-4, pm10 on days 2-5. At the shared days
        // pm10 is exactly 2 * no2, so the aligned coefficient is 1.0.
        // Positional pairing of the two unequal series would break the
        // linearity (the no2 sequence is deliberately non-monotonic).
        let mut rows = Vec::new();
        for (d, v) in [(1, 1.0), (2, 5.0), (3, 2.0), (4, 4.0)] {
            rows.push(Observation::new("no2", day(d), v));
        }
        for (d, v) in [(2, 10.0), (3, 4.0), (4, 8.0), (5, 0.0)] {
            rows.push(Observation::new("pm10", day(d), v));
        }
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        let pair = find(&out, "no2", "pm10");
        assert_eq!(pair.n, 3);
        assert!((pair.coefficient - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_values_shrink_pairs() {
        let mut rows = two_series();
        rows[2].flag = Some(QcFlag::BelowDl);
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        let pair = find(&out, "no2", "pm10");
        assert_eq!(pair.n, 4);
        assert!((pair.coefficient - 1.0).abs() < 1e-10);
        assert_eq!(find(&out, "no2", "no2").n, 4);
        assert_eq!(find(&out, "pm10", "pm10").n, 5);
    }

    #[test]
    fn test_small_sample_is_nan() {
        let rows = vec![
            Observation::new("no2", day(1), 1.0),
            Observation::new("pm10", day(1), 2.0),
            Observation::new("no2", day(2), 3.0),
            Observation::new("pm10", day(3), 4.0),
        ];
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        let pair = find(&out, "no2", "pm10");
        assert_eq!(pair.n, 1);
        assert!(pair.coefficient.is_nan());
    }

    #[test]
    fn test_constant_series_is_nan() {
        let mut rows = Vec::new();
        for d in 1..=4 {
            rows.push(Observation::new("no2", day(d), 7.0));
            rows.push(Observation::new("pm10", day(d), d as f64));
        }
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        let pair = find(&out, "no2", "pm10");
        assert_eq!(pair.n, 4);
        assert!(pair.coefficient.is_nan());
        // The diagonal is definitionally 1.0 even for a constant series.
        assert_eq!(find(&out, "no2", "no2").coefficient, 1.0);
    }

    #[test]
    fn test_all_missing_diagonal_is_nan() {
        let rows = vec![
            Observation::new("so2", day(1), 0.1).with_flag(QcFlag::BelowDl),
            Observation::new("so2", day(2), 0.2).with_flag(QcFlag::BelowDl),
        ];
        let units = units_for(&["so2"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].coefficient.is_nan());
        assert_eq!(out[0].n, 0);
    }

    #[test]
    fn test_pair_enumeration_and_order() {
        let mut rows = Vec::new();
        for cat in ["o3", "no2", "pm10"] {
            for d in 1..=3 {
                rows.push(Observation::new(cat, day(d), d as f64));
            }
        }
        let units = units_for(&["o3", "no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();

        let pairs: Vec<(String, String)> =
            out.iter().map(|r| (r.x.clone(), r.y.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                ("no2".to_string(), "no2".to_string()),
                ("no2".to_string(), "o3".to_string()),
                ("no2".to_string(), "pm10".to_string()),
                ("o3".to_string(), "o3".to_string()),
                ("o3".to_string(), "pm10".to_string()),
                ("pm10".to_string(), "pm10".to_string()),
            ]
        );
    }

    #[test]
    fn test_groups_do_not_mix() {
        let rows = vec![
            Observation::new("no2", day(1), 1.0).with_group(vec!["a".to_string()]),
            Observation::new("no2", day(2), 2.0).with_group(vec!["a".to_string()]),
            Observation::new("pm10", day(1), 1.0).with_group(vec!["b".to_string()]),
            Observation::new("pm10", day(2), 2.0).with_group(vec!["b".to_string()]),
        ];
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        // One diagonal row per group; no cross-group pair.
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].group, vec!["a".to_string()]);
        assert_eq!((out[0].x.as_str(), out[0].y.as_str()), ("no2", "no2"));
        assert_eq!(out[1].group, vec!["b".to_string()]);
    }

    #[test]
    fn test_missing_units_rejected_with_full_list() {
        let rows = two_series();
        let units = UnitMap::new();
        let err = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap_err();
        match err {
            AnalysisError::Unit(UnitError::MissingUnits { operation, categories }) => {
                assert_eq!(operation, "correlation");
                assert_eq!(categories, vec!["no2".to_string(), "pm10".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_allow_missing_units_override() {
        let rows = two_series();
        let config = CorrelationConfig {
            method: CorrMethod::Pearson,
            allow_missing_units: true,
        };
        let out = correlate(&rows, &QcPolicy::default(), &UnitMap::new(), &config).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_duplicate_observation_rejected() {
        let rows = vec![
            Observation::new("no2", day(1), 1.0),
            Observation::new("no2", day(1), 2.0),
        ];
        let units = units_for(&["no2"]);
        let err = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Data(DataError::DuplicateObservation {
                category: "no2".to_string(),
                time: day(1),
            })
        );
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("pearson".parse::<CorrMethod>().unwrap(), CorrMethod::Pearson);
        assert_eq!("spearman".parse::<CorrMethod>().unwrap(), CorrMethod::Spearman);
        let err = "kendall".parse::<CorrMethod>().unwrap_err();
        assert_eq!(err, ConfigError::InvalidMethod("kendall".to_string()));
    }

    #[test]
    fn test_shuffle_invariance() {
        let mut rows = two_series();
        let units = units_for(&["no2", "pm10"]);
        let out = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        rows.reverse();
        let out_rev = correlate(
            &rows,
            &QcPolicy::default(),
            &units,
            &CorrelationConfig::default(),
        )
        .unwrap();
        assert_eq!(out, out_rev);
    }
}
