//! Aeris Statistics - analysis operations over long-format records
//!
//! Three operations, all deterministic and atomic:
//! - `describe`: descriptive statistics per (group, category)
//! - `correlate`: pairwise correlation matrices per group
//! - `estimate_trends`: least-squares trends per (group, category)
//!
//! Degenerate samples (too few points, zero variance, everything missing)
//! yield NaN and advisory flags, never errors. Errors are reserved for bad
//! configuration, duplicate canonical keys, and missing unit metadata, and
//! an error means no rows were produced. Equal inputs produce bit-identical
//! outputs regardless of record order.

mod correlation;
mod descriptive;
mod diagnostics;
mod error;
mod helpers;
mod partition;
mod trend;

pub use correlation::{correlate, CorrMethod, CorrelationConfig, CorrelationRow};
pub use descriptive::{describe, DescriptiveConfig, StatName, StatisticRow, DEFAULT_QUANTILES};
pub use diagnostics::Diagnostics;
pub use error::AnalysisError;
pub use trend::{estimate_trends, TrendConfig, TrendRow};

/// Prelude for convenient imports
pub mod prelude {
    pub use aeris_core::prelude::*;
    pub use aeris_units::{UnitError, UnitMap};

    pub use crate::{
        correlate, describe, estimate_trends, AnalysisError, CorrMethod, CorrelationConfig,
        CorrelationRow, DescriptiveConfig, Diagnostics, StatName, StatisticRow, TrendConfig,
        TrendRow,
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn dataset() -> Vec<Observation> {
        let mut rows = Vec::new();
        for (site, offset) in [("ost", 0.0), ("west", 5.0)] {
            for day in 1..=6u32 {
                let time = Timestamp::from_ymd(2023, 4, day).unwrap();
                rows.push(
                    Observation::new("no2", time, offset + day as f64)
                        .with_group(vec![site.to_string()]),
                );
                rows.push(
                    Observation::new("pm10", time, offset + 2.0 * day as f64)
                        .with_group(vec![site.to_string()]),
                );
            }
        }
        // Perturbations that QC filtering must absorb.
        rows[1].flag = Some(QcFlag::Outlier);
        rows[4].flag = Some(QcFlag::BelowDl);
        rows
    }

    fn units() -> UnitMap {
        UnitMap::new()
            .with("no2", "ug/m3")
            .unwrap()
            .with("pm10", "ug/m3")
            .unwrap()
    }

    fn shuffled(rows: &[Observation]) -> Vec<Observation> {
        // Deterministic reordering: reversed odd positions, then evens.
        let mut out: Vec<Observation> = rows.iter().skip(1).step_by(2).cloned().collect();
        out.reverse();
        out.extend(rows.iter().step_by(2).cloned());
        out
    }

    mod pipeline_tests {
        use super::*;

        #[test]
        fn test_counts_identity_everywhere() {
            let out = describe(
                &dataset(),
                &QcPolicy::default(),
                &DescriptiveConfig::default(),
            )
            .unwrap();
            assert!(!out.is_empty());
            for row in &out {
                assert_eq!(row.n_total, row.n_valid + row.n_missing);
            }
        }

        #[test]
        fn test_correlation_matrix_shape() {
            let out = correlate(
                &dataset(),
                &QcPolicy::default(),
                &units(),
                &CorrelationConfig::default(),
            )
            .unwrap();
            // Two groups, two categories each: 3 rows per group.
            assert_eq!(out.len(), 6);
            for row in out.iter().filter(|r| r.x == r.y) {
                assert_eq!(row.coefficient, 1.0);
            }
        }

        #[test]
        fn test_trend_rows_per_partition() {
            let out = estimate_trends(
                &dataset(),
                &QcPolicy::default(),
                &units(),
                &TrendConfig {
                    time_unit: TimeUnit::Day,
                    ..TrendConfig::default()
                },
            )
            .unwrap();
            assert_eq!(out.len(), 4);
            for row in &out {
                assert!(row.slope.is_finite());
                assert!(row.short_duration_flag);
                assert_eq!(row.slope_units, "ug/m3/day");
            }
        }

        #[test]
        fn test_error_is_atomic() {
            // One category lacks a unit: the whole call fails, no rows.
            let partial = UnitMap::new().with("no2", "ug/m3").unwrap();
            let result = estimate_trends(
                &dataset(),
                &QcPolicy::default(),
                &partial,
                &TrendConfig::default(),
            );
            assert!(matches!(
                result,
                Err(AnalysisError::Unit(UnitError::MissingUnits { .. }))
            ));
        }
    }

    mod determinism_tests {
        use super::*;

        #[test]
        fn test_outputs_bit_identical_under_shuffling() {
            let rows = dataset();
            let rows_shuffled = shuffled(&rows);
            let policy = QcPolicy::default();
            let units = units();

            let a = describe(&rows, &policy, &DescriptiveConfig::default()).unwrap();
            let b = describe(&rows_shuffled, &policy, &DescriptiveConfig::default()).unwrap();
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );

            let a = correlate(&rows, &policy, &units, &CorrelationConfig::default()).unwrap();
            let b = correlate(&rows_shuffled, &policy, &units, &CorrelationConfig::default())
                .unwrap();
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );

            let a = estimate_trends(&rows, &policy, &units, &TrendConfig::default()).unwrap();
            let b = estimate_trends(&rows_shuffled, &policy, &units, &TrendConfig::default())
                .unwrap();
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }

        #[test]
        fn test_result_rows_serialize_round_trip() {
            let rows = dataset();
            let out = estimate_trends(
                &rows,
                &QcPolicy::default(),
                &units(),
                &TrendConfig::default(),
            )
            .unwrap();
            let json = serde_json::to_string(&out).unwrap();
            let back: Vec<TrendRow> = serde_json::from_str(&json).unwrap();
            assert_eq!(back, out);
        }
    }
}
