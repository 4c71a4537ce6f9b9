//! Deterministic partitioning of QC-filtered rows
//!
//! Partitions live in `BTreeMap`s so iteration order is the canonical
//! output order regardless of input order.

use std::collections::BTreeMap;

use aeris_core::QcRow;

/// Partition key: ordered group values plus the category name
pub type SeriesKey = (Vec<String>, String);

/// Group rows by (group, category), preserving input order within a
/// partition
pub fn by_series<'a>(rows: &[QcRow<'a>]) -> BTreeMap<SeriesKey, Vec<QcRow<'a>>> {
    let mut parts: BTreeMap<SeriesKey, Vec<QcRow<'a>>> = BTreeMap::new();
    for row in rows {
        let key = (row.obs.group.clone(), row.obs.category.clone());
        parts.entry(key).or_default().push(*row);
    }
    parts
}

/// Group rows by group key alone
pub fn by_group<'a>(rows: &[QcRow<'a>]) -> BTreeMap<Vec<String>, Vec<QcRow<'a>>> {
    let mut parts: BTreeMap<Vec<String>, Vec<QcRow<'a>>> = BTreeMap::new();
    for row in rows {
        parts.entry(row.obs.group.clone()).or_default().push(*row);
    }
    parts
}

/// Sorted distinct category names across rows
pub fn distinct_categories<'a>(rows: &[QcRow<'a>]) -> Vec<&'a str> {
    let mut categories: Vec<&'a str> = rows.iter().map(|r| r.obs.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();
    categories
}
