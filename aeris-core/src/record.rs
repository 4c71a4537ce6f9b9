//! Long-format observation records

use serde::{Deserialize, Serialize};

use crate::qc::QcFlag;
use crate::time::Timestamp;

/// One long-format measurement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Ordered grouping key values (site id, instrument, ...); may be empty
    #[serde(default)]
    pub group: Vec<String>,
    /// Measured quantity name, e.g. "no2"
    pub category: String,
    /// Observation time, UTC
    pub time: Timestamp,
    /// Measured value; NaN is treated as missing
    pub value: f64,
    /// QC annotation; absent means valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<QcFlag>,
}

impl Observation {
    /// An ungrouped, unflagged record
    pub fn new(category: impl Into<String>, time: Timestamp, value: f64) -> Self {
        Observation {
            group: Vec::new(),
            category: category.into(),
            time,
            value,
            flag: None,
        }
    }

    pub fn with_group(mut self, group: Vec<String>) -> Self {
        self.group = group;
        self
    }

    pub fn with_flag(mut self, flag: QcFlag) -> Self {
        self.flag = Some(flag);
        self
    }
}
