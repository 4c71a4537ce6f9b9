//! Reserved inferential diagnostics

use serde::{Deserialize, Serialize};

/// Placeholder slots for inferential statistics.
///
/// Analyses report point estimates only; these fields keep row shapes
/// stable for a future inference layer and are always `None` today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub p_value: Option<f64>,
    pub ci_low: Option<f64>,
    pub ci_high: Option<f64>,
}
