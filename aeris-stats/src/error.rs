//! Top-level analysis error union

use thiserror::Error;

use aeris_core::{ConfigError, DataError};
use aeris_units::UnitError;

/// Any failure an analysis operation can report.
///
/// Operations fail atomically: an error means no rows were produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Unit(#[from] UnitError),
}
