//! Aeris Units - Measurement unit metadata
//!
//! Units gate analysis interpretability: correlation and trend estimation
//! refuse to run when a category has no unit assigned (correlation can be
//! overridden, trends cannot). Values are never converted inside analyses;
//! the catalog records conversion factors and reporting precision for
//! layers above.
//!
//! Families:
//! - Mass concentration (ug/m3, mg/m3)
//! - Volume concentration (ppb, ppm)

mod catalog;
mod map;
mod unit;

pub use catalog::{lookup, parse, Catalog, CATALOG};
pub use map::UnitMap;
pub use unit::{Unit, UnitError, UnitFamily};
