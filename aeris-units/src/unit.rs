//! Unit metadata for measured categories

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimensional family of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitFamily {
    MassConcentration,
    VolumeConcentration,
}

/// A measurement unit with conversion metadata.
///
/// `to_base` is the factor to the family's base unit (`ug/m3` for mass
/// concentration, `ppb` for volume concentration). `precision` is the
/// reporting decimal-place convention; analyses carry values through
/// unchanged and leave rounding to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    pub symbol: &'static str,
    pub name: &'static str,
    pub family: UnitFamily,
    pub to_base: f64,
    pub precision: u8,
}

impl Unit {
    /// Whether values can be converted between this unit and another
    pub fn can_convert(&self, other: &Unit) -> bool {
        self.family == other.family
    }

    /// Multiplicative factor taking values in this unit to `other`
    pub fn factor_to(&self, other: &Unit) -> Result<f64, UnitError> {
        if !self.can_convert(other) {
            return Err(UnitError::Incompatible {
                from: self.symbol,
                to: other.symbol,
            });
        }
        Ok(self.to_base / other.to_base)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol)
    }
}

/// Unit metadata failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("Unknown unit '{given}'. Valid units are: {valid}")]
    Unknown { given: String, valid: String },

    #[error("Cannot convert between '{from}' and '{to}': different unit families")]
    Incompatible { from: &'static str, to: &'static str },

    #[error("{operation} requires a unit for every category; missing: {}", .categories.join(", "))]
    MissingUnits {
        operation: &'static str,
        categories: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const UG_M3: Unit = Unit {
        symbol: "ug/m3",
        name: "micrograms per cubic metre",
        family: UnitFamily::MassConcentration,
        to_base: 1.0,
        precision: 1,
    };
    const MG_M3: Unit = Unit {
        symbol: "mg/m3",
        name: "milligrams per cubic metre",
        family: UnitFamily::MassConcentration,
        to_base: 1000.0,
        precision: 3,
    };
    const PPB: Unit = Unit {
        symbol: "ppb",
        name: "parts per billion",
        family: UnitFamily::VolumeConcentration,
        to_base: 1.0,
        precision: 1,
    };

    #[test]
    fn test_factor_within_family() {
        assert_eq!(MG_M3.factor_to(&UG_M3).unwrap(), 1000.0);
        assert_eq!(UG_M3.factor_to(&MG_M3).unwrap(), 0.001);
        assert_eq!(UG_M3.factor_to(&UG_M3).unwrap(), 1.0);
    }

    #[test]
    fn test_cross_family_rejected() {
        assert!(!UG_M3.can_convert(&PPB));
        let err = UG_M3.factor_to(&PPB).unwrap_err();
        assert_eq!(err, UnitError::Incompatible { from: "ug/m3", to: "ppb" });
    }

    #[test]
    fn test_missing_units_message_lists_all() {
        let err = UnitError::MissingUnits {
            operation: "correlation",
            categories: vec!["no2".to_string(), "pm10".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "correlation requires a unit for every category; missing: no2, pm10"
        );
    }
}
