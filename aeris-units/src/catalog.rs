//! Built-in unit catalog

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::unit::{Unit, UnitError, UnitFamily};

/// Global unit catalog
pub static CATALOG: LazyLock<Catalog> = LazyLock::new(Catalog::new);

/// Look up a unit by symbol or alias
pub fn lookup(symbol: &str) -> Option<&'static Unit> {
    CATALOG.get(symbol)
}

/// Resolve a unit symbol, erroring with the list of valid symbols
pub fn parse(symbol: &str) -> Result<&'static Unit, UnitError> {
    CATALOG.parse(symbol)
}

/// Unit lookup by canonical symbol or alias
#[derive(Debug)]
pub struct Catalog {
    units: HashMap<&'static str, Unit>,
    aliases: HashMap<&'static str, &'static str>,
}

impl Catalog {
    fn new() -> Self {
        let mut catalog = Catalog {
            units: HashMap::new(),
            aliases: HashMap::new(),
        };
        catalog.register_mass_concentration_units();
        catalog.register_volume_concentration_units();
        catalog.register_aliases();
        catalog
    }

    fn register(&mut self, unit: Unit) {
        self.units.insert(unit.symbol, unit);
    }

    fn alias(&mut self, alias: &'static str, canonical: &'static str) {
        self.aliases.insert(alias, canonical);
    }

    fn register_mass_concentration_units(&mut self) {
        self.register(Unit {
            symbol: "ug/m3",
            name: "micrograms per cubic metre",
            family: UnitFamily::MassConcentration,
            to_base: 1.0,
            precision: 1,
        });
        self.register(Unit {
            symbol: "mg/m3",
            name: "milligrams per cubic metre",
            family: UnitFamily::MassConcentration,
            to_base: 1000.0,
            precision: 3,
        });
    }

    fn register_volume_concentration_units(&mut self) {
        self.register(Unit {
            symbol: "ppb",
            name: "parts per billion",
            family: UnitFamily::VolumeConcentration,
            to_base: 1.0,
            precision: 1,
        });
        self.register(Unit {
            symbol: "ppm",
            name: "parts per million",
            family: UnitFamily::VolumeConcentration,
            to_base: 1000.0,
            precision: 3,
        });
    }

    fn register_aliases(&mut self) {
        self.alias("µg/m³", "ug/m3");
        self.alias("µg/m3", "ug/m3");
        self.alias("ug/m³", "ug/m3");
        self.alias("mg/m³", "mg/m3");
        self.alias("ppbv", "ppb");
        self.alias("ppmv", "ppm");
    }

    /// Direct symbol lookup, falling back to the alias table
    pub fn get(&self, symbol: &str) -> Option<&Unit> {
        if let Some(unit) = self.units.get(symbol) {
            return Some(unit);
        }
        self.aliases
            .get(symbol)
            .and_then(|canonical| self.units.get(canonical))
    }

    /// Like `get`, erroring with the sorted list of canonical symbols
    pub fn parse(&self, symbol: &str) -> Result<&Unit, UnitError> {
        self.get(symbol).ok_or_else(|| UnitError::Unknown {
            given: symbol.to_string(),
            valid: self.symbols().join(", "),
        })
    }

    /// Canonical symbols, sorted
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut symbols: Vec<&'static str> = self.units.keys().copied().collect();
        symbols.sort_unstable();
        symbols
    }
}
