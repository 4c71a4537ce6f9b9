//! Category-to-unit assignments

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog;
use crate::unit::{Unit, UnitError};

/// Unit metadata per measured category.
///
/// Analyses that report unit-bearing results (correlation, trends) check
/// their input categories against this map before computing anything.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitMap {
    assignments: BTreeMap<String, &'static Unit>,
}

impl UnitMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a unit by symbol, resolved through the catalog
    pub fn assign(&mut self, category: impl Into<String>, symbol: &str) -> Result<(), UnitError> {
        let unit = catalog::parse(symbol)?;
        self.assignments.insert(category.into(), unit);
        Ok(())
    }

    /// Chainable form of `assign`
    pub fn with(mut self, category: impl Into<String>, symbol: &str) -> Result<Self, UnitError> {
        self.assign(category, symbol)?;
        Ok(self)
    }

    pub fn get(&self, category: &str) -> Option<&'static Unit> {
        self.assignments.get(category).copied()
    }

    /// Categories from `required` with no assignment, sorted and deduplicated
    pub fn missing_for<'a, I>(&self, required: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = required
            .into_iter()
            .filter(|category| !self.assignments.contains_key(*category))
            .map(str::to_string)
            .collect();
        missing.sort_unstable();
        missing.dedup();
        missing
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
