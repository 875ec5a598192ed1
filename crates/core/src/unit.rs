//! Units of measure for stock records.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Unit a `(warehouse, item)` balance is tracked in.
///
/// Fixed at balance creation; operations never change it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Liters,
    Barrel,
    Gallon,
    Units,
}

impl UnitOfMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Liters => "Liters",
            UnitOfMeasure::Barrel => "Barrel",
            UnitOfMeasure::Gallon => "Gallon",
            UnitOfMeasure::Units => "Units",
        }
    }
}

impl core::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitOfMeasure {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Liters" => Ok(UnitOfMeasure::Liters),
            "Barrel" => Ok(UnitOfMeasure::Barrel),
            "Gallon" => Ok(UnitOfMeasure::Gallon),
            "Units" => Ok(UnitOfMeasure::Units),
            other => Err(LedgerError::validation(
                "unit_of_measure",
                format!("unknown unit '{other}' (expected Liters, Barrel, Gallon, or Units)"),
            )),
        }
    }
}
