//! Length units and conversion to the engine's canonical meters.

use serde::{Deserialize, Serialize};

/// Meters per inch
pub const M_PER_IN: f64 = 0.0254;
/// Meters per centimeter
pub const M_PER_CM: f64 = 0.01;

/// Unit a line item's dimensions are declared in.
///
/// The unit is part of the input contract — the engine never infers it from
/// the dimension text. Items without a declared unit get the caller's
/// configured default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[serde(alias = "in", alias = "inches")]
    Inch,
    #[serde(alias = "cm", alias = "centimeters")]
    Centimeter,
}

impl Unit {
    /// Parse from a config/CLI string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim() {
            "in" | "inch" | "inches" => Some(Unit::Inch),
            "cm" | "centimeter" | "centimeters" => Some(Unit::Centimeter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Inch => "inch",
            Unit::Centimeter => "centimeter",
        }
    }
}

/// Convert a length in the given unit to meters. Total function; the
/// parsing layer guarantees non-negative finite input.
pub fn to_meters(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Inch => value * M_PER_IN,
        Unit::Centimeter => value * M_PER_CM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inch_to_meters() {
        assert!((to_meters(12.0, Unit::Inch) - 0.3048).abs() < 1e-12);
        assert_eq!(to_meters(0.0, Unit::Inch), 0.0);
    }

    #[test]
    fn test_cm_to_meters() {
        assert!((to_meters(100.0, Unit::Centimeter) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!(Unit::from_str("in"), Some(Unit::Inch));
        assert_eq!(Unit::from_str("Inches"), Some(Unit::Inch));
        assert_eq!(Unit::from_str("cm"), Some(Unit::Centimeter));
        assert_eq!(Unit::from_str("furlong"), None);
    }
}
