//! Area/density mass models per material class.
//!
//! The constants here are the single source of truth for both the live
//! invoice path and the static reference catalog. GSM is grams per square
//! meter of material; the waste factor models flaps, seams, and overlap
//! above the raw geometric area.

use super::classify::MaterialClass;
use super::units::{Unit, to_meters};

/// How a class's material area is derived from its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceModel {
    /// Closed box: 2(LW + LH + WH)
    Box,
    /// Flat two-panel mailer: 2·LW — H is ignored even when present
    Mailer,
}

/// Fixed design constants for one material class.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSpec {
    pub surface: SurfaceModel,
    /// Dimensionless multiplier ≥ 1 for manufacturing overlap and waste.
    pub waste_factor: f64,
    /// Area density in grams per square meter.
    pub gsm: f64,
}

impl MaterialClass {
    pub fn spec(&self) -> MaterialSpec {
        match self {
            MaterialClass::SingleWallBox => MaterialSpec {
                surface: SurfaceModel::Box,
                waste_factor: 1.25,
                gsm: 450.0,
            },
            MaterialClass::DoubleWallBox => MaterialSpec {
                surface: SurfaceModel::Box,
                waste_factor: 1.35,
                gsm: 750.0,
            },
            MaterialClass::PolyMailer => MaterialSpec {
                surface: SurfaceModel::Mailer,
                waste_factor: 1.0,
                gsm: 120.0,
            },
            MaterialClass::KraftMailer => MaterialSpec {
                surface: SurfaceModel::Mailer,
                waste_factor: 1.1,
                gsm: 250.0,
            },
        }
    }
}

/// Material area in m² for the given class and geometry in meters.
pub fn surface_area_m2(class: MaterialClass, l: f64, w: f64, h: f64) -> f64 {
    match class.spec().surface {
        SurfaceModel::Box => 2.0 * (l * w + l * h + w * h),
        SurfaceModel::Mailer => 2.0 * l * w,
    }
}

/// Estimated mass in grams for one unit of packaging, dimensions in meters.
///
/// Mass = area × waste factor × GSM. A zero geometry yields exactly 0 g —
/// the valid result for an item whose dimensions could not be recovered.
pub fn estimate_mass_grams(class: MaterialClass, l: f64, w: f64, h: f64) -> f64 {
    let spec = class.spec();
    surface_area_m2(class, l, w, h) * spec.waste_factor * spec.gsm
}

/// Convenience for callers holding source-unit dimensions.
pub fn estimate_mass_grams_in_unit(
    class: MaterialClass,
    l: f64,
    w: f64,
    h: f64,
    unit: Unit,
) -> f64 {
    estimate_mass_grams(
        class,
        to_meters(l, unit),
        to_meters(w, unit),
        to_meters(h, unit),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CLASSES: [MaterialClass; 4] = [
        MaterialClass::SingleWallBox,
        MaterialClass::DoubleWallBox,
        MaterialClass::PolyMailer,
        MaterialClass::KraftMailer,
    ];

    #[test]
    fn test_twelve_inch_single_wall_cube() {
        // 12 in = 0.3048 m; area = 2*3*0.3048² ≈ 0.5574 m²
        // mass = area * 1.25 * 450 ≈ 313.5 g
        let m = 0.3048;
        let mass = estimate_mass_grams(MaterialClass::SingleWallBox, m, m, m);
        let expected = 2.0 * 3.0 * m * m * 1.25 * 450.0;
        assert!((mass - expected).abs() < 1e-9);
        assert!((mass - 313.55).abs() < 0.01, "got {mass}");
    }

    #[test]
    fn test_double_wall_heavier_than_single() {
        let m = 0.3048;
        let single = estimate_mass_grams(MaterialClass::SingleWallBox, m, m, m);
        let double = estimate_mass_grams(MaterialClass::DoubleWallBox, m, m, m);
        assert!(double > single);
    }

    #[test]
    fn test_zero_geometry_is_zero_mass() {
        for class in ALL_CLASSES {
            assert_eq!(estimate_mass_grams(class, 0.0, 0.0, 0.0), 0.0);
        }
    }

    #[test]
    fn test_mailers_ignore_height() {
        for class in [MaterialClass::PolyMailer, MaterialClass::KraftMailer] {
            let flat = estimate_mass_grams(class, 0.25, 0.33, 0.0);
            let tall = estimate_mass_grams(class, 0.25, 0.33, 5.0);
            assert_eq!(flat, tall);
        }
    }

    #[test]
    fn test_monotone_in_each_dimension() {
        let base = (0.2, 0.3, 0.1);
        for class in ALL_CLASSES {
            let m0 = estimate_mass_grams(class, base.0, base.1, base.2);
            assert!(estimate_mass_grams(class, base.0 + 0.1, base.1, base.2) >= m0);
            assert!(estimate_mass_grams(class, base.0, base.1 + 0.1, base.2) >= m0);
            assert!(estimate_mass_grams(class, base.0, base.1, base.2 + 0.1) >= m0);
        }
    }

    #[test]
    fn test_partial_geometry_reduces_area() {
        // one missing dimension degrades the box to its LW faces
        let mass = estimate_mass_grams(MaterialClass::SingleWallBox, 0.3, 0.3, 0.0);
        assert!((mass - 2.0 * 0.09 * 1.25 * 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_wrapper_matches_manual_conversion() {
        let via_unit =
            estimate_mass_grams_in_unit(MaterialClass::KraftMailer, 8.5, 12.0, 0.5, Unit::Inch);
        let manual = estimate_mass_grams(
            MaterialClass::KraftMailer,
            8.5 * 0.0254,
            12.0 * 0.0254,
            0.5 * 0.0254,
        );
        assert!((via_unit - manual).abs() < 1e-12);
    }
}
