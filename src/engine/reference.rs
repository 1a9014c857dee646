//! Static catalog of standard packaging sizes.
//!
//! Carrier-standard boxes and mailers with known dimensions, weighed
//! through the same estimator as live invoice scans. Keeping one code path
//! means the published reference masses and a scan of the equivalent line
//! item can never disagree.

use serde::Serialize;

use super::classify::MaterialClass;
use super::mass::estimate_mass_grams_in_unit;
use super::units::Unit;

/// Name, L, W, H in inches, class.
type CatalogRow = (&'static str, f64, f64, f64, MaterialClass);

const SINGLE: MaterialClass = MaterialClass::SingleWallBox;
const DOUBLE: MaterialClass = MaterialClass::DoubleWallBox;
const POLY: MaterialClass = MaterialClass::PolyMailer;
const KRAFT: MaterialClass = MaterialClass::KraftMailer;

/// The catalog. Dimensions are the carriers' published inch sizes.
const CATALOG: &[CatalogRow] = &[
    // Common cubes
    ("4x4x4 Cube", 4.0, 4.0, 4.0, SINGLE),
    ("6x6x6 Cube", 6.0, 6.0, 6.0, SINGLE),
    ("8x8x8 Cube", 8.0, 8.0, 8.0, SINGLE),
    ("10x10x10 Cube", 10.0, 10.0, 10.0, SINGLE),
    ("12x12x12 Cube", 12.0, 12.0, 12.0, DOUBLE),
    ("18x18x18 Large", 18.0, 18.0, 18.0, DOUBLE),
    // FedEx standard sizes
    ("FedEx Small Box", 10.9, 1.5, 12.4, SINGLE),
    ("FedEx Medium Box", 13.3, 11.5, 2.4, SINGLE),
    ("FedEx Large Box", 17.9, 12.4, 3.0, SINGLE),
    ("FedEx Extra Large Box", 11.9, 10.8, 11.0, DOUBLE),
    // USPS flat rate sizes
    ("USPS Small Flat Rate", 8.6, 5.4, 1.6, SINGLE),
    ("USPS Medium Flat Rate (Top)", 11.0, 8.5, 5.5, SINGLE),
    ("USPS Medium Flat Rate (Side)", 13.6, 11.9, 3.4, SINGLE),
    ("USPS Large Flat Rate", 12.0, 12.0, 5.5, SINGLE),
    // Common poly mailers
    ("10x13 Poly Mailer (T-Shirt)", 10.0, 13.0, 0.1, POLY),
    ("14.5x19 Poly Mailer (Jacket)", 14.5, 19.0, 0.1, POLY),
    ("19x24 Poly Mailer (Large)", 19.0, 24.0, 0.1, POLY),
    // Common kraft mailers
    ("#0 Kraft Bubble Mailer", 6.0, 10.0, 0.5, KRAFT),
    ("#2 Kraft Bubble Mailer", 8.5, 12.0, 0.5, KRAFT),
    ("#5 Kraft Bubble Mailer", 10.5, 16.0, 0.5, KRAFT),
];

/// One precomputed catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceEntry {
    pub name: String,
    /// URL-safe identifier derived from the name.
    pub slug: String,
    pub class: MaterialClass,
    pub l_in: f64,
    pub w_in: f64,
    pub h_in: f64,
    pub mass_g: f64,
    pub mass_kg: f64,
}

/// Weigh every catalog row through the live estimator.
pub fn reference_entries() -> Vec<ReferenceEntry> {
    CATALOG
        .iter()
        .map(|&(name, l, w, h, class)| {
            let mass_g = estimate_mass_grams_in_unit(class, l, w, h, Unit::Inch);
            ReferenceEntry {
                name: name.to_string(),
                slug: slugify(name),
                class,
                l_in: l,
                w_in: w,
                h_in: h,
                mass_g,
                mass_kg: mass_g / 1000.0,
            }
        })
        .collect()
}

/// Lowercase, spaces to hyphens, punctuation dropped.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '.' => Some('-'),
            '(' | ')' | '#' => None,
            c => Some(c),
        })
        .collect()
}
