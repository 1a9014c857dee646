// src/engine/mod.rs

//! Packaging mass-estimation engine.
//!
//! A pure, synchronous computation: loosely-structured line items in,
//! per-item mass assessments and a paper-vs-plastic liability report out.
//! Every input is valid input — unparsable dimensions degrade to zero
//! geometry, unknown materials degrade to the default box class, missing
//! quantities degrade to zero contribution. The worst outcome is an under-
//! or over-estimate, never an error. This is deliberate: the engine is a
//! best-effort compliance estimator, not an exact-correctness calculator,
//! and callers must not "fix" the degradation by raising.
//!
//! The same code serves the live invoice-scan path and the static
//! reference catalog (`reference`), so the two cannot drift.

pub mod classify;
pub mod dims;
pub mod mass;
pub mod reference;
pub mod units;

use serde::{Deserialize, Deserializer, Serialize};

pub use classify::{MaterialClass, classify};
pub use dims::parse_dims;
pub use mass::estimate_mass_grams;
pub use units::{Unit, to_meters};

/// One packaging line item as delivered by the extraction collaborator.
///
/// Every field tolerates being absent, empty, or of unexpected JSON shape;
/// deserialization never fails on a malformed field, it degrades to the
/// documented default instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    #[serde(default, deserialize_with = "de_string")]
    pub dims: String,
    #[serde(default, deserialize_with = "de_qty")]
    pub qty: u32,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub category: Option<String>,
    /// Declared dimension unit; absent means the caller's default.
    #[serde(default, deserialize_with = "de_unit")]
    pub unit: Option<Unit>,
}

/// Coarse regulatory grouping used for mass-based EPR/CSRD reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegulatoryBucket {
    Paper,
    Plastic,
}

impl MaterialClass {
    /// Bucket membership is fixed by class, never reassigned downstream.
    pub fn bucket(&self) -> RegulatoryBucket {
        match self {
            MaterialClass::SingleWallBox
            | MaterialClass::DoubleWallBox
            | MaterialClass::KraftMailer => RegulatoryBucket::Paper,
            MaterialClass::PolyMailer => RegulatoryBucket::Plastic,
        }
    }
}

/// Fully computed result for one line item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemAssessment {
    pub name: String,
    pub dims: String,
    pub class: MaterialClass,
    pub bucket: RegulatoryBucket,
    pub qty: u32,
    /// Estimated mass of one unit, grams.
    pub unit_mass_g: f64,
    /// unit_mass_g × qty
    pub line_mass_g: f64,
}

/// Classify, parse, and weigh a single line item.
pub fn assess(item: &LineItem, default_unit: Unit) -> ItemAssessment {
    let (l, w, h) = dims::parse_dims(&item.dims);
    let unit = item.unit.unwrap_or(default_unit);
    let class = classify::classify(&item.name, item.category.as_deref());
    let unit_mass_g = mass::estimate_mass_grams_in_unit(class, l, w, h, unit);

    ItemAssessment {
        name: item.name.clone(),
        dims: item.dims.clone(),
        class,
        bucket: class.bucket(),
        qty: item.qty,
        unit_mass_g,
        line_mass_g: unit_mass_g * item.qty as f64,
    }
}

/// Assess a whole extracted item list.
pub fn assess_all(items: &[LineItem], default_unit: Unit) -> Vec<ItemAssessment> {
    items.iter().map(|item| assess(item, default_unit)).collect()
}

/// Unrounded per-bucket accumulators, in grams. Intermediate sums stay
/// unrounded so rounding error cannot compound across items; kilograms and
/// display rounding appear only in [`LiabilityReport::totals`].
#[derive(Debug, Clone, Default)]
pub struct LiabilityReport {
    pub paper_g: f64,
    pub plastic_g: f64,
}

/// Presentation form of the report, rounded to 2 decimal places.
/// Serializes with the `paperKg`/`plasticKg` keys the reporting
/// collaborator expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiabilityTotals {
    pub paper_kg: f64,
    pub plastic_kg: f64,
}

impl LiabilityReport {
    pub fn add(&mut self, assessment: &ItemAssessment) {
        match assessment.bucket {
            RegulatoryBucket::Paper => self.paper_g += assessment.line_mass_g,
            RegulatoryBucket::Plastic => self.plastic_g += assessment.line_mass_g,
        }
    }

    /// Round only here, at the report boundary.
    pub fn totals(&self) -> LiabilityTotals {
        LiabilityTotals {
            paper_kg: round2(self.paper_g / 1000.0),
            plastic_kg: round2(self.plastic_g / 1000.0),
        }
    }
}

/// Sum assessed items into the liability report. Order-independent up to
/// floating-point rounding.
pub fn aggregate<'a>(assessments: impl IntoIterator<Item = &'a ItemAssessment>) -> LiabilityReport {
    let mut report = LiabilityReport::default();
    for a in assessments {
        report.add(a);
    }
    report
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(coerce_string(&v).unwrap_or_default())
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(coerce_string(&v).filter(|s| !s.is_empty()))
}

/// Quantity may arrive as a number, a numeric string ("500"), or a string
/// with trailing noise ("500 pcs"). Anything else is 0.
fn de_qty<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    let qty = match &v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    };
    Ok(qty.min(u32::MAX as u64) as u32)
}

/// Unknown unit strings degrade to "not declared" rather than failing the
/// whole item list.
fn de_unit<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Unit>, D::Error> {
    let v = serde_json::Value::deserialize(d)?;
    Ok(v.as_str().and_then(Unit::from_str))
}

fn coerce_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, dims: &str, qty: u32, category: &str) -> LineItem {
        LineItem {
            name: name.to_string(),
            dims: dims.to_string(),
            qty,
            category: if category.is_empty() {
                None
            } else {
                Some(category.to_string())
            },
            unit: None,
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let items = vec![
            item("poly mailer", "10x13", 1000, ""),
            item("corrugated box single wall", "12x12x12", 500, ""),
        ];
        let assessments = assess_all(&items, Unit::Inch);
        let totals = aggregate(&assessments).totals();

        // poly: 2 * 0.254 * 0.3302 * 120 g each, 1000 units
        let poly_g: f64 = 2.0 * (10.0 * 0.0254) * (13.0 * 0.0254) * 120.0 * 1000.0;
        // box: 2*3*(12in)² * 1.25 * 450 g each, 500 units
        let box_g = 2.0 * 3.0 * (12.0f64 * 0.0254).powi(2) * 1.25 * 450.0 * 500.0;

        assert!(totals.plastic_kg > 0.0 && totals.paper_kg > 0.0);
        assert!((totals.plastic_kg - (poly_g / 1000.0 * 100.0).round() / 100.0).abs() < 1e-9);
        assert!((totals.paper_kg - (box_g / 1000.0 * 100.0).round() / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_aggregation_is_order_invariant() {
        let items = vec![
            item("poly mailer", "10x13", 7, ""),
            item("kraft bubble mailer", "8.5x12", 3, ""),
            item("box", "6x6x6", 11, ""),
            item("box", "18x18x18", 2, "double wall"),
        ];
        let forward = assess_all(&items, Unit::Inch);
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(&forward);
        let b = aggregate(&reversed);
        assert!((a.paper_g - b.paper_g).abs() < 1e-9 * a.paper_g.max(1.0));
        assert!((a.plastic_g - b.plastic_g).abs() < 1e-9 * a.plastic_g.max(1.0));
    }

    #[test]
    fn test_zero_qty_contributes_nothing() {
        let items = vec![item("poly mailer", "19x24", 0, ""), item("box", "12x12x12", 0, "")];
        let report = aggregate(&assess_all(&items, Unit::Inch));
        assert_eq!(report.paper_g, 0.0);
        assert_eq!(report.plastic_g, 0.0);
    }

    #[test]
    fn test_unparsable_dims_give_zero_mass_not_error() {
        let a = assess(&item("mystery box", "call for sizing", 40, ""), Unit::Inch);
        assert_eq!(a.unit_mass_g, 0.0);
        assert_eq!(a.line_mass_g, 0.0);
        assert_eq!(a.class, MaterialClass::SingleWallBox);
    }

    #[test]
    fn test_bucket_membership() {
        assert_eq!(MaterialClass::SingleWallBox.bucket(), RegulatoryBucket::Paper);
        assert_eq!(MaterialClass::DoubleWallBox.bucket(), RegulatoryBucket::Paper);
        assert_eq!(MaterialClass::KraftMailer.bucket(), RegulatoryBucket::Paper);
        assert_eq!(MaterialClass::PolyMailer.bucket(), RegulatoryBucket::Plastic);
    }

    #[test]
    fn test_explicit_unit_overrides_default() {
        let mut cm_item = item("box", "30x30x30", 1, "");
        cm_item.unit = Some(Unit::Centimeter);
        let in_item = item("box", "30x30x30", 1, "");

        let from_cm = assess(&cm_item, Unit::Inch);
        let from_in = assess(&in_item, Unit::Centimeter);
        assert!((from_cm.unit_mass_g - from_in.unit_mass_g).abs() < 1e-9);
    }

    #[test]
    fn test_lenient_deserialization() {
        let raw = r#"[
            {"name": "Poly Mailer", "dims": "10x13", "qty": "250 pcs"},
            {"dims": "12x12x12", "qty": 500, "category": "Corrugated"},
            {"name": "Tape", "dims": "N/A", "qty": null, "category": ""},
            {"name": 42, "dims": "6x6", "qty": -3.5}
        ]"#;
        let items: Vec<LineItem> = serde_json::from_str(raw).unwrap();

        assert_eq!(items[0].qty, 250);
        assert_eq!(items[1].name, "");
        assert_eq!(items[1].category.as_deref(), Some("Corrugated"));
        assert_eq!(items[2].qty, 0);
        assert_eq!(items[2].category, None);
        assert_eq!(items[3].name, "42");
        assert_eq!(items[3].qty, 0);
    }

    #[test]
    fn test_totals_round_at_boundary_only() {
        // 1234.5 g paper → 1.2345 kg → displays as 1.23
        let report = LiabilityReport {
            paper_g: 1234.5,
            plastic_g: 5.0,
        };
        let totals = report.totals();
        assert_eq!(totals.paper_kg, 1.23);
        assert_eq!(totals.plastic_kg, 0.01);
    }
}
