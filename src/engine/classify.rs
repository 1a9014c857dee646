//! Keyword classification of packaging line items.

use serde::{Deserialize, Serialize};

/// Packaging material class. Closed set — every item maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialClass {
    SingleWallBox,
    DoubleWallBox,
    PolyMailer,
    KraftMailer,
}

impl MaterialClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialClass::SingleWallBox => "single_wall_box",
            MaterialClass::DoubleWallBox => "double_wall_box",
            MaterialClass::PolyMailer => "poly_mailer",
            MaterialClass::KraftMailer => "kraft_mailer",
        }
    }
}

/// Ordered classification rules: the first rule whose keyword list hits the
/// lowercased item name wins. Kept as a table so new supplier vocabularies
/// are added here, not in the matching code.
///
/// Order matters: "poly mailer" must hit the poly row before the mailer
/// keyword in the kraft row can claim it.
const CLASS_RULES: &[(MaterialClass, &[&str])] = &[
    (MaterialClass::PolyMailer, &["poly", "plastic", "bag"]),
    (MaterialClass::KraftMailer, &["kraft", "mailer", "envelope"]),
];

/// Classify an item by name, with an optional free-text hint from the
/// source document deciding the wall type when the item falls through to
/// the box default.
///
/// Total function: an empty or keyword-free name is a single-wall box, the
/// cheapest and most common packaging type.
pub fn classify(name: &str, hint: Option<&str>) -> MaterialClass {
    let name = name.to_lowercase();

    for (class, keywords) in CLASS_RULES {
        if keywords.iter().any(|kw| name.contains(kw)) {
            return *class;
        }
    }

    // Box fallback: only the hint carries the wall-type signal — names
    // rarely spell it out, but supplier data sometimes does.
    let double_wall = hint
        .map(|h| h.to_lowercase().contains("double"))
        .unwrap_or(false);
    if double_wall {
        MaterialClass::DoubleWallBox
    } else {
        MaterialClass::SingleWallBox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_keywords() {
        assert_eq!(classify("Poly Mailer 10x13", None), MaterialClass::PolyMailer);
        assert_eq!(classify("PLASTIC WRAP", None), MaterialClass::PolyMailer);
        assert_eq!(classify("ziplock bag", None), MaterialClass::PolyMailer);
    }

    #[test]
    fn test_kraft_keywords() {
        assert_eq!(
            classify("Kraft Bubble Mailer", None),
            MaterialClass::KraftMailer
        );
        assert_eq!(classify("Padded Envelope #2", None), MaterialClass::KraftMailer);
    }

    #[test]
    fn test_poly_beats_kraft_on_tie() {
        // contains both "poly" and "mailer" — poly row is checked first
        assert_eq!(classify("poly mailer", None), MaterialClass::PolyMailer);
    }

    #[test]
    fn test_box_fallback() {
        assert_eq!(classify("Random Widget", None), MaterialClass::SingleWallBox);
        assert_eq!(classify("", None), MaterialClass::SingleWallBox);
    }

    #[test]
    fn test_wall_type_from_hint() {
        assert_eq!(
            classify("Shipping Carton", Some("double wall corrugated")),
            MaterialClass::DoubleWallBox
        );
        assert_eq!(
            classify("Shipping Carton", Some("Corrugated")),
            MaterialClass::SingleWallBox
        );
        // hint never overrides a keyword match
        assert_eq!(
            classify("poly bag", Some("double wall")),
            MaterialClass::PolyMailer
        );
    }
}
