// src/heuristics.rs

//! Regex fallback for pulling packaging line items out of raw invoice text
//! when no LLM backend is configured or the call fails.
//!
//! Keyword-anchored and permissive: a line qualifies when it mentions a
//! packaging word AND carries a dimension pattern. Prices, SKUs, and the
//! products actually being shipped fall through. Misses are acceptable —
//! whatever is found still flows through the same estimation engine.

use regex::Regex;

use crate::engine::LineItem;

/// Words that mark a line as packaging rather than product.
const PACKAGING_KEYWORDS: &[&str] = &[
    "box",
    "carton",
    "mailer",
    "envelope",
    "bag",
    "poly",
    "kraft",
    "corrugated",
    "bubble",
];

/// Main extraction entry point — one candidate line item per text line that
/// looks like packaging.
pub fn extract_line_items(text: &str) -> Vec<LineItem> {
    let Ok(dims_re) = Regex::new(
        r"(\d+(?:\.\d+)?\s*[xX×]\s*\d+(?:\.\d+)?(?:\s*[xX×]\s*\d+(?:\.\d+)?)?)",
    ) else {
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| extract_item(line, &dims_re))
        .collect()
}

fn extract_item(line: &str, dims_re: &Regex) -> Option<LineItem> {
    let lower = line.to_lowercase();
    if !PACKAGING_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return None;
    }

    let dims_match = dims_re.find(line)?;
    let dims = dims_match.as_str().trim().to_string();

    let qty = extract_qty(line, dims_match.start(), dims_match.end());

    // The name is the line minus its dimension block, prices, and noise.
    let mut name = format!(
        "{} {}",
        &line[..dims_match.start()],
        &line[dims_match.end()..]
    );
    if let Ok(price_re) = Regex::new(r"[$€£]\s*[\d,]+\.?\d*") {
        name = price_re.replace_all(&name, "").into_owned();
    }
    let name = name
        .trim_matches(|c: char| c.is_whitespace() || ",-–:;|".contains(c))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let category = lower.contains("double wall").then(|| "double wall".to_string());

    Some(LineItem {
        name,
        dims,
        qty,
        category,
        unit: None,
    })
}

/// Quantity column: an annotated count wins, else the first standalone
/// integer outside the dimension block. Absent means 0 — the item then
/// contributes nothing to the totals, which is the documented degrade.
fn extract_qty(line: &str, dims_start: usize, dims_end: usize) -> u32 {
    if let Ok(re) = Regex::new(r"(?i)\b(\d{1,6})\s*(?:pcs|pc|pieces|units|ea|each|ct)\b") {
        if let Some(cap) = re.captures(line) {
            if let Ok(q) = cap[1].parse() {
                return q;
            }
        }
    }

    let Ok(int_re) = Regex::new(r"\b(\d{1,6})\b") else {
        return 0;
    };
    for m in int_re.find_iter(line) {
        // skip integers inside the dims block or glued to a decimal point
        if m.start() >= dims_start && m.end() <= dims_end {
            continue;
        }
        let bytes = line.as_bytes();
        let before = m.start().checked_sub(1).map(|i| bytes[i]);
        let after = bytes.get(m.end()).copied();
        if before == Some(b'.') || after == Some(b'.') || before == Some(b'$') {
            continue;
        }
        if let Ok(q) = m.as_str().parse() {
            return q;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_packaging_lines_only() {
        let text = "\
INVOICE #4417
Heavy Duty Corrugated Box 12x12x12 500 pcs $214.50
Cotton T-Shirt (Black, L) 1000 $3,150.00
Poly Mailer 10 x 13 250 units $18.75
Subtotal $3,383.25";

        let items = extract_line_items(text);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].dims, "12x12x12");
        assert_eq!(items[0].qty, 500);
        assert!(items[0].name.contains("Corrugated Box"));

        assert_eq!(items[1].dims, "10 x 13");
        assert_eq!(items[1].qty, 250);
    }

    #[test]
    fn test_double_wall_hint_carried() {
        let items = extract_line_items("Double Wall Shipping Carton 18x18x18 40 ea");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category.as_deref(), Some("double wall"));
        assert_eq!(items[0].qty, 40);
    }

    #[test]
    fn test_line_without_dims_skipped() {
        let items = extract_line_items("Corrugated boxes, assorted sizes");
        assert!(items.is_empty());
    }

    #[test]
    fn test_missing_qty_degrades_to_zero() {
        let items = extract_line_items("Kraft Bubble Mailer 8.5x12");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].qty, 0);
    }

    #[test]
    fn test_no_packaging_no_items() {
        assert!(extract_line_items("Consulting services, 10 hours").is_empty());
    }
}
