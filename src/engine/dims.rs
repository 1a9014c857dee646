//! Permissive dimension-string parser.
//!
//! Invoice dimension strings come from heterogeneous suppliers:
//! `"12x12x12"`, `"12 x 12 x 12 in"`, `"10x13"`, `"L12 W12 H12"`. Rather
//! than reject anything, every character that is not a digit, a decimal
//! point, or the `x` separator is stripped and the remainder is split on
//! `x`. Pathological strings can silently mis-parse; the worst case is an
//! all-zero geometry and therefore a zero mass for that item, never an
//! error.

/// Extract up to three dimensions (L, W, H) from free text, in whatever
/// unit the text was written in. Missing slots are 0.
pub fn parse_dims(text: &str) -> (f64, f64, f64) {
    let filtered: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c == '×' { 'x' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == 'x')
        .collect();

    let mut parts = filtered
        .split('x')
        .filter_map(|tok| tok.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n >= 0.0);

    let l = parts.next().unwrap_or(0.0);
    let w = parts.next().unwrap_or(0.0);
    let h = parts.next().unwrap_or(0.0);
    (l, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_triple() {
        assert_eq!(parse_dims("12x12x12"), (12.0, 12.0, 12.0));
    }

    #[test]
    fn test_spaces_and_unit_suffix() {
        assert_eq!(parse_dims("12 x 12 x 12 in"), (12.0, 12.0, 12.0));
    }

    #[test]
    fn test_unicode_separator() {
        assert_eq!(parse_dims("12×12×12 in"), (12.0, 12.0, 12.0));
    }

    #[test]
    fn test_no_numbers() {
        assert_eq!(parse_dims("no numbers here"), (0.0, 0.0, 0.0));
        assert_eq!(parse_dims(""), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_two_dims() {
        assert_eq!(parse_dims("10x20"), (10.0, 20.0, 0.0));
    }

    #[test]
    fn test_extra_tokens_ignored() {
        assert_eq!(parse_dims("1x2x3x4x5"), (1.0, 2.0, 3.0));
    }

    #[test]
    fn test_decimals_and_case() {
        assert_eq!(parse_dims("10.9 X 1.5 X 12.4"), (10.9, 1.5, 12.4));
    }

    #[test]
    fn test_unparsable_tokens_discarded() {
        // "4." parses as 4.0, ".." does not parse and is skipped
        assert_eq!(parse_dims("..x4.x2"), (4.0, 2.0, 0.0));
    }
}
