//! Parsing of raw form values.
//!
//! Calculator inputs arrive as text exactly as typed. A field that is empty,
//! unparseable or non-finite is treated as absent; zero is treated as absent too,
//! since no sizing can be derived from a zero account, price or percentage.

/// Parse a form value, keeping zero.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a form value that must be non-zero to count as filled in.
pub fn parse_amount(raw: &str) -> Option<f64> {
    parse_number(raw).filter(|v| *v != 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("85"), Some(85.0));
        assert_eq!(parse_number("  12.5 "), Some(12.5));
        assert_eq!(parse_number("0"), Some(0.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_parse_amount_rejects_zero() {
        assert_eq!(parse_amount("0"), None);
        assert_eq!(parse_amount("0.0"), None);
        assert_eq!(parse_amount("1600"), Some(1600.0));
    }
}
