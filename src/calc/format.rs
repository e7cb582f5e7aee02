//! User-facing number formatting.

/// `€1234.50`; negatives render as `-€12.00`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    if value < 0.0 {
        format!("-{}{:.2}", symbol, value.abs())
    } else {
        format!("{}{:.2}", symbol, value)
    }
}

/// Whole shares only; fractional shares cannot be bought.
pub fn format_shares(shares: f64) -> String {
    if !shares.is_finite() || shares <= 0.0 {
        return "0".to_string();
    }
    format!("{}", shares.floor() as u64)
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value)
}

pub fn format_ratio(r_multiple: f64) -> String {
    format!("1:{:.2}", r_multiple)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(4250.0, "€"), "€4250.00");
        assert_eq!(format_currency(0.126, "$"), "$0.13");
        assert_eq!(format_currency(-12.0, "€"), "-€12.00");
    }

    #[test]
    fn test_shares_are_floored() {
        assert_eq!(format_shares(18.8235), "18");
        assert_eq!(format_shares(100.0), "100");
        assert_eq!(format_shares(0.4), "0");
        assert_eq!(format_shares(f64::NAN), "0");
    }

    #[test]
    fn test_percent_and_ratio() {
        assert_eq!(format_percent(5.0, 1), "5.0%");
        assert_eq!(format_percent(0.94117, 2), "0.94%");
        assert_eq!(format_ratio(2.0), "1:2.00");
    }
}
