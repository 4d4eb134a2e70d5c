//! Raw integer token amounts → human-scaled floats.
//!
//! Explorers return balances as arbitrary-precision decimal strings. Scaling
//! is done on the string (decimal point insertion) so values wider than
//! `u128` still convert; the float is for display only.

/// Scale a raw integer string by `decimals`.
///
/// Returns `None` unless `raw` is a non-empty run of ASCII digits.
pub fn scale(raw: &str, decimals: u8) -> Option<f64> {
    let digits = raw.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let decimals = decimals as usize;
    let formatted = if decimals == 0 {
        digits.to_string()
    } else if digits.len() > decimals {
        let (whole, frac) = digits.split_at(digits.len() - decimals);
        format!("{}.{}", whole, frac)
    } else {
        format!("0.{}{}", "0".repeat(decimals - digits.len()), digits)
    };

    formatted.parse().ok()
}

/// True when `raw` is a well-formed integer string equal to zero
pub fn is_zero(raw: &str) -> bool {
    let digits = raw.trim();
    !digits.is_empty() && digits.bytes().all(|b| b == b'0')
}

/// Parse an explorer `tokenDecimal` field
pub fn parse_decimals(raw: &str) -> Option<u8> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_common_decimals() {
        assert_eq!(scale("1000000", 6), Some(1.0));
        assert_eq!(scale("500000000000000000", 18), Some(0.5));
        assert_eq!(scale("150000000", 8), Some(1.5));
    }

    #[test]
    fn test_scale_below_one_unit() {
        assert_eq!(scale("1", 8), Some(0.00000001));
        assert_eq!(scale("42", 0), Some(42.0));
    }

    #[test]
    fn test_scale_wider_than_u128() {
        // 10^40 raw units at 18 decimals = 10^22
        let raw = format!("1{}", "0".repeat(40));
        let scaled = scale(&raw, 18).unwrap();
        assert!((scaled / 1e22 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scale_rejects_non_integers() {
        assert_eq!(scale("", 6), None);
        assert_eq!(scale("-1", 6), None);
        assert_eq!(scale("1.5", 6), None);
        assert_eq!(scale("0x10", 6), None);
    }

    #[test]
    fn test_is_zero() {
        assert!(is_zero("0"));
        assert!(is_zero("0000"));
        assert!(!is_zero("10"));
        assert!(!is_zero(""));
        assert!(!is_zero("Error! Invalid address format"));
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_decimals("18"), Some(18));
        assert_eq!(parse_decimals(" 6 "), Some(6));
        assert_eq!(parse_decimals("abc"), None);
        assert_eq!(parse_decimals("300"), None);
    }
}
