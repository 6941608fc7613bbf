//! Number formatting utilities for f64 values.
//!
//! Used for SVG coordinates, which are rendered with two decimals and no
//! trailing zeros. For `Decimal` price formatting, use the `decimal` sibling module.

/// Trims trailing zeros and a dangling decimal point.
pub fn trim_trailing_zeros(formatted: String) -> String {
    if !formatted.contains('.') {
        return formatted;
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Groups the digits of an unsigned integer string in threes.
pub fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Format a coordinate for an SVG path: two decimals, trailing zeros trimmed.
pub fn coord(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let trimmed = trim_trailing_zeros(format!("{:.2}", value));
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_trailing_zeros() {
        assert_eq!(trim_trailing_zeros("1.50".to_string()), "1.5");
        assert_eq!(trim_trailing_zeros("1.00".to_string()), "1");
        assert_eq!(trim_trailing_zeros("100".to_string()), "100");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0", '.'), "0");
        assert_eq!(group_thousands("123", '.'), "123");
        assert_eq!(group_thousands("1234", '.'), "1.234");
        assert_eq!(group_thousands("1234567", ','), "1,234,567");
    }

    #[test]
    fn test_coord() {
        assert_eq!(coord(10.0), "10");
        assert_eq!(coord(200.0), "200");
        assert_eq!(coord(20.5), "20.5");
        assert_eq!(coord(-0.001), "0");
        assert_eq!(coord(f64::NAN), "0");
    }
}
