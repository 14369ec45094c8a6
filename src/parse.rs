//! Numeric parsing for listing card text.
//!
//! Card labels are Brazilian-formatted free text ("R$ 45.900,00",
//! "2020/2021 • 35.000 km"). These helpers turn them into typed values and
//! return `None` when a label has nothing usable. Only a structurally broken
//! year/mileage label is an error.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::{Result, ScoutError};

static NON_PRICE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9,-]+").expect("valid regex"));
static YEAR_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

/// Parses a price label.
///
/// Every character that is not a digit, comma or minus sign is stripped, the
/// first comma becomes the decimal point, and the longest leading decimal
/// number is parsed. `"R$ 45.900,00"` yields `45900.00`.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let stripped = NON_PRICE_CHARS.replace_all(text, "");
    let normalized = stripped.replacen(',', ".", 1);
    leading_decimal(&normalized)
}

/// Parses the longest leading `-?digits[.digits]` prefix of `text`.
fn leading_decimal(text: &str) -> Option<Decimal> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = frac_end - frac_start;
        if frac_digits > 0 {
            end = frac_end;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    let number = &text[..end];
    // ".50" and "-.50" need a leading zero before handing off to Decimal.
    let number = if int_digits == 0 {
        number.replacen('.', "0.", 1)
    } else {
        number.to_string()
    };
    Decimal::from_str(&number).ok()
}

/// Parses the leading integer of a label, skipping leading whitespace.
/// `"2020 "` yields `2020`; `"abc"` yields `None`.
pub fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Keeps only the ASCII digits of a label and parses them.
/// `"35.000 km"` yields `35000`.
pub fn digits_only(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Returns the year if the whole (trimmed) label is a 4-digit token.
pub fn year_token(text: &str) -> Option<i32> {
    let text = text.trim();
    if YEAR_TOKEN.is_match(text) {
        text.parse().ok()
    } else {
        None
    }
}

/// Returns true if the label mentions kilometres.
pub fn mentions_km(text: &str) -> bool {
    text.to_lowercase().contains("km")
}

/// Splits a "year/year • mileage" compound label into model year and mileage.
///
/// The year is the leading integer before the first `/`. Mileage is only read
/// when the label mentions "km", from the segment after the first `•`. A label
/// that mentions "km" without a `•` segment is malformed and yields
/// [`ScoutError::CardExtraction`].
pub fn year_and_mileage(label: &str) -> Result<(Option<i32>, Option<u32>)> {
    let year = label
        .split('/')
        .next()
        .and_then(leading_int)
        .and_then(|y| i32::try_from(y).ok());

    let mileage = if mentions_km(label) {
        let segment = label.split('•').nth(1).ok_or_else(|| {
            ScoutError::CardExtraction(format!(
                "mileage label without '•' separator: '{}'",
                label
            ))
        })?;
        digits_only(segment)
    } else {
        None
    };

    Ok((year, mileage))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_brazilian_format() {
        assert_eq!(parse_price("R$ 45.900,00"), Some(Decimal::new(4590000, 2)));
    }

    #[test]
    fn test_parse_price_without_cents() {
        assert_eq!(parse_price("R$ 32.500"), Some(Decimal::from(32500)));
    }

    #[test]
    fn test_parse_price_no_digits() {
        assert_eq!(parse_price("Consulte"), None);
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("R$ -"), None);
    }

    #[test]
    fn test_parse_price_only_first_comma_is_decimal() {
        // "1,2,3" -> "1.2,3" -> parses the leading "1.2"
        assert_eq!(parse_price("1,2,3"), Some(Decimal::new(12, 1)));
    }

    #[test]
    fn test_parse_price_leading_comma() {
        assert_eq!(parse_price("R$ ,50"), Some(Decimal::new(5, 1)));
    }

    #[test]
    fn test_parse_price_stops_at_inner_minus() {
        assert_eq!(parse_price("10-20"), Some(Decimal::from(10)));
    }

    #[test]
    fn test_parse_price_negative() {
        assert_eq!(parse_price("-150,5"), Some(Decimal::new(-1505, 1)));
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("2020"), Some(2020));
        assert_eq!(leading_int("  2019 "), Some(2019));
        assert_eq!(leading_int("2018abc"), Some(2018));
        assert_eq!(leading_int("-5"), Some(-5));
        assert_eq!(leading_int("abc"), None);
        assert_eq!(leading_int(""), None);
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("35.000 km"), Some(35000));
        assert_eq!(digits_only("0 km"), Some(0));
        assert_eq!(digits_only("km"), None);
    }

    #[test]
    fn test_digits_only_overflow_is_none() {
        assert_eq!(digits_only("99999999999999999999 km"), None);
    }

    #[test]
    fn test_year_token() {
        assert_eq!(year_token("2016"), Some(2016));
        assert_eq!(year_token(" 2016 "), Some(2016));
        assert_eq!(year_token("2016/2017"), None);
        assert_eq!(year_token("120.000 km"), None);
        assert_eq!(year_token("Flex"), None);
    }

    #[test]
    fn test_mentions_km_case_insensitive() {
        assert!(mentions_km("35.000 km"));
        assert!(mentions_km("35.000 KM"));
        assert!(!mentions_km("Automático"));
    }

    #[test]
    fn test_year_and_mileage_compound_label() {
        assert_eq!(
            year_and_mileage("2020/2021 • 35.000 km").unwrap(),
            (Some(2020), Some(35000))
        );
    }

    #[test]
    fn test_year_and_mileage_without_km() {
        assert_eq!(year_and_mileage("2015/2015").unwrap(), (Some(2015), None));
    }

    #[test]
    fn test_year_and_mileage_km_without_separator_is_error() {
        let err = year_and_mileage("2015/2016 48.000 km").unwrap_err();
        assert!(matches!(err, ScoutError::CardExtraction(_)));
        assert!(year_and_mileage("Zero km").is_err());
    }

    #[test]
    fn test_year_and_mileage_separator_without_digits() {
        assert_eq!(year_and_mileage("Sem ano • km a consultar").unwrap(), (None, None));
    }
}
