use crate::runtime::data_structures::value::Value;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// The anchored pattern for numeric literals: optionally signed decimal integers, hex, octal,
    /// and binary integers, and floats with optional fraction and exponent.  Underscores are
    /// allowed between digits for readability.  A symbol is numeric only if the whole of it
    /// matches.
    static ref NUMERIC_LITERAL: Regex = Regex::new(
        r"(?x)
        ^-?(?:
            0[xX][0-9a-fA-F](?:_?[0-9a-fA-F])*
          | 0[oO][0-7](?:_?[0-7])*
          | 0[bB][01](?:_?[01])*
          | (?:
                \d(?:_?\d)*\.?(?:\d(?:_?\d)*)?
              | \.\d(?:_?\d)*
            )(?:[eE][-+]?\d(?:_?\d)*)?
        )$"
    )
    .expect("The numeric literal pattern is written by hand and always compiles.");
}

/// Does the symbol read as a numeric literal in its entirety?
pub fn is_numeric_literal(text: &str) -> bool {
    NUMERIC_LITERAL.is_match(text)
}

/// Convert a symbol into its numeric value, or None when it is not a numeric literal.  Radixed
/// literals and plain integers become Int values; anything with a fraction or exponent becomes a
/// Float.
pub fn convert_numeric_literal(text: &str) -> Option<Value> {
    if !is_numeric_literal(text) {
        return None;
    }

    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let apply_sign = |value: i64| if negative { value.wrapping_neg() } else { value };
    let cleaned = digits.replace('_', "");

    if let Some(stripped) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        return i64::from_str_radix(stripped, 16)
            .ok()
            .map(|value| Value::Int(apply_sign(value)));
    }

    if let Some(stripped) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        return i64::from_str_radix(stripped, 8)
            .ok()
            .map(|value| Value::Int(apply_sign(value)));
    }

    if let Some(stripped) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        return i64::from_str_radix(stripped, 2)
            .ok()
            .map(|value| Value::Int(apply_sign(value)));
    }

    if cleaned.contains('.') || cleaned.contains('e') || cleaned.contains('E') {
        let value: f64 = cleaned.parse().ok()?;
        return Some(Value::Float(if negative { -value } else { value }));
    }

    match cleaned.parse::<i64>() {
        Ok(value) => Some(Value::Int(apply_sign(value))),
        // An integer too large for i64 still reads as a number, it just loses precision.
        Err(_) => cleaned
            .parse::<f64>()
            .ok()
            .map(|value| Value::Float(if negative { -value } else { value })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0", Value::Int(0); "zero")]
    #[test_case("42", Value::Int(42); "decimal")]
    #[test_case("-17", Value::Int(-17); "negative decimal")]
    #[test_case("1_000", Value::Int(1000); "underscore separator")]
    #[test_case("0x1F", Value::Int(31); "hex")]
    #[test_case("-0x10", Value::Int(-16); "negative hex")]
    #[test_case("0o17", Value::Int(15); "octal")]
    #[test_case("0b1010", Value::Int(10); "binary")]
    #[test_case("2.5", Value::Float(2.5); "float")]
    #[test_case("-0.5", Value::Float(-0.5); "negative float")]
    #[test_case(".5", Value::Float(0.5); "leading dot")]
    #[test_case("1.", Value::Float(1.0); "trailing dot")]
    #[test_case("1e3", Value::Float(1000.0); "exponent")]
    #[test_case("1.5e-2", Value::Float(0.015); "fraction with exponent")]
    fn literals_convert(text: &str, expected: Value) {
        assert_eq!(convert_numeric_literal(text), Some(expected));
    }

    #[test_case(""; "empty")]
    #[test_case("-"; "bare sign")]
    #[test_case("abc"; "word")]
    #[test_case("0x"; "hex without digits")]
    #[test_case("1.2.3"; "double dot")]
    #[test_case("1e"; "dangling exponent")]
    #[test_case("_1"; "leading underscore")]
    #[test_case("1_"; "trailing underscore")]
    #[test_case("1+"; "trailing operator")]
    #[test_case("+5"; "plus sign")]
    fn non_literals_are_rejected(text: &str) {
        assert!(!is_numeric_literal(text));
        assert_eq!(convert_numeric_literal(text), None);
    }
}
