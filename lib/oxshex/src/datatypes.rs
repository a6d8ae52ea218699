//! XSD datatype support for node constraints.
//!
//! Numeric datatypes are described by a static table giving their value space family and,
//! for the `xsd:integer` derived types, their inclusive range.

use oxrdf::vocab::xsd;
use oxrdf::{LiteralRef, NamedNodeRef};
use oxsdatatypes::{Boolean, Date, DateTime, Decimal, Double, Float, Time};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumericFamily {
    Integer,
    Decimal,
    Float,
    Double,
}

struct NumericDatatype {
    iri: NamedNodeRef<'static>,
    family: NumericFamily,
    min: Option<i128>,
    max: Option<i128>,
}

impl NumericDatatype {
    const fn new(
        iri: NamedNodeRef<'static>,
        family: NumericFamily,
        min: Option<i128>,
        max: Option<i128>,
    ) -> Self {
        Self {
            iri,
            family,
            min,
            max,
        }
    }

    fn contains(&self, value: i128) -> bool {
        self.min.is_none_or(|min| min <= value) && self.max.is_none_or(|max| value <= max)
    }

    /// Range check of an integer lexical form of any magnitude.
    fn contains_lexical(&self, value: &str) -> bool {
        if let Ok(value) = value.parse::<i128>() {
            return self.contains(value);
        }
        // beyond i128, so beyond every finite bound
        if value.starts_with('-') {
            self.min.is_none()
        } else {
            self.max.is_none()
        }
    }
}

const NUMERIC_DATATYPES: [NumericDatatype; 16] = [
    NumericDatatype::new(xsd::INTEGER, NumericFamily::Integer, None, None),
    NumericDatatype::new(xsd::DECIMAL, NumericFamily::Decimal, None, None),
    NumericDatatype::new(xsd::FLOAT, NumericFamily::Float, None, None),
    NumericDatatype::new(xsd::DOUBLE, NumericFamily::Double, None, None),
    NumericDatatype::new(
        xsd::NON_POSITIVE_INTEGER,
        NumericFamily::Integer,
        None,
        Some(0),
    ),
    NumericDatatype::new(xsd::NEGATIVE_INTEGER, NumericFamily::Integer, None, Some(-1)),
    NumericDatatype::new(
        xsd::LONG,
        NumericFamily::Integer,
        Some(-9_223_372_036_854_775_808),
        Some(9_223_372_036_854_775_807),
    ),
    NumericDatatype::new(
        xsd::INT,
        NumericFamily::Integer,
        Some(-2_147_483_648),
        Some(2_147_483_647),
    ),
    NumericDatatype::new(
        xsd::SHORT,
        NumericFamily::Integer,
        Some(-32_768),
        Some(32_767),
    ),
    NumericDatatype::new(xsd::BYTE, NumericFamily::Integer, Some(-128), Some(127)),
    NumericDatatype::new(
        xsd::NON_NEGATIVE_INTEGER,
        NumericFamily::Integer,
        Some(0),
        None,
    ),
    NumericDatatype::new(
        xsd::UNSIGNED_LONG,
        NumericFamily::Integer,
        Some(0),
        Some(18_446_744_073_709_551_615),
    ),
    NumericDatatype::new(
        xsd::UNSIGNED_INT,
        NumericFamily::Integer,
        Some(0),
        Some(4_294_967_295),
    ),
    NumericDatatype::new(
        xsd::UNSIGNED_SHORT,
        NumericFamily::Integer,
        Some(0),
        Some(65_535),
    ),
    NumericDatatype::new(xsd::UNSIGNED_BYTE, NumericFamily::Integer, Some(0), Some(255)),
    NumericDatatype::new(xsd::POSITIVE_INTEGER, NumericFamily::Integer, Some(1), None),
];

fn numeric_datatype(datatype: NamedNodeRef<'_>) -> Option<&'static NumericDatatype> {
    NUMERIC_DATATYPES.iter().find(|d| d.iri == datatype)
}

/// Returns true if the datatype is one of the known XSD numeric datatypes.
pub fn is_numeric_datatype(datatype: NamedNodeRef<'_>) -> bool {
    numeric_datatype(datatype).is_some()
}

/// A parsed numeric value.
///
/// Values of `xsd:integer` and its derived types are stored as [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericLiteral {
    /// `xsd:decimal` or integer value.
    Decimal(Decimal),
    /// `xsd:float` value.
    Float(Float),
    /// `xsd:double` value.
    Double(Double),
}

impl NumericLiteral {
    /// Compares two numeric values.
    ///
    /// Two decimals are compared exactly, other pairs are compared as doubles.
    /// Returns `None` if one of the values is `NaN`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            _ => self.to_double().partial_cmp(&other.to_double()),
        }
    }

    fn to_double(self) -> Double {
        match self {
            Self::Decimal(value) => value.into(),
            Self::Float(value) => value.into(),
            Self::Double(value) => value,
        }
    }
}

impl FromStr for NumericLiteral {
    type Err = ParseNumericLiteralError;

    /// Parses a facet bound: decimal lexical forms give decimals, other double lexical forms give doubles.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if is_decimal_lexical(value) {
            if let Ok(decimal) = Decimal::from_str(value) {
                return Ok(Self::Decimal(decimal));
            }
        }
        if is_double_lexical(value) {
            if let Ok(double) = Double::from_str(value) {
                return Ok(Self::Double(double));
            }
        }
        Err(ParseNumericLiteralError {
            value: value.to_owned(),
        })
    }
}

impl From<Decimal> for NumericLiteral {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<i64> for NumericLiteral {
    fn from(value: i64) -> Self {
        Self::Decimal(value.into())
    }
}

impl From<Double> for NumericLiteral {
    fn from(value: Double) -> Self {
        Self::Double(value)
    }
}

impl fmt::Display for NumericLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal(value) => value.fmt(f),
            Self::Float(value) => value.fmt(f),
            Self::Double(value) => value.fmt(f),
        }
    }
}

/// Error returned when a string is not a numeric lexical form.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid numeric literal '{value}'")]
pub struct ParseNumericLiteralError {
    value: String,
}

/// Parses a literal with a numeric datatype.
///
/// Returns `None` if the datatype is not numeric, if the lexical form does not follow the datatype
/// grammar or if the value is outside of the datatype range.
///
/// Integers and decimals that do not fit in a [`Decimal`] are approximated by a [`Double`].
pub fn parse_numeric(literal: LiteralRef<'_>) -> Option<NumericLiteral> {
    let datatype = numeric_datatype(literal.datatype())?;
    let value = literal.value();
    if !is_numeric_lexical(datatype, value) {
        return None;
    }
    match datatype.family {
        NumericFamily::Integer | NumericFamily::Decimal => Some(
            if let Ok(decimal) = Decimal::from_str(value) {
                NumericLiteral::Decimal(decimal)
            } else {
                NumericLiteral::Double(Double::from_str(value).ok()?)
            },
        ),
        NumericFamily::Float => Float::from_str(value).ok().map(NumericLiteral::Float),
        NumericFamily::Double => Double::from_str(value).ok().map(NumericLiteral::Double),
    }
}

fn is_numeric_lexical(datatype: &NumericDatatype, value: &str) -> bool {
    match datatype.family {
        NumericFamily::Integer => is_integer_lexical(value) && datatype.contains_lexical(value),
        NumericFamily::Decimal => is_decimal_lexical(value),
        NumericFamily::Float | NumericFamily::Double => is_double_lexical(value),
    }
}

/// Checks that the lexical form of a literal is valid for its datatype.
///
/// Datatypes without a known grammar are considered well-formed.
pub fn is_valid_lexical(literal: LiteralRef<'_>) -> bool {
    let datatype = literal.datatype();
    let value = literal.value();
    if let Some(numeric) = numeric_datatype(datatype) {
        return is_numeric_lexical(numeric, value);
    }
    if datatype == xsd::BOOLEAN {
        Boolean::from_str(value).is_ok()
    } else if datatype == xsd::DATE_TIME {
        DateTime::from_str(value).is_ok()
    } else if datatype == xsd::DATE {
        Date::from_str(value).is_ok()
    } else if datatype == xsd::TIME {
        Time::from_str(value).is_ok()
    } else {
        true
    }
}

/// Counts the total and fraction digits of a valid `xsd:decimal` or `xsd:integer` literal.
///
/// Leading zeros of the integer part and trailing zeros of the fraction part are not counted.
/// Returns `None` for the other datatypes.
pub(crate) fn digit_counts(literal: LiteralRef<'_>) -> Option<(usize, usize)> {
    let datatype = numeric_datatype(literal.datatype())?;
    if !matches!(
        datatype.family,
        NumericFamily::Integer | NumericFamily::Decimal
    ) || !is_numeric_lexical(datatype, literal.value())
    {
        return None;
    }
    let unsigned = strip_sign(literal.value());
    let (integer, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let integer = integer.trim_start_matches('0');
    let fraction = fraction.trim_end_matches('0');
    Some(((integer.len() + fraction.len()).max(1), fraction.len()))
}

fn all_digits(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_digit())
}

fn strip_sign(value: &str) -> &str {
    value.strip_prefix(['+', '-']).unwrap_or(value)
}

// [+-]?[0-9]+
fn is_integer_lexical(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && all_digits(digits)
}

// [+-]?([0-9]*\.[0-9]+|[0-9]+)
fn is_decimal_lexical(value: &str) -> bool {
    let body = strip_sign(value);
    match body.split_once('.') {
        Some((integer, fraction)) => !fraction.is_empty() && all_digits(integer) && all_digits(fraction),
        None => !body.is_empty() && all_digits(body),
    }
}

// decimal ([eE][+-]?[0-9]+)? | NaN | INF | -INF
fn is_double_lexical(value: &str) -> bool {
    if matches!(value, "NaN" | "INF" | "-INF") {
        return true;
    }
    match value.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => is_decimal_lexical(mantissa) && is_integer_lexical(exponent),
        None => is_decimal_lexical(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{Literal, NamedNodeRef};

    fn typed(value: &str, datatype: NamedNodeRef<'_>) -> Literal {
        Literal::new_typed_literal(value, datatype)
    }

    #[test]
    fn test_integer_grammar() {
        assert!(is_integer_lexical("42"));
        assert!(is_integer_lexical("+42"));
        assert!(is_integer_lexical("-0"));
        assert!(!is_integer_lexical("42.5"));
        assert!(!is_integer_lexical(""));
        assert!(!is_integer_lexical("-"));
        assert!(!is_integer_lexical(" 42"));
    }

    #[test]
    fn test_decimal_grammar() {
        assert!(is_decimal_lexical("1.5"));
        assert!(is_decimal_lexical(".5"));
        assert!(is_decimal_lexical("-12"));
        assert!(!is_decimal_lexical("1."));
        assert!(!is_decimal_lexical("."));
        assert!(!is_decimal_lexical("1e5"));
    }

    #[test]
    fn test_double_grammar() {
        assert!(is_double_lexical("1e5"));
        assert!(is_double_lexical("-1.5E-3"));
        assert!(is_double_lexical("NaN"));
        assert!(is_double_lexical("INF"));
        assert!(is_double_lexical("-INF"));
        assert!(!is_double_lexical("inf"));
        assert!(!is_double_lexical("1e"));
        assert!(!is_double_lexical("e5"));
    }

    #[test]
    fn test_parse_numeric_ranges() {
        assert!(parse_numeric(typed("127", xsd::BYTE).as_ref()).is_some());
        assert!(parse_numeric(typed("200", xsd::BYTE).as_ref()).is_none());
        assert!(parse_numeric(typed("-129", xsd::BYTE).as_ref()).is_none());
        assert!(parse_numeric(typed("65535", xsd::UNSIGNED_SHORT).as_ref()).is_some());
        assert!(parse_numeric(typed("65536", xsd::UNSIGNED_SHORT).as_ref()).is_none());
        assert!(parse_numeric(typed("-1", xsd::UNSIGNED_SHORT).as_ref()).is_none());
        assert!(parse_numeric(typed("0", xsd::POSITIVE_INTEGER).as_ref()).is_none());
        assert!(parse_numeric(typed("18446744073709551615", xsd::UNSIGNED_LONG).as_ref()).is_some());
    }

    #[test]
    fn test_parse_numeric_grammar() {
        assert!(parse_numeric(typed("42", xsd::INTEGER).as_ref()).is_some());
        assert!(parse_numeric(typed("42.5", xsd::INTEGER).as_ref()).is_none());
        assert!(parse_numeric(typed("42.5", xsd::DECIMAL).as_ref()).is_some());
        assert!(parse_numeric(typed("4e2", xsd::DECIMAL).as_ref()).is_none());
        assert!(parse_numeric(typed("4e2", xsd::DOUBLE).as_ref()).is_some());
        assert!(parse_numeric(typed("INF", xsd::FLOAT).as_ref()).is_some());
        assert!(parse_numeric(typed("abc", xsd::DOUBLE).as_ref()).is_none());
        assert!(parse_numeric(Literal::new_simple_literal("42").as_ref()).is_none());
    }

    #[test]
    fn test_is_valid_lexical() {
        assert!(is_valid_lexical(typed("true", xsd::BOOLEAN).as_ref()));
        assert!(!is_valid_lexical(typed("yes", xsd::BOOLEAN).as_ref()));
        assert!(is_valid_lexical(typed("2024-02-29", xsd::DATE).as_ref()));
        assert!(!is_valid_lexical(typed("2024-02-30x", xsd::DATE).as_ref()));
        assert!(is_valid_lexical(typed("anything", xsd::STRING).as_ref()));
    }

    #[test]
    fn test_compare() {
        let one = NumericLiteral::from(1);
        let one_and_half = NumericLiteral::from_str("1.5").unwrap();
        let big = NumericLiteral::from_str("1e3").unwrap();
        assert_eq!(one.compare(&one_and_half), Some(Ordering::Less));
        assert_eq!(big.compare(&one_and_half), Some(Ordering::Greater));
        let nan = NumericLiteral::Double(Double::from(f64::NAN));
        assert_eq!(nan.compare(&one), None);
        assert!(NumericLiteral::from_str("abc").is_err());
    }

    #[test]
    fn test_digit_counts() {
        let count = |s: &str| digit_counts(typed(s, xsd::DECIMAL).as_ref());
        assert_eq!(count("123.45"), Some((5, 2)));
        assert_eq!(count("0.25"), Some((2, 2)));
        assert_eq!(count("-7"), Some((1, 0)));
        assert_eq!(count("0"), Some((1, 0)));
        assert_eq!(count("1.500"), Some((2, 1)));
        assert_eq!(count("0.1234567890123456789"), Some((19, 19)));
        assert_eq!(count("1.2.3"), None);
        assert_eq!(digit_counts(typed("+0042", xsd::INTEGER).as_ref()), Some((2, 0)));
        assert_eq!(digit_counts(typed("1.5", xsd::DOUBLE).as_ref()), None);
    }

    #[test]
    fn test_unbounded_integer_and_decimal_values() {
        let big = typed("123456789012345678901234567890", xsd::INTEGER);
        assert!(is_valid_lexical(big.as_ref()));
        assert!(matches!(
            parse_numeric(big.as_ref()),
            Some(NumericLiteral::Double(_))
        ));
        let valid = |s: &str, datatype| is_valid_lexical(typed(s, datatype).as_ref());
        assert!(valid("-123456789012345678901234567890", xsd::NEGATIVE_INTEGER));
        assert!(valid("123456789012345678901234567890", xsd::POSITIVE_INTEGER));
        assert!(!valid("123456789012345678901234567890", xsd::UNSIGNED_LONG));
        assert!(!valid("-123456789012345678901234567890", xsd::NON_NEGATIVE_INTEGER));
        assert!(valid("00042", xsd::BYTE));

        let long_fraction = typed("0.1234567890123456789", xsd::DECIMAL);
        assert!(is_valid_lexical(long_fraction.as_ref()));
        assert!(parse_numeric(long_fraction.as_ref()).is_some());
    }
}
