//! Field values supplied to formatters at generation time.

use std::fmt;

/// A value bound to a field before it is formatted.
///
/// Formatters decide which variants they accept: the alphanumeric family
/// coerces everything to text, the numeric family wants numbers (or text
/// that reads as one).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    #[default]
    Absent,
}

impl FieldValue {
    /// Text rendering used by the alphanumeric family. `Absent` is empty.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(n) => n.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Absent => String::new(),
        }
    }

    /// Numeric reading of the value, if it has one.
    ///
    /// Text is trimmed and parsed as a decimal number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Text(s) => s.trim().parse().ok(),
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Decimal(d) => Some(*d),
            FieldValue::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Absent => f.write_str("nil"),
            other => f.write_str(&other.to_text()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&String> for FieldValue {
    fn from(s: &String) -> Self {
        FieldValue::Text(s.clone())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<u32> for FieldValue {
    fn from(n: u32) -> Self {
        FieldValue::Integer(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(d: f64) -> Self {
        FieldValue::Decimal(d)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_text() {
        assert_eq!(FieldValue::from("Sarah").to_text(), "Sarah");
        assert_eq!(FieldValue::from(42).to_text(), "42");
        assert_eq!(FieldValue::from(-7i64).to_text(), "-7");
        assert_eq!(FieldValue::from(123.98).to_text(), "123.98");
        assert_eq!(FieldValue::Absent.to_text(), "");
    }

    #[test]
    fn test_option_maps_to_absent() {
        let none: Option<&str> = None;
        assert!(FieldValue::from(none).is_absent());
        assert_eq!(FieldValue::from(Some("x")), FieldValue::Text("x".into()));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(FieldValue::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(FieldValue::from("abc").as_f64(), None);
        assert_eq!(FieldValue::from(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::Absent.as_f64(), None);
    }
}
