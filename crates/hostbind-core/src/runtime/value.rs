//! The value box exchanged at the native/runtime boundary.

use std::fmt;

use crate::error::ConversionError;
use crate::options::CoercionMode;

use super::ObjectHandle;

/// A dynamic value passed across the adapter boundary.
///
/// Scalars and strings are stored inline. Arrays and objects live in the
/// [`ObjectHeap`](super::ObjectHeap) and are referenced by handle; their
/// lifetime is governed by the heap's reference counts and the memory scope
/// of the call that created them.
///
/// A box starts out `Undefined` and must be assigned before it is coerced.
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    /// Not yet assigned
    #[default]
    Undefined,
    /// Null
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (every native integer width is widened to i64)
    Int(i64),
    /// Floating point value (double precision)
    Double(f64),
    /// String value (owned)
    String(String),
    /// Handle to a heap-allocated [`HostArray`](super::HostArray)
    Array(ObjectHandle),
    /// Handle to a heap-allocated object
    Object(ObjectHandle),
}

impl Value {
    /// Create an undefined box.
    pub fn undefined() -> Self {
        Value::Undefined
    }

    /// Create a null box.
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an integer box.
    pub fn from_int(value: i64) -> Self {
        Value::Int(value)
    }

    /// Create a double box.
    pub fn from_double(value: f64) -> Self {
        Value::Double(value)
    }

    /// Create a string box.
    pub fn from_string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    /// Create a boolean box.
    pub fn from_bool(value: bool) -> Self {
        Value::Bool(value)
    }

    /// Get a human-readable name for this box's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Whether the box has been assigned.
    pub fn is_defined(&self) -> bool {
        !matches!(self, Value::Undefined)
    }

    /// Check if this box is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The heap handle this box refers to, for arrays and objects.
    pub fn heap_handle(&self) -> Option<ObjectHandle> {
        match self {
            Value::Array(h) | Value::Object(h) => Some(*h),
            _ => None,
        }
    }

    /// Coerce to an integer using strict string rules.
    pub fn as_int(&self) -> Result<i64, ConversionError> {
        self.coerce_int(CoercionMode::Strict)
    }

    /// Coerce to a double using strict string rules.
    pub fn as_double(&self) -> Result<f64, ConversionError> {
        self.coerce_double(CoercionMode::Strict)
    }

    /// Coerce to an integer.
    ///
    /// Doubles truncate toward zero; values outside the i64 range saturate.
    pub fn coerce_int(&self, mode: CoercionMode) -> Result<i64, ConversionError> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Double(v) => double_to_int(*v),
            Value::Bool(b) => Ok(*b as i64),
            Value::Null => Ok(0),
            Value::String(s) => match parse_numeric(s, mode, "int")? {
                Numeric::Int(v) => Ok(v),
                Numeric::Double(v) => double_to_int(v),
            },
            Value::Undefined => Err(ConversionError::Undefined { target_type: "int" }),
            other => Err(ConversionError::TypeMismatch {
                expected: "int",
                actual: other.type_name(),
            }),
        }
    }

    /// Coerce to a double.
    pub fn coerce_double(&self, mode: CoercionMode) -> Result<f64, ConversionError> {
        match self {
            Value::Double(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Null => Ok(0.0),
            Value::String(s) => match parse_numeric(s, mode, "double")? {
                Numeric::Int(v) => Ok(v as f64),
                Numeric::Double(v) => Ok(v),
            },
            Value::Undefined => Err(ConversionError::Undefined {
                target_type: "double",
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: "double",
                actual: other.type_name(),
            }),
        }
    }

    /// Coerce to a string following the host's string-conversion rules.
    pub fn as_string(&self) -> Result<String, ConversionError> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Int(v) => Ok(v.to_string()),
            Value::Double(v) => Ok(format_double(*v)),
            Value::Bool(true) => Ok("1".to_string()),
            Value::Bool(false) | Value::Null => Ok(String::new()),
            Value::Undefined => Err(ConversionError::Undefined {
                target_type: "string",
            }),
            other => Err(ConversionError::TypeMismatch {
                expected: "string",
                actual: other.type_name(),
            }),
        }
    }

    /// Coerce to a boolean following the host's truthiness rules.
    pub fn as_bool(&self) -> Result<bool, ConversionError> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(v) => Ok(*v != 0),
            Value::Double(v) => Ok(*v != 0.0),
            Value::Null => Ok(false),
            Value::String(s) => Ok(!s.is_empty() && s != "0"),
            Value::Object(_) => Ok(true),
            Value::Undefined => Err(ConversionError::Undefined { target_type: "bool" }),
            Value::Array(_) => Err(ConversionError::TypeMismatch {
                expected: "bool",
                actual: "array",
            }),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "Undefined"),
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Double(v) => write!(f, "Double({:?})", v),
            Value::String(s) => write!(f, "String({:?})", s),
            Value::Array(h) => write!(f, "Array({}:{})", h.index, h.generation),
            Value::Object(h) => write!(f, "Object({}:{})", h.index, h.generation),
        }
    }
}

fn double_to_int(v: f64) -> Result<i64, ConversionError> {
    if v.is_finite() {
        Ok(v.trunc() as i64)
    } else {
        Err(ConversionError::NonFiniteFloat {
            value: v,
            target_type: "int",
        })
    }
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NAN".to_string()
    } else if v.is_infinite() {
        let text = if v > 0.0 { "INF" } else { "-INF" };
        text.to_string()
    } else {
        // Display prints integral doubles without a fractional part
        format!("{}", v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Numeric {
    Int(i64),
    Double(f64),
}

/// Length of the leading numeric literal in `s` and whether it is a float.
fn scan_numeric(s: &str) -> Option<(usize, bool)> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut i = 0;

    if i < len && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }

    let int_start = i;
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut is_float = false;
    let mut frac_digits = 0;
    if i < len && bytes[i] == b'.' {
        let mut k = i + 1;
        while k < len && bytes[k].is_ascii_digit() {
            k += 1;
        }
        frac_digits = k - (i + 1);
        if int_digits > 0 || frac_digits > 0 {
            is_float = true;
            i = k;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut k = i + 1;
        if k < len && (bytes[k] == b'+' || bytes[k] == b'-') {
            k += 1;
        }
        let exp_start = k;
        while k < len && bytes[k].is_ascii_digit() {
            k += 1;
        }
        if k > exp_start {
            is_float = true;
            i = k;
        }
    }

    Some((i, is_float))
}

fn to_numeric(literal: &str, is_float: bool) -> Numeric {
    if !is_float {
        if let Ok(v) = literal.parse::<i64>() {
            return Numeric::Int(v);
        }
    }
    // Integer literals that overflow i64 become doubles
    Numeric::Double(literal.parse::<f64>().unwrap_or(0.0))
}

fn parse_numeric(
    s: &str,
    mode: CoercionMode,
    target_type: &'static str,
) -> Result<Numeric, ConversionError> {
    let trimmed = s.trim_start();
    match (scan_numeric(trimmed), mode) {
        (Some((end, is_float)), CoercionMode::Strict) => {
            if trimmed[end..].trim_end().is_empty() {
                Ok(to_numeric(&trimmed[..end], is_float))
            } else {
                Err(ConversionError::NonNumericString {
                    value: s.to_string(),
                    target_type,
                })
            }
        }
        (Some((end, is_float)), CoercionMode::Lenient) => Ok(to_numeric(&trimmed[..end], is_float)),
        (None, CoercionMode::Strict) => Err(ConversionError::NonNumericString {
            value: s.to_string(),
            target_type,
        }),
        (None, CoercionMode::Lenient) => Ok(Numeric::Int(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_and_definedness() {
        assert!(!Value::undefined().is_defined());
        assert!(Value::from_int(1).is_defined());
        assert!(Value::null().is_defined());
        assert!(Value::null().is_null());
        assert_eq!(Value::from_string("a"), Value::String("a".into()));
        assert_eq!(Value::default(), Value::Undefined);
    }

    #[test]
    fn int_coercion_table() {
        assert_eq!(Value::Int(7).as_int(), Ok(7));
        assert_eq!(Value::Double(-2.9).as_int(), Ok(-2));
        assert_eq!(Value::Bool(true).as_int(), Ok(1));
        assert_eq!(Value::Null.as_int(), Ok(0));
        assert_eq!(Value::from_string(" 42 ").as_int(), Ok(42));
        assert_eq!(Value::from_string("1e3").as_int(), Ok(1000));
    }

    #[test]
    fn int_coercion_failures() {
        assert_eq!(
            Value::Undefined.as_int(),
            Err(ConversionError::Undefined { target_type: "int" })
        );
        assert!(matches!(
            Value::from_string("12abc").as_int(),
            Err(ConversionError::NonNumericString { .. })
        ));
        assert!(matches!(
            Value::Double(f64::NAN).as_int(),
            Err(ConversionError::NonFiniteFloat { .. })
        ));
    }

    #[test]
    fn lenient_mode_uses_numeric_prefix() {
        let v = Value::from_string("12abc");
        assert_eq!(v.coerce_int(CoercionMode::Lenient), Ok(12));
        assert_eq!(
            Value::from_string("abc").coerce_int(CoercionMode::Lenient),
            Ok(0)
        );
        assert_eq!(
            Value::from_string("2.5kg").coerce_double(CoercionMode::Lenient),
            Ok(2.5)
        );
    }

    #[test]
    fn overflowing_integer_string_becomes_double() {
        let v = Value::from_string("99999999999999999999");
        assert_eq!(v.as_double(), Ok(1e20));
        assert_eq!(v.as_int(), Ok(i64::MAX));
    }

    #[test]
    fn double_coercion() {
        assert_eq!(Value::Double(1.0).as_double(), Ok(1.0));
        assert_eq!(Value::Int(3).as_double(), Ok(3.0));
        assert_eq!(Value::from_string(".5").as_double(), Ok(0.5));
        assert!(Value::from_string(".").as_double().is_err());
    }

    #[test]
    fn string_conversion_rules() {
        assert_eq!(Value::Int(65).as_string().unwrap(), "65");
        assert_eq!(Value::Double(1.0).as_string().unwrap(), "1");
        assert_eq!(Value::Double(0.5).as_string().unwrap(), "0.5");
        assert_eq!(Value::Double(f64::INFINITY).as_string().unwrap(), "INF");
        assert_eq!(Value::Bool(true).as_string().unwrap(), "1");
        assert_eq!(Value::Bool(false).as_string().unwrap(), "");
        assert_eq!(Value::Null.as_string().unwrap(), "");
        assert!(Value::Undefined.as_string().is_err());
    }

    #[test]
    fn bool_conversion_rules() {
        assert_eq!(Value::from_string("0").as_bool(), Ok(false));
        assert_eq!(Value::from_string("").as_bool(), Ok(false));
        assert_eq!(Value::from_string("0.0").as_bool(), Ok(true));
        assert_eq!(Value::Int(-1).as_bool(), Ok(true));
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Value::Int(1)), "Int(1)");
        assert_eq!(format!("{:?}", Value::Double(1.0)), "Double(1.0)");
        assert_eq!(format!("{:?}", Value::Undefined), "Undefined");
    }
}
