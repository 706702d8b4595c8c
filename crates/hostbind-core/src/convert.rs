//! Conversion traits between native Rust types and value boxes.
//!
//! - [`FromValue`]: coerce a [`Value`] to a Rust value
//! - [`IntoValue`]: box a Rust value
//!
//! ## Integer widths
//!
//! Boxes hold every integer as `i64`. Narrow native types are produced the
//! way a native cast would produce them: signed narrowing wraps in two's
//! complement, unsigned types reinterpret the low bits. Widening back into a
//! box sign-extends signed types and zero-extends unsigned ones; `u64`
//! reinterprets its bits.
//!
//! ## Example
//!
//! ```
//! use hostbind_core::convert::{FromValue, IntoValue};
//! use hostbind_core::runtime::Value;
//!
//! let boxed = b'A'.into_value();
//! assert_eq!(boxed, Value::Int(65));
//! assert_eq!(u8::from_value(&Value::Int(321)), Ok(65));
//! ```

use crate::error::ConversionError;
use crate::options::CoercionMode;
use crate::runtime::Value;

/// Coerce a value box to a native type.
pub trait FromValue: Sized {
    /// Coerce under the given string-to-number mode.
    fn coerce(value: &Value, mode: CoercionMode) -> Result<Self, ConversionError>;

    /// Coerce under strict rules.
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Self::coerce(value, CoercionMode::Strict)
    }
}

/// Box a native value.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

// ============================================================================
// Integer implementations
// ============================================================================

macro_rules! impl_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn coerce(value: &Value, mode: CoercionMode) -> Result<Self, ConversionError> {
                    // Wraps like a native cast
                    value.coerce_int(mode).map(|v| v as $ty)
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, i64, u8, u16, u32);

impl FromValue for u64 {
    fn coerce(value: &Value, mode: CoercionMode) -> Result<Self, ConversionError> {
        value.coerce_int(mode).map(|v| v as u64)
    }
}

impl IntoValue for u64 {
    fn into_value(self) -> Value {
        // Reinterpret bits to keep the full u64 range
        Value::Int(self as i64)
    }
}

// ============================================================================
// Float, bool and string implementations
// ============================================================================

impl FromValue for f64 {
    fn coerce(value: &Value, mode: CoercionMode) -> Result<Self, ConversionError> {
        value.coerce_double(mode)
    }
}

impl FromValue for f32 {
    fn coerce(value: &Value, mode: CoercionMode) -> Result<Self, ConversionError> {
        value.coerce_double(mode).map(|v| v as f32)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Double(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Double(self as f64)
    }
}

impl FromValue for bool {
    fn coerce(value: &Value, _mode: CoercionMode) -> Result<Self, ConversionError> {
        value.as_bool()
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    fn coerce(value: &Value, _mode: CoercionMode) -> Result<Self, ConversionError> {
        value.as_string()
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

// ============================================================================
// Boxes, unit and options
// ============================================================================

impl FromValue for Value {
    fn coerce(value: &Value, _mode: CoercionMode) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_narrowing_wraps() {
        assert_eq!(i32::from_value(&Value::Int(1)), Ok(1));
        assert_eq!(i32::from_value(&Value::Int(1 << 32)), Ok(0));
        assert_eq!(i8::from_value(&Value::Int(200)), Ok(-56));
    }

    #[test]
    fn unsigned_narrowing_reinterprets() {
        assert_eq!(u32::from_value(&Value::Int(-1)), Ok(u32::MAX));
        assert_eq!(u8::from_value(&Value::Int(65)), Ok(65));
        assert_eq!(u64::from_value(&Value::Int(-1)), Ok(u64::MAX));
    }

    #[test]
    fn widening_back_into_a_box() {
        assert_eq!(1i32.into_value(), Value::Int(1));
        assert_eq!(1u32.into_value(), Value::Int(1));
        assert_eq!((b'A' as i8).into_value(), Value::Int(65));
        assert_eq!(200u8.into_value(), Value::Int(200));
        assert_eq!((-56i8).into_value(), Value::Int(-56));
        assert_eq!(u64::MAX.into_value(), Value::Int(-1));
    }

    #[test]
    fn float_conversions() {
        assert_eq!(1.0f64.into_value(), Value::Double(1.0));
        assert_eq!(f64::from_value(&Value::Int(2)), Ok(2.0));
        assert_eq!(f32::from_value(&Value::Double(0.5)), Ok(0.5));
    }

    #[test]
    fn mode_is_honored() {
        let v = Value::from_string("3 apples");
        assert!(i64::from_value(&v).is_err());
        assert_eq!(i64::coerce(&v, CoercionMode::Lenient), Ok(3));
    }

    #[test]
    fn unit_and_option() {
        assert_eq!(().into_value(), Value::Null);
        assert_eq!(None::<i32>.into_value(), Value::Null);
        assert_eq!(Some("x").into_value(), Value::from_string("x"));
    }

    #[test]
    fn string_and_bool() {
        assert_eq!(String::from_value(&Value::Int(5)), Ok("5".to_string()));
        assert_eq!(bool::from_value(&Value::from_string("0")), Ok(false));
        assert_eq!(
            Value::from_value(&Value::Undefined),
            Ok(Value::Undefined)
        );
    }
}
