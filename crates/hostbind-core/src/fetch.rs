//! Parameter fetching.
//!
//! [`ParamFetcher`] pulls the required and optional arguments of a call out
//! of its [`CallFrame`] into slots allocated in the call's arena, enforcing
//! arity and coercing each argument to its declared native type right after
//! extraction.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use hostbind_core::fetch::{ParamDecl, ParamFetcher, ParamType};
//! use hostbind_core::runtime::{CallFrame, Value};
//! use hostbind_core::CoercionMode;
//!
//! let arena = Bump::new();
//! let fetcher = ParamFetcher::new(&arena, CoercionMode::Strict);
//! let args = [Value::from_string("7")];
//! let params = fetcher
//!     .fetch_typed(&CallFrame::new(&args), false, &[ParamDecl::required("position", ParamType::Long)])
//!     .unwrap();
//! assert_eq!(params.get::<i64>(0).unwrap(), 7);
//! ```

use bumpalo::Bump;
use bumpalo::collections::Vec as BumpVec;

use crate::convert::{FromValue, IntoValue};
use crate::error::{ConversionError, FetchError, NativeError};
use crate::options::CoercionMode;
use crate::runtime::{CallFrame, Value};

/// Declared native type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Untyped; the box is passed through unchanged
    Mixed,
    /// 64-bit signed integer
    Long,
    /// 32-bit signed integer
    Int,
    /// 32-bit unsigned integer
    UInt,
    /// 64-bit unsigned integer
    ULong,
    /// Signed byte
    Char,
    /// Unsigned byte
    UChar,
    Double,
    Bool,
    String,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Mixed => "mixed",
            ParamType::Long => "long",
            ParamType::Int => "int",
            ParamType::UInt => "unsigned int",
            ParamType::ULong => "unsigned long",
            ParamType::Char => "char",
            ParamType::UChar => "unsigned char",
            ParamType::Double => "double",
            ParamType::Bool => "bool",
            ParamType::String => "string",
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: &'static str,
    pub ty: ParamType,
    pub optional: bool,
}

impl ParamDecl {
    pub const fn required(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            optional: false,
        }
    }

    pub const fn optional(name: &'static str, ty: ParamType) -> Self {
        Self {
            name,
            ty,
            optional: true,
        }
    }
}

/// A coerced native argument.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeArg {
    Long(i64),
    Int(i32),
    UInt(u32),
    ULong(u64),
    Char(i8),
    UChar(u8),
    Double(f64),
    Bool(bool),
    Str(String),
}

impl NativeArg {
    /// Coerce to the declared native type. `None` for `mixed`, which takes
    /// the box as supplied.
    fn coerce(
        value: &Value,
        ty: ParamType,
        mode: CoercionMode,
    ) -> Result<Option<Self>, ConversionError> {
        Ok(Some(match ty {
            ParamType::Long => NativeArg::Long(i64::coerce(value, mode)?),
            ParamType::Int => NativeArg::Int(i32::coerce(value, mode)?),
            ParamType::UInt => NativeArg::UInt(u32::coerce(value, mode)?),
            ParamType::ULong => NativeArg::ULong(u64::coerce(value, mode)?),
            ParamType::Char => NativeArg::Char(i8::coerce(value, mode)?),
            ParamType::UChar => NativeArg::UChar(u8::coerce(value, mode)?),
            ParamType::Double => NativeArg::Double(f64::coerce(value, mode)?),
            ParamType::Bool => NativeArg::Bool(bool::coerce(value, mode)?),
            ParamType::String => NativeArg::Str(String::coerce(value, mode)?),
            ParamType::Mixed => return Ok(None),
        }))
    }

    /// Box the native argument again.
    pub fn to_value(&self) -> Value {
        match self {
            NativeArg::Long(v) => v.into_value(),
            NativeArg::Int(v) => v.into_value(),
            NativeArg::UInt(v) => v.into_value(),
            NativeArg::ULong(v) => v.into_value(),
            NativeArg::Char(v) => v.into_value(),
            NativeArg::UChar(v) => v.into_value(),
            NativeArg::Double(v) => v.into_value(),
            NativeArg::Bool(v) => v.into_value(),
            NativeArg::Str(v) => v.as_str().into_value(),
        }
    }
}

/// A fetched parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<'f> {
    /// Optional parameter the caller did not supply
    Undefined,
    /// Untyped argument, borrowed from the call frame
    Value(&'f Value),
    /// Argument coerced to its declared type
    Native(NativeArg),
}

impl Slot<'_> {
    pub fn is_defined(&self) -> bool {
        !matches!(self, Slot::Undefined)
    }
}

/// Parameters fetched for one call.
pub struct Params<'s, 'f> {
    slots: BumpVec<'s, Slot<'f>>,
    supplied: usize,
    exception_capable: bool,
    mode: CoercionMode,
}

impl<'s, 'f> Params<'s, 'f> {
    /// Declared parameter count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Arguments the caller actually supplied.
    pub fn supplied(&self) -> usize {
        self.supplied
    }

    pub fn exception_capable(&self) -> bool {
        self.exception_capable
    }

    pub fn slot(&self, index: usize) -> Result<&Slot<'f>, NativeError> {
        self.slots
            .get(index)
            .ok_or(NativeError::ParameterIndexOutOfBounds {
                index,
                count: self.slots.len(),
            })
    }

    /// Whether the parameter at `index` was supplied.
    pub fn is_defined(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(Slot::is_defined)
    }

    /// The parameter as a box; unsupplied optionals are `Undefined`.
    pub fn value(&self, index: usize) -> Result<Value, NativeError> {
        Ok(match self.slot(index)? {
            Slot::Undefined => Value::Undefined,
            Slot::Value(v) => (*v).clone(),
            Slot::Native(arg) => arg.to_value(),
        })
    }

    /// The parameter as a native type.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, NativeError> {
        let converted = match self.slot(index)? {
            Slot::Undefined => T::coerce(&Value::Undefined, self.mode),
            Slot::Value(v) => T::coerce(v, self.mode),
            Slot::Native(arg) => T::coerce(&arg.to_value(), self.mode),
        };
        converted.map_err(NativeError::Conversion)
    }
}

impl std::fmt::Debug for Params<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Params")
            .field("slots", &self.slots.as_slice())
            .field("supplied", &self.supplied)
            .field("exception_capable", &self.exception_capable)
            .finish()
    }
}

/// Extracts call arguments into arena-allocated slots.
#[derive(Debug, Clone, Copy)]
pub struct ParamFetcher<'s> {
    arena: &'s Bump,
    mode: CoercionMode,
}

impl<'s> ParamFetcher<'s> {
    pub fn new(arena: &'s Bump, mode: CoercionMode) -> Self {
        Self { arena, mode }
    }

    /// Fetch untyped parameters.
    ///
    /// Produces `required + optional` slots; fails when fewer than `required`
    /// or more than `required + optional` arguments were supplied.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn fetch<'f>(
        &self,
        frame: &CallFrame<'f>,
        exception_capable: bool,
        required: usize,
        optional: usize,
    ) -> Result<Params<'s, 'f>, FetchError> {
        let max = required + optional;
        check_arity(frame.supplied(), required, max)?;

        let mut slots = BumpVec::with_capacity_in(max, self.arena);
        for index in 0..max {
            slots.push(match frame.arg(index) {
                Some(v) => Slot::Value(v),
                None => Slot::Undefined,
            });
        }
        Ok(self.params(slots, frame.supplied(), exception_capable))
    }

    /// Fetch parameters with declared types.
    ///
    /// Required declarations must precede optional ones. Typed arguments are
    /// coerced in order; the first failure is reported with its position.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn fetch_typed<'f>(
        &self,
        frame: &CallFrame<'f>,
        exception_capable: bool,
        decls: &[ParamDecl],
    ) -> Result<Params<'s, 'f>, FetchError> {
        let required = decls.iter().take_while(|d| !d.optional).count();
        check_arity(frame.supplied(), required, decls.len())?;

        let mut slots = BumpVec::with_capacity_in(decls.len(), self.arena);
        for (position, decl) in decls.iter().enumerate() {
            let slot = match (frame.arg(position), decl.ty) {
                (None, _) => Slot::Undefined,
                (Some(v), ty) => match NativeArg::coerce(v, ty, self.mode) {
                    Ok(Some(native)) => Slot::Native(native),
                    Ok(None) => Slot::Value(v),
                    Err(source) => return Err(FetchError::Coercion { position, source }),
                },
            };
            slots.push(slot);
        }
        Ok(self.params(slots, frame.supplied(), exception_capable))
    }

    fn params<'f>(
        &self,
        slots: BumpVec<'s, Slot<'f>>,
        supplied: usize,
        exception_capable: bool,
    ) -> Params<'s, 'f> {
        Params {
            slots,
            supplied,
            exception_capable,
            mode: self.mode,
        }
    }
}

fn check_arity(supplied: usize, required: usize, max: usize) -> Result<(), FetchError> {
    if supplied < required || supplied > max {
        Err(FetchError::Arity {
            required,
            max,
            supplied,
        })
    } else {
        Ok(())
    }
}
