//! Error types for the adapter layer.
//!
//! ## Error Hierarchy
//!
//! ```text
//! HostbindError (top-level wrapper)
//! ├── RegistrationError - class/method/capability registration errors
//! ├── AdapterError      - per-call failures raised by a method adapter
//! │   ├── FetchError    - arity and coercion failures from the parameter fetcher
//! │   └── NativeError   - failures raised by a method body or the receiver
//! └── PropertyError     - static property access errors
//! ```
//!
//! `ConversionError` is the leaf describing why a value box could not be
//! coerced to a native type.

use thiserror::Error;

// ============================================================================
// Conversion Errors
// ============================================================================

/// A value box could not be coerced to the requested native type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// The box holds a type that never coerces to the target.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// The box was read before it was assigned.
    #[error("undefined value cannot be converted to {target_type}")]
    Undefined { target_type: &'static str },

    /// A string did not hold a number under the active coercion mode.
    #[error("non-numeric string {value:?} cannot be converted to {target_type}")]
    NonNumericString {
        value: String,
        target_type: &'static str,
    },

    /// NaN or an infinity was converted to an integer.
    #[error("non-finite float {value} cannot be converted to {target_type}")]
    NonFiniteFloat {
        value: f64,
        target_type: &'static str,
    },

    /// An array or object handle no longer refers to a live heap slot.
    #[error("stale handle: object at index {index} has been freed")]
    StaleHandle { index: u32 },
}

// ============================================================================
// Native Errors
// ============================================================================

/// Errors raised from inside a method body or while resolving the receiver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// Error converting arguments or return values
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The receiver could not be used as the requested type
    #[error("invalid 'this' reference: {message}")]
    InvalidThis { message: String },

    /// An instance method was called without a receiver
    #[error("method requires a receiver but was called statically")]
    MissingReceiver,

    /// A parameter slot was read past the declared parameter list
    #[error("parameter index {index} out of bounds (method declares {count} parameters)")]
    ParameterIndexOutOfBounds { index: usize, count: usize },

    /// Stale object handle (object was freed)
    #[error("stale object handle: object at index {index} has been freed")]
    StaleHandle { index: u32 },

    /// Generic body failure
    #[error("native error: {message}")]
    Other { message: String },
}

impl NativeError {
    /// Create an "invalid this" error with a message.
    pub fn invalid_this(message: impl Into<String>) -> Self {
        NativeError::InvalidThis {
            message: message.into(),
        }
    }

    /// Create a generic native error.
    pub fn other(message: impl Into<String>) -> Self {
        NativeError::Other {
            message: message.into(),
        }
    }
}

// ============================================================================
// Fetch Errors
// ============================================================================

/// Failures produced by the parameter fetcher, before any call-site context
/// is attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// Fewer than `required`, or more than `required + optional`, arguments.
    #[error("expects {} argument(s), {supplied} given", arity_text(*required, *max))]
    Arity {
        required: usize,
        max: usize,
        supplied: usize,
    },

    /// Argument at `position` (zero-based) failed declared-type coercion.
    #[error("argument #{} could not be coerced: {source}", position + 1)]
    Coercion {
        position: usize,
        #[source]
        source: ConversionError,
    },
}

fn arity_text(required: usize, max: usize) -> String {
    if required == max {
        format!("exactly {required}")
    } else {
        format!("between {required} and {max}")
    }
}

// ============================================================================
// Adapter Errors
// ============================================================================

/// Failures raised by a method adapter invocation.
///
/// `Arity`, `TypeCoercion`, `UnknownMethod` and `Body` are recoverable: they
/// are reported to the runtime's failure channel and the runtime keeps going.
/// `CapabilityContractViolation` and `MemoryScopeImbalance` are developer
/// defects; they abort only the offending call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// Wrong number of arguments.
    #[error("{class}::{method}() expects {} argument(s), {supplied} given", arity_text(*required, *max))]
    Arity {
        class: String,
        method: String,
        required: usize,
        max: usize,
        supplied: usize,
    },

    /// An argument could not be coerced to its declared native type.
    #[error("{class}::{method}() argument #{} could not be coerced: {source}", position + 1)]
    TypeCoercion {
        class: String,
        method: String,
        position: usize,
        #[source]
        source: ConversionError,
    },

    /// A declared capability's method table is missing required entries.
    #[error("{class} declares {capability} but does not provide: {}", missing.join(", "))]
    CapabilityContractViolation {
        class: String,
        capability: &'static str,
        missing: Vec<&'static str>,
    },

    /// A call's memory scope was not torn down exactly once.
    #[error("memory scope {scope} imbalance: {opened} opened, {closed} closed")]
    MemoryScopeImbalance { scope: u64, opened: u64, closed: u64 },

    /// The method table has no entry for the called name.
    #[error("call to undefined method {class}::{method}()")]
    UnknownMethod { class: String, method: String },

    /// The method body (or receiver resolution) failed.
    #[error("{class}::{method}(): {source}")]
    Body {
        class: String,
        method: String,
        #[source]
        source: NativeError,
    },
}

impl AdapterError {
    /// Attach call-site context to a fetcher failure.
    pub fn from_fetch(class: &str, method: &str, err: FetchError) -> Self {
        match err {
            FetchError::Arity {
                required,
                max,
                supplied,
            } => AdapterError::Arity {
                class: class.to_string(),
                method: method.to_string(),
                required,
                max,
                supplied,
            },
            FetchError::Coercion { position, source } => AdapterError::TypeCoercion {
                class: class.to_string(),
                method: method.to_string(),
                position,
                source,
            },
        }
    }

    /// Whether the runtime can report this failure and continue normally.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AdapterError::CapabilityContractViolation { .. }
                | AdapterError::MemoryScopeImbalance { .. }
        )
    }

    /// Zero-based argument position the failure is attributed to, if any.
    ///
    /// A short call names the first missing argument, an excess call the
    /// first extra one.
    pub fn position(&self) -> Option<usize> {
        match self {
            AdapterError::TypeCoercion { position, .. } => Some(*position),
            AdapterError::Arity { max, supplied, .. } => Some((*supplied).min(*max)),
            _ => None,
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while registering classes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A class with the same qualified name is already installed.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// A referenced class is not installed.
    #[error("class not found: {0}")]
    UnknownClass(String),

    /// The declared parent class is not installed.
    #[error("class '{class}' extends unknown class '{parent}'")]
    UnknownParent { class: String, parent: String },

    /// Two method table entries share a (case-insensitive) name.
    #[error("duplicate method: {class}::{method}")]
    DuplicateMethod { class: String, method: String },

    /// Two static properties share a name.
    #[error("duplicate static property: {class}::${property}")]
    DuplicateProperty { class: String, property: String },

    /// A capability id does not name a known capability.
    #[error("unknown capability id: {0}")]
    UnknownCapability(u8),

    /// Eager contract checking rejected a class.
    #[error("{class} declares {capability} but does not provide: {}", missing.join(", "))]
    ContractViolation {
        class: String,
        capability: &'static str,
        missing: Vec<&'static str>,
    },
}

// ============================================================================
// Property Errors
// ============================================================================

/// Errors from static property updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    /// The target class is not installed.
    #[error("cannot locate class '{0}'")]
    UnknownClass(String),

    /// `parent` was used from a class without a parent.
    #[error("cannot assign static property \"{property}\" on parent because class {class} does not extend any class")]
    NoParentClass { class: String, property: String },

    /// `self`/`parent` used outside any class scope.
    #[error("cannot use '{0}' outside of a class scope")]
    NoClassScope(&'static str),

    /// The class has no such property.
    #[error("class '{class}' does not have a property called: '{property}'")]
    UnknownProperty { class: String, property: String },

    /// The property exists but is not static.
    #[error("cannot access non-static property '{class}::{property}'")]
    NotStatic { class: String, property: String },

    /// A private property was accessed from another class.
    #[error("cannot access private static property '{class}::{property}' out of its declaring context")]
    PrivateAccess { class: String, property: String },

    /// A protected property was accessed from outside its class hierarchy.
    #[error("cannot access protected static property '{class}::{property}' out of its class hierarchy")]
    ProtectedAccess { class: String, property: String },
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// The unified error type for all adapter operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostbindError {
    /// A registration error.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A method adapter error.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A static property error.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

impl HostbindError {
    /// Check if this is a registration error.
    pub fn is_registration(&self) -> bool {
        matches!(self, HostbindError::Registration(_))
    }

    /// Check if this is an adapter error.
    pub fn is_adapter(&self) -> bool {
        matches!(self, HostbindError::Adapter(_))
    }

    /// Check if this is a property error.
    pub fn is_property(&self) -> bool {
        matches!(self, HostbindError::Property(_))
    }
}
