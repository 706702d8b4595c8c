//! Core types for native method adapters.
//!
//! This crate provides the pieces every adapter invocation is built from:
//!
//! - **runtime** - value boxes, the object heap, receivers, call frames,
//!   memory scopes and the host runtime surface
//! - **fetch** - the parameter fetcher and declared parameter types
//! - **convert** - conversions between native Rust types and value boxes
//! - **error** - the error hierarchy shared by all adapter crates
//! - **type_hash** / **qualified_name** - class and method identity

pub mod convert;
pub mod error;
pub mod fetch;
pub mod options;
pub mod qualified_name;
pub mod runtime;
pub mod type_hash;

pub use convert::{FromValue, IntoValue};
pub use error::{
    AdapterError, ConversionError, FetchError, HostbindError, NativeError, PropertyError,
    RegistrationError,
};
pub use fetch::{NativeArg, ParamDecl, ParamFetcher, ParamType, Params, Slot};
pub use options::{AdapterOptions, CoercionMode};
pub use qualified_name::QualifiedName;
pub use runtime::{
    ArrayKey, CallFrame, FailureKind, HeapRefs, HostArray, MemoryScope, ObjectHandle,
    ObjectHeap, RawReceiver, Receiver, ReceiverRef, RecoverableFailure, Runtime, ScopeLedger,
    Value,
};
pub use type_hash::TypeHash;

/// Logging setup shared by tests across the workspace.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use tracing_subscriber::{EnvFilter, fmt};

    /// Initialize tracing output for tests.
    ///
    /// Honors `RUST_LOG`, defaulting to `debug`. Safe to call from every test.
    ///
    /// # Example
    /// ```ignore
    /// #[test]
    /// fn seek_coerces_position() {
    ///     test_utils::init_test_logging();
    ///     // ...
    /// }
    /// ```
    pub fn init_test_logging() {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
