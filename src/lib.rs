//! Native method adapters for a dynamic host runtime.
//!
//! `hostbind` lets a natively compiled class take part in a host runtime's
//! object model. A class registers a descriptor with a method table and
//! declares the runtime interfaces it implements (`Countable`, `Iterator`,
//! `ArrayAccess`, `Serializable`, ...). Calls from the runtime go through a
//! method adapter that rebinds the receiver, marshals declared-typed
//! parameters out of dynamic value boxes and keeps per-call memory scopes
//! balanced.
//!
//! The workspace is split into:
//!
//! - [`hostbind_core`] - value boxes, object heap, parameter fetcher, errors
//! - [`hostbind_registry`] - class descriptors, capabilities, the adapter
//! - [`hostbind_modules`] - the fixture classes
//!
//! [`Context`] ties a registry and a runtime together.

mod context;

pub use context::Context;

pub use hostbind_core::{
    AdapterError, AdapterOptions, CallFrame, CoercionMode, ConversionError, FailureKind,
    FetchError, FromValue, HeapRefs, HostArray, HostbindError, IntoValue, NativeError,
    ObjectHandle, ObjectHeap, ParamDecl, ParamType, PropertyError, RawReceiver,
    RecoverableFailure, RegistrationError, Runtime, TypeHash, Value,
};
pub use hostbind_registry::{
    Capability, ClassDescriptor, ClassRegistry, MethodContext, MethodFlags, MethodTable,
    PropertyDecl, RegistryOptions, Visibility,
};

pub mod prelude {
    pub use crate::Context;
    pub use hostbind_core::{
        AdapterError, CallFrame, HostbindError, NativeError, RawReceiver, Runtime, Value,
    };
    pub use hostbind_registry::contracts::*;
    pub use hostbind_registry::{
        Capability, ClassDescriptor, ClassRegistry, MethodContext, MethodFlags, MethodTable,
        PropertyDecl, Visibility,
    };
}
