//! Class registration and method dispatch for native host-runtime classes.
//!
//! A native class is described by a [`ClassDescriptor`]: its qualified name,
//! a [`MethodTable`], static properties and the capabilities it declares
//! (`Countable`, `Iterator`, `ArrayAccess`, ...). Descriptors are installed
//! into a [`ClassRegistry`] and called through a [`MethodAdapter`], which
//! rebinds the receiver, fetches parameters, runs the body inside a memory
//! scope and reports recoverable failures to the runtime.
//!
//! # Example
//!
//! ```
//! use hostbind_core::{CallFrame, Runtime, Value};
//! use hostbind_registry::{ClassDescriptor, ClassRegistry, MethodFlags, MethodTable, invoke};
//!
//! let methods = MethodTable::new().method("answer", vec![], MethodFlags::empty(), |ctx| {
//!     ctx.set_return(42i32);
//!     Ok(())
//! });
//! let mut registry = ClassRegistry::new();
//! let class = registry
//!     .install(ClassDescriptor::register("Demo", "Test", methods).unwrap())
//!     .unwrap();
//!
//! let mut rt = Runtime::new();
//! let result = invoke(&mut rt, &class, "answer", &CallFrame::new(&[])).unwrap();
//! assert_eq!(result, Value::Int(42));
//! ```

pub mod adapter;
pub mod capability;
pub mod class;
pub mod context;
pub mod contracts;
pub mod method;
pub mod native_fn;
pub mod registry;
pub mod statics;

pub use adapter::{MethodAdapter, invoke};
pub use capability::{Capability, CapabilitySet, RequiredMethod};
pub use class::{ClassDescriptor, ContractGap, PropertyDecl, Visibility};
pub use context::MethodContext;
pub use contracts::{
    ArrayAccess, Countable, HostIterator, IteratorAggregate, NativeObject, OuterIterator,
    RecursiveIterator, SeekableIterator, Serializable,
};
pub use method::{MethodEntry, MethodFlags, MethodTable};
pub use native_fn::{NativeCallable, NativeFn};
pub use registry::{ClassRegistry, RegistryOptions};
pub use statics::{StaticTarget, read_static_property, update_static_property};
