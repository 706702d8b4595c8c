//! Native method storage and callable trait.

use std::fmt;
use std::sync::Arc;

use hostbind_core::NativeError;

use crate::context::MethodContext;

/// Type-erased method body.
///
/// Wraps any callable that implements `NativeCallable`, so bodies generated
/// from different capability traits can be stored in one method table. The
/// callable is shared through an `Arc`.
pub struct NativeFn {
    inner: Arc<dyn NativeCallable + Send + Sync>,
}

impl NativeFn {
    /// Create a new NativeFn from a callable.
    pub fn new<F>(f: F) -> Self
    where
        F: NativeCallable + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Run the body with the given context.
    pub fn call(&self, ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
        self.inner.call(ctx)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

impl Clone for NativeFn {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Trait for callable method bodies.
///
/// The `call` method receives a `MethodContext` that provides the rebound
/// receiver, the fetched parameters and the return slot.
pub trait NativeCallable {
    fn call(&self, ctx: &mut MethodContext<'_>) -> Result<(), NativeError>;
}

impl<F> NativeCallable for F
where
    F: Fn(&mut MethodContext<'_>) -> Result<(), NativeError>,
{
    fn call(&self, ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
        (self)(ctx)
    }
}
