//! Context handed to a method body.

use std::any::Any;

use hostbind_core::convert::{FromValue, IntoValue};
use hostbind_core::{
    HostArray, MemoryScope, NativeError, ObjectHeap, Params, Receiver, TypeHash, Value,
};

/// Everything a method body may touch during one invocation.
///
/// Built by the method adapter after the receiver has been rebound and the
/// parameters fetched, so a body never sees a raw receiver or an unchecked
/// argument list.
///
/// ## Typed Argument Access
///
/// ```ignore
/// let position: i64 = ctx.arg(0)?;
/// ```
///
/// ## Return Values
///
/// ```ignore
/// ctx.set_return(1i32);
/// ```
///
/// A body that sets nothing returns null.
pub struct MethodContext<'a> {
    receiver: Receiver<'a>,
    params: &'a Params<'a, 'a>,
    heap: &'a mut ObjectHeap,
    scope: &'a MemoryScope<'a>,
    return_value: Value,
}

impl<'a> MethodContext<'a> {
    pub fn new(
        receiver: Receiver<'a>,
        params: &'a Params<'a, 'a>,
        heap: &'a mut ObjectHeap,
        scope: &'a MemoryScope<'a>,
    ) -> Self {
        Self {
            receiver,
            params,
            heap,
            scope,
            return_value: Value::Null,
        }
    }

    pub fn receiver(&self) -> Receiver<'a> {
        self.receiver
    }

    /// The receiver's state as `T`.
    pub fn this<T: Any>(&self) -> Result<&T, NativeError> {
        self.receiver.bound()?.get::<T>(self.heap)
    }

    /// The receiver's state as `T`, mutably.
    pub fn this_mut<T: Any>(&mut self) -> Result<&mut T, NativeError> {
        self.receiver.bound()?.get_mut::<T>(self.heap)
    }

    pub fn params(&self) -> &'a Params<'a, 'a> {
        self.params
    }

    /// A typed argument.
    pub fn arg<T: FromValue>(&self, index: usize) -> Result<T, NativeError> {
        self.params.get(index)
    }

    /// An argument as a box; unsupplied optionals are `Undefined`.
    pub fn arg_value(&self, index: usize) -> Result<Value, NativeError> {
        self.params.value(index)
    }

    pub fn heap(&self) -> &ObjectHeap {
        self.heap
    }

    pub fn heap_mut(&mut self) -> &mut ObjectHeap {
        self.heap
    }

    pub fn scope(&self) -> &'a MemoryScope<'a> {
        self.scope
    }

    /// Allocate an array owned by the call's memory scope.
    pub fn alloc_array(&mut self, array: HostArray) -> Value {
        Value::Array(self.scope.alloc(self.heap, array))
    }

    /// Allocate an instance of `class` owned by the call's memory scope.
    pub fn alloc_object<T: Any + Send + Sync>(&mut self, class: TypeHash, value: T) -> Value {
        let handle = self.heap.allocate_instance(class, value);
        self.scope.track(handle);
        Value::Object(handle)
    }

    /// Take an extra reference to a boxed array or object so it can outlive
    /// the call.
    pub fn retain(&mut self, value: &Value) {
        if let Some(handle) = value.heap_handle() {
            self.heap.add_ref(handle);
        }
    }

    /// Drop a reference previously taken with [`retain`](Self::retain).
    pub fn release(&mut self, value: &Value) {
        if let Some(handle) = value.heap_handle() {
            self.heap.release(handle);
        }
    }

    /// Set a typed return value.
    pub fn set_return<T: IntoValue>(&mut self, value: T) {
        self.return_value = value.into_value();
    }

    pub fn set_return_value(&mut self, value: Value) {
        self.return_value = value;
    }

    /// Consume the context, yielding the return value.
    pub fn into_return(self) -> Value {
        self.return_value
    }
}
