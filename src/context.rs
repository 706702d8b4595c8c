//! Host context: installed classes plus the runtime they are called against.

use std::any::Any;
use std::sync::Arc;

use hostbind_core::convert::IntoValue;
use hostbind_core::{
    AdapterOptions, CallFrame, HeapRefs, HostbindError, RawReceiver, RegistrationError, Runtime,
    Value,
};
use hostbind_registry::{ClassDescriptor, ClassRegistry, RegistryOptions};

/// The entry point for registering native classes and calling into them.
///
/// # Example
///
/// ```
/// use hostbind::{Context, Value};
///
/// let mut ctx = Context::with_default_modules().unwrap();
/// let value = ctx.call("Test\\Declare", "testDeclare6", None, &[]).unwrap();
/// assert_eq!(value, Value::Int(65));
/// ```
#[derive(Debug, Default)]
pub struct Context {
    registry: ClassRegistry,
    runtime: Runtime,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(adapter: AdapterOptions, registry: RegistryOptions) -> Self {
        Self {
            registry: ClassRegistry::with_options(registry),
            runtime: Runtime::with_options(adapter),
        }
    }

    /// Create a context with the fixture classes of `hostbind-modules`
    /// installed.
    ///
    /// # Errors
    ///
    /// Returns an error if a class fails to register.
    pub fn with_default_modules() -> Result<Self, HostbindError> {
        let mut ctx = Self::new();
        hostbind_modules::init(&mut ctx.registry)?;
        Ok(ctx)
    }

    pub fn install(
        &mut self,
        class: ClassDescriptor,
    ) -> Result<Arc<ClassDescriptor>, RegistrationError> {
        self.registry.install(class)
    }

    pub fn class(&self, name: &str) -> Result<Arc<ClassDescriptor>, RegistrationError> {
        self.registry
            .get(name)
            .ok_or_else(|| RegistrationError::UnknownClass(name.to_string()))
    }

    /// Allocate an instance of `class` with `state` and return its receiver.
    pub fn instantiate<T: Any + Send + Sync>(
        &mut self,
        class: &str,
        state: T,
    ) -> Result<RawReceiver, RegistrationError> {
        let class = self.class(class)?;
        let handle = self.runtime.heap.allocate_instance(class.type_hash(), state);
        Ok(RawReceiver::managed(handle))
    }

    /// Like [`instantiate`](Self::instantiate), for state that owns the
    /// heap references it reports; freeing the instance releases them.
    pub fn instantiate_owning<T: Any + Send + Sync + HeapRefs>(
        &mut self,
        class: &str,
        state: T,
    ) -> Result<RawReceiver, RegistrationError> {
        let class = self.class(class)?;
        let handle = self.runtime.heap.allocate_owning(class.type_hash(), state);
        Ok(RawReceiver::managed(handle))
    }

    /// Call `method` on `class`.
    ///
    /// The returned value carries one heap reference owned by the caller.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn call(
        &mut self,
        class: &str,
        method: &str,
        receiver: Option<RawReceiver>,
        args: &[Value],
    ) -> Result<Value, HostbindError> {
        let class = self.class(class)?;
        let frame = match receiver {
            Some(receiver) => CallFrame::with_receiver(receiver, args),
            None => CallFrame::new(args),
        };
        Ok(hostbind_registry::invoke(
            &mut self.runtime,
            &class,
            method,
            &frame,
        )?)
    }

    /// Assign a static property. See [`hostbind_registry::update_static_property`].
    pub fn update_static_property<V: IntoValue>(
        &mut self,
        target: &str,
        property: &str,
        value: V,
        scope: Option<&str>,
    ) -> Result<(), HostbindError> {
        hostbind_registry::update_static_property(
            &mut self.runtime,
            &self.registry,
            target,
            property,
            value,
            scope,
        )?;
        Ok(())
    }

    pub fn read_static_property(
        &self,
        target: &str,
        property: &str,
        scope: Option<&str>,
    ) -> Result<Value, HostbindError> {
        Ok(hostbind_registry::read_static_property(
            &self.runtime,
            &self.registry,
            target,
            property,
            scope,
        )?)
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }
}
