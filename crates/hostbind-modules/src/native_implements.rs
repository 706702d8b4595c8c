//! `Test\Oo\OoNativeImplements`: a class declaring every host capability.
//!
//! The bodies are placeholders. The class exists so that each capability's
//! method set, arity and flags go through registration and dispatch.

use std::sync::Arc;

use hostbind_core::{NativeError, ObjectHeap, RawReceiver, RegistrationError, Value};
use hostbind_registry::{
    ArrayAccess, Capability, ClassDescriptor, ClassRegistry, Countable, HostIterator,
    IteratorAggregate, MethodTable, OuterIterator, RecursiveIterator, SeekableIterator,
    Serializable,
};

pub const NAMESPACE: &str = "Test\\Oo";
pub const CLASS_NAME: &str = "OoNativeImplements";

/// Instance state. Empty: the placeholder bodies keep nothing.
#[derive(Debug, Default)]
pub struct OoNativeImplements;

impl OoNativeImplements {
    /// Allocate an instance of the registered class and return its receiver.
    pub fn instantiate(heap: &mut ObjectHeap, class: &ClassDescriptor) -> RawReceiver {
        RawReceiver::managed(heap.allocate_instance(class.type_hash(), OoNativeImplements))
    }
}

// =============================================================================
// CAPABILITIES
// =============================================================================

impl Countable for OoNativeImplements {
    fn count(&self) -> i64 {
        0
    }
}

impl HostIterator for OoNativeImplements {
    fn current(&self) -> Value {
        Value::Null
    }

    fn key(&self) -> Value {
        Value::Null
    }

    fn next(&mut self) {}

    fn rewind(&mut self) {}

    fn valid(&self) -> bool {
        false
    }
}

impl OuterIterator for OoNativeImplements {
    fn get_inner_iterator(&self) -> Value {
        Value::Null
    }
}

impl RecursiveIterator for OoNativeImplements {
    fn get_children(&self) -> Value {
        Value::Null
    }

    fn has_children(&self) -> bool {
        false
    }
}

impl SeekableIterator for OoNativeImplements {
    fn seek(&mut self, position: i64) -> Result<(), NativeError> {
        tracing::trace!(position, "seek");
        Ok(())
    }
}

impl IteratorAggregate for OoNativeImplements {
    fn get_iterator(&self) -> Value {
        Value::Null
    }
}

impl ArrayAccess for OoNativeImplements {
    fn offset_exists(&self, _offset: &Value) -> Result<bool, NativeError> {
        Ok(false)
    }

    fn offset_get(&self, _offset: &Value) -> Result<Value, NativeError> {
        Ok(Value::Null)
    }

    // Nothing is stored, so the value goes straight back to the adapter.
    fn offset_set(&mut self, _offset: &Value, value: Value) -> Result<Option<Value>, NativeError> {
        Ok(Some(value))
    }

    fn offset_unset(&mut self, _offset: &Value) -> Result<Option<Value>, NativeError> {
        Ok(None)
    }
}

impl Serializable for OoNativeImplements {
    fn serialize(&self) -> Option<String> {
        None
    }

    fn unserialize(&mut self, _serialized: &str) -> Result<(), NativeError> {
        Ok(())
    }
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// The method table, in declaration order.
pub fn methods() -> MethodTable {
    MethodTable::new()
        .with_countable::<OoNativeImplements>()
        .with_iterator::<OoNativeImplements>()
        .with_outer_iterator::<OoNativeImplements>()
        .with_recursive_iterator::<OoNativeImplements>()
        .with_seekable_iterator::<OoNativeImplements>()
        .with_aggregate::<OoNativeImplements>()
        .with_array_access::<OoNativeImplements>()
        .with_serializable::<OoNativeImplements>()
}

/// Build the class descriptor with every capability declared.
pub fn descriptor() -> Result<ClassDescriptor, RegistrationError> {
    let mut class = ClassDescriptor::register(CLASS_NAME, NAMESPACE, methods())?;
    for capability in Capability::ALL {
        class.declare_capability(capability.id())?;
    }
    Ok(class)
}

pub fn init(registry: &mut ClassRegistry) -> Result<Arc<ClassDescriptor>, RegistrationError> {
    registry.install(descriptor()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostbind_core::{AdapterError, CallFrame, Runtime};
    use hostbind_registry::{MethodAdapter, RegistryOptions, invoke};

    fn setup() -> (Runtime, Arc<ClassDescriptor>, RawReceiver) {
        let mut registry = ClassRegistry::with_options(RegistryOptions {
            eager_contract_check: true,
        });
        let class = init(&mut registry).unwrap();
        let mut rt = Runtime::new();
        let this = OoNativeImplements::instantiate(&mut rt.heap, &class);
        (rt, class, this)
    }

    #[test]
    fn declares_every_capability() {
        let (_, class, _) = setup();
        assert_eq!(class.capability_list(), Capability::ALL.to_vec());
        assert!(class.contract_gaps().is_empty());
        assert_eq!(class.methods().len(), 17);
    }

    #[test]
    fn every_method_binds() {
        let (_, class, _) = setup();
        for entry in class.methods() {
            assert!(MethodAdapter::bind(&class, &entry.name).is_ok(), "{}", entry.name);
        }
    }

    #[test]
    fn placeholder_bodies() {
        let (mut rt, class, this) = setup();
        let call = |rt: &mut Runtime, method: &str, args: &[Value]| {
            invoke(rt, &class, method, &CallFrame::with_receiver(this.clone(), args))
        };

        assert_eq!(call(&mut rt, "count", &[]), Ok(Value::Int(0)));
        assert_eq!(call(&mut rt, "valid", &[]), Ok(Value::Bool(false)));
        assert_eq!(call(&mut rt, "current", &[]), Ok(Value::Null));
        assert_eq!(call(&mut rt, "seek", &[Value::Int(3)]), Ok(Value::Null));
        assert_eq!(call(&mut rt, "serialize", &[]), Ok(Value::Null));
        assert_eq!(
            call(&mut rt, "offsetExists", &[Value::from_string("k")]),
            Ok(Value::Bool(false))
        );
        assert!(rt.failures().is_empty());
        assert!(rt.ledger.is_balanced());
    }

    #[test]
    fn offset_set_does_not_retain_its_value() {
        let (mut rt, class, this) = setup();
        let array = rt.heap.allocate(hostbind_core::HostArray::new());
        let args = [Value::Int(0), Value::Array(array)];
        invoke(
            &mut rt,
            &class,
            "offsetSet",
            &CallFrame::with_receiver(this, &args),
        )
        .unwrap();
        assert_eq!(rt.heap.ref_count(array), Some(1));
    }

    #[test]
    fn seek_requires_its_position() {
        let (mut rt, class, this) = setup();
        let err = invoke(&mut rt, &class, "seek", &CallFrame::with_receiver(this, &[]));
        assert!(matches!(err, Err(AdapterError::Arity { .. })));
        assert_eq!(rt.failures().len(), 1);
    }
}
