//! The method adapter.
//!
//! Every call into a native class runs through [`MethodAdapter::invoke`],
//! which drives one invocation through its phases:
//!
//! ```text
//! ENTER -> REBIND_RECEIVER -> FETCH_PARAMS -> RUN_BODY -> RETURN | FAIL -> EXIT
//! ```
//!
//! `ENTER` opens the call's memory scope and `EXIT` closes it, exactly once,
//! whichever way the call ends. The body only runs once the receiver has
//! been rebound and every parameter fetched and coerced.

use hostbind_core::{
    AdapterError, CallFrame, CoercionMode, FailureKind, MemoryScope, NativeError, ObjectHeap,
    ParamFetcher, Receiver, RecoverableFailure, Runtime, Value,
};

use crate::class::ClassDescriptor;
use crate::context::MethodContext;
use crate::method::MethodEntry;

/// A method of a class, resolved and ready to invoke.
#[derive(Debug, Clone, Copy)]
pub struct MethodAdapter<'c> {
    class: &'c ClassDescriptor,
    entry: &'c MethodEntry,
}

impl<'c> MethodAdapter<'c> {
    /// Resolve `method` on `class`.
    ///
    /// Fails with `CapabilityContractViolation` when a capability the method
    /// belongs to is not fully provided, whether or not the table has an
    /// entry for it. Otherwise fails with `UnknownMethod` when the table has
    /// no such entry.
    pub fn bind(class: &'c ClassDescriptor, method: &str) -> Result<Self, AdapterError> {
        if let Some(gap) = class.gap_for(method) {
            tracing::error!(
                class = %class.name(),
                method,
                capability = gap.capability.host_name(),
                missing = ?gap.missing,
                "capability contract violated"
            );
            return Err(AdapterError::CapabilityContractViolation {
                class: class.qualified_name(),
                capability: gap.capability.host_name(),
                missing: gap.missing.clone(),
            });
        }

        let entry = class
            .find_method(method)
            .ok_or_else(|| AdapterError::UnknownMethod {
                class: class.qualified_name(),
                method: method.to_string(),
            })?;

        Ok(Self { class, entry })
    }

    pub fn class(&self) -> &'c ClassDescriptor {
        self.class
    }

    pub fn entry(&self) -> &'c MethodEntry {
        self.entry
    }

    /// Run one invocation.
    ///
    /// The returned value carries one heap reference owned by the caller.
    /// Recoverable failures are also pushed to the runtime's failure channel.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn invoke(&self, rt: &mut Runtime, frame: &CallFrame<'_>) -> Result<Value, AdapterError> {
        let before = rt.ledger.snapshot();

        // ENTER
        let scope = MemoryScope::open(
            &rt.ledger,
            self.entry.is_memory_growing(),
            rt.options.arena_capacity,
        );
        let scope_id = scope.id();
        tracing::trace!(
            class = %self.class.name(),
            method = %self.entry.name,
            scope = scope_id,
            supplied = frame.supplied(),
            "enter"
        );

        let outcome = self.run(&scope, &mut rt.heap, rt.options.coercion, frame);

        // RETURN: only the return value crosses the boundary
        if let Ok(value) = &outcome
            && let Some(handle) = value.heap_handle()
            && !scope.hand_off(value)
        {
            rt.heap.add_ref(handle);
        }

        // EXIT
        scope.close(&mut rt.heap);

        if let Err(imbalance) = rt.ledger.check_since(scope_id, before) {
            tracing::error!(
                class = %self.class.name(),
                method = %self.entry.name,
                error = %imbalance,
                "memory scope imbalance"
            );
            if let Ok(value) = &outcome
                && let Some(handle) = value.heap_handle()
            {
                rt.heap.release(handle);
            }
            return Err(imbalance);
        }

        match outcome {
            Ok(value) => {
                tracing::trace!(
                    class = %self.class.name(),
                    method = %self.entry.name,
                    returns = value.type_name(),
                    "return"
                );
                Ok(value)
            }
            Err(err) => {
                self.fail(rt, &err);
                Err(err)
            }
        }
    }

    fn run(
        &self,
        scope: &MemoryScope<'_>,
        heap: &mut ObjectHeap,
        coercion: CoercionMode,
        frame: &CallFrame<'_>,
    ) -> Result<Value, AdapterError> {
        // REBIND_RECEIVER
        let receiver = Receiver::rebind(frame.receiver()).map_err(|e| self.body_error(e))?;
        if self.entry.is_instance() && !receiver.is_bound() {
            return Err(self.body_error(NativeError::MissingReceiver));
        }

        // FETCH_PARAMS
        let fetcher = ParamFetcher::new(scope.arena(), coercion);
        let params = fetcher
            .fetch_typed(frame, self.entry.is_exception_capable(), &self.entry.params)
            .map_err(|e| {
                AdapterError::from_fetch(&self.class.qualified_name(), &self.entry.name, e)
            })?;
        tracing::trace!(
            class = %self.class.name(),
            method = %self.entry.name,
            params = params.len(),
            "parameters fetched"
        );

        // RUN_BODY
        let mut ctx = MethodContext::new(receiver, &params, heap, scope);
        self.entry.call(&mut ctx).map_err(|e| self.body_error(e))?;
        Ok(ctx.into_return())
    }

    fn body_error(&self, source: NativeError) -> AdapterError {
        AdapterError::Body {
            class: self.class.qualified_name(),
            method: self.entry.name.clone(),
            source,
        }
    }

    /// FAIL: report a recoverable failure to the runtime.
    fn fail(&self, rt: &mut Runtime, err: &AdapterError) {
        let kind = match err {
            AdapterError::Arity { .. } | AdapterError::TypeCoercion { .. } => {
                FailureKind::for_fetch(self.entry.is_exception_capable())
            }
            _ => FailureKind::Exception,
        };
        rt.report(RecoverableFailure {
            kind,
            class: self.class.qualified_name(),
            method: self.entry.name.clone(),
            position: err.position(),
            message: err.to_string(),
        });
    }
}

/// Resolve and invoke `method` on `class`.
///
/// Resolution failures are reported like any other: an unknown method goes
/// to the failure channel, a contract violation does not.
pub fn invoke(
    rt: &mut Runtime,
    class: &ClassDescriptor,
    method: &str,
    frame: &CallFrame<'_>,
) -> Result<Value, AdapterError> {
    match MethodAdapter::bind(class, method) {
        Ok(adapter) => adapter.invoke(rt, frame),
        Err(err) => {
            if err.is_recoverable() {
                rt.report(RecoverableFailure {
                    kind: FailureKind::Exception,
                    class: class.qualified_name(),
                    method: method.to_string(),
                    position: None,
                    message: err.to_string(),
                });
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::method::{MethodFlags, MethodTable};
    use hostbind_core::{HostArray, ParamDecl, ParamType, RawReceiver};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Widget;

    fn class_with(table: MethodTable) -> ClassDescriptor {
        ClassDescriptor::register("Widget", "Test", table).unwrap()
    }

    fn instance(rt: &mut Runtime, class: &ClassDescriptor) -> RawReceiver {
        RawReceiver::managed(rt.heap.allocate_instance(class.type_hash(), Widget))
    }

    #[test]
    fn body_runs_after_fetch_and_returns() {
        let table = MethodTable::new().method(
            "double",
            vec![ParamDecl::required("n", ParamType::Long)],
            MethodFlags::INSTANCE,
            |ctx: &mut MethodContext<'_>| {
                ctx.this::<Widget>()?;
                let n: i64 = ctx.arg(0)?;
                ctx.set_return(n * 2);
                Ok(())
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);

        let args = [Value::from_string("21")];
        let value = invoke(&mut rt, &class, "DOUBLE", &CallFrame::with_receiver(this, &args)).unwrap();
        assert_eq!(value, Value::Int(42));
        assert!(rt.ledger.is_balanced());
        assert!(rt.failures().is_empty());
    }

    #[test]
    fn arity_failure_skips_the_body() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let table = MethodTable::new().method(
            "seek",
            vec![ParamDecl::required("position", ParamType::Long)],
            MethodFlags::INSTANCE,
            move |_: &mut MethodContext<'_>| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);

        let err = invoke(&mut rt, &class, "seek", &CallFrame::with_receiver(this.clone(), &[]))
            .unwrap_err();
        assert!(matches!(err, AdapterError::Arity { supplied: 0, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(rt.failures()[0].kind, FailureKind::Warning);
        assert_eq!(rt.failures()[0].position, Some(0));
        assert_eq!(rt.ledger.opened(), rt.ledger.closed());

        let args = [Value::Int(1), Value::Int(2)];
        invoke(&mut rt, &class, "seek", &CallFrame::with_receiver(this, &args)).unwrap_err();
        assert_eq!(rt.failures()[1].position, Some(1));
    }

    #[test]
    fn exception_capable_coercion_failure() {
        let table = MethodTable::new().method(
            "unserialize",
            vec![ParamDecl::required("serialized", ParamType::String)],
            MethodFlags::INSTANCE | MethodFlags::MEMORY_GROWING | MethodFlags::EXCEPTION_CAPABLE,
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);
        let array = rt.heap.allocate(HostArray::new());

        let args = [Value::Array(array)];
        let err = invoke(&mut rt, &class, "unserialize", &CallFrame::with_receiver(this, &args))
            .unwrap_err();
        assert_eq!(err.position(), Some(0));
        let failure = &rt.failures()[0];
        assert_eq!(failure.kind, FailureKind::Exception);
        assert_eq!(failure.position, Some(0));
        assert!(rt.ledger.is_balanced());
    }

    #[test]
    fn instance_method_without_receiver() {
        let table = MethodTable::new().method(
            "count",
            vec![],
            MethodFlags::INSTANCE,
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let err = invoke(&mut rt, &class, "count", &CallFrame::new(&[])).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Body {
                source: NativeError::MissingReceiver,
                ..
            }
        ));
    }

    #[test]
    fn unknown_method_is_recoverable() {
        let class = class_with(MethodTable::new());
        let mut rt = Runtime::new();
        let err = invoke(&mut rt, &class, "missing", &CallFrame::new(&[])).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownMethod { .. }));
        assert_eq!(rt.failures().len(), 1);
        assert_eq!(rt.ledger.opened(), 0);
    }

    #[test]
    fn contract_violation_is_not_reported_as_recoverable() {
        let table = MethodTable::new().method(
            "current",
            vec![],
            MethodFlags::INSTANCE,
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let class = class_with(table).with_capability(Capability::Iterator);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);

        let err = invoke(&mut rt, &class, "current", &CallFrame::with_receiver(this, &[])).unwrap_err();
        assert!(matches!(err, AdapterError::CapabilityContractViolation { .. }));
        assert!(!err.is_recoverable());
        assert!(rt.failures().is_empty());
    }

    #[test]
    fn missing_required_method_is_a_contract_violation() {
        let table = MethodTable::new().method(
            "current",
            vec![],
            MethodFlags::INSTANCE,
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let class = class_with(table).with_capability(Capability::SeekableIterator);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);

        let err = invoke(&mut rt, &class, "Valid", &CallFrame::with_receiver(this, &[])).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::CapabilityContractViolation {
                capability: "Iterator",
                ..
            }
        ));
        assert!(rt.failures().is_empty());

        // names no declared capability requires are still unknown
        let err = invoke(&mut rt, &class, "offsetGet", &CallFrame::new(&[])).unwrap_err();
        assert!(matches!(err, AdapterError::UnknownMethod { .. }));
        assert_eq!(rt.failures().len(), 1);
    }

    #[test]
    fn scope_allocations_are_released_except_the_return_value() {
        let table = MethodTable::new().method(
            "make",
            vec![],
            MethodFlags::MEMORY_GROWING,
            |ctx: &mut MethodContext<'_>| {
                ctx.alloc_array(HostArray::new());
                let kept = ctx.alloc_array(HostArray::new());
                ctx.set_return_value(kept);
                Ok(())
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();

        let value = invoke(&mut rt, &class, "make", &CallFrame::new(&[])).unwrap();
        let handle = value.heap_handle().unwrap();
        assert_eq!(rt.heap.live_count(), 1);
        assert_eq!(rt.heap.ref_count(handle), Some(1));
    }

    #[test]
    fn failed_body_releases_scope_allocations() {
        let table = MethodTable::new().method(
            "fail",
            vec![],
            MethodFlags::empty(),
            |ctx: &mut MethodContext<'_>| {
                ctx.alloc_array(HostArray::new());
                Err(NativeError::other("boom"))
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();

        let err = invoke(&mut rt, &class, "fail", &CallFrame::new(&[])).unwrap_err();
        assert!(matches!(err, AdapterError::Body { .. }));
        assert_eq!(rt.heap.live_count(), 0);
        assert!(rt.ledger.is_balanced());
    }

    #[test]
    fn returning_an_existing_object_adds_a_reference() {
        let table = MethodTable::new().method(
            "self",
            vec![],
            MethodFlags::INSTANCE,
            |ctx: &mut MethodContext<'_>| {
                let handle = ctx.receiver().bound()?.handle();
                ctx.set_return_value(Value::Object(handle));
                Ok(())
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let this = instance(&mut rt, &class);
        let RawReceiver::Managed(Value::Object(handle)) = this.clone() else {
            unreachable!()
        };

        invoke(&mut rt, &class, "self", &CallFrame::with_receiver(this, &[])).unwrap();
        assert_eq!(rt.heap.ref_count(handle), Some(2));
    }

    #[test]
    fn unclosed_nested_scope_is_an_imbalance() {
        let table = MethodTable::new().method(
            "leak",
            vec![],
            MethodFlags::empty(),
            |ctx: &mut MethodContext<'_>| {
                let nested = ctx.scope().nested(false, 0);
                drop(nested);
                ctx.set_return(1i64);
                Ok(())
            },
        );
        let class = class_with(table);
        let mut rt = Runtime::new();

        let err = invoke(&mut rt, &class, "leak", &CallFrame::new(&[])).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::MemoryScopeImbalance {
                opened: 2,
                closed: 1,
                ..
            }
        ));
        assert!(!err.is_recoverable());

        // the runtime is still usable afterwards
        let ok = MethodTable::new().method(
            "ok",
            vec![],
            MethodFlags::empty(),
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let ok_class = ClassDescriptor::register("Ok", "Test", ok).unwrap();
        assert_eq!(invoke(&mut rt, &ok_class, "ok", &CallFrame::new(&[])), Ok(Value::Null));
    }

    #[test]
    fn non_object_managed_receiver_is_rejected() {
        let table = MethodTable::new().method(
            "count",
            vec![],
            MethodFlags::INSTANCE,
            |_: &mut MethodContext<'_>| Ok(()),
        );
        let class = class_with(table);
        let mut rt = Runtime::new();
        let raw = RawReceiver::Managed(Value::Int(3));
        let err = invoke(&mut rt, &class, "count", &CallFrame::with_receiver(raw, &[])).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::Body {
                source: NativeError::InvalidThis { .. },
                ..
            }
        ));
    }
}
