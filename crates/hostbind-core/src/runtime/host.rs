//! The narrow surface of the host runtime the adapter layer needs.

use rustc_hash::FxHashMap;

use crate::TypeHash;
use crate::options::AdapterOptions;

use super::{FailureKind, ObjectHeap, RecoverableFailure, ScopeLedger, Value};

/// Host runtime state borrowed by every adapter invocation.
///
/// Fields are public so that an invocation can hold the scope ledger and
/// the heap at the same time.
#[derive(Debug, Default)]
pub struct Runtime {
    /// Objects and arrays referenced by value boxes
    pub heap: ObjectHeap,
    /// Memory scope open/close counts
    pub ledger: ScopeLedger,
    pub options: AdapterOptions,
    failures: Vec<RecoverableFailure>,
    statics: FxHashMap<TypeHash, Value>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AdapterOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Push a failure onto the recoverable-failure channel.
    pub fn report(&mut self, failure: RecoverableFailure) {
        match failure.kind {
            FailureKind::Warning => tracing::warn!(
                class = %failure.class,
                method = %failure.method,
                position = ?failure.position,
                "{}",
                failure.message
            ),
            FailureKind::Exception => tracing::warn!(
                class = %failure.class,
                method = %failure.method,
                position = ?failure.position,
                exception = true,
                "{}",
                failure.message
            ),
        }
        self.failures.push(failure);
    }

    /// Failures reported so far, oldest first.
    pub fn failures(&self) -> &[RecoverableFailure] {
        &self.failures
    }

    /// Drain the recoverable-failure channel.
    pub fn take_failures(&mut self) -> Vec<RecoverableFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Current value of a static property slot.
    pub fn static_value(&self, property: TypeHash) -> Option<&Value> {
        self.statics.get(&property)
    }

    /// Store a static property value, taking over one heap reference.
    ///
    /// The previous value's heap reference, if any, is released.
    pub fn store_static(&mut self, property: TypeHash, value: Value) {
        if let Some(old) = self.statics.insert(property, value)
            && let Some(handle) = old.heap_handle()
        {
            self.heap.release(handle);
        }
    }
}
