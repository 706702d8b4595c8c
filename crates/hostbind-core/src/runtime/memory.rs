//! Call-lifetime memory scopes.
//!
//! Every adapter invocation opens exactly one [`MemoryScope`] on entry and
//! closes it exactly once on exit, whichever path the call takes. The scope
//! owns a bump arena for call-scoped parameter slots and remembers every heap
//! handle acquired during the call; closing releases them all except the one
//! handed off as the return value.
//!
//! The [`ScopeLedger`] counts opens and closes so that an imbalance can be
//! detected and reported instead of silently leaking.

use std::cell::{Cell, RefCell};

use bumpalo::Bump;

use crate::error::AdapterError;

use super::{ObjectHandle, ObjectHeap, Value};

/// Running open/close counts for memory scopes.
#[derive(Debug, Default)]
pub struct ScopeLedger {
    opened: Cell<u64>,
    closed: Cell<u64>,
    leaked: Cell<u64>,
    next_id: Cell<u64>,
}

impl ScopeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total scopes opened.
    pub fn opened(&self) -> u64 {
        self.opened.get()
    }

    /// Total scopes closed.
    pub fn closed(&self) -> u64 {
        self.closed.get()
    }

    /// Scopes dropped without being closed.
    pub fn leaked(&self) -> u64 {
        self.leaked.get()
    }

    pub fn is_balanced(&self) -> bool {
        self.opened.get() == self.closed.get()
    }

    /// Fail with `MemoryScopeImbalance` unless every opened scope was closed.
    ///
    /// `scope` identifies the call the check is attributed to.
    pub fn check(&self, scope: u64) -> Result<(), AdapterError> {
        if self.is_balanced() {
            Ok(())
        } else {
            Err(AdapterError::MemoryScopeImbalance {
                scope,
                opened: self.opened.get(),
                closed: self.closed.get(),
            })
        }
    }

    /// Current (opened, closed) counts.
    pub fn snapshot(&self) -> (u64, u64) {
        (self.opened.get(), self.closed.get())
    }

    /// Fail with `MemoryScopeImbalance` unless the scopes opened since
    /// `before` were all closed.
    pub fn check_since(&self, scope: u64, before: (u64, u64)) -> Result<(), AdapterError> {
        let opened = self.opened.get() - before.0;
        let closed = self.closed.get() - before.1;
        if opened == closed {
            Ok(())
        } else {
            Err(AdapterError::MemoryScopeImbalance {
                scope,
                opened,
                closed,
            })
        }
    }

    fn open(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.opened.set(self.opened.get() + 1);
        id
    }
}

/// Memory region bounding the lifetime of values created during one call.
pub struct MemoryScope<'l> {
    id: u64,
    ledger: &'l ScopeLedger,
    arena: Bump,
    grows: bool,
    tracked: RefCell<Vec<ObjectHandle>>,
    closed: bool,
}

impl<'l> MemoryScope<'l> {
    /// Open a scope.
    ///
    /// Memory-growing scopes preallocate `arena_capacity` bytes; other
    /// scopes allocate lazily.
    pub fn open(ledger: &'l ScopeLedger, grows: bool, arena_capacity: usize) -> Self {
        let id = ledger.open();
        let arena = if grows {
            Bump::with_capacity(arena_capacity)
        } else {
            Bump::new()
        };
        tracing::trace!(scope = id, grows, "memory scope opened");
        Self {
            id,
            ledger,
            arena,
            grows,
            tracked: RefCell::new(Vec::new()),
            closed: false,
        }
    }

    /// Open a child scope on the same ledger.
    ///
    /// The child must be closed before the parent call returns.
    pub fn nested(&self, grows: bool, arena_capacity: usize) -> MemoryScope<'l> {
        MemoryScope::open(self.ledger, grows, arena_capacity)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn grows(&self) -> bool {
        self.grows
    }

    /// Arena for call-scoped allocations.
    pub fn arena(&self) -> &Bump {
        &self.arena
    }

    /// Allocate a heap object owned by this scope.
    pub fn alloc<T: std::any::Any + Send + Sync>(
        &self,
        heap: &mut ObjectHeap,
        value: T,
    ) -> ObjectHandle {
        let handle = heap.allocate(value);
        self.track(handle);
        handle
    }

    /// Take responsibility for releasing one reference to `handle`.
    pub fn track(&self, handle: ObjectHandle) {
        self.tracked.borrow_mut().push(handle);
    }

    /// Number of handles the scope will release on close.
    pub fn tracked_count(&self) -> usize {
        self.tracked.borrow().len()
    }

    /// Transfer ownership of the value's heap reference to the caller.
    ///
    /// Returns true if the value referred to a tracked handle.
    pub fn hand_off(&self, value: &Value) -> bool {
        let Some(handle) = value.heap_handle() else {
            return false;
        };
        let mut tracked = self.tracked.borrow_mut();
        match tracked.iter().rposition(|h| *h == handle) {
            Some(i) => {
                tracked.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Close the scope, releasing every tracked handle.
    ///
    /// Returns the number of references released.
    pub fn close(mut self, heap: &mut ObjectHeap) -> usize {
        let tracked = std::mem::take(self.tracked.get_mut());
        let released = tracked.len();
        for handle in tracked {
            heap.release(handle);
        }
        self.closed = true;
        self.ledger.closed.set(self.ledger.closed.get() + 1);
        tracing::trace!(
            scope = self.id,
            released,
            arena_bytes = self.arena.allocated_bytes(),
            "memory scope closed"
        );
        released
    }
}

impl Drop for MemoryScope<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.ledger.leaked.set(self.ledger.leaked.get() + 1);
            tracing::error!(
                scope = self.id,
                tracked = self.tracked.get_mut().len(),
                "memory scope dropped without being closed"
            );
        }
    }
}

impl std::fmt::Debug for MemoryScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryScope")
            .field("id", &self.id)
            .field("grows", &self.grows)
            .field("tracked", &self.tracked.borrow().len())
            .finish_non_exhaustive()
    }
}
