//! Capability traits and the method-table generators built on them.
//!
//! A native class implements one trait per capability it supports. The
//! `MethodTable::with_*` generators turn those impls into adapter entries,
//! so that dispatch from an entry to the body is a static trait call:
//!
//! ```ignore
//! let table = MethodTable::new()
//!     .with_countable::<Bag>()
//!     .with_iterator::<Bag>();
//! ```
//!
//! Trait methods receive the instance state, never the raw receiver.

use std::any::Any;

use hostbind_core::{NativeError, ParamDecl, ParamType, Value};

use crate::context::MethodContext;
use crate::method::{MethodFlags, MethodTable};

/// State of a native instance living on the object heap.
pub trait NativeObject: Any + Send + Sync {}

impl<T: Any + Send + Sync> NativeObject for T {}

pub trait Countable: NativeObject {
    fn count(&self) -> i64;
}

/// The host runtime's `Iterator` interface.
pub trait HostIterator: NativeObject {
    fn current(&self) -> Value;
    fn key(&self) -> Value;
    fn next(&mut self);
    fn rewind(&mut self);
    fn valid(&self) -> bool;
}

pub trait OuterIterator: HostIterator {
    fn get_inner_iterator(&self) -> Value;
}

pub trait RecursiveIterator: HostIterator {
    fn get_children(&self) -> Value;
    fn has_children(&self) -> bool;
}

pub trait SeekableIterator: HostIterator {
    /// Move to `position`; out-of-range positions are an error.
    fn seek(&mut self, position: i64) -> Result<(), NativeError>;
}

pub trait IteratorAggregate: NativeObject {
    fn get_iterator(&self) -> Value;
}

/// Offset access on an instance.
///
/// Values passed in carry one heap reference owned by the instance. Any
/// value the instance does not keep, or that it displaces, is handed back
/// so the adapter can release it. State allocated with
/// [`ObjectHeap::allocate_owning`](hostbind_core::ObjectHeap::allocate_owning)
/// releases what it still holds when the instance is freed.
pub trait ArrayAccess: NativeObject {
    fn offset_exists(&self, offset: &Value) -> Result<bool, NativeError>;
    fn offset_get(&self, offset: &Value) -> Result<Value, NativeError>;
    fn offset_set(&mut self, offset: &Value, value: Value) -> Result<Option<Value>, NativeError>;
    fn offset_unset(&mut self, offset: &Value) -> Result<Option<Value>, NativeError>;
}

pub trait Serializable: NativeObject {
    /// Serialized form; `None` maps to null.
    fn serialize(&self) -> Option<String>;
    fn unserialize(&mut self, serialized: &str) -> Result<(), NativeError>;
}

// ============================================================================
// Adapter bodies
// ============================================================================

fn count<T: Countable>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let count = ctx.this::<T>()?.count();
    ctx.set_return(count);
    Ok(())
}

fn current<T: HostIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let value = ctx.this::<T>()?.current();
    ctx.set_return_value(value);
    Ok(())
}

fn key<T: HostIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let value = ctx.this::<T>()?.key();
    ctx.set_return_value(value);
    Ok(())
}

fn next<T: HostIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    ctx.this_mut::<T>()?.next();
    Ok(())
}

fn rewind<T: HostIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    ctx.this_mut::<T>()?.rewind();
    Ok(())
}

fn valid<T: HostIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let valid = ctx.this::<T>()?.valid();
    ctx.set_return(valid);
    Ok(())
}

fn get_inner_iterator<T: OuterIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let value = ctx.this::<T>()?.get_inner_iterator();
    ctx.set_return_value(value);
    Ok(())
}

fn get_children<T: RecursiveIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let value = ctx.this::<T>()?.get_children();
    ctx.set_return_value(value);
    Ok(())
}

fn has_children<T: RecursiveIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let has = ctx.this::<T>()?.has_children();
    ctx.set_return(has);
    Ok(())
}

fn seek<T: SeekableIterator>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let position: i64 = ctx.arg(0)?;
    ctx.this_mut::<T>()?.seek(position)
}

fn get_iterator<T: IteratorAggregate>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let value = ctx.this::<T>()?.get_iterator();
    ctx.set_return_value(value);
    Ok(())
}

fn offset_exists<T: ArrayAccess>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let offset = ctx.arg_value(0)?;
    let exists = ctx.this::<T>()?.offset_exists(&offset)?;
    ctx.set_return(exists);
    Ok(())
}

fn offset_get<T: ArrayAccess>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let offset = ctx.arg_value(0)?;
    let value = ctx.this::<T>()?.offset_get(&offset)?;
    ctx.set_return_value(value);
    Ok(())
}

fn offset_set<T: ArrayAccess>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let offset = ctx.arg_value(0)?;
    let value = ctx.arg_value(1)?;
    ctx.retain(&value);
    let stored = ctx
        .this_mut::<T>()
        .and_then(|this| this.offset_set(&offset, value.clone()));
    match stored {
        Ok(returned) => {
            if let Some(returned) = returned {
                ctx.release(&returned);
            }
            Ok(())
        }
        Err(err) => {
            ctx.release(&value);
            Err(err)
        }
    }
}

fn offset_unset<T: ArrayAccess>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let offset = ctx.arg_value(0)?;
    let removed = ctx.this_mut::<T>()?.offset_unset(&offset)?;
    if let Some(removed) = removed {
        ctx.release(&removed);
    }
    Ok(())
}

fn serialize<T: Serializable>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let serialized = ctx.this::<T>()?.serialize();
    ctx.set_return(serialized);
    Ok(())
}

fn unserialize<T: Serializable>(ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
    let serialized: String = ctx.arg(0)?;
    ctx.this_mut::<T>()?.unserialize(&serialized)
}

// ============================================================================
// Table generators
// ============================================================================

const INSTANCE: MethodFlags = MethodFlags::INSTANCE;

fn offset() -> ParamDecl {
    ParamDecl::required("offset", ParamType::Mixed)
}

impl MethodTable {
    pub fn with_countable<T: Countable>(self) -> Self {
        self.method("count", vec![], INSTANCE, count::<T>)
    }

    pub fn with_iterator<T: HostIterator>(self) -> Self {
        self.method("current", vec![], INSTANCE, current::<T>)
            .method("key", vec![], INSTANCE, key::<T>)
            .method("next", vec![], INSTANCE, next::<T>)
            .method("rewind", vec![], INSTANCE, rewind::<T>)
            .method("valid", vec![], INSTANCE, valid::<T>)
    }

    /// Only the `OuterIterator` methods; pair with `with_iterator`.
    pub fn with_outer_iterator<T: OuterIterator>(self) -> Self {
        self.method("getInnerIterator", vec![], INSTANCE, get_inner_iterator::<T>)
    }

    /// Only the `RecursiveIterator` methods; pair with `with_iterator`.
    pub fn with_recursive_iterator<T: RecursiveIterator>(self) -> Self {
        self.method("getChildren", vec![], INSTANCE, get_children::<T>)
            .method("hasChildren", vec![], INSTANCE, has_children::<T>)
    }

    /// Only the `SeekableIterator` methods; pair with `with_iterator`.
    pub fn with_seekable_iterator<T: SeekableIterator>(self) -> Self {
        self.method(
            "seek",
            vec![ParamDecl::required("position", ParamType::Long)],
            INSTANCE,
            seek::<T>,
        )
    }

    pub fn with_aggregate<T: IteratorAggregate>(self) -> Self {
        self.method("getIterator", vec![], INSTANCE, get_iterator::<T>)
    }

    pub fn with_array_access<T: ArrayAccess>(self) -> Self {
        self.method("offsetExists", vec![offset()], INSTANCE, offset_exists::<T>)
            .method("offsetGet", vec![offset()], INSTANCE, offset_get::<T>)
            .method(
                "offsetSet",
                vec![offset(), ParamDecl::required("value", ParamType::Mixed)],
                INSTANCE,
                offset_set::<T>,
            )
            .method("offsetUnset", vec![offset()], INSTANCE, offset_unset::<T>)
    }

    pub fn with_serializable<T: Serializable>(self) -> Self {
        self.method("serialize", vec![], INSTANCE, serialize::<T>).method(
            "unserialize",
            vec![ParamDecl::required("serialized", ParamType::String)],
            INSTANCE | MethodFlags::MEMORY_GROWING | MethodFlags::EXCEPTION_CAPABLE,
            unserialize::<T>,
        )
    }
}
