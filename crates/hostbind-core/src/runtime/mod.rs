//! Host runtime surface used by method adapters.
//!
//! - [`Value`]: the dynamic value box
//! - [`ObjectHeap`]: reference-counted storage for arrays and objects
//! - [`Receiver`]: the normalized call receiver
//! - [`MemoryScope`]: call-lifetime region released on every exit path
//! - [`Runtime`]: heap, scope ledger, options and the recoverable-failure channel

mod array;
mod call_frame;
mod failure;
mod host;
mod memory;
mod object_heap;
mod receiver;
mod value;

pub use array::{ArrayKey, HostArray};
pub use call_frame::CallFrame;
pub use failure::{FailureKind, RecoverableFailure};
pub use host::Runtime;
pub use memory::{MemoryScope, ScopeLedger};
pub use object_heap::{HeapRefs, ObjectHandle, ObjectHeap};
pub use receiver::{RawReceiver, Receiver, ReceiverRef};
pub use value::Value;
