//! Receiver normalization.
//!
//! The host hands a method its receiver in one of two raw shapes: already
//! boxed as an object value, or as a bare heap handle that still has to be
//! lifted. [`Receiver::rebind`] is the single place that looks at the raw
//! shape; method bodies only ever see a [`Receiver`].

use std::any::{Any, type_name};
use std::marker::PhantomData;

use crate::error::NativeError;

use super::{ObjectHandle, ObjectHeap, Value};

/// Receiver as delivered by the host, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReceiver {
    /// Already boxed as a managed value
    Managed(Value),
    /// Bare object handle that must be lifted into a reference
    Bare(ObjectHandle),
}

impl RawReceiver {
    /// Wrap a boxed object as a managed receiver.
    pub fn managed(handle: ObjectHandle) -> Self {
        RawReceiver::Managed(Value::Object(handle))
    }
}

/// Normalized handle to the call receiver.
///
/// Valid only for the call it was rebound in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiverRef<'call> {
    handle: ObjectHandle,
    _call: PhantomData<&'call ()>,
}

impl<'call> ReceiverRef<'call> {
    /// The underlying heap handle.
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Borrow the receiver's state as `T`.
    pub fn get<'h, T: Any>(&self, heap: &'h ObjectHeap) -> Result<&'h T, NativeError> {
        if !heap.contains(self.handle) {
            return Err(NativeError::StaleHandle {
                index: self.handle.index,
            });
        }
        heap.get::<T>(self.handle).ok_or_else(|| {
            NativeError::invalid_this(format!("receiver is not a {}", type_name::<T>()))
        })
    }

    /// Mutably borrow the receiver's state as `T`.
    pub fn get_mut<'h, T: Any>(&self, heap: &'h mut ObjectHeap) -> Result<&'h mut T, NativeError> {
        if !heap.contains(self.handle) {
            return Err(NativeError::StaleHandle {
                index: self.handle.index,
            });
        }
        heap.get_mut::<T>(self.handle).ok_or_else(|| {
            NativeError::invalid_this(format!("receiver is not a {}", type_name::<T>()))
        })
    }
}

/// The call receiver after rebinding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Receiver<'call> {
    /// Instance call
    Bound(ReceiverRef<'call>),
    /// Static call, or the host supplied no receiver
    #[default]
    None,
}

impl<'call> Receiver<'call> {
    /// Normalize a raw receiver.
    ///
    /// Both raw shapes produce `Bound`; a managed receiver that does not box
    /// an object is rejected. The raw receiver is never modified.
    pub fn rebind(raw: Option<&RawReceiver>) -> Result<Self, NativeError> {
        let handle = match raw {
            None => return Ok(Receiver::None),
            Some(RawReceiver::Bare(handle)) => *handle,
            Some(RawReceiver::Managed(Value::Object(handle))) => *handle,
            Some(RawReceiver::Managed(other)) => {
                return Err(NativeError::invalid_this(format!(
                    "expected object, got {}",
                    other.type_name()
                )));
            }
        };
        Ok(Receiver::Bound(ReceiverRef {
            handle,
            _call: PhantomData,
        }))
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Receiver::Bound(_))
    }

    /// The bound receiver, or `MissingReceiver` for static calls.
    pub fn bound(&self) -> Result<ReceiverRef<'call>, NativeError> {
        match self {
            Receiver::Bound(r) => Ok(*r),
            Receiver::None => Err(NativeError::MissingReceiver),
        }
    }
}
