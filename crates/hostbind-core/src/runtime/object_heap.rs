//! Reference-counted storage for arrays and objects.
//!
//! Stands in for the host runtime's memory manager: every array or object a
//! value box refers to lives here, and is freed when its reference count
//! drops to zero. Freed slots are reused under a new generation, so a
//! handle that outlived its object is detected instead of aliasing the
//! next occupant.
//!
//! An array owns one reference to every array or object it holds, and so
//! does instance state allocated through [`ObjectHeap::allocate_owning`].
//! Freeing the container releases those references.

use std::any::{Any, TypeId};
use std::fmt;

use crate::TypeHash;

use super::HostArray;

type State = Box<dyn Any + Send + Sync>;
type RefsFn = fn(&(dyn Any + Send + Sync)) -> Vec<ObjectHandle>;

/// State that owns references to other heap objects.
pub trait HeapRefs {
    /// Handles this state holds one reference to each.
    fn heap_refs(&self) -> Vec<ObjectHandle>;
}

impl HeapRefs for HostArray {
    fn heap_refs(&self) -> Vec<ObjectHandle> {
        self.iter().filter_map(|(_, v)| v.heap_handle()).collect()
    }
}

fn refs_of<T: HeapRefs + Any>(state: &(dyn Any + Send + Sync)) -> Vec<ObjectHandle> {
    state
        .downcast_ref::<T>()
        .map(T::heap_refs)
        .unwrap_or_default()
}

/// Copyable reference to an array or object in the [`ObjectHeap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Slot position
    pub index: u32,
    /// Slot generation at allocation time
    pub generation: u32,
    /// Rust type of the stored state
    pub type_id: TypeId,
}

impl ObjectHandle {
    pub fn new(index: u32, generation: u32, type_id: TypeId) -> Self {
        Self {
            index,
            generation,
            type_id,
        }
    }
}

/// Slot storage with generation checks and per-slot reference counts.
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    vacant: Vec<u32>,
    live: usize,
}

struct HeapSlot {
    generation: u32,
    value: Option<State>,
    refs: Option<RefsFn>,
    ref_count: u32,
    /// Registered class of the instance, `TypeHash::EMPTY` for arrays
    class: TypeHash,
}

impl ObjectHeap {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            live: 0,
        }
    }

    /// Allocate a value that is not an instance of a registered class.
    pub fn allocate<T: Any + Send + Sync>(&mut self, value: T) -> ObjectHandle {
        self.allocate_instance(TypeHash::EMPTY, value)
    }

    /// Allocate an instance of a registered class with one reference.
    pub fn allocate_instance<T: Any + Send + Sync>(
        &mut self,
        class: TypeHash,
        value: T,
    ) -> ObjectHandle {
        let refs = (TypeId::of::<T>() == TypeId::of::<HostArray>())
            .then_some(refs_of::<HostArray> as RefsFn);
        self.insert(class, Box::new(value), refs, TypeId::of::<T>())
    }

    /// Allocate an instance whose state owns the handles it reports through
    /// [`HeapRefs`]; they are released when the instance is freed.
    pub fn allocate_owning<T: Any + Send + Sync + HeapRefs>(
        &mut self,
        class: TypeHash,
        value: T,
    ) -> ObjectHandle {
        self.insert(class, Box::new(value), Some(refs_of::<T>), TypeId::of::<T>())
    }

    fn insert(
        &mut self,
        class: TypeHash,
        state: State,
        refs: Option<RefsFn>,
        type_id: TypeId,
    ) -> ObjectHandle {
        self.live += 1;
        let index = match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(state);
                slot.refs = refs;
                slot.ref_count = 1;
                slot.class = class;
                index
            }
            None => {
                self.slots.push(HeapSlot {
                    generation: 0,
                    value: Some(state),
                    refs,
                    ref_count: 1,
                    class,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let generation = self.slots[index as usize].generation;
        ObjectHandle::new(index, generation, type_id)
    }

    fn live_slot(&self, handle: ObjectHandle) -> Option<&HeapSlot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    fn live_slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut HeapSlot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.value.is_some())
    }

    /// Drop the slot's state, retire its generation and release the
    /// references the state owned.
    fn vacate(&mut self, index: u32) {
        let mut pending = vec![index];
        while let Some(index) = pending.pop() {
            let slot = &mut self.slots[index as usize];
            let state = slot.value.take();
            let refs = slot.refs.take();
            slot.ref_count = 0;
            slot.generation = slot.generation.wrapping_add(1);
            self.vacant.push(index);
            self.live -= 1;

            let (Some(state), Some(refs)) = (state, refs) else {
                continue;
            };
            for child in refs(&*state) {
                // a count already at zero is queued
                if let Some(slot) = self.live_slot_mut(child)
                    && slot.ref_count > 0
                {
                    slot.ref_count -= 1;
                    if slot.ref_count == 0 {
                        pending.push(child.index);
                    }
                }
            }
        }
    }

    /// Whether the handle refers to a live object.
    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    /// The object's state as `T`; `None` for stale handles or another type.
    pub fn get<T: Any>(&self, handle: ObjectHandle) -> Option<&T> {
        self.live_slot(handle)?.value.as_deref()?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        self.live_slot_mut(handle)?.value.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Registered class of a live instance.
    pub fn class_of(&self, handle: ObjectHandle) -> Option<TypeHash> {
        self.live_slot(handle).map(|slot| slot.class)
    }

    /// Take another reference. Returns false for a stale handle.
    pub fn add_ref(&mut self, handle: ObjectHandle) -> bool {
        match self.live_slot_mut(handle) {
            Some(slot) => {
                slot.ref_count = slot.ref_count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Drop a reference. Returns true when this freed the object.
    pub fn release(&mut self, handle: ObjectHandle) -> bool {
        let Some(slot) = self.live_slot_mut(handle) else {
            return false;
        };
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 {
            return false;
        }
        self.vacate(handle.index);
        true
    }

    /// Free the object whatever its reference count. References it owned
    /// are released normally.
    pub fn free(&mut self, handle: ObjectHandle) {
        if self.contains(handle) {
            self.vacate(handle.index);
        }
    }

    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        self.live_slot(handle).map(|slot| slot.ref_count)
    }

    /// Number of live objects.
    pub fn live_count(&self) -> usize {
        self.live
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slots", &self.slots.len())
            .field("vacant", &self.vacant.len())
            .field("live", &self.live)
            .finish()
    }
}
