//! Host runtime capability contracts.
//!
//! A capability is a named interface the host runtime dispatches on
//! polymorphically. Declaring one obligates the class to provide a fixed set
//! of methods with fixed arities.

use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use hostbind_core::RegistrationError;

/// Capability identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Capability {
    Countable = 0,
    Iterator = 1,
    OuterIterator = 2,
    RecursiveIterator = 3,
    SeekableIterator = 4,
    Aggregate = 5,
    ArrayAccess = 6,
    Serializable = 7,
}

/// A method a capability requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredMethod {
    pub name: &'static str,
    /// Parameter count, excluding the receiver
    pub arity: usize,
}

const fn req(name: &'static str, arity: usize) -> RequiredMethod {
    RequiredMethod { name, arity }
}

const COUNTABLE: &[RequiredMethod] = &[req("count", 0)];
const ITERATOR: &[RequiredMethod] = &[
    req("current", 0),
    req("key", 0),
    req("next", 0),
    req("rewind", 0),
    req("valid", 0),
];
const OUTER_ITERATOR: &[RequiredMethod] = &[req("getInnerIterator", 0)];
const RECURSIVE_ITERATOR: &[RequiredMethod] = &[req("getChildren", 0), req("hasChildren", 0)];
const SEEKABLE_ITERATOR: &[RequiredMethod] = &[req("seek", 1)];
const AGGREGATE: &[RequiredMethod] = &[req("getIterator", 0)];
const ARRAY_ACCESS: &[RequiredMethod] = &[
    req("offsetExists", 1),
    req("offsetGet", 1),
    req("offsetSet", 2),
    req("offsetUnset", 1),
];
const SERIALIZABLE: &[RequiredMethod] = &[req("serialize", 0), req("unserialize", 1)];

impl Capability {
    /// All capabilities in canonical order.
    pub const ALL: [Capability; 8] = [
        Capability::Countable,
        Capability::Iterator,
        Capability::OuterIterator,
        Capability::RecursiveIterator,
        Capability::SeekableIterator,
        Capability::Aggregate,
        Capability::ArrayAccess,
        Capability::Serializable,
    ];

    /// Resolve a capability id.
    pub fn from_id(id: u8) -> Result<Self, RegistrationError> {
        Capability::try_from(id).map_err(|_| RegistrationError::UnknownCapability(id))
    }

    pub fn id(self) -> u8 {
        self.into()
    }

    /// Interface name in the host runtime.
    pub fn host_name(self) -> &'static str {
        match self {
            Capability::Countable => "Countable",
            Capability::Iterator => "Iterator",
            Capability::OuterIterator => "OuterIterator",
            Capability::RecursiveIterator => "RecursiveIterator",
            Capability::SeekableIterator => "SeekableIterator",
            Capability::Aggregate => "IteratorAggregate",
            Capability::ArrayAccess => "ArrayAccess",
            Capability::Serializable => "Serializable",
        }
    }

    /// Methods this capability itself requires, excluding inherited ones.
    pub fn required_methods(self) -> &'static [RequiredMethod] {
        match self {
            Capability::Countable => COUNTABLE,
            Capability::Iterator => ITERATOR,
            Capability::OuterIterator => OUTER_ITERATOR,
            Capability::RecursiveIterator => RECURSIVE_ITERATOR,
            Capability::SeekableIterator => SEEKABLE_ITERATOR,
            Capability::Aggregate => AGGREGATE,
            Capability::ArrayAccess => ARRAY_ACCESS,
            Capability::Serializable => SERIALIZABLE,
        }
    }

    /// This capability plus every capability it extends.
    pub fn implied(self) -> CapabilitySet {
        let own = CapabilitySet::from(self);
        match self {
            Capability::OuterIterator
            | Capability::RecursiveIterator
            | Capability::SeekableIterator => own | CapabilitySet::ITERATOR,
            _ => own,
        }
    }

    /// Whether `method` is one of this capability's own required methods.
    pub fn requires(self, method: &str) -> bool {
        self.required_methods()
            .iter()
            .any(|m| m.name.eq_ignore_ascii_case(method))
    }
}

bitflags! {
    /// A set of capabilities; iteration follows the canonical order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u8 {
        const COUNTABLE = 1 << 0;
        const ITERATOR = 1 << 1;
        const OUTER_ITERATOR = 1 << 2;
        const RECURSIVE_ITERATOR = 1 << 3;
        const SEEKABLE_ITERATOR = 1 << 4;
        const AGGREGATE = 1 << 5;
        const ARRAY_ACCESS = 1 << 6;
        const SERIALIZABLE = 1 << 7;
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        CapabilitySet::from_bits_retain(1 << capability.id())
    }
}

impl CapabilitySet {
    /// Whether the set contains `capability`.
    pub fn has(self, capability: Capability) -> bool {
        self.contains(capability.into())
    }

    /// Capabilities in canonical order.
    pub fn capabilities(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.has(*c))
    }

    /// The set closed under capability inheritance.
    pub fn with_implied(self) -> CapabilitySet {
        self.capabilities()
            .fold(CapabilitySet::empty(), |acc, c| acc | c.implied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_num_enum() {
        for capability in Capability::ALL {
            assert_eq!(Capability::from_id(capability.id()), Ok(capability));
        }
        assert_eq!(
            Capability::from_id(8),
            Err(RegistrationError::UnknownCapability(8))
        );
    }

    #[test]
    fn canonical_order_ignores_insertion_order() {
        let a = CapabilitySet::from(Capability::Serializable) | Capability::Countable.into();
        let b = CapabilitySet::from(Capability::Countable) | Capability::Serializable.into();
        let order: Vec<_> = a.capabilities().collect();
        assert_eq!(order, vec![Capability::Countable, Capability::Serializable]);
        assert_eq!(a, b);
    }

    #[test]
    fn derived_iterators_imply_iterator() {
        assert!(Capability::SeekableIterator.implied().has(Capability::Iterator));
        assert!(Capability::OuterIterator.implied().has(Capability::Iterator));
        assert!(!Capability::Aggregate.implied().has(Capability::Iterator));

        let closed = CapabilitySet::from(Capability::RecursiveIterator).with_implied();
        assert_eq!(
            closed,
            CapabilitySet::RECURSIVE_ITERATOR | CapabilitySet::ITERATOR
        );
    }

    #[test]
    fn contract_table() {
        assert!(Capability::Iterator.requires("VALID"));
        assert!(!Capability::Iterator.requires("count"));
        let arities: Vec<_> = Capability::ArrayAccess
            .required_methods()
            .iter()
            .map(|m| m.arity)
            .collect();
        assert_eq!(arities, vec![1, 1, 2, 1]);
        assert_eq!(Capability::Aggregate.host_name(), "IteratorAggregate");
    }
}
