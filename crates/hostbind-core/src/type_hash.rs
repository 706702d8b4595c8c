//! Deterministic hash-based identity for classes and methods.
//!
//! [`TypeHash`] is a 64-bit hash computed from a qualified class name, or from
//! an owner hash plus a method name. Because it depends only on names, the same
//! class registered twice (or in two processes) gets the same identity, which
//! keeps registration reproducible.
//!
//! # Hash Computation
//!
//! Uses XXHash64 with domain-specific mixing constants so that a class and a
//! method sharing a name never collide.
//!
//! # Examples
//!
//! ```
//! use hostbind_core::TypeHash;
//!
//! let class = TypeHash::from_name("Test\\Oo\\OoNativeImplements");
//! assert_eq!(class, TypeHash::from_name("Test\\Oo\\OoNativeImplements"));
//!
//! // Method names are case-insensitive in the host runtime
//! let a = TypeHash::from_method(class, "getIterator");
//! let b = TypeHash::from_method(class, "GETITERATOR");
//! assert_eq!(a, b);
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Separator constant for path components
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for class hashes
    pub const CLASS: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for method hashes
    pub const METHOD: u64 = 0x7d3c8b4a92e15f6d;

    /// Domain marker for static property hashes
    pub const STATIC_PROPERTY: u64 = 0x3e9f5d2a8c7b1403;
}

/// A deterministic 64-bit hash identifying a class or a method.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Create a class hash from a fully qualified class name.
    ///
    /// Class names are case-insensitive in the host runtime, so the name is
    /// folded to ASCII lowercase first.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::CLASS ^ xxh64(name.to_ascii_lowercase().as_bytes(), 0))
    }

    /// Create a method hash from the owning class and the method name.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str) -> Self {
        let name_hash = xxh64(name.to_ascii_lowercase().as_bytes(), 0);
        TypeHash(
            (hash_constants::METHOD ^ owner.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(name_hash),
        )
    }

    /// Create a static property hash from the owning class and property name.
    ///
    /// Property names are case-sensitive.
    #[inline]
    pub fn from_static_property(owner: TypeHash, name: &str) -> Self {
        let name_hash = xxh64(name.as_bytes(), 0);
        TypeHash(
            (hash_constants::STATIC_PROPERTY ^ owner.0)
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(name_hash),
        )
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_hash_determinism() {
        let hash1 = TypeHash::from_name("Test\\Declare");
        let hash2 = TypeHash::from_name("Test\\Declare");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn class_hash_is_case_insensitive() {
        assert_eq!(
            TypeHash::from_name("Test\\Oo\\OoNativeImplements"),
            TypeHash::from_name("test\\oo\\oonativeimplements")
        );
    }

    #[test]
    fn class_hash_uniqueness() {
        let a = TypeHash::from_name("Test\\Declare");
        let b = TypeHash::from_name("Test\\Oo\\OoNativeImplements");
        assert_ne!(a, b);
    }

    #[test]
    fn method_hash_includes_owner() {
        let a = TypeHash::from_name("A");
        let b = TypeHash::from_name("B");
        assert_ne!(
            TypeHash::from_method(a, "count"),
            TypeHash::from_method(b, "count")
        );
    }

    #[test]
    fn method_vs_static_property_distinction() {
        let owner = TypeHash::from_name("A");
        assert_ne!(
            TypeHash::from_method(owner, "items"),
            TypeHash::from_static_property(owner, "items")
        );
    }

    #[test]
    fn static_property_hash_is_case_sensitive() {
        let owner = TypeHash::from_name("A");
        assert_ne!(
            TypeHash::from_static_property(owner, "Items"),
            TypeHash::from_static_property(owner, "items")
        );
    }

    #[test]
    fn empty_hash() {
        assert!(TypeHash::EMPTY.is_empty());
        assert!(!TypeHash::from_name("A").is_empty());
    }

    #[test]
    fn hash_display() {
        let display = format!("{}", TypeHash(0x1234));
        assert_eq!(display, "0x0000000000001234");
    }

    #[test]
    fn hash_debug() {
        let debug = format!("{:?}", TypeHash(0x1234));
        assert_eq!(debug, "TypeHash(0x0000000000001234)");
    }
}
