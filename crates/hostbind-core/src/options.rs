//! Configuration options for the adapter runtime.

/// How strings are coerced to numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// The whole string (after trimming whitespace) must be numeric.
    #[default]
    Strict,
    /// The longest numeric prefix is used; non-numeric strings become 0.
    Lenient,
}

/// Options controlling parameter coercion and per-call memory scopes.
///
/// # Example
///
/// ```
/// use hostbind_core::{AdapterOptions, CoercionMode};
///
/// let options = AdapterOptions {
///     coercion: CoercionMode::Lenient,
///     ..AdapterOptions::default()
/// };
/// assert_eq!(options.arena_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct AdapterOptions {
    /// String to number coercion rule applied by the parameter fetcher.
    ///
    /// Default: `CoercionMode::Strict`
    pub coercion: CoercionMode,

    /// Initial capacity in bytes of the arena backing a memory-growing call.
    ///
    /// Default: 256
    pub arena_capacity: usize,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            coercion: CoercionMode::Strict,
            arena_capacity: 256,
        }
    }
}
