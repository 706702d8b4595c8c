//! Method table entries.

use bitflags::bitflags;

use hostbind_core::{NativeError, ParamDecl, TypeHash};

use crate::context::MethodContext;
use crate::native_fn::NativeFn;

bitflags! {
    /// How the adapter runs a method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        /// Requires a bound receiver
        const INSTANCE = 1 << 0;
        /// Opens a growing memory scope with a preallocated arena
        const MEMORY_GROWING = 1 << 1;
        /// Parameter failures are raised as exceptions rather than warnings
        const EXCEPTION_CAPABLE = 1 << 2;
    }
}

/// One callable entry of a class's method table.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    /// Method name as declared (lookups ignore case)
    pub name: String,
    /// Method identity, assigned when the owning class is registered
    pub id: TypeHash,
    pub params: Vec<ParamDecl>,
    pub flags: MethodFlags,
    pub body: NativeFn,
}

impl MethodEntry {
    pub fn new<F>(
        name: impl Into<String>,
        params: Vec<ParamDecl>,
        flags: MethodFlags,
        body: F,
    ) -> Self
    where
        F: Fn(&mut MethodContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            id: TypeHash::EMPTY,
            params,
            flags,
            body: NativeFn::new(body),
        }
    }

    /// Parameters the caller must supply.
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    /// Most parameters the caller may supply.
    pub fn max_count(&self) -> usize {
        self.params.len()
    }

    pub fn is_instance(&self) -> bool {
        self.flags.contains(MethodFlags::INSTANCE)
    }

    pub fn is_memory_growing(&self) -> bool {
        self.flags.contains(MethodFlags::MEMORY_GROWING)
    }

    pub fn is_exception_capable(&self) -> bool {
        self.flags.contains(MethodFlags::EXCEPTION_CAPABLE)
    }

    pub fn call(&self, ctx: &mut MethodContext<'_>) -> Result<(), NativeError> {
        self.body.call(ctx)
    }
}

/// Ordered method table, built before a class is registered.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    entries: Vec<MethodEntry>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with_method(mut self, entry: MethodEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add an entry from its parts.
    pub fn method<F>(
        self,
        name: &str,
        params: Vec<ParamDecl>,
        flags: MethodFlags,
        body: F,
    ) -> Self
    where
        F: Fn(&mut MethodContext<'_>) -> Result<(), NativeError> + Send + Sync + 'static,
    {
        self.with_method(MethodEntry::new(name, params, flags, body))
    }

    /// Remove an entry by name, ignoring case.
    pub fn without(mut self, name: &str) -> Self {
        self.entries.retain(|e| !e.name.eq_ignore_ascii_case(name));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodEntry> {
        self.entries.iter()
    }

    pub(crate) fn into_entries(self) -> Vec<MethodEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostbind_core::ParamType;

    fn noop(_: &mut MethodContext<'_>) -> Result<(), NativeError> {
        Ok(())
    }

    #[test]
    fn counts_follow_declarations() {
        let entry = MethodEntry::new(
            "slice",
            vec![
                ParamDecl::required("offset", ParamType::Long),
                ParamDecl::optional("length", ParamType::Long),
            ],
            MethodFlags::INSTANCE,
            noop,
        );
        assert_eq!(entry.required_count(), 1);
        assert_eq!(entry.max_count(), 2);
        assert!(entry.is_instance());
        assert!(!entry.is_memory_growing());
    }

    #[test]
    fn table_builder() {
        let table = MethodTable::new()
            .method("a", vec![], MethodFlags::empty(), noop)
            .method("B", vec![], MethodFlags::empty(), noop)
            .without("b");
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().map(|e| e.name.as_str()), Some("a"));
    }
}
