//! Installed classes.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use hostbind_core::{RegistrationError, TypeHash};

use crate::class::ClassDescriptor;

/// Registry configuration.
///
/// # Example
///
/// ```
/// use hostbind_registry::{ClassRegistry, RegistryOptions};
///
/// let registry = ClassRegistry::with_options(RegistryOptions {
///     eager_contract_check: true,
/// });
/// assert!(registry.options().eager_contract_check);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Reject classes whose method tables do not satisfy their declared
    /// capabilities at install time instead of at first dispatch.
    ///
    /// Default: false
    pub eager_contract_check: bool,
}

/// Installed class descriptors, keyed by qualified name.
///
/// Class names are case-insensitive. Descriptors are shared via `Arc` and
/// never change after installation.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<TypeHash, Arc<ClassDescriptor>>,
    order: Vec<TypeHash>,
    options: RegistryOptions,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    /// Install a class.
    ///
    /// Fails on a duplicate name, on an uninstalled parent and, when
    /// `eager_contract_check` is set, on an unsatisfied capability contract.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn install(
        &mut self,
        class: ClassDescriptor,
    ) -> Result<Arc<ClassDescriptor>, RegistrationError> {
        let hash = class.type_hash();
        if self.classes.contains_key(&hash) {
            return Err(RegistrationError::DuplicateClass(class.qualified_name()));
        }
        if let Some(parent) = class.parent()
            && !self.classes.contains_key(&parent.to_type_hash())
        {
            return Err(RegistrationError::UnknownParent {
                class: class.qualified_name(),
                parent: parent.to_string(),
            });
        }
        if self.options.eager_contract_check
            && let Some(gap) = class.contract_gaps().first()
        {
            tracing::error!(
                class = %class.name(),
                capability = gap.capability.host_name(),
                missing = ?gap.missing,
                "capability contract violated"
            );
            return Err(RegistrationError::ContractViolation {
                class: class.qualified_name(),
                capability: gap.capability.host_name(),
                missing: gap.missing.clone(),
            });
        }

        tracing::debug!(
            class = %class.name(),
            methods = class.methods().len(),
            capabilities = ?class.capability_list(),
            "class installed"
        );
        let class = Arc::new(class);
        self.classes.insert(hash, Arc::clone(&class));
        self.order.push(hash);
        Ok(class)
    }

    /// Look up a class by qualified name, ignoring case.
    pub fn get(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.get_by_hash(TypeHash::from_name(name))
    }

    pub fn get_by_hash(&self, hash: TypeHash) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(&hash).cloned()
    }

    /// The installed parent of `class`.
    pub fn parent_of(&self, class: &ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
        class
            .parent()
            .and_then(|parent| self.get_by_hash(parent.to_type_hash()))
    }

    /// Whether `class` is `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: &ClassDescriptor, ancestor: TypeHash) -> bool {
        let mut current = Some(class.type_hash());
        while let Some(hash) = current {
            if hash == ancestor {
                return true;
            }
            current = self
                .classes
                .get(&hash)
                .and_then(|c| c.parent())
                .map(|p| p.to_type_hash());
        }
        false
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Installed classes in installation order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ClassDescriptor>> {
        self.order.iter().filter_map(|hash| self.classes.get(hash))
    }
}
