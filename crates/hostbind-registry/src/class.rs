//! Class descriptors.
//!
//! A [`ClassDescriptor`] is the registered identity of a native class: its
//! qualified name, optional parent, declared capabilities, method table and
//! static property declarations. Descriptors are built once at module load
//! and become immutable once installed in a [`ClassRegistry`](crate::ClassRegistry).

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use hostbind_core::{QualifiedName, RegistrationError, TypeHash, Value};

use crate::capability::{Capability, CapabilitySet};
use crate::method::{MethodEntry, MethodTable};

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A declared class property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    /// Initial value, scalars only
    pub default: Value,
}

impl PropertyDecl {
    /// A public static property initialized to null.
    pub fn public_static(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: true,
            default: Value::Null,
        }
    }

    /// A public instance property initialized to null.
    pub fn instance(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            default: Value::Null,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// A capability whose required methods are not all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractGap {
    pub capability: Capability,
    /// Required methods that are absent or declared with the wrong arity
    pub missing: Vec<&'static str>,
}

/// Registered identity of a native class.
#[derive(Debug)]
pub struct ClassDescriptor {
    name: QualifiedName,
    type_hash: TypeHash,
    parent: Option<QualifiedName>,
    capabilities: CapabilitySet,
    methods: Vec<MethodEntry>,
    method_index: FxHashMap<String, usize>,
    properties: Vec<PropertyDecl>,
    gaps: OnceLock<Vec<ContractGap>>,
}

impl ClassDescriptor {
    /// Register a class under `namespace` with its method table.
    ///
    /// Method names are case-insensitive; two entries that differ only in
    /// case are rejected.
    pub fn register(
        name: &str,
        namespace: &str,
        methods: MethodTable,
    ) -> Result<Self, RegistrationError> {
        let qualified = QualifiedName::in_namespace(namespace, name);
        let type_hash = qualified.to_type_hash();

        let mut entries = methods.into_entries();
        let mut method_index = FxHashMap::default();
        for (i, entry) in entries.iter_mut().enumerate() {
            let key = entry.name.to_ascii_lowercase();
            if method_index.insert(key, i).is_some() {
                return Err(RegistrationError::DuplicateMethod {
                    class: qualified.to_string(),
                    method: entry.name.clone(),
                });
            }
            entry.id = TypeHash::from_method(type_hash, &entry.name);
        }

        Ok(Self {
            name: qualified,
            type_hash,
            parent: None,
            capabilities: CapabilitySet::empty(),
            methods: entries,
            method_index,
            properties: Vec::new(),
            gaps: OnceLock::new(),
        })
    }

    /// Declare a capability by id. Declaring it again has no effect.
    pub fn declare_capability(&mut self, id: u8) -> Result<&mut Self, RegistrationError> {
        let capability = Capability::from_id(id)?;
        self.insert_capability(capability);
        Ok(self)
    }

    /// Builder form of [`declare_capability`](Self::declare_capability).
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.insert_capability(capability);
        self
    }

    fn insert_capability(&mut self, capability: Capability) {
        if self.capabilities.has(capability) {
            return;
        }
        self.capabilities |= capability.into();
        self.gaps = OnceLock::new();
        tracing::debug!(
            class = %self.name,
            capability = capability.host_name(),
            "capability declared"
        );
    }

    /// Set the parent class by qualified name.
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(QualifiedName::from_qualified_string(parent));
        self
    }

    /// Declare a property.
    pub fn declare_property(&mut self, property: PropertyDecl) -> Result<&mut Self, RegistrationError> {
        if self.properties.iter().any(|p| p.name == property.name) {
            return Err(RegistrationError::DuplicateProperty {
                class: self.name.to_string(),
                property: property.name,
            });
        }
        self.properties.push(property);
        Ok(self)
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    /// Fully qualified name, e.g. `Test\Oo\OoNativeImplements`.
    pub fn qualified_name(&self) -> String {
        self.name.to_string()
    }

    pub fn type_hash(&self) -> TypeHash {
        self.type_hash
    }

    pub fn parent(&self) -> Option<&QualifiedName> {
        self.parent.as_ref()
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    /// Declared capabilities in canonical order.
    pub fn capability_list(&self) -> Vec<Capability> {
        self.capabilities.capabilities().collect()
    }

    /// Whether `capability` is declared or extended by a declared capability.
    pub fn implements(&self, capability: Capability) -> bool {
        self.capabilities.with_implied().has(capability)
    }

    /// Look up a method, ignoring case.
    pub fn find_method(&self, name: &str) -> Option<&MethodEntry> {
        self.method_index
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.methods[i])
    }

    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    pub fn find_property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> &[PropertyDecl] {
        &self.properties
    }

    /// Capabilities whose contracts the method table does not satisfy.
    ///
    /// Computed on first use and cached.
    pub fn contract_gaps(&self) -> &[ContractGap] {
        self.gaps.get_or_init(|| {
            self.capabilities
                .with_implied()
                .capabilities()
                .filter_map(|capability| {
                    let missing: Vec<&'static str> = capability
                        .required_methods()
                        .iter()
                        .filter(|required| {
                            self.find_method(required.name).is_none_or(|entry| {
                                entry.required_count() != required.arity
                                    || entry.max_count() != required.arity
                            })
                        })
                        .map(|required| required.name)
                        .collect();
                    (!missing.is_empty()).then_some(ContractGap {
                        capability,
                        missing,
                    })
                })
                .collect()
        })
    }

    /// The unsatisfied contract that dispatching `method` depends on, if any.
    ///
    /// A method depends on every capability that requires it, plus the
    /// capabilities those extend.
    pub fn gap_for(&self, method: &str) -> Option<&ContractGap> {
        let depends_on = self
            .capabilities
            .with_implied()
            .capabilities()
            .filter(|c| c.requires(method))
            .fold(CapabilitySet::empty(), |acc, c| acc | c.implied());
        self.contract_gaps()
            .iter()
            .find(|gap| depends_on.has(gap.capability))
    }
}
